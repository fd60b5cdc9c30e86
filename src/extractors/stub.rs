// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Extractors used by the engine tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{ExtractorDescriptor, ExtractorFlags};
use crate::collector::FeatureCollector;
use crate::errors::ExtractorError;
use crate::frame::{Picture, PictureGeometry};
use crate::traits::FeatureExtractor;
use crate::utils::CpuCapabilities;

/// Writes the same value for every frame.
pub struct ConstantExtractor {
    feature: String,
    value: f64,
}

impl ConstantExtractor {
    pub fn new(feature: &str, value: f64) -> Self {
        Self {
            feature: feature.to_string(),
            value,
        }
    }
}

impl FeatureExtractor for ConstantExtractor {
    fn extract(
        &mut self,
        _reference: &Picture,
        _distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        collector.append(&self.feature, self.value, index)?;
        Ok(())
    }
}

pub fn constant_descriptor(name: &str, feature: &str, value: f64) -> ExtractorDescriptor {
    let feature_name = feature.to_string();
    ExtractorDescriptor::new(name, ExtractorFlags::NONE, &[feature], move |_: &CpuCapabilities| {
        Ok(Box::new(ConstantExtractor::new(&feature_name, value)) as Box<dyn FeatureExtractor>)
    })
}

/// Counters shared by every instance a probed descriptor creates.
#[derive(Default)]
pub struct Probe {
    pub created: AtomicUsize,
    pub initialized: AtomicUsize,
    pub closed: AtomicUsize,
    /// Instances whose memory has been released.
    pub dropped: AtomicUsize,
    pub extractions: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    /// Times an instance was entered while already in use.
    pub violations: AtomicUsize,
    pub seen: Mutex<Vec<u32>>,
    in_flight: Mutex<HashSet<usize>>,
}

impl Probe {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn seen_sorted(&self) -> Vec<u32> {
        let mut seen = self.seen.lock().unwrap().clone();
        seen.sort_unstable();
        seen
    }
}

/// Writes `index * scale`, or the number of frames this instance has seen
/// when `stateful`, and records how it was driven.
pub struct ProbedExtractor {
    feature: String,
    scale: f64,
    stateful: bool,
    frames_seen: u32,
    delay: Duration,
    instance: usize,
    probe: Arc<Probe>,
}

impl FeatureExtractor for ProbedExtractor {
    fn init(&mut self, _geometry: PictureGeometry) -> Result<(), ExtractorError> {
        self.probe.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn extract(
        &mut self,
        _reference: &Picture,
        _distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        if !self.probe.in_flight.lock().unwrap().insert(self.instance) {
            self.probe.violations.fetch_add(1, Ordering::SeqCst);
        }
        let active = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_active.fetch_max(active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let value = if self.stateful {
            f64::from(self.frames_seen)
        } else {
            f64::from(index) * self.scale
        };
        self.frames_seen += 1;
        let result = collector.append(&self.feature, value, index);

        self.probe.seen.lock().unwrap().push(index);
        self.probe.extractions.fetch_add(1, Ordering::SeqCst);
        self.probe.active.fetch_sub(1, Ordering::SeqCst);
        self.probe.in_flight.lock().unwrap().remove(&self.instance);
        result.map_err(ExtractorError::from)
    }

    fn close(&mut self, _collector: &FeatureCollector) -> Result<(), ExtractorError> {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for ProbedExtractor {
    fn drop(&mut self) {
        self.probe.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ProbeOptions {
    pub temporal: bool,
    pub stateful: bool,
    pub scale: f64,
    pub delay: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            temporal: false,
            stateful: false,
            scale: 1.0,
            delay: Duration::ZERO,
        }
    }
}

pub fn probed_descriptor(name: &str, feature: &str, options: ProbeOptions) -> (ExtractorDescriptor, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let factory_probe = Arc::clone(&probe);
    let feature_name = feature.to_string();
    let flags = if options.temporal {
        ExtractorFlags::TEMPORAL
    } else {
        ExtractorFlags::NONE
    };
    let ProbeOptions {
        stateful,
        scale,
        delay,
        ..
    } = options;

    let descriptor = ExtractorDescriptor::new(name, flags, &[feature], move |_: &CpuCapabilities| {
        let instance = factory_probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ProbedExtractor {
            feature: feature_name.clone(),
            scale,
            stateful,
            frames_seen: 0,
            delay,
            instance,
            probe: Arc::clone(&factory_probe),
        }) as Box<dyn FeatureExtractor>)
    });
    (descriptor, probe)
}

/// Fails on the listed indices and writes 1.0 everywhere else.
pub struct FailingExtractor {
    feature: String,
    fail_on: Vec<u32>,
}

impl FeatureExtractor for FailingExtractor {
    fn extract(
        &mut self,
        _reference: &Picture,
        _distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        if self.fail_on.contains(&index) {
            return Err(ExtractorError::Failed(format!("simulated failure at {}", index)));
        }
        collector.append(&self.feature, 1.0, index)?;
        Ok(())
    }
}

pub fn failing_descriptor(name: &str, feature: &str, fail_on: &[u32]) -> ExtractorDescriptor {
    let feature_name = feature.to_string();
    let fail_on = fail_on.to_vec();
    ExtractorDescriptor::new(name, ExtractorFlags::NONE, &[feature], move |_: &CpuCapabilities| {
        Ok(Box::new(FailingExtractor {
            feature: feature_name.clone(),
            fail_on: fail_on.clone(),
        }) as Box<dyn FeatureExtractor>)
    })
}

/// Panics on the listed indices and writes 1.0 everywhere else.
pub struct PanickingExtractor {
    feature: String,
    panic_on: Vec<u32>,
}

impl FeatureExtractor for PanickingExtractor {
    fn extract(
        &mut self,
        _reference: &Picture,
        _distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        if self.panic_on.contains(&index) {
            panic!("simulated panic at {}", index);
        }
        collector.append(&self.feature, 1.0, index)?;
        Ok(())
    }
}

pub fn panicking_descriptor(name: &str, feature: &str, panic_on: &[u32]) -> ExtractorDescriptor {
    let feature_name = feature.to_string();
    let panic_on = panic_on.to_vec();
    ExtractorDescriptor::new(name, ExtractorFlags::NONE, &[feature], move |_: &CpuCapabilities| {
        Ok(Box::new(PanickingExtractor {
            feature: feature_name.clone(),
            panic_on: panic_on.clone(),
        }) as Box<dyn FeatureExtractor>)
    })
}

/// Descriptor whose factory always fails.
pub fn unbuildable_descriptor(name: &str, feature: &str) -> ExtractorDescriptor {
    let extractor = name.to_string();
    ExtractorDescriptor::new(name, ExtractorFlags::NONE, &[feature], move |_: &CpuCapabilities| {
        Err(ExtractorError::Init {
            extractor: extractor.clone(),
            reason: "simulated".to_string(),
        })
    })
}

/// A small 8-bit picture for tests that do not care about pixels.
pub fn test_picture(value: u16) -> Picture {
    Picture::filled(PictureGeometry::new(4, 4, 8), value).unwrap()
}
