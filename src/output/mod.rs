// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Serialization of collected features.
//!
//! Both writers report the frames selected by the subsample stride that have
//! at least one feature value, followed by per-feature pooled metrics over
//! those frames.

mod json;
mod xml;

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collector::FeatureCollector;
use crate::engine::pooling::{self, PooledAccumulator};

/// Report format. Unrecognized names are kept so writing them is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
    Unknown(String),
}

impl OutputFormat {
    pub fn is_known(&self) -> bool {
        !matches!(self, OutputFormat::Unknown(_))
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "xml" => OutputFormat::Xml,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Unknown(s.to_string()),
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xml => f.write_str("xml"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Unknown(name) => f.write_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or(OutputFormat::Unknown(name)))
    }
}

impl Serialize for OutputFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Write `collector` to `sink` as `format`. Returns whether anything was written.
pub fn write_output(
    collector: &FeatureCollector,
    sink: &mut dyn Write,
    subsample: u32,
    format: &OutputFormat,
) -> io::Result<bool> {
    let write: fn(&Report, &mut dyn Write) -> io::Result<()> = match format {
        OutputFormat::Xml => xml::write,
        OutputFormat::Json => json::write,
        OutputFormat::Unknown(name) => {
            tracing::debug!(format = name.as_str(), "Unknown output format '{}', nothing written", name);
            return Ok(false);
        }
    };
    write(&Report::build(collector, subsample), sink)?;
    sink.flush()?;
    Ok(true)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FrameRecord {
    #[serde(rename = "frameNum")]
    pub index: u32,
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PooledMetrics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub harmonic_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Report {
    pub version: &'static str,
    pub subsample: u32,
    pub frames: Vec<FrameRecord>,
    pub pooled_metrics: BTreeMap<String, PooledMetrics>,
}

impl Report {
    pub(crate) fn build(collector: &FeatureCollector, subsample: u32) -> Self {
        let names = collector.feature_names();
        let mut frames = Vec::new();
        let mut accumulators: BTreeMap<String, PooledAccumulator> = BTreeMap::new();

        for index in collector
            .frame_indices()
            .into_iter()
            .filter(|&i| pooling::is_selected(subsample, i))
        {
            let metrics: BTreeMap<String, f64> = names
                .iter()
                .filter_map(|name| collector.get(name, index).map(|value| (name.clone(), value)))
                .collect();
            if metrics.is_empty() {
                continue;
            }
            for (name, value) in &metrics {
                accumulators.entry(name.clone()).or_default().push(*value);
            }
            frames.push(FrameRecord { index, metrics });
        }

        let pooled_metrics = accumulators
            .into_iter()
            .filter_map(|(name, acc)| {
                Some((
                    name,
                    PooledMetrics {
                        min: acc.min()?,
                        max: acc.max()?,
                        mean: acc.mean()?,
                        harmonic_mean: acc.harmonic_mean()?,
                    },
                ))
            })
            .collect();

        Self {
            version: crate::version(),
            subsample: subsample.max(1),
            frames,
            pooled_metrics,
        }
    }
}
