// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tracing::trace;

use super::{check_pair, sum_pairs};
use crate::collector::FeatureCollector;
use crate::errors::ExtractorError;
use crate::extractors::{ExtractorDescriptor, ExtractorFlags};
use crate::frame::{Picture, PictureGeometry};
use crate::traits::FeatureExtractor;
use crate::utils::CpuCapabilities;

pub const MOTION_SCORE: &str = "motion_score";

pub(super) fn descriptor() -> ExtractorDescriptor {
    ExtractorDescriptor::new(
        "motion",
        ExtractorFlags::TEMPORAL,
        &[MOTION_SCORE],
        |caps: &CpuCapabilities| Ok(Box::new(MotionExtractor::new(*caps)) as Box<dyn FeatureExtractor>),
    )
}

/// Mean absolute luma difference between consecutive reference frames.
///
/// Keeps a handle on the previous reference picture; the first frame a
/// context sees scores 0. The handle is released on `close`.
pub struct MotionExtractor {
    wide: bool,
    geometry: Option<PictureGeometry>,
    previous: Option<Picture>,
}

impl MotionExtractor {
    pub fn new(capabilities: CpuCapabilities) -> Self {
        Self {
            wide: capabilities.avx2,
            geometry: None,
            previous: None,
        }
    }
}

impl FeatureExtractor for MotionExtractor {
    fn init(&mut self, geometry: PictureGeometry) -> Result<(), ExtractorError> {
        self.geometry = Some(geometry);
        Ok(())
    }

    fn extract(
        &mut self,
        reference: &Picture,
        distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        let geometry = check_pair(self.geometry, reference, distorted)?;

        let score = match &self.previous {
            Some(previous) => {
                let sad = sum_pairs(previous.luma(), reference.luma(), self.wide, |x, y| {
                    u64::from(x.abs_diff(y))
                });
                sad as f64 / geometry.sample_count() as f64
            }
            None => 0.0,
        };
        trace!(index, score, "motion score");

        collector.append(MOTION_SCORE, score, index)?;
        self.previous = Some(reference.clone());
        Ok(())
    }

    fn close(&mut self, _collector: &FeatureCollector) -> Result<(), ExtractorError> {
        self.previous = None;
        Ok(())
    }
}
