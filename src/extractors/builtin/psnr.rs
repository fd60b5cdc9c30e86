// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tracing::debug;

use super::{check_pair, sum_pairs};
use crate::collector::FeatureCollector;
use crate::errors::ExtractorError;
use crate::extractors::{ExtractorDescriptor, ExtractorFlags};
use crate::frame::{Picture, PictureGeometry};
use crate::traits::FeatureExtractor;
use crate::utils::CpuCapabilities;

pub const PSNR_Y: &str = "psnr_y";

pub(super) fn descriptor() -> ExtractorDescriptor {
    ExtractorDescriptor::new("psnr", ExtractorFlags::NONE, &[PSNR_Y], |caps: &CpuCapabilities| {
        Ok(Box::new(PsnrExtractor::new(*caps)) as Box<dyn FeatureExtractor>)
    })
}

/// Luma PSNR, capped at `6 * bpc + 12` dB (60 dB for 8-bit).
pub struct PsnrExtractor {
    wide: bool,
    geometry: Option<PictureGeometry>,
}

impl PsnrExtractor {
    pub fn new(capabilities: CpuCapabilities) -> Self {
        Self {
            wide: capabilities.avx2,
            geometry: None,
        }
    }

    fn psnr(&self, geometry: PictureGeometry, reference: &[u16], distorted: &[u16]) -> f64 {
        let sse = sum_pairs(reference, distorted, self.wide, |x, y| {
            let d = i64::from(x) - i64::from(y);
            (d * d) as u64
        });
        let cap = f64::from(6 * u32::from(geometry.bit_depth) + 12);
        if sse == 0 {
            return cap;
        }
        let mse = sse as f64 / geometry.sample_count() as f64;
        let peak = f64::from(geometry.peak());
        (10.0 * (peak * peak / mse).log10()).min(cap)
    }
}

impl FeatureExtractor for PsnrExtractor {
    fn init(&mut self, geometry: PictureGeometry) -> Result<(), ExtractorError> {
        debug!(%geometry, wide = self.wide, "psnr extractor initialized");
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
        let score = self.psnr(geometry, reference.luma(), distorted.luma());
        collector.append(PSNR_Y, score, index)?;
        Ok(())
    }
}
