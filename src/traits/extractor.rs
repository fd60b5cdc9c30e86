// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collector::FeatureCollector;
use crate::errors::ExtractorError;
use crate::frame::{Picture, PictureGeometry};
use crate::utils::CpuCapabilities;

/// Per-instance extraction state for one kind of feature.
///
/// An instance is only ever driven by one thread at a time. `init` runs once,
/// before the first `extract`, with the geometry of the first reference
/// picture. `close` runs at most once and only after `init` succeeded; it is
/// the place to flush values that depend on having seen the last frame.
pub trait FeatureExtractor: Send {
    fn init(&mut self, _geometry: PictureGeometry) -> Result<(), ExtractorError> {
        Ok(())
    }

    fn extract(
        &mut self,
        reference: &Picture,
        distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError>;

    fn close(&mut self, _collector: &FeatureCollector) -> Result<(), ExtractorError> {
        Ok(())
    }
}

/// Builds fresh extractor instances for a descriptor.
pub trait ExtractorFactory: Send + Sync {
    fn create(&self, capabilities: &CpuCapabilities) -> Result<Box<dyn FeatureExtractor>, ExtractorError>;
}

impl<F> ExtractorFactory for F
where
    F: Fn(&CpuCapabilities) -> Result<Box<dyn FeatureExtractor>, ExtractorError> + Send + Sync,
{
    fn create(&self, capabilities: &CpuCapabilities) -> Result<Box<dyn FeatureExtractor>, ExtractorError> {
        self(capabilities)
    }
}
