// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::errors::ExtractorError;
use crate::traits::{ExtractorFactory, FeatureExtractor};
use crate::utils::CpuCapabilities;

/// Capability flags of an extractor kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorFlags {
    /// Output at frame N depends on earlier frames, so the extractor must see
    /// every frame even when the session subsamples.
    pub temporal: bool,
}

impl ExtractorFlags {
    pub const NONE: ExtractorFlags = ExtractorFlags { temporal: false };
    pub const TEMPORAL: ExtractorFlags = ExtractorFlags { temporal: true };
}

/// Immutable description of one extractor kind.
pub struct ExtractorDescriptor {
    name: String,
    flags: ExtractorFlags,
    provided_features: Vec<String>,
    factory: Arc<dyn ExtractorFactory>,
}

impl ExtractorDescriptor {
    pub fn new<F>(name: &str, flags: ExtractorFlags, provided_features: &[&str], factory: F) -> Self
    where
        F: Fn(&CpuCapabilities) -> Result<Box<dyn FeatureExtractor>, ExtractorError> + Send + Sync + 'static,
    {
        Self::from_factory(name, flags, provided_features, Arc::new(factory))
    }

    pub fn from_factory(
        name: &str,
        flags: ExtractorFlags,
        provided_features: &[&str],
        factory: Arc<dyn ExtractorFactory>,
    ) -> Self {
        Self {
            name: name.to_string(),
            flags,
            provided_features: provided_features.iter().map(|f| f.to_string()).collect(),
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> ExtractorFlags {
        self.flags
    }

    pub fn is_temporal(&self) -> bool {
        self.flags.temporal
    }

    pub fn provided_features(&self) -> &[String] {
        &self.provided_features
    }

    pub fn provides(&self, feature: &str) -> bool {
        self.provided_features.iter().any(|f| f == feature)
    }

    /// Skip rule shared by both dispatch modes: a non-temporal extractor only
    /// runs on indices that are multiples of the stride.
    pub fn skips_index(&self, subsample: u32, index: u32) -> bool {
        subsample > 1 && index % subsample != 0 && !self.is_temporal()
    }

    pub fn create_extractor(&self, capabilities: &CpuCapabilities) -> Result<Box<dyn FeatureExtractor>, ExtractorError> {
        self.factory.create(capabilities)
    }
}

impl fmt::Debug for ExtractorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("provided_features", &self.provided_features)
            .finish()
    }
}
