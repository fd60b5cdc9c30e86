// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::collector::FeatureCollector;
use crate::errors::PredictError;

/// Turns the features collected for one frame into a quality score.
pub trait QualityModel: Send + Sync {
    fn name(&self) -> &str;

    /// Feature names this model reads, in the order it declares them.
    fn feature_names(&self) -> Vec<&str>;

    fn score_at_index(&self, collector: &FeatureCollector, index: u32) -> Result<f64, PredictError>;
}
