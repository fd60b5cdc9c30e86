// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A weighted sum of features with an optional output clamp.
//!
//! # Example
//!
//! ```yaml
//! name: psnr_motion_v1
//! intercept: 1.5
//! features:
//!   - { name: psnr_y, weight: 1.2 }
//!   - { name: motion_score, weight: -0.4 }
//! clamp: { min: 0.0, max: 100.0 }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collector::FeatureCollector;
use crate::errors::{ConfigError, PredictError, ValidationError};
use crate::traits::QualityModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    #[serde(default)]
    pub intercept: f64,
    pub features: Vec<FeatureWeight>,
    #[serde(default)]
    pub clamp: Option<ScoreRange>,
}

impl LinearModel {
    pub fn new(name: &str, intercept: f64) -> Self {
        Self {
            name: name.to_string(),
            intercept,
            features: Vec::new(),
            clamp: None,
        }
    }

    pub fn with_feature(mut self, name: &str, weight: f64) -> Self {
        self.features.push(FeatureWeight {
            name: name.to_string(),
            weight,
        });
        self
    }

    pub fn with_clamp(mut self, min: f64, max: f64) -> Self {
        self.clamp = Some(ScoreRange { min, max });
        self
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let model: LinearModel = serde_yaml::from_str(text)?;
        model.validate().map_err(ConfigError::Validation)?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut invalid = |reason: String| {
            errors.push(ValidationError::InvalidModel {
                model: self.name.clone(),
                reason,
            })
        };

        if self.features.is_empty() {
            invalid("no features".to_string());
        }
        let mut seen = HashSet::new();
        for feature in &self.features {
            if feature.name.is_empty() {
                invalid("feature with an empty name".to_string());
            } else if !seen.insert(feature.name.as_str()) {
                invalid(format!("feature '{}' listed more than once", feature.name));
            }
            if !feature.weight.is_finite() {
                invalid(format!("weight for '{}' is not finite", feature.name));
            }
        }
        if !self.intercept.is_finite() {
            invalid("intercept is not finite".to_string());
        }
        if let Some(range) = self.clamp {
            if !(range.min <= range.max) {
                invalid(format!("clamp range [{}, {}] is empty", range.min, range.max));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl QualityModel for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    fn score_at_index(&self, collector: &FeatureCollector, index: u32) -> Result<f64, PredictError> {
        let mut score = self.intercept;
        for feature in &self.features {
            let value = collector
                .get(&feature.name, index)
                .ok_or_else(|| PredictError::MissingFeature {
                    feature: feature.name.clone(),
                    index,
                })?;
            score += feature.weight * value;
        }
        if !score.is_finite() {
            return Err(PredictError::NonFinite {
                model: self.name.clone(),
                index,
            });
        }
        Ok(match self.clamp {
            Some(range) => score.clamp(range.min, range.max),
            None => score,
        })
    }
}
