// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Aggregation of per-frame scores into one pooled value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolingMethod {
    #[default]
    Mean,
    Min,
    HarmonicMean,
}

impl PoolingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolingMethod::Mean => "mean",
            PoolingMethod::Min => "min",
            PoolingMethod::HarmonicMean => "harmonic_mean",
        }
    }
}

impl fmt::Display for PoolingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolingMethod {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(PoolingMethod::Mean),
            "min" => Ok(PoolingMethod::Min),
            "harmonic_mean" | "harmonic-mean" => Ok(PoolingMethod::HarmonicMean),
            other => Err(SessionError::invalid(format!("unknown pooling method '{}'", other))),
        }
    }
}

/// Whether frame `index` takes part in pooling and output at this stride.
pub fn is_selected(subsample: u32, index: u32) -> bool {
    subsample <= 1 || index % subsample == 0
}

/// Running totals for every pooling method at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledAccumulator {
    count: u32,
    sum: f64,
    harmonic_sum: f64,
    min: f64,
    max: f64,
}

impl Default for PooledAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            harmonic_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl PooledAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, score: f64) {
        self.count += 1;
        self.sum += score;
        self.harmonic_sum += 1.0 / (score + 1.0);
        self.min = self.min.min(score);
        self.max = self.max.max(score);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn harmonic_mean(&self) -> Option<f64> {
        (self.count > 0).then(|| f64::from(self.count) / self.harmonic_sum - 1.0)
    }

    /// Pooled value for `method`, or `None` if nothing was pushed.
    pub fn finish(&self, method: PoolingMethod) -> Option<f64> {
        match method {
            PoolingMethod::Mean => self.mean(),
            PoolingMethod::Min => self.min(),
            PoolingMethod::HarmonicMean => self.harmonic_mean(),
        }
    }
}

impl FromIterator<f64> for PooledAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut accumulator = Self::new();
        for score in iter {
            accumulator.push(score);
        }
        accumulator
    }
}
