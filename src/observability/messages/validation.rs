// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration passed validation.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationCompleted {
    pub feature_count: usize,
    pub threads: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validated: {} extra feature(s), {} thread(s)",
            self.feature_count, self.threads
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::info!(
            feature_count = self.feature_count,
            threads = self.threads,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("validation", span_name = name)
    }
}

/// Configuration failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use vmaf_rc::observability::messages::validation::ValidationFailed;
///
/// let msg = ValidationFailed { error_count: 2 };
/// assert_eq!(msg.to_string(), "Configuration validation failed with 2 error(s)");
/// ```
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration validation failed with {} error(s)", self.error_count)
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("validation_failed", span_name = name, error_count = self.error_count)
    }
}
