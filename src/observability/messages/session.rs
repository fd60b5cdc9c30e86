// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for session lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Session creation and teardown
//! * Extractor registration
//! * Per-frame dispatch and extraction failures
//! * Finalization and pooled scoring

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Session created.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use vmaf_rc::observability::messages::session::SessionInitialized;
///
/// let msg = SessionInitialized {
///     threads: 4,
///     subsample: 1,
///     capabilities: "sse2+avx2",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SessionInitialized<'a> {
    pub threads: usize,
    pub subsample: u32,
    pub capabilities: &'a str,
}

impl Display for SessionInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.threads > 0 { "concurrent" } else { "synchronous" };
        write!(
            f,
            "Session initialized in {} mode: threads={}, subsample={}, cpu={}",
            mode, self.threads, self.subsample, self.capabilities
        )
    }
}

impl StructuredLog for SessionInitialized<'_> {
    fn log(&self) {
        tracing::info!(
            threads = self.threads,
            subsample = self.subsample,
            capabilities = self.capabilities,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "session",
            span_name = name,
            threads = self.threads,
            subsample = self.subsample,
        )
    }
}

/// Extractor bound to the session.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExtractorRegistered<'a> {
    pub extractor: &'a str,
    pub temporal: bool,
    pub binding_count: usize,
}

impl Display for ExtractorRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Extractor '{}' registered (temporal={}), {} binding(s) active",
            self.extractor, self.temporal, self.binding_count
        )
    }
}

impl StructuredLog for ExtractorRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            extractor = self.extractor,
            temporal = self.temporal,
            binding_count = self.binding_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "extractor_registered",
            span_name = name,
            extractor = self.extractor,
        )
    }
}

/// A freshly created context was closed because its binding could not be
/// stored.
///
/// # Log Level
/// `warn!` - Registration rolled back
pub struct RegistrationRolledBack<'a> {
    pub extractor: &'a str,
    pub reason: &'a str,
}

impl Display for RegistrationRolledBack<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registration of extractor '{}' rolled back: {}",
            self.extractor, self.reason
        )
    }
}

impl StructuredLog for RegistrationRolledBack<'_> {
    fn log(&self) {
        tracing::warn!(
            extractor = self.extractor,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "registration_rolled_back",
            span_name = name,
            extractor = self.extractor,
        )
    }
}

/// Frame pair handed to the active bindings.
///
/// # Log Level
/// `debug!` - Per-frame event
pub struct FrameSubmitted {
    pub index: u32,
    pub dispatched: usize,
    pub skipped: usize,
}

impl Display for FrameSubmitted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Frame {} dispatched to {} extractor(s), {} skipped by subsampling",
            self.index, self.dispatched, self.skipped
        )
    }
}

impl StructuredLog for FrameSubmitted {
    fn log(&self) {
        tracing::debug!(
            index = self.index,
            dispatched = self.dispatched,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("frame", span_name = name, index = self.index)
    }
}

/// Extraction failed for one extractor on one frame.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use vmaf_rc::observability::messages::session::ExtractionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ExtractionFailed {
///     extractor: "motion",
///     index: 3,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ExtractionFailed<'a> {
    pub extractor: &'a str,
    pub index: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExtractionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Extractor '{}' failed at index {}: {}",
            self.extractor, self.index, self.error
        )
    }
}

impl StructuredLog for ExtractionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            extractor = self.extractor,
            index = self.index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "extraction_failed",
            span_name = name,
            extractor = self.extractor,
            index = self.index,
        )
    }
}

/// Finalization finished: tasks drained, contexts closed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SessionFinalized {
    pub binding_count: usize,
    pub pooled_contexts: usize,
    pub duration: Duration,
}

impl Display for SessionFinalized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Session finalized: {} binding(s) and {} pooled context(s) closed in {:?}",
            self.binding_count, self.pooled_contexts, self.duration
        )
    }
}

impl StructuredLog for SessionFinalized {
    fn log(&self) {
        tracing::info!(
            binding_count = self.binding_count,
            pooled_contexts = self.pooled_contexts,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("finalization", span_name = name)
    }
}

/// Pooled score computed over an index range.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PooledScoreComputed<'a> {
    pub model: &'a str,
    pub method: &'a str,
    pub index_low: u32,
    pub index_high: u32,
    pub included: u32,
    pub score: f64,
}

impl Display for PooledScoreComputed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pooled {} score for model '{}' over [{}, {}) from {} frame(s): {:.6}",
            self.method, self.model, self.index_low, self.index_high, self.included, self.score
        )
    }
}

impl StructuredLog for PooledScoreComputed<'_> {
    fn log(&self) {
        tracing::info!(
            model = self.model,
            method = self.method,
            index_low = self.index_low,
            index_high = self.index_high,
            included = self.included,
            score = self.score,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pooled_score",
            span_name = name,
            model = self.model,
            method = self.method,
        )
    }
}

/// Session torn down.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SessionClosed {
    pub binding_count: usize,
    pub feature_entries: usize,
}

impl Display for SessionClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Session closed: {} binding(s), {} feature entries collected",
            self.binding_count, self.feature_entries
        )
    }
}

impl StructuredLog for SessionClosed {
    fn log(&self) {
        tracing::info!(
            binding_count = self.binding_count,
            feature_entries = self.feature_entries,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("session_closed", span_name = name)
    }
}
