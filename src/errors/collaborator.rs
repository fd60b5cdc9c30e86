// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the collaborators the session drives: extractors, the
//! feature collector, quality models and the context/worker pools.
//!
//! These are carried unchanged inside [`SessionError`](super::SessionError) so
//! callers can match on the original failure.

use thiserror::Error;

use crate::frame::PictureGeometry;

/// Failure inside a single feature extractor.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The extractor could not set up its state for the first picture.
    #[error("extractor '{extractor}' failed to initialize: {reason}")]
    Init { extractor: String, reason: String },

    /// A picture did not match the geometry the context was initialized with.
    #[error("picture geometry mismatch: expected {expected}, got {actual}")]
    GeometryMismatch {
        expected: PictureGeometry,
        actual: PictureGeometry,
    },

    /// Reference and distorted pictures disagree on geometry.
    #[error("reference is {reference} but distorted is {distorted}")]
    PairMismatch {
        reference: PictureGeometry,
        distorted: PictureGeometry,
    },

    /// Extractor-specific failure.
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Collector(#[from] CollectorError),
}

/// Failure writing to the feature collector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectorError {
    #[error("feature '{name}' already has a value at index {index}")]
    DuplicateEntry { name: String, index: u32 },

    #[error("feature name must not be empty")]
    EmptyName,

    #[error("feature '{name}' got a non-finite value at index {index}")]
    NonFinite { name: String, index: u32 },
}

/// Failure producing a score from collected features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("feature '{feature}' is missing at index {index}")]
    MissingFeature { feature: String, index: u32 },

    #[error("model '{model}' produced a non-finite score at index {index}")]
    NonFinite { model: String, index: u32 },
}

/// Failure in the context pool or worker pool.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("pool has been closed")]
    Closed,

    #[error("{outstanding} context(s) for extractor '{extractor}' are still checked out")]
    ContextsOutstanding { extractor: String, outstanding: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}
