// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{CollectorError, ExtractorError, PoolError, PredictError};

/// Every error a [`Session`](crate::engine::Session) call can return.
///
/// Three classes matter to callers:
/// * `InvalidArgument` - malformed input, returned synchronously, never retried
/// * `ResourceExhausted` - setup could not allocate a pool or thread; nothing
///   partially built survives
/// * everything else - a collaborator failed and its error is carried verbatim
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("extractor '{extractor}' could not be created: {source}")]
    ExtractorInit {
        extractor: String,
        #[source]
        source: ExtractorError,
    },

    #[error("extractor '{extractor}' failed at index {index}: {source}")]
    Extractor {
        extractor: String,
        index: u32,
        #[source]
        source: ExtractorError,
    },

    #[error("extractor '{extractor}' failed to close: {source}")]
    ExtractorClose {
        extractor: String,
        #[source]
        source: ExtractorError,
    },

    #[error("extraction task for '{extractor}' at index {index} panicked")]
    TaskPanicked { extractor: String, index: u32 },

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SessionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SessionError::InvalidArgument(reason.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SessionError::InvalidArgument(_))
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, SessionError::ResourceExhausted(_))
    }
}
