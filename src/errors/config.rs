// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::SessionError;

/// Problems found while validating a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// More worker threads requested than the engine allows
    ThreadsOutOfRange { threads: usize, max: usize },
    /// Subsample stride outside `1..=max`
    SubsampleOutOfRange { subsample: u32, max: u32 },
    /// A feature name no registered extractor knows about
    UnknownFeature { name: String },
    /// The same feature listed twice
    DuplicateFeature { name: String },
    /// Frame geometry unusable for reading raw input
    InvalidFrameGeometry {
        width: u32,
        height: u32,
        bit_depth: u8,
    },
    /// Model path given but the file does not exist
    MissingModelFile { path: PathBuf },
    /// Model file parsed but its contents are unusable
    InvalidModel { model: String, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ThreadsOutOfRange { threads, max } => {
                write!(f, "threads must be at most {}, got {}", max, threads)
            }
            ValidationError::SubsampleOutOfRange { subsample, max } => {
                write!(f, "subsample must be between 1 and {}, got {}", max, subsample)
            }
            ValidationError::UnknownFeature { name } => {
                write!(f, "Feature '{}' is not provided by any registered extractor", name)
            }
            ValidationError::DuplicateFeature { name } => {
                write!(f, "Feature '{}' is listed more than once", name)
            }
            ValidationError::InvalidFrameGeometry {
                width,
                height,
                bit_depth,
            } => {
                write!(
                    f,
                    "Invalid frame geometry {}x{} at {} bits; width and height must be non-zero and bit depth 8..=16",
                    width, height, bit_depth
                )
            }
            ValidationError::MissingModelFile { path } => {
                write!(f, "Model file '{}' does not exist", path.display())
            }
            ValidationError::InvalidModel { model, reason } => {
                write!(f, "Model '{}' is invalid: {}", model, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors loading a configuration or model file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config extension for '{0}', expected .yaml, .yml or .toml")]
    UnsupportedFormat(PathBuf),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Session(#[from] SessionError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
