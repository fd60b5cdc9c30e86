// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Checks run independently and every problem found is returned together, so
//! a user can fix a configuration in one pass:
//!
//! 1. **Ranges**: `threads` and `subsample` within engine limits
//! 2. **Features**: every extra feature names a registered extractor, once
//! 3. **Frame geometry**: non-zero dimensions and a supported bit depth
//! 4. **Model**: the model file exists
//!
//! # Example
//! ```rust
//! use vmaf_rc::config::{validate_config, Config};
//! use vmaf_rc::errors::ValidationError;
//! use vmaf_rc::extractors::ExtractorRegistry;
//!
//! let registry = ExtractorRegistry::builtin();
//! let config = Config {
//!     features: vec!["psnr".to_string(), "vif".to_string()],
//!     ..Config::default()
//! };
//!
//! let errors = validate_config(&config, &registry).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::UnknownFeature { name: "vif".to_string() }]);
//! ```

use std::collections::HashSet;

use crate::config::consts::{MAX_SUBSAMPLE, MAX_THREADS};
use crate::config::Config;
use crate::errors::ValidationError;
use crate::extractors::ExtractorRegistry;
use crate::observability::messages::validation::{ValidationCompleted, ValidationFailed};
use crate::observability::messages::StructuredLog;

/// Validate `config` against engine limits and the extractors in `registry`.
pub fn validate_config(config: &Config, registry: &ExtractorRegistry) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(validate_ranges(config));
    errors.extend(validate_features(config, registry));
    errors.extend(validate_frame(config));
    errors.extend(validate_model_path(config));

    if errors.is_empty() {
        ValidationCompleted {
            feature_count: config.features.len(),
            threads: config.threads,
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_ranges(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if config.threads > MAX_THREADS {
        errors.push(ValidationError::ThreadsOutOfRange {
            threads: config.threads,
            max: MAX_THREADS,
        });
    }
    if config.subsample == 0 || config.subsample > MAX_SUBSAMPLE {
        errors.push(ValidationError::SubsampleOutOfRange {
            subsample: config.subsample,
            max: MAX_SUBSAMPLE,
        });
    }
    errors
}

fn validate_features(config: &Config, registry: &ExtractorRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for name in &config.features {
        if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateFeature { name: name.clone() });
        } else if registry.by_name(name).is_none() {
            errors.push(ValidationError::UnknownFeature { name: name.clone() });
        }
    }
    errors
}

fn validate_frame(config: &Config) -> Option<ValidationError> {
    let frame = config.frame.as_ref()?;
    let geometry = config.frame_geometry()?;
    if geometry.is_valid() {
        return None;
    }
    Some(ValidationError::InvalidFrameGeometry {
        width: frame.width,
        height: frame.height,
        bit_depth: frame.bit_depth,
    })
}

fn validate_model_path(config: &Config) -> Option<ValidationError> {
    let path = config.model.as_ref()?;
    if path.is_file() {
        return None;
    }
    Some(ValidationError::MissingModelFile { path: path.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameConfig;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default(), &ExtractorRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_individual_violations() {
        struct TestCase {
            name: &'static str,
            config: Config,
            expected: Vec<ValidationError>,
        }

        let test_cases = vec![
            TestCase {
                name: "too many threads",
                config: Config {
                    threads: MAX_THREADS + 1,
                    ..Config::default()
                },
                expected: vec![ValidationError::ThreadsOutOfRange {
                    threads: MAX_THREADS + 1,
                    max: MAX_THREADS,
                }],
            },
            TestCase {
                name: "zero subsample",
                config: Config {
                    subsample: 0,
                    ..Config::default()
                },
                expected: vec![ValidationError::SubsampleOutOfRange {
                    subsample: 0,
                    max: MAX_SUBSAMPLE,
                }],
            },
            TestCase {
                name: "unknown and duplicate features",
                config: Config {
                    features: vec!["motion".into(), "ssim".into(), "motion".into()],
                    ..Config::default()
                },
                expected: vec![
                    ValidationError::UnknownFeature { name: "ssim".into() },
                    ValidationError::DuplicateFeature { name: "motion".into() },
                ],
            },
            TestCase {
                name: "bad bit depth",
                config: Config {
                    frame: Some(FrameConfig {
                        width: 16,
                        height: 16,
                        bit_depth: 7,
                    }),
                    ..Config::default()
                },
                expected: vec![ValidationError::InvalidFrameGeometry {
                    width: 16,
                    height: 16,
                    bit_depth: 7,
                }],
            },
            TestCase {
                name: "zero width",
                config: Config {
                    frame: Some(FrameConfig {
                        width: 0,
                        height: 16,
                        bit_depth: 8,
                    }),
                    ..Config::default()
                },
                expected: vec![ValidationError::InvalidFrameGeometry {
                    width: 0,
                    height: 16,
                    bit_depth: 8,
                }],
            },
            TestCase {
                name: "missing model",
                config: Config {
                    model: Some(PathBuf::from("/nonexistent/model.yaml")),
                    ..Config::default()
                },
                expected: vec![ValidationError::MissingModelFile {
                    path: PathBuf::from("/nonexistent/model.yaml"),
                }],
            },
        ];

        let registry = ExtractorRegistry::builtin();
        for case in test_cases {
            let errors = validate_config(&case.config, &registry).unwrap_err();
            assert_eq!(errors, case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_errors_accumulate() {
        let config = Config {
            threads: 500,
            subsample: 5000,
            features: vec!["nope".into()],
            ..Config::default()
        };
        let errors = validate_config(&config, &ExtractorRegistry::builtin()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
