// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_BIT_DEPTH, DEFAULT_POOLING, DEFAULT_SUBSAMPLE};
use crate::engine::{PoolingMethod, SessionConfig};
use crate::errors::ConfigError;
use crate::extractors::ExtractorRegistry;
use crate::frame::PictureGeometry;
use crate::output::OutputFormat;
use crate::utils::CpuMask;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration for an analysis run.
///
/// Loaded from YAML or TOML, chosen by file extension.
///
/// # Fields
/// * `threads` - Worker threads; 0 runs extraction on the calling thread
/// * `subsample` - Run non-temporal extractors on every n-th frame
/// * `cpu` - CPU extensions extractors must not use
/// * `features` - Extra extractors to bind by name
/// * `model` - Optional model file; its features are bound first
/// * `pooling` - How per-frame scores are pooled
/// * `output` - Report format and destination (optional)
/// * `frame` - Raw input geometry (optional, needed by the CLI)
///
/// # Example
/// ```yaml
/// threads: 4
/// subsample: 1
/// cpu: [avx512]
/// features: [psnr]
/// model: models/psnr_motion.yaml
/// pooling: mean
/// output:
///   format: xml
///   path: out.xml
/// frame:
///   width: 576
///   height: 324
///   bit_depth: 8
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub threads: usize,
    #[serde(default = "default_subsample")]
    pub subsample: u32,
    #[serde(default)]
    pub cpu: CpuMask,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub model: Option<PathBuf>,
    #[serde(default = "default_pooling")]
    pub pooling: PoolingMethod,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub frame: Option<FrameConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            subsample: DEFAULT_SUBSAMPLE,
            cpu: CpuMask::none(),
            features: Vec::new(),
            model: None,
            pooling: DEFAULT_POOLING,
            output: OutputConfig::default(),
            frame: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.threads, self.subsample).with_cpu_mask(self.cpu.clone())
    }

    pub fn frame_geometry(&self) -> Option<PictureGeometry> {
        self.frame
            .as_ref()
            .map(|frame| PictureGeometry::new(frame.width, frame.height, frame.bit_depth))
    }
}

/// Where and how the report is written.
///
/// An unrecognized `format` is accepted and writes nothing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Geometry of raw planar input.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u8,
}

fn default_subsample() -> u32 {
    DEFAULT_SUBSAMPLE
}

fn default_pooling() -> PoolingMethod {
    DEFAULT_POOLING
}

fn default_bit_depth() -> u8 {
    DEFAULT_BIT_DEPTH
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
///
/// A relative `model` path is resolved against the config file's directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut cfg: Config = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    if let (Some(model), Some(base)) = (cfg.model.as_mut(), path.parent()) {
        if model.is_relative() {
            *model = base.join(&*model);
        }
    }
    Ok(cfg)
}

/// Load a config and check it against `registry`.
///
/// Every validation problem is reported at once.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
    registry: &ExtractorRegistry,
) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg, registry).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
