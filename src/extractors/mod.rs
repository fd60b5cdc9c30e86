// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feature extractor descriptors, the registry that resolves them, and the
//! extractors that ship with the engine.
//!
//! # Architecture
//!
//! ```text
//! feature name ──► ExtractorRegistry ──► ExtractorDescriptor ──► ExtractorFactory
//!                                              │                        │
//!                                        flags (temporal)        Box<dyn FeatureExtractor>
//! ```
//!
//! The registry is a plain value owned by the caller and shared with sessions
//! through an `Arc`; nothing here is process-global.
//!
//! # Built-in extractors
//! * `psnr` - luma PSNR, produces `psnr_y`
//! * `motion` - temporal mean absolute luma difference, produces `motion_score`

pub mod builtin;
mod descriptor;
mod registry;
#[cfg(test)]
pub mod stub;

pub use descriptor::{ExtractorDescriptor, ExtractorFlags};
pub use registry::ExtractorRegistry;
