// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Extraction orchestration.
//!
//! [`Session`] owns the feature collector and the extractor bindings and, when
//! configured with worker threads, a [`WorkerPool`] and a [`ContextPool`].
//! Frames are dispatched to every binding that runs at their index, either on
//! the caller's thread or as queued [`ExtractionTask`](task::ExtractionTask)s.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vmaf_rc::engine::{PoolingMethod, Session, SessionConfig};
//! use vmaf_rc::extractors::ExtractorRegistry;
//! use vmaf_rc::frame::{Picture, PictureGeometry};
//! use vmaf_rc::model::LinearModel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ExtractorRegistry::builtin());
//! let model = LinearModel::new("psnr_only", 0.0).with_feature("psnr_y", 1.0);
//!
//! let mut session = Session::init(SessionConfig::new(2, 1), registry)?;
//! session.use_features_from_model(&model)?;
//!
//! let geometry = PictureGeometry::new(8, 8, 8);
//! for index in 0..4 {
//!     let reference = Picture::filled(geometry, 100)?;
//!     let distorted = Picture::filled(geometry, 98)?;
//!     session.submit_frame_pair(reference, distorted, index)?;
//! }
//!
//! let score = session.score_pooled(&model, PoolingMethod::Mean, 0, 4)?;
//! assert!(score > 40.0);
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod context_pool;
mod error_latch;
pub mod pooling;
pub mod session;
mod task;
pub mod worker_pool;
#[cfg(test)]
mod integration_tests;

pub use context::ExtractorContext;
pub use context_pool::ContextPool;
pub use pooling::{PooledAccumulator, PoolingMethod};
pub use session::{Session, SessionConfig};
pub use worker_pool::WorkerPool;
