// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for diagnostic and operational
//! logging throughout the engine. Message types follow a struct-based pattern
//! with `Display` implementations so log text lives in one place and every event
//! carries the same structured fields wherever it is emitted.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::session` - session lifecycle, registration, dispatch and pooling
//! * `messages::pool` - worker threads and extractor context pooling
//! * `messages::validation` - configuration validation
//!
//! # Usage
//!
//! ```rust
//! use vmaf_rc::observability::messages::session::ExtractionFailed;
//! use vmaf_rc::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = ExtractionFailed {
//!     extractor: "psnr",
//!     index: 12,
//!     error: &error,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
