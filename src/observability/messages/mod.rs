// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it with structured fields at its intended level.
//!
//! * `session` - session lifecycle, registration, dispatch and pooling events
//! * `pool` - worker pool and context pool events
//! * `validation` - configuration validation results

use tracing::Span;

pub mod pool;
pub mod session;
pub mod validation;

/// Emit a message as a structured `tracing` event or span.
pub trait StructuredLog {
    /// Log at the level the message is meant for, with its fields attached.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
