// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Frame buffers handed to the engine.
//!
//! A [`Picture`] is a shared-ownership handle over one luma plane. Cloning a
//! handle acquires a reference, dropping it releases one, and the sample
//! storage goes away with the last handle. The session relies on exactly this
//! to hand each queued extraction task its own references.

mod picture;
mod yuv_reader;

pub use picture::{Picture, PictureGeometry};
pub use yuv_reader::YuvReader;
