// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::errors::SessionError;

/// Width, height and bits per component of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureGeometry {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
}

impl PictureGeometry {
    pub fn new(width: u32, height: u32, bit_depth: u8) -> Self {
        Self {
            width,
            height,
            bit_depth,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Largest representable sample value, `2^bit_depth - 1`.
    pub fn peak(&self) -> u32 {
        (1u32 << self.bit_depth) - 1
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && (8..=16).contains(&self.bit_depth)
    }
}

impl fmt::Display for PictureGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}bit", self.width, self.height, self.bit_depth)
    }
}

struct PictureData {
    geometry: PictureGeometry,
    luma: Vec<u16>,
}

/// Reference-counted luma plane.
///
/// `clone()` acquires a reference and `drop` releases it; there is no other
/// way to free the samples. Handles are `Send + Sync` so extraction tasks can
/// carry their own copies onto worker threads.
#[derive(Clone)]
pub struct Picture {
    data: Arc<PictureData>,
}

impl Picture {
    /// Build a picture from row-major luma samples.
    ///
    /// Fails with `InvalidArgument` when the geometry is unusable, the sample
    /// count does not match, or a sample exceeds the bit depth.
    pub fn new(geometry: PictureGeometry, luma: Vec<u16>) -> Result<Self, SessionError> {
        if !geometry.is_valid() {
            return Err(SessionError::invalid(format!("invalid picture geometry {}", geometry)));
        }
        if luma.len() != geometry.sample_count() {
            return Err(SessionError::invalid(format!(
                "picture {} needs {} samples, got {}",
                geometry,
                geometry.sample_count(),
                luma.len()
            )));
        }
        let peak = geometry.peak();
        if let Some(bad) = luma.iter().find(|&&s| u32::from(s) > peak) {
            return Err(SessionError::invalid(format!(
                "sample {} exceeds {}-bit range",
                bad, geometry.bit_depth
            )));
        }

        Ok(Self {
            data: Arc::new(PictureData { geometry, luma }),
        })
    }

    /// Convenience constructor for 8-bit content.
    pub fn from_u8(width: u32, height: u32, luma: &[u8]) -> Result<Self, SessionError> {
        Self::new(
            PictureGeometry::new(width, height, 8),
            luma.iter().map(|&s| u16::from(s)).collect(),
        )
    }

    /// A picture with every sample set to `value`.
    pub fn filled(geometry: PictureGeometry, value: u16) -> Result<Self, SessionError> {
        Self::new(geometry, vec![value; geometry.sample_count()])
    }

    pub fn geometry(&self) -> PictureGeometry {
        self.data.geometry
    }

    pub fn luma(&self) -> &[u16] {
        &self.data.luma
    }

    /// Number of live handles sharing this picture's storage.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    /// True when both handles point at the same storage.
    pub fn same_buffer(&self, other: &Picture) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picture")
            .field("geometry", &self.data.geometry)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
