// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! CPU capability detection.
//!
//! Capabilities are detected once when a session starts, masked by the
//! configuration, and handed to every extractor factory as a plain value.

use serde::Deserialize;
use std::fmt;

/// An instruction set extension an extractor may choose a code path for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuFeature {
    Sse2,
    Avx2,
    Avx512,
}

/// Features to treat as absent even when the host has them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CpuMask(pub Vec<CpuFeature>);

impl CpuMask {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Mask out every known extension, forcing scalar paths.
    pub fn all() -> Self {
        Self(vec![CpuFeature::Sse2, CpuFeature::Avx2, CpuFeature::Avx512])
    }

    pub fn masks(&self, feature: CpuFeature) -> bool {
        self.0.contains(&feature)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCapabilities {
    pub sse2: bool,
    pub avx2: bool,
    pub avx512: bool,
}

impl CpuCapabilities {
    /// Capabilities with every extension disabled.
    pub fn scalar() -> Self {
        Self::default()
    }

    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        Self {
            sse2: std::arch::is_x86_feature_detected!("sse2"),
            avx2: std::arch::is_x86_feature_detected!("avx2"),
            avx512: std::arch::is_x86_feature_detected!("avx512f")
                && std::arch::is_x86_feature_detected!("avx512bw"),
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub fn detect() -> Self {
        Self::scalar()
    }

    pub fn masked(self, mask: &CpuMask) -> Self {
        Self {
            sse2: self.sse2 && !mask.masks(CpuFeature::Sse2),
            avx2: self.avx2 && !mask.masks(CpuFeature::Avx2),
            avx512: self.avx512 && !mask.masks(CpuFeature::Avx512),
        }
    }

    pub fn has(&self, feature: CpuFeature) -> bool {
        match feature {
            CpuFeature::Sse2 => self.sse2,
            CpuFeature::Avx2 => self.avx2,
            CpuFeature::Avx512 => self.avx512,
        }
    }
}

impl fmt::Display for CpuCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.sse2 {
            names.push("sse2");
        }
        if self.avx2 {
            names.push("avx2");
        }
        if self.avx512 {
            names.push("avx512");
        }
        if names.is_empty() {
            write!(f, "scalar")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}
