// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod motion;
mod psnr;

pub use motion::MotionExtractor;
pub use psnr::PsnrExtractor;

use super::ExtractorDescriptor;
use crate::errors::ExtractorError;
use crate::frame::{Picture, PictureGeometry};

/// Descriptors for every built-in extractor, in registry order.
pub fn descriptors() -> Vec<ExtractorDescriptor> {
    vec![psnr::descriptor(), motion::descriptor()]
}

/// Check that a pair agrees with itself and with the geometry the extractor
/// was initialized with.
pub(crate) fn check_pair(
    expected: Option<PictureGeometry>,
    reference: &Picture,
    distorted: &Picture,
) -> Result<PictureGeometry, ExtractorError> {
    let geometry = reference.geometry();
    if distorted.geometry() != geometry {
        return Err(ExtractorError::PairMismatch {
            reference: geometry,
            distorted: distorted.geometry(),
        });
    }
    match expected {
        Some(expected) if expected != geometry => Err(ExtractorError::GeometryMismatch {
            expected,
            actual: geometry,
        }),
        _ => Ok(geometry),
    }
}

/// Sum of `f(a, b)` over paired samples. The wide path accumulates in 16
/// independent lanes so the compiler can vectorize it; integer sums make both
/// paths bit-identical.
pub(crate) fn sum_pairs(a: &[u16], b: &[u16], wide: bool, f: impl Fn(u16, u16) -> u64) -> u64 {
    if !wide {
        return a.iter().zip(b).map(|(&x, &y)| f(x, y)).sum();
    }

    let mut lanes = [0u64; 16];
    let chunks_a = a.chunks_exact(16);
    let chunks_b = b.chunks_exact(16);
    let tail: u64 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(&x, &y)| f(x, y))
        .sum();
    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..16 {
            lanes[lane] += f(ca[lane], cb[lane]);
        }
    }
    lanes.iter().sum::<u64>() + tail
}
