// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::PoolingMethod;

/// Upper bound on worker threads a configuration may request
pub const MAX_THREADS: usize = 128;
/// Upper bound on the subsample stride
pub const MAX_SUBSAMPLE: u32 = 1024;
/// Subsample stride when the configuration does not give one (every frame)
pub const DEFAULT_SUBSAMPLE: u32 = 1;
/// Bit depth assumed for raw input when the frame section omits it
pub const DEFAULT_BIT_DEPTH: u8 = 8;
/// Pooling method when the configuration does not give one
pub const DEFAULT_POOLING: PoolingMethod = PoolingMethod::Mean;
