// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cpu;

pub use cpu::{CpuCapabilities, CpuFeature, CpuMask};
