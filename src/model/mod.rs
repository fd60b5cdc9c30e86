// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Quality models that turn collected features into per-frame scores.

mod linear;

pub use linear::{FeatureWeight, LinearModel, ScoreRange};
