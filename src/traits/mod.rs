// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod extractor;
pub mod model;

pub use extractor::{ExtractorFactory, FeatureExtractor};
pub use model::QualityModel;
