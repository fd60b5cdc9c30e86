// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod collector;     // per-frame feature store
pub mod config;        // config loading + session builder
pub mod engine;        // session, pools, dispatch
pub mod errors;        // error handling
pub mod extractors;    // descriptors, registry, built-in extractors
pub mod frame;         // shared picture buffers + raw input
pub mod model;         // quality models
pub mod observability;
pub mod output;        // report writers
pub mod traits;        // extractor and model seams
pub mod utils;         // cpu capabilities

/// Version string reported in output documents.
pub fn version() -> &'static str {
    "RELEASE_CANDIDATE"
}
