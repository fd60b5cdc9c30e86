// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod collaborator;
mod config;
mod session;

pub use collaborator::{CollectorError, ExtractorError, PoolError, PredictError};
pub use config::{ConfigError, ValidationError};
pub use session::SessionError;
