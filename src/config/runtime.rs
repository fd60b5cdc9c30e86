// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::engine::{PoolingMethod, Session};
use crate::errors::ConfigError;
use crate::extractors::ExtractorRegistry;
use crate::model::LinearModel;

/// Session builder - turns a configuration into a ready-to-feed session.
///
/// Starts the session in the configured mode, loads the model if one is
/// given, binds the model's features and then the configured extra features.
///
/// # Examples
///
/// ## Building a session from configuration
/// ```
/// use std::sync::Arc;
/// use vmaf_rc::config::{Config, RuntimeBuilder};
/// use vmaf_rc::engine::PoolingMethod;
/// use vmaf_rc::extractors::ExtractorRegistry;
///
/// let config = Config {
///     threads: 2,
///     features: vec!["psnr".to_string()],
///     ..Config::default()
/// };
///
/// let (session, model, pooling) =
///     RuntimeBuilder::from_config(&config, Arc::new(ExtractorRegistry::builtin())).unwrap();
///
/// assert!(session.is_concurrent());
/// assert_eq!(session.binding_count(), 1);
/// assert!(model.is_none());
/// assert_eq!(pooling, PoolingMethod::Mean);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a session from configuration.
    ///
    /// # Returns
    /// A tuple of (Session, optional LinearModel, PoolingMethod)
    pub fn from_config(
        cfg: &Config,
        registry: Arc<ExtractorRegistry>,
    ) -> Result<(Session, Option<LinearModel>, PoolingMethod), ConfigError> {
        let model = cfg.model.as_ref().map(LinearModel::load).transpose()?;

        let mut session = Session::init(cfg.session_config(), registry)?;
        if let Some(model) = &model {
            session.use_features_from_model(model)?;
        }
        for feature in &cfg.features {
            session.use_feature(feature)?;
        }
        Ok((session, model, cfg.pooling))
    }
}
