// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::ExtractorDescriptor;
use crate::errors::SessionError;

/// Lookup table from extractor names and produced feature names to
/// descriptors.
///
/// # Examples
/// ```
/// use vmaf_rc::extractors::ExtractorRegistry;
///
/// let registry = ExtractorRegistry::builtin();
/// assert!(registry.by_name("psnr").is_some());
/// assert_eq!(registry.by_feature_name("motion_score").unwrap().name(), "motion");
/// ```
#[derive(Default)]
pub struct ExtractorRegistry {
    descriptors: Vec<Arc<ExtractorDescriptor>>,
    by_name: HashMap<String, usize>,
    by_feature: HashMap<String, usize>,
}

impl ExtractorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every extractor that ships with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::descriptors() {
            // builtin names and features are distinct
            let _ = registry.register(descriptor);
        }
        registry
    }

    /// Add a descriptor. Extractor names and produced feature names must both
    /// be unique across the registry.
    pub fn register(&mut self, descriptor: ExtractorDescriptor) -> Result<(), SessionError> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(SessionError::invalid(format!(
                "extractor '{}' is already registered",
                descriptor.name()
            )));
        }
        if let Some(feature) = descriptor
            .provided_features()
            .iter()
            .find(|f| self.by_feature.contains_key(f.as_str()))
        {
            return Err(SessionError::invalid(format!(
                "feature '{}' is already provided by another extractor",
                feature
            )));
        }

        let slot = self.descriptors.len();
        self.by_name.insert(descriptor.name().to_string(), slot);
        for feature in descriptor.provided_features() {
            self.by_feature.insert(feature.clone(), slot);
        }
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<ExtractorDescriptor>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.descriptors[i]))
    }

    pub fn by_feature_name(&self, feature: &str) -> Option<Arc<ExtractorDescriptor>> {
        self.by_feature.get(feature).map(|&i| Arc::clone(&self.descriptors[i]))
    }

    /// Extractor names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extractors", &self.names())
            .finish()
    }
}
