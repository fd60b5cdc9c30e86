// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concurrent store of per-frame feature values.
//!
//! Entries are keyed by (feature name, frame index). Each feature name owns its
//! own lock, so worker threads writing different features never contend, and
//! the outer map is only write-locked the first time a name is seen.

mod feature_vector;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::errors::CollectorError;
use feature_vector::FeatureVector;

#[derive(Default)]
pub struct FeatureCollector {
    features: RwLock<HashMap<String, Arc<Mutex<FeatureVector>>>>,
}

impl FeatureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn vector(&self, name: &str) -> Option<Arc<Mutex<FeatureVector>>> {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        features.get(name).cloned()
    }

    fn vector_or_insert(&self, name: &str) -> Arc<Mutex<FeatureVector>> {
        if let Some(existing) = self.vector(name) {
            return existing;
        }
        let mut features = self.features.write().unwrap_or_else(|e| e.into_inner());
        features
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(FeatureVector::default())))
            .clone()
    }

    /// Store `value` for `name` at `index`.
    ///
    /// Each (name, index) may be written once; a second write is a
    /// `DuplicateEntry` and leaves the first value in place.
    pub fn append(&self, name: &str, value: f64, index: u32) -> Result<(), CollectorError> {
        if name.is_empty() {
            return Err(CollectorError::EmptyName);
        }
        if !value.is_finite() {
            return Err(CollectorError::NonFinite {
                name: name.to_string(),
                index,
            });
        }

        let vector = self.vector_or_insert(name);
        let mut vector = vector.lock().unwrap_or_else(|e| e.into_inner());
        if !vector.insert(index, value) {
            return Err(CollectorError::DuplicateEntry {
                name: name.to_string(),
                index,
            });
        }
        Ok(())
    }

    pub fn get(&self, name: &str, index: u32) -> Option<f64> {
        let vector = self.vector(name)?;
        let vector = vector.lock().unwrap_or_else(|e| e.into_inner());
        vector.get(index)
    }

    pub fn contains(&self, name: &str, index: u32) -> bool {
        self.get(name, index).is_some()
    }

    /// Values for `name` over `[low, high)`; `None` where nothing was written.
    pub fn range(&self, name: &str, low: u32, high: u32) -> Vec<Option<f64>> {
        match self.vector(name) {
            Some(vector) => {
                let vector = vector.lock().unwrap_or_else(|e| e.into_inner());
                (low..high).map(|i| vector.get(i)).collect()
            }
            None => vec![None; high.saturating_sub(low) as usize],
        }
    }

    /// Feature names in lexicographic order.
    pub fn feature_names(&self) -> Vec<String> {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = features.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every index written for any feature, ascending.
    pub fn frame_indices(&self) -> BTreeSet<u32> {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        let mut indices = BTreeSet::new();
        for vector in features.values() {
            indices.extend(vector.lock().unwrap_or_else(|e| e.into_inner()).indices());
        }
        indices
    }

    /// Total number of stored entries across all features.
    pub fn len(&self) -> usize {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        features
            .values()
            .map(|v| v.lock().unwrap_or_else(|e| e.into_inner()).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry as `(name, index, value)`, sorted by name then index.
    pub fn snapshot(&self) -> Vec<(String, u32, f64)> {
        let mut entries = Vec::new();
        for name in self.feature_names() {
            if let Some(vector) = self.vector(&name) {
                let vector = vector.lock().unwrap_or_else(|e| e.into_inner());
                entries.extend(vector.iter().map(|(i, v)| (name.clone(), i, v)));
            }
        }
        entries
    }
}

impl std::fmt::Debug for FeatureCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCollector")
            .field("features", &self.feature_names())
            .field("entries", &self.len())
            .finish()
    }
}
