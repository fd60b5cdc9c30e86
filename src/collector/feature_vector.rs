// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};

/// Sparse per-index storage for one feature. Memory follows the number of
/// entries written, not the largest index.
#[derive(Debug, Default)]
pub(super) struct FeatureVector {
    values: BTreeMap<u32, f64>,
}

impl FeatureVector {
    /// Returns false if `index` already holds a value.
    pub fn insert(&mut self, index: u32, value: f64) -> bool {
        match self.values.entry(index) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn get(&self, index: u32) -> Option<f64> {
        self.values.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.values.iter().map(|(&i, &v)| (i, v))
    }
}
