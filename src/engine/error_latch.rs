// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::errors::SessionError;

/// Holds the first error reported by a background task.
///
/// Later errors are dropped until the latched one is taken.
#[derive(Debug, Default)]
pub struct ErrorLatch {
    tripped: AtomicBool,
    error: Mutex<Option<SessionError>>,
}

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `error` became the latched error.
    pub fn record(&self, error: SessionError) -> bool {
        if self
            .tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        *self.error.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
        true
    }

    #[cfg(test)]
    pub(crate) fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Take the latched error and re-arm the latch.
    ///
    /// Only meaningful once the tasks that may record have been drained.
    pub fn take(&self) -> Option<SessionError> {
        let error = self.error.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.tripped.store(false, Ordering::Release);
        error
    }
}
