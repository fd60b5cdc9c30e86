// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded pool of reusable extractor contexts, keyed by descriptor name.
//!
//! Contexts are created lazily on `acquire` until a descriptor reaches its
//! capacity, after which `acquire` blocks until another caller releases one.
//! A checked-out context is moved out of the pool, so no two callers can ever
//! hold the same instance.
//!
//! Capacity is the pool width for ordinary descriptors and 1 for temporal
//! ones. A temporal extractor therefore sees frames one at a time in the
//! order they were dispatched, with its state carried from frame to frame.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::collector::FeatureCollector;
use crate::errors::{PoolError, SessionError};
use crate::extractors::ExtractorDescriptor;
use crate::observability::messages::pool::{ContextPoolClosed, PooledContextCreated};
use crate::observability::messages::StructuredLog;
use crate::utils::CpuCapabilities;

use super::context::ExtractorContext;

struct Slot {
    idle: Vec<ExtractorContext>,
    created: usize,
    outstanding: usize,
    capacity: usize,
}

#[derive(Default)]
struct PoolState {
    slots: HashMap<String, Slot>,
    closed: bool,
}

pub struct ContextPool {
    width: usize,
    capabilities: CpuCapabilities,
    state: Mutex<PoolState>,
    released: Condvar,
}

impl ContextPool {
    pub fn new(width: usize, capabilities: CpuCapabilities) -> Result<Self, SessionError> {
        if width == 0 {
            return Err(SessionError::invalid("context pool width must be at least 1"));
        }
        Ok(Self {
            width,
            capabilities,
            state: Mutex::new(PoolState::default()),
            released: Condvar::new(),
        })
    }

    /// Contexts a descriptor may have alive at once.
    pub fn capacity_for(&self, descriptor: &ExtractorDescriptor) -> usize {
        if descriptor.is_temporal() {
            1
        } else {
            self.width
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check out a context for `descriptor`, blocking while all of its
    /// contexts are in use.
    pub fn acquire(&self, descriptor: &Arc<ExtractorDescriptor>) -> Result<ExtractorContext, SessionError> {
        let capacity = self.capacity_for(descriptor);
        let mut state = self.lock();
        let created = loop {
            if state.closed {
                return Err(PoolError::Closed.into());
            }
            let slot = state
                .slots
                .entry(descriptor.name().to_string())
                .or_insert_with(|| Slot {
                    idle: Vec::new(),
                    created: 0,
                    outstanding: 0,
                    capacity,
                });
            if let Some(context) = slot.idle.pop() {
                slot.outstanding += 1;
                return Ok(context);
            }
            if slot.created < slot.capacity {
                slot.created += 1;
                slot.outstanding += 1;
                break slot.created;
            }
            state = self.released.wait(state).unwrap_or_else(|e| e.into_inner());
        };
        drop(state);

        // Reserved a slot above; build the context without holding the lock.
        match ExtractorContext::create(Arc::clone(descriptor), &self.capabilities) {
            Ok(context) => {
                PooledContextCreated {
                    extractor: descriptor.name(),
                    created,
                    capacity,
                }
                .log();
                Ok(context)
            }
            Err(error) => {
                let mut state = self.lock();
                if let Some(slot) = state.slots.get_mut(descriptor.name()) {
                    slot.created -= 1;
                    slot.outstanding -= 1;
                }
                drop(state);
                self.released.notify_all();
                Err(error)
            }
        }
    }

    /// Return a context checked out with [`acquire`](Self::acquire). Never blocks.
    pub fn release(&self, context: ExtractorContext) {
        let mut state = self.lock();
        if let Some(slot) = state.slots.get_mut(context.name()) {
            slot.outstanding = slot.outstanding.saturating_sub(1);
            slot.idle.push(context);
        }
        drop(state);
        self.released.notify_all();
    }

    /// Contexts currently checked out across all descriptors.
    pub fn outstanding(&self) -> usize {
        self.lock().slots.values().map(|slot| slot.outstanding).sum()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Close every pooled context and refuse further `acquire` calls.
    ///
    /// Fails without closing anything while any context is checked out.
    /// Returns the number of contexts closed; a second call closes nothing.
    pub fn close_all(&self, collector: &FeatureCollector) -> Result<usize, SessionError> {
        let mut state = self.lock();
        if state.closed {
            return Ok(0);
        }
        let mut busy: Vec<(&String, &Slot)> = state.slots.iter().filter(|(_, slot)| slot.outstanding > 0).collect();
        busy.sort_by(|a, b| a.0.cmp(b.0));
        if let Some((name, slot)) = busy.first() {
            return Err(PoolError::ContextsOutstanding {
                extractor: name.to_string(),
                outstanding: slot.outstanding,
            }
            .into());
        }
        state.closed = true;

        let extractor_count = state.slots.len();
        let mut names: Vec<String> = state.slots.keys().cloned().collect();
        names.sort();
        let mut contexts = Vec::new();
        for name in &names {
            if let Some(slot) = state.slots.get_mut(name) {
                contexts.append(&mut slot.idle);
            }
        }
        drop(state);
        self.released.notify_all();

        let context_count = contexts.len();
        let mut first_error = None;
        for mut context in contexts {
            if let Err(source) = context.close(collector) {
                first_error.get_or_insert(SessionError::ExtractorClose {
                    extractor: context.name().to_string(),
                    source,
                });
            }
        }

        ContextPoolClosed {
            extractor_count,
            context_count,
        }
        .log();

        match first_error {
            Some(error) => Err(error),
            None => Ok(context_count),
        }
    }
}

impl std::fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPool")
            .field("width", &self.width)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
