// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker pool and the extractor context pool.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker threads spawned.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use vmaf_rc::observability::messages::pool::WorkerPoolStarted;
///
/// let msg = WorkerPoolStarted { threads: 8 };
/// assert_eq!(msg.to_string(), "Worker pool started with 8 thread(s)");
/// ```
pub struct WorkerPoolStarted {
    pub threads: usize,
}

impl Display for WorkerPoolStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker pool started with {} thread(s)", self.threads)
    }
}

impl StructuredLog for WorkerPoolStarted {
    fn log(&self) {
        tracing::info!(threads = self.threads, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_pool", span_name = name, threads = self.threads)
    }
}

/// A queued task panicked on a worker thread.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerTaskPanicked<'a> {
    pub worker: &'a str,
    pub reason: &'a str,
}

impl Display for WorkerTaskPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task on worker '{}' panicked: {}", self.worker, self.reason)
    }
}

impl StructuredLog for WorkerTaskPanicked<'_> {
    fn log(&self) {
        tracing::error!(worker = self.worker, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_task_panicked", span_name = name, worker = self.worker)
    }
}

/// New extractor context created inside the pool.
///
/// # Log Level
/// `debug!` - Resource bookkeeping
pub struct PooledContextCreated<'a> {
    pub extractor: &'a str,
    pub created: usize,
    pub capacity: usize,
}

impl Display for PooledContextCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created pooled context {}/{} for extractor '{}'",
            self.created, self.capacity, self.extractor
        )
    }
}

impl StructuredLog for PooledContextCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            extractor = self.extractor,
            created = self.created,
            capacity = self.capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pooled_context", span_name = name, extractor = self.extractor)
    }
}

/// Context pool torn down.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ContextPoolClosed {
    pub extractor_count: usize,
    pub context_count: usize,
}

impl Display for ContextPoolClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Context pool closed: {} context(s) across {} extractor(s)",
            self.context_count, self.extractor_count
        )
    }
}

impl StructuredLog for ContextPoolClosed {
    fn log(&self) {
        tracing::info!(
            extractor_count = self.extractor_count,
            context_count = self.context_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("context_pool_closed", span_name = name)
    }
}
