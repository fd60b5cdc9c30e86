// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The analysis session: registration, dispatch, finalization and scoring.
//!
//! # Execution modes
//!
//! The mode is fixed at [`Session::init`]:
//! * `threads == 0` - synchronous. Each binding extracts with its own context
//!   on the caller's thread, in registration order, and the first error aborts
//!   the rest of that frame.
//! * `threads > 0` - concurrent. Each binding's work becomes an
//!   [`ExtractionTask`] holding a context from the [`ContextPool`] and its own
//!   picture handles. Task errors are latched first-wins and returned from the
//!   next `drain`, `score_pooled`, `write_output` or `close`.
//!
//! # Subsampling
//!
//! With a stride `S > 1`, non-temporal bindings only run on indices where
//! `index % S == 0`. Temporal bindings run on every index so their state
//! stays continuous.
//!
//! # Finalization
//!
//! `score_pooled` and `write_output` finalize once: drain the workers, close
//! every binding's context, then close the context pool. Frames submitted
//! after that are rejected.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crate::collector::FeatureCollector;
use crate::errors::SessionError;
use crate::extractors::{ExtractorDescriptor, ExtractorRegistry};
use crate::frame::Picture;
use crate::observability::messages::session::{
    ExtractionFailed, ExtractorRegistered, FrameSubmitted, PooledScoreComputed, RegistrationRolledBack,
    SessionClosed, SessionFinalized, SessionInitialized,
};
use crate::observability::messages::StructuredLog;
use crate::output::{self, OutputFormat};
use crate::traits::QualityModel;
use crate::utils::{CpuCapabilities, CpuMask};

use super::context::ExtractorContext;
use super::context_pool::ContextPool;
use super::error_latch::ErrorLatch;
use super::pooling::{self, PooledAccumulator, PoolingMethod};
use super::task::ExtractionTask;
use super::worker_pool::WorkerPool;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Worker threads; 0 runs every extraction on the caller's thread.
    pub threads: usize,
    /// Run non-temporal extractors on every `subsample`-th frame. 0 means 1.
    pub subsample: u32,
    /// CPU extensions extractors must not use.
    pub cpu_mask: CpuMask,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            subsample: 1,
            cpu_mask: CpuMask::none(),
        }
    }
}

impl SessionConfig {
    pub fn new(threads: usize, subsample: u32) -> Self {
        Self {
            threads,
            subsample,
            ..Self::default()
        }
    }

    pub fn with_cpu_mask(mut self, cpu_mask: CpuMask) -> Self {
        self.cpu_mask = cpu_mask;
        self
    }

    /// Effective stride, never below 1.
    pub fn stride(&self) -> u32 {
        self.subsample.max(1)
    }
}

struct Binding {
    descriptor: Arc<ExtractorDescriptor>,
    context: ExtractorContext,
}

struct Concurrency {
    workers: WorkerPool,
    contexts: Arc<ContextPool>,
}

pub struct Session {
    config: SessionConfig,
    capabilities: CpuCapabilities,
    registry: Arc<ExtractorRegistry>,
    collector: Arc<FeatureCollector>,
    bindings: Vec<Binding>,
    concurrency: Option<Concurrency>,
    latch: Arc<ErrorLatch>,
    finalized: bool,
    closed: bool,
}

impl Session {
    /// Create a session. With `threads > 0` this starts the worker pool and
    /// the context pool; if either cannot be built nothing is left running.
    pub fn init(config: SessionConfig, registry: Arc<ExtractorRegistry>) -> Result<Self, SessionError> {
        let capabilities = CpuCapabilities::detect().masked(&config.cpu_mask);

        let concurrency = if config.threads > 0 {
            let workers = WorkerPool::new(config.threads)
                .map_err(|e| SessionError::ResourceExhausted(format!("worker pool: {}", e)))?;
            let contexts = Arc::new(ContextPool::new(config.threads, capabilities)?);
            Some(Concurrency { workers, contexts })
        } else {
            None
        };

        SessionInitialized {
            threads: config.threads,
            subsample: config.stride(),
            capabilities: &capabilities.to_string(),
        }
        .log();

        Ok(Self {
            config,
            capabilities,
            registry,
            collector: Arc::new(FeatureCollector::new()),
            bindings: Vec::new(),
            concurrency,
            latch: Arc::new(ErrorLatch::new()),
            finalized: false,
            closed: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn capabilities(&self) -> CpuCapabilities {
        self.capabilities
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn collector(&self) -> &FeatureCollector {
        &self.collector
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Names of the bound extractors in registration order.
    pub fn binding_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.descriptor.name()).collect()
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrency.is_some()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_open(&self, operation: &str) -> Result<(), SessionError> {
        if self.finalized {
            return Err(SessionError::invalid(format!(
                "{} is not allowed after the session has been finalized",
                operation
            )));
        }
        Ok(())
    }

    /// Bind the extractor registered as `name`.
    ///
    /// Binding an extractor that is already bound is a no-op.
    pub fn use_feature(&mut self, name: &str) -> Result<(), SessionError> {
        self.ensure_open("use_feature")?;
        let descriptor = self
            .registry
            .by_name(name)
            .ok_or_else(|| SessionError::invalid(format!("unknown feature extractor '{}'", name)))?;
        self.bind(descriptor)
    }

    /// Bind an extractor for every feature `model` reads.
    ///
    /// Stops at the first feature no extractor provides. Bindings made before
    /// that point stay in place; the session should be discarded on error.
    pub fn use_features_from_model(&mut self, model: &dyn QualityModel) -> Result<(), SessionError> {
        self.ensure_open("use_features_from_model")?;
        for feature in model.feature_names() {
            let descriptor = self.registry.by_feature_name(feature).ok_or_else(|| {
                SessionError::invalid(format!(
                    "model '{}' needs feature '{}' which no extractor provides",
                    model.name(),
                    feature
                ))
            })?;
            self.bind(descriptor)?;
        }
        Ok(())
    }

    fn bind(&mut self, descriptor: Arc<ExtractorDescriptor>) -> Result<(), SessionError> {
        if self.bindings.iter().any(|b| b.descriptor.name() == descriptor.name()) {
            return Ok(());
        }

        let mut context = ExtractorContext::create(Arc::clone(&descriptor), &self.capabilities)?;
        if let Err(e) = self.bindings.try_reserve(1) {
            let reason = e.to_string();
            if let Err(close_error) = context.close(&self.collector) {
                tracing::warn!(extractor = descriptor.name(), error = %close_error, "Closing unbound context failed");
            }
            RegistrationRolledBack {
                extractor: descriptor.name(),
                reason: &reason,
            }
            .log();
            return Err(SessionError::ResourceExhausted(format!(
                "binding extractor '{}': {}",
                descriptor.name(),
                reason
            )));
        }
        self.bindings.push(Binding {
            descriptor: Arc::clone(&descriptor),
            context,
        });

        ExtractorRegistered {
            extractor: descriptor.name(),
            temporal: descriptor.is_temporal(),
            binding_count: self.bindings.len(),
        }
        .log();
        Ok(())
    }

    /// Write a caller-computed feature value straight into the collector.
    pub fn import_feature_score(&self, name: &str, value: f64, index: u32) -> Result<(), SessionError> {
        self.collector.append(name, value, index)?;
        Ok(())
    }

    /// Hand a frame pair to every binding that runs at `index`.
    ///
    /// Takes ownership of both pictures. In synchronous mode they are dropped
    /// when this returns; in concurrent mode every queued task holds its own
    /// handles and the last one to finish frees the buffers.
    pub fn submit_frame_pair(
        &mut self,
        reference: Picture,
        distorted: Picture,
        index: u32,
    ) -> Result<(), SessionError> {
        self.ensure_open("submit_frame_pair")?;
        let stride = self.config.stride();

        let (dispatched, skipped) = match &self.concurrency {
            None => {
                let mut dispatched = 0;
                let mut skipped = 0;
                for binding in self.bindings.iter_mut() {
                    if binding.descriptor.skips_index(stride, index) {
                        skipped += 1;
                        continue;
                    }
                    binding
                        .context
                        .extract(&reference, &distorted, index, &self.collector)
                        .map_err(|source| {
                            ExtractionFailed {
                                extractor: binding.descriptor.name(),
                                index,
                                error: &source,
                            }
                            .log();
                            SessionError::Extractor {
                                extractor: binding.descriptor.name().to_string(),
                                index,
                                source,
                            }
                        })?;
                    dispatched += 1;
                }
                (dispatched, skipped)
            }
            Some(concurrency) => {
                let mut dispatched = 0;
                let mut skipped = 0;
                for binding in &self.bindings {
                    if binding.descriptor.skips_index(stride, index) {
                        skipped += 1;
                        continue;
                    }
                    let context = concurrency.contexts.acquire(&binding.descriptor)?;
                    let task = ExtractionTask::new(
                        context,
                        reference.clone(),
                        distorted.clone(),
                        index,
                        Arc::clone(&self.collector),
                        Arc::clone(&concurrency.contexts),
                        Arc::clone(&self.latch),
                    );
                    concurrency.workers.enqueue(move || task.run())?;
                    dispatched += 1;
                }
                (dispatched, skipped)
            }
        };

        FrameSubmitted {
            index,
            dispatched,
            skipped,
        }
        .log();
        Ok(())
    }

    /// Wait for queued extractions and return the first error any of them hit.
    pub fn drain(&mut self) -> Result<(), SessionError> {
        if let Some(concurrency) = &self.concurrency {
            concurrency.workers.drain();
        }
        match self.latch.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn finalize(&mut self) -> Result<(), SessionError> {
        if self.finalized {
            return Ok(());
        }
        let started = Instant::now();
        if let Some(concurrency) = &self.concurrency {
            concurrency.workers.drain();
        }
        // A failed finalization is not retried.
        self.finalized = true;

        let mut first_error = self.latch.take();
        for binding in self.bindings.iter_mut() {
            if let Err(source) = binding.context.close(&self.collector) {
                first_error.get_or_insert(SessionError::ExtractorClose {
                    extractor: binding.descriptor.name().to_string(),
                    source,
                });
            }
        }

        let mut pooled_contexts = 0;
        if let Some(concurrency) = &self.concurrency {
            match concurrency.contexts.close_all(&self.collector) {
                Ok(closed) => pooled_contexts = closed,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        SessionFinalized {
            binding_count: self.bindings.len(),
            pooled_contexts,
            duration: started.elapsed(),
        }
        .log();

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Score a single frame. Call `drain` first in concurrent mode.
    pub fn score_at_index(&self, model: &dyn QualityModel, index: u32) -> Result<f64, SessionError> {
        Ok(model.score_at_index(&self.collector, index)?)
    }

    /// Finalize, then pool the model's scores over `[index_low, index_high)`.
    ///
    /// Only indices selected by the subsample stride take part.
    pub fn score_pooled(
        &mut self,
        model: &dyn QualityModel,
        method: PoolingMethod,
        index_low: u32,
        index_high: u32,
    ) -> Result<f64, SessionError> {
        if index_low >= index_high {
            return Err(SessionError::invalid(format!(
                "pooling range [{}, {}) is empty",
                index_low, index_high
            )));
        }
        self.finalize()?;

        let stride = self.config.stride();
        let mut accumulator = PooledAccumulator::new();
        for index in (index_low..index_high).filter(|&i| pooling::is_selected(stride, i)) {
            accumulator.push(self.score_at_index(model, index)?);
        }
        let score = accumulator.finish(method).ok_or_else(|| {
            SessionError::invalid(format!(
                "no frames in [{}, {}) are selected at subsample {}",
                index_low, index_high, stride
            ))
        })?;

        PooledScoreComputed {
            model: model.name(),
            method: method.as_str(),
            index_low,
            index_high,
            included: accumulator.count(),
            score,
        }
        .log();
        Ok(score)
    }

    /// Finalize, then serialize the collected features to `sink`.
    ///
    /// An unrecognized format writes nothing and succeeds.
    pub fn write_output(&mut self, sink: &mut dyn Write, format: &OutputFormat) -> Result<(), SessionError> {
        self.finalize()?;
        output::write_output(&self.collector, sink, self.config.stride(), format)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), SessionError> {
        let result = self.finalize();
        // Joins the worker threads.
        self.concurrency.take();
        SessionClosed {
            binding_count: self.bindings.len(),
            feature_entries: self.collector.len(),
        }
        .log();
        self.bindings.clear();
        self.closed = true;
        result
    }

    /// Drain, close every context and stop the workers.
    pub fn close(mut self) -> Result<(), SessionError> {
        self.shutdown()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(error) = self.shutdown() {
            tracing::error!(error = %error, "Session teardown failed: {}", error);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("bindings", &self.binding_names())
            .field("finalized", &self.finalized)
            .finish()
    }
}
