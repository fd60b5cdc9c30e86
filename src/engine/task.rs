// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::collector::FeatureCollector;
use crate::errors::SessionError;
use crate::frame::Picture;
use crate::observability::messages::session::ExtractionFailed;
use crate::observability::messages::StructuredLog;

use super::context::ExtractorContext;
use super::context_pool::ContextPool;
use super::error_latch::ErrorLatch;
use super::worker_pool::panic_reason;

/// One (frame, extractor) unit of work for the worker pool.
///
/// Owns a checked-out context and its own handles to both pictures. The
/// context goes back to the pool and the picture handles are dropped when
/// the task is dropped, whether it ran, failed, panicked or never ran.
pub(crate) struct ExtractionTask {
    context: Option<ExtractorContext>,
    reference: Picture,
    distorted: Picture,
    index: u32,
    collector: Arc<FeatureCollector>,
    contexts: Arc<ContextPool>,
    latch: Arc<ErrorLatch>,
}

impl ExtractionTask {
    pub(crate) fn new(
        context: ExtractorContext,
        reference: Picture,
        distorted: Picture,
        index: u32,
        collector: Arc<FeatureCollector>,
        contexts: Arc<ContextPool>,
        latch: Arc<ErrorLatch>,
    ) -> Self {
        Self {
            context: Some(context),
            reference,
            distorted,
            index,
            collector,
            contexts,
            latch,
        }
    }

    pub(crate) fn run(mut self) {
        let Some(context) = self.context.as_mut() else {
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            context.extract(&self.reference, &self.distorted, self.index, &self.collector)
        }));

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(source)) => {
                ExtractionFailed {
                    extractor: context.name(),
                    index: self.index,
                    error: &source,
                }
                .log();
                Some(SessionError::Extractor {
                    extractor: context.name().to_string(),
                    index: self.index,
                    source,
                })
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                tracing::error!(
                    extractor = context.name(),
                    index = self.index,
                    reason = reason.as_str(),
                    "Extractor '{}' panicked at index {}: {}",
                    context.name(),
                    self.index,
                    reason
                );
                Some(SessionError::TaskPanicked {
                    extractor: context.name().to_string(),
                    index: self.index,
                })
            }
        };
        if let Some(error) = error {
            self.latch.record(error);
        }
    }
}

impl Drop for ExtractionTask {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.contexts.release(context);
        }
    }
}
