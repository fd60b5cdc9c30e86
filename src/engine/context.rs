// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-instance execution state for one extractor.

use std::fmt;
use std::sync::Arc;

use crate::collector::FeatureCollector;
use crate::errors::{ExtractorError, SessionError};
use crate::extractors::ExtractorDescriptor;
use crate::frame::{Picture, PictureGeometry};
use crate::traits::FeatureExtractor;
use crate::utils::CpuCapabilities;

/// A live extractor instance plus its lifecycle state.
///
/// The extractor is initialized lazily with the geometry of the first
/// reference picture it sees, and closed at most once. A context that never
/// extracted anything is closed without calling into the extractor.
///
/// `extract` takes `&mut self`, so the borrow checker already guarantees a
/// context is driven by one caller at a time; the context pool extends that
/// guarantee across worker threads by moving contexts in and out.
pub struct ExtractorContext {
    descriptor: Arc<ExtractorDescriptor>,
    extractor: Box<dyn FeatureExtractor>,
    geometry: Option<PictureGeometry>,
    closed: bool,
}

impl ExtractorContext {
    pub fn create(
        descriptor: Arc<ExtractorDescriptor>,
        capabilities: &CpuCapabilities,
    ) -> Result<Self, SessionError> {
        let extractor = descriptor
            .create_extractor(capabilities)
            .map_err(|source| SessionError::ExtractorInit {
                extractor: descriptor.name().to_string(),
                source,
            })?;
        Ok(Self {
            descriptor,
            extractor,
            geometry: None,
            closed: false,
        })
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn is_initialized(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn extract(
        &mut self,
        reference: &Picture,
        distorted: &Picture,
        index: u32,
        collector: &FeatureCollector,
    ) -> Result<(), ExtractorError> {
        if self.closed {
            return Err(ExtractorError::Failed(format!(
                "context for '{}' is already closed",
                self.descriptor.name()
            )));
        }
        if self.geometry.is_none() {
            let geometry = reference.geometry();
            self.extractor.init(geometry)?;
            self.geometry = Some(geometry);
        }
        self.extractor.extract(reference, distorted, index, collector)
    }

    /// Flush and release the extractor. Later calls are no-ops.
    pub fn close(&mut self, collector: &FeatureCollector) -> Result<(), ExtractorError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.geometry.is_some() {
            self.extractor.close(collector)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ExtractorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorContext")
            .field("extractor", &self.descriptor.name())
            .field("geometry", &self.geometry)
            .field("closed", &self.closed)
            .finish()
    }
}
