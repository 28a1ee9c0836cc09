// ABOUTME: Admission control bounding concurrent in-flight provider calls
// ABOUTME: Counting semaphore with bounded acquire and RAII permit release
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Admission Controller
//!
//! Bounds how many provider calls run at once, independent of how many
//! logical requests arrive. Backed by a [`tokio::sync::Semaphore`]; waiters
//! are served in FIFO order, so starvation is bounded.
//!
//! Permits are RAII: dropping an [`AdmissionPermit`] releases the slot on
//! every exit path, including panics and task cancellation. A timed-out
//! acquire never consumes a slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};

use crate::errors::GenerationError;

/// Bounds concurrent access to the generation provider
#[derive(Debug, Clone)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    pool_size: usize,
}

impl AdmissionController {
    /// Create a controller with `pool_size` concurrency slots
    #[must_use]
    pub fn new(pool_size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(pool_size)),
            pool_size,
        }
    }

    /// Wait up to `timeout` for a free slot
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::AdmissionTimeout` if no slot frees up in
    /// time. The failed acquire holds nothing.
    pub async fn acquire(&self, timeout: Duration) -> Result<AdmissionPermit, GenerationError> {
        let acquire = Arc::clone(&self.semaphore).acquire_owned();
        match tokio::time::timeout(timeout, acquire).await {
            Ok(Ok(permit)) => {
                trace!(
                    available = self.semaphore.available_permits(),
                    pool_size = self.pool_size,
                    "Admission slot acquired"
                );
                Ok(AdmissionPermit { _permit: permit })
            }
            // The semaphore is never closed while the controller is alive
            Ok(Err(_closed)) => Err(GenerationError::AdmissionTimeout {
                waited_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
            }),
            Err(_elapsed) => {
                debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Admission wait timed out, all slots busy"
                );
                Err(GenerationError::AdmissionTimeout {
                    waited_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Slots currently free
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured pool size
    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.pool_size
    }
}

/// One held concurrency slot; dropping it releases the slot
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}
