// ABOUTME: Generation provider abstraction for pluggable AI backends
// ABOUTME: Defines the single-attempt provider contract implemented by GeminiClient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Generation Provider Interface
//!
//! The contract a generative backend must implement to plug into the
//! orchestrator. Implementations perform exactly one outbound call per
//! invocation and enforce the caller-supplied timeout strictly; retries and
//! fallback are the orchestrator's concern, never the provider's.

mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::GenerationError;

/// A generative-content backend
///
/// Implementations must return within `timeout` or give up from the caller's
/// perspective; cancellation is advisory to the transport but mandatory to
/// the caller's control flow.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Unique provider identifier (e.g. "gemini")
    fn name(&self) -> &'static str;

    /// Perform one generation call, returning the raw response text
    ///
    /// # Errors
    ///
    /// `GenerationError::Timeout` when `timeout` elapses,
    /// `GenerationError::Network` on transport failure, and
    /// `GenerationError::Provider` on a non-success response.
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, GenerationError>;
}
