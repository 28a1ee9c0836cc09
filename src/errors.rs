// ABOUTME: Structured error types for the recipe generation pipeline
// ABOUTME: Defines GenerationError taxonomy and the serializable ErrorInfo envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Generation Error Taxonomy
//!
//! Errors produced while orchestrating recipe generation. Only
//! [`GenerationError::Validation`] and [`GenerationError::BatchTooLarge`]
//! propagate to callers as hard failures; every other variant is absorbed by
//! the orchestrator and converted into a fallback-sourced result that carries
//! an [`ErrorInfo`] for observability.

use serde::{Deserialize, Serialize};

/// Errors from the generation orchestration layer
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Request failed input validation
    #[error("Invalid request: {field}: {reason}")]
    Validation {
        /// Field that failed validation
        field: &'static str,
        /// Reason why the field is invalid
        reason: String,
    },

    /// Batch exceeds the configured maximum size
    #[error("Batch of {requested} requests exceeds maximum of {max_batch}")]
    BatchTooLarge {
        /// Number of requests submitted
        requested: usize,
        /// Configured batch cap
        max_batch: usize,
    },

    /// No admission slot freed up within the admission timeout
    #[error("Admission timed out after {waited_ms}ms waiting for a generation slot")]
    AdmissionTimeout {
        /// How long the request waited
        waited_ms: u64,
    },

    /// Transport-level failure reaching the provider
    #[error("Provider network error: {0}")]
    Network(String),

    /// Provider returned a non-success status
    #[error("Provider returned status {status}: {message}")]
    Provider {
        /// HTTP status code from the provider
        status: u16,
        /// Error body or status text
        message: String,
    },

    /// Provider call exceeded the call timeout
    #[error("Provider call timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured call timeout
        timeout_ms: u64,
    },

    /// Provider output could not be parsed into any recipe
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    /// Circuit breaker is open and rejecting calls
    #[error("Circuit open: provider unhealthy, retry in {retry_after_secs}s")]
    CircuitOpen {
        /// Seconds until a recovery trial is permitted
        retry_after_secs: u64,
    },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// Whether this error should count against the circuit breaker.
    ///
    /// Availability failures (network, non-success status, timeout) and
    /// garbled output count. Admission timeouts happen on our side of the
    /// wire and say nothing about provider health, so they do not.
    #[must_use]
    pub const fn is_availability_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Provider { .. } | Self::Timeout { .. } | Self::Parse(_)
        )
    }

    /// Whether this error propagates to the caller instead of degrading
    /// into a fallback result.
    #[must_use]
    pub const fn is_hard_failure(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::BatchTooLarge { .. })
    }

    /// Classify into the serializable [`ErrorKind`] carried on results
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::BatchTooLarge { .. } => ErrorKind::BatchTooLarge,
            Self::AdmissionTimeout { .. } => ErrorKind::AdmissionTimeout,
            Self::Network(_) => ErrorKind::Network,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Parse(_) => ErrorKind::Parse,
            Self::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Convenience constructor for validation failures
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Serializable error category for the result envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum ErrorKind {
    Validation,
    BatchTooLarge,
    AdmissionTimeout,
    Network,
    Provider,
    Timeout,
    Parse,
    CircuitOpen,
    Config,
}

/// Error details attached to a degraded generation result
///
/// The routing layer maps these onto transport status codes; this layer only
/// records what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl From<&GenerationError> for ErrorInfo {
    fn from(error: &GenerationError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
