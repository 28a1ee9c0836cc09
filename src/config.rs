// ABOUTME: Environment-driven configuration for the generation orchestration layer
// ABOUTME: Parses tunables with typed defaults and validates provider credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! Environment-based configuration for the generation core
//!
//! The hosting process owns the environment; this module only reads it.
//! Every tunable has a default from [`crate::constants::defaults`], so a bare
//! environment yields a working configuration for everything except the live
//! provider credential.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::constants::{defaults, env_vars};
use crate::errors::GenerationError;

/// Configuration for the generation orchestration layer
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Gemini API key; `None` means the live client cannot be constructed
    pub api_key: Option<String>,
    /// Gemini API base URL
    pub base_url: String,
    /// Model identifier passed to the provider
    pub model: String,
    /// Number of concurrent in-flight provider calls
    pub pool_size: usize,
    /// Provider round-trip budget once a slot is held
    pub call_timeout: Duration,
    /// How long a request may wait for a free slot
    pub admission_timeout: Duration,
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Cool-down before a half-open recovery trial
    pub recovery_timeout: Duration,
    /// Maximum requests per batch
    pub max_batch_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::GEMINI_BASE_URL.into(),
            model: defaults::GEMINI_MODEL.into(),
            pool_size: defaults::POOL_SIZE,
            call_timeout: Duration::from_millis(defaults::CALL_TIMEOUT_MS),
            admission_timeout: Duration::from_millis(defaults::ADMISSION_TIMEOUT_MS),
            failure_threshold: defaults::FAILURE_THRESHOLD,
            recovery_timeout: Duration::from_millis(defaults::RECOVERY_TIMEOUT_MS),
            max_batch_size: defaults::MAX_BATCH_SIZE,
        }
    }
}

impl GenerationConfig {
    /// Load configuration from environment variables
    ///
    /// Unparseable numeric values fall back to defaults with a warning rather
    /// than failing startup; a zero pool size or batch size is a hard error.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Config` when a value parses but is invalid
    /// (zero pool size, zero batch size, zero failure threshold).
    pub fn from_env() -> Result<Self, GenerationError> {
        let base = Self::default();

        let config = Self {
            api_key: env::var(env_vars::GEMINI_API_KEY)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var(env_vars::GEMINI_BASE_URL).unwrap_or(base.base_url),
            model: env::var(env_vars::GEMINI_MODEL).unwrap_or(base.model),
            pool_size: parse_env(env_vars::POOL_SIZE, base.pool_size),
            call_timeout: Duration::from_millis(parse_env(
                env_vars::CALL_TIMEOUT_MS,
                defaults::CALL_TIMEOUT_MS,
            )),
            admission_timeout: Duration::from_millis(parse_env(
                env_vars::ADMISSION_TIMEOUT_MS,
                defaults::ADMISSION_TIMEOUT_MS,
            )),
            failure_threshold: parse_env(env_vars::FAILURE_THRESHOLD, base.failure_threshold),
            recovery_timeout: Duration::from_millis(parse_env(
                env_vars::RECOVERY_TIMEOUT_MS,
                defaults::RECOVERY_TIMEOUT_MS,
            )),
            max_batch_size: parse_env(env_vars::MAX_BATCH, base.max_batch_size),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Config` for values that would wedge the
    /// orchestrator (zero-sized pool, zero batch cap, zero threshold).
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.pool_size == 0 {
            return Err(GenerationError::Config(format!(
                "{} must be at least 1",
                env_vars::POOL_SIZE
            )));
        }
        if self.max_batch_size == 0 {
            return Err(GenerationError::Config(format!(
                "{} must be at least 1",
                env_vars::MAX_BATCH
            )));
        }
        if self.failure_threshold == 0 {
            return Err(GenerationError::Config(format!(
                "{} must be at least 1",
                env_vars::FAILURE_THRESHOLD
            )));
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to a default on absence or
/// parse failure. Parse failures are logged; absence is not.
fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}
