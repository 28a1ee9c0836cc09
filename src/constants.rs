// ABOUTME: Application constants and default values for the generation core
// ABOUTME: Centralizes tunable defaults so configuration and tests share one source of truth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! Defaults and limits shared by configuration, validation, and the orchestrator

/// Default configuration values, overridable through the environment
pub mod defaults {
    /// Concurrent in-flight provider calls (matches provider rate-limit tolerance)
    pub const POOL_SIZE: usize = 3;
    /// Provider round-trip budget once a slot is held
    pub const CALL_TIMEOUT_MS: u64 = 30_000;
    /// How long a request may wait for a free slot
    pub const ADMISSION_TIMEOUT_MS: u64 = 10_000;
    /// Consecutive failures before the circuit opens
    pub const FAILURE_THRESHOLD: u32 = 3;
    /// Cool-down before a half-open recovery trial
    pub const RECOVERY_TIMEOUT_MS: u64 = 30_000;
    /// Successes in half-open required to close the circuit
    pub const SUCCESS_THRESHOLD: u32 = 1;
    /// Maximum requests per batch
    pub const MAX_BATCH_SIZE: usize = 5;
    /// Default Gemini model
    pub const GEMINI_MODEL: &str = "gemini-1.5-flash";
    /// Gemini API base URL
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
}

/// Validation limits for incoming requests and parsed records
pub mod limits {
    /// Maximum ingredients per generation request
    pub const MAX_INGREDIENTS: usize = 30;
    /// Minimum length of a single ingredient name
    pub const MIN_INGREDIENT_LEN: usize = 2;
    /// Maximum length of a single ingredient name
    pub const MAX_INGREDIENT_LEN: usize = 100;
    /// Maximum dietary preferences per request
    pub const MAX_DIETARY_PREFERENCES: usize = 10;
    /// Maximum recipes returned per generation result
    pub const MAX_RECIPES: usize = 3;
}

/// Environment variable names
pub mod env_vars {
    /// Gemini API key (required for the live client)
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Override the Gemini API base URL
    pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
    /// Override the Gemini model
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    /// Admission pool size
    pub const POOL_SIZE: &str = "GENERATION_POOL_SIZE";
    /// Provider call timeout in milliseconds
    pub const CALL_TIMEOUT_MS: &str = "GENERATION_CALL_TIMEOUT_MS";
    /// Admission wait timeout in milliseconds
    pub const ADMISSION_TIMEOUT_MS: &str = "GENERATION_ADMISSION_TIMEOUT_MS";
    /// Circuit breaker failure threshold
    pub const FAILURE_THRESHOLD: &str = "GENERATION_FAILURE_THRESHOLD";
    /// Circuit breaker recovery timeout in milliseconds
    pub const RECOVERY_TIMEOUT_MS: &str = "GENERATION_RECOVERY_TIMEOUT_MS";
    /// Maximum batch size
    pub const MAX_BATCH: &str = "GENERATION_MAX_BATCH";
}
