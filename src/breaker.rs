// ABOUTME: Circuit breaker guarding calls to the generation provider
// ABOUTME: Fails fast while the provider is unhealthy instead of queueing doomed calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Circuit Breaker
//!
//! Tracks recent provider failures and short-circuits new calls while the
//! provider is considered unhealthy.
//!
//! ## States
//!
//! - **Closed**: normal operation; consecutive failures are counted.
//! - **Open**: tripped after the failure threshold; calls are rejected until
//!   the recovery timeout elapses.
//! - **Half-Open**: exactly one trial call is admitted; success closes the
//!   circuit, failure re-opens it.
//!
//! All state lives in atomics, so the three entry points are safe to call
//! from any number of concurrent tasks without locks.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::errors::GenerationError;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Circuit is tripped - calls fail immediately
    Open,
    /// Testing recovery - one trial call allowed
    HalfOpen,
}

impl CircuitState {
    const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn to_u32(self) -> u32 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Cool-down before a half-open recovery trial
    pub recovery_timeout: Duration,
    /// Successes in half-open required to close the circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new circuit breaker configuration
    #[must_use]
    pub const fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }
}

/// Thread-safe circuit breaker for generation provider calls
///
/// Injected into the orchestrator as an explicit dependency; nothing else
/// mutates its state.
pub struct CircuitBreaker {
    /// Provider name for logging
    provider_name: String,
    /// Current state (0=Closed, 1=Open, 2=HalfOpen)
    state: AtomicU32,
    /// Consecutive failure count in closed state
    failure_count: AtomicU32,
    /// Consecutive success count in half-open state
    success_count: AtomicU32,
    /// Elapsed-millis timestamp of the last failure that opened the circuit
    last_failure_time: AtomicU64,
    config: CircuitBreakerConfig,
    /// Monotonic base for elapsed calculations
    start_instant: Instant,
}

impl CircuitBreaker {
    /// Create a breaker with default thresholds
    #[must_use]
    pub fn new(provider_name: &str) -> Self {
        Self::with_config(provider_name, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom thresholds
    #[must_use]
    pub fn with_config(provider_name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            provider_name: provider_name.to_owned(),
            state: AtomicU32::new(CircuitState::Closed.to_u32()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure_time: AtomicU64::new(0),
            config,
            start_instant: Instant::now(),
        }
    }

    /// Current circuit state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u32(self.state.load(Ordering::SeqCst))
    }

    /// Current consecutive failure count
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Gate a prospective provider call
    ///
    /// In the open state this also performs the open-to-half-open transition
    /// once the recovery timeout has elapsed; the CAS guarantees only one
    /// caller wins the trial slot.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::CircuitOpen` with the remaining cool-down
    /// when the call must not proceed.
    pub fn before_call(&self) -> Result<(), GenerationError> {
        let allowed = match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => self.try_enter_half_open(),
            // Trial call already in flight
            CircuitState::HalfOpen => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(GenerationError::CircuitOpen {
                retry_after_secs: self.time_until_recovery_secs(),
            })
        }
    }

    /// Record a successful provider call
    pub fn on_success(&self) {
        match self.state() {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::SeqCst);
            }
            CircuitState::HalfOpen => {
                let count = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if count >= self.config.success_threshold {
                    self.state
                        .store(CircuitState::Closed.to_u32(), Ordering::SeqCst);
                    self.failure_count.store(0, Ordering::SeqCst);
                    self.success_count.store(0, Ordering::SeqCst);
                    info!(
                        provider = %self.provider_name,
                        "Circuit closed - provider recovered"
                    );
                }
            }
            CircuitState::Open => {
                // Stale success from a call that was in flight when the
                // circuit tripped; ignore
            }
        }
    }

    /// Record a failed provider call
    pub fn on_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if count >= self.config.failure_threshold {
                    self.state
                        .store(CircuitState::Open.to_u32(), Ordering::SeqCst);
                    self.last_failure_time
                        .store(self.elapsed_millis(), Ordering::SeqCst);
                    warn!(
                        provider = %self.provider_name,
                        failures = count,
                        threshold = self.config.failure_threshold,
                        recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                        "Circuit opened - provider failing"
                    );
                }
            }
            CircuitState::HalfOpen => {
                self.state
                    .store(CircuitState::Open.to_u32(), Ordering::SeqCst);
                self.last_failure_time
                    .store(self.elapsed_millis(), Ordering::SeqCst);
                self.success_count.store(0, Ordering::SeqCst);
                warn!(
                    provider = %self.provider_name,
                    "Circuit re-opened - recovery trial failed"
                );
            }
            CircuitState::Open => {
                self.last_failure_time
                    .store(self.elapsed_millis(), Ordering::SeqCst);
            }
        }
    }

    /// Return an admitted trial that never reached the provider
    ///
    /// A half-open trial can be abandoned before any call is made (e.g. the
    /// admission wait timed out). That says nothing about provider health, so
    /// the circuit goes back to open without touching the failure timestamp;
    /// the next gate may immediately win a fresh trial.
    ///
    /// The trial slot carries no owner token, so if the circuit opened and
    /// re-entered half-open while this caller waited on admission, the CAS
    /// revokes a trial held by a different task; that task's later
    /// `on_success` is then ignored as stale and the next gate starts a fresh
    /// trial. Worst case is one extra recovery round trip.
    pub fn on_abandoned(&self) {
        let _ = self.state.compare_exchange(
            CircuitState::HalfOpen.to_u32(),
            CircuitState::Open.to_u32(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Force the circuit closed; for tests and manual recovery only
    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed.to_u32(), Ordering::SeqCst);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        info!(provider = %self.provider_name, "Circuit manually reset to closed");
    }

    /// Attempt the open-to-half-open transition; true if this caller won the
    /// single trial slot
    fn try_enter_half_open(&self) -> bool {
        let last_failure = self.last_failure_time.load(Ordering::SeqCst);
        let recovery_ms = duration_to_millis(self.config.recovery_timeout);

        if self.elapsed_millis().saturating_sub(last_failure) >= recovery_ms {
            let won = self
                .state
                .compare_exchange(
                    CircuitState::Open.to_u32(),
                    CircuitState::HalfOpen.to_u32(),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok();
            if won {
                info!(
                    provider = %self.provider_name,
                    "Circuit half-open - admitting recovery trial"
                );
            }
            won
        } else {
            false
        }
    }

    fn elapsed_millis(&self) -> u64 {
        duration_to_millis(self.start_instant.elapsed())
    }

    /// Seconds until a recovery trial may be attempted, rounded up
    fn time_until_recovery_secs(&self) -> u64 {
        let last_failure = self.last_failure_time.load(Ordering::SeqCst);
        let recovery_ms = duration_to_millis(self.config.recovery_timeout);
        let since_failure = self.elapsed_millis().saturating_sub(last_failure);
        recovery_ms
            .saturating_sub(since_failure)
            .saturating_add(999)
            / 1000
    }
}

/// Millisecond counts here stay far below u64 range
fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed_and_allows_calls() {
        let breaker = CircuitBreaker::new("gemini");
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.before_call().is_ok());
    }

    #[test]
    fn opens_after_threshold_and_rejects() {
        let breaker = CircuitBreaker::with_config(
            "gemini",
            CircuitBreakerConfig::new(3, Duration::from_secs(30), 1),
        );

        breaker.on_failure();
        breaker.on_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.on_failure();
        assert_eq!(breaker.state(), CircuitState::Open);

        let err = breaker.before_call().unwrap_err();
        assert!(matches!(err, GenerationError::CircuitOpen { .. }));
    }

    #[test]
    fn half_open_admits_exactly_one_trial() {
        let breaker = CircuitBreaker::with_config(
            "gemini",
            CircuitBreakerConfig::new(1, Duration::from_millis(0), 1),
        );
        breaker.on_failure();

        // Zero cool-down: first gate wins the trial, second is rejected
        assert!(breaker.before_call().is_ok());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.before_call().is_err());
    }

    #[test]
    fn single_success_closes_from_half_open() {
        let breaker = CircuitBreaker::with_config(
            "gemini",
            CircuitBreakerConfig::new(1, Duration::from_millis(0), 1),
        );
        breaker.on_failure();
        assert!(breaker.before_call().is_ok());

        breaker.on_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn half_open_failure_reopens() {
        let breaker = CircuitBreaker::with_config(
            "gemini",
            CircuitBreakerConfig::new(1, Duration::from_millis(0), 1),
        );
        breaker.on_failure();
        assert!(breaker.before_call().is_ok());

        breaker.on_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn success_resets_failure_streak() {
        let breaker = CircuitBreaker::new("gemini");
        breaker.on_failure();
        breaker.on_failure();
        assert_eq!(breaker.failure_count(), 2);

        breaker.on_success();
        assert_eq!(breaker.failure_count(), 0);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
