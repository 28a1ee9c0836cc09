// ABOUTME: Orchestration of single and batch recipe generation requests
// ABOUTME: Composes breaker gating, admission, provider call, parsing, and fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Request Orchestration
//!
//! [`RequestOrchestrator`] runs one logical generation request end to end:
//!
//! 1. Gate on the circuit breaker.
//! 2. Acquire an admission slot (bounded wait).
//! 3. Build the prompt from the diet-filtered ingredient list.
//! 4. Call the provider under the call timeout.
//! 5. Parse the raw output and strip diet-violating recipes.
//! 6. On any availability failure, degrade to the fallback catalog and
//!    annotate the result with what went wrong.
//!
//! A caller holding a valid [`GenerationRequest`] always gets a
//! [`GenerationResult`] back; invalid input is rejected earlier, when the
//! request is constructed. [`BatchOrchestrator`] fans a bounded batch out
//! concurrently and preserves input order, with per-request isolation: one
//! degraded request never poisons its siblings.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::config::GenerationConfig;
use crate::errors::{ErrorInfo, GenerationError};
use crate::fallback::{self, FallbackCatalog};
use crate::models::{GenerationRequest, GenerationResult, RecipeRecord, ResultSource};
use crate::parser;
use crate::provider::{prompt, GenerationProvider};
use crate::{admission::AdmissionController, constants::defaults};

/// Orchestrates one generation request from gating through fallback
pub struct RequestOrchestrator {
    provider: Arc<dyn GenerationProvider>,
    breaker: Arc<CircuitBreaker>,
    admission: AdmissionController,
    catalog: FallbackCatalog,
    call_timeout: Duration,
    admission_timeout: Duration,
}

impl std::fmt::Debug for RequestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOrchestrator")
            .field("provider", &self.provider.name())
            .field("call_timeout", &self.call_timeout)
            .field("admission_timeout", &self.admission_timeout)
            .finish_non_exhaustive()
    }
}

impl RequestOrchestrator {
    /// Create an orchestrator with breaker and admission built from `config`
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>, config: &GenerationConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::with_config(
            provider.name(),
            CircuitBreakerConfig::new(
                config.failure_threshold,
                config.recovery_timeout,
                defaults::SUCCESS_THRESHOLD,
            ),
        ));
        let admission = AdmissionController::new(config.pool_size);
        Self::with_parts(provider, breaker, admission, config)
    }

    /// Create an orchestrator from explicit parts
    ///
    /// Lets callers share one breaker or admission pool across several
    /// orchestrators, or inject instrumented doubles in tests.
    #[must_use]
    pub fn with_parts(
        provider: Arc<dyn GenerationProvider>,
        breaker: Arc<CircuitBreaker>,
        admission: AdmissionController,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            provider,
            breaker,
            admission,
            catalog: FallbackCatalog::new(),
            call_timeout: config.call_timeout,
            admission_timeout: config.admission_timeout,
        }
    }

    /// The circuit breaker guarding this orchestrator's provider
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The admission controller bounding concurrent provider calls
    #[must_use]
    pub const fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Run one generation request to completion
    ///
    /// Never fails: every availability problem (circuit open, admission
    /// timeout, network, provider status, call timeout, unparseable output)
    /// degrades to fallback recipes with the triggering error recorded on
    /// the result.
    #[instrument(
        skip(self, request),
        fields(request_id = %Uuid::new_v4(), provider = self.provider.name())
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let started = Instant::now();

        match self.try_provider(request).await {
            Ok(records) if !records.is_empty() => {
                let latency_ms = elapsed_ms(started);
                info!(recipes = records.len(), latency_ms, "Generation succeeded");
                GenerationResult {
                    recipes: records,
                    source: ResultSource::Provider,
                    latency_ms,
                    error: None,
                }
            }
            Ok(_empty) => {
                // Provider answered with well-formed output that contained no
                // usable recipe (or diet validation stripped them all). The
                // provider itself is healthy; only this result degrades.
                let error = GenerationError::Parse("provider returned no usable recipes".into());
                warn!("Provider output contained no usable recipes, using fallback");
                self.fallback_result(request, started, &error)
            }
            Err(error) => {
                warn!(error = %error, "Generation degraded to fallback");
                self.fallback_result(request, started, &error)
            }
        }
    }

    /// Breaker-gated, admission-bounded provider call plus parsing
    async fn try_provider(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RecipeRecord>, GenerationError> {
        self.breaker.before_call()?;

        let permit = match self.admission.acquire(self.admission_timeout).await {
            Ok(permit) => permit,
            Err(error) => {
                // The provider was never called; hand back any half-open
                // trial slot we may be holding.
                self.breaker.on_abandoned();
                return Err(error);
            }
        };

        let prefs = request.dietary_preferences();
        let (allowed, protein_suggestions) = fallback::filter_ingredients(request.ingredients(), prefs);
        let prompt = prompt::build_prompt(request, &allowed, &protein_suggestions);

        let raw = self.provider.generate(&prompt, self.call_timeout).await;
        drop(permit);

        let raw = match raw {
            Ok(raw) => raw,
            Err(error) => {
                if error.is_availability_failure() {
                    self.breaker.on_failure();
                }
                return Err(error);
            }
        };

        match parser::parse(&raw) {
            Ok(records) => {
                // Well-formed output means the provider is healthy, even if
                // diet validation later drops every recipe.
                self.breaker.on_success();
                Ok(fallback::validate_records(records, prefs))
            }
            Err(error) => {
                self.breaker.on_failure();
                Err(error)
            }
        }
    }

    fn fallback_result(
        &self,
        request: &GenerationRequest,
        started: Instant,
        error: &GenerationError,
    ) -> GenerationResult {
        GenerationResult {
            recipes: self.catalog.select(request),
            source: ResultSource::Fallback,
            latency_ms: elapsed_ms(started),
            error: Some(ErrorInfo::from(error)),
        }
    }
}

/// Fans a batch of requests out concurrently with per-request isolation
#[derive(Debug)]
pub struct BatchOrchestrator {
    inner: Arc<RequestOrchestrator>,
    max_batch_size: usize,
}

impl BatchOrchestrator {
    /// Create a batch front over a request orchestrator
    #[must_use]
    pub const fn new(inner: Arc<RequestOrchestrator>, max_batch_size: usize) -> Self {
        Self {
            inner,
            max_batch_size,
        }
    }

    /// Run every request concurrently, results in input order
    ///
    /// Requests beyond the admission pool size queue on the semaphore rather
    /// than failing outright, so a batch of five against a pool of three
    /// completes in two waves.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::BatchTooLarge` before any work starts when
    /// the batch exceeds the configured cap. Individual request failures
    /// never surface here; they are absorbed into per-request fallback
    /// results.
    pub async fn generate_many(
        &self,
        requests: &[GenerationRequest],
    ) -> Result<Vec<GenerationResult>, GenerationError> {
        if requests.len() > self.max_batch_size {
            return Err(GenerationError::BatchTooLarge {
                requested: requests.len(),
                max_batch: self.max_batch_size,
            });
        }

        info!(batch = requests.len(), "Dispatching generation batch");
        let futures = requests.iter().map(|request| self.inner.generate(request));
        Ok(futures_util::future::join_all(futures).await)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
