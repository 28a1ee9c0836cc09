// ABOUTME: End-to-end tests for single and batch generation orchestration
// ABOUTME: Tests degradation paths, breaker integration, and batch semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use plateful_gen::breaker::CircuitState;
use plateful_gen::config::GenerationConfig;
use plateful_gen::errors::{ErrorKind, GenerationError};
use plateful_gen::models::{DietaryPreference, GenerationRequest, ResultSource};
use plateful_gen::orchestrator::{BatchOrchestrator, RequestOrchestrator};
use plateful_gen::provider::GenerationProvider;

// ============================================================================
// Test Providers
// ============================================================================

/// Replays a scripted sequence of responses, then errors
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
        }
    }

    fn always_ok(body: &str, copies: usize) -> Self {
        Self::new((0..copies).map(|_| Ok(body.to_owned())).collect())
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Network("script exhausted".into())))
    }
}

/// Sleeps before answering, to occupy an admission slot
struct SlowProvider {
    delay: Duration,
    body: String,
}

#[async_trait]
impl GenerationProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.body.clone())
    }
}

/// Never produces output; enforces the caller-supplied timeout the way a real
/// transport client does
struct HangingProvider;

#[async_trait]
impl GenerationProvider for HangingProvider {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn generate(&self, _prompt: &str, timeout: Duration) -> Result<String, GenerationError> {
        tokio::time::timeout(timeout, std::future::pending::<()>())
            .await
            .map_err(|_elapsed| GenerationError::Timeout {
                timeout_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
            })?;
        unreachable!("pending future never completes")
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const RECIPE_JSON: &str = r#"[{
    "title": "Lemon Herb Chicken",
    "description": "Bright pan-seared chicken",
    "instructions": "1. Season the chicken. 2. Sear 6 minutes per side. 3. Rest and finish with lemon.",
    "ingredients": [
        {"name": "chicken breast", "amount": "400", "unit": "g"},
        {"name": "lemon", "amount": "1", "unit": ""}
    ],
    "prep_time": 10,
    "cook_time": 15,
    "servings": 2,
    "difficulty": "Easy"
}]"#;

const CHATTY_RESPONSE: &str = "Here are some delicious ideas for you!\n\n[{\"title\": \"Garlic Fried Rice\", \"instructions\": \"1. Fry garlic. 2. Add rice. 3. Season and serve.\", \"ingredients\": [{\"name\": \"rice\", \"amount\": \"300\", \"unit\": \"g\"}], \"difficulty\": \"Easy\"}]\n\nEnjoy your cooking!";

/// Widen a concrete provider handle for injection while keeping the original
/// for call-count assertions
fn dyn_handle(provider: &Arc<ScriptedProvider>) -> Arc<dyn GenerationProvider> {
    provider.clone()
}

fn request() -> GenerationRequest {
    GenerationRequest::new(vec!["chicken".into(), "lemon".into()], vec![], None, None).unwrap()
}

fn vegan_request() -> GenerationRequest {
    GenerationRequest::new(
        vec!["tofu".into(), "rice".into()],
        vec![DietaryPreference::Vegan],
        None,
        None,
    )
    .unwrap()
}

fn config() -> GenerationConfig {
    GenerationConfig {
        admission_timeout: Duration::from_millis(100),
        call_timeout: Duration::from_millis(500),
        ..GenerationConfig::default()
    }
}

// ============================================================================
// Single-request orchestration
// ============================================================================

#[tokio::test]
async fn test_successful_generation_returns_provider_recipes() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(RECIPE_JSON.into())]));
    let orchestrator = RequestOrchestrator::new(dyn_handle(&provider), &config());

    let result = orchestrator.generate(&request()).await;

    assert_eq!(result.source, ResultSource::Provider);
    assert_eq!(result.recipes.len(), 1);
    assert_eq!(result.recipes[0].title, "Lemon Herb Chicken");
    assert_eq!(result.recipes[0].instructions.len(), 3);
    assert!(!result.recipes[0].is_fallback);
    assert!(result.error.is_none());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_prose_wrapped_json_still_succeeds() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(CHATTY_RESPONSE.into())]));
    let orchestrator = RequestOrchestrator::new(provider, &config());

    let result = orchestrator.generate(&request()).await;

    assert_eq!(result.source, ResultSource::Provider);
    assert_eq!(result.recipes[0].title, "Garlic Fried Rice");
}

#[tokio::test]
async fn test_provider_failure_yields_annotated_fallback() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(GenerationError::Provider {
        status: 503,
        message: "overloaded".into(),
    })]));
    let orchestrator = RequestOrchestrator::new(provider, &config());

    let result = orchestrator.generate(&request()).await;

    assert_eq!(result.source, ResultSource::Fallback);
    assert!(!result.recipes.is_empty());
    assert!(result.recipes.iter().all(|r| r.is_fallback));
    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Provider);
    assert_eq!(orchestrator.breaker().failure_count(), 1);
}

#[tokio::test]
async fn test_fallback_respects_dietary_preferences() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(GenerationError::Network(
        "refused".into(),
    ))]));
    let orchestrator = RequestOrchestrator::new(provider, &config());

    let result = orchestrator.generate(&vegan_request()).await;

    assert_eq!(result.source, ResultSource::Fallback);
    for recipe in &result.recipes {
        for ingredient in &recipe.ingredients {
            let name = ingredient.name.to_lowercase();
            assert!(!name.contains("chicken"), "vegan fallback contains {name}");
            assert!(!name.contains("cheese"), "vegan fallback contains {name}");
        }
    }
}

#[tokio::test]
async fn test_diet_violating_provider_output_degrades_without_breaker_hit() {
    // Provider answers with well-formed JSON that violates the vegan
    // constraint; validation strips it and the result degrades, but the
    // provider itself was healthy.
    let meaty = r#"[{
        "title": "Chicken Stir Fry",
        "instructions": "1. Fry the chicken. 2. Serve.",
        "ingredients": [{"name": "chicken thigh", "amount": "300", "unit": "g"}],
        "difficulty": "Easy"
    }]"#;
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(meaty.into())]));
    let orchestrator = RequestOrchestrator::new(provider, &config());

    let result = orchestrator.generate(&vegan_request()).await;

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.error.unwrap().kind, ErrorKind::Parse);
    assert_eq!(orchestrator.breaker().failure_count(), 0);
    assert_eq!(orchestrator.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_open_circuit_skips_provider_entirely() {
    let provider = Arc::new(ScriptedProvider::always_ok(RECIPE_JSON, 5));
    let orchestrator = RequestOrchestrator::new(dyn_handle(&provider), &config());

    for _ in 0..3 {
        orchestrator.breaker().on_failure();
    }
    assert_eq!(orchestrator.breaker().state(), CircuitState::Open);

    let result = orchestrator.generate(&request()).await;

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.error.unwrap().kind, ErrorKind::CircuitOpen);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_circuit_recovers_after_cooldown() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(GenerationError::Network("down".into())),
        Ok(RECIPE_JSON.into()),
    ]));
    let cfg = GenerationConfig {
        failure_threshold: 1,
        recovery_timeout: Duration::from_millis(20),
        ..config()
    };
    let orchestrator = RequestOrchestrator::new(dyn_handle(&provider), &cfg);

    let degraded = orchestrator.generate(&request()).await;
    assert_eq!(degraded.source, ResultSource::Fallback);
    assert_eq!(orchestrator.breaker().state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(40)).await;

    // Cooldown elapsed: the next request is the recovery trial and closes
    // the circuit on success
    let recovered = orchestrator.generate(&request()).await;
    assert_eq!(recovered.source, ResultSource::Provider);
    assert_eq!(orchestrator.breaker().state(), CircuitState::Closed);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_admission_timeout_degrades_without_breaker_penalty() {
    let provider = Arc::new(SlowProvider {
        delay: Duration::from_millis(200),
        body: RECIPE_JSON.into(),
    });
    let cfg = GenerationConfig {
        pool_size: 1,
        admission_timeout: Duration::from_millis(30),
        call_timeout: Duration::from_secs(1),
        ..GenerationConfig::default()
    };
    let orchestrator = Arc::new(RequestOrchestrator::new(provider, &cfg));

    let slow = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.generate(&request()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The only slot is busy; this request exhausts its admission wait
    let starved = orchestrator.generate(&request()).await;
    assert_eq!(starved.source, ResultSource::Fallback);
    assert_eq!(starved.error.unwrap().kind, ErrorKind::AdmissionTimeout);
    assert_eq!(orchestrator.breaker().failure_count(), 0);

    let slow = slow.await.unwrap();
    assert_eq!(slow.source, ResultSource::Provider);
}

#[tokio::test]
async fn test_latency_is_recorded() {
    let provider = Arc::new(SlowProvider {
        delay: Duration::from_millis(30),
        body: RECIPE_JSON.into(),
    });
    let orchestrator = RequestOrchestrator::new(provider, &config());

    let result = orchestrator.generate(&request()).await;
    assert!(result.latency_ms >= 30);
}

#[tokio::test]
async fn test_hung_provider_degrades_within_latency_budget() {
    let cfg = GenerationConfig {
        call_timeout: Duration::from_millis(50),
        admission_timeout: Duration::from_millis(100),
        ..GenerationConfig::default()
    };
    let orchestrator = RequestOrchestrator::new(Arc::new(HangingProvider), &cfg);

    let result = orchestrator.generate(&request()).await;

    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.error.unwrap().kind, ErrorKind::Timeout);
    // Admission was immediate and the call was cut at its timeout, so the
    // whole request stays inside admission_timeout + call_timeout
    assert!(result.latency_ms < 150, "latency {}ms", result.latency_ms);
    assert_eq!(orchestrator.breaker().failure_count(), 1);
}

// ============================================================================
// Batch orchestration
// ============================================================================

#[tokio::test]
async fn test_batch_larger_than_pool_completes_in_waves() {
    let provider = Arc::new(ScriptedProvider::always_ok(RECIPE_JSON, 5));
    let cfg = GenerationConfig {
        pool_size: 3,
        max_batch_size: 5,
        admission_timeout: Duration::from_secs(1),
        ..GenerationConfig::default()
    };
    let inner = Arc::new(RequestOrchestrator::new(dyn_handle(&provider), &cfg));
    let batch = BatchOrchestrator::new(inner, cfg.max_batch_size);

    let requests: Vec<_> = (0..5).map(|_| request()).collect();
    let results = batch.generate_many(&requests).await.unwrap();

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.source == ResultSource::Provider));
    assert_eq!(provider.calls(), 5);
}

#[tokio::test]
async fn test_batch_over_cap_rejected_before_any_call() {
    let provider = Arc::new(ScriptedProvider::always_ok(RECIPE_JSON, 1));
    let cfg = config();
    let inner = Arc::new(RequestOrchestrator::new(dyn_handle(&provider), &cfg));
    let batch = BatchOrchestrator::new(inner, cfg.max_batch_size);

    let requests: Vec<_> = (0..cfg.max_batch_size + 1).map(|_| request()).collect();
    let err = batch.generate_many(&requests).await.unwrap_err();

    assert!(matches!(err, GenerationError::BatchTooLarge { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_batch_isolates_failures_per_request() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(RECIPE_JSON.into()),
        Err(GenerationError::Timeout { timeout_ms: 500 }),
        Ok(RECIPE_JSON.into()),
    ]));
    let inner = Arc::new(RequestOrchestrator::new(provider, &config()));
    let batch = BatchOrchestrator::new(inner, 5);

    let requests: Vec<_> = (0..3).map(|_| request()).collect();
    let results = batch.generate_many(&requests).await.unwrap();

    assert_eq!(results.len(), 3);
    let provider_count = results
        .iter()
        .filter(|r| r.source == ResultSource::Provider)
        .count();
    let fallback_count = results
        .iter()
        .filter(|r| r.source == ResultSource::Fallback)
        .count();
    assert_eq!(provider_count, 2);
    assert_eq!(fallback_count, 1);

    // Every request produced usable recipes either way
    assert!(results.iter().all(|r| !r.recipes.is_empty()));
}

#[tokio::test]
async fn test_empty_batch_is_fine() {
    let provider = Arc::new(ScriptedProvider::always_ok(RECIPE_JSON, 1));
    let inner = Arc::new(RequestOrchestrator::new(provider, &config()));
    let batch = BatchOrchestrator::new(inner, 5);

    let results = batch.generate_many(&[]).await.unwrap();
    assert!(results.is_empty());
}
