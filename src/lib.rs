// ABOUTME: Main library entry point for the Plateful recipe generation engine
// ABOUTME: Orchestrates AI recipe generation with admission control, circuit breaking, and fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

#![deny(unsafe_code)]

//! # Plateful Generation Engine
//!
//! The concurrent generation layer of the Plateful recipe platform. Callers
//! hand over an ingredient list plus dietary constraints; this crate turns
//! that into recipes by prompting an AI provider, and guarantees a usable
//! answer even when the provider is slow, down, or talking nonsense.
//!
//! ## Features
//!
//! - **Bounded concurrency**: a fixed admission pool caps in-flight provider
//!   calls; excess requests queue with a bounded wait
//! - **Circuit breaking**: consecutive provider failures trip a breaker that
//!   fails fast until a recovery trial succeeds
//! - **Tolerant parsing**: direct JSON, JSON embedded in prose, and a
//!   structured-text salvage pass
//! - **Diet safety**: forbidden ingredients are filtered before prompting
//!   and violating recipes dropped after parsing
//! - **Graceful degradation**: every availability failure degrades to
//!   recipes from a static fallback catalog, annotated with the cause
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use plateful_gen::config::GenerationConfig;
//! use plateful_gen::models::GenerationRequest;
//! use plateful_gen::orchestrator::RequestOrchestrator;
//! use plateful_gen::provider::GeminiClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GenerationConfig::from_env()?;
//!     let provider = Arc::new(GeminiClient::new(&config)?);
//!     let orchestrator = RequestOrchestrator::new(provider, &config);
//!
//!     let request = GenerationRequest::new(
//!         vec!["chicken".into(), "rice".into()],
//!         vec![],
//!         None,
//!         None,
//!     )?;
//!     let result = orchestrator.generate(&request).await;
//!     println!("{} recipes from {:?}", result.recipes.len(), result.source);
//!     Ok(())
//! }
//! ```

/// Admission control bounding concurrent provider calls
pub mod admission;

/// Circuit breaker guarding the generation provider
pub mod breaker;

/// Environment-driven configuration
pub mod config;

/// Application constants and default values
pub mod constants;

/// Unified error handling for the generation pipeline
pub mod errors;

/// Diet filtering and the static fallback catalog
pub mod fallback;

/// Structured logging initialization
pub mod logging;

/// Request, recipe, and result data structures
pub mod models;

/// Single-request and batch orchestration
pub mod orchestrator;

/// Tolerant parsing of provider output into recipes
pub mod parser;

/// Generation provider trait, prompt builder, and the Gemini client
pub mod provider;
