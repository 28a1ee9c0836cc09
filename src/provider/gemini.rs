// ABOUTME: Google Gemini provider implementation via the Generative AI REST API
// ABOUTME: Single-attempt HTTP client with strict caller-supplied timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Gemini Client
//!
//! Implementation of [`GenerationProvider`] for Google's Gemini models.
//!
//! Set the `GEMINI_API_KEY` environment variable with an API key from
//! Google AI Studio. The default model is `gemini-1.5-flash`.
//!
//! One invocation issues exactly one outbound call. The caller-supplied
//! timeout is enforced with [`tokio::time::timeout`] around the whole round
//! trip; when it fires, the pending connection is abandoned and the caller
//! gets `GenerationError::Timeout` immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::GenerationProvider;
use crate::config::GenerationConfig;
use crate::constants::env_vars;
use crate::errors::GenerationError;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
// f64 so 0.7/0.8 serialize exactly as the API documents them
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    top_p: f64,
    top_k: u32,
}

impl Default for GeminiGenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
            top_p: 0.8,
            top_k: 40,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Gemini Generative AI API
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Config` when the API key is absent.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            GenerationError::Config(format!(
                "{} environment variable not set",
                env_vars::GEMINI_API_KEY
            ))
        })?;
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![ContentPart {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GeminiGenerationConfig::default(),
        }
    }

    /// Issue the HTTP round trip without a timeout; the trait method wraps it
    async fn call_once(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.build_url())
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Gemini API error");
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                message: truncate(&body, 500),
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::Provider {
                status: status.as_u16(),
                message: format!("malformed response envelope: {e}"),
            }
        })?;

        if let Some(api_error) = parsed.error {
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                message: api_error.message,
            });
        }

        let text = parsed
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| GenerationError::Provider {
                status: status.as_u16(),
                message: "no content in response".into(),
            })?;

        debug!(chars = text.len(), "Received generation response");
        Ok(text)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, GenerationError> {
        match tokio::time::timeout(timeout, self.call_once(prompt)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(GenerationError::Timeout {
                timeout_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
            }),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_owned()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_matches_api_shape() {
        let request = GeminiClient::build_request("make me pasta");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "make me pasta");
        let config = &json["generationConfig"];
        assert_eq!(config["temperature"], 0.7);
        assert_eq!(config["maxOutputTokens"], 2048);
        assert_eq!(config["topP"], 0.8);
        assert_eq!(config["topK"], 40);
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let config = GenerationConfig::default();
        let err = GeminiClient::new(&config).unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GenerationConfig {
            api_key: Some("secret-key".into()),
            ..GenerationConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn response_text_extraction() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"title\":\"x\"}]"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let text = parsed.candidates.unwrap()[0]
            .content
            .as_ref()
            .unwrap()
            .parts[0]
            .text
            .clone();
        assert!(text.contains("title"));
    }
}
