// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! OpenAI-compatible chat-completions client.
//!
//! Talks to any endpoint implementing `POST {api_base}/chat/completions`
//! (OpenRouter, OpenAI, DeepSeek, vLLM, LM Studio, ...). One request per call,
//! no streaming and no retries.
//!
//! # Example
//!
//! ```no_run
//! use llm_bench_core::ChatMessage;
//! use llm_bench_providers::{ChatClient, ChatRequest, OpenAiCompatClient};
//!
//! # async fn demo() -> llm_bench_providers::Result<()> {
//! let client = OpenAiCompatClient::new("https://openrouter.ai/api/v1", Some("sk-or-..."))?;
//! let request = ChatRequest::new(
//!     "openai/gpt-oss-20b:free",
//!     vec![ChatMessage::user("Say hi")],
//!     0.7,
//!     None,
//! );
//! let text = client.complete(&request).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use llm_bench_core::HarnessSettings;
use reqwest::Client;
use tracing::debug;

use crate::{ChatClient, ChatRequest, ProviderError, Result};

/// A [`ChatClient`] for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiCompatClient {
    api_base: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatClient {
    /// Create a client using the transport's default timeouts.
    pub fn new(api_base: &str, api_key: Option<&str>) -> Result<Self> {
        Self::build(api_base, api_key, None)
    }

    /// Create a client from harness settings.
    pub fn from_settings(settings: &HarnessSettings) -> Result<Self> {
        Self::build(
            &settings.api_base,
            settings.api_key.as_deref(),
            settings.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn build(api_base: &str, api_key: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() {
            return Err(ProviderError::Configuration(
                "api_base must not be empty".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        Ok(Self {
            api_base: api_base.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
            client,
        })
    }

    /// Base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = self.completions_url();
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            seed = ?request.seed,
            "Sending chat completion"
        );

        let mut http = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let resp = http.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        extract_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_content(json: &serde_json::Value) -> Result<String> {
    // Some providers report upstream failures in a 200 body.
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ProviderError::MalformedResponse(message));
    }

    let choice = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".to_string()))?;

    match choice.get("message").and_then(|m| m.get("content")) {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(serde_json::Value::Null) | None => Err(ProviderError::MalformedResponse(
            "choice has no message content".to_string(),
        )),
        Some(other) => Err(ProviderError::MalformedResponse(format!(
            "message content is not a string: {}",
            other
        ))),
    }
}
