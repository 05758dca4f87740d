// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote model service boundary for LLM Bench.
//!
//! The harness treats a model as an opaque request/response service: it sends
//! a model id, an ordered list of role/content messages, a temperature and an
//! optional seed, and gets back completion text or an error. [`ChatClient`] is
//! that seam; [`OpenAiCompatClient`] implements it for any chat-completions
//! style endpoint (OpenRouter, OpenAI, vLLM, ...).
//!
//! [`ModelInvoker`] sits on top of a client, times the call and turns every
//! outcome, including failures, into a [`llm_bench_core::ResultRecord`].
//!
//! # Modules
//!
//! - [`invoker`] - timing and failure-to-record mapping
//! - [`openai`] - HTTP client for chat-completions endpoints

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod invoker;
pub mod openai;

pub use invoker::{Invocation, ModelInvoker};
pub use openai::OpenAiCompatClient;

use async_trait::async_trait;
use llm_bench_core::ChatMessage;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by a [`ChatClient`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status (including auth failures).
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The client could not be constructed.
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// One chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Sampling seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ChatRequest {
    /// Create a request.
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        temperature: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            seed,
        }
    }
}

/// A remote text-generation service reached over a single request/response call.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one request and return the completion text.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
