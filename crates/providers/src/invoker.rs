// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model invoker.
//!
//! Issues exactly one call per invocation, measures wall-clock latency around
//! it and folds the outcome into a [`ResultRecord`]. Errors never escape: a
//! failed call becomes a record with zeroed metrics, `passed = false` and the
//! error text in `notes`. No retries are attempted.

use std::time::Instant;

use llm_bench_core::{ChatMessage, ResultRecord};
use tracing::{debug, warn};

use crate::{ChatClient, ChatRequest};

/// Outcome of a single call to the model service.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// The service returned completion text.
    Completed {
        /// Completion text.
        output: String,
        /// Elapsed wall-clock time in milliseconds.
        latency_ms: f64,
    },
    /// The call failed.
    Failed {
        /// Stringified error.
        error: String,
    },
}

impl Invocation {
    /// Fold this outcome into a fresh record.
    pub fn into_record(self, record: ResultRecord, messages: &[ChatMessage]) -> ResultRecord {
        match self {
            Invocation::Completed { output, latency_ms } => {
                record.completed(messages, output, latency_ms)
            }
            Invocation::Failed { error } => record.failed(error),
        }
    }
}

/// Wraps a [`ChatClient`] with timing and failure-to-record mapping.
pub struct ModelInvoker<C> {
    client: C,
}

impl<C: ChatClient> ModelInvoker<C> {
    /// Create an invoker around a client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Perform one timed call.
    pub async fn call(&self, request: &ChatRequest) -> Invocation {
        if let Err(reason) = validate(request) {
            return Invocation::Failed { error: reason };
        }

        let start = Instant::now();
        match self.client.complete(request).await {
            Ok(output) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    model = %request.model,
                    latency_ms,
                    completion_chars = output.chars().count(),
                    "Completion received"
                );
                Invocation::Completed { output, latency_ms }
            }
            Err(err) => {
                warn!(model = %request.model, error = %err, "Model invocation failed");
                Invocation::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Invoke `model_id` for `task` and return the resulting record.
    ///
    /// The record's timestamp is taken before the call is issued. Its verdict
    /// is left at `passed = false` for the caller's scoring predicate.
    pub async fn invoke(
        &self,
        model_id: &str,
        task: &str,
        messages: &[ChatMessage],
        temperature: f64,
        seed: Option<u64>,
    ) -> ResultRecord {
        let record = ResultRecord::new(model_id, task, temperature, seed);
        let request = ChatRequest::new(model_id, messages.to_vec(), temperature, seed);
        self.call(&request).await.into_record(record, messages)
    }
}

fn validate(request: &ChatRequest) -> Result<(), String> {
    if request.model.trim().is_empty() {
        return Err("invalid request: model identifier is empty".to_string());
    }
    if request.messages.is_empty() {
        return Err("invalid request: no messages".to_string());
    }
    Ok(())
}
