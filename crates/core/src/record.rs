// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Result record and chat message types.
//!
//! A [`ResultRecord`] is the uniform shape produced by every evaluation task,
//! whatever its scoring rule. It is created once per model invocation, has its
//! verdict set exactly once, and is then handed to the result log.
//!
//! # Lifecycle
//!
//! ```text
//! invoke ──► ResultRecord { passed: false, notes: "" }
//!              │
//!              └─ set_verdict(Verdict) ──► append to store ──► dropped
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction that frames the conversation.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role/content pair of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Number of characters in the content.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Outcome of a scoring predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    /// Whether the output satisfied the predicate.
    pub passed: bool,
    /// Diagnostic text, empty when there is nothing to report.
    pub notes: String,
}

impl Verdict {
    /// A passing verdict with no notes.
    pub fn pass() -> Self {
        Self {
            passed: true,
            notes: String::new(),
        }
    }

    /// A passing verdict that still carries a diagnostic.
    pub fn pass_with(notes: impl Into<String>) -> Self {
        Self {
            passed: true,
            notes: notes.into(),
        }
    }

    /// A failing verdict.
    pub fn fail(notes: impl Into<String>) -> Self {
        Self {
            passed: false,
            notes: notes.into(),
        }
    }
}

/// Round a latency in milliseconds to two decimal places.
pub fn round_latency(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// The uniform output of one model invocation plus its scoring verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Instant the invocation was issued.
    pub timestamp: DateTime<Utc>,
    /// Model under test.
    pub model_id: String,
    /// Task that produced this record.
    pub task: String,
    /// Sampling temperature of the request.
    pub temperature: f64,
    /// Sampling seed, if one was sent.
    pub seed: Option<u64>,
    /// Total characters across all request messages.
    pub prompt_chars: usize,
    /// Characters in the completion.
    pub completion_chars: usize,
    /// Wall-clock request duration, two decimal places.
    pub latency_ms: f64,
    /// Reserved; no pricing model is applied.
    pub est_cost_usd: f64,
    /// Scoring verdict.
    pub passed: bool,
    /// Free-text diagnostic.
    pub notes: String,
    /// Raw completion text. Used for scoring, never persisted.
    #[serde(skip)]
    pub output: String,
    #[serde(skip)]
    invocation_failed: bool,
}

impl ResultRecord {
    /// Create an empty record stamped with the current time.
    pub fn new(
        model_id: impl Into<String>,
        task: impl Into<String>,
        temperature: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            model_id: model_id.into(),
            task: task.into(),
            temperature,
            seed,
            prompt_chars: 0,
            completion_chars: 0,
            latency_ms: 0.0,
            est_cost_usd: 0.0,
            passed: false,
            notes: String::new(),
            output: String::new(),
            invocation_failed: false,
        }
    }

    /// Record for a successful invocation.
    pub fn completed(
        mut self,
        messages: &[ChatMessage],
        output: impl Into<String>,
        latency_ms: f64,
    ) -> Self {
        let output = output.into();
        self.prompt_chars = messages.iter().map(ChatMessage::char_count).sum();
        self.completion_chars = output.chars().count();
        self.latency_ms = round_latency(latency_ms);
        self.output = output;
        self
    }

    /// Record for a failed invocation: zeroed metrics and the diagnostic in `notes`.
    pub fn failed(mut self, diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        self.prompt_chars = 0;
        self.completion_chars = 0;
        self.latency_ms = 0.0;
        self.est_cost_usd = 0.0;
        self.passed = false;
        self.output.clear();
        self.invocation_failed = true;
        self.notes = if diagnostic.is_empty() {
            "invocation failed".to_string()
        } else {
            diagnostic
        };
        self
    }

    /// Apply a scoring verdict.
    pub fn set_verdict(&mut self, verdict: Verdict) {
        self.passed = verdict.passed;
        self.notes = verdict.notes;
    }

    /// Whether the invocation behind this record failed.
    pub fn is_invocation_failure(&self) -> bool {
        self.invocation_failed
    }
}
