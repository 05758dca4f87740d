// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for LLM Bench.
//!
//! This crate holds the data contract shared by every other crate in the
//! workspace:
//!
//! - [`record`] - the uniform [`ResultRecord`] every task produces, plus the
//!   chat message types sent to a model
//! - [`settings`] - layered harness configuration (defaults, file, environment)
//! - [`error`] - the crate error type

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod record;
pub mod settings;

pub use error::{Error, Result};
pub use record::{round_latency, ChatMessage, ResultRecord, Role, Verdict};
pub use settings::HarnessSettings;
