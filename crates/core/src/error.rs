// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error type for the core crate.

use thiserror::Error;

/// Errors raised while building core types or loading settings.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A value failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an [`Error::InvalidInput`] from any message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
