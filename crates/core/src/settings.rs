// Copyright 2025 LLM Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harness configuration.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults (OpenRouter endpoint, two free models, `results.csv`)
//! 2. a config file (`llm-bench.{toml,yaml,json}` in the working directory, or
//!    an explicit path)
//! 3. `LLM_BENCH_*` environment variables (`LLM_BENCH_MODELS` is comma-separated)
//!
//! The API key may come from any layer as `api_key`; when absent it falls back
//! to `OPENROUTER_API_KEY`.
//!
//! # Example
//!
//! ```no_run
//! use llm_bench_core::HarnessSettings;
//!
//! let settings = HarnessSettings::load(None)?;
//! for model in &settings.models {
//!     println!("{model}");
//! }
//! # Ok::<(), llm_bench_core::Error>(())
//! ```

use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default chat-completions endpoint.
pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Models evaluated when none are configured.
pub const DEFAULT_MODELS: &[&str] = &["moonshotai/kimi-k2:free", "openai/gpt-oss-20b:free"];

/// Default result store path.
pub const DEFAULT_OUTPUT: &str = "results.csv";

/// Config file looked up in the working directory (any supported extension).
pub const DEFAULT_CONFIG_FILE: &str = "llm-bench";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "LLM_BENCH";

/// Fallback environment variable for the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Resolved harness configuration.
#[derive(Clone, Deserialize)]
pub struct HarnessSettings {
    /// Models to evaluate, in run order.
    pub models: Vec<String>,
    /// Base URL of the chat-completions service.
    pub api_base: String,
    /// Bearer token for the service.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Result store path.
    pub output: PathBuf,
    /// Per-request timeout. The transport default applies when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl HarnessSettings {
    /// Load settings from defaults, an optional config file and the environment.
    ///
    /// With `path = None` the default config file is optional; an explicit
    /// path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None, std::env::var(API_KEY_ENV).ok())
    }

    /// `env` replaces the process environment for the `LLM_BENCH_*` layer
    /// when set; `fallback_key` is the value of `OPENROUTER_API_KEY`.
    fn load_from(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
        fallback_key: Option<String>,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("models", DEFAULT_MODELS.to_vec())?
            .set_default("output", DEFAULT_OUTPUT)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("models")
                .source(env),
        );

        let mut settings: HarnessSettings = builder.build()?.try_deserialize()?;
        settings.models = normalize_models(settings.models);

        if settings.api_key.as_deref().map_or(true, str::is_empty) {
            settings.api_key = fallback_key.filter(|k| !k.is_empty());
        }

        settings.validate()?;
        tracing::debug!(
            models = settings.models.len(),
            api_base = %settings.api_base,
            output = %settings.output.display(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Replace the configured models.
    pub fn with_models(mut self, models: Vec<String>) -> Result<Self> {
        self.models = normalize_models(models);
        self.validate()?;
        Ok(self)
    }

    /// Replace the result store path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Check the invariants the harness relies on.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(Error::invalid_input("at least one model is required"));
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err(Error::invalid_input("model identifiers must not be empty"));
        }
        if self.api_base.trim().is_empty() {
            return Err(Error::invalid_input("api_base must not be empty"));
        }
        Ok(())
    }

    /// Whether an API key was resolved.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// `LLM_BENCH_MODELS="a/x, b/y"` splits into "a/x" and " b/y".
fn normalize_models(models: Vec<String>) -> Vec<String> {
    models
        .into_iter()
        .map(|m| m.trim().to_string())
        .collect()
}

impl fmt::Debug for HarnessSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessSettings")
            .field("models", &self.models)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("output", &self.output)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
models = ["a/model-one", "b/model-two", "c/model-three"]
api_base = "http://localhost:8080/v1"
api_key = "sk-test"
output = "out/run.csv"
request_timeout_secs = 30
"#,
        );

        let settings = HarnessSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.models.len(), 3);
        assert_eq!(settings.models[0], "a/model-one");
        assert_eq!(settings.api_base, "http://localhost:8080/v1");
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.output, PathBuf::from("out/run.csv"));
        assert_eq!(settings.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_file_falls_back_to_defaults() {
        let file = write_config("api_key = \"sk-test\"\n");

        let settings = HarnessSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.models, DEFAULT_MODELS);
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(settings.request_timeout_secs.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = HarnessSettings::load(Some(Path::new("/nonexistent/llm-bench.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_model_list_rejected() {
        let settings = HarnessSettings {
            models: Vec::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            request_timeout_secs: None,
        };

        let result = settings.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least one model"));
    }

    #[test]
    fn test_with_models_validates() {
        let file = write_config("api_key = \"sk-test\"\n");
        let settings = HarnessSettings::load(Some(file.path())).unwrap();

        let updated = settings
            .clone()
            .with_models(vec!["x/y".to_string()])
            .unwrap();
        assert_eq!(updated.models, vec!["x/y".to_string()]);

        let result = settings.with_models(vec!["  ".to_string()]);
        assert!(result.is_err());
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config(
            r#"
models = ["file/model"]
api_key = "sk-file"
"#,
        );

        let settings = HarnessSettings::load_from(
            Some(file.path()),
            env(&[
                ("LLM_BENCH_MODELS", "a/x, b/y ,c/z"),
                ("LLM_BENCH_API_KEY", "sk-env"),
                ("LLM_BENCH_OUTPUT", "env/results.csv"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(settings.models, vec!["a/x", "b/y", "c/z"]);
        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));
        assert_eq!(settings.output, PathBuf::from("env/results.csv"));
    }

    #[test]
    fn test_api_key_falls_back_to_openrouter_variable() {
        let file = write_config("output = \"run.csv\"\n");

        let settings = HarnessSettings::load_from(
            Some(file.path()),
            env(&[]),
            Some("sk-openrouter".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-openrouter"));

        let settings =
            HarnessSettings::load_from(Some(file.path()), env(&[]), Some(String::new())).unwrap();
        assert!(!settings.has_api_key());
    }

    #[test]
    fn test_configured_key_wins_over_fallback() {
        let file = write_config("api_key = \"sk-file\"\n");

        let settings = HarnessSettings::load_from(
            Some(file.path()),
            env(&[]),
            Some("sk-openrouter".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_with_models_trims_ids() {
        let file = write_config("api_key = \"sk-test\"\n");
        let settings = HarnessSettings::load_from(Some(file.path()), env(&[]), None).unwrap();

        let updated = settings
            .with_models(vec![" a/x".to_string(), "b/y\t".to_string()])
            .unwrap();
        assert_eq!(updated.models, vec!["a/x", "b/y"]);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let file = write_config("api_key = \"sk-very-secret\"\n");
        let settings = HarnessSettings::load(Some(file.path())).unwrap();

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
