//! Evaluation battery and run orchestration for LLM Bench.
//!
//! This crate holds the six fixed evaluation tasks, their scoring predicates,
//! the CSV result log and the [`Harness`] that drives a full run.
//!
//! # Quick Start
//!
//! ```no_run
//! use llm_bench_benchmarks::{Harness, ResultLog};
//! use llm_bench_providers::{ModelInvoker, OpenAiCompatClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiCompatClient::new("https://openrouter.ai/api/v1", Some("sk-..."))?;
//! let harness = Harness::new(ModelInvoker::new(client), ResultLog::new("results.csv"));
//!
//! let records = harness.run(&["openai/gpt-oss-20b:free".to_string()]).await?;
//! println!("{} records logged", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`tasks`] - The `Task` battery and its prompts
//! - [`scoring`] - Pure scoring predicates
//! - [`io`] - The CSV result log
//! - [`markdown`] - Markdown summary generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod io;
pub mod markdown;
pub mod scoring;
pub mod tasks;

pub use io::{LogError, LoggedRow, ResultLog, COLUMNS};
pub use markdown::{generate_summary, write_summary, Outcome};
pub use tasks::{Task, UnknownTask};

use llm_bench_core::ResultRecord;
use llm_bench_providers::{ChatClient, ModelInvoker};
use tracing::{info, info_span, Instrument};

/// Runs the task battery against a list of models, logging every record.
pub struct Harness<C> {
    invoker: ModelInvoker<C>,
    log: ResultLog,
    tasks: Vec<Task>,
}

impl<C: ChatClient> Harness<C> {
    /// Create a harness running every task in [`Task::ALL`].
    pub fn new(invoker: ModelInvoker<C>, log: ResultLog) -> Self {
        Self {
            invoker,
            log,
            tasks: Task::ALL.to_vec(),
        }
    }

    /// Restrict the run to `tasks`, kept in the given order.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Run every task against every model, in order.
    ///
    /// The log is initialized once, before any invocation. Each record is
    /// appended as soon as it is produced and a summary line is printed to
    /// stdout. Model failures become failed records; only a log error stops
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns a [`LogError`] if the store cannot be initialized or written.
    pub async fn run(&self, models: &[String]) -> Result<Vec<ResultRecord>, LogError> {
        self.log.initialize()?;
        info!(
            models = models.len(),
            tasks = self.tasks.len(),
            output = %self.log.path().display(),
            "Starting evaluation run"
        );

        let mut logged = Vec::new();
        for model_id in models {
            let span = info_span!("model", model = %model_id);
            let records = self.run_model(model_id).instrument(span).await?;
            logged.extend(records);
        }

        let passed = logged.iter().filter(|r| r.passed).count();
        info!(records = logged.len(), passed, "Evaluation run complete");
        Ok(logged)
    }

    async fn run_model(&self, model_id: &str) -> Result<Vec<ResultRecord>, LogError> {
        let mut logged = Vec::new();
        for task in &self.tasks {
            let records = task
                .evaluate(&self.invoker, model_id)
                .instrument(info_span!("task", task = task.name()))
                .await;
            for record in records {
                self.log.append(&record)?;
                println!("{}", summary_line(&record));
                logged.push(record);
            }
        }
        Ok(logged)
    }
}

/// One-line console summary of a logged record.
pub fn summary_line(record: &ResultRecord) -> String {
    let mut line = format!(
        "[{}] {} temp={} -> passed={}",
        record.model_id, record.task, record.temperature, record.passed
    );
    if !record.notes.is_empty() {
        line.push_str(&format!(" ({})", record.notes.replace('\n', " ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_bench_core::Verdict;

    #[test]
    fn test_summary_line() {
        let mut record = ResultRecord::new("vendor/model", "temp_sweep", 1.3, None);
        record.set_verdict(Verdict::fail("word_count=52"));
        assert_eq!(
            summary_line(&record),
            "[vendor/model] temp_sweep temp=1.3 -> passed=false (word_count=52)"
        );
    }

    #[test]
    fn test_summary_line_without_notes() {
        let mut record = ResultRecord::new("m", "strict_json", 0.7, None);
        record.set_verdict(Verdict::pass());
        assert_eq!(summary_line(&record), "[m] strict_json temp=0.7 -> passed=true");
    }

    #[test]
    fn test_summary_line_flattens_newlines() {
        let record = ResultRecord::new("m", "strict_json", 0.0, None).failed("HTTP 500: a\nb");
        assert_eq!(
            summary_line(&record),
            "[m] strict_json temp=0 -> passed=false (HTTP 500: a b)"
        );
    }
}
