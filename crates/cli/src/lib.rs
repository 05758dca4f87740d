//! CLI for LLM Bench.
//!
//! This crate provides the `llm-bench` command-line interface: `run` drives
//! the evaluation battery, `status` shows the resolved configuration and
//! `report` summarizes an existing result store.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_bench_benchmarks::{markdown, Harness, Outcome, ResultLog, Task};
use llm_bench_core::HarnessSettings;
use llm_bench_providers::{ModelInvoker, OpenAiCompatClient};
use tracing::warn;

/// LLM Bench CLI.
#[derive(Parser, Debug)]
#[command(name = "llm-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the evaluation battery against every configured model.
    ///
    /// The result store is truncated first, then one row is appended per
    /// evaluation and a summary line is printed for each.
    Run {
        /// Config file (defaults to ./llm-bench.{toml,yaml,json} if present).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Result store path override.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model to evaluate; repeat to evaluate several. Replaces configured models.
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Also write a markdown summary to this path.
        #[arg(short, long)]
        summary: Option<PathBuf>,

        /// Restrict the run to these tasks (default: all six).
        #[arg(short, long = "task")]
        tasks: Vec<Task>,
    },

    /// Show the resolved configuration.
    Status {
        /// Config file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also list the task battery.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print a markdown summary of an existing result store.
    Report {
        /// Result store to read.
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Run the CLI with the given arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(cli.command).await
}

/// Execute a parsed command.
pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            output,
            models,
            summary,
            tasks,
        } => {
            let mut settings =
                HarnessSettings::load(config.as_deref()).context("Failed to load settings")?;
            if !models.is_empty() {
                settings = settings.with_models(models)?;
            }
            if let Some(output) = output {
                settings = settings.with_output(output);
            }
            if !settings.has_api_key() {
                warn!("No API key configured; requests are sent unauthenticated");
            }

            let client = OpenAiCompatClient::from_settings(&settings)
                .context("Failed to build model client")?;
            let mut harness =
                Harness::new(ModelInvoker::new(client), ResultLog::new(&settings.output));
            if !tasks.is_empty() {
                harness = harness.with_tasks(tasks);
            }

            let records = harness
                .run(&settings.models)
                .await
                .with_context(|| format!("Run aborted writing {}", settings.output.display()))?;

            if let Some(path) = summary {
                let outcomes: Vec<Outcome<'_>> = records.iter().map(Outcome::from).collect();
                markdown::write_summary(&path, &outcomes)
                    .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            }

            let passed = records.iter().filter(|r| r.passed).count();
            println!(
                "Completed {} evaluations ({} passed). Results written to {}",
                records.len(),
                passed,
                settings.output.display()
            );
            Ok(())
        }
        Commands::Status { config, detailed } => {
            let settings =
                HarnessSettings::load(config.as_deref()).context("Failed to load settings")?;

            println!("LLM Bench");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Endpoint: {}", settings.api_base);
            println!(
                "API key: {}",
                if settings.has_api_key() { "configured" } else { "missing" }
            );
            println!("Output: {}", settings.output.display());
            println!("\nModels:");
            for model in &settings.models {
                println!("  - {}", model);
            }

            if detailed {
                println!("\nTasks:");
                for task in Task::ALL {
                    println!("  - {}: {}", task.name(), task.description());
                }
            }

            Ok(())
        }
        Commands::Report { input } => {
            let rows = ResultLog::new(&input)
                .read_rows()
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let outcomes: Vec<Outcome<'_>> = rows.iter().map(Outcome::from).collect();
            print!("{}", markdown::generate_summary(&outcomes));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "llm-bench",
            "run",
            "--model",
            "a/one",
            "--model",
            "b/two",
            "--task",
            "strict_json",
            "--output",
            "out/results.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                models,
                tasks,
                output,
                summary,
                config,
            } => {
                assert_eq!(models, vec!["a/one", "b/two"]);
                assert_eq!(tasks, vec![Task::StrictJson]);
                assert_eq!(output, Some(PathBuf::from("out/results.csv")));
                assert!(summary.is_none());
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_task() {
        let result = Cli::try_parse_from(["llm-bench", "run", "--task", "vibes"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_report_requires_input() {
        assert!(Cli::try_parse_from(["llm-bench", "report"]).is_err());
        assert!(Cli::try_parse_from(["llm-bench", "report", "--input", "r.csv"]).is_ok());
    }

    #[tokio::test]
    async fn test_report_missing_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(Commands::Report {
            input: dir.path().join("absent.csv"),
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_report_reads_store() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();

        let result = execute(Commands::Report {
            input: log.path().to_path_buf(),
        })
        .await;
        assert!(result.is_ok());
    }
}
