//! Markdown output generation for evaluation results.
//!
//! Renders a pass-count matrix (models by tasks) from either freshly produced
//! [`ResultRecord`]s or rows read back from a result store.

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::Path;

use llm_bench_core::ResultRecord;

use crate::io::LoggedRow;

/// The parts of a result needed for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome<'a> {
    /// Model identifier.
    pub model_id: &'a str,
    /// Task identifier.
    pub task: &'a str,
    /// Verdict.
    pub passed: bool,
}

impl<'a> From<&'a ResultRecord> for Outcome<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            model_id: &record.model_id,
            task: &record.task,
            passed: record.passed,
        }
    }
}

impl<'a> From<&'a LoggedRow> for Outcome<'a> {
    fn from(row: &'a LoggedRow) -> Self {
        Self {
            model_id: &row.model_id,
            task: &row.task,
            passed: row.is_passed(),
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Count {
    passed: usize,
    total: usize,
}

impl Count {
    fn add(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Generate a markdown summary. Models and tasks appear in first-seen order.
pub fn generate_summary(outcomes: &[Outcome<'_>]) -> String {
    let mut models: Vec<&str> = Vec::new();
    let mut tasks: Vec<&str> = Vec::new();
    for outcome in outcomes {
        if !models.contains(&outcome.model_id) {
            models.push(outcome.model_id);
        }
        if !tasks.contains(&outcome.task) {
            tasks.push(outcome.task);
        }
    }

    let mut cells = vec![vec![Count::default(); tasks.len()]; models.len()];
    let mut per_model = vec![Count::default(); models.len()];
    let mut overall = Count::default();
    for outcome in outcomes {
        let m = models.iter().position(|m| *m == outcome.model_id).unwrap_or(0);
        let t = tasks.iter().position(|t| *t == outcome.task).unwrap_or(0);
        cells[m][t].add(outcome.passed);
        per_model[m].add(outcome.passed);
        overall.add(outcome.passed);
    }

    let mut output = String::new();

    writeln!(output, "# Evaluation Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Results").unwrap();
    writeln!(output).unwrap();

    if outcomes.is_empty() {
        writeln!(output, "No results recorded.").unwrap();
        return output;
    }

    write!(output, "| Model |").unwrap();
    for task in &tasks {
        write!(output, " {} |", task).unwrap();
    }
    writeln!(output, " Pass rate |").unwrap();

    write!(output, "|-------|").unwrap();
    for task in &tasks {
        write!(output, "{}|", "-".repeat(task.len() + 2)).unwrap();
    }
    writeln!(output, "-----------|").unwrap();

    for (m, model) in models.iter().enumerate() {
        write!(output, "| {} |", model).unwrap();
        for count in &cells[m] {
            if count.total == 0 {
                write!(output, " - |").unwrap();
            } else {
                write!(output, " {}/{} |", count.passed, count.total).unwrap();
            }
        }
        writeln!(output, " {:.1}% |", per_model[m].rate()).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(
        output,
        "Total evaluations: {} ({} passed, {:.1}%)",
        overall.total,
        overall.passed,
        overall.rate()
    )
    .unwrap();

    output
}

/// Write the markdown summary to `path`, creating parent directories.
pub fn write_summary(path: impl AsRef<Path>, outcomes: &[Outcome<'_>]) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, generate_summary(outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome<'a>(model_id: &'a str, task: &'a str, passed: bool) -> Outcome<'a> {
        Outcome {
            model_id,
            task,
            passed,
        }
    }

    #[test]
    fn test_summary_matrix() {
        let outcomes = vec![
            outcome("a/one", "temp_sweep", true),
            outcome("a/one", "temp_sweep", false),
            outcome("a/one", "temp_sweep", true),
            outcome("a/one", "strict_json", true),
            outcome("b/two", "temp_sweep", false),
        ];

        let summary = generate_summary(&outcomes);
        assert!(summary.contains("| Model | temp_sweep | strict_json | Pass rate |"));
        assert!(summary.contains("| a/one | 2/3 | 1/1 | 75.0% |"));
        assert!(summary.contains("| b/two | 0/1 | - | 0.0% |"));
        assert!(summary.contains("Total evaluations: 5 (3 passed, 60.0%)"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = generate_summary(&[]);
        assert!(summary.contains("No results recorded."));
    }

    #[test]
    fn test_outcome_from_record() {
        let mut record = ResultRecord::new("m", "style_control", 0.7, None);
        record.passed = true;
        let outcome = Outcome::from(&record);
        assert_eq!(outcome, super::Outcome {
            model_id: "m",
            task: "style_control",
            passed: true
        });
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/summary.md");
        write_summary(&path, &[outcome("m", "strict_json", true)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Evaluation Summary"));
        assert!(content.contains("| m | 1/1 | 100.0% |"));
    }
}
