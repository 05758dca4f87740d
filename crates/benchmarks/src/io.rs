//! Result log I/O.
//!
//! The store is a flat CSV file with a fixed 11-column header. It is
//! truncated once per run by [`ResultLog::initialize`] and then only ever
//! appended to, one complete row per [`ResultLog::append`]. Each append opens
//! the file, writes, flushes and closes it, so an interrupted run leaves a
//! complete header followed by complete rows.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use csv::{ReaderBuilder, WriterBuilder};
use llm_bench_core::ResultRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store columns, in order.
pub const COLUMNS: [&str; 11] = [
    "timestamp",
    "model_id",
    "task",
    "temperature",
    "seed",
    "prompt_chars",
    "completion_chars",
    "latency_ms",
    "est_cost_usd",
    "passed",
    "notes",
];

/// Errors raised by the result log. These are fatal to a run.
#[derive(Debug, Error)]
pub enum LogError {
    /// The store could not be opened, created or written.
    #[error("Result store I/O error at {path}: {source}")]
    Io {
        /// Store path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A row could not be encoded or decoded.
    #[error("Result store CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The store's header is not the expected column set.
    #[error("Result store header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        /// Expected columns.
        expected: Vec<String>,
        /// Columns found in the file.
        found: Vec<String>,
    },
}

/// Result type for log operations.
pub type Result<T> = std::result::Result<T, LogError>;

/// Projection of a [`ResultRecord`] onto the store columns.
#[derive(Debug, Serialize)]
struct Row<'a> {
    timestamp: String,
    model_id: &'a str,
    task: &'a str,
    temperature: f64,
    seed: Option<u64>,
    prompt_chars: usize,
    completion_chars: usize,
    latency_ms: f64,
    est_cost_usd: f64,
    passed: bool,
    notes: &'a str,
}

impl<'a> From<&'a ResultRecord> for Row<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            timestamp: record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            model_id: &record.model_id,
            task: &record.task,
            temperature: record.temperature,
            seed: record.seed,
            prompt_chars: record.prompt_chars,
            completion_chars: record.completion_chars,
            latency_ms: record.latency_ms,
            est_cost_usd: record.est_cost_usd,
            passed: record.passed,
            notes: &record.notes,
        }
    }
}

/// One row read back from the store, as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggedRow {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Model identifier.
    pub model_id: String,
    /// Task identifier.
    pub task: String,
    /// Temperature.
    pub temperature: String,
    /// Seed, empty when none was sent.
    pub seed: String,
    /// Prompt character count.
    pub prompt_chars: String,
    /// Completion character count.
    pub completion_chars: String,
    /// Latency in milliseconds.
    pub latency_ms: String,
    /// Estimated cost.
    pub est_cost_usd: String,
    /// `true` or `false`.
    pub passed: String,
    /// Diagnostic notes.
    pub notes: String,
}

impl LoggedRow {
    /// Whether the row records a pass.
    pub fn is_passed(&self) -> bool {
        self.passed.eq_ignore_ascii_case("true")
    }
}

/// Handle to an append-only CSV result store.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// Create a handle. Nothing is touched on disk until [`initialize`](Self::initialize).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or truncate the store and write the header row.
    ///
    /// Must be called once per run before any [`append`](Self::append).
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(COLUMNS)?;
        writer.flush().map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "Result store initialized");
        Ok(())
    }

    /// Append one record, projecting it onto [`COLUMNS`]. `output` is never written.
    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(Row::from(record))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Read every data row back, checking the header.
    pub fn read_rows(&self) -> Result<Vec<LoggedRow>> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if found != COLUMNS {
            return Err(LogError::HeaderMismatch {
                expected: COLUMNS.iter().map(|c| c.to_string()).collect(),
                found,
            });
        }

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    fn io_error(&self, source: io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_bench_core::{ChatMessage, Verdict};

    fn sample(task: &str, seed: Option<u64>, notes: &str) -> ResultRecord {
        let mut record = ResultRecord::new("vendor/model", task, 0.7, seed).completed(
            &[ChatMessage::user("prompt")],
            "raw completion text",
            123.456,
        );
        record.set_verdict(Verdict::pass_with(notes));
        record
    }

    #[test]
    fn test_initialize_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "timestamp,model_id,task,temperature,seed,prompt_chars,completion_chars,latency_ms,est_cost_usd,passed,notes\n"
        );
        assert!(log.read_rows().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();
        log.append(&sample("strict_json", None, "")).unwrap();
        log.append(&sample("strict_json", None, "")).unwrap();

        log.initialize().unwrap();
        assert!(log.read_rows().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("nested/out/results.csv"));
        log.initialize().unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_append_preserves_order_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();

        let tasks = ["temp_sweep", "strict_json", "quote_only_qa", "style_control"];
        for task in tasks {
            log.append(&sample(task, None, "")).unwrap();
        }

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1 + tasks.len());

        let rows = log.read_rows().unwrap();
        let logged: Vec<&str> = rows.iter().map(|r| r.task.as_str()).collect();
        assert_eq!(logged, tasks);
    }

    #[test]
    fn test_output_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();
        log.append(&sample("temp_sweep", None, "word_count=3")).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains("raw completion text"));
        assert!(!content.contains("output"));
    }

    #[test]
    fn test_fields_round_trip_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();

        let record = sample("seed_stability", Some(42), "notes, with \"quotes\"\nand a newline");
        log.append(&record).unwrap();

        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(
            chrono::DateTime::parse_from_rfc3339(&row.timestamp).unwrap(),
            record.timestamp
        );
        assert_eq!(row.model_id, "vendor/model");
        assert_eq!(row.task, "seed_stability");
        assert_eq!(row.temperature, "0.7");
        assert_eq!(row.seed, "42");
        assert_eq!(row.prompt_chars, "6");
        assert_eq!(row.completion_chars, "19");
        assert_eq!(row.latency_ms, "123.46");
        assert_eq!(row.est_cost_usd, "0.0");
        assert_eq!(row.passed, "true");
        assert!(row.is_passed());
        assert_eq!(row.notes, "notes, with \"quotes\"\nand a newline");
    }

    #[test]
    fn test_absent_seed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("results.csv"));
        log.initialize().unwrap();
        log.append(&ResultRecord::new("m", "strict_json", 0.0, None).failed("timeout"))
            .unwrap();

        let rows = log.read_rows().unwrap();
        assert_eq!(rows[0].seed, "");
        assert_eq!(rows[0].temperature, "0.0");
        assert_eq!(rows[0].passed, "false");
        assert_eq!(rows[0].latency_ms, "0.0");
        assert_eq!(rows[0].notes, "timeout");
    }

    #[test]
    fn test_append_without_initialize_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("missing.csv"));
        let result = log.append(&sample("strict_json", None, ""));
        assert!(matches!(result, Err(LogError::Io { .. })));
    }

    #[test]
    fn test_header_mismatch_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        let log = ResultLog::new(path);
        assert!(matches!(
            log.read_rows(),
            Err(LogError::HeaderMismatch { .. })
        ));
    }
}
