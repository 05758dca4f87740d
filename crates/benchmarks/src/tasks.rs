//! The fixed evaluation battery.
//!
//! Each [`Task`] variant owns its prompt strategy and scoring predicate.
//! [`Task::evaluate`] builds the prompt(s), invokes the model through a
//! [`ModelInvoker`], scores the output and returns the records to log:
//!
//! | Task | Invocations | Records |
//! |------|-------------|---------|
//! | `temp_sweep` | 3 (one per temperature) | 3 |
//! | `strict_json` | 1 | 1 |
//! | `quote_only_qa` | 1 | 1 |
//! | `translation_back` | 1 | 1 |
//! | `seed_stability` | 3 (same seed) | 1 |
//! | `style_control` | 1 | 1 |
//!
//! A record whose invocation failed is returned unscored, keeping its
//! diagnostic.

use std::fmt;
use std::str::FromStr;

use llm_bench_core::{ChatMessage, ResultRecord, Verdict};
use llm_bench_providers::{ChatClient, ModelInvoker};
use thiserror::Error;
use tracing::debug;

use crate::scoring;

/// Temperature used by every task that does not sweep.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Temperatures visited by `temp_sweep`, in order.
pub const SWEEP_TEMPERATURES: [f64; 3] = [0.0, 0.7, 1.3];

/// Seed sent on every `seed_stability` run.
pub const STABILITY_SEED: u64 = 42;

/// Number of `seed_stability` runs compared.
pub const STABILITY_RUNS: usize = 3;

const SWEEP_PROMPT: &str = "Explain Dijkstra’s algorithm in 30–40 words.";

const STRICT_JSON_PROMPT: &str = "Return a JSON object with keys title (string), pros (array of 2 strings), \
cons (array of 2 strings). No extra keys. Topic: ice cream for breakfast.";

const QA_PASSAGE: &str = "Artificial Intelligence (AI) is a field of computer science that focuses on \
building systems capable of performing tasks that typically require human intelligence. \
These tasks include problem-solving, reasoning, perception, and natural language understanding. \
One of the key subfields is Machine Learning (ML), where systems learn from data and improve \
performance over time without being explicitly programmed. AI has applications across industries \
such as healthcare, finance, transportation, and education. While AI offers immense potential, \
it also raises ethical concerns regarding bias, privacy, and job displacement. \
Responsible AI development is therefore a major research focus.";

// The third question cannot be answered from the passage.
const QA_QUESTIONS: [&str; 3] = [
    "What is the main focus of Artificial Intelligence?",
    "Name one industry where AI is applied.",
    "Who invented Artificial Intelligence?",
];

const TRANSLATION_PROMPT: &str = "Translate to Hindi, then back to English. Keep proper nouns unchanged. \
Text: 'Albert Einstein was a famous physicist known for the theory of relativity.'";

const STABILITY_PROMPT: &str = "Summarize the importance of clean energy in one sentence.";

const STYLE_SYSTEM_PROMPT: &str =
    "You are concise and never exceed 3 sentences. And only talk like yoda from star wars.";

const STYLE_USER_PROMPT: &str = "Define top-p in 2–3 sentences.";

/// Returned when a task name is not part of the battery.
#[derive(Debug, Error)]
#[error("unknown task '{0}' (expected one of: temp_sweep, strict_json, quote_only_qa, translation_back, seed_stability, style_control)")]
pub struct UnknownTask(pub String);

/// One evaluation scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Length control across sampling temperatures.
    TempSweep,
    /// Strictly shaped JSON output.
    StrictJson,
    /// Passage-grounded QA with an exact refusal.
    QuoteOnlyQa,
    /// Translation round trip preserving a proper noun.
    TranslationBack,
    /// Determinism under a fixed seed.
    SeedStability,
    /// Persona and sentence-count constraints from a system prompt.
    StyleControl,
}

impl Task {
    /// Every task, in run order.
    pub const ALL: [Task; 6] = [
        Task::TempSweep,
        Task::StrictJson,
        Task::QuoteOnlyQa,
        Task::TranslationBack,
        Task::SeedStability,
        Task::StyleControl,
    ];

    /// Identifier written to the `task` column.
    pub fn name(&self) -> &'static str {
        match self {
            Task::TempSweep => "temp_sweep",
            Task::StrictJson => "strict_json",
            Task::QuoteOnlyQa => "quote_only_qa",
            Task::TranslationBack => "translation_back",
            Task::SeedStability => "seed_stability",
            Task::StyleControl => "style_control",
        }
    }

    /// One-line description of the pass criterion.
    pub fn description(&self) -> &'static str {
        match self {
            Task::TempSweep => "30-40 words at temperatures 0.0, 0.7 and 1.3",
            Task::StrictJson => "JSON object with exactly title, pros[2], cons[2]",
            Task::QuoteOnlyQa => "exact refusal for the unanswerable question",
            Task::TranslationBack => "Hindi script present and 'Albert Einstein' preserved",
            Task::SeedStability => "three identical outputs with seed 42",
            Task::StyleControl => "at most 3 sentences under a persona system prompt",
        }
    }

    /// Messages sent for this task.
    pub fn messages(&self) -> Vec<ChatMessage> {
        match self {
            Task::TempSweep => vec![ChatMessage::user(SWEEP_PROMPT)],
            Task::StrictJson => vec![ChatMessage::user(STRICT_JSON_PROMPT)],
            Task::QuoteOnlyQa => vec![ChatMessage::user(qa_prompt())],
            Task::TranslationBack => vec![ChatMessage::user(TRANSLATION_PROMPT)],
            Task::SeedStability => vec![ChatMessage::user(STABILITY_PROMPT)],
            Task::StyleControl => vec![
                ChatMessage::system(STYLE_SYSTEM_PROMPT),
                ChatMessage::user(STYLE_USER_PROMPT),
            ],
        }
    }

    /// Score a single output.
    ///
    /// `seed_stability` compares several outputs; a lone output is trivially
    /// stable.
    pub fn score(&self, output: &str) -> Verdict {
        match self {
            Task::TempSweep => scoring::word_count(output),
            Task::StrictJson => scoring::strict_json(output),
            Task::QuoteOnlyQa => scoring::exact_refusal(output),
            Task::TranslationBack => scoring::back_translation(output),
            Task::SeedStability => scoring::seed_stability(&[output]),
            Task::StyleControl => scoring::sentence_limit(output),
        }
    }

    /// Run this task against `model_id` and return the scored records to log.
    pub async fn evaluate<C: ChatClient>(
        &self,
        invoker: &ModelInvoker<C>,
        model_id: &str,
    ) -> Vec<ResultRecord> {
        let messages = self.messages();
        match self {
            Task::TempSweep => {
                let mut records = Vec::with_capacity(SWEEP_TEMPERATURES.len());
                for temperature in SWEEP_TEMPERATURES {
                    let record = invoker
                        .invoke(model_id, self.name(), &messages, temperature, None)
                        .await;
                    records.push(self.finalize(record));
                }
                records
            }
            Task::SeedStability => vec![self.evaluate_stability(invoker, model_id, &messages).await],
            _ => {
                let record = invoker
                    .invoke(model_id, self.name(), &messages, DEFAULT_TEMPERATURE, None)
                    .await;
                vec![self.finalize(record)]
            }
        }
    }

    async fn evaluate_stability<C: ChatClient>(
        &self,
        invoker: &ModelInvoker<C>,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> ResultRecord {
        let mut runs = Vec::with_capacity(STABILITY_RUNS);
        for _ in 0..STABILITY_RUNS {
            let record = invoker
                .invoke(
                    model_id,
                    self.name(),
                    messages,
                    DEFAULT_TEMPERATURE,
                    Some(STABILITY_SEED),
                )
                .await;
            runs.push(record);
        }

        let verdict = match runs.iter().position(ResultRecord::is_invocation_failure) {
            Some(0) => None,
            Some(i) => Some(Verdict::fail(format!(
                "run {} of {} failed: {}",
                i + 1,
                STABILITY_RUNS,
                runs[i].notes
            ))),
            None => {
                let outputs: Vec<&str> = runs.iter().map(|r| r.output.as_str()).collect();
                Some(scoring::seed_stability(&outputs))
            }
        };

        let mut first = runs.swap_remove(0);
        if let Some(verdict) = verdict {
            first.set_verdict(verdict);
        }
        first
    }

    fn finalize(&self, mut record: ResultRecord) -> ResultRecord {
        if record.is_invocation_failure() {
            debug!(task = self.name(), notes = %record.notes, "Skipping scoring of failed invocation");
            return record;
        }
        let verdict = self.score(&record.output);
        record.set_verdict(verdict);
        record
    }
}

fn qa_prompt() -> String {
    let mut prompt = format!(
        "Passage:\n{}\n\nAnswer the following questions based only on the passage. \
If a question can’t be answered from the passage, reply exactly: {}\n\n",
        QA_PASSAGE,
        scoring::REFUSAL
    );
    for (i, question) in QA_QUESTIONS.iter().enumerate() {
        prompt.push_str(&format!("Q{}: {}\n", i + 1, question));
    }
    prompt
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|task| task.name() == s.trim())
            .ok_or_else(|| UnknownTask(s.to_string()))
    }
}
