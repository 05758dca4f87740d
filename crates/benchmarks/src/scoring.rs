//! Scoring predicates.
//!
//! One pure function per task, each mapping raw model output to a
//! [`Verdict`]. Predicates never panic and never return errors: anything that
//! goes wrong while scoring (for example unparseable JSON) is a failed verdict
//! with an explanatory note.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use llm_bench_core::Verdict;
use serde_json::Value;

/// Accepted word counts for the temperature sweep.
pub const WORD_RANGE: RangeInclusive<usize> = 30..=40;

/// Exact string a model must produce for an unanswerable question.
pub const REFUSAL: &str = "Sorry, I can’t answer that.";

/// Proper noun that must survive translation and back-translation.
pub const PRESERVED_NOUN: &str = "Albert Einstein";

/// Unicode block of the translation target script (Devanagari, for Hindi).
pub const TARGET_SCRIPT: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Characters that end a sentence.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Maximum sentences allowed by the style-control task.
pub const MAX_SENTENCES: usize = 3;

const JSON_KEYS: [&str; 3] = ["title", "pros", "cons"];

/// Number of whitespace-separated words.
pub fn count_words(output: &str) -> usize {
    output.split_whitespace().count()
}

/// temp_sweep: word count within [`WORD_RANGE`].
pub fn word_count(output: &str) -> Verdict {
    let count = count_words(output);
    let notes = format!("word_count={}", count);
    if WORD_RANGE.contains(&count) {
        Verdict::pass_with(notes)
    } else {
        Verdict::fail(notes)
    }
}

/// strict_json: a JSON object with exactly `title`, `pros` and `cons`, where
/// `pros` and `cons` are arrays of two elements.
pub fn strict_json(output: &str) -> Verdict {
    let value: Value = match serde_json::from_str(output) {
        Ok(value) => value,
        Err(e) => return Verdict::fail(format!("JSON error: {}", e)),
    };

    let Some(object) = value.as_object() else {
        return Verdict::fail(format!("invalid shape: expected an object, got {}", kind(&value)));
    };

    let keys: BTreeSet<&str> = object.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = JSON_KEYS.into_iter().collect();
    if keys != expected {
        return Verdict::fail(format!("invalid shape: got keys {:?}", keys));
    }

    for field in ["pros", "cons"] {
        match object.get(field) {
            Some(Value::Array(items)) if items.len() == 2 => {}
            Some(Value::Array(items)) => {
                return Verdict::fail(format!(
                    "invalid shape: {} has {} items, expected 2",
                    field,
                    items.len()
                ));
            }
            Some(other) => {
                return Verdict::fail(format!(
                    "invalid shape: {} is {}, expected array",
                    field,
                    kind(other)
                ));
            }
            None => return Verdict::fail(format!("invalid shape: {} is missing", field)),
        }
    }

    Verdict::pass()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// quote_only_qa: the exact refusal string appears verbatim.
pub fn exact_refusal(output: &str) -> Verdict {
    if output.contains(REFUSAL) {
        Verdict::pass()
    } else {
        Verdict::fail("refusal for the unanswerable question is not exact")
    }
}

/// translation_back: output contains target-script text and the preserved noun.
pub fn back_translation(output: &str) -> Verdict {
    let has_script = output.chars().any(|c| TARGET_SCRIPT.contains(&c));
    let keeps_noun = output.contains(PRESERVED_NOUN);
    if has_script && keeps_noun {
        Verdict::pass()
    } else {
        Verdict::fail(format!(
            "has_hindi={}, keeps_name={}",
            has_script, keeps_noun
        ))
    }
}

/// seed_stability: every output is identical to the first.
pub fn seed_stability<S: AsRef<str>>(outputs: &[S]) -> Verdict {
    let Some(first) = outputs.first() else {
        return Verdict::fail("no outputs to compare");
    };
    if outputs.iter().all(|o| o.as_ref() == first.as_ref()) {
        Verdict::pass()
    } else {
        Verdict::fail(format!(
            "outputs differ across {} runs with a fixed seed",
            outputs.len()
        ))
    }
}

/// Non-empty fragments between sentence terminators.
pub fn count_sentences(output: &str) -> usize {
    output
        .split(SENTENCE_TERMINATORS)
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

/// style_control: at most [`MAX_SENTENCES`] sentences.
pub fn sentence_limit(output: &str) -> Verdict {
    let count = count_sentences(output);
    if count <= MAX_SENTENCES {
        Verdict::pass()
    } else {
        Verdict::fail(format!("sentence_count={}", count))
    }
}
