//! TestDesc: one exchanged test and the unit of registry state.

use chrono::{DateTime, Utc};
use crossfire_expect::{ExpectError, ExpectedResult};
use serde::{Deserialize, Serialize};

/// A published test as recorded in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDesc {
    /// Login of the participant who published the test.
    pub author: String,

    /// Free-text input handed to every participant's extractor.
    pub input: String,

    /// Operator and expected documents, e.g. `== PASSPORT_RF:0123456789`.
    pub expected: String,

    #[serde(default)]
    pub is_disabled: bool,

    #[serde(default)]
    pub comment_on_failure: String,

    /// First time this test was seen by a reconciliation pass.
    pub publish_time: DateTime<Utc>,
}

impl TestDesc {
    /// Identity used for reconciliation: `author:input->expected`.
    ///
    /// Exact and case-sensitive; any change to input or expected yields a
    /// different test.
    pub fn biz_key(&self) -> String {
        biz_key(&self.author, &self.input, &self.expected)
    }

    /// Full grammar text of the test: the input is the left segment.
    pub fn grammar_text(&self) -> String {
        grammar_text(&self.input, &self.expected)
    }

    /// Parse the test's expectation.
    pub fn expected_result(&self) -> Result<ExpectedResult, ExpectError> {
        ExpectedResult::parse(&self.grammar_text())
    }

    /// Whole minutes elapsed from `start` to publication (negative if the
    /// test was published before `start`).
    pub fn minutes_to_publish(&self, start: DateTime<Utc>) -> i64 {
        (self.publish_time - start).num_minutes()
    }

    /// Whether `author`, `input` and `expected` name this test after
    /// case-insensitive, whitespace-trimmed normalization.
    pub fn matches_normalized(&self, author: &str, input: &str, expected: &str) -> bool {
        normalize_field(&self.author) == normalize_field(author)
            && normalize_field(&self.input) == normalize_field(input)
            && normalize_field(&self.expected) == normalize_field(expected)
    }
}

pub fn biz_key(author: &str, input: &str, expected: &str) -> String {
    format!("{author}:{input}->{expected}")
}

pub(crate) fn grammar_text(input: &str, expected: &str) -> String {
    format!("{input} {expected}")
}

/// Normalization for comparisons against free-form run reports.
pub fn normalize_field(value: &str) -> String {
    value.trim().to_lowercase()
}
