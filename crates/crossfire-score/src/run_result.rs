//! Run reports: one participant's outcomes on every enabled test.
//!
//! A report is free-form markdown with two recognized parts:
//!
//! ```text
//! ##### All basic tests were passed
//!
//! | author | input | expected | pass |
//! |-----|-----|-----|-----|
//! | alice | Паспорт 0123456789 | == PASSPORT_RF:0123456789 | true |
//! ```
//!
//! The base sentinel marks that the participant passed the organizers'
//! basic tests. Rows after the table start line are resolved against the
//! registry by case-insensitive, trimmed identity.

use crossfire_registry::TestDesc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ROW_DELIMITER: char = '|';
const ROW_FIELDS: usize = 4;

/// Where reports live and how they are recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ReportFormat {
    /// Reports directory: `<dir>/<login>/<file_name>`.
    pub dir: PathBuf,
    pub file_name: String,
    pub base_pass_sentinel: String,
    pub table_start_prefix: String,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            file_name: "report.md".to_string(),
            base_pass_sentinel: "##### All basic tests were passed".to_string(),
            table_start_prefix: "|-----".to_string(),
        }
    }
}

/// Outcome of one test in one participant's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunResult {
    pub author_of_test: String,
    pub input: String,
    pub expected: String,
    pub is_test_pass: bool,
    /// Registry record the row resolved to.
    pub test: TestDesc,
}

impl TestRunResult {
    pub fn full_string_to_processed(&self) -> String {
        format!("{}{}", self.input, self.expected)
    }

    /// Whether both runs are of the same test content, ignoring case and
    /// surrounding whitespace.
    pub fn same_content(&self, other: &TestRunResult) -> bool {
        self.input.trim().to_lowercase() == other.input.trim().to_lowercase()
            && self.expected.trim().to_lowercase() == other.expected.trim().to_lowercase()
    }
}

/// A table row that could not be split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub line: usize,
    pub raw: String,
    pub message: String,
}

/// Everything recognized in one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReport {
    pub is_pass_base: bool,
    pub results: Vec<TestRunResult>,
    pub malformed_rows: Vec<MalformedRow>,
}

/// Extract run outcomes from raw report text.
///
/// Rows whose test is unknown to the registry, or whose registry record is
/// disabled, are dropped.
pub fn extract_run_results(
    registry: &[TestDesc],
    text: &str,
    format: &ReportFormat,
) -> ExtractedReport {
    let mut report = ExtractedReport::default();
    let mut in_table = false;

    for (index, line) in text.lines().enumerate() {
        if line.trim() == format.base_pass_sentinel.trim() {
            report.is_pass_base = true;
            continue;
        }
        if line.starts_with(&format.table_start_prefix) {
            in_table = true;
            continue;
        }
        if !in_table || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line
            .trim()
            .trim_matches(ROW_DELIMITER)
            .split(ROW_DELIMITER)
            .map(str::trim)
            .collect();
        if fields.len() < ROW_FIELDS {
            report.malformed_rows.push(MalformedRow {
                line: index + 1,
                raw: line.to_string(),
                message: format!(
                    "expected {ROW_FIELDS} fields (author, input, expected, pass), found {}",
                    fields.len()
                ),
            });
            continue;
        }
        let (author, input, expected) = (fields[0], fields[1], fields[2]);
        let is_test_pass = fields[3].eq_ignore_ascii_case("true");

        let mut candidates = registry
            .iter()
            .filter(|test| test.matches_normalized(author, input, expected));
        let Some(test) = candidates.clone().find(|test| !test.is_disabled) else {
            if candidates.next().is_some() {
                tracing::debug!(line = index + 1, author, input, "row of a disabled test dropped");
            } else {
                tracing::debug!(line = index + 1, author, input, "row of an unknown test dropped");
            }
            continue;
        };

        report.results.push(TestRunResult {
            author_of_test: author.to_string(),
            input: input.to_string(),
            expected: expected.to_string(),
            is_test_pass,
            test: test.clone(),
        });
    }

    report
}
