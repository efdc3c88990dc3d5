//! Per-author local snapshots.
//!
//! Each participant keeps a local file in their repository listing the tests
//! they currently publish. One line per test:
//!
//! ```text
//! # comment lines and blank lines are ignored
//! Паспорт 01 23 456789 | == PASSPORT_RF:0123456789 | spaces inside
//! !withdrawn input     | ~? INN_UL:7707083893
//! ```
//!
//! A leading `!` on the input withdraws the test without deleting it. The
//! `+`/`-` suffixes inside the expected field are document validity markers
//! and never affect whether the test is enabled.

use crate::registry_file::RegistryFileError;
use crate::test_desc::{TestDesc, biz_key, grammar_text};
use chrono::{DateTime, Utc};
use crossfire_expect::{ExpectError, ExpectedResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix on the input field that marks a test as withdrawn by its author.
pub const DISABLE_MARKER: char = '!';

const COMMENT_PREFIX: char = '#';

/// Where collected snapshots live: `<dir>/<author>/<file_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SnapshotSource {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for SnapshotSource {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("locals"),
            file_name: "local.csv".to_string(),
        }
    }
}

/// One test line from an author's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub input: String,
    pub expected: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub comment_on_failure: String,
}

impl SnapshotEntry {
    pub fn biz_key(&self, author: &str) -> String {
        biz_key(author, &self.input, &self.expected)
    }

    /// The record this entry becomes when first seen at `as_of`.
    pub fn to_record(&self, author: &str, as_of: DateTime<Utc>) -> TestDesc {
        TestDesc {
            author: author.to_string(),
            input: self.input.clone(),
            expected: self.expected.clone(),
            is_disabled: self.is_disabled,
            comment_on_failure: self.comment_on_failure.clone(),
            publish_time: as_of,
        }
    }
}

/// An author's snapshot could not be used for this pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot of {author} unreadable at line {line} ({raw:?}): {message}")]
    Malformed {
        author: String,
        line: usize,
        raw: String,
        message: String,
    },

    #[error("snapshot of {author} unreadable at line {line} ({raw:?}): {source}")]
    Expectation {
        author: String,
        line: usize,
        raw: String,
        #[source]
        source: ExpectError,
    },

    #[error("snapshot of {author} unreadable: {path}: {message}")]
    Io {
        author: String,
        path: String,
        message: String,
    },
}

impl SnapshotError {
    pub fn author(&self) -> &str {
        match self {
            Self::Malformed { author, .. }
            | Self::Expectation { author, .. }
            | Self::Io { author, .. } => author,
        }
    }

    /// The offending line, when the failure is tied to one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Malformed { raw, .. } | Self::Expectation { raw, .. } => Some(raw),
            Self::Io { .. } => None,
        }
    }
}

/// Parse one author's snapshot text.
///
/// Every entry's expectation is parsed; a single bad line rejects the whole
/// snapshot so that a half-read file never silently disables tests.
pub fn parse_snapshot(
    author: &str,
    text: &str,
    delimiter: &str,
) -> Result<Vec<SnapshotEntry>, SnapshotError> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let malformed = |message: String| SnapshotError::Malformed {
            author: author.to_string(),
            line: index + 1,
            raw: raw.to_string(),
            message,
        };

        let fields: Vec<&str> = trimmed.split(delimiter).map(str::trim).collect();
        let (input, expected, comment) = match fields.as_slice() {
            [input, expected] => (*input, *expected, ""),
            [input, expected, comment] => (*input, *expected, *comment),
            _ => {
                return Err(malformed(format!(
                    "expected `input{delimiter}expected[{delimiter}comment]`, found {} field(s)",
                    fields.len()
                )));
            }
        };

        let named = [
            ("input", input),
            ("expected", expected),
            ("commentOnFailure", comment),
        ];
        if let Some((name, _)) = named
            .into_iter()
            .find(|(_, value)| value.contains(char::is_control))
        {
            return Err(malformed(format!("{name} contains a control character")));
        }

        let (input, is_disabled) = match input.strip_prefix(DISABLE_MARKER) {
            Some(rest) => (rest.trim_start(), true),
            None => (input, false),
        };
        if input.is_empty() {
            return Err(malformed("input is empty".to_string()));
        }
        if expected.is_empty() {
            return Err(malformed("expected is empty".to_string()));
        }

        ExpectedResult::parse(&grammar_text(input, expected)).map_err(|source| {
            SnapshotError::Expectation {
                author: author.to_string(),
                line: index + 1,
                raw: raw.to_string(),
                source,
            }
        })?;

        entries.push(SnapshotEntry {
            input: input.to_string(),
            expected: expected.to_string(),
            is_disabled,
            comment_on_failure: comment.to_string(),
        });
    }
    Ok(entries)
}

/// Snapshots gathered for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotCollection {
    /// Parsed snapshots keyed by author, in author order.
    pub snapshots: BTreeMap<String, Vec<SnapshotEntry>>,

    /// Authors whose snapshot was rejected for this pass.
    pub failures: Vec<SnapshotError>,
}

/// Read every `<dir>/<author>/<file_name>` below the snapshot directory.
///
/// Authors without a snapshot file contribute nothing. A missing snapshot
/// directory is an empty collection.
pub fn collect_snapshots(
    source: &SnapshotSource,
    delimiter: &str,
) -> Result<SnapshotCollection, RegistryFileError> {
    let mut collection = SnapshotCollection::default();
    let dir = source.dir.as_path();
    if !dir.exists() {
        tracing::info!(dir = %dir.display(), "snapshot directory missing; no snapshots collected");
        return Ok(collection);
    }

    let mut author_dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| RegistryFileError::io(dir, e))? {
        let entry = entry.map_err(|e| RegistryFileError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            author_dirs.push(path);
        }
    }
    author_dirs.sort();

    for author_dir in author_dirs {
        let Some(author) = author_dir.file_name().and_then(|name| name.to_str()) else {
            tracing::warn!(dir = %author_dir.display(), "skipping non-UTF-8 author directory");
            continue;
        };
        let snapshot_path = author_dir.join(&source.file_name);
        if !snapshot_path.is_file() {
            tracing::debug!(author, "no snapshot file");
            continue;
        }

        match read_author_snapshot(author, &snapshot_path, delimiter) {
            Ok(entries) => {
                tracing::debug!(author, tests = entries.len(), "snapshot collected");
                collection.snapshots.insert(author.to_string(), entries);
            }
            Err(error) => {
                tracing::warn!(author, %error, "snapshot rejected for this pass");
                collection.failures.push(error);
            }
        }
    }

    Ok(collection)
}

fn read_author_snapshot(
    author: &str,
    path: &Path,
    delimiter: &str,
) -> Result<Vec<SnapshotEntry>, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|e| SnapshotError::Io {
        author: author.to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_snapshot(author, &text, delimiter)
}
