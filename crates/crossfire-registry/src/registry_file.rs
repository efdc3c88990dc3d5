//! Registry file codec: a header line, then one delimited record per line.
//!
//! ```text
//! author|input|expected|isDisabled|commentOnFailure|publishTime
//! alice|Паспорт 0123456789|== PASSPORT_RF:0123456789|false||2022-11-09T10:00:00Z
//! ```
//!
//! The registry is the shared state of the whole contest, so reading is
//! strict: any line that does not parse makes the whole file unreadable.

use crate::test_desc::TestDesc;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_DELIMITER: &str = "|";

const FIELD_NAMES: [&str; 6] = [
    "author",
    "input",
    "expected",
    "isDisabled",
    "commentOnFailure",
    "publishTime",
];

/// Layout of the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RegistryFormat {
    /// Field delimiter, also used by local snapshots.
    pub delimiter: String,

    /// Header line. `None` uses the field names joined by the delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl Default for RegistryFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            header: None,
        }
    }
}

impl RegistryFormat {
    pub fn header_line(&self) -> String {
        self.header
            .clone()
            .unwrap_or_else(|| FIELD_NAMES.join(&self.delimiter))
    }
}

/// Errors from the registry codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("registry unreadable at line {line}: {message}")]
    Unreadable { line: usize, message: String },

    #[error("record {key} cannot be serialized: {field} {reason}")]
    Unserializable {
        key: String,
        field: &'static str,
        reason: String,
    },
}

/// Errors from registry file operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryFileError {
    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },

    #[error("{path}: {source}")]
    Registry {
        path: String,
        #[source]
        source: RegistryError,
    },

    #[error("registry lock busy: {lock_path}")]
    LockBusy { lock_path: String },

    #[error("failed to acquire registry lock {lock_path}: {message}")]
    LockIo { lock_path: String, message: String },
}

impl RegistryFileError {
    pub(crate) fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn registry(path: &Path, source: RegistryError) -> Self {
        Self::Registry {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether the existing registry could not be read or parsed.
    pub fn is_unreadable(&self) -> bool {
        matches!(
            self,
            Self::Registry {
                source: RegistryError::Unreadable { .. },
                ..
            }
        )
    }
}

/// Parse registry text.
///
/// Empty text is an empty registry. Otherwise the first line must be the
/// configured header, and every following non-blank line a full record.
pub fn read_registry(text: &str, format: &RegistryFormat) -> Result<Vec<TestDesc>, RegistryError> {
    let mut lines = text.lines().enumerate();
    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };

    let expected_header = format.header_line();
    if header.trim() != expected_header.trim() {
        return Err(RegistryError::Unreadable {
            line: 1,
            message: format!("header {header:?} does not match {expected_header:?}"),
        });
    }

    let mut records = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_record(line, &format.delimiter).map_err(|message| {
            RegistryError::Unreadable {
                line: index + 1,
                message,
            }
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_record(line: &str, delimiter: &str) -> Result<TestDesc, String> {
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    let [author, input, expected, is_disabled, comment, publish_time] = fields.as_slice() else {
        return Err(format!(
            "expected {} fields separated by {delimiter:?}, found {}",
            FIELD_NAMES.len(),
            fields.len()
        ));
    };

    for (name, value) in [("author", author), ("input", input), ("expected", expected)] {
        if value.is_empty() {
            return Err(format!("{name} is empty"));
        }
    }

    let is_disabled = match is_disabled.to_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => return Err(format!("isDisabled must be true or false, found {other:?}")),
    };

    let publish_time = DateTime::parse_from_rfc3339(publish_time)
        .map_err(|e| format!("publishTime {publish_time:?} is not an ISO-8601 instant: {e}"))?
        .with_timezone(&Utc);

    Ok(TestDesc {
        author: author.to_string(),
        input: input.to_string(),
        expected: expected.to_string(),
        is_disabled,
        comment_on_failure: comment.to_string(),
        publish_time,
    })
}

/// Serialize records, header first, one record per line.
///
/// Fails for records whose fields could not be read back unchanged.
pub fn write_registry(records: &[TestDesc], format: &RegistryFormat) -> Result<String, RegistryError> {
    let mut out = format.header_line();
    out.push('\n');

    for record in records {
        check_record(record, &format.delimiter)?;
        let is_disabled = if record.is_disabled { "true" } else { "false" };
        let publish_time = record
            .publish_time
            .to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let line = [
            record.author.as_str(),
            record.input.as_str(),
            record.expected.as_str(),
            is_disabled,
            record.comment_on_failure.as_str(),
            publish_time.as_str(),
        ]
        .join(&format.delimiter);
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn check_record(record: &TestDesc, delimiter: &str) -> Result<(), RegistryError> {
    let fields = [
        ("author", &record.author, true),
        ("input", &record.input, true),
        ("expected", &record.expected, true),
        ("commentOnFailure", &record.comment_on_failure, false),
    ];
    for (field, value, required) in fields {
        let reason = if required && value.is_empty() {
            Some("is empty".to_string())
        } else if value.contains(delimiter) {
            Some(format!("contains the delimiter {delimiter:?}"))
        } else if value.contains(['\n', '\r']) {
            Some("contains a line break".to_string())
        } else if value.contains(char::is_control) {
            Some("contains a control character".to_string())
        } else if value.trim() != value.as_str() {
            Some("has leading or trailing whitespace".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(RegistryError::Unserializable {
                key: record.biz_key(),
                field,
                reason,
            });
        }
    }
    Ok(())
}

/// Content digest of serialized registry text.
pub fn registry_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Read the raw registry text; a missing file yields `None`.
pub(crate) fn read_registry_text(path: &Path) -> Result<Option<String>, RegistryFileError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RegistryFileError::io(path, err)),
    };
    if bytes.contains(&0) {
        return Err(RegistryFileError::registry(
            path,
            RegistryError::Unreadable {
                line: 0,
                message: "contains NUL byte(s)".to_string(),
            },
        ));
    }
    String::from_utf8(bytes).map(Some).map_err(|_| {
        RegistryFileError::registry(
            path,
            RegistryError::Unreadable {
                line: 0,
                message: "contains non-UTF-8 byte sequence(s)".to_string(),
            },
        )
    })
}

/// Read registry records from a file path. A missing file is an empty
/// registry.
pub fn read_registry_from_path(
    path: impl AsRef<Path>,
    format: &RegistryFormat,
) -> Result<Vec<TestDesc>, RegistryFileError> {
    let path = path.as_ref();
    match read_registry_text(path)? {
        Some(text) => read_registry(&text, format).map_err(|e| RegistryFileError::registry(path, e)),
        None => Ok(Vec::new()),
    }
}

/// Write registry records to a file path, replacing it atomically.
pub fn write_registry_to_path(
    path: impl AsRef<Path>,
    records: &[TestDesc],
    format: &RegistryFormat,
) -> Result<(), RegistryFileError> {
    let path = path.as_ref();
    let text = write_registry(records, format).map_err(|e| RegistryFileError::registry(path, e))?;
    write_text_atomically(path, &text)
}

/// Replace `path` with `text`: stage a synced sibling file, rename it over
/// the target, then sync the directory entry.
pub(crate) fn write_text_atomically(path: &Path, text: &str) -> Result<(), RegistryFileError> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(|e| RegistryFileError::io(dir, e))?;
    }

    let tmp_path = tmp_write_path(path);
    let replaced = stage_text(&tmp_path, text).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|e| RegistryFileError::Io {
            path: format!("{} -> {}", tmp_path.display(), path.display()),
            message: e.to_string(),
        })
    });
    if let Err(error) = replaced {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    match parent {
        Some(dir) => File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|e| RegistryFileError::io(dir, e)),
        None => Ok(()),
    }
}

fn stage_text(tmp_path: &Path, text: &str) -> Result<(), RegistryFileError> {
    let mut file = File::create(tmp_path).map_err(|e| RegistryFileError::io(tmp_path, e))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| RegistryFileError::io(tmp_path, e))
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
