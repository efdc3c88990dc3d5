//! Notices: recoverable failures handed to an external delivery channel.
//!
//! Nothing here aborts processing. A notice carries enough context (who,
//! which raw line, what went wrong) to diagnose the failure without
//! re-running the pass.

use crate::snapshot::SnapshotError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    AuthorSnapshotUnreadable,
    ReportUnreadable,
    MalformedReportRow,
    AmbiguousShotMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    /// Author or participant login the notice is about.
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub message: String,
}

impl From<&SnapshotError> for Notice {
    fn from(error: &SnapshotError) -> Self {
        Self {
            kind: NoticeKind::AuthorSnapshotUnreadable,
            subject: error.author().to_string(),
            raw: error.raw().map(str::to_string),
            message: error.to_string(),
        }
    }
}

/// Receiver of notices.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Emits each notice as a `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(
            kind = ?notice.kind,
            subject = %notice.subject,
            raw = ?notice.raw,
            "{}",
            notice.message
        );
    }
}

/// Appends each notice as one JSON line to a file, for an outside agent to
/// deliver.
#[derive(Debug, Clone)]
pub struct JsonlNotifier {
    path: PathBuf,
}

impl JsonlNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, notice: &Notice) -> Result<(), String> {
        let line = serde_json::to_string(notice).map_err(|e| e.to_string())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| e.to_string())?;
        writeln!(file, "{line}").map_err(|e| e.to_string())
    }
}

impl Notifier for JsonlNotifier {
    fn notify(&self, notice: &Notice) {
        if let Err(message) = self.append(notice) {
            tracing::error!(
                path = %self.path.display(),
                %message,
                "failed to record notice: {}",
                notice.message
            );
        }
    }
}

/// Keeps notices in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn take(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: &Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice.clone()),
            Err(poisoned) => poisoned.into_inner().push(notice.clone()),
        }
    }
}

/// Forwards every notice to each inner notifier in turn.
#[derive(Default)]
pub struct Notifiers(pub Vec<Box<dyn Notifier>>);

impl Notifier for Notifiers {
    fn notify(&self, notice: &Notice) {
        for notifier in &self.0 {
            notifier.notify(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sample() -> Notice {
        Notice {
            kind: NoticeKind::MalformedReportRow,
            subject: "alice".to_string(),
            raw: Some("| broken |".to_string()),
            message: "expected 4 fields".to_string(),
        }
    }

    #[test]
    fn snapshot_error_becomes_notice() {
        let error = SnapshotError::Malformed {
            author: "bob".to_string(),
            line: 3,
            raw: "junk".to_string(),
            message: "expected fields".to_string(),
        };
        let notice = Notice::from(&error);
        assert_eq!(notice.kind, NoticeKind::AuthorSnapshotUnreadable);
        assert_eq!(notice.subject, "bob");
        assert_eq!(notice.raw.as_deref(), Some("junk"));
        assert!(notice.message.contains("line 3"));
    }

    #[test]
    fn collecting_notifier_takes_in_order() {
        let collector = CollectingNotifier::default();
        let fanout = Notifiers(vec![Box::new(LogNotifier)]);
        fanout.notify(&sample());
        collector.notify(&sample());
        collector.notify(&Notice {
            subject: "bob".to_string(),
            ..sample()
        });

        let taken = collector.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].subject, "bob");
        assert!(collector.take().is_empty());
    }

    #[test]
    fn jsonl_notifier_appends_lines() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "crossfire-notices-{}-{unique}.jsonl",
            std::process::id()
        ));

        let notifier = JsonlNotifier::new(&path);
        notifier.notify(&sample());
        notifier.notify(&sample());

        let text = fs::read_to_string(&path).expect("notices should be written");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Notice = serde_json::from_str(lines[0]).expect("notice line should parse");
        assert_eq!(parsed, sample());
        assert!(lines[0].contains("\"kind\":\"malformed_report_row\""));

        let _ = fs::remove_file(path);
    }
}
