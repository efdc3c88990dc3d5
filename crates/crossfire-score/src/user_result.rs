//! Per-participant results assembled from run reports.

use crate::error::ReportError;
use crate::run_result::{ExtractedReport, ReportFormat, TestRunResult, extract_run_results};
use crate::shot::TestShot;
use crossfire_registry::{Notice, NoticeKind, Notifier, TestDesc, normalize_field};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct UserResult {
    pub login: String,
    pub is_pass_base: bool,
    /// Runs of tests this participant authored.
    pub own_tests: Vec<TestRunResult>,
    /// Runs of everyone else's tests.
    pub competitors_tests: Vec<TestRunResult>,
    pub fired_shots: Vec<TestShot>,
    pub received_shots: Vec<TestShot>,
}

impl UserResult {
    /// Split one report's runs into own and competitors' tests. Shots are
    /// filled later by the scoring pass.
    pub fn from_report(login: impl Into<String>, report: ExtractedReport) -> Self {
        let login = login.into();
        let (own_tests, competitors_tests): (Vec<_>, Vec<_>) = report
            .results
            .into_iter()
            .partition(|run| is_login(&run.author_of_test, &login));
        Self {
            login,
            is_pass_base: report.is_pass_base,
            own_tests,
            competitors_tests,
            fired_shots: Vec::new(),
            received_shots: Vec::new(),
        }
    }

    /// Points of successful fired shots minus points of successful received
    /// shots.
    pub fn score(&self) -> f64 {
        let fired: f64 = successful(&self.fired_shots).map(TestShot::points).sum();
        let received: f64 = successful(&self.received_shots).map(TestShot::points).sum();
        fired - received
    }

    pub fn own_passed(&self) -> usize {
        self.own_tests.iter().filter(|run| run.is_test_pass).count()
    }

    pub fn fired_successful(&self) -> usize {
        successful(&self.fired_shots).count()
    }

    pub fn received_successful(&self) -> usize {
        successful(&self.received_shots).count()
    }
}

fn successful(shots: &[TestShot]) -> impl Iterator<Item = &TestShot> {
    shots.iter().filter(|shot| shot.is_successful)
}

/// Case-insensitive, trimmed login comparison.
pub(crate) fn is_login(author: &str, login: &str) -> bool {
    normalize_field(author) == normalize_field(login)
}

/// Read `<dir>/<login>/<file_name>` for every login directory.
///
/// A missing reports directory yields no results. An unreadable report
/// drops that participant and is passed to `notifier`, as is every
/// malformed table row.
pub fn collect_user_results(
    format: &ReportFormat,
    registry: &[TestDesc],
    notifier: &dyn Notifier,
) -> Result<Vec<UserResult>, ReportError> {
    let dir = format.dir.as_path();
    if !dir.exists() {
        tracing::info!(dir = %dir.display(), "reports directory missing; nothing to score");
        return Ok(Vec::new());
    }

    let io = |err: std::io::Error| ReportError::Io {
        path: dir.display().to_string(),
        message: err.to_string(),
    };
    let mut login_dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            login_dirs.push(path);
        }
    }
    login_dirs.sort();

    let mut users = Vec::new();
    for login_dir in login_dirs {
        let Some(login) = login_dir.file_name().and_then(|name| name.to_str()) else {
            tracing::warn!(dir = %login_dir.display(), "skipping non-UTF-8 login directory");
            continue;
        };
        let report_path = login_dir.join(&format.file_name);
        if !report_path.is_file() {
            tracing::debug!(login, "no report file");
            continue;
        }

        let report = match read_report(login, &report_path, registry, format) {
            Ok(report) => report,
            Err(error) => {
                notifier.notify(&error.to_notice());
                continue;
            }
        };
        for row in &report.malformed_rows {
            notifier.notify(&Notice {
                kind: NoticeKind::MalformedReportRow,
                subject: login.to_string(),
                raw: Some(row.raw.clone()),
                message: format!(
                    "{}:{}: {}",
                    report_path.display(),
                    row.line,
                    row.message
                ),
            });
        }

        let user = UserResult::from_report(login, report);
        tracing::debug!(
            login,
            own = user.own_tests.len(),
            competitors = user.competitors_tests.len(),
            is_pass_base = user.is_pass_base,
            "report collected"
        );
        users.push(user);
    }

    tracing::info!(participants = users.len(), "reports collected");
    Ok(users)
}

fn read_report(
    login: &str,
    path: &Path,
    registry: &[TestDesc],
    format: &ReportFormat,
) -> Result<ExtractedReport, ReportError> {
    let text = fs::read_to_string(path).map_err(|e| ReportError::Unreadable {
        login: login.to_string(),
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(extract_run_results(registry, &text, format))
}
