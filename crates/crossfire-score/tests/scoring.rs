//! Integration tests: a full scoring round from on-disk reports to the
//! rendered leaderboard.

use chrono::{DateTime, Duration, TimeZone, Utc};
use crossfire_registry::{CollectingNotifier, NoticeKind, TestDesc};
use crossfire_score::{
    ReportFormat, collect_user_results, fill_shots, rank, render_leaderboard, standings,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "crossfire-score-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const PASSPORT: (&str, &str) = ("Паспорт 0123456789", "== PASSPORT_RF:0123456789");
const INN: (&str, &str) = ("ИНН 7707083893", "~? INN_UL:7707083893");

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 11, 9, 10, 0, 0).unwrap()
}

fn record(author: &str, (input, expected): (&str, &str), minutes: i64, is_disabled: bool) -> TestDesc {
    TestDesc {
        author: author.to_string(),
        input: input.to_string(),
        expected: expected.to_string(),
        is_disabled,
        comment_on_failure: String::new(),
        publish_time: start() + Duration::minutes(minutes),
    }
}

fn registry() -> Vec<TestDesc> {
    vec![
        record("alice", PASSPORT, 10, false),
        record("bob", INN, 40, false),
        record("bob", ("old", "== INN_UL:7707083893"), 5, true),
    ]
}

fn row(author: &str, (input, expected): (&str, &str), pass: bool) -> String {
    format!("| {author} | {input} | {expected} | {pass} |\n")
}

fn write_report(format: &ReportFormat, login: &str, base: bool, rows: &[String]) {
    let dir = format.dir.join(login);
    fs::create_dir_all(&dir).expect("report dir should be created");
    let mut text = String::from("# Run report\n\n");
    if base {
        text.push_str("##### All basic tests were passed\n\n");
    }
    text.push_str("| author | input | expected | pass |\n|-----|-----|-----|-----|\n");
    for row in rows {
        text.push_str(row);
    }
    fs::write(dir.join(&format.file_name), text).expect("report should write");
}

#[test]
fn full_round_ranks_and_renders() {
    let temp = TempDirGuard::new("round");
    let format = ReportFormat {
        dir: temp.path().join("reports"),
        ..ReportFormat::default()
    };

    write_report(
        &format,
        "alice",
        true,
        &[
            row("alice", PASSPORT, true),
            row("bob", INN, false),
            row("bob", ("old", "== INN_UL:7707083893"), true),
        ],
    );
    write_report(
        &format,
        "bob",
        true,
        &[
            row("alice", PASSPORT, false),
            row("bob", INN, true),
            "| broken |\n".to_string(),
        ],
    );
    write_report(
        &format,
        "carol",
        false,
        &[row("alice", PASSPORT, true), row("bob", INN, false)],
    );

    let registry = registry();
    let notifier = CollectingNotifier::default();
    let mut users =
        collect_user_results(&format, &registry, &notifier).expect("reports should collect");
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].competitors_tests.len(), 1);

    let notices = notifier.take();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::MalformedReportRow);
    assert_eq!(notices[0].subject, "bob");
    assert_eq!(notices[0].raw.as_deref(), Some("| broken |"));

    assert!(fill_shots(&mut users, start()).is_empty());
    rank(&mut users);
    let rows = standings(&users, &registry, start());

    insta::assert_snapshot!(render_leaderboard(&rows), @r"
    # Leaderboard

    | # | login | base passed | total tests | own tests | own passed | hits fired | hits received | score | avg publish minutes |
    |---|---|---|---|---|---|---|---|---|---|
    | 1 | bob | yes | 2 | 1 | 1 | 2 | 1 | 0.80 | 22.5 |
    | 2 | alice | yes | 1 | 1 | 1 | 1 | 1 | 0.20 | 10.0 |
    | 3 | carol | no | 0 | 0 | 0 | 0 | 1 | -1.00 | - |
    ");
}

#[test]
fn standings_serialize_for_json_output() {
    let temp = TempDirGuard::new("json");
    let format = ReportFormat {
        dir: temp.path().join("reports"),
        ..ReportFormat::default()
    };
    write_report(&format, "alice", true, &[row("alice", PASSPORT, true)]);

    let registry = registry();
    let notifier = CollectingNotifier::default();
    let mut users = collect_user_results(&format, &registry, &notifier).expect("collect");
    fill_shots(&mut users, start());
    rank(&mut users);

    let json = serde_json::to_value(standings(&users, &registry, start())).expect("serialize");
    assert_eq!(json[0]["login"], "alice");
    assert_eq!(json[0]["isPassBase"], true);
    assert_eq!(json[0]["ownPassed"], 1);
    assert_eq!(json[0]["averagePublishMinutes"], 10.0);
}

#[test]
fn unreadable_report_drops_only_that_participant() {
    let temp = TempDirGuard::new("unreadable");
    let format = ReportFormat {
        dir: temp.path().join("reports"),
        ..ReportFormat::default()
    };
    write_report(&format, "alice", true, &[row("alice", PASSPORT, true)]);
    let bob_dir = format.dir.join("bob");
    fs::create_dir_all(&bob_dir).expect("bob dir");
    fs::write(bob_dir.join(&format.file_name), [0xff, 0xfe, 0x00]).expect("bob report");
    fs::create_dir_all(format.dir.join("carol")).expect("carol dir without report");

    let notifier = CollectingNotifier::default();
    let users = collect_user_results(&format, &registry(), &notifier).expect("collect");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login, "alice");

    let notices = notifier.take();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::ReportUnreadable);
    assert_eq!(notices[0].subject, "bob");
}

#[test]
fn missing_reports_directory_scores_nobody() {
    let temp = TempDirGuard::new("missing");
    let format = ReportFormat {
        dir: temp.path().join("nowhere"),
        ..ReportFormat::default()
    };
    let notifier = CollectingNotifier::default();
    let users = collect_user_results(&format, &registry(), &notifier).expect("collect");
    assert!(users.is_empty());
}
