//! # crossfire-score
//!
//! End-of-round scoring over participants' run reports.
//!
//! Every participant runs all enabled tests against their own extractor
//! and publishes a report. From those reports this crate derives:
//! - per-participant run outcomes, resolved against the registry
//! - shots: one participant's passing test that another participant fails
//! - a time-decayed score and a deterministic ranking
//! - the markdown leaderboard
//!
//! ## Data flow
//!
//! ```text
//! reports/<login>/report.md ─extract─▶ UserResult ─fill_shots─▶ rank ─▶ leaderboard.md
//!                     main.csv ──────────┘
//! ```

pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod run_result;
pub mod shot;
pub mod user_result;

pub use engine::{ScoringConfig, fill_shots, rank};
pub use error::{ReportError, ScoringError};
pub use leaderboard::{Standing, render_leaderboard, standings};
pub use run_result::{ExtractedReport, MalformedRow, ReportFormat, TestRunResult, extract_run_results};
pub use shot::TestShot;
pub use user_result::{UserResult, collect_user_results};
