//! The markdown leaderboard.

use crate::user_result::{UserResult, is_login};
use chrono::{DateTime, Utc};
use crossfire_registry::TestDesc;
use serde::Serialize;
use std::fmt::Write;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub place: usize,
    pub login: String,
    pub is_pass_base: bool,
    /// Registry records authored by the participant, enabled or not.
    pub total_tests: usize,
    pub own_tests: usize,
    pub own_passed: usize,
    pub fired_successful: usize,
    pub received_successful: usize,
    pub score: f64,
    /// Mean minutes from the round start to publication over `total_tests`.
    pub average_publish_minutes: Option<f64>,
}

/// Build rows for already ranked participants.
pub fn standings(
    ranked: &[UserResult],
    registry: &[TestDesc],
    start_at: DateTime<Utc>,
) -> Vec<Standing> {
    ranked
        .iter()
        .enumerate()
        .map(|(index, user)| {
            let minutes: Vec<i64> = registry
                .iter()
                .filter(|test| is_login(&test.author, &user.login))
                .map(|test| test.minutes_to_publish(start_at))
                .collect();
            let average_publish_minutes = (!minutes.is_empty())
                .then(|| minutes.iter().sum::<i64>() as f64 / minutes.len() as f64);
            Standing {
                place: index + 1,
                login: user.login.clone(),
                is_pass_base: user.is_pass_base,
                total_tests: minutes.len(),
                own_tests: user.own_tests.len(),
                own_passed: user.own_passed(),
                fired_successful: user.fired_successful(),
                received_successful: user.received_successful(),
                score: user.score(),
                average_publish_minutes,
            }
        })
        .collect()
}

pub fn render_leaderboard(standings: &[Standing]) -> String {
    let mut out = String::from("# Leaderboard\n\n");
    out.push_str(
        "| # | login | base passed | total tests | own tests | own passed | hits fired | hits received | score | avg publish minutes |\n",
    );
    out.push_str("|---|---|---|---|---|---|---|---|---|---|\n");
    for row in standings {
        let average = row
            .average_publish_minutes
            .map_or_else(|| "-".to_string(), |minutes| format!("{minutes:.1}"));
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {:.2} | {} |",
            row.place,
            row.login,
            if row.is_pass_base { "yes" } else { "no" },
            row.total_tests,
            row.own_tests,
            row.own_passed,
            row.fired_successful,
            row.received_successful,
            row.score,
            average,
        );
    }
    out
}
