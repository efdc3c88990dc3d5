//! Shot derivation and ranking.
//!
//! For every ordered pair of distinct participants `(user, other)`:
//!
//! ```text
//! fired     user passes own test T, other ran T   → user → other, hit if other failed
//! received  user ran other's T, other passes T    → other → user, hit if user failed
//! ```
//!
//! A shot's weight comes from how early its test was published relative to
//! the round start.

use crate::error::ScoringError;
use crate::run_result::TestRunResult;
use crate::shot::TestShot;
use crate::user_result::{UserResult, is_login};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Round start; publication minutes are counted from here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
}

/// Fill `fired_shots` and `received_shots` of every participant.
///
/// Previously filled shots are replaced. A passing own test that matches
/// more than one run in a competitor's report records no shot for that
/// competitor; each such case is returned as an error.
pub fn fill_shots(users: &mut [UserResult], start_at: DateTime<Utc>) -> Vec<ScoringError> {
    let mut errors = Vec::new();
    let mut fired: Vec<Vec<TestShot>> = vec![Vec::new(); users.len()];
    let mut received: Vec<Vec<TestShot>> = vec![Vec::new(); users.len()];

    for (i, user) in users.iter().enumerate() {
        for (j, other) in users.iter().enumerate() {
            if i == j {
                continue;
            }
            fired_at(user, other, start_at, &mut fired[i], &mut errors);
            received_from(user, other, start_at, &mut received[i]);
        }
    }

    for ((user, fired), received) in users.iter_mut().zip(fired).zip(received) {
        user.fired_shots = fired;
        user.received_shots = received;
    }

    for error in &errors {
        tracing::warn!(%error, "shot skipped");
    }
    errors
}

fn fired_at(
    user: &UserResult,
    other: &UserResult,
    start_at: DateTime<Utc>,
    shots: &mut Vec<TestShot>,
    errors: &mut Vec<ScoringError>,
) {
    for own in user.own_tests.iter().filter(|run| run.is_test_pass) {
        let matches: Vec<&TestRunResult> = other
            .competitors_tests
            .iter()
            .filter(|run| is_login(&run.author_of_test, &user.login) && run.same_content(own))
            .collect();
        match matches.as_slice() {
            [] => {}
            [target] => shots.push(TestShot {
                from: user.login.clone(),
                to: other.login.clone(),
                time_to_publish_minutes: own.test.minutes_to_publish(start_at),
                is_successful: !target.is_test_pass,
            }),
            _ => errors.push(ScoringError::AmbiguousShotMatch {
                from: user.login.clone(),
                to: other.login.clone(),
                input: own.input.clone(),
                expected: own.expected.clone(),
                matches: matches.len(),
            }),
        }
    }
}

fn received_from(
    user: &UserResult,
    other: &UserResult,
    start_at: DateTime<Utc>,
    shots: &mut Vec<TestShot>,
) {
    let incoming = user.competitors_tests.iter().filter(|run| {
        is_login(&run.author_of_test, &other.login)
            && other
                .own_tests
                .iter()
                .any(|own| own.is_test_pass && own.same_content(run))
    });
    for run in incoming {
        shots.push(TestShot {
            from: other.login.clone(),
            to: user.login.clone(),
            time_to_publish_minutes: run.test.minutes_to_publish(start_at),
            is_successful: !run.is_test_pass,
        });
    }
}

/// Order participants: base-pass first, then by score descending. Ties keep
/// their input order.
pub fn rank(users: &mut [UserResult]) {
    users.sort_by(|a, b| {
        b.is_pass_base
            .cmp(&a.is_pass_base)
            .then_with(|| b.score().total_cmp(&a.score()))
    });
}
