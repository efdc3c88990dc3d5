//! Reconciliation: merge fresh per-author snapshots into the registry.
//!
//! One pass compares every existing record with the union of all snapshots,
//! keyed by `bizKey`:
//!
//! ```text
//! existing ∧ fresh   → keep record, take the author's disable marker
//! existing ∧ ¬fresh  → keep record, disabled (vanished)
//! ¬existing ∧ fresh  → new record published at `as_of`
//! ```
//!
//! `publishTime` is assigned once and never changes afterwards, and a pass
//! over unchanged snapshots reproduces its input exactly.

use crate::snapshot::SnapshotEntry;
use crate::test_desc::TestDesc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// What one pass did, per record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    /// New keys published in this pass.
    pub added: usize,
    /// Present before and now, enablement unchanged.
    pub unchanged: usize,
    /// Previously disabled, present again and not withdrawn.
    pub re_enabled: usize,
    /// Previously enabled, now withdrawn with the disable marker.
    pub withdrawn: usize,
    /// Previously enabled, missing from every snapshot.
    pub vanished: usize,
    /// Previously disabled and still missing.
    pub dormant: usize,
    /// Repeated keys dropped from the existing registry or the snapshots.
    pub duplicates: usize,
}

/// The registry produced by one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Records sorted by (author, publishTime).
    pub records: Vec<TestDesc>,
    pub summary: ReconcileSummary,
}

/// Merge `snapshots` into `existing` as of `as_of`.
///
/// Pure over its inputs. Authors absent from `snapshots` (including those
/// whose snapshot failed to parse) have all their records disabled.
pub fn reconcile(
    existing: &[TestDesc],
    snapshots: &BTreeMap<String, Vec<SnapshotEntry>>,
    as_of: DateTime<Utc>,
) -> Reconciliation {
    let mut summary = ReconcileSummary::default();

    let mut fresh: Vec<TestDesc> = Vec::new();
    let mut fresh_by_key: HashMap<String, usize> = HashMap::new();
    for (author, entries) in snapshots {
        for entry in entries {
            let key = entry.biz_key(author);
            if fresh_by_key.contains_key(&key) {
                tracing::debug!(%key, "duplicate test in snapshot dropped");
                summary.duplicates += 1;
                continue;
            }
            fresh_by_key.insert(key, fresh.len());
            fresh.push(entry.to_record(author, as_of));
        }
    }

    let mut claimed = vec![false; fresh.len()];
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(existing.len() + fresh.len());

    for record in existing {
        let key = record.biz_key();
        if !seen.insert(key.clone()) {
            tracing::debug!(%key, "duplicate record in registry dropped");
            summary.duplicates += 1;
            continue;
        }

        let is_disabled = match fresh_by_key.get(&key) {
            Some(&index) => {
                claimed[index] = true;
                let withdrawn = fresh[index].is_disabled;
                match (record.is_disabled, withdrawn) {
                    (true, false) => summary.re_enabled += 1,
                    (false, true) => summary.withdrawn += 1,
                    _ => summary.unchanged += 1,
                }
                withdrawn
            }
            None => {
                if record.is_disabled {
                    summary.dormant += 1;
                } else {
                    tracing::debug!(%key, "test vanished from snapshots; disabling");
                    summary.vanished += 1;
                }
                true
            }
        };

        records.push(TestDesc {
            is_disabled,
            ..record.clone()
        });
    }

    for (record, claimed) in fresh.into_iter().zip(claimed) {
        if !claimed {
            summary.added += 1;
            records.push(record);
        }
    }

    records.sort_by(|a, b| {
        a.author
            .cmp(&b.author)
            .then_with(|| a.publish_time.cmp(&b.publish_time))
    });

    tracing::info!(
        records = records.len(),
        added = summary.added,
        re_enabled = summary.re_enabled,
        withdrawn = summary.withdrawn,
        vanished = summary.vanished,
        "reconciliation pass complete"
    );

    Reconciliation { records, summary }
}
