use crate::support::{load_config_or_exit, notifier_for, print_json, yes_no};
use chrono::{DateTime, SecondsFormat, Utc};
use crossfire_registry::{Notice, Notifier, collect_snapshots, update_registry_file};
use serde_json::json;

fn parse_as_of_or_exit(as_of: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = as_of else {
        return Utc::now();
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            eprintln!("error: --as-of {raw:?} is not an RFC 3339 instant: {e}");
            std::process::exit(1);
        })
}

pub fn run(config_path: String, as_of: Option<String>, json_output: bool) {
    let config = load_config_or_exit(&config_path);
    let as_of = parse_as_of_or_exit(as_of.as_deref());
    let notifier = notifier_for(&config);
    let format = &config.registry.format;

    let collection = collect_snapshots(&config.snapshots, &format.delimiter).unwrap_or_else(|e| {
        eprintln!("error: failed to collect snapshots: {e}");
        std::process::exit(1);
    });
    for failure in &collection.failures {
        notifier.notify(&Notice::from(failure));
    }

    let update = update_registry_file(&config.registry.path, format, &collection.snapshots, as_of)
        .unwrap_or_else(|e| {
            eprintln!("error: registry not updated: {e}");
            std::process::exit(1);
        });

    let summary = update.reconciliation.summary;
    let enabled = update
        .reconciliation
        .records
        .iter()
        .filter(|record| !record.is_disabled)
        .count();
    let failed_authors: Vec<&str> = collection
        .failures
        .iter()
        .map(|failure| failure.author())
        .collect();

    if json_output {
        print_json(&json!({
            "registry_path": config.registry.path.display().to_string(),
            "as_of": as_of.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            "authors": collection.snapshots.len(),
            "failed_authors": failed_authors,
            "records": update.reconciliation.records.len(),
            "enabled": enabled,
            "changed": update.changed,
            "digest": update.digest,
            "summary": summary,
        }));
    } else {
        println!("crossfire concat");
        println!("  Registry: {}", config.registry.path.display());
        println!(
            "  As of: {}",
            as_of.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        );
        println!("  Authors: {}", collection.snapshots.len());
        if !failed_authors.is_empty() {
            println!("  Skipped authors: {}", failed_authors.join(", "));
        }
        println!(
            "  Records: {} ({enabled} enabled)",
            update.reconciliation.records.len()
        );
        println!(
            "  Added: {}, re-enabled: {}, withdrawn: {}, vanished: {}",
            summary.added, summary.re_enabled, summary.withdrawn, summary.vanished
        );
        println!("  Changed: {}", yes_no(update.changed));
        println!("  Digest: {}", update.digest);
    }
}
