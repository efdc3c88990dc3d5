use crate::support::{load_config_or_exit, notifier_for, print_json};
use chrono::SecondsFormat;
use crossfire_registry::{Notifier, read_registry_from_path};
use crossfire_score::{collect_user_results, fill_shots, rank, render_leaderboard, standings};
use serde_json::json;
use std::fs;

pub fn run(config_path: String, json_output: bool) {
    let config = load_config_or_exit(&config_path);
    let start_at = config.start_at().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let notifier = notifier_for(&config);

    let registry = read_registry_from_path(&config.registry.path, &config.registry.format)
        .unwrap_or_else(|e| {
            eprintln!("error: failed to read registry: {e}");
            std::process::exit(1);
        });

    let mut users =
        collect_user_results(&config.reports, &registry, &notifier).unwrap_or_else(|e| {
            eprintln!("error: failed to collect reports: {e}");
            std::process::exit(1);
        });

    let errors = fill_shots(&mut users, start_at);
    for error in &errors {
        notifier.notify(&error.to_notice());
    }
    rank(&mut users);
    let rows = standings(&users, &registry, start_at);

    let leaderboard_path = &config.output.leaderboard;
    if let Some(parent) = leaderboard_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("error: failed to create {}: {e}", parent.display());
            std::process::exit(1);
        });
    }
    fs::write(leaderboard_path, render_leaderboard(&rows)).unwrap_or_else(|e| {
        eprintln!(
            "error: failed to write leaderboard {}: {e}",
            leaderboard_path.display()
        );
        std::process::exit(1);
    });

    if json_output {
        print_json(&json!({
            "start_at": start_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            "leaderboard_path": leaderboard_path.display().to_string(),
            "ambiguous_shots": errors.len(),
            "standings": rows,
        }));
    } else {
        println!("crossfire calculate");
        println!("  Participants: {}", rows.len());
        println!("  Leaderboard: {}", leaderboard_path.display());
        if !errors.is_empty() {
            println!("  Ambiguous shots skipped: {}", errors.len());
        }
        for row in &rows {
            println!("  {}. {} {:.2}", row.place, row.login, row.score);
        }
    }
}
