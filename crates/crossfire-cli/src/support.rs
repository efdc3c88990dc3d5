use crate::config::CrossfireConfig;
use crossfire_registry::{JsonlNotifier, LogNotifier, Notifier, Notifiers};
use serde_json::Value;
use std::path::Path;

pub fn load_config_or_exit(path: &str) -> CrossfireConfig {
    CrossfireConfig::load(Path::new(path)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

/// Log every notice, and append it to the configured notices file if any.
pub fn notifier_for(config: &CrossfireConfig) -> Notifiers {
    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];
    if let Some(path) = &config.output.notices {
        notifiers.push(Box::new(JsonlNotifier::new(path)));
    }
    Notifiers(notifiers)
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
