use crate::config::{CONFIG_TEMPLATE, CrossfireConfig, DEFAULT_CONFIG_FILE};
use crate::support::yes_no;
use crossfire_registry::write_registry_to_path;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub registry_path: PathBuf,
    pub created_config: bool,
    pub created_registry: bool,
    pub created_dirs: Vec<PathBuf>,
}

pub fn init_layout(path: impl AsRef<Path>) -> Result<InitOutcome, String> {
    let root = path.as_ref().to_path_buf();
    if !root.exists() {
        fs::create_dir_all(&root)
            .map_err(|e| format!("failed to create init path {}: {e}", root.display()))?;
    }
    if !root.is_dir() {
        return Err(format!("init path is not a directory: {}", root.display()));
    }

    let config_path = root.join(DEFAULT_CONFIG_FILE);
    let created_config = !config_path.exists();
    if created_config {
        fs::write(&config_path, CONFIG_TEMPLATE)
            .map_err(|e| format!("failed to write {}: {e}", config_path.display()))?;
    }
    let config = CrossfireConfig::load(&config_path).map_err(|e| e.to_string())?;

    let registry_path = config.registry.path.clone();
    if registry_path.exists() && !registry_path.is_file() {
        return Err(format!(
            "registry path exists but is not a file: {}",
            registry_path.display()
        ));
    }
    let created_registry = !registry_path.exists();
    if created_registry {
        write_registry_to_path(&registry_path, &[], &config.registry.format)
            .map_err(|e| format!("failed to initialize registry: {e}"))?;
    }

    let mut created_dirs = Vec::new();
    for dir in [&config.snapshots.dir, &config.reports.dir] {
        if dir.exists() {
            if !dir.is_dir() {
                return Err(format!("path is not a directory: {}", dir.display()));
            }
            continue;
        }
        fs::create_dir_all(dir)
            .map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
        created_dirs.push(dir.clone());
    }

    Ok(InitOutcome {
        root,
        config_path,
        registry_path,
        created_config,
        created_registry,
        created_dirs,
    })
}

pub fn run(path: String) {
    let outcome = init_layout(&path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    println!("crossfire init {path}");
    println!();
    println!("  root: {}", outcome.root.display());
    println!("  config: {}", outcome.config_path.display());
    println!("  registry: {}", outcome.registry_path.display());
    println!("  created config: {}", yes_no(outcome.created_config));
    println!("  created registry: {}", yes_no(outcome.created_registry));
    for dir in &outcome.created_dirs {
        println!("  created dir: {}", dir.display());
    }
}
