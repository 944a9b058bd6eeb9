use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::GymflowConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["gymflow.toml", "gymflow.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<GymflowConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<GymflowConfig> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml");
    match ext {
        "json" => serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("invalid JSON in {}: {e}", path.display())),
        _ => toml::from_str(raw)
            .map_err(|e| anyhow::anyhow!("invalid TOML in {}: {e}", path.display())),
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./gymflow.{toml,json}` (project-local)
/// 2. `~/.config/gymflow/gymflow.{toml,json}` (user-global)
///
/// Returns `GymflowConfig::default()` if no config file is found.
pub fn discover_and_load() -> GymflowConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    GymflowConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/gymflow/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "gymflow") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/gymflow/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "gymflow").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory, honoring the configured override.
pub fn data_dir(config: &GymflowConfig) -> PathBuf {
    if let Some(dir) = config.gateway.data_dir.clone() {
        return dir;
    }
    directories::ProjectDirs::from("", "", "gymflow")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
