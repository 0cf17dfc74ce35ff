use std::path::{Path, PathBuf};

use log::{error, warn};
use serde::de::DeserializeOwned;

use fw_defs::{MonitorError, ServiceDefinition, TeamDefinition};

pub const TEAM_FILENAME: &str = "team.json";

/// Directory holding team.json and the per-service monitor definitions.
/// Bundled next to the binary by default, overridable for tests and local runs.
pub fn defs_path() -> PathBuf {
    match std::env::var("MONITORDEFS_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("monitordefs"),
    }
}

fn read_monitor_file<T: DeserializeOwned>(path: &Path) -> Result<T, MonitorError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| MonitorError::Config(format!("{}: {}", path.display(), e)))
}

/// Loads one JSON monitor file. An unreadable or unparseable file is an
/// empty result, never a crash; the caller checks for None and skips that
/// unit of work.
pub fn load_monitor_file<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match read_monitor_file(path) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Failed to load {}", path.display());
            error!("Critical error: {}", e);
            None
        }
    }
}

pub fn load_team_file(defs_dir: &Path) -> Option<TeamDefinition> {
    load_monitor_file(&defs_dir.join(TEAM_FILENAME))
}

pub fn load_service_file(defs_dir: &Path, file_name: &str) -> Option<ServiceDefinition> {
    load_monitor_file(&defs_dir.join(file_name))
}
