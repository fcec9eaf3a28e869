// src/infra/paths.rs — Config path resolution
//
// RESILIENCE_HOME overrides the config directory for isolated runs.
// When unset, config lives under ~/.resilience/.

use std::path::PathBuf;

/// Returns the RESILIENCE_HOME override, if set.
fn resilience_home() -> Option<PathBuf> {
    std::env::var_os("RESILIENCE_HOME").map(PathBuf::from)
}

/// Configuration directory: $RESILIENCE_HOME/ or ~/.resilience/
pub fn config_dir() -> PathBuf {
    if let Some(home) = resilience_home() {
        return home;
    }
    dirs_home().join(".resilience")
}

/// Home directory, or the current directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
