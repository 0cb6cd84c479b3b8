use std::path::PathBuf;

use crate::types::{Result, UsageError};

/// Transcript roots, each containing a `projects/` directory.
///
/// `CLAUDE_CONFIG_DIR` (comma separated) wins over the default locations.
pub fn default_claude_paths() -> Result<Vec<PathBuf>> {
    let candidates = match std::env::var("CLAUDE_CONFIG_DIR") {
        Ok(value) if !value.trim().is_empty() => value
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .collect::<Vec<_>>(),
        _ => home_candidates(),
    };
    let found: Vec<PathBuf> = candidates
        .iter()
        .filter(|path| path.join("projects").is_dir())
        .cloned()
        .collect();
    if found.is_empty() {
        let checked = candidates
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(UsageError::NoDataDirectory { checked });
    }
    Ok(found)
}

fn home_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(config_home).join("claude"));
    }
    if let Ok(home) = std::env::var("HOME") {
        let home = PathBuf::from(home);
        let xdg_default = home.join(".config").join("claude");
        if !paths.contains(&xdg_default) {
            paths.push(xdg_default);
        }
        paths.push(home.join(".claude"));
    }
    paths
}
