//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under `~/.config`.
const APP_DIR_NAME: &str = "cinefind";

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Otherwise returns `~/.config/cinefind/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let base = match dir {
        Some(d) => d.clone(),
        None => {
            let home = std::env::var("HOME").context("HOME environment variable is not set")?;
            Path::new(&home).join(".config").join(APP_DIR_NAME)
        }
    };
    Ok(base.join(CONFIG_FILE_NAME))
}
