//! Configuration loading and backend URL resolution

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable consulted for the backend base URL.
pub const BACKEND_URL_ENV: &str = "TUTORKIT_BACKEND_URL";

/// Compiled default backend base URL.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8888/tutorkit";

/// Backend URL resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `TUTORKIT_BACKEND_URL` environment variable
/// 3. `backend_url` key in the TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_backend_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
        if !url.is_empty() {
            return url;
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_path() {
        match backend_url_from_file(&path) {
            Ok(Some(url)) => return url,
            Ok(None) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
        }
    }

    // Priority 4: Compiled default
    DEFAULT_BACKEND_URL.to_string()
}

/// Default configuration file path for the platform
/// (`<config dir>/tutorkit/config.toml`), if it exists.
pub fn config_file_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("tutorkit").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Read the `backend_url` key from a TOML config file.
///
/// Returns `Ok(None)` when the file parses but carries no such key.
pub fn backend_url_from_file(path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path)?;
    let config: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("invalid TOML in {}: {e}", path.display())))?;
    Ok(config
        .get("backend_url")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string()))
}
