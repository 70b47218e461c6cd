//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_API_URL, DEFAULT_CATALOG_PATH, DEFAULT_TIMEOUT_SECS};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for tracker clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the local key-value store.
    pub db_path: String,
    /// Base URL of the spreadsheet proxy (without the `/sheets` suffix).
    pub api_url: String,
    /// Path of the static creative catalog.
    pub catalog_path: String,
    pub request_timeout_secs: u64,
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Read the first non-blank value among several environment variable names.
pub fn first_env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("creative-tracker")
        .join("db")
        .to_string_lossy()
        .to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("TRACKER_DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| default_db_path()),
            api_url: first_env_value(&["TRACKER_API_URL"])
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            catalog_path: env::var("TRACKER_CATALOG")
                .map(expand_tilde)
                .unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string()),
            request_timeout_secs: env::var("TRACKER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
