use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "sdsync.toml";
const FALLBACK_DATABASE_URL: &str = "sqlite://./data/selections.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub source_label_width: usize,
    pub destination_label_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            source_label_width: 35,
            destination_label_width: 45,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    source_label_width: Option<usize>,
    destination_label_width: Option<usize>,
}

impl Settings {
    /// Layers `file` (TOML) and then `env` over the defaults.
    pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(raw) = file {
            match toml::from_str::<FileSettings>(raw) {
                Ok(file_cfg) => {
                    if let Some(v) = file_cfg.database_url {
                        settings.database_url = v;
                    }
                    if let Some(v) = file_cfg.source_label_width {
                        settings.source_label_width = v;
                    }
                    if let Some(v) = file_cfg.destination_label_width {
                        settings.destination_label_width = v;
                    }
                }
                Err(err) => warn!(error = %err, "ignoring unreadable {SETTINGS_FILE}"),
            }
        }

        if let Some(v) = env("SDSYNC_DATABASE_URL") {
            settings.database_url = v;
        }
        if let Some(v) = env("APP__DATABASE_URL") {
            settings.database_url = v;
        }

        if let Some(v) = env("APP__SOURCE_LABEL_WIDTH").and_then(|v| v.parse().ok()) {
            settings.source_label_width = v;
        }
        if let Some(v) = env("APP__DESTINATION_LABEL_WIDTH").and_then(|v| v.parse().ok()) {
            settings.destination_label_width = v;
        }

        settings.database_url = normalize_database_url(&settings.database_url);
        settings
    }
}

/// Reads `sdsync.toml` from the working directory and the process
/// environment.
pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    Settings::from_sources(file.as_deref(), |name| std::env::var(name).ok())
}

/// Turns a plain file path (or a bare `sqlite:` path) into a `sqlite://` URL.
/// In-memory and fully qualified URLs pass through; blank input falls back to
/// the default location.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return default_database_url();
    }

    match raw.strip_prefix("sqlite:") {
        Some(rest) if rest.starts_with("//") || rest.starts_with(":memory:") => raw.to_string(),
        Some(path) => sqlite_file_url(path),
        None if raw.contains("://") => raw.to_string(),
        None => sqlite_file_url(raw),
    }
}

fn sqlite_file_url(path: &str) -> String {
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn default_database_url() -> String {
    default_database_path()
        .map(|path| sqlite_file_url(&path.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_DATABASE_URL.to_string())
}

fn default_database_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("sdsync").join("selections.sqlite3"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
