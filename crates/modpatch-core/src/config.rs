//! Ini-backed settings reader.
//!
//! Reads the single `[Settings]` section of the configuration file the
//! patcher provisions. Only `key = value` lines are understood; `;` and `#`
//! start comments. Lookups outside the section, parse failures and a missing
//! file all degrade to the caller's default; the configuration is advisory,
//! never load-bearing.

use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Name of the section all settings live under
const SETTINGS_SECTION: &str = "Settings";

/// Loaded configuration values
#[derive(Debug, Default)]
pub struct Config {
    values: HashMap<String, String>,
    loaded: bool,
}

impl Config {
    /// Loads the configuration at `path`.
    ///
    /// A missing or unreadable file yields an empty configuration with
    /// `loaded() == false`; every getter then returns its default.
    pub fn load(path: &Path) -> Config {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::from_text(&text),
            Err(e) => {
                warn!("Could not read configuration '{}': {e}", path.display());
                Config::default()
            }
        }
    }

    /// Parses configuration text
    pub fn from_text(text: &str) -> Config {
        let mut values = HashMap::new();
        let mut in_settings = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_settings = section.trim() == SETTINGS_SECTION;
                continue;
            }
            if !in_settings {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_owned(), value.trim().to_owned());
            }
        }

        Config {
            values,
            loaded: true,
        }
    }

    /// True when a configuration file was actually read
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// String value for `key`, or `default` when absent
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Boolean value for `key`; unparseable or absent values yield `default`
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values
            .get(key)
            .and_then(|v| v.to_ascii_lowercase().parse().ok())
            .unwrap_or(default)
    }

    /// Integer value for `key`; unparseable or absent values yield `default`
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
