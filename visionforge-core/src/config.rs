//! Flat key=value settings store.
//!
//! The settings file is a plain text file, one `key=value` per line. Reserved
//! keys: `verbose`, `libPath`, and the `installed-<n>` family enumerating
//! known bundles.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Key holding the verbosity flag ("true"/"false")
pub const KEY_VERBOSE: &str = "verbose";

/// Key holding the active bundle reference
pub const KEY_LIB_PATH: &str = "libPath";

/// Prefix of the enumerated known-bundle keys
pub const INSTALLED_PREFIX: &str = "installed-";

/// Flat string-keyed settings map.
///
/// Entries are kept in a `BTreeMap`, so serialization order is stable and
/// save-load round-trips are idempotent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    /// Load settings from a file.
    ///
    /// A missing file yields an empty config, not an error. Malformed lines
    /// (no `=`, empty key) are skipped.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut values = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line, "Skipping malformed settings line");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                tracing::warn!(line, "Skipping malformed settings line");
                continue;
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    /// Overwrite the whole settings file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut content = String::new();
        for (key, value) in &self.values {
            content.push_str(key);
            content.push('=');
            content.push_str(value);
            content.push('\n');
        }

        if let Some(parent) = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists())
        {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Raw value insert
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Verbosity flag; absent or unparsable values default to `true`
    pub fn verbose(&self) -> bool {
        self.get(KEY_VERBOSE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.set(KEY_VERBOSE, verbose.to_string());
    }

    /// Configured active bundle reference, if any
    pub fn lib_path(&self) -> Option<&str> {
        self.get(KEY_LIB_PATH).filter(|v| !v.is_empty())
    }

    pub fn set_lib_path(&mut self, path: &str) {
        self.set(KEY_LIB_PATH, path);
    }

    /// Known bundle references, in numeric `installed-<n>` order
    pub fn installed(&self) -> Vec<String> {
        let mut entries: Vec<(usize, &String)> = self
            .values
            .iter()
            .filter_map(|(key, value)| {
                let suffix = key.strip_prefix(INSTALLED_PREFIX)?;
                Some((suffix.parse().ok()?, value))
            })
            .collect();
        entries.sort_by_key(|(n, _)| *n);
        entries.into_iter().map(|(_, v)| v.clone()).collect()
    }

    /// Replace the whole `installed-<n>` family
    pub fn set_installed(&mut self, paths: &[String]) {
        self.values.retain(|key, _| !key.starts_with(INSTALLED_PREFIX));
        for (n, path) in paths.iter().enumerate() {
            self.values
                .insert(format!("{INSTALLED_PREFIX}{n}"), path.clone());
        }
    }
}
