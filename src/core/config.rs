//! Loads application settings from `<root>/config.toml`.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::backup::DEFAULT_MAX_BACKUPS;
use crate::api::StoreError;
use crate::sanitize::sanitizer::{DEFAULT_FILL_CHAR, DEFAULT_REPLACEMENT};
use crate::sanitize::{Category, SanitizerOptions};

const CONFIG_FILE: &str = "config.toml";

/// Settings read from `config.toml`. Every field has a default.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub editor: Option<String>,
    pub backup: BackupConfig,
    pub sanitizer: SanitizerConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackupConfig {
    pub max_backups: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SanitizerConfig {
    pub replace_with: String,
    pub fill_char: char,
    pub preserve_structure: bool,
    /// Category ids, e.g. `apiKeys` or `emails`.
    pub enabled: Vec<String>,
    /// Extra case-insensitive regexes, redacted under `custom`.
    pub custom_patterns: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            replace_with: DEFAULT_REPLACEMENT.to_string(),
            fill_char: DEFAULT_FILL_CHAR,
            preserve_structure: true,
            enabled: Category::DEFAULT_ENABLED
                .iter()
                .map(|c| c.id().to_string())
                .collect(),
            custom_patterns: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    /// Resolves category ids into sanitizer options.
    pub fn to_options(&self) -> Result<SanitizerOptions, StoreError> {
        let enabled = self
            .enabled
            .iter()
            .map(|id| id.parse::<Category>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        Ok(SanitizerOptions {
            replace_with: self.replace_with.clone(),
            fill_char: self.fill_char,
            enabled,
            preserve_structure: self.preserve_structure,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Editor command: `config.toml`, then `$VISUAL`/`$EDITOR`, then `vi`.
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| env::var("VISUAL").ok())
            .or_else(|| env::var("EDITOR").ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }
}

pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE)
}

/// Reads `<base_dir>/config.toml`. A missing file yields the defaults.
pub fn load_app_config(base_dir: &Path) -> Result<AppConfig, StoreError> {
    let path = config_path(base_dir);
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| StoreError::Configuration(format!("Failed to read config.toml: {}", e)))?;
    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| StoreError::Configuration(format!("Failed to parse config.toml: {}", e)))?;

    // Surface bad category names now rather than on first use.
    config.sanitizer.to_options()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_app_config(dir.path()).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backup.max_backups, 10);
        assert_eq!(
            config.sanitizer.to_options().unwrap(),
            SanitizerOptions::default()
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            r##"
editor = "nano"

[backup]
max_backups = 3

[sanitizer]
enabled = ["emails", "passwords"]
fill_char = "#"
"##,
        )
        .unwrap();

        let config = load_app_config(dir.path()).unwrap();
        assert_eq!(config.editor(), "nano");
        assert_eq!(config.backup.max_backups, 3);
        assert_eq!(config.logging.level, "warn");

        let options = config.sanitizer.to_options().unwrap();
        assert_eq!(options.fill_char, '#');
        assert_eq!(options.replace_with, "[REDACTED]");
        assert_eq!(
            options.enabled,
            BTreeSet::from([Category::Emails, Category::Passwords])
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "[sanitizer]\nenabled = [\"apikeys\"]\n",
        )
        .unwrap();

        let err = load_app_config(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(ref m) if m.contains("apikeys")));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(config_path(dir.path()), "[backup\nmax_backups = ").unwrap();

        assert!(matches!(
            load_app_config(dir.path()),
            Err(StoreError::Configuration(_))
        ));
    }
}
