use std::path::PathBuf;

use super::config::AppConfig;
use crate::api::{PromptStore, StoreError};
use crate::sanitize::Sanitizer;

/// Runtime context handed to every command: settings, the store and the
/// sanitizer, built once at startup.
pub struct AppCtx {
    pub base_dir: PathBuf,
    pub config: AppConfig,
    pub store: PromptStore,
    pub sanitizer: Sanitizer,
    /// Skip confirmation prompts.
    pub assume_yes: bool,
}

impl AppCtx {
    /// Builds a context over an explicit root and settings.
    pub fn open(base_dir: PathBuf, config: AppConfig) -> Result<Self, StoreError> {
        let store = PromptStore::open(&base_dir, config.backup.max_backups)?;
        let options = config.sanitizer.to_options()?;
        let mut sanitizer = Sanitizer::with_options(options)
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        for pattern in &config.sanitizer.custom_patterns {
            sanitizer.add_custom_pattern(pattern).map_err(|e| {
                StoreError::Configuration(format!("custom pattern '{}': {}", pattern, e))
            })?;
        }

        Ok(Self {
            base_dir,
            config,
            store,
            sanitizer,
            assume_yes: false,
        })
    }
}
