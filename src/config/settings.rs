//! User settings for coffer
//!
//! Non-secret, device-local preferences: where the remote backup lives and
//! which relay fronts CORS-restricted AI providers. Everything sensitive
//! (API keys, accounts, rules) lives inside the encrypted vault metadata
//! instead.

use serde::{Deserialize, Serialize};

use crate::error::{CofferError, CofferResult};

use super::paths::CofferPaths;

/// Device-local settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base URL of the remote backup store; `None` keeps the vault local-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_base_url: Option<String>,

    /// Base URL of the stateless relay for CORS-restricted AI providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_relay_url: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            remote_base_url: None,
            ai_relay_url: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if absent
    pub fn load_or_create(paths: &CofferPaths) -> CofferResult<Self> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| CofferError::Io(format!("failed to read settings file: {}", e)))?;
            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| CofferError::Config(format!("failed to parse settings file: {}", e)))?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CofferPaths) -> CofferResult<()> {
        paths.ensure_directories()?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CofferError::Io(format!("failed to write settings file: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_create_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = CofferPaths::with_base_dir(dir.path().to_path_buf());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert!(settings.remote_base_url.is_none());
        assert!(paths.settings_file().exists());

        // Second load reads the persisted file.
        let again = Settings::load_or_create(&paths).unwrap();
        assert_eq!(again.schema_version, settings.schema_version);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let paths = CofferPaths::with_base_dir(dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.remote_base_url = Some("https://backup.example".to_string());
        settings.save(&paths).unwrap();

        let back = Settings::load_or_create(&paths).unwrap();
        assert_eq!(
            back.remote_base_url.as_deref(),
            Some("https://backup.example")
        );
    }
}
