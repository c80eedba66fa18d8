//! Path management for coffer
//!
//! Provides XDG-compliant path resolution for the vault record, the cached
//! user profile, and settings.
//!
//! ## Path Resolution Order
//!
//! 1. `COFFER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/coffer` or `~/.config/coffer`
//! 3. Windows: `%APPDATA%\coffer`

use std::path::PathBuf;

use crate::error::{CofferError, CofferResult};

/// Manages all paths used by coffer
#[derive(Debug, Clone)]
pub struct CofferPaths {
    base_dir: PathBuf,
}

impl CofferPaths {
    /// Create a new CofferPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> CofferResult<Self> {
        let base_dir = if let Ok(custom) = std::env::var("COFFER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create CofferPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/coffer/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Path of the encrypted vault record
    pub fn vault_file(&self) -> PathBuf {
        self.base_dir.join("vault.json")
    }

    /// Path of the cached user profile (identity only, never key material)
    pub fn profile_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    /// Path of the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> CofferResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CofferError::Io(format!("failed to create base directory: {}", e)))?;
        Ok(())
    }

    /// Check if coffer has been initialized (a vault record exists)
    pub fn is_initialized(&self) -> bool {
        self.vault_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> CofferResult<PathBuf> {
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| CofferError::Config("could not determine home directory".into()))
        })?;
    Ok(config_base.join("coffer"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> CofferResult<PathBuf> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CofferError::Config("could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("coffer"))
}
