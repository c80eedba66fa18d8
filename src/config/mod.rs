//! Configuration module for coffer
//!
//! Provides XDG-compliant path resolution and device-local settings.

pub mod paths;
pub mod settings;

pub use paths::CofferPaths;
pub use settings::Settings;
