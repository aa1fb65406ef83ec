//! Configuration management for Zonecast.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use zonecast_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/zonecast.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Device records: {}", config.settings().paths.store_dir);
//!
//! // Modify a setting
//! config.settings_mut().composer.snap_to_grid = false;
//!
//! // Save just the composer section atomically
//! config.update_section(ConfigSection::Composer).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ComposerSettings, ConfigSection, LoggingSettings, PathSettings, PublishSettings, Settings,
};
