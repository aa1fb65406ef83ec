//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::composer::CompositionRules;
use crate::layout::SeedChain;
use crate::logging::LogLevel;
use crate::publish::DEFAULT_CONFIG_FIELD;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where device records, the media manifest and logs live.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Composition rules.
    #[serde(default)]
    pub composer: ComposerSettings,

    /// Publish target field.
    #[serde(default)]
    pub publish: PublishSettings,
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder holding one JSON record per device.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// JSON manifest listing playable media.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_store_dir() -> String {
    "devices".to_string()
}

fn default_catalog_file() -> String {
    "media.json".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            catalog_file: default_catalog_file(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a daily log file under `paths.logs_folder`.
    #[serde(default)]
    pub file_output: bool,
}

/// Composition rules applied while editing a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerSettings {
    /// Snap manual resizes to a grid.
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,

    /// Grid step in percent.
    #[serde(default = "default_snap_step")]
    pub snap_step: f64,

    /// Seconds an image is shown when first offered from the catalog.
    #[serde(default = "default_image_duration")]
    pub default_image_duration: u32,

    /// Smallest size in percent a zone may be resized to.
    #[serde(default = "default_min_zone_percent")]
    pub min_zone_percent: f64,
}

fn default_true() -> bool {
    true
}

fn default_snap_step() -> f64 {
    0.5
}

fn default_image_duration() -> u32 {
    5
}

fn default_min_zone_percent() -> f64 {
    10.0
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            snap_step: default_snap_step(),
            default_image_duration: default_image_duration(),
            min_zone_percent: default_min_zone_percent(),
        }
    }
}

impl From<&ComposerSettings> for CompositionRules {
    fn from(settings: &ComposerSettings) -> Self {
        Self {
            snap_step: settings.snap_to_grid.then_some(settings.snap_step),
            min_zone_percent: settings.min_zone_percent,
            seed_chain: SeedChain::default(),
        }
    }
}

/// Publish configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Device record field receiving the compiled configuration.
    #[serde(default = "default_field")]
    pub field: String,

    /// Only list and publish to devices whose `adminId` matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
}

fn default_field() -> String {
    DEFAULT_CONFIG_FIELD.to_string()
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            field: default_field(),
            operator_id: None,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Composer,
    Publish,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Composer => "composer",
            ConfigSection::Publish => "publish",
        }
    }

    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Paths,
            ConfigSection::Logging,
            ConfigSection::Composer,
            ConfigSection::Publish,
        ]
    }
}
