//! The compiled configuration document written to devices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{LayoutId, ZoneKey};
use super::media::MediaReference;

/// A screen region's playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Items in playback order. Urls are unique within a zone.
    #[serde(default)]
    pub items: Vec<MediaReference>,
}

impl Zone {
    pub fn new(items: Vec<MediaReference>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with this url is already in the zone.
    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|item| item.url == url)
    }
}

/// Zone contents keyed by zone, iterating in on-screen order.
pub type ZoneMap = BTreeMap<ZoneKey, Zone>;

/// Manually resized zone proportions (`"33.5%"` per zone).
///
/// Absent from a configuration means equal division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneSizes(BTreeMap<ZoneKey, String>);

impl ZoneSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ZoneKey, percent: impl Into<String>) {
        self.0.insert(key, percent.into());
    }

    pub fn get(&self, key: ZoneKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    /// Parsed percentage for a zone.
    pub fn percent(&self, key: ZoneKey) -> Option<f64> {
        self.get(key).and_then(parse_percent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneKey, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = ZoneKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all percentages, or `None` if any value fails to parse.
    pub fn total(&self) -> Option<f64> {
        self.0
            .values()
            .map(|value| parse_percent(value))
            .sum::<Option<f64>>()
    }
}

impl FromIterator<(ZoneKey, String)> for ZoneSizes {
    fn from_iter<T: IntoIterator<Item = (ZoneKey, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a `"33.5%"` style percentage. The `%` suffix is optional.
pub fn parse_percent(value: &str) -> Option<f64> {
    let number = value.trim().trim_end_matches('%').trim();
    number.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// The unit of publication: layout, per-zone playlists and proportions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledConfig {
    /// Screen division scheme.
    pub layout: LayoutId,
    /// Zone playlists, `null` until composition for the layout begins.
    #[serde(default)]
    pub zones: Option<ZoneMap>,
    /// Manual proportions, present only after an operator resize.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_sizes: Option<ZoneSizes>,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            layout: LayoutId::Fullscreen,
            zones: None,
            zone_sizes: None,
        }
    }
}

impl CompiledConfig {
    /// A fresh, empty document (`fullscreen`, no zones).
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a zone by key.
    pub fn zone(&self, key: ZoneKey) -> Option<&Zone> {
        self.zones.as_ref().and_then(|zones| zones.get(&key))
    }

    /// Zone keys present in the document, in on-screen order.
    pub fn zone_keys(&self) -> Vec<ZoneKey> {
        self.zones
            .as_ref()
            .map(|zones| zones.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether any zone has been composed.
    pub fn has_zones(&self) -> bool {
        self.zones.as_ref().is_some_and(|zones| !zones.is_empty())
    }

    /// Total number of items across all zones.
    pub fn item_count(&self) -> usize {
        self.zones
            .as_ref()
            .map(|zones| zones.values().map(|zone| zone.items.len()).sum())
            .unwrap_or(0)
    }
}
