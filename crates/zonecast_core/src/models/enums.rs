//! Core enums used throughout the engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Screen-division scheme applied to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutId {
    /// A single zone covering the whole screen.
    #[default]
    #[serde(rename = "fullscreen")]
    Fullscreen,
    /// Two stacked rows.
    #[serde(rename = "2row")]
    TwoRow,
    /// Three stacked rows.
    #[serde(rename = "3row")]
    ThreeRow,
    /// Two side-by-side columns.
    #[serde(rename = "2col")]
    TwoColumn,
    /// Three side-by-side columns.
    #[serde(rename = "3col")]
    ThreeColumn,
}

impl LayoutId {
    /// Identifier as written into compiled configurations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fullscreen => "fullscreen",
            Self::TwoRow => "2row",
            Self::ThreeRow => "3row",
            Self::TwoColumn => "2col",
            Self::ThreeColumn => "3col",
        }
    }

    /// Get the display name for this layout.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fullscreen => "Fullscreen",
            Self::TwoRow => "2 rows",
            Self::ThreeRow => "3 rows",
            Self::TwoColumn => "2 columns",
            Self::ThreeColumn => "3 columns",
        }
    }

    /// Get all available layouts, fullscreen first.
    pub fn all() -> &'static [LayoutId] {
        &[
            Self::Fullscreen,
            Self::TwoRow,
            Self::ThreeRow,
            Self::TwoColumn,
            Self::ThreeColumn,
        ]
    }
}

impl std::fmt::Display for LayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised layout identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown layout identifier '{0}'")]
pub struct UnknownLayout(pub String);

impl FromStr for LayoutId {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|layout| layout.as_str() == s.trim())
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}

/// Axis along which a layout's zones are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Zones stacked top to bottom.
    #[default]
    Vertical,
    /// Zones placed left to right.
    Horizontal,
}

impl std::fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitDirection::Vertical => write!(f, "vertical"),
            SplitDirection::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Key identifying a zone within a layout.
///
/// Declaration order follows the topology tables, so ordered maps keyed by
/// `ZoneKey` iterate in on-screen order for every layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKey {
    Full,
    Top,
    Middle,
    Bottom,
    Left,
    Center,
    Right,
}

impl ZoneKey {
    /// Key as written into compiled configurations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Human label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Top => "Top",
            Self::Middle => "Middle",
            Self::Bottom => "Bottom",
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }

    /// Get all zone keys.
    pub fn all() -> &'static [ZoneKey] {
        &[
            Self::Full,
            Self::Top,
            Self::Middle,
            Self::Bottom,
            Self::Left,
            Self::Center,
            Self::Right,
        ]
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised zone key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown zone key '{0}'")]
pub struct UnknownZone(pub String);

impl FromStr for ZoneKey {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| UnknownZone(s.to_string()))
    }
}

/// Playable media category.
///
/// Serialized as the top-level MIME type (`"image"`, `"video"`); anything
/// else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Image,
    Video,
    Other(String),
}

impl MediaKind {
    /// Derive the kind from a MIME content type (`image/png` -> `Image`).
    ///
    /// Only the part before the first `/` is considered.
    pub fn from_content_type(content_type: &str) -> Self {
        let top = content_type.split('/').next().unwrap_or_default();
        Self::from(top.to_string())
    }

    /// Whether items of this kind carry an operator-assigned duration.
    pub fn is_timed(&self) -> bool {
        matches!(self, MediaKind::Image)
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other(other) => other,
        }
    }
}

impl From<String> for MediaKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other(value),
        }
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => "image".to_string(),
            MediaKind::Video => "video".to_string(),
            MediaKind::Other(other) => other,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Liveness status reported by the device directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
    Other(String),
}

impl DeviceStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, DeviceStatus::Online)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Other(other) => other,
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Other(value),
        }
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Online => "online".to_string(),
            DeviceStatus::Offline => "offline".to_string(),
            DeviceStatus::Other(other) => other,
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
