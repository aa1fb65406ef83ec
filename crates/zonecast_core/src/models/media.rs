//! Media references placed into zones.

use serde::{Deserialize, Serialize};

use super::enums::MediaKind;

/// A playable item from the media catalog, as stored in a zone.
///
/// Identity for deduplication and ordering is the `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// Catalog identifier, when the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Download URL of the asset.
    pub url: String,
    /// Media category (`image`, `video`, ...).
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Display time in seconds. Only meaningful for images; videos play
    /// for their intrinsic length.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "duration_secs"
    )]
    pub duration: Option<u32>,
}

impl MediaReference {
    /// Create a new reference with no id or duration.
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: None,
            url: url.into(),
            kind,
            duration: None,
        }
    }

    /// Create an image reference with a display duration.
    pub fn image(url: impl Into<String>, seconds: u32) -> Self {
        Self::new(url, MediaKind::Image).with_duration(seconds)
    }

    /// Create a video reference.
    pub fn video(url: impl Into<String>) -> Self {
        Self::new(url, MediaKind::Video)
    }

    /// Set the catalog id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the display duration.
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Collapse a full MIME string accidentally stored as the kind
    /// (`image/jpeg`) to its top-level part.
    pub fn normalized(mut self) -> Self {
        if let MediaKind::Other(raw) = &self.kind {
            if raw.contains('/') {
                self.kind = MediaKind::from_content_type(raw);
            }
        }
        self
    }
}

/// Durations are persisted as decimal strings (`"5"`) and accepted as
/// either strings or numbers.
mod duration_secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(seconds) => serializer.serialize_str(&seconds.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(seconds)) => Ok(Some(seconds)),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Raw::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid duration '{}': {}", text, e))),
        }
    }
}
