//! Directory metadata for addressable display devices.

use serde::{Deserialize, Serialize};

use super::enums::DeviceStatus;

/// Identifier of a device record in the document store.
pub type DeviceId = String;

/// A publish target as listed by the device directory.
///
/// Only directory metadata is read; the stored `compiledConfig` field is
/// write-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub name: String,
    /// Hardware or player type (`tv`, `kiosk`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Operator account that registered the device.
    #[serde(rename = "adminId", default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: String::new(),
            status: DeviceStatus::default(),
            resolution: None,
            admin_id: None,
        }
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_admin(mut self, admin_id: impl Into<String>) -> Self {
        self.admin_id = Some(admin_id.into());
        self
    }

    /// One-line description for target pickers: `type • resolution • status`.
    pub fn summary(&self) -> String {
        format!(
            "{} • {} • {}",
            self.kind,
            self.resolution.as_deref().unwrap_or("unknown res"),
            self.status
        )
    }
}
