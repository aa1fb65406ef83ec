//! Data models for the composition and publish engine.
//!
//! This module contains the core data structures shared by every stage:
//! - Enums for layouts, zone keys, media kinds and device status
//! - Media references placed into zones
//! - The compiled configuration document
//! - Device directory records

mod config;
mod device;
mod enums;
mod media;

// Re-export all public types
pub use config::{parse_percent, CompiledConfig, Zone, ZoneMap, ZoneSizes};
pub use device::{Device, DeviceId};
pub use enums::{
    DeviceStatus, LayoutId, MediaKind, SplitDirection, UnknownLayout, UnknownZone, ZoneKey,
};
pub use media::MediaReference;
