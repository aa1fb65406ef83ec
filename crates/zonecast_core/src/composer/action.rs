//! Named actions that drive the composition.

use std::collections::BTreeSet;

use crate::models::{DeviceId, LayoutId, MediaReference, ZoneKey};

use super::stage::Stage;

/// A discrete operator action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pick a layout, re-deriving zones and dropping manual sizes.
    SetLayout(LayoutId),
    /// Measured panel sizes. `manual` marks an operator drag; until one
    /// has happened, measurements are ignored and sizes stay absent.
    SetZoneSizes { raw_sizes: Vec<f64>, manual: bool },
    /// Focus a zone for content selection.
    SetActiveZone(ZoneKey),
    /// Replace a zone's playlist.
    AssignZoneItems {
        zone: ZoneKey,
        items: Vec<MediaReference>,
    },
    /// Change how long an image is shown.
    SetItemDuration {
        zone: ZoneKey,
        url: String,
        seconds: u32,
    },
    /// Reorder a zone's playlist.
    MoveZoneItem { zone: ZoneKey, from: usize, to: usize },
    /// Replace the target selection.
    SelectTargets(BTreeSet<DeviceId>),
    /// Add or remove one target.
    ToggleTarget(DeviceId),
    /// Publish the document to the selected targets.
    Submit,
}

impl Action {
    /// Action name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetLayout(_) => "SetLayout",
            Action::SetZoneSizes { .. } => "SetZoneSizes",
            Action::SetActiveZone(_) => "SetActiveZone",
            Action::AssignZoneItems { .. } => "AssignZoneItems",
            Action::SetItemDuration { .. } => "SetItemDuration",
            Action::MoveZoneItem { .. } => "MoveZoneItem",
            Action::SelectTargets(_) => "SelectTargets",
            Action::ToggleTarget(_) => "ToggleTarget",
            Action::Submit => "Submit",
        }
    }

    /// The wizard stage in which this action is available.
    pub fn stage(&self) -> Stage {
        match self {
            Action::SetLayout(_) | Action::SetZoneSizes { .. } => Stage::Layout,
            Action::SetActiveZone(_)
            | Action::AssignZoneItems { .. }
            | Action::SetItemDuration { .. }
            | Action::MoveZoneItem { .. } => Stage::Content,
            Action::SelectTargets(_) | Action::ToggleTarget(_) | Action::Submit => Stage::Targets,
        }
    }
}
