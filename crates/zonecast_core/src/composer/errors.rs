//! Errors raised while composing a configuration.

use thiserror::Error;

use crate::layout::LayoutError;
use crate::models::{LayoutId, MediaKind, ZoneKey};

use super::stage::Stage;

/// An action or navigation step that cannot be applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("Zone '{zone}' is not part of layout '{layout}'")]
    UnknownZone { zone: ZoneKey, layout: LayoutId },

    #[error("No item with url '{url}' in zone '{zone}'")]
    ItemNotFound { zone: ZoneKey, url: String },

    #[error("Item '{url}' is a {kind} and plays for its own length")]
    UntimedItem { url: String, kind: MediaKind },

    #[error("Duration must be at least one second")]
    InvalidDuration,

    #[error("Position {index} is out of range for zone '{zone}' with {len} item(s)")]
    ItemIndexOutOfRange {
        zone: ZoneKey,
        index: usize,
        len: usize,
    },

    #[error("Zone '{zone}' would be {percent:.1}%, below the {min:.1}% minimum")]
    ZoneTooSmall { zone: ZoneKey, percent: f64, min: f64 },

    #[error("Resize rejected: {0}")]
    Resize(#[from] LayoutError),

    #[error("{action} is not available in the {stage} stage")]
    WrongStage { action: &'static str, stage: Stage },

    #[error("Cannot move forward from the {0} stage")]
    CannotAdvance(Stage),

    #[error("Cannot go back to the {target} stage from the {current} stage")]
    NotVisited { target: Stage, current: Stage },

    #[error("No failed devices to retry")]
    NothingToRetry,

    #[error("Submit publishes the draft; use Composer::submit or Composer::dispatch")]
    SubmitNotApplied,
}

/// Result type for composition operations.
pub type CompositionResult<T> = Result<T, CompositionError>;
