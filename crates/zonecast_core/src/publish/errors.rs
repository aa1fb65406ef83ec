//! Publish precondition failures.

use thiserror::Error;

use crate::models::{LayoutId, ZoneKey};

/// A precondition checked before any device write is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `zones` is null or holds no zone.
    #[error("Content is missing: compose at least one zone before publishing")]
    MissingContent,

    /// No target device was selected.
    #[error("No target devices selected")]
    NoTargets,

    /// The zone set does not match the layout's topology.
    #[error("Zones {found:?} do not match layout '{layout}' (expected {expected:?})")]
    ZoneSetMismatch {
        layout: LayoutId,
        expected: Vec<ZoneKey>,
        found: Vec<ZoneKey>,
    },

    /// Manual zone sizes reference other zones or do not sum to 100.
    #[error("Invalid zone sizes: {0}")]
    InvalidZoneSizes(String),

    /// The document could not be converted for the store.
    #[error("Configuration could not be serialized: {0}")]
    Unserializable(String),
}

impl ValidationError {
    /// Whether the operator must revisit content rather than targets.
    pub fn concerns_content(&self) -> bool {
        !matches!(self, ValidationError::NoTargets)
    }
}

/// Result type for validation checks.
pub type ValidationResult<T> = Result<T, ValidationError>;
