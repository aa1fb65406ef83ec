//! Aggregated result of a fan-out publish.

use crate::models::DeviceId;
use crate::sources::StoreError;

use super::errors::ValidationError;

/// A device whose write failed, with the store's error verbatim.
#[derive(Debug)]
pub struct DeviceFailure {
    pub device_id: DeviceId,
    pub error: StoreError,
}

/// Outcome of publishing one configuration to a set of devices.
///
/// Devices that succeeded are never rolled back, so partial failure leaves
/// the configuration applied to them.
#[derive(Debug)]
pub enum PublishOutcome {
    /// A precondition failed; no writes were attempted.
    ValidationFailed(ValidationError),
    /// Every write succeeded.
    Published { devices: Vec<DeviceId> },
    /// Some writes succeeded, some failed.
    PartialFailure {
        succeeded: Vec<DeviceId>,
        failed: Vec<DeviceFailure>,
    },
    /// Every write failed.
    Failed { failed: Vec<DeviceFailure> },
}

impl PublishOutcome {
    /// Build an outcome from per-device results.
    pub(crate) fn aggregate(succeeded: Vec<DeviceId>, failed: Vec<DeviceFailure>) -> Self {
        match (succeeded.is_empty(), failed.is_empty()) {
            (_, true) => PublishOutcome::Published { devices: succeeded },
            (true, false) => PublishOutcome::Failed { failed },
            (false, false) => PublishOutcome::PartialFailure { succeeded, failed },
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }

    /// Devices now holding the configuration.
    pub fn succeeded(&self) -> &[DeviceId] {
        match self {
            PublishOutcome::Published { devices } => devices,
            PublishOutcome::PartialFailure { succeeded, .. } => succeeded,
            PublishOutcome::ValidationFailed(_) | PublishOutcome::Failed { .. } => &[],
        }
    }

    pub fn failures(&self) -> &[DeviceFailure] {
        match self {
            PublishOutcome::PartialFailure { failed, .. } | PublishOutcome::Failed { failed } => {
                failed
            }
            PublishOutcome::ValidationFailed(_) | PublishOutcome::Published { .. } => &[],
        }
    }

    /// Ids of devices whose write failed.
    pub fn failed_ids(&self) -> Vec<DeviceId> {
        self.failures()
            .iter()
            .map(|failure| failure.device_id.clone())
            .collect()
    }

    /// One-line report for the operator.
    pub fn summary(&self) -> String {
        match self {
            PublishOutcome::ValidationFailed(e) => format!("Not published: {}", e),
            PublishOutcome::Published { devices } => {
                format!("Published to {} device(s)", devices.len())
            }
            PublishOutcome::PartialFailure { succeeded, failed } => format!(
                "Published to {} device(s); failed on {}",
                succeeded.len(),
                failed
                    .iter()
                    .map(|f| f.device_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            PublishOutcome::Failed { failed } => {
                format!("Publishing failed on all {} device(s)", failed.len())
            }
        }
    }
}
