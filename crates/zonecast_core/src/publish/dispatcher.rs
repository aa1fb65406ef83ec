//! Fan-out of a compiled configuration to target devices.

use std::collections::BTreeSet;

use futures_util::future::join_all;

use crate::models::{CompiledConfig, DeviceId};
use crate::sources::DocumentStore;

use super::errors::{ValidationError, ValidationResult};
use super::outcome::{DeviceFailure, PublishOutcome};

/// Field of the device record that receives the configuration.
pub const DEFAULT_CONFIG_FIELD: &str = "compiledConfig";

/// Allowed deviation of manual zone sizes from 100%.
const SIZE_TOLERANCE: f64 = 0.1;

/// Validates a configuration and writes it to every target concurrently.
///
/// Writes are independent: there is no transaction spanning devices, no
/// ordering between them, and no automatic retry.
pub struct Dispatcher<S> {
    store: S,
    field: String,
}

impl<S: DocumentStore> Dispatcher<S> {
    /// Create a dispatcher writing to the `compiledConfig` field.
    pub fn new(store: S) -> Self {
        Self {
            store,
            field: DEFAULT_CONFIG_FIELD.to_string(),
        }
    }

    /// Write to a different record field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Check publish preconditions.
    ///
    /// The layout is always present since it is a closed enumeration; the
    /// remaining checks are, in order: content exists, the zone set
    /// matches the layout, manual sizes are consistent, targets exist.
    pub fn validate(config: &CompiledConfig, targets: &BTreeSet<DeviceId>) -> ValidationResult<()> {
        let zones = match &config.zones {
            Some(zones) if !zones.is_empty() => zones,
            _ => return Err(ValidationError::MissingContent),
        };

        let expected = config.layout.topology().zone_keys.to_vec();
        let found: Vec<_> = zones.keys().copied().collect();
        if expected != found {
            return Err(ValidationError::ZoneSetMismatch {
                layout: config.layout,
                expected,
                found,
            });
        }

        if let Some(sizes) = &config.zone_sizes {
            if let Some(stray) = sizes.keys().find(|key| !expected.contains(key)) {
                return Err(ValidationError::InvalidZoneSizes(format!(
                    "zone '{}' is not part of layout '{}'",
                    stray, config.layout
                )));
            }
            match sizes.total() {
                Some(total) if (total - 100.0).abs() <= SIZE_TOLERANCE => {}
                Some(total) => {
                    return Err(ValidationError::InvalidZoneSizes(format!(
                        "sizes sum to {:.1}%",
                        total
                    )))
                }
                None => {
                    return Err(ValidationError::InvalidZoneSizes(
                        "a size is not a percentage".to_string(),
                    ))
                }
            }
        }

        if targets.is_empty() {
            return Err(ValidationError::NoTargets);
        }
        Ok(())
    }

    /// Publish `config` to every device in `targets`.
    ///
    /// All writes are issued at once and awaited together; the outcome is
    /// reported only after every write has finished.
    pub async fn publish(
        &self,
        config: &CompiledConfig,
        targets: &BTreeSet<DeviceId>,
    ) -> PublishOutcome {
        if let Err(e) = Self::validate(config, targets) {
            tracing::warn!("Publish validation failed: {}", e);
            return PublishOutcome::ValidationFailed(e);
        }

        // Each device receives its own copy of the document.
        let document = match serde_json::to_value(config) {
            Ok(document) => document,
            Err(e) => {
                return PublishOutcome::ValidationFailed(ValidationError::Unserializable(
                    e.to_string(),
                ))
            }
        };

        tracing::info!(
            layout = %config.layout,
            targets = targets.len(),
            items = config.item_count(),
            "Publishing configuration"
        );

        let writes = targets.iter().map(|device_id| {
            let document = document.clone();
            async move {
                let result = self
                    .store
                    .write_field(device_id, &self.field, document)
                    .await;
                (device_id, result)
            }
        });

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (device_id, result) in join_all(writes).await {
            match result {
                Ok(()) => {
                    tracing::debug!(device_id = %device_id, "Configuration delivered");
                    succeeded.push(device_id.clone());
                }
                Err(error) => {
                    tracing::warn!(device_id = %device_id, "Configuration write failed: {}", error);
                    failed.push(DeviceFailure {
                        device_id: device_id.clone(),
                        error,
                    });
                }
            }
        }

        let outcome = PublishOutcome::aggregate(succeeded, failed);
        tracing::info!("{}", outcome.summary());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Barrier;

    use crate::models::{Device, LayoutId, MediaReference, Zone, ZoneKey, ZoneMap, ZoneSizes};
    use crate::sources::{MemoryDocumentStore, StoreResult};

    fn two_column() -> CompiledConfig {
        let mut zones = ZoneMap::new();
        zones.insert(ZoneKey::Left, Zone::new(vec![MediaReference::image("a.png", 5)]));
        zones.insert(ZoneKey::Right, Zone::default());
        CompiledConfig {
            layout: LayoutId::TwoColumn,
            zones: Some(zones),
            zone_sizes: None,
        }
    }

    fn targets(ids: &[&str]) -> BTreeSet<DeviceId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn store_with(ids: &[&str]) -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        for id in ids {
            store.insert_device(Device::new(*id, *id));
        }
        store
    }

    #[tokio::test]
    async fn no_targets_writes_nothing() {
        let dispatcher = Dispatcher::new(store_with(&["D1"]));
        let outcome = dispatcher.publish(&two_column(), &BTreeSet::new()).await;

        assert!(matches!(
            outcome,
            PublishOutcome::ValidationFailed(ValidationError::NoTargets)
        ));
        assert_eq!(dispatcher.store().write_count(), 0);
    }

    #[tokio::test]
    async fn missing_zones_writes_nothing() {
        let dispatcher = Dispatcher::new(store_with(&["D1"]));
        let outcome = dispatcher
            .publish(&CompiledConfig::new(), &targets(&["D1"]))
            .await;

        assert!(matches!(
            outcome,
            PublishOutcome::ValidationFailed(ValidationError::MissingContent)
        ));
        assert_eq!(dispatcher.store().write_count(), 0);
    }

    #[test]
    fn stale_zone_set_is_rejected() {
        let mut config = two_column();
        config.layout = LayoutId::TwoRow;
        let err = Dispatcher::<MemoryDocumentStore>::validate(&config, &targets(&["D1"])).unwrap_err();
        assert!(matches!(err, ValidationError::ZoneSetMismatch { .. }));
    }

    #[test]
    fn zone_sizes_must_sum_to_100() {
        let mut config = two_column();
        let sizes: ZoneSizes = [
            (ZoneKey::Left, "60.0%".to_string()),
            (ZoneKey::Right, "30.0%".to_string()),
        ]
        .into_iter()
        .collect();
        config.zone_sizes = Some(sizes);
        let err = Dispatcher::<MemoryDocumentStore>::validate(&config, &targets(&["D1"])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidZoneSizes(_)));

        let ok: ZoneSizes = [
            (ZoneKey::Left, "60.05%".to_string()),
            (ZoneKey::Right, "40.0%".to_string()),
        ]
        .into_iter()
        .collect();
        config.zone_sizes = Some(ok);
        assert!(Dispatcher::<MemoryDocumentStore>::validate(&config, &targets(&["D1"])).is_ok());
    }

    #[tokio::test]
    async fn partial_failure_keeps_successful_writes() {
        let store = store_with(&["D1", "D2", "D3"]);
        store.fail_device("D2");
        let dispatcher = Dispatcher::new(store);
        let config = two_column();

        let outcome = dispatcher
            .publish(&config, &targets(&["D1", "D2", "D3"]))
            .await;

        match &outcome {
            PublishOutcome::PartialFailure { succeeded, failed } => {
                assert_eq!(succeeded, &vec!["D1".to_string(), "D3".to_string()]);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].device_id, "D2");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let expected = serde_json::to_value(&config).unwrap();
        assert_eq!(dispatcher.store().field("D1", "compiledConfig"), Some(expected.clone()));
        assert_eq!(dispatcher.store().field("D3", "compiledConfig"), Some(expected));
        assert_eq!(dispatcher.store().field("D2", "compiledConfig"), None);
    }

    #[tokio::test]
    async fn every_write_failing_is_failed() {
        let dispatcher = Dispatcher::new(MemoryDocumentStore::new());
        let outcome = dispatcher.publish(&two_column(), &targets(&["X", "Y"])).await;
        assert!(matches!(outcome, PublishOutcome::Failed { ref failed } if failed.len() == 2));
        assert_eq!(dispatcher.store().write_count(), 2);
    }

    #[tokio::test]
    async fn custom_field_name() {
        let dispatcher = Dispatcher::new(store_with(&["D1"])).with_field("playlist");
        let outcome = dispatcher.publish(&two_column(), &targets(&["D1"])).await;
        assert!(outcome.is_published());
        assert!(dispatcher.store().field("D1", "playlist").is_some());
    }

    /// Store whose writes only complete once every target has started.
    struct RendezvousStore {
        barrier: Barrier,
    }

    #[async_trait]
    impl DocumentStore for RendezvousStore {
        async fn write_field(&self, _device_id: &str, _field: &str, _value: Value) -> StoreResult<()> {
            self.barrier.wait().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_are_issued_concurrently() {
        let store = Arc::new(RendezvousStore {
            barrier: Barrier::new(3),
        });
        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            dispatcher.publish(&two_column(), &targets(&["A", "B", "C"])),
        )
        .await
        .expect("sequential writes would deadlock on the barrier");
        assert!(outcome.is_published());
    }
}
