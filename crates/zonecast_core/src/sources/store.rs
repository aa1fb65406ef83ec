//! Document store sink for device records.
//!
//! The engine only ever writes one field of a device record. Two stores
//! are provided: a directory of JSON records on disk and an in-memory map
//! used by tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Device, DeviceId};

use super::directory::{DeviceDirectory, DirectoryError, DirectoryResult};

/// Errors reported by a document store write.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the device.
    #[error("Device '{0}' not found")]
    NotFound(DeviceId),

    /// Device id cannot address a record.
    #[error("Invalid device id '{0}'")]
    InvalidId(String),

    /// The stored record is not a JSON object.
    #[error("Record for device '{device_id}' is malformed: {message}")]
    Malformed { device_id: DeviceId, message: String },

    /// I/O failure while reading or writing a record.
    #[error("I/O error for device '{device_id}': {source}")]
    Io {
        device_id: DeviceId,
        #[source]
        source: io::Error,
    },

    /// The backend refused or could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(device_id: impl Into<String>) -> Self {
        Self::NotFound(device_id.into())
    }

    pub fn malformed(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            device_id: device_id.into(),
            message: message.into(),
        }
    }

    pub fn io(device_id: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            device_id: device_id.into(),
            source,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Write sink for device documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Set `field` of the device's record to `value`, leaving other fields
    /// untouched. Fails if the device has no record.
    async fn write_field(&self, device_id: &str, field: &str, value: Value) -> StoreResult<()>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn write_field(&self, device_id: &str, field: &str, value: Value) -> StoreResult<()> {
        (**self).write_field(device_id, field, value).await
    }
}

/// Set a field on a record, which must be a JSON object.
fn patch_record(device_id: &str, record: &mut Value, field: &str, value: Value) -> StoreResult<()> {
    match record.as_object_mut() {
        Some(object) => {
            object.insert(field.to_string(), value);
            Ok(())
        }
        None => Err(StoreError::malformed(device_id, "record is not an object")),
    }
}

/// Whether a raw record belongs to `operator`'s account.
fn owned_by(record: &Value, operator: Option<&str>) -> bool {
    match operator {
        Some(operator) => record.get("adminId").and_then(Value::as_str) == Some(operator),
        None => true,
    }
}

/// Parse a record into a directory entry, filling `id` from the key.
fn device_from_record(device_id: &str, record: &Value) -> Option<Device> {
    let mut record = record.clone();
    if let Some(object) = record.as_object_mut() {
        object
            .entry("id")
            .or_insert_with(|| Value::String(device_id.to_string()));
    }
    match serde_json::from_value::<Device>(record) {
        Ok(device) => Some(device),
        Err(e) => {
            tracing::warn!(device_id, "Skipping unreadable device record: {}", e);
            None
        }
    }
}

/// Device records kept as JSON files, one `<device_id>.json` per device.
///
/// When scoped to an operator, records owned by other accounts are neither
/// listed nor writable.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
    operator: Option<String>,
}

impl FileDocumentStore {
    /// Create an unscoped store rooted at `root`. The directory is not
    /// created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            operator: None,
        }
    }

    /// Restrict the store to devices whose `adminId` is `operator`.
    pub fn for_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Path of a device's record file.
    fn record_path(&self, device_id: &str) -> StoreResult<PathBuf> {
        let valid = !device_id.is_empty()
            && device_id != "."
            && device_id != ".."
            && !device_id.contains(['/', '\\']);
        if !valid {
            return Err(StoreError::InvalidId(device_id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", device_id)))
    }

    /// Read a device's full record.
    pub async fn read_record(&self, device_id: &str) -> StoreResult<Value> {
        let path = self.record_path(device_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(device_id))
            }
            Err(e) => return Err(StoreError::io(device_id, e)),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::malformed(device_id, e.to_string()))
    }

    /// Write a record atomically (temp file, then rename).
    async fn write_record(&self, device_id: &str, record: &Value) -> StoreResult<()> {
        let path = self.record_path(device_id)?;
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::malformed(device_id, e.to_string()))?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| StoreError::io(device_id, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StoreError::io(device_id, e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn write_field(&self, device_id: &str, field: &str, value: Value) -> StoreResult<()> {
        let mut record = self.read_record(device_id).await?;
        if !owned_by(&record, self.operator()) {
            return Err(StoreError::not_found(device_id));
        }
        patch_record(device_id, &mut record, field, value)?;
        self.write_record(device_id, &record).await?;
        tracing::debug!(device_id, field, "Wrote device record field");
        Ok(())
    }
}

#[async_trait]
impl DeviceDirectory for FileDocumentStore {
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DirectoryError::unavailable(format!(
                    "device store {} does not exist",
                    self.root.display()
                )))
            }
            Err(e) => return Err(DirectoryError::Io(e)),
        };

        let mut devices = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(DirectoryError::Io)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(device_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.read_record(device_id).await {
                Ok(record) if owned_by(&record, self.operator()) => {
                    devices.extend(device_from_record(device_id, &record))
                }
                Ok(_) => tracing::trace!(device_id, "Device belongs to another operator"),
                Err(e) => tracing::warn!(device_id, "Skipping device record: {}", e),
            }
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(devices)
    }
}

/// In-memory device records with write counting and failure injection.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    operator: Option<String>,
    records: Mutex<BTreeMap<DeviceId, Value>>,
    failing: Mutex<BTreeSet<DeviceId>>,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict listing and writes to devices whose `adminId` is `operator`.
    pub fn for_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Add a record built from directory metadata (builder pattern).
    pub fn with_device(self, device: Device) -> Self {
        self.insert_device(device);
        self
    }

    /// Add or replace a record built from directory metadata.
    pub fn insert_device(&self, device: Device) {
        let id = device.id.clone();
        let record = serde_json::to_value(device).unwrap_or(Value::Null);
        self.records.lock().insert(id, record);
    }

    /// Add or replace a raw record.
    pub fn insert_record(&self, device_id: impl Into<DeviceId>, record: Value) {
        self.records.lock().insert(device_id.into(), record);
    }

    /// Make every subsequent write to this device fail.
    pub fn fail_device(&self, device_id: impl Into<DeviceId>) {
        self.failing.lock().insert(device_id.into());
    }

    /// Let writes to a previously failing device through again.
    pub fn recover_device(&self, device_id: &str) {
        self.failing.lock().remove(device_id);
    }

    /// Number of write attempts received, including failed ones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn record(&self, device_id: &str) -> Option<Value> {
        self.records.lock().get(device_id).cloned()
    }

    /// A single field of a device record.
    pub fn field(&self, device_id: &str, field: &str) -> Option<Value> {
        self.records
            .lock()
            .get(device_id)
            .and_then(|record| record.get(field))
            .cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn write_field(&self, device_id: &str, field: &str, value: Value) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().contains(device_id) {
            return Err(StoreError::unavailable(format!(
                "write to '{}' rejected",
                device_id
            )));
        }

        let mut records = self.records.lock();
        let record = records
            .get_mut(device_id)
            .filter(|record| owned_by(record, self.operator.as_deref()))
            .ok_or_else(|| StoreError::not_found(device_id))?;
        patch_record(device_id, record, field, value)
    }
}

#[async_trait]
impl DeviceDirectory for MemoryDocumentStore {
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>> {
        let records = self.records.lock();
        Ok(records
            .iter()
            .filter(|(_, record)| owned_by(record, self.operator.as_deref()))
            .filter_map(|(id, record)| device_from_record(id, record))
            .collect())
    }
}
