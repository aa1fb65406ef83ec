//! Device directory: the list of publish targets.
//!
//! [`DeviceRoster`] wraps a directory and broadcasts the current listing
//! over a `watch` channel so views re-render when devices change.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::Device;

use super::Listing;

/// Errors from the device directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Device directory unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read device directory: {0}")]
    Io(#[from] io::Error),
}

impl DirectoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Source of addressable devices for the current operator.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>>;
}

#[async_trait]
impl<D: DeviceDirectory + ?Sized> DeviceDirectory for Arc<D> {
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>> {
        (**self).list_devices().await
    }
}

/// Live view of a device directory.
///
/// Failures degrade to an empty listing with a notice instead of an error.
pub struct DeviceRoster<D> {
    directory: D,
    sender: watch::Sender<Listing<Device>>,
}

impl<D: DeviceDirectory> DeviceRoster<D> {
    /// Create a roster. The listing is empty until the first refresh.
    pub fn new(directory: D) -> Self {
        let (sender, _) = watch::channel(Listing::default());
        Self { directory, sender }
    }

    /// Subscribe to listing changes.
    pub fn subscribe(&self) -> watch::Receiver<Listing<Device>> {
        self.sender.subscribe()
    }

    /// The most recent listing.
    pub fn current(&self) -> Listing<Device> {
        self.sender.borrow().clone()
    }

    /// Re-read the directory and notify subscribers if anything changed.
    pub async fn refresh(&self) -> Listing<Device> {
        let listing = match self.directory.list_devices().await {
            Ok(devices) => {
                tracing::debug!(count = devices.len(), "Device directory refreshed");
                Listing::available(devices)
            }
            Err(e) => {
                tracing::warn!("Device directory unavailable: {}", e);
                Listing::unavailable(format!("Devices could not be loaded: {}", e))
            }
        };

        self.sender.send_if_modified(|current| {
            if *current == listing {
                false
            } else {
                *current = listing.clone();
                true
            }
        });
        listing
    }
}

impl<D: DeviceDirectory + 'static> DeviceRoster<D> {
    /// Poll the directory on an interval until the roster is dropped by
    /// every other owner.
    pub fn spawn_polling(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if Arc::strong_count(&self) == 1 {
                    tracing::debug!("Device roster dropped, stopping polling");
                    break;
                }
                self.refresh().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceStatus;
    use crate::sources::MemoryDocumentStore;

    struct DownDirectory;

    #[async_trait]
    impl DeviceDirectory for DownDirectory {
        async fn list_devices(&self) -> DirectoryResult<Vec<Device>> {
            Err(DirectoryError::unavailable("offline"))
        }
    }

    #[tokio::test]
    async fn refresh_notifies_subscribers_on_change() {
        let store = Arc::new(MemoryDocumentStore::new());
        let roster = DeviceRoster::new(Arc::clone(&store));
        let mut rx = roster.subscribe();

        store.insert_device(Device::new("D1", "Lobby").with_status(DeviceStatus::Online));
        roster.refresh().await;

        assert!(rx.has_changed().unwrap());
        let listing = rx.borrow_and_update().clone();
        assert_eq!(listing.items.len(), 1);
        assert!(listing.notice.is_none());

        // Same contents: no notification.
        roster.refresh().await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn unavailable_directory_degrades_to_empty() {
        let roster = DeviceRoster::new(DownDirectory);
        let listing = roster.refresh().await;
        assert!(listing.items.is_empty());
        assert!(listing.is_degraded());
        assert_eq!(roster.current(), listing);
    }
}
