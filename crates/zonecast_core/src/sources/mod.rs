//! Collaborators consumed by the engine.
//!
//! - `catalog` lists playable media and caches it explicitly
//! - `directory` lists publish targets and broadcasts changes
//! - `store` is the write sink for compiled configurations
//!
//! Catalog and directory failures never block composition; they degrade
//! to an empty [`Listing`] carrying a notice for the operator.

mod catalog;
mod directory;
mod store;

pub use catalog::{
    CatalogCache, CatalogError, CatalogRecord, CatalogResult, FileCatalog, MediaCatalog,
};
pub use directory::{DeviceDirectory, DeviceRoster, DirectoryError, DirectoryResult};
pub use store::{
    DocumentStore, FileDocumentStore, MemoryDocumentStore, StoreError, StoreResult,
};

/// A list from a collaborator, possibly degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Inline notice shown when the collaborator could not be reached.
    pub notice: Option<String>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            notice: None,
        }
    }
}

impl<T> Listing<T> {
    pub fn available(items: Vec<T>) -> Self {
        Self {
            items,
            notice: None,
        }
    }

    /// Empty listing explaining why nothing could be loaded.
    pub fn unavailable(notice: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            notice: Some(notice.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}
