//! Media catalog: the playable items an operator can place in zones.
//!
//! [`CatalogCache`] owns the fetched list. It is filled on first use and
//! only re-fetched through [`CatalogCache::refresh`]; nothing is shared
//! between caches.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MediaKind, MediaReference};

use super::Listing;

/// Errors from the media catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Media catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read media catalog: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse media catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A stored asset as reported by the catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    /// MIME type of the stored asset (`image/png`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Explicit kind, used when no content type is known.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CatalogRecord {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: None,
            url: url.into(),
            content_type: Some(content_type.into()),
            kind: None,
        }
    }

    /// Convert into a zone-ready reference.
    ///
    /// The kind is the top-level part of the content type; images get
    /// `image_duration` seconds.
    pub fn into_reference(self, image_duration: u32) -> MediaReference {
        let kind = match (&self.content_type, &self.kind) {
            (Some(content_type), _) => MediaKind::from_content_type(content_type),
            (None, Some(kind)) => MediaKind::from_content_type(kind),
            (None, None) => MediaKind::Other(String::new()),
        };
        let duration = kind.is_timed().then_some(image_duration);
        MediaReference {
            id: self.id,
            url: self.url,
            kind,
            duration,
        }
    }
}

/// Backend listing the operator's stored media.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    async fn list_media(&self) -> CatalogResult<Vec<CatalogRecord>>;
}

/// Catalog backed by a JSON manifest (an array of [`CatalogRecord`]).
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MediaCatalog for FileCatalog {
    async fn list_media(&self) -> CatalogResult<Vec<CatalogRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<CatalogRecord> = serde_json::from_str(&content)?;
        Ok(records)
    }
}

/// Explicit, refreshable cache over a media catalog.
pub struct CatalogCache<C> {
    catalog: C,
    image_duration: u32,
    cached: Option<Vec<MediaReference>>,
}

impl<C: MediaCatalog> CatalogCache<C> {
    /// Create an empty cache. Images are offered with `image_duration`
    /// seconds.
    pub fn new(catalog: C, image_duration: u32) -> Self {
        Self {
            catalog,
            image_duration,
            cached: None,
        }
    }

    /// Whether a successful fetch is cached.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Cached items, fetching on first use.
    pub async fn items(&mut self) -> Listing<MediaReference> {
        if let Some(items) = &self.cached {
            return Listing::available(items.clone());
        }
        self.refresh().await
    }

    /// Fetch from the backend, replacing the cache.
    ///
    /// On failure the cache is cleared and an empty listing with a notice
    /// is returned.
    pub async fn refresh(&mut self) -> Listing<MediaReference> {
        match self.catalog.list_media().await {
            Ok(records) => {
                let items: Vec<MediaReference> = records
                    .into_iter()
                    .map(|record| record.into_reference(self.image_duration))
                    .collect();
                tracing::debug!(count = items.len(), "Media catalog refreshed");
                self.cached = Some(items.clone());
                Listing::available(items)
            }
            Err(e) => {
                tracing::warn!("Media catalog unavailable: {}", e);
                self.cached = None;
                Listing::unavailable(format!("Media could not be loaded: {}", e))
            }
        }
    }

    /// Drop cached items so the next [`items`](Self::items) call fetches.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
