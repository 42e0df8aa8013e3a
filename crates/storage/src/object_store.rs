//! Object store backed cache of rendered maps.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::{local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore};
use seaice_common::{SeaIceError, SeaIceResult};
use tracing::{debug, instrument};

use crate::CacheKey;

/// Rendered map cache.
///
/// Entries are written once and never evicted; a stored map for a past
/// date does not change.
pub struct ImageCache {
    store: Arc<dyn ObjectStore>,
    location: String,
}

impl ImageCache {
    /// Cache rooted at a local directory, created if missing.
    pub fn open(root: impl Into<PathBuf>) -> SeaIceResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            SeaIceError::StorageError(format!("Failed to create {}: {}", root.display(), e))
        })?;

        let store = LocalFileSystem::new_with_prefix(&root).map_err(|e| {
            SeaIceError::StorageError(format!("Failed to open {}: {}", root.display(), e))
        })?;

        Ok(Self {
            store: Arc::new(store),
            location: root.display().to_string(),
        })
    }

    /// Cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemory::new()), "memory")
    }

    /// Cache over any object store.
    pub fn with_store(store: Arc<dyn ObjectStore>, location: impl Into<String>) -> Self {
        Self {
            store,
            location: location.into(),
        }
    }

    /// Stored map, `None` when not cached yet.
    #[instrument(skip(self), fields(cache = %self.location, key = %key))]
    pub async fn get(&self, key: &CacheKey) -> SeaIceResult<Option<Bytes>> {
        let location = Path::from(key.path());

        let result = match self.store.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                debug!("Cache miss");
                return Ok(None);
            }
            Err(e) => {
                return Err(SeaIceError::StorageError(format!(
                    "Failed to read {}: {}",
                    key, e
                )))
            }
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| SeaIceError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Cache hit");
        Ok(Some(bytes))
    }

    /// Store a rendered map.
    #[instrument(skip(self, data), fields(cache = %self.location, key = %key))]
    pub async fn put(&self, key: &CacheKey, data: Bytes) -> SeaIceResult<()> {
        let location = Path::from(key.path());
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| SeaIceError::StorageError(format!("Failed to write {}: {}", key, e)))?;

        Ok(())
    }

    /// Check if a map is cached.
    pub async fn exists(&self, key: &CacheKey) -> SeaIceResult<bool> {
        let location = Path::from(key.path());

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(SeaIceError::StorageError(format!(
                "Failed to check {}: {}",
                key, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use seaice_common::DisplayMode;

    fn key(mode: DisplayMode, d: u32) -> CacheKey {
        CacheKey::new(mode, NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = ImageCache::in_memory();
        let k = key(DisplayMode::Thickness, 15);

        assert_eq!(cache.get(&k).await.unwrap(), None);
        assert!(!cache.exists(&k).await.unwrap());

        cache.put(&k, Bytes::from_static(b"png")).await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap(), Some(Bytes::from_static(b"png")));
        assert!(cache.exists(&k).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::open(dir.path().join("maps")).unwrap();
        let k = key(DisplayMode::Anomaly, 3);

        cache.put(&k, Bytes::from_static(b"\x89PNG")).await.unwrap();

        let on_disk = dir
            .path()
            .join("maps/anomaly/2024/cryosat-smos-thickness-anomaly-20240103.png");
        assert_eq!(std::fs::read(on_disk).unwrap(), b"\x89PNG");

        // A second handle on the same directory sees the entry
        let reopened = ImageCache::open(dir.path().join("maps")).unwrap();
        assert!(reopened.exists(&k).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_overwrites_entry() {
        let cache = ImageCache::in_memory();
        let k = key(DisplayMode::Thickness, 20);

        cache.put(&k, Bytes::from_static(b"old")).await.unwrap();
        cache.put(&k, Bytes::from_static(b"new")).await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap(), Some(Bytes::from_static(b"new")));

        // Keys for the other mode stay separate
        assert!(!cache.exists(&key(DisplayMode::Anomaly, 20)).await.unwrap());
    }
}
