use crate::error::{NotificationError, NotificationErrorExt};
use bns_storage::FileStore;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Raw byte persistence for notification logs, one value per key.
///
/// `load` returns `Ok(None)` for a key that was never written or has been removed.
pub trait NotificationBackend: Send + Sync + Debug {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, NotificationError>> + Send;

    fn save(&self, key: &str, bytes: &[u8])
    -> impl Future<Output = Result<(), NotificationError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// File-backed logs: `key` lives at `<root>/<key>.json`, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileBackend {
    store: FileStore,
}

impl FileBackend {
    pub const EXTENSION: &'static str = "json";

    /// Opens (creating if needed) the data directory at `root`.
    ///
    /// # Errors
    /// [`NotificationError::Storage`] when the directory can not be created or resolved.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, NotificationError> {
        let store = FileStore::builder()
            .root(root)
            .create(true)
            .extension(Self::EXTENSION)
            .open()
            .await
            .context("Failed to open notification storage")?;
        Ok(Self { store })
    }

    /// Wraps an already opened store. Its extension is used as is.
    #[must_use]
    pub const fn from_store(store: FileStore) -> Self {
        Self { store }
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    /// [`NotificationError::Storage`] for keys the store refuses.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, NotificationError> {
        Ok(self.store.path_for(key)?)
    }
}

impl NotificationBackend for FileBackend {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, NotificationError> {
        Ok(self.store.read(key).await?)
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), NotificationError> {
        Ok(self.store.write(key, bytes).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), NotificationError> {
        self.store.remove(key).await?;
        Ok(())
    }
}

/// In-process backend for tests and ephemeral hosts. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<RwLock<FxHashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites `key` directly, bypassing any store. Handy for seeding fixtures.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.values.write().insert(key.into(), bytes.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.values.read().get(key).cloned()
    }
}

impl NotificationBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, NotificationError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), NotificationError> {
        self.values.write().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), NotificationError> {
        self.values.write().remove(key);
        Ok(())
    }
}

impl<B: NotificationBackend> NotificationBackend for Arc<B> {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, NotificationError>> + Send {
        (**self).load(key)
    }

    fn save(
        &self,
        key: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<(), NotificationError>> + Send {
        (**self).save(key, bytes)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), NotificationError>> + Send {
        (**self).remove(key)
    }
}
