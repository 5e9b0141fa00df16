//! The [`FileStore`] handle: one file per key, replaced atomically on every write.

use crate::builder::FileStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::key::StorageKey;
use crate::{maintenance, sandbox};
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Infix of in-flight temporary files. Keys containing it are rejected.
pub(crate) const TMP_MARKER: &str = ".bnstmp.";

/// Shared state behind a [`FileStore`] handle.
#[derive(Debug)]
pub struct FileStoreInner {
    /// Canonical physical root; every key resolves to a direct child of it.
    pub(crate) root: PathBuf,
    pub(crate) extension: Option<String>,
    pub(crate) stale_after: Duration,
    pub(crate) tmp_counter: AtomicU64,
}

/// A cheaply cloneable handle to a sandboxed key/value directory.
///
/// Each key is stored as `<root>/<key>[.<extension>]`. Writes go through a unique temp
/// file, `fsync` and `rename`, so readers in this or any other process only ever observe
/// a complete previous or complete new value.
///
/// ```rust
/// use bns_storage::{FileStore, StorageError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let store = FileStore::builder().root(tmp.path()).extension("json").open().await?;
///
/// store.write("bns_notifications", b"[]").await?;
/// assert_eq!(store.read("bns_notifications").await?.as_deref(), Some(&b"[]"[..]));
///
/// assert!(store.remove("bns_notifications").await?);
/// assert_eq!(store.read("bns_notifications").await?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    pub(crate) inner: Arc<FileStoreInner>,
}

impl Deref for FileStore {
    type Target = FileStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FileStore {
    #[must_use = "The store is not usable until you call .open()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    /// Canonical root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical path a key maps to.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for malformed keys and [`StorageError::SandboxViolation`]
    /// when the existing file is a symlink leaving the root.
    pub fn path_for<K>(&self, key: K) -> Result<PathBuf, StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let key = key.try_into()?;
        sandbox::resolve_key(&self.root, &key, self.extension.as_deref())
    }

    /// Reads the value stored under `key`; `Ok(None)` when nothing was ever written.
    ///
    /// # Errors
    ///
    /// Key validation errors, or [`StorageError::Io`] when the file exists but can not be read.
    pub async fn read<K>(&self, key: K) -> Result<Option<Vec<u8>>, StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let path = self.path_for(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", path.display()).into()),
            }),
        }
    }

    /// Replaces the value under `key` atomically.
    ///
    /// 1. The bytes go to a fresh `<file>.bnstmp.<n>` created with `create_new`.
    /// 2. The temp file is synced to disk.
    /// 3. It is renamed over the target; where the platform refuses to replace an existing
    ///    file, the target is removed first and the rename retried.
    /// 4. The root directory is synced so the rename itself survives a crash.
    ///
    /// A failed write removes its temp file and leaves the previous value untouched.
    ///
    /// # Errors
    ///
    /// Key validation errors, or [`StorageError::Io`] for any filesystem failure.
    pub async fn write<K>(&self, key: K, data: &[u8]) -> Result<(), StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let path = self.path_for(key)?;
        let temp = self.tmp_path(&path);

        if let Err(err) = self.swap_in(&temp, &path, data).await {
            if let Err(cleanup) = fs::remove_file(&temp).await
                && cleanup.kind() != ErrorKind::NotFound
            {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(err);
        }

        Self::sync_dir(&self.root).await;

        debug!(path = %path.display(), bytes = data.len(), "Value saved atomically");
        Ok(())
    }

    async fn swap_in(&self, temp: &Path, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Disk sync failed")?;
        }

        match fs::rename(temp, path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                fs::remove_file(path)
                    .await
                    .context(format!("Failed to replace existing file: {}", path.display()))?;
                fs::rename(temp, path).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    path.display()
                ))
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), path.display()).into(),
                ),
            }),
        }
    }

    /// Removes the value under `key`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Key validation errors, or [`StorageError::Io`] when the file exists but can not be removed.
    pub async fn remove<K>(&self, key: K) -> Result<bool, StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Value removed");
                Ok(true)
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to remove: {}", path.display()).into()),
            }),
        }
    }

    /// Removes temp files older than the configured threshold. Runs on `open()` as well.
    pub async fn purge_tmp(&self) -> usize {
        maintenance::purge_tmp(&self.root, self.stale_after).await
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("value");
        target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}
