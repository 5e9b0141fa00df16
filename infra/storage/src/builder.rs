use crate::engine::{FileStore, FileStoreInner};
use crate::error::{StorageError, StorageErrorExt};
use crate::sandbox;
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tokio::fs;
use tracing::info;

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct StoreConfig {
    create: bool,
    extension: Option<String>,
    stale_after: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { create: true, extension: None, stale_after: DEFAULT_STALE_AFTER }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

/// Typestate builder for [`FileStore`]; `open()` only exists once a root is set.
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStoreBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStoreBuilder<S> {
    #[must_use = "Sets whether the root directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Appends `.<ext>` to every key's file name, e.g. `json`.
    #[must_use = "Sets the file extension used for stored values"]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = Some(ext.into());
        self
    }

    /// Age after which an abandoned temp file is considered garbage.
    #[must_use = "Sets the age threshold for stale temp-file cleanup"]
    pub const fn stale_after(mut self, age: Duration) -> Self {
        self.config.stale_after = age;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> FileStoreBuilder<N> {
        FileStoreBuilder { state, config: self.config }
    }
}

impl FileStoreBuilder<NoRoot> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory of the store"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl FileStoreBuilder<WithRoot> {
    /// Prepares the root and returns a ready [`FileStore`].
    ///
    /// Creates the root when `create(true)` (the default), canonicalizes it, then sweeps
    /// stale temp files left by crashed writers. A failed sweep is logged, not returned.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for a malformed extension, [`StorageError::Io`] when the
    /// root is missing with `create(false)` or can not be created or resolved.
    pub async fn open(self) -> Result<FileStore, StorageError> {
        let root = &self.state.0;

        if let Some(ext) = self.config.extension.as_deref() {
            sandbox::validate_extension(ext)?;
        }

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;
        info!(path = %canonical.display(), "Opened file store");

        let store = FileStore {
            inner: Arc::new(FileStoreInner {
                root: canonical,
                extension: self.config.extension,
                stale_after: self.config.stale_after,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
