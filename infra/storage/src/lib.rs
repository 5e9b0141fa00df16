//! Sandboxed key/value file storage.
//!
//! Every value lives in its own file directly under a canonical root directory. The crate
//! is the persistence layer behind the notification log: small JSON documents that must
//! never be observed half-written, even when several processes share the directory.
//!
//! # Guarantees
//!
//! - **Sandbox**: keys are validated ([`StorageKey`]) and resolve to direct children of
//!   the root; symlinks leaving the root are refused.
//! - **Atomic replace**: unique temp file, `fsync`, `rename`, directory sync.
//! - **Self-healing**: temp files abandoned by crashed writers are swept on open.
//!
//! # Example
//!
//! ```rust
//! use bns_storage::{FileStore, StorageError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let store = FileStore::builder().root(&root).extension("json").open().await?;
//!
//!     store.write("bns_notifications", br#"[{"id":"notif_1"}]"#).await?;
//!     let bytes = store.read("bns_notifications").await?.unwrap_or_default();
//!     assert!(!bytes.is_empty());
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod key;
mod maintenance;
mod sandbox;

pub use builder::FileStoreBuilder;
pub use engine::FileStore;
pub use error::{StorageError, StorageErrorExt};
pub use key::StorageKey;
