//! # Notifications
//!
//! A durable, client-local log of user notifications.
//!
//! - [`NotificationStore`]: capped (50 by default), newest-first CRUD over one storage
//!   key. Reads degrade to an empty log and writes degrade to no-ops; failures are logged,
//!   never returned.
//! - [`NotificationBackend`]: raw byte persistence. [`FileBackend`] keeps each log in
//!   `<root>/<key>.json` via `bns-storage`; [`MemoryBackend`] keeps it in process.
//! - [`CooldownLedger`]: per-domain time of the last expiry notification, kept under its
//!   own key so log eviction and deletes never reset a cooldown.
//! - [`ChangeDetector`]: polls a backend and reports writes made by other processes.
//! - [`NotificationFeed`]: cached list plus unread count with refresh-after-mutate
//!   wrappers.
//!
//! Every persisted change is announced on the [`EventBus`](bns_event_bus::EventBus) as
//! [`NotificationsChanged`].

mod backend;
mod detector;
mod error;
mod feed;
mod ledger;
mod model;
mod store;

pub use backend::{FileBackend, MemoryBackend, NotificationBackend};
pub use detector::ChangeDetector;
pub use error::{NotificationError, NotificationErrorExt};
pub use feed::NotificationFeed;
pub use ledger::{CooldownLedger, LEDGER_SUFFIX, LastNotified};
pub use model::{
    ChangeOrigin, NewNotification, Notification, NotificationKind, NotificationsChanged,
    UnreadCount,
};
pub use store::{DEFAULT_CAPACITY, DEFAULT_KEY, NotificationStore, NotificationStoreBuilder};
