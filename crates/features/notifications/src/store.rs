use crate::backend::NotificationBackend;
use crate::error::{NotificationError, NotificationErrorExt};
use crate::model::{ChangeOrigin, NewNotification, Notification, NotificationsChanged};
use bns_domain::config::NotificationSettings;
use bns_event_bus::EventBus;
use bns_kernel::{Clock, SystemClock, safe_nanoid};
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

pub const DEFAULT_KEY: &str = "bns_notifications";
pub const DEFAULT_CAPACITY: usize = 50;

#[allow(unreachable_pub)]
#[derive(Debug)]
pub struct StoreInner<B> {
    backend: B,
    key: String,
    capacity: usize,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    write_lock: Mutex<()>,
}

/// Capped, most-recent-first notification log persisted under a single key.
///
/// Every mutation runs its read-modify-write under a per-store async lock, so concurrent
/// calls through clones of one store never lose updates. Separate stores (or processes)
/// sharing a key are last-write-wins.
///
/// Failures never reach the caller: unreadable or malformed data reads as an empty log
/// (logged at `warn`) and failed writes are logged at `error` and skipped.
///
/// ```rust
/// use bns_notifications::{MemoryBackend, NewNotification, NotificationKind, NotificationStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = NotificationStore::builder(MemoryBackend::new()).build();
///
/// let created = store
///     .add(NewNotification::new(NotificationKind::Info, "Welcome", "Alerts are on"))
///     .await;
///
/// assert_eq!(store.list().await[0].id, created.id);
/// assert_eq!(store.unread_count().await, 1);
/// # }
/// ```
#[derive(Debug)]
pub struct NotificationStore<B> {
    inner: Arc<StoreInner<B>>,
}

impl<B> Clone for NotificationStore<B> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<B> Deref for NotificationStore<B> {
    type Target = StoreInner<B>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<B: NotificationBackend> NotificationStore<B> {
    #[must_use]
    pub fn builder(backend: B) -> NotificationStoreBuilder<B> {
        NotificationStoreBuilder::new(backend)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All notifications, newest first.
    pub async fn list(&self) -> Vec<Notification> {
        match self.load().await {
            Ok(list) => list,
            Err(err) => {
                warn!(key = %self.key, error = %err, "Notification log unreadable, treating as empty");
                Vec::new()
            },
        }
    }

    /// Appends a new unread notification, evicting the oldest past capacity.
    ///
    /// The record is returned even when persisting it failed.
    pub async fn add(&self, new: NewNotification) -> Notification {
        let _guard = self.write_lock.lock().await;
        let mut list = self.list().await;

        let now = self.clock.now_millis();
        let mut id = Self::next_id(now);
        while list.iter().any(|n| n.id == id) {
            id = Self::next_id(now);
        }

        let record = new.into_record(id, now);
        list.insert(0, record.clone());
        if list.len() > self.capacity {
            let evicted = list.len() - self.capacity;
            list.truncate(self.capacity);
            debug!(key = %self.key, evicted, "Evicted oldest notifications");
        }

        self.persist(&list, "add").await;
        record
    }

    /// Marks one notification read; unknown ids are ignored.
    pub async fn mark_as_read(&self, id: &str) {
        self.update("mark_as_read", |list| {
            let Some(n) = list.iter_mut().find(|n| n.id == id && !n.read) else {
                return false;
            };
            n.read = true;
            true
        })
        .await;
    }

    pub async fn mark_all_as_read(&self) {
        self.update("mark_all_as_read", |list| {
            let mut changed = false;
            for n in list.iter_mut().filter(|n| !n.read) {
                n.read = true;
                changed = true;
            }
            changed
        })
        .await;
    }

    /// Removes one notification; unknown ids are ignored.
    pub async fn delete(&self, id: &str) {
        self.update("delete", |list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        })
        .await;
    }

    /// Drops the whole log.
    pub async fn clear_all(&self) {
        let _guard = self.write_lock.lock().await;

        match self.backend.remove(&self.key).await.context("clear_all") {
            Ok(()) => {
                debug!(key = %self.key, "Notification log cleared");
                self.announce();
            },
            Err(err) => error!(key = %self.key, error = %err, "Failed to clear notification log"),
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.list().await.iter().filter(|n| !n.read).count()
    }

    fn next_id(now: i64) -> String {
        format!("notif_{now}_{}", safe_nanoid!(9))
    }

    async fn load(&self) -> Result<Vec<Notification>, NotificationError> {
        let Some(bytes) = self.backend.load(&self.key).await? else {
            return Ok(Vec::new());
        };
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).context("Malformed notification log")
    }

    async fn update(&self, op: &'static str, apply: impl FnOnce(&mut Vec<Notification>) -> bool) {
        let _guard = self.write_lock.lock().await;
        let mut list = self.list().await;

        if apply(&mut list) {
            self.persist(&list, op).await;
        } else {
            debug!(key = %self.key, op, "Nothing to change");
        }
    }

    async fn persist(&self, list: &[Notification], op: &'static str) {
        let result = match serde_json::to_vec(list).context(op) {
            Ok(bytes) => self.backend.save(&self.key, &bytes).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                debug!(key = %self.key, op, count = list.len(), "Notification log saved");
                self.announce();
            },
            Err(err) => error!(key = %self.key, op, error = %err, "Failed to save notification log"),
        }
    }

    fn announce(&self) {
        let event = NotificationsChanged { key: self.key.clone(), origin: ChangeOrigin::Local };
        if let Err(err) = self.bus.publish(event) {
            warn!(key = %self.key, error = %err, "Failed to publish notification change");
        }
    }
}

/// Builder for [`NotificationStore`]. Defaults: key `bns_notifications`, capacity 50,
/// the system clock and a private event bus.
#[derive(Debug)]
pub struct NotificationStoreBuilder<B> {
    backend: B,
    key: String,
    capacity: usize,
    clock: Arc<dyn Clock>,
    bus: EventBus,
}

impl<B: NotificationBackend> NotificationStoreBuilder<B> {
    fn new(backend: B) -> Self {
        Self {
            backend,
            key: DEFAULT_KEY.to_owned(),
            capacity: DEFAULT_CAPACITY,
            clock: Arc::new(SystemClock),
            bus: EventBus::new(),
        }
    }

    #[must_use = "Sets the storage key of the log"]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Retained entries; clamped to at least one.
    #[must_use = "Sets how many notifications are retained"]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    #[must_use = "Sets the clock used for timestamps"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use = "Sets the bus change events are published on"]
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Applies the `[notifications]` config section.
    #[must_use = "Applies key and capacity from settings"]
    pub fn settings(self, settings: &NotificationSettings) -> Self {
        self.key(settings.key.clone()).capacity(settings.capacity)
    }

    #[must_use]
    pub fn build(self) -> NotificationStore<B> {
        NotificationStore {
            inner: Arc::new(StoreInner {
                backend: self.backend,
                key: self.key,
                capacity: self.capacity,
                clock: self.clock,
                bus: self.bus,
                write_lock: Mutex::new(()),
            }),
        }
    }
}
