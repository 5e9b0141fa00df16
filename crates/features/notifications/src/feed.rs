use crate::backend::NotificationBackend;
use crate::model::{NewNotification, Notification, UnreadCount};
use crate::store::NotificationStore;
use tracing::warn;

/// Cached view of a notification log for UI-style consumers.
///
/// Holds the last listed notifications and their unread count. Mutations go through the
/// store and then refresh the cache; [`refresh`](Self::refresh) is also what to call when
/// a [`NotificationsChanged`](crate::NotificationsChanged) event arrives. Each refresh
/// publishes the new [`UnreadCount`] on the store's bus as a watch value.
#[derive(Debug)]
pub struct NotificationFeed<B> {
    store: NotificationStore<B>,
    notifications: Vec<Notification>,
    unread_count: usize,
}

impl<B: NotificationBackend> NotificationFeed<B> {
    /// Creates the feed and loads the current log.
    pub async fn load(store: NotificationStore<B>) -> Self {
        let mut feed = Self { store, notifications: Vec::new(), unread_count: 0 };
        feed.refresh().await;
        feed
    }

    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    #[must_use]
    pub const fn unread_count(&self) -> usize {
        self.unread_count
    }

    #[must_use]
    pub const fn store(&self) -> &NotificationStore<B> {
        &self.store
    }

    pub async fn refresh(&mut self) {
        self.notifications = self.store.list().await;
        self.unread_count = self.notifications.iter().filter(|n| !n.read).count();

        if let Err(err) = self.store.bus().publish_watch(UnreadCount(self.unread_count)) {
            warn!(key = %self.store.key(), error = %err, "Failed to publish unread count");
        }
    }

    pub async fn add(&mut self, new: NewNotification) -> Notification {
        let created = self.store.add(new).await;
        self.refresh().await;
        created
    }

    pub async fn mark_as_read(&mut self, id: &str) {
        self.store.mark_as_read(id).await;
        self.refresh().await;
    }

    pub async fn mark_all_as_read(&mut self) {
        self.store.mark_all_as_read().await;
        self.refresh().await;
    }

    pub async fn delete(&mut self, id: &str) {
        self.store.delete(id).await;
        self.refresh().await;
    }

    pub async fn clear_all(&mut self) {
        self.store.clear_all().await;
        self.refresh().await;
    }
}
