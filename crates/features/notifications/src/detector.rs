use crate::backend::NotificationBackend;
use crate::model::{ChangeOrigin, NotificationsChanged};
use bns_event_bus::EventBus;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    Unobserved,
    Missing,
    Present(u64),
}

/// Notices writes to a notification log made outside this process.
///
/// Each [`poll`](Self::poll) fingerprints the persisted bytes and compares them with the
/// previous observation. Any difference, including one caused by a local store, is
/// reported once and published as [`NotificationsChanged`] with
/// [`ChangeOrigin::External`]. The first poll only records a baseline.
#[derive(Debug)]
pub struct ChangeDetector<B> {
    backend: B,
    key: String,
    bus: EventBus,
    last: Snapshot,
}

impl<B: NotificationBackend> ChangeDetector<B> {
    #[must_use]
    pub fn new(backend: B, key: impl Into<String>, bus: EventBus) -> Self {
        Self { backend, key: key.into(), bus, last: Snapshot::Unobserved }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records the current state as the baseline without reporting it.
    pub async fn prime(&mut self) {
        if let Some(snapshot) = self.observe().await {
            self.last = snapshot;
        }
    }

    /// Returns `true` when the log changed since the previous observation.
    ///
    /// A read failure reports no change and keeps the previous baseline.
    pub async fn poll(&mut self) -> bool {
        let Some(current) = self.observe().await else {
            return false;
        };

        let previous = std::mem::replace(&mut self.last, current);
        if previous == Snapshot::Unobserved || previous == current {
            return false;
        }

        debug!(key = %self.key, "Notification log changed externally");
        let event = NotificationsChanged { key: self.key.clone(), origin: ChangeOrigin::External };
        if let Err(err) = self.bus.publish(event) {
            warn!(key = %self.key, error = %err, "Failed to publish notification change");
        }
        true
    }

    async fn observe(&self) -> Option<Snapshot> {
        match self.backend.load(&self.key).await {
            Ok(Some(bytes)) => Some(Snapshot::Present(fxhash::hash64(&bytes))),
            Ok(None) => Some(Snapshot::Missing),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Change detection read failed");
                None
            },
        }
    }
}
