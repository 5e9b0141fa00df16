use crate::backend::NotificationBackend;
use crate::error::{NotificationError, NotificationErrorExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

pub const LEDGER_SUFFIX: &str = "_cooldowns";

/// Domain id to the instant (ms) its last expiry notification went out.
pub type LastNotified = BTreeMap<String, i64>;

/// Per-domain send times, stored under their own key next to the log.
///
/// Lives apart from the notification log so that eviction past capacity, `delete` and
/// `clear_all` never reset a domain's cooldown. Same failure policy as the store:
/// unreadable data reads as empty, failed writes are logged and skipped.
#[derive(Debug, Clone)]
pub struct CooldownLedger<B> {
    backend: B,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl<B: NotificationBackend> CooldownLedger<B> {
    #[must_use]
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self { backend, key: key.into(), write_lock: Arc::default() }
    }

    /// Ledger paired with the log stored under `log_key`.
    #[must_use]
    pub fn for_log(backend: B, log_key: &str) -> Self {
        Self::new(backend, format!("{log_key}{LEDGER_SUFFIX}"))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn snapshot(&self) -> LastNotified {
        match self.load().await {
            Ok(map) => map,
            Err(err) => {
                warn!(key = %self.key, error = %err, "Cooldown ledger unreadable, treating as empty");
                LastNotified::new()
            },
        }
    }

    pub async fn last_notified_at(&self, domain_id: &str) -> Option<i64> {
        self.snapshot().await.get(domain_id).copied()
    }

    /// Merges `stamps` (newest wins) and drops entries older than `expire_before`.
    pub async fn record<I>(&self, stamps: I, expire_before: i64)
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.snapshot().await;

        for (domain_id, at) in stamps {
            let entry = map.entry(domain_id).or_insert(at);
            *entry = (*entry).max(at);
        }

        let before = map.len();
        map.retain(|_, at| *at >= expire_before);
        let expired = before - map.len();

        let result = match serde_json::to_vec(&map).context("record") {
            Ok(bytes) => self.backend.save(&self.key, &bytes).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => debug!(key = %self.key, entries = map.len(), expired, "Cooldown ledger saved"),
            Err(err) => error!(key = %self.key, error = %err, "Failed to save cooldown ledger"),
        }
    }

    async fn load(&self) -> Result<LastNotified, NotificationError> {
        let Some(bytes) = self.backend.load(&self.key).await? else {
            return Ok(LastNotified::new());
        };
        if bytes.is_empty() {
            return Ok(LastNotified::new());
        }
        serde_json::from_slice(&bytes).context("Malformed cooldown ledger")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn stamp(id: &str, at: i64) -> (String, i64) {
        (id.to_owned(), at)
    }

    #[tokio::test]
    async fn empty_until_recorded() {
        let ledger = CooldownLedger::for_log(MemoryBackend::new(), "bns_notifications");
        assert_eq!(ledger.key(), "bns_notifications_cooldowns");
        assert!(ledger.snapshot().await.is_empty());

        ledger.record([stamp("d1", 100)], 0).await;
        assert_eq!(ledger.last_notified_at("d1").await, Some(100));
        assert_eq!(ledger.last_notified_at("d2").await, None);
    }

    #[tokio::test]
    async fn newest_stamp_wins() {
        let ledger = CooldownLedger::new(MemoryBackend::new(), "k");
        ledger.record([stamp("d1", 300)], 0).await;
        ledger.record([stamp("d1", 200), stamp("d2", 250)], 0).await;

        let map = ledger.snapshot().await;
        assert_eq!(map.get("d1"), Some(&300));
        assert_eq!(map.get("d2"), Some(&250));
    }

    #[tokio::test]
    async fn stale_entries_are_dropped() {
        let ledger = CooldownLedger::new(MemoryBackend::new(), "k");
        ledger.record([stamp("old", 10), stamp("new", 500)], 0).await;
        ledger.record([stamp("fresh", 900)], 100).await;

        let ids: Vec<_> = ledger.snapshot().await.into_keys().collect();
        assert_eq!(ids, ["fresh", "new"]);
    }

    #[tokio::test]
    async fn corrupt_ledger_reads_empty_and_is_replaced() {
        let backend = MemoryBackend::new();
        backend.insert("k", b"{not json".to_vec());
        let ledger = CooldownLedger::new(backend.clone(), "k");

        assert!(ledger.snapshot().await.is_empty());
        ledger.record([stamp("d1", 1)], 0).await;
        assert_eq!(ledger.last_notified_at("d1").await, Some(1));
    }

    #[tokio::test]
    async fn independent_of_the_log() {
        let backend = MemoryBackend::new();
        let ledger = CooldownLedger::for_log(backend.clone(), "log");
        ledger.record([stamp("d1", 1)], 0).await;

        backend.remove("log").await.unwrap();
        assert_eq!(ledger.last_notified_at("d1").await, Some(1));
    }
}
