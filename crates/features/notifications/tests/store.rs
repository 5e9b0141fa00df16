use bns_event_bus::{EventBus, EventReceiverExt};
use bns_kernel::{FixedClock, MILLIS_PER_HOUR};
use bns_notifications::{
    ChangeDetector, ChangeOrigin, FileBackend, MemoryBackend, NewNotification, NotificationBackend,
    NotificationError, NotificationFeed, NotificationKind, NotificationStore, NotificationsChanged,
    UnreadCount,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const KEY: &str = "bns_notifications";

fn expiry(n: usize) -> NewNotification {
    NewNotification::new(NotificationKind::Expiry, format!("Alert {n}"), format!("Message {n}"))
}

#[derive(Debug, Default)]
struct FailingBackend {
    save_attempts: AtomicUsize,
}

impl NotificationBackend for FailingBackend {
    async fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, NotificationError> {
        Err("disk on fire".into())
    }

    async fn save(&self, _key: &str, _bytes: &[u8]) -> Result<(), NotificationError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err("disk on fire".into())
    }

    async fn remove(&self, _key: &str) -> Result<(), NotificationError> {
        Err("disk on fire".into())
    }
}

async fn file_store(dir: &TempDir) -> NotificationStore<FileBackend> {
    let backend = FileBackend::open(dir.path()).await.unwrap();
    NotificationStore::builder(backend).build()
}

#[tokio::test]
async fn add_then_list() {
    let tmp = TempDir::new().unwrap();
    let store = file_store(&tmp).await;

    let created = store
        .add(
            NewNotification::new(NotificationKind::Renewal, "Renewed", "alice.bns renewed")
                .domain_id("d1"),
        )
        .await;

    let list = store.list().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0], created);
    assert_eq!(list[0].kind, NotificationKind::Renewal);
    assert_eq!(list[0].title, "Renewed");
    assert_eq!(list[0].message, "alice.bns renewed");
    assert!(!list[0].read);
    assert!(list[0].id.starts_with("notif_"));
}

#[tokio::test]
async fn capacity_evicts_oldest() {
    let clock = FixedClock::new(0);
    let store =
        NotificationStore::builder(MemoryBackend::new()).clock(Arc::new(clock.clone())).build();

    for n in 0..51 {
        clock.advance(1);
        store.add(expiry(n)).await;
    }

    let list = store.list().await;
    assert_eq!(list.len(), 50);
    assert_eq!(list[0].title, "Alert 50");
    assert_eq!(list[49].title, "Alert 1");
    assert!(list.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
}

#[tokio::test]
async fn read_state_transitions() {
    let store = NotificationStore::builder(MemoryBackend::new()).build();
    let first = store.add(expiry(1)).await;
    store.add(expiry(2)).await;
    store.add(expiry(3)).await;
    assert_eq!(store.unread_count().await, 3);

    store.mark_as_read(&first.id).await;
    assert_eq!(store.unread_count().await, 2);
    store.mark_as_read("notif_0_missing").await;
    assert_eq!(store.unread_count().await, 2);

    store.mark_all_as_read().await;
    assert_eq!(store.unread_count().await, 0);
    assert!(store.list().await.iter().all(|n| n.read));
}

#[tokio::test]
async fn delete_and_clear() {
    let store = NotificationStore::builder(MemoryBackend::new()).build();
    let a = store.add(expiry(1)).await;
    let b = store.add(expiry(2)).await;

    store.delete(&a.id).await;
    let ids: Vec<_> = store.list().await.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, [b.id]);

    store.delete("unknown").await;
    assert_eq!(store.list().await.len(), 1);

    store.clear_all().await;
    assert!(store.list().await.is_empty());
    assert_eq!(store.unread_count().await, 0);
}

#[tokio::test]
async fn corrupt_log_reads_empty_and_is_replaced() {
    let backend = MemoryBackend::new();
    backend.insert(KEY, "{not json");
    let store = NotificationStore::builder(backend.clone()).build();

    assert!(store.list().await.is_empty());
    assert_eq!(store.unread_count().await, 0);

    store.add(expiry(1)).await;
    assert_eq!(store.list().await.len(), 1);
    assert!(backend.get(KEY).is_some_and(|b| b.starts_with(b"[")));
}

#[tokio::test]
async fn failing_backend_degrades_quietly() {
    let backend = Arc::new(FailingBackend::default());
    let store = NotificationStore::builder(Arc::clone(&backend)).build();

    let created = store.add(expiry(1)).await;
    assert_eq!(created.title, "Alert 1");
    assert!(store.list().await.is_empty());
    assert_eq!(store.unread_count().await, 0);

    store.mark_all_as_read().await;
    store.delete(&created.id).await;
    store.clear_all().await;

    assert_eq!(backend.save_attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn persisted_changes_are_announced() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<NotificationsChanged>().unwrap();
    let store = NotificationStore::builder(MemoryBackend::new()).bus(bus).build();

    store.add(expiry(1)).await;
    let event = rx.recv_event().await.unwrap();
    assert_eq!(event.key, KEY);
    assert_eq!(event.origin, ChangeOrigin::Local);

    store.clear_all().await;
    assert!(rx.recv_event().await.is_some());
}

#[tokio::test]
async fn concurrent_adds_through_clones_are_not_lost() {
    let store = NotificationStore::builder(MemoryBackend::new()).build();

    let tasks: Vec<_> = (0..20)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move { store.add(expiry(n)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.list().await.len(), 20);
}

#[tokio::test]
async fn two_instances_share_one_file() {
    let tmp = TempDir::new().unwrap();
    let first = file_store(&tmp).await;
    let second = file_store(&tmp).await;

    let mut detector =
        ChangeDetector::new(first.backend().clone(), first.key(), first.bus().clone());
    detector.prime().await;

    first.add(expiry(1)).await;
    assert!(detector.poll().await);

    second.add(expiry(2)).await;
    assert!(detector.poll().await);
    assert!(!detector.poll().await);

    let titles: Vec<_> = first.list().await.into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["Alert 2", "Alert 1"]);
}

#[tokio::test]
async fn detector_publishes_external_changes() {
    let backend = MemoryBackend::new();
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<NotificationsChanged>().unwrap();
    let mut detector = ChangeDetector::new(backend.clone(), KEY, bus);
    detector.prime().await;

    backend.insert(KEY, "[]");
    assert!(detector.poll().await);

    let event = rx.recv_event().await.unwrap();
    assert_eq!(event.origin, ChangeOrigin::External);
}

#[tokio::test]
async fn feed_tracks_store() {
    let clock = FixedClock::new(10 * MILLIS_PER_HOUR);
    let store =
        NotificationStore::builder(MemoryBackend::new()).clock(Arc::new(clock)).build();
    let mut unread = store.bus().subscribe_watch(UnreadCount::default()).unwrap();

    let mut feed = NotificationFeed::load(store.clone()).await;
    assert!(feed.notifications().is_empty());

    let created = feed.add(expiry(1)).await;
    feed.add(expiry(2)).await;
    assert_eq!(feed.unread_count(), 2);
    assert_eq!(unread.recv_event().await.map(|c| c.0), Some(2));

    feed.mark_as_read(&created.id).await;
    assert_eq!(feed.unread_count(), 1);

    store.mark_all_as_read().await;
    assert_eq!(feed.unread_count(), 1);
    feed.refresh().await;
    assert_eq!(feed.unread_count(), 0);

    feed.delete(&created.id).await;
    assert_eq!(feed.notifications().len(), 1);

    feed.clear_all().await;
    assert!(feed.notifications().is_empty());
    assert_eq!(store.bus().latest::<UnreadCount>().map(|c| c.0), Some(0));
}
