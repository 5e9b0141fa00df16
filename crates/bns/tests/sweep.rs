use bns::domain::Domain;
use bns::domain::config::AppConfig;
use bns::kernel::{FixedClock, MILLIS_PER_DAY, MILLIS_PER_HOUR};
use bns::notifications::{MemoryBackend, NotificationKind};
use bns::{AlertCenter, BnsError, PORTFOLIO_URL};
use std::sync::Arc;

const NOW: i64 = 1_700_000_000_000;

fn domain(id: &str, days: Option<i64>) -> Domain {
    Domain {
        id: id.to_owned(),
        full_name: format!("{id}.btc"),
        name: id.to_owned(),
        namespace: "btc".to_owned(),
        owner: "SP000".to_owned(),
        registered_at: 0,
        expires_at: days.map(|d| NOW + d * MILLIS_PER_DAY),
        price: None,
        for_sale: false,
        metadata: None,
    }
}

fn center(clock: &FixedClock) -> AlertCenter<MemoryBackend> {
    AlertCenter::with_backend(&AppConfig::default(), MemoryBackend::new(), Arc::new(clock.clone()))
        .unwrap()
}

#[tokio::test]
async fn sweep_notifies_alerting_domains() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    let domains = vec![
        domain("soon", Some(3)),
        domain("later", Some(45)),
        domain("gone", Some(-2)),
        domain("far", Some(200)),
        domain("untracked", None),
    ];

    let report = center.sweep().run(&domains).await;
    assert_eq!(report.alerts, 3);
    assert_eq!(report.suppressed, 0);

    let ids: Vec<_> =
        report.notified.iter().map(|n| n.domain_id.as_deref().unwrap_or_default()).collect();
    assert_eq!(ids, ["gone", "soon", "later"]);

    let gone = &report.notified[0];
    assert_eq!(gone.kind, NotificationKind::Expiry);
    assert_eq!(gone.title, "Domain expired");
    assert_eq!(gone.message, "Domain expired 2 days ago");
    assert_eq!(gone.action_url.as_deref(), Some(PORTFOLIO_URL));
    assert_eq!(report.notified[1].title, "Domain expiring soon");

    assert_eq!(center.store().unread_count().await, 3);
}

#[tokio::test]
async fn sweep_respects_cooldowns() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    let domains = vec![domain("critical", Some(3)), domain("warning", Some(20))];

    assert_eq!(center.sweep().run(&domains).await.notified.len(), 2);

    let again = center.sweep().run(&domains).await;
    assert!(again.notified.is_empty());
    assert_eq!(again.suppressed, 2);

    clock.advance(6 * MILLIS_PER_HOUR);
    let later = center.sweep().run(&domains).await;
    assert_eq!(later.notified.len(), 1);
    assert_eq!(later.notified[0].domain_id.as_deref(), Some("critical"));

    clock.advance(18 * MILLIS_PER_HOUR);
    let day_after = center.sweep().run(&domains).await;
    assert_eq!(day_after.notified.len(), 2);
}

#[tokio::test]
async fn non_expiry_notifications_do_not_count() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    center
        .store()
        .add(
            bns::notifications::NewNotification::new(NotificationKind::Sale, "Sold", "x")
                .domain_id("critical"),
        )
        .await;

    let report = center.sweep().run(&[domain("critical", Some(1))]).await;
    assert_eq!(report.notified.len(), 1);
}

#[tokio::test]
async fn invalid_thresholds_are_rejected() {
    let mut config = AppConfig::default();
    config.expiry.thresholds.critical_days = 40;

    let result =
        AlertCenter::with_backend(&config, MemoryBackend::new(), Arc::new(FixedClock::new(NOW)));
    assert!(matches!(result, Err(BnsError::Expiry { .. })));
}

#[tokio::test]
async fn open_creates_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.storage.data_dir = tmp.path().join("state");

    let center = AlertCenter::open(&config).await.unwrap();
    center.sweep().run(&[domain("x", Some(1))]).await;

    assert!(tmp.path().join("state").join("bns_notifications.json").exists());
    assert!(tmp.path().join("state").join("bns_notifications_cooldowns.json").exists());
    assert_eq!(center.feed().await.unread_count(), 1);
}

#[tokio::test]
async fn cooldowns_survive_log_eviction() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    let capacity = center.store().capacity();
    let domains: Vec<_> = (0..capacity + 5).map(|i| domain(&format!("d{i}"), Some(3))).collect();

    let first = center.sweep().run(&domains).await;
    assert_eq!(first.notified.len(), capacity + 5);
    assert_eq!(center.store().list().await.len(), capacity);

    let second = center.sweep().run(&domains).await;
    assert!(second.notified.is_empty());
    assert_eq!(second.suppressed, capacity + 5);

    clock.advance(6 * MILLIS_PER_HOUR);
    assert_eq!(center.sweep().run(&domains).await.notified.len(), capacity + 5);
}

#[tokio::test]
async fn clearing_the_log_keeps_cooldowns() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    let domains = vec![domain("critical", Some(3))];

    let first = center.sweep().run(&domains).await;
    center.store().delete(&first.notified[0].id).await;
    assert!(center.sweep().run(&domains).await.notified.is_empty());

    center.store().clear_all().await;
    assert!(center.sweep().run(&domains).await.notified.is_empty());
    assert_eq!(center.ledger().last_notified_at("critical").await, Some(NOW));
}

#[tokio::test]
async fn duplicate_domain_ids_notify_once() {
    let clock = FixedClock::new(NOW);
    let center = center(&clock);
    let domains = vec![domain("twin", Some(3)), domain("twin", Some(5))];

    let report = center.sweep().run(&domains).await;
    assert_eq!(report.notified.len(), 1);
    assert_eq!(report.suppressed, 1);
}
