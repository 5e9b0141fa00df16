use crate::output::Printer;
use anyhow::{Context, Result};
use bns::AlertCenter;
use bns::domain::Domain;
use bns::notifications::{FileBackend, NewNotification, NotificationKind};
use std::path::Path;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

pub(crate) async fn load_domains(path: &Path) -> Result<Vec<Domain>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read domains from {}", path.display()))?;
    let domains: Vec<Domain> = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of domains", path.display()))?;

    debug!(path = %path.display(), count = domains.len(), "Domains loaded");
    Ok(domains)
}

pub(crate) async fn check(
    center: &AlertCenter<FileBackend>,
    out: &Printer,
    path: &Path,
    now: Option<i64>,
) -> Result<()> {
    let domains = load_domains(path).await?;
    let alerts = center.tracker().evaluate_all(&domains, now.unwrap_or_else(|| center.now()));
    out.alerts(&alerts)
}

pub(crate) async fn summary(
    center: &AlertCenter<FileBackend>,
    out: &Printer,
    path: &Path,
    now: Option<i64>,
) -> Result<()> {
    let domains = load_domains(path).await?;
    let summary = center.tracker().summarize(&domains, now.unwrap_or_else(|| center.now()));
    out.summary(&summary)
}

pub(crate) async fn sweep(center: &AlertCenter<FileBackend>, out: &Printer, path: &Path) -> Result<()> {
    let domains = load_domains(path).await?;
    let report = center.sweep().run(&domains).await;
    out.sweep(&report)
}

pub(crate) async fn list(center: &AlertCenter<FileBackend>, out: &Printer, unread: bool) -> Result<()> {
    let mut notifications = center.store().list().await;
    if unread {
        notifications.retain(|n| !n.read);
    }
    out.notifications(&notifications)
}

pub(crate) async fn unread(center: &AlertCenter<FileBackend>, out: &Printer) -> Result<()> {
    out.unread(center.store().unread_count().await)
}

pub(crate) async fn add(
    center: &AlertCenter<FileBackend>,
    out: &Printer,
    new: NewNotification,
) -> Result<()> {
    let created = center.store().add(new).await;
    info!(id = %created.id, kind = %created.kind, "Notification added");
    out.notification(&created)
}

pub(crate) fn new_notification(
    kind: NotificationKind,
    title: String,
    message: String,
    domain_id: Option<String>,
    action_url: Option<String>,
) -> NewNotification {
    let mut new = NewNotification::new(kind, title, message);
    new.domain_id = domain_id;
    new.action_url = action_url;
    new
}

/// Prints the feed, then reprints it whenever the log changes until interrupted or until
/// `polls` polls have run.
pub(crate) async fn watch(
    center: &AlertCenter<FileBackend>,
    out: &Printer,
    every: Duration,
    polls: Option<u64>,
) -> Result<()> {
    let mut detector = center.detector();
    detector.prime().await;

    let mut feed = center.feed().await;
    out.feed(&feed)?;

    let mut ticker = interval(every.max(Duration::from_millis(100)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let mut remaining = polls;
    while remaining != Some(0) {
        tokio::select! {
            _ = ticker.tick() => {
                remaining = remaining.map(|n| n.saturating_sub(1));
                if detector.poll().await {
                    debug!(key = %detector.key(), "Notification log changed");
                    feed.refresh().await;
                    out.feed(&feed)?;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            },
        }
    }

    Ok(())
}
