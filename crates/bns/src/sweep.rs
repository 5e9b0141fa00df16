use bns_domain::Domain;
use bns_expiry::ExpiryTracker;
use bns_kernel::Clock;
use bns_notifications::{
    CooldownLedger, NewNotification, Notification, NotificationBackend, NotificationKind,
    NotificationStore,
};
use std::sync::Arc;
use tracing::{debug, info};

pub const PORTFOLIO_URL: &str = "/portfolio";

/// Outcome of one [`ExpirySweep::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Domains that currently have an alert.
    pub alerts: usize,
    /// Notifications appended by this run, most urgent first.
    pub notified: Vec<Notification>,
    /// Alerts skipped because their cooldown has not elapsed.
    pub suppressed: usize,
}

/// Turns expiry alerts into `expiry` notifications, at most once per cooldown window.
///
/// Send times come from a [`CooldownLedger`] kept beside the log, so evicting or deleting
/// notifications never re-arms a domain. The tracker's decision stays a pure function.
#[derive(Debug)]
pub struct ExpirySweep<B> {
    tracker: ExpiryTracker,
    store: NotificationStore<B>,
    ledger: CooldownLedger<B>,
    clock: Arc<dyn Clock>,
}

impl<B: NotificationBackend> ExpirySweep<B> {
    #[must_use]
    pub fn new(
        tracker: ExpiryTracker,
        store: NotificationStore<B>,
        ledger: CooldownLedger<B>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { tracker, store, ledger, clock }
    }

    pub async fn run(&self, domains: &[Domain]) -> SweepReport {
        let now = self.clock.now_millis();
        let alerts = self.tracker.evaluate_all(domains, now);
        let mut report = SweepReport { alerts: alerts.len(), ..SweepReport::default() };
        let mut last_notified = self.ledger.snapshot().await;
        let mut stamps = Vec::new();

        for alert in alerts {
            let domain = alert.domain;
            let last = last_notified.get(&domain.id).copied();

            if !self.tracker.should_notify(domain, last, now) {
                debug!(domain = %domain.full_name, severity = %alert.severity, "Expiry alert in cooldown");
                report.suppressed += 1;
                continue;
            }

            let new = NewNotification::new(NotificationKind::Expiry, alert.title(), alert.message)
                .domain_id(domain.id.clone())
                .action_url(PORTFOLIO_URL);
            report.notified.push(self.store.add(new).await);
            last_notified.insert(domain.id.clone(), now);
            stamps.push((domain.id.clone(), now));
        }

        if !stamps.is_empty() {
            let expire_before = now.saturating_sub(self.tracker.cooldowns().longest_millis());
            self.ledger.record(stamps, expire_before).await;
        }

        info!(
            alerts = report.alerts,
            notified = report.notified.len(),
            suppressed = report.suppressed,
            "Expiry sweep finished"
        );
        report
    }
}
