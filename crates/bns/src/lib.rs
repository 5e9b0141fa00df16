//! Facade crate for BNS domain alerting.
//! Re-exports the domain, kernel and feature crates and wires them together from an
//! [`AppConfig`]. Keep this crate thin: composition and the expiry sweep, nothing else.
//!
//! ## Usage
//! ```rust,no_run
//! use bns::AlertCenter;
//! use bns::domain::config::AppConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), bns::BnsError> {
//! let center = AlertCenter::open(&AppConfig::default()).await?;
//! let report = center.sweep().run(&[]).await;
//! assert!(report.notified.is_empty());
//! # Ok(())
//! # }
//! ```

mod error;
mod sweep;

pub use bns_domain as domain;
pub use bns_event_bus as events;
pub use bns_expiry as expiry;
pub use bns_kernel as kernel;
pub use bns_notifications as notifications;
pub use error::{BnsError, BnsErrorExt};
pub use sweep::{ExpirySweep, PORTFOLIO_URL, SweepReport};

use bns_domain::config::AppConfig;
use bns_event_bus::EventBus;
use bns_expiry::ExpiryTracker;
use bns_kernel::{Clock, SystemClock};
use bns_notifications::{
    ChangeDetector, CooldownLedger, FileBackend, NotificationBackend, NotificationFeed,
    NotificationStore,
};
use std::sync::Arc;
use tracing::info;

/// Composition root: one tracker, the notification store with its cooldown ledger, the
/// bus and the clock.
#[derive(Debug, Clone)]
pub struct AlertCenter<B> {
    tracker: ExpiryTracker,
    store: NotificationStore<B>,
    ledger: CooldownLedger<B>,
    bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl AlertCenter<FileBackend> {
    /// Opens the file-backed log under `storage.data_dir` with the system clock.
    ///
    /// # Errors
    /// Invalid expiry settings, or a data directory that can not be created.
    pub async fn open(config: &AppConfig) -> Result<Self, BnsError> {
        let backend = FileBackend::open(&config.storage.data_dir)
            .await
            .context("Failed to open data directory")?;

        info!(data_dir = %config.storage.data_dir.display(), key = %config.notifications.key, "Alert center ready");
        Self::with_backend(config, backend, Arc::new(SystemClock))
    }
}

impl<B: NotificationBackend + Clone> AlertCenter<B> {
    /// # Errors
    /// [`BnsError::Expiry`] for thresholds out of order or cooldowns out of range.
    pub fn with_backend(
        config: &AppConfig,
        backend: B,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BnsError> {
        let tracker = ExpiryTracker::from_settings(&config.expiry).context("[expiry]")?;
        let bus = EventBus::new();
        let ledger = CooldownLedger::for_log(backend.clone(), &config.notifications.key);
        let store = NotificationStore::builder(backend)
            .settings(&config.notifications)
            .clock(Arc::clone(&clock))
            .bus(bus.clone())
            .build();

        Ok(Self { tracker, store, ledger, bus, clock })
    }

    #[must_use]
    pub const fn tracker(&self) -> &ExpiryTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn store(&self) -> &NotificationStore<B> {
        &self.store
    }

    #[must_use]
    pub const fn ledger(&self) -> &CooldownLedger<B> {
        &self.ledger
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    #[must_use]
    pub fn sweep(&self) -> ExpirySweep<B> {
        ExpirySweep::new(
            self.tracker,
            self.store.clone(),
            self.ledger.clone(),
            Arc::clone(&self.clock),
        )
    }

    pub async fn feed(&self) -> NotificationFeed<B> {
        NotificationFeed::load(self.store.clone()).await
    }

    #[must_use]
    pub fn detector(&self) -> ChangeDetector<B> {
        ChangeDetector::new(self.store.backend().clone(), self.store.key(), self.bus.clone())
    }
}
