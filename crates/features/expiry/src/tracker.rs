use crate::alert::{ExpiryAlert, describe};
use crate::error::ExpiryError;
use crate::policy::{CooldownPolicy, ExpiryThresholds};
use bns_domain::config::ExpirySettings;
use bns_domain::{Domain, PortfolioSummary};
use bns_kernel::MILLIS_PER_DAY;
use tracing::{debug, trace};

/// Maps domain state plus an injected instant to alert state.
///
/// Thresholds and cooldowns are fixed at construction. Every method is pure: no I/O and
/// no clock reads, `now` is always passed in.
///
/// ```rust
/// use bns_expiry::{ExpiryTracker, Severity};
/// use bns_domain::Domain;
///
/// let now = 1_700_000_000_000;
/// let domain = Domain {
///     id: "d1".into(),
///     full_name: "alice.bns".into(),
///     name: "alice".into(),
///     namespace: "bns".into(),
///     owner: "SP000".into(),
///     registered_at: 0,
///     expires_at: Some(now + 3 * 86_400_000),
///     price: None,
///     for_sale: false,
///     metadata: None,
/// };
///
/// let alert = ExpiryTracker::default().evaluate(&domain, now).unwrap();
/// assert_eq!(alert.severity, Severity::Critical);
/// assert_eq!(alert.message, "Domain expires in 3 days");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryTracker {
    thresholds: ExpiryThresholds,
    cooldowns: CooldownPolicy,
}

impl ExpiryTracker {
    #[must_use]
    pub const fn new(thresholds: ExpiryThresholds, cooldowns: CooldownPolicy) -> Self {
        Self { thresholds, cooldowns }
    }

    /// # Errors
    /// Thresholds out of order or cooldowns out of range.
    pub fn from_settings(settings: &ExpirySettings) -> Result<Self, ExpiryError> {
        Ok(Self::new(settings.thresholds.try_into()?, settings.cooldowns.try_into()?))
    }

    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: ExpiryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub const fn with_cooldowns(mut self, cooldowns: CooldownPolicy) -> Self {
        self.cooldowns = cooldowns;
        self
    }

    #[must_use]
    pub const fn thresholds(&self) -> &ExpiryThresholds {
        &self.thresholds
    }

    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownPolicy {
        &self.cooldowns
    }

    /// Floored whole days from `now` until `expires_at`; `None` when expiry is untracked.
    #[must_use]
    pub fn days_until_expiry(domain: &Domain, now: i64) -> Option<i64> {
        domain.expires_at.map(|at| at.saturating_sub(now).div_euclid(MILLIS_PER_DAY))
    }

    #[must_use]
    pub fn evaluate<'a>(&self, domain: &'a Domain, now: i64) -> Option<ExpiryAlert<'a>> {
        let days_until_expiry = Self::days_until_expiry(domain, now)?;
        let severity = self.thresholds.classify(days_until_expiry)?;

        Some(ExpiryAlert {
            domain,
            days_until_expiry,
            severity,
            message: describe(days_until_expiry, severity),
        })
    }

    /// Alerts for every domain that has one, most urgent first.
    pub fn evaluate_all<'a, I>(&self, domains: I, now: i64) -> Vec<ExpiryAlert<'a>>
    where
        I: IntoIterator<Item = &'a Domain>,
    {
        let mut alerts: Vec<_> = domains.into_iter().filter_map(|d| self.evaluate(d, now)).collect();
        alerts.sort_by_key(|a| (a.severity.rank(), a.days_until_expiry));

        debug!(count = alerts.len(), "Evaluated domain expiry");
        alerts
    }

    /// Whether a notification about `domain` is due, given when the previous one went out.
    ///
    /// A `last_notified_at` in the future counts as "just notified". `Some(0)` is a real
    /// instant (the epoch), not "never"; pass `None` for a domain never notified.
    #[must_use]
    pub fn should_notify(&self, domain: &Domain, last_notified_at: Option<i64>, now: i64) -> bool {
        let Some(alert) = self.evaluate(domain, now) else {
            return false;
        };
        let Some(last) = last_notified_at else {
            return true;
        };

        let elapsed = now.saturating_sub(last);
        let cooldown = self.cooldowns.millis(alert.severity);
        let due = elapsed >= cooldown;

        trace!(domain = %domain.full_name, severity = %alert.severity, elapsed, cooldown, due, "Cooldown check");
        due
    }

    /// Totals plus the domains inside the warning window, in input order.
    #[must_use]
    pub fn summarize(&self, domains: &[Domain], now: i64) -> PortfolioSummary {
        let window = self.thresholds.warning_days().saturating_mul(MILLIS_PER_DAY);

        let expiring_domains: Vec<Domain> = domains
            .iter()
            .filter(|d| d.expires_at.is_some_and(|at| at.saturating_sub(now) <= window))
            .cloned()
            .collect();

        PortfolioSummary {
            total_domains: domains.len(),
            total_value: domains.iter().filter_map(|d| d.price).fold(0, u64::saturating_add),
            expiring_soon: expiring_domains.len(),
            expiring_domains,
        }
    }
}
