use crate::error::ExpiryError;
use crate::severity::Severity;
use bns_domain::config::{CooldownSettings, ThresholdSettings};
use bns_kernel::MILLIS_PER_HOUR;
use std::time::Duration;

/// Inclusive upper bounds, in whole days, of the severity tiers.
///
/// Invariant: `0 <= critical_days <= warning_days <= info_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryThresholds {
    critical_days: i64,
    warning_days: i64,
    info_days: i64,
}

impl ExpiryThresholds {
    /// # Errors
    /// [`ExpiryError::InvalidThresholds`] when a bound is negative or the bounds are not
    /// in non-decreasing order.
    pub fn new(critical_days: i64, warning_days: i64, info_days: i64) -> Result<Self, ExpiryError> {
        if critical_days < 0 {
            return Err(ExpiryError::InvalidThresholds {
                message: format!("critical_days = {critical_days}").into(),
                context: Some("Thresholds must not be negative".into()),
            });
        }
        if !(critical_days <= warning_days && warning_days <= info_days) {
            return Err(ExpiryError::InvalidThresholds {
                message: format!("{critical_days} / {warning_days} / {info_days}").into(),
                context: Some("Expected critical <= warning <= info".into()),
            });
        }
        Ok(Self { critical_days, warning_days, info_days })
    }

    #[must_use]
    pub const fn critical_days(&self) -> i64 {
        self.critical_days
    }

    #[must_use]
    pub const fn warning_days(&self) -> i64 {
        self.warning_days
    }

    #[must_use]
    pub const fn info_days(&self) -> i64 {
        self.info_days
    }

    /// Tier for a whole-day count; negative counts (already expired) are critical.
    #[must_use]
    pub const fn classify(&self, days_until_expiry: i64) -> Option<Severity> {
        if days_until_expiry <= self.critical_days {
            Some(Severity::Critical)
        } else if days_until_expiry <= self.warning_days {
            Some(Severity::Warning)
        } else if days_until_expiry <= self.info_days {
            Some(Severity::Info)
        } else {
            None
        }
    }
}

impl Default for ExpiryThresholds {
    fn default() -> Self {
        Self { critical_days: 7, warning_days: 30, info_days: 60 }
    }
}

impl TryFrom<ThresholdSettings> for ExpiryThresholds {
    type Error = ExpiryError;

    fn try_from(settings: ThresholdSettings) -> Result<Self, ExpiryError> {
        Self::new(settings.critical_days, settings.warning_days, settings.info_days)
    }
}

/// Minimum spacing between two notifications about one domain, per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    critical: Duration,
    warning: Duration,
    info: Duration,
}

impl CooldownPolicy {
    #[must_use]
    pub const fn new(critical: Duration, warning: Duration, info: Duration) -> Self {
        Self { critical, warning, info }
    }

    #[must_use]
    pub const fn for_severity(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Cooldown in milliseconds, saturating at `i64::MAX`.
    #[must_use]
    pub fn millis(&self, severity: Severity) -> i64 {
        i64::try_from(self.for_severity(severity).as_millis()).unwrap_or(i64::MAX)
    }

    /// Longest cooldown of any tier. A notification older than this can no longer
    /// suppress anything.
    #[must_use]
    pub fn longest_millis(&self) -> i64 {
        Severity::ALL.into_iter().map(|s| self.millis(s)).max().unwrap_or_default()
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(hours(6), hours(24), hours(168))
    }
}

impl TryFrom<CooldownSettings> for CooldownPolicy {
    type Error = ExpiryError;

    fn try_from(settings: CooldownSettings) -> Result<Self, ExpiryError> {
        let max_hours = u64::try_from(i64::MAX / MILLIS_PER_HOUR).unwrap_or(u64::MAX);
        let out_of_range = [settings.critical_hours, settings.warning_hours, settings.info_hours]
            .into_iter()
            .find(|h| *h > max_hours);

        if let Some(value) = out_of_range {
            return Err(ExpiryError::InvalidCooldowns {
                message: format!("{value} hours").into(),
                context: Some("Cooldown exceeds the representable range".into()),
            });
        }

        Ok(Self::new(
            hours(settings.critical_hours),
            hours(settings.warning_hours),
            hours(settings.info_hours),
        ))
    }
}

const fn hours(h: u64) -> Duration {
    Duration::from_secs(h * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_boundaries() {
        let t = ExpiryThresholds::default();
        let table = [
            (-3, Some(Severity::Critical)),
            (0, Some(Severity::Critical)),
            (7, Some(Severity::Critical)),
            (8, Some(Severity::Warning)),
            (30, Some(Severity::Warning)),
            (31, Some(Severity::Info)),
            (60, Some(Severity::Info)),
            (61, None),
        ];
        for (days, expected) in table {
            assert_eq!(t.classify(days), expected, "{days} days");
        }
    }

    #[test]
    fn thresholds_must_be_ordered() {
        assert!(ExpiryThresholds::new(7, 30, 60).is_ok());
        assert!(ExpiryThresholds::new(5, 5, 5).is_ok());
        assert!(matches!(
            ExpiryThresholds::new(30, 7, 60),
            Err(ExpiryError::InvalidThresholds { .. })
        ));
        assert!(ExpiryThresholds::new(-1, 7, 60).is_err());
    }

    #[test]
    fn settings_convert() {
        let t = ExpiryThresholds::try_from(ThresholdSettings::default()).unwrap();
        assert_eq!(t, ExpiryThresholds::default());

        let c = CooldownPolicy::try_from(CooldownSettings::default()).unwrap();
        assert_eq!(c, CooldownPolicy::default());
        assert_eq!(c.millis(Severity::Critical), 6 * MILLIS_PER_HOUR);
        assert_eq!(c.millis(Severity::Info), 168 * MILLIS_PER_HOUR);
        assert_eq!(c.longest_millis(), 168 * MILLIS_PER_HOUR);
    }

    #[test]
    fn longest_ignores_tier_order() {
        let c = CooldownPolicy::new(hours(48), hours(1), hours(2));
        assert_eq!(c.longest_millis(), 48 * MILLIS_PER_HOUR);
    }

    #[test]
    fn absurd_cooldowns_rejected() {
        let settings =
            CooldownSettings { critical_hours: u64::MAX, warning_hours: 1, info_hours: 1 };
        assert!(matches!(
            CooldownPolicy::try_from(settings),
            Err(ExpiryError::InvalidCooldowns { .. })
        ));
    }
}
