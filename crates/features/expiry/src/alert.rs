use crate::severity::Severity;
use bns_domain::Domain;
use serde::Serialize;

/// Derived expiry state of one domain at one instant. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryAlert<'a> {
    pub domain: &'a Domain,
    /// Whole days until expiry, floored; negative once expired.
    pub days_until_expiry: i64,
    pub severity: Severity,
    pub message: String,
}

impl ExpiryAlert<'_> {
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.days_until_expiry < 0
    }

    /// Short headline used for notification titles.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        if self.is_expired() { "Domain expired" } else { "Domain expiring soon" }
    }
}

pub(crate) fn describe(days_until_expiry: i64, severity: Severity) -> String {
    if days_until_expiry < 0 {
        let ago = days_until_expiry.unsigned_abs();
        return format!("Domain expired {ago} {} ago", unit(ago));
    }

    let days = days_until_expiry.unsigned_abs();
    match severity {
        Severity::Critical => format!("Domain expires in {days} {}", unit(days)),
        Severity::Warning | Severity::Info => format!("Domain expires in {days} days"),
    }
}

const fn unit(days: u64) -> &'static str {
    if days == 1 { "day" } else { "days" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(describe(-2, Severity::Critical), "Domain expired 2 days ago");
        assert_eq!(describe(-1, Severity::Critical), "Domain expired 1 day ago");
        assert_eq!(describe(0, Severity::Critical), "Domain expires in 0 days");
        assert_eq!(describe(1, Severity::Critical), "Domain expires in 1 day");
        assert_eq!(describe(7, Severity::Critical), "Domain expires in 7 days");
        assert_eq!(describe(15, Severity::Warning), "Domain expires in 15 days");
        assert_eq!(describe(45, Severity::Info), "Domain expires in 45 days");
    }
}
