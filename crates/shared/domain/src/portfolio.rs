use crate::domain::Domain;
use serde::Serialize;

/// Aggregate view of an owner's domains.
///
/// `expiring_domains` holds every domain whose fractional days until expiry is at most
/// the warning window (already expired ones included), in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_domains: usize,
    /// Sum of known prices; domains without a price contribute nothing.
    pub total_value: u64,
    pub expiring_domains: Vec<Domain>,
    pub expiring_soon: usize,
}
