use serde::{Deserialize, Serialize};

/// A naming-service domain as supplied by the domain provider.
///
/// Read-only to the alerting core. Timestamps are milliseconds since the Unix epoch and
/// `price` is in the smallest currency unit. The JSON shape uses camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    /// `name.namespace`
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    pub owner: String,
    pub registered_at: i64,
    /// Absent means expiry is not tracked and the domain never alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default)]
    pub for_sale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DomainMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
