use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Expiry,
    Renewal,
    Sale,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expiry => "expiry",
            Self::Renewal => "renewal",
            Self::Sale => "sale",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expiry" => Ok(Self::Expiry),
            "renewal" => Ok(Self::Renewal),
            "sale" => Ok(Self::Sale),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown notification type '{other}'")),
        }
    }
}

/// A persisted notification record.
///
/// Serialized with camelCase keys and the kind under `type`, so logs written by other
/// clients of the same storage key stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Caller-supplied part of a [`Notification`]; the store fills in id, timestamp and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub domain_id: Option<String>,
    pub action_url: Option<String>,
}

impl NewNotification {
    #[must_use]
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, title: title.into(), message: message.into(), domain_id: None, action_url: None }
    }

    #[must_use]
    pub fn domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.domain_id = Some(domain_id.into());
        self
    }

    #[must_use]
    pub fn action_url(mut self, action_url: impl Into<String>) -> Self {
        self.action_url = Some(action_url.into());
        self
    }

    pub(crate) fn into_record(self, id: String, timestamp: i64) -> Notification {
        Notification {
            id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            timestamp,
            read: false,
            domain_id: self.domain_id,
            action_url: self.action_url,
        }
    }
}

/// Where a change to a notification log was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written through a store in this process.
    Local,
    /// Found by a [`ChangeDetector`](crate::ChangeDetector) poll.
    External,
}

/// Broadcast on the event bus whenever the log under `key` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsChanged {
    pub key: String,
    pub origin: ChangeOrigin,
}

/// Latest unread count, published on a watch channel by
/// [`NotificationFeed`](crate::NotificationFeed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadCount(pub usize);
