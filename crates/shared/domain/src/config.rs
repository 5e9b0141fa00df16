use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Every configurable knob of a BNS host, grouped by subsystem.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub storage: StorageSettings,
    pub notifications: NotificationSettings,
    pub expiry: ExpirySettings,
    pub logging: LoggingSettings,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Where persisted state lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

/// Notification log layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Storage key of the persisted log.
    pub key: String,
    /// Maximum number of retained notifications, newest first.
    pub capacity: usize,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpirySettings {
    pub thresholds: ThresholdSettings,
    pub cooldowns: CooldownSettings,
}

/// Upper bounds, in whole days, of each severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub critical_days: i64,
    pub warning_days: i64,
    pub info_days: i64,
}

/// Minimum spacing, in hours, between two notifications for one domain per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    pub critical_hours: u64,
    pub warning_hours: u64,
    pub info_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Rolling log files are written here when set.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for StorageSettings {
    fn default() -> Self {
        Self { data_dir: PathBuf::from(".bns") }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { key: "bns_notifications".to_owned(), capacity: 50 }
    }
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self { critical_days: 7, warning_days: 30, info_days: 60 }
    }
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self { critical_hours: 6, warning_hours: 24, info_hours: 168 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "warn".to_owned(), dir: None, json: false }
    }
}
