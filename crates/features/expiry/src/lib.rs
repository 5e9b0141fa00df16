//! Domain expiry evaluation.
//!
//! [`ExpiryTracker`] classifies a [`Domain`](bns_domain::Domain) into a [`Severity`] tier
//! from its expiry timestamp, orders alerts across a portfolio and decides whether a new
//! notification is due under the per-tier [`CooldownPolicy`]. Nothing here performs I/O;
//! the current instant is always a parameter.
mod alert;
mod error;
mod policy;
mod severity;
mod tracker;

pub use alert::ExpiryAlert;
pub use error::{ExpiryError, ExpiryErrorExt};
pub use policy::{CooldownPolicy, ExpiryThresholds};
pub use severity::Severity;
pub use tracker::ExpiryTracker;
