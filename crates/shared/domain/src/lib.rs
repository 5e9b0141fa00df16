//! # Domain Models
//!
//! Pure data shared by every BNS crate: naming-service domain records as supplied by the
//! domain provider, the derived portfolio summary and the configuration tree.
//! Keep it lean: no I/O and no logic beyond trivial accessors.

pub mod config;
pub mod domain;
pub mod portfolio;

pub use domain::{Domain, DomainMetadata};
pub use portfolio::PortfolioSummary;
