//! # Event Bus
//!
//! Typed in-process publish/subscribe used to tell interested parts of the application
//! that persisted state changed.
//!
//! Events are identified by their Rust type. Each type gets one channel, either
//! **broadcast** (every subscriber sees every event) or **watch** (subscribers see the
//! latest value). Channels live in an `FxHashMap` behind a `parking_lot::RwLock`; the
//! bus itself is a cheap `Arc` clone and is passed to whoever needs it.
//!
//! # Example
//!
//! ```rust
//! use bns_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct LogChanged { key: &'static str }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<LogChanged>()?;
//!
//!     bus.publish(LogChanged { key: "bns_notifications" })?;
//!
//!     let event = rx.recv_event().await.expect("bus is open");
//!     assert_eq!(event.key, "bns_notifications");
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
