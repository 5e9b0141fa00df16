use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{trace, warn};

/// Change events are small and infrequent; 64 slots absorb bursts from a sweep.
const DEFAULT_CAPACITY: usize = 64;

/// How a channel delivers events of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Every subscriber sees every event, lagging subscribers skip ahead.
    Broadcast { capacity: usize },
    /// Subscribers see only the latest value.
    Watch,
}

/// Anything `Send + Sync + 'static` can travel over the [`EventBus`].
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

/// What a channel is created from when its type is first touched.
enum Seed<T> {
    Broadcast { capacity: usize },
    Watch(Arc<T>),
}

impl<T> Seed<T> {
    const fn kind(&self) -> ChannelKind {
        match self {
            Self::Broadcast { capacity } => ChannelKind::Broadcast { capacity: *capacity },
            Self::Watch(_) => ChannelKind::Watch,
        }
    }
}

#[derive(Debug)]
struct Channel {
    kind: ChannelKind,
    sender: Box<dyn Any + Send + Sync>,
}

impl Channel {
    fn open<T: Event>(seed: Seed<T>) -> Result<Self, EventBusError> {
        let kind = seed.kind();
        trace!(event = type_name::<T>(), ?kind, "Opening event channel");

        let sender: Box<dyn Any + Send + Sync> = match seed {
            Seed::Broadcast { capacity } => {
                Box::new(broadcast::channel::<Arc<T>>(validate_capacity(capacity)?).0)
            },
            Seed::Watch(initial) => Box::new(watch::channel(initial).0),
        };

        Ok(Self { kind, sender })
    }

    fn ensure_kind<T: Event>(&self, requested: ChannelKind) -> Result<(), EventBusError> {
        match (self.kind, requested) {
            (ChannelKind::Broadcast { capacity: open }, ChannelKind::Broadcast { capacity }) => {
                if open != capacity {
                    warn!(
                        event = type_name::<T>(),
                        open_capacity = open,
                        requested_capacity = capacity,
                        "Broadcast channel already open with a different capacity"
                    );
                }
                Ok(())
            },
            (ChannelKind::Watch, ChannelKind::Watch) => Ok(()),
            (open, requested) => Err(EventBusError::ChannelKindMismatch {
                message: format!(
                    "{} is a {open:?} channel, {requested:?} requested",
                    type_name::<T>()
                )
                .into(),
                context: None,
            }),
        }
    }

    fn broadcast<T: Event>(&self) -> Result<&broadcast::Sender<Arc<T>>, EventBusError> {
        self.sender.downcast_ref().ok_or_else(type_mismatch::<T>)
    }

    fn watch<T: Event>(&self) -> Result<&watch::Sender<Arc<T>>, EventBusError> {
        self.sender.downcast_ref().ok_or_else(type_mismatch::<T>)
    }
}

/// A cloneable, typed in-process event bus.
///
/// One channel per event type, keyed by [`TypeId`]. The channel kind is fixed by whoever
/// touches the type first; a later request for the other kind fails with
/// [`EventBusError::ChannelKindMismatch`].
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Channel>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to broadcast events of type `T`.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] when `T` is already a watch channel.
    ///
    /// ```rust
    /// use bns_event_bus::{EventBus, EventReceiverExt};
    ///
    /// #[derive(Debug)]
    /// struct Saved(u32);
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), bns_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<Saved>()?;
    /// bus.publish(Saved(3))?;
    /// assert_eq!(rx.recv_event().await.map(|e| e.0), Some(3));
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity(DEFAULT_CAPACITY)
    }

    /// Like [`EventBus::subscribe`], opening the channel with `capacity` slots if needed.
    ///
    /// # Errors
    /// [`EventBusError::InvalidCapacity`] for zero, [`EventBusError::ChannelKindMismatch`]
    /// when `T` is already a watch channel.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.with_channel(Seed::<T>::Broadcast { capacity }, |channel| {
            Ok(channel.broadcast::<T>()?.subscribe())
        })
    }

    /// Broadcasts `event`, returning how many subscribers received it.
    ///
    /// Publishing with nobody listening is not an error and returns `0`.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] when `T` is already a watch channel.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// [`EventBus::publish`] for an already shared event.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] when `T` is already a watch channel.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let seed = Seed::<T>::Broadcast { capacity: DEFAULT_CAPACITY };
        self.with_channel(seed, |channel| {
            let delivered = channel.broadcast::<T>()?.send(event).unwrap_or(0);
            trace!(event = type_name::<T>(), delivered, "Event published");
            Ok(delivered)
        })
    }

    /// Subscribes to the latest value of `T`, seeding the channel with `initial` if it is new.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] when `T` is already a broadcast channel.
    pub fn subscribe_watch<T: Event>(
        &self,
        initial: T,
    ) -> Result<watch::Receiver<Arc<T>>, EventBusError> {
        self.with_channel(Seed::Watch(Arc::new(initial)), |channel| {
            Ok(channel.watch::<T>()?.subscribe())
        })
    }

    /// Replaces the latest value of `T`, creating the watch channel if needed.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] when `T` is already a broadcast channel.
    pub fn publish_watch<T: Event>(&self, value: T) -> Result<(), EventBusError> {
        let value = Arc::new(value);
        self.with_channel(Seed::Watch(Arc::clone(&value)), |channel| {
            channel.watch::<T>()?.send_replace(value);
            Ok(())
        })
    }

    /// Current value of a watch channel, if one is open for `T`.
    #[must_use]
    pub fn latest<T: Event>(&self) -> Option<Arc<T>> {
        let channels = self.channels.read();
        let channel = channels.get(&TypeId::of::<T>())?;
        channel.watch::<T>().ok().map(|tx| Arc::clone(&tx.borrow()))
    }

    /// Drops every channel; subscribers observe closure. Returns how many were open.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn with_channel<T: Event, R>(
        &self,
        seed: Seed<T>,
        f: impl FnOnce(&Channel) -> Result<R, EventBusError>,
    ) -> Result<R, EventBusError> {
        let id = TypeId::of::<T>();
        let kind = seed.kind();

        if let Some(channel) = self.channels.read().get(&id) {
            channel.ensure_kind::<T>(kind)?;
            return f(channel);
        }

        let mut channels = self.channels.write();
        let channel = match channels.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Channel::open(seed)?),
        };
        channel.ensure_kind::<T>(kind)?;
        f(channel)
    }
}

fn type_mismatch<T>() -> EventBusError {
    EventBusError::TypeMismatch {
        message: type_name::<T>().into(),
        context: Some("Channel registered under a foreign type".into()),
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity == 0 {
        return Err(EventBusError::InvalidCapacity {
            message: "capacity must be at least 1".into(),
            context: None,
        });
    }
    Ok(capacity)
}
