use bns_event_bus::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Changed(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
struct Unread(pub usize);

#[tokio::test]
async fn test_event_flow() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Changed>().unwrap();

    assert_eq!(bus.publish(Changed(42)).unwrap(), 1);

    assert_eq!(*rx.recv_event().await.unwrap(), Changed(42));
}

#[tokio::test]
async fn test_publish_without_subscribers_is_zero() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(Changed(1)).unwrap(), 0);
}

#[tokio::test]
async fn test_lagged_receiver_resumes() {
    let bus = EventBus::new();
    let capacity = 2;
    let mut rx = bus.subscribe_with_capacity::<Changed>(capacity).unwrap();

    for i in 0..20 {
        bus.publish(Changed(i)).unwrap();
    }

    let first = rx.recv_event().await.unwrap();
    assert!(first.0 >= 18, "expected the retained tail, got {}", first.0);
    assert_eq!(rx.recv_event().await.unwrap().0, first.0 + 1);
}

#[tokio::test]
async fn test_every_subscriber_sees_every_event() {
    let bus = EventBus::new();
    let mut a = bus.subscribe::<Changed>().unwrap();
    let mut b = bus.subscribe::<Changed>().unwrap();

    bus.publish(Changed(7)).unwrap();

    assert_eq!(a.recv_event().await.unwrap().0, 7);
    assert_eq!(b.recv_event().await.unwrap().0, 7);
}

#[tokio::test]
async fn test_types_are_isolated() {
    let bus = EventBus::new();
    let mut changed = bus.subscribe::<Changed>().unwrap();
    let mut unread = bus.subscribe::<Unread>().unwrap();

    bus.publish(Unread(3)).unwrap();
    bus.publish(Changed(9)).unwrap();

    assert_eq!(changed.recv_event().await.unwrap().0, 9);
    assert_eq!(unread.recv_event().await.unwrap().0, 3);
}

#[tokio::test]
async fn test_dropping_last_bus_closes_receivers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Changed>().unwrap();

    drop(bus);

    assert!(rx.recv_event().await.is_none());
}

#[tokio::test]
async fn test_shutdown_closes_all_channels() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Changed>().unwrap();
    let _watch = bus.subscribe_watch(Unread(0)).unwrap();

    assert_eq!(bus.shutdown(), 2);
    assert!(rx.recv_event().await.is_none());
}

#[tokio::test]
async fn test_watch_keeps_latest_value() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_watch(Unread(1)).unwrap();

    bus.publish_watch(Unread(2)).unwrap();
    bus.publish_watch(Unread(5)).unwrap();

    assert_eq!(rx.recv_event().await.unwrap().0, 5);
    assert_eq!(bus.latest::<Unread>().map(|u| u.0), Some(5));
}

#[tokio::test]
async fn test_publish_watch_creates_channel() {
    let bus = EventBus::new();
    assert!(bus.latest::<Unread>().is_none());

    bus.publish_watch(Unread(4)).unwrap();

    let rx = bus.subscribe_watch(Unread(0)).unwrap();
    assert_eq!(rx.borrow().0, 4, "existing value wins over the seed");
}

#[tokio::test]
async fn test_kind_mismatch_rejected() {
    let bus = EventBus::new();
    bus.publish_watch(Unread(1)).unwrap();

    assert!(matches!(bus.publish(Unread(2)), Err(EventBusError::ChannelKindMismatch { .. })));
    assert!(matches!(bus.subscribe::<Unread>(), Err(EventBusError::ChannelKindMismatch { .. })));

    let _rx = bus.subscribe::<Changed>().unwrap();
    assert!(matches!(
        bus.publish_watch(Changed(1)),
        Err(EventBusError::ChannelKindMismatch { .. })
    ));
}

#[tokio::test]
async fn test_invalid_capacity_rejected() {
    let bus = EventBus::new();
    let result = bus.subscribe_with_capacity::<Changed>(0);
    assert!(matches!(result, Err(EventBusError::InvalidCapacity { .. })));
}

#[tokio::test]
async fn test_ordering_is_preserved() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Changed>().unwrap();

    for i in 0..50 {
        bus.publish(Changed(i)).unwrap();
    }
    for i in 0..50 {
        assert_eq!(rx.recv_event().await.unwrap().0, i);
    }
}

#[tokio::test]
async fn test_concurrent_publishers() {
    let bus = Arc::new(EventBus::new());
    let mut rx = bus.subscribe::<Changed>().unwrap();

    let handles: Vec<_> = (0..2u64)
        .map(|half| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                for i in 0..25 {
                    bus.publish(Changed(half * 25 + i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let mut received = 0;
    while tokio::time::timeout(Duration::from_millis(50), rx.recv_event()).await.is_ok() {
        received += 1;
    }
    assert_eq!(received, 50);
}
