use std::time::Duration;

use nightlog::{
    runtime::{
        events::TrackerEvent,
        handle::{RuntimeConfig, spawn_tracker},
    },
    signal::NavSignal,
    types::Quality,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn next_event(
    sub: &mut tokio::sync::broadcast::Receiver<TrackerEvent>,
) -> TrackerEvent {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event timeout")
        .expect("recv")
}

#[test]
fn one_shot_signal_fires_exactly_once() {
    let signal: NavSignal<u64> = NavSignal::new();
    assert_eq!(signal.consume(), None);

    signal.request(7);
    assert_eq!(signal.pending(), Some(7));
    assert_eq!(signal.consume(), Some(7));
    assert_eq!(signal.consume(), None);
    assert_eq!(signal.consume(), None);
}

#[test]
fn one_shot_signal_latest_request_wins() {
    let signal: NavSignal<u64> = NavSignal::new();
    signal.request(1);
    signal.request(2);
    assert_eq!(signal.consume(), Some(2));
    assert_eq!(signal.consume(), None);
}

#[test]
fn one_shot_signal_observer_sees_pending_then_idle() {
    let signal: NavSignal<u64> = NavSignal::new();
    signal.request(9);

    // A freshly attached observer sees the pending value without waiting.
    let rx = signal.watch();
    assert_eq!(*rx.borrow(), Some(9));

    assert_eq!(signal.consume(), Some(9));
    assert_eq!(*rx.borrow(), None);
}

#[tokio::test]
async fn end_to_end_track_rate_clear() {
    init_logs();
    let handle = spawn_tracker(None, RuntimeConfig::default());
    let mut sub = handle.subscribe();
    let signals = handle.signals();

    // Start: a new in-progress night appears and stop becomes available.
    let id = handle
        .start_tracking()
        .await
        .expect("start")
        .expect("new night id");
    assert_eq!(next_event(&mut sub).await, TrackerEvent::Started { id });

    let tonight = handle.tonight().borrow().clone().expect("open night");
    assert_eq!(tonight.id, id);
    assert!(tonight.is_in_progress());

    let controls = *handle.controls().borrow();
    assert!(!controls.can_start);
    assert!(controls.can_stop);
    assert!(controls.can_clear);

    // Stop: the record closes before the quality navigation arms.
    let stopped = handle.stop_tracking().await.expect("stop");
    assert_eq!(stopped, Some(id));
    assert_eq!(next_event(&mut sub).await, TrackerEvent::Stopped { id });
    assert!(handle.tonight().borrow().is_none());

    assert_eq!(signals.to_quality.consume(), Some(id));
    assert_eq!(signals.to_quality.consume(), None);

    let closed = handle.night(id).await.expect("query").expect("night");
    assert!(!closed.is_in_progress());

    // Rate: only the quality field changes, then navigation returns.
    let rated = handle.set_quality(id, Quality::Okay).await.expect("rate");
    assert!(rated);
    assert_eq!(next_event(&mut sub).await, TrackerEvent::QualityRated { id });
    assert_eq!(signals.to_tracker.consume(), Some(()));

    let night = handle.night(id).await.expect("query").expect("night");
    assert_eq!(night.quality, Quality::Okay);
    assert_eq!(night.start_ms, closed.start_ms);
    assert_eq!(night.end_ms, closed.end_ms);

    // Clear: log and marker empty, cleared notice fires once.
    let removed = handle.clear().await.expect("clear");
    assert_eq!(removed, 1);
    assert_eq!(
        next_event(&mut sub).await,
        TrackerEvent::Cleared { removed: 1 }
    );
    assert!(handle.nights().borrow().is_empty());
    assert!(handle.tonight().borrow().is_none());
    assert_eq!(signals.cleared_notice.consume(), Some(()));
    assert_eq!(signals.cleared_notice.consume(), None);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn precondition_violations_are_silent_no_ops() {
    init_logs();
    let handle = spawn_tracker(None, RuntimeConfig::default());
    let signals = handle.signals();

    // Stop with nothing open: nothing happens, nothing navigates.
    assert_eq!(handle.stop_tracking().await.expect("stop"), None);
    assert_eq!(signals.to_quality.consume(), None);

    // Start twice: the second start is ignored.
    let id = handle
        .start_tracking()
        .await
        .expect("start")
        .expect("night id");
    assert_eq!(handle.start_tracking().await.expect("restart"), None);
    assert_eq!(handle.nights().borrow().len(), 1);

    // Rating an unknown id is ignored.
    assert!(!handle.set_quality(999, Quality::Poor).await.expect("rate"));
    assert_eq!(signals.to_tracker.consume(), None);

    let _ = handle.stop_tracking().await.expect("stop");
    assert_eq!(signals.to_quality.consume(), Some(id));
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn row_tap_arms_the_detail_navigation() {
    init_logs();
    let handle = spawn_tracker(None, RuntimeConfig::default());
    let signals = handle.signals();

    let id = handle
        .start_tracking()
        .await
        .expect("start")
        .expect("night id");

    handle.night_tapped(id);
    assert_eq!(signals.to_detail.consume(), Some(id));
    assert_eq!(signals.to_detail.consume(), None);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn nights_watch_tracks_display_order() {
    init_logs();
    let handle = spawn_tracker(None, RuntimeConfig::default());

    let first = handle
        .start_tracking()
        .await
        .expect("start")
        .expect("night id");
    handle.stop_tracking().await.expect("stop");
    let second = handle
        .start_tracking()
        .await
        .expect("start")
        .expect("night id");

    let ids: Vec<u64> = handle.nights().borrow().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![second, first]);

    handle.shutdown().await.expect("shutdown");
}
