/// Tests for the readiness tracker and poller

use super::*;
use std::sync::Arc;
use crate::host::{ManualScheduler, ViewerOptions};
use crate::renderer::headless::{HeadlessBackend, HeadlessContainer};

fn create_core() -> (ViewerCore, Arc<HeadlessContainer>) {
    let core = ViewerCore::new(Arc::new(HeadlessBackend::new()), ManualScheduler::new());
    (core, Arc::new(HeadlessContainer::new(32, 32)))
}

// ============================================================================
// Tests: Transitions
// ============================================================================

#[test]
fn test_legal_transitions() {
    use ReadinessState::*;
    assert!(Unmounted.can_transition_to(Mounted));
    assert!(Mounted.can_transition_to(Initialized));
    assert!(Mounted.can_transition_to(Disposed));
    assert!(Initialized.can_transition_to(Disposed));

    assert!(!Unmounted.can_transition_to(Initialized));
    assert!(!Unmounted.can_transition_to(Disposed));
    assert!(!Initialized.can_transition_to(Mounted));
    for next in [Unmounted, Mounted, Initialized, Disposed] {
        assert!(!Disposed.can_transition_to(next));
    }
}

#[test]
fn test_illegal_transition_is_ignored() {
    let mut tracker = ReadinessTracker::new();
    assert!(!tracker.transition(ReadinessState::Initialized));
    assert_eq!(tracker.state(), ReadinessState::Unmounted);

    assert!(tracker.transition(ReadinessState::Mounted));
    assert!(tracker.transition(ReadinessState::Disposed));
    assert!(!tracker.transition(ReadinessState::Mounted));
    assert_eq!(tracker.state(), ReadinessState::Disposed);
}

// ============================================================================
// Tests: Events
// ============================================================================

#[test]
fn test_push_event_converges() {
    let (mut core, container) = create_core();
    let mut tracker = ReadinessTracker::new();
    assert!(tracker.mount(&mut core));
    assert_eq!(tracker.state(), ReadinessState::Mounted);

    core.initialize(container, ViewerOptions::default()).unwrap();
    assert_eq!(tracker.pump(), 1);
    assert_eq!(tracker.state(), ReadinessState::Initialized);

    core.dispose();
    assert_eq!(tracker.pump(), 1);
    assert_eq!(tracker.state(), ReadinessState::Disposed);
}

#[test]
fn test_mount_after_initialize_converges_immediately() {
    let (mut core, container) = create_core();
    core.initialize(container, ViewerOptions::default()).unwrap();

    let mut tracker = ReadinessTracker::new();
    tracker.mount(&mut core);
    assert_eq!(tracker.state(), ReadinessState::Initialized);
}

#[test]
fn test_started_and_stopped_do_not_change_state() {
    let mut tracker = ReadinessTracker::new();
    tracker.transition(ReadinessState::Mounted);
    assert!(!tracker.observe(ViewerEvent::Started));
    assert!(!tracker.observe(ViewerEvent::Stopped));
    assert_eq!(tracker.state(), ReadinessState::Mounted);
}

// ============================================================================
// Tests: Snapshot
// ============================================================================

#[test]
fn test_snapshot_ready_only_when_core_initialized() {
    let (mut core, container) = create_core();
    let mut tracker = ReadinessTracker::new();
    tracker.mount(&mut core);

    let snapshot = tracker.snapshot(&core);
    assert!(!snapshot.is_ready);
    assert!(snapshot.scene.is_none());

    core.initialize(container, ViewerOptions::default()).unwrap();
    tracker.pump();
    let snapshot = tracker.snapshot(&core);
    assert!(snapshot.is_ready);
    assert!(!snapshot.is_disposed);
    assert!(Arc::ptr_eq(snapshot.scene.as_ref().unwrap(), &core.scene()));
    assert!(snapshot.camera.is_some());
    assert!(snapshot.renderer.is_some());
    assert!(snapshot.container.is_some());
}

#[test]
fn test_snapshot_initialized_state_with_disposed_core_is_empty() {
    let (mut core, container) = create_core();
    core.initialize(container, ViewerOptions::default()).unwrap();
    let mut tracker = ReadinessTracker::new();
    tracker.mount(&mut core);
    // Dispose event not pumped yet
    core.dispose();

    let snapshot = tracker.snapshot(&core);
    assert!(!snapshot.is_ready);
    assert!(!snapshot.is_disposed);
    assert!(snapshot.scene.is_none());
}

#[test]
fn test_snapshot_disposed_is_all_empty() {
    let (mut core, container) = create_core();
    core.initialize(container, ViewerOptions::default()).unwrap();
    let mut tracker = ReadinessTracker::new();
    tracker.mount(&mut core);
    tracker.unmount();

    let snapshot = tracker.snapshot(&core);
    assert!(snapshot.is_disposed);
    assert!(!snapshot.is_ready);
    assert!(snapshot.scene.is_none() && snapshot.camera.is_none());
    assert!(snapshot.renderer.is_none() && snapshot.container.is_none());
}

// ============================================================================
// Tests: Poller
// ============================================================================

#[test]
fn test_poller_defaults() {
    let config = PollerConfig::default();
    assert_eq!(config.max_attempts, 50);
    assert_eq!(config.interval, Duration::from_millis(100));
}

#[test]
fn test_poller_converges_without_events() {
    let (mut core, container) = create_core();
    let mut tracker = ReadinessTracker::new();
    tracker.transition(ReadinessState::Mounted);
    let mut poller = ReadinessPoller::default();

    assert_eq!(poller.poll(&mut tracker, &core), PollStatus::Pending { attempts_left: 49 });

    core.initialize(container, ViewerOptions::default()).unwrap();
    assert_eq!(poller.poll(&mut tracker, &core), PollStatus::Converged);
    assert_eq!(tracker.state(), ReadinessState::Initialized);
    assert_eq!(poller.attempts(), 2);

    // Finished pollers do not count further attempts
    assert_eq!(poller.poll(&mut tracker, &core), PollStatus::Converged);
    assert_eq!(poller.attempts(), 2);
}

#[test]
fn test_poller_exhausts() {
    let (core, _container) = create_core();
    let mut tracker = ReadinessTracker::new();
    tracker.transition(ReadinessState::Mounted);
    let mut poller = ReadinessPoller::new(PollerConfig {
        max_attempts: 3,
        interval: Duration::from_millis(1),
    });

    assert!(!poller.poll(&mut tracker, &core).is_finished());
    assert!(!poller.poll(&mut tracker, &core).is_finished());
    assert_eq!(poller.poll(&mut tracker, &core), PollStatus::Exhausted);
    assert_eq!(tracker.state(), ReadinessState::Mounted);
}

#[test]
fn test_poller_cancelled_by_unmount() {
    let (core, _container) = create_core();
    let mut tracker = ReadinessTracker::new();
    tracker.transition(ReadinessState::Mounted);
    tracker.unmount();

    let mut poller = ReadinessPoller::default();
    assert_eq!(poller.poll(&mut tracker, &core), PollStatus::Cancelled);
}
