//! Readiness tracking for external consumers.
//!
//! A consumer mounts a viewer and wants to know when the scene, camera and
//! renderer handles are safe to read. The tracker follows the viewer's
//! lifecycle events; `ReadinessPoller` is the bounded fallback for hosts
//! that cannot deliver events.

use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use crate::camera::SharedCamera;
use crate::renderer::{SharedContainer, SharedRenderer};
use crate::scene::SharedScene;
use super::viewer_core::{ViewerCore, ViewerEvent};

const SOURCE: &str = "viewer::Readiness";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Unmounted,
    Mounted,
    Initialized,
    /// Terminal
    Disposed,
}

impl ReadinessState {
    pub fn can_transition_to(self, next: ReadinessState) -> bool {
        use ReadinessState::*;
        matches!(
            (self, next),
            (Unmounted, Mounted) | (Mounted, Initialized) | (Mounted, Disposed) | (Initialized, Disposed)
        )
    }
}

/// Handles that are safe to read right now
#[derive(Clone, Default)]
pub struct ReadinessSnapshot {
    pub scene: Option<SharedScene>,
    pub camera: Option<SharedCamera>,
    pub renderer: Option<SharedRenderer>,
    pub container: Option<SharedContainer>,
    pub is_ready: bool,
    pub is_disposed: bool,
}

impl ReadinessSnapshot {
    fn disposed() -> Self {
        Self { is_disposed: true, ..Default::default() }
    }
}

impl fmt::Debug for ReadinessSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessSnapshot")
            .field("scene", &self.scene.is_some())
            .field("camera", &self.camera.is_some())
            .field("renderer", &self.renderer.is_some())
            .field("container", &self.container.is_some())
            .field("is_ready", &self.is_ready)
            .field("is_disposed", &self.is_disposed)
            .finish()
    }
}

pub struct ReadinessTracker {
    state: ReadinessState,
    events: Option<Receiver<ViewerEvent>>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self { state: ReadinessState::Unmounted, events: None }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Move to `next` if legal; illegal requests are ignored
    ///
    /// Returns whether the state changed.
    pub fn transition(&mut self, next: ReadinessState) -> bool {
        if !self.state.can_transition_to(next) {
            crate::viewer_trace!(SOURCE, "Ignoring transition {:?} -> {:?}", self.state, next);
            return false;
        }
        crate::viewer_debug!(SOURCE, "{:?} -> {:?}", self.state, next);
        self.state = next;
        if next == ReadinessState::Disposed {
            self.events = None;
        }
        true
    }

    /// Mount against a viewer and subscribe to its events
    ///
    /// A viewer that is already initialized converges immediately.
    pub fn mount(&mut self, core: &mut ViewerCore) -> bool {
        if !self.transition(ReadinessState::Mounted) {
            return false;
        }
        self.events = Some(core.subscribe());
        if core.is_initialized() {
            self.transition(ReadinessState::Initialized);
        }
        true
    }

    /// External unmount notification
    pub fn unmount(&mut self) -> bool {
        self.transition(ReadinessState::Disposed)
    }

    /// Apply one viewer event; returns whether the state changed
    pub fn observe(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::Initialized => self.transition(ReadinessState::Initialized),
            ViewerEvent::Disposed => self.transition(ReadinessState::Disposed),
            ViewerEvent::Started | ViewerEvent::Stopped => false,
        }
    }

    /// Drain pending viewer events; returns how many changed the state
    pub fn pump(&mut self) -> usize {
        let mut changed = 0;
        loop {
            let event = match self.events.as_ref().map(Receiver::try_recv) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Disconnected)) => {
                    self.events = None;
                    break;
                }
                Some(Err(TryRecvError::Empty)) | None => break,
            };
            if self.observe(event) {
                changed += 1;
            }
        }
        changed
    }

    /// Derive the snapshot from the tracker state and the viewer
    pub fn snapshot(&self, core: &ViewerCore) -> ReadinessSnapshot {
        match self.state {
            ReadinessState::Disposed => ReadinessSnapshot::disposed(),
            ReadinessState::Initialized if core.is_initialized() => ReadinessSnapshot {
                scene: Some(core.scene()),
                camera: Some(core.camera()),
                renderer: Some(core.renderer()),
                container: core.container(),
                is_ready: true,
                is_disposed: false,
            },
            _ => ReadinessSnapshot::default(),
        }
    }
}

impl Default for ReadinessTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Polling fallback
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub max_attempts: u32,
    /// Delay the host waits between attempts
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Poll again after the interval
    Pending { attempts_left: u32 },
    /// The tracker reached `Initialized`
    Converged,
    /// The tracker was disposed while polling
    Cancelled,
    /// Attempts used up without convergence
    Exhausted,
}

impl PollStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, PollStatus::Pending { .. })
    }
}

/// Bounded polling until the viewer reports itself initialized
pub struct ReadinessPoller {
    config: PollerConfig,
    attempts: u32,
    finished: Option<PollStatus>,
}

impl ReadinessPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self { config, attempts: 0, finished: None }
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// One attempt; a finished poller keeps returning its final status
    pub fn poll(&mut self, tracker: &mut ReadinessTracker, core: &ViewerCore) -> PollStatus {
        if let Some(status) = self.finished {
            return status;
        }
        tracker.pump();
        self.attempts += 1;

        if tracker.state() == ReadinessState::Mounted && core.is_initialized() {
            tracker.transition(ReadinessState::Initialized);
        }

        let status = match tracker.state() {
            ReadinessState::Initialized => PollStatus::Converged,
            ReadinessState::Disposed => PollStatus::Cancelled,
            _ if self.attempts >= self.config.max_attempts => {
                crate::viewer_warn!(SOURCE,
                    "Viewer not initialized after {} attempts", self.attempts);
                PollStatus::Exhausted
            }
            _ => PollStatus::Pending {
                attempts_left: self.config.max_attempts - self.attempts,
            },
        };
        if status.is_finished() {
            self.finished = Some(status);
        }
        status
    }
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::new(PollerConfig::default())
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
