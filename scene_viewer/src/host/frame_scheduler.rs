//! Next-frame scheduling primitive supplied by the host.
//!
//! The viewer asks for one frame at a time; the host calls
//! `ViewerCore::frame(now)` when the requested frame fires.

use std::sync::{Arc, Mutex};
use winit::window::Window;
use crate::utils::lock_shared;

const SOURCE: &str = "viewer::FrameScheduler";

/// Identifier of one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// "Run this on the next display refresh"
pub trait FrameScheduler: Send {
    fn request_frame(&mut self) -> FrameRequest;

    /// Drop a pending request; a request that already fired is ignored
    fn cancel_frame(&mut self, request: FrameRequest);
}

// ============================================================================
// Winit
// ============================================================================

/// Maps frame requests onto `Window::request_redraw`
///
/// A redraw cannot be withdrawn from the event loop once requested, so
/// cancelling only forgets the request; the viewer halts on that tick.
pub struct WinitFrameScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl WinitFrameScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window, next_id: 0, pending: None }
    }

    /// Request still waiting for its redraw
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }
}

impl FrameScheduler for WinitFrameScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

// ============================================================================
// Manual
// ============================================================================

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler driven by the caller
///
/// Clones share state, so a test or an embedding loop keeps one clone and
/// fires frames with `take_pending`.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request waiting to fire, if any
    pub fn pending(&self) -> Option<FrameRequest> {
        lock_shared(&self.state, SOURCE).pending
    }

    /// Fire the pending request: returns it and clears it
    pub fn take_pending(&self) -> Option<FrameRequest> {
        lock_shared(&self.state, SOURCE).pending.take()
    }

    /// Total requests made
    pub fn requested_count(&self) -> u64 {
        lock_shared(&self.state, SOURCE).requested
    }

    /// Total pending requests cancelled
    pub fn cancelled_count(&self) -> u64 {
        lock_shared(&self.state, SOURCE).cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let mut state = lock_shared(&self.state, SOURCE);
        state.next_id += 1;
        state.requested += 1;
        let request = FrameRequest(state.next_id);
        state.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut state = lock_shared(&self.state, SOURCE);
        if state.pending == Some(request) {
            state.pending = None;
            state.cancelled += 1;
        }
    }
}
