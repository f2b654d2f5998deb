//! Host integration: the viewer core, frame scheduling and readiness.

mod frame_scheduler;
mod readiness;
mod viewer_core;

pub use frame_scheduler::{FrameRequest, FrameScheduler, ManualScheduler, WinitFrameScheduler};
pub use readiness::{
    ReadinessState, ReadinessSnapshot, ReadinessTracker,
    ReadinessPoller, PollerConfig, PollStatus,
};
pub use viewer_core::{ViewerCore, ViewerOptions, ViewerEvent, FrameOutcome};
