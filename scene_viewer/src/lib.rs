/*!
# Scene Viewer

Lifecycle-managed 3D scene host.

The viewer owns a scene graph, a perspective camera, a render surface and
a frame loop, and exposes a plugin registry so features such as model
loading or orbit controls compose without the host knowing about them.

## Architecture

- **SceneManager**: Scene root, node add/remove, recursive GPU resource disposal
- **CameraManager**: Perspective camera configuration and aspect ratio
- **RenderManager**: Construct-once output surface bound to a container
- **PluginSystem**: Name-keyed plugin registry with failure isolation
- **ViewerCore**: Orchestrates the above; initialize, start/stop, frame, dispose
- **ReadinessTracker**: Derived "handles are safe to read" snapshot

The graphics backend, the model decoder and the mounting container are
supplied by the host through traits (`GraphicsBackend`, `ModelSource`,
`Container`). A headless backend is included.
*/

// Internal modules
mod error;
mod lifecycle;
mod utils;
pub mod log;
pub mod camera;
pub mod host;
pub mod plugin;
pub mod plugins;
pub mod renderer;
pub mod scene;

// Main viewer3d namespace module
pub mod viewer3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Viewer core
    pub use crate::host::{ViewerCore, ViewerOptions, ViewerEvent, FrameOutcome};

    // Shared handle helpers
    pub use crate::utils::{Shared, lock_shared};

    // Logging sub-module (types and logger slot, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        pub use crate::log::{set_logger, reset_logger, set_min_severity, min_severity};
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::renderer::*;
    }

    // Plugin contract and registry
    pub mod plugin {
        pub use crate::plugin::*;
    }

    // Built-in plugins
    pub mod plugins {
        pub use crate::plugins::*;
    }

    // Host integration (scheduling, readiness)
    pub mod host {
        pub use crate::host::*;
    }
}

// Re-export math library at crate root
pub use glam;
