//! Error types for the scene viewer
//!
//! This module defines the error type shared by every manager, the plugin
//! registry and the viewer itself. Lifecycle violations, asset failures and
//! backend failures are all reported through the same enum.

use std::fmt;

/// Result type for scene viewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scene viewer errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Operation attempted on a component that has already been disposed
    Disposed(String),

    /// Component initialized twice
    AlreadyInitialized(String),

    /// Component used before initialization
    NotInitialized(String),

    /// Plugin registration attempted before the registry received a context
    ContextNotSet(String),

    /// A plugin with the same name is already registered
    DuplicatePlugin(String),

    /// Argument rejected by validation (ranges, limits, names)
    InvalidArgument(String),

    /// Model fetch or decode failure
    AssetLoadFailed(String),

    /// Failure reported by a plugin's own logic
    PluginFailed(String),

    /// Graphics backend failure (surface creation, draw call)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Disposed(msg) => write!(f, "Resource disposed: {}", msg),
            Error::AlreadyInitialized(msg) => write!(f, "Already initialized: {}", msg),
            Error::NotInitialized(msg) => write!(f, "Not initialized: {}", msg),
            Error::ContextNotSet(msg) => write!(f, "Plugin context not set: {}", msg),
            Error::DuplicatePlugin(name) => write!(f, "Plugin '{}' is already registered", name),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::AssetLoadFailed(msg) => write!(f, "Asset load failed: {}", msg),
            Error::PluginFailed(msg) => write!(f, "Plugin failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for errors that signal misuse of a component's lifecycle.
    ///
    /// These are integration bugs and are never worth retrying.
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            Error::Disposed(_)
                | Error::AlreadyInitialized(_)
                | Error::NotInitialized(_)
                | Error::ContextNotSet(_)
                | Error::DuplicatePlugin(_)
        )
    }
}

// ===== ERROR MACROS =====

/// Build an error, logging it at ERROR severity with file:line
///
/// # Example
///
/// ```ignore
/// let err = viewer_err!("viewer::SceneManager", Disposed, "cannot add '{}'", name);
/// ```
#[macro_export]
macro_rules! viewer_err {
    ($source:expr, $kind:ident, $($arg:tt)*) => {{
        let error = $crate::viewer3d::Error::$kind(format!($($arg)*));
        $crate::viewer_error!($source, "{}", error);
        error
    }};
}

/// Log and return an error from the current function
///
/// # Example
///
/// ```ignore
/// viewer_bail!("viewer::PluginSystem", DuplicatePlugin, "{}", name);
/// ```
#[macro_export]
macro_rules! viewer_bail {
    ($source:expr, $kind:ident, $($arg:tt)*) => {
        return Err($crate::viewer_err!($source, $kind, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
