/// Lifecycle: explicit state machine shared by every manager.
///
/// `Uninitialized → Ready → Disposed`, monotonic. Transition checks live here
/// so every component reports illegal use with the same error variants.

use crate::error::Result;
use crate::viewer_bail;

/// Lifecycle state of a manager, the plugin registry or the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, not yet initialized
    Uninitialized,
    /// Initialized and usable
    Ready,
    /// Terminal; every further use fails
    Disposed,
}

impl Lifecycle {
    /// True once `initialize` succeeded and before disposal.
    pub fn is_ready(self) -> bool {
        self == Lifecycle::Ready
    }

    /// True after disposal.
    pub fn is_disposed(self) -> bool {
        self == Lifecycle::Disposed
    }

    /// Fail with `Disposed` if the component was disposed.
    pub(crate) fn ensure_not_disposed(self, source: &str, operation: &str) -> Result<()> {
        if self.is_disposed() {
            viewer_bail!(source, Disposed, "{} called after dispose", operation);
        }
        Ok(())
    }

    /// Fail unless the component is `Ready`.
    pub(crate) fn ensure_ready(self, source: &str, operation: &str) -> Result<()> {
        match self {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Uninitialized => {
                viewer_bail!(source, NotInitialized, "{} called before initialize", operation)
            }
            Lifecycle::Disposed => {
                viewer_bail!(source, Disposed, "{} called after dispose", operation)
            }
        }
    }

    /// `Uninitialized → Ready`.
    pub(crate) fn initialize(&mut self, source: &str) -> Result<()> {
        match *self {
            Lifecycle::Uninitialized => {
                *self = Lifecycle::Ready;
                Ok(())
            }
            Lifecycle::Ready => {
                viewer_bail!(source, AlreadyInitialized, "initialize called twice")
            }
            Lifecycle::Disposed => {
                viewer_bail!(source, Disposed, "initialize called after dispose")
            }
        }
    }

    /// Any state `→ Disposed`.
    ///
    /// Returns `true` only for the first call, so callers release resources
    /// exactly once.
    pub(crate) fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        *self = Lifecycle::Disposed;
        true
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
