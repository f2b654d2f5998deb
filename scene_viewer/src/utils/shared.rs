/// Shared handles to the viewer's managers.
///
/// Managers are handed to plugins through `Arc<Mutex<_>>`. A plugin that
/// panics while holding a lock poisons it; the viewer still has to tear the
/// manager down afterwards, so locking recovers the guard instead of failing.

use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, lockable handle
pub type Shared<T> = Arc<Mutex<T>>;

/// Lock a shared handle, recovering from poisoning.
pub fn lock_shared<'a, T: ?Sized>(mutex: &'a Mutex<T>, source: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        crate::viewer_warn!(source, "Recovering poisoned lock");
        poisoned.into_inner()
    })
}
