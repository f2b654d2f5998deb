mod panic;
mod shared;

pub use panic::catch_panic;
pub use shared::{Shared, lock_shared};
