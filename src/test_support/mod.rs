//! Internal helpers re-exported for integration tests.
//!
//! Provides scratch cache roots, log capture, and skip detection for tests
//! that need the system `tar`.

mod fixtures;
mod logging;
mod skip;

pub use fixtures::ScratchCache;
pub use logging::{capture_debug_logs, capture_logs, capture_warn_logs};
pub use skip::{SKIP_PREFIX, skip_message, tar_available};
