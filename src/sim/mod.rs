pub mod beacon;
pub mod combat;
pub mod event;
pub mod interaction;
pub mod layout;
pub mod quest;
pub mod save;
pub mod step;
pub mod world;

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for log and snapshot timestamps.
pub(crate) fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
