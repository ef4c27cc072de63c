//! General time utility functions

use chrono;

/// Number of microseconds in a second
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_microseconds()
        .map(|us| us as f64 / MICROS_PER_SECOND as f64)
}
