//! Line control module
//!
//! PID controller steering the robot along a dark line seen between two
//! side mounted colour sensors.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::eqpt::{SpeedCommand, MAX_SPEED_PCT};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LineCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LineCtrlError {
    #[error("Invalid line control parameters: {0}")]
    InvalidParams(String),

    #[error("LineCtrl has not been initialised")]
    NotInit,

    #[error("Cannot open the LineCtrl archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a derived speed into `[-MAX_SPEED_PCT, MAX_SPEED_PCT]`.
pub fn clamp_speed(speed: SpeedCommand) -> SpeedCommand {
    util::maths::clamp(speed, -MAX_SPEED_PCT, MAX_SPEED_PCT)
}

/// Tracking error from the luma seen by each sensor.
///
/// Each side contributes how far it is below the white threshold. The error
/// is positive when the left sensor sees more of the line. Saturates rather
/// than overflowing on extreme luma.
pub fn calc_error(white_threshold: i32, left_luma: i32, right_luma: i32) -> i32 {
    let left_deficit = white_threshold.saturating_sub(left_luma).max(0);
    let right_deficit = white_threshold.saturating_sub(right_luma).max(0);

    left_deficit - right_deficit
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(12.0), 12.0);
        assert_eq!(clamp_speed(-100.0), -100.0);
        assert_eq!(clamp_speed(117.5), 100.0);
        assert_eq!(clamp_speed(-101.0), -100.0);
    }

    #[test]
    fn test_calc_error() {
        // Both at or above the threshold
        assert_eq!(calc_error(220, 220, 230), 0);
        assert_eq!(calc_error(220, 255, 255), 0);

        // Only the left below
        assert_eq!(calc_error(220, 50, 230), 170);

        // Left deficit larger than the right
        assert_eq!(calc_error(220, 100, 200), 100);

        // Equal deficits cancel
        assert_eq!(calc_error(220, 50, 50), 0);
    }

    #[test]
    fn test_calc_error_saturates() {
        assert_eq!(calc_error(220, i32::MIN, 255), i32::MAX);
        assert_eq!(calc_error(220, 255, i32::MIN), -i32::MAX);
        assert_eq!(calc_error(220, i32::MAX, i32::MAX), 0);
    }

    #[test]
    fn test_calc_error_sign_flips_on_swap() {
        for (l, r) in [(0, 255), (50, 210), (219, 10), (100, 100), (300, -5)].iter() {
            assert_eq!(calc_error(220, *l, *r), -calc_error(220, *r, *l));
        }
    }
}
