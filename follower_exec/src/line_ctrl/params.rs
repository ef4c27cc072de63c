//! Parameters structure for LineCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for line control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineCtrlParams {
    /// Base speed of both wheels while following the line.
    ///
    /// Units: percent of maximum speed
    pub follower_speed: f64,

    /// Luma at or above which a sensor is considered to see no line.
    pub white_threshold: i32,

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,
}

impl Default for LineCtrlParams {
    fn default() -> Self {
        Self {
            follower_speed: 12.0,
            white_threshold: 220,
            k_p: 0.1,
            k_i: 0.0,
            k_d: 0.02,
        }
    }
}
