//! # Line follower library.
//!
//! This library allows the follower executable and tests to access the
//! controller modules.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Box search module - sweeps a box field with the touch sensor, picks up and drops the box
pub mod box_search;

/// Operator cancellation token
pub mod cancel;

/// Colour classification - labels and luma from raw sensor readings
pub mod color;

/// Equipment interfaces - drive actuator and sensor traits
pub mod eqpt;

/// Line control module - PID steering along the line
pub mod line_ctrl;

/// Manoeuvres - open loop dead reckoned movements
pub mod mnvr;

/// Parameters of the executable
pub mod params;

/// Simulated robot used by the demonstration run and tests
pub mod sim;

/// Task manager module - sequences line following and box handling
pub mod task_mgr;
