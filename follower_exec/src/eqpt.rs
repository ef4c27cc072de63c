//! # Equipment interfaces
//!
//! Abstractions over the drive actuator (two drive wheels plus the gripper
//! axis) and the sensors (two colour sensors and a touch sensor). Real
//! hardware drivers and the [`crate::sim`] robot implement these traits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    cancel::CancelToken,
    color::{self, ColorLabel, ColorReading},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum magnitude of a speed command.
///
/// Units: percent of maximum actuator speed
pub const MAX_SPEED_PCT: f64 = 100.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Signed percentage of maximum actuator speed.
pub type SpeedCommand = f64;

/// Both colour readings of a single control tick.
///
/// A reading which could not be acquired is `None` and is treated as an
/// `Unknown` colour with zero luma.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorFrame {
    pub left: Option<ColorReading>,
    pub right: Option<ColorReading>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the equipment.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Operation cancelled by the operator")]
    Cancelled,

    #[error("Drive actuator fault: {0}")]
    Actuator(String),

    #[error("Sensor fault on {0:?}: {1}")]
    Sensor(SensorPort, String),
}

/// The colour sensors, by mounting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorPort {
    Left,
    Right,
}

/// Any sensor port, used to report faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorPort {
    Color(ColorPort),
    Touch,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A two wheel differential drive with an auxiliary gripper axis.
///
/// Speeds passed in are already clamped to `[-MAX_SPEED_PCT, MAX_SPEED_PCT]`.
pub trait DriveActuator {
    /// Run both drive wheels continuously at the given speeds.
    fn set_speeds(&mut self, left: SpeedCommand, right: SpeedCommand) -> Result<(), EqptError>;

    /// Run both drive wheels until they have turned through `degrees`, then
    /// stop. A negative target reverses both wheels.
    ///
    /// Blocks until the motion is complete. Implementations shall poll
    /// `cancel` while waiting and return `EqptError::Cancelled` once it is
    /// set.
    fn run_for_degrees(
        &mut self,
        left: SpeedCommand,
        right: SpeedCommand,
        degrees: f64,
        cancel: &CancelToken,
    ) -> Result<(), EqptError>;

    /// Stop both drive wheels immediately.
    fn stop(&mut self) -> Result<(), EqptError>;

    /// Run the gripper axis through `degrees` at `speed`, blocking as
    /// [`DriveActuator::run_for_degrees`] does.
    fn gripper_run_for_degrees(
        &mut self,
        speed: SpeedCommand,
        degrees: f64,
        cancel: &CancelToken,
    ) -> Result<(), EqptError>;
}

/// The robot's sensor set.
pub trait Sensors {
    /// Read one of the colour sensors.
    fn read_color(&mut self, port: ColorPort) -> Result<ColorReading, EqptError>;

    /// Read the touch sensor.
    fn is_pressed(&mut self) -> Result<bool, EqptError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ColorPort {
    pub const BOTH: [ColorPort; 2] = [ColorPort::Left, ColorPort::Right];
}

impl SensorFrame {
    pub fn new(left: ColorReading, right: ColorReading) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// Read both colour sensors, left first.
    ///
    /// Read failures are logged and stored as `None`.
    pub fn acquire<S: Sensors>(sensors: &mut S) -> Self {
        Self {
            left: read_color_or_warn(sensors, ColorPort::Left),
            right: read_color_or_warn(sensors, ColorPort::Right),
        }
    }

    pub fn get(&self, port: ColorPort) -> Option<&ColorReading> {
        match port {
            ColorPort::Left => self.left.as_ref(),
            ColorPort::Right => self.right.as_ref(),
        }
    }

    /// Luma seen by the given sensor, zero if the read failed.
    pub fn luma(&self, port: ColorPort) -> i32 {
        self.get(port).map(ColorReading::luma).unwrap_or(0)
    }

    /// Label seen by the given sensor, `Unknown` if the read failed.
    pub fn label(&self, port: ColorPort) -> ColorLabel {
        self.get(port)
            .map(ColorReading::label)
            .unwrap_or(ColorLabel::Unknown)
    }

    /// True if the given sensor's reading satisfies the rule for `label`.
    pub fn matches(&self, port: ColorPort, label: ColorLabel) -> bool {
        self.get(port)
            .map(|r| color::matches(r, label))
            .unwrap_or(false)
    }

    /// True if both sensors satisfy the rule for `label`.
    pub fn both_match(&self, label: ColorLabel) -> bool {
        ColorPort::BOTH.iter().all(|p| self.matches(*p, label))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Read the touch sensor, treating a failed read as not pressed.
pub fn touch_pressed<S: Sensors>(sensors: &mut S) -> bool {
    match sensors.is_pressed() {
        Ok(p) => p,
        Err(e) => {
            warn!("Touch sensor read failed, assuming not pressed: {}", e);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn read_color_or_warn<S: Sensors>(sensors: &mut S, port: ColorPort) -> Option<ColorReading> {
    match sensors.read_color(port) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("{:?} colour sensor read failed: {}", port, e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FaultySensors;

    impl Sensors for FaultySensors {
        fn read_color(&mut self, port: ColorPort) -> Result<ColorReading, EqptError> {
            match port {
                ColorPort::Left => Err(EqptError::Sensor(
                    SensorPort::Color(port),
                    "disconnected".into(),
                )),
                ColorPort::Right => Ok(ColorReading::new(20, 150, 20)),
            }
        }

        fn is_pressed(&mut self) -> Result<bool, EqptError> {
            Err(EqptError::Sensor(SensorPort::Touch, "disconnected".into()))
        }
    }

    #[test]
    fn test_failed_reads_are_fail_safe() {
        let mut sensors = FaultySensors;
        let frame = SensorFrame::acquire(&mut sensors);

        assert_eq!(frame.left, None);
        assert_eq!(frame.luma(ColorPort::Left), 0);
        assert_eq!(frame.label(ColorPort::Left), ColorLabel::Unknown);
        assert!(!frame.matches(ColorPort::Left, ColorLabel::Green));

        assert_eq!(frame.label(ColorPort::Right), ColorLabel::Green);
        assert!(frame.matches(ColorPort::Right, ColorLabel::Green));
        assert!(!frame.both_match(ColorLabel::Green));

        assert!(!touch_pressed(&mut sensors));
    }

    #[test]
    fn test_both_match() {
        let green = ColorReading::new(20, 150, 20);
        let white = ColorReading::new(200, 200, 200);

        assert!(SensorFrame::new(green, green).both_match(ColorLabel::Green));
        assert!(!SensorFrame::new(green, white).both_match(ColorLabel::Green));
        assert!(!SensorFrame::new(white, green).both_match(ColorLabel::Green));
    }
}
