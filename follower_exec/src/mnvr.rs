//! # Spatial manoeuvres
//!
//! Open loop, dead reckoned movement primitives built on a
//! [`DriveActuator`]. Distances and angles are converted into wheel rotation
//! with the empirical constants in [`MnvrParams`], no sensor feedback is used.
//!
//! Every manoeuvre stops the drive first, and checks the cancellation token
//! before and after each actuator primitive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// Internal
use crate::{
    cancel::CancelToken,
    eqpt::{DriveActuator, EqptError},
    line_ctrl::{clamp_speed, WheelDems},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A quarter turn.
///
/// Units: degrees
pub const QUARTER_TURN_DEG: f64 = 90.0;

/// A half turn.
///
/// Units: degrees
pub const HALF_TURN_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the manoeuvre layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MnvrParams {
    /// Speed of both wheels during manoeuvres.
    ///
    /// Units: percent of maximum speed
    pub box_mode_speed: f64,

    /// Speed of the gripper axis.
    ///
    /// Units: percent of maximum speed
    pub gripper_speed: f64,

    /// Wheel rotation per degree of in-place body rotation.
    ///
    /// Units: wheel degrees/body degree
    pub turn_deg_per_deg: f64,

    /// Wheel rotation per unit of straight line travel.
    ///
    /// Units: wheel degrees/field unit
    pub wheel_deg_per_unit: f64,

    /// Gripper axis travel between its raised and lowered positions.
    ///
    /// Units: degrees
    pub gripper_travel_deg: f64,
}

/// Manoeuvre executor, owning the drive actuator.
///
/// The drive is stopped when the executor is dropped.
pub struct Maneuvers<A: DriveActuator> {
    drive: A,
    params: MnvrParams,
    cancel: CancelToken,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Side of the robot, used for turn and lateral shift directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Gripper motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperAction {
    /// Run the axis with positive speed.
    Raise,
    /// Run the axis with negative speed.
    Lower,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MnvrParams {
    fn default() -> Self {
        Self {
            box_mode_speed: 15.0,
            gripper_speed: 10.0,
            turn_deg_per_deg: 22.0 / 9.0,
            wheel_deg_per_unit: 100.0,
            gripper_travel_deg: 70.0,
        }
    }
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl<A: DriveActuator> Maneuvers<A> {
    pub fn new(drive: A, params: MnvrParams, cancel: CancelToken) -> Self {
        Self {
            drive,
            params,
            cancel,
        }
    }

    pub fn drive(&self) -> &A {
        &self.drive
    }

    pub fn params(&self) -> &MnvrParams {
        &self.params
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Halt both drive wheels.
    ///
    /// Callable in any state, including after cancellation.
    pub fn stop(&mut self) -> Result<(), EqptError> {
        self.drive.stop()
    }

    /// Run the wheels continuously at the given demands.
    pub fn set_speeds(&mut self, dems: WheelDems) -> Result<(), EqptError> {
        self.cancel.check()?;
        self.drive
            .set_speeds(clamp_speed(dems.left), clamp_speed(dems.right))
    }

    /// Drive straight by `units`, reversing if negative.
    pub fn move_forward(&mut self, units: f64) -> Result<(), EqptError> {
        self.stop()?;
        debug!("Mnvr: forward {:.3} units", units);

        let speed = clamp_speed(self.params.box_mode_speed);
        let degrees = self.params.wheel_deg_per_unit * units;

        self.run_for_degrees(speed, speed, degrees)
    }

    /// Rotate in place by `angle_deg` towards `side`.
    pub fn turn_degrees(&mut self, angle_deg: f64, side: Side) -> Result<(), EqptError> {
        self.stop()?;
        debug!("Mnvr: turn {:.1} deg {:?}", angle_deg, side);

        let speed = clamp_speed(self.params.box_mode_speed);
        let (left, right) = match side {
            Side::Left => (-speed, speed),
            Side::Right => (speed, -speed),
        };
        let degrees = self.params.turn_deg_per_deg * angle_deg;

        self.run_for_degrees(left, right, degrees)
    }

    /// Shift sideways by `units` towards `side`: a quarter turn towards
    /// `side`, a straight move, and a quarter turn back.
    pub fn move_lateral(&mut self, units: f64, side: Side) -> Result<(), EqptError> {
        self.stop()?;
        debug!("Mnvr: lateral {:.3} units {:?}", units, side);

        self.turn_degrees(QUARTER_TURN_DEG, side)?;
        self.move_forward(units)?;
        self.turn_degrees(QUARTER_TURN_DEG, side.opposite())
    }

    /// Run the gripper through its full travel.
    pub fn gripper(&mut self, action: GripperAction) -> Result<(), EqptError> {
        self.cancel.check()?;
        debug!("Mnvr: gripper {:?}", action);

        let speed = clamp_speed(self.params.gripper_speed);
        let speed = match action {
            GripperAction::Raise => speed,
            GripperAction::Lower => -speed,
        };

        self.drive
            .gripper_run_for_degrees(speed, self.params.gripper_travel_deg, &self.cancel)?;
        self.cancel.check()
    }

    fn run_for_degrees(&mut self, left: f64, right: f64, degrees: f64) -> Result<(), EqptError> {
        self.cancel.check()?;
        self.drive.run_for_degrees(left, right, degrees, &self.cancel)?;
        self.cancel.check()
    }
}

impl<A: DriveActuator> Drop for Maneuvers<A> {
    fn drop(&mut self) {
        if let Err(e) = self.drive.stop() {
            warn!("Could not stop the drive on release: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{DriveCmd, SimDrive};

    fn mnvr() -> Maneuvers<SimDrive> {
        let params = MnvrParams::default();
        Maneuvers::new(SimDrive::new(&params), params, CancelToken::new())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_move_forward() {
        let mut m = mnvr();
        m.move_forward(1.2).unwrap();
        m.move_forward(-4.0).unwrap();

        let log = m.drive().log();
        assert_eq!(log[0], DriveCmd::Stop);
        match log[1] {
            DriveCmd::RunForDegrees {
                left,
                right,
                degrees,
            } => {
                assert_eq!((left, right), (15.0, 15.0));
                assert!(close(degrees, 120.0));
            }
            ref c => panic!("Unexpected command {:?}", c),
        }
        assert_eq!(log[2], DriveCmd::Stop);
        assert_eq!(
            log[3],
            DriveCmd::RunForDegrees {
                left: 15.0,
                right: 15.0,
                degrees: -400.0
            }
        );

        let pose = m.drive().pose();
        assert!(close(pose.x, 0.0));
        assert!(close(pose.y, -2.8));
    }

    #[test]
    fn test_turn_degrees() {
        let mut m = mnvr();
        m.turn_degrees(90.0, Side::Left).unwrap();

        match m.drive().log()[1] {
            DriveCmd::RunForDegrees {
                left,
                right,
                degrees,
            } => {
                assert_eq!(left, -15.0);
                assert_eq!(right, 15.0);
                assert!(close(degrees, 220.0));
            }
            ref c => panic!("Unexpected command {:?}", c),
        }
        assert!(close(m.drive().pose().heading_deg, 90.0));

        m.turn_degrees(180.0, Side::Right).unwrap();
        assert!(close(m.drive().pose().heading_deg, -90.0));
    }

    #[test]
    fn test_move_lateral() {
        let mut m = mnvr();
        m.move_lateral(2.0, Side::Left).unwrap();

        let pose = m.drive().pose();
        assert!(close(pose.x, -2.0));
        assert!(close(pose.y, 0.0));
        assert!(close(pose.heading_deg, 0.0));

        m.move_lateral(0.5, Side::Right).unwrap();
        assert!(close(m.drive().pose().x, -1.5));
    }

    #[test]
    fn test_gripper() {
        let mut m = mnvr();
        m.gripper(GripperAction::Lower).unwrap();
        m.gripper(GripperAction::Raise).unwrap();

        assert_eq!(
            m.drive().log(),
            &[
                DriveCmd::Gripper {
                    speed: -10.0,
                    degrees: 70.0
                },
                DriveCmd::Gripper {
                    speed: 10.0,
                    degrees: 70.0
                },
            ]
        );
    }

    #[test]
    fn test_speeds_are_clamped() {
        let params = MnvrParams {
            box_mode_speed: 140.0,
            ..Default::default()
        };
        let mut m = Maneuvers::new(SimDrive::new(&params), params, CancelToken::new());

        m.move_forward(1.0).unwrap();
        m.set_speeds(WheelDems {
            left: -300.0,
            right: 40.0,
        })
        .unwrap();

        let log = m.drive().log();
        assert_eq!(
            log[1],
            DriveCmd::RunForDegrees {
                left: 100.0,
                right: 100.0,
                degrees: 100.0
            }
        );
        assert_eq!(
            log[2],
            DriveCmd::SetSpeeds {
                left: -100.0,
                right: 40.0
            }
        );
    }

    #[test]
    fn test_cancelled_mnvr_does_not_move() {
        let mut m = mnvr();
        m.cancel_token().cancel();

        assert!(matches!(m.move_forward(1.0), Err(EqptError::Cancelled)));
        assert!(matches!(
            m.gripper(GripperAction::Raise),
            Err(EqptError::Cancelled)
        ));

        // Only the leading stop reached the drive
        assert_eq!(m.drive().log(), &[DriveCmd::Stop]);

        // Stop still works after cancellation
        m.stop().unwrap();
        assert_eq!(m.drive().log().last(), Some(&DriveCmd::Stop));
    }
}
