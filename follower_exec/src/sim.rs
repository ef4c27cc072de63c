//! # Simulated equipment
//!
//! [`SimDrive`] logs every actuator command and dead reckons a planar pose
//! from them. [`SimSensors`] plays back a script of colour sensor frames and
//! presses the touch sensor on a chosen poll.
//!
//! The pose frame has `x` positive to the robot's initial right, `y` positive
//! to its initial front, and `heading_deg` positive counter-clockwise (a left
//! turn). Continuous `set_speeds` commands do not move the simulated pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use std::collections::VecDeque;

// Internal
use crate::{
    cancel::CancelToken,
    color::ColorReading,
    eqpt::{ColorPort, DriveActuator, EqptError, SensorPort, Sensors, SpeedCommand},
    mnvr::MnvrParams,
    params::FollowerParams,
};
use util::maths::sign;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A reading of the white field surface.
pub const WHITE: ColorReading = ColorReading::new(200, 200, 200);

/// A reading of the black line.
pub const BLACK: ColorReading = ColorReading::new(20, 20, 20);

/// A reading of a green marker.
pub const GREEN: ColorReading = ColorReading::new(20, 150, 20);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dead reckoned pose of the simulated robot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimPose {
    /// Units: field units
    pub x: f64,

    /// Units: field units
    pub y: f64,

    /// Units: degrees
    pub heading_deg: f64,
}

/// Simulated drive actuator.
#[derive(Debug, Clone)]
pub struct SimDrive {
    turn_deg_per_deg: f64,
    wheel_deg_per_unit: f64,
    log: Vec<DriveCmd>,
    pose: SimPose,
}

/// Simulated sensor set.
#[derive(Debug, Clone)]
pub struct SimSensors {
    frames: VecDeque<(ColorReading, ColorReading)>,
    idle_frame: (ColorReading, ColorReading),
    current: (ColorReading, ColorReading),
    failing_port: Option<ColorPort>,
    press_on_poll: Option<usize>,
    num_polls: usize,
    num_frames: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command received by the simulated drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCmd {
    SetSpeeds {
        left: SpeedCommand,
        right: SpeedCommand,
    },
    RunForDegrees {
        left: SpeedCommand,
        right: SpeedCommand,
        degrees: f64,
    },
    Stop,
    Gripper {
        speed: SpeedCommand,
        degrees: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDrive {
    /// Create a drive using the same conversion constants as the manoeuvres.
    pub fn new(params: &MnvrParams) -> Self {
        Self {
            turn_deg_per_deg: params.turn_deg_per_deg,
            wheel_deg_per_unit: params.wheel_deg_per_unit,
            log: Vec::new(),
            pose: SimPose::default(),
        }
    }

    pub fn log(&self) -> &[DriveCmd] {
        &self.log
    }

    pub fn pose(&self) -> SimPose {
        self.pose
    }

    /// Integrate a degree bounded wheel motion into the pose.
    fn integrate(&mut self, left: SpeedCommand, right: SpeedCommand, degrees: f64) {
        let left_travel = degrees * sign(left);
        let right_travel = degrees * sign(right);

        let rotation_deg = (right_travel - left_travel) / 2.0 / self.turn_deg_per_deg;
        let forward = (right_travel + left_travel) / 2.0 / self.wheel_deg_per_unit;

        let heading_rad = self.pose.heading_deg.to_radians();
        self.pose.x -= forward * heading_rad.sin();
        self.pose.y += forward * heading_rad.cos();
        self.pose.heading_deg += rotation_deg;
    }
}

impl DriveActuator for SimDrive {
    fn set_speeds(&mut self, left: SpeedCommand, right: SpeedCommand) -> Result<(), EqptError> {
        self.log.push(DriveCmd::SetSpeeds { left, right });
        Ok(())
    }

    fn run_for_degrees(
        &mut self,
        left: SpeedCommand,
        right: SpeedCommand,
        degrees: f64,
        cancel: &CancelToken,
    ) -> Result<(), EqptError> {
        cancel.check()?;
        self.log.push(DriveCmd::RunForDegrees {
            left,
            right,
            degrees,
        });
        self.integrate(left, right, degrees);
        trace!("SimDrive pose: {:?}", self.pose);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EqptError> {
        self.log.push(DriveCmd::Stop);
        Ok(())
    }

    fn gripper_run_for_degrees(
        &mut self,
        speed: SpeedCommand,
        degrees: f64,
        cancel: &CancelToken,
    ) -> Result<(), EqptError> {
        cancel.check()?;
        self.log.push(DriveCmd::Gripper { speed, degrees });
        Ok(())
    }
}

impl SimSensors {
    /// Sensors which always see white on both sides and are never pressed.
    pub fn new() -> Self {
        Self {
            frames: VecDeque::new(),
            idle_frame: (WHITE, WHITE),
            current: (WHITE, WHITE),
            failing_port: None,
            press_on_poll: None,
            num_polls: 0,
            num_frames: 0,
        }
    }

    /// Append frames to the script. Each read of the left sensor advances to
    /// the next frame, the right sensor reports the same frame.
    pub fn with_frames<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = (ColorReading, ColorReading)>,
    {
        self.frames.extend(frames);
        self
    }

    /// Append `count` copies of a frame to the script.
    pub fn with_repeated(self, frame: (ColorReading, ColorReading), count: usize) -> Self {
        self.with_frames(std::iter::repeat(frame).take(count))
    }

    /// Frame reported once the script is exhausted.
    pub fn with_idle_frame(mut self, left: ColorReading, right: ColorReading) -> Self {
        self.idle_frame = (left, right);
        self
    }

    /// Report the touch sensor pressed on the given zero-based poll.
    pub fn with_press_on_poll(mut self, poll: usize) -> Self {
        self.press_on_poll = Some(poll);
        self
    }

    /// Make every read of the given colour sensor fail.
    pub fn with_failing_port(mut self, port: ColorPort) -> Self {
        self.failing_port = Some(port);
        self
    }

    /// Number of touch sensor polls so far.
    pub fn num_polls(&self) -> usize {
        self.num_polls
    }

    /// Number of frames consumed so far.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of scripted frames not yet consumed.
    pub fn frames_remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Default for SimSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensors for SimSensors {
    fn read_color(&mut self, port: ColorPort) -> Result<ColorReading, EqptError> {
        if port == ColorPort::Left {
            self.current = self.frames.pop_front().unwrap_or(self.idle_frame);
            self.num_frames += 1;
        }

        if self.failing_port == Some(port) {
            return Err(EqptError::Sensor(
                SensorPort::Color(port),
                "simulated read failure".into(),
            ));
        }

        Ok(match port {
            ColorPort::Left => self.current.0,
            ColorPort::Right => self.current.1,
        })
    }

    fn is_pressed(&mut self) -> Result<bool, EqptError> {
        let pressed = self.press_on_poll == Some(self.num_polls);
        self.num_polls += 1;
        Ok(pressed)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the equipment for a demonstration course with a green field on each
/// side of a black line.
///
/// The robot follows the line, meets the left field, finds the box on the
/// eighth row of the first column, returns to the line, meets the right field
/// and delivers the box there.
pub fn demo_course(params: &FollowerParams) -> (SimDrive, SimSensors) {
    let line = (WHITE, WHITE);

    let sensors = SimSensors::new()
        // Line following, then the left field marker
        .with_repeated(line, 5)
        .with_frames(vec![(GREEN, WHITE)])
        // Branch to the left field boundary
        .with_repeated(line, 3)
        .with_frames(vec![(GREEN, GREEN)])
        // Back to the main line after the search
        .with_repeated(line, 3)
        .with_frames(vec![(BLACK, BLACK)])
        // Line following, then the right field marker
        .with_repeated(line, 4)
        .with_frames(vec![(WHITE, GREEN)])
        // Branch to the right field boundary
        .with_repeated(line, 2)
        .with_frames(vec![(GREEN, GREEN)])
        // Back to the main line after the drop
        .with_repeated(line, 2)
        .with_frames(vec![(BLACK, BLACK)])
        .with_idle_frame(GREEN, GREEN)
        .with_press_on_poll(7);

    (SimDrive::new(&params.mnvr), sensors)
}
