//! Implementations for the LineCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{calc_error, clamp_speed, LineCtrlError, LineCtrlParams};
use crate::eqpt::{ColorPort, SensorFrame, SpeedCommand, MAX_SPEED_PCT};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line control module state
#[derive(Default)]
pub struct LineCtrl {
    pub(crate) params: Option<LineCtrlParams>,

    pub(crate) pid: PidState,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    num_ticks: u64,
}

/// Accumulators of the PID controller.
///
/// The integral is never clamped.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq, Eq)]
pub struct PidState {
    pub last_error: i32,
    pub integral: i64,
    pub derivative: i32,
}

/// Wheel speed demands produced by one tick.
///
/// Units: percent of maximum speed
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct WheelDems {
    pub left: SpeedCommand,
    pub right: SpeedCommand,
}

/// Status report for LineCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub tick: u64,
    pub left_luma: i32,
    pub right_luma: i32,
    pub error: i32,
    pub integral: i64,
    pub derivative: i32,
    pub command: f64,
    pub left_dem: SpeedCommand,
    pub right_dem: SpeedCommand,
    pub left_limited: bool,
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LineCtrl {
    type InitData = LineCtrlParams;
    type InitError = LineCtrlError;

    type InputData = SensorFrame;
    type OutputData = WheelDems;
    type StatusReport = StatusReport;
    type ProcError = LineCtrlError;

    /// Initialise the LineCtrl module, clearing the PID accumulators.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if init_data.follower_speed.abs() > MAX_SPEED_PCT {
            return Err(LineCtrlError::InvalidParams(format!(
                "follower_speed must be within +/-{}, found {}",
                MAX_SPEED_PCT, init_data.follower_speed
            )));
        }

        let gains = [init_data.k_p, init_data.k_i, init_data.k_d];
        if gains.iter().any(|k| !k.is_finite()) {
            return Err(LineCtrlError::InvalidParams(format!(
                "PID gains must be finite, found {:?}",
                gains
            )));
        }

        self.params = Some(init_data);
        self.pid = PidState::default();
        self.report = StatusReport::default();
        self.num_ticks = 0;

        Ok(())
    }

    /// Perform one tick of line control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let (white_threshold, follower_speed) = match self.params {
            Some(ref p) => (p.white_threshold, p.follower_speed),
            None => return Err(LineCtrlError::NotInit),
        };

        let left_luma = input_data.luma(ColorPort::Left);
        let right_luma = input_data.luma(ColorPort::Right);
        let error = calc_error(white_threshold, left_luma, right_luma);

        let command = self.compute_command(error);

        // Mix the command into the base speed. Positive error (line drifting
        // under the left sensor) slows the left wheel.
        let raw_left = follower_speed - command;
        let raw_right = follower_speed + command;
        let output = WheelDems {
            left: clamp_speed(raw_left),
            right: clamp_speed(raw_right),
        };

        self.report = StatusReport {
            tick: self.num_ticks,
            left_luma,
            right_luma,
            error,
            integral: self.pid.integral,
            derivative: self.pid.derivative,
            command,
            left_dem: output.left,
            right_dem: output.right,
            left_limited: output.left != raw_left,
            right_limited: output.right != raw_right,
        };
        self.num_ticks += 1;

        trace!(
            "LineCtrl: luma ({}, {}) err {} cmd {:.3} dems ({:.2}, {:.2})",
            left_luma,
            right_luma,
            error,
            command,
            output.left,
            output.right
        );

        if self.arch_report.is_open() {
            if let Err(e) = self.write() {
                warn!("Could not archive LineCtrl status: {}", e);
            }
        }

        Ok((output, self.report))
    }
}

impl Archived for LineCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl LineCtrl {
    /// Create and initialise a new controller.
    pub fn new(params: LineCtrlParams) -> Result<Self, LineCtrlError> {
        let mut ctrl = Self::default();
        ctrl.init(params)?;
        Ok(ctrl)
    }

    /// Archive the status report of every following tick into the session.
    pub fn archive_to(&mut self, session: &Session) -> Result<(), LineCtrlError> {
        self.arch_report = Archiver::from_path(session, "line_ctrl/status_report.csv")?;
        Ok(())
    }

    /// Current PID accumulators.
    pub fn pid_state(&self) -> PidState {
        self.pid
    }

    /// Status report of the last tick.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Update the accumulators with a new error and return the command.
    fn compute_command(&mut self, error: i32) -> f64 {
        // Parameters are validated in init, and this is only reached from
        // proc once they are set.
        let (k_p, k_i, k_d) = match self.params {
            Some(ref p) => (p.k_p, p.k_i, p.k_d),
            None => return 0.0,
        };

        self.pid.integral += error as i64;
        self.pid.derivative = error.saturating_sub(self.pid.last_error);
        self.pid.last_error = error;

        k_p * error as f64 + k_i * self.pid.integral as f64 + k_d * self.pid.derivative as f64
    }
}
