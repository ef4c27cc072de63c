//! # Task manager module
//!
//! Top level sequencing of the robot. Follows the main line until a box field
//! marker is seen on one side, then enters that field to either search for
//! and pick up the box, or drop the box already being carried. Runs until the
//! box has been delivered or the operator cancels.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
pub use params::*;

use crate::{
    box_search::{BoxSearch, BoxSearchError},
    cancel::CancelToken,
    color::ColorLabel,
    eqpt::{ColorPort, DriveActuator, EqptError, SensorFrame, Sensors},
    line_ctrl::{LineCtrl, LineCtrlError},
    mnvr::{Maneuvers, Side, HALF_TURN_DEG, QUARTER_TURN_DEG},
    params::FollowerParams,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Progress of the overall task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RobotTaskState {
    /// The gripper is carrying the box.
    pub holding_object: bool,

    /// The box has been delivered.
    pub task_done: bool,
}

/// The task manager, owning all equipment and sub-controllers.
pub struct TaskMgr<A: DriveActuator, S: Sensors> {
    params: TaskMgrParams,

    mnvr: Maneuvers<A>,
    sensors: S,

    line_ctrl: LineCtrl,
    box_search: BoxSearch,

    task: RobotTaskState,
    num_fields: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which stop the task.
#[derive(Debug, thiserror::Error)]
pub enum TaskMgrError {
    #[error("Equipment error: {0}")]
    Eqpt(#[from] EqptError),

    #[error("Line control error: {0}")]
    LineCtrl(#[from] LineCtrlError),

    #[error("Box search error: {0}")]
    BoxSearch(#[from] BoxSearchError),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The box was delivered.
    Done,

    /// The operator cancelled the run.
    Cancelled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: DriveActuator, S: Sensors> TaskMgr<A, S> {
    pub fn new(
        params: &FollowerParams,
        drive: A,
        sensors: S,
        cancel: CancelToken,
    ) -> Result<Self, TaskMgrError> {
        Ok(Self {
            params: params.task_mgr.clone(),
            mnvr: Maneuvers::new(drive, params.mnvr.clone(), cancel),
            sensors,
            line_ctrl: LineCtrl::new(params.line_ctrl.clone())?,
            box_search: BoxSearch::new(params.box_search.clone())?,
            task: RobotTaskState::default(),
            num_fields: 0,
        })
    }

    /// Run the task to completion.
    ///
    /// The drive is stopped on every exit path. Operator cancellation is not
    /// an error and returns `RunOutcome::Cancelled`.
    pub fn run(&mut self) -> Result<RunOutcome, TaskMgrError> {
        info!(
            "TaskMgr: starting, looking for {:?} fields",
            self.params.box_field_color
        );

        let result = self.run_until_done();

        // Always halt, whatever ended the loop
        let stop_result = self.mnvr.stop();

        match result {
            Ok(()) => {
                stop_result?;
                info!(
                    "TaskMgr: task complete after {} box fields",
                    self.num_fields
                );
                Ok(RunOutcome::Done)
            }
            Err(TaskMgrError::Eqpt(EqptError::Cancelled)) => {
                if let Err(e) = stop_result {
                    warn!("TaskMgr: could not stop the drive after cancellation: {}", e);
                }
                warn!("TaskMgr: cancelled by the operator");
                Ok(RunOutcome::Cancelled)
            }
            Err(e) => {
                if let Err(stop_err) = stop_result {
                    warn!("TaskMgr: could not stop the drive after error: {}", stop_err);
                }
                Err(e)
            }
        }
    }

    /// Perform one line following tick: read both sensors, run the PID and
    /// apply the wheel demands. The frame is returned for colour checks.
    pub fn follow_line(&mut self) -> Result<SensorFrame, TaskMgrError> {
        self.mnvr.cancel_token().check()?;

        let frame = SensorFrame::acquire(&mut self.sensors);
        let (dems, _) = self.line_ctrl.proc(&frame)?;
        self.mnvr.set_speeds(dems)?;

        Ok(frame)
    }

    /// Follow the line until both sensors see one of `colors`.
    ///
    /// A match on a single sensor is not enough, so a marker beside the line
    /// does not stop the robot.
    pub fn line_follow_until_color(&mut self, colors: &[ColorLabel]) -> Result<(), TaskMgrError> {
        debug!("TaskMgr: following line until {:?}", colors);

        loop {
            let frame = self.follow_line()?;

            if let Some(color) = colors.iter().find(|c| frame.both_match(**c)) {
                info!("TaskMgr: reached {:?}", color);
                return Ok(());
            }
        }
    }

    /// Enter the box field on the side the marker was seen, search or drop,
    /// and come back onto the main line heading the way the robot was going.
    pub fn handle_the_box(&mut self, side: Side) -> Result<(), TaskMgrError> {
        self.num_fields += 1;
        info!(
            "TaskMgr: box field {} on the {:?}, holding: {}",
            self.num_fields, side, self.task.holding_object
        );

        let field_color = self.params.box_field_color;
        let return_color = self.params.return_color;

        // Branch onto the field boundary line and follow it to the field
        self.mnvr.move_forward(self.params.box_entry_advance_units)?;
        self.mnvr.turn_degrees(QUARTER_TURN_DEG, side)?;
        self.line_follow_until_color(&[field_color])?;

        // Back into the field with the touch sensor leading
        self.mnvr.move_forward(self.params.field_backoff_units)?;
        self.mnvr.turn_degrees(HALF_TURN_DEG, Side::Right)?;

        if self.task.holding_object {
            self.box_search.put_box_down(&mut self.mnvr, &mut self.task)?;
        } else {
            let report = self.box_search.find_and_grab_box(
                &mut self.mnvr,
                &mut self.sensors,
                &mut self.task,
            )?;
            debug!("TaskMgr: search visited {:?}", report.visited);
        }

        // Back to the main line, resuming the original direction of travel
        self.line_follow_until_color(&[return_color])?;
        self.mnvr.move_forward(self.params.box_entry_advance_units)?;
        self.mnvr.turn_degrees(QUARTER_TURN_DEG, side)?;

        info!("TaskMgr: back on the main line, {:?}", self.task);

        Ok(())
    }

    pub fn task_state(&self) -> RobotTaskState {
        self.task
    }

    pub fn maneuvers(&self) -> &Maneuvers<A> {
        &self.mnvr
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn line_ctrl(&self) -> &LineCtrl {
        &self.line_ctrl
    }

    pub fn line_ctrl_mut(&mut self) -> &mut LineCtrl {
        &mut self.line_ctrl
    }

    fn run_until_done(&mut self) -> Result<(), TaskMgrError> {
        while !self.task.task_done {
            let frame = self.follow_line()?;

            let color = self.params.box_field_color;
            let side = if frame.matches(ColorPort::Left, color) {
                Side::Left
            } else if frame.matches(ColorPort::Right, color) {
                Side::Right
            } else {
                continue;
            };

            self.handle_the_box(side)?;
        }

        Ok(())
    }
}
