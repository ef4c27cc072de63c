//! # Box search module
//!
//! Boustrophedon search of the box field using the touch sensor, together
//! with the pickup and drop sequences. The search is dead reckoned: the robot
//! tracks how many rows and how far sideways it has moved and undoes both
//! before handing back to the line.
//!
//! States run `Idle -> Searching -> Found -> Returning -> Done`, with `Found`
//! skipped when the sweep ends without contact.

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
    eqpt::{self, DriveActuator, EqptError, Sensors},
    mnvr::{GripperAction, Maneuvers, Side},
    task_mgr::RobotTaskState,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A polled position in the field.
///
/// Rows count from the edge the robot enters the field by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
}

/// Record of a single search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchReport {
    /// Cells in the order they were polled.
    pub visited: Vec<Cell>,

    /// Cell at which the touch sensor was pressed, if any.
    pub found: Option<Cell>,
}

/// The box search state machine.
#[derive(Debug)]
pub struct BoxSearch {
    params: BoxSearchParams,
    state: BoxSearchState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in setting up the box search.
#[derive(Debug, thiserror::Error)]
pub enum BoxSearchError {
    #[error("Invalid field geometry: {0:?}")]
    InvalidField(FieldGeometry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoxSearchState {
    Idle,
    Searching {
        column: usize,
        direction: ScanDirection,
    },
    Found(Cell),
    Returning,
    Done,
}

/// Direction of travel along a column.
///
/// The robot enters the field backwards (touch sensor leading), so sweeping
/// away from the entry edge is a reverse move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanDirection {
    Away,
    Toward,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScanDirection {
    pub fn toggle(self) -> Self {
        match self {
            ScanDirection::Away => ScanDirection::Toward,
            ScanDirection::Toward => ScanDirection::Away,
        }
    }

    /// Sign of a forward move travelling in this direction.
    fn forward_sign(self) -> f64 {
        match self {
            ScanDirection::Away => -1.0,
            ScanDirection::Toward => 1.0,
        }
    }
}

impl BoxSearch {
    pub fn new(params: BoxSearchParams) -> Result<Self, BoxSearchError> {
        let field = params.field;
        if field.horizontal_steps == 0
            || field.vertical_steps == 0
            || !(field.width > 0.0)
            || !(field.length > 0.0)
        {
            return Err(BoxSearchError::InvalidField(field));
        }

        Ok(Self {
            params,
            state: BoxSearchState::Idle,
        })
    }

    pub fn state(&self) -> BoxSearchState {
        self.state
    }

    pub fn params(&self) -> &BoxSearchParams {
        &self.params
    }

    /// Sweep the field until the touch sensor is pressed, picking the box up
    /// if not already holding one.
    ///
    /// On return the robot is back at the entry edge, laterally centred, in
    /// the heading it started with. A search without contact is only logged.
    pub fn find_and_grab_box<A, S>(
        &mut self,
        mnvr: &mut Maneuvers<A>,
        sensors: &mut S,
        task: &mut RobotTaskState,
    ) -> Result<SearchReport, EqptError>
    where
        A: DriveActuator,
        S: Sensors,
    {
        let field = self.params.field;
        let row_step = field.row_step();
        let column_step = field.column_step();

        let mut report = SearchReport::default();

        // Offset right of the starting centre line, and rows from the entry
        // edge, used to undo the sweep afterwards
        let mut lateral_offset = 0.0;
        let mut row_pos: usize = 0;

        info!(
            "BoxSearch: sweeping {} columns of {} rows",
            field.horizontal_steps, field.vertical_steps
        );

        // Start from the left edge
        mnvr.move_lateral(field.width / 2.0, Side::Left)?;
        lateral_offset -= field.width / 2.0;

        let mut direction = ScanDirection::Away;

        'columns: for column in 0..field.horizontal_steps {
            self.transition(BoxSearchState::Searching { column, direction });

            for step in 0..field.vertical_steps {
                mnvr.move_forward(direction.forward_sign() * row_step)?;

                let row = match direction {
                    ScanDirection::Away => {
                        row_pos += 1;
                        step
                    }
                    ScanDirection::Toward => {
                        row_pos -= 1;
                        field.vertical_steps - 1 - step
                    }
                };
                let cell = Cell { column, row };
                report.visited.push(cell);

                if eqpt::touch_pressed(sensors) {
                    self.transition(BoxSearchState::Found(cell));
                    report.found = Some(cell);

                    if !task.holding_object {
                        self.grab_box(mnvr, task)?;
                    } else {
                        warn!("BoxSearch: contact at {:?} while already holding a box", cell);
                    }

                    break 'columns;
                }
            }

            // Move over to the next column, sweeping back the other way
            if column + 1 < field.horizontal_steps {
                mnvr.move_lateral(column_step, Side::Right)?;
                lateral_offset += column_step;
                direction = direction.toggle();
            }
        }

        self.transition(BoxSearchState::Returning);

        // Back to the entry edge
        if row_pos > 0 {
            mnvr.move_forward(row_pos as f64 * row_step)?;
        }

        // Back to the centre line
        if lateral_offset < 0.0 {
            mnvr.move_lateral(-lateral_offset, Side::Right)?;
        } else if lateral_offset > 0.0 {
            mnvr.move_lateral(lateral_offset, Side::Left)?;
        }

        match report.found {
            Some(cell) => info!(
                "BoxSearch: box found at {:?} after {} polls",
                cell,
                report.visited.len()
            ),
            None => warn!(
                "BoxSearch: no box found after sweeping all {} cells",
                report.visited.len()
            ),
        }

        self.transition(BoxSearchState::Done);

        Ok(report)
    }

    /// Close the gripper on the box in front of the touch sensor and lift it.
    pub fn grab_box<A: DriveActuator>(
        &mut self,
        mnvr: &mut Maneuvers<A>,
        task: &mut RobotTaskState,
    ) -> Result<(), EqptError> {
        info!("BoxSearch: grabbing box");

        mnvr.move_forward(self.params.grab_advance_units)?;
        mnvr.gripper(GripperAction::Lower)?;
        mnvr.move_forward(self.params.grab_backoff_units)?;
        mnvr.gripper(GripperAction::Raise)?;

        task.holding_object = true;

        Ok(())
    }

    /// Release the held box, which completes the task.
    pub fn put_box_down<A: DriveActuator>(
        &mut self,
        mnvr: &mut Maneuvers<A>,
        task: &mut RobotTaskState,
    ) -> Result<(), EqptError> {
        info!("BoxSearch: putting box down");

        mnvr.move_forward(self.params.drop_backoff_units)?;
        mnvr.gripper(GripperAction::Lower)?;
        mnvr.move_forward(self.params.drop_advance_units)?;
        mnvr.gripper(GripperAction::Raise)?;

        task.holding_object = false;
        task.task_done = true;
        self.transition(BoxSearchState::Done);

        Ok(())
    }

    fn transition(&mut self, new_state: BoxSearchState) {
        debug!("BoxSearch: {:?} -> {:?}", self.state, new_state);
        self.state = new_state;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cancel::CancelToken,
        mnvr::MnvrParams,
        sim::{DriveCmd, SimDrive, SimSensors},
    };

    fn setup(sensors: SimSensors) -> (BoxSearch, Maneuvers<SimDrive>, SimSensors, RobotTaskState) {
        let mnvr_params = MnvrParams::default();
        (
            BoxSearch::new(BoxSearchParams::default()).unwrap(),
            Maneuvers::new(SimDrive::new(&mnvr_params), mnvr_params, CancelToken::new()),
            sensors,
            RobotTaskState::default(),
        )
    }

    /// Every cell of the default field in sweep order.
    fn sweep_order() -> Vec<Cell> {
        let field = FieldGeometry::DEFAULT;
        let mut cells = Vec::new();
        for column in 0..field.horizontal_steps {
            let rows: Vec<usize> = if column % 2 == 0 {
                (0..field.vertical_steps).collect()
            } else {
                (0..field.vertical_steps).rev().collect()
            };
            for row in rows {
                cells.push(Cell { column, row });
            }
        }
        cells
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_contact_restores_pose() {
        let (mut search, mut mnvr, mut sensors, mut task) = setup(SimSensors::new());

        let report = search
            .find_and_grab_box(&mut mnvr, &mut sensors, &mut task)
            .unwrap();

        assert_eq!(report.found, None);
        assert_eq!(report.visited, sweep_order());
        assert_eq!(sensors.num_polls(), 30);
        assert!(!task.holding_object);
        assert!(!task.task_done);
        assert_eq!(search.state(), BoxSearchState::Done);

        // Back where it started
        let pose = mnvr.drive().pose();
        assert!(close(pose.x, 0.0), "x = {}", pose.x);
        assert!(close(pose.y, 0.0), "y = {}", pose.y);
        assert!(close(pose.heading_deg, 0.0), "heading = {}", pose.heading_deg);

        // The gripper never moved
        assert!(!mnvr
            .drive()
            .log()
            .iter()
            .any(|c| matches!(c, DriveCmd::Gripper { .. })));
    }

    #[test]
    fn test_contact_stops_sweep() {
        let order = sweep_order();

        // First column, middle of the second column, last cell
        for &poll in [3usize, 14, 29].iter() {
            let (mut search, mut mnvr, mut sensors, mut task) =
                setup(SimSensors::new().with_press_on_poll(poll));

            let report = search
                .find_and_grab_box(&mut mnvr, &mut sensors, &mut task)
                .unwrap();

            assert_eq!(report.visited, order[..=poll].to_vec());
            assert_eq!(report.found, Some(order[poll]));
            assert_eq!(sensors.num_polls(), poll + 1);
            assert!(task.holding_object);
            assert!(!task.task_done);
        }
    }

    #[test]
    fn test_grab_sequence() {
        let (mut search, mut mnvr, mut sensors, mut task) =
            setup(SimSensors::new().with_press_on_poll(0));

        search
            .find_and_grab_box(&mut mnvr, &mut sensors, &mut task)
            .unwrap();

        let grippers: Vec<DriveCmd> = mnvr
            .drive()
            .log()
            .iter()
            .copied()
            .filter(|c| matches!(c, DriveCmd::Gripper { .. }))
            .collect();
        assert_eq!(
            grippers,
            vec![
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

        // Laterally re-centred and facing the original way
        let pose = mnvr.drive().pose();
        assert!(close(pose.x, 0.0), "x = {}", pose.x);
        assert!(close(pose.heading_deg, 0.0));
    }

    #[test]
    fn test_contact_while_holding_does_not_grab() {
        let (mut search, mut mnvr, mut sensors, mut task) =
            setup(SimSensors::new().with_press_on_poll(5));
        task.holding_object = true;

        let report = search
            .find_and_grab_box(&mut mnvr, &mut sensors, &mut task)
            .unwrap();

        assert_eq!(report.found, Some(Cell { column: 0, row: 5 }));
        assert!(task.holding_object);
        assert!(!mnvr
            .drive()
            .log()
            .iter()
            .any(|c| matches!(c, DriveCmd::Gripper { .. })));
    }

    #[test]
    fn test_put_box_down() {
        let (mut search, mut mnvr, _, mut task) = setup(SimSensors::new());
        task.holding_object = true;

        search.put_box_down(&mut mnvr, &mut task).unwrap();

        assert!(!task.holding_object);
        assert!(task.task_done);
        assert_eq!(search.state(), BoxSearchState::Done);

        // Back off 1, open, advance 2.5, close
        let pose = mnvr.drive().pose();
        assert!(close(pose.y, 1.5));
    }

    #[test]
    fn test_cancel_mid_search() {
        let (mut search, mut mnvr, mut sensors, mut task) = setup(SimSensors::new());
        mnvr.cancel_token().cancel();

        assert!(matches!(
            search.find_and_grab_box(&mut mnvr, &mut sensors, &mut task),
            Err(EqptError::Cancelled)
        ));
        assert_eq!(sensors.num_polls(), 0);
        assert!(!task.holding_object);
    }

    #[test]
    fn test_invalid_field() {
        let params = BoxSearchParams {
            field: FieldGeometry {
                vertical_steps: 0,
                ..FieldGeometry::DEFAULT
            },
            ..Default::default()
        };
        assert!(matches!(
            BoxSearch::new(params),
            Err(BoxSearchError::InvalidField(_))
        ));
    }

    #[test]
    fn test_scan_direction_toggle() {
        assert_eq!(ScanDirection::Away.toggle(), ScanDirection::Toward);
        assert_eq!(ScanDirection::Away.toggle().toggle(), ScanDirection::Away);
    }
}
