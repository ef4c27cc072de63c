//! # Follower Executable Parameters
//!
//! Parameters of every module of the follower executable, loaded from a
//! single TOML file. Missing tables and keys take their default values.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    box_search::BoxSearchParams, line_ctrl::LineCtrlParams, mnvr::MnvrParams,
    task_mgr::TaskMgrParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FollowerParams {
    pub ports: PortParams,
    pub line_ctrl: LineCtrlParams,
    pub mnvr: MnvrParams,
    pub box_search: BoxSearchParams,
    pub task_mgr: TaskMgrParams,
}

/// Names of the ports the equipment is bound to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortParams {
    pub left_motor: String,
    pub right_motor: String,
    pub gripper: String,
    pub left_color: String,
    pub right_color: String,
    pub touch: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PortParams {
    fn default() -> Self {
        Self {
            left_motor: "outA".into(),
            right_motor: "outB".into(),
            gripper: "outC".into(),
            left_color: "in3".into(),
            right_color: "in2".into(),
            touch: "in4".into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::ColorLabel;

    #[test]
    fn test_partial_file_takes_defaults() {
        let params: FollowerParams = util::params::from_str(
            r#"
            [line_ctrl]
            follower_speed = 20.0
            k_d = 0.05

            [task_mgr]
            box_field_color = "blue"

            [box_search.field]
            width = 3.0
            length = 5.0
            horizontal_steps = 4
            vertical_steps = 5
            "#,
        )
        .unwrap();

        assert_eq!(params.line_ctrl.follower_speed, 20.0);
        assert_eq!(params.line_ctrl.k_d, 0.05);
        assert_eq!(params.line_ctrl.white_threshold, 220);
        assert_eq!(params.task_mgr.box_field_color, ColorLabel::Blue);
        assert_eq!(params.task_mgr.return_color, ColorLabel::Black);
        assert_eq!(params.box_search.field.horizontal_steps, 4);
        assert_eq!(params.box_search.field.row_step(), 1.0);
        assert_eq!(params.box_search.drop_advance_units, 2.5);
        assert_eq!(params.mnvr.box_mode_speed, 15.0);
        assert_eq!(params.ports.touch, "in4");
    }

    #[test]
    fn test_shipped_params_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../params/follower_exec.toml");
        let params: FollowerParams = util::params::load_from_path(path).unwrap();

        assert_eq!(params.line_ctrl.follower_speed, 12.0);
        assert_eq!(params.line_ctrl.k_p, 0.1);
        assert_eq!(params.mnvr.gripper_speed, 10.0);
        assert_eq!(params.task_mgr.box_field_color, ColorLabel::Green);
        assert_eq!(params.ports.left_color, "in3");
        assert_eq!(params.box_search.field.num_cells(), 30);
    }
}
