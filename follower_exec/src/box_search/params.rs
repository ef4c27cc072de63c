//! Parameters structure for BoxSearch

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Size of the search field and how finely it is swept.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FieldGeometry {
    /// Units: field units
    pub width: f64,

    /// Units: field units
    pub length: f64,

    /// Number of columns swept across the width.
    pub horizontal_steps: usize,

    /// Number of touch sensor polls along each column.
    pub vertical_steps: usize,
}

/// Parameters for the box search and drop sequences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoxSearchParams {
    pub field: FieldGeometry,

    /// Forward move onto the box before closing the gripper.
    ///
    /// Units: field units
    pub grab_advance_units: f64,

    /// Forward move (negative to back off) between closing the gripper and
    /// raising it to carry.
    ///
    /// Units: field units
    pub grab_backoff_units: f64,

    /// Forward move (negative to back off) before opening the gripper to
    /// drop the box.
    ///
    /// Units: field units
    pub drop_backoff_units: f64,

    /// Forward move clear of the dropped box before raising the gripper.
    ///
    /// Units: field units
    pub drop_advance_units: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FieldGeometry {
    pub const DEFAULT: FieldGeometry = FieldGeometry {
        width: 4.0,
        length: 4.0,
        horizontal_steps: 3,
        vertical_steps: 10,
    };

    /// Distance between two touch sensor polls along a column.
    pub fn row_step(&self) -> f64 {
        self.length / self.vertical_steps as f64
    }

    /// Distance between two columns.
    pub fn column_step(&self) -> f64 {
        self.width / self.horizontal_steps as f64
    }

    pub fn num_cells(&self) -> usize {
        self.horizontal_steps * self.vertical_steps
    }
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Default for BoxSearchParams {
    fn default() -> Self {
        Self {
            field: FieldGeometry::DEFAULT,
            grab_advance_units: 2.0,
            grab_backoff_units: -1.0,
            drop_backoff_units: -1.0,
            drop_advance_units: 2.5,
        }
    }
}
