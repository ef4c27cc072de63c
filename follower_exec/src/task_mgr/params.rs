//! Parameters structure for TaskMgr

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::color::ColorLabel;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for task sequencing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaskMgrParams {
    /// Marker colour at the entry of a box field, and of its boundary line.
    pub box_field_color: ColorLabel,

    /// Colour of the main line, followed back to after a box field.
    pub return_color: ColorLabel,

    /// Forward move past a field marker before turning towards the field.
    ///
    /// Units: field units
    pub box_entry_advance_units: f64,

    /// Forward move (negative to back off) from the field boundary into the
    /// field before turning around.
    ///
    /// Units: field units
    pub field_backoff_units: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TaskMgrParams {
    fn default() -> Self {
        Self {
            box_field_color: ColorLabel::Green,
            return_color: ColorLabel::Black,
            box_entry_advance_units: 1.2,
            field_backoff_units: -4.0,
        }
    }
}
