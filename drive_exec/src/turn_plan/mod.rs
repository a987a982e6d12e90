//! # Intersection Detection and Turn Planning
//!
//! At an intersection the lane boundary on one or both sides of the vehicle disappears. The
//! planner looks at two flank regions of the edge image, one on each side; a flank with almost no
//! edge pixels is considered open. If a flank is open the planner signals a turn towards it, if
//! both are open a direction is chosen at random.
//!
//! Checks are debounced so that the vehicle does not immediately turn again after completing a
//! turn. The time of the last turn is owned by `SteerCtrl` and passed in.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod planner;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use planner::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Output of the planner for a single frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSignal {
    pub direction: TurnDir,

    /// Bit field of open flanks, `1` for the left flank and `2` for the right flank.
    pub is_at_intersection: u8,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of a turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDir {
    None,
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnSignal {
    /// A signal which requests no turn.
    pub fn none() -> Self {
        Self {
            direction: TurnDir::None,
            is_at_intersection: 0,
        }
    }

    pub fn is_turn(&self) -> bool {
        self.direction != TurnDir::None
    }
}

impl Default for TurnSignal {
    fn default() -> Self {
        Self::none()
    }
}

impl Default for TurnDir {
    fn default() -> Self {
        TurnDir::None
    }
}
