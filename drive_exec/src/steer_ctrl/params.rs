//! Parameters structure for SteerCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- LANE TRACKING ----
    /// Proportional gain of the CTE controller
    pub k_p: f64,

    /// Integral gain of the CTE controller
    pub k_i: f64,

    /// Derivative gain of the CTE controller
    pub k_d: f64,

    // ---- TURNING ----
    /// Steering command held during a left turn.
    pub left_turn_cmd: f64,

    /// Steering command held during a right turn.
    pub right_turn_cmd: f64,

    /// Change in heading commanded by a turn.
    ///
    /// Units: degrees
    pub turn_angle_deg: f64,

    /// A turn is complete once the heading is within this distance of the target.
    ///
    /// Units: degrees
    pub heading_tolerance_deg: f64,

    /// A turn is abandoned after this long.
    ///
    /// Units: seconds
    pub max_turn_duration_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.15,
            k_i: 0.0,
            k_d: 0.01,
            left_turn_cmd: -100.0,
            right_turn_cmd: 100.0,
            turn_angle_deg: 90.0,
            heading_tolerance_deg: 15.0,
            max_turn_duration_s: 3.0,
        }
    }
}
