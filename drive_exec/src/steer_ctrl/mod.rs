//! # Steering Control
//!
//! Steering control owns the vehicle mode. While tracking the lane it steers with a PID
//! controller on the cross track error. When the turn planner signals a turn it switches into a
//! blind turn, commanding a fixed full-lock steer until the heading has rotated by a quarter turn
//! or the turn has taken too long, after which it returns to tracking the lane.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::turn_plan::TurnDir;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Steering mode of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum VehicleMode {
    TrackingLane,
    Turning,
}

/// A change of [`VehicleMode`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum ModeTransition {
    /// A turn has been started.
    TurnStarted {
        direction: TurnDir,
        heading_deg: f64,
        yaw_target_deg: f64,
    },

    /// The heading reached the turn target.
    TurnCompleted { heading_deg: f64, elapsed_s: f64 },

    /// The turn took longer than the maximum duration.
    TurnTimedOut { heading_deg: f64, elapsed_s: f64 },
}

/// Errors which can occur during SteerCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("The cross track error is not finite: {0}")]
    NonFiniteCte(f64),

    #[error("The heading is not finite: {0}")]
    NonFiniteHeading(f64),
}

impl Default for VehicleMode {
    fn default() -> Self {
        VehicleMode::TrackingLane
    }
}
