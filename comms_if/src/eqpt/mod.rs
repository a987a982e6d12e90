//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with equipment servers/clients and
//! with the sensing collaborators of the drive core.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod sens;
pub mod vision;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tc::DriveTc;

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// A single message published to the drive executable's input socket.
///
/// Every asynchronous collaborator (imaging, localisation, obstacle sensing, sign detection and
/// the operator controls) publishes one of these variants as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputMsg {
    /// A new edge-filtered camera frame.
    Frame(vision::EdgeFrame),

    /// A new orientation reading.
    Heading(sens::HeadingMsg),

    /// Minimum distance to any obstacle, in meters.
    ObstacleDist { min_dist_m: f64 },

    /// Stop sign detection event.
    StopSign { detected: bool },

    /// An operator telecommand.
    Tc(DriveTc),
}
