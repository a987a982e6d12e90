//! # Sensor Communications Module
//!
//! Orientation readings from the localisation collaborator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A timestamped orientation reading.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub struct HeadingMsg {
    /// UTC timestamp at which the reading was taken
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub heading: Heading,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An orientation.
///
/// Localisation may publish either an attitude quaternion (rotating the map frame into the
/// vehicle body frame) or a yaw angle which has already been converted.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum Heading {
    /// Yaw about the vertical axis in degrees, any range
    Yaw { deg: f64 },

    /// Unit quaternion attitude
    Quaternion { x: f64, y: f64, z: f64, w: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HeadingMsg {
    pub fn new(timestamp: DateTime<Utc>, heading: Heading) -> Self {
        Self { timestamp, heading }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
