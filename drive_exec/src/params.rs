//! # Drive Executable Parameters
//!
//! This module provide parameters for the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::net::NetParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveExecParams {
    /// Rate of the control loop
    ///
    /// Units: hertz
    pub cycle_frequency_hz: f64,

    /// The loop stops if no frame or no heading arrives for this long.
    ///
    /// Units: seconds
    pub sensor_timeout_s: f64,

    /// Seed for the turn direction tie break, taken from the OS if not set
    pub rng_seed: Option<u64>,

    /// Network endpoints
    pub net: NetParams,
}

impl DriveExecParams {
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.cycle_frequency_hz
    }
}

impl Default for DriveExecParams {
    fn default() -> Self {
        Self {
            cycle_frequency_hz: 20.0,
            sensor_timeout_s: 3.0,
            rng_seed: None,
            net: NetParams::default(),
        }
    }
}
