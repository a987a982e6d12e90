//! # Telecommand module
//!
//! Drive telecommands are the operator's control inputs: the manual throttle and steering
//! intents, the autonomous speed setting, and the drive mode switch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A drive telecommand.
///
/// Intents are integers in the logical range `[-100, 100]`. Values outside the range are
/// accepted here and clamped by the actuation gateway.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriveTc {
    /// Set the manual throttle intent.
    ManualThrottle(i64),

    /// Set the manual steering intent.
    ManualSteer(i64),

    /// Set the throttle intent used in autonomous mode.
    AutoThrottle(i64),

    /// Toggle between manual and autonomous mode.
    ModeToggle,

    /// Set the mode explicitly, `0` for manual and `1` for autonomous.
    SetMode(i64),

    /// Operator stop: zero the manual throttle and switch to manual mode.
    Stop,

    /// Operator start: switch to autonomous mode.
    Start,

    /// Stop the control loop after one final neutral command.
    Shutdown,
}

/// Possible modes of the drive, selecting where the throttle and steering intents come from.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriveMode {
    /// Throttle and steering come directly from the operator
    Manual,

    /// Throttle from the autonomous speed setting, steering from lane keeping
    Auto,
}

/// Possible parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TcParseError {
    #[error("Drive mode flag must be 0 (manual) or 1 (auto), found {0}")]
    InvalidModeFlag(i64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Manual
    }
}

impl DriveMode {
    /// Parse the integer mode flag used by the operator controls.
    pub fn from_flag(flag: i64) -> Result<Self, TcParseError> {
        match flag {
            0 => Ok(DriveMode::Manual),
            1 => Ok(DriveMode::Auto),
            f => Err(TcParseError::InvalidModeFlag(f)),
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DriveMode::Manual => DriveMode::Auto,
            DriveMode::Auto => DriveMode::Manual,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_flag() {
        assert_eq!(DriveMode::from_flag(0), Ok(DriveMode::Manual));
        assert_eq!(DriveMode::from_flag(1), Ok(DriveMode::Auto));
        assert_eq!(
            DriveMode::from_flag(2),
            Err(TcParseError::InvalidModeFlag(2))
        );
        assert_eq!(DriveMode::Manual.toggled(), DriveMode::Auto);
        assert_eq!(DriveMode::Auto.toggled().toggled(), DriveMode::Auto);
    }

    #[test]
    fn test_tc_json() {
        let tc: DriveTc = serde_json::from_str(r#"{"ManualThrottle": -40}"#).unwrap();
        assert_eq!(tc, DriveTc::ManualThrottle(-40));

        let tc: DriveTc = serde_json::from_str(r#""ModeToggle""#).unwrap();
        assert_eq!(tc, DriveTc::ModeToggle);
    }
}
