//! # Actuation Gateway
//!
//! The gateway is the last stage before the actuators. It selects the throttle and steering
//! intents from the operator or from the autonomous stack depending on the drive mode, applies
//! the safety overrides, and maps the intents onto the PWM range of the actuator controller.
//!
//! Safety overrides only ever affect the throttle, in order of precedence:
//!
//! 1. An obstacle closer than the safe distance forces a neutral throttle.
//! 2. An active stop sign dwell forces a neutral throttle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod safety;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use safety::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the actuation gateway.
#[derive(Debug, thiserror::Error)]
pub enum ActGateError {
    #[error("Invalid input range [{0}, {1}], the minimum must be less than the maximum")]
    InvalidInputRange(i64, i64),

    #[error(
        "Invalid output range [{0}, {1}], the minimum must be less than the maximum and both \
        must fit in a 16 bit signed integer"
    )]
    InvalidOutputRange(i64, i64),
}
