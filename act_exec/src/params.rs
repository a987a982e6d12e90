//! # Actuator Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActExecParams {
    /// Endpoint the frame socket binds to
    pub frame_endpoint: String,

    /// The executable enters safe mode if no valid frame arrives within this time.
    ///
    /// Units: milliseconds
    pub frame_timeout_ms: i32,

    /// Name of the SocketCAN interface the actuator controller is on
    pub can_interface: String,

    /// Throttle demand transmitted on entering safe mode, in actuator PWM units
    pub safe_throttle_pwm: i16,

    /// Steering demand transmitted on entering safe mode, in actuator PWM units
    pub safe_steer_pwm: i16,
}

impl Default for ActExecParams {
    fn default() -> Self {
        Self {
            frame_endpoint: "tcp://*:5031".into(),
            frame_timeout_ms: 200,
            can_interface: "can0".into(),
            safe_throttle_pwm: 9831,
            safe_steer_pwm: 9831,
        }
    }
}
