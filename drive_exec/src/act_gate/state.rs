//! Implementation of the actuation gateway

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// Internal
use super::{ActGateError, Params, SafetyState};
use crate::steer_ctrl::VehicleMode;
use comms_if::{eqpt::act::ActFrame, tc::DriveMode};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Actuation gateway module state
#[derive(Debug, Clone)]
pub struct ActGate {
    params: Params,

    /// Override active on the previous cycle, used to only log changes.
    prev_override: Option<OverrideCause>,

    prev_drive_mode: Option<DriveMode>,
}

/// Operator and autonomous intents, integers in the logical range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub manual_throttle: i64,
    pub manual_steer: i64,

    /// Throttle used in autonomous mode
    pub auto_throttle: i64,
}

/// Input data to the actuation gateway.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    pub now: Instant,

    pub drive_mode: DriveMode,

    pub vehicle_mode: VehicleMode,

    pub intents: Intents,

    /// Steering command from SteerCtrl
    pub auto_steer_cmd: f64,

    pub safety: SafetyState,
}

/// Actuator command in PWM units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActCommand {
    pub throttle: i16,
    pub steer: i16,
}

/// Status report for ActGate processing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub drive_mode: DriveMode,
    pub vehicle_mode: VehicleMode,

    /// Selected throttle intent after clamping, before safety overrides
    pub throttle_intent: i64,

    /// Selected steering intent after clamping
    pub steer_intent: i64,

    /// Set when an obstacle is closer than the safe distance
    pub safe_distance_violation: bool,

    /// Set when a stop sign dwell is active, in either drive mode
    pub stop_sign_active: bool,

    /// Override applied to the throttle, if any
    pub override_cause: Option<OverrideCause>,

    /// Units: meters
    pub min_obstacle_distance_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reason for a neutral throttle override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverrideCause {
    Obstacle,
    StopSign,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ActGate {
    pub fn new(params: Params) -> Result<Self, ActGateError> {
        params.validate()?;

        Ok(Self {
            params,
            prev_override: None,
            prev_drive_mode: None,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Clamp an intent into the logical range.
    pub fn clamp_intent(&self, val: i64) -> i64 {
        val.max(self.params.in_min).min(self.params.in_max)
    }

    /// Map a logical intent onto the PWM range, clamping it first.
    pub fn pwm(&self, val: i64) -> i16 {
        let p = &self.params;
        let v = self.clamp_intent(val);

        // Validated ranges keep the result inside the output range, which fits in an i16
        (((v - p.in_min) * (p.out_max - p.out_min)).div_euclid(p.in_max - p.in_min) + p.out_min)
            as i16
    }

    /// Map a PWM value back into the logical range.
    ///
    /// Because `pwm` truncates, `pwm_inverse(pwm(v))` may be one less than `v`.
    pub fn pwm_inverse(&self, pwm: i16) -> i64 {
        let p = &self.params;

        ((pwm as i64 - p.out_min) * (p.in_max - p.in_min)).div_euclid(p.out_max - p.out_min)
            + p.in_min
    }

    /// Command with both throttle and steering at the centre of the logical range.
    pub fn neutral(&self) -> ActCommand {
        ActCommand {
            throttle: self.pwm(0),
            steer: self.pwm(0),
        }
    }

    /// Convert the steering command from SteerCtrl into an intent.
    fn auto_steer_intent(&self, cmd: f64) -> i64 {
        (cmd.trunc() as i64)
            .max(self.params.auto_steer_min)
            .min(self.params.auto_steer_max)
    }
}

impl State for ActGate {
    type InputData = InputData;
    type OutputData = ActCommand;
    type StatusReport = StatusReport;
    type ProcError = ActGateError;

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // ---- SOURCE SELECTION ----

        if self.prev_drive_mode != Some(input_data.drive_mode) {
            info!("Drive mode: {:?}", input_data.drive_mode);
            self.prev_drive_mode = Some(input_data.drive_mode);
        }

        let intents = &input_data.intents;
        let (throttle_intent, steer_intent) = match input_data.drive_mode {
            DriveMode::Manual => (intents.manual_throttle, intents.manual_steer),
            DriveMode::Auto => (
                intents.auto_throttle,
                self.auto_steer_intent(input_data.auto_steer_cmd),
            ),
        };
        let throttle_intent = self.clamp_intent(throttle_intent);
        let steer_intent = self.clamp_intent(steer_intent);

        // ---- SAFETY OVERRIDES ----

        let safety = &input_data.safety;
        let safe_distance_violation = safety.obstacle_too_close(self.params.safe_distance_m);
        let stop_sign_active = safety.stop_sign_active(input_data.now);

        // Stop signs only hold the vehicle in autonomous mode
        let override_cause = if safe_distance_violation {
            Some(OverrideCause::Obstacle)
        } else if stop_sign_active && input_data.drive_mode == DriveMode::Auto {
            Some(OverrideCause::StopSign)
        } else {
            None
        };

        if override_cause != self.prev_override {
            match override_cause {
                Some(OverrideCause::Obstacle) => warn!(
                    "Obstacle at {:.2} m, inside the safe distance of {:.2} m, holding throttle",
                    safety.min_obstacle_distance_m, self.params.safe_distance_m
                ),
                Some(OverrideCause::StopSign) => warn!("Stop sign, holding throttle"),
                None => info!("Throttle override cleared"),
            }
            self.prev_override = override_cause;
        }

        // ---- MAPPING ----

        let cmd = ActCommand {
            throttle: match override_cause {
                Some(_) => self.pwm(0),
                None => self.pwm(throttle_intent),
            },
            steer: self.pwm(steer_intent),
        };

        trace!("ActGate: {:?}", cmd);

        Ok((
            cmd,
            StatusReport {
                drive_mode: input_data.drive_mode,
                vehicle_mode: input_data.vehicle_mode,
                throttle_intent,
                steer_intent,
                safe_distance_violation,
                stop_sign_active,
                override_cause,
                min_obstacle_distance_m: safety.min_obstacle_distance_m,
            },
        ))
    }
}

impl ActCommand {
    /// The bus frame carrying this command.
    pub fn to_frame(&self) -> ActFrame {
        ActFrame {
            throttle_pwm: self.throttle,
            steer_pwm: self.steer,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
