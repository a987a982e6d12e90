//! # Drive Control
//!
//! Runs the lane estimator, turn planner, steering state machine and actuation gateway once per
//! control cycle on a snapshot of the shared context.
//!
//! Vision only runs on frames which have not been processed yet, so the loop can run faster than
//! the camera; the last CTE is held in between. No vision runs while turning.
//!
//! [`DriveCtrl::cycle`] also puts the command on the bus. When shutdown is requested, or the
//! cycle fails, a single neutral command is sent instead and the loop must stop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::{error, info, trace};
use rand::Rng;

use crate::{
    act_client::{ActBus, ActClientError},
    act_gate::{self, ActCommand, ActGate, ActGateError},
    lane_est::{self, HoughLines, LaneEst, LaneEstimate, LineDetector, LineSeg},
    shared_ctx::{CtxSnapshot, VisionFrame},
    steer_ctrl::{self, ModeTransition, SteerCtrl, VehicleMode},
    tm_server::TmPacket,
    turn_plan::{self, TurnPlanner, TurnSignal},
};
use util::{module::State, params::LoadError, session, time::elapsed_since};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of every component run by [`DriveCtrl`].
#[derive(Debug, Clone, Default)]
pub struct DriveParams {
    pub lane_est: lane_est::Params,
    pub turn_plan: turn_plan::Params,
    pub steer_ctrl: steer_ctrl::Params,
    pub act_gate: act_gate::Params,
}

/// See the module level documentation.
pub struct DriveCtrl {
    lane_est: LaneEst,
    detector: Box<dyn LineDetector + Send>,
    turn_planner: TurnPlanner,
    steer_ctrl: SteerCtrl,
    act_gate: ActGate,

    sensor_timeout: Duration,
    loop_start: Instant,

    /// Sequence number of the last frame processed by vision
    last_frame_seq: Option<u64>,

    /// Latest lane estimate
    lane: LaneEstimate,
}

/// Result of one control cycle.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    /// Command to put on the bus
    pub cmd: ActCommand,

    /// Diagnostics for this cycle
    pub tm: TmPacket,

    /// Vehicle mode change made this cycle
    pub transition: Option<ModeTransition>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Outcome of [`DriveCtrl::cycle`].
#[derive(Debug, Clone)]
pub enum DriveCycle {
    /// The command was transmitted, the loop continues.
    Running(CycleOutput),

    /// Shutdown was requested and the neutral command transmitted, the loop must stop.
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("No {sensor} recieved for {age_s:.2} s")]
    SensorStale { sensor: &'static str, age_s: f64 },

    #[error("Actuation gateway error: {0}")]
    ActGateError(ActGateError),

    #[error("Could not transmit the actuator command: {0}")]
    BusError(ActClientError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveParams {
    /// Load all component parameters from the parameter directory.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self {
            lane_est: util::params::load("lane_est.toml")?,
            turn_plan: util::params::load("turn_plan.toml")?,
            steer_ctrl: util::params::load("steer_ctrl.toml")?,
            act_gate: util::params::load("act_gate.toml")?,
        })
    }
}

impl DriveCtrl {
    /// Create the controller. `now` is the start of the control loop.
    pub fn new(
        params: DriveParams,
        cycle_period_s: f64,
        sensor_timeout_s: f64,
        now: Instant,
    ) -> Result<Self, DriveError> {
        Ok(Self {
            detector: Box::new(HoughLines::from_params(&params.lane_est)),
            lane_est: LaneEst::new(params.lane_est),
            turn_planner: TurnPlanner::new(params.turn_plan),
            steer_ctrl: SteerCtrl::new(params.steer_ctrl, cycle_period_s, now),
            act_gate: ActGate::new(params.act_gate).map_err(DriveError::ActGateError)?,
            sensor_timeout: Duration::from_secs_f64(sensor_timeout_s.max(0.0)),
            loop_start: now,
            last_frame_seq: None,
            lane: LaneEstimate::default(),
        })
    }

    /// Replace the line detector used for frames which arrive without lines.
    pub fn with_detector(mut self, detector: Box<dyn LineDetector + Send>) -> Self {
        self.detector = detector;
        self
    }

    pub fn steer_ctrl(&self) -> &SteerCtrl {
        &self.steer_ctrl
    }

    pub fn lane(&self) -> &LaneEstimate {
        &self.lane
    }

    /// The all neutral command.
    pub fn neutral(&self) -> ActCommand {
        self.act_gate.neutral()
    }

    /// Check that both the frame and the heading have been updated recently enough.
    ///
    /// Ages are measured from the later of the last arrival and the loop start.
    pub fn check_staleness(&self, snap: &CtxSnapshot, now: Instant) -> Result<(), DriveError> {
        let readings = [
            ("frame", snap.frame.as_ref().map(|f| f.received)),
            ("heading", snap.heading_deg.as_ref().map(|h| h.received)),
        ];

        for &(sensor, received) in readings.iter() {
            let since = match received {
                Some(r) if r > self.loop_start => r,
                _ => self.loop_start,
            };
            let age = elapsed_since(now, since);

            if age > self.sensor_timeout {
                return Err(DriveError::SensorStale {
                    sensor,
                    age_s: age.as_secs_f64(),
                });
            }
        }

        Ok(())
    }

    /// Run one control cycle.
    pub fn proc<R: Rng + ?Sized>(
        &mut self,
        snap: &CtxSnapshot,
        now: Instant,
        rng: &mut R,
    ) -> Result<CycleOutput, DriveError> {
        self.check_staleness(snap, now)?;

        // ---- VISION ----

        let mut signal = TurnSignal::none();

        if self.steer_ctrl.mode() == VehicleMode::TrackingLane {
            if let Some(ref frame) = snap.frame {
                if self.last_frame_seq != Some(frame.seq) {
                    self.last_frame_seq = Some(frame.seq);
                    signal = self.process_frame(&frame.value, now, rng);
                }
            }
        }

        // ---- STEERING ----

        let mut steer_report = None;
        let mut auto_steer_cmd = 0.0;

        if let Some(ref heading) = snap.heading_deg {
            let input = steer_ctrl::InputData {
                now,
                heading_deg: heading.value,
                signal,
                cte: self.lane.cte,
            };

            match self.steer_ctrl.proc(&input) {
                Ok((output, report)) => {
                    auto_steer_cmd = output.steer_cmd;
                    steer_report = Some(report);
                }
                Err(e) => error!("SteerCtrl error, commanding zero steer: {}", e),
            }
        }

        let transition = steer_report.and_then(|r| r.transition);

        // The lane estimate from before a turn no longer applies once the turn starts
        if let Some(ModeTransition::TurnStarted { .. }) = transition {
            self.lane = LaneEstimate::default();
        }

        // ---- ACTUATION ----

        let gate_input = act_gate::InputData {
            now,
            drive_mode: snap.drive_mode,
            vehicle_mode: self.steer_ctrl.mode(),
            intents: snap.intents,
            auto_steer_cmd,
            safety: snap.safety,
        };
        let (cmd, gate_report) = self
            .act_gate
            .proc(&gate_input)
            .map_err(DriveError::ActGateError)?;

        let tm = TmPacket {
            elapsed_s: session::get_elapsed_seconds(),
            drive_mode: gate_report.drive_mode,
            vehicle_mode: gate_report.vehicle_mode,
            throttle_intent: gate_report.throttle_intent,
            steer_intent: gate_report.steer_intent,
            auto_steer_cmd,
            throttle_pwm: cmd.throttle,
            steer_pwm: cmd.steer,
            cte: self.lane.cte,
            lane_status: self.lane.status,
            turn_signal: signal,
            heading_deg: snap.heading_deg.as_ref().map(|h| h.value),
            yaw_target_deg: steer_report.and_then(|r| r.yaw_target_deg),
            safe_distance_violation: gate_report.safe_distance_violation,
            stop_sign_active: gate_report.stop_sign_active,
            min_obstacle_distance_m: gate_report.min_obstacle_distance_m,
        };

        trace!("DriveCtrl: {:?}", tm);

        Ok(CycleOutput {
            cmd,
            tm,
            transition,
        })
    }

    /// Run one control cycle and transmit the command on `bus`.
    ///
    /// If shutdown has been requested or the cycle fails the neutral command is transmitted
    /// instead. A failed transmission of the cycle's command is returned as
    /// [`DriveError::BusError`] without further transmission.
    pub fn cycle<R: Rng + ?Sized>(
        &mut self,
        snap: &CtxSnapshot,
        now: Instant,
        rng: &mut R,
        bus: &mut dyn ActBus,
    ) -> Result<DriveCycle, DriveError> {
        if snap.shutdown {
            info!("Shutdown requested, sending neutral command");
            self.stop(bus).map_err(DriveError::BusError)?;
            return Ok(DriveCycle::Shutdown);
        }

        let output = match self.proc(snap, now, rng) {
            Ok(o) => o,
            Err(e) => {
                error!("{}, stopping", e);
                if let Err(be) = self.stop(bus) {
                    error!("Could not send the neutral command: {}", be);
                }
                return Err(e);
            }
        };

        bus.send_frame(&output.cmd.to_frame())
            .map_err(DriveError::BusError)?;

        Ok(DriveCycle::Running(output))
    }

    /// Transmit the neutral command.
    pub fn stop(&self, bus: &mut dyn ActBus) -> Result<(), ActClientError> {
        bus.send_frame(&self.neutral().to_frame())
    }

    /// Run the turn planner and, if no turn is signalled, the lane estimator on a new frame.
    fn process_frame<R: Rng + ?Sized>(
        &mut self,
        frame: &VisionFrame,
        now: Instant,
        rng: &mut R,
    ) -> TurnSignal {
        let signal =
            self.turn_planner
                .plan(&frame.image, now, self.steer_ctrl.last_turn_time(), rng);

        if !signal.is_turn() {
            let (width, height) = frame.image.dimensions();

            let detected: Vec<LineSeg>;
            let lines = match frame.lines {
                Some(ref l) => l.as_slice(),
                None => {
                    detected = self.detector.detect(&frame.image);
                    detected.as_slice()
                }
            };

            self.lane = self.lane_est.estimate(lines, width, height);
        }

        signal
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
