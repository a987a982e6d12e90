//! Implementation of the steering state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, trace};
use serde::Serialize;
use std::time::Instant;

// Internal
use super::{ModeTransition, Params, PidController, PidState, SteerCtrlError, VehicleMode};
use crate::turn_plan::{TurnDir, TurnSignal};
use util::{
    maths::{ang_dist_deg, wrap_deg_360},
    module::State,
    time::elapsed_since,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering control module state
#[derive(Debug, Clone)]
pub struct SteerCtrl {
    params: Params,

    pid: PidController,

    /// The turn in progress, `None` while tracking the lane.
    turn: Option<Turn>,

    /// Start time of the last turn, or the creation time if no turn has been made yet.
    last_turn_time: Instant,
}

/// A blind turn in progress.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Turn {
    pub direction: TurnDir,

    /// Units: degrees, in `[0, 360)`
    pub yaw_target_deg: f64,

    pub start: Instant,
}

/// Input data to steering control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    pub now: Instant,

    /// Current heading of the vehicle.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Turn signal from the latest processed frame, [`TurnSignal::none`] if no frame was
    /// processed this cycle.
    pub signal: TurnSignal,

    /// Latest cross track error.
    ///
    /// Units: pixels
    pub cte: f64,
}

/// Output steering command.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OutputData {
    /// Steering command, negative to the left. Lane tracking commands are not clamped here.
    pub steer_cmd: f64,
}

/// Status report for SteerCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Mode after processing
    pub mode: VehicleMode,

    /// Mode change which occured during processing
    pub transition: Option<ModeTransition>,

    pub yaw_target_deg: Option<f64>,

    /// Absolute angular distance between the heading and the turn target at the start of
    /// processing
    pub heading_err_deg: Option<f64>,

    /// Set if a turn without a direction was found. The steering command is zero in that case.
    pub invalid_direction: bool,

    pub pid: PidState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerCtrl {
    /// Create a new controller evaluated every `cycle_period_s` seconds.
    ///
    /// `now` is taken as the time of the last turn, so no turn is made before the planner's
    /// cooldown has elapsed after startup.
    pub fn new(params: Params, cycle_period_s: f64, now: Instant) -> Self {
        let pid = PidController::new(params.k_p, params.k_i, params.k_d, cycle_period_s);

        Self {
            params,
            pid,
            turn: None,
            last_turn_time: now,
        }
    }

    pub fn mode(&self) -> VehicleMode {
        match self.turn {
            Some(_) => VehicleMode::Turning,
            None => VehicleMode::TrackingLane,
        }
    }

    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    pub fn last_turn_time(&self) -> Instant {
        self.last_turn_time
    }

    pub fn pid_state(&self) -> PidState {
        self.pid.state()
    }

    /// Start a turn in the given direction from the current heading, returning the target yaw.
    pub fn start_turn(&mut self, direction: TurnDir, heading_deg: f64, now: Instant) -> f64 {
        let yaw_target_deg = match direction {
            TurnDir::Left => wrap_deg_360(heading_deg + self.params.turn_angle_deg),
            TurnDir::Right => wrap_deg_360(heading_deg - self.params.turn_angle_deg),
            TurnDir::None => wrap_deg_360(heading_deg),
        };

        self.pid.reset();
        self.turn = Some(Turn {
            direction,
            yaw_target_deg,
            start: now,
        });
        self.last_turn_time = now;

        info!(
            "Turning {:?} from {:.1} deg to {:.1} deg",
            direction, heading_deg, yaw_target_deg
        );

        yaw_target_deg
    }

    /// Steering command held while turning in the given direction.
    fn turn_cmd(&self, direction: TurnDir) -> Option<f64> {
        match direction {
            TurnDir::Left => Some(self.params.left_turn_cmd),
            TurnDir::Right => Some(self.params.right_turn_cmd),
            TurnDir::None => None,
        }
    }

    /// End the current turn if it is complete, returning the transition.
    fn check_turn_end(
        &mut self,
        heading_deg: f64,
        now: Instant,
        report: &mut StatusReport,
    ) -> Option<ModeTransition> {
        let turn = self.turn?;

        let heading_err_deg = ang_dist_deg(heading_deg, turn.yaw_target_deg).abs();
        let elapsed_s = elapsed_since(now, turn.start).as_secs_f64();
        report.heading_err_deg = Some(heading_err_deg);

        let transition = if heading_err_deg < self.params.heading_tolerance_deg {
            ModeTransition::TurnCompleted {
                heading_deg,
                elapsed_s,
            }
        } else if elapsed_s > self.params.max_turn_duration_s {
            ModeTransition::TurnTimedOut {
                heading_deg,
                elapsed_s,
            }
        } else {
            return None;
        };

        self.turn = None;
        self.pid.reset();

        info!("Turn ended after {:.2} s: {:?}", elapsed_s, transition);

        Some(transition)
    }
}

impl State for SteerCtrl {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !input_data.cte.is_finite() {
            return Err(SteerCtrlError::NonFiniteCte(input_data.cte));
        }
        if !input_data.heading_deg.is_finite() {
            return Err(SteerCtrlError::NonFiniteHeading(input_data.heading_deg));
        }

        let mut report = StatusReport::default();

        // ---- TURN EXIT ----

        let turn_end = self.check_turn_end(input_data.heading_deg, input_data.now, &mut report);
        report.transition = turn_end;

        // ---- COMMAND ----

        let steer_cmd = match self.turn {
            Some(turn) => match self.turn_cmd(turn.direction) {
                Some(c) => c,
                None => {
                    error!("Turning without a direction, commanding zero steer");
                    report.invalid_direction = true;
                    0.0
                }
            },
            None if input_data.signal.is_turn() => {
                let direction = input_data.signal.direction;
                let yaw_target_deg =
                    self.start_turn(direction, input_data.heading_deg, input_data.now);

                report.transition = Some(ModeTransition::TurnStarted {
                    direction,
                    heading_deg: input_data.heading_deg,
                    yaw_target_deg,
                });

                self.turn_cmd(direction).unwrap_or(0.0)
            }
            None => self.pid.get(0.0 - input_data.cte),
        };

        report.mode = self.mode();
        report.yaw_target_deg = self.turn.map(|t| t.yaw_target_deg);
        report.pid = self.pid.state();

        trace!("SteerCtrl: {:?}, steer {:.2}", report.mode, steer_cmd);

        Ok((OutputData { steer_cmd }, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    const DT: f64 = 0.05;

    fn input(now: Instant, heading_deg: f64, direction: TurnDir, cte: f64) -> InputData {
        InputData {
            now,
            heading_deg,
            signal: TurnSignal {
                direction,
                is_at_intersection: 0,
            },
            cte,
        }
    }

    #[test]
    fn test_tracking() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);

        let (out, report) = sc.proc(&input(start, 0.0, TurnDir::None, 10.0)).unwrap();

        // error = -10, derivative = -10 / 0.05
        assert!((out.steer_cmd - (0.15 * -10.0 + 0.01 * -200.0)).abs() < 1e-9);
        assert_eq!(report.mode, VehicleMode::TrackingLane);
        assert!(report.transition.is_none());
        assert_eq!(sc.last_turn_time(), start);
    }

    #[test]
    fn test_turn_start_resets_pid() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);

        for i in 0..5 {
            sc.proc(&input(start + Duration::from_millis(50 * i), 0.0, TurnDir::None, 40.0))
                .unwrap();
        }
        assert!(sc.pid_state() != PidState::default());

        let now = start + Duration::from_secs(6);
        let (out, report) = sc.proc(&input(now, 350.0, TurnDir::Left, 40.0)).unwrap();

        assert_eq!(out.steer_cmd, -100.0);
        assert_eq!(report.mode, VehicleMode::Turning);
        assert_eq!(report.yaw_target_deg, Some(80.0));
        assert_eq!(sc.pid_state(), PidState::default());
        assert_eq!(sc.last_turn_time(), now);
        assert!(matches!(
            report.transition,
            Some(ModeTransition::TurnStarted {
                direction: TurnDir::Left,
                ..
            })
        ));
    }

    #[test]
    fn test_turn_complete() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);

        // Right turn through north
        let target = sc.start_turn(TurnDir::Right, 10.0, start);
        assert_eq!(target, 280.0);

        // Still turning, turn signals are ignored
        let t1 = start + Duration::from_millis(500);
        let (out, report) = sc.proc(&input(t1, 320.0, TurnDir::Left, 0.0)).unwrap();
        assert_eq!(out.steer_cmd, 100.0);
        assert_eq!(report.mode, VehicleMode::Turning);
        assert_eq!(report.heading_err_deg, Some(40.0));

        // Within tolerance, back to tracking with a fresh controller in the same cycle
        let t2 = start + Duration::from_millis(1000);
        let (out, report) = sc.proc(&input(t2, 275.0, TurnDir::None, 20.0)).unwrap();
        assert_eq!(report.mode, VehicleMode::TrackingLane);
        assert!(matches!(
            report.transition,
            Some(ModeTransition::TurnCompleted { .. })
        ));

        let mut fresh = PidController::new(0.15, 0.0, 0.01, DT);
        assert_eq!(out.steer_cmd, fresh.get(-20.0));
        assert!(sc.turn().is_none());
    }

    #[test]
    fn test_turn_timeout() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);
        sc.start_turn(TurnDir::Left, 0.0, start);

        let (_, report) = sc
            .proc(&input(start + Duration::from_secs(3), 0.0, TurnDir::None, 0.0))
            .unwrap();
        assert_eq!(report.mode, VehicleMode::Turning);

        let (_, report) = sc
            .proc(&input(
                start + Duration::from_millis(3050),
                0.0,
                TurnDir::None,
                0.0,
            ))
            .unwrap();
        assert_eq!(report.mode, VehicleMode::TrackingLane);
        assert!(matches!(
            report.transition,
            Some(ModeTransition::TurnTimedOut { .. })
        ));
        assert_eq!(sc.pid_state().integral, 0.0);
    }

    #[test]
    fn test_invalid_direction() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);
        sc.start_turn(TurnDir::None, 100.0, start);

        let (out, report) = sc
            .proc(&input(
                start + Duration::from_millis(50),
                200.0,
                TurnDir::None,
                0.0,
            ))
            .unwrap();

        assert_eq!(out.steer_cmd, 0.0);
        assert!(report.invalid_direction);
        assert_eq!(report.mode, VehicleMode::Turning);
    }

    #[test]
    fn test_non_finite_inputs() {
        let start = Instant::now();
        let mut sc = SteerCtrl::new(Params::default(), DT, start);

        assert!(sc
            .proc(&input(start, 0.0, TurnDir::None, f64::NAN))
            .is_err());
        assert!(sc
            .proc(&input(start, f64::INFINITY, TurnDir::None, 0.0))
            .is_err());
    }
}
