//! End to end scenarios of the drive control cycle, from the shared context to the bus frame.

use std::time::{Duration, Instant};

use chrono::Utc;
use image::Luma;
use rand::{rngs::StdRng, SeedableRng};

use comms_if::{
    eqpt::{
        act::{ActFrame, ActResponse},
        sens::{Heading, HeadingMsg},
        InputMsg,
    },
    tc::{DriveMode, DriveTc},
};
use drive_lib::{
    act_client::{ActBus, ActClientError},
    drive_ctrl::{DriveCtrl, DriveCycle, DriveError, DriveParams},
    input_client::handle_input_msg,
    lane_est::{EdgeImage, LineSeg},
    shared_ctx::{SharedCtx, VisionFrame},
    steer_ctrl::{ModeTransition, VehicleMode},
    turn_plan::TurnDir,
};

const DT: f64 = 0.05;

/// Bus which records every frame sent.
#[derive(Default)]
struct RecordingBus(Vec<ActFrame>);

impl ActBus for RecordingBus {
    fn send_frame(&mut self, frame: &ActFrame) -> Result<(), ActClientError> {
        self.0.push(*frame);
        Ok(())
    }
}

/// Bus whose gateway reports the bus as unavailable.
struct UnavailableBus;

impl ActBus for UnavailableBus {
    fn send_frame(&mut self, _frame: &ActFrame) -> Result<(), ActClientError> {
        Err(ActClientError::Rejected(ActResponse::BusUnavailable))
    }
}

const NEUTRAL: ActFrame = ActFrame {
    throttle_pwm: 9831,
    steer_pwm: 9831,
};

fn shared() -> SharedCtx {
    SharedCtx::new(Duration::from_millis(1500), Duration::from_secs(5))
}

/// 640x400 frame containing the given lines, drawn between rows 100 and 400.
fn lane_frame(lines: &[LineSeg]) -> VisionFrame {
    let mut image = EdgeImage::new(640, 400);

    for l in lines {
        for y in 100..400 {
            let x = l.x1 + (y - l.y1) * (l.x2 - l.x1) / (l.y2 - l.y1);
            image.put_pixel(x as u32, y as u32, Luma([255]));
        }
    }

    VisionFrame {
        image,
        lines: Some(lines.to_vec()),
    }
}

#[test]
fn test_lane_keeping() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut bus = RecordingBus::default();
    let ctx = shared();

    ctx.apply_tc(DriveTc::AutoThrottle(30));
    ctx.apply_tc(DriveTc::Start);

    // Well past the turn cooldown so the intersection check runs
    let now = start + Duration::from_secs(6);
    ctx.set_frame(
        lane_frame(&[
            LineSeg::new(50, 400, 120, 100),
            LineSeg::new(600, 400, 520, 100),
        ]),
        now,
    );
    ctx.set_heading_deg(0.0, now);

    let out = ctrl.proc(&ctx.snapshot(), now, &mut rng).unwrap();
    bus.send_frame(&out.cmd.to_frame()).unwrap();

    assert!(out.transition.is_none());
    assert_eq!(out.tm.turn_signal.direction, TurnDir::None);
    assert_eq!(out.tm.vehicle_mode, VehicleMode::TrackingLane);
    assert_eq!(out.tm.drive_mode, DriveMode::Auto);
    assert!(out.tm.cte >= -5.0 && out.tm.cte <= -4.0);

    // Small correction to the right
    assert!(out.tm.steer_intent >= 0 && out.tm.steer_intent <= 2);

    // Throttle intent 30 maps to PWM 10814
    let bytes = bus.0[0].to_bytes();
    assert_eq!(bus.0[0].throttle_pwm, 10814);
    assert_eq!(&bytes[0..2], &10814i16.to_be_bytes());
    assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
}

#[test]
fn test_intersection_turn() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let ctx = shared();
    ctx.apply_tc(DriveTc::Start);

    // Nothing on either flank
    let t1 = start + Duration::from_secs(6);
    ctx.set_frame(
        VisionFrame {
            image: EdgeImage::new(1280, 720),
            lines: None,
        },
        t1,
    );
    ctx.set_heading_deg(30.0, t1);

    let out = ctrl.proc(&ctx.snapshot(), t1, &mut rng).unwrap();

    assert_eq!(out.tm.turn_signal.is_at_intersection, 3);
    assert_eq!(out.tm.vehicle_mode, VehicleMode::Turning);

    let (direction, yaw_target_deg) = match out.transition {
        Some(ModeTransition::TurnStarted {
            direction,
            yaw_target_deg,
            ..
        }) => (direction, yaw_target_deg),
        t => panic!("Expected a turn to start, got {:?}", t),
    };

    match direction {
        TurnDir::Left => {
            assert_eq!(yaw_target_deg, 120.0);
            assert_eq!(out.cmd.steer, 6554);
        }
        TurnDir::Right => {
            assert_eq!(yaw_target_deg, 300.0);
            assert_eq!(out.cmd.steer, 13075);
        }
        TurnDir::None => panic!("Turn started without a direction"),
    }
    assert_eq!(ctrl.steer_ctrl().pid_state().integral, 0.0);
    assert_eq!(ctrl.steer_ctrl().last_turn_time(), t1);

    // Heading still short of the target, keep turning
    let t2 = t1 + Duration::from_millis(500);
    ctx.set_heading_deg(30.0, t2);
    let out = ctrl.proc(&ctx.snapshot(), t2, &mut rng).unwrap();
    assert_eq!(out.tm.vehicle_mode, VehicleMode::Turning);
    assert!(out.transition.is_none());

    // Heading reaches the target
    let t3 = t2 + Duration::from_millis(50);
    ctx.set_heading_deg(yaw_target_deg, t3);
    let out = ctrl.proc(&ctx.snapshot(), t3, &mut rng).unwrap();
    assert_eq!(out.tm.vehicle_mode, VehicleMode::TrackingLane);
    assert!(matches!(
        out.transition,
        Some(ModeTransition::TurnCompleted { .. })
    ));
    assert_eq!(ctrl.steer_ctrl().pid_state().integral, 0.0);
    assert_eq!(out.tm.steer_intent, 0);
}

#[test]
fn test_stop_sign_and_obstacle() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let ctx = shared();

    let heading = HeadingMsg::new(Utc::now(), Heading::Yaw { deg: 90.0 });
    handle_input_msg(&ctx, InputMsg::Heading(heading), start).unwrap();
    handle_input_msg(&ctx, InputMsg::Tc(DriveTc::SetMode(1)), start).unwrap();
    handle_input_msg(&ctx, InputMsg::Tc(DriveTc::AutoThrottle(50)), start).unwrap();

    let moving = ctrl.proc(&ctx.snapshot(), start, &mut rng).unwrap();
    assert_eq!(moving.cmd.throttle, 11469);

    handle_input_msg(&ctx, InputMsg::StopSign { detected: true }, start).unwrap();

    let held = ctrl
        .proc(&ctx.snapshot(), start + Duration::from_millis(1400), &mut rng)
        .unwrap();
    assert_eq!(held.cmd.throttle, 9831);
    assert!(held.tm.stop_sign_active);

    // A second sign inside the ignore window does not extend the hold
    handle_input_msg(
        &ctx,
        InputMsg::StopSign { detected: true },
        start + Duration::from_secs(2),
    )
    .unwrap();
    ctx.set_heading_deg(90.0, start + Duration::from_secs(2));
    let released = ctrl
        .proc(&ctx.snapshot(), start + Duration::from_secs(2), &mut rng)
        .unwrap();
    assert_eq!(released.cmd.throttle, 11469);

    handle_input_msg(
        &ctx,
        InputMsg::ObstacleDist { min_dist_m: 0.2 },
        start + Duration::from_secs(2),
    )
    .unwrap();
    let blocked = ctrl
        .proc(&ctx.snapshot(), start + Duration::from_secs(2), &mut rng)
        .unwrap();
    assert_eq!(blocked.cmd.throttle, 9831);
    assert!(blocked.tm.safe_distance_violation);
}

#[test]
fn test_stale_heading_stops() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let mut bus = RecordingBus::default();
    let ctx = shared();

    ctx.set_frame(lane_frame(&[]), start);
    ctx.set_heading_deg(0.0, start);
    ctx.set_frame(lane_frame(&[]), start + Duration::from_secs(3));

    let result = ctrl.cycle(
        &ctx.snapshot(),
        start + Duration::from_millis(3500),
        &mut rng,
        &mut bus,
    );
    match result {
        Err(DriveError::SensorStale { sensor, .. }) => assert_eq!(sensor, "heading"),
        r => panic!("Expected a stale heading, got {:?}", r),
    }

    // Only the neutral command goes out
    assert_eq!(bus.0, vec![NEUTRAL]);
}

#[test]
fn test_shutdown_sends_one_neutral() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let mut bus = RecordingBus::default();
    let ctx = shared();

    ctx.apply_tc(DriveTc::ManualThrottle(80));
    ctx.set_heading_deg(0.0, start);

    let out = ctrl.cycle(&ctx.snapshot(), start, &mut rng, &mut bus).unwrap();
    assert!(matches!(out, DriveCycle::Running(_)));
    assert_eq!(bus.0.len(), 1);
    assert_eq!(bus.0[0].throttle_pwm, 12452);

    handle_input_msg(&ctx, InputMsg::Tc(DriveTc::Shutdown), start).unwrap();
    let out = ctrl
        .cycle(
            &ctx.snapshot(),
            start + Duration::from_millis(50),
            &mut rng,
            &mut bus,
        )
        .unwrap();
    assert!(matches!(out, DriveCycle::Shutdown));

    // The manual throttle is not applied, just the neutral command
    assert_eq!(bus.0.len(), 2);
    assert_eq!(bus.0[1], NEUTRAL);
}

#[test]
fn test_bus_failure_is_fatal() {
    let start = Instant::now();
    let mut ctrl = DriveCtrl::new(DriveParams::default(), DT, 3.0, start).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let ctx = shared();

    ctx.set_heading_deg(0.0, start);

    let result = ctrl.cycle(&ctx.snapshot(), start, &mut rng, &mut UnavailableBus);
    assert!(matches!(
        result,
        Err(DriveError::BusError(ActClientError::Rejected(
            ActResponse::BusUnavailable
        )))
    ));
}
