//! The parameter files shipped with the software load and match the built in defaults.

use drive_lib::{act_gate, lane_est, params::DriveExecParams, steer_ctrl, turn_plan};
use util::params::load_from_path;

fn path(file: &str) -> String {
    format!("{}/../params/{}", env!("CARGO_MANIFEST_DIR"), file)
}

#[test]
fn test_params_files() {
    let exec: DriveExecParams = load_from_path(path("drive_exec.toml")).unwrap();
    assert_eq!(exec.cycle_frequency_hz, 20.0);
    assert_eq!(exec.sensor_timeout_s, 3.0);
    assert_eq!(exec.rng_seed, None);
    assert_eq!(exec.net.act_endpoint, "tcp://localhost:5031");

    let lane: lane_est::Params = load_from_path(path("lane_est.toml")).unwrap();
    assert_eq!(lane.missing_side_cte, 500.0);
    assert_eq!(lane.hough_threshold, 150);

    let turn: turn_plan::Params = load_from_path(path("turn_plan.toml")).unwrap();
    let defaults = turn_plan::Params::default();
    assert_eq!(turn.left_flank, defaults.left_flank);
    assert_eq!(turn.right_flank, defaults.right_flank);
    assert_eq!(turn.openness_threshold, 1000);

    let steer: steer_ctrl::Params = load_from_path(path("steer_ctrl.toml")).unwrap();
    assert_eq!((steer.k_p, steer.k_i, steer.k_d), (0.15, 0.0, 0.01));

    let gate: act_gate::Params = load_from_path(path("act_gate.toml")).unwrap();
    assert!(gate.validate().is_ok());
    assert_eq!(gate.auto_steer_max, 99);
}
