//! # Drive library.
//!
//! This library allows other crates in the workspace (and the integration tests and benchmarks)
//! to access items defined inside the drive crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Lane geometry estimation - converts the lines of an edge image into a cross track error
pub mod lane_est;

/// Intersection detection and turn planning - decides whether and where to turn
pub mod turn_plan;

/// Steering control - the lane tracking/turning state machine and the steering PID
pub mod steer_ctrl;

/// Actuation gateway - selects the command source, applies safety overrides and maps to PWM
pub mod act_gate;

/// Localisation - converts orientation readings into a heading
pub mod loc;

/// Shared context - the latest value of every asynchronous input
pub mod shared_ctx;

/// Drive control - runs the components above once per control cycle
pub mod drive_ctrl;

/// Input client - recieves sensor readings and telecommands into the shared context
pub mod input_client;

/// Actuator client - sends actuator frames to the actuator gateway executable
pub mod act_client;

/// Telemetry server - publishes the diagnostic stream
pub mod tm_server;

/// Drive executable parameters
pub mod params;
