//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Snapshot of the shared context
//!         - Drive control processing:
//!             - Sensor staleness check
//!             - Turn planning and lane estimation on new frames
//!             - Steering control
//!             - Actuation gateway
//!             - Actuator frame transmission, neutral on shutdown or failure
//!         - Telemetry
//!
//! Inputs are recieved in the background by the `InputClient`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use drive_lib::{
    act_client::ActClient,
    drive_ctrl::{DriveCtrl, DriveCycle, DriveParams},
    input_client::InputClient,
    params::DriveExecParams,
    shared_ctx::SharedCtx,
    tm_server::TmServer,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Lane keeping drive control
#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec")]
struct Opt {
    /// Maximum level of log messages
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Directory, relative to the software root, in which the session is created
    #[structopt(long, default_value = "sessions")]
    sessions_dir: String,

    /// Seed for the turn direction tie break, overrides the parameter file
    #[structopt(long)]
    seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("drive_exec", &opt.sessions_dir).wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("WolfWagen Drive Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: DriveExecParams =
        util::params::load("drive_exec.toml").wrap_err("Could not load exec params")?;
    let drive_params = DriveParams::load().wrap_err("Could not load module params")?;

    if !(exec_params.cycle_frequency_hz > 0.0) {
        return Err(eyre!(
            "Cycle frequency must be positive, found {}",
            exec_params.cycle_frequency_hz
        ));
    }
    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s());

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let shared = Arc::new(SharedCtx::new(
        Duration::from_secs_f64(drive_params.act_gate.stop_sign_dwell_s.max(0.0)),
        Duration::from_secs_f64(drive_params.act_gate.stop_sign_ignore_s.max(0.0)),
    ));

    let mut rng = match opt.seed.or(exec_params.rng_seed) {
        Some(s) => {
            info!("Turn direction RNG seeded with {}", s);
            StdRng::seed_from_u64(s)
        }
        None => StdRng::from_entropy(),
    };

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut act_client = {
        let c = ActClient::new(&zmq_ctx, &exec_params.net)
            .wrap_err("Failed to initialise ActClient")?;
        info!("ActClient initialised");
        c
    };

    let mut tm_server = {
        let s = TmServer::new(&zmq_ctx, &exec_params.net)
            .wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");
        s
    };

    let input_client = {
        let c = InputClient::new(&zmq_ctx, &exec_params.net, shared.clone())
            .wrap_err("Failed to initialise InputClient")?;
        info!("InputClient initialised");
        c
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    let mut drive_ctrl = DriveCtrl::new(
        drive_params,
        exec_params.cycle_period_s(),
        exec_params.sensor_timeout_s,
        Instant::now(),
    )
    .wrap_err("Failed to initialise DriveCtrl")?;

    info!("Begining main loop\n");

    loop {
        let cycle_start_instant = Instant::now();

        let snapshot = shared.snapshot();

        // ---- DRIVE CONTROL AND ACTUATION ----

        let output = match drive_ctrl
            .cycle(&snapshot, cycle_start_instant, &mut rng, &mut act_client)
            .wrap_err("Drive control stopped")?
        {
            DriveCycle::Running(o) => o,
            DriveCycle::Shutdown => break,
        };

        if let Some(t) = output.transition {
            session.save_with_timestamp("turns/transition.json", t);
        }

        // ---- TELEMETRY ----

        debug!(
            "{:?}/{:?} cte {:.1} steer {} ({:.2}) throttle {} pwm ({}, {}){}{}",
            output.tm.drive_mode,
            output.tm.vehicle_mode,
            output.tm.cte,
            output.tm.steer_intent,
            output.tm.auto_steer_cmd,
            output.tm.throttle_intent,
            output.tm.throttle_pwm,
            output.tm.steer_pwm,
            if output.tm.safe_distance_violation {
                " [obstacle]"
            } else {
                ""
            },
            if output.tm.stop_sign_active {
                " [stop sign]"
            } else {
                ""
            },
        );

        if let Err(e) = tm_server.send(&output.tm) {
            warn!("TmServer error: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    drop(input_client);
    session.exit();

    info!("End of execution");

    Ok(())
}
