//! # Actuator Executable
//!
//! This executable sits between the drive executable and the vehicle bus. It recieves one
//! actuator frame per control cycle, checks that it is well formed, and transmits it on the bus.
//!
//! The executable starts in safe mode and only leaves it once a frame has been transmitted.
//! Whenever no frame arrives within the frame timeout it returns to safe mode, transmitting the
//! safe frame once. Bus failures are reported back to the drive executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator server abstraction.
mod act_server;

/// Vehicle bus transceivers.
mod bus;

/// Frame validation and transmission.
mod gateway;

/// Parameters for the actuator executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use comms_if::eqpt::act::ActFrame;
use log::{info, warn};
use structopt::StructOpt;

// Internal
use act_server::ActServer;
use gateway::ActGateway;
use params::ActExecParams;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuator bus gateway
#[derive(Debug, StructOpt)]
#[structopt(name = "act_exec")]
struct Opt {
    /// Maximum level of log messages
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("act_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("WolfWagen Actuator Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: ActExecParams =
        util::params::load("act_exec.toml").wrap_err("Could not load params")?;

    info!("Parameters loaded");

    // ---- BUS INITIALISATION ----

    let bus = bus::open(&params.can_interface).wrap_err("Failed to open the bus")?;

    let mut gateway = ActGateway::new(
        bus,
        ActFrame {
            throttle_pwm: params.safe_throttle_pwm,
            steer_pwm: params.safe_steer_pwm,
        },
    );

    info!("Bus {} opened", params.can_interface);

    // ---- SERVER INITIALISATION ----

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut server = ActServer::new(&zmq_ctx, &params).wrap_err("Failed to initialise server")?;

    info!("Server initialised");

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop in safe mode");

    loop {
        let msg = match server.get_bus_msg() {
            Some(m) => m,
            None => {
                gateway.enter_safe_mode();
                continue;
            }
        };

        let response = gateway.handle_bus_msg(msg);

        if let Err(e) = server.send_response(response) {
            warn!("Couldn't send response to client: {}", e);
            gateway.enter_safe_mode();
        }
    }
}
