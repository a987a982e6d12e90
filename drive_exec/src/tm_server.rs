//! # TM Server
//!
//! Publishes one [`TmPacket`] per control cycle for the operator display and for logging tools.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::{lane_est::LaneStatus, steer_ctrl::VehicleMode, turn_plan::TurnSignal};
use comms_if::{
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tc::DriveMode,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Clone, Serialize)]
pub struct TmPacket {
    /// Time since the start of the session
    pub elapsed_s: f64,

    pub drive_mode: DriveMode,

    pub vehicle_mode: VehicleMode,

    /// Selected throttle intent, before safety overrides
    pub throttle_intent: i64,

    pub steer_intent: i64,

    /// Raw steering command from SteerCtrl
    pub auto_steer_cmd: f64,

    pub throttle_pwm: i16,

    pub steer_pwm: i16,

    pub cte: f64,

    pub lane_status: LaneStatus,

    pub turn_signal: TurnSignal,

    pub heading_deg: Option<f64>,

    pub yaw_target_deg: Option<f64>,

    pub safe_distance_violation: bool,

    pub stop_sign_active: bool,

    /// Infinite (serialised as `null`) if no obstacle has been reported
    pub min_obstacle_distance_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(JsonMsgError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        Ok(Self { socket })
    }

    pub fn send(&mut self, packet: &TmPacket) -> Result<(), TmServerError> {
        self.socket
            .send_json(packet)
            .map_err(TmServerError::SendError)
    }
}
