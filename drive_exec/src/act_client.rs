//! # Actuator Client
//!
//! This module provides the link from the control loop to the actuator bus. The loop only sees
//! the [`ActBus`] trait; in the vehicle the frames go to the actuator gateway executable
//! (`act_exec`) through an [`ActClient`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::act::{ActFrame, ActResponse},
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can put actuator frames on the vehicle bus.
pub trait ActBus {
    /// Transmit a single frame, returning once the bus has accepted it.
    fn send_frame(&mut self, frame: &ActFrame) -> Result<(), ActClientError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client of the actuator gateway.
pub struct ActClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ActClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("Could not exchange the frame with the server: {0}")]
    MsgError(JsonMsgError),

    #[error("The server did not respond")]
    NoResponse,

    #[error("The server rejected the frame: {0:?}")]
    Rejected(ActResponse),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActClient {
    /// Create a new instance of the actuator client.
    ///
    /// Blocks until the gateway is connected, or fails after the connect timeout.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, ActClientError> {
        let socket_options = SocketOptions {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 20,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::REQ, socket_options, &params.act_endpoint)
            .map_err(ActClientError::SocketError)?;

        Ok(Self { socket })
    }
}

impl ActBus for ActClient {
    /// Send the frame to the gateway and wait for it to acknowledge the transmission.
    fn send_frame(&mut self, frame: &ActFrame) -> Result<(), ActClientError> {
        if !self.socket.connected() {
            return Err(ActClientError::NotConnected);
        }

        self.socket
            .send_json(&frame.to_bus_msg())
            .map_err(ActClientError::MsgError)?;

        match self.socket.recv_json().map_err(ActClientError::MsgError)? {
            Some(ActResponse::FrameOk) => Ok(()),
            Some(r) => Err(ActClientError::Rejected(r)),
            None => Err(ActClientError::NoResponse),
        }
    }
}
