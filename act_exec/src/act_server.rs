//! # Actuator Server Module
//!
//! This module abstracts over the networking side of the actuator executable. The server accepts
//! a connection from the actuator client in the drive executable, recieves one bus message per
//! control cycle and answers each with an [`ActResponse`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::act::{ActResponse, BusMsg},
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::warn;

use crate::params::ActExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the networking part of the actuator executable.
pub struct ActServer {
    /// REP socket which accepts bus messages from the client
    frame_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`ActServer`]
#[derive(thiserror::Error, Debug)]
pub enum ActServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the response to the client: {0}")]
    SendError(JsonMsgError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActServer {
    /// Create a new instance of the actuator server.
    ///
    /// This function will not wait for a connection from the client before returning.
    pub fn new(ctx: &zmq::Context, params: &ActExecParams) -> Result<Self, ActServerError> {
        let frame_socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            recv_timeout: params.frame_timeout_ms,
            send_timeout: 10,
            ..Default::default()
        };

        let frame_socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            frame_socket_options,
            &params.frame_endpoint,
        )
        .map_err(ActServerError::SocketError)?;

        Ok(Self { frame_socket })
    }

    /// Retrieve a bus message from the client.
    ///
    /// The user MUST call [`ActServer::send_response`] for every message returned in order to
    /// notify the client. `None` is returned if no message arrived within the frame timeout.
    pub fn get_bus_msg(&mut self) -> Option<Result<BusMsg, JsonMsgError>> {
        match self.frame_socket.recv_json() {
            Ok(Some(m)) => Some(Ok(m)),
            Ok(None) => None,
            Err(e @ JsonMsgError::RecvError(_)) => {
                warn!("Could not read from the frame socket: {}", e);
                None
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Send a response to the client for the last recieved message.
    pub fn send_response(&mut self, response: ActResponse) -> Result<(), ActServerError> {
        self.frame_socket
            .send_json(&response)
            .map_err(ActServerError::SendError)
    }
}
