//! # Actuator Gateway
//!
//! Validates the bus messages recieved from the drive executable and puts them on the bus. The
//! gateway starts in safe mode and leaves it once a frame has been transmitted. It enters safe
//! mode again when no frame arrives within the frame timeout, when the client can't be answered,
//! or when the bus refuses a frame. On entering safe mode the safe frame is transmitted once so
//! the actuator controller is left at neutral.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::act::{ActFrame, ActResponse, BusMsg},
    net::JsonMsgError,
};
use log::{error, info, trace, warn};

use crate::bus::BusTransceiver;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ActGateway<T: BusTransceiver> {
    bus: T,

    /// Frame transmitted on entering safe mode
    safe_frame: ActFrame,

    safe_mode: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: BusTransceiver> ActGateway<T> {
    /// Create a new gateway in safe mode. Nothing is transmitted until the first frame arrives.
    pub fn new(bus: T, safe_frame: ActFrame) -> Self {
        Self {
            bus,
            safe_frame,
            safe_mode: true,
        }
    }

    pub fn safe_mode(&self) -> bool {
        self.safe_mode
    }

    /// Handle a message from the client, returning the response to send back.
    pub fn handle_bus_msg(&mut self, msg: Result<BusMsg, JsonMsgError>) -> ActResponse {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Rejecting malformed message: {}", e);
                return ActResponse::FrameInvalid;
            }
        };

        let frame = match msg.to_act_frame() {
            Ok(f) => f,
            Err(e) => {
                warn!("Rejecting invalid frame: {}", e);
                return ActResponse::FrameInvalid;
            }
        };

        trace!(
            "Transmitting throttle {} steer {}: {:02x?}",
            frame.throttle_pwm,
            frame.steer_pwm,
            msg.data
        );

        match self.bus.transmit(&msg) {
            Ok(()) => {
                if self.safe_mode {
                    info!("Frame transmitted, exiting safe mode");
                    self.safe_mode = false;
                }
                ActResponse::FrameOk
            }
            Err(e) => {
                error!("Bus transmission failed: {}", e);
                self.enter_safe_mode();
                ActResponse::BusUnavailable
            }
        }
    }

    /// Enter safe mode, transmitting the safe frame if not already in safe mode.
    pub fn enter_safe_mode(&mut self) {
        if self.safe_mode {
            return;
        }

        warn!("Entering safe mode");
        self.safe_mode = true;

        if let Err(e) = self.bus.transmit(&self.safe_frame.to_bus_msg()) {
            error!("Could not transmit the safe frame: {}", e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
