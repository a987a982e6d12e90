//! # Bus Transceiver Module
//!
//! Provides a unified interface to the vehicle bus so the gateway logic does not depend on the
//! transceiver hardware. On Linux the bus is a SocketCAN interface.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::act::BusMsg;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for putting messages on the vehicle bus.
pub trait BusTransceiver {
    /// Transmit a single message, returning once the transceiver has accepted it.
    fn transmit(&mut self, msg: &BusMsg) -> Result<(), BusError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum BusError {
    #[error("Could not open the bus interface {0}: {1}")]
    OpenError(String, std::io::Error),

    #[error("Arbitration ID {0:#05x} is not a valid standard ID")]
    InvalidId(u16),

    #[error("Extended arbitration IDs are not supported")]
    ExtendedId,

    #[error("Could not write to the bus: {0}")]
    WriteError(std::io::Error),

    #[error("The bus is not supported on this platform")]
    Unsupported,
}

// ------------------------------------------------------------------------------------------------
// SOCKETCAN
// ------------------------------------------------------------------------------------------------

#[cfg(target_os = "linux")]
pub use self::can::CanBus;

#[cfg(target_os = "linux")]
mod can {
    use socketcan::{CanFrame, CanSocket, EmbeddedFrame, Socket, StandardId};

    use super::{BusError, BusTransceiver};
    use comms_if::eqpt::act::BusMsg;

    /// A SocketCAN interface, for example `can0`.
    ///
    /// The bitrate is a property of the interface and is set when the interface is brought up.
    pub struct CanBus {
        socket: CanSocket,
    }

    impl CanBus {
        pub fn open(interface: &str) -> Result<Self, BusError> {
            let socket = CanSocket::open(interface)
                .map_err(|e| BusError::OpenError(interface.to_string(), e))?;

            Ok(Self { socket })
        }
    }

    impl BusTransceiver for CanBus {
        fn transmit(&mut self, msg: &BusMsg) -> Result<(), BusError> {
            if msg.is_extended_id {
                return Err(BusError::ExtendedId);
            }

            let id = StandardId::new(msg.arbitration_id)
                .ok_or(BusError::InvalidId(msg.arbitration_id))?;
            let frame = CanFrame::new(id, &msg.data).ok_or(BusError::InvalidId(msg.arbitration_id))?;

            self.socket.write_frame(&frame).map_err(BusError::WriteError)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the bus interface with the given name.
#[cfg(target_os = "linux")]
pub fn open(interface: &str) -> Result<Box<dyn BusTransceiver>, BusError> {
    Ok(Box::new(CanBus::open(interface)?))
}

/// Open the bus interface with the given name.
#[cfg(not(target_os = "linux"))]
pub fn open(_interface: &str) -> Result<Box<dyn BusTransceiver>, BusError> {
    Err(BusError::Unsupported)
}

impl<T: BusTransceiver + ?Sized> BusTransceiver for Box<T> {
    fn transmit(&mut self, msg: &BusMsg) -> Result<(), BusError> {
        (**self).transmit(msg)
    }
}
