//! # Actuator Bus Frame
//!
//! The actuator controller on the vehicle bus expects a single fixed-size frame per control cycle:
//!
//! | bytes | type  | content                   |
//! |-------|-------|---------------------------|
//! | 0..2  | `i16` | throttle PWM demand       |
//! | 2..4  | `i16` | steering PWM demand       |
//! | 4..8  | `u32` | reserved, always zero     |
//!
//! All fields are big-endian.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Arbitration identifier of the actuator frame on the bus (standard, non-extended ID).
pub const ACT_FRAME_ID: u16 = 0x001;

/// Length of the actuator frame payload in bytes.
pub const ACT_FRAME_LEN: usize = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuator demands as sent over the vehicle bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActFrame {
    /// Throttle demand in actuator PWM units
    pub throttle_pwm: i16,

    /// Steering demand in actuator PWM units
    pub steer_pwm: i16,
}

/// A raw bus message, the arbitration ID plus the encoded payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMsg {
    pub arbitration_id: u16,

    pub is_extended_id: bool,

    pub data: [u8; ACT_FRAME_LEN],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the actuator gateway for a transmitted frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActResponse {
    /// Frame was put on the bus
    FrameOk,

    /// Frame was malformed and has been rejected
    FrameInvalid,

    /// The bus itself is unavailable
    BusUnavailable,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActFrameError {
    #[error("Expected an actuator frame of 8 bytes, found {0}")]
    InvalidLength(usize),

    #[error("Reserved bytes of the actuator frame must be zero, found {0:#010x}")]
    ReservedNotZero(u32),

    #[error("Unexpected arbitration ID {0:#05x}")]
    UnexpectedId(u16),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActFrame {
    /// Encode the frame into its big-endian wire representation.
    pub fn to_bytes(&self) -> [u8; ACT_FRAME_LEN] {
        let mut buf = [0u8; ACT_FRAME_LEN];
        BigEndian::write_i16(&mut buf[0..2], self.throttle_pwm);
        BigEndian::write_i16(&mut buf[2..4], self.steer_pwm);
        BigEndian::write_u32(&mut buf[4..8], 0);
        buf
    }

    /// Decode a frame from its wire representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ActFrameError> {
        if bytes.len() != ACT_FRAME_LEN {
            return Err(ActFrameError::InvalidLength(bytes.len()));
        }

        let reserved = BigEndian::read_u32(&bytes[4..8]);
        if reserved != 0 {
            return Err(ActFrameError::ReservedNotZero(reserved));
        }

        Ok(Self {
            throttle_pwm: BigEndian::read_i16(&bytes[0..2]),
            steer_pwm: BigEndian::read_i16(&bytes[2..4]),
        })
    }

    /// Wrap the frame into a bus message with the actuator arbitration ID.
    pub fn to_bus_msg(&self) -> BusMsg {
        BusMsg {
            arbitration_id: ACT_FRAME_ID,
            is_extended_id: false,
            data: self.to_bytes(),
        }
    }
}

impl BusMsg {
    /// Extract the actuator frame from this message, checking the arbitration ID.
    pub fn to_act_frame(&self) -> Result<ActFrame, ActFrameError> {
        if self.arbitration_id != ACT_FRAME_ID || self.is_extended_id {
            return Err(ActFrameError::UnexpectedId(self.arbitration_id));
        }

        ActFrame::from_bytes(&self.data)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
