//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the drive software: the messages fed into
//! the control core by its collaborators, the drive telecommands, and the actuator bus frame.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive telecommands (manual controls, mode switching)
pub mod tc;

/// Command and data definitions for equipment (vision, sensors, actuator bus)
pub mod eqpt;

/// Network module
pub mod net;
