//! # Localisation module
//!
//! The drive core does not localise itself; it only needs the heading of the vehicle, which the
//! localisation collaborator publishes either directly as a yaw angle or as an attitude
//! quaternion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Quaternion, UnitQuaternion};

use comms_if::eqpt::sens::Heading;
use util::maths::wrap_deg_360;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LocError {
    #[error("Heading reading is not finite: {0:?}")]
    NonFinite(Heading),

    #[error("Attitude quaternion has zero norm")]
    ZeroQuaternion,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the heading in degrees, in `[0, 360)`, from an orientation reading.
///
/// For a quaternion the heading is the yaw (rotation about the vertical axis) of its roll, pitch,
/// yaw decomposition. The quaternion is normalised first.
pub fn heading_deg(heading: &Heading) -> Result<f64, LocError> {
    let yaw_deg = match *heading {
        Heading::Yaw { deg } => deg,
        Heading::Quaternion { x, y, z, w } => {
            let q = Quaternion::new(w, x, y, z);
            if q.norm() == 0.0 {
                return Err(LocError::ZeroQuaternion);
            }

            let (_roll, _pitch, yaw) = UnitQuaternion::from_quaternion(q).euler_angles();
            yaw.to_degrees()
        }
    };

    if !yaw_deg.is_finite() {
        return Err(LocError::NonFinite(*heading));
    }

    Ok(wrap_deg_360(yaw_deg))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
