//! # Lane Geometry Estimation
//!
//! Lane estimation takes the straight lines found in an edge-filtered camera frame, sorts them
//! into left and right lane boundaries by the sign of their slope, fits a single boundary to each
//! side and computes the cross track error (CTE) of the vehicle from the centre of the lane.
//!
//! Image coordinates have `y` growing downwards, so the near end of the lane is at
//! `y = image height` and the far end at `y = 0`.
//!
//! Lines can either come from the imaging collaborator along with the frame, or be extracted
//! from the frame by a [`LineDetector`], such as the [`HoughLines`] detector.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod hough;
mod line;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use hough::*;
pub use line::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A thresholded, edge-filtered 8 bit frame.
pub type EdgeImage = image::GrayImage;
