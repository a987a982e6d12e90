//! Parameters structure for LaneEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lane estimation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- LINE CLASSIFICATION ----
    /// Lines with an absolute slope (`dy/dx`) below this value are treated as horizontal and
    /// rejected.
    pub slope_threshold: f64,

    // ---- FALLBACKS ----
    /// Magnitude of the CTE reported when only one lane boundary is visible. Positive when the
    /// left boundary is missing, negative when the right one is.
    ///
    /// Units: pixels
    pub missing_side_cte: f64,

    // ---- LINE DETECTION ----
    /// Distance resolution of the Hough accumulator.
    ///
    /// Units: pixels
    pub hough_rho_res_px: f64,

    /// Angle resolution of the Hough accumulator.
    ///
    /// Units: degrees
    pub hough_theta_res_deg: f64,

    /// Minimum number of votes a line needs in the Hough accumulator to be detected.
    pub hough_threshold: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            slope_threshold: 0.2,
            missing_side_cte: 500.0,
            hough_rho_res_px: 1.0,
            hough_theta_res_deg: 1.0,
            hough_threshold: 150,
        }
    }
}
