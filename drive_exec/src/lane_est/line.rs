//! Line segments and the line detection interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::vision::LineSpec;
use serde::Serialize;

use super::EdgeImage;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance either side of the closest point to the origin at which the endpoints of a polar
/// line are placed.
///
/// Units: pixels
pub const POLAR_LINE_HALF_LENGTH_PX: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line through two points in image coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct LineSeg {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can find straight lines in an edge image.
pub trait LineDetector {
    /// Detect all lines in the given edge image.
    fn detect(&self, edge: &EdgeImage) -> Vec<LineSeg>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSeg {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a segment from the polar form `x cos(theta) + y sin(theta) = rho`.
    ///
    /// The endpoints are placed [`POLAR_LINE_HALF_LENGTH_PX`] either side of the point on the
    /// line closest to the origin, truncated to integer pixels.
    pub fn from_polar(rho: f64, theta: f64) -> Self {
        let (b, a) = theta.sin_cos();
        let x0 = a * rho;
        let y0 = b * rho;

        Self {
            x1: (x0 - POLAR_LINE_HALF_LENGTH_PX * b) as i32,
            y1: (y0 + POLAR_LINE_HALF_LENGTH_PX * a) as i32,
            x2: (x0 + POLAR_LINE_HALF_LENGTH_PX * b) as i32,
            y2: (y0 - POLAR_LINE_HALF_LENGTH_PX * a) as i32,
        }
    }

    /// Slope `dy/dx` of the line, or `None` if the line is vertical.
    pub fn slope(&self) -> Option<f64> {
        if self.x2 == self.x1 {
            None
        } else {
            Some((self.y2 - self.y1) as f64 / (self.x2 - self.x1) as f64)
        }
    }
}

impl From<&LineSpec> for LineSeg {
    fn from(spec: &LineSpec) -> Self {
        match *spec {
            LineSpec::Endpoints { x1, y1, x2, y2 } => Self::new(x1, y1, x2, y2),
            LineSpec::Polar { rho, theta } => Self::from_polar(rho, theta),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_slope() {
        assert_eq!(LineSeg::new(50, 400, 120, 100).slope(), Some(-300.0 / 70.0));
        assert_eq!(LineSeg::new(600, 400, 520, 100).slope(), Some(300.0 / 80.0));
        assert_eq!(LineSeg::new(10, 0, 10, 100).slope(), None);
    }

    #[test]
    fn test_from_polar() {
        // Vertical line x = 100
        let seg = LineSeg::from_polar(100.0, 0.0);
        assert_eq!(seg, LineSeg::new(100, 1000, 100, -1000));

        // Horizontal line y = 50, endpoints are truncated towards zero
        let seg = LineSeg::from(&LineSpec::Polar {
            rho: 50.0,
            theta: FRAC_PI_2,
        });
        assert!((seg.y1 - 50).abs() <= 1);
        assert!((seg.y2 - 50).abs() <= 1);
        assert!(seg.x1 <= -999 && seg.x2 >= 999);
    }
}
