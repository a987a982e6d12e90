//! Standard Hough transform line detector

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use super::{EdgeImage, LineDetector, LineSeg, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Detects infinite lines in an edge image using the standard (non-probabilistic) Hough
/// transform.
///
/// Every non-zero pixel votes for all `(rho, theta)` lines passing through it. Accumulator cells
/// with more than `threshold` votes which are also local maxima are reported, strongest first.
#[derive(Debug, Clone)]
pub struct HoughLines {
    /// Units: pixels
    pub rho_res_px: f64,

    /// Units: radians
    pub theta_res_rad: f64,

    pub threshold: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HoughLines {
    pub fn new(rho_res_px: f64, theta_res_deg: f64, threshold: u32) -> Self {
        Self {
            rho_res_px,
            theta_res_rad: theta_res_deg.to_radians(),
            threshold,
        }
    }

    /// Create a detector configured by the lane estimation parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.hough_rho_res_px,
            params.hough_theta_res_deg,
            params.hough_threshold,
        )
    }

    /// Detect lines, returning them in polar form `(rho, theta)`, theta in radians in `[0, pi)`.
    pub fn detect_polar(&self, edge: &EdgeImage) -> Vec<(f64, f64)> {
        let (width, height) = edge.dimensions();

        if width == 0 || height == 0 || !(self.rho_res_px > 0.0) || !(self.theta_res_rad > 0.0) {
            return Vec::new();
        }

        let num_angle = ((PI / self.theta_res_rad).round() as usize).max(1);
        let num_rho = ((((width + height) * 2 + 1) as f64) / self.rho_res_px).round() as usize;

        // The accumulator has a border of one cell on every side so that the local maximum
        // check never needs bounds checks.
        let stride = num_rho + 2;
        let mut accum = vec![0u32; (num_angle + 2) * stride];

        let trig: Vec<(f64, f64)> = (0..num_angle)
            .map(|n| {
                let theta = n as f64 * self.theta_res_rad;
                (theta.cos() / self.rho_res_px, theta.sin() / self.rho_res_px)
            })
            .collect();
        let rho_offset = (num_rho as i64 - 1) / 2;

        // ---- VOTING ----

        for (x, y, px) in edge.enumerate_pixels() {
            if px.0[0] == 0 {
                continue;
            }

            for (n, (cos, sin)) in trig.iter().enumerate() {
                let r = (x as f64 * cos + y as f64 * sin).round() as i64 + rho_offset;

                if r >= 0 && (r as usize) < num_rho {
                    accum[(n + 1) * stride + r as usize + 1] += 1;
                }
            }
        }

        // ---- PEAK FINDING ----

        let mut peaks = Vec::new();

        for n in 0..num_angle {
            for r in 0..num_rho {
                let base = (n + 1) * stride + r + 1;
                let votes = accum[base];

                if votes > self.threshold
                    && votes > accum[base - 1]
                    && votes >= accum[base + 1]
                    && votes > accum[base - stride]
                    && votes >= accum[base + stride]
                {
                    peaks.push((votes, n, r));
                }
            }
        }

        peaks.sort_by(|a, b| b.0.cmp(&a.0).then((a.1, a.2).cmp(&(b.1, b.2))));

        peaks
            .into_iter()
            .map(|(_, n, r)| {
                (
                    (r as f64 - (num_rho as f64 - 1.0) * 0.5) * self.rho_res_px,
                    n as f64 * self.theta_res_rad,
                )
            })
            .collect()
    }
}

impl Default for HoughLines {
    fn default() -> Self {
        Self::from_params(&Params::default())
    }
}

impl LineDetector for HoughLines {
    fn detect(&self, edge: &EdgeImage) -> Vec<LineSeg> {
        self.detect_polar(edge)
            .into_iter()
            .map(|(rho, theta)| LineSeg::from_polar(rho, theta))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_vertical_line() {
        let mut edge = EdgeImage::new(200, 200);
        for y in 0..200 {
            edge.put_pixel(50, y, Luma([255]));
        }

        let hough = HoughLines::default();

        assert_eq!(hough.detect_polar(&edge), vec![(50.0, 0.0)]);
        assert_eq!(hough.detect(&edge), vec![LineSeg::new(50, 1000, 50, -1000)]);
    }

    #[test]
    fn test_below_threshold() {
        let mut edge = EdgeImage::new(200, 200);
        for y in 0..100 {
            edge.put_pixel(50, y, Luma([255]));
        }

        assert!(HoughLines::default().detect(&edge).is_empty());
        assert!(HoughLines::default()
            .detect(&EdgeImage::new(0, 0))
            .is_empty());
    }
}
