//! Parameters structure for TurnPlan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::lane_est::EdgeImage;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for turn planning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Region of the image checked for an opening on the left.
    pub left_flank: FlankRect,

    /// Region of the image checked for an opening on the right.
    pub right_flank: FlankRect,

    /// A flank is open if the sum of its pixel values is less than this.
    pub openness_threshold: u64,

    /// Minimum time after the last turn before intersections are checked again.
    ///
    /// Units: seconds
    pub cooldown_s: f64,
}

/// A rectangular region of an image, `[start, end)` on each axis. An end of `None` extends the
/// region to the edge of the image. The region is clipped to the image.
///
/// A region which does not overlap the image at all carries no information, so it can never be
/// open.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct FlankRect {
    pub x_start: u32,
    pub x_end: Option<u32>,
    pub y_start: u32,
    pub y_end: Option<u32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlankRect {
    /// Sum of all pixel values inside the region, or `None` if the region lies outside the image.
    pub fn pixel_sum(&self, image: &EdgeImage) -> Option<u64> {
        let (width, height) = image.dimensions();

        let x_end = self.x_end.map_or(width, |x| x.min(width));
        let y_end = self.y_end.map_or(height, |y| y.min(height));

        if self.x_start >= x_end || self.y_start >= y_end {
            return None;
        }

        let mut sum = 0u64;
        for y in self.y_start..y_end {
            for x in self.x_start..x_end {
                sum += image.get_pixel(x, y).0[0] as u64;
            }
        }

        Some(sum)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            left_flank: FlankRect {
                x_start: 0,
                x_end: Some(300),
                y_start: 170,
                y_end: None,
            },
            right_flank: FlankRect {
                x_start: 900,
                x_end: None,
                y_start: 170,
                y_end: None,
            },
            openness_threshold: 1000,
            cooldown_s: 5.0,
        }
    }
}
