//! Implementation of the lane estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{LineSeg, Params};
use util::maths::polyfit_1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lane geometry estimator.
#[derive(Debug, Clone, Default)]
pub struct LaneEst {
    params: Params,
}

/// A straight lane boundary `x = slope * y + intercept` in image coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LaneFit {
    pub slope: f64,
    pub intercept: f64,
}

/// A fitted lane boundary evaluated over the height of the image.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LaneBoundary {
    pub fit: LaneFit,

    /// Boundary `x` at the bottom of the image (`y = height`), truncated.
    pub x_start: i32,

    /// Boundary `x` at the top of the image (`y = 0`), truncated.
    pub x_end: i32,
}

/// Result of one lane estimate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LaneEstimate {
    /// Cross track error, positive when the vehicle is right of the lane centre.
    ///
    /// Units: pixels
    pub cte: f64,

    pub status: LaneStatus,

    pub left: Option<LaneBoundary>,
    pub right: Option<LaneBoundary>,

    /// Number of lines classified as part of the left boundary
    pub num_left: usize,

    /// Number of lines classified as part of the right boundary
    pub num_right: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which lane boundaries were visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum LaneStatus {
    BothSides,
    LeftMissing,
    RightMissing,
    NoLines,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneEst {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Estimate the lane and the CTE from the given lines of an image of the given size.
    pub fn estimate(&self, lines: &[LineSeg], width: u32, height: u32) -> LaneEstimate {
        let mut left_ys = Vec::new();
        let mut left_xs = Vec::new();
        let mut right_ys = Vec::new();
        let mut right_xs = Vec::new();
        let mut num_left = 0;
        let mut num_right = 0;

        // ---- CLASSIFICATION ----

        for line in lines {
            let slope = match line.slope() {
                Some(s) if s.abs() >= self.params.slope_threshold => s,
                _ => continue,
            };

            let (ys, xs) = if slope <= 0.0 {
                num_left += 1;
                (&mut left_ys, &mut left_xs)
            } else {
                num_right += 1;
                (&mut right_ys, &mut right_xs)
            };

            ys.push(line.y1 as f64);
            ys.push(line.y2 as f64);
            xs.push(line.x1 as f64);
            xs.push(line.x2 as f64);
        }

        // ---- FITTING ----

        let max_y = height as f64;
        let left = LaneFit::fit(&left_ys, &left_xs).map(|f| f.boundary(max_y));
        let right = LaneFit::fit(&right_ys, &right_xs).map(|f| f.boundary(max_y));

        // ---- CTE ----

        let car_center = (width / 2) as f64;

        let (cte, status) = match (&left, &right) {
            (Some(l), Some(r)) => {
                let lane_center = (l.x_start as f64 + r.x_start as f64) / 2.0;
                let limit = width as f64;
                (
                    (car_center - lane_center).max(-limit).min(limit),
                    LaneStatus::BothSides,
                )
            }
            (None, Some(_)) => (self.params.missing_side_cte, LaneStatus::LeftMissing),
            (Some(_), None) => (-self.params.missing_side_cte, LaneStatus::RightMissing),
            (None, None) => (0.0, LaneStatus::NoLines),
        };

        trace!(
            "LaneEst: {} left, {} right, status {:?}, CTE {:.1}",
            num_left,
            num_right,
            status,
            cte
        );

        LaneEstimate {
            cte,
            status,
            left,
            right,
            num_left,
            num_right,
        }
    }
}

impl LaneFit {
    /// Least squares fit of `x` against `y`, `None` if there are no points or the fit is
    /// degenerate.
    pub fn fit(ys: &[f64], xs: &[f64]) -> Option<Self> {
        polyfit_1(ys, xs).map(|(slope, intercept)| Self { slope, intercept })
    }

    /// Boundary `x` at the given image row.
    pub fn x_at(&self, y: f64) -> f64 {
        self.slope * y + self.intercept
    }

    fn boundary(self, max_y: f64) -> LaneBoundary {
        LaneBoundary {
            fit: self,
            x_start: self.x_at(max_y) as i32,
            x_end: self.x_at(0.0) as i32,
        }
    }
}

impl Default for LaneEstimate {
    fn default() -> Self {
        Self {
            cte: 0.0,
            status: LaneStatus::NoLines,
            left: None,
            right: None,
            num_left: 0,
            num_right: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 400;

    #[test]
    fn test_both_sides() {
        let est = LaneEst::default();
        let lines = [
            LineSeg::new(50, 400, 120, 100),
            LineSeg::new(600, 400, 520, 100),
        ];

        let lane = est.estimate(&lines, WIDTH, HEIGHT);

        assert_eq!(lane.status, LaneStatus::BothSides);
        assert_eq!((lane.num_left, lane.num_right), (1, 1));

        // Evaluated boundaries are truncated so may land one pixel low
        let left = lane.left.unwrap();
        let right = lane.right.unwrap();
        assert!(left.x_start == 50 || left.x_start == 49);
        assert!(right.x_start == 600 || right.x_start == 599);

        // Lane centre is at 325, the vehicle at 320
        assert!(lane.cte >= -5.0 && lane.cte <= -4.0);
    }

    #[test]
    fn test_cte_bounded() {
        let est = LaneEst::default();

        // Boundaries which cross far outside the image at the bottom row
        let lines = [
            LineSeg::new(-5000, 400, -4990, 100),
            LineSeg::new(-6000, 100, -5500, 400),
        ];

        let lane = est.estimate(&lines, WIDTH, HEIGHT);

        assert_eq!(lane.status, LaneStatus::BothSides);
        assert!(lane.cte.is_finite());
        assert!(lane.cte.abs() <= WIDTH as f64);
    }

    #[test]
    fn test_missing_sides() {
        let est = LaneEst::default();

        let left_only = est.estimate(&[LineSeg::new(50, 400, 120, 100)], WIDTH, HEIGHT);
        assert_eq!(left_only.status, LaneStatus::RightMissing);
        assert_eq!(left_only.cte, -500.0);

        let right_only = est.estimate(&[LineSeg::new(600, 400, 520, 100)], WIDTH, HEIGHT);
        assert_eq!(right_only.status, LaneStatus::LeftMissing);
        assert_eq!(right_only.cte, 500.0);

        let none = est.estimate(&[], WIDTH, HEIGHT);
        assert_eq!(none.status, LaneStatus::NoLines);
        assert_eq!(none.cte, 0.0);
    }

    #[test]
    fn test_rejected_lines() {
        let est = LaneEst::new(Params {
            missing_side_cte: 250.0,
            ..Default::default()
        });

        // Vertical and nearly horizontal lines are ignored, leaving only the right boundary
        let lines = [
            LineSeg::new(300, 0, 300, 400),
            LineSeg::new(0, 200, 600, 210),
            LineSeg::new(600, 400, 520, 100),
        ];

        let lane = est.estimate(&lines, WIDTH, HEIGHT);
        assert_eq!((lane.num_left, lane.num_right), (0, 1));
        assert_eq!(lane.cte, 250.0);
    }

    #[test]
    fn test_symmetric_lane_zero_cte() {
        let est = LaneEst::default();
        let lines = [
            LineSeg::new(100, 400, 200, 0),
            LineSeg::new(540, 400, 440, 0),
        ];

        let lane = est.estimate(&lines, WIDTH, HEIGHT);
        assert_eq!(lane.cte, 0.0);
    }
}
