//! Implementation of the turn planner

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use rand::Rng;
use std::time::{Duration, Instant};

// Internal
use super::{Params, TurnDir, TurnSignal};
use crate::lane_est::EdgeImage;
use util::time::elapsed_since;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Intersection bit for an open left flank.
pub const LEFT_OPEN: u8 = 1;

/// Intersection bit for an open right flank.
pub const RIGHT_OPEN: u8 = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Intersection detector and turn planner.
#[derive(Debug, Clone, Default)]
pub struct TurnPlanner {
    params: Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnPlanner {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns true if enough time has passed since the last turn for intersections to be
    /// checked.
    pub fn cooldown_elapsed(&self, now: Instant, last_turn: Instant) -> bool {
        elapsed_since(now, last_turn) >= Duration::from_secs_f64(self.params.cooldown_s.max(0.0))
    }

    /// Check which flanks of the image are open, as a bit field of [`LEFT_OPEN`] and
    /// [`RIGHT_OPEN`].
    pub fn intersection(&self, edge: &EdgeImage) -> u8 {
        let is_open = |sum: Option<u64>| matches!(sum, Some(s) if s < self.params.openness_threshold);

        let mut bits = 0;
        if is_open(self.params.left_flank.pixel_sum(edge)) {
            bits |= LEFT_OPEN;
        }
        if is_open(self.params.right_flank.pixel_sum(edge)) {
            bits |= RIGHT_OPEN;
        }

        bits
    }

    /// Plan a turn from the given frame.
    ///
    /// No check is made, and no turn is signalled, until the cooldown since `last_turn` has
    /// elapsed. If both flanks are open the direction is chosen using `rng`.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        edge: &EdgeImage,
        now: Instant,
        last_turn: Instant,
        rng: &mut R,
    ) -> TurnSignal {
        if !self.cooldown_elapsed(now, last_turn) {
            return TurnSignal::none();
        }

        let is_at_intersection = self.intersection(edge);

        let direction = match is_at_intersection {
            LEFT_OPEN => TurnDir::Left,
            RIGHT_OPEN => TurnDir::Right,
            b if b == LEFT_OPEN | RIGHT_OPEN => {
                if rng.gen_bool(0.5) {
                    TurnDir::Left
                } else {
                    TurnDir::Right
                }
            }
            _ => TurnDir::None,
        };

        if direction != TurnDir::None {
            debug!(
                "TurnPlan: intersection {} detected, turning {:?}",
                is_at_intersection, direction
            );
        }

        TurnSignal {
            direction,
            is_at_intersection,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;
    use rand::{rngs::StdRng, SeedableRng};

    /// An image with both default flanks closed by a band of edge pixels.
    fn closed_image() -> EdgeImage {
        let mut img = EdgeImage::new(1280, 720);
        for x in 0..1280 {
            img.put_pixel(x, 400, Luma([255]));
        }
        img
    }

    fn open_left(img: &mut EdgeImage) {
        for x in 0..300 {
            img.put_pixel(x, 400, Luma([0]));
        }
    }

    #[test]
    fn test_flanks() {
        let planner = TurnPlanner::default();
        let start = Instant::now();
        let now = start + Duration::from_secs(6);
        let mut rng = StdRng::seed_from_u64(0);

        let mut img = closed_image();
        assert_eq!(planner.plan(&img, now, start, &mut rng), TurnSignal::none());

        open_left(&mut img);
        assert_eq!(
            planner.plan(&img, now, start, &mut rng),
            TurnSignal {
                direction: TurnDir::Left,
                is_at_intersection: 1
            }
        );

        let mut img = closed_image();
        for x in 900..1280 {
            img.put_pixel(x, 400, Luma([0]));
        }
        assert_eq!(
            planner.plan(&img, now, start, &mut rng),
            TurnSignal {
                direction: TurnDir::Right,
                is_at_intersection: 2
            }
        );
    }

    #[test]
    fn test_both_open_random() {
        let planner = TurnPlanner::default();
        let start = Instant::now();
        let now = start + Duration::from_secs(6);
        let img = EdgeImage::new(1280, 720);

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_left = false;
        let mut seen_right = false;

        for _ in 0..64 {
            let signal = planner.plan(&img, now, start, &mut rng);
            assert_eq!(signal.is_at_intersection, 3);
            match signal.direction {
                TurnDir::Left => seen_left = true,
                TurnDir::Right => seen_right = true,
                TurnDir::None => panic!("Both flanks open but no turn"),
            }
        }

        assert!(seen_left && seen_right);
    }

    #[test]
    fn test_cooldown() {
        let planner = TurnPlanner::default();
        let start = Instant::now();
        let mut img = closed_image();
        open_left(&mut img);
        let mut rng = StdRng::seed_from_u64(0);

        let early = planner.plan(&img, start + Duration::from_millis(4900), start, &mut rng);
        assert_eq!(early, TurnSignal::none());

        let late = planner.plan(&img, start + Duration::from_secs(5), start, &mut rng);
        assert_eq!(late.direction, TurnDir::Left);
    }

    #[test]
    fn test_narrow_image_right_flank_never_open() {
        let planner = TurnPlanner::default();
        let img = EdgeImage::new(640, 400);

        assert_eq!(planner.intersection(&img), LEFT_OPEN);
    }
}
