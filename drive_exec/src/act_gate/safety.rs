//! Safety inputs of the actuation gateway

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use util::time::elapsed_since;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Latest obstacle and traffic sign information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyState {
    /// Distance to the closest obstacle, infinite if nothing has been seen.
    ///
    /// Units: meters
    pub min_obstacle_distance_m: f64,

    /// End of the current stop sign dwell, exclusive.
    pub stop_sign_active_until: Option<Instant>,

    /// Time of the last honoured stop sign.
    pub last_stop_sign: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SafetyState {
    /// Register a stop sign seen at `now`.
    ///
    /// The sign is ignored if another was honoured less than `ignore` ago. Otherwise the vehicle
    /// is held for `dwell` and `true` is returned.
    pub fn register_stop_sign(&mut self, now: Instant, dwell: Duration, ignore: Duration) -> bool {
        if let Some(last) = self.last_stop_sign {
            if elapsed_since(now, last) < ignore {
                return false;
            }
        }

        self.last_stop_sign = Some(now);
        self.stop_sign_active_until = Some(now + dwell);

        true
    }

    /// Returns true if the vehicle must be held for a stop sign at `now`.
    pub fn stop_sign_active(&self, now: Instant) -> bool {
        match self.stop_sign_active_until {
            Some(until) => now < until,
            None => false,
        }
    }

    /// Returns true if the closest obstacle is nearer than `safe_distance_m`.
    pub fn obstacle_too_close(&self, safe_distance_m: f64) -> bool {
        self.min_obstacle_distance_m < safe_distance_m
    }
}

impl Default for SafetyState {
    fn default() -> Self {
        Self {
            min_obstacle_distance_m: f64::INFINITY,
            stop_sign_active_until: None,
            last_stop_sign: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const DWELL: Duration = Duration::from_millis(1500);
    const IGNORE: Duration = Duration::from_secs(5);

    #[test]
    fn test_stop_sign_windows() {
        let t0 = Instant::now();
        let ms = |m: u64| t0 + Duration::from_millis(m);
        let mut safety = SafetyState::default();

        assert!(!safety.stop_sign_active(t0));

        assert!(safety.register_stop_sign(t0, DWELL, IGNORE));
        assert!(safety.stop_sign_active(t0));
        assert!(safety.stop_sign_active(ms(1499)));
        assert!(!safety.stop_sign_active(ms(1500)));

        // Seen again after the dwell but inside the ignore window
        assert!(!safety.register_stop_sign(ms(2000), DWELL, IGNORE));
        assert!(!safety.stop_sign_active(ms(2000)));

        // And again once the ignore window has passed
        assert!(safety.register_stop_sign(ms(5000), DWELL, IGNORE));
        assert!(safety.stop_sign_active(ms(6000)));
        assert!(!safety.stop_sign_active(ms(6500)));
    }

    #[test]
    fn test_obstacle() {
        let mut safety = SafetyState::default();
        assert!(!safety.obstacle_too_close(0.5));

        safety.min_obstacle_distance_m = 0.5;
        assert!(!safety.obstacle_too_close(0.5));

        safety.min_obstacle_distance_m = 0.49;
        assert!(safety.obstacle_too_close(0.5));
    }
}
