//! General time utility functions

use std::time::{Duration, Instant};

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Time elapsed between `earlier` and `now`, zero if `earlier` is in the future.
pub fn elapsed_since(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_elapsed_saturates() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(250);

        assert_eq!(elapsed_since(t1, t0), Duration::from_millis(250));
        assert_eq!(elapsed_since(t0, t1), Duration::from_secs(0));
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
