//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when `lhs` is a tiny negative
/// number.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle in degrees into the range `[0, 360)`.
pub fn wrap_deg_360<T>(value: T) -> T
where
    T: Float,
{
    let full: T = T::from(360.0).unwrap_or_else(T::max_value);
    let r = rem_euclid(value, full);

    // Guard the round-off case of `rem_euclid`
    if r >= full {
        T::zero()
    } else {
        r
    }
}

/// Get the signed angular distance in degrees from `a` to `b`.
///
/// The shortest signed distance is returned, accounting for wrapping at 360, so the result is in
/// `[-180, 180]`.
pub fn ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float,
{
    let full: T = T::from(360.0).unwrap_or_else(T::max_value);

    let c = rem_euclid(a - b, full);
    let d = rem_euclid(b - a, full);

    if c < d {
        -c
    } else {
        d
    }
}

/// Least squares fit of a first degree polynomial `y = c[0]*x + c[1]` through the given points.
///
/// Returns `None` if there are no points or all `x` values are equal, in which case the fit is
/// undefined.
pub fn polyfit_1<T>(xs: &[T], ys: &[T]) -> Option<(T, T)>
where
    T: Float + std::ops::AddAssign,
{
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let n = T::from(xs.len())?;
    let mut sum_x = T::zero();
    let mut sum_y = T::zero();
    for (x, y) in xs.iter().zip(ys.iter()) {
        sum_x += *x;
        sum_y += *y;
    }
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let mut sxx = T::zero();
    let mut sxy = T::zero();
    for (x, y) in xs.iter().zip(ys.iter()) {
        sxx += (*x - mean_x) * (*x - mean_x);
        sxy += (*x - mean_x) * (*y - mean_y);
    }

    if sxx == T::zero() {
        return None;
    }

    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ang_dist_deg() {
        assert_eq!(ang_dist_deg(10f64, 20f64), 10f64);
        assert_eq!(ang_dist_deg(20f64, 10f64), -10f64);
        assert_eq!(ang_dist_deg(0f64, 360f64), 0f64);
        assert_eq!(ang_dist_deg(355f64, 5f64), 10f64);
        assert_eq!(ang_dist_deg(5f64, 355f64), -10f64);
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(-90f64), 270f64);
        assert_eq!(wrap_deg_360(450f64), 90f64);
        assert_eq!(wrap_deg_360(360f64), 0f64);
        assert_eq!(wrap_deg_360(0f64), 0f64);
    }

    #[test]
    fn test_polyfit_1() {
        // x = 2y + 1
        let (m, c) = polyfit_1(&[0f64, 1.0, 2.0, 3.0], &[1f64, 3.0, 5.0, 7.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-12);
        assert!((c - 1.0).abs() < 1e-12);

        assert!(polyfit_1::<f64>(&[], &[]).is_none());
        assert!(polyfit_1(&[1f64, 1.0], &[0f64, 5.0]).is_none());
    }
}
