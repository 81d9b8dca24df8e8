//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and a maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Clip a value into the range `[-1, 1]`.
pub fn clip_unit<T>(value: T) -> T
where
    T: Float,
{
    clamp(&value, &-T::one(), &T::one())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when
/// `lhs` is a very small negative number.
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

/// Reduce an angle in degrees into the range `[0, 360)`.
pub fn modulo_360<T>(angle_deg: T) -> T
where
    T: Float,
{
    let full = T::from(360.0).unwrap_or_else(T::zero);
    let r = rem_euclid(angle_deg, full);

    // Guard against the round-off case described in `rem_euclid`
    if r >= full {
        T::zero()
    } else {
        r
    }
}

/// Reduce an angle in degrees into the range `[-180, 180)`.
pub fn wrap_180<T>(angle_deg: T) -> T
where
    T: Float,
{
    let half = T::from(180.0).unwrap_or_else(T::zero);
    modulo_360(angle_deg + half) - half
}

/// The largest absolute value in the slice, zero for an empty slice.
pub fn max_abs<T>(values: &[T]) -> T
where
    T: Float,
{
    values.iter().fold(T::zero(), |acc, v| acc.max(v.abs()))
}

/// Scale all values down so that none has a magnitude greater than one.
///
/// The ratios between the values are preserved. Values which are already in
/// range are left untouched, this never scales up.
pub fn normalize_in_place<T>(values: &mut [T])
where
    T: Float,
{
    let max = max_abs(values);

    if max > T::one() {
        for v in values.iter_mut() {
            *v = *v / max;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_modulo_360() {
        assert_eq!(modulo_360(450f64), 90f64);
        assert_eq!(modulo_360(-90f64), 270f64);
        assert_eq!(modulo_360(360f64), 0f64);
        assert_eq!(modulo_360(0f64), 0f64);
    }

    #[test]
    fn test_wrap_180() {
        assert_eq!(wrap_180(190f64), -170f64);
        assert_eq!(wrap_180(-190f64), 170f64);
        assert_eq!(wrap_180(90f64), 90f64);
        assert_eq!(wrap_180(720f64), 0f64);
    }

    #[test]
    fn test_normalize() {
        let mut v = [2.0f64, -1.0, 0.5, 0.0];
        normalize_in_place(&mut v);
        assert_eq!(v, [1.0, -0.5, 0.25, 0.0]);

        // In range values are not scaled up
        let mut v = [0.5f64, -0.25];
        normalize_in_place(&mut v);
        assert_eq!(v, [0.5, -0.25]);
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs::<f64>(&[]), 0.0);
        assert_eq!(max_abs(&[0.1f64, -0.7, 0.3]), 0.7);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 10f64), (100f64, 0f64), 5f64), 50f64);
        assert_eq!(clip_unit(3f64), 1f64);
        assert_eq!(clip_unit(-3f64), -1f64);
    }
}
