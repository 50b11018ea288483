/// Rounds a value to `digits` decimal places (half away from zero).
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Returns `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Returns `part` as a percentage of `whole`, or 0 when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    ratio_or_zero(part, whole) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_to_keeps_short_constants_exact() {
        assert_eq!(round_to(0.82, 6), 0.82);
        assert_eq!(round_to(0.012, 6), 0.012);
        assert_eq!(round_to(0.5960561, 6), 0.596056);
        assert!(round_to(f64::NAN, 3).is_nan());
    }

    #[test]
    fn zero_denominator_yields_zero() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, 4.0), 25.0);
    }

    proptest! {
        #[test]
        fn rounding_is_idempotent(value in -1.0e6f64..1.0e6, digits in 0u32..9) {
            let once = round_to(value, digits);
            prop_assert_eq!(round_to(once, digits), once);
        }
    }
}
