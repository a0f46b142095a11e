//! Safe numeric primitives.
//!
//! Every ratio in the engine goes through these helpers so that zero
//! denominators and non-finite intermediates can never leak into a feature
//! matrix or a valuation record.

/// Divide `numerator` by `denominator`, returning 0.0 when the denominator
/// is zero or either operand is non-finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    safe_div_or(numerator, denominator, 0.0)
}

/// Divide with an explicit fallback for zero or non-finite denominators.
///
/// The fallback is also used when the quotient itself is non-finite, which
/// covers denormal denominators that overflow to infinity.
pub fn safe_div_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return fallback;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() { quotient } else { fallback }
}

/// Replace NaN and infinities with `None`, passing finite values through.
pub fn scrub_non_finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Clamp `value` into `[lo, hi]`, substituting `default` when the value is
/// non-finite. Used for growth-rate and ROE bounds.
pub fn clamp_or(value: f64, lo: f64, hi: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        default.clamp(lo, hi)
    }
}

/// Mean of the finite values in a slice, `None` when no finite value exists.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(10.0, 2.0, 5.0)]
    #[case(10.0, 0.0, 0.0)]
    #[case(0.0, 0.0, 0.0)]
    #[case(-3.0, 1.5, -2.0)]
    fn safe_div_cases(#[case] n: f64, #[case] d: f64, #[case] expected: f64) {
        assert_relative_eq!(safe_div(n, d), expected);
    }

    #[test]
    fn safe_div_non_finite_operands() {
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_div(1.0, f64::NAN), 0.0);
        assert_eq!(safe_div(f64::INFINITY, 2.0), 0.0);
        assert_eq!(safe_div(1.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn safe_div_or_uses_fallback() {
        assert_relative_eq!(safe_div_or(1.0, 0.0, 1.0), 1.0);
        assert_relative_eq!(safe_div_or(1.0, 0.0, 0.5), 0.5);
        assert_relative_eq!(safe_div_or(9.0, 3.0, 0.5), 3.0);
    }

    #[test]
    fn safe_div_overflowing_quotient_falls_back() {
        assert_eq!(safe_div(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }

    #[test]
    fn scrub_passes_finite_and_drops_the_rest() {
        assert_eq!(scrub_non_finite(1.25), Some(1.25));
        assert_eq!(scrub_non_finite(f64::NAN), None);
        assert_eq!(scrub_non_finite(f64::INFINITY), None);
        assert_eq!(scrub_non_finite(f64::NEG_INFINITY), None);
    }

    #[test]
    fn clamp_or_bounds_and_default() {
        assert_relative_eq!(clamp_or(0.5, 0.0, 0.3, 0.05), 0.3);
        assert_relative_eq!(clamp_or(-0.1, 0.0, 0.3, 0.05), 0.0);
        assert_relative_eq!(clamp_or(0.12, 0.0, 0.3, 0.05), 0.12);
        assert_relative_eq!(clamp_or(f64::NAN, 0.0, 0.3, 0.05), 0.05);
    }

    #[test]
    fn finite_mean_ignores_non_finite() {
        assert_relative_eq!(finite_mean(&[1.0, f64::NAN, 3.0]).unwrap(), 2.0);
        assert!(finite_mean(&[f64::NAN, f64::INFINITY]).is_none());
        assert!(finite_mean(&[]).is_none());
    }
}
