use num_traits::Float;

/// Returns `x` when finite, otherwise `default`.
#[inline]
pub fn finite_or<F: Float>(x: F, default: F) -> F {
    if x.is_finite() { x } else { default }
}

/// Clamps into `[lo, hi]`; non-finite input yields `default`.
///
/// `default` itself is not clamped.
#[inline]
pub fn clamp_finite<F: Float>(x: F, lo: F, hi: F, default: F) -> F {
    if x.is_finite() { x.max(lo).min(hi) } else { default }
}

/// Clamps a probability into `[0, 1]`, absorbing floating-point drift.
///
/// NaN maps to `0`; `+∞` to `1`, `-∞` to `0`.
#[inline]
pub fn clamp_unit<F: Float>(x: F) -> F {
    if x.is_nan() {
        F::zero()
    } else {
        x.max(F::zero()).min(F::one())
    }
}

/// `num / den`, or `default` when the denominator is zero or the quotient is
/// not finite.
#[inline]
pub fn safe_ratio<F: Float>(num: F, den: F, default: F) -> F {
    if den.is_zero() {
        return default;
    }
    finite_or(num / den, default)
}

/// Square root of a non-negative quantity; tiny negative drift clamps to zero,
/// anything else non-representable yields `default`.
#[inline]
pub fn safe_sqrt<F: Float>(x: F, default: F) -> F {
    if !x.is_finite() {
        return default;
    }
    if x < F::zero() {
        // within 10× machine epsilon of zero is rounding noise
        let tolerance = F::epsilon() * F::from(10.0).unwrap_or(F::one());
        return if x >= -tolerance { F::zero() } else { default };
    }
    x.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_or_passes_finite_values() {
        assert_eq!(finite_or(2.5_f64, 0.0), 2.5);
        assert_eq!(finite_or(f64::NAN, 1.0), 1.0);
        assert_eq!(finite_or(f32::INFINITY, -1.0), -1.0);
    }

    #[test]
    fn clamp_finite_bounds_and_defaults() {
        assert_eq!(clamp_finite(150.0_f64, 1.0, 98.0, 1.0), 98.0);
        assert_eq!(clamp_finite(0.2_f64, 1.0, 98.0, 1.0), 1.0);
        assert_eq!(clamp_finite(f64::NAN, 1.0, 98.0, 7.0), 7.0);
    }

    #[test]
    fn clamp_unit_absorbs_drift() {
        assert_eq!(clamp_unit(1.000_000_000_1_f64), 1.0);
        assert_eq!(clamp_unit(-1e-17_f64), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
        assert_eq!(clamp_unit(0.3_f64), 0.3);
    }

    #[test]
    fn safe_ratio_handles_zero_and_overflow() {
        assert_eq!(safe_ratio(1.0_f64, 0.0, -1.0), -1.0);
        assert_eq!(safe_ratio(f64::MAX, 1e-300, 0.0), 0.0);
        assert_eq!(safe_ratio(3.0_f64, 2.0, 0.0), 1.5);
    }

    #[test]
    fn safe_sqrt_clamps_rounding_noise() {
        assert_eq!(safe_sqrt(-1e-17_f64, 9.0), 0.0);
        assert_eq!(safe_sqrt(-1.0_f64, 9.0), 9.0);
        assert_eq!(safe_sqrt(4.0_f64, 9.0), 2.0);
    }
}
