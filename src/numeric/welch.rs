use num_traits::Zero;

use super::safe::{clamp_finite, safe_ratio};

/// Degrees of freedom used whenever the Welch–Satterthwaite estimate is undefined.
pub const FALLBACK_DF: f64 = 1.0;

/// Welch–Satterthwaite effective degrees of freedom.
///
/// ```text
///            (s₁²/n₁ + s₂²/n₂)²
/// ν = ─────────────────────────────────────
///     (s₁²/n₁)²/(n₁−1) + (s₂²/n₂)²/(n₂−1)
/// ```
///
/// Returns [`FALLBACK_DF`] when either group has at most one observation, when
/// both standard deviations are exactly zero, or when any intermediate value
/// is not finite. Otherwise the estimate is clamped to `[1, n₁ + n₂ − 2]`.
pub fn welch_satterthwaite_df(std1: f64, n1: u64, std2: f64, n2: u64) -> f64 {
    if n1 <= 1 || n2 <= 1 {
        return FALLBACK_DF;
    }
    if std1.is_zero() && std2.is_zero() {
        return FALLBACK_DF;
    }

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let v1 = std1 * std1 / n1f;
    let v2 = std2 * std2 / n2f;

    let numerator = (v1 + v2) * (v1 + v2);
    let denominator = v1 * v1 / (n1f - 1.0) + v2 * v2 / (n2f - 1.0);

    let df = safe_ratio(numerator, denominator, FALLBACK_DF);
    let upper = (n1f + n2f - 2.0).max(FALLBACK_DF);
    clamp_finite(df, FALLBACK_DF, upper, FALLBACK_DF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_hand_computed_value() {
        // v1 = 4.5, v2 = 2.88 → 7.38² / ((4.5² + 2.88²) / 49)
        let df = welch_satterthwaite_df(15.0, 50, 12.0, 50);
        assert_relative_eq!(df, 54.4644 / (28.5444 / 49.0), max_relative = 1e-9);
    }

    #[test]
    fn equal_variances_and_sizes_give_pooled_df() {
        let df = welch_satterthwaite_df(3.0, 20, 3.0, 20);
        assert_relative_eq!(df, 38.0, epsilon = 1e-12);
    }

    #[test]
    fn tiny_groups_fall_back() {
        assert_eq!(welch_satterthwaite_df(1.0, 1, 2.0, 50), FALLBACK_DF);
        assert_eq!(welch_satterthwaite_df(1.0, 50, 2.0, 1), FALLBACK_DF);
        assert_eq!(welch_satterthwaite_df(0.0, 1, 0.0, 1), FALLBACK_DF);
    }

    #[test]
    fn zero_spread_falls_back() {
        assert_eq!(welch_satterthwaite_df(0.0, 30, 0.0, 40), FALLBACK_DF);
    }

    #[test]
    fn one_zero_std_gives_that_groups_df() {
        // only the second group contributes: ν = n₂ − 1
        let df = welch_satterthwaite_df(0.0, 30, 5.0, 12);
        assert_relative_eq!(df, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn huge_spreads_stay_in_range() {
        let df = welch_satterthwaite_df(1e200, 10, 1e-200, 10);
        assert!(df.is_finite());
        assert!((FALLBACK_DF..=18.0).contains(&df));
    }
}
