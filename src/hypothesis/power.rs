use num_traits::Zero;

use crate::backend::Distributions;
use crate::error::ComputationError;
use crate::numeric::{clamp_unit, finite_or, safe_sqrt};

/// Two-sided power of a t-test via the normal approximation to the
/// noncentral t distribution.
///
/// With noncentrality `δ = |d| / √(1/n₁ + 1/n₂)` and critical value `t_c`,
///
/// ```text
/// P(T' ≤ x) ≈ Φ( (x·(1 − 1/(4ν)) − δ) / √(1 + x²/(2ν)) )
/// power     = P(T' > t_c) + P(T' < −t_c)
/// ```
///
/// The result is clamped into `[0, 1]`; a non-finite intermediate yields 0.
pub fn noncentral_t_power<D: Distributions + ?Sized>(
    dist: &D,
    effect_size: f64,
    n1: u64,
    n2: u64,
    df: f64,
    t_critical: f64,
) -> Result<f64, ComputationError> {
    let scale = safe_sqrt(1.0 / n1 as f64 + 1.0 / n2 as f64, 0.0);
    if scale.is_zero() || df <= 0.0 {
        return Ok(0.0);
    }
    let delta = finite_or(effect_size.abs() / scale, 0.0);

    let shrink = 1.0 - 1.0 / (4.0 * df);
    let spread = (1.0 + t_critical * t_critical / (2.0 * df)).sqrt();
    let upper = (t_critical * shrink - delta) / spread;
    let lower = (-t_critical * shrink - delta) / spread;
    if !upper.is_finite() || !lower.is_finite() {
        return Ok(0.0);
    }

    let power = dist.normal_sf(upper)? + dist.normal_cdf(lower)?;
    Ok(clamp_unit(finite_or(power, 0.0)))
}

/// Two-sided power of the pooled two-proportion z-test for unequal groups.
///
/// ```text
/// power = Φ((|Δ| − z·se₀)/se₁) + Φ((−|Δ| − z·se₀)/se₁)
/// ```
///
/// `se₀` is the pooled (null) standard error and `se₁` the unpooled one. With
/// `se₁ = 0` both proportions sit on a boundary: any difference is detected
/// with certainty, no difference never is.
pub fn two_proportion_power<D: Distributions + ?Sized>(
    dist: &D,
    diff: f64,
    se_null: f64,
    se_alt: f64,
    z_critical: f64,
) -> Result<f64, ComputationError> {
    if se_alt.is_zero() {
        return Ok(if diff.is_zero() { 0.0 } else { 1.0 });
    }
    let gap = diff.abs();
    let upper = (z_critical * se_null - gap) / se_alt;
    let lower = (-z_critical * se_null - gap) / se_alt;
    if !upper.is_finite() || !lower.is_finite() {
        return Ok(0.0);
    }
    let power = dist.normal_sf(upper)? + dist.normal_cdf(lower)?;
    Ok(clamp_unit(finite_or(power, 0.0)))
}
