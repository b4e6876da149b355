//! Minimum per-group sample size for a two-proportion experiment.

use num_traits::Zero;
use tracing::{debug, warn};

use crate::backend::{Backend, Distributions};
use crate::error::{ComputationError, Result, ValidationError};
use crate::hypothesis::TestSettings;
use crate::numeric::{cohens_h, safe_sqrt};
use crate::result::SampleSize;
use crate::validate;

/// Power targeted when the caller does not choose one.
pub const DEFAULT_TARGET_POWER: f64 = 0.80;

/// Plans how many observations per group an experiment needs.
///
/// ```text
/// n = ⌈(z₁₋α/₂·√(2p̄q̄) + z_power·√(p₁q₁ + p₂q₂))² / (p₁ − p₂)²⌉
/// ```
///
/// with `p₁` the baseline rate, `p₂ = p₁·(1 + lift)` and `p̄` their average.
#[derive(Debug, Clone, Copy)]
pub struct SampleSizePlanner {
    confidence_level: f64,
    backend: Backend,
}

impl SampleSizePlanner {
    /// Planner at `confidence_level`, rejected unless strictly inside (0, 1).
    pub fn new(confidence_level: f64, backend: Backend) -> Result<Self, ValidationError> {
        validate::confidence_level(confidence_level)?;
        Ok(Self { confidence_level, backend })
    }

    pub(crate) fn from_settings(settings: &TestSettings) -> Self {
        Self {
            confidence_level: settings.confidence_level(),
            backend: *settings.backend(),
        }
    }

    /// Per-group size to detect a relative `expected_lift` over
    /// `baseline_rate` with probability `target_power`.
    ///
    /// Returns [`SampleSize::Unreachable`] when the lift leaves the rate
    /// unchanged. A lift too small for any `u64` count saturates at
    /// `SampleSize::Finite(u64::MAX)`.
    pub fn plan(&self, baseline_rate: f64, expected_lift: f64, target_power: f64) -> Result<SampleSize> {
        validate::rate("baseline_rate", baseline_rate)?;
        validate::lift("expected_lift", expected_lift)?;
        validate::open_unit("target_power", target_power)?;

        let target_rate = baseline_rate * (1.0 + expected_lift);
        if !(0.0..=1.0).contains(&target_rate) {
            return Err(ValidationError::new(
                "expected_lift",
                format_args!("moves the rate to {target_rate}, outside [0, 1]"),
            )
            .into());
        }

        let alpha = 1.0 - self.confidence_level;
        let size = rates_sample_size(&self.backend, baseline_rate, target_rate, alpha, target_power)?;
        debug!(baseline_rate, target_rate, target_power, %size, "planned sample size");
        Ok(size)
    }

    /// [`plan`](Self::plan) at [`DEFAULT_TARGET_POWER`].
    pub fn plan_default_power(&self, baseline_rate: f64, expected_lift: f64) -> Result<SampleSize> {
        self.plan(baseline_rate, expected_lift, DEFAULT_TARGET_POWER)
    }
}

/// Per-group size for a two-proportion test between `p1` and `p2`.
pub(crate) fn rates_sample_size<D: Distributions + ?Sized>(
    dist: &D,
    p1: f64,
    p2: f64,
    alpha: f64,
    power: f64,
) -> Result<SampleSize, ComputationError> {
    let gap = p1 - p2;
    if cohens_h(p1, p2).is_zero() || gap.is_zero() {
        return Ok(SampleSize::Unreachable);
    }
    let z_alpha = dist.normal_quantile(1.0 - alpha / 2.0)?;
    let z_beta = dist.normal_quantile(power)?;

    let mean_rate = (p1 + p2) / 2.0;
    let null_spread = safe_sqrt(2.0 * mean_rate * (1.0 - mean_rate), 0.0);
    let alt_spread = safe_sqrt(p1 * (1.0 - p1) + p2 * (1.0 - p2), 0.0);
    let root = z_alpha * null_spread + z_beta * alt_spread;

    per_group(root * root / (gap * gap))
}

/// Per-group size for a two-sample mean test at standardized effect `d`.
pub(crate) fn effect_sample_size<D: Distributions + ?Sized>(
    dist: &D,
    effect_size: f64,
    alpha: f64,
    power: f64,
) -> Result<SampleSize, ComputationError> {
    if effect_size.is_zero() || !effect_size.is_finite() {
        return Ok(SampleSize::Unreachable);
    }
    let z_alpha = dist.normal_quantile(1.0 - alpha / 2.0)?;
    let z_beta = dist.normal_quantile(power)?;
    let ratio = (z_alpha + z_beta) / effect_size;

    per_group(2.0 * ratio * ratio)
}

/// Rounds up to a whole count. Sizes past `u64::MAX`, including the infinity
/// a vanishing gap produces, saturate rather than fail.
fn per_group(n: f64) -> Result<SampleSize, ComputationError> {
    if n.is_nan() {
        return Err(ComputationError::new("sample size", "formula produced NaN"));
    }
    let n = n.ceil();
    if n >= u64::MAX as f64 {
        warn!(n, "sample size exceeds u64, saturating");
        return Ok(SampleSize::Finite(u64::MAX));
    }
    Ok(SampleSize::Finite((n as u64).max(1)))
}
