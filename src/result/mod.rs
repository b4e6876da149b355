mod interval;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use interval::{FormattedInterval, Interval, IntervalStyle};

/// Conventional bucket for the magnitude of a standardized effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    /// Below 0.2.
    Negligible,
    /// 0.2 up to 0.5.
    Small,
    /// 0.5 up to 0.8.
    Medium,
    /// 0.8 and above.
    Large,
}

impl EffectMagnitude {
    /// Buckets `|effect_size|` at 0.2 / 0.5 / 0.8.
    ///
    /// Non-finite input is treated as no effect.
    pub fn from_effect_size(effect_size: f64) -> Self {
        let magnitude = if effect_size.is_finite() { effect_size.abs() } else { 0.0 };
        if magnitude < 0.2 {
            EffectMagnitude::Negligible
        } else if magnitude < 0.5 {
            EffectMagnitude::Small
        } else if magnitude < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }

    /// Lowercase label, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum observations per group needed to reach a target power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSize {
    /// Smallest whole number of observations per group.
    Finite(u64),
    /// The effect is exactly zero: no finite sample reaches the target power.
    Unreachable,
}

impl SampleSize {
    /// The per-group count, if finite.
    pub fn per_group(self) -> Option<u64> {
        match self {
            SampleSize::Finite(n) => Some(n),
            SampleSize::Unreachable => None,
        }
    }

    /// `true` for [`SampleSize::Finite`].
    pub fn is_reachable(self) -> bool {
        matches!(self, SampleSize::Finite(_))
    }
}

impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleSize::Finite(n) => write!(f, "{n} per group"),
            SampleSize::Unreachable => f.write_str("unreachable (no effect to detect)"),
        }
    }
}

/// Outcome of one two-group comparison.
///
/// Built fresh by every test and never mutated afterwards; downstream report
/// and insight layers read these fields as-is. `confidence_interval` bounds the
/// difference first − second, and `statistic` / `effect_size` carry the same
/// sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalResult {
    /// Diagnostic tag: algorithm and distribution backend.
    pub test_type: String,
    /// t or z value.
    pub statistic: f64,
    /// Two-tailed p-value in `[0, 1]`.
    pub p_value: f64,
    /// `p_value < 1 − confidence_level`.
    pub is_significant: bool,
    /// Confidence level of the engine that produced this result.
    pub confidence_level: f64,
    /// Interval for the difference in means or proportions.
    pub confidence_interval: Interval<f64>,
    /// Signed Cohen's d (means) or Cohen's h (proportions).
    pub effect_size: f64,
    /// Bucket of `|effect_size|`.
    pub effect_size_interpretation: EffectMagnitude,
    /// Estimated probability of detecting the observed effect, in `[0, 1]`.
    pub statistical_power: f64,
    /// Present only when a target power was requested.
    pub sample_size_recommendation: Option<SampleSize>,
    /// Percent change of the first group's estimate over the second's.
    ///
    /// `None` when the second estimate is zero or the ratio is not finite.
    pub relative_change: Option<f64>,
    /// Deterministic summary of the fields above.
    pub conclusion: String,
}

impl StatisticalResult {
    /// `1 − confidence_level`.
    pub fn alpha(&self) -> f64 {
        1.0 - self.confidence_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_thresholds() {
        assert_eq!(EffectMagnitude::from_effect_size(0.0), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_effect_size(0.199), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_effect_size(0.2), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::from_effect_size(-0.49), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::from_effect_size(0.5), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::from_effect_size(-0.79), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::from_effect_size(0.8), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::from_effect_size(3.1), EffectMagnitude::Large);
    }

    #[test]
    fn non_finite_effect_is_negligible() {
        assert_eq!(EffectMagnitude::from_effect_size(f64::NAN), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_effect_size(f64::INFINITY), EffectMagnitude::Negligible);
    }

    #[test]
    fn sample_size_accessors() {
        assert_eq!(SampleSize::Finite(392).per_group(), Some(392));
        assert_eq!(SampleSize::Unreachable.per_group(), None);
        assert!(!SampleSize::Unreachable.is_reachable());
        assert_eq!(SampleSize::Finite(10).to_string(), "10 per group");
    }

    #[test]
    fn magnitude_serializes_lowercase() {
        let json = serde_json::to_string(&EffectMagnitude::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
