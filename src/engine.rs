//! Entry point holding the confidence level and the detected backend.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{Backend, BackendKind, Distributions};
use crate::error::{ComputationError, Result, ValidationError};
use crate::hypothesis::{HypothesisTest, ProportionZTest, TestSettings, WelchTTest};
use crate::planner::{DEFAULT_TARGET_POWER, SampleSizePlanner};
use crate::result::{Interval, SampleSize, StatisticalResult};
use crate::summary::{Comparison, MeanComparison, MeanSummary, MetricKind, ProportionComparison, RateSummary};
use crate::validate;

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Coefficient of variation assumed by [`quick_significance_test`] for
/// continuous metrics.
pub const QUICK_TEST_CV: f64 = 0.10;

/// Serializable engine settings.
///
/// Missing fields take their defaults; `backend: None` detects the best
/// available backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Strictly inside (0, 1).
    pub confidence_level: f64,
    /// Pinned backend, if any.
    pub backend: Option<BackendKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            backend: None,
        }
    }
}

/// Runs two-group significance tests and plans sample sizes.
///
/// Immutable once built; every method is a pure function of its arguments,
/// so one engine can be shared freely across threads.
///
/// ```
/// use liftstat::{Engine, MeanComparison, MeanSummary};
///
/// let engine = Engine::new(0.95).unwrap();
/// let result = engine
///     .compare_means(&MeanComparison::new(
///         MeanSummary::new(100.0, 15.0, 50),
///         MeanSummary::new(85.0, 12.0, 50),
///     ))
///     .unwrap();
/// assert!(result.is_significant);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    settings: TestSettings,
}

impl Engine {
    /// Engine at `confidence_level` on the best backend that passes its
    /// self-check.
    pub fn new(confidence_level: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            settings: TestSettings::new(confidence_level, Backend::detect())?,
        })
    }

    /// Engine built from deserialized settings.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ValidationError> {
        let engine = Self::new(config.confidence_level)?;
        Ok(match config.backend {
            Some(kind) => engine.with_backend(kind),
            None => engine,
        })
    }

    /// The same engine pinned to a specific backend.
    #[must_use]
    pub fn with_backend(self, kind: BackendKind) -> Self {
        Self {
            settings: self.settings.with_backend(Backend::new(kind)),
        }
    }

    /// Confidence level every test and interval uses.
    pub fn confidence_level(&self) -> f64 {
        self.settings.confidence_level()
    }

    /// Backend the engine computes tail probabilities with.
    pub fn backend(&self) -> &Backend {
        self.settings.backend()
    }

    fn settings_with_power(&self, target_power: f64) -> Result<TestSettings> {
        Ok(self.settings.with_target_power(target_power)?)
    }

    /// Welch t-test of `first` against `second`.
    pub fn compare_means(&self, input: &MeanComparison) -> Result<StatisticalResult> {
        WelchTTest::new(self.settings).test(input)
    }

    /// [`compare_means`](Self::compare_means), also recommending the per-group
    /// size needed to reach `target_power` at the observed effect.
    pub fn compare_means_with_power(&self, input: &MeanComparison, target_power: f64) -> Result<StatisticalResult> {
        WelchTTest::new(self.settings_with_power(target_power)?).test(input)
    }

    /// Pooled two-proportion z-test of `first` against `second`.
    pub fn compare_proportions(&self, input: &ProportionComparison) -> Result<StatisticalResult> {
        ProportionZTest::new(self.settings).test(input)
    }

    /// [`compare_proportions`](Self::compare_proportions) with a per-group
    /// size recommendation for `target_power`.
    pub fn compare_proportions_with_power(
        &self,
        input: &ProportionComparison,
        target_power: f64,
    ) -> Result<StatisticalResult> {
        ProportionZTest::new(self.settings_with_power(target_power)?).test(input)
    }

    /// Tests a treatment/control pair with the test matching its metric.
    ///
    /// Treatment is the first group, so positive statistics favour treatment.
    pub fn analyze(&self, comparison: &Comparison) -> Result<StatisticalResult> {
        debug!(metric = ?comparison.metric(), "analyzing experiment");
        match *comparison {
            Comparison::Continuous { treatment, control } => {
                self.compare_means(&MeanComparison::new(treatment, control))
            }
            Comparison::Rate { treatment, control } => {
                self.compare_proportions(&ProportionComparison::new(treatment, control))
            }
        }
    }

    /// [`analyze`](Self::analyze) over many comparisons, results in input order.
    ///
    /// Runs on the rayon pool when the `rayon` feature is enabled.
    pub fn analyze_batch(&self, comparisons: &[Comparison]) -> Vec<Result<StatisticalResult>> {
        #[cfg(feature = "rayon")]
        {
            comparisons.par_iter().map(|c| self.analyze(c)).collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            comparisons.iter().map(|c| self.analyze(c)).collect()
        }
    }

    /// Confidence interval for a single group's mean, `mean ± t₁₋α/₂,n−1 · s/√n`.
    ///
    /// A single observation gives the degenerate interval `[mean, mean]`.
    pub fn mean_interval(&self, summary: &MeanSummary) -> Result<Interval<f64>> {
        validate::mean_summary("", summary)?;
        let level = self.confidence_level();
        if summary.size == 1 {
            return Ok(Interval::degenerate(summary.mean, level));
        }
        let df = (summary.size - 1) as f64;
        let t_critical = self.backend().t_quantile(1.0 - self.settings.alpha() / 2.0, df)?;
        let margin = ComputationError::check_finite(
            "standard error",
            t_critical * summary.std_dev / (summary.size as f64).sqrt(),
        )?;
        Ok(Interval::around(summary.mean, margin, level))
    }

    /// Sample-size planner sharing this engine's level and backend.
    pub fn planner(&self) -> SampleSizePlanner {
        SampleSizePlanner::from_settings(&self.settings)
    }

    /// See [`SampleSizePlanner::plan`].
    pub fn plan(&self, baseline_rate: f64, expected_lift: f64, target_power: f64) -> Result<SampleSize> {
        self.planner().plan(baseline_rate, expected_lift, target_power)
    }

    /// [`plan`](Self::plan) at 80 % power.
    pub fn minimum_sample_size(&self, baseline_rate: f64, expected_lift: f64) -> Result<SampleSize> {
        self.plan(baseline_rate, expected_lift, DEFAULT_TARGET_POWER)
    }

    /// Tests two bare values against each other.
    ///
    /// For rates, each value is a proportion and is turned into a success
    /// count by truncating `value · size`. For continuous metrics each value
    /// is a mean whose standard deviation is taken as [`QUICK_TEST_CV`] of its
    /// magnitude.
    pub fn quick_test(
        &self,
        control_value: f64,
        control_size: u64,
        treatment_value: f64,
        treatment_size: u64,
        metric: MetricKind,
    ) -> Result<QuickSummary> {
        let result = match metric {
            MetricKind::Rate => {
                validate::rate("treatment_value", treatment_value)?;
                validate::rate("control_value", control_value)?;
                let successes = |value: f64, size: u64| (value * size as f64).floor() as u64;
                self.compare_proportions(&ProportionComparison::new(
                    RateSummary::new(successes(treatment_value, treatment_size), treatment_size),
                    RateSummary::new(successes(control_value, control_size), control_size),
                ))?
            }
            MetricKind::Continuous => {
                validate::finite("treatment_value", treatment_value)?;
                validate::finite("control_value", control_value)?;
                let group = |value: f64, size: u64| MeanSummary::new(value, value.abs() * QUICK_TEST_CV, size);
                self.compare_means(&MeanComparison::new(
                    group(treatment_value, treatment_size),
                    group(control_value, control_size),
                ))?
            }
        };
        Ok(QuickSummary::from(result))
    }
}

impl Default for Engine {
    /// 95 % confidence on the detected backend.
    fn default() -> Self {
        Self {
            settings: TestSettings::validated(DEFAULT_CONFIDENCE_LEVEL, Backend::detect()),
        }
    }
}

/// Headline fields of a [`StatisticalResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickSummary {
    /// `p_value < α`.
    pub is_significant: bool,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Signed Cohen's d or h.
    pub effect_size: f64,
    /// One-paragraph plain-language reading.
    pub conclusion: String,
}

impl From<StatisticalResult> for QuickSummary {
    fn from(result: StatisticalResult) -> Self {
        Self {
            is_significant: result.is_significant,
            p_value: result.p_value,
            effect_size: result.effect_size,
            conclusion: result.conclusion,
        }
    }
}

/// [`Engine::quick_test`] on a default engine.
pub fn quick_significance_test(
    control_value: f64,
    control_size: u64,
    treatment_value: f64,
    treatment_size: u64,
    metric: MetricKind,
) -> Result<QuickSummary> {
    Engine::default().quick_test(control_value, control_size, treatment_value, treatment_size, metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn engine() -> Engine {
        Engine::new(0.95).unwrap().with_backend(BackendKind::Statrs)
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn rejects_invalid_confidence_levels() {
        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert_eq!(Engine::new(level).unwrap_err().field, "confidence_level");
        }
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());

        let config: EngineConfig =
            serde_json::from_str(r#"{"confidence_level":0.9,"backend":"closed-form"}"#).unwrap();
        let engine = Engine::from_config(&config).unwrap();
        assert_eq!(engine.confidence_level(), 0.9);
        assert_eq!(engine.backend().kind(), BackendKind::ClosedForm);

        assert!(serde_json::from_str::<EngineConfig>(r#"{"level":0.9}"#).is_err());
    }

    #[test]
    fn analyze_puts_treatment_first() {
        let comparison = Comparison::Rate {
            treatment: RateSummary::new(150, 1000),
            control: RateSummary::new(100, 1000),
        };
        let r = engine().analyze(&comparison).unwrap();
        assert!(r.statistic > 0.0);
        assert!(r.is_significant);

        let comparison = Comparison::Continuous {
            treatment: MeanSummary::new(85.0, 12.0, 50),
            control: MeanSummary::new(100.0, 15.0, 50),
        };
        let r = engine().analyze(&comparison).unwrap();
        assert!(r.statistic < 0.0);
        assert!(r.is_significant);
    }

    #[test]
    fn batch_preserves_order_and_errors() {
        let good = Comparison::Rate {
            treatment: RateSummary::new(150, 1000),
            control: RateSummary::new(100, 1000),
        };
        let bad = Comparison::Rate {
            treatment: RateSummary::new(1, 0),
            control: RateSummary::new(100, 1000),
        };
        let Ok([first, second, third]) = <[_; 3]>::try_from(engine().analyze_batch(&[good, bad, good])) else {
            panic!("expected one result per comparison");
        };
        assert!(first.is_ok() && third.is_ok());
        assert_eq!(second.unwrap_err().as_validation().unwrap().field, "first.total");
        assert_eq!(first, third);
    }

    #[test]
    fn mean_interval_uses_student_t() {
        let ci = engine().mean_interval(&MeanSummary::new(100.0, 15.0, 50)).unwrap();
        // t(0.975, 49) = 2.009575
        assert_relative_eq!(ci.half_width(), 2.009_575 * 15.0 / 50_f64.sqrt(), max_relative = 1e-5);
        assert!(ci.low < 100.0 && ci.high > 100.0);
        assert_abs_diff_eq!(100.0 - ci.low, ci.high - 100.0, epsilon = 1e-9);
    }

    #[test]
    fn mean_interval_for_huge_groups() {
        for kind in BackendKind::RANKED {
            let ci = engine()
                .with_backend(kind)
                .mean_interval(&MeanSummary::new(100.0, 15.0, 100_000_000))
                .unwrap();
            assert_relative_eq!(ci.half_width(), 1.959_964 * 15.0 / 1e4, max_relative = 1e-5);
        }
    }

    #[test]
    fn mean_interval_of_one_observation_is_degenerate() {
        let ci = engine().mean_interval(&MeanSummary::new(7.0, 2.0, 1)).unwrap();
        assert_eq!((ci.low, ci.high), (7.0, 7.0));
        let err = engine().mean_interval(&MeanSummary::new(7.0, 2.0, 0)).unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "size");
    }

    #[test]
    fn minimum_sample_size_defaults_to_eighty_percent_power() {
        let e = engine();
        assert_eq!(e.minimum_sample_size(0.05, 0.2).unwrap(), e.plan(0.05, 0.2, 0.8).unwrap());
    }

    #[test]
    fn quick_test_on_rates() {
        let summary = quick_significance_test(0.10, 1000, 0.15, 1000, MetricKind::Rate).unwrap();
        assert!(summary.is_significant);
        assert!(summary.p_value < 0.05);
        assert!(summary.effect_size > 0.0);
    }

    #[test]
    fn quick_test_on_means_assumes_ten_percent_spread() {
        let summary = engine().quick_test(100.0, 50, 110.0, 50, MetricKind::Continuous).unwrap();
        let full = engine()
            .compare_means(&MeanComparison::new(
                MeanSummary::new(110.0, 110.0 * QUICK_TEST_CV, 50),
                MeanSummary::new(100.0, 100.0 * QUICK_TEST_CV, 50),
            ))
            .unwrap();
        assert_eq!(summary, QuickSummary::from(full));
    }

    #[test]
    fn quick_test_rejects_rates_above_one() {
        let err = engine().quick_test(0.1, 100, 1.5, 100, MetricKind::Rate).unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "treatment_value");
    }

    #[test]
    fn power_target_is_validated() {
        let input = MeanComparison::new(MeanSummary::new(1.0, 1.0, 5), MeanSummary::new(2.0, 1.0, 5));
        let err = engine().compare_means_with_power(&input, 1.2).unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "target_power");
    }
}
