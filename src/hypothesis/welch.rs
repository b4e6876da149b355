use tracing::{debug, warn};

use super::{HypothesisTest, TestSettings, noncentral_t_power};
use crate::backend::Distributions;
use crate::error::{ComputationError, Result};
use crate::numeric::{ConclusionFacts, cohens_d, percent_change, synthesize, welch_satterthwaite_df};
use crate::planner::effect_sample_size;
use crate::result::{EffectMagnitude, Interval, StatisticalResult};
use crate::summary::{MeanComparison, MetricKind};
use crate::validate;

/// Welch's unequal-variance two-sample t-test on group summaries.
///
/// ```text
/// se = √(s₁²/n₁ + s₂²/n₂)
/// t  = (m₁ − m₂) / se
/// ν  = Welch–Satterthwaite
/// p  = 2·P(T_ν > |t|)
/// ```
///
/// The interval is `(m₁ − m₂) ± t₁₋α/₂,ν · se` and the effect size is
/// Cohen's d with the pooled standard deviation.
#[derive(Debug, Clone, Copy)]
pub struct WelchTTest {
    settings: TestSettings,
}

impl WelchTTest {
    /// Test with the given settings.
    pub fn new(settings: TestSettings) -> Self {
        Self { settings }
    }

    /// Settings the test runs with.
    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }
}

impl HypothesisTest<MeanComparison> for WelchTTest {
    fn test(&self, input: &MeanComparison) -> Result<StatisticalResult> {
        validate::mean_comparison(input)?;

        let dist = self.settings.backend();
        let level = self.settings.confidence_level();
        let alpha = self.settings.alpha();
        let MeanComparison { first, second } = *input;
        let (n1, n2) = (first.size, second.size);

        let diff = ComputationError::check_finite("mean difference", first.mean - second.mean)?;
        let variance = ComputationError::check_finite(
            "standard error",
            first.std_dev.powi(2) / n1 as f64 + second.std_dev.powi(2) / n2 as f64,
        )?;
        let se = variance.sqrt();
        let df = welch_satterthwaite_df(first.std_dev, n1, second.std_dev, n2);

        let (statistic, p_value) = if se > 0.0 {
            let t = ComputationError::check_finite("t statistic", diff / se)?;
            (t, dist.two_sided_t_p(t, df)?)
        } else {
            warn!(diff, "both groups have zero variance, reporting no evidence");
            (0.0, 1.0)
        };
        let is_significant = p_value < alpha;

        let effect_size = cohens_d(first.mean, first.std_dev, n1, second.mean, second.std_dev, n2);
        let t_critical = dist.t_quantile(1.0 - alpha / 2.0, df)?;
        let confidence_interval = Interval::around(diff, t_critical * se, level);
        let statistical_power = noncentral_t_power(dist, effect_size, n1, n2, df, t_critical)?;

        let sample_size_recommendation = match self.settings.target_power() {
            Some(power) => Some(effect_sample_size(dist, effect_size, alpha, power)?),
            None => None,
        };

        let relative_change = percent_change(first.mean, second.mean);
        let conclusion = synthesize(&ConclusionFacts {
            is_significant,
            p_value,
            effect_size,
            relative_change,
            metric: MetricKind::Continuous,
        });

        debug!(t = statistic, df, p_value, effect_size, "welch t-test");

        Ok(StatisticalResult {
            test_type: format!("Welch two-sample t-test ({})", dist.name()),
            statistic,
            p_value,
            is_significant,
            confidence_level: level,
            confidence_interval,
            effect_size,
            effect_size_interpretation: EffectMagnitude::from_effect_size(effect_size),
            statistical_power,
            sample_size_recommendation,
            relative_change,
            conclusion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendKind};
    use crate::result::SampleSize;
    use crate::summary::MeanSummary;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn welch(level: f64) -> WelchTTest {
        WelchTTest::new(TestSettings::new(level, Backend::new(BackendKind::Statrs)).unwrap())
    }

    fn scenario() -> MeanComparison {
        MeanComparison::new(MeanSummary::new(100.0, 15.0, 50), MeanSummary::new(85.0, 12.0, 50))
    }

    #[test]
    fn detects_a_fifteen_point_difference() {
        let r = welch(0.95).test(&scenario()).unwrap();
        assert_relative_eq!(r.statistic, 5.5216, max_relative = 1e-4);
        assert!(r.p_value < 1e-5);
        assert!(r.is_significant);
        assert_relative_eq!(r.effect_size, 1.104_315, max_relative = 1e-5);
        assert_eq!(r.effect_size_interpretation, EffectMagnitude::Large);
        assert!(r.confidence_interval.excludes(0.0));
        assert_abs_diff_eq!(r.confidence_interval.estimate, 15.0);
        assert!(r.statistical_power > 0.99);
        assert_eq!(r.relative_change.map(|c| (c * 100.0).round() / 100.0), Some(17.65));
        assert_eq!(r.sample_size_recommendation, None);
        assert_eq!(r.test_type, "Welch two-sample t-test (statrs)");
    }

    #[test]
    fn small_difference_is_not_significant() {
        let input = MeanComparison::new(MeanSummary::new(100.0, 15.0, 50), MeanSummary::new(99.0, 15.0, 50));
        let r = welch(0.95).test(&input).unwrap();
        assert!(!r.is_significant);
        assert!(r.confidence_interval.contains(0.0));
        assert!(r.conclusion.starts_with("No statistically significant difference"));
    }

    #[test]
    fn identical_groups_show_nothing() {
        let g = MeanSummary::new(42.0, 3.0, 30);
        let r = welch(0.95).test(&MeanComparison::new(g, g)).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.effect_size, 0.0);
        assert_relative_eq!(r.p_value, 1.0, max_relative = 1e-12);
        assert!(!r.is_significant);
    }

    #[test]
    fn zero_variance_reports_no_evidence() {
        let input = MeanComparison::new(MeanSummary::new(5.0, 0.0, 10), MeanSummary::new(4.0, 0.0, 10));
        let r = welch(0.95).test(&input).unwrap();
        assert_eq!((r.statistic, r.p_value), (0.0, 1.0));
        assert_eq!(r.effect_size, 0.0);
        assert_eq!(r.confidence_interval.width(), 0.0);
        assert!(r.statistical_power.is_finite());
    }

    #[test]
    fn single_observations_fall_back_to_one_degree_of_freedom() {
        let input = MeanComparison::new(MeanSummary::new(3.0, 1.0, 1), MeanSummary::new(1.0, 1.0, 1));
        let r = welch(0.95).test(&input).unwrap();
        assert!(r.statistic.is_finite());
        assert!((0.0..=1.0).contains(&r.p_value));
        assert!(r.confidence_interval.low <= r.confidence_interval.high);
    }

    #[test]
    fn hundred_million_per_group_uses_normal_critical_value() {
        let n = 100_000_000;
        let input = MeanComparison::new(MeanSummary::new(100.0, 15.0, n), MeanSummary::new(99.99, 15.0, n));
        let r = welch(0.95).test(&input).unwrap();
        let se = 15.0 * (2.0 / n as f64).sqrt();
        assert_relative_eq!(r.statistic, 0.01 / se, max_relative = 1e-6);
        assert_relative_eq!(r.confidence_interval.half_width(), 1.959_964 * se, max_relative = 1e-5);
        assert!(r.is_significant);
        assert!((0.0..=1.0).contains(&r.statistical_power));
    }

    #[test]
    fn recommends_size_for_target_power() {
        let settings = TestSettings::new(0.95, Backend::new(BackendKind::Statrs))
            .unwrap()
            .with_target_power(0.8)
            .unwrap();
        let r = WelchTTest::new(settings).test(&scenario()).unwrap();
        let n = r.sample_size_recommendation.and_then(SampleSize::per_group).unwrap();
        assert!((10..20).contains(&n), "n = {n}");
    }

    #[test]
    fn rejects_negative_spread() {
        let input = MeanComparison::new(MeanSummary::new(1.0, 1.0, 5), MeanSummary::new(1.0, -1.0, 5));
        let err = welch(0.95).test(&input).unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "second.std_dev");
    }

    #[test]
    fn huge_means_fail_as_computation() {
        let input = MeanComparison::new(MeanSummary::new(f64::MAX, 1.0, 5), MeanSummary::new(-f64::MAX, 1.0, 5));
        let err = welch(0.95).test(&input).unwrap_err();
        assert!(!err.is_validation());
    }
}
