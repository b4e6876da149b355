use tracing::{debug, warn};

use super::{HypothesisTest, TestSettings, two_proportion_power};
use crate::backend::Distributions;
use crate::error::{ComputationError, Result};
use crate::numeric::{ConclusionFacts, cohens_h, percent_change, safe_sqrt, synthesize};
use crate::planner::rates_sample_size;
use crate::result::{EffectMagnitude, Interval, StatisticalResult};
use crate::summary::{MetricKind, ProportionComparison};
use crate::validate;

/// Pooled two-proportion z-test.
///
/// The statistic uses the pooled standard error under the null
/// (`p̂ = (x₁ + x₂)/(n₁ + n₂)`), the interval the unpooled one. The interval is
/// kept inside `[-1, 1]`, the range of a difference of proportions.
#[derive(Debug, Clone, Copy)]
pub struct ProportionZTest {
    settings: TestSettings,
}

impl ProportionZTest {
    /// Test with the given settings.
    pub fn new(settings: TestSettings) -> Self {
        Self { settings }
    }

    /// Settings the test runs with.
    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }
}

impl HypothesisTest<ProportionComparison> for ProportionZTest {
    fn test(&self, input: &ProportionComparison) -> Result<StatisticalResult> {
        validate::proportion_comparison(input)?;

        let dist = self.settings.backend();
        let level = self.settings.confidence_level();
        let alpha = self.settings.alpha();
        let ProportionComparison { first, second } = *input;
        let (n1, n2) = (first.total as f64, second.total as f64);
        let (p1, p2) = (first.proportion(), second.proportion());
        let diff = p1 - p2;

        let pooled = (first.successes as f64 + second.successes as f64) / (n1 + n2);
        let se_null = safe_sqrt(pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2), 0.0);
        let se_alt = safe_sqrt(p1 * (1.0 - p1) / n1 + p2 * (1.0 - p2) / n2, 0.0);

        let (statistic, p_value) = if se_null > 0.0 {
            let z = ComputationError::check_finite("z statistic", diff / se_null)?;
            (z, dist.two_sided_normal_p(z)?)
        } else {
            warn!(p1, p2, "pooled proportion on a boundary, reporting no evidence");
            (0.0, 1.0)
        };
        let is_significant = p_value < alpha;

        let effect_size = cohens_h(p1, p2);
        let z_critical = dist.normal_quantile(1.0 - alpha / 2.0)?;
        let confidence_interval = Interval::around(diff, z_critical * se_alt, level).clamp_to(-1.0, 1.0);
        let statistical_power = two_proportion_power(dist, diff, se_null, se_alt, z_critical)?;

        let sample_size_recommendation = match self.settings.target_power() {
            Some(power) => Some(rates_sample_size(dist, p1, p2, alpha, power)?),
            None => None,
        };

        let relative_change = percent_change(p1, p2);
        let conclusion = synthesize(&ConclusionFacts {
            is_significant,
            p_value,
            effect_size,
            relative_change,
            metric: MetricKind::Rate,
        });

        debug!(z = statistic, p_value, effect_size, "two-proportion z-test");

        Ok(StatisticalResult {
            test_type: format!("Two-proportion z-test ({})", dist.name()),
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
