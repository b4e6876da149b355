use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;

use crate::result::{EffectMagnitude, IntervalStyle, SampleSize, StatisticalResult};

fn format_p(p: f64) -> String {
    if !p.is_finite() {
        "n/a".to_string()
    } else if p < 0.0001 {
        "< 0.0001".to_string()
    } else {
        format!("{p:.4}")
    }
}

fn format_statistic(x: f64) -> String {
    if x.abs() > 999.0 {
        format!("{x:+.1e}")
    } else {
        format!("{x:+.3}")
    }
}

fn row(metric: &str, value: String, interpretation: impl Into<String>) -> Vec<Cell> {
    vec![
        Cell::new(metric).set_alignment(CellAlignment::Left),
        Cell::new(value).set_alignment(CellAlignment::Right),
        Cell::new(interpretation.into()).set_alignment(CellAlignment::Left),
    ]
}

impl StatisticalResult {
    /// Two stacked tables: a title row naming the test, then one row per
    /// reported quantity with a short reading of it.
    pub fn display(&self) -> String {
        let alpha = self.alpha();

        let p_interpretation = if !self.p_value.is_finite() {
            "⚪ Not assessed"
        } else if self.is_significant {
            "🔴 Reject equality"
        } else if self.p_value < 2.0 * alpha {
            "🟠 Weak evidence of a difference"
        } else {
            "🟢 Cannot reject equality"
        };

        let effect_interpretation = match self.effect_size_interpretation {
            EffectMagnitude::Negligible => "🟢 Negligible",
            EffectMagnitude::Small => "🟡 Small",
            EffectMagnitude::Medium => "🟠 Medium",
            EffectMagnitude::Large => "🔴 Large",
        };

        let power_interpretation = if self.statistical_power >= 0.8 {
            "🟢 Adequately powered"
        } else if self.statistical_power >= 0.5 {
            "🟡 Underpowered"
        } else {
            "🔴 Severely underpowered"
        };

        let ci = &self.confidence_interval;
        let ci_interpretation = if ci.excludes(0.0) { "Excludes zero" } else { "Contains zero" };

        let mut title_table = Table::new();
        title_table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .add_row(vec![Cell::new(&self.test_type).set_alignment(CellAlignment::Center)]);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Metric").set_alignment(CellAlignment::Center),
                Cell::new("Value").set_alignment(CellAlignment::Center),
                Cell::new("Interpretation").set_alignment(CellAlignment::Center),
            ]);

        table
            .add_row(row("p-value", format_p(self.p_value), p_interpretation))
            .add_row(row("Statistic", format_statistic(self.statistic), format!("α = {alpha:.3}")))
            .add_row(row(
                &format!("{:.0}% CI", self.confidence_level * 100.0),
                ci.format(IntervalStyle::Bounds).to_string(),
                ci_interpretation,
            ))
            .add_row(row("Effect size", format!("{:+.3}", self.effect_size), effect_interpretation))
            .add_row(row("Power", format!("{:.3}", self.statistical_power), power_interpretation));

        if let Some(change) = self.relative_change {
            table.add_row(row("Relative change", format!("{change:+.1}%"), "Treatment over control"));
        }
        if let Some(size) = self.sample_size_recommendation {
            let value = match size {
                SampleSize::Finite(n) => n.to_string(),
                SampleSize::Unreachable => "∞".to_string(),
            };
            table.add_row(row("Recommended n", value, "Per group"));
        }

        format!("{title_table}\n{table}\n{}", self.conclusion)
    }
}

impl Display for StatisticalResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
