use std::fmt::Write;

use num_traits::Zero;

use crate::result::EffectMagnitude;
use crate::summary::MetricKind;

/// Message used when nothing numeric survives sanitizing.
pub const GENERIC_CONCLUSION: &str =
    "Statistical test completed. Review the reported values for interpretation.";

/// Already-computed fields the conclusion is assembled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConclusionFacts {
    /// Whether the test rejected equality at its α.
    pub is_significant: bool,
    /// Two-sided p-value, possibly non-finite.
    pub p_value: f64,
    /// Signed effect size (Cohen's d or h).
    pub effect_size: f64,
    /// Percent change of the first group over the second.
    pub relative_change: Option<f64>,
    /// Picks the noun used in the wording.
    pub metric: MetricKind,
}

/// Percent change `(first − second) / |second| · 100`.
///
/// The sign always follows `first − second`. `None` for a zero baseline or a
/// non-finite ratio.
pub fn percent_change(first: f64, second: f64) -> Option<f64> {
    if second.is_zero() || !first.is_finite() || !second.is_finite() {
        return None;
    }
    let change = (first - second) / second.abs() * 100.0;
    change.is_finite().then_some(change)
}

/// One-paragraph summary of a finished test.
///
/// Reads only the supplied facts and never panics: a non-finite p-value is
/// shown as `n/a` and never described as significant, a non-finite effect is
/// read as zero, and a missing percentage falls back to the effect's sign.
pub fn synthesize(facts: &ConclusionFacts) -> String {
    let mut out = String::with_capacity(160);
    if write_conclusion(&mut out, facts).is_err() || out.is_empty() {
        return GENERIC_CONCLUSION.to_string();
    }
    out
}

fn write_conclusion(out: &mut String, facts: &ConclusionFacts) -> std::fmt::Result {
    let noun = facts.metric.noun();

    if facts.p_value.is_finite() {
        let p = format_p(facts.p_value);
        if facts.is_significant {
            write!(out, "Statistically significant difference detected ({p}).")?;
        } else {
            write!(out, "No statistically significant difference found ({p}).")?;
        }
    } else {
        out.push_str("Significance could not be assessed (p=n/a).");
    }
    let significant = facts.is_significant && facts.p_value.is_finite();
    let qualifier = if significant { "significant" } else { "not significant" };

    let effect = if facts.effect_size.is_finite() { facts.effect_size } else { 0.0 };

    match facts.relative_change.filter(|c| c.is_finite()) {
        Some(change) if !change.is_zero() => {
            let direction = if change > 0.0 { "increase" } else { "decrease" };
            write!(
                out,
                " Treatment {noun} shows a {:.1}% {direction} over control ({qualifier}).",
                change.abs()
            )?;
        }
        Some(_) => write!(out, " Treatment {noun} is unchanged from control ({qualifier}).")?,
        None => {
            let direction = if effect > 0.0 {
                "higher than"
            } else if effect < 0.0 {
                "lower than"
            } else {
                "level with"
            };
            write!(out, " Treatment {noun} is {direction} control ({qualifier}).")?;
        }
    }

    let magnitude = EffectMagnitude::from_effect_size(effect);
    write!(out, " Effect size: {effect:.3} ({magnitude}).")
}

fn format_p(p: f64) -> String {
    if p < 0.0001 {
        "p<0.0001".to_string()
    } else {
        format!("p={p:.4}")
    }
}
