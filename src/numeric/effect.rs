use super::safe::{clamp_unit, finite_or, safe_ratio, safe_sqrt};

/// Cohen's h for two proportions: `2·(asin √p₁ − asin √p₂)`.
///
/// Both proportions are clamped into `[0, 1]` first. The result lies in
/// `[−π, π]`; a non-finite transform yields `0.0`.
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    let phi = |p: f64| 2.0 * clamp_unit(p).sqrt().asin();
    finite_or(phi(p1) - phi(p2), 0.0)
}

/// Pooled standard deviation of two independent groups.
///
/// ```text
/// s_p = √( ((n₁−1)s₁² + (n₂−1)s₂²) / (n₁+n₂−2) )
/// ```
///
/// With one observation per group there are no degrees of freedom left, so the
/// root mean square of the two standard deviations is used instead.
pub fn pooled_std_dev(std1: f64, n1: u64, std2: f64, n2: u64) -> f64 {
    let dof = (n1 + n2).saturating_sub(2);
    if dof == 0 {
        return safe_sqrt((std1 * std1 + std2 * std2) / 2.0, 0.0);
    }
    let ss = (n1.saturating_sub(1)) as f64 * std1 * std1 + (n2.saturating_sub(1)) as f64 * std2 * std2;
    safe_sqrt(ss / dof as f64, 0.0)
}

/// Cohen's d: `(m₁ − m₂) / s_p`. Zero spread gives `0.0`.
pub fn cohens_d(mean1: f64, std1: f64, n1: u64, mean2: f64, std2: f64, n2: u64) -> f64 {
    let pooled = pooled_std_dev(std1, n1, std2, n2);
    safe_ratio(mean1 - mean2, pooled, 0.0)
}
