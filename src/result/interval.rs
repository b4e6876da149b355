use std::fmt;

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Confidence interval around a point estimate.
///
/// Constructors guarantee `low <= high`; a non-finite margin collapses the
/// interval onto the estimate instead of producing NaN bounds.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Interval<T> {
    /// Lower bound.
    pub low: T,
    /// Upper bound.
    pub high: T,
    /// Point estimate the interval is built around.
    pub estimate: T,
    /// Nominal coverage, in `(0, 1)`.
    pub level: f64,
}

impl<T: Float> Interval<T> {
    /// Symmetric interval `[estimate − margin, estimate + margin]`.
    ///
    /// The margin's sign is ignored.
    pub fn around(estimate: T, margin: T, level: f64) -> Self {
        let margin = if margin.is_finite() { margin.abs() } else { T::zero() };
        Self {
            low: estimate - margin,
            high: estimate + margin,
            estimate,
            level,
        }
    }

    /// Zero-width interval `[estimate, estimate]`.
    pub fn degenerate(estimate: T, level: f64) -> Self {
        Self::around(estimate, T::zero(), level)
    }

    /// Restricts both bounds to `[lo, hi]` (for differences with a natural range).
    #[must_use]
    pub fn clamp_to(mut self, lo: T, hi: T) -> Self {
        self.low = self.low.max(lo).min(hi);
        self.high = self.high.max(lo).min(hi);
        self
    }

    /// Inclusive containment.
    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.low <= value && value <= self.high
    }

    /// `true` when `value` lies strictly outside the interval.
    #[inline]
    pub fn excludes(&self, value: T) -> bool {
        !self.contains(value)
    }

    /// `high − low`.
    #[inline]
    pub fn width(&self) -> T {
        self.high - self.low
    }

    /// Margin on either side of the estimate.
    #[inline]
    pub fn half_width(&self) -> T {
        self.width() / (T::one() + T::one())
    }

    /// Ordered bounds, finite estimate inside them, level in `(0, 1)`.
    pub fn is_valid(&self) -> bool {
        self.low <= self.high
            && self.contains(self.estimate)
            && self.level > 0.0
            && self.level < 1.0
    }

    /// Format with metrology-style precision: the half-width is rounded to two
    /// significant digits and the estimate to the same decimal place.
    pub fn format(&self, style: IntervalStyle) -> FormattedInterval<'_, T> {
        FormattedInterval { interval: self, style }
    }
}

/// Rendering options for [`Interval::format`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntervalStyle {
    /// `[0.021, 0.079]`
    Bounds,
    /// `0.050 ± 0.029`
    Symmetric,
    /// `0.050 ± 0.029 (95%)`
    #[default]
    WithLevel,
}

/// Display adapter returned by [`Interval::format`].
pub struct FormattedInterval<'a, T> {
    interval: &'a Interval<T>,
    style: IntervalStyle,
}

impl<T: Float + fmt::Display> fmt::Display for FormattedInterval<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Interval { low, high, estimate, level } = *self.interval;
        let half = self.interval.half_width().to_f64().unwrap_or(f64::NAN);

        // two significant digits on the half-width, at least 0 and at most 12 decimals
        let decimals = if half.is_finite() && half > 0.0 {
            (1.0 - half.log10().floor()).clamp(0.0, 12.0) as usize
        } else {
            4
        };
        let show = |x: T| match x.to_f64() {
            Some(v) if v.is_finite() => format!("{v:.decimals$}"),
            _ => format!("{x}"),
        };

        match self.style {
            IntervalStyle::Bounds => write!(f, "[{}, {}]", show(low), show(high)),
            IntervalStyle::Symmetric => write!(f, "{} ± {}", show(estimate), show(self.interval.half_width())),
            IntervalStyle::WithLevel => write!(
                f,
                "{} ± {} ({:.0}%)",
                show(estimate),
                show(self.interval.half_width()),
                level * 100.0
            ),
        }
    }
}

impl<T: Float + fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(IntervalStyle::Bounds))
    }
}
