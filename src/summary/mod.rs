mod read;

use serde::{Deserialize, Serialize};

pub use read::{ReadError, read_mean_summaries, read_rate_summaries};

/// Which kind of metric a comparison is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Continuous metric compared by mean (watch time, views per day…).
    Continuous,
    /// Rate compared by proportion (click-through, conversion…).
    Rate,
}

impl MetricKind {
    pub(crate) fn noun(self) -> &'static str {
        match self {
            MetricKind::Continuous => "mean",
            MetricKind::Rate => "rate",
        }
    }
}

/// Aggregated summary of one group for a continuous metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanSummary {
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Number of observations.
    pub size: u64,
}

impl MeanSummary {
    /// Unchecked summary; tests validate it before use.
    pub const fn new(mean: f64, std_dev: f64, size: u64) -> Self {
        Self { mean, std_dev, size }
    }
}

/// Aggregated summary of one group for a rate metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSummary {
    /// Observations that converted.
    pub successes: u64,
    /// Observations in the group.
    pub total: u64,
}

impl RateSummary {
    /// Unchecked summary; tests validate it before use.
    pub const fn new(successes: u64, total: u64) -> Self {
        Self { successes, total }
    }

    /// `successes / total`; zero for an empty group.
    pub fn proportion(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64
        }
    }
}

/// Two groups of a continuous metric; differences are `first − second`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanComparison {
    /// Treatment side.
    pub first: MeanSummary,
    /// Control side.
    pub second: MeanSummary,
}

impl MeanComparison {
    /// Pairs `first` against `second`.
    pub const fn new(first: MeanSummary, second: MeanSummary) -> Self {
        Self { first, second }
    }

    /// The same comparison with the groups exchanged.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self { first: self.second, second: self.first }
    }
}

/// Two groups of a rate metric; differences are `first − second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionComparison {
    /// Treatment side.
    pub first: RateSummary,
    /// Control side.
    pub second: RateSummary,
}

impl ProportionComparison {
    /// Pairs `first` against `second`.
    pub const fn new(first: RateSummary, second: RateSummary) -> Self {
        Self { first, second }
    }

    /// The same comparison with the groups exchanged.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self { first: self.second, second: self.first }
    }
}

/// A treatment/control pair tagged by metric type.
///
/// The treatment group is always tested as the first group, so a positive
/// effect means treatment beats control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum Comparison {
    /// Compared with Welch's t-test.
    Continuous {
        /// Tested as the first group.
        treatment: MeanSummary,
        /// Tested as the second group.
        control: MeanSummary,
    },
    /// Compared with the two-proportion z-test.
    Rate {
        /// Tested as the first group.
        treatment: RateSummary,
        /// Tested as the second group.
        control: RateSummary,
    },
}

impl Comparison {
    /// Metric kind of the pair.
    pub fn metric(&self) -> MetricKind {
        match self {
            Comparison::Continuous { .. } => MetricKind::Continuous,
            Comparison::Rate { .. } => MetricKind::Rate,
        }
    }
}
