mod power;
mod proportion;
mod welch;

pub use power::{noncentral_t_power, two_proportion_power};
pub use proportion::ProportionZTest;
pub use welch::WelchTTest;

use crate::backend::Backend;
use crate::error::{Result, ValidationError};
use crate::result::StatisticalResult;
use crate::validate;

/// A two-group hypothesis test over aggregated summaries.
///
/// Implementations validate `input` completely before computing anything and
/// return a fresh result per call.
pub trait HypothesisTest<I> {
    /// Runs the test on one comparison.
    fn test(&self, input: &I) -> Result<StatisticalResult>;
}

/// Configuration shared by every test: the confidence level, the distribution
/// backend, and optionally a target power for a sample-size recommendation.
#[derive(Debug, Clone, Copy)]
pub struct TestSettings {
    confidence_level: f64,
    target_power: Option<f64>,
    backend: Backend,
}

impl TestSettings {
    /// Settings without a target power, rejecting a level outside (0, 1).
    pub fn new(confidence_level: f64, backend: Backend) -> Result<Self, ValidationError> {
        validate::confidence_level(confidence_level)?;
        Ok(Self::validated(confidence_level, backend))
    }

    pub(crate) const fn validated(confidence_level: f64, backend: Backend) -> Self {
        Self {
            confidence_level,
            target_power: None,
            backend,
        }
    }

    /// The same settings on another backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Also recommend the per-group size needed to reach `power` at the
    /// observed effect.
    pub fn with_target_power(mut self, power: f64) -> Result<Self, ValidationError> {
        validate::open_unit("target_power", power)?;
        self.target_power = Some(power);
        Ok(self)
    }

    /// Level of the reported interval.
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Significance threshold `1 − confidence_level`.
    pub fn alpha(&self) -> f64 {
        1.0 - self.confidence_level
    }

    /// Power a sample-size recommendation aims for, if requested.
    pub fn target_power(&self) -> Option<f64> {
        self.target_power
    }

    /// Distribution backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }
}
