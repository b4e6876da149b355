use std::fmt;

use thiserror::Error;

/// A caller-supplied value violates a precondition.
///
/// Raised before any arithmetic runs; `field` names the offending input
/// (e.g. `"first.std_dev"`), `rule` states the violated constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field}: {rule}")]
pub struct ValidationError {
    /// Name of the offending parameter.
    pub field: String,
    /// Human-readable description of the violated constraint.
    pub rule: String,
}

impl ValidationError {
    pub(crate) fn new(field: impl Into<String>, rule: impl fmt::Display) -> Self {
        Self {
            field: field.into(),
            rule: rule.to_string(),
        }
    }
}

/// A numeric step failed on otherwise valid input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("computation failed at {step}: {reason}")]
pub struct ComputationError {
    /// The computation step that failed (e.g. `"t-distribution survival"`).
    pub step: &'static str,
    /// What went wrong.
    pub reason: String,
}

impl ComputationError {
    pub(crate) fn new(step: &'static str, reason: impl fmt::Display) -> Self {
        Self {
            step,
            reason: reason.to_string(),
        }
    }

    /// Fails with this step unless `value` is finite.
    pub(crate) fn check_finite(step: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::new(step, format_args!("non-finite value {value}")))
        }
    }
}

/// Everything a test or the planner can fail with.
///
/// `Validation` means the caller must fix the input; `Computation` means the
/// test could not be run. A test that ran and found nothing is `Ok` with
/// `is_significant == false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input rejected before any computation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Internal numeric failure.
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl EngineError {
    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EngineError::Validation(e) => Some(e),
            EngineError::Computation(_) => None,
        }
    }

    /// `true` when the input was rejected rather than the computation failing.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

/// Shorthand used across the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
