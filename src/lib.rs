//! Significance engine for two-group content experiments.
//!
//! Given aggregated summaries of a treatment and a control group, decides
//! whether their difference is statistically real and how large and reliable
//! it is: Welch's t-test for means, the pooled two-proportion z-test for
//! rates, Cohen's d and h, power, and sample-size planning.

mod backend;
mod display;
mod engine;
mod error;
mod hypothesis;
mod numeric;
mod planner;
mod result;
mod summary;

pub mod validate;

pub use crate::backend::{Backend, BackendKind, ClosedForm, Distributions, StatrsDistributions};
pub use crate::engine::{
    DEFAULT_CONFIDENCE_LEVEL, Engine, EngineConfig, QUICK_TEST_CV, QuickSummary, quick_significance_test,
};
pub use crate::error::{ComputationError, EngineError, Result, ValidationError};
pub use crate::hypothesis::*;
pub use crate::numeric::*;
pub use crate::planner::{DEFAULT_TARGET_POWER, SampleSizePlanner};
pub use crate::result::*;
pub use crate::summary::*;
