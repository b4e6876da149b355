//! Degenerate-case-safe building blocks shared by the hypothesis tests.

mod conclusion;
mod effect;
mod safe;
mod welch;

pub use conclusion::{ConclusionFacts, GENERIC_CONCLUSION, percent_change, synthesize};
pub use effect::{cohens_d, cohens_h, pooled_std_dev};
pub use safe::{clamp_finite, clamp_unit, finite_or, safe_ratio, safe_sqrt};
pub use welch::{FALLBACK_DF, welch_satterthwaite_df};
