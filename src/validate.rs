//! Precondition checks run before any test arithmetic.
//!
//! Each check names the offending field as `"{group}.{field}"` (or just the
//! field when no group applies) and fails on the first violated rule.

use crate::error::ValidationError;
use crate::summary::{MeanComparison, MeanSummary, ProportionComparison, RateSummary};

type Check = Result<(), ValidationError>;

fn qualified(group: &str, field: &str) -> String {
    if group.is_empty() {
        field.to_string()
    } else {
        format!("{group}.{field}")
    }
}

/// Rejects NaN and ±∞.
pub fn finite(field: &str, value: f64) -> Check {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(field, format_args!("must be a finite number, got {value}")))
    }
}

/// A confidence level in the open interval `(0, 1)`.
pub fn confidence_level(level: f64) -> Check {
    open_unit("confidence_level", level)
}

/// A probability strictly between 0 and 1 (confidence levels, target power).
pub fn open_unit(field: &str, value: f64) -> Check {
    finite(field, value)?;
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, format_args!("must lie strictly between 0 and 1, got {value}")))
    }
}

/// A rate or proportion in the closed interval `[0, 1]`.
pub fn rate(field: &str, value: f64) -> Check {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, format_args!("must lie between 0 and 1, got {value}")))
    }
}

/// Relative lift: finite and no lower than −100 %.
pub fn lift(field: &str, value: f64) -> Check {
    finite(field, value)?;
    if value >= -1.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, format_args!("must be at least -1, got {value}")))
    }
}

fn positive_size(field: String, size: u64) -> Check {
    if size >= 1 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be a positive integer, got 0"))
    }
}

/// Mean, standard deviation and size of one group.
pub fn mean_summary(group: &str, s: &MeanSummary) -> Check {
    finite(&qualified(group, "mean"), s.mean)?;

    let std_field = qualified(group, "std_dev");
    finite(&std_field, s.std_dev)?;
    if s.std_dev < 0.0 {
        return Err(ValidationError::new(
            std_field,
            format_args!("must be non-negative, got {}", s.std_dev),
        ));
    }

    positive_size(qualified(group, "size"), s.size)
}

/// Successes and total of one group.
pub fn rate_summary(group: &str, s: &RateSummary) -> Check {
    positive_size(qualified(group, "total"), s.total)?;
    if s.successes > s.total {
        return Err(ValidationError::new(
            qualified(group, "successes"),
            format_args!("{} cannot exceed total {}", s.successes, s.total),
        ));
    }
    Ok(())
}

/// Both groups of a mean comparison, first then second.
pub fn mean_comparison(c: &MeanComparison) -> Check {
    mean_summary("first", &c.first)?;
    mean_summary("second", &c.second)
}

/// Both groups of a proportion comparison, first then second.
pub fn proportion_comparison(c: &ProportionComparison) -> Check {
    rate_summary("first", &c.first)?;
    rate_summary("second", &c.second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(check: Check) -> String {
        check.expect_err("expected a validation failure").field
    }

    #[test]
    fn accepts_ordinary_summaries() {
        assert!(mean_summary("first", &MeanSummary::new(100.0, 15.0, 50)).is_ok());
        assert!(mean_summary("first", &MeanSummary::new(-3.0, 0.0, 1)).is_ok());
        assert!(rate_summary("first", &RateSummary::new(0, 1)).is_ok());
        assert!(rate_summary("first", &RateSummary::new(7, 7)).is_ok());
    }

    #[test]
    fn rejects_bad_standard_deviations() {
        for std_dev in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let s = MeanSummary::new(1.0, std_dev, 10);
            assert_eq!(field_of(mean_summary("second", &s)), "second.std_dev");
        }
    }

    #[test]
    fn rejects_non_finite_mean() {
        let s = MeanSummary::new(f64::INFINITY, 1.0, 10);
        assert_eq!(field_of(mean_summary("first", &s)), "first.mean");
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(field_of(mean_summary("first", &MeanSummary::new(1.0, 1.0, 0))), "first.size");
        assert_eq!(field_of(rate_summary("second", &RateSummary::new(0, 0))), "second.total");
    }

    #[test]
    fn rejects_successes_over_total() {
        let err = rate_summary("first", &RateSummary::new(11, 10)).unwrap_err();
        assert_eq!(err.field, "first.successes");
        assert!(err.rule.contains("cannot exceed"));
    }

    #[test]
    fn confidence_level_is_open_interval() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert_eq!(field_of(confidence_level(bad)), "confidence_level");
        }
        assert!(confidence_level(0.95).is_ok());
        assert!(confidence_level(1e-9).is_ok());
    }

    #[test]
    fn rate_is_closed_interval() {
        assert!(rate("baseline_rate", 0.0).is_ok());
        assert!(rate("baseline_rate", 1.0).is_ok());
        assert_eq!(field_of(rate("baseline_rate", 1.01)), "baseline_rate");
        assert_eq!(field_of(rate("baseline_rate", f64::INFINITY)), "baseline_rate");
    }

    #[test]
    fn lift_floor_is_minus_one() {
        assert!(lift("expected_lift", -1.0).is_ok());
        assert_eq!(field_of(lift("expected_lift", -1.5)), "expected_lift");
        assert_eq!(field_of(lift("expected_lift", f64::NAN)), "expected_lift");
    }

    #[test]
    fn comparisons_check_first_group_first() {
        let c = MeanComparison::new(MeanSummary::new(1.0, -1.0, 5), MeanSummary::new(1.0, -1.0, 0));
        assert_eq!(field_of(mean_comparison(&c)), "first.std_dev");

        let c = ProportionComparison::new(RateSummary::new(1, 2), RateSummary::new(3, 2));
        assert_eq!(field_of(proportion_comparison(&c)), "second.successes");
    }
}
