use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use super::{Distributions, LARGE_DF, large_df_t_quantile, large_df_t_to_z};
use crate::error::ComputationError;

/// Distribution functions from the `statrs` crate.
///
/// Past [`LARGE_DF`] degrees of freedom Student's t is mapped onto the normal
/// distribution; `StudentsT::inverse_cdf` does not terminate in reasonable
/// time there.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsDistributions;

fn standard_normal() -> Result<Normal, ComputationError> {
    Normal::new(0.0, 1.0).map_err(|e| ComputationError::new("standard normal", e))
}

fn students_t(df: f64) -> Result<StudentsT, ComputationError> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| ComputationError::new("t-distribution", e))
}

fn check_probability(step: &'static str, p: f64) -> Result<(), ComputationError> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(ComputationError::new(step, format_args!("probability {p} outside (0, 1)")))
    }
}

impl Distributions for StatrsDistributions {
    fn name(&self) -> &'static str {
        "statrs"
    }

    fn normal_sf(&self, x: f64) -> Result<f64, ComputationError> {
        ComputationError::check_finite("normal survival", standard_normal()?.sf(x))
    }

    fn normal_quantile(&self, p: f64) -> Result<f64, ComputationError> {
        check_probability("normal quantile", p)?;
        ComputationError::check_finite("normal quantile", standard_normal()?.inverse_cdf(p))
    }

    fn t_sf(&self, x: f64, df: f64) -> Result<f64, ComputationError> {
        if df > LARGE_DF {
            return self.normal_sf(large_df_t_to_z(x, df));
        }
        ComputationError::check_finite("t-distribution survival", students_t(df)?.sf(x))
    }

    fn t_quantile(&self, p: f64, df: f64) -> Result<f64, ComputationError> {
        check_probability("t-distribution quantile", p)?;
        if df > LARGE_DF {
            let z = standard_normal()?.inverse_cdf(p);
            return ComputationError::check_finite("t-distribution quantile", large_df_t_quantile(z, df));
        }
        ComputationError::check_finite("t-distribution quantile", students_t(df)?.inverse_cdf(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn huge_df_quantile_returns_normal_value() {
        let st = StatrsDistributions;
        for df in [2e7, 2e8, 1e12] {
            assert_relative_eq!(st.t_quantile(0.975, df).unwrap(), 1.959_963_985, max_relative = 1e-7);
        }
        assert!(st.t_quantile(0.975, f64::INFINITY).unwrap().is_finite());
    }

    #[test]
    fn large_df_switch_is_continuous() {
        let st = StatrsDistributions;
        let below = st.t_quantile(0.975, LARGE_DF).unwrap();
        let above = st.t_quantile(0.975, LARGE_DF * (1.0 + 1e-9)).unwrap();
        assert_relative_eq!(below, above, max_relative = 1e-7);

        let below = st.t_sf(2.5, LARGE_DF).unwrap();
        let above = st.t_sf(2.5, LARGE_DF * (1.0 + 1e-9)).unwrap();
        assert_relative_eq!(below, above, max_relative = 1e-6);
    }
}
