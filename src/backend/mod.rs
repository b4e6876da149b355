mod closed_form;
mod statrs_dist;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ComputationError;
use crate::numeric::clamp_unit;

pub use closed_form::ClosedForm;
pub use statrs_dist::StatrsDistributions;

/// Standard normal and Student-t primitives the hypothesis tests are built on.
///
/// Implementations differ only in how they evaluate these functions; every
/// formula above this layer is shared. Failures name the step that failed.
pub trait Distributions {
    /// Short tag recorded in `StatisticalResult::test_type`.
    fn name(&self) -> &'static str;

    /// `P(Z > x)` for a standard normal `Z`.
    fn normal_sf(&self, x: f64) -> Result<f64, ComputationError>;

    /// `x` such that `P(Z ≤ x) = p`, for `p ∈ (0, 1)`.
    fn normal_quantile(&self, p: f64) -> Result<f64, ComputationError>;

    /// `P(T > x)` for Student's t with `df` (possibly fractional) degrees of freedom.
    fn t_sf(&self, x: f64, df: f64) -> Result<f64, ComputationError>;

    /// `x` such that `P(T ≤ x) = p`, for `p ∈ (0, 1)`.
    fn t_quantile(&self, p: f64, df: f64) -> Result<f64, ComputationError>;

    /// `Φ(x)`.
    fn normal_cdf(&self, x: f64) -> Result<f64, ComputationError> {
        self.normal_sf(-x)
    }

    /// Two-tailed p-value of a z statistic, clamped into `[0, 1]`.
    fn two_sided_normal_p(&self, z: f64) -> Result<f64, ComputationError> {
        Ok(clamp_unit(2.0 * self.normal_sf(z.abs())?))
    }

    /// Two-tailed p-value of a t statistic, clamped into `[0, 1]`.
    fn two_sided_t_p(&self, t: f64, df: f64) -> Result<f64, ComputationError> {
        Ok(clamp_unit(2.0 * self.t_sf(t.abs(), df)?))
    }
}

/// Degrees of freedom past which Student's t is evaluated through the normal
/// distribution by every backend.
pub(crate) const LARGE_DF: f64 = 1e5;

/// Normal deviate with (to `O(ν⁻²)`) the same upper tail as `t` on `df`
/// degrees of freedom.
pub(crate) fn large_df_t_to_z(t: f64, df: f64) -> f64 {
    t * (1.0 - 1.0 / (4.0 * df)) / (1.0 + t * t / (2.0 * df)).sqrt()
}

/// Cornish–Fisher expansion of the t quantile around the normal quantile `z`:
///
/// ```text
/// t ≈ z + (z³ + z)/(4ν) + (5z⁵ + 16z³ + 3z)/(96ν²)
/// ```
pub(crate) fn large_df_t_quantile(z: f64, df: f64) -> f64 {
    let z2 = z * z;
    z + z * (z2 + 1.0) / (4.0 * df) + z * ((5.0 * z2 + 16.0) * z2 + 3.0) / (96.0 * df * df)
}

/// Identifies a distribution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// `statrs` distributions.
    Statrs,
    /// In-crate closed-form approximations.
    ClosedForm,
}

impl BackendKind {
    /// Preference order used by [`Backend::detect`].
    pub const RANKED: [BackendKind; 2] = [BackendKind::Statrs, BackendKind::ClosedForm];
}

/// A concrete backend, chosen once and copied into every test.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    /// Backed by the `statrs` crate.
    Statrs(StatrsDistributions),
    /// Backed by in-crate approximations.
    ClosedForm(ClosedForm),
}

static DETECTED: OnceLock<Backend> = OnceLock::new();

#[cfg(test)]
static SELECTION_RUNS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

// Reference values detection checks each candidate against.
const CHECK_TOLERANCE: f64 = 1e-5;
const CHECK_NORMAL_975: f64 = 1.959_963_984_540_054;
const CHECK_T_SF_2_10: f64 = 0.036_694_017_385_370;
const CHECK_T_975_10: f64 = 2.228_138_851_986_273;

impl Backend {
    /// The backend of the given kind, without checking it.
    pub fn new(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Statrs => Backend::Statrs(StatrsDistributions),
            BackendKind::ClosedForm => Backend::ClosedForm(ClosedForm),
        }
    }

    /// Which backend this is.
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Statrs(_) => BackendKind::Statrs,
            Backend::ClosedForm(_) => BackendKind::ClosedForm,
        }
    }

    /// Evaluates a few reference points and fails if any is off.
    pub fn self_check(&self) -> Result<(), ComputationError> {
        let close = |got: f64, want: f64| (got - want).abs() <= CHECK_TOLERANCE * want.abs();
        let checks = [
            ("normal quantile", self.normal_quantile(0.975)?, CHECK_NORMAL_975),
            ("t-distribution survival", self.t_sf(2.0, 10.0)?, CHECK_T_SF_2_10),
            ("t-distribution quantile", self.t_quantile(0.975, 10.0)?, CHECK_T_975_10),
        ];
        for (step, got, want) in checks {
            if !close(got, want) {
                return Err(ComputationError::new(step, format_args!("self-check returned {got}, expected {want}")));
            }
        }
        Ok(())
    }

    /// Highest-ranked backend whose self-check passes.
    ///
    /// The checks run on the first call only; later calls return the same
    /// backend. The closed-form backend is the last resort and is returned
    /// even if its own check fails.
    pub fn detect() -> Self {
        *DETECTED.get_or_init(Self::select)
    }

    fn select() -> Self {
        #[cfg(test)]
        SELECTION_RUNS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        for kind in BackendKind::RANKED {
            let backend = Backend::new(kind);
            match backend.self_check() {
                Ok(()) => {
                    debug!(backend = backend.name(), "selected distribution backend");
                    return backend;
                }
                Err(e) => warn!(backend = backend.name(), error = %e, "distribution backend failed self-check"),
            }
        }
        Backend::new(BackendKind::ClosedForm)
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::detect()
    }
}

impl Distributions for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Statrs(b) => b.name(),
            Backend::ClosedForm(b) => b.name(),
        }
    }

    fn normal_sf(&self, x: f64) -> Result<f64, ComputationError> {
        match self {
            Backend::Statrs(b) => b.normal_sf(x),
            Backend::ClosedForm(b) => b.normal_sf(x),
        }
    }

    fn normal_quantile(&self, p: f64) -> Result<f64, ComputationError> {
        match self {
            Backend::Statrs(b) => b.normal_quantile(p),
            Backend::ClosedForm(b) => b.normal_quantile(p),
        }
    }

    fn t_sf(&self, x: f64, df: f64) -> Result<f64, ComputationError> {
        match self {
            Backend::Statrs(b) => b.t_sf(x, df),
            Backend::ClosedForm(b) => b.t_sf(x, df),
        }
    }

    fn t_quantile(&self, p: f64, df: f64) -> Result<f64, ComputationError> {
        match self {
            Backend::Statrs(b) => b.t_quantile(p, df),
            Backend::ClosedForm(b) => b.t_quantile(p, df),
        }
    }
}
