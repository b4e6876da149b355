use std::cmp::Ordering;

use super::{Distributions, LARGE_DF, large_df_t_quantile, large_df_t_to_z};
use crate::error::ComputationError;

/// Self-contained distribution functions.
///
/// - normal tail: Chebyshev fit of `erfc` (fractional error < 1.2e-7)
/// - normal quantile: Acklam's rational approximation (relative error < 1.2e-9)
/// - Student-t tail: regularized incomplete beta by continued fraction,
///   switching to a corrected normal approximation for very large df
/// - Student-t quantile: bracketing plus a capped bisection
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedForm;

const BETA_MAX_ITER: usize = 1000;
const BETA_EPS: f64 = 1e-15;
const FPMIN: f64 = 1e-300;
const BISECTION_STEPS: usize = 200;
const BRACKET_DOUBLINGS: usize = 1100;

/// Complementary error function.
pub(crate) fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * (-z * z + poly).exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

fn normal_tail(x: f64) -> f64 {
    0.5 * erfc(x / std::f64::consts::SQRT_2)
}

fn acklam_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// `ln Γ(x)` for `x > 0` (Lanczos).
pub(crate) fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> Result<f64, ComputationError> {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETA_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < BETA_EPS {
            return Ok(h);
        }
    }
    Err(ComputationError::new(
        "incomplete beta",
        format_args!("continued fraction did not converge for a={a}, b={b}, x={x}"),
    ))
}

/// Regularized incomplete beta `I_x(a, b)`.
pub(crate) fn regularized_beta(a: f64, b: f64, x: f64) -> Result<f64, ComputationError> {
    if x <= 0.0 {
        return Ok(0.0);
    }
    if x >= 1.0 {
        return Ok(1.0);
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        Ok(front * beta_continued_fraction(a, b, x)? / a)
    } else {
        Ok(1.0 - front * beta_continued_fraction(b, a, 1.0 - x)? / b)
    }
}

fn check_df(df: f64) -> Result<(), ComputationError> {
    if df.is_finite() && df > 0.0 {
        Ok(())
    } else {
        Err(ComputationError::new("t-distribution", format_args!("invalid degrees of freedom {df}")))
    }
}

impl Distributions for ClosedForm {
    fn name(&self) -> &'static str {
        "closed-form"
    }

    fn normal_sf(&self, x: f64) -> Result<f64, ComputationError> {
        if x.is_nan() {
            return Err(ComputationError::new("normal survival", "argument is NaN"));
        }
        Ok(normal_tail(x))
    }

    fn normal_quantile(&self, p: f64) -> Result<f64, ComputationError> {
        if !(p > 0.0 && p < 1.0) {
            return Err(ComputationError::new("normal quantile", format_args!("probability {p} outside (0, 1)")));
        }
        ComputationError::check_finite("normal quantile", acklam_quantile(p))
    }

    fn t_sf(&self, x: f64, df: f64) -> Result<f64, ComputationError> {
        check_df(df)?;
        if x.is_nan() {
            return Err(ComputationError::new("t-distribution survival", "argument is NaN"));
        }
        if x.is_infinite() {
            return Ok(if x > 0.0 { 0.0 } else { 1.0 });
        }
        if df > LARGE_DF {
            return Ok(normal_tail(large_df_t_to_z(x, df)));
        }
        // P(|T| > |x|) = I_{ν/(ν+x²)}(ν/2, 1/2)
        let both_tails = regularized_beta(df / 2.0, 0.5, df / (df + x * x))?;
        let upper = 0.5 * both_tails;
        ComputationError::check_finite("t-distribution survival", if x >= 0.0 { upper } else { 1.0 - upper })
    }

    fn t_quantile(&self, p: f64, df: f64) -> Result<f64, ComputationError> {
        check_df(df)?;
        if !(p > 0.0 && p < 1.0) {
            return Err(ComputationError::new(
                "t-distribution quantile",
                format_args!("probability {p} outside (0, 1)"),
            ));
        }
        match p.partial_cmp(&0.5) {
            Some(Ordering::Less) => return self.t_quantile(1.0 - p, df).map(|x| -x),
            Some(Ordering::Equal) => return Ok(0.0),
            _ => {}
        }
        if df > LARGE_DF {
            return ComputationError::check_finite("t-distribution quantile", large_df_t_quantile(acklam_quantile(p), df));
        }

        // solve sf(x) = 1 − p on x > 0; t tails are heavier than the normal's,
        // so the normal quantile is a lower bracket
        let target = 1.0 - p;
        let mut lo = 0.0;
        let mut hi = acklam_quantile(p).max(1.0);
        let mut doublings = 0;
        while self.t_sf(hi, df)? > target {
            lo = hi;
            hi *= 2.0;
            doublings += 1;
            if doublings > BRACKET_DOUBLINGS || !hi.is_finite() {
                return Err(ComputationError::new("t-distribution quantile", "failed to bracket the root"));
            }
        }

        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.t_sf(mid, df)? > target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= 1e-13 * hi.max(1.0) {
                break;
            }
        }
        Ok(0.5 * (lo + hi))
    }
}
