//! One-sample significance testing over per-run rate samples.
//!
//! The question: did the item's observed share at some fullness level
//! drift from its nominal physical share (1 / number of item types)?
//! Answered with a two-sided one-sample Student t-test. The p-value
//! comes from the regularized incomplete beta function, evaluated
//! with a Lentz continued fraction and a Lanczos log-gamma.

use crate::error::{SimError, SimResult};
use serde::Serialize;

/// Fixed significance level callers compare `p_value` against.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub observed_mean: f64,
    pub samples: usize,
}

/// Two-sided one-sample t-test of `rate_samples` against
/// `baseline_rate`.
///
/// Zero-variance samples are degenerate for the t statistic and get a
/// defined answer instead of NaN: a perfect match with the baseline
/// is p = 1.0, any constant offset from it is p = 0.0.
pub fn test_rate(rate_samples: &[f64], baseline_rate: f64) -> SimResult<RateTest> {
    let n = rate_samples.len();
    if n < 2 {
        return Err(SimError::InsufficientData {
            context: "rate significance test",
            needed: 2,
            got: n,
        });
    }

    let nf = n as f64;
    let mean = rate_samples.iter().sum::<f64>() / nf;
    let variance = rate_samples
        .iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>()
        / (nf - 1.0);

    if variance == 0.0 {
        let diff = mean - baseline_rate;
        let (t_statistic, p_value) = if diff == 0.0 {
            (0.0, 1.0)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        };
        return Ok(RateTest {
            t_statistic,
            p_value,
            observed_mean: mean,
            samples: n,
        });
    }

    let standard_error = (variance / nf).sqrt();
    let t_statistic = (mean - baseline_rate) / standard_error;
    let degrees_of_freedom = nf - 1.0;

    Ok(RateTest {
        t_statistic,
        p_value: two_sided_p(t_statistic, degrees_of_freedom),
        observed_mean: mean,
        samples: n,
    })
}

/// P(|T| >= |t|) for a Student t variable with `df` degrees of
/// freedom: I_x(df/2, 1/2) at x = df / (df + t^2).
fn two_sided_p(t: f64, df: f64) -> f64 {
    reg_incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// Regularized incomplete beta function I_x(a, b).
fn reg_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    // The continued fraction converges fast only on one side of the
    // mean; use the symmetry relation on the other.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Lentz's algorithm for the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 200;
    const EPS: f64 = 3e-14;
    const FPMIN: f64 = 1e-300;

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

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let numerator = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + numerator * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + numerator / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let numerator = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + numerator * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + numerator / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation of ln(Γ(x)), g = 7.
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 8] = [
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut accumulator = 0.999_999_999_999_809_93;
    for (i, &coefficient) in COEFFICIENTS.iter().enumerate() {
        accumulator += coefficient / (x + i as f64 + 1.0);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + accumulator.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Closed forms for small degrees of freedom:
    //   df = 1: P(|T| >= t) = 1 - (2/pi) * atan(t)
    //   df = 2: P(|T| >= t) = 1 - t / sqrt(t^2 + 2)

    #[test]
    fn p_value_matches_closed_form_df1() {
        let expected = 1.0 - (2.0 / std::f64::consts::PI) * 1.0f64.atan();
        assert!((two_sided_p(1.0, 1.0) - expected).abs() < 1e-10);
        assert!((two_sided_p(1.0, 1.0) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn p_value_matches_closed_form_df2() {
        for t in [0.5f64, 1.0, 2.0, 5.0] {
            let expected = 1.0 - t / (t * t + 2.0).sqrt();
            assert!(
                (two_sided_p(t, 2.0) - expected).abs() < 1e-10,
                "t = {t}: got {}, expected {expected}",
                two_sided_p(t, 2.0)
            );
        }
    }

    #[test]
    fn p_value_is_one_at_t_zero() {
        for df in [1.0, 2.0, 10.0, 100.0] {
            assert!((two_sided_p(0.0, df) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ln_gamma_matches_known_values() {
        // Γ(0.5) = sqrt(pi), Γ(1) = 1, Γ(5) = 24.
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-12);
        assert!(ln_gamma(1.0).abs() < 1e-12);
        assert!((ln_gamma(5.0) - 24.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn incomplete_beta_endpoints() {
        assert_eq!(reg_incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(reg_incomplete_beta(2.0, 3.0, 1.0), 1.0);
        // I_x(1, 1) = x (uniform distribution).
        assert!((reg_incomplete_beta(1.0, 1.0, 0.37) - 0.37).abs() < 1e-12);
    }
}
