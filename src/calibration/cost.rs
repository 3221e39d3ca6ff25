//! Separation score between good and bad attack durations
//!
//! Fits a Normal distribution to each population (mean and population
//! standard deviation) and computes:
//!
//! - **overlap**: the overlapping coefficient of the two Normals, the shared
//!   area under both densities. Lower is better separated.
//! - **margin**: `min(bad) - max(good)`. Positive when every good duration is
//!   shorter than every bad one.
//!
//! Overlap is undefined when the good mean is not strictly below the bad
//! mean, or when either population has zero spread. Both metrics are
//! undefined when either population is empty.
//!
//! # Reference
//!
//! Inman, H. F., & Bradley, E. L. (1989). The overlapping coefficient as a
//! measure of agreement between probability distributions and point
//! estimation of the overlap of two normal densities.
//! *Communications in Statistics - Theory and Methods*, 18(10), 3851-3874.

use serde::{Deserialize, Serialize};

/// Separation of two duration populations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationScore {
    /// Overlapping coefficient of the fitted Normals, in `[0, 1]`
    pub overlap: Option<f64>,
    /// `min(bad) - max(good)`
    pub margin: Option<f64>,
}

/// Normal distribution fitted to a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalFit {
    /// Sample mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl NormalFit {
    /// Fit mean and population standard deviation; `None` for an empty sample
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// Cumulative distribution function
    pub fn cdf(&self, x: f64) -> f64 {
        0.5 * erfc(-(x - self.mean) / (self.std_dev * std::f64::consts::SQRT_2))
    }

    /// Overlapping coefficient with another Normal
    ///
    /// Returns `None` if either standard deviation is zero.
    pub fn overlap(&self, other: &NormalFit) -> Option<f64> {
        if self.std_dev <= 0.0 || other.std_dev <= 0.0 {
            return None;
        }

        // Order by (std_dev, mean) so the result is symmetric
        let (x, y) = if (other.std_dev, other.mean) < (self.std_dev, self.mean) {
            (other, self)
        } else {
            (self, other)
        };

        let dv = y.variance() - x.variance();
        let dm = (y.mean - x.mean).abs();

        if dv == 0.0 {
            let shifted = NormalFit {
                mean: dm,
                std_dev: 2.0 * x.std_dev,
            };
            return Some(2.0 * shifted.cdf(0.0));
        }

        let a = x.mean * y.variance() - y.mean * x.variance();
        let b = x.std_dev * y.std_dev * (dm * dm + dv * (y.variance() / x.variance()).ln()).sqrt();
        let x1 = (a + b) / dv;
        let x2 = (a - b) / dv;

        let coefficient =
            1.0 - ((y.cdf(x1) - x.cdf(x1)).abs() + (y.cdf(x2) - x.cdf(x2)).abs());
        Some(coefficient.clamp(0.0, 1.0))
    }
}

/// Complementary error function
///
/// Chebyshev approximation with fractional error below 1.2e-7 everywhere
/// (Press et al., *Numerical Recipes*, §6.2).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * (-z * z + poly).exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Score how well a configuration separates good from bad durations
///
/// # Arguments
///
/// * `good` - Attack durations of the good (clean) recordings
/// * `bad` - Attack durations of the bad (dirty) recordings
///
/// # Example
///
/// ```
/// use attack_time::calibration::cost::separation_score;
///
/// let score = separation_score(&[10.0, 11.0, 12.0], &[20.0, 21.0, 22.0]);
/// assert_eq!(score.margin, Some(8.0));
/// assert!(score.overlap.unwrap() < 1e-6);
/// ```
pub fn separation_score(good: &[f64], bad: &[f64]) -> SeparationScore {
    let (good_fit, bad_fit) = match (NormalFit::fit(good), NormalFit::fit(bad)) {
        (Some(g), Some(b)) => (g, b),
        _ => {
            return SeparationScore {
                overlap: None,
                margin: None,
            }
        }
    };

    let max_good = good.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_bad = bad.iter().copied().fold(f64::INFINITY, f64::min);
    let margin = Some(min_bad - max_good);

    let overlap = if good_fit.mean < bad_fit.mean {
        good_fit.overlap(&bad_fit)
    } else {
        None
    };

    SeparationScore { overlap, margin }
}
