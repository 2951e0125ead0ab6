//! Descriptive statistics used by the experiment analyses
//!
//! Conventions follow the dataframe libraries the records are usually
//! compared against: sample standard deviation uses `n - 1`, and undefined
//! results (too few samples, zero variance) are `None` rather than `NaN`.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, Median, Statistics};

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Sample standard deviation (`ddof = 1`), `None` when fewer than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.iter().std_dev())
}

/// Population standard deviation (`ddof = 0`).
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().population_std_dev())
}

/// Median, averaging the two central values for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values.to_vec()).median())
}

/// Pearson correlation coefficient.
///
/// Returns `None` if the slices differ in length, hold fewer than two
/// points, or either side has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let sx = sample_std(xs)?;
    let sy = sample_std(ys)?;
    if sx <= f64::EPSILON || sy <= f64::EPSILON {
        return None;
    }
    let cov = xs.iter().covariance(ys.iter());
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

/// Two-sided p-value of Student's two-sample t-test with pooled variance.
///
/// `None` when either group has fewer than two samples or the pooled
/// variance is zero.
#[must_use]
pub fn student_t_test(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (mean(a)?, mean(b)?);
    let va = a.iter().variance();
    let vb = b.iter().variance();

    let df = na + nb - 2.0;
    let pooled = ((na - 1.0) * va + (nb - 1.0) * vb) / df;
    if pooled <= 0.0 {
        return None;
    }
    let t = (ma - mb) / (pooled * (1.0 / na + 1.0 / nb)).sqrt();
    let distribution = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * distribution.sf(t.abs())).clamp(0.0, 1.0))
}
