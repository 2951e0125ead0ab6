//! Metric field of the knowledge space and its Levi-Civita connection

use nalgebra::{DMatrix, SymmetricEigen};

use crate::{Error, Result};

/// Symmetry tolerance when validating a metric.
const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Position-dependent metric tensor `g(p)`.
pub trait MetricField {
    /// Number of coordinates.
    fn dimension(&self) -> usize;

    /// Metric components at `position`.
    ///
    /// Callers guarantee `position.len() == self.dimension()`.
    fn metric_at(&self, position: &[f64]) -> DMatrix<f64>;
}

/// Knowledge-space metric: a Minkowski-like background with a bump of
/// complexity curvature in the spatial block.
///
/// ```text
/// g_ij(p) = η_ij + c_ij · s(p)
/// c_ij    = A · exp(-(x_i² + x_j²)) · (1 + ¼(sin 2πx_i + sin 2πx_j))   (i, j ≥ 1)
/// s(p)    = exp(-Σ_{k≥1} p_k² / 2w²)
/// ```
///
/// with `η = diag(-1, 1, …, 1)` and `x = linspace(-1, 1, n)`. At the origin
/// `s = 1`, which gives the static educational metric.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeMetric {
    dimension: usize,
    width: f64,
    curvature: DMatrix<f64>,
}

impl KnowledgeMetric {
    /// Build the metric for `dimension` coordinates.
    ///
    /// `amplitude` scales the complexity curvature, `width` sets how quickly
    /// it fades away from the origin.
    #[must_use]
    pub fn new(dimension: usize, amplitude: f64, width: f64) -> Self {
        let grid = crate::integrate::linspace(-1.0, 1.0, dimension);
        let two_pi = 2.0 * std::f64::consts::PI;

        let mut curvature = DMatrix::zeros(dimension, dimension);
        for i in 1..dimension {
            for j in i..dimension {
                let (xi, xj) = (grid[i], grid[j]);
                let envelope = (-(xi * xi + xj * xj)).exp();
                let ripple = 1.0 + 0.25 * ((two_pi * xi).sin() + (two_pi * xj).sin());
                let value = amplitude * envelope * ripple;
                curvature[(i, j)] = value;
                curvature[(j, i)] = value;
            }
        }

        Self {
            dimension,
            width,
            curvature,
        }
    }

    /// Curvature coefficients `c_ij`.
    #[must_use]
    pub const fn curvature(&self) -> &DMatrix<f64> {
        &self.curvature
    }

    /// Strength `s(p)` of the curvature bump at `position`.
    #[must_use]
    pub fn curvature_strength(&self, position: &[f64]) -> f64 {
        let r2: f64 = position.iter().skip(1).map(|p| p * p).sum();
        (-r2 / (2.0 * self.width * self.width)).exp()
    }
}

impl MetricField for KnowledgeMetric {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric_at(&self, position: &[f64]) -> DMatrix<f64> {
        let strength = self.curvature_strength(position);
        let mut g = DMatrix::identity(self.dimension, self.dimension);
        if self.dimension > 0 {
            g[(0, 0)] = -1.0;
        }
        g + &self.curvature * strength
    }
}

/// Checks symmetry, invertibility and the `(-, +, …, +)` signature, and
/// returns the inverse metric.
///
/// # Errors
///
/// Returns [`Error::InvalidMetric`] describing the first failed check.
pub fn validate_metric(metric: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if metric.nrows() != metric.ncols() {
        return Err(Error::InvalidMetric(format!(
            "metric must be square but had shape {}×{}",
            metric.nrows(),
            metric.ncols()
        )));
    }
    if metric.nrows() == 0 {
        return Err(Error::InvalidMetric("metric must not be empty".to_string()));
    }
    if metric.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidMetric("metric has non-finite components".to_string()));
    }

    let n = metric.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (metric[(i, j)] - metric[(j, i)]).abs() > SYMMETRY_TOLERANCE {
                return Err(Error::InvalidMetric(format!(
                    "metric must be symmetric but g[{i},{j}] = {} and g[{j},{i}] = {}",
                    metric[(i, j)],
                    metric[(j, i)]
                )));
            }
        }
    }

    let Some(inverse) = metric.clone().try_inverse() else {
        return Err(Error::InvalidMetric("metric is degenerate and cannot be inverted".to_string()));
    };

    let eigen = SymmetricEigen::new(metric.clone());
    let negative = eigen.eigenvalues.iter().filter(|v| **v < -SYMMETRY_TOLERANCE).count();
    let positive = eigen.eigenvalues.iter().filter(|v| **v > SYMMETRY_TOLERANCE).count();
    if negative != 1 || positive != n - 1 {
        return Err(Error::InvalidMetric(format!(
            "expected signature (-, +, …, +) but found {negative} negative and {positive} positive eigenvalues"
        )));
    }

    Ok(inverse)
}

/// Christoffel symbols `Γᵐᵢⱼ` of the Levi-Civita connection at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct ChristoffelSymbols {
    dimension: usize,
    coefficients: Vec<f64>,
}

impl ChristoffelSymbols {
    /// Approximates the connection of `field` at `position` from
    /// second-order central differences of the metric with spacing `step`.
    ///
    /// ```text
    /// Γᵐᵢⱼ = ½ Σ_k g^{mk} (∂ᵢ g_jk + ∂ⱼ g_ik − ∂_k g_ij)
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `position` has the wrong length
    /// - [`Error::InvalidInput`] if `step` is not positive
    /// - [`Error::InvalidMetric`] if the metric at `position` is degenerate
    pub fn from_metric_field<F>(field: &F, position: &[f64], step: f64) -> Result<Self>
    where
        F: MetricField + ?Sized,
    {
        let n = field.dimension();
        if position.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: position.len(),
            });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidInput(format!(
                "finite difference step must be positive, got {step}"
            )));
        }

        let Some(g_inv) = field.metric_at(position).try_inverse() else {
            return Err(Error::InvalidMetric(format!(
                "metric is degenerate at {position:?}"
            )));
        };

        let mut probe = position.to_vec();
        let partials: Vec<DMatrix<f64>> = (0..n)
            .map(|k| {
                probe[k] = position[k] + step;
                let plus = field.metric_at(&probe);
                probe[k] = position[k] - step;
                let minus = field.metric_at(&probe);
                probe[k] = position[k];
                (plus - minus) / (2.0 * step)
            })
            .collect();

        let mut coefficients = vec![0.0; n * n * n];
        for m in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let mut sum = 0.0;
                    for k in 0..n {
                        let term = partials[i][(j, k)] + partials[j][(i, k)] - partials[k][(i, j)];
                        sum += g_inv[(m, k)] * term;
                    }
                    coefficients[(m * n + i) * n + j] = 0.5 * sum;
                }
            }
        }

        Ok(Self {
            dimension: n,
            coefficients,
        })
    }

    /// Number of coordinates.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// `Γᵐᵢⱼ`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    #[must_use]
    pub fn get(&self, m: usize, i: usize, j: usize) -> f64 {
        let n = self.dimension;
        assert!(m < n && i < n && j < n, "index out of range for dimension {n}");
        self.coefficients[(m * n + i) * n + j]
    }

    /// Geodesic acceleration `aᵐ = −Σᵢⱼ Γᵐᵢⱼ vⁱ vʲ`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `velocity` has the wrong length.
    pub fn acceleration(&self, velocity: &[f64]) -> Result<Vec<f64>> {
        let n = self.dimension;
        if velocity.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                actual: velocity.len(),
            });
        }
        let mut out = vec![0.0; n];
        self.accelerate_into(velocity, &mut out);
        Ok(out)
    }

    pub(crate) fn accelerate_into(&self, velocity: &[f64], out: &mut [f64]) {
        let n = self.dimension;
        for (m, slot) in out.iter_mut().enumerate().take(n) {
            let block = &self.coefficients[m * n * n..(m + 1) * n * n];
            let mut acc = 0.0;
            for i in 0..n {
                for j in 0..n {
                    acc += block[i * n + j] * velocity[i] * velocity[j];
                }
            }
            *slot = -acc;
        }
    }

    /// Largest `|Γᵐᵢⱼ − Γᵐⱼᵢ|` over all indices.
    #[must_use]
    pub fn max_asymmetry(&self) -> f64 {
        let n = self.dimension;
        let mut worst: f64 = 0.0;
        for m in 0..n {
            for i in 0..n {
                for j in (i + 1)..n {
                    worst = worst.max((self.get(m, i, j) - self.get(m, j, i)).abs());
                }
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(usize);

    impl MetricField for Flat {
        fn dimension(&self) -> usize {
            self.0
        }

        fn metric_at(&self, _position: &[f64]) -> DMatrix<f64> {
            let mut g = DMatrix::identity(self.0, self.0);
            g[(0, 0)] = -1.0;
            g
        }
    }

    /// Polar coordinates on the plane: ds² = dr² + r² dθ²
    struct Polar;

    impl MetricField for Polar {
        fn dimension(&self) -> usize {
            2
        }

        fn metric_at(&self, position: &[f64]) -> DMatrix<f64> {
            let r = position[0];
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, r * r])
        }
    }

    #[test]
    fn test_origin_metric_signature() {
        let metric = KnowledgeMetric::new(4, 0.1, 1.0);
        let g = metric.metric_at(&[0.0; 4]);
        assert!(g[(0, 0)] < 0.0);
        for i in 1..4 {
            assert!(g[(i, i)] > 0.0);
        }
        assert!(validate_metric(&g).is_ok());
    }

    #[test]
    fn test_metric_is_exactly_symmetric() {
        let metric = KnowledgeMetric::new(6, 0.1, 1.0);
        let g = metric.metric_at(&[0.3, -0.2, 0.5, 0.1, 0.9, -0.4]);
        assert_eq!(g, g.transpose());
    }

    #[test]
    fn test_time_row_is_untouched_by_curvature() {
        let metric = KnowledgeMetric::new(5, 0.1, 1.0);
        let g = metric.metric_at(&[0.0; 5]);
        for j in 1..5 {
            assert_eq!(g[(0, j)], 0.0);
        }
    }

    #[test]
    fn test_validate_rejects_bad_metrics() {
        let asymmetric = DMatrix::from_row_slice(2, 2, &[-1.0, 0.5, 0.0, 1.0]);
        assert!(matches!(validate_metric(&asymmetric), Err(Error::InvalidMetric(_))));

        let degenerate = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 0.0]);
        assert!(matches!(validate_metric(&degenerate), Err(Error::InvalidMetric(_))));

        let riemannian = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(validate_metric(&riemannian), Err(Error::InvalidMetric(_))));
    }

    #[test]
    fn test_flat_metric_has_vanishing_connection() {
        let gamma = ChristoffelSymbols::from_metric_field(&Flat(3), &[0.2, 0.4, 0.6], 1e-4).unwrap();
        for m in 0..3 {
            for i in 0..3 {
                for j in 0..3 {
                    assert!(gamma.get(m, i, j).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_polar_connection_matches_analytic() {
        // Γʳθθ = −r, Γθrθ = Γθθr = 1/r
        let r = 2.0;
        let gamma = ChristoffelSymbols::from_metric_field(&Polar, &[r, 0.3], 1e-4).unwrap();
        assert!((gamma.get(0, 1, 1) + r).abs() < 1e-6);
        assert!((gamma.get(1, 0, 1) - 1.0 / r).abs() < 1e-6);
        assert!((gamma.get(1, 1, 0) - 1.0 / r).abs() < 1e-6);
        assert!(gamma.get(0, 0, 0).abs() < 1e-9);
    }

    #[test]
    fn test_connection_symmetric_in_lower_indices() {
        let metric = KnowledgeMetric::new(4, 0.1, 1.0);
        let gamma =
            ChristoffelSymbols::from_metric_field(&metric, &[0.5, 0.5, 0.5, 0.5], 1e-4).unwrap();
        assert_eq!(gamma.max_asymmetry(), 0.0);
    }

    #[test]
    fn test_acceleration_dimension_check() {
        let gamma = ChristoffelSymbols::from_metric_field(&Flat(2), &[0.0, 0.0], 1e-4).unwrap();
        assert!(gamma.acceleration(&[1.0]).is_err());
        assert_eq!(gamma.acceleration(&[1.0, 2.0]).unwrap(), vec![0.0, 0.0]);
    }
}
