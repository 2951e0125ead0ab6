//! Adaptive Runge-Kutta integration of first-order ODE systems
//!
//! The solver is generic over a [`DynamicalSystem`] callback, so the geodesic
//! equation is just one client of it.
//!
//! ## Method
//!
//! Dormand-Prince 5(4) with first-same-as-last reuse, RMS error control and
//! the usual Hairer initial step heuristic. Requested evaluation times are
//! filled by cubic Hermite interpolation inside each accepted step.
//!
//! ## Divergence guard
//!
//! Integration stops as soon as the state becomes non-finite or any component
//! exceeds [`SolverOptions::divergence_bound`]. The samples produced so far
//! are returned with [`SolveStatus::Diverged`] instead of an error, so callers
//! can still score the partial path.
//!
//! ```rust
//! use ontologica::integrate::{linspace, solve_ivp, DynamicalSystem, SolverOptions};
//!
//! struct Decay;
//!
//! impl DynamicalSystem for Decay {
//!     fn dimension(&self) -> usize {
//!         1
//!     }
//!
//!     fn apply(&self, _t: f64, state: &[f64], out: &mut [f64]) -> ontologica::Result<()> {
//!         out[0] = -state[0];
//!         Ok(())
//!     }
//! }
//!
//! let t_eval = linspace(0.0, 1.0, 11);
//! let solution = solve_ivp(&Decay, (0.0, 1.0), &[1.0], &t_eval, &SolverOptions::default())?;
//! assert_eq!(solution.t.len(), 11);
//! assert!((solution.y[10][0] - (-1.0_f64).exp()).abs() < 1e-3);
//! # Ok::<(), ontologica::Error>(())
//! ```

mod dopri;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// First-order system `dy/dt = f(t, y)`.
pub trait DynamicalSystem {
    /// Number of state components.
    fn dimension(&self) -> usize;

    /// Writes `f(t, state)` into `out`.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the right-hand side cannot be
    /// evaluated at `state` (for example a degenerate metric).
    fn apply(&self, t: f64, state: &[f64], out: &mut [f64]) -> Result<()>;
}

/// Tolerances and limits for [`solve_ivp`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
    /// Largest step the controller may take.
    pub max_step: f64,
    /// Fixed first step; estimated when `None`.
    pub first_step: Option<f64>,
    /// Accepted plus rejected step budget.
    pub max_steps: usize,
    /// Any state component beyond this magnitude counts as divergence.
    pub divergence_bound: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_step: f64::INFINITY,
            first_step: None,
            max_steps: 100_000,
            divergence_bound: 1e12,
        }
    }
}

impl SolverOptions {
    /// Set the relative tolerance.
    #[must_use]
    pub const fn rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// Set the absolute tolerance.
    #[must_use]
    pub const fn atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    /// Cap the step size.
    #[must_use]
    pub const fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    /// Use a fixed first step instead of the estimate.
    #[must_use]
    pub const fn first_step(mut self, first_step: f64) -> Self {
        self.first_step = Some(first_step);
        self
    }

    /// Set the step budget.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the divergence bound.
    #[must_use]
    pub const fn divergence_bound(mut self, bound: f64) -> Self {
        self.divergence_bound = bound;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(Error::InvalidInput(format!("rtol must be positive, got {}", self.rtol)));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(Error::InvalidInput(format!("atol must be positive, got {}", self.atol)));
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "max_step must be positive, got {}",
                self.max_step
            )));
        }
        if let Some(h) = self.first_step {
            if !(h.is_finite() && h > 0.0) {
                return Err(Error::InvalidInput(format!("first_step must be positive, got {h}")));
            }
        }
        if self.divergence_bound.is_nan() || self.divergence_bound <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "divergence_bound must be positive, got {}",
                self.divergence_bound
            )));
        }
        Ok(())
    }
}

/// How integration ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Reached the end of the time span.
    Success,
    /// Stopped early because the state blew up at time `t`.
    Diverged {
        /// Time of the first divergent step.
        t: f64,
    },
}

/// Sampled solution of an initial value problem.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeSolution {
    /// Evaluation times actually reached.
    pub t: Vec<f64>,
    /// State at each evaluation time.
    pub y: Vec<Vec<f64>>,
    /// Completion status.
    pub status: SolveStatus,
    /// Right-hand side evaluations.
    pub nfev: usize,
    /// Accepted steps.
    pub accepted_steps: usize,
    /// Rejected steps.
    pub rejected_steps: usize,
}

impl OdeSolution {
    /// Whether the full time span was integrated.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, SolveStatus::Success)
    }

    /// Last sampled state, if any sample was produced.
    #[must_use]
    pub fn last_state(&self) -> Option<&[f64]> {
        self.y.last().map(Vec::as_slice)
    }
}

/// `n` evenly spaced values over `[start, end]`, endpoints included.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        #[allow(clippy::cast_precision_loss)]
                        let offset = step * i as f64;
                        start + offset
                    }
                })
                .collect()
        }
    }
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / (dopri::ERROR_ESTIMATOR_ORDER + 1.0);

/// Integrates `system` forward over `t_span` starting from `y0`.
///
/// The returned solution holds one state per entry of `t_eval` that was
/// reached before completion or divergence.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if `y0` does not match the system
/// - [`Error::InvalidInput`] for a backwards span, unsorted or out-of-span
///   `t_eval`, non-finite `y0`, or invalid options
/// - [`Error::Integration`] if the step size underflows or the step budget
///   runs out
/// - any error raised by the system callback
pub fn solve_ivp<S>(
    system: &S,
    t_span: (f64, f64),
    y0: &[f64],
    t_eval: &[f64],
    options: &SolverOptions,
) -> Result<OdeSolution>
where
    S: DynamicalSystem + ?Sized,
{
    let dim = system.dimension();
    if y0.len() != dim {
        return Err(Error::DimensionMismatch {
            expected: dim,
            actual: y0.len(),
        });
    }
    options.validate()?;
    let (t0, t1) = t_span;
    if !(t0.is_finite() && t1.is_finite()) || t1 < t0 {
        return Err(Error::InvalidInput(format!(
            "time span must be finite and forward, got ({t0}, {t1})"
        )));
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput("initial state must be finite".to_string()));
    }
    if t_eval.windows(2).any(|w| w[1] < w[0]) {
        return Err(Error::InvalidInput("t_eval must be sorted".to_string()));
    }
    if t_eval.iter().any(|&t| t < t0 || t > t1 || t.is_nan()) {
        return Err(Error::InvalidInput(format!("t_eval must lie within [{t0}, {t1}]")));
    }

    let mut solution = OdeSolution {
        t: Vec::with_capacity(t_eval.len()),
        y: Vec::with_capacity(t_eval.len()),
        status: SolveStatus::Success,
        nfev: 0,
        accepted_steps: 0,
        rejected_steps: 0,
    };

    let mut next_eval = 0;
    while next_eval < t_eval.len() && t_eval[next_eval] <= t0 {
        solution.t.push(t_eval[next_eval]);
        solution.y.push(y0.to_vec());
        next_eval += 1;
    }

    let mut t = t0;
    let mut y = y0.to_vec();
    let mut f = vec![0.0; dim];
    system.apply(t, &y, &mut f)?;
    solution.nfev += 1;

    if t1 == t0 {
        return Ok(solution);
    }

    let mut h = match options.first_step {
        Some(h) => h,
        None => {
            let (h, evals) = initial_step(system, t0, &y, &f, options)?;
            solution.nfev += evals;
            h
        }
    }
    .min(options.max_step)
    .min(t1 - t0);

    let mut step_rejected = false;
    while t < t1 {
        if solution.accepted_steps + solution.rejected_steps >= options.max_steps {
            return Err(Error::Integration(format!(
                "exceeded {} steps at t = {t}",
                options.max_steps
            )));
        }

        let min_step = 10.0 * f64::EPSILON * t.abs();
        if h < min_step {
            return Err(Error::Integration(format!(
                "step size {h:e} fell below {min_step:e} at t = {t}"
            )));
        }

        let remaining = t1 - t;
        let final_step = h >= remaining;
        if final_step {
            h = remaining;
        }

        let outcome = dopri::step(system, t, &y, &f, h)?;
        solution.nfev += dopri::EVALUATIONS_PER_STEP;

        let error_norm = error_norm(&outcome.error, &y, &outcome.y_new, options);
        let t_new = if final_step { t1 } else { t + h };

        // A non-finite trial state cannot be rescued by shrinking the step
        if !error_norm.is_finite() || diverged(&outcome.y_new, options.divergence_bound) {
            warn!(t = t_new, "state diverged, stopping integration");
            solution.status = SolveStatus::Diverged { t: t_new };
            solution.rejected_steps += 1;
            return Ok(solution);
        }

        if error_norm < 1.0 {
            let mut factor = if error_norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * error_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
            };
            if step_rejected {
                factor = factor.min(1.0);
            }

            while next_eval < t_eval.len() && t_eval[next_eval] <= t_new {
                let te = t_eval[next_eval];
                solution.t.push(te);
                solution.y.push(hermite(t, h, &y, &f, &outcome.y_new, &outcome.f_new, te));
                next_eval += 1;
            }

            t = t_new;
            y = outcome.y_new;
            f = outcome.f_new;
            h = (h * factor).min(options.max_step);
            solution.accepted_steps += 1;
            step_rejected = false;
        } else {
            h *= (SAFETY * error_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
            solution.rejected_steps += 1;
            step_rejected = true;
        }
    }

    debug!(
        accepted = solution.accepted_steps,
        rejected = solution.rejected_steps,
        nfev = solution.nfev,
        "integration complete"
    );
    Ok(solution)
}

fn diverged(state: &[f64], bound: f64) -> bool {
    state.iter().any(|v| !v.is_finite() || v.abs() > bound)
}

fn rms(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    (values.map(|v| v * v).sum::<f64>() / n).sqrt()
}

fn error_norm(error: &[f64], y: &[f64], y_new: &[f64], options: &SolverOptions) -> f64 {
    let scaled = error
        .iter()
        .zip(y.iter().zip(y_new))
        .map(|(e, (a, b))| e / (options.atol + options.rtol * a.abs().max(b.abs())));
    rms(scaled, error.len())
}

fn initial_step<S>(
    system: &S,
    t0: f64,
    y0: &[f64],
    f0: &[f64],
    options: &SolverOptions,
) -> Result<(f64, usize)>
where
    S: DynamicalSystem + ?Sized,
{
    let dim = y0.len();
    let scale: Vec<f64> = y0
        .iter()
        .map(|v| options.atol + v.abs() * options.rtol)
        .collect();
    let d0 = rms(y0.iter().zip(&scale).map(|(v, s)| v / s), dim);
    let d1 = rms(f0.iter().zip(&scale).map(|(v, s)| v / s), dim);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };

    let y1: Vec<f64> = y0.iter().zip(f0).map(|(y, f)| y + h0 * f).collect();
    let mut f1 = vec![0.0; dim];
    system.apply(t0 + h0, &y1, &mut f1)?;

    let d2 = rms(
        f1.iter()
            .zip(f0)
            .zip(&scale)
            .map(|((a, b), s)| (a - b) / s),
        dim,
    ) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (dopri::ERROR_ESTIMATOR_ORDER + 1.0))
    };

    Ok(((100.0 * h0).min(h1), 1))
}

/// Cubic Hermite interpolation between two accepted states.
fn hermite(t: f64, h: f64, y0: &[f64], f0: &[f64], y1: &[f64], f1: &[f64], te: f64) -> Vec<f64> {
    let s = ((te - t) / h).clamp(0.0, 1.0);
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    (0..y0.len())
        .map(|i| h00 * y0[i] + h10 * h * f0[i] + h01 * y1[i] + h11 * h * f1[i])
        .collect()
}
