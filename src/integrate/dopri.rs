//! Dormand-Prince 5(4) tableau and single step

use super::DynamicalSystem;
use crate::Result;

/// Order of the embedded error estimator.
pub(super) const ERROR_ESTIMATOR_ORDER: f64 = 4.0;

/// Six stages plus the first-same-as-last evaluation at the new point.
pub(super) const EVALUATIONS_PER_STEP: usize = 6;

const STAGES: usize = 6;

const C: [f64; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

const B: [f64; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

// Fifth-order minus embedded fourth-order weights; the last entry applies to
// the derivative at the new point.
const E: [f64; STAGES + 1] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339_200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Result of one trial step.
pub(super) struct StepOutcome {
    pub y_new: Vec<f64>,
    pub f_new: Vec<f64>,
    pub error: Vec<f64>,
}

/// Takes one trial step of size `h` from `(t, y)` where `f = f(t, y)`.
pub(super) fn step<S>(system: &S, t: f64, y: &[f64], f: &[f64], h: f64) -> Result<StepOutcome>
where
    S: DynamicalSystem + ?Sized,
{
    let dim = y.len();
    let mut k: Vec<Vec<f64>> = Vec::with_capacity(STAGES + 1);
    k.push(f.to_vec());

    let mut stage_state = vec![0.0; dim];
    for s in 1..STAGES {
        for i in 0..dim {
            let increment: f64 = (0..s).map(|j| A[s][j] * k[j][i]).sum();
            stage_state[i] = y[i] + h * increment;
        }
        let mut ks = vec![0.0; dim];
        system.apply(t + C[s] * h, &stage_state, &mut ks)?;
        k.push(ks);
    }

    let y_new: Vec<f64> = (0..dim)
        .map(|i| y[i] + h * (0..STAGES).map(|j| B[j] * k[j][i]).sum::<f64>())
        .collect();

    let mut f_new = vec![0.0; dim];
    system.apply(t + h, &y_new, &mut f_new)?;
    k.push(f_new.clone());

    let error = (0..dim)
        .map(|i| h * (0..=STAGES).map(|j| E[j] * k[j][i]).sum::<f64>())
        .collect();

    Ok(StepOutcome {
        y_new,
        f_new,
        error,
    })
}
