//! Newton-Raphson nonlinear solver.

use nalgebra::DVector;
use voltlab_core::mna::MnaSystem;

use crate::error::Error;
use crate::linear::solve_dense;

/// Convergence criteria for Newton-Raphson iteration.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Euclidean-norm tolerance on the iterate delta.
    pub tolerance: f64,
    /// Maximum iterations before giving up.
    pub max_iterations: usize,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Result of Newton-Raphson iteration.
#[derive(Debug, Clone)]
pub struct NrResult {
    /// Last computed iterate (the solution when `converged` is true).
    pub solution: DVector<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the delta dropped below tolerance.
    pub converged: bool,
}

/// Solve a nonlinear system by Newton-Raphson iteration.
///
/// `restamp` must clear `mna` and stamp the full circuit linearized about
/// the given iterate; `None` means the devices' seeded operating point
/// (first iteration). Iteration stops when `‖xᵢ - xᵢ₋₁‖₂` drops below the
/// tolerance or `max_iterations` is reached; the last iterate is returned
/// either way, with `converged` flagging which case occurred.
pub fn solve_newton_raphson<E, F>(
    mna: &mut MnaSystem,
    criteria: &ConvergenceCriteria,
    mut restamp: F,
) -> std::result::Result<NrResult, E>
where
    E: From<Error>,
    F: FnMut(&mut MnaSystem, Option<&DVector<f64>>) -> std::result::Result<(), E>,
{
    let mut prev: Option<DVector<f64>> = None;
    let mut iterations = 0;

    for iter in 0..criteria.max_iterations {
        restamp(mna, prev.as_ref())?;

        let next = solve_dense(mna.matrix(), mna.rhs()).map_err(E::from)?;
        iterations = iter + 1;

        let converged = prev
            .as_ref()
            .is_some_and(|p| (&next - p).norm() < criteria.tolerance);
        if converged {
            return Ok(NrResult {
                solution: next,
                iterations,
                converged: true,
            });
        }
        prev = Some(next);
    }

    Ok(NrResult {
        solution: prev.unwrap_or_else(|| DVector::zeros(0)),
        iterations,
        converged: false,
    })
}
