//! Time-domain transient analysis (Backward Euler).

use std::sync::atomic::{AtomicBool, Ordering};

use voltlab_core::Error as CircuitError;

use crate::assemble::Assembler;
use crate::circuit::Circuit;
use crate::error::Result;
use crate::results::SweepResults;

use super::{reset_history, solve_point};

/// Transient analysis parameters.
#[derive(Debug, Clone)]
pub struct TransientParams {
    /// Stop time (s).
    pub t_stop: f64,
    /// Start time (s).
    pub t_start: f64,
    /// Maximum timestep (s). `0` selects the default of
    /// `(t_stop - t_start) / 100`.
    pub max_step: f64,
}

impl TransientParams {
    /// The effective fixed timestep.
    pub fn step(&self) -> f64 {
        if self.max_step > 0.0 {
            self.max_step
        } else {
            (self.t_stop - self.t_start) / 100.0
        }
    }
}

/// Run a transient simulation from `t_start` to `t_stop`.
///
/// Every point is assembled at `(t, h)` and solved; after a successful
/// point, all devices advance their history to the converged values. A
/// singular matrix stops the simulation: the point is not recorded, no
/// further points are attempted, and the result is flagged `aborted`
/// (device history past that point is undefined).
pub fn run_transient(
    circuit: &mut Circuit,
    assembler: &mut Assembler,
    params: &TransientParams,
    abort: &AtomicBool,
) -> Result<SweepResults> {
    circuit.require_ground()?;
    circuit.process_label_merges();

    let h = params.step();
    if !(h > 0.0) || !h.is_finite() {
        return Err(CircuitError::InvalidValue(format!("transient step {}", h)).into());
    }

    reset_history(circuit);
    let index = circuit.dense_index()?;
    if index.size() == 0 {
        return Err(voltlab_solver::Error::SingularMatrix.into());
    }

    let mut results = SweepResults::new(index.clone());

    let mut t = params.t_start;
    // Half-step slack keeps the endpoint inclusive under float accumulation.
    while t <= params.t_stop + 0.5 * h {
        if abort.load(Ordering::Relaxed) {
            break;
        }

        match solve_point(circuit, assembler, &index, t, h) {
            Ok((solution, converged)) => {
                if !converged {
                    results.non_converged_points += 1;
                }
                for device in circuit.devices_mut() {
                    device.update_state(&solution, &index);
                }
                results.push(t, solution);
            }
            Err(e) if e.is_singular() => {
                log::warn!("transient: singular matrix at t = {}, simulation stopped", t);
                results.aborted = true;
                break;
            }
            Err(e) => return Err(e),
        }

        t += h;
    }

    Ok(results)
}
