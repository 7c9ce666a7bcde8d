//! DC sweep analysis.

use std::sync::atomic::{AtomicBool, Ordering};

use voltlab_core::Error as CircuitError;

use crate::assemble::Assembler;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::results::SweepResults;

use super::{reset_history, solve_point};

/// DC sweep parameters.
#[derive(Debug, Clone)]
pub struct DcSweepParams {
    /// Name of the independent source to sweep.
    pub source: String,
    /// Start value (inclusive).
    pub start: f64,
    /// Stop value (inclusive within float tolerance).
    pub stop: f64,
    /// Step increment (sign sets the sweep direction).
    pub step: f64,
}

/// Generate the sweep values: start to stop inclusive, tolerant of float
/// accumulation at the far endpoint.
fn sweep_values(params: &DcSweepParams) -> Vec<f64> {
    let direction = if params.step > 0.0 { 1.0 } else { -1.0 };
    let mut values = Vec::new();
    let mut value = params.start;
    loop {
        values.push(value);
        value += params.step;
        if direction * (value - params.stop) > params.step.abs() * 1e-9 {
            break;
        }
    }
    values
}

/// Run a DC sweep: set the named source to each value, solve with `h = 0`,
/// and record the solution keyed by the source value.
///
/// Singular sweep points are skipped and the sweep continues.
pub fn run_dc_sweep(
    circuit: &mut Circuit,
    assembler: &mut Assembler,
    params: &DcSweepParams,
    abort: &AtomicBool,
) -> Result<SweepResults> {
    circuit.require_ground()?;
    circuit.process_label_merges();

    {
        let device = circuit
            .device(&params.source)
            .ok_or_else(|| CircuitError::UnknownDevice(params.source.clone()))?;
        if !device.sweepable() {
            return Err(Error::UnknownSource(params.source.clone()));
        }
    }
    if params.step == 0.0 || !params.step.is_finite() {
        return Err(CircuitError::InvalidValue(format!("dc step {}", params.step)).into());
    }

    reset_history(circuit);
    let index = circuit.dense_index()?;
    if index.size() == 0 {
        return Err(voltlab_solver::Error::SingularMatrix.into());
    }

    let mut results = SweepResults::new(index.clone());

    for value in sweep_values(params) {
        if abort.load(Ordering::Relaxed) {
            break;
        }

        if let Some(device) = circuit.device_mut(&params.source) {
            device.set_source_value(value);
        }

        match solve_point(circuit, assembler, &index, 0.0, 0.0) {
            Ok((solution, converged)) => {
                if !converged {
                    results.non_converged_points += 1;
                }
                results.push(value, solution);
            }
            Err(e) if e.is_singular() => {
                log::warn!(
                    "dc sweep: singular matrix at {} = {}, point skipped",
                    params.source,
                    value
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(results)
}
