//! AC small-signal sweep analysis.

use std::sync::atomic::{AtomicBool, Ordering};

use voltlab_solver::solve_complex;

use crate::assemble::Assembler;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::results::AcResults;

use super::reset_history;

/// AC sweep parameters: a linear sweep in angular frequency.
#[derive(Debug, Clone)]
pub struct AcSweepParams {
    /// Start angular frequency (rad/s).
    pub omega_start: f64,
    /// Stop angular frequency (rad/s).
    pub omega_stop: f64,
    /// Number of sample points.
    pub n_points: usize,
}

/// Generate the sampled angular frequencies.
fn sweep_omegas(params: &AcSweepParams) -> Vec<f64> {
    if params.n_points <= 1 {
        return vec![params.omega_start];
    }
    let step = (params.omega_stop - params.omega_start) / (params.n_points as f64 - 1.0);
    (0..params.n_points)
        .map(|i| params.omega_start + step * i as f64)
        .collect()
}

/// Run an AC sweep. Requires at least one AC stimulus source.
///
/// Singular frequency points are skipped and the sweep continues.
pub fn run_ac_sweep(
    circuit: &mut Circuit,
    assembler: &mut Assembler,
    params: &AcSweepParams,
    abort: &AtomicBool,
) -> Result<AcResults> {
    circuit.require_ground()?;
    if !circuit.has_ac_source() {
        return Err(Error::NoAcSource);
    }
    circuit.process_label_merges();
    reset_history(circuit);

    let index = circuit.dense_index()?;
    if index.size() == 0 {
        return Err(voltlab_solver::Error::SingularMatrix.into());
    }

    let mut results = AcResults::new(index.clone());

    for omega in sweep_omegas(params) {
        if abort.load(Ordering::Relaxed) {
            break;
        }

        let sys = assembler.assemble_ac(circuit.devices(), &index, omega)?;
        match solve_complex(sys.matrix(), sys.rhs()) {
            Ok(solution) => results.push(omega, solution),
            Err(voltlab_solver::Error::SingularMatrix) => {
                log::warn!("ac sweep: singular matrix at ω = {}, point skipped", omega);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(results)
}
