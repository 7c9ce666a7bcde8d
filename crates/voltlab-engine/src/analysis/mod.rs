//! Analysis drivers: DC sweep, transient, and AC sweep.

pub mod ac;
pub mod dc;
pub mod transient;

pub use ac::{run_ac_sweep, AcSweepParams};
pub use dc::{run_dc_sweep, DcSweepParams};
pub use transient::{run_transient, TransientParams};

use nalgebra::DVector;
use voltlab_core::mna::MnaIndex;
use voltlab_solver::{solve_dense, solve_newton_raphson, ConvergenceCriteria};

use crate::assemble::Assembler;
use crate::circuit::Circuit;
use crate::error::{Error, Result};

/// Solve one sweep point at `(t, h)`.
///
/// Linear circuits assemble and solve exactly once. Nonlinear circuits run
/// the Newton-Raphson loop, refreshing only the nonlinear devices' history
/// during iteration; non-convergence is logged and the last iterate kept.
///
/// Returns the solution and whether it converged.
pub(crate) fn solve_point(
    circuit: &mut Circuit,
    assembler: &mut Assembler,
    index: &MnaIndex,
    t: f64,
    h: f64,
) -> Result<(DVector<f64>, bool)> {
    if !circuit.has_nonlinear() {
        let sys = assembler.assemble(circuit.devices(), index, t, h)?;
        let solution = solve_dense(sys.matrix(), sys.rhs())?;
        return Ok((solution, true));
    }

    let criteria = ConvergenceCriteria::default();
    let devices = circuit.devices_mut();
    let nr = solve_newton_raphson::<Error, _>(&mut assembler.real, &criteria, |mna, iterate| {
        if let Some(x) = iterate {
            for device in devices.iter_mut().filter(|d| d.is_nonlinear()) {
                device.update_state(x, index);
            }
        }
        mna.reset(index.size());
        for device in devices.iter() {
            device.stamp(mna, index, t, h)?;
        }
        Ok(())
    })?;

    // The final iterate also refreshes the nonlinear history, so it carries
    // over to the next sweep point.
    for device in devices.iter_mut().filter(|d| d.is_nonlinear()) {
        device.update_state(&nr.solution, index);
    }

    if !nr.converged {
        log::warn!(
            "newton-raphson did not converge after {} iterations; recording last iterate",
            nr.iterations
        );
    }

    Ok((nr.solution, nr.converged))
}

/// Zero every device's history at the start of an analysis.
pub(crate) fn reset_history(circuit: &mut Circuit) {
    for device in circuit.devices_mut() {
        device.reset();
    }
}
