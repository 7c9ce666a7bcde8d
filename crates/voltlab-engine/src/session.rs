//! Host-facing session: topology mutations, analysis runs, result queries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voltlab_core::Error as CircuitError;
use voltlab_devices::{
    AcVoltageSource, Capacitor, Cccs, Ccvs, CurrentSource, Device, Diode, Inductor, Resistor,
    Vccs, Vcvs, VoltageSource, Waveform,
};

use crate::analysis::{
    run_ac_sweep, run_dc_sweep, run_transient, AcSweepParams, DcSweepParams, TransientParams,
};
use crate::assemble::Assembler;
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::query::{self, AnalysisKind, Probe};
use crate::results::{AcResults, SweepResults};

/// One simulation session: a circuit plus the results of the last run of
/// each analysis mode.
///
/// All mutations and analyses execute synchronously on the caller's thread;
/// a `run_*` call returns only after the full sweep is done or aborted.
/// External collaborators must not mutate the topology during an analysis.
#[derive(Debug, Default)]
pub struct Session {
    circuit: Circuit,
    assembler: Assembler,
    dc: Option<SweepResults>,
    transient: Option<SweepResults>,
    ac: Option<AcResults>,
    abort: Arc<AtomicBool>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Borrow the circuit mutably.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    /// Cooperative cancellation flag, polled between sweep points.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    // ────────────────────── topology operations ──────────────────────

    /// Add a device from its host-level description.
    ///
    /// `type_tag` selects the variant (`R C L V I D E G H F`, plus `A` for
    /// the AC stimulus source, whose `value` is the stimulus magnitude).
    /// `numeric_params` carries diode model parameters or the
    /// `SIN(offset amp freq)` triple when `sinusoidal` is set;
    /// `string_params` carries controlling node names (E, G) or the
    /// controlling device name (H, F).
    #[allow(clippy::too_many_arguments)]
    pub fn add_device(
        &mut self,
        type_tag: char,
        name: &str,
        n1: &str,
        n2: &str,
        value: f64,
        numeric_params: &[f64],
        string_params: &[&str],
        sinusoidal: bool,
    ) -> Result<()> {
        let node1 = self.circuit.get_or_create_node(n1);
        let node2 = self.circuit.get_or_create_node(n2);
        let param = |i: usize, default: f64| numeric_params.get(i).copied().unwrap_or(default);

        let waveform = if sinusoidal {
            Waveform::sin(param(0, 0.0), param(1, 0.0), param(2, 0.0))
        } else {
            Waveform::Dc(value)
        };

        let device = match type_tag.to_ascii_uppercase() {
            'R' => Device::Resistor(Resistor::new(name, node1, node2, value)),
            'C' => Device::Capacitor(Capacitor::new(name, node1, node2, value)),
            'L' => Device::Inductor(Inductor::new(name, node1, node2, value)),
            'V' => Device::VoltageSource(VoltageSource::new(name, node1, node2, waveform)),
            'I' => Device::CurrentSource(CurrentSource::new(name, node1, node2, waveform)),
            'A' => {
                Device::AcVoltageSource(AcVoltageSource::with_magnitude(name, node1, node2, value))
            }
            'D' => Device::Diode(Diode::with_params(
                name,
                node1,
                node2,
                param(0, 1e-12),
                param(1, 1.0),
                param(2, 0.026),
            )),
            'E' | 'G' => {
                let [ctrl1, ctrl2] = match string_params {
                    [c1, c2, ..] => [*c1, *c2],
                    _ => {
                        return Err(CircuitError::InvalidValue(format!(
                            "{name}: missing controlling nodes"
                        ))
                        .into())
                    }
                };
                let cp = self.circuit.get_or_create_node(ctrl1);
                let cn = self.circuit.get_or_create_node(ctrl2);
                if type_tag.to_ascii_uppercase() == 'E' {
                    Device::Vcvs(Vcvs::new(name, node1, node2, cp, cn, value))
                } else {
                    Device::Vccs(Vccs::new(name, node1, node2, cp, cn, value))
                }
            }
            'H' | 'F' => {
                let ctrl = string_params.first().copied().ok_or_else(|| {
                    CircuitError::InvalidValue(format!("{name}: missing controlling device"))
                })?;
                if type_tag.to_ascii_uppercase() == 'H' {
                    Device::Ccvs(Ccvs::new(name, node1, node2, ctrl, value))
                } else {
                    Device::Cccs(Cccs::new(name, node1, node2, ctrl, value))
                }
            }
            other => {
                return Err(CircuitError::InvalidValue(format!("device type '{other}'")).into())
            }
        };

        self.circuit.add_device(device)?;
        Ok(())
    }

    /// Remove a device by name.
    pub fn delete_device(&mut self, name: &str) -> Result<()> {
        self.circuit.delete_device(name)?;
        Ok(())
    }

    /// Rename a node.
    pub fn rename_node(&mut self, old: &str, new: &str) -> Result<()> {
        self.circuit.rename_node(old, new)?;
        Ok(())
    }

    /// Merge two named nodes into one net.
    pub fn connect_nodes(&mut self, a: &str, b: &str) -> Result<()> {
        self.circuit.connect_nodes(a, b)?;
        Ok(())
    }

    /// Mark a node as ground.
    pub fn add_ground(&mut self, name: &str) {
        self.circuit.add_ground(name);
    }

    /// Unmark a ground node.
    pub fn remove_ground(&mut self, name: &str) -> Result<()> {
        self.circuit.remove_ground(name)?;
        Ok(())
    }

    /// Associate a node with a label; co-labeled nodes merge before
    /// assembly.
    pub fn add_label(&mut self, label: &str, node: &str) {
        self.circuit.label(label, node);
    }

    // ────────────────────── analyses ──────────────────────

    /// Sweep a DC source and record the solution at each value.
    pub fn run_dc_sweep(&mut self, source: &str, start: f64, stop: f64, step: f64) -> Result<()> {
        self.abort.store(false, Ordering::Relaxed);
        let params = DcSweepParams {
            source: source.to_string(),
            start,
            stop,
            step,
        };
        let results = run_dc_sweep(&mut self.circuit, &mut self.assembler, &params, &self.abort)?;
        self.dc = Some(results);
        Ok(())
    }

    /// Run a transient simulation and record the solution at each timestep.
    pub fn run_transient(&mut self, t_stop: f64, t_start: f64, max_step: f64) -> Result<()> {
        self.abort.store(false, Ordering::Relaxed);
        let params = TransientParams {
            t_stop,
            t_start,
            max_step,
        };
        let results = run_transient(&mut self.circuit, &mut self.assembler, &params, &self.abort)?;
        let aborted = results.aborted;
        self.transient = Some(results);
        if aborted {
            return Err(Error::Solver(voltlab_solver::Error::SingularMatrix));
        }
        Ok(())
    }

    /// Run an AC sweep and record the complex solution at each frequency.
    pub fn run_ac_sweep(&mut self, omega_start: f64, omega_stop: f64, n_points: usize) -> Result<()> {
        self.abort.store(false, Ordering::Relaxed);
        let params = AcSweepParams {
            omega_start,
            omega_stop,
            n_points,
        };
        let results = run_ac_sweep(&mut self.circuit, &mut self.assembler, &params, &self.abort)?;
        self.ac = Some(results);
        Ok(())
    }

    // ────────────────────── result queries ──────────────────────

    /// Per-variable series from the last DC sweep. Unknown or unsupported
    /// variables are warned about and skipped.
    pub fn get_dc_results(&self, vars: &[&str]) -> HashMap<String, Vec<(f64, f64)>> {
        self.real_results(vars, self.dc.as_ref(), AnalysisKind::Dc)
    }

    /// Per-variable series from the last transient run.
    pub fn get_transient_results(&self, vars: &[&str]) -> HashMap<String, Vec<(f64, f64)>> {
        self.real_results(vars, self.transient.as_ref(), AnalysisKind::Transient)
    }

    /// Per-variable magnitude series from the last AC sweep.
    pub fn get_ac_results(&self, vars: &[&str]) -> HashMap<String, Vec<(f64, f64)>> {
        let mut out = HashMap::new();
        let Some(results) = self.ac.as_ref() else {
            log::warn!("no AC results recorded");
            return out;
        };
        for var in vars {
            let Some(probe) = parse_or_warn(var) else {
                continue;
            };
            if let Some(series) = query::ac_series(&self.circuit, results, &probe) {
                out.insert(var.to_string(), series);
            }
        }
        out
    }

    fn real_results(
        &self,
        vars: &[&str],
        results: Option<&SweepResults>,
        kind: AnalysisKind,
    ) -> HashMap<String, Vec<(f64, f64)>> {
        let mut out = HashMap::new();
        let Some(results) = results else {
            log::warn!("no results recorded for the requested analysis");
            return out;
        };
        for var in vars {
            let Some(probe) = parse_or_warn(var) else {
                continue;
            };
            if let Some(series) = query::real_series(&self.circuit, results, &probe, kind) {
                out.insert(var.to_string(), series);
            }
        }
        out
    }
}

fn parse_or_warn(var: &str) -> Option<Probe> {
    let probe = query::parse_probe(var);
    if probe.is_none() {
        log::warn!("'{}' is not a V(...) or I(...) variable, skipped", var);
    }
    probe
}
