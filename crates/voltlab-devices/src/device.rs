//! The tagged device family and its match-dispatched operations.

use nalgebra::DVector;
use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_core::{NodeId, Result};

use crate::controlled::{Cccs, Ccvs, Vccs, Vcvs};
use crate::diode::Diode;
use crate::passive::{Capacitor, Inductor, Resistor};
use crate::sources::{AcVoltageSource, CurrentSource, VoltageSource};
use crate::waveforms::Waveform;

/// A circuit device.
///
/// The whole device family is closed: analyses, the assembler, and the query
/// layer dispatch over this enum by `match`, so every operation a device
/// supports is visible here.
#[derive(Debug, Clone)]
pub enum Device {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    Diode(Diode),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    AcVoltageSource(AcVoltageSource),
    Vcvs(Vcvs),
    Vccs(Vccs),
    Ccvs(Ccvs),
    Cccs(Cccs),
}

impl Device {
    /// The device's unique, case-sensitive name.
    pub fn name(&self) -> &str {
        match self {
            Device::Resistor(d) => &d.name,
            Device::Capacitor(d) => &d.name,
            Device::Inductor(d) => &d.name,
            Device::Diode(d) => &d.name,
            Device::VoltageSource(d) => &d.name,
            Device::CurrentSource(d) => &d.name,
            Device::AcVoltageSource(d) => &d.name,
            Device::Vcvs(d) => &d.name,
            Device::Vccs(d) => &d.name,
            Device::Ccvs(d) => &d.name,
            Device::Cccs(d) => &d.name,
        }
    }

    /// The two terminal nodes (output terminals for controlled sources).
    pub fn terminals(&self) -> (NodeId, NodeId) {
        match self {
            Device::Resistor(d) => (d.node_pos, d.node_neg),
            Device::Capacitor(d) => (d.node_pos, d.node_neg),
            Device::Inductor(d) => (d.node_pos, d.node_neg),
            Device::Diode(d) => (d.node_pos, d.node_neg),
            Device::VoltageSource(d) => (d.node_pos, d.node_neg),
            Device::CurrentSource(d) => (d.node_pos, d.node_neg),
            Device::AcVoltageSource(d) => (d.node_pos, d.node_neg),
            Device::Vcvs(d) => (d.node_pos, d.node_neg),
            Device::Vccs(d) => (d.node_pos, d.node_neg),
            Device::Ccvs(d) => (d.node_pos, d.node_neg),
            Device::Cccs(d) => (d.node_pos, d.node_neg),
        }
    }

    /// Whether this device occupies a branch-current row in the augmented
    /// MNA space. Constant per variant.
    pub fn needs_current_unknown(&self) -> bool {
        matches!(
            self,
            Device::Inductor(_)
                | Device::VoltageSource(_)
                | Device::AcVoltageSource(_)
                | Device::Vcvs(_)
                | Device::Ccvs(_)
        )
    }

    /// True only for the diode.
    pub fn is_nonlinear(&self) -> bool {
        matches!(self, Device::Diode(_))
    }

    /// Whether this device is the AC stimulus source.
    pub fn is_ac_source(&self) -> bool {
        matches!(self, Device::AcVoltageSource(_))
    }

    /// Whether a DC sweep may drive this device.
    pub fn sweepable(&self) -> bool {
        match self {
            Device::VoltageSource(d) => d.waveform.is_dc(),
            Device::CurrentSource(d) => d.waveform.is_dc(),
            _ => false,
        }
    }

    /// Set the active value of a sweepable source. No effect on any other
    /// variant.
    pub fn set_source_value(&mut self, value: f64) {
        match self {
            Device::VoltageSource(d) => {
                if let Waveform::Dc(v) = &mut d.waveform {
                    *v = value;
                }
            }
            Device::CurrentSource(d) => {
                if let Waveform::Dc(v) = &mut d.waveform {
                    *v = value;
                }
            }
            _ => {}
        }
    }

    /// Add this device's linear(ized) contribution to the real system at
    /// time `t` with step `h` (`h = 0` means DC).
    pub fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex, t: f64, h: f64) -> Result<()> {
        match self {
            Device::Resistor(d) => {
                d.stamp(mna, index);
                Ok(())
            }
            Device::Capacitor(d) => {
                d.stamp(mna, index, h);
                Ok(())
            }
            Device::Inductor(d) => d.stamp(mna, index, h),
            Device::Diode(d) => {
                d.stamp(mna, index);
                Ok(())
            }
            Device::VoltageSource(d) => d.stamp(mna, index, t),
            Device::CurrentSource(d) => {
                d.stamp(mna, index, t);
                Ok(())
            }
            Device::AcVoltageSource(d) => d.stamp(mna, index),
            Device::Vcvs(d) => d.stamp(mna, index),
            Device::Vccs(d) => {
                d.stamp(mna, index);
                Ok(())
            }
            Device::Ccvs(d) => d.stamp(mna, index),
            Device::Cccs(d) => d.stamp(mna, index),
        }
    }

    /// Add this device's small-signal contribution to the complex system
    /// at angular frequency `omega`.
    pub fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex, omega: f64) -> Result<()> {
        match self {
            Device::Resistor(d) => {
                d.stamp_ac(mna, index);
                Ok(())
            }
            Device::Capacitor(d) => {
                d.stamp_ac(mna, index, omega);
                Ok(())
            }
            Device::Inductor(d) => d.stamp_ac(mna, index, omega),
            Device::Diode(d) => {
                d.stamp_ac(mna, index);
                Ok(())
            }
            Device::VoltageSource(d) => d.stamp_ac(mna, index),
            Device::CurrentSource(d) => {
                d.stamp_ac(mna, index);
                Ok(())
            }
            Device::AcVoltageSource(d) => d.stamp_ac(mna, index),
            Device::Vcvs(d) => d.stamp_ac(mna, index),
            Device::Vccs(d) => {
                d.stamp_ac(mna, index);
                Ok(())
            }
            Device::Ccvs(d) => d.stamp_ac(mna, index),
            Device::Cccs(d) => d.stamp_ac(mna, index),
        }
    }

    /// Refresh history state from the last solved vector. Devices without
    /// history ignore this.
    pub fn update_state(&mut self, solution: &DVector<f64>, index: &MnaIndex) {
        match self {
            Device::Capacitor(d) => d.update_state(solution, index),
            Device::Inductor(d) => d.update_state(solution, index),
            Device::Diode(d) => d.update_state(solution, index),
            _ => {}
        }
    }

    /// Zero history state (the diode re-seeds its NR starting guess).
    pub fn reset(&mut self) {
        match self {
            Device::Capacitor(d) => d.v_prev = 0.0,
            Device::Inductor(d) => d.i_prev = 0.0,
            Device::Diode(d) => d.reset(),
            _ => {}
        }
    }

    /// Rewrite every terminal (including control terminals) equal to `from`
    /// to `to`. Used by node merging.
    pub fn rewrite_node(&mut self, from: NodeId, to: NodeId) {
        let remap = |n: &mut NodeId| {
            if *n == from {
                *n = to;
            }
        };
        match self {
            Device::Resistor(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::Capacitor(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::Inductor(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::Diode(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::VoltageSource(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::CurrentSource(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::AcVoltageSource(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::Vcvs(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
                remap(&mut d.ctrl_pos);
                remap(&mut d.ctrl_neg);
            }
            Device::Vccs(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
                remap(&mut d.ctrl_pos);
                remap(&mut d.ctrl_neg);
            }
            Device::Ccvs(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
            Device::Cccs(d) => {
                remap(&mut d.node_pos);
                remap(&mut d.node_neg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_unknown_table() {
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);

        assert!(!Device::Resistor(Resistor::new("R1", n1, n2, 1.0)).needs_current_unknown());
        assert!(!Device::Capacitor(Capacitor::new("C1", n1, n2, 1.0)).needs_current_unknown());
        assert!(Device::Inductor(Inductor::new("L1", n1, n2, 1.0)).needs_current_unknown());
        assert!(
            Device::VoltageSource(VoltageSource::new("V1", n1, n2, Waveform::Dc(1.0)))
                .needs_current_unknown()
        );
        assert!(
            !Device::CurrentSource(CurrentSource::new("I1", n1, n2, Waveform::Dc(1.0)))
                .needs_current_unknown()
        );
        assert!(Device::Vcvs(Vcvs::new("E1", n1, n2, n1, n2, 1.0)).needs_current_unknown());
        assert!(!Device::Vccs(Vccs::new("G1", n1, n2, n1, n2, 1.0)).needs_current_unknown());
        assert!(Device::Ccvs(Ccvs::new("H1", n1, n2, "V1", 1.0)).needs_current_unknown());
        assert!(!Device::Cccs(Cccs::new("F1", n1, n2, "V1", 1.0)).needs_current_unknown());
    }

    #[test]
    fn test_only_diode_is_nonlinear() {
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);
        assert!(Device::Diode(Diode::new("D1", n1, n2)).is_nonlinear());
        assert!(!Device::Resistor(Resistor::new("R1", n1, n2, 1.0)).is_nonlinear());
    }

    #[test]
    fn test_sweepable_sources() {
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);

        let mut v = Device::VoltageSource(VoltageSource::new("V1", n1, n2, Waveform::Dc(1.0)));
        assert!(v.sweepable());
        v.set_source_value(3.0);
        match &v {
            Device::VoltageSource(vs) => assert_eq!(vs.waveform, Waveform::Dc(3.0)),
            _ => unreachable!(),
        }

        let sin = Device::VoltageSource(VoltageSource::new(
            "V2",
            n1,
            n2,
            Waveform::sin(0.0, 1.0, 50.0),
        ));
        assert!(!sin.sweepable());
    }

    #[test]
    fn test_rewrite_node_touches_control_terminals() {
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);
        let n3 = NodeId::new(3);

        let mut e = Device::Vcvs(Vcvs::new("E1", n1, n2, n3, n2, 2.0));
        e.rewrite_node(n3, n1);
        match &e {
            Device::Vcvs(v) => {
                assert_eq!(v.ctrl_pos, n1);
                assert_eq!(v.node_neg, n2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);

        let mut c = Capacitor::new("C1", n1, n2, 1e-6);
        c.v_prev = 1.5;
        let mut dev = Device::Capacitor(c);
        dev.reset();
        match &dev {
            Device::Capacitor(c) => assert_eq!(c.v_prev, 0.0),
            _ => unreachable!(),
        }
    }
}
