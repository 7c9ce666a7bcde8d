//! Passive device models: Resistor, Capacitor, Inductor.

use nalgebra::DVector;
use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_core::{Error, NodeId, Result};

use num_complex::Complex;

/// A resistor element.
#[derive(Debug, Clone)]
pub struct Resistor {
    /// Device name (e.g., "R1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Resistance value in ohms.
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        resistance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) {
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_conductance(i, j, self.conductance());
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) {
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_conductance(i, j, self.conductance());
    }
}

/// A capacitor element.
///
/// DC stamps nothing (open circuit); transient uses the Backward Euler
/// companion model `G_eq = C/h` in parallel with `I_eq = G_eq * v_prev`.
#[derive(Debug, Clone)]
pub struct Capacitor {
    /// Device name (e.g., "C1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Capacitance value in farads.
    pub capacitance: f64,
    /// Terminal voltage difference at the previous solved point.
    pub v_prev: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        capacitance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            capacitance,
            v_prev: 0.0,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex, h: f64) {
        if h == 0.0 {
            return;
        }

        let geq = self.capacitance / h;
        let ieq = geq * self.v_prev;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_conductance(i, j, geq);
        // History current enters the positive terminal.
        mna.stamp_current_source(j, i, ieq);
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex, omega: f64) {
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_admittance(i, j, Complex::new(0.0, omega * self.capacitance));
    }

    pub(crate) fn update_state(&mut self, solution: &DVector<f64>, index: &MnaIndex) {
        self.v_prev = index.voltage_diff(solution, self.node_pos, self.node_neg);
    }
}

/// An inductor element.
///
/// Always carries a branch current unknown. In transient, the branch row
/// takes `-L/h` on its diagonal and `b[k] -= (L/h) * i_prev` (Backward
/// Euler); with `h = 0` the diagonal term is dropped and the inductor
/// behaves as a short.
#[derive(Debug, Clone)]
pub struct Inductor {
    /// Device name (e.g., "L1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Inductance value in henries.
    pub inductance: f64,
    /// Branch current at the previous solved point.
    pub i_prev: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        inductance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            inductance,
            i_prev: 0.0,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex, h: f64) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);

        if h != 0.0 {
            mna.add_element(k, k, -self.inductance / h);
            mna.add_rhs(k, -(self.inductance / h) * self.i_prev);
        }
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex, omega: f64) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_inductor_branch(i, j, k, omega, self.inductance);
        Ok(())
    }

    pub(crate) fn update_state(&mut self, solution: &DVector<f64>, index: &MnaIndex) {
        if let Some(k) = index.branch(&self.name) {
            self.i_prev = solution[k];
        }
    }
}
