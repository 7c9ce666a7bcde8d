//! Controlled source device models: VCVS (E), VCCS (G), CCVS (H), CCCS (F).

use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_core::{Error, NodeId, Result};

// ────────────────────── VCVS (E element) ──────────────────────

/// Voltage-controlled voltage source.
///
/// Enforces `V(out+) - V(out-) = gain * (V(ctrl+) - V(ctrl-))` through a
/// branch current unknown.
#[derive(Debug, Clone)]
pub struct Vcvs {
    pub name: String,
    pub node_pos: NodeId,
    pub node_neg: NodeId,
    pub ctrl_pos: NodeId,
    pub ctrl_neg: NodeId,
    pub gain: f64,
}

impl Vcvs {
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        ctrl_pos: NodeId,
        ctrl_neg: NodeId,
        gain: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            ctrl_pos,
            ctrl_neg,
            gain,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);

        // Branch row: V(out+) - V(out-) - gain * (V(ctrl+) - V(ctrl-)) = 0
        if let Some(c) = index.node(self.ctrl_pos) {
            mna.add_element(k, c, -self.gain);
        }
        if let Some(c) = index.node(self.ctrl_neg) {
            mna.add_element(k, c, self.gain);
        }
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);

        if let Some(c) = index.node(self.ctrl_pos) {
            mna.add_element(k, c, -self.gain);
        }
        if let Some(c) = index.node(self.ctrl_neg) {
            mna.add_element(k, c, self.gain);
        }
        Ok(())
    }
}

// ────────────────────── VCCS (G element) ──────────────────────

/// Voltage-controlled current source.
///
/// `I(out) = gain * (V(ctrl+) - V(ctrl-))` as pure off-diagonal
/// transconductance; no branch current unknown.
#[derive(Debug, Clone)]
pub struct Vccs {
    pub name: String,
    pub node_pos: NodeId,
    pub node_neg: NodeId,
    pub ctrl_pos: NodeId,
    pub ctrl_neg: NodeId,
    pub gain: f64,
}

impl Vccs {
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        ctrl_pos: NodeId,
        ctrl_neg: NodeId,
        gain: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            ctrl_pos,
            ctrl_neg,
            gain,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) {
        let op = index.node(self.node_pos);
        let on = index.node(self.node_neg);
        let cp = index.node(self.ctrl_pos);
        let cn = index.node(self.ctrl_neg);

        if let (Some(i), Some(c)) = (op, cp) {
            mna.add_element(i, c, self.gain);
        }
        if let (Some(i), Some(c)) = (op, cn) {
            mna.add_element(i, c, -self.gain);
        }
        if let (Some(i), Some(c)) = (on, cp) {
            mna.add_element(i, c, -self.gain);
        }
        if let (Some(i), Some(c)) = (on, cn) {
            mna.add_element(i, c, self.gain);
        }
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) {
        let op = index.node(self.node_pos);
        let on = index.node(self.node_neg);
        let cp = index.node(self.ctrl_pos);
        let cn = index.node(self.ctrl_neg);

        if let (Some(i), Some(c)) = (op, cp) {
            mna.add_element(i, c, self.gain);
        }
        if let (Some(i), Some(c)) = (op, cn) {
            mna.add_element(i, c, -self.gain);
        }
        if let (Some(i), Some(c)) = (on, cp) {
            mna.add_element(i, c, -self.gain);
        }
        if let (Some(i), Some(c)) = (on, cn) {
            mna.add_element(i, c, self.gain);
        }
    }
}

// ────────────────────── CCVS (H element) ──────────────────────

/// Current-controlled voltage source.
///
/// `V(out+) - V(out-) = gain * I(ctrl)`, where `ctrl` names a device that
/// carries a branch current unknown.
#[derive(Debug, Clone)]
pub struct Ccvs {
    pub name: String,
    pub node_pos: NodeId,
    pub node_neg: NodeId,
    /// Name of the controlling device.
    pub ctrl_name: String,
    pub gain: f64,
}

impl Ccvs {
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        ctrl_name: impl Into<String>,
        gain: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            ctrl_name: ctrl_name.into(),
            gain,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let ctrl = index
            .branch(&self.ctrl_name)
            .ok_or_else(|| Error::UnknownDevice(self.ctrl_name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);
        mna.add_element(k, ctrl, -self.gain);
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let ctrl = index
            .branch(&self.ctrl_name)
            .ok_or_else(|| Error::UnknownDevice(self.ctrl_name.clone()))?;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);
        mna.add_element(k, ctrl, -self.gain);
        Ok(())
    }
}

// ────────────────────── CCCS (F element) ──────────────────────

/// Current-controlled current source.
///
/// `I(out) = gain * I(ctrl)`; couples the output nodes to the controlling
/// device's branch column, no unknown of its own.
#[derive(Debug, Clone)]
pub struct Cccs {
    pub name: String,
    pub node_pos: NodeId,
    pub node_neg: NodeId,
    /// Name of the controlling device.
    pub ctrl_name: String,
    pub gain: f64,
}

impl Cccs {
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        ctrl_name: impl Into<String>,
        gain: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            ctrl_name: ctrl_name.into(),
            gain,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) -> Result<()> {
        let ctrl = index
            .branch(&self.ctrl_name)
            .ok_or_else(|| Error::UnknownDevice(self.ctrl_name.clone()))?;

        if let Some(i) = index.node(self.node_pos) {
            mna.add_element(i, ctrl, self.gain);
        }
        if let Some(j) = index.node(self.node_neg) {
            mna.add_element(j, ctrl, -self.gain);
        }
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) -> Result<()> {
        let ctrl = index
            .branch(&self.ctrl_name)
            .ok_or_else(|| Error::UnknownDevice(self.ctrl_name.clone()))?;

        if let Some(i) = index.node(self.node_pos) {
            mna.add_element(i, ctrl, self.gain);
        }
        if let Some(j) = index.node(self.node_neg) {
            mna.add_element(j, ctrl, -self.gain);
        }
        Ok(())
    }
}
