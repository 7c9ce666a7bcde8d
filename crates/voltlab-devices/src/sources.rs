//! Independent source models: voltage, current, and the AC stimulus source.

use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_core::{Error, NodeId, Result};

use crate::waveforms::Waveform;

/// An independent voltage source (DC or sinusoidal).
///
/// Carries a branch current unknown; the branch row enforces
/// `V(pos) - V(neg) = s(t)`.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    /// Device name (e.g., "V1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Source waveform.
    pub waveform: Waveform,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        waveform: Waveform,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            waveform,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex, t: f64) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, self.waveform.value_at(t));
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, self.waveform.value_at(0.0));
        Ok(())
    }
}

/// An independent current source (DC or sinusoidal).
///
/// Contributes to the RHS only: `b[n1] -= s(t)`, `b[n2] += s(t)`.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    /// Device name (e.g., "I1").
    pub name: String,
    /// Positive terminal node (current flows out of this node).
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Source waveform.
    pub waveform: Waveform,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        waveform: Waveform,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            waveform,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex, t: f64) {
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_current_source(i, j, self.waveform.value_at(t));
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) {
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_current_source(i, j, self.waveform.value_at(0.0));
    }
}

/// The AC stimulus source.
///
/// Stamps its magnitude into the branch RHS during AC sweeps and zero in
/// every other analysis (a plain short).
#[derive(Debug, Clone)]
pub struct AcVoltageSource {
    /// Device name (e.g., "VAC").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Stimulus magnitude (volts), 1.0 by default.
    pub magnitude: f64,
}

impl AcVoltageSource {
    /// Create a new AC source with unit magnitude.
    pub fn new(name: impl Into<String>, node_pos: NodeId, node_neg: NodeId) -> Self {
        Self::with_magnitude(name, node_pos, node_neg, 1.0)
    }

    /// Create a new AC source with an explicit magnitude.
    pub fn with_magnitude(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        magnitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            magnitude,
        }
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, 0.0);
        Ok(())
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) -> Result<()> {
        let k = index
            .branch(&self.name)
            .ok_or_else(|| Error::UnknownDevice(self.name.clone()))?;
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_source_branch(i, j, k, self.magnitude);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_index() -> MnaIndex {
        let mut index = MnaIndex::new();
        index.push_node(NodeId::new(1));
        index.push_node(NodeId::new(2));
        index.push_branch("V1");
        index
    }

    #[test]
    fn test_voltage_source_stamp() {
        let index = source_index();
        let mut mna = MnaSystem::new(index.size());
        let v = VoltageSource::new("V1", NodeId::new(1), NodeId::new(2), Waveform::Dc(5.0));

        v.stamp(&mut mna, &index, 0.0).unwrap();

        assert_eq!(mna.matrix()[(0, 2)], 1.0);
        assert_eq!(mna.matrix()[(2, 0)], 1.0);
        assert_eq!(mna.matrix()[(1, 2)], -1.0);
        assert_eq!(mna.matrix()[(2, 1)], -1.0);
        assert_eq!(mna.rhs()[2], 5.0);
    }

    #[test]
    fn test_sin_voltage_source_at_time() {
        let index = source_index();
        let mut mna = MnaSystem::new(index.size());
        let v = VoltageSource::new(
            "V1",
            NodeId::new(1),
            NodeId::new(2),
            Waveform::sin(0.0, 1.0, 50.0),
        );

        // Quarter period of 50 Hz: sin peaks.
        v.stamp(&mut mna, &index, 5e-3).unwrap();
        assert!((mna.rhs()[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_source_stamp() {
        let mut index = MnaIndex::new();
        index.push_node(NodeId::new(1));
        let mut mna = MnaSystem::new(index.size());
        let i = CurrentSource::new("I1", NodeId::new(9), NodeId::new(1), Waveform::Dc(0.001));

        i.stamp(&mut mna, &index, 0.0);

        // 1mA into node 1; node 9 is not in the index (ground).
        assert_eq!(mna.rhs()[0], 0.001);
    }

    #[test]
    fn test_ac_source_silent_outside_ac() {
        let mut index = MnaIndex::new();
        index.push_node(NodeId::new(1));
        index.push_branch("VAC");
        let v = AcVoltageSource::new("VAC", NodeId::new(1), NodeId::new(9));

        let mut mna = MnaSystem::new(index.size());
        v.stamp(&mut mna, &index).unwrap();
        assert_eq!(mna.rhs()[1], 0.0);

        let mut cmna = ComplexMna::new(index.size());
        v.stamp_ac(&mut cmna, &index).unwrap();
        assert_eq!(cmna.rhs()[1].re, 1.0);
        assert_eq!(cmna.rhs()[1].im, 0.0);
    }
}
