//! Dense MNA matrix structures (real and complex) and the per-assembly index.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex;

use crate::node::NodeId;

/// Map from live circuit state to dense MNA coordinates for one assembly.
///
/// Node ids are assigned rows `0..N` in ascending id order with ground ids
/// skipped; devices that carry a branch current occupy rows `N..N+M` in
/// device-iteration order. The index is recomputed for every assembly and
/// must never be reused after a topology mutation.
#[derive(Debug, Clone, Default)]
pub struct MnaIndex {
    node_rows: HashMap<NodeId, usize>,
    branch_rows: HashMap<String, usize>,
    num_nodes: usize,
}

impl MnaIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next voltage row to `id`. Call once per non-ground node,
    /// in ascending id order, before any branch is pushed.
    pub fn push_node(&mut self, id: NodeId) {
        let row = self.node_rows.len();
        self.node_rows.insert(id, row);
        self.num_nodes = self.node_rows.len();
    }

    /// Assign the next branch row to the named device and return it.
    pub fn push_branch(&mut self, name: &str) -> usize {
        let row = self.num_nodes + self.branch_rows.len();
        self.branch_rows.insert(name.to_string(), row);
        row
    }

    /// Voltage row of a node, `None` for ground.
    pub fn node(&self, id: NodeId) -> Option<usize> {
        self.node_rows.get(&id).copied()
    }

    /// Branch row of a current-unknown device, `None` if it has none.
    pub fn branch(&self, name: &str) -> Option<usize> {
        self.branch_rows.get(name).copied()
    }

    /// Number of voltage unknowns.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of branch-current unknowns.
    pub fn num_branches(&self) -> usize {
        self.branch_rows.len()
    }

    /// Total system size (voltage + branch unknowns).
    pub fn size(&self) -> usize {
        self.num_nodes + self.branch_rows.len()
    }

    /// Voltage difference `V(pos) - V(neg)` read from a solution vector,
    /// treating ground terminals as 0.
    pub fn voltage_diff(&self, solution: &DVector<f64>, pos: NodeId, neg: NodeId) -> f64 {
        let vp = self.node(pos).map(|i| solution[i]).unwrap_or(0.0);
        let vn = self.node(neg).map(|i| solution[i]).unwrap_or(0.0);
        vp - vn
    }

    /// Complex counterpart of [`voltage_diff`](Self::voltage_diff) for AC
    /// solution vectors.
    pub fn voltage_diff_complex(
        &self,
        solution: &DVector<Complex<f64>>,
        pos: NodeId,
        neg: NodeId,
    ) -> Complex<f64> {
        let zero = Complex::new(0.0, 0.0);
        let vp = self.node(pos).map(|i| solution[i]).unwrap_or(zero);
        let vn = self.node(neg).map(|i| solution[i]).unwrap_or(zero);
        vp - vn
    }
}

/// Real-valued MNA system: Ax = b.
///
/// Rows/columns `0..num_nodes` are node voltages; the rest are branch
/// currents. The buffers are reused across assemblies and only reallocate
/// when the unknown count changes.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    matrix: DMatrix<f64>,
    rhs: DVector<f64>,
}

impl MnaSystem {
    /// Create a zeroed system of the given total size.
    pub fn new(size: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(size, size),
            rhs: DVector::zeros(size),
        }
    }

    /// Zero the system, resizing if the unknown count changed.
    pub fn reset(&mut self, size: usize) {
        if self.matrix.nrows() != size {
            self.matrix = DMatrix::zeros(size, size);
            self.rhs = DVector::zeros(size);
        } else {
            self.matrix.fill(0.0);
            self.rhs.fill(0.0);
        }
    }

    /// Total system size.
    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    /// Add to a matrix entry.
    pub fn add_element(&mut self, row: usize, col: usize, value: f64) {
        self.matrix[(row, col)] += value;
    }

    /// Add to an RHS entry.
    pub fn add_rhs(&mut self, row: usize, value: f64) {
        self.rhs[row] += value;
    }

    /// Stamp a conductance between two node rows (`None` = ground).
    ///
    /// For a conductance G between rows i and j:
    /// - A[i,i] += G, A[j,j] += G
    /// - A[i,j] -= G, A[j,i] -= G
    pub fn stamp_conductance(&mut self, node_i: Option<usize>, node_j: Option<usize>, g: f64) {
        if let Some(i) = node_i {
            self.matrix[(i, i)] += g;
        }
        if let Some(j) = node_j {
            self.matrix[(j, j)] += g;
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            self.matrix[(i, j)] -= g;
            self.matrix[(j, i)] -= g;
        }
    }

    /// Stamp a current source driving `current` amperes from row `from`
    /// out of the circuit and into row `to`: b[from] -= I, b[to] += I.
    pub fn stamp_current_source(&mut self, from: Option<usize>, to: Option<usize>, current: f64) {
        if let Some(i) = from {
            self.rhs[i] -= current;
        }
        if let Some(j) = to {
            self.rhs[j] += current;
        }
    }

    /// Stamp the incidence of a branch device between `pos` and `neg` whose
    /// current occupies row `branch`, and accumulate `value` into b[branch].
    ///
    /// The branch row carries the constitutive equation
    /// `V(pos) - V(neg) = value`; devices with a different branch equation
    /// (inductors, controlled sources) adjust the row afterwards.
    pub fn stamp_source_branch(
        &mut self,
        pos: Option<usize>,
        neg: Option<usize>,
        branch: usize,
        value: f64,
    ) {
        if let Some(i) = pos {
            self.matrix[(i, branch)] += 1.0;
            self.matrix[(branch, i)] += 1.0;
        }
        if let Some(j) = neg {
            self.matrix[(j, branch)] -= 1.0;
            self.matrix[(branch, j)] -= 1.0;
        }
        self.rhs[branch] += value;
    }

    /// Get a reference to the coefficient matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Get a reference to the RHS vector.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }
}

/// Complex-valued MNA system for AC small-signal analysis.
///
/// Same layout as [`MnaSystem`] with complex admittances: capacitors stamp
/// `jωC`, inductors keep their branch row with `-jωL` on the diagonal.
#[derive(Debug, Clone)]
pub struct ComplexMna {
    matrix: DMatrix<Complex<f64>>,
    rhs: DVector<Complex<f64>>,
}

impl ComplexMna {
    /// Create a zeroed system of the given total size.
    pub fn new(size: usize) -> Self {
        Self {
            matrix: DMatrix::from_element(size, size, Complex::new(0.0, 0.0)),
            rhs: DVector::from_element(size, Complex::new(0.0, 0.0)),
        }
    }

    /// Zero the system, resizing if the unknown count changed.
    pub fn reset(&mut self, size: usize) {
        let zero = Complex::new(0.0, 0.0);
        if self.matrix.nrows() != size {
            self.matrix = DMatrix::from_element(size, size, zero);
            self.rhs = DVector::from_element(size, zero);
        } else {
            self.matrix.fill(zero);
            self.rhs.fill(zero);
        }
    }

    /// Total system size.
    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    /// Add to a matrix entry.
    pub fn add_element(&mut self, row: usize, col: usize, value: impl Into<Complex<f64>>) {
        self.matrix[(row, col)] += value.into();
    }

    /// Add to an RHS entry.
    pub fn add_rhs(&mut self, row: usize, value: impl Into<Complex<f64>>) {
        self.rhs[row] += value.into();
    }

    /// Stamp a complex admittance between two node rows (`None` = ground).
    pub fn stamp_admittance(
        &mut self,
        node_i: Option<usize>,
        node_j: Option<usize>,
        y: Complex<f64>,
    ) {
        if let Some(i) = node_i {
            self.matrix[(i, i)] += y;
        }
        if let Some(j) = node_j {
            self.matrix[(j, j)] += y;
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            self.matrix[(i, j)] -= y;
            self.matrix[(j, i)] -= y;
        }
    }

    /// Stamp a real conductance between two node rows.
    pub fn stamp_conductance(&mut self, node_i: Option<usize>, node_j: Option<usize>, g: f64) {
        self.stamp_admittance(node_i, node_j, Complex::new(g, 0.0));
    }

    /// Stamp a current source: b[from] -= I, b[to] += I.
    pub fn stamp_current_source(
        &mut self,
        from: Option<usize>,
        to: Option<usize>,
        current: impl Into<Complex<f64>>,
    ) {
        let current = current.into();
        if let Some(i) = from {
            self.rhs[i] -= current;
        }
        if let Some(j) = to {
            self.rhs[j] += current;
        }
    }

    /// Stamp a branch device's incidence and accumulate `value` into
    /// b[branch]. Mirrors [`MnaSystem::stamp_source_branch`].
    pub fn stamp_source_branch(
        &mut self,
        pos: Option<usize>,
        neg: Option<usize>,
        branch: usize,
        value: impl Into<Complex<f64>>,
    ) {
        let one = Complex::new(1.0, 0.0);
        if let Some(i) = pos {
            self.matrix[(i, branch)] += one;
            self.matrix[(branch, i)] += one;
        }
        if let Some(j) = neg {
            self.matrix[(j, branch)] -= one;
            self.matrix[(branch, j)] -= one;
        }
        self.rhs[branch] += value.into();
    }

    /// Stamp an inductor branch: incidence plus `-jωL` on the branch
    /// diagonal, enforcing `V(pos) - V(neg) = jωL * I_branch`.
    pub fn stamp_inductor_branch(
        &mut self,
        pos: Option<usize>,
        neg: Option<usize>,
        branch: usize,
        omega: f64,
        inductance: f64,
    ) {
        self.stamp_source_branch(pos, neg, branch, Complex::new(0.0, 0.0));
        self.matrix[(branch, branch)] -= Complex::new(0.0, omega * inductance);
    }

    /// Get a reference to the coefficient matrix.
    pub fn matrix(&self) -> &DMatrix<Complex<f64>> {
        &self.matrix
    }

    /// Get a reference to the RHS vector.
    pub fn rhs(&self) -> &DVector<Complex<f64>> {
        &self.rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_rows_and_branches() {
        let mut index = MnaIndex::new();
        index.push_node(NodeId::new(1));
        index.push_node(NodeId::new(3));
        let b = index.push_branch("V1");

        assert_eq!(index.node(NodeId::new(1)), Some(0));
        assert_eq!(index.node(NodeId::new(3)), Some(1));
        assert_eq!(index.node(NodeId::new(2)), None);
        assert_eq!(b, 2);
        assert_eq!(index.branch("V1"), Some(2));
        assert_eq!(index.size(), 3);
    }

    #[test]
    fn test_voltage_diff_ground_terminal() {
        let mut index = MnaIndex::new();
        index.push_node(NodeId::new(1));
        let x = DVector::from_vec(vec![2.5]);

        assert_eq!(index.voltage_diff(&x, NodeId::new(1), NodeId::new(9)), 2.5);
        assert_eq!(index.voltage_diff(&x, NodeId::new(9), NodeId::new(1)), -2.5);
    }

    #[test]
    fn test_stamp_conductance() {
        let mut sys = MnaSystem::new(2);
        sys.stamp_conductance(Some(0), Some(1), 1.0);

        assert_eq!(sys.matrix()[(0, 0)], 1.0);
        assert_eq!(sys.matrix()[(1, 1)], 1.0);
        assert_eq!(sys.matrix()[(0, 1)], -1.0);
        assert_eq!(sys.matrix()[(1, 0)], -1.0);
    }

    #[test]
    fn test_stamp_conductance_to_ground() {
        let mut sys = MnaSystem::new(2);
        sys.stamp_conductance(Some(0), None, 1.0);

        assert_eq!(sys.matrix()[(0, 0)], 1.0);
        assert_eq!(sys.matrix()[(1, 1)], 0.0);
    }

    #[test]
    fn test_stamp_current_source() {
        let mut sys = MnaSystem::new(2);
        sys.stamp_current_source(None, Some(0), 1.0);

        assert_eq!(sys.rhs()[0], 1.0);
        assert_eq!(sys.rhs()[1], 0.0);
    }

    #[test]
    fn test_stamp_source_branch() {
        let mut sys = MnaSystem::new(3);
        sys.stamp_source_branch(Some(0), Some(1), 2, 5.0);

        assert_eq!(sys.matrix()[(0, 2)], 1.0);
        assert_eq!(sys.matrix()[(2, 0)], 1.0);
        assert_eq!(sys.matrix()[(1, 2)], -1.0);
        assert_eq!(sys.matrix()[(2, 1)], -1.0);
        assert_eq!(sys.rhs()[2], 5.0);
    }

    #[test]
    fn test_rhs_accumulates() {
        let mut sys = MnaSystem::new(2);
        sys.stamp_source_branch(Some(0), None, 1, 3.0);
        sys.stamp_source_branch(Some(0), None, 1, 2.0);
        assert_eq!(sys.rhs()[1], 5.0);
    }

    #[test]
    fn test_reset_keeps_buffer() {
        let mut sys = MnaSystem::new(3);
        sys.add_element(1, 1, 4.0);
        sys.reset(3);
        assert_eq!(sys.matrix()[(1, 1)], 0.0);
        sys.reset(5);
        assert_eq!(sys.size(), 5);
    }

    #[test]
    fn test_complex_inductor_branch() {
        let mut sys = ComplexMna::new(2);
        sys.stamp_inductor_branch(Some(0), None, 1, 1000.0, 1e-3);

        assert_eq!(sys.matrix()[(0, 1)], Complex::new(1.0, 0.0));
        assert_eq!(sys.matrix()[(1, 0)], Complex::new(1.0, 0.0));
        assert_eq!(sys.matrix()[(1, 1)], Complex::new(0.0, -1.0));
    }

    #[test]
    fn test_complex_admittance() {
        let mut sys = ComplexMna::new(2);
        let y = Complex::new(0.0, 1e-3);
        sys.stamp_admittance(Some(0), Some(1), y);

        assert_eq!(sys.matrix()[(0, 0)], y);
        assert_eq!(sys.matrix()[(0, 1)], -y);
    }
}
