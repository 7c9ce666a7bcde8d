//! Per-analysis solution storage.

use nalgebra::DVector;
use num_complex::Complex;
use voltlab_core::mna::MnaIndex;

/// Solutions of a real-valued analysis (DC sweep or transient), keyed by the
/// sweep parameter (source value or time) in sweep order.
#[derive(Debug, Clone)]
pub struct SweepResults {
    /// (sweep parameter, solution vector) per solved point.
    pub points: Vec<(f64, DVector<f64>)>,
    /// The dense index the solutions were produced under.
    pub index: MnaIndex,
    /// Sweep points recorded from a non-converged NR iterate.
    pub non_converged_points: usize,
    /// Whether the analysis stopped early on a singular matrix (transient).
    pub aborted: bool,
}

impl SweepResults {
    /// Create an empty result set for the given index snapshot.
    pub fn new(index: MnaIndex) -> Self {
        Self {
            points: Vec::new(),
            index,
            non_converged_points: 0,
            aborted: false,
        }
    }

    /// Record a solved sweep point.
    pub fn push(&mut self, key: f64, solution: DVector<f64>) {
        self.points.push((key, solution));
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Solutions of an AC sweep, keyed by angular frequency.
#[derive(Debug, Clone)]
pub struct AcResults {
    /// (ω, complex solution vector) per solved point.
    pub points: Vec<(f64, DVector<Complex<f64>>)>,
    /// The dense index the solutions were produced under.
    pub index: MnaIndex,
}

impl AcResults {
    /// Create an empty result set for the given index snapshot.
    pub fn new(index: MnaIndex) -> Self {
        Self {
            points: Vec::new(),
            index,
        }
    }

    /// Record a solved frequency point.
    pub fn push(&mut self, omega: f64, solution: DVector<Complex<f64>>) {
        self.points.push((omega, solution));
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
