//! Ideal diode model using the Shockley equation.

use nalgebra::DVector;
use voltlab_core::mna::{ComplexMna, MnaIndex, MnaSystem};
use voltlab_core::NodeId;

/// Minimum junction conductance added for numerical stability.
const GMIN: f64 = 1e-12;

/// Junction voltage the Newton-Raphson iteration starts from.
const V_SEED: f64 = 0.7;

/// A diode element, linearized about its previous junction voltage.
///
/// At operating point `v_prev`:
/// - `I    = Is * (exp(v_prev / (η·Vt)) - 1)`
/// - `G_d  = Is / (η·Vt) * exp(v_prev / (η·Vt)) + Gmin`
/// - `I_eq = I - G_d * v_prev`
///
/// stamped as the conductance `G_d` plus the equivalent current source
/// `I_eq` out of the anode.
#[derive(Debug, Clone)]
pub struct Diode {
    /// Device name (e.g., "D1").
    pub name: String,
    /// Anode node.
    pub node_pos: NodeId,
    /// Cathode node.
    pub node_neg: NodeId,
    /// Saturation current (A).
    pub is_sat: f64,
    /// Ideality factor.
    pub eta: f64,
    /// Thermal voltage (V).
    pub vt: f64,
    /// Junction voltage at the previous NR iterate / solved point.
    pub v_prev: f64,
}

impl Diode {
    /// Create a diode with default parameters (Is = 1e-12, η = 1, Vt = 26mV).
    pub fn new(name: impl Into<String>, node_pos: NodeId, node_neg: NodeId) -> Self {
        Self::with_params(name, node_pos, node_neg, 1e-12, 1.0, 0.026)
    }

    /// Create a diode with explicit parameters.
    pub fn with_params(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        is_sat: f64,
        eta: f64,
        vt: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            is_sat,
            eta,
            vt,
            v_prev: V_SEED,
        }
    }

    /// Evaluate diode current and conductance at a junction voltage.
    pub fn evaluate(&self, vd: f64) -> (f64, f64) {
        let nvt = self.eta * self.vt;
        self.shockley(limit_voltage(vd, nvt, self.is_sat))
    }

    fn shockley(&self, vd: f64) -> (f64, f64) {
        let nvt = self.eta * self.vt;
        let exp_term = (vd / nvt).exp();
        let id = self.is_sat * (exp_term - 1.0);
        let gd = self.is_sat / nvt * exp_term + GMIN;
        (id, gd)
    }

    pub(crate) fn stamp(&self, mna: &mut MnaSystem, index: &MnaIndex) {
        let nvt = self.eta * self.vt;
        let vd = limit_voltage(self.v_prev, nvt, self.is_sat);
        let (id, gd) = self.shockley(vd);
        let ieq = id - gd * vd;

        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_conductance(i, j, gd);
        // -I_eq at the anode, +I_eq at the cathode.
        mna.stamp_current_source(i, j, ieq);
    }

    pub(crate) fn stamp_ac(&self, mna: &mut ComplexMna, index: &MnaIndex) {
        // Small-signal placeholder: unit conductance at the bias point.
        let i = index.node(self.node_pos);
        let j = index.node(self.node_neg);
        mna.stamp_conductance(i, j, 1.0);
    }

    pub(crate) fn update_state(&mut self, solution: &DVector<f64>, index: &MnaIndex) {
        self.v_prev = index.voltage_diff(solution, self.node_pos, self.node_neg);
    }

    pub(crate) fn reset(&mut self) {
        self.v_prev = V_SEED;
    }
}

/// Junction voltage limiting: log compression above the critical voltage
/// keeps `exp()` finite while NR overshoots.
fn limit_voltage(vd: f64, nvt: f64, is_sat: f64) -> f64 {
    let vcrit = nvt * (nvt / (std::f64::consts::SQRT_2 * is_sat)).ln();
    if vd > vcrit {
        vcrit + nvt * ((vd - vcrit) / nvt).ln_1p()
    } else {
        vd
    }
}
