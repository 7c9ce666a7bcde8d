//! Result extraction: the `V(<node>)` / `I(<device>)` probe grammar.

use voltlab_devices::Device;

use crate::circuit::Circuit;
use crate::results::{AcResults, SweepResults};

/// A parsed probe variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Node voltage `V(<nodeName>)`.
    Voltage(String),
    /// Branch current `I(<deviceName>)`.
    Current(String),
}

/// Which real-valued analysis a series is extracted from. Capacitor current
/// is zero in DC and a backward difference in transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Dc,
    Transient,
}

/// Parse a probe variable. Returns `None` for anything outside the grammar.
pub fn parse_probe(text: &str) -> Option<Probe> {
    let t = text.trim();
    let first = t.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let inner = t[1..].strip_prefix('(')?.strip_suffix(')')?.trim();
    if inner.is_empty() {
        return None;
    }
    match first.to_ascii_uppercase() {
        'V' => Some(Probe::Voltage(inner.to_string())),
        'I' => Some(Probe::Current(inner.to_string())),
        _ => None,
    }
}

/// Extract a probe series from a DC sweep or transient result.
///
/// Unsupported probes log a warning and return `None`.
pub fn real_series(
    circuit: &Circuit,
    results: &SweepResults,
    probe: &Probe,
    kind: AnalysisKind,
) -> Option<Vec<(f64, f64)>> {
    let index = &results.index;
    match probe {
        Probe::Voltage(name) => {
            let Some(id) = circuit.lookup_node(name) else {
                log::warn!("V({}): unknown node, variable skipped", name);
                return None;
            };
            if circuit.is_ground(id) {
                return Some(results.points.iter().map(|(k, _)| (*k, 0.0)).collect());
            }
            let Some(row) = index.node(id) else {
                log::warn!("V({}): node not part of the last analysis, variable skipped", name);
                return None;
            };
            Some(
                results
                    .points
                    .iter()
                    .map(|(k, x)| (*k, x[row]))
                    .collect(),
            )
        }
        Probe::Current(name) => {
            let Some(device) = circuit.device(name) else {
                log::warn!("I({}): unknown device, variable skipped", name);
                return None;
            };
            if device.needs_current_unknown() {
                let Some(row) = index.branch(name) else {
                    log::warn!(
                        "I({}): device not part of the last analysis, variable skipped",
                        name
                    );
                    return None;
                };
                return Some(
                    results
                        .points
                        .iter()
                        .map(|(k, x)| (*k, x[row]))
                        .collect(),
                );
            }
            match device {
                Device::Resistor(r) => Some(
                    results
                        .points
                        .iter()
                        .map(|(k, x)| {
                            let vd = index.voltage_diff(x, r.node_pos, r.node_neg);
                            (*k, vd / r.resistance)
                        })
                        .collect(),
                ),
                Device::Capacitor(c) => match kind {
                    // A capacitor is an open circuit in DC.
                    AnalysisKind::Dc => {
                        Some(results.points.iter().map(|(k, _)| (*k, 0.0)).collect())
                    }
                    AnalysisKind::Transient => {
                        let mut series = Vec::with_capacity(results.points.len());
                        let mut prev: Option<(f64, f64)> = None;
                        for (t, x) in &results.points {
                            let vd = index.voltage_diff(x, c.node_pos, c.node_neg);
                            let i = match prev {
                                // The first recorded point reports 0.
                                None => 0.0,
                                Some((t_prev, vd_prev)) => {
                                    c.capacitance * (vd - vd_prev) / (t - t_prev)
                                }
                            };
                            series.push((*t, i));
                            prev = Some((*t, vd));
                        }
                        Some(series)
                    }
                },
                _ => {
                    log::warn!("I({}): unsupported for this device, variable skipped", name);
                    None
                }
            }
        }
    }
}

/// Extract a probe magnitude series from an AC result.
pub fn ac_series(circuit: &Circuit, results: &AcResults, probe: &Probe) -> Option<Vec<(f64, f64)>> {
    let index = &results.index;
    match probe {
        Probe::Voltage(name) => {
            let Some(id) = circuit.lookup_node(name) else {
                log::warn!("V({}): unknown node, variable skipped", name);
                return None;
            };
            if circuit.is_ground(id) {
                return Some(results.points.iter().map(|(w, _)| (*w, 0.0)).collect());
            }
            let Some(row) = index.node(id) else {
                log::warn!("V({}): node not part of the last analysis, variable skipped", name);
                return None;
            };
            Some(
                results
                    .points
                    .iter()
                    .map(|(w, x)| (*w, x[row].norm()))
                    .collect(),
            )
        }
        Probe::Current(name) => {
            let Some(device) = circuit.device(name) else {
                log::warn!("I({}): unknown device, variable skipped", name);
                return None;
            };
            if device.needs_current_unknown() {
                let Some(row) = index.branch(name) else {
                    log::warn!(
                        "I({}): device not part of the last analysis, variable skipped",
                        name
                    );
                    return None;
                };
                return Some(
                    results
                        .points
                        .iter()
                        .map(|(w, x)| (*w, x[row].norm()))
                        .collect(),
                );
            }
            match device {
                Device::Resistor(r) => Some(
                    results
                        .points
                        .iter()
                        .map(|(w, x)| {
                            let vd = index.voltage_diff_complex(x, r.node_pos, r.node_neg);
                            (*w, vd.norm() / r.resistance)
                        })
                        .collect(),
                ),
                _ => {
                    log::warn!("I({}): unsupported in AC results, variable skipped", name);
                    None
                }
            }
        }
    }
}
