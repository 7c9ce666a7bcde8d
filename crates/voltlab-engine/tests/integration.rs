//! End-to-end analysis scenarios.

use std::sync::atomic::AtomicBool;

use approx::assert_relative_eq;
use voltlab_engine::analysis::{run_dc_sweep, DcSweepParams};
use voltlab_engine::{Assembler, Session};

fn series_at(series: &[(f64, f64)], key: f64) -> f64 {
    series
        .iter()
        .min_by(|a, b| {
            (a.0 - key)
                .abs()
                .partial_cmp(&(b.0 - key).abs())
                .expect("finite keys")
        })
        .expect("non-empty series")
        .1
}

/// Resistive divider:
///
/// ```text
///   V1 = 10V -- in -- R1 = 1k -- mid -- R2 = 1k -- gnd
/// ```
///
/// Expected: V(mid) = 5.0, I(V1) = -5mA.
fn divider_session() -> Session {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 10.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "mid", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R2", "mid", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");
    s
}

#[test]
fn test_resistive_divider_dc() {
    let mut s = divider_session();
    s.run_dc_sweep("V1", 10.0, 10.0, 1.0).unwrap();

    let results = s.get_dc_results(&["V(mid)", "V(in)", "V(gnd)", "I(V1)", "I(R1)"]);

    assert_relative_eq!(results["V(mid)"][0].1, 5.0, epsilon = 1e-9);
    assert_relative_eq!(results["V(in)"][0].1, 10.0, epsilon = 1e-9);
    assert_eq!(results["V(gnd)"][0].1, 0.0);
    assert_relative_eq!(results["I(V1)"][0].1, -5e-3, epsilon = 1e-9);
    assert_relative_eq!(results["I(R1)"][0].1, 5e-3, epsilon = 1e-9);
}

#[test]
fn test_dc_rerun_is_bit_identical() {
    let mut s = divider_session();
    s.run_dc_sweep("V1", 0.0, 10.0, 1.0).unwrap();
    let first = s.get_dc_results(&["V(mid)", "I(V1)"]);
    s.run_dc_sweep("V1", 0.0, 10.0, 1.0).unwrap();
    let second = s.get_dc_results(&["V(mid)", "I(V1)"]);

    assert_eq!(first, second);
}

#[test]
fn test_kcl_residual_at_dc_point() {
    // Re-assemble the divider at the solved operating point and check
    // ‖A·x - b‖∞ directly.
    let mut s = divider_session();

    let params = DcSweepParams {
        source: "V1".to_string(),
        start: 10.0,
        stop: 10.0,
        step: 1.0,
    };
    let mut assembler = Assembler::new();
    let results = run_dc_sweep(
        s.circuit_mut(),
        &mut assembler,
        &params,
        &AtomicBool::new(false),
    )
    .unwrap();
    let (_, x) = &results.points[0];

    let sys = assembler
        .assemble(s.circuit().devices(), &results.index, 0.0, 0.0)
        .unwrap();
    let residual = sys.matrix() * x - sys.rhs();
    assert!(residual.amax() < 1e-8, "residual = {}", residual.amax());
}

/// RC charge:
///
/// ```text
///   V1 = 1V -- in -- R1 = 1k -- out -- C1 = 1u -- gnd
/// ```
///
/// τ = 1ms; at t = 1ms the output has charged to 1 - 1/e ≈ 0.6321.
#[test]
fn test_rc_charge_transient() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "out", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('C', "C1", "out", "gnd", 1e-6, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_transient(5e-3, 0.0, 1e-5).unwrap();
    let results = s.get_transient_results(&["V(out)", "I(C1)"]);

    let v_out = series_at(&results["V(out)"], 1e-3);
    let expected = 1.0 - (-1.0f64).exp();
    assert!(
        (v_out - expected).abs() / expected < 0.01,
        "V(out) at 1ms = {} (expected ≈ {})",
        v_out,
        expected
    );

    // Capacitor current: first recorded point reports 0, then decays from
    // roughly 1mA.
    let i_c = &results["I(C1)"];
    assert_eq!(i_c[0].1, 0.0);
    assert!(i_c[1].1 > 0.0);
    assert!(series_at(i_c, 1e-3) < i_c[1].1);
}

/// Diode clamp swept through the knee:
///
/// ```text
///   V1 -- a -- R1 = 1k -- k -- D1 -- gnd
/// ```
#[test]
fn test_diode_clamp_dc_sweep() {
    let mut s = Session::new();
    s.add_device('V', "V1", "a", "gnd", 0.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "a", "k", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('D', "D1", "k", "gnd", 0.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_dc_sweep("V1", 0.0, 2.0, 0.1).unwrap();
    let results = s.get_dc_results(&["V(k)"]);
    let v_k = &results["V(k)"];

    assert_eq!(v_k.len(), 21);

    // Unbiased: no current, no drop.
    assert!(v_k[0].1.abs() < 1e-4, "V(k) at V1=0 was {}", v_k[0].1);

    // Forward-biased at 1V: clamped to a diode drop. With Is = 1e-12 the
    // knee sits at Vt * ln(I/Is) ≈ 0.52V for half a milliamp.
    let clamped = series_at(v_k, 1.0);
    assert!(
        (0.45..=0.75).contains(&clamped),
        "V(k) at V1=1 was {}",
        clamped
    );

    // Still clamped near the same drop at 2V, one thermal-voltage log
    // higher at most.
    let clamped2 = series_at(v_k, 2.0);
    assert!(
        (0.45..=0.8).contains(&clamped2),
        "V(k) at V1=2 was {}",
        clamped2
    );
    assert!(clamped2 > clamped);
}

/// RL step:
///
/// ```text
///   V1 = 1V -- in -- R1 = 10 -- x -- L1 = 1m -- gnd
/// ```
///
/// τ = L/R = 100µs; at t = τ the current reaches (1/R)(1 - 1/e) ≈ 63.2mA.
#[test]
fn test_rl_step_transient() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "x", 10.0, &[], &[], false)
        .unwrap();
    s.add_device('L', "L1", "x", "gnd", 1e-3, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_transient(5e-4, 0.0, 1e-6).unwrap();
    let results = s.get_transient_results(&["I(L1)"]);

    let i_l = series_at(&results["I(L1)"], 1e-4);
    let expected = 0.1 * (1.0 - (-1.0f64).exp());
    assert!(
        (i_l - expected).abs() / expected < 0.02,
        "I(L1) at τ = {} (expected ≈ {})",
        i_l,
        expected
    );
}

/// AC lowpass:
///
/// ```text
///   Vac (unit) -- in -- R1 = 1k -- out -- C1 = 1u -- gnd
/// ```
///
/// |V(out)| = 1/√(1 + (ωRC)²): ≈ 1 at ω = 10, 1/√2 at ω = 1000.
#[test]
fn test_ac_lowpass() {
    let mut s = Session::new();
    s.add_device('A', "Vac", "in", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "out", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('C', "C1", "out", "gnd", 1e-6, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_ac_sweep(10.0, 1000.0, 100).unwrap();
    let results = s.get_ac_results(&["V(out)"]);
    let v_out = &results["V(out)"];

    let at_10 = series_at(v_out, 10.0);
    assert!((at_10 - 1.0).abs() < 0.01, "|V(out)| at ω=10 was {}", at_10);

    let at_1000 = series_at(v_out, 1000.0);
    let expected = 1.0 / 2.0f64.sqrt();
    assert!(
        (at_1000 - expected).abs() / expected < 0.02,
        "|V(out)| at ω=1000 was {} (expected ≈ {})",
        at_1000,
        expected
    );
}

#[test]
fn test_ac_sweep_requires_ac_source() {
    let mut s = divider_session();
    let err = s.run_ac_sweep(10.0, 1000.0, 10).unwrap_err();
    assert!(matches!(err, voltlab_engine::Error::NoAcSource));
}

/// VCVS gain stage:
///
/// ```text
///   V1 = 1V -- a;  E1: V(out) = 5 * V(a);  R1 = 1k load.
/// ```
#[test]
fn test_vcvs_voltage_gain() {
    let mut s = Session::new();
    s.add_device('V', "V1", "a", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('E', "E1", "out", "gnd", 5.0, &[], &["a", "gnd"], false)
        .unwrap();
    s.add_device('R', "R1", "out", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_dc_sweep("V1", 1.0, 1.0, 1.0).unwrap();
    let results = s.get_dc_results(&["V(out)"]);
    assert_relative_eq!(results["V(out)"][0].1, 5.0, epsilon = 1e-9);
}

#[test]
fn test_current_controlled_sources() {
    // V1 drives 1mA through R1; H1 reproduces gain * I(V1), F1 mirrors it.
    let mut s = Session::new();
    s.add_device('V', "V1", "a", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "a", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    // H1: V(x) = -1000 * I(V1); I(V1) = -1mA, so V(x) = 1V.
    s.add_device('H', "H1", "x", "gnd", -1000.0, &[], &["V1"], false)
        .unwrap();
    s.add_device('R', "R2", "x", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    // F1: pushes -2 * I(V1) = 2mA into R3 from y to gnd: V(y) = -2V.
    s.add_device('F', "F1", "y", "gnd", -2.0, &[], &["V1"], false)
        .unwrap();
    s.add_device('R', "R3", "y", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_dc_sweep("V1", 1.0, 1.0, 1.0).unwrap();
    let results = s.get_dc_results(&["V(x)", "V(y)", "I(V1)"]);

    assert!((results["I(V1)"][0].1 + 1e-3).abs() < 1e-9);
    assert!((results["V(x)"][0].1 - 1.0).abs() < 1e-9);
    assert!((results["V(y)"][0].1 + 2.0).abs() < 1e-9);
}

#[test]
fn test_vccs_transconductance() {
    // G1 injects gm * V(a) = 2mA into a 1k load: V(out) = -2V at the
    // positive output terminal (current flows out of out+).
    let mut s = Session::new();
    s.add_device('V', "V1", "a", "gnd", 1.0, &[], &[], false)
        .unwrap();
    s.add_device('G', "G1", "out", "gnd", 2e-3, &[], &["a", "gnd"], false)
        .unwrap();
    s.add_device('R', "R1", "out", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_dc_sweep("V1", 1.0, 1.0, 1.0).unwrap();
    let results = s.get_dc_results(&["V(out)"]);
    assert!((results["V(out)"][0].1 + 2.0).abs() < 1e-9);
}

#[test]
fn test_connect_nodes_commutes_and_rename_is_invisible() {
    // Split the divider midpoint into two nets and reconnect them; the
    // merged circuit solves identically regardless of argument order.
    let build = |swap: bool, rename: bool| {
        let mut s = Session::new();
        s.add_device('V', "V1", "in", "gnd", 10.0, &[], &[], false)
            .unwrap();
        s.add_device('R', "R1", "in", "mid_a", 1000.0, &[], &[], false)
            .unwrap();
        s.add_device('R', "R2", "mid_b", "gnd", 1000.0, &[], &[], false)
            .unwrap();
        s.add_ground("gnd");
        if swap {
            s.connect_nodes("mid_b", "mid_a").unwrap();
        } else {
            s.connect_nodes("mid_a", "mid_b").unwrap();
        }
        if rename {
            s.rename_node("in", "source").unwrap();
        }
        s.run_dc_sweep("V1", 10.0, 10.0, 1.0).unwrap();
        s.get_dc_results(&["V(mid_a)", "V(mid_b)"])
    };

    let forward = build(false, false);
    let backward = build(true, false);
    let renamed = build(false, true);

    assert!((forward["V(mid_a)"][0].1 - 5.0).abs() < 1e-9);
    assert_eq!(forward, backward);
    assert_eq!(forward, renamed);
}

#[test]
fn test_labels_merge_like_wires() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 10.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "mid_a", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R2", "mid_b", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");
    s.add_label("mid", "mid_a");
    s.add_label("mid", "mid_b");

    s.run_dc_sweep("V1", 10.0, 10.0, 1.0).unwrap();
    let results = s.get_dc_results(&["V(mid_a)"]);
    assert!((results["V(mid_a)"][0].1 - 5.0).abs() < 1e-9);
}

#[test]
fn test_no_ground_is_rejected() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "out", 10.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "out", 1000.0, &[], &[], false)
        .unwrap();

    let err = s.run_dc_sweep("V1", 0.0, 1.0, 0.5).unwrap_err();
    assert!(matches!(
        err,
        voltlab_engine::Error::Circuit(voltlab_core::Error::NoGround)
    ));
}

#[test]
fn test_sweeping_sin_source_is_rejected() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 0.0, &[0.0, 1.0, 50.0], &[], true)
        .unwrap();
    s.add_device('R', "R1", "in", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    let err = s.run_dc_sweep("V1", 0.0, 1.0, 0.5).unwrap_err();
    assert!(matches!(err, voltlab_engine::Error::UnknownSource(_)));

    let err = s.run_dc_sweep("R1", 0.0, 1.0, 0.5).unwrap_err();
    assert!(matches!(err, voltlab_engine::Error::UnknownSource(_)));
}

#[test]
fn test_sinusoidal_transient_follows_source() {
    // 50 Hz unit sine through a divider: the midpoint tracks half the
    // source value at every step.
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 0.0, &[0.0, 1.0, 50.0], &[], true)
        .unwrap();
    s.add_device('R', "R1", "in", "mid", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R2", "mid", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_transient(0.02, 0.0, 1e-4).unwrap();
    let results = s.get_transient_results(&["V(mid)"]);
    for (t, v) in &results["V(mid)"] {
        let source = (2.0 * std::f64::consts::PI * 50.0 * t).sin();
        assert!(
            (v - source / 2.0).abs() < 1e-9,
            "V(mid) at t={} was {}",
            t,
            v
        );
    }
}

#[test]
fn test_capacitor_current_is_zero_in_dc() {
    let mut s = Session::new();
    s.add_device('V', "V1", "in", "gnd", 10.0, &[], &[], false)
        .unwrap();
    s.add_device('R', "R1", "in", "out", 1000.0, &[], &[], false)
        .unwrap();
    s.add_device('C', "C1", "out", "gnd", 1e-6, &[], &[], false)
        .unwrap();
    s.add_device('R', "R2", "out", "gnd", 1000.0, &[], &[], false)
        .unwrap();
    s.add_ground("gnd");

    s.run_dc_sweep("V1", 0.0, 10.0, 1.0).unwrap();
    let results = s.get_dc_results(&["I(C1)"]);
    assert!(results["I(C1)"].iter().all(|(_, i)| *i == 0.0));
}

#[test]
fn test_unsupported_probe_is_skipped() {
    let mut s = divider_session();
    s.run_dc_sweep("V1", 10.0, 10.0, 1.0).unwrap();

    let results = s.get_dc_results(&["V(mid)", "V(nosuch)", "I(D9)", "bogus"]);
    assert_eq!(results.len(), 1);
    assert!(results.contains_key("V(mid)"));
}
