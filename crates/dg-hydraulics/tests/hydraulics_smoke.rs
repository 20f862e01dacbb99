//! Integration tests for dg-hydraulics elements working together.

use dg_core::units::{as_m, as_m3ps, m, m3ps, percent, s};
use dg_hydraulics::{
    DischargeElement, DownstreamChannel, InflowModel, Rainfall, Reservoir, SluiceGate,
};
use proptest::prelude::*;

#[test]
fn full_open_gate_settles_at_balance_level() {
    let gate = SluiceGate::reference("main");
    let reservoir = Reservoir::reference();
    let inflow = InflowModel::reference(0).without_noise();

    let mut level = m(5.0);
    for tick in 0..5000 {
        let q_in = inflow.inflow(tick, Rainfall::dry()).unwrap();
        let q_out = gate.discharge(level, percent(100.0)).unwrap();
        level = reservoir.next_level(level, q_in, q_out, s(1.0)).unwrap();
    }

    let q_out = gate.discharge(level, percent(100.0)).unwrap();
    assert!(
        (as_m3ps(q_out) - 36.0).abs() < 0.01,
        "outflow should balance inflow, got {}",
        as_m3ps(q_out)
    );
    assert!(as_m(level) > 6.0 && as_m(level) < 6.2);
}

#[test]
fn closed_gate_fills_to_crest() {
    let gate = SluiceGate::reference("main");
    let reservoir = Reservoir::reference();
    let inflow = InflowModel::reference(9);

    let mut level = m(9.0);
    for tick in 0..200 {
        let q_in = inflow.inflow(tick, Rainfall::dry()).unwrap();
        let q_out = gate.discharge(level, percent(0.0)).unwrap();
        assert_eq!(as_m3ps(q_out), 0.0);
        level = reservoir.next_level(level, q_in, q_out, s(1.0)).unwrap();
    }
    assert_eq!(as_m(level), 10.0);
}

#[test]
fn downstream_tracks_gate_discharge() {
    let gate = SluiceGate::reference("main");
    let channel = DownstreamChannel::reference();

    let q = gate.discharge(m(8.0), percent(60.0)).unwrap();
    let mut level = m(0.5);
    for _ in 0..200 {
        level = channel.next_level(level, q).unwrap();
    }
    let expected = 0.5 + as_m3ps(q) * 0.04;
    assert!((as_m(level) - expected).abs() < 1e-6);
}

proptest! {
    #[test]
    fn discharge_never_negative(level in 0.0_f64..10.0, opening in 0.0_f64..100.0) {
        let gate = SluiceGate::reference("main");
        let q = gate.discharge(m(level), percent(opening)).unwrap();
        prop_assert!(as_m3ps(q) >= 0.0);
        prop_assert!(as_m3ps(q).is_finite());
    }

    #[test]
    fn level_stays_in_bounds(
        level in 0.0_f64..10.0,
        q_in in 0.0_f64..500.0,
        q_out in 0.0_f64..500.0,
        dt in 0.01_f64..60.0,
    ) {
        let reservoir = Reservoir::reference();
        let next = reservoir.next_level(m(level), m3ps(q_in), m3ps(q_out), s(dt)).unwrap();
        prop_assert!(as_m(next) >= 0.0 && as_m(next) <= 10.0);
    }
}
