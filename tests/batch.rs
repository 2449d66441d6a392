mod common;

use std::time::Instant;

use common::nominal_input;
use mars_sizing::Topology;
use mars_sizing::solver::{
    ComparisonPolicy, FailureKind, SweepParameter, linspace, size_all, size_all_until, sweep,
};

#[test]
fn nominal_batch_prefers_the_fixed_wing() {
    let report = size_all(
        &nominal_input(Topology::FixedWing),
        &Topology::ALL,
        ComparisonPolicy::MaxMargin,
    );
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.best, Some(Topology::FixedWing));
    assert_eq!(report.designs().count(), 3);
    assert_eq!(report.failures().count(), 0);

    let best = report.best_design().unwrap();
    assert!(best.feasible);
    assert!(report.designs().filter(|d| d.feasible).all(|d| d.mtow_kg >= best.mtow_kg));
}

#[test]
fn every_policy_agrees_on_the_nominal_case() {
    let input = nominal_input(Topology::FixedWing);
    for comparison in [ComparisonPolicy::MinMass, ComparisonPolicy::MinInstalledPower] {
        let report = size_all(&input, &Topology::ALL, comparison);
        assert_eq!(report.best, Some(Topology::FixedWing), "{comparison}");
        assert_eq!(report.comparison, comparison);
    }
}

#[test]
fn slow_cruise_rules_out_winged_topologies_only() {
    let mut input = nominal_input(Topology::FixedWing);
    input.mission.cruise_speed_m_s = 30.0;
    let report = size_all(&input, &Topology::ALL, ComparisonPolicy::MaxMargin);

    for topology in [Topology::FixedWing, Topology::HybridVtol] {
        let err = report.results[&topology].as_ref().unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }
    assert!(report.results[&Topology::Rotorcraft].is_ok());
}

#[test]
fn expired_deadline_fails_every_topology() {
    let report = size_all_until(
        &nominal_input(Topology::FixedWing),
        &Topology::ALL,
        ComparisonPolicy::MaxMargin,
        Some(Instant::now()),
    );
    assert_eq!(report.best, None);
    assert_eq!(report.failures().count(), 3);
    assert!(report.failures().all(|(_, err)| err.kind() == FailureKind::Diverged));
}

#[test]
fn heavier_payload_sweeps_to_heavier_aircraft() {
    let base = nominal_input(Topology::FixedWing);
    let values = linspace(1.0, 3.0, 5);
    let samples = sweep(&base, SweepParameter::PayloadMass, &values);

    assert_eq!(samples.len(), values.len());
    let masses: Vec<f64> = samples
        .iter()
        .zip(&values)
        .map(|(sample, value)| {
            assert_eq!(sample.value, *value);
            sample.result.as_ref().unwrap().mtow_kg
        })
        .collect();
    assert!(masses.windows(2).all(|pair| pair[1] > pair[0]), "{masses:?}");
}
