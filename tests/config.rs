mod common;

use common::config_path;
use mars_sizing::Topology;
use mars_sizing::config::{ConfigError, load_studies, load_study};
use mars_sizing::solver::config::from_study;
use mars_sizing::solver::{ComparisonPolicy, FailureKind, MissionTarget, size_all};

#[test]
fn bundled_yaml_studies_load() {
    let studies = load_studies(config_path("studies/nominal.yaml")).unwrap();
    let names: Vec<&str> = studies.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["nominal", "survey-range", "low-lift-glider"]);
}

#[test]
fn bundled_toml_directory_loads_in_file_order() {
    let studies = load_studies(config_path("studies/toml")).unwrap();
    let names: Vec<&str> = studies.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["heavy-lift", "hybrid-short-hop"]);
}

#[test]
fn nominal_study_sizes_like_the_reference_input() {
    let study = load_study(config_path("studies/nominal.yaml"), None).unwrap();
    let plan = from_study(&study).unwrap();
    assert_eq!(plan.name, "nominal");
    assert_eq!(plan.topologies, Topology::ALL.to_vec());
    assert_eq!(plan.comparison, ComparisonPolicy::MaxMargin);

    let report = size_all(&plan.input, &plan.topologies, plan.comparison);
    assert_eq!(report.best, Some(Topology::FixedWing));
    let best = report.best_design().unwrap();
    assert!(best.reynolds_check.is_some());
}

#[test]
fn range_study_carries_its_policies() {
    let study = load_study(config_path("studies/nominal.yaml"), Some("SURVEY-RANGE")).unwrap();
    let plan = from_study(&study).unwrap();
    assert_eq!(plan.topologies, vec![Topology::FixedWing, Topology::HybridVtol]);
    assert_eq!(plan.comparison, ComparisonPolicy::MinMass);
    assert_eq!(
        plan.input.mission.target,
        MissionTarget::Range { metres: 100_000.0 }
    );

    let report = size_all(&plan.input, &plan.topologies, plan.comparison);
    assert_eq!(report.results.len(), 2);
}

#[test]
fn low_lift_study_has_no_feasible_topology() {
    let study = load_study(config_path("studies/nominal.yaml"), Some("low-lift-glider")).unwrap();
    let plan = from_study(&study).unwrap();
    let report = size_all(&plan.input, &plan.topologies, plan.comparison);

    assert_eq!(report.best, None);
    let err = report.results[&Topology::FixedWing].as_ref().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Infeasible);
}

#[test]
fn toml_studies_convert_and_run() {
    for study in load_studies(config_path("studies/toml")).unwrap() {
        let plan = from_study(&study).unwrap();
        let report = size_all(&plan.input, &plan.topologies, plan.comparison);
        assert_eq!(report.results.len(), plan.topologies.len(), "{}", plan.name);
    }
}

#[test]
fn unknown_study_name_is_reported() {
    let err = load_study(config_path("studies/nominal.yaml"), Some("mars-sample-return"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(name) if name == "mars-sample-return"));
}

#[test]
fn ad_hoc_toml_study_round_trips_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quick.toml");
    std::fs::write(
        &path,
        r#"
name = "quick"
topologies = ["fixed_wing"]
comparison = "min_mass"

[propulsion]
motor_efficiency = 0.90
esc_efficiency = 0.95
propeller_efficiency_cruise = 0.80
figure_of_merit_hover = 0.65

[battery]
specific_energy_wh_per_kg = 270.0
depth_of_discharge = 0.8
round_trip_efficiency = 0.95
reserve_fraction = 0.2

[mission]
payload_mass_kg = 2.0
cruise_speed_m_s = 40.0
required_endurance_s = 3600.0

[aero]
cl_max = 1.2
stall_speed_m_s = 29.2
aspect_ratio = 6.0
"#,
    )
    .unwrap();

    let plan = from_study(&load_study(&path, None).unwrap()).unwrap();
    let report = size_all(&plan.input, &plan.topologies, plan.comparison);
    assert_eq!(report.best, Some(Topology::FixedWing));
}

#[test]
fn study_without_a_mission_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aimless.yaml");
    std::fs::write(
        &path,
        "- name: aimless\n  propulsion: {motor_efficiency: 0.9, esc_efficiency: 0.95, propeller_efficiency_cruise: 0.8, figure_of_merit_hover: 0.65}\n  battery: {specific_energy_wh_per_kg: 270.0, depth_of_discharge: 0.8, round_trip_efficiency: 0.95, reserve_fraction: 0.2}\n  mission: {payload_mass_kg: 2.0, cruise_speed_m_s: 40.0}\n  aero: {cl_max: 1.2, aspect_ratio: 6.0}\n",
    )
    .unwrap();
    let err = load_studies(&path).unwrap_err();
    assert!(matches!(err, ConfigError::MissionTarget(name) if name == "aimless"));
}
