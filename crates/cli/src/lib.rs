//! Shared argument types and report formatting for the sizing binaries.

use clap::ValueEnum;
use mars_sizing::Topology;
use mars_sizing::units::{m_to_km, seconds_to_minutes};
use mars_sizing::solver::{BatchReport, ComparisonPolicy, DesignPoint, SweepParameter};

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
pub enum TopologyArg {
    Rotorcraft,
    FixedWing,
    HybridVtol,
}

impl From<TopologyArg> for Topology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Rotorcraft => Topology::Rotorcraft,
            TopologyArg::FixedWing => Topology::FixedWing,
            TopologyArg::HybridVtol => Topology::HybridVtol,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
pub enum CompareArg {
    MaxMargin,
    MinMass,
    MinInstalledPower,
}

impl From<CompareArg> for ComparisonPolicy {
    fn from(arg: CompareArg) -> Self {
        match arg {
            CompareArg::MaxMargin => ComparisonPolicy::MaxMargin,
            CompareArg::MinMass => ComparisonPolicy::MinMass,
            CompareArg::MinInstalledPower => ComparisonPolicy::MinInstalledPower,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
pub enum ParameterArg {
    /// Payload mass (kg)
    Payload,
    /// Battery specific energy (Wh/kg)
    SpecificEnergy,
    /// Required endurance (s)
    Endurance,
    /// Cruise speed (m/s)
    CruiseSpeed,
    /// Battery reserve fraction
    Reserve,
}

impl From<ParameterArg> for SweepParameter {
    fn from(arg: ParameterArg) -> Self {
        match arg {
            ParameterArg::Payload => SweepParameter::PayloadMass,
            ParameterArg::SpecificEnergy => SweepParameter::SpecificEnergy,
            ParameterArg::Endurance => SweepParameter::Endurance,
            ParameterArg::CruiseSpeed => SweepParameter::CruiseSpeed,
            ParameterArg::Reserve => SweepParameter::ReserveFraction,
        }
    }
}

/// `warn` by default, `-v` for info, `-vv` for debug; `RUST_LOG` wins when set.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Human-readable per-topology table for a batch.
pub fn print_report(study: &str, report: &BatchReport) {
    println!("=== Study: {} (comparison: {}) ===", study, report.comparison);
    println!(
        "{:<12} {:<13} {:>8} {:>9} {:>8} {:>9} {:>8} {:>9} {:>8} {:>8}  {}",
        "topology",
        "status",
        "MTOW kg",
        "W/S N/m2",
        "P/W W/N",
        "P_inst W",
        "batt kg",
        "margin %",
        "end min",
        "range km",
        "binding"
    );
    for (topology, result) in &report.results {
        match result {
            Ok(design) => print_design_row(design),
            Err(err) => println!("{:<12} {:<13} {}", topology.name(), err.kind().name(), err),
        }
    }
    match report.best_design() {
        Some(best) => println!(
            "Best topology: {} ({:.3} kg, margin {:.2}%)",
            best.topology, best.mtow_kg, best.margin_percent
        ),
        None => println!("Best topology: none feasible"),
    }
}

fn print_design_row(design: &DesignPoint) {
    let status = if design.feasible {
        "feasible"
    } else {
        "short-energy"
    };
    println!(
        "{:<12} {:<13} {:>8.3} {:>9.3} {:>8.3} {:>9.1} {:>8.3} {:>9.2} {:>8.1} {:>8.1}  {}",
        design.topology.name(),
        status,
        design.mtow_kg,
        design.wing_loading_n_m2,
        design.power_loading_w_n,
        design.installed_power_w,
        design.battery_mass_kg,
        design.margin_percent,
        seconds_to_minutes(design.endurance_s),
        m_to_km(design.range_m),
        design.binding_constraint
    );
}
