#![allow(dead_code)]

use mars_sizing::energy::BatteryProfile;
use mars_sizing::propulsion::{PropulsionEfficiencyChain, RotorParameters};
use mars_sizing::solver::{AeroParameters, MissionRequirement, SizingInput, SolverSettings};
use mars_sizing::weights::WeightModel;
use mars_sizing::{PhysicalEnvironment, Topology};

pub const STALL_SPEED_M_S: f64 = 29.2;
pub const MIN_SPEED_M_S: f64 = 35.04;

/// 2 kg payload, one hour at 40 m/s on Mars.
pub fn nominal_input(topology: Topology) -> SizingInput {
    let mut aero = AeroParameters::new(1.2, 6.0);
    aero.stall_speed_m_s = Some(STALL_SPEED_M_S);
    SizingInput {
        topology,
        environment: PhysicalEnvironment::mars_reference(),
        propulsion: PropulsionEfficiencyChain {
            motor_efficiency: 0.90,
            esc_efficiency: 0.95,
            propeller_efficiency_cruise: 0.80,
            figure_of_merit_hover: 0.65,
        },
        battery: BatteryProfile {
            specific_energy_wh_per_kg: 270.0,
            depth_of_discharge: 0.8,
            round_trip_efficiency: 0.95,
            reserve_fraction: 0.2,
        },
        mission: MissionRequirement::endurance(2.0, 40.0, 3_600.0),
        aero,
        rotor: RotorParameters::default(),
        weights: WeightModel::default(),
        solver: SolverSettings::default(),
    }
}

pub fn config_path(relative: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join(relative)
}
