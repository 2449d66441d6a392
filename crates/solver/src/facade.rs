//! Re-exported APIs for consumers of the solver crate.

pub use crate::batch::{BatchReport, ComparisonPolicy, select_best, size_all, size_all_until};
pub use crate::design::DesignPoint;
pub use crate::error::{DivergenceCause, FailureKind, InfeasibleReason, SizingError};
pub use crate::input::{
    AeroParameters, MissionRequirement, MissionTarget, SizingInput, SolverSettings,
};
pub use crate::solver::{CoupledSizingSolver, size};
pub use crate::sweep::{SweepParameter, SweepSample, linspace, sweep};
pub use sizing_core::{PhysicalEnvironment, Topology};

pub mod config {
    use log::debug;
    use sizing_config::{
        ComparisonConfig, ConfigError, SelectionPolicyConfig, StudyConfig, TopologyConfig,
    };
    use sizing_core::{PhysicalEnvironment, Topology};
    use sizing_energy::BatteryProfile;
    use sizing_matching::SelectionPolicy;
    use sizing_propulsion::{PropulsionEfficiencyChain, RotorParameters};
    use sizing_weights::WeightModel;

    use crate::batch::ComparisonPolicy;
    use crate::input::{
        AeroParameters, MissionRequirement, MissionTarget, SizingInput, SolverSettings,
    };

    /// A study converted into runtime inputs.
    #[derive(Debug, Clone)]
    pub struct StudyPlan {
        pub name: String,
        pub input: SizingInput,
        pub topologies: Vec<Topology>,
        pub comparison: ComparisonPolicy,
    }

    pub fn topology_from_config(config: TopologyConfig) -> Topology {
        match config {
            TopologyConfig::Rotorcraft => Topology::Rotorcraft,
            TopologyConfig::FixedWing => Topology::FixedWing,
            TopologyConfig::HybridVtol => Topology::HybridVtol,
        }
    }

    pub fn comparison_from_config(config: ComparisonConfig) -> ComparisonPolicy {
        match config {
            ComparisonConfig::MaxMargin => ComparisonPolicy::MaxMargin,
            ComparisonConfig::MinMass => ComparisonPolicy::MinMass,
            ComparisonConfig::MinInstalledPower => ComparisonPolicy::MinInstalledPower,
        }
    }

    /// Convert a validated `StudyConfig` into a [`StudyPlan`].
    pub fn from_study(study: &StudyConfig) -> Result<StudyPlan, ConfigError> {
        study.validate()?;

        let topologies: Vec<Topology> = study
            .topologies
            .iter()
            .copied()
            .map(topology_from_config)
            .collect();

        let target = match (study.mission.required_endurance_s, study.mission.range_m) {
            (Some(seconds), None) => MissionTarget::Endurance { seconds },
            (None, Some(metres)) => MissionTarget::Range { metres },
            _ => return Err(ConfigError::MissionTarget(study.name.clone())),
        };

        let aero = &study.aero;
        let input = SizingInput {
            topology: topologies[0],
            environment: PhysicalEnvironment {
                density_kg_m3: study.environment.density_kg_m3,
                gravity_m_s2: study.environment.gravity_m_s2,
                dynamic_viscosity_pa_s: study.environment.dynamic_viscosity_pa_s,
                speed_of_sound_m_s: study.environment.speed_of_sound_m_s,
            },
            propulsion: PropulsionEfficiencyChain {
                motor_efficiency: study.propulsion.motor_efficiency,
                esc_efficiency: study.propulsion.esc_efficiency,
                propeller_efficiency_cruise: study.propulsion.propeller_efficiency_cruise,
                figure_of_merit_hover: study.propulsion.figure_of_merit_hover,
            },
            battery: BatteryProfile {
                specific_energy_wh_per_kg: study.battery.specific_energy_wh_per_kg,
                depth_of_discharge: study.battery.depth_of_discharge,
                round_trip_efficiency: study.battery.round_trip_efficiency,
                reserve_fraction: study.battery.reserve_fraction,
            },
            mission: MissionRequirement {
                payload_mass_kg: study.mission.payload_mass_kg,
                cruise_speed_m_s: study.mission.cruise_speed_m_s,
                target,
                hover_segment_s: study.mission.hover_segment_s,
            },
            aero: AeroParameters {
                cl_max: aero.cl_max,
                stall_margin_factor: aero.stall_margin_factor,
                stall_speed_m_s: aero.stall_speed_m_s,
                aspect_ratio: aero.aspect_ratio,
                cd0: aero.cd0,
                oswald_efficiency: aero.oswald_efficiency,
                target_reynolds: aero.target_reynolds,
                structural_max_wing_loading: aero.structural_max_wing_loading_n_m2,
                climb_rate_m_s: aero.climb_rate_m_s,
                max_power_loading_w_n: aero.max_power_loading_w_n,
                safety_power_margin: aero.safety_power_margin,
                selection_policy: match aero.selection_policy {
                    SelectionPolicyConfig::MaxWingLoading => SelectionPolicy::MaxWingLoading,
                    SelectionPolicyConfig::MinPowerLoading => SelectionPolicy::MinPowerLoading,
                },
            },
            rotor: RotorParameters {
                rotor_count: study.rotor.rotor_count,
                disk_loading_n_m2: study.rotor.disk_loading_n_m2,
            },
            weights: WeightModel {
                structural_fraction: study.weights.structural_fraction,
                wing_areal_density_kg_m2: study.weights.wing_areal_density_kg_m2,
                propulsion_specific_power_w_per_kg: study
                    .weights
                    .propulsion_specific_power_w_per_kg,
                avionics_mass_kg: study.weights.avionics_mass_kg,
                energy_margin: study.weights.energy_margin,
                max_battery_fraction: study.weights.max_battery_fraction,
            },
            solver: SolverSettings {
                mass_seed_kg: study.solver.mass_seed_kg,
                tolerance: study.solver.tolerance,
                max_iterations: study.solver.max_iterations,
                damping: study.solver.damping,
                mass_ceiling_kg: study.solver.mass_ceiling_kg,
            },
        };

        debug!(
            "study '{}' converted: {} topologies",
            study.name,
            topologies.len()
        );
        Ok(StudyPlan {
            name: study.name.clone(),
            input,
            topologies,
            comparison: comparison_from_config(study.comparison),
        })
    }
}
