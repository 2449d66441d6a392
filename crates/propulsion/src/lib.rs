//! Propulsion efficiency chains and the per-topology power/energy strategies.

use sizing_aero::{DragPolar, InvalidAerodynamicInput};
use sizing_core::{PhysicalEnvironment, Topology};
use sizing_energy::{EnergySegment, InvalidEnergyInput, check_unit_interval, segments_energy_wh};

/// Efficiencies between battery terminals and useful thrust power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropulsionEfficiencyChain {
    pub motor_efficiency: f64,
    pub esc_efficiency: f64,
    pub propeller_efficiency_cruise: f64,
    pub figure_of_merit_hover: f64,
}

impl PropulsionEfficiencyChain {
    pub fn validate(&self) -> Result<(), InvalidEnergyInput> {
        check_unit_interval("motor_efficiency", self.motor_efficiency)?;
        check_unit_interval("esc_efficiency", self.esc_efficiency)?;
        check_unit_interval("propeller_efficiency_cruise", self.propeller_efficiency_cruise)?;
        check_unit_interval("figure_of_merit_hover", self.figure_of_merit_hover)
    }

    /// Battery-to-thrust-power efficiency in forward flight.
    pub fn cruise_chain(&self) -> f64 {
        self.motor_efficiency * self.esc_efficiency * self.propeller_efficiency_cruise
    }

    /// Battery-to-ideal-induced-power efficiency in hover.
    pub fn hover_chain(&self) -> f64 {
        self.motor_efficiency * self.esc_efficiency * self.figure_of_merit_hover
    }
}

/// Lift-rotor layout; the disk is sized so that thrust over disk area equals the disk loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorParameters {
    pub rotor_count: u32,
    pub disk_loading_n_m2: f64,
}

impl RotorParameters {
    pub fn validate(&self) -> Result<(), InvalidAerodynamicInput> {
        if self.rotor_count == 0 {
            return Err(InvalidAerodynamicInput::InvalidRotor {
                field: "rotor_count",
                value: 0.0,
            });
        }
        if !(self.disk_loading_n_m2.is_finite() && self.disk_loading_n_m2 > 0.0) {
            return Err(InvalidAerodynamicInput::InvalidRotor {
                field: "disk_loading_n_m2",
                value: self.disk_loading_n_m2,
            });
        }
        Ok(())
    }
}

impl Default for RotorParameters {
    fn default() -> Self {
        Self {
            rotor_count: 4,
            disk_loading_n_m2: 30.0,
        }
    }
}

/// Electrical power requirements at one mass estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerDemand {
    /// `None` when the topology cannot hover.
    pub hover_power_w: Option<f64>,
    /// `None` when the topology has no wing-borne cruise.
    pub cruise_power_w: Option<f64>,
    pub installed_power_w: f64,
    pub safety_power_margin: f64,
}

impl PowerDemand {
    /// Largest of the applicable flight-phase powers, before margin.
    pub fn peak_phase_power_w(&self) -> f64 {
        self.hover_power_w
            .unwrap_or(0.0)
            .max(self.cruise_power_w.unwrap_or(0.0))
    }
}

/// Topology-specific power and energy strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigurationModel {
    /// Multirotor; endurance is sized off hover power alone.
    Rotorcraft { rotor: RotorParameters },
    /// Conventional wing with a cruise propeller; cannot hover.
    FixedWing,
    /// Separate lift rotors for vertical take-off/landing plus a cruise propeller.
    HybridVtol {
        rotor: RotorParameters,
        hover_segment_s: f64,
    },
}

impl ConfigurationModel {
    pub fn for_topology(topology: Topology, rotor: RotorParameters, hover_segment_s: f64) -> Self {
        match topology {
            Topology::Rotorcraft => ConfigurationModel::Rotorcraft { rotor },
            Topology::FixedWing => ConfigurationModel::FixedWing,
            Topology::HybridVtol => ConfigurationModel::HybridVtol {
                rotor,
                hover_segment_s,
            },
        }
    }

    pub fn topology(&self) -> Topology {
        match self {
            ConfigurationModel::Rotorcraft { .. } => Topology::Rotorcraft,
            ConfigurationModel::FixedWing => Topology::FixedWing,
            ConfigurationModel::HybridVtol { .. } => Topology::HybridVtol,
        }
    }

    fn rotor(&self) -> Option<&RotorParameters> {
        match self {
            ConfigurationModel::Rotorcraft { rotor } => Some(rotor),
            ConfigurationModel::FixedWing => None,
            ConfigurationModel::HybridVtol { rotor, .. } => Some(rotor),
        }
    }

    fn hover_segment_s(&self) -> f64 {
        match self {
            ConfigurationModel::HybridVtol {
                hover_segment_s, ..
            } => *hover_segment_s,
            _ => 0.0,
        }
    }

    /// Momentum-theory hover power `W sqrt(DL / 2ρ)` over FM and the electrical chain.
    pub fn hover_power_w(
        &self,
        mass_kg: f64,
        env: &PhysicalEnvironment,
        chain: &PropulsionEfficiencyChain,
    ) -> Option<f64> {
        let rotor = self.rotor()?;
        let weight_n = env.weight_n(mass_kg);
        let induced_velocity = (rotor.disk_loading_n_m2 / (2.0 * env.density_kg_m3)).sqrt();
        Some(weight_n * induced_velocity / chain.hover_chain())
    }

    /// Level-flight power at best lift-to-drag ratio, `W V / (L/D)max`, over the cruise chain.
    pub fn cruise_power_w(
        &self,
        mass_kg: f64,
        env: &PhysicalEnvironment,
        chain: &PropulsionEfficiencyChain,
        polar: &DragPolar,
        cruise_speed_m_s: f64,
    ) -> Option<f64> {
        if !self.topology().is_winged() {
            return None;
        }
        let weight_n = env.weight_n(mass_kg);
        Some(weight_n * cruise_speed_m_s / polar.max_lift_to_drag() / chain.cruise_chain())
    }

    pub fn power_demand(
        &self,
        mass_kg: f64,
        env: &PhysicalEnvironment,
        chain: &PropulsionEfficiencyChain,
        polar: &DragPolar,
        cruise_speed_m_s: f64,
        safety_power_margin: f64,
    ) -> PowerDemand {
        let hover_power_w = self.hover_power_w(mass_kg, env, chain);
        let cruise_power_w = self.cruise_power_w(mass_kg, env, chain, polar, cruise_speed_m_s);
        let mut demand = PowerDemand {
            hover_power_w,
            cruise_power_w,
            installed_power_w: 0.0,
            safety_power_margin,
        };
        demand.installed_power_w = demand.peak_phase_power_w() * safety_power_margin;
        demand
    }

    /// Constant-power legs flown to meet `endurance_s`.
    pub fn mission_segments(&self, demand: &PowerDemand, endurance_s: f64) -> Vec<EnergySegment> {
        let hover = demand.hover_power_w.unwrap_or(0.0);
        let cruise = demand.cruise_power_w.unwrap_or(0.0);
        match self {
            ConfigurationModel::Rotorcraft { .. } => vec![EnergySegment {
                name: "hover",
                power_w: hover,
                duration_s: endurance_s,
            }],
            ConfigurationModel::FixedWing => vec![EnergySegment {
                name: "cruise",
                power_w: cruise,
                duration_s: endurance_s,
            }],
            ConfigurationModel::HybridVtol {
                hover_segment_s, ..
            } => vec![
                EnergySegment {
                    name: "hover",
                    power_w: hover,
                    duration_s: *hover_segment_s,
                },
                EnergySegment {
                    name: "cruise",
                    power_w: cruise,
                    duration_s: endurance_s,
                },
            ],
        }
    }

    pub fn required_energy_wh(
        &self,
        demand: &PowerDemand,
        endurance_s: f64,
    ) -> Result<f64, InvalidEnergyInput> {
        segments_energy_wh(&self.mission_segments(demand, endurance_s))
    }

    /// Flight time available from `usable_wh` (s). The hybrid flies its hover segment first.
    pub fn endurance_s(
        &self,
        demand: &PowerDemand,
        usable_wh: f64,
    ) -> Result<f64, InvalidEnergyInput> {
        let hover = demand.hover_power_w.unwrap_or(0.0);
        let cruise = demand.cruise_power_w.unwrap_or(0.0);
        match self {
            ConfigurationModel::Rotorcraft { .. } => sizing_energy::endurance_s(usable_wh, hover),
            ConfigurationModel::FixedWing => sizing_energy::endurance_s(usable_wh, cruise),
            ConfigurationModel::HybridVtol {
                hover_segment_s, ..
            } => {
                let hover_wh = sizing_energy::required_energy_wh(hover, *hover_segment_s)?;
                if usable_wh <= hover_wh {
                    return sizing_energy::endurance_s(usable_wh, hover);
                }
                let cruise_s = sizing_energy::endurance_s(usable_wh - hover_wh, cruise)?;
                Ok(hover_segment_s + cruise_s)
            }
        }
    }

    /// Distance covered in forward flight for a given endurance (m).
    pub fn range_m(&self, endurance_s: f64, cruise_speed_m_s: f64) -> f64 {
        let cruise_s = (endurance_s - self.hover_segment_s()).max(0.0);
        sizing_energy::range_m(cruise_s, cruise_speed_m_s)
    }

    /// Power rating used for propulsion mass. The hybrid carries a separate cruise motor.
    pub fn propulsion_sizing_power_w(&self, demand: &PowerDemand) -> f64 {
        match self {
            ConfigurationModel::HybridVtol { .. } => {
                demand.installed_power_w
                    + demand.cruise_power_w.unwrap_or(0.0) * demand.safety_power_margin
            }
            _ => demand.installed_power_w,
        }
    }

    /// Diameter of each lift rotor at this mass, if the topology has rotors.
    pub fn rotor_diameter_m(&self, mass_kg: f64, env: &PhysicalEnvironment) -> Option<f64> {
        let rotor = self.rotor()?;
        let disk_area_m2 = env.weight_n(mass_kg) / rotor.disk_loading_n_m2 / rotor.rotor_count as f64;
        Some((4.0 * disk_area_m2 / std::f64::consts::PI).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chain() -> PropulsionEfficiencyChain {
        PropulsionEfficiencyChain {
            motor_efficiency: 0.90,
            esc_efficiency: 0.95,
            propeller_efficiency_cruise: 0.80,
            figure_of_merit_hover: 0.65,
        }
    }

    fn polar() -> DragPolar {
        DragPolar {
            cd0: 0.035,
            oswald_efficiency: 0.8,
            aspect_ratio: 6.0,
        }
    }

    #[test]
    fn fixed_wing_cannot_hover_and_rotorcraft_cannot_cruise() {
        let env = PhysicalEnvironment::mars_reference();
        let fw = ConfigurationModel::FixedWing;
        let rc = ConfigurationModel::Rotorcraft {
            rotor: RotorParameters::default(),
        };
        assert!(fw.hover_power_w(5.0, &env, &chain()).is_none());
        assert!(fw.cruise_power_w(5.0, &env, &chain(), &polar(), 40.0).is_some());
        assert!(rc.cruise_power_w(5.0, &env, &chain(), &polar(), 40.0).is_none());
        assert!(rc.rotor_diameter_m(5.0, &env).is_some());
        assert!(fw.rotor_diameter_m(5.0, &env).is_none());
    }

    #[test]
    fn hover_power_follows_momentum_theory() {
        let env = PhysicalEnvironment::mars_reference();
        let model = ConfigurationModel::Rotorcraft {
            rotor: RotorParameters::default(),
        };
        let power = model.hover_power_w(10.0, &env, &chain()).unwrap();
        let thrust: f64 = 37.11;
        let area = thrust / 30.0;
        let ideal = thrust.powf(1.5) / (2.0 * env.density_kg_m3 * area).sqrt();
        assert_relative_eq!(power, ideal / chain().hover_chain(), max_relative = 1e-12);
    }

    #[test]
    fn installed_power_covers_every_phase() {
        let env = PhysicalEnvironment::mars_reference();
        let model = ConfigurationModel::for_topology(
            Topology::HybridVtol,
            RotorParameters::default(),
            120.0,
        );
        let demand = model.power_demand(8.0, &env, &chain(), &polar(), 40.0, 1.2);
        let hover = demand.hover_power_w.unwrap();
        let cruise = demand.cruise_power_w.unwrap();
        assert!(demand.installed_power_w >= hover.max(cruise));
        assert_relative_eq!(demand.installed_power_w, hover.max(cruise) * 1.2);
        assert_relative_eq!(
            model.propulsion_sizing_power_w(&demand),
            demand.installed_power_w + cruise * 1.2
        );
    }

    #[test]
    fn hybrid_energy_sums_hover_and_cruise_segments() {
        let env = PhysicalEnvironment::mars_reference();
        let model = ConfigurationModel::HybridVtol {
            rotor: RotorParameters::default(),
            hover_segment_s: 120.0,
        };
        let demand = model.power_demand(8.0, &env, &chain(), &polar(), 40.0, 1.0);
        let hover = demand.hover_power_w.unwrap();
        let cruise = demand.cruise_power_w.unwrap();
        let required = model.required_energy_wh(&demand, 3_600.0).unwrap();
        assert_relative_eq!(
            required,
            hover * 120.0 / 3_600.0 + cruise,
            max_relative = 1e-12
        );
        let endurance = model.endurance_s(&demand, required).unwrap();
        assert_relative_eq!(endurance, 3_720.0, max_relative = 1e-9);
        assert_relative_eq!(model.range_m(endurance, 40.0), 3_600.0 * 40.0, max_relative = 1e-9);
    }

    #[test]
    fn rotorcraft_energy_is_hover_times_endurance() {
        let env = PhysicalEnvironment::mars_reference();
        let model = ConfigurationModel::Rotorcraft {
            rotor: RotorParameters::default(),
        };
        let demand = model.power_demand(4.0, &env, &chain(), &polar(), 20.0, 1.0);
        let required = model.required_energy_wh(&demand, 900.0).unwrap();
        assert_relative_eq!(required, demand.hover_power_w.unwrap() / 4.0, max_relative = 1e-12);
        assert_relative_eq!(model.range_m(900.0, 20.0), 18_000.0);
    }

    #[test]
    fn invalid_chain_and_rotor_are_rejected() {
        let mut bad = chain();
        bad.figure_of_merit_hover = 1.3;
        assert!(bad.validate().is_err());
        assert!(chain().validate().is_ok());
        let rotor = RotorParameters {
            rotor_count: 0,
            disk_loading_n_m2: 30.0,
        };
        assert!(rotor.validate().is_err());
    }
}
