//! Component weight breakdown: structure, wing, propulsion, battery, avionics and payload.

use sizing_energy::{BatteryProfile, InvalidEnergyInput, battery_mass_for_energy};
use thiserror::Error;

/// Mass fraction reserved for propulsion and battery when seeding the iteration.
const SEED_SYSTEMS_FRACTION: f64 = 0.3;
const SEED_DENOMINATOR_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightModelError {
    #[error("'{field}' = {value} must lie in [0, 1)")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("'{field}' = {value} must be non-negative")]
    Negative { field: &'static str, value: f64 },
    #[error("propulsion specific power must be positive (got {0} W/kg)")]
    NonPositiveSpecificPower(f64),
    #[error(
        "structural fraction {structural} plus battery fraction {battery} leaves no mass for anything else"
    )]
    NoMassLeft { structural: f64, battery: f64 },
    #[error(transparent)]
    Energy(#[from] InvalidEnergyInput),
}

/// Empirical mass model used to close the sizing loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightModel {
    /// Fuselage, landing gear and booms as a fraction of MTOW.
    pub structural_fraction: f64,
    pub wing_areal_density_kg_m2: f64,
    pub propulsion_specific_power_w_per_kg: f64,
    pub avionics_mass_kg: f64,
    /// Extra battery energy carried beyond the mission requirement.
    pub energy_margin: f64,
    pub max_battery_fraction: f64,
}

impl Default for WeightModel {
    fn default() -> Self {
        Self {
            structural_fraction: 0.25,
            wing_areal_density_kg_m2: 0.8,
            propulsion_specific_power_w_per_kg: 3_000.0,
            avionics_mass_kg: 0.5,
            energy_margin: 0.1,
            max_battery_fraction: 0.5,
        }
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), WeightModelError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(WeightModelError::FractionOutOfRange { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), WeightModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WeightModelError::Negative { field, value })
    }
}

/// Battery mass chosen for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterySizing {
    pub mass_kg: f64,
    /// True when the energy requirement asked for more than `max_battery_fraction × mtow`.
    pub capped: bool,
}

/// Component masses at one iteration (kg).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassBreakdown {
    pub structure_kg: f64,
    pub wing_kg: f64,
    pub propulsion_kg: f64,
    pub battery_kg: f64,
    pub avionics_kg: f64,
    pub payload_kg: f64,
}

impl MassBreakdown {
    pub fn total(&self) -> f64 {
        self.structure_kg
            + self.wing_kg
            + self.propulsion_kg
            + self.battery_kg
            + self.avionics_kg
            + self.payload_kg
    }

    /// Mass excluding payload and battery.
    pub fn empty_kg(&self) -> f64 {
        self.structure_kg + self.wing_kg + self.propulsion_kg + self.avionics_kg
    }
}

impl WeightModel {
    pub fn validate(&self) -> Result<(), WeightModelError> {
        check_fraction("structural_fraction", self.structural_fraction)?;
        check_fraction("max_battery_fraction", self.max_battery_fraction)?;
        check_non_negative("wing_areal_density_kg_m2", self.wing_areal_density_kg_m2)?;
        check_non_negative("avionics_mass_kg", self.avionics_mass_kg)?;
        check_non_negative("energy_margin", self.energy_margin)?;
        if !(self.propulsion_specific_power_w_per_kg.is_finite()
            && self.propulsion_specific_power_w_per_kg > 0.0)
        {
            return Err(WeightModelError::NonPositiveSpecificPower(
                self.propulsion_specific_power_w_per_kg,
            ));
        }
        if self.structural_fraction + self.max_battery_fraction >= 1.0 {
            return Err(WeightModelError::NoMassLeft {
                structural: self.structural_fraction,
                battery: self.max_battery_fraction,
            });
        }
        Ok(())
    }

    /// Starting MTOW guess when the caller supplies none.
    pub fn seed_mass_kg(&self, payload_mass_kg: f64) -> f64 {
        let denominator =
            (1.0 - self.structural_fraction - SEED_SYSTEMS_FRACTION).max(SEED_DENOMINATOR_FLOOR);
        (payload_mass_kg + self.avionics_mass_kg) / denominator
    }

    pub fn propulsion_mass_kg(&self, sizing_power_w: f64) -> f64 {
        sizing_power_w.max(0.0) / self.propulsion_specific_power_w_per_kg
    }

    pub fn wing_mass_kg(&self, wing_area_m2: f64) -> f64 {
        wing_area_m2.max(0.0) * self.wing_areal_density_kg_m2
    }

    /// Battery mass carrying `required_wh` plus the energy margin, capped by MTOW fraction.
    pub fn battery_mass_kg(
        &self,
        required_wh: f64,
        profile: &BatteryProfile,
        mtow_kg: f64,
    ) -> Result<BatterySizing, WeightModelError> {
        let wanted = battery_mass_for_energy(required_wh * (1.0 + self.energy_margin), profile)?;
        let cap = self.max_battery_fraction * mtow_kg;
        Ok(if wanted > cap {
            BatterySizing {
                mass_kg: cap,
                capped: true,
            }
        } else {
            BatterySizing {
                mass_kg: wanted,
                capped: false,
            }
        })
    }

    pub fn estimate(
        &self,
        mtow_kg: f64,
        payload_mass_kg: f64,
        wing_area_m2: f64,
        propulsion_power_w: f64,
        battery_mass_kg: f64,
    ) -> MassBreakdown {
        MassBreakdown {
            structure_kg: self.structural_fraction * mtow_kg,
            wing_kg: self.wing_mass_kg(wing_area_m2),
            propulsion_kg: self.propulsion_mass_kg(propulsion_power_w),
            battery_kg: battery_mass_kg,
            avionics_kg: self.avionics_mass_kg,
            payload_kg: payload_mass_kg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> BatteryProfile {
        BatteryProfile {
            specific_energy_wh_per_kg: 270.0,
            depth_of_discharge: 0.8,
            round_trip_efficiency: 0.95,
            reserve_fraction: 0.2,
        }
    }

    #[test]
    fn seed_mass_uses_remaining_fraction() {
        let model = WeightModel::default();
        assert_relative_eq!(model.seed_mass_kg(2.0), 2.5 / 0.45, max_relative = 1e-12);

        let heavy = WeightModel {
            structural_fraction: 0.65,
            max_battery_fraction: 0.3,
            ..model
        };
        assert_relative_eq!(heavy.seed_mass_kg(2.0), 25.0, max_relative = 1e-12);
    }

    #[test]
    fn breakdown_sums_components() {
        let model = WeightModel::default();
        let breakdown = model.estimate(6.0, 2.0, 1.5, 300.0, 1.2);
        assert_relative_eq!(breakdown.structure_kg, 1.5);
        assert_relative_eq!(breakdown.wing_kg, 1.2, max_relative = 1e-12);
        assert_relative_eq!(breakdown.propulsion_kg, 0.1, max_relative = 1e-12);
        assert_relative_eq!(breakdown.total(), 1.5 + 1.2 + 0.1 + 1.2 + 0.5 + 2.0, max_relative = 1e-12);
        assert_relative_eq!(
            breakdown.empty_kg(),
            breakdown.total() - 1.2 - 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn battery_mass_carries_margin_and_respects_cap() {
        let model = WeightModel::default();
        let usable_per_kg = 270.0 * 0.8 * 0.95 * 0.8;
        let sized = model.battery_mass_kg(100.0, &profile(), 10.0).unwrap();
        assert!(!sized.capped);
        assert_relative_eq!(sized.mass_kg, 110.0 / usable_per_kg, max_relative = 1e-12);

        let capped = model.battery_mass_kg(5_000.0, &profile(), 10.0).unwrap();
        assert!(capped.capped);
        assert_relative_eq!(capped.mass_kg, 5.0);
    }

    #[test]
    fn invalid_models_are_rejected() {
        assert!(WeightModel::default().validate().is_ok());
        let bad = WeightModel {
            structural_fraction: 1.0,
            ..WeightModel::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(WeightModelError::FractionOutOfRange {
                field: "structural_fraction",
                ..
            })
        ));
        let bad = WeightModel {
            propulsion_specific_power_w_per_kg: 0.0,
            ..WeightModel::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(WeightModelError::NonPositiveSpecificPower(_))
        ));
        let bad = WeightModel {
            structural_fraction: 0.6,
            max_battery_fraction: 0.45,
            ..WeightModel::default()
        };
        assert!(matches!(bad.validate(), Err(WeightModelError::NoMassLeft { .. })));
        let bad = WeightModel {
            avionics_mass_kg: -0.1,
            ..WeightModel::default()
        };
        assert!(bad.validate().is_err());
    }
}
