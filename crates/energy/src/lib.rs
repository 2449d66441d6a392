//! Battery energy accounting: required energy for a power draw, usable energy for a
//! battery mass, and the endurance/range that follow.

use sizing_core::constants::SECONDS_PER_HOUR;
use thiserror::Error;

/// Non-physical energy or efficiency inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidEnergyInput {
    #[error("power draw must be positive (got {0} W)")]
    NonPositivePower(f64),
    #[error("duration must be non-negative (got {0} s)")]
    NegativeDuration(f64),
    #[error("battery mass must be non-negative (got {0} kg)")]
    NegativeBatteryMass(f64),
    #[error("'{field}' = {value} is outside {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },
}

/// Energy-storage constants for one battery technology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryProfile {
    pub specific_energy_wh_per_kg: f64,
    pub depth_of_discharge: f64,
    pub round_trip_efficiency: f64,
    pub reserve_fraction: f64,
}

impl BatteryProfile {
    pub fn validate(&self) -> Result<(), InvalidEnergyInput> {
        if !(self.specific_energy_wh_per_kg.is_finite() && self.specific_energy_wh_per_kg > 0.0) {
            return Err(InvalidEnergyInput::OutOfRange {
                field: "specific_energy_wh_per_kg",
                value: self.specific_energy_wh_per_kg,
                range: "(0, inf)",
            });
        }
        check_unit_interval("depth_of_discharge", self.depth_of_discharge)?;
        check_unit_interval("round_trip_efficiency", self.round_trip_efficiency)?;
        if !(0.0..1.0).contains(&self.reserve_fraction) {
            return Err(InvalidEnergyInput::OutOfRange {
                field: "reserve_fraction",
                value: self.reserve_fraction,
                range: "[0, 1)",
            });
        }
        Ok(())
    }

    /// Fraction of nameplate energy available to the mission after DoD, losses and reserve.
    pub fn usable_fraction(&self) -> f64 {
        self.depth_of_discharge * self.round_trip_efficiency * (1.0 - self.reserve_fraction)
    }
}

/// Check that an efficiency-like value lies in (0, 1].
pub fn check_unit_interval(field: &'static str, value: f64) -> Result<(), InvalidEnergyInput> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(InvalidEnergyInput::OutOfRange {
            field,
            value,
            range: "(0, 1]",
        })
    }
}

fn check_power(power_w: f64) -> Result<(), InvalidEnergyInput> {
    if power_w.is_finite() && power_w > 0.0 {
        Ok(())
    } else {
        Err(InvalidEnergyInput::NonPositivePower(power_w))
    }
}

/// Energy drawn by `power_w` over `duration_s` (Wh).
pub fn required_energy_wh(power_w: f64, duration_s: f64) -> Result<f64, InvalidEnergyInput> {
    check_power(power_w)?;
    if !(duration_s >= 0.0) {
        return Err(InvalidEnergyInput::NegativeDuration(duration_s));
    }
    Ok(power_w * duration_s / SECONDS_PER_HOUR)
}

/// Energy a battery of `battery_mass_kg` can deliver to the mission (Wh).
pub fn usable_energy_wh(
    battery_mass_kg: f64,
    profile: &BatteryProfile,
) -> Result<f64, InvalidEnergyInput> {
    profile.validate()?;
    if !(battery_mass_kg >= 0.0) {
        return Err(InvalidEnergyInput::NegativeBatteryMass(battery_mass_kg));
    }
    Ok(battery_mass_kg * profile.specific_energy_wh_per_kg * profile.usable_fraction())
}

/// Battery mass whose usable energy equals `usable_wh`; inverse of [`usable_energy_wh`].
pub fn battery_mass_for_energy(
    usable_wh: f64,
    profile: &BatteryProfile,
) -> Result<f64, InvalidEnergyInput> {
    profile.validate()?;
    Ok(usable_wh.max(0.0) / (profile.specific_energy_wh_per_kg * profile.usable_fraction()))
}

/// Time `usable_wh` lasts at a constant `power_w` (s).
pub fn endurance_s(usable_wh: f64, power_w: f64) -> Result<f64, InvalidEnergyInput> {
    check_power(power_w)?;
    Ok(usable_wh * SECONDS_PER_HOUR / power_w)
}

/// Distance covered at `cruise_speed_m_s` over `endurance_s` (m).
pub fn range_m(endurance_s: f64, cruise_speed_m_s: f64) -> f64 {
    endurance_s * cruise_speed_m_s
}

/// One constant-power leg of a mission.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergySegment {
    pub name: &'static str,
    pub power_w: f64,
    pub duration_s: f64,
}

impl EnergySegment {
    pub fn energy_wh(&self) -> Result<f64, InvalidEnergyInput> {
        required_energy_wh(self.power_w, self.duration_s)
    }
}

/// Total energy across mission segments (Wh).
pub fn segments_energy_wh(segments: &[EnergySegment]) -> Result<f64, InvalidEnergyInput> {
    segments.iter().map(EnergySegment::energy_wh).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn profile(reserve_fraction: f64) -> BatteryProfile {
        BatteryProfile {
            specific_energy_wh_per_kg: 270.0,
            depth_of_discharge: 0.8,
            round_trip_efficiency: 0.95,
            reserve_fraction,
        }
    }

    #[test]
    fn required_energy_converts_seconds_to_hours() {
        assert_relative_eq!(required_energy_wh(200.0, 3_600.0).unwrap(), 200.0);
        assert_relative_eq!(required_energy_wh(200.0, 0.0).unwrap(), 0.0);
        assert!(matches!(
            required_energy_wh(0.0, 60.0),
            Err(InvalidEnergyInput::NonPositivePower(_))
        ));
        assert!(matches!(
            required_energy_wh(10.0, -1.0),
            Err(InvalidEnergyInput::NegativeDuration(_))
        ));
    }

    #[test]
    fn usable_energy_applies_every_derating() {
        let usable = usable_energy_wh(2.0, &profile(0.2)).unwrap();
        assert_relative_eq!(usable, 2.0 * 270.0 * 0.8 * 0.95 * 0.8, max_relative = 1e-12);
        let mass = battery_mass_for_energy(usable, &profile(0.2)).unwrap();
        assert_relative_eq!(mass, 2.0, max_relative = 1e-12);
    }

    #[test]
    fn twenty_percent_reserve_cuts_endurance_by_twenty_percent() {
        let power_w = 180.0;
        let full = endurance_s(usable_energy_wh(1.5, &profile(0.0)).unwrap(), power_w).unwrap();
        let reserved =
            endurance_s(usable_energy_wh(1.5, &profile(0.2)).unwrap(), power_w).unwrap();
        assert_relative_eq!(reserved / full, 0.8, max_relative = 1e-12);
        assert_relative_eq!(
            range_m(reserved, 40.0) / range_m(full, 40.0),
            0.8,
            max_relative = 1e-12
        );
    }

    #[test]
    fn out_of_range_profile_fields_are_rejected() {
        let mut bad = profile(0.2);
        bad.depth_of_discharge = 1.2;
        assert!(matches!(
            usable_energy_wh(1.0, &bad),
            Err(InvalidEnergyInput::OutOfRange {
                field: "depth_of_discharge",
                ..
            })
        ));
        let mut bad = profile(1.0);
        assert!(bad.validate().is_err());
        bad.reserve_fraction = 0.1;
        bad.specific_energy_wh_per_kg = 0.0;
        assert!(bad.validate().is_err());
        assert!(endurance_s(100.0, -5.0).is_err());
    }

    #[test]
    fn segments_sum_their_energy() {
        let segments = [
            EnergySegment {
                name: "hover",
                power_w: 1_200.0,
                duration_s: 120.0,
            },
            EnergySegment {
                name: "cruise",
                power_w: 150.0,
                duration_s: 3_600.0,
            },
        ];
        assert_relative_eq!(segments_energy_wh(&segments).unwrap(), 40.0 + 150.0);
    }

    proptest! {
        #[test]
        fn larger_reserve_strictly_reduces_usable_energy(
            mass in 0.01f64..50.0,
            specific in 50.0f64..500.0,
            dod in 0.1f64..1.0,
            eta in 0.1f64..1.0,
            ra in 0.0f64..0.9,
            delta in 0.001f64..0.09,
            power in 1.0f64..5_000.0,
        ) {
            let a = BatteryProfile {
                specific_energy_wh_per_kg: specific,
                depth_of_discharge: dod,
                round_trip_efficiency: eta,
                reserve_fraction: ra,
            };
            let b = BatteryProfile { reserve_fraction: ra + delta, ..a };
            let ua = usable_energy_wh(mass, &a).unwrap();
            let ub = usable_energy_wh(mass, &b).unwrap();
            prop_assert!(ua > ub);
            prop_assert!(endurance_s(ua, power).unwrap() > endurance_s(ub, power).unwrap());
        }
    }
}
