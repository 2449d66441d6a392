//! Core units, constants, and shared primitives for the Mars sizing workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Seconds per hour, used for Wh <-> W·s conversions.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    /// Mars surface gravity (m/s²).
    pub const MARS_GRAVITY_M_S2: f64 = 3.711;
    /// Representative near-surface Mars density (kg/m³).
    pub const MARS_DENSITY_KG_M3: f64 = 0.020;
    /// Dynamic viscosity of CO₂ at roughly 210 K (Pa·s).
    pub const MARS_DYNAMIC_VISCOSITY_PA_S: f64 = 1.08e-5;
    /// Speed of sound in the lower Martian atmosphere (m/s).
    pub const MARS_SPEED_OF_SOUND_M_S: f64 = 240.0;
}

/// Unit conversions used when reporting.
pub mod units {
    /// Convert seconds to minutes.
    #[inline]
    pub fn seconds_to_minutes(v: f64) -> f64 {
        v / 60.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }
}

/// Atmospheric and gravitational constants for one sizing location.
pub mod environment {
    use super::constants::{
        MARS_DENSITY_KG_M3, MARS_DYNAMIC_VISCOSITY_PA_S, MARS_GRAVITY_M_S2,
        MARS_SPEED_OF_SOUND_M_S,
    };

    /// Immutable atmosphere/gravity description shared by every configuration in a run.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct PhysicalEnvironment {
        pub density_kg_m3: f64,
        pub gravity_m_s2: f64,
        pub dynamic_viscosity_pa_s: f64,
        pub speed_of_sound_m_s: f64,
    }

    impl PhysicalEnvironment {
        /// Near-surface Mars reference conditions.
        pub fn mars_reference() -> Self {
            Self {
                density_kg_m3: MARS_DENSITY_KG_M3,
                gravity_m_s2: MARS_GRAVITY_M_S2,
                dynamic_viscosity_pa_s: MARS_DYNAMIC_VISCOSITY_PA_S,
                speed_of_sound_m_s: MARS_SPEED_OF_SOUND_M_S,
            }
        }

        /// Name of the first non-physical field, if any.
        pub fn first_invalid_field(&self) -> Option<&'static str> {
            let fields = [
                ("density_kg_m3", self.density_kg_m3),
                ("gravity_m_s2", self.gravity_m_s2),
                ("dynamic_viscosity_pa_s", self.dynamic_viscosity_pa_s),
                ("speed_of_sound_m_s", self.speed_of_sound_m_s),
            ];
            fields
                .iter()
                .find(|(_, v)| !v.is_finite() || *v <= 0.0)
                .map(|(name, _)| *name)
        }

        /// Weight force of a mass in this gravity field (N).
        #[inline]
        pub fn weight_n(&self, mass_kg: f64) -> f64 {
            mass_kg * self.gravity_m_s2
        }

        /// Dynamic pressure at airspeed `v` (Pa).
        #[inline]
        pub fn dynamic_pressure_pa(&self, speed_m_s: f64) -> f64 {
            0.5 * self.density_kg_m3 * speed_m_s * speed_m_s
        }

        /// Reynolds number for a reference length at airspeed `v`.
        #[inline]
        pub fn reynolds_number(&self, speed_m_s: f64, length_m: f64) -> f64 {
            self.density_kg_m3 * speed_m_s * length_m / self.dynamic_viscosity_pa_s
        }

        /// Mach number at airspeed `v`.
        #[inline]
        pub fn mach_number(&self, speed_m_s: f64) -> f64 {
            speed_m_s / self.speed_of_sound_m_s
        }
    }
}

/// Airframe topology tag used to select the power/energy strategy.
pub mod topology {
    use std::fmt;
    use std::str::FromStr;

    use thiserror::Error;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Topology {
        Rotorcraft,
        FixedWing,
        HybridVtol,
    }

    impl Topology {
        pub const ALL: [Topology; 3] = [
            Topology::Rotorcraft,
            Topology::FixedWing,
            Topology::HybridVtol,
        ];

        /// Stable snake_case identifier used in configs and exports.
        pub fn name(self) -> &'static str {
            match self {
                Topology::Rotorcraft => "rotorcraft",
                Topology::FixedWing => "fixed_wing",
                Topology::HybridVtol => "hybrid_vtol",
            }
        }

        /// Whether the topology carries a lifting wing.
        pub fn is_winged(self) -> bool {
            matches!(self, Topology::FixedWing | Topology::HybridVtol)
        }

        /// Whether the topology carries lift rotors.
        pub fn has_rotors(self) -> bool {
            matches!(self, Topology::Rotorcraft | Topology::HybridVtol)
        }
    }

    impl fmt::Display for Topology {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    #[derive(Debug, Error)]
    #[error("unknown topology '{0}' (expected rotorcraft, fixed_wing or hybrid_vtol)")]
    pub struct UnknownTopology(pub String);

    impl FromStr for Topology {
        type Err = UnknownTopology;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                "rotorcraft" => Ok(Topology::Rotorcraft),
                "fixed_wing" | "fixedwing" => Ok(Topology::FixedWing),
                "hybrid_vtol" | "hybridvtol" => Ok(Topology::HybridVtol),
                _ => Err(UnknownTopology(s.to_string())),
            }
        }
    }
}

pub use environment::PhysicalEnvironment;
pub use topology::Topology;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mars_reference_is_physical() {
        let env = PhysicalEnvironment::mars_reference();
        assert!(env.first_invalid_field().is_none());
        assert_relative_eq!(env.weight_n(10.0), 37.11, epsilon = 1e-12);
        assert_relative_eq!(env.dynamic_pressure_pa(40.0), 16.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_environment_field_is_named() {
        let mut env = PhysicalEnvironment::mars_reference();
        env.dynamic_viscosity_pa_s = 0.0;
        assert_eq!(env.first_invalid_field(), Some("dynamic_viscosity_pa_s"));
        env.density_kg_m3 = f64::NAN;
        assert_eq!(env.first_invalid_field(), Some("density_kg_m3"));
    }

    #[test]
    fn topology_parses_config_spellings() {
        assert_eq!("fixed-wing".parse::<Topology>().unwrap(), Topology::FixedWing);
        assert_eq!("Hybrid_VTOL".parse::<Topology>().unwrap(), Topology::HybridVtol);
        assert!("blimp".parse::<Topology>().is_err());
        for topology in Topology::ALL {
            assert_eq!(topology.name().parse::<Topology>().unwrap(), topology);
        }
        assert!(!Topology::Rotorcraft.is_winged());
        assert!(Topology::HybridVtol.is_winged() && Topology::HybridVtol.has_rotors());
    }

    #[test]
    fn unit_helpers_scale() {
        assert_relative_eq!(units::seconds_to_minutes(90.0), 1.5);
        assert_relative_eq!(units::m_to_km(1_500.0), 1.5);
    }
}
