//! Input records for one sizing run.

use sizing_aero::{DragPolar, InvalidAerodynamicInput, StallConstraint};
use sizing_core::{PhysicalEnvironment, Topology};
use sizing_energy::{BatteryProfile, InvalidEnergyInput};
use sizing_matching::SelectionPolicy;
use sizing_propulsion::{PropulsionEfficiencyChain, RotorParameters};
use sizing_weights::{WeightModel, WeightModelError};

use crate::error::SizingError;

/// What the mission has to achieve in forward flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionTarget {
    Endurance { seconds: f64 },
    Range { metres: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionRequirement {
    pub payload_mass_kg: f64,
    pub cruise_speed_m_s: f64,
    pub target: MissionTarget,
    /// Vertical take-off plus landing time flown on lift rotors by the hybrid.
    pub hover_segment_s: f64,
}

impl MissionRequirement {
    pub const DEFAULT_HOVER_SEGMENT_S: f64 = 120.0;

    pub fn endurance(payload_mass_kg: f64, cruise_speed_m_s: f64, seconds: f64) -> Self {
        Self {
            payload_mass_kg,
            cruise_speed_m_s,
            target: MissionTarget::Endurance { seconds },
            hover_segment_s: Self::DEFAULT_HOVER_SEGMENT_S,
        }
    }

    /// Time the sizing mission has to last; a range target is flown at cruise speed.
    pub fn required_endurance_s(&self) -> f64 {
        match self.target {
            MissionTarget::Endurance { seconds } => seconds,
            MissionTarget::Range { metres } => metres / self.cruise_speed_m_s,
        }
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        if !(self.payload_mass_kg.is_finite() && self.payload_mass_kg >= 0.0) {
            return Err(WeightModelError::Negative {
                field: "payload_mass_kg",
                value: self.payload_mass_kg,
            }
            .into());
        }
        if !(self.cruise_speed_m_s.is_finite() && self.cruise_speed_m_s > 0.0) {
            return Err(InvalidAerodynamicInput::NonPositiveSpeed(self.cruise_speed_m_s).into());
        }
        let endurance_s = self.required_endurance_s();
        if !(endurance_s.is_finite() && endurance_s >= 0.0) {
            return Err(InvalidEnergyInput::NegativeDuration(endurance_s).into());
        }
        if !(self.hover_segment_s.is_finite() && self.hover_segment_s >= 0.0) {
            return Err(InvalidEnergyInput::NegativeDuration(self.hover_segment_s).into());
        }
        Ok(())
    }
}

/// Wing and performance parameters shared by the winged topologies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroParameters {
    pub cl_max: f64,
    pub stall_margin_factor: f64,
    /// `None` places the minimum flight speed exactly at cruise speed.
    pub stall_speed_m_s: Option<f64>,
    pub aspect_ratio: f64,
    pub cd0: f64,
    pub oswald_efficiency: f64,
    pub target_reynolds: Option<f64>,
    pub structural_max_wing_loading: Option<f64>,
    pub climb_rate_m_s: f64,
    pub max_power_loading_w_n: Option<f64>,
    pub safety_power_margin: f64,
    pub selection_policy: SelectionPolicy,
}

impl AeroParameters {
    pub fn new(cl_max: f64, aspect_ratio: f64) -> Self {
        Self {
            cl_max,
            stall_margin_factor: 1.2,
            stall_speed_m_s: None,
            aspect_ratio,
            cd0: 0.035,
            oswald_efficiency: 0.8,
            target_reynolds: None,
            structural_max_wing_loading: None,
            climb_rate_m_s: 0.5,
            max_power_loading_w_n: None,
            safety_power_margin: 1.0,
            selection_policy: SelectionPolicy::default(),
        }
    }

    pub fn stall_speed_m_s(&self, cruise_speed_m_s: f64) -> f64 {
        self.stall_speed_m_s
            .unwrap_or(cruise_speed_m_s / self.stall_margin_factor)
    }

    pub fn stall_constraint(&self, cruise_speed_m_s: f64) -> StallConstraint {
        StallConstraint {
            stall_speed_m_s: self.stall_speed_m_s(cruise_speed_m_s),
            stall_margin_factor: self.stall_margin_factor,
            cl_max: self.cl_max,
        }
    }

    pub fn polar(&self) -> DragPolar {
        DragPolar {
            cd0: self.cd0,
            oswald_efficiency: self.oswald_efficiency,
            aspect_ratio: self.aspect_ratio,
        }
    }

    pub(crate) fn validate_performance(&self) -> Result<(), SizingError> {
        if let Some(target) = self.target_reynolds {
            if !(target.is_finite() && target > 0.0) {
                return Err(InvalidAerodynamicInput::NonPositiveReynolds(target).into());
            }
        }
        if !(self.climb_rate_m_s.is_finite() && self.climb_rate_m_s >= 0.0) {
            return Err(SizingError::InvalidSolverSettings {
                field: "climb_rate_m_s",
                value: self.climb_rate_m_s,
            });
        }
        if let Some(ceiling) = self.max_power_loading_w_n {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                return Err(SizingError::InvalidSolverSettings {
                    field: "max_power_loading_w_n",
                    value: ceiling,
                });
            }
        }
        if !(self.safety_power_margin.is_finite() && self.safety_power_margin >= 1.0) {
            return Err(SizingError::InvalidSolverSettings {
                field: "safety_power_margin",
                value: self.safety_power_margin,
            });
        }
        Ok(())
    }
}

/// Numerical controls for the fixed-point loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Starting MTOW; `None` uses the weight model's heuristic.
    pub mass_seed_kg: Option<f64>,
    /// Relative mass change below which the loop has converged.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Fraction of the mass correction applied per iteration, in (0, 1].
    pub damping: f64,
    /// Runaway guard; `None` uses 100 × (payload + avionics).
    pub mass_ceiling_kg: Option<f64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            mass_seed_kg: None,
            tolerance: 1e-4,
            max_iterations: 100,
            damping: 1.0,
            mass_ceiling_kg: None,
        }
    }
}

impl SolverSettings {
    pub const DEFAULT_CEILING_FACTOR: f64 = 100.0;

    pub fn validate(&self) -> Result<(), SizingError> {
        let invalid = |field: &'static str, value: f64| {
            Err(SizingError::InvalidSolverSettings { field, value })
        };
        if let Some(seed) = self.mass_seed_kg {
            if !(seed.is_finite() && seed > 0.0) {
                return invalid("mass_seed_kg", seed);
            }
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return invalid("tolerance", self.tolerance);
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations", 0.0);
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return invalid("damping", self.damping);
        }
        if let Some(ceiling) = self.mass_ceiling_kg {
            if !(ceiling > 0.0) {
                return invalid("mass_ceiling_kg", ceiling);
            }
        }
        Ok(())
    }
}

/// Everything one topology's sizing run needs. Shared read-only across a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingInput {
    pub topology: Topology,
    pub environment: PhysicalEnvironment,
    pub propulsion: PropulsionEfficiencyChain,
    pub battery: BatteryProfile,
    pub mission: MissionRequirement,
    pub aero: AeroParameters,
    pub rotor: RotorParameters,
    pub weights: WeightModel,
    pub solver: SolverSettings,
}

impl SizingInput {
    pub fn with_topology(&self, topology: Topology) -> Self {
        Self {
            topology,
            ..self.clone()
        }
    }

    /// Runaway ceiling after applying the default.
    pub fn mass_ceiling_kg(&self) -> f64 {
        self.solver.mass_ceiling_kg.unwrap_or(
            SolverSettings::DEFAULT_CEILING_FACTOR
                * (self.mission.payload_mass_kg + self.weights.avionics_mass_kg),
        )
    }
}
