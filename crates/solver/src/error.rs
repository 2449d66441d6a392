//! Failure results of a sizing run.

use std::fmt;

use sizing_aero::InvalidAerodynamicInput;
use sizing_energy::InvalidEnergyInput;
use sizing_matching::MatchingError;
use sizing_weights::WeightModelError;
use thiserror::Error;

/// Coarse failure category used by reports and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidInput,
    Infeasible,
    Diverged,
}

impl FailureKind {
    pub fn name(self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Infeasible => "infeasible",
            FailureKind::Diverged => "diverged",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InfeasibleReason {
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error("mass exceeded the {ceiling_kg:.1} kg runaway ceiling")]
    MassRunaway { ceiling_kg: f64 },
    #[error("energy accounting failed: {0}")]
    Energy(#[from] InvalidEnergyInput),
    #[error("weight breakdown failed: {0}")]
    Weights(#[from] WeightModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceCause {
    IterationCap,
    Deadline,
    NonFiniteMass,
}

impl fmt::Display for DivergenceCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DivergenceCause::IterationCap => "iteration cap reached",
            DivergenceCause::Deadline => "deadline passed",
            DivergenceCause::NonFiniteMass => "mass became non-finite",
        })
    }
}

/// Why a topology did not produce a design point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("invalid aerodynamic input: {0}")]
    InvalidAerodynamicInput(#[from] InvalidAerodynamicInput),
    #[error("invalid energy input: {0}")]
    InvalidEnergyInput(#[from] InvalidEnergyInput),
    #[error("invalid weight model: {0}")]
    InvalidWeightModel(#[from] WeightModelError),
    #[error("invalid solver setting '{field}' = {value}")]
    InvalidSolverSettings { field: &'static str, value: f64 },
    #[error("infeasible at iteration {iteration} (mass {mass_kg:.3} kg): {reason}")]
    Infeasible {
        iteration: usize,
        mass_kg: f64,
        reason: InfeasibleReason,
    },
    #[error(
        "diverged after {iterations} iterations ({cause}); last mass {last_mass_kg:.3} kg, residual {residual:.3e}"
    )]
    Diverged {
        iterations: usize,
        last_mass_kg: f64,
        residual: f64,
        cause: DivergenceCause,
    },
}

impl SizingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SizingError::Infeasible { .. } => FailureKind::Infeasible,
            SizingError::Diverged { .. } => FailureKind::Diverged,
            _ => FailureKind::InvalidInput,
        }
    }
}
