//! One-parameter sweeps over a base sizing input.

use std::fmt;
use std::str::FromStr;

use log::info;
use rayon::prelude::*;

use crate::design::DesignPoint;
use crate::error::SizingError;
use crate::input::{MissionTarget, SizingInput};
use crate::solver::size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    /// kg
    PayloadMass,
    /// Wh/kg
    SpecificEnergy,
    /// s; replaces any range target
    Endurance,
    /// m/s
    CruiseSpeed,
    ReserveFraction,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 5] = [
        SweepParameter::PayloadMass,
        SweepParameter::SpecificEnergy,
        SweepParameter::Endurance,
        SweepParameter::CruiseSpeed,
        SweepParameter::ReserveFraction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::PayloadMass => "payload",
            SweepParameter::SpecificEnergy => "specific-energy",
            SweepParameter::Endurance => "endurance",
            SweepParameter::CruiseSpeed => "cruise-speed",
            SweepParameter::ReserveFraction => "reserve",
        }
    }

    /// Copy of `base` with this parameter set to `value`.
    pub fn apply(self, base: &SizingInput, value: f64) -> SizingInput {
        let mut input = base.clone();
        match self {
            SweepParameter::PayloadMass => input.mission.payload_mass_kg = value,
            SweepParameter::SpecificEnergy => input.battery.specific_energy_wh_per_kg = value,
            SweepParameter::Endurance => {
                input.mission.target = MissionTarget::Endurance { seconds: value }
            }
            SweepParameter::CruiseSpeed => input.mission.cruise_speed_m_s = value,
            SweepParameter::ReserveFraction => input.battery.reserve_fraction = value,
        }
        input
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sweep parameter '{0}' (expected payload, specific-energy, endurance, cruise-speed or reserve)")]
pub struct UnknownSweepParameter(pub String);

impl FromStr for SweepParameter {
    type Err = UnknownSweepParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        SweepParameter::ALL
            .into_iter()
            .find(|parameter| parameter.name() == key)
            .ok_or_else(|| UnknownSweepParameter(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct SweepSample {
    pub value: f64,
    pub result: Result<DesignPoint, SizingError>,
}

/// `steps` evenly spaced values from `from` to `to` inclusive.
pub fn linspace(from: f64, to: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![from],
        _ => {
            let step = (to - from) / (steps - 1) as f64;
            (0..steps)
                .map(|i| if i + 1 == steps { to } else { from + step * i as f64 })
                .collect()
        }
    }
}

/// Size `base` once per value, in parallel; samples come back in input order.
pub fn sweep(base: &SizingInput, parameter: SweepParameter, values: &[f64]) -> Vec<SweepSample> {
    let samples: Vec<SweepSample> = values
        .par_iter()
        .map(|&value| SweepSample {
            value,
            result: size(parameter.apply(base, value)),
        })
        .collect();
    let converged = samples.iter().filter(|s| s.result.is_ok()).count();
    info!(
        "{} sweep of {}: {converged}/{} samples converged",
        parameter,
        base.topology,
        samples.len()
    );
    samples
}
