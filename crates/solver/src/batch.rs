//! Size several topologies for one mission and pick the best.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;
use sizing_core::Topology;

use crate::design::DesignPoint;
use crate::error::SizingError;
use crate::input::SizingInput;
use crate::solver::CoupledSizingSolver;

// Margins closer than this (percentage points) count as equal.
const MARGIN_TIE_PERCENT: f64 = 1e-6;

/// Ranking applied to feasible converged designs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonPolicy {
    /// Largest energy margin, lighter design on ties.
    #[default]
    MaxMargin,
    MinMass,
    MinInstalledPower,
}

impl ComparisonPolicy {
    pub fn name(self) -> &'static str {
        match self {
            ComparisonPolicy::MaxMargin => "max-margin",
            ComparisonPolicy::MinMass => "min-mass",
            ComparisonPolicy::MinInstalledPower => "min-installed-power",
        }
    }

    /// `Less` when `a` ranks ahead of `b`.
    pub fn compare(self, a: &DesignPoint, b: &DesignPoint) -> Ordering {
        let by_mass = a.mtow_kg.total_cmp(&b.mtow_kg);
        match self {
            ComparisonPolicy::MaxMargin => {
                if (a.margin_percent - b.margin_percent).abs() <= MARGIN_TIE_PERCENT {
                    by_mass
                } else {
                    b.margin_percent.total_cmp(&a.margin_percent)
                }
            }
            ComparisonPolicy::MinMass => by_mass,
            ComparisonPolicy::MinInstalledPower => a
                .installed_power_w
                .total_cmp(&b.installed_power_w)
                .then(by_mass),
        }
    }
}

impl fmt::Display for ComparisonPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown comparison policy '{0}'")]
pub struct UnknownComparisonPolicy(pub String);

impl FromStr for ComparisonPolicy {
    type Err = UnknownComparisonPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "max-margin" | "margin" => Ok(ComparisonPolicy::MaxMargin),
            "min-mass" | "mass" => Ok(ComparisonPolicy::MinMass),
            "min-installed-power" | "power" => Ok(ComparisonPolicy::MinInstalledPower),
            _ => Err(UnknownComparisonPolicy(s.to_string())),
        }
    }
}

/// Per-topology outcomes plus the winner, if any topology was feasible.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: BTreeMap<Topology, Result<DesignPoint, SizingError>>,
    pub best: Option<Topology>,
    pub comparison: ComparisonPolicy,
}

impl BatchReport {
    pub fn best_design(&self) -> Option<&DesignPoint> {
        self.best
            .and_then(|topology| self.results.get(&topology))
            .and_then(|result| result.as_ref().ok())
    }

    pub fn designs(&self) -> impl Iterator<Item = &DesignPoint> {
        self.results.values().filter_map(|result| result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Topology, &SizingError)> {
        self.results
            .iter()
            .filter_map(|(topology, result)| result.as_ref().err().map(|err| (*topology, err)))
    }
}

/// Size every topology independently, in parallel.
pub fn size_all(
    input: &SizingInput,
    topologies: &[Topology],
    comparison: ComparisonPolicy,
) -> BatchReport {
    size_all_until(input, topologies, comparison, None)
}

/// As [`size_all`], with an optional wall-clock deadline applied to every run.
pub fn size_all_until(
    input: &SizingInput,
    topologies: &[Topology],
    comparison: ComparisonPolicy,
    deadline: Option<Instant>,
) -> BatchReport {
    let results: BTreeMap<Topology, Result<DesignPoint, SizingError>> = topologies
        .par_iter()
        .map(|&topology| {
            let result = CoupledSizingSolver::new(input.with_topology(topology)).and_then(
                |solver| match deadline {
                    Some(deadline) => solver.with_deadline(deadline).solve(),
                    None => solver.solve(),
                },
            );
            (topology, result)
        })
        .collect();

    for (topology, result) in &results {
        if let Err(err) = result {
            warn!("{topology}: {} ({err})", err.kind());
        }
    }

    let best = select_best(results.values().filter_map(|r| r.as_ref().ok()), comparison)
        .map(|design| design.topology);
    match best {
        Some(topology) => info!("best topology by {comparison}: {topology}"),
        None => info!("no feasible topology among {} candidates", results.len()),
    }

    BatchReport {
        results,
        best,
        comparison,
    }
}

/// Best feasible design under `comparison`; infeasible designs never compete.
pub fn select_best<'a, I>(designs: I, comparison: ComparisonPolicy) -> Option<&'a DesignPoint>
where
    I: IntoIterator<Item = &'a DesignPoint>,
{
    designs
        .into_iter()
        .filter(|design| design.feasible)
        .min_by(|a, b| comparison.compare(a, b))
}
