//! Feasible-region search over a discretised wing-loading range.

use log::debug;
use thiserror::Error;

use crate::curve::{ConstraintCurve, CurveKind};

const DEFAULT_RESOLUTION: usize = 2_000;
const DEFAULT_TOLERANCE: f64 = 1e-6;
// Slack on the feasibility test so refined boundary points stay strictly tight.
const FEASIBILITY_SLACK: f64 = 1e-9;
const REFINE_ITERATIONS: usize = 60;
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_894_9;

/// Which point of the feasible wing-loading range becomes the design point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Largest feasible wing loading, i.e. the smallest wing.
    #[default]
    MaxWingLoading,
    /// Lowest required power loading anywhere in the feasible range.
    MinPowerLoading,
}

/// Chosen design point on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub wing_loading_n_m2: f64,
    pub power_loading_w_n: f64,
    pub binding_constraint: String,
    pub active_constraints: Vec<String>,
    /// Feasible wing-loading interval the point was selected from.
    pub feasible_range_n_m2: (f64, f64),
}

/// Envelope values at one wing loading, for plotting collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSample {
    pub wing_loading_n_m2: f64,
    pub required_power_loading_w_n: f64,
    pub power_loading_ceiling_w_n: Option<f64>,
    pub feasible: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchingError {
    #[error("matching chart has no power requirement curve")]
    EmptyChart,
    #[error("invalid wing-loading domain [{lower}, {upper}] N/m²")]
    InvalidDomain { lower: f64, upper: f64 },
    #[error(
        "wing-loading bounds cross: '{lower_by}' requires at least {lower:.4} N/m² but '{upper_by}' allows at most {upper:.4} N/m²"
    )]
    CrossedBounds {
        lower: f64,
        lower_by: String,
        upper: f64,
        upper_by: String,
    },
    #[error(
        "no wing loading in [{lower:.4}, {upper:.4}] N/m² satisfies every power constraint; '{violated_by}' exceeds the ceiling by at least {excess_percent:.2}%"
    )]
    NoFeasiblePoint {
        lower: f64,
        upper: f64,
        violated_by: String,
        excess_percent: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Envelope {
    required: f64,
    required_by: Option<usize>,
    ceiling: f64,
}

impl Envelope {
    fn feasible(&self) -> bool {
        self.required <= self.ceiling * (1.0 + FEASIBILITY_SLACK)
    }

    fn overshoot(&self) -> f64 {
        if self.ceiling.is_finite() && self.ceiling > 0.0 {
            self.required / self.ceiling
        } else if self.ceiling.is_finite() {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Set of constraint curves plus the numerical settings used to search them.
#[derive(Debug)]
pub struct MatchingChart {
    curves: Vec<ConstraintCurve>,
    resolution: usize,
    tolerance: f64,
}

impl Default for MatchingChart {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingChart {
    pub fn new() -> Self {
        Self {
            curves: Vec::new(),
            resolution: DEFAULT_RESOLUTION,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Number of intervals the wing-loading range is split into (at least 1).
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// Relative tolerance used to decide which curves are tight at the chosen point.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn push(&mut self, curve: ConstraintCurve) {
        self.curves.push(curve);
    }

    pub fn with_curve(mut self, curve: ConstraintCurve) -> Self {
        self.push(curve);
        self
    }

    pub fn curves(&self) -> &[ConstraintCurve] {
        &self.curves
    }

    /// Without a requirement curve every point would read as zero power loading.
    fn require_power_curve(&self) -> Result<(), MatchingError> {
        if self
            .curves
            .iter()
            .any(|curve| curve.kind() == CurveKind::MinPowerLoading)
        {
            Ok(())
        } else {
            Err(MatchingError::EmptyChart)
        }
    }

    fn envelope(&self, ws: f64) -> Envelope {
        let mut env = Envelope {
            required: 0.0,
            required_by: None,
            ceiling: f64::INFINITY,
        };
        for (idx, curve) in self.curves.iter().enumerate() {
            match curve.kind() {
                CurveKind::MinPowerLoading => {
                    let value = curve.evaluate(ws);
                    if env.required_by.is_none() || value > env.required {
                        env.required = value;
                        env.required_by = Some(idx);
                    }
                }
                CurveKind::MaxPowerLoading => {
                    env.ceiling = env.ceiling.min(curve.evaluate(ws));
                }
                CurveKind::MaxWingLoading | CurveKind::MinWingLoading => {}
            }
        }
        env
    }

    /// Intersect the domain with every wing-loading bound.
    fn wing_loading_window(&self, domain: (f64, f64)) -> Result<(f64, f64), MatchingError> {
        let (mut lower, mut upper) = domain;
        let mut lower_by = "domain".to_string();
        let mut upper_by = "domain".to_string();
        for curve in &self.curves {
            match curve.kind() {
                CurveKind::MaxWingLoading => {
                    let bound = curve.evaluate(upper);
                    if bound < upper {
                        upper = bound;
                        upper_by = curve.name().to_string();
                    }
                }
                CurveKind::MinWingLoading => {
                    let bound = curve.evaluate(lower);
                    if bound > lower {
                        lower = bound;
                        lower_by = curve.name().to_string();
                    }
                }
                _ => {}
            }
        }
        if lower > upper * (1.0 + self.tolerance) {
            return Err(MatchingError::CrossedBounds {
                lower,
                lower_by,
                upper,
                upper_by,
            });
        }
        Ok((lower.min(upper), upper))
    }

    /// Select a design point inside `domain` (N/m²) according to `policy`.
    pub fn solve(
        &self,
        domain: (f64, f64),
        policy: SelectionPolicy,
    ) -> Result<ChartPoint, MatchingError> {
        self.require_power_curve()?;
        let (d_lo, d_hi) = domain;
        if !(d_lo.is_finite() && d_hi.is_finite() && d_lo >= 0.0 && d_hi > d_lo) {
            return Err(MatchingError::InvalidDomain {
                lower: d_lo,
                upper: d_hi,
            });
        }

        let (lower, upper) = self.wing_loading_window(domain)?;
        let grid = discretise(lower, upper, self.resolution);
        let envelopes: Vec<Envelope> = grid.iter().map(|&ws| self.envelope(ws)).collect();

        let first = envelopes.iter().position(Envelope::feasible);
        let last = envelopes.iter().rposition(Envelope::feasible);
        let (Some(first), Some(last)) = (first, last) else {
            return Err(self.no_feasible_point(lower, upper, &grid, &envelopes));
        };

        let range_lo = if first > 0 {
            self.refine_boundary(grid[first], grid[first - 1])
        } else {
            grid[first]
        };
        let range_hi = if last + 1 < grid.len() {
            self.refine_boundary(grid[last], grid[last + 1])
        } else {
            grid[last]
        };

        let ws = match policy {
            SelectionPolicy::MaxWingLoading => range_hi,
            SelectionPolicy::MinPowerLoading => {
                let best = (first..=last)
                    .filter(|&i| envelopes[i].feasible())
                    .min_by(|&a, &b| envelopes[a].required.total_cmp(&envelopes[b].required))
                    .unwrap_or(last);
                let lo = grid[best.saturating_sub(1)].max(range_lo);
                let hi = grid[(best + 1).min(grid.len() - 1)].min(range_hi);
                self.golden_section_min(lo, hi, grid[best])
            }
        };

        let point = self.describe(ws, (range_lo, range_hi));
        debug!(
            "matching chart: W/S = {:.4} N/m², P/W = {:.4} W/N, binding '{}' (feasible {:.4}..{:.4})",
            point.wing_loading_n_m2,
            point.power_loading_w_n,
            point.binding_constraint,
            range_lo,
            range_hi
        );
        Ok(point)
    }

    /// Evaluate the chart at a single wing loading, e.g. for wingless topologies.
    pub fn solve_fixed(&self, wing_loading_n_m2: f64) -> Result<ChartPoint, MatchingError> {
        self.require_power_curve()?;
        let (lower, upper) =
            self.wing_loading_window((wing_loading_n_m2, wing_loading_n_m2))?;
        if (wing_loading_n_m2 - upper).abs() > self.tolerance * upper.max(1.0)
            || (wing_loading_n_m2 - lower).abs() > self.tolerance * lower.max(1.0)
        {
            return Err(MatchingError::CrossedBounds {
                lower,
                lower_by: "fixed".to_string(),
                upper,
                upper_by: "fixed".to_string(),
            });
        }
        let envelope = self.envelope(wing_loading_n_m2);
        if !envelope.feasible() {
            return Err(self.no_feasible_point(
                wing_loading_n_m2,
                wing_loading_n_m2,
                &[wing_loading_n_m2],
                &[envelope],
            ));
        }
        Ok(self.describe(wing_loading_n_m2, (wing_loading_n_m2, wing_loading_n_m2)))
    }

    /// Envelope samples across `domain`, endpoints included.
    pub fn sample(&self, domain: (f64, f64), intervals: usize) -> Vec<ChartSample> {
        discretise(domain.0, domain.1, intervals.max(1))
            .into_iter()
            .map(|ws| {
                let env = self.envelope(ws);
                let inside_bounds = self.curves.iter().all(|c| match c.kind() {
                    CurveKind::MaxWingLoading => ws <= c.evaluate(ws) * (1.0 + self.tolerance),
                    CurveKind::MinWingLoading => ws >= c.evaluate(ws) * (1.0 - self.tolerance),
                    _ => true,
                });
                ChartSample {
                    wing_loading_n_m2: ws,
                    required_power_loading_w_n: env.required,
                    power_loading_ceiling_w_n: env.ceiling.is_finite().then_some(env.ceiling),
                    feasible: inside_bounds && env.feasible(),
                }
            })
            .collect()
    }

    /// Bisect between a feasible and an infeasible wing loading, returning the feasible edge.
    fn refine_boundary(&self, feasible_ws: f64, infeasible_ws: f64) -> f64 {
        let (mut good, mut bad) = (feasible_ws, infeasible_ws);
        for _ in 0..REFINE_ITERATIONS {
            let mid = 0.5 * (good + bad);
            if self.envelope(mid).feasible() {
                good = mid;
            } else {
                bad = mid;
            }
        }
        good
    }

    /// Minimise the required power loading on `[lo, hi]`, never leaving the feasible set.
    fn golden_section_min(&self, lo: f64, hi: f64, start: f64) -> f64 {
        let required = |ws: f64| self.envelope(ws).required;
        let (mut a, mut b) = (lo, hi);
        for _ in 0..REFINE_ITERATIONS {
            let c = b - GOLDEN_RATIO_CONJUGATE * (b - a);
            let d = a + GOLDEN_RATIO_CONJUGATE * (b - a);
            if required(c) < required(d) {
                b = d;
            } else {
                a = c;
            }
        }
        let candidate = 0.5 * (a + b);
        let env = self.envelope(candidate);
        if env.feasible() && env.required <= required(start) {
            candidate
        } else {
            start
        }
    }

    fn describe(&self, ws: f64, feasible_range_n_m2: (f64, f64)) -> ChartPoint {
        let env = self.envelope(ws);
        let tol = self.tolerance;
        let tight = |value: f64, reference: f64| {
            (value - reference).abs() <= tol * reference.abs().max(f64::MIN_POSITIVE)
        };

        let mut active = Vec::new();
        let groups = [
            CurveKind::MaxWingLoading,
            CurveKind::MinWingLoading,
            CurveKind::MaxPowerLoading,
            CurveKind::MinPowerLoading,
        ];
        for kind in groups {
            for curve in self.curves.iter().filter(|c| c.kind() == kind) {
                let value = curve.evaluate(ws);
                let is_tight = match kind {
                    CurveKind::MaxWingLoading | CurveKind::MinWingLoading => tight(ws, value),
                    CurveKind::MaxPowerLoading => tight(env.required, value),
                    CurveKind::MinPowerLoading => env.required > 0.0 && tight(value, env.required),
                };
                if is_tight {
                    active.push(curve.name().to_string());
                }
            }
        }

        let binding_constraint = active
            .first()
            .cloned()
            .or_else(|| env.required_by.map(|i| self.curves[i].name().to_string()))
            .unwrap_or_else(|| "unconstrained".to_string());

        ChartPoint {
            wing_loading_n_m2: ws,
            power_loading_w_n: env.required,
            binding_constraint,
            active_constraints: active,
            feasible_range_n_m2,
        }
    }

    fn no_feasible_point(
        &self,
        lower: f64,
        upper: f64,
        grid: &[f64],
        envelopes: &[Envelope],
    ) -> MatchingError {
        let closest = envelopes
            .iter()
            .zip(grid)
            .min_by(|(a, _), (b, _)| a.overshoot().total_cmp(&b.overshoot()));
        let (violated_by, excess_percent) = match closest {
            Some((env, _)) => (
                env.required_by
                    .map(|i| self.curves[i].name().to_string())
                    .unwrap_or_else(|| "power-ceiling".to_string()),
                (env.overshoot() - 1.0) * 100.0,
            ),
            None => ("unknown".to_string(), f64::NAN),
        };
        MatchingError::NoFeasiblePoint {
            lower,
            upper,
            violated_by,
            excess_percent,
        }
    }
}

/// `intervals + 1` evenly spaced points from `lower` to exactly `upper`.
fn discretise(lower: f64, upper: f64, intervals: usize) -> Vec<f64> {
    if upper <= lower {
        return vec![upper];
    }
    let step = (upper - lower) / intervals as f64;
    let mut grid: Vec<f64> = (0..intervals).map(|i| lower + step * i as f64).collect();
    grid.push(upper);
    grid
}
