//! Fixed-point iteration on take-off mass.
//!
//! Each pass runs the matching chart, the configuration model's power and energy
//! strategy and the weight breakdown at the current mass, then moves the mass towards
//! the resulting candidate. The loop stops on convergence, on an infeasible chart or
//! runaway mass, or when the iteration cap or a caller deadline is hit.

use std::time::Instant;

use log::{debug, info};
use sizing_aero::{AerodynamicConstraintSet, WingGeometry, reynolds_geometry};
use sizing_energy::usable_energy_wh;
use sizing_matching::{ChartPoint, MatchingChart};
use sizing_propulsion::{ConfigurationModel, PowerDemand};
use sizing_weights::{BatterySizing, MassBreakdown};

use crate::curves;
use crate::design::DesignPoint;
use crate::error::{DivergenceCause, InfeasibleReason, SizingError};
use crate::input::SizingInput;

// Search window for winged topologies, relative to the governing wing-loading bound.
const DOMAIN_LOWER_FRACTION: f64 = 1e-3;
const DOMAIN_UPPER_FACTOR: f64 = 2.0;

/// Quantities computed at one mass estimate.
#[derive(Debug, Clone)]
struct DesignState {
    mtow_kg: f64,
    chart: ChartPoint,
    wing: WingGeometry,
    demand: PowerDemand,
    required_energy_wh: f64,
    battery: BatterySizing,
    usable_energy_wh: f64,
    breakdown: MassBreakdown,
}

impl DesignState {
    fn candidate_mass_kg(&self) -> f64 {
        self.breakdown.total()
    }
}

/// Sizing loop for one topology, validated on construction.
#[derive(Debug)]
pub struct CoupledSizingSolver {
    input: SizingInput,
    model: ConfigurationModel,
    aero: AerodynamicConstraintSet,
    chart: MatchingChart,
    deadline: Option<Instant>,
}

impl CoupledSizingSolver {
    /// Validate every input; errors here are never retried.
    pub fn new(input: SizingInput) -> Result<Self, SizingError> {
        input.mission.validate()?;
        input.propulsion.validate()?;
        input.battery.validate()?;
        input.weights.validate()?;
        input.solver.validate()?;
        input.rotor.validate()?;
        input.aero.validate_performance()?;

        let cruise_speed = input.mission.cruise_speed_m_s;
        let aero = AerodynamicConstraintSet::new(
            &input.environment,
            input.aero.stall_constraint(cruise_speed),
            input.aero.polar(),
            input.aero.structural_max_wing_loading,
        )?;
        if input.topology.is_winged() {
            aero.check_cruise_speed(cruise_speed)?;
        }

        let seed_kg = input
            .solver
            .mass_seed_kg
            .unwrap_or_else(|| input.weights.seed_mass_kg(input.mission.payload_mass_kg));
        if !(seed_kg.is_finite() && seed_kg > 0.0) {
            return Err(SizingError::InvalidSolverSettings {
                field: "mass_seed_kg",
                value: seed_kg,
            });
        }

        let model = ConfigurationModel::for_topology(
            input.topology,
            input.rotor,
            input.mission.hover_segment_s,
        );
        let chart = curves::build_chart(&input, &model, &aero);

        Ok(Self {
            input,
            model,
            aero,
            chart,
            deadline: None,
        })
    }

    /// Stop with [`DivergenceCause::Deadline`] once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn input(&self) -> &SizingInput {
        &self.input
    }

    pub fn model(&self) -> &ConfigurationModel {
        &self.model
    }

    pub fn aero(&self) -> &AerodynamicConstraintSet {
        &self.aero
    }

    pub fn chart(&self) -> &MatchingChart {
        &self.chart
    }

    /// Wing-loading window searched for winged topologies (N/m²).
    pub fn chart_domain(&self) -> (f64, f64) {
        let bound = self.aero.governing_wing_loading_bound(&self.input.environment);
        (DOMAIN_LOWER_FRACTION * bound, DOMAIN_UPPER_FACTOR * bound)
    }

    pub fn seed_mass_kg(&self) -> f64 {
        self.input.solver.mass_seed_kg.unwrap_or_else(|| {
            self.input
                .weights
                .seed_mass_kg(self.input.mission.payload_mass_kg)
        })
    }

    /// Mass the weight breakdown returns when evaluated at `mass_kg`.
    pub fn candidate_mass(&self, mass_kg: f64) -> Result<f64, SizingError> {
        Ok(self.evaluate(mass_kg, 0)?.candidate_mass_kg())
    }

    fn evaluate(&self, mass_kg: f64, iteration: usize) -> Result<DesignState, SizingError> {
        let input = &self.input;
        let env = &input.environment;
        let weight_n = env.weight_n(mass_kg);
        let infeasible = |reason: InfeasibleReason| SizingError::Infeasible {
            iteration,
            mass_kg,
            reason,
        };

        let chart = if input.topology.is_winged() {
            self.chart
                .solve(self.chart_domain(), input.aero.selection_policy)
        } else {
            self.chart.solve_fixed(0.0)
        }
        .map_err(|err| infeasible(err.into()))?;

        let wing = if input.topology.is_winged() {
            WingGeometry::from_wing_loading(
                weight_n,
                chart.wing_loading_n_m2,
                input.aero.aspect_ratio,
            )
        } else {
            WingGeometry {
                area_m2: 0.0,
                span_m: 0.0,
                chord_m: 0.0,
            }
        };

        let mut demand = self.model.power_demand(
            mass_kg,
            env,
            &input.propulsion,
            &self.aero.polar,
            input.mission.cruise_speed_m_s,
            input.aero.safety_power_margin,
        );
        // Chart curves already include the safety margin.
        let chart_power_w = chart.power_loading_w_n * weight_n;
        demand.installed_power_w = demand.installed_power_w.max(chart_power_w);

        let required_energy_wh = self
            .model
            .required_energy_wh(&demand, input.mission.required_endurance_s())
            .map_err(|err| infeasible(err.into()))?;
        let battery = input
            .weights
            .battery_mass_kg(required_energy_wh, &input.battery, mass_kg)
            .map_err(|err| infeasible(err.into()))?;
        let usable_energy_wh = usable_energy_wh(battery.mass_kg, &input.battery)
            .map_err(|err| infeasible(err.into()))?;

        let breakdown = input.weights.estimate(
            mass_kg,
            input.mission.payload_mass_kg,
            wing.area_m2,
            self.model.propulsion_sizing_power_w(&demand),
            battery.mass_kg,
        );

        Ok(DesignState {
            mtow_kg: mass_kg,
            chart,
            wing,
            demand,
            required_energy_wh,
            battery,
            usable_energy_wh,
            breakdown,
        })
    }

    /// Run the loop to convergence or failure.
    pub fn solve(&self) -> Result<DesignPoint, SizingError> {
        let settings = &self.input.solver;
        let ceiling_kg = self.input.mass_ceiling_kg();
        let topology = self.input.topology;
        let mut mass_kg = self.seed_mass_kg();
        let mut residual = f64::INFINITY;

        for iteration in 1..=settings.max_iterations {
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SizingError::Diverged {
                    iterations: iteration - 1,
                    last_mass_kg: mass_kg,
                    residual,
                    cause: DivergenceCause::Deadline,
                });
            }

            let state = self.evaluate(mass_kg, iteration)?;
            let candidate_kg = state.candidate_mass_kg();
            residual = (candidate_kg - mass_kg).abs() / mass_kg;
            debug!(
                "{topology} iteration {iteration}: mass {mass_kg:.6} kg, candidate {candidate_kg:.6} kg, residual {residual:.3e}"
            );

            if !candidate_kg.is_finite() || !residual.is_finite() {
                return Err(SizingError::Diverged {
                    iterations: iteration,
                    last_mass_kg: mass_kg,
                    residual,
                    cause: DivergenceCause::NonFiniteMass,
                });
            }

            if residual < settings.tolerance {
                info!(
                    "{topology} converged in {iteration} iterations at {mass_kg:.4} kg"
                );
                return self.freeze(state, iteration, residual);
            }

            mass_kg += settings.damping * (candidate_kg - mass_kg);
            if !(mass_kg.is_finite() && mass_kg > 0.0) {
                return Err(SizingError::Diverged {
                    iterations: iteration,
                    last_mass_kg: mass_kg,
                    residual,
                    cause: DivergenceCause::NonFiniteMass,
                });
            }
            if mass_kg > ceiling_kg {
                return Err(SizingError::Infeasible {
                    iteration,
                    mass_kg,
                    reason: InfeasibleReason::MassRunaway { ceiling_kg },
                });
            }
        }

        Err(SizingError::Diverged {
            iterations: settings.max_iterations,
            last_mass_kg: mass_kg,
            residual,
            cause: DivergenceCause::IterationCap,
        })
    }

    fn freeze(
        &self,
        state: DesignState,
        iterations: usize,
        residual: f64,
    ) -> Result<DesignPoint, SizingError> {
        let input = &self.input;
        let env = &input.environment;
        let speed = input.mission.cruise_speed_m_s;
        let winged = input.topology.is_winged();

        let endurance_s = self
            .model
            .endurance_s(&state.demand, state.usable_energy_wh)
            .map_err(|err| SizingError::Infeasible {
                iteration: iterations,
                mass_kg: state.mtow_kg,
                reason: err.into(),
            })?;
        let range_m = self.model.range_m(endurance_s, speed);
        let margin_percent = if state.required_energy_wh > 0.0 {
            (state.usable_energy_wh - state.required_energy_wh) / state.required_energy_wh * 100.0
        } else {
            0.0
        };

        let reynolds_check = match input.aero.target_reynolds {
            Some(target) if winged => Some(reynolds_geometry(
                env,
                target,
                speed,
                input.aero.aspect_ratio,
                env.weight_n(state.mtow_kg),
            )?),
            _ => None,
        };

        Ok(DesignPoint {
            topology: input.topology,
            mtow_kg: state.mtow_kg,
            wing_loading_n_m2: state.chart.wing_loading_n_m2,
            power_loading_w_n: state.demand.installed_power_w / env.weight_n(state.mtow_kg),
            wing_area_m2: state.wing.area_m2,
            wingspan_m: state.wing.span_m,
            chord_m: state.wing.chord_m,
            hover_power_w: state.demand.hover_power_w,
            cruise_power_w: state.demand.cruise_power_w,
            installed_power_w: state.demand.installed_power_w,
            required_energy_wh: state.required_energy_wh,
            usable_energy_wh: state.usable_energy_wh,
            endurance_s,
            range_m,
            battery_mass_kg: state.battery.mass_kg,
            battery_capped: state.battery.capped,
            mass_breakdown: state.breakdown,
            binding_constraint: state.chart.binding_constraint,
            active_constraints: state.chart.active_constraints,
            feasible_wing_loading_range: state.chart.feasible_range_n_m2,
            rotor_diameter_m: self.model.rotor_diameter_m(state.mtow_kg, env),
            reynolds_number: winged.then(|| env.reynolds_number(speed, state.wing.chord_m)),
            mach_number: winged.then(|| env.mach_number(speed)),
            reynolds_check,
            feasible: state.usable_energy_wh >= state.required_energy_wh,
            margin_percent,
            iterations,
            residual,
        })
    }
}

/// Validate and solve in one call.
pub fn size(input: SizingInput) -> Result<DesignPoint, SizingError> {
    CoupledSizingSolver::new(input)?.solve()
}
