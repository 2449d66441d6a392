//! Constraint curves for the matching chart of one topology.
//!
//! Power loadings are installed electrical watts per newton of weight: requirement curves
//! carry the safety power margin, so the ceiling is checked against what gets installed.
//! Every curve here is independent of the current mass estimate.

use sizing_aero::AerodynamicConstraintSet;
use sizing_core::PhysicalEnvironment;
use sizing_matching::{ConstraintCurve, MatchingChart};
use sizing_propulsion::{ConfigurationModel, PropulsionEfficiencyChain};

use crate::input::SizingInput;

pub const STALL: &str = "stall";
pub const STRUCTURAL_MAX: &str = "structural-max";
pub const HOVER_POWER: &str = "hover-power";
pub const CRUISE_POWER: &str = "cruise-power";
pub const CLIMB_RATE: &str = "climb-rate";
pub const POWER_CEILING: &str = "power-ceiling";

// Unit mass used to turn absolute powers into power loadings.
const REFERENCE_MASS_KG: f64 = 1.0;

/// Steady climb at cruise speed: `(ROC + V (q CD0 / (W/S) + k (W/S) / q)) / η_cruise`.
pub fn climb_power_loading(
    env: &PhysicalEnvironment,
    aero: &AerodynamicConstraintSet,
    chain: &PropulsionEfficiencyChain,
    cruise_speed_m_s: f64,
    climb_rate_m_s: f64,
    wing_loading_n_m2: f64,
) -> f64 {
    let q = env.dynamic_pressure_pa(cruise_speed_m_s);
    let k = aero.polar.induced_factor();
    let drag_per_weight = q * aero.polar.cd0 / wing_loading_n_m2 + k * wing_loading_n_m2 / q;
    (climb_rate_m_s + cruise_speed_m_s * drag_per_weight) / chain.cruise_chain()
}

pub fn build_chart(
    input: &SizingInput,
    model: &ConfigurationModel,
    aero: &AerodynamicConstraintSet,
) -> MatchingChart {
    let env = input.environment;
    let chain = input.propulsion;
    let speed = input.mission.cruise_speed_m_s;
    let reference_weight_n = env.weight_n(REFERENCE_MASS_KG);
    let margin = input.aero.safety_power_margin;
    let mut chart = MatchingChart::new();

    if model.topology().is_winged() {
        chart.push(ConstraintCurve::max_wing_loading(
            STALL,
            aero.max_wing_loading(&env),
        ));
        if let Some(bound) = aero.structural_max_wing_loading {
            chart.push(ConstraintCurve::max_wing_loading(STRUCTURAL_MAX, bound));
        }
    }

    if let Some(hover_w) = model.hover_power_w(REFERENCE_MASS_KG, &env, &chain) {
        chart.push(ConstraintCurve::constant_min_power_loading(
            HOVER_POWER,
            margin * hover_w / reference_weight_n,
        ));
    }

    if let Some(cruise_w) =
        model.cruise_power_w(REFERENCE_MASS_KG, &env, &chain, &aero.polar, speed)
    {
        chart.push(ConstraintCurve::constant_min_power_loading(
            CRUISE_POWER,
            margin * cruise_w / reference_weight_n,
        ));
        let aero = *aero;
        let climb_rate = input.aero.climb_rate_m_s;
        chart.push(ConstraintCurve::min_power_loading(CLIMB_RATE, move |ws| {
            margin * climb_power_loading(&env, &aero, &chain, speed, climb_rate, ws)
        }));
    }

    if let Some(ceiling) = input.aero.max_power_loading_w_n {
        chart.push(ConstraintCurve::constant_max_power_loading(
            POWER_CEILING,
            ceiling,
        ));
    }

    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sizing_aero::{DragPolar, StallConstraint};

    fn aero_set() -> AerodynamicConstraintSet {
        AerodynamicConstraintSet::new(
            &PhysicalEnvironment::mars_reference(),
            StallConstraint {
                stall_speed_m_s: 29.2,
                stall_margin_factor: 1.2,
                cl_max: 1.2,
            },
            DragPolar {
                cd0: 0.035,
                oswald_efficiency: 0.8,
                aspect_ratio: 6.0,
            },
            None,
        )
        .unwrap()
    }

    fn chain() -> PropulsionEfficiencyChain {
        PropulsionEfficiencyChain {
            motor_efficiency: 0.90,
            esc_efficiency: 0.95,
            propeller_efficiency_cruise: 0.80,
            figure_of_merit_hover: 0.65,
        }
    }

    #[test]
    fn climb_curve_meets_cruise_plus_climb_at_best_lift_to_drag() {
        let env = PhysicalEnvironment::mars_reference();
        let aero = aero_set();
        let q = env.dynamic_pressure_pa(40.0);
        let ws_best = q * aero.polar.cl_at_max_lift_to_drag();
        let climb = climb_power_loading(&env, &aero, &chain(), 40.0, 0.5, ws_best);
        let cruise = 40.0 / aero.polar.max_lift_to_drag() / chain().cruise_chain();
        assert_relative_eq!(
            climb,
            cruise + 0.5 / chain().cruise_chain(),
            max_relative = 1e-9
        );

        // Off-design wing loadings cost more.
        assert!(climb_power_loading(&env, &aero, &chain(), 40.0, 0.5, 0.5 * ws_best) > climb);
        assert!(climb_power_loading(&env, &aero, &chain(), 40.0, 0.5, 2.0 * ws_best) > climb);
    }
}
