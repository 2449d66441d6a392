//! Frozen result of a converged sizing run.

use sizing_aero::ReynoldsGeometry;
use sizing_core::Topology;
use sizing_weights::MassBreakdown;

/// Converged design for one topology. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignPoint {
    pub topology: Topology,
    pub mtow_kg: f64,
    /// Zero for wingless topologies, as are the wing dimensions below.
    pub wing_loading_n_m2: f64,
    pub power_loading_w_n: f64,
    pub wing_area_m2: f64,
    pub wingspan_m: f64,
    pub chord_m: f64,
    pub hover_power_w: Option<f64>,
    pub cruise_power_w: Option<f64>,
    pub installed_power_w: f64,
    pub required_energy_wh: f64,
    pub usable_energy_wh: f64,
    /// Achievable with the carried battery.
    pub endurance_s: f64,
    pub range_m: f64,
    pub battery_mass_kg: f64,
    /// Battery hit the maximum MTOW fraction.
    pub battery_capped: bool,
    pub mass_breakdown: MassBreakdown,
    pub binding_constraint: String,
    pub active_constraints: Vec<String>,
    pub feasible_wing_loading_range: (f64, f64),
    pub rotor_diameter_m: Option<f64>,
    pub reynolds_number: Option<f64>,
    pub mach_number: Option<f64>,
    pub reynolds_check: Option<ReynoldsGeometry>,
    pub feasible: bool,
    pub margin_percent: f64,
    pub iterations: usize,
    pub residual: f64,
}

impl DesignPoint {
    pub fn energy_margin_wh(&self) -> f64 {
        self.usable_energy_wh - self.required_energy_wh
    }

    pub fn battery_fraction(&self) -> f64 {
        self.battery_mass_kg / self.mtow_kg
    }
}
