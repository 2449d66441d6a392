//! Aerodynamic constraints for wings flying in thin atmospheres.
//!
//! The stall constraint bounds wing loading from above; the drag polar feeds cruise
//! and climb power estimates; the Reynolds-number mode derives a reference wing from a
//! target chord Reynolds number and is only used as a cross-check.

use sizing_core::PhysicalEnvironment;
use thiserror::Error;

/// Non-physical aerodynamic inputs, detected before any iteration starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAerodynamicInput {
    #[error("environment field '{0}' must be positive and finite")]
    NonPhysicalEnvironment(&'static str),
    #[error("maximum lift coefficient must be positive (got {0})")]
    NonPositiveLiftCoefficient(f64),
    #[error("minimum flight speed must be positive (got {0} m/s)")]
    NonPositiveMinimumSpeed(f64),
    #[error("aspect ratio must be positive (got {0})")]
    NonPositiveAspectRatio(f64),
    #[error("drag polar field '{field}' is out of range (got {value})")]
    InvalidDragPolar { field: &'static str, value: f64 },
    #[error("target Reynolds number must be positive (got {0})")]
    NonPositiveReynolds(f64),
    #[error("airspeed must be positive (got {0} m/s)")]
    NonPositiveSpeed(f64),
    #[error("structural wing-loading limit must be positive (got {0} N/m²)")]
    NonPositiveStructuralBound(f64),
    #[error("rotor parameter '{field}' must be positive (got {value})")]
    InvalidRotor { field: &'static str, value: f64 },
    #[error("cruise speed {cruise_m_s} m/s is below the minimum flight speed {min_speed_m_s} m/s")]
    CruiseBelowMinimumSpeed { cruise_m_s: f64, min_speed_m_s: f64 },
}

#[inline]
fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Reject environments with non-positive or non-finite constants.
pub fn validate_environment(env: &PhysicalEnvironment) -> Result<(), InvalidAerodynamicInput> {
    match env.first_invalid_field() {
        Some(field) => Err(InvalidAerodynamicInput::NonPhysicalEnvironment(field)),
        None => Ok(()),
    }
}

/// Stall-speed target with the margin applied to obtain the minimum flight speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StallConstraint {
    pub stall_speed_m_s: f64,
    pub stall_margin_factor: f64,
    pub cl_max: f64,
}

impl StallConstraint {
    /// V_min = k × V_stall.
    pub fn min_speed_m_s(&self) -> f64 {
        self.stall_margin_factor * self.stall_speed_m_s
    }

    pub fn validate(&self) -> Result<(), InvalidAerodynamicInput> {
        if !positive(self.cl_max) {
            return Err(InvalidAerodynamicInput::NonPositiveLiftCoefficient(
                self.cl_max,
            ));
        }
        let v_min = self.min_speed_m_s();
        if !positive(self.stall_speed_m_s) || !positive(self.stall_margin_factor) || !positive(v_min)
        {
            return Err(InvalidAerodynamicInput::NonPositiveMinimumSpeed(v_min));
        }
        Ok(())
    }
}

/// Maximum wing loading permitted by the stall constraint: `0.5 ρ V_min² CL_max` (N/m²).
pub fn max_wing_loading(
    env: &PhysicalEnvironment,
    stall: &StallConstraint,
) -> Result<f64, InvalidAerodynamicInput> {
    validate_environment(env)?;
    stall.validate()?;
    let v_min = stall.min_speed_m_s();
    Ok(0.5 * env.density_kg_m3 * v_min * v_min * stall.cl_max)
}

/// Minimum flight speed implied by a wing loading at `CL_max`; inverse of [`max_wing_loading`].
pub fn min_speed_for_wing_loading(env: &PhysicalEnvironment, wing_loading_n_m2: f64, cl_max: f64) -> f64 {
    (2.0 * wing_loading_n_m2 / (env.density_kg_m3 * cl_max)).sqrt()
}

/// Parabolic drag polar `CD = CD0 + k CL²` with `k = 1 / (π e AR)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPolar {
    pub cd0: f64,
    pub oswald_efficiency: f64,
    pub aspect_ratio: f64,
}

impl DragPolar {
    pub fn validate(&self) -> Result<(), InvalidAerodynamicInput> {
        if !positive(self.aspect_ratio) {
            return Err(InvalidAerodynamicInput::NonPositiveAspectRatio(
                self.aspect_ratio,
            ));
        }
        if !positive(self.cd0) {
            return Err(InvalidAerodynamicInput::InvalidDragPolar {
                field: "cd0",
                value: self.cd0,
            });
        }
        if !positive(self.oswald_efficiency) || self.oswald_efficiency > 1.0 {
            return Err(InvalidAerodynamicInput::InvalidDragPolar {
                field: "oswald_efficiency",
                value: self.oswald_efficiency,
            });
        }
        Ok(())
    }

    pub fn induced_factor(&self) -> f64 {
        1.0 / (std::f64::consts::PI * self.oswald_efficiency * self.aspect_ratio)
    }

    pub fn drag_coefficient(&self, cl: f64) -> f64 {
        self.cd0 + self.induced_factor() * cl * cl
    }

    pub fn lift_to_drag(&self, cl: f64) -> f64 {
        cl / self.drag_coefficient(cl)
    }

    /// Best lift-to-drag ratio, reached where induced drag equals parasite drag.
    pub fn max_lift_to_drag(&self) -> f64 {
        0.5 / (self.cd0 * self.induced_factor()).sqrt()
    }

    /// Lift coefficient at which [`Self::max_lift_to_drag`] occurs.
    pub fn cl_at_max_lift_to_drag(&self) -> f64 {
        (self.cd0 / self.induced_factor()).sqrt()
    }
}

/// Planform derived from a wing loading and aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingGeometry {
    pub area_m2: f64,
    pub span_m: f64,
    pub chord_m: f64,
}

impl WingGeometry {
    /// `S = W / (W/S)`, `b = sqrt(AR S)`, `c = S / b`.
    pub fn from_wing_loading(weight_n: f64, wing_loading_n_m2: f64, aspect_ratio: f64) -> Self {
        let area_m2 = weight_n / wing_loading_n_m2;
        let span_m = (aspect_ratio * area_m2).sqrt();
        Self {
            area_m2,
            span_m,
            chord_m: area_m2 / span_m,
        }
    }
}

/// Reference wing obtained from a target chord Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReynoldsGeometry {
    pub reynolds_number: f64,
    pub chord_m: f64,
    pub wing_area_m2: f64,
    pub span_m: f64,
    pub wing_loading_n_m2: f64,
    pub mach_number: f64,
}

/// Derive chord, area, span and wing loading from a target Reynolds number at `speed_m_s`.
///
/// The result is a cross-check on the stall-governed design and never drives sizing.
pub fn reynolds_geometry(
    env: &PhysicalEnvironment,
    target_reynolds: f64,
    speed_m_s: f64,
    aspect_ratio: f64,
    weight_n: f64,
) -> Result<ReynoldsGeometry, InvalidAerodynamicInput> {
    validate_environment(env)?;
    if !positive(target_reynolds) {
        return Err(InvalidAerodynamicInput::NonPositiveReynolds(target_reynolds));
    }
    if !positive(speed_m_s) {
        return Err(InvalidAerodynamicInput::NonPositiveSpeed(speed_m_s));
    }
    if !positive(aspect_ratio) {
        return Err(InvalidAerodynamicInput::NonPositiveAspectRatio(aspect_ratio));
    }

    let chord_m = target_reynolds * env.dynamic_viscosity_pa_s / (env.density_kg_m3 * speed_m_s);
    let span_m = aspect_ratio * chord_m;
    let wing_area_m2 = span_m * chord_m;

    Ok(ReynoldsGeometry {
        reynolds_number: target_reynolds,
        chord_m,
        wing_area_m2,
        span_m,
        wing_loading_n_m2: weight_n / wing_area_m2,
        mach_number: env.mach_number(speed_m_s),
    })
}

/// Stall constraint, drag polar and optional structural limit for one wing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AerodynamicConstraintSet {
    pub stall: StallConstraint,
    pub polar: DragPolar,
    pub structural_max_wing_loading: Option<f64>,
}

impl AerodynamicConstraintSet {
    /// Build a validated constraint set; all checks happen here so later calls cannot fail.
    pub fn new(
        env: &PhysicalEnvironment,
        stall: StallConstraint,
        polar: DragPolar,
        structural_max_wing_loading: Option<f64>,
    ) -> Result<Self, InvalidAerodynamicInput> {
        validate_environment(env)?;
        stall.validate()?;
        polar.validate()?;
        if let Some(bound) = structural_max_wing_loading {
            if !positive(bound) {
                return Err(InvalidAerodynamicInput::NonPositiveStructuralBound(bound));
            }
        }
        Ok(Self {
            stall,
            polar,
            structural_max_wing_loading,
        })
    }

    /// Reject cruise speeds the wing cannot sustain at its stall-limited loading.
    pub fn check_cruise_speed(&self, cruise_m_s: f64) -> Result<(), InvalidAerodynamicInput> {
        if !positive(cruise_m_s) {
            return Err(InvalidAerodynamicInput::NonPositiveSpeed(cruise_m_s));
        }
        let min_speed_m_s = self.stall.min_speed_m_s();
        // Rounding slack for cruise speeds configured exactly at V_min.
        if cruise_m_s < min_speed_m_s * (1.0 - 1e-9) {
            return Err(InvalidAerodynamicInput::CruiseBelowMinimumSpeed {
                cruise_m_s,
                min_speed_m_s,
            });
        }
        Ok(())
    }

    pub fn max_wing_loading(&self, env: &PhysicalEnvironment) -> f64 {
        let v_min = self.stall.min_speed_m_s();
        0.5 * env.density_kg_m3 * v_min * v_min * self.stall.cl_max
    }

    /// Tightest upper wing-loading bound: stall or structural, whichever is lower.
    pub fn governing_wing_loading_bound(&self, env: &PhysicalEnvironment) -> f64 {
        let stall = self.max_wing_loading(env);
        self.structural_max_wing_loading
            .map_or(stall, |structural| structural.min(stall))
    }

    /// Minimum flight speed recovered from a wing loading at this wing's `CL_max`.
    pub fn stall_round_trip(&self, env: &PhysicalEnvironment, wing_loading_n_m2: f64) -> f64 {
        min_speed_for_wing_loading(env, wing_loading_n_m2, self.stall.cl_max)
    }
}
