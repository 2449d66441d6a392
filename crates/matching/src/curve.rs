//! Named constraint curves in the wing-loading / power-loading plane.

use std::fmt;

/// How a curve restricts the feasible region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Required power loading; feasible at or above the curve.
    MinPowerLoading,
    /// Available power loading; feasible at or below the curve.
    MaxPowerLoading,
    /// Hard upper bound on wing loading (stall, structure).
    MaxWingLoading,
    /// Hard lower bound on wing loading (manufacturing, span limits).
    MinWingLoading,
}

type Evaluator = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// A named constraint evaluated as a function of wing loading (N/m²).
///
/// Power-loading curves return W/N; wing-loading bounds return their bound and ignore the
/// argument.
pub struct ConstraintCurve {
    name: String,
    kind: CurveKind,
    eval: Evaluator,
}

impl ConstraintCurve {
    pub fn new<F>(name: impl Into<String>, kind: CurveKind, eval: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            eval: Box::new(eval),
        }
    }

    pub fn min_power_loading<F>(name: impl Into<String>, eval: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, CurveKind::MinPowerLoading, eval)
    }

    pub fn max_power_loading<F>(name: impl Into<String>, eval: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, CurveKind::MaxPowerLoading, eval)
    }

    /// Power requirement independent of wing loading (hover, best-L/D cruise).
    pub fn constant_min_power_loading(name: impl Into<String>, power_loading_w_n: f64) -> Self {
        Self::min_power_loading(name, move |_| power_loading_w_n)
    }

    /// Power ceiling independent of wing loading.
    pub fn constant_max_power_loading(name: impl Into<String>, power_loading_w_n: f64) -> Self {
        Self::max_power_loading(name, move |_| power_loading_w_n)
    }

    pub fn max_wing_loading(name: impl Into<String>, bound_n_m2: f64) -> Self {
        Self::new(name, CurveKind::MaxWingLoading, move |_| bound_n_m2)
    }

    pub fn min_wing_loading(name: impl Into<String>, bound_n_m2: f64) -> Self {
        Self::new(name, CurveKind::MinWingLoading, move |_| bound_n_m2)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn evaluate(&self, wing_loading_n_m2: f64) -> f64 {
        (self.eval)(wing_loading_n_m2)
    }
}

impl fmt::Debug for ConstraintCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintCurve")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
