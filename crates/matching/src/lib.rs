//! Matching-chart solver: intersects named constraint curves in the wing-loading /
//! power-loading plane and selects a design point from the feasible region.

pub mod chart;
pub mod curve;

pub use chart::{ChartPoint, ChartSample, MatchingChart, MatchingError, SelectionPolicy};
pub use curve::{ConstraintCurve, CurveKind};
