//! Constraint-based sizing of small electric UAVs for thin atmospheres.
//!
//! The workspace crates are re-exported here so front-ends (the CLI binaries, notebooks,
//! other tools) depend on one library.

pub use sizing_config as config;
pub use sizing_core::{PhysicalEnvironment, Topology, constants, units};
pub use sizing_export as export;
pub use sizing_solver as solver;
pub use sizing_solver::{aero, energy, matching, propulsion, weights};

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
