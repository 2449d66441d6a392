//! Coupled sizing façade: the mass/power/energy loop, batch comparison across topologies,
//! parametric sweeps and conversion from study configuration.

pub mod batch;
pub mod curves;
pub mod design;
pub mod error;
pub mod input;
pub mod solver;
pub mod sweep;

pub use facade::*;
pub use sizing_aero as aero;
pub use sizing_energy as energy;
pub use sizing_matching as matching;
pub use sizing_propulsion as propulsion;
pub use sizing_weights as weights;

mod facade;
