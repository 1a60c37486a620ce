//! Proposal simulation.

pub mod overrides;

mod simulator;
pub use simulator::{SimulationData, SimulationResult, Simulator};
