//! # govsim
//!
//! Simulates governance proposals of Compound Bravo, OpenZeppelin and Arbitrum governors on
//! Tenderly and runs sanity checks against the simulated execution.
//!
//! A run loads [`types::SimulationConfig`]s, turns each into a Tenderly simulation through the
//! [`simulation::Simulator`], runs the [`checks`] against the result and writes a markdown
//! [`report`] per simulation.

pub mod calldata;
pub mod chains;
pub mod checks;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod provider;
pub mod report;
pub mod serde;
pub mod simulation;
pub mod sims;
pub mod tenderly;
pub mod types;
