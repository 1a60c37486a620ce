//! Tenderly simulation API.

mod client;
pub use client::{TenderlyClient, simulation_url};

mod payload;
pub use payload::*;

mod simulation;
pub use simulation::*;
