//! Harness error types.
use alloy::{primitives::ChainId, transports::TransportErrorKind};
use thiserror::Error;

mod chain;
pub use chain::ChainError;

mod config;
pub use config::ConfigError;

mod simulation;
pub use simulation::SimulationError;

mod tenderly;
pub use tenderly::TenderlyError;

/// The overarching error type of the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Errors related to provider bootstrapping.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// Errors related to simulation configurations.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Errors related to building a simulation.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// Errors returned by the simulation API.
    #[error(transparent)]
    Tenderly(#[from] TenderlyError),
    /// No provider is configured for the chain.
    #[error("no provider configured for chain {0}")]
    UnsupportedChain(ChainId),
    /// An error occurred during ABI encoding/decoding.
    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
    /// A contract call failed.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] alloy::transports::RpcError<TransportErrorKind>),
    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}
