use alloy::primitives::{B256, U256};
use thiserror::Error;

/// Errors related to building and running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// No `ProposalCreated` event exists for the proposal.
    #[error("proposal {0} was not found on the governor")]
    ProposalNotFound(U256),
    /// No `ProposalExecuted` event exists for the proposal.
    #[error("proposal {0} has not been executed")]
    ProposalNotExecuted(U256),
    /// The execution transaction could not be fetched.
    #[error("execution transaction {0} not found")]
    TransactionNotFound(B256),
    /// The execution transaction is still pending.
    #[error("execution transaction {0} is not mined")]
    TransactionPending(B256),
    /// The provider returned no latest block.
    #[error("latest block unavailable")]
    MissingLatestBlock,
    /// The storage encoding response did not contain an override for a contract.
    #[error("storage encoding returned no slots for {0}")]
    MissingEncodedState(String),
}
