use alloy::{primitives::ChainId, transports::TransportErrorKind};
use thiserror::Error;

/// Errors raised while connecting to and validating RPC endpoints.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The endpoint reports a different chain than the one it is configured for.
    #[error("{label} must be connected to chain {expected}, but reports chain {actual}")]
    ChainIdMismatch {
        /// Name of the endpoint, e.g. `L1_RPC_URL`.
        label: &'static str,
        /// The chain ID the endpoint is configured for.
        expected: ChainId,
        /// The chain ID the endpoint reported.
        actual: ChainId,
    },
    /// The endpoint could not be reached.
    #[error("failed to query {label}: {source}")]
    Unreachable {
        /// Name of the endpoint.
        label: &'static str,
        /// The underlying transport error.
        #[source]
        source: alloy::transports::RpcError<TransportErrorKind>,
    },
    /// The endpoint URL could not be used.
    #[error("invalid endpoint for {label}: {reason}")]
    InvalidEndpoint {
        /// Name of the endpoint.
        label: &'static str,
        /// Why the endpoint was rejected.
        reason: String,
    },
}
