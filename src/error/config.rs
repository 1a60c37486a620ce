use std::path::PathBuf;
use thiserror::Error;

/// Errors related to simulation configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The action arrays of a proposal have different lengths.
    #[error(
        "proposal actions have mismatched lengths: {targets} targets, {values} values, \
         {signatures} signatures, {calldatas} calldatas"
    )]
    MismatchedActions {
        /// Number of targets.
        targets: usize,
        /// Number of values.
        values: usize,
        /// Number of signatures.
        signatures: usize,
        /// Number of calldatas.
        calldatas: usize,
    },
    /// The proposal has no actions.
    #[error("proposal has no actions")]
    EmptyProposal,
    /// A retryable ticket carries exactly one call.
    #[error("retryable simulations take exactly one action, got {0}")]
    RetryableActionCount(usize),
    /// No simulation is registered under the given name.
    #[error("unknown built-in simulation `{0}`")]
    UnknownSimulation(String),
    /// The simulation file could not be read.
    #[error("failed to read simulation file {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The simulation file could not be parsed.
    #[error("failed to parse simulation file {path}: {reason}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// The parser message.
        reason: String,
    },
}
