use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the Tenderly client.
#[derive(Debug, Error)]
pub enum TenderlyError {
    /// The API answered with a non-success status.
    #[error("tenderly request failed with status {status}: {body}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The response body was not the expected JSON shape.
    #[error("failed to decode tenderly response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Credentials are missing.
    #[error("tenderly {0} is not configured")]
    MissingCredential(&'static str),
}
