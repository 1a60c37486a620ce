//! Alloy provider extensions.

use crate::error::ChainError;
use alloy::{primitives::ChainId, providers::Provider};
use tracing::{debug, instrument};

/// Checks that an endpoint configured for `expected` actually reports `expected`.
pub fn validate_chain_id(
    label: &'static str,
    expected: ChainId,
    actual: ChainId,
) -> Result<(), ChainError> {
    if expected != actual {
        return Err(ChainError::ChainIdMismatch { label, expected, actual });
    }
    Ok(())
}

/// Extension trait for [`Provider`] adding network identity checks.
pub trait ProviderExt: Provider {
    /// Queries `eth_chainId` and fails unless it equals `expected`.
    ///
    /// `label` names the endpoint in the returned error.
    fn ensure_chain_id(
        &self,
        label: &'static str,
        expected: ChainId,
    ) -> impl Future<Output = Result<ChainId, ChainError>> + Send {
        async move {
            let actual = self
                .get_chain_id()
                .await
                .map_err(|source| ChainError::Unreachable { label, source })?;
            validate_chain_id(label, expected, actual)?;
            Ok(actual)
        }
    }
}

impl<T> ProviderExt for T where T: Provider {}

/// Queries the chain ID of a provider, attaching `label` to transport failures.
#[instrument(skip(provider))]
pub async fn chain_id_of<P: Provider>(
    label: &'static str,
    provider: &P,
) -> Result<ChainId, ChainError> {
    let chain_id =
        provider.get_chain_id().await.map_err(|source| ChainError::Unreachable { label, source })?;
    debug!(chain_id, "Fetched chain ID");
    Ok(chain_id)
}
