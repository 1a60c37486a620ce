//! RPC providers of the chains a simulation may touch.

use crate::{
    config::{EndpointsConfig, RetryConfig},
    constants::{ARB_NOVA_CHAIN_ID, ARB_ONE_CHAIN_ID, MAINNET_CHAIN_ID},
    error::ChainError,
    provider::{ProviderExt, chain_id_of},
};
use alloy::{
    primitives::ChainId,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::ClientBuilder,
    transports::layers::RetryBackoffLayer,
};
use alloy_chains::Chain;
use futures_util::future::try_join_all;
use tracing::{info, warn};
use url::Url;

/// A collection of providers.
///
/// The primary provider serves governors on whatever chain it is connected to. The L1, Arbitrum One
/// and Nova providers are pinned to their chain and validated when connecting.
#[derive(Debug, Clone)]
pub struct Chains {
    primary: DynProvider,
    primary_chain_id: ChainId,
    l1: Option<DynProvider>,
    arb1: Option<DynProvider>,
    nova: Option<DynProvider>,
}

impl Chains {
    /// Connects to the configured endpoints.
    ///
    /// Fails on the first endpoint that cannot be reached or reports an unexpected chain.
    pub async fn connect(
        endpoints: &EndpointsConfig,
        retry: RetryConfig,
    ) -> Result<Self, ChainError> {
        let layer = RetryBackoffLayer::new(retry.max_retries, retry.backoff_ms, u64::MAX);
        let connect = |url: &Url| {
            let client = ClientBuilder::default().layer(layer.clone()).http(url.clone());
            ProviderBuilder::new().connect_client(client).erased()
        };

        let primary = endpoints
            .rpc
            .as_ref()
            .map(connect)
            .ok_or_else(|| ChainError::InvalidEndpoint {
                label: "RPC_URL",
                reason: "not configured".into(),
            })?;

        Self::from_providers(
            primary,
            endpoints.l1.as_ref().map(connect),
            endpoints.arb1.as_ref().map(connect),
            endpoints.nova.as_ref().map(connect),
        )
        .await
    }

    /// Validates and wraps already built providers.
    pub async fn from_providers(
        primary: DynProvider,
        l1: Option<DynProvider>,
        arb1: Option<DynProvider>,
        nova: Option<DynProvider>,
    ) -> Result<Self, ChainError> {
        try_join_all(
            [
                ("L1_RPC_URL", MAINNET_CHAIN_ID, &l1),
                ("ARB1_RPC_URL", ARB_ONE_CHAIN_ID, &arb1),
                ("NOVA_RPC_URL", ARB_NOVA_CHAIN_ID, &nova),
            ]
            .into_iter()
            .map(|(label, expected, provider)| async move {
                match provider {
                    Some(provider) => provider.ensure_chain_id(label, expected).await.map(drop),
                    None => {
                        warn!(label, "Endpoint not configured, simulations on this chain fail");
                        Ok(())
                    }
                }
            }),
        )
        .await?;

        let primary_chain_id = chain_id_of("RPC_URL", &primary).await?;
        info!(
            chain_id = primary_chain_id,
            chain = %Chain::from_id(primary_chain_id),
            "Your primary provider is connected to network {primary_chain_id}"
        );

        Ok(Self { primary, primary_chain_id, l1, arb1, nova })
    }

    /// The primary provider.
    pub const fn primary(&self) -> &DynProvider {
        &self.primary
    }

    /// Chain ID of the primary provider.
    pub const fn primary_chain_id(&self) -> ChainId {
        self.primary_chain_id
    }

    /// The provider to use for `chain_id`.
    ///
    /// Pinned providers take precedence, the primary provider serves its own chain.
    pub fn for_chain_id(&self, chain_id: ChainId) -> Option<&DynProvider> {
        let pinned = match chain_id {
            MAINNET_CHAIN_ID => self.l1.as_ref(),
            ARB_ONE_CHAIN_ID => self.arb1.as_ref(),
            ARB_NOVA_CHAIN_ID => self.nova.as_ref(),
            _ => None,
        };
        pinned.or_else(|| (chain_id == self.primary_chain_id).then_some(&self.primary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{primitives::U64, transports::mock::Asserter};

    fn mocked(chain_ids: &[u64]) -> DynProvider {
        let asserter = Asserter::new();
        for chain_id in chain_ids {
            asserter.push_success(&U64::from(*chain_id));
        }
        ProviderBuilder::new().connect_mocked_client(asserter).erased()
    }

    #[tokio::test]
    async fn routes_by_chain_id() {
        let chains = Chains::from_providers(
            mocked(&[42161]),
            Some(mocked(&[1])),
            None,
            Some(mocked(&[42170])),
        )
        .await
        .unwrap();

        assert_eq!(chains.primary_chain_id(), 42161);
        assert!(chains.for_chain_id(1).is_some());
        assert!(chains.for_chain_id(42161).is_some());
        assert!(chains.for_chain_id(42170).is_some());
        assert!(chains.for_chain_id(10).is_none());
    }

    #[tokio::test]
    async fn fails_fast_on_wrong_chain() {
        let err = Chains::from_providers(mocked(&[1]), Some(mocked(&[1])), Some(mocked(&[1])), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::ChainIdMismatch { label: "ARB1_RPC_URL", expected: 42161, actual: 1 }
        ));
    }

    #[tokio::test]
    async fn primary_endpoint_is_required() {
        let err = Chains::connect(&EndpointsConfig::default(), RetryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidEndpoint { label: "RPC_URL", .. }));
    }
}
