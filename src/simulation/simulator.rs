use super::overrides::{QueuedProposal, SimulationPosition, mark_operation_ready};
use crate::{
    chains::Chains,
    checks::ProposalData,
    constants::{
        ARB_L1_TIMELOCK, ARB_L2_CORE_TIMELOCK, ARB_ONE_CHAIN_ID, BLOCK_GAS_LIMIT, DEFAULT_FROM,
        MAINNET_CHAIN_ID,
    },
    error::{HarnessError, SimulationError},
    sims::l2_to_l1_salt,
    tenderly::{
        BlockHeaderOverride, StateObject, StorageEncodingRequest, TenderlyClient, TenderlyPayload,
        TenderlySimulation,
    },
    types::{
        ArbL2ToL1Config, ArbRetryableConfig, BlockInfo, ExecutedConfig, Governor, GovernorConfig,
        GovernorType, ITimelockController, NewConfig, ProposalActions, ProposalCreated,
        ProposalEvent, ProposalExecuted, ProposedConfig, SimulationConfig, execute_calldata,
        hash_operation_batch,
    },
};
use alloy::{
    consensus::Transaction as _,
    eips::BlockNumberOrTag,
    primitives::{Address, B256, Bytes, ChainId, U256},
    providers::{DynProvider, Provider},
    rpc::types::{Filter, Log},
    sol_types::{SolCall, SolEvent},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Votes credited to a simulated proposal when the voting token's supply cannot be read.
const FALLBACK_VOTES: U256 = U256::from_limbs([0, 0, 0, 1 << 56]);

/// ETH given to accounts that pay for the simulated execution, 10,000 ETH.
const SIMULATION_BALANCE: U256 = U256::from_limbs([0x19e0c9bab2400000, 0x21e, 0, 0]);

/// Outcome of a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// The Tenderly simulation.
    pub sim: TenderlySimulation,
    /// The simulated proposal.
    pub proposal: ProposalEvent,
    /// The block the simulation was positioned against.
    pub latest_block: BlockInfo,
}

/// A simulation together with what produced it.
#[derive(Debug, Clone)]
pub struct SimulationData {
    /// The configuration that was simulated.
    pub config: SimulationConfig,
    /// The outcome.
    pub result: SimulationResult,
    /// Context for proposal checks.
    pub deps: ProposalData,
}

/// Simulates proposals through Tenderly.
#[derive(Debug, Clone)]
pub struct Simulator {
    chains: Chains,
    tenderly: TenderlyClient,
}

impl Simulator {
    /// Creates a new [`Simulator`].
    pub const fn new(chains: Chains, tenderly: TenderlyClient) -> Self {
        Self { chains, tenderly }
    }

    /// The Tenderly client.
    pub const fn tenderly(&self) -> &TenderlyClient {
        &self.tenderly
    }

    /// Simulates a configuration.
    #[instrument(skip_all, fields(dao = config.dao_name(), kind = %config.kind()))]
    pub async fn simulate(&self, config: SimulationConfig) -> Result<SimulationData, HarnessError> {
        config.validate()?;
        let (result, deps) = match &config {
            SimulationConfig::Executed(executed) => self.simulate_executed(executed).await?,
            SimulationConfig::Proposed(proposed) => self.simulate_proposed(proposed).await?,
            SimulationConfig::New(new) => self.simulate_new(new).await?,
            SimulationConfig::ArbL2ToL1(l2_to_l1) => self.simulate_l2_to_l1(l2_to_l1).await?,
            SimulationConfig::ArbRetryable(retryable) => self.simulate_retryable(retryable).await?,
        };
        info!(
            proposal = %result.proposal.id,
            simulation = %result.sim.simulation.id,
            success = result.sim.succeeded(),
            "Simulation finished"
        );
        Ok(SimulationData { config, result, deps })
    }

    /// Chain the governor lives on.
    fn governor_chain(&self, governor: &GovernorConfig) -> ChainId {
        match governor.governor_type {
            GovernorType::Arb => ARB_ONE_CHAIN_ID,
            GovernorType::Oz | GovernorType::Bravo => self.chains.primary_chain_id(),
        }
    }

    fn provider(&self, chain_id: ChainId) -> Result<&DynProvider, HarnessError> {
        self.chains.for_chain_id(chain_id).ok_or(HarnessError::UnsupportedChain(chain_id))
    }

    fn governor(
        &self,
        config: &GovernorConfig,
    ) -> Result<(ChainId, Governor<DynProvider>), HarnessError> {
        let chain_id = self.governor_chain(config);
        let provider = self.provider(chain_id)?.clone();
        Ok((chain_id, Governor::new(config.governor_address, config.governor_type, provider)))
    }

    async fn simulate_executed(
        &self,
        config: &ExecutedConfig,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        let (chain_id, governor) = self.governor(&config.governor)?;
        let provider = self.provider(chain_id)?;
        let id = config.proposal_id;

        let proposal = find_proposal(provider, governor.address(), id, chain_id).await?;
        let executed = proposal_logs(provider, governor.address(), ProposalExecuted::SIGNATURE_HASH)
            .await?
            .into_iter()
            .find(|log| log.log_decode::<ProposalExecuted>().is_ok_and(|e| e.inner.data.id == id))
            .ok_or(SimulationError::ProposalNotExecuted(id))?;
        let tx_hash = executed.transaction_hash.ok_or(SimulationError::ProposalNotExecuted(id))?;

        let tx = provider
            .get_transaction_by_hash(tx_hash)
            .await?
            .ok_or(SimulationError::TransactionNotFound(tx_hash))?;
        let (Some(block_number), Some(index)) = (tx.block_number, tx.transaction_index) else {
            return Err(SimulationError::TransactionPending(tx_hash).into());
        };
        debug!(%tx_hash, block_number, index, "Found execution transaction");

        let payload = TenderlyPayload::new(
            chain_id,
            tx.inner.signer(),
            tx.to().unwrap_or_default(),
            tx.input().clone(),
            tx.gas_limit(),
        )
        .with_value(tx.value())
        .with_gas_price(tx.effective_gas_price.unwrap_or_default())
        .with_block_number(block_number)
        .with_transaction_index(index);

        let sim = self.tenderly.simulate(&payload).await?;
        let latest_block = block_info(provider, BlockNumberOrTag::Number(block_number)).await?;
        let deps = self.proposal_data(&config.governor, &governor).await?;
        Ok((SimulationResult { sim, proposal, latest_block }, deps))
    }

    async fn simulate_proposed(
        &self,
        config: &ProposedConfig,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        let (chain_id, governor) = self.governor(&config.governor)?;
        let provider = self.provider(chain_id)?;
        let proposal =
            find_proposal(provider, governor.address(), config.proposal_id, chain_id).await?;

        let new = NewConfig {
            governor: config.governor.clone(),
            actions: proposal.actions(),
            description: proposal.description.clone(),
        };
        let (mut result, deps) = self.simulate_queued(&new, Some(proposal.id)).await?;
        result.proposal = proposal;
        Ok((result, deps))
    }

    async fn simulate_new(
        &self,
        config: &NewConfig,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        self.simulate_queued(config, None).await
    }

    /// Simulates executing a proposal after marking it as passed and queued.
    async fn simulate_queued(
        &self,
        config: &NewConfig,
        id: Option<U256>,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        let (chain_id, governor) = self.governor(&config.governor)?;
        let provider = self.provider(chain_id)?;
        let kind = governor.kind();
        let description_hash = config.description_hash();

        let id = match id {
            Some(id) => id,
            None => governor.proposal_id(&config.actions, description_hash).await?,
        };
        let timelock = governor.timelock().await?;
        let votes = governor.voting_supply().await.unwrap_or_else(|err| {
            warn!(%err, "Failed to read voting supply, using fallback");
            FALLBACK_VOTES
        });

        let latest_block = block_info(provider, BlockNumberOrTag::Latest).await?;
        let position = SimulationPosition::after(&latest_block);

        let mut request = StorageEncodingRequest::new(chain_id);
        QueuedProposal {
            governor: governor.address(),
            timelock,
            kind,
            id,
            actions: &config.actions,
            description_hash,
            votes,
        }
        .apply(&mut request, &position);
        let mut state_objects = self.encode(&request, &[governor.address(), timelock]).await?;
        fund(&mut state_objects, DEFAULT_FROM);

        let payload = TenderlyPayload::new(
            chain_id,
            DEFAULT_FROM,
            governor.address(),
            execute_calldata(kind, id, &config.actions, description_hash),
            BLOCK_GAS_LIMIT,
        )
        .with_value(config.actions.total_value())
        .with_gas_price(0)
        .with_block_number(latest_block.number)
        .with_state_objects(state_objects)
        .with_block_header(BlockHeaderOverride::new(position.block, position.timestamp));

        let sim = self.tenderly.simulate(&payload).await?;
        let (start, end) = position.voting_window(kind);
        let proposal = synthesize_proposal(
            id,
            DEFAULT_FROM,
            &config.actions,
            &config.description,
            (start, end),
            chain_id,
        );
        let deps = ProposalData {
            governor: governor.address(),
            governor_type: kind,
            timelock,
            chain_id,
            provider: provider.clone(),
        };
        Ok((SimulationResult { sim, proposal, latest_block }, deps))
    }

    async fn simulate_l2_to_l1(
        &self,
        config: &ArbL2ToL1Config,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        let provider = self.provider(MAINNET_CHAIN_ID)?;
        let actions = &config.actions;
        let payloads = actions.payloads();
        let salt = config.salt.unwrap_or_else(|| l2_to_l1_salt(config.parent_id, config.id_offset));
        let predecessor = config.predecessor.unwrap_or_default();
        let operation =
            hash_operation_batch(&actions.targets, &actions.values, &payloads, predecessor, salt);

        let latest_block = block_info(provider, BlockNumberOrTag::Latest).await?;
        let position = SimulationPosition::after(&latest_block);

        let mut request = StorageEncodingRequest::new(MAINNET_CHAIN_ID);
        mark_operation_ready(&mut request, ARB_L1_TIMELOCK, operation, &position);
        let mut state_objects = self.encode(&request, &[ARB_L1_TIMELOCK]).await?;
        // retryable submission fees are paid by the timelock
        fund(&mut state_objects, ARB_L1_TIMELOCK);
        fund(&mut state_objects, DEFAULT_FROM);

        let calldata: Bytes = ITimelockController::executeBatchCall {
            targets: actions.targets.clone(),
            values: actions.values.clone(),
            payloads,
            predecessor,
            salt,
        }
        .abi_encode()
        .into();

        let payload = TenderlyPayload::new(
            MAINNET_CHAIN_ID,
            DEFAULT_FROM,
            ARB_L1_TIMELOCK,
            calldata,
            BLOCK_GAS_LIMIT,
        )
        .with_value(actions.total_value())
        .with_gas_price(0)
        .with_block_number(latest_block.number)
        .with_state_objects(state_objects)
        .with_block_header(BlockHeaderOverride::new(position.block, position.timestamp));

        let sim = self.tenderly.simulate(&payload).await?;
        let proposal = synthesize_proposal(
            config.parent_id,
            ARB_L2_CORE_TIMELOCK,
            actions,
            &config.description,
            (0, 0),
            MAINNET_CHAIN_ID,
        );
        let deps = ProposalData {
            governor: config.governor.governor_address,
            governor_type: config.governor.governor_type,
            timelock: ARB_L1_TIMELOCK,
            chain_id: MAINNET_CHAIN_ID,
            provider: provider.clone(),
        };
        Ok((SimulationResult { sim, proposal, latest_block }, deps))
    }

    async fn simulate_retryable(
        &self,
        config: &ArbRetryableConfig,
    ) -> Result<(SimulationResult, ProposalData), HarnessError> {
        let chain_id = config.chain_id.chain_id();
        let provider = self.provider(chain_id)?;
        let actions = &config.actions;
        let latest_block = block_info(provider, BlockNumberOrTag::Latest).await?;

        let payloads = actions.payloads();
        let (Some(target), Some(payload)) = (actions.targets.first(), payloads.first()) else {
            return Err(crate::error::ConfigError::RetryableActionCount(actions.len()).into());
        };
        let value = actions.values.first().copied().unwrap_or_default();

        let mut state_objects = BTreeMap::new();
        if !value.is_zero() {
            fund(&mut state_objects, config.from);
        }
        let payload =
            TenderlyPayload::new(chain_id, config.from, *target, payload.clone(), BLOCK_GAS_LIMIT)
                .with_value(value)
                .with_block_number(latest_block.number)
                .with_state_objects(state_objects);

        let sim = self.tenderly.simulate(&payload).await?;
        let proposal = synthesize_proposal(
            config.parent_id,
            ARB_L1_TIMELOCK,
            actions,
            &config.description,
            (0, 0),
            chain_id,
        );
        let deps = ProposalData {
            governor: config.governor.governor_address,
            governor_type: config.governor.governor_type,
            timelock: config.from,
            chain_id,
            provider: provider.clone(),
        };
        Ok((SimulationResult { sim, proposal, latest_block }, deps))
    }

    async fn proposal_data(
        &self,
        config: &GovernorConfig,
        governor: &Governor<DynProvider>,
    ) -> Result<ProposalData, HarnessError> {
        let chain_id = self.governor_chain(config);
        Ok(ProposalData {
            governor: governor.address(),
            governor_type: governor.kind(),
            timelock: governor.timelock().await?,
            chain_id,
            provider: self.provider(chain_id)?.clone(),
        })
    }

    /// Encodes storage overrides, requiring slots for each of `contracts`.
    async fn encode(
        &self,
        request: &StorageEncodingRequest,
        contracts: &[Address],
    ) -> Result<BTreeMap<Address, StateObject>, HarnessError> {
        let encoded = self.tenderly.encode_states(request).await?;
        for contract in contracts {
            if !encoded.state_overrides.contains_key(contract) {
                return Err(SimulationError::MissingEncodedState(contract.to_string()).into());
            }
        }
        Ok(encoded.into_state_objects())
    }
}

fn fund(state_objects: &mut BTreeMap<Address, StateObject>, account: Address) {
    state_objects.entry(account).or_default().balance = Some(SIMULATION_BALANCE.to_string());
}

fn synthesize_proposal(
    id: U256,
    proposer: Address,
    actions: &ProposalActions,
    description: &str,
    (start_block, end_block): (u64, u64),
    chain_id: ChainId,
) -> ProposalEvent {
    ProposalEvent {
        id,
        proposer,
        start_block: U256::from(start_block),
        end_block: U256::from(end_block),
        description: description.to_string(),
        targets: actions.targets.clone(),
        values: actions.values.clone(),
        signatures: actions.signatures.clone(),
        calldatas: actions.calldatas.clone(),
        chain_id,
    }
}

/// Fetches all logs of one governor event.
async fn proposal_logs(
    provider: &DynProvider,
    governor: Address,
    signature: B256,
) -> Result<Vec<Log>, HarnessError> {
    let filter = Filter::new()
        .address(governor)
        .event_signature(signature)
        .from_block(BlockNumberOrTag::Earliest)
        .to_block(BlockNumberOrTag::Latest);
    Ok(provider.get_logs(&filter).await?)
}

/// Finds the `ProposalCreated` event of proposal `id`.
async fn find_proposal(
    provider: &DynProvider,
    governor: Address,
    id: U256,
    chain_id: ChainId,
) -> Result<ProposalEvent, HarnessError> {
    let created = proposal_logs(provider, governor, ProposalCreated::SIGNATURE_HASH)
        .await?
        .iter()
        .filter_map(|log| log.log_decode::<ProposalCreated>().ok())
        .map(|log| log.inner.data)
        .find(|event| event.id == id)
        .ok_or(SimulationError::ProposalNotFound(id))?;
    debug!(%id, proposer = %created.proposer, actions = created.targets.len(), "Found proposal");
    Ok(ProposalEvent::from_created(created, chain_id))
}

async fn block_info(
    provider: &DynProvider,
    block: BlockNumberOrTag,
) -> Result<BlockInfo, HarnessError> {
    let block = provider
        .get_block_by_number(block)
        .await?
        .ok_or(SimulationError::MissingLatestBlock)?;
    Ok(BlockInfo {
        number: block.header.number,
        timestamp: block.header.timestamp,
        hash: block.header.hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        let ether = U256::from(10u64).pow(U256::from(18));
        assert_eq!(SIMULATION_BALANCE, U256::from(10_000u64) * ether);
        assert_eq!(FALLBACK_VOTES, U256::from(1) << 248);
    }

    #[test]
    fn funding_keeps_storage() {
        let mut objects = BTreeMap::new();
        objects.insert(
            ARB_L1_TIMELOCK,
            StateObject { storage: Some(BTreeMap::new()), ..Default::default() },
        );
        fund(&mut objects, ARB_L1_TIMELOCK);
        fund(&mut objects, DEFAULT_FROM);

        assert!(objects[&ARB_L1_TIMELOCK].storage.is_some());
        assert_eq!(objects[&DEFAULT_FROM].balance.as_deref(), Some("10000000000000000000000"));
    }

    #[test]
    fn synthesized_proposal_mirrors_actions() {
        let actions = ProposalActions {
            targets: vec![ARB_L1_TIMELOCK],
            values: vec![U256::from(1)],
            signatures: vec![String::new()],
            calldatas: vec![Bytes::new()],
        };
        let proposal =
            synthesize_proposal(U256::from(7), DEFAULT_FROM, &actions, "desc", (1, 2), 1);
        assert_eq!(proposal.actions(), actions);
        assert_eq!(proposal.start_block, U256::from(1));
        assert_eq!(proposal.chain_id, 1);
    }
}
