//! Request types of the Tenderly API.

use alloy::primitives::{Address, B256, Bytes, ChainId, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Simulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationType {
    /// Decoded trace, state diffs and logs.
    Full,
    /// Raw output only.
    Quick,
}

/// Account state override applied before the simulated transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateObject {
    /// Balance in wei, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    /// Replacement bytecode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Bytes>,
    /// Storage slot overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<B256, B256>>,
}

/// Compiler info of a [`ContractObject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    /// Always `solc`.
    pub name: String,
    /// Compiler version.
    pub version: String,
}

/// Deployment of a [`ContractObject`] on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractNetwork {
    /// Events by signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, String>>,
    /// Linked libraries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,
    /// Deployed address.
    pub address: Address,
    /// Deployment transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
}

/// Source of a contract that is not verified on Tenderly, so the trace can still be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractObject {
    /// Name of the contract.
    pub contract_name: String,
    /// Solidity source.
    pub source: String,
    /// Path of the source file.
    pub source_path: String,
    /// Compiler used.
    pub compiler: CompilerInfo,
    /// Deployments keyed by network ID.
    pub networks: BTreeMap<String, ContractNetwork>,
}

/// Block header fields overridden for the simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderOverride {
    /// Block number, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Block timestamp, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl BlockHeaderOverride {
    /// Positions the simulation at `number` and `timestamp`.
    pub fn new(number: u64, timestamp: u64) -> Self {
        Self { number: Some(format!("{number:#x}")), timestamp: Some(format!("{timestamp:#x}")) }
    }
}

/// Body of a `simulate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderlyPayload {
    /// Network to simulate on, the chain ID as a string.
    pub network_id: String,
    /// Block to fork from, latest if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Position within the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<u64>,
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Calldata.
    pub input: Bytes,
    /// Gas limit.
    pub gas: u64,
    /// Gas price in wei, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    /// Value in wei, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Simulation mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_type: Option<SimulationType>,
    /// Persist the simulation so it can be shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    /// Persist the simulation even if it reverts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_if_fails: Option<bool>,
    /// Account overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_objects: Option<BTreeMap<Address, StateObject>>,
    /// Extra contract sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Vec<ContractObject>>,
    /// Block header overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_header: Option<BlockHeaderOverride>,
    /// Whether to return the generated access list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_access_list: Option<bool>,
}

impl TenderlyPayload {
    /// A saved, fully decoded simulation of a call.
    pub fn new(chain_id: ChainId, from: Address, to: Address, input: Bytes, gas: u64) -> Self {
        Self {
            network_id: chain_id.to_string(),
            block_number: None,
            transaction_index: None,
            from,
            to,
            input,
            gas,
            gas_price: None,
            value: None,
            simulation_type: Some(SimulationType::Full),
            save: Some(true),
            save_if_fails: Some(true),
            state_objects: None,
            contracts: None,
            block_header: None,
            generate_access_list: Some(true),
        }
    }

    /// Sets the native value sent with the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Sets the gas price.
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price.to_string());
        self
    }

    /// Forks from `block_number`.
    pub fn with_block_number(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }

    /// Positions the transaction at `index` within the block.
    pub fn with_transaction_index(mut self, index: u64) -> Self {
        self.transaction_index = Some(index);
        self
    }

    /// Sets the account overrides.
    pub fn with_state_objects(mut self, state_objects: BTreeMap<Address, StateObject>) -> Self {
        self.state_objects = (!state_objects.is_empty()).then_some(state_objects);
        self
    }

    /// Overrides the block header.
    pub fn with_block_header(mut self, header: BlockHeaderOverride) -> Self {
        self.block_header = Some(header);
        self
    }
}

/// Human readable storage overrides of one contract, keyed by variable expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStateOverride {
    /// Values keyed by expressions like `_timestamps[0x..]` or `proposals[12].eta`.
    pub value: BTreeMap<String, String>,
}

/// Body of an `encode-states` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEncodingRequest {
    /// Network of the contracts.
    #[serde(rename = "networkID")]
    pub network_id: String,
    /// Overrides keyed by contract.
    #[serde(rename = "stateOverrides")]
    pub state_overrides: BTreeMap<Address, ContractStateOverride>,
}

impl StorageEncodingRequest {
    /// Creates an empty request for `chain_id`.
    pub fn new(chain_id: ChainId) -> Self {
        Self { network_id: chain_id.to_string(), state_overrides: BTreeMap::new() }
    }

    /// Sets `key` to `value` on `contract`.
    pub fn set(&mut self, contract: Address, key: impl Into<String>, value: impl Into<String>) {
        self.state_overrides.entry(contract).or_default().value.insert(key.into(), value.into());
    }

    /// Whether no overrides were added.
    pub fn is_empty(&self) -> bool {
        self.state_overrides.values().all(|contract| contract.value.is_empty())
    }
}

/// Encoded storage slots of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedStorage {
    /// Slot values keyed by slot.
    pub value: BTreeMap<B256, B256>,
}

/// Response of an `encode-states` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEncodingResponse {
    /// Encoded slots keyed by contract.
    #[serde(rename = "stateOverrides")]
    pub state_overrides: BTreeMap<Address, EncodedStorage>,
}

impl StorageEncodingResponse {
    /// Converts the encoded slots into simulation state objects.
    pub fn into_state_objects(self) -> BTreeMap<Address, StateObject> {
        self.state_overrides
            .into_iter()
            .map(|(address, storage)| {
                (address, StateObject { storage: Some(storage.value), ..Default::default() })
            })
            .collect()
    }
}
