//! Response types of the Tenderly API.
//!
//! Only the fields the harness reads are typed strictly. Everything the backend may omit or null
//! defaults, and unknown fields are ignored, so additions on the API side do not break decoding.

use alloy::primitives::{Address, B256, Bytes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A completed simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderlySimulation {
    /// The simulated transaction with its trace.
    pub transaction: Transaction,
    /// Simulation metadata.
    pub simulation: Simulation,
    /// Contracts touched by the transaction.
    pub contracts: Vec<TenderlyContract>,
    /// Access list generated for the transaction.
    pub generated_access_list: Vec<GeneratedAccessList>,
}

impl TenderlySimulation {
    /// Whether the simulated transaction succeeded.
    pub fn succeeded(&self) -> bool {
        self.transaction.status
    }

    /// Finds a touched contract by address.
    pub fn contract(&self, address: Address) -> Option<&TenderlyContract> {
        self.contracts.iter().find(|contract| contract.address == address)
    }

    /// All decoded logs, in emission order.
    pub fn logs(&self) -> &[Log] {
        self.transaction.transaction_info.logs.as_deref().unwrap_or_default()
    }

    /// All state changes.
    pub fn state_diffs(&self) -> &[StateDiff] {
        self.transaction.transaction_info.state_diff.as_deref().unwrap_or_default()
    }
}

/// Simulation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Simulation ID, used for dashboard links.
    pub id: String,
    /// Project ID.
    pub project_id: String,
    /// Owner ID.
    pub owner_id: String,
    /// Network ID.
    pub network_id: String,
    /// Block the simulation ran on.
    pub block_number: u64,
    /// Position within the block.
    pub transaction_index: u64,
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Calldata.
    pub input: Bytes,
    /// Gas limit.
    pub gas: u64,
    /// Gas price.
    pub gas_price: String,
    /// Value sent.
    pub value: String,
    /// Decoded method name.
    pub method: String,
    /// Whether the transaction succeeded.
    pub status: bool,
    /// Access list.
    pub access_list: Option<Value>,
    /// Queue origin.
    pub queue_origin: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// The simulated transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    /// Transaction hash.
    pub hash: B256,
    /// Block hash.
    pub block_hash: Option<B256>,
    /// Block number.
    pub block_number: u64,
    /// Sender.
    pub from: Address,
    /// Gas limit.
    pub gas: u64,
    /// Gas price.
    pub gas_price: u64,
    /// EIP-1559 fee cap.
    pub gas_fee_cap: u64,
    /// EIP-1559 tip cap.
    pub gas_tip_cap: u64,
    /// Cumulative gas used in the block.
    pub cumulative_gas_used: u64,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Effective gas price.
    pub effective_gas_price: u64,
    /// Calldata.
    pub input: Bytes,
    /// Sender nonce.
    pub nonce: u64,
    /// Recipient.
    pub to: Address,
    /// Position within the block.
    pub index: u64,
    /// Value sent.
    pub value: String,
    /// Access list.
    pub access_list: Option<Value>,
    /// Whether the transaction succeeded.
    pub status: bool,
    /// Addresses touched.
    pub addresses: Vec<Address>,
    /// Tenderly contract IDs touched.
    pub contract_ids: Vec<String>,
    /// Network ID.
    pub network_id: String,
    /// Selector of the called function.
    pub function_selector: String,
    /// Trace, logs and state changes.
    pub transaction_info: TransactionInfo,
    /// Block timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Decoded method name.
    pub method: String,
    /// Decoded input.
    pub decoded_input: Option<Value>,
}

/// Execution details of the simulated transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionInfo {
    /// Tenderly contract ID of the recipient.
    pub contract_id: String,
    /// Block number.
    pub block_number: u64,
    /// Transaction hash.
    pub transaction_id: B256,
    /// Recipient.
    pub contract_address: Address,
    /// Decoded method name.
    pub method: Option<String>,
    /// Decoded parameters.
    pub parameters: Option<Value>,
    /// Intrinsic gas.
    pub intrinsic_gas: u64,
    /// Refunded gas.
    pub refund_gas: u64,
    /// Root of the call trace.
    pub call_trace: CallTrace,
    /// Source-level stack trace of a revert.
    pub stack_trace: Option<Vec<StackTrace>>,
    /// Emitted logs.
    pub logs: Option<Vec<Log>>,
    /// State changes.
    pub state_diff: Option<Vec<StateDiff>>,
    /// Raw state changes.
    pub raw_state_diff: Option<Value>,
    /// `console.log` output.
    pub console_logs: Option<Value>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// A frame of a source-level stack trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackTrace {
    /// Index of the source file.
    pub file_index: i64,
    /// Contract address.
    pub contract: String,
    /// Function name.
    pub name: String,
    /// Source line.
    pub line: u64,
    /// Error.
    pub error: String,
    /// Revert reason.
    pub error_reason: String,
    /// Source snippet.
    pub code: String,
    /// Opcode.
    pub op: String,
    /// Snippet length.
    pub length: u64,
}

/// A frame of the decoded call trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallTrace {
    /// Transaction hash.
    pub hash: Option<String>,
    /// Name of the called contract.
    pub contract_name: String,
    /// Name of the called function.
    pub function_name: Option<String>,
    /// Program counter of the function.
    pub function_pc: u64,
    /// Opcode entering the function.
    pub function_op: String,
    /// Call type, e.g. `CALL` or `DELEGATECALL`.
    pub call_type: String,
    /// Caller.
    pub from: Address,
    /// Callee.
    pub to: Address,
    /// Value sent, hex encoded.
    pub value: Option<String>,
    /// Gas available.
    pub gas: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Calldata.
    pub input: Bytes,
    /// Decoded calldata.
    pub decoded_input: Option<Vec<DecodedValue>>,
    /// Return data.
    pub output: Bytes,
    /// Decoded return data.
    pub decoded_output: Option<Vec<DecodedValue>>,
    /// Revert message of a failed frame.
    pub error: Option<String>,
    /// Decoded revert reason.
    pub error_reason: Option<String>,
    /// Network ID.
    pub network_id: String,
    /// Nested calls.
    pub calls: Option<Vec<CallTrace>>,
}

impl CallTrace {
    /// Iterates over this frame and all nested frames, depth first.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let frame = stack.pop()?;
            if let Some(calls) = &frame.calls {
                stack.extend(calls.iter().rev());
            }
            Some(frame)
        })
    }

    /// The first frame that reverted, if any.
    pub fn first_error(&self) -> Option<&Self> {
        self.walk().find(|frame| frame.error.is_some())
    }
}

/// A decoded value with its Solidity type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodedValue {
    /// Type of the value.
    pub soltype: Option<SolType>,
    /// The value, a string, bool, or nested object for structs and mappings.
    pub value: Value,
}

/// Where a Solidity variable lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    /// Calldata.
    Calldata,
    /// Not specified.
    #[default]
    Default,
    /// Memory.
    Memory,
    /// Storage.
    Storage,
    /// Anything newer.
    #[serde(other)]
    Unknown,
}

/// Solidity type information of a decoded value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolType {
    /// Variable name.
    pub name: String,
    /// Solidity type, e.g. `uint256` or `mapping (address => uint256)`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Data location.
    pub storage_location: StorageLocation,
    /// Struct or tuple members.
    pub components: Option<Vec<SolType>>,
    /// Offset within the slot.
    pub offset: u64,
    /// Slot index.
    pub index: String,
    /// Whether the event parameter is indexed.
    pub indexed: bool,
    /// Simplified type.
    pub simple_type: Option<SimpleType>,
}

/// Simplified type of a decoded value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleType {
    /// E.g. `address`, `uint`, `slice`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Element type of slices.
    pub nested_type: Option<Box<SimpleType>>,
}

/// A decoded log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Event name, if the emitter is verified.
    pub name: Option<String>,
    /// Whether the event is anonymous.
    pub anonymous: bool,
    /// Decoded parameters.
    pub inputs: Vec<DecodedValue>,
    /// The raw log.
    pub raw: LogRaw,
}

/// A raw log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRaw {
    /// Emitter.
    pub address: Address,
    /// Topics.
    pub topics: Vec<B256>,
    /// Data.
    pub data: Bytes,
}

/// A state change of one variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDiff {
    /// Type of the variable, if the contract is verified.
    pub soltype: Option<SolType>,
    /// Value before, a string or nested object.
    pub original: Value,
    /// Value after, a string or nested object.
    pub dirty: Value,
    /// Changed slots.
    pub raw: Vec<RawStateDiff>,
}

impl StateDiff {
    /// The contract whose storage changed.
    pub fn address(&self) -> Option<Address> {
        self.raw.first().map(|raw| raw.address)
    }
}

/// A changed storage slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStateDiff {
    /// Contract.
    pub address: Address,
    /// Slot.
    pub key: B256,
    /// Value before.
    pub original: B256,
    /// Value after.
    pub dirty: B256,
}

/// An access list entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedAccessList {
    /// Accessed contract.
    pub address: Address,
    /// Accessed slots.
    pub storage_keys: Vec<B256>,
}

/// A contract known to Tenderly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderlyContract {
    /// Tenderly ID.
    pub id: String,
    /// Tenderly contract ID.
    pub contract_id: String,
    /// Balance.
    pub balance: String,
    /// Network ID.
    pub network_id: String,
    /// Whether the contract is public.
    pub public: bool,
    /// Who verified the source, empty if unverified.
    pub verified_by: String,
    /// Verification time.
    pub verification_date: Option<DateTime<Utc>>,
    /// Address.
    pub address: Address,
    /// Contract name.
    pub contract_name: String,
    /// ENS name.
    pub ens_domain: Option<Value>,
    /// Contract type.
    #[serde(rename = "type")]
    pub ty: String,
    /// EVM version.
    pub evm_version: String,
    /// Compiler version.
    pub compiler_version: String,
    /// Whether optimizations were enabled.
    pub optimizations_used: bool,
    /// Optimizer runs.
    pub optimization_runs: u64,
    /// Linked libraries.
    pub libraries: Option<Value>,
    /// Sources and ABI.
    pub data: Option<ContractData>,
    /// Deployment block.
    pub creation_block: u64,
    /// Deployment transaction.
    pub creation_tx: String,
    /// Deployer.
    pub creator_address: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Number of watches.
    pub number_of_watches: Option<u64>,
    /// Source language.
    pub language: String,
    /// Whether the contract is in the project.
    pub in_project: bool,
    /// Number of source files.
    pub number_of_files: u64,
    /// Detected token standard.
    pub standard: Option<String>,
    /// Detected standards.
    pub standards: Option<Vec<String>>,
    /// Token metadata.
    pub token_data: Option<TokenData>,
}

impl TenderlyContract {
    /// Whether Tenderly has verified source for the contract.
    pub fn is_verified(&self) -> bool {
        !self.verified_by.is_empty() || self.data.as_ref().is_some_and(|d| !d.abi.is_empty())
    }
}

/// Sources and ABI of a contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractData {
    /// Index of the main contract in `contract_info`.
    pub main_contract: u64,
    /// Source files.
    pub contract_info: Vec<ContractInfo>,
    /// ABI.
    pub abi: Vec<AbiEntry>,
    /// Raw ABI.
    pub raw_abi: Option<Value>,
}

/// Kind of an ABI entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiType {
    /// Constructor.
    Constructor,
    /// Event.
    Event,
    /// Function.
    #[default]
    Function,
    /// Fallback, receive, error and anything newer.
    #[serde(other)]
    Other,
}

/// An ABI entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbiEntry {
    /// Entry kind.
    #[serde(rename = "type")]
    pub ty: AbiType,
    /// Name.
    pub name: String,
    /// Whether the function is constant.
    pub constant: bool,
    /// Whether the event is anonymous.
    pub anonymous: bool,
    /// Inputs.
    pub inputs: Vec<SolType>,
    /// Outputs.
    pub outputs: Option<Vec<SolType>>,
}

/// A source file of a contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractInfo {
    /// File index.
    pub id: u64,
    /// File path.
    pub path: String,
    /// Contract name.
    pub name: String,
    /// Source.
    pub source: String,
}

/// Token metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenData {
    /// Symbol.
    pub symbol: String,
    /// Name.
    pub name: String,
    /// Decimals.
    pub decimals: u8,
}

/// Renders a decoded value the way it shows up in reports.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Renders decoded parameters as `name: value` pairs.
pub fn format_params(params: &[DecodedValue]) -> String {
    params
        .iter()
        .map(|param| match &param.soltype {
            Some(soltype) if !soltype.name.is_empty() => {
                format!("{}: {}", soltype.name, format_value(&param.value))
            }
            _ => format_value(&param.value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Groups items by contract address, keeping the first-seen order of addresses.
pub fn group_by_address<'a, T>(
    items: impl IntoIterator<Item = &'a T>,
    address: impl Fn(&T) -> Option<Address>,
) -> Vec<(Address, Vec<&'a T>)>
where
    T: 'a,
{
    let mut order = Vec::new();
    let mut groups: BTreeMap<Address, Vec<&'a T>> = BTreeMap::new();
    for item in items {
        let Some(addr) = address(item) else { continue };
        groups
            .entry(addr)
            .or_insert_with(|| {
                order.push(addr);
                Vec::new()
            })
            .push(item);
    }
    order.into_iter().filter_map(|addr| groups.remove(&addr).map(|items| (addr, items))).collect()
}
