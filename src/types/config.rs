//! Simulation configurations.
//!
//! A configuration names a governor and either points at an on-chain proposal or carries the
//! proposal's actions explicitly. Files use the `type` field to pick the variant:
//!
//! ```yaml
//! type: new
//! daoName: Arbitrum
//! governorAddress: "0xf07ded9dc292157749b6fd268e37df6ea38395b9"
//! governorType: arb
//! targets: ["0x0000000000000000000000000000000000000064"]
//! values: [0]
//! signatures: [""]
//! calldatas: ["0x928c169a..."]
//! description: atlas fees sim
//! ```

use crate::{
    constants::{ARB_NOVA_CHAIN_ID, ARB_ONE_CHAIN_ID},
    error::ConfigError,
    types::GovernorType,
};
use alloy::primitives::{Address, B256, Bytes, ChainId, U256, keccak256};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// Fields shared by every simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorConfig {
    /// Name of the DAO, e.g. `Compound` or `Uniswap`.
    pub dao_name: String,
    /// Address of the governor.
    pub governor_address: Address,
    /// Flavor of the governor.
    pub governor_type: GovernorType,
}

/// The actions of a proposal as four parallel lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalActions {
    /// Call targets.
    pub targets: Vec<Address>,
    /// Native value sent with each call.
    #[serde(with = "crate::serde::quantity::vec")]
    pub values: Vec<U256>,
    /// Function signatures. Bravo governors prepend the selector of a non-empty signature to the
    /// calldata, OZ governors ignore them.
    #[serde(default)]
    pub signatures: Vec<String>,
    /// Calldata of each call.
    pub calldatas: Vec<Bytes>,
}

impl ProposalActions {
    /// Number of actions.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the proposal has no actions.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Checks that the four lists line up and are not empty.
    ///
    /// A missing `signatures` list is accepted and treated as all-empty signatures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let signatures =
            if self.signatures.is_empty() { self.targets.len() } else { self.signatures.len() };
        if self.values.len() != self.targets.len()
            || signatures != self.targets.len()
            || self.calldatas.len() != self.targets.len()
        {
            return Err(ConfigError::MismatchedActions {
                targets: self.targets.len(),
                values: self.values.len(),
                signatures: self.signatures.len(),
                calldatas: self.calldatas.len(),
            });
        }
        if self.is_empty() {
            return Err(ConfigError::EmptyProposal);
        }
        Ok(())
    }

    /// Signature of the action at `index`, or an empty string.
    pub fn signature(&self, index: usize) -> &str {
        self.signatures.get(index).map(String::as_str).unwrap_or_default()
    }

    /// Sum of the native value sent by all actions.
    pub fn total_value(&self) -> U256 {
        self.values.iter().copied().fold(U256::ZERO, |acc, value| acc.saturating_add(value))
    }

    /// The calldata each target actually receives.
    ///
    /// For actions with a signature, the selector derived from the signature is prepended, which is
    /// what a Compound timelock does when executing.
    pub fn payloads(&self) -> Vec<Bytes> {
        self.calldatas
            .iter()
            .enumerate()
            .map(|(index, calldata)| match self.signature(index) {
                "" => calldata.clone(),
                signature => {
                    let selector = &keccak256(signature.as_bytes())[..4];
                    [selector, calldata.as_ref()].concat().into()
                }
            })
            .collect()
    }

    /// Iterates over `(target, value, payload)` triples.
    pub fn calls(&self) -> impl Iterator<Item = (Address, U256, Bytes)> + '_ {
        self.targets
            .iter()
            .zip(&self.values)
            .zip(self.payloads())
            .map(|((target, value), payload)| (*target, *value, payload))
    }
}

/// Configuration for a proposal that was already executed on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedConfig {
    /// The governor.
    #[serde(flatten)]
    pub governor: GovernorConfig,
    /// ID of the executed proposal.
    #[serde(with = "crate::serde::quantity")]
    pub proposal_id: U256,
}

/// Configuration for a proposal that was proposed on chain but not executed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedConfig {
    /// The governor.
    #[serde(flatten)]
    pub governor: GovernorConfig,
    /// ID of the proposal.
    #[serde(with = "crate::serde::quantity")]
    pub proposal_id: U256,
}

/// Configuration for a proposal that does not exist on chain yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConfig {
    /// The governor.
    #[serde(flatten)]
    pub governor: GovernorConfig,
    /// The proposal's actions.
    #[serde(flatten)]
    pub actions: ProposalActions,
    /// The proposal description.
    pub description: String,
}

impl NewConfig {
    /// `keccak256` of the description, as used by OZ governors.
    pub fn description_hash(&self) -> B256 {
        keccak256(self.description.as_bytes())
    }
}

/// Configuration for the L1 leg of an Arbitrum proposal.
///
/// The actions are the calls the L1 timelock executes once the L2 to L1 message of the parent
/// proposal has been relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbL2ToL1Config {
    /// The governor of the parent proposal.
    #[serde(flatten)]
    pub governor: GovernorConfig,
    /// The L1 actions.
    #[serde(flatten)]
    pub actions: ProposalActions,
    /// The proposal description.
    pub description: String,
    /// ID of the L2 proposal this message originates from.
    #[serde(with = "crate::serde::quantity")]
    pub parent_id: U256,
    /// Position of this message among the parent's cross-chain messages.
    #[serde(rename = "idoffset", with = "crate::serde::quantity")]
    pub id_offset: U256,
    /// Salt the batch was scheduled with, derived from the parent and offset if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
    /// Predecessor the batch was scheduled with, none if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<B256>,
}

/// Configuration for a retryable ticket redeemed on an Arbitrum chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbRetryableConfig {
    /// The governor of the parent proposal.
    #[serde(flatten)]
    pub governor: GovernorConfig,
    /// The single L2 call carried by the ticket.
    #[serde(flatten)]
    pub actions: ProposalActions,
    /// The proposal description.
    pub description: String,
    /// ID of the L2 proposal this ticket originates from.
    #[serde(with = "crate::serde::quantity")]
    pub parent_id: U256,
    /// Position of this ticket among the parent's cross-chain messages.
    #[serde(rename = "idoffset", with = "crate::serde::quantity")]
    pub id_offset: U256,
    /// Sender of the L2 call, the aliased L1 address that created the ticket.
    pub from: Address,
    /// The Arbitrum chain the ticket is redeemed on.
    pub chain_id: RetryableChain,
}

/// Arbitrum chains retryable tickets can be simulated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum RetryableChain {
    /// Arbitrum One.
    ArbOne,
    /// Arbitrum Nova.
    Nova,
}

impl RetryableChain {
    /// The chain ID.
    pub const fn chain_id(self) -> ChainId {
        match self {
            Self::ArbOne => ARB_ONE_CHAIN_ID,
            Self::Nova => ARB_NOVA_CHAIN_ID,
        }
    }
}

impl TryFrom<u64> for RetryableChain {
    type Error = String;

    fn try_from(chain_id: u64) -> Result<Self, Self::Error> {
        match chain_id {
            ARB_ONE_CHAIN_ID => Ok(Self::ArbOne),
            ARB_NOVA_CHAIN_ID => Ok(Self::Nova),
            other => Err(format!(
                "retryable chain must be {ARB_ONE_CHAIN_ID} or {ARB_NOVA_CHAIN_ID}, got {other}"
            )),
        }
    }
}

impl From<RetryableChain> for u64 {
    fn from(chain: RetryableChain) -> Self {
        chain.chain_id()
    }
}

/// The kind of a [`SimulationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationKind {
    /// See [`ExecutedConfig`].
    Executed,
    /// See [`ProposedConfig`].
    Proposed,
    /// See [`NewConfig`].
    New,
    /// See [`ArbL2ToL1Config`].
    ArbL2ToL1,
    /// See [`ArbRetryableConfig`].
    ArbRetryable,
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Executed => "executed",
            Self::Proposed => "proposed",
            Self::New => "new",
            Self::ArbL2ToL1 => "arbl2tol1",
            Self::ArbRetryable => "arbretryable",
        })
    }
}

/// A simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SimulationConfig {
    /// Resimulate an executed proposal.
    Executed(ExecutedConfig),
    /// Simulate execution of an on-chain proposal.
    Proposed(ProposedConfig),
    /// Simulate a proposal from explicit calldata.
    New(NewConfig),
    /// Simulate the L1 timelock leg of an Arbitrum proposal.
    #[serde(rename = "arbl2tol1")]
    ArbL2ToL1(ArbL2ToL1Config),
    /// Simulate a retryable ticket on an Arbitrum chain.
    #[serde(rename = "arbretryable")]
    ArbRetryable(ArbRetryableConfig),
}

impl SimulationConfig {
    /// Loads a configuration from a YAML or JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// The kind of this configuration.
    pub const fn kind(&self) -> SimulationKind {
        match self {
            Self::Executed(_) => SimulationKind::Executed,
            Self::Proposed(_) => SimulationKind::Proposed,
            Self::New(_) => SimulationKind::New,
            Self::ArbL2ToL1(_) => SimulationKind::ArbL2ToL1,
            Self::ArbRetryable(_) => SimulationKind::ArbRetryable,
        }
    }

    /// The governor fields.
    pub const fn governor(&self) -> &GovernorConfig {
        match self {
            Self::Executed(config) => &config.governor,
            Self::Proposed(config) => &config.governor,
            Self::New(config) => &config.governor,
            Self::ArbL2ToL1(config) => &config.governor,
            Self::ArbRetryable(config) => &config.governor,
        }
    }

    /// Name of the DAO.
    pub fn dao_name(&self) -> &str {
        &self.governor().dao_name
    }

    /// Address of the governor.
    pub const fn governor_address(&self) -> Address {
        self.governor().governor_address
    }

    /// Flavor of the governor.
    pub const fn governor_type(&self) -> GovernorType {
        self.governor().governor_type
    }

    /// The explicit actions, for the variants that carry them.
    pub const fn actions(&self) -> Option<&ProposalActions> {
        match self {
            Self::Executed(_) | Self::Proposed(_) => None,
            Self::New(config) => Some(&config.actions),
            Self::ArbL2ToL1(config) => Some(&config.actions),
            Self::ArbRetryable(config) => Some(&config.actions),
        }
    }

    /// The description, for the variants that carry one.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Executed(_) | Self::Proposed(_) => None,
            Self::New(config) => Some(&config.description),
            Self::ArbL2ToL1(config) => Some(&config.description),
            Self::ArbRetryable(config) => Some(&config.description),
        }
    }

    /// Checks the structural invariants of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(actions) = self.actions() {
            actions.validate()?;
        }
        if let Self::ArbRetryable(config) = self
            && config.actions.len() != 1
        {
            return Err(ConfigError::RetryableActionCount(config.actions.len()));
        }
        Ok(())
    }
}
