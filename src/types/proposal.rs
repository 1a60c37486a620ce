use crate::types::{ProposalActions, ProposalCreated};
use alloy::primitives::{Address, B256, Bytes, ChainId, U256};
use serde::{Deserialize, Serialize};

/// On-chain state of a proposal.
///
/// Bravo governors track proposals by block, OZ governors by their snapshot and deadline, so the
/// window fields are governor specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalStruct {
    /// Proposal ID.
    pub id: U256,
    /// Proposer, only exposed by Bravo governors.
    pub proposer: Option<Address>,
    /// Timestamp after which the proposal can be executed, zero if not queued.
    pub eta: U256,
    /// Compound governor.
    pub start_block: Option<U256>,
    /// OZ governor.
    pub start_time: Option<U256>,
    /// Compound governor.
    pub end_block: Option<U256>,
    /// OZ governor.
    pub end_time: Option<U256>,
    /// Votes in favor.
    pub for_votes: U256,
    /// Votes against.
    pub against_votes: U256,
    /// Abstaining votes.
    pub abstain_votes: U256,
    /// Whether the proposal was canceled.
    pub canceled: bool,
    /// Whether the proposal was executed.
    pub executed: bool,
}

/// A proposal as announced by its `ProposalCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEvent {
    /// Proposal ID.
    #[serde(with = "crate::serde::quantity")]
    pub id: U256,
    /// Account that created the proposal.
    pub proposer: Address,
    /// Start of voting.
    #[serde(with = "crate::serde::quantity")]
    pub start_block: U256,
    /// End of voting.
    #[serde(with = "crate::serde::quantity")]
    pub end_block: U256,
    /// Proposal description.
    pub description: String,
    /// Call targets.
    pub targets: Vec<Address>,
    /// Native value sent with each call.
    #[serde(with = "crate::serde::quantity::vec")]
    pub values: Vec<U256>,
    /// Function signatures.
    pub signatures: Vec<String>,
    /// Calldata of each call.
    pub calldatas: Vec<Bytes>,
    /// Chain the proposal executes on.
    #[serde(rename = "chainid")]
    pub chain_id: ChainId,
}

impl ProposalEvent {
    /// Builds a [`ProposalEvent`] from a decoded `ProposalCreated` log.
    pub fn from_created(event: ProposalCreated, chain_id: ChainId) -> Self {
        Self {
            id: event.id,
            proposer: event.proposer,
            start_block: event.startBlock,
            end_block: event.endBlock,
            description: event.description,
            targets: event.targets,
            values: event.values,
            signatures: event.signatures,
            calldatas: event.calldatas,
            chain_id,
        }
    }

    /// The proposal's actions.
    pub fn actions(&self) -> ProposalActions {
        ProposalActions {
            targets: self.targets.clone(),
            values: self.values.clone(),
            signatures: self.signatures.clone(),
            calldatas: self.calldatas.clone(),
        }
    }
}

/// The block a simulation was positioned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block timestamp.
    pub timestamp: u64,
    /// Block hash.
    pub hash: B256,
}
