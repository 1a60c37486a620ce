//! Storage overrides that make a proposal executable in the simulated block.
//!
//! Overrides are written as variable expressions and encoded into slots by Tenderly, so the keys
//! follow the storage layout of the governor and timelock sources.

use crate::{
    constants::DEFAULT_FROM,
    tenderly::StorageEncodingRequest,
    types::{BlockInfo, GovernorType, ProposalActions, bravo_tx_hash, hash_operation_batch},
};
use alloy::primitives::{Address, B256, U256};

/// Block and timestamp the simulated transaction executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationPosition {
    /// Block number.
    pub block: u64,
    /// Block timestamp.
    pub timestamp: u64,
}

impl SimulationPosition {
    /// The block right after `latest`.
    pub const fn after(latest: &BlockInfo) -> Self {
        Self { block: latest.number + 1, timestamp: latest.timestamp + 1 }
    }

    /// ETA of the queued proposal, reached exactly at the simulated block.
    pub fn eta(&self) -> U256 {
        U256::from(self.timestamp)
    }

    /// Voting window of the proposal, closed before the simulated block.
    ///
    /// Arbitrum governors count in L1 blocks, which the simulated header does not move, so their
    /// window is pinned to the first blocks of the chain.
    pub const fn voting_window(&self, kind: GovernorType) -> (u64, u64) {
        match kind {
            GovernorType::Bravo => (self.block.saturating_sub(100), self.block.saturating_sub(1)),
            GovernorType::Oz => (self.block.saturating_sub(2), self.block.saturating_sub(1)),
            GovernorType::Arb => (1, 2),
        }
    }
}

/// Everything needed to mark a proposal as passed and queued.
#[derive(Debug, Clone, Copy)]
pub struct QueuedProposal<'a> {
    /// The governor.
    pub governor: Address,
    /// The governor's timelock.
    pub timelock: Address,
    /// Flavor of the governor.
    pub kind: GovernorType,
    /// ID of the proposal.
    pub id: U256,
    /// The proposal's actions.
    pub actions: &'a ProposalActions,
    /// Hash of the description, used by OZ governors.
    pub description_hash: B256,
    /// Votes in favor, the voting token's supply so quorum is met.
    pub votes: U256,
}

impl QueuedProposal<'_> {
    /// Adds the overrides for the governor's flavor.
    pub fn apply(&self, request: &mut StorageEncodingRequest, position: &SimulationPosition) {
        match self.kind {
            GovernorType::Bravo => self.apply_bravo(request, position),
            GovernorType::Oz | GovernorType::Arb => self.apply_oz(request, position),
        }
    }

    fn apply_bravo(&self, request: &mut StorageEncodingRequest, position: &SimulationPosition) {
        let (start, end) = position.voting_window(self.kind);
        let eta = position.eta();
        let proposal = format!("proposals[{}]", self.id);

        request.set(self.governor, "proposalCount", self.id.to_string());
        for (field, value) in [
            ("id", self.id.to_string()),
            ("proposer", DEFAULT_FROM.to_string()),
            ("eta", eta.to_string()),
            ("startBlock", start.to_string()),
            ("endBlock", end.to_string()),
            ("canceled", false.to_string()),
            ("executed", false.to_string()),
            ("forVotes", self.votes.to_string()),
            ("againstVotes", "0".to_string()),
            ("abstainVotes", "0".to_string()),
            ("targets.length", self.actions.len().to_string()),
            ("values.length", self.actions.len().to_string()),
            ("signatures.length", self.actions.len().to_string()),
            ("calldatas.length", self.actions.len().to_string()),
        ] {
            request.set(self.governor, format!("{proposal}.{field}"), value);
        }

        let actions = self.actions;
        for (index, ((target, value), calldata)) in
            actions.targets.iter().zip(&actions.values).zip(&actions.calldatas).enumerate()
        {
            let signature = actions.signature(index);
            request.set(self.governor, format!("{proposal}.targets[{index}]"), target.to_string());
            request.set(self.governor, format!("{proposal}.values[{index}]"), value.to_string());
            request.set(self.governor, format!("{proposal}.signatures[{index}]"), signature);
            let calldata_key = format!("{proposal}.calldatas[{index}]");
            request.set(self.governor, calldata_key, calldata.to_string());

            let hash = bravo_tx_hash(*target, *value, signature, calldata, eta);
            request.set(self.timelock, format!("queuedTransactions[{hash}]"), true.to_string());
        }
    }

    fn apply_oz(&self, request: &mut StorageEncodingRequest, position: &SimulationPosition) {
        let (start, end) = position.voting_window(self.kind);
        let operation = self.timelock_operation_id();
        let id = self.id;

        for (key, value) in [
            (format!("_proposals[{id}].voteStart._deadline"), start.to_string()),
            (format!("_proposals[{id}].voteEnd._deadline"), end.to_string()),
            (format!("_proposals[{id}].canceled"), false.to_string()),
            (format!("_proposals[{id}].executed"), false.to_string()),
            (format!("_proposalVotes[{id}].forVotes"), self.votes.to_string()),
            (format!("_proposalVotes[{id}].againstVotes"), "0".to_string()),
            (format!("_proposalVotes[{id}].abstainVotes"), "0".to_string()),
            (format!("_timelockIds[{id}]"), operation.to_string()),
        ] {
            request.set(self.governor, key, value);
        }
        mark_operation_ready(request, self.timelock, operation, position);
    }

    /// Operation ID the governor queued the proposal under.
    ///
    /// OZ governors schedule the calldatas as-is, with no predecessor and the description hash as
    /// salt.
    pub fn timelock_operation_id(&self) -> B256 {
        hash_operation_batch(
            &self.actions.targets,
            &self.actions.values,
            &self.actions.calldatas,
            B256::ZERO,
            self.description_hash,
        )
    }
}

/// Marks a `TimelockController` operation as scheduled and ready at `position`.
pub fn mark_operation_ready(
    request: &mut StorageEncodingRequest,
    timelock: Address,
    operation: B256,
    position: &SimulationPosition,
) {
    request.set(timelock, format!("_timestamps[{operation}]"), position.timestamp.to_string());
}
