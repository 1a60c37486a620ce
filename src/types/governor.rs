//! Governor and timelock bindings.

use crate::types::{ProposalActions, ProposalStruct};
use alloy::{
    primitives::{Address, B256, Bytes, U256, keccak256},
    providers::Provider,
    sol,
    sol_types::SolValue,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

sol! {
    /// `ProposalCreated` as emitted by Bravo and OZ governors alike.
    #[derive(Debug)]
    event ProposalCreated(
        uint256 id,
        address proposer,
        address[] targets,
        uint256[] values,
        string[] signatures,
        bytes[] calldatas,
        uint256 startBlock,
        uint256 endBlock,
        string description
    );

    /// `ProposalExecuted` as emitted by Bravo and OZ governors alike.
    #[derive(Debug)]
    event ProposalExecuted(uint256 id);

    #[sol(rpc)]
    #[derive(Debug)]
    interface IGovernorBravo {
        function proposalCount() external view returns (uint256);
        function timelock() external view returns (address);
        function comp() external view returns (address);
        function proposals(uint256 proposalId) external view returns (
            uint256 id,
            address proposer,
            uint256 eta,
            uint256 startBlock,
            uint256 endBlock,
            uint256 forVotes,
            uint256 againstVotes,
            uint256 abstainVotes,
            bool canceled,
            bool executed
        );
        function execute(uint256 proposalId) external payable;
    }

    #[sol(rpc)]
    #[derive(Debug)]
    interface IGovernorOz {
        function timelock() external view returns (address);
        function token() external view returns (address);
        function proposalSnapshot(uint256 proposalId) external view returns (uint256);
        function proposalDeadline(uint256 proposalId) external view returns (uint256);
        function proposalEta(uint256 proposalId) external view returns (uint256);
        function proposalVotes(uint256 proposalId) external view returns (
            uint256 againstVotes,
            uint256 forVotes,
            uint256 abstainVotes
        );
        function state(uint256 proposalId) external view returns (uint8);
        function execute(
            address[] targets,
            uint256[] values,
            bytes[] calldatas,
            bytes32 descriptionHash
        ) external payable returns (uint256);
    }

    #[sol(rpc)]
    #[derive(Debug)]
    interface ITimelockController {
        function getMinDelay() external view returns (uint256);
        function scheduleBatch(
            address[] targets,
            uint256[] values,
            bytes[] payloads,
            bytes32 predecessor,
            bytes32 salt,
            uint256 delay
        ) external;
        function executeBatch(
            address[] targets,
            uint256[] values,
            bytes[] payloads,
            bytes32 predecessor,
            bytes32 salt
        ) external payable;
    }

    #[sol(rpc)]
    #[derive(Debug)]
    interface IVotesToken {
        function totalSupply() external view returns (uint256);
    }
}

/// Flavor of governor contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernorType {
    /// OpenZeppelin governor with a `TimelockController`.
    Oz,
    /// Compound `GovernorBravo` with a Compound timelock.
    Bravo,
    /// Arbitrum DAO governors, OZ based with upgradeable storage.
    Arb,
}

impl GovernorType {
    /// Whether the governor uses OZ storage and hashing.
    pub const fn is_oz_like(self) -> bool {
        matches!(self, Self::Oz | Self::Arb)
    }
}

impl fmt::Display for GovernorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Oz => "oz",
            Self::Bravo => "bravo",
            Self::Arb => "arb",
        })
    }
}

/// Proposal ID of an OZ governor: `keccak256(abi.encode(targets, values, calldatas, descHash))`.
pub fn hash_proposal(actions: &ProposalActions, description_hash: B256) -> U256 {
    let encoded = (
        actions.targets.clone(),
        actions.values.clone(),
        actions.calldatas.clone(),
        description_hash,
    )
        .abi_encode_params();
    U256::from_be_bytes(keccak256(encoded).0)
}

/// Operation ID of a `TimelockController` batch.
pub fn hash_operation_batch(
    targets: &[Address],
    values: &[U256],
    payloads: &[Bytes],
    predecessor: B256,
    salt: B256,
) -> B256 {
    let encoded = (targets.to_vec(), values.to_vec(), payloads.to_vec(), predecessor, salt)
        .abi_encode_params();
    keccak256(encoded)
}

/// Hash under which a Compound timelock tracks a queued transaction.
pub fn bravo_tx_hash(
    target: Address,
    value: U256,
    signature: &str,
    data: &Bytes,
    eta: U256,
) -> B256 {
    keccak256((target, value, signature.to_string(), data.clone(), eta).abi_encode_params())
}

/// A governor bound to a provider.
#[derive(Debug, Clone)]
pub struct Governor<P> {
    address: Address,
    kind: GovernorType,
    provider: P,
}

impl<P: Provider> Governor<P> {
    /// Creates a new [`Governor`].
    pub const fn new(address: Address, kind: GovernorType, provider: P) -> Self {
        Self { address, kind, provider }
    }

    /// Address of the governor.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Flavor of the governor.
    pub const fn kind(&self) -> GovernorType {
        self.kind
    }

    /// The timelock executing the governor's proposals.
    pub async fn timelock(&self) -> Result<Address, alloy::contract::Error> {
        if self.kind.is_oz_like() {
            IGovernorOz::new(self.address, &self.provider).timelock().call().await
        } else {
            IGovernorBravo::new(self.address, &self.provider).timelock().call().await
        }
    }

    /// The voting token, if the governor exposes it.
    pub async fn voting_token(&self) -> Result<Address, alloy::contract::Error> {
        if self.kind.is_oz_like() {
            IGovernorOz::new(self.address, &self.provider).token().call().await
        } else {
            IGovernorBravo::new(self.address, &self.provider).comp().call().await
        }
    }

    /// Total supply of the voting token.
    ///
    /// Used as the vote count of simulated proposals, so quorum is always met.
    pub async fn voting_supply(&self) -> Result<U256, alloy::contract::Error> {
        let token = self.voting_token().await?;
        let supply = IVotesToken::new(token, &self.provider).totalSupply().call().await?;
        debug!(%token, %supply, "Fetched voting supply");
        Ok(supply)
    }

    /// Number of proposals created on a Bravo governor.
    pub async fn proposal_count(&self) -> Result<U256, alloy::contract::Error> {
        IGovernorBravo::new(self.address, &self.provider).proposalCount().call().await
    }

    /// The ID a new proposal with these actions gets.
    ///
    /// Bravo governors number proposals sequentially, OZ governors hash them.
    pub async fn proposal_id(
        &self,
        actions: &ProposalActions,
        description_hash: B256,
    ) -> Result<U256, alloy::contract::Error> {
        if self.kind.is_oz_like() {
            Ok(hash_proposal(actions, description_hash))
        } else {
            Ok(self.proposal_count().await? + U256::from(1))
        }
    }

    /// Reads the on-chain state of a proposal.
    pub async fn proposal(&self, id: U256) -> Result<ProposalStruct, alloy::contract::Error> {
        if self.kind.is_oz_like() {
            let governor = IGovernorOz::new(self.address, &self.provider);
            let snapshot = governor.proposalSnapshot(id).call().await?;
            let deadline = governor.proposalDeadline(id).call().await?;
            let eta = governor.proposalEta(id).call().await?;
            let votes = governor.proposalVotes(id).call().await?;
            // 2 = Canceled, 7 = Executed
            let state = governor.state(id).call().await?;
            Ok(ProposalStruct {
                id,
                proposer: None,
                eta,
                start_block: None,
                start_time: Some(snapshot),
                end_block: None,
                end_time: Some(deadline),
                for_votes: votes.forVotes,
                against_votes: votes.againstVotes,
                abstain_votes: votes.abstainVotes,
                canceled: state == 2,
                executed: state == 7,
            })
        } else {
            let proposal =
                IGovernorBravo::new(self.address, &self.provider).proposals(id).call().await?;
            Ok(ProposalStruct {
                id: proposal.id,
                proposer: Some(proposal.proposer),
                eta: proposal.eta,
                start_block: Some(proposal.startBlock),
                start_time: None,
                end_block: Some(proposal.endBlock),
                end_time: None,
                for_votes: proposal.forVotes,
                against_votes: proposal.againstVotes,
                abstain_votes: proposal.abstainVotes,
                canceled: proposal.canceled,
                executed: proposal.executed,
            })
        }
    }
}

/// Calldata executing a queued proposal through its governor.
pub fn execute_calldata(
    kind: GovernorType,
    id: U256,
    actions: &ProposalActions,
    description_hash: B256,
) -> Bytes {
    use alloy::sol_types::SolCall;

    if kind.is_oz_like() {
        IGovernorOz::executeCall {
            targets: actions.targets.clone(),
            values: actions.values.clone(),
            calldatas: actions.calldatas.clone(),
            descriptionHash: description_hash,
        }
        .abi_encode()
        .into()
    } else {
        IGovernorBravo::executeCall { proposalId: id }.abi_encode().into()
    }
}
