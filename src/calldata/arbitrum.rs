//! Calldata of the Arbitrum governance round trip.
//!
//! A non-emergency Arbitrum proposal is executed by the L2 core timelock as a single call to
//! `ArbSys.sendTxToL1(l1Timelock, scheduleBatch(...))`. Once the message is relayed, the L1
//! timelock executes each scheduled operation. Operations whose target is
//! [`RETRYABLE_TICKET_MAGIC`] are turned into retryable tickets through the inbox given in their
//! payload; everything else is called directly on L1. On every chain the final call is an upgrade
//! executor running `execute(action, perform())`.

use crate::{
    constants::{
        ARB_L1_TIMELOCK, ARB_L1_TIMELOCK_DELAY, ARB_L1_UPGRADE_EXECUTOR, ARB_NOVA_CHAIN_ID,
        ARB_NOVA_INBOX, ARB_NOVA_UPGRADE_EXECUTOR, ARB_ONE_CHAIN_ID, ARB_ONE_INBOX,
        ARB_ONE_UPGRADE_EXECUTOR, MAINNET_CHAIN_ID, RETRYABLE_TICKET_MAGIC,
    },
    types::{ITimelockController, ProposalActions, hash_operation_batch},
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U160, U256, address},
    sol,
    sol_types::{SolCall, SolValue},
};
use serde::{Deserialize, Serialize};

sol! {
    #[derive(Debug)]
    interface IArbSys {
        function sendTxToL1(address destination, bytes data) external payable returns (uint256);
    }

    #[derive(Debug)]
    interface IUpgradeExecutor {
        function execute(address upgrade, bytes upgradeCallData) external payable;
    }

    #[derive(Debug)]
    interface IGovernanceAction {
        function perform() external;
    }
}

/// Offset added to an L1 contract's address when it sends a message to L2.
const L1_TO_L2_ALIAS_OFFSET: Address = address!("0x1111000000000000000000000000000000001111");

/// Sender an L2 call originating from `l1_address` appears to come from.
pub fn apply_l1_to_l2_alias(l1_address: Address) -> Address {
    let aliased = U160::from_be_bytes(l1_address.0.0)
        .wrapping_add(U160::from_be_bytes(L1_TO_L2_ALIAS_OFFSET.0.0));
    Address::from(aliased.to_be_bytes::<20>())
}

/// `ArbSys.sendTxToL1(destination, data)`.
pub fn send_tx_to_l1(destination: Address, data: Bytes) -> Bytes {
    IArbSys::sendTxToL1Call { destination, data }.abi_encode().into()
}

/// `TimelockController.scheduleBatch(...)`.
pub fn schedule_batch(
    targets: Vec<Address>,
    values: Vec<U256>,
    payloads: Vec<Bytes>,
    predecessor: B256,
    salt: B256,
    delay: U256,
) -> Bytes {
    ITimelockController::scheduleBatchCall { targets, values, payloads, predecessor, salt, delay }
        .abi_encode()
        .into()
}

/// Payload of a scheduled operation the L1 timelock turns into a retryable ticket.
pub fn retryable_payload(
    inbox: Address,
    l2_target: Address,
    l2_value: U256,
    gas_limit: U256,
    max_fee_per_gas: U256,
    l2_calldata: Bytes,
) -> Bytes {
    (inbox, l2_target, l2_value, gas_limit, max_fee_per_gas, l2_calldata).abi_encode_params().into()
}

/// `UpgradeExecutor.execute(action, perform())`.
pub fn upgrade_executor_execute(action: Address) -> Bytes {
    IUpgradeExecutor::executeCall {
        upgrade: action,
        upgradeCallData: IGovernanceAction::performCall {}.abi_encode().into(),
    }
    .abi_encode()
    .into()
}

/// Chain an upgrade action executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeTarget {
    /// Ethereum mainnet.
    L1,
    /// Arbitrum One.
    ArbOne,
    /// Arbitrum Nova.
    Nova,
}

impl UpgradeTarget {
    /// Chain ID of the target chain.
    pub const fn chain_id(self) -> ChainId {
        match self {
            Self::L1 => MAINNET_CHAIN_ID,
            Self::ArbOne => ARB_ONE_CHAIN_ID,
            Self::Nova => ARB_NOVA_CHAIN_ID,
        }
    }

    /// Delayed inbox on mainnet, `None` for L1.
    pub const fn inbox(self) -> Option<Address> {
        match self {
            Self::L1 => None,
            Self::ArbOne => Some(ARB_ONE_INBOX),
            Self::Nova => Some(ARB_NOVA_INBOX),
        }
    }

    /// The upgrade executor on the target chain.
    pub const fn upgrade_executor(self) -> Address {
        match self {
            Self::L1 => ARB_L1_UPGRADE_EXECUTOR,
            Self::ArbOne => ARB_ONE_UPGRADE_EXECUTOR,
            Self::Nova => ARB_NOVA_UPGRADE_EXECUTOR,
        }
    }

    /// The L2 chain a retryable ticket created through `inbox` is redeemed on.
    pub fn from_inbox(inbox: Address) -> Option<Self> {
        if inbox == ARB_ONE_INBOX {
            Some(Self::ArbOne)
        } else if inbox == ARB_NOVA_INBOX {
            Some(Self::Nova)
        } else {
            None
        }
    }
}

/// Builds the calldata of a non-emergency Security Council or DAO upgrade.
///
/// ```
/// use alloy::primitives::{B256, address};
/// use govsim::calldata::arbitrum::{NonEmergencyUpgrade, UpgradeTarget};
///
/// let calldata = NonEmergencyUpgrade::new(B256::ZERO)
///     .with_action(UpgradeTarget::ArbOne, address!("0x36d0170d92f66e8949eb276c3ac4fea64f83704d"))
///     .build();
/// assert_eq!(&calldata[..4], &[0x92, 0x8c, 0x16, 0x9a]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmergencyUpgrade {
    actions: Vec<(UpgradeTarget, Address)>,
    predecessor: B256,
    salt: B256,
    delay: U256,
}

impl NonEmergencyUpgrade {
    /// Creates an upgrade without actions, scheduled with `salt` and the L1 timelock's delay.
    pub fn new(salt: B256) -> Self {
        Self {
            actions: Vec::new(),
            predecessor: B256::ZERO,
            salt,
            delay: U256::from(ARB_L1_TIMELOCK_DELAY),
        }
    }

    /// Adds an action contract executed on `target`.
    pub fn with_action(mut self, target: UpgradeTarget, action: Address) -> Self {
        self.actions.push((target, action));
        self
    }

    /// Sets the predecessor operation.
    pub const fn with_predecessor(mut self, predecessor: B256) -> Self {
        self.predecessor = predecessor;
        self
    }

    /// Sets the scheduling delay.
    pub const fn with_delay(mut self, delay: U256) -> Self {
        self.delay = delay;
        self
    }

    /// The L1 timelock batch.
    pub fn schedule(&self) -> L1Schedule {
        let operations = self
            .actions
            .iter()
            .map(|(target, action)| match target.inbox() {
                None => L1Operation::Call {
                    target: target.upgrade_executor(),
                    value: U256::ZERO,
                    data: upgrade_executor_execute(*action),
                },
                Some(inbox) => L1Operation::Retryable(RetryableTicket {
                    l1_value: U256::ZERO,
                    inbox,
                    l2_target: target.upgrade_executor(),
                    l2_value: U256::ZERO,
                    gas_limit: U256::ZERO,
                    max_fee_per_gas: U256::ZERO,
                    data: upgrade_executor_execute(*action),
                }),
            })
            .collect();
        L1Schedule { predecessor: self.predecessor, salt: self.salt, delay: self.delay, operations }
    }

    /// Calldata for `ArbSys`, executed by the L2 core timelock.
    pub fn build(&self) -> Bytes {
        send_tx_to_l1(ARB_L1_TIMELOCK, self.schedule().encode())
    }
}

/// A retryable ticket created by the L1 timelock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryableTicket {
    /// Value the timelock attaches to the operation, paying for submission and L2 gas.
    #[serde(default)]
    pub l1_value: U256,
    /// Inbox the ticket is created through.
    pub inbox: Address,
    /// Target of the L2 call.
    pub l2_target: Address,
    /// Value of the L2 call.
    pub l2_value: U256,
    /// L2 gas limit, zero to let anyone redeem it with a chosen limit.
    pub gas_limit: U256,
    /// L2 max fee per gas.
    pub max_fee_per_gas: U256,
    /// Calldata of the L2 call.
    pub data: Bytes,
}

impl RetryableTicket {
    /// The chain the ticket is redeemed on, if the inbox is known.
    pub fn chain(&self) -> Option<UpgradeTarget> {
        UpgradeTarget::from_inbox(self.inbox)
    }

    fn encode(&self) -> Bytes {
        retryable_payload(
            self.inbox,
            self.l2_target,
            self.l2_value,
            self.gas_limit,
            self.max_fee_per_gas,
            self.data.clone(),
        )
    }
}

/// An operation of an L1 timelock batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum L1Operation {
    /// Forwarded to an Arbitrum chain as a retryable ticket.
    Retryable(RetryableTicket),
    /// Called on L1.
    Call {
        /// Target.
        target: Address,
        /// Value.
        value: U256,
        /// Calldata.
        data: Bytes,
    },
}

impl L1Operation {
    /// Target as seen by the timelock.
    pub const fn target(&self) -> Address {
        match self {
            Self::Retryable(_) => RETRYABLE_TICKET_MAGIC,
            Self::Call { target, .. } => *target,
        }
    }

    /// Value as seen by the timelock.
    pub fn value(&self) -> U256 {
        match self {
            Self::Retryable(ticket) => ticket.l1_value,
            Self::Call { value, .. } => *value,
        }
    }

    /// Payload as seen by the timelock.
    pub fn payload(&self) -> Bytes {
        match self {
            Self::Retryable(ticket) => ticket.encode(),
            Self::Call { data, .. } => data.clone(),
        }
    }

    /// Calldata of the final call on the executing chain.
    pub const fn final_calldata(&self) -> &Bytes {
        match self {
            Self::Retryable(ticket) => &ticket.data,
            Self::Call { data, .. } => data,
        }
    }

    /// The action contract, if the final call is an upgrade executor `execute(action, perform())`.
    pub fn upgrade_action(&self) -> Option<Address> {
        let call = IUpgradeExecutor::executeCall::abi_decode(self.final_calldata()).ok()?;
        IGovernanceAction::performCall::abi_decode(&call.upgradeCallData).ok()?;
        Some(call.upgrade)
    }
}

/// A batch scheduled on the L1 timelock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1Schedule {
    /// Predecessor operation, zero for none.
    pub predecessor: B256,
    /// Salt of the batch.
    pub salt: B256,
    /// Scheduling delay in seconds.
    pub delay: U256,
    /// The operations.
    pub operations: Vec<L1Operation>,
}

impl L1Schedule {
    /// `scheduleBatch` calldata of the batch.
    pub fn encode(&self) -> Bytes {
        let actions = self.actions();
        schedule_batch(
            actions.targets,
            actions.values,
            actions.calldatas,
            self.predecessor,
            self.salt,
            self.delay,
        )
    }

    /// The batch as timelock actions.
    pub fn actions(&self) -> ProposalActions {
        ProposalActions {
            targets: self.operations.iter().map(L1Operation::target).collect(),
            values: self.operations.iter().map(L1Operation::value).collect(),
            signatures: vec![String::new(); self.operations.len()],
            calldatas: self.operations.iter().map(L1Operation::payload).collect(),
        }
    }

    /// Operation ID the timelock tracks the batch under.
    pub fn operation_id(&self) -> B256 {
        let actions = self.actions();
        hash_operation_batch(
            &actions.targets,
            &actions.values,
            &actions.calldatas,
            self.predecessor,
            self.salt,
        )
    }
}

/// A decoded `sendTxToL1(destination, scheduleBatch(...))` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// L1 recipient of the message.
    pub destination: Address,
    /// The scheduled batch.
    pub schedule: L1Schedule,
}

/// Decodes `ArbSys.sendTxToL1` calldata carrying an L1 timelock `scheduleBatch`.
pub fn decode_round_trip(calldata: &[u8]) -> Result<RoundTrip, alloy::sol_types::Error> {
    let message = IArbSys::sendTxToL1Call::abi_decode(calldata)?;
    let batch = ITimelockController::scheduleBatchCall::abi_decode(&message.data)?;

    let operations = batch
        .targets
        .iter()
        .zip(&batch.values)
        .zip(&batch.payloads)
        .map(|((target, value), payload)| decode_operation(*target, *value, payload))
        .collect::<Result<_, _>>()?;

    Ok(RoundTrip {
        destination: message.destination,
        schedule: L1Schedule {
            predecessor: batch.predecessor,
            salt: batch.salt,
            delay: batch.delay,
            operations,
        },
    })
}

fn decode_operation(
    target: Address,
    value: U256,
    payload: &Bytes,
) -> Result<L1Operation, alloy::sol_types::Error> {
    if target != RETRYABLE_TICKET_MAGIC {
        return Ok(L1Operation::Call { target, value, data: payload.clone() });
    }
    let (inbox, l2_target, l2_value, gas_limit, max_fee_per_gas, data) =
        <(Address, Address, U256, U256, U256, Bytes)>::abi_decode_params(payload)?;
    Ok(L1Operation::Retryable(RetryableTicket {
        l1_value: value,
        inbox,
        l2_target,
        l2_value,
        gas_limit,
        max_fee_per_gas,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{b256, bytes};

    const ACTION: Address = address!("0x36d0170d92f66e8949eb276c3ac4fea64f83704d");

    #[test]
    fn selectors() {
        assert_eq!(IArbSys::sendTxToL1Call::SELECTOR, [0x92, 0x8c, 0x16, 0x9a]);
        assert_eq!(ITimelockController::scheduleBatchCall::SELECTOR, [0x8f, 0x2a, 0x0b, 0xb0]);
        assert_eq!(IUpgradeExecutor::executeCall::SELECTOR, [0x1c, 0xff, 0x79, 0xcd]);
        assert_eq!(IGovernanceAction::performCall::SELECTOR, [0xb1, 0x47, 0xf4, 0x0c]);
    }

    #[test]
    fn executes_perform() {
        let data = upgrade_executor_execute(ACTION);
        assert_eq!(data.len(), 4 + 32 * 4);
        let call = IUpgradeExecutor::executeCall::abi_decode(&data).unwrap();
        assert_eq!(call.upgrade, ACTION);
        assert_eq!(call.upgradeCallData, bytes!("b147f40c"));
    }

    #[test]
    fn aliases_l1_sender() {
        assert_eq!(
            apply_l1_to_l2_alias(address!("0x0000000000000000000000000000000000000001")),
            address!("0x1111000000000000000000000000000000001112")
        );
        // wraps around
        assert_eq!(
            apply_l1_to_l2_alias(address!("0xffffffffffffffffffffffffffffffffffffffff")),
            address!("0x1111000000000000000000000000000000001110")
        );
    }

    #[test]
    fn round_trip_decodes_builder_output() {
        let salt = b256!("0x00000000000000000000000000000000000000000000000000000000000000aa");
        let upgrade = NonEmergencyUpgrade::new(salt)
            .with_action(UpgradeTarget::ArbOne, ACTION)
            .with_action(UpgradeTarget::Nova, ACTION)
            .with_action(UpgradeTarget::L1, ACTION);

        let decoded = decode_round_trip(&upgrade.build()).unwrap();
        assert_eq!(decoded.destination, ARB_L1_TIMELOCK);
        assert_eq!(decoded.schedule, upgrade.schedule());
        assert_eq!(decoded.schedule.delay, U256::from(ARB_L1_TIMELOCK_DELAY));

        let chains = decoded
            .schedule
            .operations
            .iter()
            .map(|op| match op {
                L1Operation::Retryable(ticket) => ticket.chain(),
                L1Operation::Call { .. } => Some(UpgradeTarget::L1),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            chains,
            [Some(UpgradeTarget::ArbOne), Some(UpgradeTarget::Nova), Some(UpgradeTarget::L1)]
        );
        assert!(decoded.schedule.operations.iter().all(|op| op.upgrade_action() == Some(ACTION)));
        assert_eq!(decoded.schedule.operations[2].target(), ARB_L1_UPGRADE_EXECUTOR);
    }

    #[test]
    fn round_trip_keeps_batch_values() {
        let fee = U256::from(10_000_000_000_000_000u64);
        let predecessor =
            b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let mut schedule = NonEmergencyUpgrade::new(B256::with_last_byte(7))
            .with_predecessor(predecessor)
            .with_action(UpgradeTarget::ArbOne, ACTION)
            .schedule();
        let L1Operation::Retryable(ticket) = &mut schedule.operations[0] else {
            panic!("expected a retryable ticket")
        };
        ticket.l1_value = fee;
        ticket.l2_value = U256::from(1);

        let calldata = send_tx_to_l1(ARB_L1_TIMELOCK, schedule.encode());
        let decoded = decode_round_trip(&calldata).unwrap();
        assert_eq!(decoded.schedule, schedule);
        assert_eq!(decoded.schedule.predecessor, predecessor);

        let actions = decoded.schedule.actions();
        assert_eq!(actions.values, [fee]);
        assert_eq!(
            decoded.schedule.operation_id(),
            hash_operation_batch(
                &actions.targets,
                &[fee],
                &actions.calldatas,
                predecessor,
                B256::with_last_byte(7)
            )
        );
    }

    #[test]
    fn rejects_other_calldata() {
        assert!(decode_round_trip(&upgrade_executor_execute(ACTION)).is_err());
        assert!(decode_round_trip(&[]).is_err());
    }

    #[test]
    fn operation_id_tracks_salt() {
        let a = NonEmergencyUpgrade::new(B256::ZERO).with_action(UpgradeTarget::ArbOne, ACTION);
        let b = NonEmergencyUpgrade::new(B256::with_last_byte(1))
            .with_action(UpgradeTarget::ArbOne, ACTION);
        assert_ne!(a.schedule().operation_id(), b.schedule().operation_id());
    }
}
