use super::{ProposalCheck, ProposalData};
use crate::{
    calldata::arbitrum::{L1Operation, UpgradeTarget, decode_round_trip},
    constants::{ARB_L1_TIMELOCK, ARB_L1_TIMELOCK_DELAY, ARB_SYS},
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{CheckResult, ProposalEvent},
};
use alloy::primitives::U256;
use async_trait::async_trait;

/// Decodes the L2 to L1 messages of Arbitrum proposals and describes what they schedule on L1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrumRoundTrip;

#[async_trait]
impl ProposalCheck for ArbitrumRoundTrip {
    fn id(&self) -> &'static str {
        "arb-round-trip"
    }

    fn name(&self) -> &'static str {
        "Decodes L2 to L1 messages"
    }

    async fn check_proposal(
        &self,
        proposal: &ProposalEvent,
        _sim: &TenderlySimulation,
        _deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        let mut result = CheckResult::default();
        let messages = proposal
            .targets
            .iter()
            .zip(&proposal.calldatas)
            .enumerate()
            .filter(|(_, (target, _))| **target == ARB_SYS);

        for (index, (_, calldata)) in messages {
            let round_trip = match decode_round_trip(calldata) {
                Ok(round_trip) => round_trip,
                Err(err) => {
                    result.errors.push(format!(
                        "Action {index} calls ArbSys but is not an L1 timelock batch: {err}"
                    ));
                    continue;
                }
            };

            if round_trip.destination != ARB_L1_TIMELOCK {
                result.warnings.push(format!(
                    "Action {index} sends its message to `{}`, not the L1 timelock",
                    round_trip.destination
                ));
            }
            let schedule = &round_trip.schedule;
            if schedule.delay < U256::from(ARB_L1_TIMELOCK_DELAY) {
                result.warnings.push(format!(
                    "Action {index} schedules with a delay of {}s, below the L1 timelock minimum \
                     of {ARB_L1_TIMELOCK_DELAY}s",
                    schedule.delay
                ));
            }
            result.info.push(format!(
                "Action {index} schedules {} operation(s) on L1 with salt `{}`, operation ID `{}`",
                schedule.operations.len(),
                schedule.salt,
                schedule.operation_id()
            ));

            for (op_index, operation) in schedule.operations.iter().enumerate() {
                let chain = match operation {
                    L1Operation::Call { .. } => Some(UpgradeTarget::L1),
                    L1Operation::Retryable(ticket) => ticket.chain(),
                };
                let Some(chain) = chain else {
                    result.warnings.push(format!(
                        "Operation {index}.{op_index} creates a retryable ticket through an \
                         unknown inbox"
                    ));
                    continue;
                };

                let executor = chain.upgrade_executor();
                let target = match operation {
                    L1Operation::Call { target, .. } => *target,
                    L1Operation::Retryable(ticket) => ticket.l2_target,
                };
                match operation.upgrade_action() {
                    Some(action) if target == executor => result.info.push(format!(
                        "Operation {index}.{op_index} runs action `{action}` through the upgrade \
                         executor on chain {}",
                        chain.chain_id()
                    )),
                    _ => result.warnings.push(format!(
                        "Operation {index}.{op_index} calls `{target}` on chain {} outside the \
                         upgrade executor",
                        chain.chain_id()
                    )),
                }
            }
        }

        if result.info.is_empty() && result.warnings.is_empty() && result.errors.is_empty() {
            result.info.push("No L2 to L1 messages".to_string());
        }
        Ok(result)
    }
}
