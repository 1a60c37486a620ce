use super::{ProposalCheck, ProposalData};
use crate::{
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{CheckResult, Governor, ProposalEvent},
};
use alloy::providers::Provider;
use async_trait::async_trait;

/// Reports the proposal's state on the live governor.
///
/// Follow-up simulations run on a chain without the governor and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnChainProposalState;

#[async_trait]
impl ProposalCheck for OnChainProposalState {
    fn id(&self) -> &'static str {
        "proposal-state"
    }

    fn name(&self) -> &'static str {
        "Proposal state on the governor"
    }

    async fn check_proposal(
        &self,
        proposal: &ProposalEvent,
        _sim: &TenderlySimulation,
        deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        if deps.provider.get_code_at(deps.governor).await?.is_empty() {
            return Ok(CheckResult::info(format!(
                "Governor `{}` has no code on chain {}, skipped",
                deps.governor, deps.chain_id
            )));
        }

        let governor = Governor::new(deps.governor, deps.governor_type, deps.provider.clone());
        let state = governor.proposal(proposal.id).await?;
        let id = proposal.id;

        let created = match (state.start_block, state.start_time) {
            (Some(_), _) => !state.id.is_zero(),
            (None, Some(snapshot)) => !snapshot.is_zero(),
            (None, None) => false,
        };
        if !created {
            return Ok(CheckResult::info(format!("Proposal {id} does not exist on-chain yet")));
        }

        let mut result = CheckResult::default();
        if state.canceled {
            result.warnings.push(format!("Proposal {id} was canceled on-chain"));
        } else if state.executed {
            result.info.push(format!("Proposal {id} is already executed on-chain"));
        }
        result.info.push(format!(
            "Proposal {id} has {} votes for, {} against and {} abstaining, ETA {}",
            state.for_votes, state.against_votes, state.abstain_votes, state.eta
        ));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_utils::{self, proposal};
    use alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::SolValue,
        transports::mock::Asserter,
    };

    fn bravo_proposal(id: u64, canceled: bool, executed: bool) -> Bytes {
        (
            U256::from(id),
            Address::ZERO,
            U256::from(1_700_000_000),
            U256::from(100),
            U256::from(200),
            U256::from(600_000),
            U256::from(5),
            U256::ZERO,
            canceled,
            executed,
        )
            .abi_encode_params()
            .into()
    }

    async fn run(asserter: Asserter) -> CheckResult {
        let sim = test_utils::fixture();
        let deps = test_utils::deps(asserter);
        OnChainProposalState.check_proposal(&proposal(), &sim, &deps).await.unwrap()
    }

    #[tokio::test]
    async fn skips_chain_without_governor() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::new());
        let result = run(asserter).await;
        assert!(result.info[0].ends_with("has no code on chain 1, skipped"));
    }

    #[tokio::test]
    async fn reports_executed_bravo_proposal() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
        asserter.push_success(&bravo_proposal(42, false, true));

        let result = run(asserter).await;
        assert!(result.is_clean());
        assert_eq!(
            result.info,
            [
                "Proposal 42 is already executed on-chain",
                "Proposal 42 has 600000 votes for, 5 against and 0 abstaining, ETA 1700000000",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_proposal() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
        asserter.push_success(&bravo_proposal(0, false, false));

        let result = run(asserter).await;
        assert_eq!(result, CheckResult::info("Proposal 42 does not exist on-chain yet"));
    }

    #[tokio::test]
    async fn canceled_proposal_warns() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
        asserter.push_success(&bravo_proposal(42, true, false));

        let result = run(asserter).await;
        assert_eq!(result.warnings, ["Proposal 42 was canceled on-chain"]);
    }
}
