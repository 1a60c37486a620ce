use super::{ProposalCheck, ProposalData};
use crate::{
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{CheckResult, ProposalEvent},
};
use alloy::{
    primitives::{U256, utils::format_ether},
    providers::Provider,
};
use async_trait::async_trait;

/// Compares the ETH the proposal sends with what the timelock holds.
///
/// A shortfall is not fatal, the executor can attach the difference, so it is a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelockBalance;

#[async_trait]
impl ProposalCheck for TimelockBalance {
    fn id(&self) -> &'static str {
        "value"
    }

    fn name(&self) -> &'static str {
        "Timelock holds the ETH the proposal sends"
    }

    async fn check_proposal(
        &self,
        proposal: &ProposalEvent,
        _sim: &TenderlySimulation,
        deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        let total =
            proposal.values.iter().try_fold(U256::ZERO, |acc, value| acc.checked_add(*value));
        let Some(total) = total else {
            return Ok(CheckResult::error("Proposal values overflow uint256"));
        };
        if total.is_zero() {
            return Ok(CheckResult::info("Proposal sends no ETH"));
        }

        let balance = deps.provider.get_balance(deps.timelock).await?;
        let (total_eth, balance_eth) = (format_ether(total), format_ether(balance));
        if balance >= total {
            Ok(CheckResult::info(format!(
                "Proposal sends {total_eth} ETH, timelock `{}` holds {balance_eth} ETH",
                deps.timelock
            )))
        } else {
            let missing = format_ether(total - balance);
            Ok(CheckResult {
                warnings: vec![format!(
                    "Proposal sends {total_eth} ETH but timelock `{}` holds {balance_eth} ETH, \
                     execution must attach {missing} ETH",
                    deps.timelock
                )],
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_utils;
    use alloy::transports::mock::Asserter;

    const ONE_ETH: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

    fn proposal(values: Vec<U256>) -> ProposalEvent {
        let mut proposal = test_utils::proposal();
        proposal.values = values;
        proposal
    }

    #[tokio::test]
    async fn no_value_skips_rpc() {
        let sim = test_utils::fixture();
        // an empty asserter fails any request
        let deps = test_utils::deps(Asserter::new());
        let result = TimelockBalance
            .check_proposal(&proposal(vec![U256::ZERO, U256::ZERO]), &sim, &deps)
            .await
            .unwrap();
        assert_eq!(result, CheckResult::info("Proposal sends no ETH"));
    }

    #[tokio::test]
    async fn overflowing_values_are_an_error() {
        let sim = test_utils::fixture();
        let deps = test_utils::deps(Asserter::new());
        let result = TimelockBalance
            .check_proposal(&proposal(vec![U256::MAX, U256::from(1)]), &sim, &deps)
            .await
            .unwrap();
        assert!(!result.passed());
        assert_eq!(result, CheckResult::error("Proposal values overflow uint256"));
    }

    #[tokio::test]
    async fn warns_on_shortfall() {
        let asserter = Asserter::new();
        asserter.push_success(&ONE_ETH);
        let sim = test_utils::fixture();
        let deps = test_utils::deps(asserter);

        let result = TimelockBalance
            .check_proposal(&proposal(vec![ONE_ETH, ONE_ETH]), &sim, &deps)
            .await
            .unwrap();
        assert!(result.passed());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("attach 1.000000000000000000 ETH"));
    }

    #[tokio::test]
    async fn covered_value_is_info() {
        let asserter = Asserter::new();
        asserter.push_success(&(ONE_ETH * U256::from(3)));
        let sim = test_utils::fixture();
        let deps = test_utils::deps(asserter);

        let result =
            TimelockBalance.check_proposal(&proposal(vec![ONE_ETH]), &sim, &deps).await.unwrap();
        assert!(result.is_clean());
        assert!(result.info[0].starts_with("Proposal sends 1.000000000000000000 ETH"));
    }
}
