use super::{ProposalCheck, ProposalData, describe_address};
use crate::{
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{CheckResult, ProposalEvent},
};
use alloy::providers::Provider;
use async_trait::async_trait;
use itertools::Itertools;

/// Checks that every target with code has verified source on Tenderly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetsVerified;

#[async_trait]
impl ProposalCheck for TargetsVerified {
    fn id(&self) -> &'static str {
        "targets-verified"
    }

    fn name(&self) -> &'static str {
        "Targets have verified source"
    }

    async fn check_proposal(
        &self,
        proposal: &ProposalEvent,
        sim: &TenderlySimulation,
        deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        let mut result = CheckResult::default();
        for target in proposal.targets.iter().copied().unique() {
            let code = deps.provider.get_code_at(target).await?;
            let described = describe_address(sim, target);
            if code.is_empty() {
                result.info.push(format!("{described}: EOA, may have code later"));
            } else if sim.contract(target).is_some_and(|contract| contract.is_verified()) {
                result.info.push(format!("{described}: contract, verified"));
            } else {
                result.warnings.push(format!("{described}: contract, not verified"));
            }
        }
        Ok(result)
    }
}
