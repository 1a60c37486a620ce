use super::{ProposalCheck, ProposalData, describe_address};
use crate::{
    error::HarnessError,
    tenderly::{TenderlySimulation, format_params, group_by_address},
    types::{CheckResult, ProposalEvent},
};
use async_trait::async_trait;

/// Lists the events emitted by the simulation, grouped by emitting contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedLogs;

#[async_trait]
impl ProposalCheck for DecodedLogs {
    fn id(&self) -> &'static str {
        "logs"
    }

    fn name(&self) -> &'static str {
        "Reports all events emitted from the proposal"
    }

    async fn check_proposal(
        &self,
        _proposal: &ProposalEvent,
        sim: &TenderlySimulation,
        _deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        let logs = sim.logs();
        if logs.is_empty() {
            return Ok(CheckResult::info("No events emitted"));
        }

        let mut result = CheckResult::default();
        for (address, logs) in group_by_address(logs, |log| Some(log.raw.address)) {
            let emitter = describe_address(sim, address);
            for log in logs {
                match &log.name {
                    Some(name) => result
                        .info
                        .push(format!("{emitter}: `{name}({})`", format_params(&log.inputs))),
                    None => {
                        let topic = log.raw.topics.first().map(ToString::to_string);
                        result.warnings.push(format!(
                            "{emitter}: undecoded event with topic `{}`",
                            topic.as_deref().unwrap_or("none")
                        ));
                    }
                }
            }
        }
        Ok(result)
    }
}
