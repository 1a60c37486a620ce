use super::{ProposalCheck, ProposalData, describe_address};
use crate::{
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{CheckResult, ProposalEvent},
};
use async_trait::async_trait;

/// Reports whether the simulated execution succeeded, and where it reverted if not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationStatus;

#[async_trait]
impl ProposalCheck for SimulationStatus {
    fn id(&self) -> &'static str {
        "status"
    }

    fn name(&self) -> &'static str {
        "Simulation executes successfully"
    }

    async fn check_proposal(
        &self,
        _proposal: &ProposalEvent,
        sim: &TenderlySimulation,
        _deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        if sim.succeeded() {
            let gas = sim.transaction.gas_used;
            return Ok(CheckResult::info(format!("Simulation succeeded using {gas} gas")));
        }

        let trace = &sim.transaction.transaction_info.call_trace;
        let Some(frame) = trace.first_error() else {
            return Ok(CheckResult::error("Simulation reverted without a reported error"));
        };

        let mut message = format!("Simulation reverted in {}", describe_address(sim, frame.to));
        if let Some(function) = &frame.function_name {
            message.push_str(&format!(" calling `{function}`"));
        }
        match (&frame.error, &frame.error_reason) {
            (_, Some(reason)) if !reason.is_empty() => message.push_str(&format!(": {reason}")),
            (Some(error), _) => message.push_str(&format!(": {error}")),
            _ => {}
        }
        Ok(CheckResult::error(message))
    }
}
