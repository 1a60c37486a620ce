use super::{ProposalCheck, ProposalData, describe_address};
use crate::{
    error::HarnessError,
    tenderly::{TenderlySimulation, format_value, group_by_address},
    types::{CheckResult, ProposalEvent},
};
use async_trait::async_trait;
use serde_json::Value;

/// Lists the storage changes of the simulation, grouped by contract.
///
/// Changes Tenderly could not decode against verified source are flagged as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateChanges;

#[async_trait]
impl ProposalCheck for StateChanges {
    fn id(&self) -> &'static str {
        "state-changes"
    }

    fn name(&self) -> &'static str {
        "Reports all state changes from the proposal"
    }

    async fn check_proposal(
        &self,
        _proposal: &ProposalEvent,
        sim: &TenderlySimulation,
        _deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError> {
        let diffs = sim.state_diffs();
        if diffs.is_empty() {
            return Ok(CheckResult::info("No state changes"));
        }

        let mut result = CheckResult::default();
        for (address, diffs) in group_by_address(diffs, |diff| diff.address()) {
            let contract = describe_address(sim, address);
            for diff in diffs {
                match &diff.soltype {
                    Some(soltype) => {
                        let mut changes = Vec::new();
                        flatten(soltype.name.clone(), &diff.original, &diff.dirty, &mut changes);
                        result.info.extend(changes.into_iter().map(|(path, from, to)| {
                            format!("{contract}: `{path}` changed from `{from}` to `{to}`")
                        }));
                    }
                    None => result.warnings.extend(diff.raw.iter().map(|raw| {
                        format!(
                            "{contract}: undecoded slot `{}` changed from `{}` to `{}`",
                            raw.key, raw.original, raw.dirty
                        )
                    })),
                }
            }
        }
        Ok(result)
    }
}

/// Expands mapping and struct values into one change per leaf.
fn flatten(
    path: String,
    original: &Value,
    dirty: &Value,
    out: &mut Vec<(String, String, String)>,
) {
    let (Value::Object(before), Value::Object(after)) = (original, dirty) else {
        if original != dirty {
            out.push((path, format_value(original), format_value(dirty)));
        }
        return;
    };

    let keys = after.keys().chain(before.keys().filter(|key| !after.contains_key(*key)));
    for key in keys {
        let is_index = key.starts_with("0x") || key.parse::<u128>().is_ok();
        let path = if is_index { format!("{path}[{key}]") } else { format!("{path}.{key}") };
        flatten(
            path,
            before.get(key).unwrap_or(&Value::Null),
            after.get(key).unwrap_or(&Value::Null),
            out,
        );
    }
}
