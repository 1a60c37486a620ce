//! Proposal checks run against a simulation.

mod arb_round_trip;
pub use arb_round_trip::ArbitrumRoundTrip;

mod logs;
pub use logs::DecodedLogs;

mod proposal_state;
pub use proposal_state::OnChainProposalState;

mod state_changes;
pub use state_changes::StateChanges;

mod status;
pub use status::SimulationStatus;

mod targets_verified;
pub use targets_verified::TargetsVerified;

mod value;
pub use value::TimelockBalance;

use crate::{
    error::HarnessError,
    tenderly::TenderlySimulation,
    types::{AllCheckResults, CheckResult, GovernorType, ProposalEvent},
};
use alloy::{
    primitives::{Address, ChainId},
    providers::DynProvider,
};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Context a check may need beyond the simulation itself.
#[derive(Debug, Clone)]
pub struct ProposalData {
    /// The governor of the proposal.
    pub governor: Address,
    /// Flavor of the governor.
    pub governor_type: GovernorType,
    /// The account executing the proposal's calls.
    pub timelock: Address,
    /// Chain the simulation ran on.
    pub chain_id: ChainId,
    /// Provider of that chain.
    pub provider: DynProvider,
}

/// A check over a simulated proposal.
#[async_trait]
pub trait ProposalCheck: Send + Sync + std::fmt::Debug {
    /// Stable identifier, used as the key of the result.
    fn id(&self) -> &'static str;

    /// Human readable name, used as the report heading.
    fn name(&self) -> &'static str;

    /// Runs the check.
    ///
    /// Findings go into the returned [`CheckResult`]. An `Err` means the check itself could not
    /// run.
    async fn check_proposal(
        &self,
        proposal: &ProposalEvent,
        sim: &TenderlySimulation,
        deps: &ProposalData,
    ) -> Result<CheckResult, HarnessError>;
}

/// The checks run by default.
pub fn default_checks() -> Vec<Box<dyn ProposalCheck>> {
    vec![
        Box::new(SimulationStatus),
        Box::new(TargetsVerified),
        Box::new(TimelockBalance),
        Box::new(OnChainProposalState),
        Box::new(DecodedLogs),
        Box::new(StateChanges),
        Box::new(ArbitrumRoundTrip),
    ]
}

/// Runs every check in order.
///
/// A check that fails to run is recorded as an error result and does not stop the others.
pub async fn run_checks(
    checks: &[Box<dyn ProposalCheck>],
    proposal: &ProposalEvent,
    sim: &TenderlySimulation,
    deps: &ProposalData,
) -> AllCheckResults {
    let mut results = AllCheckResults::default();
    for check in checks {
        let result = match check.check_proposal(proposal, sim, deps).await {
            Ok(result) => result,
            Err(err) => {
                warn!(check = check.id(), %err, "Check failed to run");
                CheckResult::error(format!("Check failed to run: {err}"))
            }
        };
        debug!(
            check = check.id(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Check completed"
        );
        results.insert(check.id(), check.name(), result);
    }
    results
}

/// Renders an address with the contract name Tenderly knows it by.
pub(crate) fn describe_address(sim: &TenderlySimulation, address: Address) -> String {
    match sim.contract(address).map(|contract| contract.contract_name.as_str()) {
        Some(name) if !name.is_empty() => format!("{name} at `{address}`"),
        _ => format!("`{address}`"),
    }
}
