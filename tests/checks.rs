//! The default checks over a recorded simulation, through to the rendered report.

use alloy::{
    primitives::{Address, B256, Bytes, U256, address},
    providers::{Provider, ProviderBuilder},
    sol_types::SolValue,
    transports::mock::Asserter,
};
use govsim::{
    checks::{ProposalData, default_checks, run_checks},
    report::Report,
    simulation::{SimulationData, SimulationResult},
    tenderly::TenderlySimulation,
    types::{
        BlockInfo, ExecutedConfig, GovernorConfig, GovernorType, ProposalEvent, SimulationConfig,
    },
};

const GOVERNOR: Address = address!("0xc0da02939e1441f497fd74f78ce7decb17b66529");
const TIMELOCK: Address = address!("0x6d903f6003cca6255d85cca4d3b5e5146dc33925");

fn simulation() -> TenderlySimulation {
    serde_json::from_str(include_str!("assets/tenderly/simulation.json")).unwrap()
}

fn proposal() -> ProposalEvent {
    serde_json::from_str(include_str!("assets/tenderly/proposal.json")).unwrap()
}

/// Answers the RPC calls of the default checks, in order: the target's code, the governor's code
/// and the governor's `proposals(42)`.
fn deps() -> ProposalData {
    let asserter = Asserter::new();
    asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
    asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
    let state: Bytes = (
        U256::from(42),
        Address::ZERO,
        U256::from(1_700_000_000),
        U256::from(100),
        U256::from(200),
        U256::from(600_000),
        U256::ZERO,
        U256::ZERO,
        false,
        true,
    )
        .abi_encode_params()
        .into();
    asserter.push_success(&state);

    ProposalData {
        governor: GOVERNOR,
        governor_type: GovernorType::Bravo,
        timelock: TIMELOCK,
        chain_id: 1,
        provider: ProviderBuilder::new().connect_mocked_client(asserter).erased(),
    }
}

#[tokio::test]
async fn default_checks_on_recorded_simulation() {
    let sim = simulation();
    let proposal = proposal();
    let results = run_checks(&default_checks(), &proposal, &sim, &deps()).await;

    let ids: Vec<_> = results.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "status",
            "targets-verified",
            "value",
            "proposal-state",
            "logs",
            "state-changes",
            "arb-round-trip"
        ]
    );
    assert!(results.passed());
    assert_eq!(results.counts(), (0, 2));

    let status = &results.get("status").unwrap().result;
    assert_eq!(status.info, ["Simulation succeeded using 123456 gas"]);
    let verified = &results.get("targets-verified").unwrap().result;
    assert!(verified.is_clean());
    assert!(verified.info[0].ends_with(": contract, verified"));
    assert_eq!(results.get("value").unwrap().result.info, ["Proposal sends no ETH"]);
    let state = &results.get("proposal-state").unwrap().result;
    assert_eq!(state.info[0], "Proposal 42 is already executed on-chain");
    assert_eq!(results.get("logs").unwrap().result.warnings.len(), 1);
    assert_eq!(results.get("state-changes").unwrap().result.warnings.len(), 1);
    assert_eq!(results.get("arb-round-trip").unwrap().result.info, ["No L2 to L1 messages"]);
}

#[tokio::test]
async fn report_of_recorded_simulation() {
    let data = SimulationData {
        config: SimulationConfig::Executed(ExecutedConfig {
            governor: GovernorConfig {
                dao_name: "Compound".to_string(),
                governor_address: GOVERNOR,
                governor_type: GovernorType::Bravo,
            },
            proposal_id: U256::from(42),
        }),
        result: SimulationResult {
            sim: simulation(),
            proposal: proposal(),
            latest_block: BlockInfo {
                number: 18_100_000,
                timestamp: 1_694_260_800,
                hash: B256::ZERO,
            },
        },
        deps: deps(),
    };
    let results =
        run_checks(&default_checks(), &data.result.proposal, &data.result.sim, &data.deps).await;

    let dir = tempfile::tempdir().unwrap();
    let path = Report::new(&data, &results, "https://dashboard.tenderly.co/sim")
        .write_to(dir.path())
        .unwrap();
    assert_eq!(path, dir.path().join("Compound/42.md"));

    let report = std::fs::read_to_string(path).unwrap();
    assert!(report.contains("| Outcome | passed, 0 error(s), 2 warning(s) |"));
    assert!(report.contains("### ✅ Simulation executes successfully"));
    assert!(report.contains("### ❗ Reports all events emitted from the proposal"));
    assert!(report.contains("### ❗ Reports all state changes from the proposal"));
}
