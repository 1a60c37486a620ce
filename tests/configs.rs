//! Parsing of simulation files.

use alloy::primitives::{U256, address};
use govsim::{
    error::ConfigError,
    types::{GovernorType, RetryableChain, SimulationConfig, SimulationKind},
};
use std::path::{Path, PathBuf};

fn asset(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/assets").join(path)
}

fn load(path: &str) -> Result<SimulationConfig, ConfigError> {
    SimulationConfig::load_from_file(asset(path))
}

#[test]
fn executed_and_proposed() {
    let executed = load("sims/compound-executed.yaml").unwrap();
    assert_eq!(executed.kind(), SimulationKind::Executed);
    assert_eq!(executed.dao_name(), "Compound");
    assert_eq!(executed.governor_type(), GovernorType::Bravo);
    assert!(executed.actions().is_none());
    let SimulationConfig::Executed(config) = executed else { panic!("wrong variant") };
    assert_eq!(config.proposal_id, U256::from(64));

    let SimulationConfig::Proposed(proposed) = load("sims/uniswap-proposed.yaml").unwrap() else {
        panic!("wrong variant")
    };
    assert_eq!(proposed.proposal_id, U256::from(0x2c));
    assert_eq!(
        proposed.governor.governor_address,
        address!("0x408ed6354d4973f66138c91495f2f2fcbd8724c3")
    );
}

#[test]
fn new_proposal_from_yaml() {
    let config = load("sims/compound-new.yaml").unwrap();
    let actions = config.actions().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions.values, [U256::ZERO, U256::from(1_000_000_000_000_000_000u64)]);
    assert_eq!(actions.signature(0), "transfer(address,uint256)");
    assert_eq!(actions.signature(1), "");
    assert_eq!(actions.payloads()[0].len(), 68);
    assert!(actions.payloads()[1].is_empty());
    assert!(config.description().unwrap().starts_with("# Grant COMP"));
}

#[test]
fn new_proposal_from_json() {
    let config = load("sims/ens-new.json").unwrap();
    assert_eq!(config.kind(), SimulationKind::New);
    assert_eq!(config.governor_type(), GovernorType::Oz);
    assert_eq!(config.description(), Some("# Fund the working group\n\nTransfers 1,000 ENS."));
    assert_eq!(config.actions().unwrap().total_value(), U256::ZERO);
}

#[test]
fn arbitrum_follow_ups() {
    let SimulationConfig::ArbL2ToL1(l2_to_l1) = load("sims/arb-l2tol1.yaml").unwrap() else {
        panic!("wrong variant")
    };
    assert_eq!(l2_to_l1.id_offset, U256::ZERO);
    assert_eq!(l2_to_l1.actions.calldatas[0].len(), 132);

    let SimulationConfig::ArbRetryable(retryable) = load("sims/arb-retryable.yaml").unwrap()
    else {
        panic!("wrong variant")
    };
    assert_eq!(retryable.chain_id, RetryableChain::ArbOne);
    assert_eq!(retryable.parent_id, l2_to_l1.parent_id);
    assert_eq!(retryable.from, govsim::sims::retryable_sender());
}

#[test]
fn rejects_invalid_files() {
    assert!(matches!(
        load("sims-invalid/retryable-wrong-chain.yaml"),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        load("sims-invalid/ragged-actions.yaml"),
        Err(ConfigError::MismatchedActions { targets: 1, values: 2, .. })
    ));
    assert!(matches!(
        load("sims-invalid/retryable-two-actions.yaml"),
        Err(ConfigError::RetryableActionCount(2))
    ));
    assert!(matches!(load("sims/missing.yaml"), Err(ConfigError::Read { .. })));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atlas.yaml");
    let config = govsim::sims::builtin("atlas-fees").unwrap();

    config.save_to_file(&path).unwrap();
    assert_eq!(SimulationConfig::load_from_file(&path).unwrap(), config);
}
