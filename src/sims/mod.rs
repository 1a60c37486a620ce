//! Simulations shipped with the harness.

use crate::{
    calldata::arbitrum::{
        L1Operation, NonEmergencyUpgrade, UpgradeTarget, apply_l1_to_l2_alias, decode_round_trip,
    },
    constants::{ARB_CORE_GOVERNOR, ARB_L1_TIMELOCK, ARB_SYS},
    error::ConfigError,
    types::{
        ArbL2ToL1Config, ArbRetryableConfig, GovernorConfig, GovernorType, NewConfig,
        ProposalActions, RetryableChain, SimulationConfig,
    },
};
use alloy::{
    primitives::{Address, B256, Bytes, U256, address, b256, keccak256},
    sol_types::SolValue,
};

/// Names of the built-in simulations.
pub const BUILTIN: &[&str] = &["atlas-fees"];

/// Looks up a built-in simulation by name.
pub fn builtin(name: &str) -> Result<SimulationConfig, ConfigError> {
    match name {
        "atlas-fees" => Ok(atlas_fees()),
        other => Err(ConfigError::UnknownSimulation(other.to_string())),
    }
}

/// A non-emergency proposal on the Arbitrum core governor, sending `calldata` through `ArbSys`.
pub fn non_emergency_sc_config(
    calldata: Bytes,
    description: impl Into<String>,
) -> SimulationConfig {
    SimulationConfig::New(NewConfig {
        governor: GovernorConfig {
            dao_name: "Arbitrum".to_string(),
            governor_address: ARB_CORE_GOVERNOR,
            governor_type: GovernorType::Arb,
        },
        actions: ProposalActions {
            targets: vec![ARB_SYS],
            values: vec![U256::ZERO],
            signatures: vec![String::new()],
            calldatas: vec![calldata],
        },
        description: description.into(),
    })
}

/// The Atlas fee AIP: two Arbitrum One actions setting L1 pricing parameters.
pub fn atlas_fees_upgrade() -> NonEmergencyUpgrade {
    NonEmergencyUpgrade::new(b256!(
        "0xd82fcbd0c53e9e9c1cfc7e0f2301f003ca89fc35b3bcf7e105d5e9d9906b831b"
    ))
    .with_action(UpgradeTarget::ArbOne, address!("0x36d0170d92f66e8949eb276c3ac4fea64f83704d"))
    .with_action(UpgradeTarget::ArbOne, address!("0x849e360a247132f961c9cbe95ba39106c72e1268"))
}

fn atlas_fees() -> SimulationConfig {
    non_emergency_sc_config(atlas_fees_upgrade().build(), "atlas fees sim")
}

/// Derives the follow-up simulations of an Arbitrum proposal.
///
/// Every action sending a message to L1 through `ArbSys` yields an `arbl2tol1` simulation of the L1
/// timelock batch, and every retryable ticket in that batch an `arbretryable` simulation on its
/// chain. Actions that are not L2 to L1 messages are skipped.
pub fn round_trip_configs(
    parent: &NewConfig,
    parent_id: U256,
) -> Result<Vec<SimulationConfig>, alloy::sol_types::Error> {
    let mut configs = Vec::new();
    for (index, (target, calldata)) in
        parent.actions.targets.iter().zip(&parent.actions.calldatas).enumerate()
    {
        if *target != ARB_SYS {
            continue;
        }
        let round_trip = decode_round_trip(calldata)?;
        configs.push(SimulationConfig::ArbL2ToL1(ArbL2ToL1Config {
            governor: parent.governor.clone(),
            actions: round_trip.schedule.actions(),
            description: parent.description.clone(),
            parent_id,
            id_offset: U256::from(index),
            salt: Some(round_trip.schedule.salt),
            predecessor: Some(round_trip.schedule.predecessor),
        }));

        for (offset, operation) in round_trip.schedule.operations.iter().enumerate() {
            let L1Operation::Retryable(ticket) = operation else { continue };
            let chain_id = match ticket.chain() {
                Some(UpgradeTarget::ArbOne) => RetryableChain::ArbOne,
                Some(UpgradeTarget::Nova) => RetryableChain::Nova,
                _ => continue,
            };
            configs.push(SimulationConfig::ArbRetryable(ArbRetryableConfig {
                governor: parent.governor.clone(),
                actions: ProposalActions {
                    targets: vec![ticket.l2_target],
                    values: vec![ticket.l2_value],
                    signatures: vec![String::new()],
                    calldatas: vec![ticket.data.clone()],
                },
                description: parent.description.clone(),
                parent_id,
                id_offset: U256::from(offset),
                from: retryable_sender(),
                chain_id,
            }));
        }
    }
    Ok(configs)
}

/// L2 sender of retryable tickets created by the L1 timelock.
pub fn retryable_sender() -> Address {
    apply_l1_to_l2_alias(ARB_L1_TIMELOCK)
}

/// Salt the L1 timelock batch of a follow-up simulation is executed with.
pub fn l2_to_l1_salt(parent_id: U256, id_offset: U256) -> B256 {
    keccak256((parent_id, id_offset).abi_encode_params())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ARB_ONE_UPGRADE_EXECUTOR;

    const ATLAS_FEES_CALLDATA: &str = include_str!("../../tests/assets/calldata/atlas-fees.hex");

    #[test]
    fn atlas_fees_matches_published_calldata() {
        let expected: Bytes = ATLAS_FEES_CALLDATA.trim().parse().unwrap();
        assert_eq!(expected.len(), 1444);
        assert_eq!(atlas_fees_upgrade().build(), expected);
    }

    #[test]
    fn builtin_lookup() {
        for name in BUILTIN {
            builtin(name).unwrap().validate().unwrap();
        }
        assert!(matches!(builtin("nope"), Err(ConfigError::UnknownSimulation(_))));
    }

    #[test]
    fn non_emergency_config_targets_arbsys() {
        let SimulationConfig::New(config) = builtin("atlas-fees").unwrap() else {
            panic!("expected a new proposal");
        };
        assert_eq!(config.governor.governor_address, ARB_CORE_GOVERNOR);
        assert_eq!(config.governor.governor_type, GovernorType::Arb);
        assert_eq!(config.actions.targets, [ARB_SYS]);
        assert_eq!(config.description, "atlas fees sim");
    }

    #[test]
    fn atlas_fees_follow_ups() {
        let SimulationConfig::New(parent) = builtin("atlas-fees").unwrap() else {
            panic!("expected a new proposal");
        };
        let configs = round_trip_configs(&parent, U256::from(42)).unwrap();
        assert_eq!(configs.len(), 3);

        let SimulationConfig::ArbL2ToL1(l1) = &configs[0] else { panic!("expected arbl2tol1") };
        assert_eq!(l1.actions.len(), 2);
        assert_eq!(l1.parent_id, U256::from(42));
        assert_eq!(l1.id_offset, U256::ZERO);
        assert_eq!(l1.salt, Some(atlas_fees_upgrade().schedule().salt));
        assert_eq!(l1.predecessor, Some(B256::ZERO));

        for (offset, config) in configs[1..].iter().enumerate() {
            let SimulationConfig::ArbRetryable(retryable) = config else {
                panic!("expected arbretryable")
            };
            assert_eq!(retryable.chain_id, RetryableChain::ArbOne);
            assert_eq!(retryable.actions.targets, [ARB_ONE_UPGRADE_EXECUTOR]);
            assert_eq!(retryable.id_offset, U256::from(offset));
            assert_eq!(retryable.from, retryable_sender());
            config.validate().unwrap();
        }
    }

    #[test]
    fn follow_up_keeps_scheduled_salt_and_predecessor() {
        let salt = B256::with_last_byte(0xaa);
        let predecessor = B256::with_last_byte(0xbb);
        let upgrade = NonEmergencyUpgrade::new(salt)
            .with_predecessor(predecessor)
            .with_action(UpgradeTarget::L1, ARB_CORE_GOVERNOR);
        let SimulationConfig::New(mut parent) = builtin("atlas-fees").unwrap() else {
            panic!("expected a new proposal");
        };
        parent.actions.calldatas = vec![upgrade.build()];

        let configs = round_trip_configs(&parent, U256::from(7)).unwrap();
        let [SimulationConfig::ArbL2ToL1(l1)] = configs.as_slice() else {
            panic!("expected a single arbl2tol1 config")
        };
        assert_eq!(l1.salt, Some(salt));
        assert_eq!(l1.predecessor, Some(predecessor));
        assert_ne!(l1.salt, Some(l2_to_l1_salt(U256::from(7), U256::ZERO)));
    }

    #[test]
    fn salt_depends_on_offset() {
        assert_ne!(
            l2_to_l1_salt(U256::from(1), U256::ZERO),
            l2_to_l1_salt(U256::from(1), U256::from(1))
        );
    }
}
