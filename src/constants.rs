//! Harness constants.

use alloy::primitives::{Address, ChainId, address};

/// Chain ID of Ethereum mainnet.
pub const MAINNET_CHAIN_ID: ChainId = 1;

/// Chain ID of Arbitrum One.
pub const ARB_ONE_CHAIN_ID: ChainId = 42161;

/// Chain ID of Arbitrum Nova.
pub const ARB_NOVA_CHAIN_ID: ChainId = 42170;

/// Sender used for simulated proposal executions.
///
/// Any address without code works, execution of queued proposals is permissionless.
pub const DEFAULT_FROM: Address = address!("0xd73a92be73efbfcf3854433a5fcbabf9c1316073");

/// Gas limit given to simulated transactions.
pub const BLOCK_GAS_LIMIT: u64 = 30_000_000;

/// Base URL of the Tenderly REST API.
pub const TENDERLY_API_URL: &str = "https://api.tenderly.co/api/v1";

/// Base URL of the Tenderly dashboard, used for links in reports.
pub const TENDERLY_DASHBOARD_URL: &str = "https://dashboard.tenderly.co";

/// Default directory reports are written to.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// The `ArbSys` precompile on Arbitrum chains.
pub const ARB_SYS: Address = address!("0x0000000000000000000000000000000000000064");

/// Arbitrum DAO core governor on Arbitrum One.
pub const ARB_CORE_GOVERNOR: Address = address!("0xf07ded9dc292157749b6fd268e37df6ea38395b9");

/// Timelock controlled by the core governor on Arbitrum One.
pub const ARB_L2_CORE_TIMELOCK: Address = address!("0x34d45e99f7d8c45ed05b5ca72d54bbd1fb3f98f0");

/// Arbitrum DAO timelock on Ethereum mainnet.
pub const ARB_L1_TIMELOCK: Address = address!("0xe6841d92b0c345144506576ec13ecf5103ac7f49");

/// Target the L1 timelock recognizes as "create a retryable ticket with this payload".
pub const RETRYABLE_TICKET_MAGIC: Address =
    address!("0xa723c008e76e379c55599d2e4d93879beafda79c");

/// Delayed inbox of Arbitrum One on mainnet.
pub const ARB_ONE_INBOX: Address = address!("0x4dbd4fc535ac27206064b68ffcf827b0a60bab3f");

/// Delayed inbox of Arbitrum Nova on mainnet.
pub const ARB_NOVA_INBOX: Address = address!("0xc4448b71118c9071bcb9734a0eac55d18a153949");

/// Upgrade executor on Arbitrum One.
pub const ARB_ONE_UPGRADE_EXECUTOR: Address =
    address!("0xcf57572261c7c2bcf21ffd220ea7d1a27d40a827");

/// Upgrade executor on Arbitrum Nova.
pub const ARB_NOVA_UPGRADE_EXECUTOR: Address =
    address!("0x86a02dd71363c440b21f4c0e5b2ad01ffe1a7482");

/// Upgrade executor on Ethereum mainnet.
pub const ARB_L1_UPGRADE_EXECUTOR: Address =
    address!("0x3fffbadaf827559da092217e474760e2b2c3cedd");

/// Minimum delay of the L1 timelock, in seconds.
pub const ARB_L1_TIMELOCK_DELAY: u64 = 259_200;
