//! Governance and simulation types.

mod check;
pub use check::*;

mod config;
pub use config::*;

mod governor;
pub use governor::*;

mod proposal;
pub use proposal::*;
