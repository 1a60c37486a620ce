//! Proposal calldata builders.

pub mod arbitrum;
