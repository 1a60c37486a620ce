//! Serde helpers.

pub mod quantity;
