//! Cross-module scenario tests.
//!
//! - `determinism.rs`: same seed and inputs give the same world
//! - `integration.rs`: full command, tick and snapshot flows
//! - `helpers.rs`: engine and scenario setup

mod helpers;
mod integration;
