//! Centralized mocks and fixtures for the integration tests
//!
//! Every boundary trait (routing oracle, chain reader/writer, quote source)
//! has an in-memory implementation here, so no test touches the network.
#![allow(dead_code)]

pub mod chain;
pub mod fixtures;
pub mod oracle;
pub mod sources;

pub use chain::MockChain;
pub use oracle::ScriptedOracle;
pub use sources::{CallTracker, TimingControlledSource};
