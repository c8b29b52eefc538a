//! # QuickTrade Executor Crate
//!
//! This crate submits the winning option of a resolution on chain. It defines
//! a generic `Executor` trait and the `TradeExecutor` that drives approval,
//! the balance re-check, submission and the receipt wait.
//!
//! ## Architectural Principles
//!
//! - **Plans are immutable:** the executor only pads the attached value or the
//!   input limit by the configured safety margin. Semantic call arguments and
//!   guaranteed minimum outputs are never touched.
//! - **No silent resubmission:** every failure is terminal for the attempt and
//!   is reported to the caller and the snapshot; nothing is retried.
//! - **Execution Abstraction:** callers depend on `Executor`, so tests and
//!   front ends can substitute their own.
//!
//! ## Public API
//!
//! - `Executor`: The core trait for all execution engines.
//! - `TradeExecutor`: The on-chain implementation.
//! - `TxHandle`: What a confirmed submission returns.
//! - `ExecutionError`: The specific error types that can be returned from this crate.

pub mod error;
pub mod trade;

pub use error::ExecutionError;
pub use trade::{Executor, TradeExecutor, TxHandle};
