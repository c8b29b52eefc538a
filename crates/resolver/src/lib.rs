//! # QuickTrade Resolver
//!
//! The Best-Trade-Option Resolver: given a `TradeIntent`, ask every applicable
//! quote source concurrently and select the best guaranteed option.
//!
//! ## Architectural Principles
//!
//! - **Generations, not callbacks:** every resolution belongs to a numbered
//!   generation. Starting a new one cancels the previous token, and results of
//!   an older generation are never published over a newer one.
//! - **Always a value:** source failures are collected, never propagated. The
//!   outcome is `Best`, `AllFailed` or, for a stale caller, `Superseded`.
//! - **Deterministic selection:** the winner never depends on arrival order.
//!
//! ## Public API
//!
//! - `BestTradeResolver`: `fetch_and_compare`, `begin` / `resolve`, `snapshot`.
//! - `IntentTracker`: structural intent-change detection and debounce.
//! - `selection::compare` / `selection::select`.

pub mod intent;
pub mod resolver;
pub mod selection;

#[cfg(test)]
mod test_support;

pub use intent::IntentTracker;
pub use resolver::{BestTradeResolver, Generation};
pub use selection::{compare, select};
