//! # QuickTrade Events
//!
//! This crate defines what the presentation layer observes: snapshots of the
//! resolver and the executor, the trade-info rows shown under a quote, and the
//! single trade-button state derived from all of them.
//!
//! As a Layer 1 crate, it depends only on `core-types`. Every user-visible
//! message maps to exactly one combination of states here, so a UI needs no
//! error interpretation of its own.

pub mod error;
pub mod presentation;
pub mod snapshots;

pub use error::EventsError;
pub use presentation::{has_insufficient_funds, trade_info, TradeButtonState, TradeContext, TradeInfoRow};
pub use snapshots::{ExecutionSnapshot, ResolverSnapshot};
