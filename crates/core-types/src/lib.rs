//! # QuickTrade Core Types
//!
//! The foundational, dependency-light vocabulary shared by every other crate:
//! assets, trade intents, quotes, execution plans and approval states, plus the
//! unit conversion layer that turns user-typed decimal strings into base units.
//!
//! As a Layer 0 crate it has no knowledge of networks, oracles or runtimes.

pub mod approval;
pub mod asset;
pub mod enums;
pub mod error;
pub mod intent;
pub mod plan;
pub mod quote;
pub mod units;

// Re-export the core types to provide a clean public API.
pub use alloy_primitives::{Address, Bytes, TxHash, U256};
pub use approval::{ApprovalKey, ApprovalState};
pub use asset::{Asset, AssetRegistry, NATIVE_ASSET_ADDRESS};
pub use enums::{AssetKind, ChainId, QuoteSourceId};
pub use error::{CoreError, QuoteError};
pub use intent::TradeIntent;
pub use plan::{ComponentQuote, ContractCall, Exchange, ExecutionPlan, SwapData};
pub use quote::{QuoteFailure, QuoteResult, QuoteSuccess, ResolverOutcome, RouteSource};
pub use units::{add_bps, sub_bps, to_base_units, to_decimal_string, BPS_DENOMINATOR};
