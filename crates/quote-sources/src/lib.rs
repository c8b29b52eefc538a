//! # QuickTrade Quote Sources
//!
//! This crate turns a `TradeIntent` into a priced, executable option. It defines
//! the universal `QuoteSource` trait and its three implementations.
//!
//! ## Architectural Principles
//!
//! - **Closed set of variants:** every source is identified by a `QuoteSourceId`
//!   and decides for itself, through `is_applicable`, whether it can serve an
//!   intent on a chain. Inapplicable sources are never queried.
//! - **Failures are values:** `quote` never returns `Err`. Every failure travels
//!   as `QuoteResult::Failure`, so the resolver can render it as data.
//! - **Worst-case numbers only:** `min_buy_amount` is always the guaranteed
//!   output after slippage and buffers, never an optimistic estimate.
//!
//! ## Public API
//!
//! - `QuoteSource`: the core trait.
//! - `DirectSwapQuoter`, `LeveragedIssuanceQuoter`, `ZeroExIssuanceQuoter`.
//! - `CancellationToken`: cooperative cancellation shared by one intent generation.
//! - `create_quote_source` / `create_quote_sources`: the factory.

use api_client::{ChainReader, RoutingOracle};
use async_trait::async_trait;
use core_types::{Address, ChainId, QuoteResult, QuoteSourceId, TradeIntent};
use std::sync::Arc;

pub mod cancel;
pub mod direct_swap;
pub mod factory;
pub mod leveraged;
mod legs;
pub mod zero_ex_issuance;

#[cfg(test)]
mod test_support;

pub use cancel::CancellationToken;
pub use direct_swap::DirectSwapQuoter;
pub use factory::{create_quote_source, create_quote_sources};
pub use leveraged::LeveragedIssuanceQuoter;
pub use zero_ex_issuance::{BasketIssuanceDeployment, ZeroExIssuanceQuoter};

/// The capability shared by every quote strategy.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn id(&self) -> QuoteSourceId;

    /// Whether this source can serve `intent` on `chain_id` at all.
    fn is_applicable(&self, intent: &TradeIntent, chain_id: ChainId) -> bool;

    /// Prices `intent`. Observes `cancel` at every suspension point and returns
    /// a `Cancelled` failure once it fires.
    async fn quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> QuoteResult;
}

/// Collaborators every quoter on one chain shares.
#[derive(Clone)]
pub struct SourceContext {
    pub chain_id: ChainId,
    pub oracle: Arc<dyn RoutingOracle>,
    pub reader: Arc<dyn ChainReader>,
    pub wrapped_native: Address,
}

impl SourceContext {
    /// Both sides of the intent live on this context's chain and differ.
    fn serves(&self, intent: &TradeIntent, chain_id: ChainId) -> bool {
        chain_id == self.chain_id
            && intent.sell_asset.chain_id == chain_id
            && intent.buy_asset.chain_id == chain_id
            && intent.sell_asset.address != intent.buy_asset.address
            && intent.sell_amount_base_units().is_ok_and(|amount| !amount.is_zero())
    }
}
