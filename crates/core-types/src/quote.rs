use crate::asset::Asset;
use crate::enums::QuoteSourceId;
use crate::error::QuoteError;
use crate::plan::ExecutionPlan;
use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One liquidity source contributing to a routed quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSource {
    pub name: String,
    /// Share of the trade routed through this source, in `[0, 1]`.
    pub proportion: Decimal,
}

/// A priced, executable option produced by one quote source.
///
/// `min_buy_amount` is always the source's own worst-case guarantee, so
/// successes from different sources are directly comparable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSuccess {
    pub source: QuoteSourceId,
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    /// Amount of `sell_asset` the plan consumes, in base units.
    pub sell_amount: U256,
    /// Guaranteed minimum of `buy_asset` received, in base units.
    pub min_buy_amount: U256,
    pub gas_estimate: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    pub route_sources: Vec<RouteSource>,
    pub plan: ExecutionPlan,
}

impl QuoteSuccess {
    /// Total network cost in wei (`gas_estimate * gas_price`).
    pub fn network_cost(&self) -> U256 {
        self.gas_price.saturating_mul(U256::from(self.gas_estimate))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFailure {
    pub source: QuoteSourceId,
    pub reason: QuoteError,
}

/// The immutable outcome of one `quote` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteResult {
    Success(Box<QuoteSuccess>),
    Failure(QuoteFailure),
}

impl QuoteResult {
    pub fn failure(source: QuoteSourceId, reason: QuoteError) -> Self {
        QuoteResult::Failure(QuoteFailure { source, reason })
    }

    pub fn source(&self) -> QuoteSourceId {
        match self {
            QuoteResult::Success(s) => s.source,
            QuoteResult::Failure(f) => f.source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, QuoteResult::Failure(QuoteFailure { reason: QuoteError::Cancelled, .. }))
    }
}

impl From<QuoteSuccess> for QuoteResult {
    fn from(success: QuoteSuccess) -> Self {
        QuoteResult::Success(Box::new(success))
    }
}

/// What one resolution of a `TradeIntent` produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverOutcome {
    /// The winning option plus every source that failed. `alternatives` holds
    /// the losing successes, best first.
    Best {
        best: Box<QuoteSuccess>,
        rejected: Vec<QuoteFailure>,
        alternatives: Vec<QuoteSuccess>,
    },
    /// No source succeeded. Empty when no source applied at all.
    AllFailed(Vec<QuoteFailure>),
    /// A newer intent generation started before this one finished; its
    /// results were discarded.
    Superseded { generation: u64 },
}

impl ResolverOutcome {
    pub fn best(&self) -> Option<&QuoteSuccess> {
        match self {
            ResolverOutcome::Best { best, .. } => Some(best),
            _ => None,
        }
    }

    pub fn failures(&self) -> &[QuoteFailure] {
        match self {
            ResolverOutcome::Best { rejected, .. } => rejected,
            ResolverOutcome::AllFailed(failures) => failures,
            ResolverOutcome::Superseded { .. } => &[],
        }
    }

    /// True when the user should be offered a retry: nothing usable came back,
    /// or a source ran out of time.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolverOutcome::AllFailed(_) => true,
            ResolverOutcome::Best { .. } => false,
            ResolverOutcome::Superseded { .. } => false,
        }
    }
}
