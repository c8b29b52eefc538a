//! Timing-controlled quote sources for resolver scenarios

use async_trait::async_trait;
use core_types::{
    Address, Bytes, ChainId, ContractCall, ExecutionPlan, QuoteError, QuoteResult, QuoteSourceId, QuoteSuccess,
    TradeIntent, U256,
};
use quote_sources::{CancellationToken, QuoteSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Call tracking for verifying which sources were actually queried
#[derive(Debug, Clone)]
pub struct CallTracker {
    pub calls: Arc<AtomicUsize>,
    pub id: String,
}

impl CallTracker {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            id: id.into(),
        }
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Mock quote source that responds after a configurable delay.
///
/// The delay ignores cancellation, like a network call already on the wire;
/// only the resolver decides whether a late answer still counts.
#[derive(Debug, Clone)]
pub struct TimingControlledSource {
    pub id: QuoteSourceId,
    /// The only chain this source serves.
    pub chain_id: ChainId,
    pub response_delay_ms: u64,
    /// Overrides the delay for intents whose typed amount matches.
    pub delay_for_amount: Option<(String, u64)>,
    /// Fixed guaranteed output; `None` echoes the sell amount in base units.
    pub min_buy: Option<U256>,
    pub gas_estimate: u64,
    pub gas_price: U256,
    pub failure: Option<QuoteError>,
    pub tracker: CallTracker,
}

impl TimingControlledSource {
    /// Create a fast-responding source (responds in ~100ms)
    pub fn fast(id: QuoteSourceId) -> Self {
        Self::new(id, 100)
    }

    /// Create a slow-responding source (responds in ~1500ms)
    pub fn slow(id: QuoteSourceId) -> Self {
        Self::new(id, 1_500)
    }

    /// Create a very slow source that outlives any sane timeout (~5000ms)
    pub fn timeout(id: QuoteSourceId) -> Self {
        Self::new(id, 5_000)
    }

    /// Create a source that always fails with `reason`
    pub fn failing(id: QuoteSourceId, reason: QuoteError) -> Self {
        Self {
            failure: Some(reason),
            ..Self::new(id, 100)
        }
    }

    pub fn new(id: QuoteSourceId, response_delay_ms: u64) -> Self {
        Self {
            id,
            chain_id: ChainId::MAINNET,
            response_delay_ms,
            delay_for_amount: None,
            min_buy: None,
            gas_estimate: 200_000,
            gas_price: U256::from(10_000_000_000u64),
            failure: None,
            tracker: CallTracker::new(format!("timing-{id}")),
        }
    }

    pub fn returning(mut self, min_buy: u64) -> Self {
        self.min_buy = Some(U256::from(min_buy));
        self
    }

    pub fn with_gas(mut self, gas_estimate: u64, gas_price_wei: u64) -> Self {
        self.gas_estimate = gas_estimate;
        self.gas_price = U256::from(gas_price_wei);
        self
    }

    pub fn with_delay_for(mut self, amount: &str, response_delay_ms: u64) -> Self {
        self.delay_for_amount = Some((amount.to_string(), response_delay_ms));
        self
    }

    pub fn on_chain(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn call_count(&self) -> usize {
        self.tracker.call_count()
    }

    fn success(&self, intent: &TradeIntent) -> QuoteSuccess {
        let sell_amount = intent.sell_amount_base_units().unwrap_or_default();
        let spender = (!intent.sell_asset.is_native()).then(|| Address::repeat_byte(0xaa));
        QuoteSuccess {
            source: self.id,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount,
            min_buy_amount: self.min_buy.unwrap_or(sell_amount),
            gas_estimate: self.gas_estimate,
            gas_price: self.gas_price,
            route_sources: Vec::new(),
            plan: ExecutionPlan {
                target: Address::repeat_byte(0xde),
                call: ContractCall::Raw { data: Bytes::from(vec![0x12, 0x34, 0x56, 0x78]) },
                value: if intent.sell_asset.is_native() { sell_amount } else { U256::ZERO },
                gas_limit: self.gas_estimate,
                spender,
                max_input: None,
            },
        }
    }
}

#[async_trait]
impl QuoteSource for TimingControlledSource {
    fn id(&self) -> QuoteSourceId {
        self.id
    }

    fn is_applicable(&self, intent: &TradeIntent, chain_id: ChainId) -> bool {
        chain_id == self.chain_id && intent.sell_asset.chain_id == self.chain_id
    }

    async fn quote(&self, intent: &TradeIntent, _cancel: &CancellationToken) -> QuoteResult {
        self.tracker.record_call();
        let delay = match &self.delay_for_amount {
            Some((amount, delay)) if *amount == intent.sell_amount => *delay,
            _ => self.response_delay_ms,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        match &self.failure {
            Some(reason) => QuoteResult::failure(self.id, reason.clone()),
            None => self.success(intent).into(),
        }
    }
}
