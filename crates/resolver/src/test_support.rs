//! A scripted quote source for resolver tests.

use async_trait::async_trait;
use core_types::{
    Address, Asset, AssetKind, ChainId, ContractCall, ExecutionPlan, QuoteResult, QuoteSourceId, QuoteSuccess,
    TradeIntent, U256,
};
use quote_sources::{CancellationToken, QuoteSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn intent(amount: &str) -> TradeIntent {
    let eth = Asset {
        chain_id: ChainId::MAINNET,
        address: Address::repeat_byte(1),
        symbol: "WETH".into(),
        decimals: 0,
        kind: AssetKind::Currency,
    };
    let basket = Asset {
        address: Address::repeat_byte(2),
        symbol: "BASK".into(),
        kind: AssetKind::Basket,
        ..eth.clone()
    };
    TradeIntent::new(eth, basket, amount, true)
}

/// Succeeds after `delay` with `min_buy` equal to the intent's sell amount,
/// so a result can be traced back to the intent that produced it. Ignores
/// cancellation entirely.
pub struct StubSource {
    pub id: QuoteSourceId,
    pub delay: Duration,
    /// Intents with this sell amount take `slow_delay` instead.
    pub slow: Option<(&'static str, Duration)>,
    pub applicable: bool,
    pub calls: AtomicUsize,
}

impl StubSource {
    pub fn new(id: QuoteSourceId, delay_ms: u64) -> Self {
        Self {
            id,
            delay: Duration::from_millis(delay_ms),
            slow: None,
            applicable: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for StubSource {
    fn id(&self) -> QuoteSourceId {
        self.id
    }

    fn is_applicable(&self, _intent: &TradeIntent, _chain_id: ChainId) -> bool {
        self.applicable
    }

    async fn quote(&self, intent: &TradeIntent, _cancel: &CancellationToken) -> QuoteResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = match self.slow {
            Some((amount, slow)) if intent.sell_amount == amount => slow,
            _ => self.delay,
        };
        tokio::time::sleep(delay).await;
        let amount = intent.sell_amount_base_units().unwrap_or_default();
        QuoteSuccess {
            source: self.id,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount: amount,
            min_buy_amount: amount,
            gas_estimate: 100_000,
            gas_price: U256::from(1u64),
            route_sources: Vec::new(),
            plan: ExecutionPlan {
                target: Address::ZERO,
                call: ContractCall::Raw { data: Default::default() },
                value: U256::ZERO,
                gas_limit: 100_000,
                spender: None,
                max_input: None,
            },
        }
        .into()
    }
}
