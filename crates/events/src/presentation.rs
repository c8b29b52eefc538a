use crate::error::EventsError;
use crate::snapshots::{ExecutionSnapshot, ResolverSnapshot};
use core_types::{to_decimal_string, ApprovalState, QuoteSuccess, TradeIntent, U256};
use serde::{Deserialize, Serialize};

/// Fractional digits shown for token amounts.
const AMOUNT_DIGITS: u32 = 4;
/// Fractional digits shown for the network fee.
const FEE_DIGITS: u32 = 6;
/// Native assets on every supported chain use 18 decimals.
const NATIVE_DECIMALS: u32 = 18;

/// One labelled line under the quote, e.g. `Minimum Receive: 49.8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInfoRow {
    pub title: String,
    pub value: String,
}

impl TradeInfoRow {
    fn new(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
        }
    }
}

/// The rows describing a winning quote: guaranteed output, network fee in
/// the chain's native asset, and the liquidity sources actually used.
pub fn trade_info(quote: &QuoteSuccess, native_symbol: &str) -> Result<Vec<TradeInfoRow>, EventsError> {
    let min_receive = to_decimal_string(
        quote.min_buy_amount,
        u32::from(quote.buy_asset.decimals),
        AMOUNT_DIGITS,
    )?;
    let fee = to_decimal_string(quote.network_cost(), NATIVE_DECIMALS, FEE_DIGITS)?;
    let offered_from = quote
        .route_sources
        .iter()
        .filter(|s| !s.proportion.is_zero())
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    Ok(vec![
        TradeInfoRow::new("Minimum Receive", min_receive),
        TradeInfoRow::new("Network Fee", format!("{fee} {native_symbol}")),
        TradeInfoRow::new("Offered From", offered_from),
    ])
}

/// True when the typed sell amount exceeds the known balance. Unknown
/// balances never block the trade here; the executor re-checks anyway.
pub fn has_insufficient_funds(sell_amount: U256, balance: Option<U256>) -> bool {
    balance.is_some_and(|balance| sell_amount > balance)
}

/// Everything the trade button depends on.
#[derive(Debug, Clone, Copy)]
pub struct TradeContext<'a> {
    pub wallet_connected: bool,
    pub intent: &'a TradeIntent,
    /// Balance of the sell asset (native balance for the native asset).
    pub sell_balance: Option<U256>,
    pub quotes: &'a ResolverSnapshot,
    pub approval: &'a ApprovalState,
    pub execution: &'a ExecutionSnapshot,
}

/// The single call to action shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeButtonState {
    ConnectWallet,
    EnterAmount,
    Fetching,
    InsufficientFunds,
    ApproveTokens,
    Approving,
    Trade,
    Trading,
    TryAgain,
}

impl TradeButtonState {
    pub fn derive(ctx: &TradeContext<'_>) -> Self {
        if !ctx.wallet_connected {
            return TradeButtonState::ConnectWallet;
        }
        let sell_amount = ctx.intent.sell_amount_base_units().unwrap_or(U256::ZERO);
        if sell_amount.is_zero() {
            return TradeButtonState::EnterAmount;
        }
        if ctx.execution.is_transacting {
            return TradeButtonState::Trading;
        }
        if ctx.quotes.is_fetching {
            return TradeButtonState::Fetching;
        }
        let Some(outcome) = &ctx.quotes.outcome else {
            return TradeButtonState::EnterAmount;
        };
        // A failed execution does not block a fresh quote from being traded.
        if outcome.is_retryable() {
            return TradeButtonState::TryAgain;
        }
        if outcome.best().is_none() {
            return TradeButtonState::EnterAmount;
        }
        if has_insufficient_funds(sell_amount, ctx.sell_balance) {
            return TradeButtonState::InsufficientFunds;
        }
        if ctx.intent.sell_asset.is_native() {
            return TradeButtonState::Trade;
        }
        match ctx.approval {
            ApprovalState::Sufficient => TradeButtonState::Trade,
            ApprovalState::Approving => TradeButtonState::Approving,
            _ => TradeButtonState::ApproveTokens,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeButtonState::ConnectWallet => "Connect Wallet",
            TradeButtonState::EnterAmount => "Enter an amount",
            TradeButtonState::Fetching => "Fetching best price",
            TradeButtonState::InsufficientFunds => "Insufficient funds",
            TradeButtonState::ApproveTokens => "Approve Tokens",
            TradeButtonState::Approving => "Approving",
            TradeButtonState::Trade => "Trade",
            TradeButtonState::Trading => "Trading",
            TradeButtonState::TryAgain => "Try again",
        }
    }

    /// Whether clicking does nothing in this state.
    pub fn is_disabled(&self) -> bool {
        matches!(
            self,
            TradeButtonState::EnterAmount
                | TradeButtonState::Fetching
                | TradeButtonState::InsufficientFunds
                | TradeButtonState::Approving
                | TradeButtonState::Trading
        )
    }
}
