use core_types::{Address, Bytes, ChainId, ContractCall, RouteSource, U256};

/// Which side of a routed swap is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapAmount {
    ExactSell(U256),
    ExactBuy(U256),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OracleQuoteRequest {
    pub chain_id: ChainId,
    pub sell_token: Address,
    pub buy_token: Address,
    pub amount: SwapAmount,
}

impl OracleQuoteRequest {
    pub fn exact_sell(chain_id: ChainId, sell_token: Address, buy_token: Address, amount: U256) -> Self {
        Self {
            chain_id,
            sell_token,
            buy_token,
            amount: SwapAmount::ExactSell(amount),
        }
    }

    pub fn exact_buy(chain_id: ChainId, sell_token: Address, buy_token: Address, amount: U256) -> Self {
        Self {
            chain_id,
            sell_token,
            buy_token,
            amount: SwapAmount::ExactBuy(amount),
        }
    }
}

/// A routed swap as priced by the oracle.
///
/// `min_buy_amount` and `max_sell_amount` already include the slippage
/// tolerance, so they are the worst case the returned calldata can settle at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleQuote {
    pub sell_amount: U256,
    pub buy_amount: U256,
    pub min_buy_amount: U256,
    pub max_sell_amount: U256,
    pub gas: u64,
    pub gas_price: U256,
    pub sources: Vec<RouteSource>,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub allowance_target: Option<Address>,
}

impl OracleQuote {
    /// Only the sources that actually carry part of the route.
    pub fn active_sources(&self) -> Vec<RouteSource> {
        self.sources
            .iter()
            .filter(|s| s.proportion > rust_decimal::Decimal::ZERO)
            .cloned()
            .collect()
    }
}

/// Collateral/debt composition of a leveraged basket for a given amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveragedTokenData {
    pub collateral_a_token: Address,
    pub collateral_token: Address,
    pub collateral_amount: U256,
    pub debt_token: Address,
    pub debt_amount: U256,
}

/// One constituent a basket needs (issuance) or releases (redemption).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketComponent {
    pub token: Address,
    pub amount: U256,
}

/// Everything the chain writer needs to submit one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub call: ContractCall,
    pub value: U256,
    pub gas_limit: u64,
}

/// Final status of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Success,
    Reverted(String),
}
