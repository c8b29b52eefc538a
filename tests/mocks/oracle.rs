use super::sources::CallTracker;
use api_client::{ApiError, OracleQuote, OracleQuoteRequest, RoutingOracle, SwapAmount};
use async_trait::async_trait;
use core_types::{Address, Bytes, RouteSource, U256};
use std::time::Duration;

/// What the oracle answers to every request.
#[derive(Debug, Clone)]
pub enum Script {
    NoLiquidity,
    Unavailable,
    /// Quote returning `min_buy` per request with the given gas price.
    Quote { min_buy: U256, gas_price: U256 },
}

/// Mock routing oracle that answers after a fixed delay
pub struct ScriptedOracle {
    pub script: Script,
    pub response_delay_ms: u64,
    pub tracker: CallTracker,
}

impl ScriptedOracle {
    pub fn no_liquidity() -> Self {
        Self::new(Script::NoLiquidity, 50)
    }

    pub fn unavailable() -> Self {
        Self::new(Script::Unavailable, 50)
    }

    pub fn quoting(min_buy: u64) -> Self {
        Self::new(
            Script::Quote {
                min_buy: U256::from(min_buy),
                gas_price: U256::from(10_000_000_000u64),
            },
            50,
        )
    }

    pub fn new(script: Script, response_delay_ms: u64) -> Self {
        Self {
            script,
            response_delay_ms,
            tracker: CallTracker::new("oracle"),
        }
    }

    pub fn call_count(&self) -> usize {
        self.tracker.call_count()
    }
}

#[async_trait]
impl RoutingOracle for ScriptedOracle {
    async fn get_quote(&self, request: &OracleQuoteRequest) -> Result<OracleQuote, ApiError> {
        self.tracker.record_call();
        tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;

        match &self.script {
            Script::NoLiquidity => Err(ApiError::NoLiquidity("INSUFFICIENT_ASSET_LIQUIDITY".into())),
            Script::Unavailable => Err(ApiError::Timeout("GET /swap/v1/quote".into())),
            Script::Quote { min_buy, gas_price } => {
                let sell_amount = match request.amount {
                    SwapAmount::ExactSell(amount) | SwapAmount::ExactBuy(amount) => amount,
                };
                Ok(OracleQuote {
                    sell_amount,
                    buy_amount: *min_buy,
                    min_buy_amount: *min_buy,
                    max_sell_amount: sell_amount,
                    gas: 150_000,
                    gas_price: *gas_price,
                    sources: vec![RouteSource {
                        name: "Uniswap_V3".into(),
                        proportion: "1".parse().unwrap(),
                    }],
                    to: Address::repeat_byte(0xde),
                    data: Bytes::from(vec![0xd9, 0x62, 0x7a, 0xa4]),
                    value: U256::ZERO,
                    allowance_target: Some(Address::repeat_byte(0xaa)),
                })
            }
        }
    }
}
