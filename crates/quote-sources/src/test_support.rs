//! Scripted oracle and chain reader for quoter tests.

use crate::SourceContext;
use api_client::{
    ApiError, BasketComponent, ChainReader, LeveragedTokenData, OracleQuote, OracleQuoteRequest, RoutingOracle,
};
use async_trait::async_trait;
use core_types::{Address, Asset, AssetKind, Bytes, ChainId, RouteSource, U256, NATIVE_ASSET_ADDRESS};
use rust_decimal_macros::dec;
use std::sync::Arc;

pub fn wrapped_native() -> Address {
    Address::repeat_byte(0x77)
}

pub fn oracle_quote(sell_amount: u64, buy_amount: u64, source: &str) -> OracleQuote {
    OracleQuote {
        sell_amount: U256::from(sell_amount),
        buy_amount: U256::from(buy_amount),
        min_buy_amount: U256::from(buy_amount),
        max_sell_amount: U256::from(sell_amount),
        gas: 150_000,
        gas_price: U256::from(10u64),
        sources: vec![RouteSource { name: source.to_string(), proportion: dec!(1) }],
        to: Address::repeat_byte(0xde),
        data: Bytes::from(vec![0xab, 0xcd]),
        value: U256::ZERO,
        allowance_target: Some(Address::repeat_byte(0xaa)),
    }
}

/// An 18-decimal mainnet asset at `0xbbbb..bb` for address byte `b`.
pub fn asset(symbol: &str, byte: u8, kind: AssetKind) -> Asset {
    Asset {
        chain_id: ChainId::MAINNET,
        address: Address::repeat_byte(byte),
        symbol: symbol.to_string(),
        decimals: 18,
        kind,
    }
}

pub fn native() -> Asset {
    Asset {
        address: NATIVE_ASSET_ADDRESS,
        ..asset("ETH", 0, AssetKind::Currency)
    }
}

pub fn context(oracle: Arc<dyn RoutingOracle>, reader: Arc<dyn ChainReader>) -> SourceContext {
    SourceContext {
        chain_id: ChainId::MAINNET,
        oracle,
        reader,
        wrapped_native: wrapped_native(),
    }
}

type Handler = dyn Fn(&OracleQuoteRequest) -> Result<OracleQuote, ApiError> + Send + Sync;

/// Oracle answering every request through a closure.
pub struct FnOracle(Box<Handler>);

impl FnOracle {
    pub fn new(handler: impl Fn(&OracleQuoteRequest) -> Result<OracleQuote, ApiError> + Send + Sync + 'static) -> Self {
        Self(Box::new(handler))
    }
}

#[async_trait]
impl RoutingOracle for FnOracle {
    async fn get_quote(&self, request: &OracleQuoteRequest) -> Result<OracleQuote, ApiError> {
        (self.0)(request)
    }
}

/// Chain reader whose basket compositions are given per whole (1e18) basket
/// unit and scale linearly with the requested amount.
#[derive(Default)]
pub struct StubReader {
    pub leveraged: Option<LeveragedTokenData>,
    pub components: Vec<BasketComponent>,
}

impl StubReader {
    pub fn leveraged(collateral: Address, collateral_amount: U256, debt: Address, debt_amount: U256) -> Self {
        Self {
            leveraged: Some(LeveragedTokenData {
                collateral_a_token: collateral,
                collateral_token: collateral,
                collateral_amount,
                debt_token: debt,
                debt_amount,
            }),
            components: Vec::new(),
        }
    }

    pub fn basket(components: impl IntoIterator<Item = (Address, U256)>) -> Self {
        Self {
            leveraged: None,
            components: components
                .into_iter()
                .map(|(token, amount)| BasketComponent { token, amount })
                .collect(),
        }
    }
}

fn scale(per_unit: U256, amount: U256) -> U256 {
    per_unit * amount / U256::from(1_000_000_000_000_000_000u64)
}

#[async_trait]
impl ChainReader for StubReader {
    async fn read_allowance(&self, _owner: Address, _token: Address, _spender: Address) -> Result<U256, ApiError> {
        Ok(U256::ZERO)
    }

    async fn read_balance(&self, _owner: Address, _token: Address) -> Result<U256, ApiError> {
        Ok(U256::ZERO)
    }

    async fn read_leveraged_token_data(
        &self,
        _contract: Address,
        _basket: Address,
        amount: U256,
        _is_issuance: bool,
    ) -> Result<LeveragedTokenData, ApiError> {
        let data = self
            .leveraged
            .clone()
            .ok_or_else(|| ApiError::Rpc { code: 3, message: "execution reverted".into() })?;
        Ok(LeveragedTokenData {
            collateral_amount: scale(data.collateral_amount, amount),
            debt_amount: scale(data.debt_amount, amount),
            ..data
        })
    }

    async fn read_basket_components(
        &self,
        _contract: Address,
        _issuance_module: Address,
        _is_debt_issuance: bool,
        _basket: Address,
        amount: U256,
        _is_issuance: bool,
    ) -> Result<Vec<BasketComponent>, ApiError> {
        if self.components.is_empty() {
            return Err(ApiError::Rpc { code: 3, message: "execution reverted".into() });
        }
        Ok(self
            .components
            .iter()
            .map(|c| BasketComponent { token: c.token, amount: scale(c.amount, amount) })
            .collect())
    }
}
