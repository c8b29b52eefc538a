use crate::error::ApiError;
use crate::responses::{ZeroExErrorResponse, ZeroExQuoteResponse};
use crate::types::{OracleQuote, OracleQuoteRequest, SwapAmount};
use crate::RoutingOracle;
use async_trait::async_trait;
use configuration::{ChainSettings, OracleSettings};
use core_types::{sub_bps, add_bps, Address, Bytes, ChainId, RouteSource, U256};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// A `RoutingOracle` backed by the 0x swap API, one base URL per chain.
#[derive(Clone)]
pub struct ZeroExClient {
    client: reqwest::Client,
    base_urls: HashMap<ChainId, String>,
    slippage_pct: Decimal,
    slippage_bps: u32,
}

impl ZeroExClient {
    pub fn new(settings: &OracleSettings, chains: &[ChainSettings]) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &settings.api_key {
            let value = HeaderValue::from_str(key).map_err(|e| ApiError::InvalidData(format!("API key: {e}")))?;
            headers.insert("0x-api-key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        let base_urls = chains
            .iter()
            .map(|c| (ChainId(c.id), c.oracle_url.trim_end_matches('/').to_string()))
            .collect();

        Ok(Self {
            client,
            base_urls,
            slippage_pct: settings.slippage_pct,
            slippage_bps: settings.slippage_bps(),
        })
    }
}

#[async_trait]
impl RoutingOracle for ZeroExClient {
    async fn get_quote(&self, request: &OracleQuoteRequest) -> Result<OracleQuote, ApiError> {
        let base_url = self
            .base_urls
            .get(&request.chain_id)
            .ok_or(ApiError::UnknownChain(request.chain_id.0))?;
        let url = format!("{base_url}/swap/v1/quote");

        let (amount_key, amount) = match request.amount {
            SwapAmount::ExactSell(amount) => ("sellAmount", amount),
            SwapAmount::ExactBuy(amount) => ("buyAmount", amount),
        };
        let params = [
            ("sellToken", request.sell_token.to_string()),
            ("buyToken", request.buy_token.to_string()),
            (amount_key, amount.to_string()),
            ("slippagePercentage", self.slippage_pct.to_string()),
        ];

        tracing::debug!(chain = %request.chain_id, sell = %request.sell_token, buy = %request.buy_token, %amount, "requesting 0x quote");
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            parse_quote(&text, request.amount, self.slippage_bps)
        } else {
            Err(parse_error(status.as_u16(), &text))
        }
    }
}

fn parse_u256(field: &str, value: &str) -> Result<U256, ApiError> {
    U256::from_str_radix(value, 10).map_err(|e| ApiError::InvalidData(format!("{field} '{value}': {e}")))
}

fn parse_address(field: &str, value: &str) -> Result<Address, ApiError> {
    Address::from_str(value).map_err(|e| ApiError::InvalidData(format!("{field} '{value}': {e}")))
}

/// Turns a successful 0x quote body into an `OracleQuote`.
///
/// The worst-case side is derived with the same slippage that was sent with the
/// request: exact-sell quotes get a reduced `min_buy_amount`, exact-buy quotes
/// an increased `max_sell_amount`.
pub fn parse_quote(body: &str, amount: SwapAmount, slippage_bps: u32) -> Result<OracleQuote, ApiError> {
    let raw: ZeroExQuoteResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    let sell_amount = parse_u256("sellAmount", &raw.sell_amount)?;
    let buy_amount = parse_u256("buyAmount", &raw.buy_amount)?;
    let (min_buy_amount, max_sell_amount) = match amount {
        SwapAmount::ExactSell(_) => (sub_bps(buy_amount, slippage_bps), sell_amount),
        SwapAmount::ExactBuy(_) => (buy_amount, add_bps(sell_amount, slippage_bps)),
    };

    let sources = raw
        .sources
        .iter()
        .map(|s| {
            Decimal::from_str(&s.proportion)
                .map(|proportion| RouteSource { name: s.name.clone(), proportion })
                .map_err(|e| ApiError::InvalidData(format!("proportion '{}': {e}", s.proportion)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let allowance_target = match raw.allowance_target.as_deref() {
        Some(target) => Some(parse_address("allowanceTarget", target)?),
        None => None,
    };

    Ok(OracleQuote {
        sell_amount,
        buy_amount,
        min_buy_amount,
        max_sell_amount,
        gas: raw
            .gas
            .parse()
            .map_err(|e| ApiError::InvalidData(format!("gas '{}': {e}", raw.gas)))?,
        gas_price: parse_u256("gasPrice", &raw.gas_price)?,
        sources,
        to: parse_address("to", &raw.to)?,
        data: Bytes::from_str(&raw.data).map_err(|e| ApiError::InvalidData(format!("data: {e}")))?,
        value: parse_u256("value", &raw.value)?,
        allowance_target,
    })
}

/// Classifies a non-2xx 0x response.
pub fn parse_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ZeroExErrorResponse>(body) {
        Ok(err) if err.is_no_liquidity() => ApiError::NoLiquidity(err.reason),
        Ok(err) => ApiError::ApiError {
            status,
            message: format!("{} ({})", err.reason, err.code),
        },
        Err(_) => ApiError::ApiError {
            status,
            message: body.chars().take(200).collect(),
        },
    }
}
