//! Helpers shared by the quoters that compose several routed swap legs.

use crate::CancellationToken;
use api_client::{ApiError, OracleQuote, OracleQuoteRequest, RoutingOracle};
use core_types::{Address, Asset, Exchange, QuoteError, RouteSource, SwapData, U256};
use std::collections::BTreeMap;

/// `10^decimals`, the base-unit size of one whole token.
pub(crate) fn one_unit(decimals: u8) -> U256 {
    U256::from(10u8).pow(U256::from(decimals))
}

/// Maps a routing-oracle failure of a whole-trade quote onto the quoting taxonomy.
pub(crate) fn oracle_failure(err: ApiError) -> QuoteError {
    match err {
        ApiError::NoLiquidity(_) => QuoteError::NoRouteFound,
        other => QuoteError::OracleUnavailable(other.to_string()),
    }
}

/// Quotes one sub-swap of a composed trade; any failure is a leg failure.
pub(crate) async fn quote_leg(
    oracle: &dyn RoutingOracle,
    request: OracleQuoteRequest,
    cancel: &CancellationToken,
) -> Result<OracleQuote, QuoteError> {
    cancel.check()?;
    let quote = oracle.get_quote(&request).await.map_err(|e| {
        QuoteError::LegQuoteFailed(format!("{} -> {}: {e}", request.sell_token, request.buy_token))
    })?;
    cancel.check()?;
    Ok(quote)
}

/// Token to route a contract-internal swap leg through: the wrapped native
/// token stands in for the native asset.
pub(crate) fn leg_token(asset: &Asset, wrapped_native: Address) -> Address {
    if asset.is_native() { wrapped_native } else { asset.address }
}

/// Swap description handed to the leveraged issuance contract for one leg.
pub(crate) fn swap_data(sell: Address, buy: Address, quote: Option<&OracleQuote>) -> SwapData {
    let Some(quote) = quote else {
        return SwapData::no_swap(sell);
    };
    let exchange = quote
        .sources
        .iter()
        .max_by(|a, b| a.proportion.cmp(&b.proportion))
        .map(|s| Exchange::from_source_name(&s.name))
        .unwrap_or(Exchange::None);
    SwapData {
        path: vec![sell, buy],
        fees: Vec::new(),
        pool: Address::ZERO,
        exchange,
    }
}

/// Union of the active liquidity sources of several legs, averaged per leg.
pub(crate) fn merge_sources<'a>(quotes: impl IntoIterator<Item = &'a OracleQuote>) -> Vec<RouteSource> {
    let mut totals: BTreeMap<String, rust_decimal::Decimal> = BTreeMap::new();
    let mut legs = 0u32;
    for quote in quotes {
        legs += 1;
        for source in quote.active_sources() {
            *totals.entry(source.name).or_default() += source.proportion;
        }
    }
    if legs == 0 {
        return Vec::new();
    }
    let legs = rust_decimal::Decimal::from(legs);
    totals
        .into_iter()
        .map(|(name, total)| RouteSource { name, proportion: total / legs })
        .collect()
}

/// Highest gas price among the legs; zero when nothing was routed.
pub(crate) fn max_gas_price<'a>(quotes: impl IntoIterator<Item = &'a OracleQuote>) -> U256 {
    quotes.into_iter().map(|q| q.gas_price).max().unwrap_or(U256::ZERO)
}

/// Gas the legs are expected to use plus the contract's own `overhead`,
/// never above the transaction's `gas_limit`.
pub(crate) fn estimate_gas<'a>(overhead: u64, gas_limit: u64, quotes: impl IntoIterator<Item = &'a OracleQuote>) -> u64 {
    quotes
        .into_iter()
        .fold(overhead, |total, q| total.saturating_add(q.gas))
        .min(gas_limit)
}
