use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Conversion error: precision {0} is outside the valid range [0, 255]")]
    Conversion(u32),

    #[error("Unknown asset '{symbol}' on chain {chain_id}")]
    UnknownAsset { chain_id: u64, symbol: String },
}

/// Why a single quote source could not produce an executable option.
///
/// These never escape the resolver as errors; they travel inside
/// `QuoteResult::Failure` so the presentation layer can render them as data.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteError {
    #[error("No route found for the requested pair")]
    NoRouteFound,

    #[error("A swap leg could not be quoted: {0}")]
    LegQuoteFailed(String),

    #[error("Asset is not supported by this source: {0}")]
    UnsupportedAsset(String),

    #[error("Routing oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Quote source timed out")]
    Timeout,

    /// The intent generation was superseded while the quote was in flight.
    /// Filtered out by the resolver, never reported.
    #[error("Quote request was cancelled")]
    Cancelled,
}
