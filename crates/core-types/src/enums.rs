use serde::{Deserialize, Serialize};
use std::fmt;

/// An EVM chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const MAINNET: ChainId = ChainId(1);
    pub const POLYGON: ChainId = ChainId(137);
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What role an asset can play in a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A plain currency token (or the native asset) used to pay or be paid.
    Currency,
    /// A basket token issued/redeemed against its constituent components.
    Basket,
    /// A basket token backed by a borrowed collateral/debt position.
    LeveragedBasket,
}

impl AssetKind {
    pub fn is_basket(&self) -> bool {
        matches!(self, AssetKind::Basket | AssetKind::LeveragedBasket)
    }
}

/// Identifies one of the closed set of quote strategies.
///
/// The declaration order is the final deterministic tie-break used when two
/// options are otherwise equal: earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuoteSourceId {
    DirectSwap,
    LeveragedIssuance,
    ZeroExIssuance,
}

impl QuoteSourceId {
    pub const ALL: [QuoteSourceId; 3] = [
        QuoteSourceId::DirectSwap,
        QuoteSourceId::LeveragedIssuance,
        QuoteSourceId::ZeroExIssuance,
    ];

    /// Lower is preferred.
    pub fn priority(&self) -> u8 {
        match self {
            QuoteSourceId::DirectSwap => 0,
            QuoteSourceId::LeveragedIssuance => 1,
            QuoteSourceId::ZeroExIssuance => 2,
        }
    }
}

impl fmt::Display for QuoteSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteSourceId::DirectSwap => "direct-swap",
            QuoteSourceId::LeveragedIssuance => "leveraged-issuance",
            QuoteSourceId::ZeroExIssuance => "zero-ex-issuance",
        };
        f.write_str(name)
    }
}
