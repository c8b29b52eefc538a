use crate::asset::Asset;
use crate::error::CoreError;
use crate::units::to_base_units;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// What the user currently asks for.
///
/// Intents have no identity: every input change produces a new value, and
/// "did the intent change" is plain structural equality over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeIntent {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    /// The amount exactly as typed, e.g. `"1.25"`.
    pub sell_amount: String,
    /// `true` when buying a basket token (issuance), `false` when selling one.
    pub is_issuance: bool,
}

impl TradeIntent {
    pub fn new(sell_asset: Asset, buy_asset: Asset, sell_amount: impl Into<String>, is_issuance: bool) -> Self {
        Self {
            sell_asset,
            buy_asset,
            sell_amount: sell_amount.into(),
            is_issuance,
        }
    }

    /// The sell amount in the sell asset's base units; zero for partial input.
    pub fn sell_amount_base_units(&self) -> Result<U256, CoreError> {
        to_base_units(&self.sell_amount, u32::from(self.sell_asset.decimals))
    }

    /// Swaps the two sides and the direction, keeping the typed amount.
    pub fn flipped(&self) -> Self {
        Self {
            sell_asset: self.buy_asset.clone(),
            buy_asset: self.sell_asset.clone(),
            sell_amount: self.sell_amount.clone(),
            is_issuance: !self.is_issuance,
        }
    }

    /// The basket token involved in the trade, if the direction matches one.
    pub fn basket_asset(&self) -> Option<&Asset> {
        let candidate = if self.is_issuance { &self.buy_asset } else { &self.sell_asset };
        candidate.is_basket().then_some(candidate)
    }

    /// The non-basket side: what is paid on issuance, or received on redemption.
    pub fn counter_asset(&self) -> &Asset {
        if self.is_issuance { &self.sell_asset } else { &self.buy_asset }
    }
}
