use crate::enums::{AssetKind, ChainId};
use crate::error::CoreError;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel address used for the chain's native asset (ETH, MATIC, ...).
pub const NATIVE_ASSET_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Immutable reference data for a fungible asset on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub chain_id: ChainId,
    /// Contract address, or `NATIVE_ASSET_ADDRESS` for the native asset.
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub kind: AssetKind,
}

impl Asset {
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_ASSET_ADDRESS
    }

    pub fn is_basket(&self) -> bool {
        self.kind.is_basket()
    }
}

/// All assets known to the application, grouped by chain.
///
/// Built once at startup from configuration and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    by_chain: HashMap<ChainId, Vec<Asset>>,
}

impl AssetRegistry {
    pub fn new(assets: impl IntoIterator<Item = Asset>) -> Self {
        let mut by_chain: HashMap<ChainId, Vec<Asset>> = HashMap::new();
        for asset in assets {
            by_chain.entry(asset.chain_id).or_default().push(asset);
        }
        Self { by_chain }
    }

    /// Looks up an asset by symbol, case-insensitively.
    pub fn find(&self, chain_id: ChainId, symbol: &str) -> Result<&Asset, CoreError> {
        self.by_chain
            .get(&chain_id)
            .and_then(|assets| assets.iter().find(|a| a.symbol.eq_ignore_ascii_case(symbol)))
            .ok_or_else(|| CoreError::UnknownAsset {
                chain_id: chain_id.0,
                symbol: symbol.to_string(),
            })
    }

    pub fn find_by_address(&self, chain_id: ChainId, address: Address) -> Option<&Asset> {
        self.by_chain
            .get(&chain_id)
            .and_then(|assets| assets.iter().find(|a| a.address == address))
    }

    /// Tokens a user can pay with or be paid in on `chain_id`.
    pub fn currency_tokens(&self, chain_id: ChainId) -> Vec<&Asset> {
        self.filtered(chain_id, |a| !a.is_basket())
    }

    /// Basket tokens that can be bought or sold on `chain_id`.
    pub fn basket_tokens(&self, chain_id: ChainId) -> Vec<&Asset> {
        self.filtered(chain_id, Asset::is_basket)
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.by_chain.keys().copied()
    }

    fn filtered(&self, chain_id: ChainId, keep: impl Fn(&Asset) -> bool) -> Vec<&Asset> {
        self.by_chain
            .get(&chain_id)
            .map(|assets| assets.iter().filter(|a| keep(*a)).collect())
            .unwrap_or_default()
    }
}
