//! Assets and intents shared across the integration tests.

use core_types::{Address, Asset, AssetKind, ChainId, TradeIntent, NATIVE_ASSET_ADDRESS};

pub fn owner() -> Address {
    Address::repeat_byte(0x01)
}

pub fn eth(chain_id: ChainId) -> Asset {
    Asset {
        chain_id,
        address: NATIVE_ASSET_ADDRESS,
        symbol: "ETH".into(),
        decimals: 18,
        kind: AssetKind::Currency,
    }
}

pub fn usdc(chain_id: ChainId) -> Asset {
    Asset {
        chain_id,
        address: Address::repeat_byte(0x0c),
        symbol: "USDC".into(),
        decimals: 6,
        kind: AssetKind::Currency,
    }
}

/// A basket token with zero decimals so amounts read as plain integers.
pub fn bask(chain_id: ChainId) -> Asset {
    Asset {
        chain_id,
        address: Address::repeat_byte(0xba),
        symbol: "BASK".into(),
        decimals: 0,
        kind: AssetKind::LeveragedBasket,
    }
}

/// Buy BASK with `amount` ETH.
pub fn buy_bask_with_eth(chain_id: ChainId, amount: &str) -> TradeIntent {
    TradeIntent::new(eth(chain_id), bask(chain_id), amount, true)
}

/// Buy BASK with `amount` USDC.
pub fn buy_bask_with_usdc(chain_id: ChainId, amount: &str) -> TradeIntent {
    TradeIntent::new(usdc(chain_id), bask(chain_id), amount, true)
}
