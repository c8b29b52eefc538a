use core_types::{Address, AssetKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    pub chains: Vec<ChainSettings>,
}

impl Config {
    pub fn chain(&self, id: u64) -> Option<&ChainSettings> {
        self.chains.iter().find(|c| c.id == id)
    }
}

/// Settings for the external routing oracle (a 0x-compatible swap API).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Sent as the `0x-api-key` header when present.
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    /// Slippage tolerance requested from the oracle; also used to derive
    /// worst-case amounts from its estimates. 0.01 corresponds to 1%.
    pub slippage_pct: Decimal,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            request_timeout_ms: 10_000,
            slippage_pct: dec!(0.01),
        }
    }
}

/// Settings for the best-trade-option resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Per-source quote timeout. 0 means wait for every source to settle.
    pub source_timeout_ms: u64,
    /// Quiet period before a changed intent is resolved. 0 disables debouncing.
    pub debounce_ms: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            source_timeout_ms: 15_000,
            debounce_ms: 0,
        }
    }
}

/// Gas limits attached to issuance/redemption transactions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GasLimits {
    pub issue_from_native: u64,
    pub issue_from_erc20: u64,
    pub redeem_to_native: u64,
    pub redeem_to_erc20: u64,
    /// Used for every basket issuance/redemption routed through component swaps.
    pub basket_issuance: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            issue_from_native: 1_800_000,
            issue_from_erc20: 1_800_000,
            redeem_to_native: 1_800_000,
            redeem_to_erc20: 2_000_000,
            basket_issuance: 2_000_000,
        }
    }
}

/// Safety margins and limits applied when building and submitting plans.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Extra input allowed on top of a plan's worst-case input. 0.005 corresponds to 0.50%.
    pub input_safety_margin_pct: Decimal,
    /// Buffer applied to collateral and component amounts when sizing issuance.
    pub collateral_buffer_pct: Decimal,
    /// Multiplier on the basket amount for leveraged redemption into an ERC-20.
    pub redemption_amount_multiplier: u32,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_ms: u64,
    pub gas_limits: GasLimits,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            input_safety_margin_pct: dec!(0.005),
            collateral_buffer_pct: dec!(0.01),
            redemption_amount_multiplier: 1,
            receipt_poll_interval_ms: 2_000,
            receipt_timeout_ms: 300_000,
            gas_limits: GasLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive string, e.g. `"info,resolver=debug"`.
    pub level: String,
    /// Directory for daily-rolling log files. Console only when unset.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "quicktrade.log".to_string(),
        }
    }
}

/// One supported chain with its deployed contracts and tradable assets.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSettings {
    pub id: u64,
    pub name: String,
    /// Symbol of the native asset, e.g. `"ETH"` or `"MATIC"`.
    pub native_symbol: String,
    pub rpc_url: String,
    /// Base URL of the routing oracle for this chain.
    pub oracle_url: String,
    /// Wrapped native token (WETH, WMATIC) used by swap legs executed inside contracts.
    pub wrapped_native: Address,
    /// Leveraged issuance contract; leveraged quoting is disabled when unset.
    pub leveraged_issuance: Option<Address>,
    /// Component-swap issuance contract; basket quoting is disabled when unset.
    pub zero_ex_issuance: Option<Address>,
    /// Issuance module passed to the component-swap issuance contract.
    pub issuance_module: Option<Address>,
    #[serde(default)]
    pub is_debt_issuance: bool,
    #[serde(default)]
    pub assets: Vec<AssetSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetSettings {
    pub symbol: String,
    /// Omit for the chain's native asset.
    pub address: Option<Address>,
    pub decimals: u8,
    #[serde(default = "default_asset_kind")]
    pub kind: AssetKind,
}

fn default_asset_kind() -> AssetKind {
    AssetKind::Currency
}

/// Converts a fractional percentage (0.005 = 0.50%) into basis points, truncating.
pub fn pct_to_bps(pct: Decimal) -> u32 {
    use rust_decimal::prelude::ToPrimitive;
    (pct * dec!(10000)).trunc().to_u32().unwrap_or(0)
}

impl OracleSettings {
    pub fn slippage_bps(&self) -> u32 {
        pct_to_bps(self.slippage_pct)
    }
}

impl ExecutionSettings {
    pub fn input_safety_margin_bps(&self) -> u32 {
        pct_to_bps(self.input_safety_margin_pct)
    }

    pub fn collateral_buffer_bps(&self) -> u32 {
        pct_to_bps(self.collateral_buffer_pct)
    }
}
