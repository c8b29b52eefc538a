//! # QuickTrade Configuration Crate
//!
//! Loads `config.toml` (plus `QUICKTRADE__`-prefixed environment overrides) into
//! strongly-typed settings, validates them, and builds the startup asset
//! registry. Also owns tracing initialisation so every binary logs the same way.

use crate::error::ConfigError;
use core_types::{Asset, AssetRegistry, ChainId, NATIVE_ASSET_ADDRESS};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    pct_to_bps, AssetSettings, ChainSettings, Config, ExecutionSettings, GasLimits, LoggingSettings,
    OracleSettings, ResolverSettings,
};

/// Loads the application configuration from the `config.toml` file.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads and validates configuration from `path`, applying environment overrides
/// such as `QUICKTRADE__ORACLE__API_KEY`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .add_source(
            config::Environment::with_prefix("QUICKTRADE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    tracing::debug!(path = %path.as_ref().display(), chains = config.chains.len(), "configuration loaded");
    Ok(config)
}

/// Parses configuration from an in-memory TOML string. Used by tests and tools.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn check_fraction(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be in [0, 1), got {value}"
        )));
    }
    Ok(())
}

/// Rejects configurations that would produce meaningless quotes or plans.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    check_fraction("oracle.slippage_pct", config.oracle.slippage_pct)?;
    check_fraction("execution.input_safety_margin_pct", config.execution.input_safety_margin_pct)?;
    check_fraction("execution.collateral_buffer_pct", config.execution.collateral_buffer_pct)?;

    if config.execution.redemption_amount_multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "execution.redemption_amount_multiplier must be at least 1".into(),
        ));
    }
    if config.chains.is_empty() {
        return Err(ConfigError::ValidationError("at least one [[chains]] entry is required".into()));
    }

    let mut chain_ids = HashSet::new();
    for chain in &config.chains {
        if !chain_ids.insert(chain.id) {
            return Err(ConfigError::ValidationError(format!("duplicate chain id {}", chain.id)));
        }
        if chain.zero_ex_issuance.is_some() && chain.issuance_module.is_none() {
            return Err(ConfigError::ValidationError(format!(
                "chain {} sets zero_ex_issuance without issuance_module",
                chain.name
            )));
        }

        let mut symbols = HashSet::new();
        for asset in &chain.assets {
            if !symbols.insert(asset.symbol.to_ascii_uppercase()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate asset {} on chain {}",
                    asset.symbol, chain.name
                )));
            }
            if asset.address.is_none() && !asset.symbol.eq_ignore_ascii_case(&chain.native_symbol) {
                return Err(ConfigError::ValidationError(format!(
                    "asset {} on chain {} has no address and is not the native asset",
                    asset.symbol, chain.name
                )));
            }
        }
    }
    Ok(())
}

/// Builds the read-only asset registry from every configured chain.
pub fn build_asset_registry(config: &Config) -> AssetRegistry {
    let assets = config.chains.iter().flat_map(|chain| {
        chain.assets.iter().map(move |asset| Asset {
            chain_id: ChainId(chain.id),
            address: asset.address.unwrap_or(NATIVE_ASSET_ADDRESS),
            symbol: asset.symbol.clone(),
            decimals: asset.decimals,
            kind: asset.kind,
        })
    });
    AssetRegistry::new(assets)
}
