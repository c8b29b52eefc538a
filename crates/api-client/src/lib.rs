//! # QuickTrade API Client Crate
//!
//! Boundary adapters for everything outside the process: the routing oracle
//! (a 0x-compatible swap API) and the chain node (JSON-RPC reads and writes).
//!
//! ## Architectural Principles
//!
//! - **Traits at the seam:** the resolver, allowance tracker and executor only
//!   ever see `RoutingOracle`, `ChainReader` and `ChainWriter`, so tests swap in
//!   in-memory fakes without touching the network.
//! - **ABI at the edge:** contract calls travel as semantic `ContractCall`
//!   values and are encoded here, just before they hit the wire.

use async_trait::async_trait;
use core_types::{Address, TxHash, U256};

pub mod abi;
pub mod error;
pub mod responses;
pub mod rpc;
pub mod types;
pub mod zero_ex;

// --- Public API ---
pub use error::ApiError;
pub use rpc::JsonRpcClient;
pub use types::{
    BasketComponent, LeveragedTokenData, OracleQuote, OracleQuoteRequest, SwapAmount, TxOutcome, TxRequest,
};
pub use zero_ex::ZeroExClient;

/// Prices a swap between two tokens and returns executable calldata for it.
#[async_trait]
pub trait RoutingOracle: Send + Sync {
    /// Fails with `ApiError::NoLiquidity` when the pair cannot be routed.
    async fn get_quote(&self, request: &OracleQuoteRequest) -> Result<OracleQuote, ApiError>;
}

/// Read-only view of on-chain state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn read_allowance(&self, owner: Address, token: Address, spender: Address) -> Result<U256, ApiError>;

    /// `token` may be the native-asset sentinel, in which case the native balance is read.
    async fn read_balance(&self, owner: Address, token: Address) -> Result<U256, ApiError>;

    /// Per-`amount` collateral and debt of a leveraged basket, as reported by
    /// the leveraged issuance contract at `contract`.
    async fn read_leveraged_token_data(
        &self,
        contract: Address,
        basket: Address,
        amount: U256,
        is_issuance: bool,
    ) -> Result<LeveragedTokenData, ApiError>;

    /// Components needed to issue (or released by redeeming) `amount` of a basket.
    async fn read_basket_components(
        &self,
        contract: Address,
        issuance_module: Address,
        is_debt_issuance: bool,
        basket: Address,
        amount: U256,
        is_issuance: bool,
    ) -> Result<Vec<BasketComponent>, ApiError>;
}

/// Submits transactions and waits for them to be mined.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Fails with `ApiError::UserRejected` if the signer declines.
    async fn submit(&self, tx: &TxRequest) -> Result<TxHash, ApiError>;

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<TxOutcome, ApiError>;
}
