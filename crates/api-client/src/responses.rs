use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.
// The 0x API encodes every amount as a decimal string.

/// The response from a successful `GET /swap/v1/quote` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroExQuoteResponse {
    pub price: String,
    pub guaranteed_price: Option<String>,
    pub to: String,
    pub data: String,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    pub buy_amount: String,
    pub sell_amount: String,
    #[serde(default)]
    pub sources: Vec<ZeroExSource>,
    pub allowance_target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroExSource {
    pub name: String,
    pub proportion: String,
}

/// Represents an error response from the 0x API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroExErrorResponse {
    pub code: i64,
    pub reason: String,
    #[serde(default)]
    pub validation_errors: Vec<ZeroExValidationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroExValidationError {
    pub field: String,
    pub code: i64,
    pub reason: String,
}

impl ZeroExErrorResponse {
    /// 0x reports an unroutable pair as a validation error on the amount field.
    pub fn is_no_liquidity(&self) -> bool {
        self.validation_errors
            .iter()
            .any(|e| e.reason.contains("INSUFFICIENT_ASSET_LIQUIDITY") || e.reason.contains("NO_ROUTE"))
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// The subset of `eth_getTransactionReceipt` we look at.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub status: Option<String>,
    pub block_number: Option<String>,
}

/// The subset of `eth_getTransactionByHash` needed to replay a reverted call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub from: String,
    pub to: Option<String>,
    pub input: String,
    pub value: String,
}
