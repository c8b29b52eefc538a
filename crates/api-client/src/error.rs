use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The API request returned an error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("No liquidity available: {0}")]
    NoLiquidity(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("The request was rejected by the signer")]
    UserRejected,

    #[error("Chain {0} is not configured")]
    UnknownChain(u64),

    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

impl From<alloy_sol_types::Error> for ApiError {
    fn from(err: alloy_sol_types::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}
