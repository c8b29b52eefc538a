use core_types::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Token approval was not granted: {0}")]
    ApprovalRejected(String),

    #[error("Insufficient funds. Required: {required}, Available: {available}")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("The transaction was rejected by the signer")]
    UserRejected,

    #[error("Transaction reverted: {0}")]
    ExecutionReverted(String),

    #[error("Chain unavailable: {0}")]
    ChainUnavailable(String),

    #[error("The plan asks to approve the native asset, which has no allowance")]
    NativeApprovalRequested,

    #[error("Another trade is already being submitted")]
    AlreadyTransacting,
}
