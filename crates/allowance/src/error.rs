use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllowanceError {
    #[error("Failed to read allowance: {0}")]
    ReadFailed(String),

    #[error("The native asset has no allowance to approve")]
    NativeAsset,
}
