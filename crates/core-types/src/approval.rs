use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one on-chain allowance: `owner` lets `spender` move `token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalKey {
    pub owner: Address,
    pub token: Address,
    pub spender: Address,
}

impl ApprovalKey {
    pub fn new(owner: Address, token: Address, spender: Address) -> Self {
        Self { owner, token, spender }
    }
}

impl fmt::Display for ApprovalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}->{}", self.owner, self.token, self.spender)
    }
}

/// Approval status for one `ApprovalKey`.
///
/// Within one approval attempt the state only moves forward:
/// `Insufficient -> Approving -> {Sufficient | ApprovalFailed}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalState {
    #[default]
    Unknown,
    Checking,
    /// Carries the allowance observed on chain.
    Insufficient(U256),
    Sufficient,
    Approving,
    ApprovalFailed(String),
}
