//! In-memory chain: one allowance, one balance, scripted transaction outcomes

use super::sources::CallTracker;
use api_client::{ApiError, BasketComponent, ChainReader, ChainWriter, LeveragedTokenData, TxOutcome, TxRequest};
use async_trait::async_trait;
use core_types::{Address, ContractCall, TxHash, U256};
use std::sync::Mutex;
use std::time::Duration;

/// Mock chain node.
///
/// A successful approval transaction sets the stored allowance, so a later
/// refresh observes it exactly like on a real chain.
pub struct MockChain {
    pub allowance: Mutex<U256>,
    pub balance: U256,
    pub read_delay_ms: u64,
    /// Signer declines every non-approval transaction.
    pub reject_trades: bool,
    /// Every mined non-approval transaction reverts with this reason.
    pub revert_reason: Option<String>,
    pub submitted: Mutex<Vec<TxRequest>>,
    pub allowance_reads: CallTracker,
}

impl MockChain {
    pub fn new(allowance: U256, balance: U256) -> Self {
        Self {
            allowance: Mutex::new(allowance),
            balance,
            read_delay_ms: 100,
            reject_trades: false,
            revert_reason: None,
            submitted: Mutex::new(Vec::new()),
            allowance_reads: CallTracker::new("allowance"),
        }
    }

    pub fn submitted(&self) -> Vec<TxRequest> {
        self.submitted.lock().unwrap().clone()
    }

    fn is_approval(tx: &TxRequest) -> bool {
        matches!(tx.call, ContractCall::Approve { .. })
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn read_allowance(&self, _owner: Address, _token: Address, _spender: Address) -> Result<U256, ApiError> {
        self.allowance_reads.record_call();
        tokio::time::sleep(Duration::from_millis(self.read_delay_ms)).await;
        Ok(*self.allowance.lock().unwrap())
    }

    async fn read_balance(&self, _owner: Address, _token: Address) -> Result<U256, ApiError> {
        Ok(self.balance)
    }

    async fn read_leveraged_token_data(
        &self,
        _contract: Address,
        _basket: Address,
        _amount: U256,
        _is_issuance: bool,
    ) -> Result<LeveragedTokenData, ApiError> {
        Err(ApiError::Rpc { code: -32000, message: "execution reverted".into() })
    }

    async fn read_basket_components(
        &self,
        _contract: Address,
        _issuance_module: Address,
        _is_debt_issuance: bool,
        _basket: Address,
        _amount: U256,
        _is_issuance: bool,
    ) -> Result<Vec<BasketComponent>, ApiError> {
        Err(ApiError::Rpc { code: -32000, message: "execution reverted".into() })
    }
}

#[async_trait]
impl ChainWriter for MockChain {
    async fn submit(&self, tx: &TxRequest) -> Result<TxHash, ApiError> {
        if self.reject_trades && !Self::is_approval(tx) {
            return Err(ApiError::UserRejected);
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(tx.clone());
        let mut hash = TxHash::ZERO;
        hash.0[0] = u8::from(Self::is_approval(tx));
        hash.0[31] = submitted.len() as u8;
        Ok(hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<TxOutcome, ApiError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let is_approval = tx_hash.0[0] == 1;
        if is_approval {
            let submitted = self.submitted.lock().unwrap();
            let index = usize::from(tx_hash.0[31]) - 1;
            if let Some(ContractCall::Approve { amount, .. }) = submitted.get(index).map(|tx| &tx.call) {
                *self.allowance.lock().unwrap() = *amount;
            }
            return Ok(TxOutcome::Success);
        }
        match &self.revert_reason {
            Some(reason) => Ok(TxOutcome::Reverted(reason.clone())),
            None => Ok(TxOutcome::Success),
        }
    }
}
