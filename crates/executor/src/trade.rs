use crate::error::ExecutionError;
use allowance::{AllowanceError, AllowanceTracker};
use api_client::{ApiError, ChainReader, ChainWriter, TxOutcome, TxRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::ExecutionSettings;
use core_types::{add_bps, Address, ApprovalKey, ApprovalState, QuoteSourceId, QuoteSuccess, TxHash, U256};
use events::ExecutionSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// A transaction that was mined successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub tx_hash: TxHash,
    pub source: QuoteSourceId,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: DateTime<Utc>,
}

/// A generic trait for an execution engine.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Submits `option` on behalf of `owner` and waits for it to be mined.
    async fn execute(&self, option: &QuoteSuccess, owner: Address) -> Result<TxHandle, ExecutionError>;
}

/// Executes quotes against the chain through a `ChainWriter`.
pub struct TradeExecutor {
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    allowances: Arc<AllowanceTracker>,
    safety_margin_bps: u32,
    transacting: AtomicBool,
    snapshot: watch::Sender<ExecutionSnapshot>,
}

impl TradeExecutor {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        allowances: Arc<AllowanceTracker>,
        settings: &ExecutionSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(ExecutionSnapshot::idle());
        Self {
            reader,
            writer,
            allowances,
            safety_margin_bps: settings.input_safety_margin_bps(),
            transacting: AtomicBool::new(false),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecutionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Makes sure `key.spender` may pull at least `required` of the sell token,
    /// requesting an approval when it may not.
    async fn ensure_approval(&self, key: ApprovalKey, required: U256) -> Result<(), ExecutionError> {
        let state = self
            .allowances
            .refresh(key, required)
            .await
            .map_err(|e| ExecutionError::ChainUnavailable(e.to_string()))?;
        let state = match state {
            ApprovalState::Sufficient => return Ok(()),
            ApprovalState::Approving => self.allowances.settled(key).await,
            _ => match self.allowances.request_approval(key, required).await {
                Ok(ApprovalState::Approving) => self.allowances.settled(key).await,
                Ok(state) => state,
                Err(AllowanceError::NativeAsset) => return Err(ExecutionError::NativeApprovalRequested),
                Err(e) => return Err(ExecutionError::ApprovalRejected(e.to_string())),
            },
        };
        match state {
            ApprovalState::Sufficient => Ok(()),
            ApprovalState::ApprovalFailed(reason) => Err(ExecutionError::ApprovalRejected(reason)),
            other => Err(ExecutionError::ApprovalRejected(format!("approval ended as {other:?}"))),
        }
    }

    async fn run(&self, option: &QuoteSuccess, owner: Address) -> Result<TxHandle, ExecutionError> {
        let plan = &option.plan;
        let sell = &option.sell_asset;

        // Pad the worst-case input, never the guaranteed output.
        let input_limit = plan.max_input.map(|limit| add_bps(limit, self.safety_margin_bps));
        let call = match input_limit {
            Some(limit) => plan.call.with_input_limit(limit),
            None => plan.call.clone(),
        };
        let value = match input_limit {
            Some(limit) if sell.is_native() && !plan.value.is_zero() => limit,
            _ => plan.value,
        };

        if let Some(spender) = plan.spender {
            if sell.is_native() {
                return Err(ExecutionError::NativeApprovalRequested);
            }
            let required = input_limit.unwrap_or(option.sell_amount);
            self.ensure_approval(ApprovalKey::new(owner, sell.address, spender), required)
                .await?;
        }

        let available = self
            .reader
            .read_balance(owner, sell.address)
            .await
            .map_err(|e| ExecutionError::ChainUnavailable(e.to_string()))?;
        // A native sell must also fund the padded value it attaches.
        let required = if sell.is_native() { option.sell_amount.max(value) } else { option.sell_amount };
        if available < required {
            return Err(ExecutionError::InsufficientFunds { required, available });
        }

        let tx = TxRequest {
            from: owner,
            to: plan.target,
            call,
            value,
            gas_limit: plan.gas_limit,
        };
        let submitted_at = Utc::now();
        let tx_hash = self.writer.submit(&tx).await.map_err(|e| match e {
            ApiError::UserRejected => ExecutionError::UserRejected,
            other => ExecutionError::ChainUnavailable(other.to_string()),
        })?;
        tracing::info!(%tx_hash, source = %option.source, %owner, "trade submitted");

        match self.writer.await_receipt(tx_hash).await {
            Ok(TxOutcome::Success) => Ok(TxHandle {
                tx_hash,
                source: option.source,
                submitted_at,
                confirmed_at: Utc::now(),
            }),
            Ok(TxOutcome::Reverted(reason)) => Err(ExecutionError::ExecutionReverted(reason)),
            Err(e) => Err(ExecutionError::ChainUnavailable(e.to_string())),
        }
    }
}

#[async_trait]
impl Executor for TradeExecutor {
    async fn execute(&self, option: &QuoteSuccess, owner: Address) -> Result<TxHandle, ExecutionError> {
        if self.transacting.swap(true, Ordering::SeqCst) {
            return Err(ExecutionError::AlreadyTransacting);
        }
        let _guard = TransactingGuard { executor: self };
        self.snapshot.send_replace(ExecutionSnapshot::transacting());

        let result = self.run(option, owner).await;
        match &result {
            Ok(handle) => tracing::info!(tx_hash = %handle.tx_hash, "trade confirmed"),
            Err(e) => tracing::warn!(source = %option.source, %owner, error = %e, "trade failed"),
        }

        self.snapshot.send_replace(ExecutionSnapshot::finished(
            result.as_ref().map(|h| h.tx_hash).map_err(|e| e.to_string()),
        ));
        result
    }
}

/// Releases the transacting flag even when `execute` is dropped mid-flight.
struct TransactingGuard<'a> {
    executor: &'a TradeExecutor,
}

impl Drop for TransactingGuard<'_> {
    fn drop(&mut self) {
        self.executor.snapshot.send_if_modified(|snapshot| {
            if !snapshot.is_transacting {
                return false;
            }
            *snapshot = ExecutionSnapshot::idle();
            true
        });
        self.executor.transacting.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{BasketComponent, LeveragedTokenData};
    use core_types::{
        Asset, AssetKind, ChainId, ContractCall, ExecutionPlan, SwapData, NATIVE_ASSET_ADDRESS,
    };
    use std::sync::Mutex;

    struct FixedReader {
        allowance: U256,
        balance: U256,
    }

    #[async_trait]
    impl ChainReader for FixedReader {
        async fn read_allowance(&self, _: Address, _: Address, _: Address) -> Result<U256, ApiError> {
            Ok(self.allowance)
        }

        async fn read_balance(&self, _: Address, _: Address) -> Result<U256, ApiError> {
            Ok(self.balance)
        }

        async fn read_leveraged_token_data(
            &self,
            _: Address,
            _: Address,
            _: U256,
            _: bool,
        ) -> Result<LeveragedTokenData, ApiError> {
            Err(ApiError::InvalidData("unused".into()))
        }

        async fn read_basket_components(
            &self,
            _: Address,
            _: Address,
            _: bool,
            _: Address,
            _: U256,
            _: bool,
        ) -> Result<Vec<BasketComponent>, ApiError> {
            Err(ApiError::InvalidData("unused".into()))
        }
    }

    /// Records every transaction. `reject` makes the signer decline trades and
    /// `revert_trades` makes mined trades revert. `stall_receipts` never mines.
    #[derive(Default)]
    struct RecordingWriter {
        submitted: Mutex<Vec<TxRequest>>,
        reject: bool,
        revert_trades: bool,
        stall_receipts: bool,
    }

    #[async_trait]
    impl ChainWriter for RecordingWriter {
        async fn submit(&self, tx: &TxRequest) -> Result<TxHash, ApiError> {
            let is_approval = matches!(tx.call, ContractCall::Approve { .. });
            if self.reject && !is_approval {
                return Err(ApiError::UserRejected);
            }
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(tx.clone());
            let base: u8 = if is_approval { 0xa0 } else { 0xb0 };
            let marker = base + submitted.len() as u8;
            Ok(TxHash::repeat_byte(marker))
        }

        async fn await_receipt(&self, hash: TxHash) -> Result<TxOutcome, ApiError> {
            if self.stall_receipts {
                std::future::pending::<()>().await;
            }
            if self.revert_trades && hash.0[0] >= 0xb0 {
                return Ok(TxOutcome::Reverted("EXCESSIVE_INPUT_AMOUNT".into()));
            }
            Ok(TxOutcome::Success)
        }
    }

    fn owner() -> Address {
        Address::repeat_byte(0x01)
    }

    fn usdc() -> Asset {
        Asset {
            chain_id: ChainId::MAINNET,
            address: Address::repeat_byte(0x02),
            symbol: "USDC".into(),
            decimals: 6,
            kind: AssetKind::Currency,
        }
    }

    fn eth() -> Asset {
        Asset {
            address: NATIVE_ASSET_ADDRESS,
            symbol: "ETH".into(),
            decimals: 18,
            ..usdc()
        }
    }

    fn basket() -> Asset {
        Asset {
            address: Address::repeat_byte(0x44),
            symbol: "ETH2X".into(),
            decimals: 18,
            kind: AssetKind::LeveragedBasket,
            ..usdc()
        }
    }

    fn issuance_option(sell: Asset, amount: u64) -> QuoteSuccess {
        let contract = Address::repeat_byte(0xe1);
        let (call, value, spender) = if sell.is_native() {
            let call = ContractCall::IssueExactSetFromEth {
                set_token: basket().address,
                set_amount: U256::from(7u64),
                swap_data_debt_for_collateral: SwapData::no_swap(Address::ZERO),
                swap_data_input_token: SwapData::no_swap(Address::ZERO),
            };
            (call, U256::from(amount), None)
        } else {
            let call = ContractCall::IssueExactSetFromErc20 {
                set_token: basket().address,
                set_amount: U256::from(7u64),
                input_token: sell.address,
                max_amount_input_token: U256::from(amount),
                swap_data_debt_for_collateral: SwapData::no_swap(Address::ZERO),
                swap_data_input_token: SwapData::no_swap(Address::ZERO),
            };
            (call, U256::ZERO, Some(contract))
        };
        QuoteSuccess {
            source: QuoteSourceId::LeveragedIssuance,
            sell_asset: sell,
            buy_asset: basket(),
            sell_amount: U256::from(amount),
            min_buy_amount: U256::from(7u64),
            gas_estimate: 1_800_000,
            gas_price: U256::from(1u64),
            route_sources: Vec::new(),
            plan: ExecutionPlan {
                target: contract,
                call,
                value,
                gas_limit: 1_800_000,
                spender,
                max_input: Some(U256::from(amount)),
            },
        }
    }

    fn executor(reader: FixedReader, writer: Arc<RecordingWriter>) -> TradeExecutor {
        let reader: Arc<dyn ChainReader> = Arc::new(reader);
        let allowances = Arc::new(AllowanceTracker::new(reader.clone(), writer.clone()));
        TradeExecutor::new(reader, writer, allowances, &ExecutionSettings::default())
    }

    #[tokio::test]
    async fn erc20_trade_approves_then_submits_padded_limit() {
        let writer = Arc::new(RecordingWriter::default());
        let reader = FixedReader { allowance: U256::ZERO, balance: U256::from(1_000_000u64) };
        let executor = executor(reader, writer.clone());

        let handle = executor.execute(&issuance_option(usdc(), 1_000_000), owner()).await.unwrap();
        assert_eq!(handle.source, QuoteSourceId::LeveragedIssuance);

        let submitted = writer.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 2);
        assert!(matches!(submitted[0].call, ContractCall::Approve { amount, .. } if amount == U256::MAX));
        let ContractCall::IssueExactSetFromErc20 { max_amount_input_token, set_amount, .. } = &submitted[1].call
        else {
            panic!("unexpected call {:?}", submitted[1].call);
        };
        // 0.50% extra input, semantic amount untouched.
        assert_eq!(*max_amount_input_token, U256::from(1_005_000u64));
        assert_eq!(*set_amount, U256::from(7u64));
        assert_eq!(submitted[1].gas_limit, 1_800_000);

        let snapshot = executor.snapshot();
        assert!(!snapshot.is_transacting);
        assert_eq!(snapshot.last_tx, Some(handle.tx_hash));
    }

    #[tokio::test]
    async fn native_trade_skips_approval_and_pads_value() {
        let writer = Arc::new(RecordingWriter::default());
        let reader = FixedReader { allowance: U256::ZERO, balance: U256::from(10_000u64) };
        let executor = executor(reader, writer.clone());

        executor.execute(&issuance_option(eth(), 2_000), owner()).await.unwrap();
        let submitted = writer.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].value, U256::from(2_010u64));
    }

    #[tokio::test]
    async fn balance_is_rechecked_at_submission() {
        let writer = Arc::new(RecordingWriter::default());
        let reader = FixedReader { allowance: U256::MAX, balance: U256::from(10u64) };
        let executor = executor(reader, writer.clone());

        let err = executor.execute(&issuance_option(usdc(), 1_000), owner()).await.unwrap_err();
        assert_eq!(
            err,
            ExecutionError::InsufficientFunds { required: U256::from(1_000u64), available: U256::from(10u64) }
        );
        assert!(writer.submitted.lock().unwrap().is_empty());
        assert_eq!(executor.snapshot().last_error, Some(err.to_string()));
    }

    #[tokio::test]
    async fn declined_signature_is_user_rejected() {
        let writer = Arc::new(RecordingWriter { reject: true, ..Default::default() });
        let reader = FixedReader { allowance: U256::MAX, balance: U256::MAX };
        let executor = executor(reader, writer);
        let err = executor.execute(&issuance_option(usdc(), 1_000), owner()).await.unwrap_err();
        assert_eq!(err, ExecutionError::UserRejected);
    }

    #[tokio::test]
    async fn revert_reason_is_surfaced_verbatim() {
        let writer = Arc::new(RecordingWriter { revert_trades: true, ..Default::default() });
        let reader = FixedReader { allowance: U256::MAX, balance: U256::MAX };
        let executor = executor(reader, writer);
        let err = executor.execute(&issuance_option(usdc(), 1_000), owner()).await.unwrap_err();
        assert_eq!(err, ExecutionError::ExecutionReverted("EXCESSIVE_INPUT_AMOUNT".into()));
    }

    #[tokio::test]
    async fn native_balance_must_cover_the_padded_value() {
        let writer = Arc::new(RecordingWriter::default());
        // Enough for the quote, short of the 0.50% padding.
        let reader = FixedReader { allowance: U256::ZERO, balance: U256::from(2_000u64) };
        let executor = executor(reader, writer.clone());

        let err = executor.execute(&issuance_option(eth(), 2_000), owner()).await.unwrap_err();
        assert_eq!(
            err,
            ExecutionError::InsufficientFunds { required: U256::from(2_010u64), available: U256::from(2_000u64) }
        );
        assert!(writer.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_execution_releases_the_transacting_flag() {
        let writer = Arc::new(RecordingWriter { stall_receipts: true, ..Default::default() });
        let reader = FixedReader { allowance: U256::MAX, balance: U256::MAX };
        let executor = executor(reader, writer.clone());
        let option = issuance_option(usdc(), 1_000);

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_secs(1), executor.execute(&option, owner())).await;
        assert!(abandoned.is_err());
        assert!(!executor.transacting.load(Ordering::SeqCst));
        assert!(!executor.snapshot().is_transacting);

        // The next attempt is not refused; it stalls on its own receipt instead.
        let retried =
            tokio::time::timeout(std::time::Duration::from_secs(1), executor.execute(&option, owner())).await;
        assert!(retried.is_err());
        assert_eq!(writer.submitted.lock().unwrap().len(), 2);
    }
}
