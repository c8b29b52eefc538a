use crate::error::AllowanceError;
use api_client::{ApiError, ChainReader, ChainWriter, TxOutcome, TxRequest};
use core_types::{ApprovalKey, ApprovalState, ContractCall, U256, NATIVE_ASSET_ADDRESS};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Gas limit attached to ERC-20 `approve` transactions.
pub const APPROVAL_GAS_LIMIT: u64 = 100_000;

/// Every triple the tracker has seen, with its latest state.
pub type ApprovalSnapshot = HashMap<ApprovalKey, ApprovalState>;

type AllowanceRead = Shared<BoxFuture<'static, Result<U256, AllowanceError>>>;

/// A chain read shared by every concurrent `refresh` of one triple.
struct PendingRead {
    id: u64,
    /// Amount the refresh that started the read asked about; the stored state
    /// is classified against it.
    required: U256,
    read: AllowanceRead,
}

#[derive(Default)]
struct Entry {
    state: ApprovalState,
    pending: Option<PendingRead>,
    /// Bumped when an approval starts; reads begun under an older epoch are discarded.
    epoch: u64,
}

/// Tracks ERC-20 approval state per (owner, token, spender).
///
/// The chain is the source of truth: states are only ever derived from the
/// latest read or approval receipt, and nothing is retried on its own.
pub struct AllowanceTracker {
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    entries: Mutex<HashMap<ApprovalKey, Entry>>,
    next_read: AtomicU64,
    states: watch::Sender<ApprovalSnapshot>,
}

impl AllowanceTracker {
    pub fn new(reader: Arc<dyn ChainReader>, writer: Arc<dyn ChainWriter>) -> Self {
        let (states, _) = watch::channel(ApprovalSnapshot::new());
        Self {
            reader,
            writer,
            entries: Mutex::new(HashMap::new()),
            next_read: AtomicU64::new(1),
            states,
        }
    }

    /// Latest known state; `Unknown` for a triple never refreshed.
    pub fn current_state(&self, key: ApprovalKey) -> ApprovalState {
        if key.token == NATIVE_ASSET_ADDRESS {
            return ApprovalState::Sufficient;
        }
        self.states.borrow().get(&key).cloned().unwrap_or_default()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApprovalSnapshot> {
        self.states.subscribe()
    }

    fn publish(&self, entries: &HashMap<ApprovalKey, Entry>) {
        let snapshot = entries.iter().map(|(key, entry)| (*key, entry.state.clone())).collect();
        self.states.send_replace(snapshot);
    }

    /// Reads the on-chain allowance and classifies it against `required`.
    ///
    /// Concurrent refreshes of one triple share a single chain read. While an
    /// approval is in flight the state is left as `Approving`.
    pub async fn refresh(&self, key: ApprovalKey, required: U256) -> Result<ApprovalState, AllowanceError> {
        if key.token == NATIVE_ASSET_ADDRESS {
            return Ok(ApprovalState::Sufficient);
        }

        let (read_id, read, epoch) = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key).or_default();
            if entry.state == ApprovalState::Approving {
                return Ok(ApprovalState::Approving);
            }
            let epoch = entry.epoch;
            let in_flight = entry.pending.as_ref().map(|pending| (pending.id, pending.read.clone()));
            let joined = match in_flight {
                Some((id, read)) => (id, read, epoch),
                None => {
                    let id = self.next_read.fetch_add(1, Ordering::Relaxed);
                    let reader = Arc::clone(&self.reader);
                    let read = async move {
                        reader
                            .read_allowance(key.owner, key.token, key.spender)
                            .await
                            .map_err(|e| AllowanceError::ReadFailed(e.to_string()))
                    }
                    .boxed()
                    .shared();
                    entry.pending = Some(PendingRead { id, required, read: read.clone() });
                    entry.state = ApprovalState::Checking;
                    tracing::debug!(%key, "reading allowance");
                    (id, read, epoch)
                }
            };
            self.publish(&entries);
            joined
        };

        let result = read.await;

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_default();
        if entry.epoch != epoch {
            // An approval started meanwhile; this read no longer describes the chain.
            return Ok(entry.state.clone());
        }
        if let Some(pending) = entry.pending.take_if(|pending| pending.id == read_id) {
            if let Err(err) = &result {
                tracing::warn!(%key, error = %err, "allowance read failed");
            }
            entry.state = classify(&result, pending.required).unwrap_or_default();
            self.publish(&entries);
        }
        classify(&result, required)
    }

    /// Submits an unlimited approval for `key.spender` and waits for its receipt.
    ///
    /// Does nothing when the triple is already `Sufficient` or `Approving`; the
    /// current state is returned instead. `required` is only logged: the
    /// approval is always for `U256::MAX`, so later trades need no new approval.
    pub async fn request_approval(&self, key: ApprovalKey, required: U256) -> Result<ApprovalState, AllowanceError> {
        if key.token == NATIVE_ASSET_ADDRESS {
            return Err(AllowanceError::NativeAsset);
        }
        {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key).or_default();
            if matches!(entry.state, ApprovalState::Sufficient | ApprovalState::Approving) {
                return Ok(entry.state.clone());
            }
            entry.state = ApprovalState::Approving;
            entry.epoch += 1;
            entry.pending = None;
            self.publish(&entries);
        }
        tracing::info!(%key, %required, "requesting unlimited approval");

        let tx = TxRequest {
            from: key.owner,
            to: key.token,
            call: ContractCall::Approve {
                spender: key.spender,
                amount: U256::MAX,
            },
            value: U256::ZERO,
            gas_limit: APPROVAL_GAS_LIMIT,
        };
        let outcome = match self.writer.submit(&tx).await {
            Ok(hash) => self.writer.await_receipt(hash).await,
            Err(err) => Err(err),
        };
        let state = match outcome {
            Ok(TxOutcome::Success) => ApprovalState::Sufficient,
            Ok(TxOutcome::Reverted(reason)) => ApprovalState::ApprovalFailed(reason),
            Err(ApiError::UserRejected) => ApprovalState::ApprovalFailed("user rejected the approval".into()),
            Err(err) => ApprovalState::ApprovalFailed(err.to_string()),
        };
        match &state {
            ApprovalState::ApprovalFailed(reason) => tracing::warn!(%key, %reason, "approval failed"),
            _ => tracing::info!(%key, "approval confirmed"),
        }

        let mut entries = self.entries.lock().await;
        entries.entry(key).or_default().state = state.clone();
        self.publish(&entries);
        Ok(state)
    }

    /// Waits until no approval is in flight for `key`, then returns its state.
    pub async fn settled(&self, key: ApprovalKey) -> ApprovalState {
        let mut states = self.states.subscribe();
        let settled = states
            .wait_for(|snapshot| snapshot.get(&key) != Some(&ApprovalState::Approving))
            .await
            .map(|snapshot| snapshot.get(&key).cloned().unwrap_or_default());
        // The sender lives in `self`, so the channel cannot close while borrowed.
        settled.unwrap_or_default()
    }
}

fn classify(result: &Result<U256, AllowanceError>, required: U256) -> Result<ApprovalState, AllowanceError> {
    match result {
        Ok(allowance) if *allowance >= required => Ok(ApprovalState::Sufficient),
        Ok(allowance) => Ok(ApprovalState::Insufficient(*allowance)),
        Err(err) => Err(err.clone()),
    }
}
