use crate::selection::select;
use configuration::ResolverSettings;
use core_types::{ChainId, QuoteError, QuoteResult, ResolverOutcome, TradeIntent};
use events::ResolverSnapshot;
use futures::future::join_all;
use quote_sources::{CancellationToken, QuoteSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// One intent generation: its number and the token every quote call of the
/// generation observes.
#[derive(Debug, Clone)]
pub struct Generation {
    number: u64,
    cancel: CancellationToken,
}

impl Generation {
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Fans a `TradeIntent` out to every applicable quote source on one chain and
/// picks the best option.
pub struct BestTradeResolver {
    chain_id: ChainId,
    sources: Vec<Arc<dyn QuoteSource>>,
    source_timeout: Option<Duration>,
    /// Token of the newest generation; replaced (and the old one cancelled) by `begin`.
    current: Mutex<Option<CancellationToken>>,
    latest: AtomicU64,
    snapshot: watch::Sender<ResolverSnapshot>,
}

impl BestTradeResolver {
    pub fn new(chain_id: ChainId, sources: Vec<Arc<dyn QuoteSource>>, settings: &ResolverSettings) -> Self {
        let (snapshot, _) = watch::channel(ResolverSnapshot::idle());
        let source_timeout = (settings.source_timeout_ms > 0).then(|| Duration::from_millis(settings.source_timeout_ms));
        Self {
            chain_id,
            sources,
            source_timeout,
            current: Mutex::new(None),
            latest: AtomicU64::new(0),
            snapshot,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Current outcome and fetching flag for the presentation layer.
    pub fn snapshot(&self) -> ResolverSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolverSnapshot> {
        self.snapshot.subscribe()
    }

    /// Starts a new generation, cancelling whichever one was in flight.
    pub async fn begin(&self) -> Generation {
        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let number = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        *current = Some(cancel.clone());
        drop(current);

        self.publish(number, ResolverSnapshot::fetching(number));
        Generation { number, cancel }
    }

    /// Starts a new generation for `intent` and resolves it.
    pub async fn fetch_and_compare(&self, intent: &TradeIntent) -> ResolverOutcome {
        let generation = self.begin().await;
        self.resolve(&generation, intent).await
    }

    /// Quotes `intent` on every applicable source concurrently and selects the
    /// best success.
    ///
    /// Returns `Superseded` if a newer generation began meanwhile; in that case
    /// nothing is published and no result of this generation is kept.
    pub async fn resolve(&self, generation: &Generation, intent: &TradeIntent) -> ResolverOutcome {
        let number = generation.number;
        if self.is_stale(generation) {
            return ResolverOutcome::Superseded { generation: number };
        }

        let applicable: Vec<&Arc<dyn QuoteSource>> = self
            .sources
            .iter()
            .filter(|source| source.is_applicable(intent, self.chain_id))
            .collect();
        info!(
            generation = number,
            applicable = applicable.len(),
            sell = %intent.sell_asset.symbol,
            buy = %intent.buy_asset.symbol,
            amount = %intent.sell_amount,
            "fetching quotes"
        );

        let calls = applicable
            .iter()
            .map(|source| self.quote_one(source.as_ref(), intent, &generation.cancel));
        let results = join_all(calls).await;

        if self.is_stale(generation) {
            debug!(generation = number, "discarding results of a superseded generation");
            return ResolverOutcome::Superseded { generation: number };
        }

        let settled: Vec<QuoteResult> = results.into_iter().filter(|r| !r.is_cancelled()).collect();
        let outcome = select(settled, intent.is_issuance);
        match &outcome {
            ResolverOutcome::Best { best, rejected, .. } => info!(
                generation = number,
                source = %best.source,
                min_buy = %best.min_buy_amount,
                rejected = rejected.len(),
                "best option selected"
            ),
            ResolverOutcome::AllFailed(failures) => {
                warn!(generation = number, failures = failures.len(), "no source produced a quote")
            }
            ResolverOutcome::Superseded { .. } => {}
        }

        self.publish(number, ResolverSnapshot::resolved(number, outcome.clone()));
        outcome
    }

    fn is_stale(&self, generation: &Generation) -> bool {
        generation.is_cancelled() || self.latest.load(Ordering::SeqCst) != generation.number
    }

    /// Publishes unless a newer generation already owns the snapshot.
    fn publish(&self, number: u64, next: ResolverSnapshot) {
        self.snapshot.send_if_modified(|snapshot| {
            if number >= snapshot.generation {
                *snapshot = next;
                true
            } else {
                false
            }
        });
    }

    async fn quote_one(
        &self,
        source: &dyn QuoteSource,
        intent: &TradeIntent,
        cancel: &CancellationToken,
    ) -> QuoteResult {
        let id = source.id();
        let call = cancel.run_until_cancelled(source.quote(intent, cancel));
        let settled = match self.source_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(settled) => settled,
                Err(_) => {
                    warn!(source = %id, timeout_ms = limit.as_millis() as u64, "quote source timed out");
                    return QuoteResult::failure(id, QuoteError::Timeout);
                }
            },
            None => call.await,
        };
        let result = settled.unwrap_or_else(|| QuoteResult::failure(id, QuoteError::Cancelled));
        if let QuoteResult::Failure(failure) = &result {
            if failure.reason != QuoteError::Cancelled {
                warn!(source = %id, reason = %failure.reason, "quote source failed");
            }
        }
        result
    }
}
