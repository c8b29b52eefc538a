use crate::resolver::BestTradeResolver;
use configuration::ResolverSettings;
use core_types::{ResolverOutcome, TradeIntent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Turns a stream of user inputs into resolver generations.
///
/// Only a structurally different intent starts a new generation. With a
/// debounce configured, the generation waits before quoting and is dropped
/// if a newer intent arrives first.
pub struct IntentTracker {
    resolver: Arc<BestTradeResolver>,
    debounce: Duration,
    last: Mutex<Option<TradeIntent>>,
}

impl IntentTracker {
    pub fn new(resolver: Arc<BestTradeResolver>, settings: &ResolverSettings) -> Self {
        Self {
            resolver,
            debounce: Duration::from_millis(settings.debounce_ms),
            last: Mutex::new(None),
        }
    }

    pub fn resolver(&self) -> &Arc<BestTradeResolver> {
        &self.resolver
    }

    /// Resolves `intent` unless it equals the last one submitted, in which
    /// case `None` is returned and no work is started.
    pub async fn submit(&self, intent: TradeIntent) -> Option<ResolverOutcome> {
        let generation = {
            let mut last = self.last.lock().await;
            if last.as_ref() == Some(&intent) {
                tracing::debug!("intent unchanged, keeping current generation");
                return None;
            }
            *last = Some(intent.clone());
            // Held across `begin` so generation order follows submission order.
            self.resolver.begin().await
        };
        Some(self.run(generation, &intent).await)
    }

    /// Re-runs the last submitted intent as a new generation ("Try again").
    pub async fn retry(&self) -> Option<ResolverOutcome> {
        let (generation, intent) = {
            let last = self.last.lock().await;
            let intent = last.clone()?;
            (self.resolver.begin().await, intent)
        };
        Some(self.run(generation, &intent).await)
    }

    async fn run(&self, generation: crate::Generation, intent: &TradeIntent) -> ResolverOutcome {
        if !self.debounce.is_zero() {
            let waited = generation
                .cancel_token()
                .run_until_cancelled(tokio::time::sleep(self.debounce))
                .await;
            if waited.is_none() {
                return ResolverOutcome::Superseded {
                    generation: generation.number(),
                };
            }
        }
        self.resolver.resolve(&generation, intent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{intent, StubSource};
    use core_types::{ChainId, QuoteSourceId, U256};
    use quote_sources::QuoteSource;

    fn tracker(source: Arc<StubSource>, debounce_ms: u64) -> IntentTracker {
        let settings = ResolverSettings {
            source_timeout_ms: 0,
            debounce_ms,
        };
        let sources: Vec<Arc<dyn QuoteSource>> = vec![source];
        let resolver = Arc::new(BestTradeResolver::new(ChainId::MAINNET, sources, &settings));
        IntentTracker::new(resolver, &settings)
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_intent_starts_no_generation() {
        let source = Arc::new(StubSource::new(QuoteSourceId::DirectSwap, 10));
        let tracker = tracker(source.clone(), 0);

        assert!(tracker.submit(intent("1")).await.is_some());
        assert!(tracker.submit(intent("1")).await.is_none());
        assert_eq!(source.calls(), 1);
        assert_eq!(tracker.resolver().latest_generation(), 1);

        assert!(tracker.submit(intent("1.0")).await.is_some());
        assert_eq!(tracker.resolver().latest_generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_intent_is_dropped_before_quoting() {
        let source = Arc::new(StubSource::new(QuoteSourceId::DirectSwap, 10));
        let tracker = tracker(source.clone(), 300);

        let first = tracker.submit(intent("1"));
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tracker.submit(intent("2")).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, Some(ResolverOutcome::Superseded { generation: 1 }));
        let best = second.as_ref().and_then(|o| o.best()).map(|b| b.min_buy_amount);
        assert_eq!(best, Some(U256::from(2u64)));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_runs_the_same_intent_again() {
        let source = Arc::new(StubSource::new(QuoteSourceId::DirectSwap, 10));
        let tracker = tracker(source.clone(), 0);
        assert!(tracker.retry().await.is_none());

        tracker.submit(intent("5")).await;
        let again = tracker.retry().await;
        assert!(again.is_some_and(|o| o.best().is_some()));
        assert_eq!(source.calls(), 2);
    }
}
