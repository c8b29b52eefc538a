use chrono::{DateTime, Utc};
use core_types::{ResolverOutcome, TxHash};
use serde::{Deserialize, Serialize};

/// What the resolver currently shows for the latest intent generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSnapshot {
    pub timestamp: DateTime<Utc>,
    /// The generation this snapshot belongs to. Never decreases.
    pub generation: u64,
    pub is_fetching: bool,
    /// `None` while the generation is still being resolved.
    pub outcome: Option<ResolverOutcome>,
}

impl ResolverSnapshot {
    pub fn idle() -> Self {
        Self {
            timestamp: Utc::now(),
            generation: 0,
            is_fetching: false,
            outcome: None,
        }
    }

    pub fn fetching(generation: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            generation,
            is_fetching: true,
            outcome: None,
        }
    }

    pub fn resolved(generation: u64, outcome: ResolverOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            generation,
            is_fetching: false,
            outcome: Some(outcome),
        }
    }
}

/// Status of the trade executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub timestamp: DateTime<Utc>,
    pub is_transacting: bool,
    /// Rendered message of the last failed execution, cleared by the next attempt.
    pub last_error: Option<String>,
    pub last_tx: Option<TxHash>,
}

impl ExecutionSnapshot {
    pub fn idle() -> Self {
        Self {
            timestamp: Utc::now(),
            is_transacting: false,
            last_error: None,
            last_tx: None,
        }
    }

    pub fn transacting() -> Self {
        Self {
            is_transacting: true,
            ..Self::idle()
        }
    }

    pub fn finished(result: Result<TxHash, String>) -> Self {
        let (last_tx, last_error) = match result {
            Ok(hash) => (Some(hash), None),
            Err(message) => (None, Some(message)),
        };
        Self {
            timestamp: Utc::now(),
            is_transacting: false,
            last_error,
            last_tx,
        }
    }
}
