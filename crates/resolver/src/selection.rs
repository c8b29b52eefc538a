//! Deterministic choice of the best option among successful quotes.

use core_types::{QuoteFailure, QuoteResult, QuoteSuccess, ResolverOutcome};
use std::cmp::Ordering;

/// Orders two successes for the same intent; `Less` means `a` is better.
///
/// Issuance prefers the larger guaranteed output. Redemption prefers the
/// smaller sell amount, then the larger guaranteed output. Remaining ties go
/// to the cheaper network cost, then to source priority, so the result never
/// depends on which quote arrived first.
pub fn compare(a: &QuoteSuccess, b: &QuoteSuccess, is_issuance: bool) -> Ordering {
    let by_amounts = if is_issuance {
        b.min_buy_amount.cmp(&a.min_buy_amount)
    } else {
        a.sell_amount
            .cmp(&b.sell_amount)
            .then_with(|| b.min_buy_amount.cmp(&a.min_buy_amount))
    };
    by_amounts
        .then_with(|| a.network_cost().cmp(&b.network_cost()))
        .then_with(|| a.source.priority().cmp(&b.source.priority()))
}

/// Splits settled results into the winning option, the other successes and
/// the failures. Cancelled results must already be filtered out.
pub fn select(results: Vec<QuoteResult>, is_issuance: bool) -> ResolverOutcome {
    let mut successes: Vec<QuoteSuccess> = Vec::new();
    let mut failures: Vec<QuoteFailure> = Vec::new();
    for result in results {
        match result {
            QuoteResult::Success(success) => successes.push(*success),
            QuoteResult::Failure(failure) => failures.push(failure),
        }
    }
    failures.sort_by_key(|f| f.source.priority());
    successes.sort_by(|a, b| compare(a, b, is_issuance));

    let mut ranked = successes.into_iter();
    match ranked.next() {
        Some(best) => ResolverOutcome::Best {
            best: Box::new(best),
            rejected: failures,
            alternatives: ranked.collect(),
        },
        None => ResolverOutcome::AllFailed(failures),
    }
}
