use crate::direct_swap::DirectSwapQuoter;
use crate::leveraged::LeveragedIssuanceQuoter;
use crate::zero_ex_issuance::{BasketIssuanceDeployment, ZeroExIssuanceQuoter};
use crate::{QuoteSource, SourceContext};
use configuration::{ChainSettings, Config};
use core_types::QuoteSourceId;
use std::sync::Arc;

/// Creates the quoter for `id` on the chain described by `chain`.
///
/// A chain without the relevant contract deployment still gets a quoter; it
/// simply reports itself inapplicable to every intent.
pub fn create_quote_source(
    id: QuoteSourceId,
    ctx: SourceContext,
    config: &Config,
    chain: &ChainSettings,
) -> Arc<dyn QuoteSource> {
    let execution = &config.execution;
    // A new QuoteSourceId must be wired in here.
    match id {
        QuoteSourceId::DirectSwap => Arc::new(DirectSwapQuoter::new(ctx)),
        QuoteSourceId::LeveragedIssuance => Arc::new(LeveragedIssuanceQuoter::new(
            ctx,
            chain.leveraged_issuance,
            execution.collateral_buffer_bps(),
            execution.redemption_amount_multiplier,
            execution.gas_limits.clone(),
        )),
        QuoteSourceId::ZeroExIssuance => {
            let deployment = chain
                .zero_ex_issuance
                .zip(chain.issuance_module)
                .map(|(contract, issuance_module)| BasketIssuanceDeployment {
                    contract,
                    issuance_module,
                    is_debt_issuance: chain.is_debt_issuance,
                });
            Arc::new(ZeroExIssuanceQuoter::new(
                ctx,
                deployment,
                execution.collateral_buffer_bps(),
                execution.gas_limits.basket_issuance,
            ))
        }
    }
}

/// Every quoter, in priority order, for one chain.
pub fn create_quote_sources(ctx: SourceContext, config: &Config, chain: &ChainSettings) -> Vec<Arc<dyn QuoteSource>> {
    QuoteSourceId::ALL
        .into_iter()
        .map(|id| create_quote_source(id, ctx.clone(), config, chain))
        .collect()
}
