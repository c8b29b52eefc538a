use crate::legs::oracle_failure;
use crate::{CancellationToken, QuoteSource, SourceContext};
use api_client::OracleQuoteRequest;
use async_trait::async_trait;
use core_types::{
    ChainId, ContractCall, ExecutionPlan, QuoteError, QuoteResult, QuoteSourceId, QuoteSuccess, TradeIntent,
};

/// Aggregated market swap, priced and routed entirely by the routing oracle.
pub struct DirectSwapQuoter {
    ctx: SourceContext,
}

impl DirectSwapQuoter {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    async fn try_quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> Result<QuoteSuccess, QuoteError> {
        let amount = intent
            .sell_amount_base_units()
            .map_err(|e| QuoteError::UnsupportedAsset(e.to_string()))?;
        let request = OracleQuoteRequest::exact_sell(
            self.ctx.chain_id,
            intent.sell_asset.address,
            intent.buy_asset.address,
            amount,
        );

        cancel.check()?;
        let quote = self.ctx.oracle.get_quote(&request).await.map_err(oracle_failure)?;
        cancel.check()?;

        let spender = if intent.sell_asset.is_native() {
            None
        } else {
            Some(quote.allowance_target.unwrap_or(quote.to))
        };
        let plan = ExecutionPlan {
            target: quote.to,
            call: ContractCall::Raw { data: quote.data.clone() },
            value: quote.value,
            gas_limit: quote.gas,
            spender,
            max_input: None,
        };

        Ok(QuoteSuccess {
            source: QuoteSourceId::DirectSwap,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount: quote.sell_amount,
            min_buy_amount: quote.min_buy_amount,
            gas_estimate: quote.gas,
            gas_price: quote.gas_price,
            route_sources: quote.active_sources(),
            plan,
        })
    }
}

#[async_trait]
impl QuoteSource for DirectSwapQuoter {
    fn id(&self) -> QuoteSourceId {
        QuoteSourceId::DirectSwap
    }

    fn is_applicable(&self, intent: &TradeIntent, chain_id: ChainId) -> bool {
        self.ctx.serves(intent, chain_id)
    }

    async fn quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> QuoteResult {
        let outcome = cancel
            .run_until_cancelled(self.try_quote(intent, cancel))
            .await
            .unwrap_or(Err(QuoteError::Cancelled));
        match outcome {
            Ok(success) => success.into(),
            Err(reason) => {
                tracing::debug!(source = %self.id(), %reason, "direct swap quote failed");
                QuoteResult::failure(self.id(), reason)
            }
        }
    }
}
