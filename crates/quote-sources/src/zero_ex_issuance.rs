use crate::legs::{estimate_gas, leg_token, max_gas_price, merge_sources, one_unit, quote_leg};
use crate::{CancellationToken, QuoteSource, SourceContext};
use api_client::{BasketComponent, OracleQuote, OracleQuoteRequest};
use async_trait::async_trait;
use core_types::{
    Address, Asset, AssetKind, Bytes, ChainId, ComponentQuote, ContractCall, ExecutionPlan, QuoteError, QuoteResult,
    QuoteSourceId, QuoteSuccess, TradeIntent, U256, BPS_DENOMINATOR,
};
use futures::future::try_join_all;

/// Gas for minting or burning the basket and moving its constituents, on top
/// of the component swaps.
const ISSUANCE_OVERHEAD_GAS: u64 = 300_000;

/// Deployment of the basket exchange-issuance contract on one chain.
#[derive(Debug, Clone, Copy)]
pub struct BasketIssuanceDeployment {
    pub contract: Address,
    pub issuance_module: Address,
    pub is_debt_issuance: bool,
}

/// Mints or burns a plain basket directly, buying or selling every
/// constituent through the routing oracle in the same transaction.
pub struct ZeroExIssuanceQuoter {
    ctx: SourceContext,
    deployment: Option<BasketIssuanceDeployment>,
    collateral_buffer_bps: u32,
    gas_limit: u64,
}

/// One constituent together with the routed swap that provides it, or `None`
/// when the constituent is the trade's own input/output token.
struct PricedComponent {
    component: BasketComponent,
    quote: Option<OracleQuote>,
}

impl PricedComponent {
    fn component_quote(&self) -> ComponentQuote {
        ComponentQuote {
            component: self.component.token,
            amount: self.component.amount,
            calldata: self.quote.as_ref().map(|q| q.data.clone()).unwrap_or_else(Bytes::new),
        }
    }

    fn max_sell(&self) -> U256 {
        self.quote.as_ref().map_or(self.component.amount, |q| q.max_sell_amount)
    }

    fn min_buy(&self) -> U256 {
        self.quote.as_ref().map_or(self.component.amount, |q| q.min_buy_amount)
    }
}

impl ZeroExIssuanceQuoter {
    pub fn new(
        ctx: SourceContext,
        deployment: Option<BasketIssuanceDeployment>,
        collateral_buffer_bps: u32,
        gas_limit: u64,
    ) -> Self {
        Self {
            ctx,
            deployment,
            collateral_buffer_bps,
            gas_limit,
        }
    }

    async fn components(
        &self,
        deployment: BasketIssuanceDeployment,
        basket: &Asset,
        amount: U256,
        is_issuance: bool,
    ) -> Result<Vec<BasketComponent>, QuoteError> {
        let components = self
            .ctx
            .reader
            .read_basket_components(
                deployment.contract,
                deployment.issuance_module,
                deployment.is_debt_issuance,
                basket.address,
                amount,
                is_issuance,
            )
            .await
            .map_err(|e| QuoteError::UnsupportedAsset(format!("{} components unavailable: {e}", basket.symbol)))?;
        if components.is_empty() {
            return Err(QuoteError::UnsupportedAsset(format!("{} has no components", basket.symbol)));
        }
        Ok(components)
    }

    /// Quotes `input -> component` for the exact component amount, concurrently.
    async fn buy_components(
        &self,
        input_token: Address,
        components: Vec<BasketComponent>,
        cancel: &CancellationToken,
    ) -> Result<Vec<PricedComponent>, QuoteError> {
        try_join_all(components.into_iter().map(|component| async move {
            let quote = if component.token == input_token || component.amount.is_zero() {
                None
            } else {
                let request =
                    OracleQuoteRequest::exact_buy(self.ctx.chain_id, input_token, component.token, component.amount);
                Some(quote_leg(self.ctx.oracle.as_ref(), request, cancel).await?)
            };
            Ok::<_, QuoteError>(PricedComponent { component, quote })
        }))
        .await
    }

    /// Quotes `component -> output` for the exact released amount, concurrently.
    async fn sell_components(
        &self,
        output_token: Address,
        components: Vec<BasketComponent>,
        cancel: &CancellationToken,
    ) -> Result<Vec<PricedComponent>, QuoteError> {
        try_join_all(components.into_iter().map(|component| async move {
            let quote = if component.token == output_token || component.amount.is_zero() {
                None
            } else {
                let request =
                    OracleQuoteRequest::exact_sell(self.ctx.chain_id, component.token, output_token, component.amount);
                Some(quote_leg(self.ctx.oracle.as_ref(), request, cancel).await?)
            };
            Ok::<_, QuoteError>(PricedComponent { component, quote })
        }))
        .await
    }

    async fn quote_issuance(
        &self,
        deployment: BasketIssuanceDeployment,
        intent: &TradeIntent,
        basket: &Asset,
        cancel: &CancellationToken,
    ) -> Result<QuoteSuccess, QuoteError> {
        let budget = intent
            .sell_amount_base_units()
            .map_err(|e| QuoteError::UnsupportedAsset(e.to_string()))?;
        let input_token = leg_token(&intent.sell_asset, self.ctx.wrapped_native);
        let unit = one_unit(basket.decimals);

        // Price one whole basket first to size the order.
        let per_unit = self.components(deployment, basket, unit, true).await?;
        cancel.check()?;
        let unit_cost = self
            .buy_components(input_token, per_unit, cancel)
            .await?
            .iter()
            .fold(U256::ZERO, |acc, c| acc.saturating_add(c.max_sell()));
        if unit_cost.is_zero() {
            return Err(QuoteError::LegQuoteFailed(format!("{} prices at zero", basket.symbol)));
        }

        let denominator = unit_cost.saturating_mul(U256::from(BPS_DENOMINATOR + self.collateral_buffer_bps));
        let amount_set_token = unit.saturating_mul(budget).saturating_mul(U256::from(BPS_DENOMINATOR)) / denominator;
        if amount_set_token.is_zero() {
            return Err(QuoteError::LegQuoteFailed("sell amount too small to issue any basket".into()));
        }

        let required = self.components(deployment, basket, amount_set_token, true).await?;
        cancel.check()?;
        let priced = self.buy_components(input_token, required, cancel).await?;
        let max_input = priced.iter().fold(U256::ZERO, |acc, c| acc.saturating_add(c.max_sell()));
        if max_input > budget {
            return Err(QuoteError::LegQuoteFailed(format!(
                "components cost {max_input}, more than the {budget} offered"
            )));
        }

        let component_quotes = priced.iter().map(PricedComponent::component_quote).collect();
        let (call, value, spender) = if intent.sell_asset.is_native() {
            let call = ContractCall::IssueBasketFromEth {
                set_token: basket.address,
                amount_set_token,
                component_quotes,
                issuance_module: deployment.issuance_module,
                is_debt_issuance: deployment.is_debt_issuance,
            };
            (call, max_input, None)
        } else {
            let call = ContractCall::IssueBasketFromToken {
                set_token: basket.address,
                input_token: intent.sell_asset.address,
                amount_set_token,
                max_amount_input_token: max_input,
                component_quotes,
                issuance_module: deployment.issuance_module,
                is_debt_issuance: deployment.is_debt_issuance,
            };
            (call, U256::ZERO, Some(deployment.contract))
        };

        Ok(self.success(intent, max_input, amount_set_token, &priced, ExecutionPlan {
            target: deployment.contract,
            call,
            value,
            gas_limit: self.gas_limit,
            spender,
            max_input: Some(max_input),
        }))
    }

    async fn quote_redemption(
        &self,
        deployment: BasketIssuanceDeployment,
        intent: &TradeIntent,
        basket: &Asset,
        cancel: &CancellationToken,
    ) -> Result<QuoteSuccess, QuoteError> {
        let amount_set_token = intent
            .sell_amount_base_units()
            .map_err(|e| QuoteError::UnsupportedAsset(e.to_string()))?;
        let output_token = leg_token(&intent.buy_asset, self.ctx.wrapped_native);

        let released = self.components(deployment, basket, amount_set_token, false).await?;
        cancel.check()?;
        let priced = self.sell_components(output_token, released, cancel).await?;
        let min_output = priced.iter().fold(U256::ZERO, |acc, c| acc.saturating_add(c.min_buy()));

        let component_quotes = priced.iter().map(PricedComponent::component_quote).collect();
        let call = if intent.buy_asset.is_native() {
            ContractCall::RedeemBasketForEth {
                set_token: basket.address,
                amount_set_token,
                min_eth_receive: min_output,
                component_quotes,
                issuance_module: deployment.issuance_module,
                is_debt_issuance: deployment.is_debt_issuance,
            }
        } else {
            ContractCall::RedeemBasketForToken {
                set_token: basket.address,
                output_token: intent.buy_asset.address,
                amount_set_token,
                min_output_receive: min_output,
                component_quotes,
                issuance_module: deployment.issuance_module,
                is_debt_issuance: deployment.is_debt_issuance,
            }
        };

        Ok(self.success(intent, amount_set_token, min_output, &priced, ExecutionPlan {
            target: deployment.contract,
            call,
            value: U256::ZERO,
            gas_limit: self.gas_limit,
            spender: Some(deployment.contract),
            max_input: None,
        }))
    }

    fn success(
        &self,
        intent: &TradeIntent,
        sell_amount: U256,
        min_buy_amount: U256,
        priced: &[PricedComponent],
        plan: ExecutionPlan,
    ) -> QuoteSuccess {
        let legs = || priced.iter().filter_map(|c| c.quote.as_ref());
        QuoteSuccess {
            source: QuoteSourceId::ZeroExIssuance,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount,
            min_buy_amount,
            gas_estimate: estimate_gas(ISSUANCE_OVERHEAD_GAS, self.gas_limit, legs()),
            gas_price: max_gas_price(legs()),
            route_sources: merge_sources(legs()),
            plan,
        }
    }

    async fn try_quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> Result<QuoteSuccess, QuoteError> {
        let deployment = self
            .deployment
            .ok_or_else(|| QuoteError::UnsupportedAsset("no basket issuance contract on this chain".into()))?;
        let basket = intent
            .basket_asset()
            .ok_or_else(|| QuoteError::UnsupportedAsset("trade does not involve a basket".into()))?;
        if intent.is_issuance {
            self.quote_issuance(deployment, intent, basket, cancel).await
        } else {
            self.quote_redemption(deployment, intent, basket, cancel).await
        }
    }
}

#[async_trait]
impl QuoteSource for ZeroExIssuanceQuoter {
    fn id(&self) -> QuoteSourceId {
        QuoteSourceId::ZeroExIssuance
    }

    fn is_applicable(&self, intent: &TradeIntent, chain_id: ChainId) -> bool {
        self.deployment.is_some()
            && self.ctx.serves(intent, chain_id)
            && intent.basket_asset().is_some_and(|basket| basket.kind == AssetKind::Basket)
            && !intent.counter_asset().is_basket()
    }

    async fn quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> QuoteResult {
        let outcome = cancel
            .run_until_cancelled(self.try_quote(intent, cancel))
            .await
            .unwrap_or(Err(QuoteError::Cancelled));
        match outcome {
            Ok(success) => success.into(),
            Err(reason) => {
                tracing::debug!(source = %self.id(), %reason, "basket issuance quote failed");
                QuoteResult::failure(self.id(), reason)
            }
        }
    }
}
