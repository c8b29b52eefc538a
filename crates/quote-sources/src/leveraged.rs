//! Issuance and redemption of leveraged baskets through a flash-loan style
//! contract: debt is borrowed, swapped into collateral and the basket is
//! minted in one transaction (and the reverse for redemption).

use crate::legs::{estimate_gas, leg_token, max_gas_price, merge_sources, one_unit, quote_leg, swap_data};
use crate::{CancellationToken, QuoteSource, SourceContext};
use api_client::{LeveragedTokenData, OracleQuoteRequest};
use async_trait::async_trait;
use configuration::GasLimits;
use core_types::{
    add_bps, Address, Asset, AssetKind, ChainId, ContractCall, ExecutionPlan, QuoteError, QuoteResult,
    QuoteSourceId, QuoteSuccess, TradeIntent, U256, BPS_DENOMINATOR,
};

/// Gas for the flash loan, the mint or burn and the debt bookkeeping, on top
/// of the swap legs.
const LEVERAGE_OVERHEAD_GAS: u64 = 450_000;

pub struct LeveragedIssuanceQuoter {
    ctx: SourceContext,
    contract: Option<Address>,
    collateral_buffer_bps: u32,
    redemption_amount_multiplier: u32,
    gas_limits: GasLimits,
}

impl LeveragedIssuanceQuoter {
    pub fn new(
        ctx: SourceContext,
        contract: Option<Address>,
        collateral_buffer_bps: u32,
        redemption_amount_multiplier: u32,
        gas_limits: GasLimits,
    ) -> Self {
        Self {
            ctx,
            contract,
            collateral_buffer_bps,
            redemption_amount_multiplier: redemption_amount_multiplier.max(1),
            gas_limits,
        }
    }

    async fn token_data(
        &self,
        contract: Address,
        basket: &Asset,
        amount: U256,
        is_issuance: bool,
    ) -> Result<LeveragedTokenData, QuoteError> {
        self.ctx
            .reader
            .read_leveraged_token_data(contract, basket.address, amount, is_issuance)
            .await
            .map_err(|e| QuoteError::UnsupportedAsset(format!("{} is not leverage-enabled: {e}", basket.symbol)))
    }

    /// Buy the basket with `intent.sell_asset`.
    ///
    /// Per basket unit the contract needs `C` collateral and borrows `D` debt.
    /// Swapping `D` into collateral covers part of `C`; the user's input,
    /// swapped into collateral, has to cover the rest (plus the buffer). The
    /// issuable amount is therefore `unit * input_collateral / (shortfall * (1 + buffer))`.
    async fn quote_issuance(
        &self,
        contract: Address,
        intent: &TradeIntent,
        basket: &Asset,
        cancel: &CancellationToken,
    ) -> Result<QuoteSuccess, QuoteError> {
        let sell_amount = intent
            .sell_amount_base_units()
            .map_err(|e| QuoteError::UnsupportedAsset(e.to_string()))?;
        let unit = one_unit(basket.decimals);
        let data = self.token_data(contract, basket, unit, true).await?;
        cancel.check()?;

        let oracle = self.ctx.oracle.as_ref();
        let chain = self.ctx.chain_id;
        let debt_leg = quote_leg(
            oracle,
            OracleQuoteRequest::exact_sell(chain, data.debt_token, data.collateral_token, data.debt_amount),
            cancel,
        )
        .await?;

        let shortfall = data.collateral_amount.saturating_sub(debt_leg.min_buy_amount);
        if shortfall.is_zero() {
            return Err(QuoteError::LegQuoteFailed(
                "borrowed debt already covers the collateral; position is not leveraged".into(),
            ));
        }

        let input_token = leg_token(&intent.sell_asset, self.ctx.wrapped_native);
        let input_leg = if input_token == data.collateral_token {
            None
        } else {
            Some(
                quote_leg(
                    oracle,
                    OracleQuoteRequest::exact_sell(chain, input_token, data.collateral_token, sell_amount),
                    cancel,
                )
                .await?,
            )
        };
        let input_collateral = input_leg.as_ref().map_or(sell_amount, |q| q.min_buy_amount);

        let denominator = shortfall.saturating_mul(U256::from(BPS_DENOMINATOR + self.collateral_buffer_bps));
        let set_amount = unit.saturating_mul(input_collateral).saturating_mul(U256::from(BPS_DENOMINATOR)) / denominator;
        if set_amount.is_zero() {
            return Err(QuoteError::LegQuoteFailed("sell amount too small to issue any basket".into()));
        }

        let swap_debt = swap_data(data.debt_token, data.collateral_token, Some(&debt_leg));
        let swap_input = swap_data(input_token, data.collateral_token, input_leg.as_ref());
        let (call, value, gas_limit, spender) = if intent.sell_asset.is_native() {
            let call = ContractCall::IssueExactSetFromEth {
                set_token: basket.address,
                set_amount,
                swap_data_debt_for_collateral: swap_debt,
                swap_data_input_token: swap_input,
            };
            (call, sell_amount, self.gas_limits.issue_from_native, None)
        } else {
            let call = ContractCall::IssueExactSetFromErc20 {
                set_token: basket.address,
                set_amount,
                input_token: intent.sell_asset.address,
                max_amount_input_token: sell_amount,
                swap_data_debt_for_collateral: swap_debt,
                swap_data_input_token: swap_input,
            };
            (call, U256::ZERO, self.gas_limits.issue_from_erc20, Some(contract))
        };

        let legs: Vec<_> = std::iter::once(&debt_leg).chain(input_leg.as_ref()).collect();
        Ok(QuoteSuccess {
            source: QuoteSourceId::LeveragedIssuance,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount,
            min_buy_amount: set_amount,
            gas_estimate: estimate_gas(LEVERAGE_OVERHEAD_GAS, gas_limit, legs.iter().copied()),
            gas_price: max_gas_price(legs.iter().copied()),
            route_sources: merge_sources(legs.iter().copied()),
            plan: ExecutionPlan {
                target: contract,
                call,
                value,
                gas_limit,
                spender,
                max_input: Some(sell_amount),
            },
        })
    }

    /// Sell the basket for `intent.buy_asset`.
    ///
    /// Redeeming releases `C` collateral and requires repaying `D` debt. The
    /// collateral needed to buy back `D` (plus the buffer) is set aside; the
    /// remainder is swapped into the output asset.
    async fn quote_redemption(
        &self,
        contract: Address,
        intent: &TradeIntent,
        basket: &Asset,
        cancel: &CancellationToken,
    ) -> Result<QuoteSuccess, QuoteError> {
        let set_amount = intent
            .sell_amount_base_units()
            .map_err(|e| QuoteError::UnsupportedAsset(e.to_string()))?
            .saturating_mul(U256::from(self.redemption_amount_multiplier));
        let data = self.token_data(contract, basket, set_amount, false).await?;
        cancel.check()?;

        let oracle = self.ctx.oracle.as_ref();
        let chain = self.ctx.chain_id;
        let repay_leg = quote_leg(
            oracle,
            OracleQuoteRequest::exact_buy(chain, data.collateral_token, data.debt_token, data.debt_amount),
            cancel,
        )
        .await?;

        let reserved = add_bps(repay_leg.max_sell_amount, self.collateral_buffer_bps);
        if reserved >= data.collateral_amount {
            return Err(QuoteError::LegQuoteFailed("released collateral does not cover the debt".into()));
        }
        let remaining = data.collateral_amount - reserved;

        let output_token = leg_token(&intent.buy_asset, self.ctx.wrapped_native);
        let output_leg = if output_token == data.collateral_token {
            None
        } else {
            Some(
                quote_leg(
                    oracle,
                    OracleQuoteRequest::exact_sell(chain, data.collateral_token, output_token, remaining),
                    cancel,
                )
                .await?,
            )
        };
        let min_output = output_leg.as_ref().map_or(remaining, |q| q.min_buy_amount);

        let swap_collateral = swap_data(data.collateral_token, data.debt_token, Some(&repay_leg));
        let swap_output = swap_data(data.collateral_token, output_token, output_leg.as_ref());
        let (call, gas_limit) = if intent.buy_asset.is_native() {
            let call = ContractCall::RedeemExactSetForEth {
                set_token: basket.address,
                set_amount,
                min_amount_output_token: min_output,
                swap_data_collateral_for_debt: swap_collateral,
                swap_data_output_token: swap_output,
            };
            (call, self.gas_limits.redeem_to_native)
        } else {
            let call = ContractCall::RedeemExactSetForErc20 {
                set_token: basket.address,
                set_amount,
                output_token: intent.buy_asset.address,
                min_amount_output_token: min_output,
                swap_data_collateral_for_debt: swap_collateral,
                swap_data_output_token: swap_output,
            };
            (call, self.gas_limits.redeem_to_erc20)
        };

        let legs: Vec<_> = std::iter::once(&repay_leg).chain(output_leg.as_ref()).collect();
        Ok(QuoteSuccess {
            source: QuoteSourceId::LeveragedIssuance,
            sell_asset: intent.sell_asset.clone(),
            buy_asset: intent.buy_asset.clone(),
            sell_amount: set_amount,
            min_buy_amount: min_output,
            gas_estimate: estimate_gas(LEVERAGE_OVERHEAD_GAS, gas_limit, legs.iter().copied()),
            gas_price: max_gas_price(legs.iter().copied()),
            route_sources: merge_sources(legs.iter().copied()),
            plan: ExecutionPlan {
                target: contract,
                call,
                value: U256::ZERO,
                gas_limit,
                spender: Some(contract),
                max_input: None,
            },
        })
    }

    async fn try_quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> Result<QuoteSuccess, QuoteError> {
        let contract = self
            .contract
            .ok_or_else(|| QuoteError::UnsupportedAsset("no leveraged issuance contract on this chain".into()))?;
        let basket = intent
            .basket_asset()
            .ok_or_else(|| QuoteError::UnsupportedAsset("trade does not involve a basket".into()))?;
        if intent.is_issuance {
            self.quote_issuance(contract, intent, basket, cancel).await
        } else {
            self.quote_redemption(contract, intent, basket, cancel).await
        }
    }
}

#[async_trait]
impl QuoteSource for LeveragedIssuanceQuoter {
    fn id(&self) -> QuoteSourceId {
        QuoteSourceId::LeveragedIssuance
    }

    fn is_applicable(&self, intent: &TradeIntent, chain_id: ChainId) -> bool {
        self.contract.is_some()
            && self.ctx.serves(intent, chain_id)
            && intent
                .basket_asset()
                .is_some_and(|basket| basket.kind == AssetKind::LeveragedBasket)
            && !intent.counter_asset().is_basket()
    }

    async fn quote(&self, intent: &TradeIntent, cancel: &CancellationToken) -> QuoteResult {
        let outcome = cancel
            .run_until_cancelled(self.try_quote(intent, cancel))
            .await
            .unwrap_or(Err(QuoteError::Cancelled));
        match outcome {
            Ok(success) => {
                tracing::debug!(min_buy = %success.min_buy_amount, "leveraged issuance quoted");
                success.into()
            }
            Err(reason) => {
                tracing::debug!(source = %self.id(), %reason, "leveraged quote failed");
                QuoteResult::failure(self.id(), reason)
            }
        }
    }
}
