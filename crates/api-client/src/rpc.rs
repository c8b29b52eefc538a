use crate::abi::{encode_call, IExchangeIssuanceLeveraged, IExchangeIssuanceZeroEx, IERC20};
use crate::error::ApiError;
use crate::responses::{RpcReceipt, RpcResponse, RpcTransaction};
use crate::types::{BasketComponent, LeveragedTokenData, TxOutcome, TxRequest};
use crate::{ChainReader, ChainWriter};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use core_types::{Address, Bytes, TxHash, U256, NATIVE_ASSET_ADDRESS};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// EIP-1193 "user rejected request".
const USER_REJECTED_CODE: i64 = 4001;

/// A chain reader and writer speaking Ethereum JSON-RPC over HTTP.
///
/// Transactions are sent with `eth_sendTransaction`, so signing is left to
/// the node or wallet behind the endpoint.
pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, poll_interval: Duration, receipt_timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            url: url.into(),
            next_id: AtomicU64::new(1),
            poll_interval,
            receipt_timeout,
        })
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, ApiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let envelope: RpcResponse<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(format!("{method}: {e}")))?;
        match envelope.error {
            Some(err) if err.code == USER_REJECTED_CODE => Err(ApiError::UserRejected),
            Some(err) => Err(ApiError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(envelope.result),
        }
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, ApiError> {
        let params = json!([{ "to": to, "data": Bytes::from(data) }, "latest"]);
        self.request::<Bytes>("eth_call", params)
            .await?
            .ok_or_else(|| ApiError::InvalidData("eth_call returned null".into()))
    }

    /// Replays a reverted transaction as a call to recover the node's revert message.
    async fn revert_reason(&self, tx_hash: TxHash, block: Option<&str>) -> String {
        let tx = match self.request::<RpcTransaction>("eth_getTransactionByHash", json!([tx_hash])).await {
            Ok(Some(tx)) => tx,
            _ => return "execution reverted".to_string(),
        };
        let call = json!({ "from": tx.from, "to": tx.to, "data": tx.input, "value": tx.value });
        let block = block.unwrap_or("latest");
        match self.request::<Bytes>("eth_call", json!([call, block])).await {
            Err(ApiError::Rpc { message, .. }) => message,
            _ => "execution reverted".to_string(),
        }
    }
}

fn quantity(value: u64) -> String {
    format!("{value:#x}")
}

#[async_trait]
impl ChainReader for JsonRpcClient {
    async fn read_allowance(&self, owner: Address, token: Address, spender: Address) -> Result<U256, ApiError> {
        let call = IERC20::allowanceCall { owner, spender };
        let raw = self.eth_call(token, call.abi_encode()).await?;
        Ok(IERC20::allowanceCall::abi_decode_returns(&raw, true)?.amount)
    }

    async fn read_balance(&self, owner: Address, token: Address) -> Result<U256, ApiError> {
        if token == NATIVE_ASSET_ADDRESS {
            return self
                .request::<U256>("eth_getBalance", json!([owner, "latest"]))
                .await?
                .ok_or_else(|| ApiError::InvalidData("eth_getBalance returned null".into()));
        }
        let call = IERC20::balanceOfCall { account: owner };
        let raw = self.eth_call(token, call.abi_encode()).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&raw, true)?.balance)
    }

    async fn read_leveraged_token_data(
        &self,
        contract: Address,
        basket: Address,
        amount: U256,
        is_issuance: bool,
    ) -> Result<LeveragedTokenData, ApiError> {
        let call = IExchangeIssuanceLeveraged::getLeveragedTokenDataCall {
            setToken: basket,
            setAmount: amount,
            isIssuance: is_issuance,
        };
        let raw = self.eth_call(contract, call.abi_encode()).await?;
        let data = IExchangeIssuanceLeveraged::getLeveragedTokenDataCall::abi_decode_returns(&raw, true)?.data;
        Ok(LeveragedTokenData {
            collateral_a_token: data.collateralAToken,
            collateral_token: data.collateralToken,
            collateral_amount: data.collateralAmount,
            debt_token: data.debtToken,
            debt_amount: data.debtAmount,
        })
    }

    async fn read_basket_components(
        &self,
        contract: Address,
        issuance_module: Address,
        is_debt_issuance: bool,
        basket: Address,
        amount: U256,
        is_issuance: bool,
    ) -> Result<Vec<BasketComponent>, ApiError> {
        let (components, positions) = if is_issuance {
            let call = IExchangeIssuanceZeroEx::getRequiredIssuanceComponentsCall {
                issuanceModule: issuance_module,
                isDebtIssuance: is_debt_issuance,
                setToken: basket,
                amountSetToken: amount,
            };
            let raw = self.eth_call(contract, call.abi_encode()).await?;
            let ret = IExchangeIssuanceZeroEx::getRequiredIssuanceComponentsCall::abi_decode_returns(&raw, true)?;
            (ret.components, ret.positions)
        } else {
            let call = IExchangeIssuanceZeroEx::getRequiredRedemptionComponentsCall {
                issuanceModule: issuance_module,
                isDebtIssuance: is_debt_issuance,
                setToken: basket,
                amountSetToken: amount,
            };
            let raw = self.eth_call(contract, call.abi_encode()).await?;
            let ret = IExchangeIssuanceZeroEx::getRequiredRedemptionComponentsCall::abi_decode_returns(&raw, true)?;
            (ret.components, ret.positions)
        };

        if components.len() != positions.len() {
            return Err(ApiError::InvalidData(format!(
                "{} components but {} positions",
                components.len(),
                positions.len()
            )));
        }
        Ok(components
            .into_iter()
            .zip(positions)
            .map(|(token, amount)| BasketComponent { token, amount })
            .collect())
    }
}

#[async_trait]
impl ChainWriter for JsonRpcClient {
    async fn submit(&self, tx: &TxRequest) -> Result<TxHash, ApiError> {
        let params = json!([{
            "from": tx.from,
            "to": tx.to,
            "data": encode_call(&tx.call),
            "value": tx.value,
            "gas": quantity(tx.gas_limit),
        }]);
        let hash = self
            .request::<TxHash>("eth_sendTransaction", params)
            .await?
            .ok_or_else(|| ApiError::InvalidData("eth_sendTransaction returned null".into()))?;
        tracing::info!(%hash, to = %tx.to, "transaction submitted");
        Ok(hash)
    }

    async fn await_receipt(&self, tx_hash: TxHash) -> Result<TxOutcome, ApiError> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = self
                .request::<RpcReceipt>("eth_getTransactionReceipt", json!([tx_hash]))
                .await?
            {
                return match receipt.status.as_deref() {
                    Some("0x1") => Ok(TxOutcome::Success),
                    _ => {
                        let reason = self.revert_reason(tx_hash, receipt.block_number.as_deref()).await;
                        tracing::warn!(%tx_hash, %reason, "transaction reverted");
                        Ok(TxOutcome::Reverted(reason))
                    }
                };
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ApiError::Timeout(format!("receipt of {tx_hash}")));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
