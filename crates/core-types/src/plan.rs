use alloy_primitives::{keccak256, Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// DEX identifiers understood by the leveraged issuance contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    None,
    Quickswap,
    Sushiswap,
    UniV3,
    Curve,
}

impl Exchange {
    /// Maps a routing-oracle liquidity source name onto the contract's enum.
    pub fn from_source_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("uniswap_v3") || lower.contains("uniswapv3") {
            Exchange::UniV3
        } else if lower.contains("sushi") {
            Exchange::Sushiswap
        } else if lower.contains("quickswap") {
            Exchange::Quickswap
        } else if lower.contains("curve") {
            Exchange::Curve
        } else {
            Exchange::None
        }
    }
}

/// Swap path description for one leg of a leveraged issuance/redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapData {
    pub path: Vec<Address>,
    pub fees: Vec<u32>,
    pub pool: Address,
    pub exchange: Exchange,
}

impl SwapData {
    /// A leg that does not need to swap at all (input already is the target token).
    pub fn no_swap(token: Address) -> Self {
        Self {
            path: vec![token],
            fees: Vec::new(),
            pool: Address::ZERO,
            exchange: Exchange::None,
        }
    }
}

/// Pre-built swap into (or out of) one basket constituent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentQuote {
    pub component: Address,
    pub amount: U256,
    pub calldata: Bytes,
}

/// The semantic arguments of the contract call a plan submits.
///
/// ABI encoding is left to the chain writer; this type only fixes which
/// function is called and with what values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    /// Calldata produced verbatim by the routing oracle.
    Raw { data: Bytes },
    Approve { spender: Address, amount: U256 },
    IssueExactSetFromEth {
        set_token: Address,
        set_amount: U256,
        swap_data_debt_for_collateral: SwapData,
        swap_data_input_token: SwapData,
    },
    IssueExactSetFromErc20 {
        set_token: Address,
        set_amount: U256,
        input_token: Address,
        max_amount_input_token: U256,
        swap_data_debt_for_collateral: SwapData,
        swap_data_input_token: SwapData,
    },
    RedeemExactSetForEth {
        set_token: Address,
        set_amount: U256,
        min_amount_output_token: U256,
        swap_data_collateral_for_debt: SwapData,
        swap_data_output_token: SwapData,
    },
    RedeemExactSetForErc20 {
        set_token: Address,
        set_amount: U256,
        output_token: Address,
        min_amount_output_token: U256,
        swap_data_collateral_for_debt: SwapData,
        swap_data_output_token: SwapData,
    },
    IssueBasketFromEth {
        set_token: Address,
        amount_set_token: U256,
        component_quotes: Vec<ComponentQuote>,
        issuance_module: Address,
        is_debt_issuance: bool,
    },
    IssueBasketFromToken {
        set_token: Address,
        input_token: Address,
        amount_set_token: U256,
        max_amount_input_token: U256,
        component_quotes: Vec<ComponentQuote>,
        issuance_module: Address,
        is_debt_issuance: bool,
    },
    RedeemBasketForEth {
        set_token: Address,
        amount_set_token: U256,
        min_eth_receive: U256,
        component_quotes: Vec<ComponentQuote>,
        issuance_module: Address,
        is_debt_issuance: bool,
    },
    RedeemBasketForToken {
        set_token: Address,
        output_token: Address,
        amount_set_token: U256,
        min_output_receive: U256,
        component_quotes: Vec<ComponentQuote>,
        issuance_module: Address,
        is_debt_issuance: bool,
    },
}

const SWAP_DATA: &str = "(address[],uint24[],address,uint8)";

impl ContractCall {
    /// Canonical Solidity signature, or `None` for opaque oracle calldata.
    pub fn signature(&self) -> Option<String> {
        let sig = match self {
            ContractCall::Raw { .. } => return None,
            ContractCall::Approve { .. } => "approve(address,uint256)".to_string(),
            ContractCall::IssueExactSetFromEth { .. } => {
                format!("issueExactSetFromETH(address,uint256,{SWAP_DATA},{SWAP_DATA})")
            }
            ContractCall::IssueExactSetFromErc20 { .. } => {
                format!("issueExactSetFromERC20(address,uint256,address,uint256,{SWAP_DATA},{SWAP_DATA})")
            }
            ContractCall::RedeemExactSetForEth { .. } => {
                format!("redeemExactSetForETH(address,uint256,uint256,{SWAP_DATA},{SWAP_DATA})")
            }
            ContractCall::RedeemExactSetForErc20 { .. } => {
                format!("redeemExactSetForERC20(address,uint256,address,uint256,{SWAP_DATA},{SWAP_DATA})")
            }
            ContractCall::IssueBasketFromEth { .. } => {
                "issueExactSetFromETH(address,uint256,bytes[],address,bool)".to_string()
            }
            ContractCall::IssueBasketFromToken { .. } => {
                "issueExactSetFromToken(address,address,uint256,uint256,bytes[],address,bool)".to_string()
            }
            ContractCall::RedeemBasketForEth { .. } => {
                "redeemExactSetForETH(address,uint256,uint256,bytes[],address,bool)".to_string()
            }
            ContractCall::RedeemBasketForToken { .. } => {
                "redeemExactSetForToken(address,address,uint256,uint256,bytes[],address,bool)".to_string()
            }
        };
        Some(sig)
    }

    /// The 4-byte function selector.
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        match (self, self.signature()) {
            (ContractCall::Raw { data }, _) => {
                let n = data.len().min(4);
                selector[..n].copy_from_slice(&data[..n]);
            }
            (_, Some(sig)) => selector.copy_from_slice(&keccak256(sig.as_bytes())[..4]),
            (_, None) => {}
        }
        selector
    }

    /// Returns a copy whose maximum-input argument is replaced by `limit`.
    ///
    /// Only ERC-20 funded issuance calls carry such a slot; every other call
    /// is returned unchanged.
    pub fn with_input_limit(&self, limit: U256) -> Self {
        let mut call = self.clone();
        match &mut call {
            ContractCall::IssueExactSetFromErc20 { max_amount_input_token, .. }
            | ContractCall::IssueBasketFromToken { max_amount_input_token, .. } => {
                *max_amount_input_token = limit;
            }
            _ => {}
        }
        call
    }
}

/// The concrete transaction the executor will submit for a winning quote.
///
/// Produced once by a quote source and never mutated; the executor derives a
/// padded copy of the value/limit at submission time instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub target: Address,
    pub call: ContractCall,
    /// Native value to attach (non-zero only for native-asset input).
    pub value: U256,
    pub gas_limit: u64,
    /// Contract that must be approved to pull the sell token; `None` for native sells.
    pub spender: Option<Address>,
    /// Worst-case input the plan may consume, padded by the executor's safety margin.
    pub max_input: Option<U256>,
}
