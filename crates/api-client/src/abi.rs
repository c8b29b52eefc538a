//! Solidity bindings for the contracts we read from and submit to, and the
//! encoder that turns a semantic `ContractCall` into calldata.

use alloy_primitives::aliases::U24;
use alloy_sol_types::{sol, SolCall};
use core_types::{plan, Bytes, ContractCall, Exchange};

sol! {
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256 amount);
        function balanceOf(address account) external view returns (uint256 balance);
        function approve(address spender, uint256 amount) external returns (bool success);
    }

    struct SwapData {
        address[] path;
        uint24[] fees;
        address pool;
        uint8 exchange;
    }

    struct LeveragedTokenData {
        address collateralAToken;
        address collateralToken;
        uint256 collateralAmount;
        address debtToken;
        uint256 debtAmount;
    }

    interface IExchangeIssuanceLeveraged {
        function getLeveragedTokenData(address setToken, uint256 setAmount, bool isIssuance)
            external view returns (LeveragedTokenData memory data);

        function issueExactSetFromETH(
            address setToken,
            uint256 setAmount,
            SwapData memory swapDataDebtForCollateral,
            SwapData memory swapDataInputToken
        ) external payable;

        function issueExactSetFromERC20(
            address setToken,
            uint256 setAmount,
            address inputToken,
            uint256 maxAmountInputToken,
            SwapData memory swapDataDebtForCollateral,
            SwapData memory swapDataInputToken
        ) external;

        function redeemExactSetForETH(
            address setToken,
            uint256 setAmount,
            uint256 minAmountOutputToken,
            SwapData memory swapDataCollateralForDebt,
            SwapData memory swapDataOutputToken
        ) external;

        function redeemExactSetForERC20(
            address setToken,
            uint256 setAmount,
            address outputToken,
            uint256 minAmountOutputToken,
            SwapData memory swapDataCollateralForDebt,
            SwapData memory swapDataOutputToken
        ) external;
    }

    interface IExchangeIssuanceZeroEx {
        function getRequiredIssuanceComponents(
            address issuanceModule,
            bool isDebtIssuance,
            address setToken,
            uint256 amountSetToken
        ) external view returns (address[] memory components, uint256[] memory positions);

        function getRequiredRedemptionComponents(
            address issuanceModule,
            bool isDebtIssuance,
            address setToken,
            uint256 amountSetToken
        ) external view returns (address[] memory components, uint256[] memory positions);

        function issueExactSetFromETH(
            address setToken,
            uint256 amountSetToken,
            bytes[] memory componentQuotes,
            address issuanceModule,
            bool isDebtIssuance
        ) external payable returns (uint256 amountEthReturn);

        function issueExactSetFromToken(
            address setToken,
            address inputToken,
            uint256 amountSetToken,
            uint256 maxAmountInputToken,
            bytes[] memory componentQuotes,
            address issuanceModule,
            bool isDebtIssuance
        ) external returns (uint256 totalInputTokenReturned);

        function redeemExactSetForETH(
            address setToken,
            uint256 amountSetToken,
            uint256 minEthReceive,
            bytes[] memory componentQuotes,
            address issuanceModule,
            bool isDebtIssuance
        ) external returns (uint256 amountEthReturned);

        function redeemExactSetForToken(
            address setToken,
            address outputToken,
            uint256 amountSetToken,
            uint256 minOutputReceive,
            bytes[] memory componentQuotes,
            address issuanceModule,
            bool isDebtIssuance
        ) external returns (uint256 outputAmount);
    }
}

fn exchange_id(exchange: Exchange) -> u8 {
    match exchange {
        Exchange::None => 0,
        Exchange::Quickswap => 1,
        Exchange::Sushiswap => 2,
        Exchange::UniV3 => 3,
        Exchange::Curve => 4,
    }
}

impl From<&plan::SwapData> for SwapData {
    fn from(data: &plan::SwapData) -> Self {
        SwapData {
            path: data.path.clone(),
            fees: data.fees.iter().map(|fee| U24::saturating_from(*fee)).collect(),
            pool: data.pool,
            exchange: exchange_id(data.exchange),
        }
    }
}

fn quotes(component_quotes: &[plan::ComponentQuote]) -> Vec<Bytes> {
    component_quotes.iter().map(|q| q.calldata.clone()).collect()
}

/// ABI-encodes `call` (selector plus arguments).
pub fn encode_call(call: &ContractCall) -> Bytes {
    use IExchangeIssuanceLeveraged as lev;
    use IExchangeIssuanceZeroEx as zx;

    let encoded = match call {
        ContractCall::Raw { data } => return data.clone(),
        ContractCall::Approve { spender, amount } => IERC20::approveCall {
            spender: *spender,
            amount: *amount,
        }
        .abi_encode(),
        ContractCall::IssueExactSetFromEth {
            set_token,
            set_amount,
            swap_data_debt_for_collateral,
            swap_data_input_token,
        } => lev::issueExactSetFromETHCall {
            setToken: *set_token,
            setAmount: *set_amount,
            swapDataDebtForCollateral: swap_data_debt_for_collateral.into(),
            swapDataInputToken: swap_data_input_token.into(),
        }
        .abi_encode(),
        ContractCall::IssueExactSetFromErc20 {
            set_token,
            set_amount,
            input_token,
            max_amount_input_token,
            swap_data_debt_for_collateral,
            swap_data_input_token,
        } => lev::issueExactSetFromERC20Call {
            setToken: *set_token,
            setAmount: *set_amount,
            inputToken: *input_token,
            maxAmountInputToken: *max_amount_input_token,
            swapDataDebtForCollateral: swap_data_debt_for_collateral.into(),
            swapDataInputToken: swap_data_input_token.into(),
        }
        .abi_encode(),
        ContractCall::RedeemExactSetForEth {
            set_token,
            set_amount,
            min_amount_output_token,
            swap_data_collateral_for_debt,
            swap_data_output_token,
        } => lev::redeemExactSetForETHCall {
            setToken: *set_token,
            setAmount: *set_amount,
            minAmountOutputToken: *min_amount_output_token,
            swapDataCollateralForDebt: swap_data_collateral_for_debt.into(),
            swapDataOutputToken: swap_data_output_token.into(),
        }
        .abi_encode(),
        ContractCall::RedeemExactSetForErc20 {
            set_token,
            set_amount,
            output_token,
            min_amount_output_token,
            swap_data_collateral_for_debt,
            swap_data_output_token,
        } => lev::redeemExactSetForERC20Call {
            setToken: *set_token,
            setAmount: *set_amount,
            outputToken: *output_token,
            minAmountOutputToken: *min_amount_output_token,
            swapDataCollateralForDebt: swap_data_collateral_for_debt.into(),
            swapDataOutputToken: swap_data_output_token.into(),
        }
        .abi_encode(),
        ContractCall::IssueBasketFromEth {
            set_token,
            amount_set_token,
            component_quotes,
            issuance_module,
            is_debt_issuance,
        } => zx::issueExactSetFromETHCall {
            setToken: *set_token,
            amountSetToken: *amount_set_token,
            componentQuotes: quotes(component_quotes),
            issuanceModule: *issuance_module,
            isDebtIssuance: *is_debt_issuance,
        }
        .abi_encode(),
        ContractCall::IssueBasketFromToken {
            set_token,
            input_token,
            amount_set_token,
            max_amount_input_token,
            component_quotes,
            issuance_module,
            is_debt_issuance,
        } => zx::issueExactSetFromTokenCall {
            setToken: *set_token,
            inputToken: *input_token,
            amountSetToken: *amount_set_token,
            maxAmountInputToken: *max_amount_input_token,
            componentQuotes: quotes(component_quotes),
            issuanceModule: *issuance_module,
            isDebtIssuance: *is_debt_issuance,
        }
        .abi_encode(),
        ContractCall::RedeemBasketForEth {
            set_token,
            amount_set_token,
            min_eth_receive,
            component_quotes,
            issuance_module,
            is_debt_issuance,
        } => zx::redeemExactSetForETHCall {
            setToken: *set_token,
            amountSetToken: *amount_set_token,
            minEthReceive: *min_eth_receive,
            componentQuotes: quotes(component_quotes),
            issuanceModule: *issuance_module,
            isDebtIssuance: *is_debt_issuance,
        }
        .abi_encode(),
        ContractCall::RedeemBasketForToken {
            set_token,
            output_token,
            amount_set_token,
            min_output_receive,
            component_quotes,
            issuance_module,
            is_debt_issuance,
        } => zx::redeemExactSetForTokenCall {
            setToken: *set_token,
            outputToken: *output_token,
            amountSetToken: *amount_set_token,
            minOutputReceive: *min_output_receive,
            componentQuotes: quotes(component_quotes),
            issuanceModule: *issuance_module,
            isDebtIssuance: *is_debt_issuance,
        }
        .abi_encode(),
    };
    Bytes::from(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Address, ComponentQuote, U256};

    fn token() -> Address {
        Address::repeat_byte(0x11)
    }

    fn every_call() -> Vec<ContractCall> {
        let swap = plan::SwapData::no_swap(token());
        let quotes = vec![ComponentQuote {
            component: token(),
            amount: U256::from(5u64),
            calldata: Bytes::from(vec![1, 2, 3]),
        }];
        vec![
            ContractCall::Approve { spender: token(), amount: U256::MAX },
            ContractCall::IssueExactSetFromEth {
                set_token: token(),
                set_amount: U256::from(1u64),
                swap_data_debt_for_collateral: swap.clone(),
                swap_data_input_token: swap.clone(),
            },
            ContractCall::IssueExactSetFromErc20 {
                set_token: token(),
                set_amount: U256::from(1u64),
                input_token: token(),
                max_amount_input_token: U256::from(2u64),
                swap_data_debt_for_collateral: swap.clone(),
                swap_data_input_token: swap.clone(),
            },
            ContractCall::RedeemExactSetForEth {
                set_token: token(),
                set_amount: U256::from(1u64),
                min_amount_output_token: U256::from(2u64),
                swap_data_collateral_for_debt: swap.clone(),
                swap_data_output_token: swap.clone(),
            },
            ContractCall::RedeemExactSetForErc20 {
                set_token: token(),
                set_amount: U256::from(1u64),
                output_token: token(),
                min_amount_output_token: U256::from(2u64),
                swap_data_collateral_for_debt: swap.clone(),
                swap_data_output_token: swap,
            },
            ContractCall::IssueBasketFromEth {
                set_token: token(),
                amount_set_token: U256::from(1u64),
                component_quotes: quotes.clone(),
                issuance_module: token(),
                is_debt_issuance: false,
            },
            ContractCall::IssueBasketFromToken {
                set_token: token(),
                input_token: token(),
                amount_set_token: U256::from(1u64),
                max_amount_input_token: U256::from(2u64),
                component_quotes: quotes.clone(),
                issuance_module: token(),
                is_debt_issuance: true,
            },
            ContractCall::RedeemBasketForEth {
                set_token: token(),
                amount_set_token: U256::from(1u64),
                min_eth_receive: U256::from(2u64),
                component_quotes: quotes.clone(),
                issuance_module: token(),
                is_debt_issuance: false,
            },
            ContractCall::RedeemBasketForToken {
                set_token: token(),
                output_token: token(),
                amount_set_token: U256::from(1u64),
                min_output_receive: U256::from(2u64),
                component_quotes: quotes,
                issuance_module: token(),
                is_debt_issuance: false,
            },
        ]
    }

    #[test]
    fn encoded_selector_matches_declared_signature() {
        for call in every_call() {
            let encoded = encode_call(&call);
            assert_eq!(&encoded[..4], &call.selector(), "{:?}", call.signature());
        }
    }

    #[test]
    fn raw_calldata_passes_through() {
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(encode_call(&ContractCall::Raw { data: data.clone() }), data);
    }
}
