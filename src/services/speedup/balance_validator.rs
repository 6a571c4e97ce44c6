use crate::errors::error::InsufficientFunds;
use crate::utils::{render_amount, ticker_or_default, wei_to_ether};
use bigdecimal::BigDecimal;

/// 余额校验：balance < total 时返回差额，差额按 native 精度渲染
pub fn validate(
    total_max_cost_wei: &BigDecimal,
    balance_wei: &BigDecimal,
    ticker: Option<&str>,
    native_decimals: i64,
) -> Option<InsufficientFunds> {
    if balance_wei >= total_max_cost_wei {
        return None;
    }

    let shortfall_wei = total_max_cost_wei - balance_wei;
    Some(InsufficientFunds {
        amount: render_amount(&wei_to_ether(&shortfall_wei), native_decimals),
        ticker: ticker_or_default(ticker),
        shortfall_wei,
    })
}
