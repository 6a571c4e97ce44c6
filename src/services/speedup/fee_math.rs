//! 费用数值运算：全部使用 BigDecimal，不经过浮点

use crate::errors::error::AppError;
use crate::models::domain::fee_data::FeeAmount;
use crate::utils::{gwei_to_wei, render_amount, render_fiat, wei_to_ether};
use bigdecimal::BigDecimal;

/// 展示换算所需的上下文（ticker、法币、汇率、精度）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayContext {
    pub ticker: String,
    pub currency: String,
    pub conversion_rate: BigDecimal,
    pub native_decimals: i64,
    pub fiat_decimals: i64,
}

pub fn ensure_non_negative(label: &str, value: &BigDecimal) -> Result<(), AppError> {
    if *value < BigDecimal::from(0) {
        return Err(AppError::contract(format!("{} 为负数: {}", label, value)));
    }
    Ok(())
}

/// fee × rate
pub fn scale(fee: &BigDecimal, rate: &BigDecimal) -> Result<BigDecimal, AppError> {
    ensure_non_negative("fee", fee)?;
    ensure_non_negative("rate", rate)?;
    // 去掉乘法带来的多余小数位，序列化为 110 而不是 110.0
    Ok((fee * rate).normalized())
}

/// a ≥ b
pub fn at_least(a: &BigDecimal, b: &BigDecimal) -> bool {
    a >= b
}

/// 每 gas 费用（gwei）× gas limit，返回 wei
pub fn fee_for_gas(per_gas_gwei: &BigDecimal, gas_limit: u64) -> Result<BigDecimal, AppError> {
    ensure_non_negative("per-gas fee", per_gas_gwei)?;
    let total = gwei_to_wei(per_gas_gwei) * BigDecimal::from(gas_limit);
    ensure_non_negative("fee total", &total)?;
    Ok(total)
}

/// wei → 原生币 / 法币展示
pub fn to_display(wei: &BigDecimal, ctx: &DisplayContext) -> FeeAmount {
    let ether = wei_to_ether(wei);
    let converted = &ether * &ctx.conversion_rate;
    FeeAmount {
        wei: wei.clone(),
        native: format!("{} {}", render_amount(&ether, ctx.native_decimals), ctx.ticker),
        conversion: render_fiat(&converted, ctx.fiat_decimals, &ctx.currency),
    }
}
