use crate::errors::error::AppError;
use bigdecimal::BigDecimal;
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 费用档位（low / medium / high）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasTier {
    Low,
    Medium,
    High,
}

impl GasTier {
    pub const ALL: [GasTier; 3] = [GasTier::Low, GasTier::Medium, GasTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            GasTier::Low => "low",
            GasTier::Medium => "medium",
            GasTier::High => "high",
        }
    }
}

impl fmt::Display for GasTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 估算服务返回的估算类型，只有 fee-market 才会驱动重算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasEstimateType {
    #[serde(rename = "fee-market")]
    FeeMarket,
    #[serde(rename = "legacy")]
    Legacy,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl fmt::Display for GasEstimateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GasEstimateType::FeeMarket => "fee-market",
            GasEstimateType::Legacy => "legacy",
            GasEstimateType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// EIP-1559 每 gas 费用对（单位：gwei）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePair {
    pub max_fee_per_gas: BigDecimal,
    pub max_priority_fee_per_gas: BigDecimal,
}

/// 被加速交易的原始费用，整个加速会话内不可变
pub type ExistingTransactionFees = FeePair;

impl FeePair {
    pub fn new(max_fee_per_gas: BigDecimal, max_priority_fee_per_gas: BigDecimal) -> Self {
        Self {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }
    }

    /// 负数费用属于调用方违约，直接失败
    pub fn ensure_non_negative(&self, what: &str) -> Result<(), AppError> {
        let zero = BigDecimal::from(0);
        if self.max_fee_per_gas < zero {
            return Err(AppError::contract(format!(
                "{} maxFeePerGas 为负数: {}",
                what, self.max_fee_per_gas
            )));
        }
        if self.max_priority_fee_per_gas < zero {
            return Err(AppError::contract(format!(
                "{} maxPriorityFeePerGas 为负数: {}",
                what, self.max_priority_fee_per_gas
            )));
        }
        Ok(())
    }
}

/// 被加速交易的描述，会话开始时提供一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingTransaction {
    pub from: Address,
    pub gas_limit: u64,
    pub fees: ExistingTransactionFees,
}

/// 用户在编辑器中的一次修改：档位值或自定义值，可附带自定义 gas limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasFeeInput {
    pub fees: FeePair,
    pub gas_limit: Option<u64>,
}

impl From<FeePair> for GasFeeInput {
    fn from(fees: FeePair) -> Self {
        Self {
            fees,
            gas_limit: None,
        }
    }
}
