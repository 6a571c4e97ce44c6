use crate::errors::error::InsufficientFunds;
use crate::models::domain::gas::{GasEstimateType, GasTier};
use bigdecimal::BigDecimal;
use serde::Serialize;

/// 一笔费用的三种表示：精确 wei、原生币展示、法币展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeAmount {
    pub wei: BigDecimal,
    pub native: String,
    pub conversion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEstimateId {
    Unknown,
    Maybe,
    Likely,
    VeryLikely,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEstimateSeverity {
    Positive,
    Neutral,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEstimate {
    pub label: String,
    pub severity: TimeEstimateSeverity,
    pub id: TimeEstimateId,
}

/// 一次完整重算的输出，每次都整体替换，不做局部更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeDataResult {
    pub selected_option: Option<GasTier>,
    pub gas_limit: u64,
    /// gwei
    pub max_fee_per_gas: BigDecimal,
    /// 单位 gas 的最高费用换算成原生币与法币
    pub max_fee_per_gas_display: FeeAmount,
    /// gwei
    pub max_priority_fee_per_gas: BigDecimal,
    /// gwei
    pub estimated_base_fee: BigDecimal,
    pub gas_fee_min: FeeAmount,
    pub gas_fee_max: FeeAmount,
    pub max_priority_fee: FeeAmount,
    pub total_max_wei: BigDecimal,
    pub time_estimate: TimeEstimate,
    pub error: Option<InsufficientFunds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GasMode {
    Basic,
    Advanced,
}

/// 每次重算附带的埋点参数，仅用于观测
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasAnalyticsParams {
    pub chain_id: String,
    pub gas_estimate_type: GasEstimateType,
    pub gas_mode: GasMode,
    pub speed_set: Option<GasTier>,
    pub view: &'static str,
}
