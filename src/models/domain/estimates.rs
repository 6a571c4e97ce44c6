use crate::errors::error::RecalcSkip;
use crate::models::domain::gas::{FeePair, GasEstimateType, GasTier};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 估算源推送的原始档位数据，字段可能缺失，需经校验后才能使用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTierEstimate {
    pub suggested_max_priority_fee_per_gas: Option<BigDecimal>,
    pub suggested_max_fee_per_gas: Option<BigDecimal>,
    pub min_wait_time_estimate: Option<u64>,
    pub max_wait_time_estimate: Option<u64>,
}

/// 原始快照（gwei 字符串，camelCase JSON）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeEstimates {
    pub low: Option<RawTierEstimate>,
    pub medium: Option<RawTierEstimate>,
    pub high: Option<RawTierEstimate>,
    pub estimated_base_fee: Option<BigDecimal>,
}

/// 一次轮询推送的完整状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFeeState {
    pub gas_estimate_type: GasEstimateType,
    pub gas_fee_estimates: Option<RawFeeEstimates>,
}

impl GasFeeState {
    pub fn fee_market(estimates: RawFeeEstimates) -> Self {
        Self {
            gas_estimate_type: GasEstimateType::FeeMarket,
            gas_fee_estimates: Some(estimates),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierEstimate {
    pub suggested_max_priority_fee_per_gas: BigDecimal,
    pub suggested_max_fee_per_gas: BigDecimal,
    pub min_wait_time_estimate: Option<u64>,
    pub max_wait_time_estimate: Option<u64>,
}

impl TierEstimate {
    pub fn fee_pair(&self) -> FeePair {
        FeePair::new(
            self.suggested_max_fee_per_gas.clone(),
            self.suggested_max_priority_fee_per_gas.clone(),
        )
    }
}

/// 校验通过的快照：三个档位与 base fee 全部存在且非负
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimateSnapshot {
    pub low: TierEstimate,
    pub medium: TierEstimate,
    pub high: TierEstimate,
    pub estimated_base_fee: BigDecimal,
}

impl FeeEstimateSnapshot {
    pub fn tier(&self, tier: GasTier) -> &TierEstimate {
        match tier {
            GasTier::Low => &self.low,
            GasTier::Medium => &self.medium,
            GasTier::High => &self.high,
        }
    }
}

impl TryFrom<&RawFeeEstimates> for FeeEstimateSnapshot {
    type Error = RecalcSkip;

    fn try_from(raw: &RawFeeEstimates) -> Result<Self, Self::Error> {
        let estimated_base_fee = raw
            .estimated_base_fee
            .clone()
            .ok_or_else(|| RecalcSkip::MalformedSnapshot("缺少 estimatedBaseFee".to_string()))?;
        ensure_non_negative("estimatedBaseFee", &estimated_base_fee)?;

        Ok(Self {
            low: parse_tier(GasTier::Low, raw.low.as_ref())?,
            medium: parse_tier(GasTier::Medium, raw.medium.as_ref())?,
            high: parse_tier(GasTier::High, raw.high.as_ref())?,
            estimated_base_fee,
        })
    }
}

fn parse_tier(tier: GasTier, raw: Option<&RawTierEstimate>) -> Result<TierEstimate, RecalcSkip> {
    let raw = raw.ok_or_else(|| RecalcSkip::MalformedSnapshot(format!("缺少档位 {}", tier)))?;

    let priority = raw.suggested_max_priority_fee_per_gas.clone().ok_or_else(|| {
        RecalcSkip::MalformedSnapshot(format!("档位 {} 缺少 suggestedMaxPriorityFeePerGas", tier))
    })?;
    let max_fee = raw.suggested_max_fee_per_gas.clone().ok_or_else(|| {
        RecalcSkip::MalformedSnapshot(format!("档位 {} 缺少 suggestedMaxFeePerGas", tier))
    })?;
    ensure_non_negative(tier.as_str(), &priority)?;
    ensure_non_negative(tier.as_str(), &max_fee)?;

    Ok(TierEstimate {
        suggested_max_priority_fee_per_gas: priority,
        suggested_max_fee_per_gas: max_fee,
        min_wait_time_estimate: raw.min_wait_time_estimate,
        max_wait_time_estimate: raw.max_wait_time_estimate,
    })
}

fn ensure_non_negative(field: &str, value: &BigDecimal) -> Result<(), RecalcSkip> {
    if *value < BigDecimal::from(0) {
        return Err(RecalcSkip::MalformedSnapshot(format!(
            "{} 为负数: {}",
            field, value
        )));
    }
    Ok(())
}
