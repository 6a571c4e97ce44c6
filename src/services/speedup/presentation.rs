use crate::errors::error::AppError;
use crate::models::domain::estimates::{FeeEstimateSnapshot, TierEstimate};
use crate::models::domain::fee_data::{
    FeeDataResult, TimeEstimate, TimeEstimateId, TimeEstimateSeverity,
};
use crate::models::domain::gas::{FeePair, GasTier};
use crate::services::speedup::fee_math::{DisplayContext, at_least, fee_for_gas, to_display};
use crate::utils::{gwei_to_wei, human_readable_time};

/// 把解析出的费用对映射成展示用的 FeeDataResult（不含余额校验）
pub fn build_fee_data(
    fees: &FeePair,
    gas_limit: u64,
    selected: Option<GasTier>,
    snapshot: &FeeEstimateSnapshot,
    display: &DisplayContext,
) -> Result<FeeDataResult, AppError> {
    fees.ensure_non_negative("resolved")?;
    let base_fee = &snapshot.estimated_base_fee;

    // 实际支付 = min(base fee + tip, max fee)
    let base_plus_tip = base_fee + &fees.max_priority_fee_per_gas;
    let effective_per_gas = if base_plus_tip < fees.max_fee_per_gas {
        base_plus_tip
    } else {
        fees.max_fee_per_gas.clone()
    };

    let gas_fee_min_wei = fee_for_gas(&effective_per_gas, gas_limit)?;
    let gas_fee_max_wei = fee_for_gas(&fees.max_fee_per_gas, gas_limit)?;
    let priority_wei = fee_for_gas(&fees.max_priority_fee_per_gas, gas_limit)?;

    Ok(FeeDataResult {
        selected_option: selected,
        gas_limit,
        max_fee_per_gas: fees.max_fee_per_gas.clone(),
        max_fee_per_gas_display: to_display(&gwei_to_wei(&fees.max_fee_per_gas), display),
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas.clone(),
        estimated_base_fee: base_fee.clone(),
        gas_fee_min: to_display(&gas_fee_min_wei, display),
        gas_fee_max: to_display(&gas_fee_max_wei, display),
        max_priority_fee: to_display(&priority_wei, display),
        // 加速只替换 gas，不含 value
        total_max_wei: gas_fee_max_wei,
        time_estimate: time_estimate(fees, selected, snapshot),
        error: None,
    })
}

pub fn time_estimate(
    fees: &FeePair,
    selected: Option<GasTier>,
    snapshot: &FeeEstimateSnapshot,
) -> TimeEstimate {
    match selected {
        Some(GasTier::Low) => maybe(&snapshot.low),
        Some(GasTier::Medium) => likely(&snapshot.medium),
        Some(GasTier::High) => very_likely(&snapshot.high),
        None => custom_time_estimate(fees, snapshot),
    }
}

fn custom_time_estimate(fees: &FeePair, snapshot: &FeeEstimateSnapshot) -> TimeEstimate {
    // max fee 低于当前 base fee 时无法被打包
    if !at_least(&fees.max_fee_per_gas, &snapshot.estimated_base_fee) {
        return unknown();
    }
    let tip = &fees.max_priority_fee_per_gas;
    if at_least(tip, &snapshot.high.suggested_max_priority_fee_per_gas) {
        very_likely(&snapshot.high)
    } else if at_least(tip, &snapshot.medium.suggested_max_priority_fee_per_gas) {
        likely(&snapshot.medium)
    } else if at_least(tip, &snapshot.low.suggested_max_priority_fee_per_gas) {
        maybe(&snapshot.low)
    } else {
        unknown()
    }
}

fn label(prefix: &str, connector: &str, wait_ms: Option<u64>) -> String {
    match wait_ms {
        Some(ms) => format!("{} {} {}", prefix, connector, human_readable_time(ms)),
        None => prefix.to_string(),
    }
}

fn maybe(tier: &TierEstimate) -> TimeEstimate {
    TimeEstimate {
        label: label("Maybe", "in", tier.max_wait_time_estimate),
        severity: TimeEstimateSeverity::Neutral,
        id: TimeEstimateId::Maybe,
    }
}

fn likely(tier: &TierEstimate) -> TimeEstimate {
    TimeEstimate {
        label: label("Likely", "in <", tier.max_wait_time_estimate),
        severity: TimeEstimateSeverity::Neutral,
        id: TimeEstimateId::Likely,
    }
}

fn very_likely(tier: &TierEstimate) -> TimeEstimate {
    TimeEstimate {
        label: label("Very likely", "in <", tier.max_wait_time_estimate),
        severity: TimeEstimateSeverity::Positive,
        id: TimeEstimateId::VeryLikely,
    }
}

fn unknown() -> TimeEstimate {
    TimeEstimate {
        label: "Unknown processing time".to_string(),
        severity: TimeEstimateSeverity::Critical,
        id: TimeEstimateId::Unknown,
    }
}
