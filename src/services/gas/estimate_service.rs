// services/gas/estimate_service.rs

use crate::errors::error::AppError;
use crate::infrastructure::provider::ProviderTrait;
use crate::models::domain::estimates::{GasFeeState, RawFeeEstimates, RawTierEstimate};
use crate::models::domain::gas::{GasEstimateType, GasTier};
use crate::utils::wei_to_gwei;
use ethers_core::types::U256;

/// 把链上 EIP-1559 建议值拆成 low / medium / high 三档（纯整数运算，无浮点风险）
#[derive(Clone, Copy, Debug)]
pub struct FeeEstimateService {
    /// 全局对 tip 的额外调整百分比（100 = 无调整，110 = +10%，90 = -10%）
    base_tip_percent: u128,
}

impl Default for FeeEstimateService {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FeeEstimateService {
    pub fn new(base_tip_percent: u128) -> Self {
        Self { base_tip_percent }
    }

    /// 拉取一次完整的估算状态；最新区块没有 base fee 时视为 legacy 链
    pub async fn fetch_state(&self, provider: &dyn ProviderTrait) -> Result<GasFeeState, AppError> {
        // 1. 最新 base fee
        let Some(base_fee) = provider.get_latest_base_fee().await? else {
            return Ok(GasFeeState {
                gas_estimate_type: GasEstimateType::Legacy,
                gas_fee_estimates: None,
            });
        };

        // 2. 链上建议的费用
        let (suggested_max_fee, base_priority_fee) = provider.estimate_eip1559_fees().await?;

        // 3. 拆档
        let estimates = self.build_estimates(base_fee, suggested_max_fee, base_priority_fee)?;
        Ok(GasFeeState::fee_market(estimates))
    }

    pub fn build_estimates(
        &self,
        base_fee: U256,
        suggested_max_fee: U256,
        base_priority_fee: U256,
    ) -> Result<RawFeeEstimates, AppError> {
        Ok(RawFeeEstimates {
            low: Some(self.tier_estimate(GasTier::Low, base_fee, base_priority_fee, None)?),
            medium: Some(self.tier_estimate(GasTier::Medium, base_fee, base_priority_fee, None)?),
            // 高档不低于链上建议的 max fee
            high: Some(self.tier_estimate(
                GasTier::High,
                base_fee,
                base_priority_fee,
                Some(suggested_max_fee),
            )?),
            estimated_base_fee: Some(wei_to_gwei(base_fee)),
        })
    }

    fn tier_estimate(
        &self,
        tier: GasTier,
        base_fee: U256,
        base_priority_fee: U256,
        max_fee_floor: Option<U256>,
    ) -> Result<RawTierEstimate, AppError> {
        let total_multiplier = self
            .base_tip_percent
            .checked_mul(tier.tip_multiplier_percent())
            .ok_or_else(|| {
                AppError::Internal("Tip multiplier overflow during calculation".to_string())
            })?
            / 100;

        let priority_fee = base_priority_fee
            .checked_mul(U256::from(total_multiplier))
            .ok_or_else(|| AppError::Internal("Adjusted priority fee overflow".to_string()))?
            / U256::from(100);

        let base_headroom = base_fee
            .checked_mul(U256::from(tier.base_fee_headroom_percent()))
            .ok_or_else(|| AppError::Internal("Base fee headroom overflow".to_string()))?
            / U256::from(100);

        let mut max_fee = base_headroom
            .checked_add(priority_fee)
            .ok_or_else(|| AppError::Internal("Max fee calculation overflow".to_string()))?;
        if let Some(floor) = max_fee_floor {
            max_fee = max_fee.max(floor);
        }

        let (min_wait, max_wait) = tier.wait_time_ms();
        Ok(RawTierEstimate {
            suggested_max_priority_fee_per_gas: Some(wei_to_gwei(priority_fee)),
            suggested_max_fee_per_gas: Some(wei_to_gwei(max_fee)),
            min_wait_time_estimate: Some(min_wait),
            max_wait_time_estimate: Some(max_wait),
        })
    }
}
