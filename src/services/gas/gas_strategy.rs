// services/gas/gas_strategy.rs

use crate::models::domain::gas::GasTier;

/// 各档位相对链上建议值的调整策略（纯整数百分比，无浮点）
impl GasTier {
    /// tip 调整百分比（100 = 无调整）
    /// 示例：150 表示该档位 tip = base_tip × 150%
    pub fn tip_multiplier_percent(&self) -> u128 {
        match self {
            GasTier::Low => 80,     // -20%
            GasTier::Medium => 100, // 无调整
            GasTier::High => 150,   // +50%
        }
    }

    /// base fee 预留空间百分比：max_fee = base_fee × 该值 / 100 + tip
    /// 档位越高，能承受的 base fee 上涨越多
    pub fn base_fee_headroom_percent(&self) -> u128 {
        match self {
            GasTier::Low => 110,
            GasTier::Medium => 125,
            GasTier::High => 200,
        }
    }

    /// 预计等待时间区间（毫秒）
    pub fn wait_time_ms(&self) -> (u64, u64) {
        match self {
            GasTier::Low => (15_000, 60_000),
            GasTier::Medium => (15_000, 30_000),
            GasTier::High => (15_000, 15_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_grow_with_tier() {
        let tips: Vec<u128> = GasTier::ALL.iter().map(|t| t.tip_multiplier_percent()).collect();
        let headroom: Vec<u128> = GasTier::ALL
            .iter()
            .map(|t| t.base_fee_headroom_percent())
            .collect();
        assert!(tips.windows(2).all(|w| w[0] < w[1]));
        assert!(headroom.windows(2).all(|w| w[0] < w[1]));
    }
}
