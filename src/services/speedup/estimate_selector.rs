use crate::errors::error::AppError;
use crate::models::domain::estimates::FeeEstimateSnapshot;
use crate::models::domain::gas::{ExistingTransactionFees, FeePair};
use crate::models::domain::selection::{SelectionState, SpeedUpOptionsOverride};
use crate::services::speedup::fee_math::{at_least, scale};
use bigdecimal::BigDecimal;

/// 首次决策的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUpDecision {
    /// 默认加速值已达到 medium，只允许 high / 自定义
    ExceedsMedium,
    BelowMedium,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub fees: FeePair,
    pub state: SelectionState,
    /// 仅在本次做出首次决策时为 Some
    pub options: Option<SpeedUpOptionsOverride>,
    pub decision: Option<SpeedUpDecision>,
}

/// 根据选择状态与快照决定本次使用的费用对
#[derive(Debug, Clone)]
pub struct EstimateSelector {
    rate: BigDecimal,
}

impl EstimateSelector {
    pub fn new(rate: BigDecimal) -> Self {
        Self { rate }
    }

    /// 原交易费用 × 加速倍率
    pub fn default_bump(&self, existing: &ExistingTransactionFees) -> Result<FeePair, AppError> {
        Ok(FeePair::new(
            scale(&existing.max_fee_per_gas, &self.rate)?,
            scale(&existing.max_priority_fee_per_gas, &self.rate)?,
        ))
    }

    pub fn resolve(
        &self,
        state: &SelectionState,
        existing: &ExistingTransactionFees,
        snapshot: &FeeEstimateSnapshot,
        custom: Option<&FeePair>,
    ) -> Result<Resolution, AppError> {
        let mut next = state.clone();
        let mut options = None;
        let mut decision = None;

        // 自定义模式下推迟首次决策，直到重新选择档位
        if !state.one_time_decision_made && state.polling_active {
            let bump = self.default_bump(existing)?;
            let medium = &snapshot.medium;
            next.one_time_decision_made = true;

            if at_least(
                &bump.max_priority_fee_per_gas,
                &medium.suggested_max_priority_fee_per_gas,
            ) || at_least(&bump.max_fee_per_gas, &medium.suggested_max_fee_per_gas)
            {
                next.restricted_to_high_only = true;
                next.selected_tier = None;
                next.polling_active = false;
                return Ok(Resolution {
                    options: Some(SpeedUpOptionsOverride {
                        max_priority_fee_threshold: bump.max_priority_fee_per_gas.clone(),
                        max_fee_threshold: bump.max_fee_per_gas.clone(),
                        show_advanced_by_default: true,
                    }),
                    fees: bump,
                    state: next,
                    decision: Some(SpeedUpDecision::ExceedsMedium),
                });
            }

            options = Some(SpeedUpOptionsOverride {
                max_priority_fee_threshold: medium.suggested_max_priority_fee_per_gas.clone(),
                max_fee_threshold: medium.suggested_max_fee_per_gas.clone(),
                show_advanced_by_default: false,
            });
            decision = Some(SpeedUpDecision::BelowMedium);
        }

        let fees = match (next.selected_tier, custom) {
            (Some(tier), _) => snapshot.tier(tier).fee_pair(),
            (None, Some(custom)) => custom.clone(),
            // 自定义模式但还没有自定义值：退回默认加速值
            (None, None) => self.default_bump(existing)?,
        };

        Ok(Resolution {
            fees,
            state: next,
            options,
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::estimates::TierEstimate;
    use crate::models::domain::gas::GasTier;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn tier(max_fee: &str, priority: &str) -> TierEstimate {
        TierEstimate {
            suggested_max_priority_fee_per_gas: dec(priority),
            suggested_max_fee_per_gas: dec(max_fee),
            min_wait_time_estimate: None,
            max_wait_time_estimate: None,
        }
    }

    fn snapshot(medium_max: &str, medium_priority: &str) -> FeeEstimateSnapshot {
        FeeEstimateSnapshot {
            low: tier("90", "1"),
            medium: tier(medium_max, medium_priority),
            high: tier("150", "5"),
            estimated_base_fee: dec("80"),
        }
    }

    fn existing() -> ExistingTransactionFees {
        FeePair::new(dec("100"), dec("2"))
    }

    fn selector() -> EstimateSelector {
        EstimateSelector::new(dec("1.1"))
    }

    #[test]
    fn bump_below_medium_keeps_tier_selection() {
        let resolution = selector()
            .resolve(&SelectionState::default(), &existing(), &snapshot("120", "3"), None)
            .unwrap();

        assert_eq!(resolution.decision, Some(SpeedUpDecision::BelowMedium));
        assert_eq!(resolution.fees, FeePair::new(dec("120"), dec("3")));
        assert_eq!(resolution.state.selected_tier, Some(GasTier::Medium));
        assert!(resolution.state.one_time_decision_made);
        assert!(resolution.state.polling_active);
        assert!(!resolution.state.restricted_to_high_only);
        let options = resolution.options.unwrap();
        assert_eq!(options.max_fee_threshold, dec("120"));
        assert_eq!(options.max_priority_fee_threshold, dec("3"));
        assert!(!options.show_advanced_by_default);
    }

    #[test]
    fn bump_at_or_above_medium_forces_custom() {
        let resolution = selector()
            .resolve(&SelectionState::default(), &existing(), &snapshot("105", "2"), None)
            .unwrap();

        assert_eq!(resolution.decision, Some(SpeedUpDecision::ExceedsMedium));
        assert_eq!(resolution.fees, FeePair::new(dec("110"), dec("2.2")));
        assert_eq!(resolution.state.selected_tier, None);
        assert!(resolution.state.restricted_to_high_only);
        assert!(!resolution.state.polling_active);
        let options = resolution.options.unwrap();
        assert_eq!(options.max_fee_threshold, dec("110"));
        assert_eq!(options.max_priority_fee_threshold, dec("2.2"));
        assert!(options.show_advanced_by_default);
    }

    #[test]
    fn priority_fee_alone_can_trigger_restriction() {
        // 110 < 200，但 2.2 >= 2.2
        let resolution = selector()
            .resolve(&SelectionState::default(), &existing(), &snapshot("200", "2.2"), None)
            .unwrap();
        assert_eq!(resolution.decision, Some(SpeedUpDecision::ExceedsMedium));
    }

    #[test]
    fn later_ticks_skip_the_decision() {
        let first = selector()
            .resolve(&SelectionState::default(), &existing(), &snapshot("120", "3"), None)
            .unwrap();

        // 市场回落到低于加速值，也不再重新决策
        let second = selector()
            .resolve(&first.state, &existing(), &snapshot("101", "1"), None)
            .unwrap();
        assert_eq!(second.decision, None);
        assert_eq!(second.options, None);
        assert_eq!(second.state, first.state);
        assert_eq!(second.fees, FeePair::new(dec("101"), dec("1")));
    }

    #[test]
    fn custom_mode_defers_the_decision() {
        let state = SelectionState {
            selected_tier: None,
            one_time_decision_made: false,
            polling_active: false,
            restricted_to_high_only: false,
        };
        let custom = FeePair::new(dec("200"), dec("9"));
        let resolution = selector()
            .resolve(&state, &existing(), &snapshot("105", "2"), Some(&custom))
            .unwrap();
        assert_eq!(resolution.decision, None);
        assert_eq!(resolution.options, None);
        assert_eq!(resolution.fees, custom);
        assert!(!resolution.state.one_time_decision_made);
    }

    #[test]
    fn bump_is_normalized() {
        let bump = selector().default_bump(&existing()).unwrap();
        assert_eq!(bump.max_fee_per_gas.to_string(), "110");
        assert_eq!(bump.max_priority_fee_per_gas.to_string(), "2.2");
    }

    #[test]
    fn custom_mode_uses_last_custom_values() {
        let state = SelectionState {
            selected_tier: None,
            one_time_decision_made: true,
            polling_active: false,
            restricted_to_high_only: false,
        };
        let custom = FeePair::new(dec("130"), dec("4"));
        let resolution = selector()
            .resolve(&state, &existing(), &snapshot("120", "3"), Some(&custom))
            .unwrap();
        assert_eq!(resolution.fees, custom);
    }
}
