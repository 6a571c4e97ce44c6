use crate::models::domain::gas::GasTier;
use bigdecimal::BigDecimal;
use serde::Serialize;

/// 会话内的选择状态，只由 RecalcEngine 修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// None 表示自定义 / 高级模式
    pub selected_tier: Option<GasTier>,
    pub one_time_decision_made: bool,
    pub polling_active: bool,
    pub restricted_to_high_only: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_tier: Some(GasTier::Medium),
            one_time_decision_made: false,
            polling_active: true,
            restricted_to_high_only: false,
        }
    }
}

impl SelectionState {
    /// 编辑器中需要隐藏的档位：low 始终隐藏，加速值已超过 medium 时 medium 也隐藏
    pub fn ignored_tiers(&self) -> &'static [GasTier] {
        if self.restricted_to_high_only {
            &[GasTier::Low, GasTier::Medium]
        } else {
            &[GasTier::Low]
        }
    }

    pub fn is_selectable(&self, tier: GasTier) -> bool {
        !self.ignored_tiers().contains(&tier)
    }
}

/// 首次决策后冻结的加速阈值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeedUpOptionsOverride {
    pub max_priority_fee_threshold: BigDecimal,
    pub max_fee_threshold: BigDecimal,
    pub show_advanced_by_default: bool,
}

/// Idle → (Deciding) → Steady；Deciding 在同一次调用内完成，对外不可见
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Steady { selected: Option<GasTier> },
}
