use crate::config::SpeedUpConfig;
use crate::errors::error::{AppError, RecalcSkip};
use crate::infrastructure::sources::{AccountSource, CurrencyRateSource};
use crate::models::domain::estimates::{FeeEstimateSnapshot, GasFeeState};
use crate::models::domain::fee_data::{FeeDataResult, GasAnalyticsParams, GasMode};
use crate::models::domain::gas::{ExistingTransaction, FeePair, GasEstimateType, GasFeeInput, GasTier};
use crate::models::domain::selection::{EngineState, SelectionState, SpeedUpOptionsOverride};
use crate::services::speedup::balance_validator;
use crate::services::speedup::estimate_selector::{EstimateSelector, SpeedUpDecision};
use crate::services::speedup::fee_math::DisplayContext;
use crate::services::speedup::presentation::build_fee_data;
use crate::utils::{ticker_or_default, u256_to_bigdecimal};
use crate::{log_debug, log_info, log_warn};
use bigdecimal::BigDecimal;
use std::sync::Arc;

pub const SPEED_UP_VIEW: &str = "Transactions (Speed Up)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecalcOutcome {
    /// 生成了新的 FeeDataResult
    Updated,
    /// 输入与上一次完全相同，结果沿用
    Unchanged,
    /// 非致命跳过，保留上一次结果
    Skipped(RecalcSkip),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Tick,
    TierSelected,
    CustomEdit,
    GasLimit,
}

/// 一次重算的完整输入；相同输入必然得到相同结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalcInputs {
    pub fees: FeePair,
    pub gas_limit: u64,
    pub selected: Option<GasTier>,
    pub snapshot: FeeEstimateSnapshot,
    pub balance_wei: BigDecimal,
    pub display: DisplayContext,
}

/// 纯函数：输入 → FeeDataResult（含余额校验）
pub fn recompute(inputs: &RecalcInputs) -> Result<FeeDataResult, AppError> {
    let mut fee_data = build_fee_data(
        &inputs.fees,
        inputs.gas_limit,
        inputs.selected,
        &inputs.snapshot,
        &inputs.display,
    )?;
    fee_data.error = balance_validator::validate(
        &fee_data.total_max_wei,
        &inputs.balance_wei,
        Some(&inputs.display.ticker),
        inputs.display.native_decimals,
    );
    Ok(fee_data)
}

/// 加速会话的响应式核心，每个会话独立持有一份
pub struct RecalcEngine {
    transaction: ExistingTransaction,
    chain_id: String,
    selector: EstimateSelector,
    native_decimals: i64,
    fiat_decimals: i64,
    accounts: Arc<dyn AccountSource>,
    currency: Arc<dyn CurrencyRateSource>,

    selection: SelectionState,
    speed_up_options: Option<SpeedUpOptionsOverride>,
    estimate_type: Option<GasEstimateType>,
    snapshot: Option<FeeEstimateSnapshot>,
    custom: Option<FeePair>,
    gas_limit: u64,
    fee_data: Option<FeeDataResult>,
    last_inputs: Option<RecalcInputs>,
    animate: bool,
}

impl RecalcEngine {
    pub fn new(
        transaction: ExistingTransaction,
        chain_id: impl Into<String>,
        settings: &SpeedUpConfig,
        accounts: Arc<dyn AccountSource>,
        currency: Arc<dyn CurrencyRateSource>,
    ) -> Result<Self, AppError> {
        settings.validate()?;
        transaction.fees.ensure_non_negative("existing transaction")?;

        Ok(Self {
            gas_limit: transaction.gas_limit,
            transaction,
            chain_id: chain_id.into(),
            selector: EstimateSelector::new(settings.rate.clone()),
            native_decimals: settings.native_decimals,
            fiat_decimals: settings.fiat_decimals,
            accounts,
            currency,
            selection: SelectionState::default(),
            speed_up_options: None,
            estimate_type: None,
            snapshot: None,
            custom: None,
            fee_data: None,
            last_inputs: None,
            animate: false,
        })
    }

    pub fn state(&self) -> EngineState {
        if self.selection.one_time_decision_made || self.fee_data.is_some() {
            EngineState::Steady {
                selected: self.selection.selected_tier,
            }
        } else {
            EngineState::Idle
        }
    }

    pub fn fee_data(&self) -> Option<&FeeDataResult> {
        self.fee_data.as_ref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn speed_up_options(&self) -> Option<&SpeedUpOptionsOverride> {
        self.speed_up_options.as_ref()
    }

    pub fn ignored_tiers(&self) -> &'static [GasTier] {
        self.selection.ignored_tiers()
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// 读取并复位动画标记
    pub fn take_animate(&mut self) -> bool {
        std::mem::take(&mut self.animate)
    }

    pub fn analytics_params(&self) -> GasAnalyticsParams {
        let selected = self.selection.selected_tier;
        GasAnalyticsParams {
            chain_id: self.chain_id.clone(),
            gas_estimate_type: self.estimate_type.unwrap_or(GasEstimateType::Unknown),
            gas_mode: if selected.is_some() {
                GasMode::Basic
            } else {
                GasMode::Advanced
            },
            speed_set: selected,
            view: SPEED_UP_VIEW,
        }
    }

    /// 估算源推送了新状态
    pub fn on_estimates(&mut self, state: &GasFeeState) -> Result<RecalcOutcome, AppError> {
        self.estimate_type = Some(state.gas_estimate_type);
        if state.gas_estimate_type != GasEstimateType::FeeMarket {
            return Ok(self.skip(RecalcSkip::UnsupportedEstimateType(state.gas_estimate_type)));
        }

        let Some(raw) = state.gas_fee_estimates.as_ref() else {
            return Ok(self.skip(RecalcSkip::MalformedSnapshot(
                "缺少 gasFeeEstimates".to_string(),
            )));
        };
        let snapshot = match FeeEstimateSnapshot::try_from(raw) {
            Ok(snapshot) => snapshot,
            Err(skip) => return Ok(self.skip(skip)),
        };

        // 轮询停用时仍保存最新快照，重新选择档位时使用
        self.snapshot = Some(snapshot);
        if !self.selection.polling_active {
            // 快照到达前输入的自定义值还没有结果，用它补算一次，不做首次决策
            if self.fee_data.is_none() && self.custom.is_some() {
                return self.recalculate(Trigger::CustomEdit);
            }
            return Ok(self.skip(RecalcSkip::PollingDisabled));
        }

        self.recalculate(Trigger::Tick)
    }

    /// 用户修改：selected 为 Some 表示选择预设档位，None 表示自定义值
    pub fn on_change(
        &mut self,
        input: GasFeeInput,
        selected: Option<GasTier>,
    ) -> Result<RecalcOutcome, AppError> {
        input.fees.ensure_non_negative("custom")?;
        if let Some(tier) = selected {
            if !self.selection.is_selectable(tier) {
                return Ok(self.skip(RecalcSkip::TierExcluded(tier)));
            }
        }

        let previous = (self.selection.clone(), self.custom.clone(), self.gas_limit);
        let trigger = match selected {
            Some(_) => {
                // 预设档位使用交易原始 gas limit
                self.gas_limit = self.transaction.gas_limit;
                Trigger::TierSelected
            }
            None => {
                self.custom = Some(input.fees);
                if let Some(gas_limit) = input.gas_limit {
                    self.gas_limit = gas_limit;
                }
                Trigger::CustomEdit
            }
        };
        self.selection.selected_tier = selected;
        self.selection.polling_active = selected.is_some();

        self.recalculate(trigger).inspect_err(|_| {
            (self.selection, self.custom, self.gas_limit) = previous;
        })
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) -> Result<RecalcOutcome, AppError> {
        let previous = self.gas_limit;
        self.gas_limit = gas_limit;
        self.recalculate(Trigger::GasLimit).inspect_err(|_| {
            self.gas_limit = previous;
        })
    }

    fn skip(&self, reason: RecalcSkip) -> RecalcOutcome {
        match &reason {
            RecalcSkip::MalformedSnapshot(_) | RecalcSkip::TierExcluded(_) => {
                log_warn!("跳过重算: {}", reason)
            }
            _ => log_debug!("跳过重算: {}", reason),
        }
        RecalcOutcome::Skipped(reason)
    }

    fn display_context(&self) -> Option<DisplayContext> {
        Some(DisplayContext {
            ticker: ticker_or_default(self.accounts.ticker().as_deref()),
            currency: self.currency.current_currency(),
            conversion_rate: self.currency.conversion_rate()?,
            native_decimals: self.native_decimals,
            fiat_decimals: self.fiat_decimals,
        })
    }

    fn recalculate(&mut self, trigger: Trigger) -> Result<RecalcOutcome, AppError> {
        // 1. 输入就绪检查
        let Some(snapshot) = self.snapshot.clone() else {
            return Ok(self.skip(RecalcSkip::InputUnavailable("fee estimates")));
        };
        let Some(balance) = self.accounts.balance_of(&self.transaction.from) else {
            return Ok(self.skip(RecalcSkip::InputUnavailable("account balance")));
        };
        let Some(display) = self.display_context() else {
            return Ok(self.skip(RecalcSkip::InputUnavailable("conversion rate")));
        };

        // 2. 解析费用对（首次会做阈值决策）
        let resolution = self.selector.resolve(
            &self.selection,
            &self.transaction.fees,
            &snapshot,
            self.custom.as_ref(),
        )?;

        let inputs = RecalcInputs {
            fees: resolution.fees.clone(),
            gas_limit: self.gas_limit,
            selected: resolution.state.selected_tier,
            snapshot,
            balance_wei: u256_to_bigdecimal(balance),
            display,
        };
        if self.fee_data.is_some() && self.last_inputs.as_ref() == Some(&inputs) {
            return Ok(RecalcOutcome::Unchanged);
        }

        // 3. 重算；失败时不提交任何状态
        let fee_data = recompute(&inputs)?;

        // 4. 提交
        if let Some(decision) = resolution.decision {
            match decision {
                SpeedUpDecision::ExceedsMedium => {
                    log_info!(
                        "默认加速值已达到 medium 档位，仅保留 high / 自定义: maxFee={} gwei, priority={} gwei",
                        resolution.fees.max_fee_per_gas,
                        resolution.fees.max_priority_fee_per_gas
                    );
                    self.custom = Some(resolution.fees.clone());
                }
                SpeedUpDecision::BelowMedium => {
                    log_info!("默认加速值低于 medium 档位，使用市场估算");
                }
            }
        }
        if self.speed_up_options.is_none() {
            self.speed_up_options = resolution.options;
        }
        self.selection = resolution.state;
        self.animate = match trigger {
            Trigger::Tick => self.selection.selected_tier.is_some(),
            Trigger::TierSelected => true,
            Trigger::CustomEdit | Trigger::GasLimit => false,
        };
        if let Some(error) = &fee_data.error {
            log_debug!("余额不足: {}", error);
        }
        self.fee_data = Some(fee_data);
        self.last_inputs = Some(inputs);

        Ok(RecalcOutcome::Updated)
    }
}
