use crate::errors::error::{AppError, RecalcSkip};
use crate::infrastructure::feed::{GasFeeFeed, PollToken};
use crate::models::domain::estimates::GasFeeState;
use crate::models::domain::fee_data::{FeeDataResult, GasAnalyticsParams};
use crate::models::domain::gas::{GasFeeInput, GasTier};
use crate::services::speedup::polling::PollingLifecycle;
use crate::services::speedup::recalc_engine::{RecalcEngine, RecalcOutcome};
use crate::{log_debug, log_error, log_info, log_warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// 每次重算成功后收到最新结果与埋点参数
pub trait FeeDataObserver: Send {
    fn on_fee_data(&mut self, fee_data: &FeeDataResult, analytics: &GasAnalyticsParams, animate: bool);
}

/// 默认观察者：只写日志
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl FeeDataObserver for LoggingObserver {
    fn on_fee_data(&mut self, fee_data: &FeeDataResult, analytics: &GasAnalyticsParams, animate: bool) {
        let tier = fee_data
            .selected_option
            .map(|tier| tier.to_string())
            .unwrap_or_else(|| "custom".to_string());
        log_info!(
            "💰 [{}] maxFee={} gwei, priority={} gwei, 最高 {} ({}), {}",
            tier,
            fee_data.max_fee_per_gas,
            fee_data.max_priority_fee_per_gas,
            fee_data.gas_fee_max.native,
            fee_data.gas_fee_max.conversion,
            fee_data.time_estimate.label
        );
        if let Some(error) = &fee_data.error {
            log_warn!("{}", error);
        }
        match serde_json::to_string(analytics) {
            Ok(json) => log_debug!("analytics: {} animate={}", json, animate),
            Err(e) => log_warn!("埋点参数序列化失败: {}", e),
        }
    }
}

/// 一次加速会话：持有引擎、轮询订阅与观察者
pub struct SpeedUpSession {
    engine: RecalcEngine,
    polling: PollingLifecycle,
    observer: Box<dyn FeeDataObserver>,
}

impl SpeedUpSession {
    pub fn start(
        engine: RecalcEngine,
        feed: Arc<dyn GasFeeFeed>,
        observer: Box<dyn FeeDataObserver>,
    ) -> Self {
        Self {
            engine,
            polling: PollingLifecycle::start(feed),
            observer,
        }
    }

    pub fn poll_token(&self) -> Option<PollToken> {
        self.polling.token()
    }

    pub fn engine(&self) -> &RecalcEngine {
        &self.engine
    }

    pub fn updates(&self) -> watch::Receiver<Option<GasFeeState>> {
        self.polling.updates()
    }

    /// 轮询推送；token 不是当前订阅时直接丢弃
    pub fn on_tick(
        &mut self,
        token: PollToken,
        state: &GasFeeState,
    ) -> Result<RecalcOutcome, AppError> {
        if !self.polling.is_current(token) {
            log_debug!("丢弃失效订阅的推送: {}", token);
            return Ok(RecalcOutcome::Skipped(RecalcSkip::InactiveSubscription(
                token.to_string(),
            )));
        }
        let outcome = self.engine.on_estimates(state)?;
        self.emit(&outcome);
        Ok(outcome)
    }

    pub fn on_change(
        &mut self,
        input: GasFeeInput,
        selected: Option<GasTier>,
    ) -> Result<RecalcOutcome, AppError> {
        let outcome = self.engine.on_change(input, selected)?;
        self.emit(&outcome);
        Ok(outcome)
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) -> Result<RecalcOutcome, AppError> {
        let outcome = self.engine.set_gas_limit(gas_limit)?;
        self.emit(&outcome);
        Ok(outcome)
    }

    /// 结束会话并把最后一次结果交给回调；是否因余额不足拒绝保存由调用方决定
    pub fn save<R>(mut self, on_save: impl FnOnce(Option<FeeDataResult>) -> R) -> R {
        self.polling.stop();
        log_info!("✅ 加速会话已保存");
        on_save(self.engine.fee_data().cloned())
    }

    pub fn cancel<R>(mut self, on_cancel: impl FnOnce() -> R) -> R {
        self.polling.stop();
        log_info!("加速会话已取消");
        on_cancel()
    }

    fn emit(&mut self, outcome: &RecalcOutcome) {
        if *outcome != RecalcOutcome::Updated {
            return;
        }
        let animate = self.engine.take_animate();
        let analytics = self.engine.analytics_params();
        if let Some(fee_data) = self.engine.fee_data() {
            self.observer.on_fee_data(fee_data, &analytics, animate);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Change {
        input: GasFeeInput,
        selected: Option<GasTier>,
    },
    SetGasLimit(u64),
    Save,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    Saved(Option<FeeDataResult>),
    Cancelled,
}

/// 驱动会话：估算推送与用户命令在同一个任务内串行处理
pub async fn run_session(
    mut session: SpeedUpSession,
    mut commands: mpsc::Receiver<SessionCommand>,
) -> Result<SessionExit, AppError> {
    let Some(token) = session.poll_token() else {
        return Err(AppError::Internal("会话没有有效的轮询订阅".to_string()));
    };
    let mut updates = session.updates();

    // 订阅前已有的估算先处理一次
    let current = updates.borrow_and_update().clone();
    if let Some(state) = current {
        session.on_tick(token, &state)?;
    }

    let mut feed_open = true;
    loop {
        tokio::select! {
            changed = updates.changed(), if feed_open => {
                if changed.is_err() {
                    log_warn!("费用估算源已关闭，仅处理用户命令");
                    feed_open = false;
                } else {
                    let state = updates.borrow_and_update().clone();
                    if let Some(state) = state {
                        session.on_tick(token, &state)?;
                    }
                }
            }
            command = commands.recv() => match command {
                // 用户输入违反数值契约时本次修改被整体回滚，会话继续
                Some(SessionCommand::Change { input, selected }) => {
                    if let Err(e) = session.on_change(input, selected) {
                        log_error!("修改费用失败: {}", e);
                    }
                }
                Some(SessionCommand::SetGasLimit(gas_limit)) => {
                    if let Err(e) = session.set_gas_limit(gas_limit) {
                        log_error!("修改 gas limit 失败: {}", e);
                    }
                }
                Some(SessionCommand::Save) => {
                    return Ok(session.save(SessionExit::Saved));
                }
                Some(SessionCommand::Cancel) | None => {
                    return Ok(session.cancel(|| SessionExit::Cancelled));
                }
            }
        }
    }
}
