// services/gas/gas_fee_feed.rs

use crate::infrastructure::feed::{GasFeeFeed, PollToken};
use crate::infrastructure::provider::ProviderTrait;
use crate::models::domain::estimates::GasFeeState;
use crate::services::gas::estimate_service::FeeEstimateService;
use crate::{log_debug, log_info, log_warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 基于 JSON-RPC 的估算源：所有订阅共享一个轮询任务，最后一个 token 归还后停止
pub struct RpcGasFeeFeed {
    provider: Arc<dyn ProviderTrait>,
    estimator: FeeEstimateService,
    interval: Duration,
    next_token: AtomicU64,
    tokens: Mutex<HashSet<PollToken>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    sender: Arc<watch::Sender<Option<GasFeeState>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RpcGasFeeFeed {
    pub fn new(
        provider: Arc<dyn ProviderTrait>,
        estimator: FeeEstimateService,
        interval: Duration,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            provider,
            estimator,
            interval,
            next_token: AtomicU64::new(1),
            tokens: Mutex::new(HashSet::new()),
            poller: Mutex::new(None),
            sender: Arc::new(sender),
        }
    }

    pub fn active_tokens(&self) -> usize {
        lock(&self.tokens).len()
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.poller)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn spawn_poller(&self) -> JoinHandle<()> {
        let provider = self.provider.clone();
        let estimator = self.estimator;
        let sender = self.sender.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match estimator.fetch_state(provider.as_ref()).await {
                    Ok(state) => {
                        log_debug!("费用估算已更新: type={}", state.gas_estimate_type);
                        sender.send_replace(Some(state));
                    }
                    // 失败时保留上一次的估算，下个周期再试
                    Err(e) => log_warn!("费用估算轮询失败: {}", e),
                }
            }
        })
    }
}

impl GasFeeFeed for RpcGasFeeFeed {
    fn subscribe(&self) -> PollToken {
        let token = PollToken::new(self.next_token.fetch_add(1, Ordering::SeqCst));
        lock(&self.tokens).insert(token);

        let mut poller = lock(&self.poller);
        if poller.as_ref().is_none_or(|handle| handle.is_finished()) {
            *poller = Some(self.spawn_poller());
            log_info!("🚀 启动费用估算轮询，间隔 {:?}", self.interval);
        }
        token
    }

    fn unsubscribe(&self, token: PollToken) {
        let mut tokens = lock(&self.tokens);
        if !tokens.remove(&token) {
            log_warn!("重复或未知的轮询 token: {}", token);
            return;
        }
        if tokens.is_empty() {
            if let Some(handle) = lock(&self.poller).take() {
                handle.abort();
                log_info!("⏹️ 无订阅者，停止费用估算轮询");
            }
        }
    }

    fn updates(&self) -> watch::Receiver<Option<GasFeeState>> {
        self.sender.subscribe()
    }
}

impl Drop for RpcGasFeeFeed {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.poller).take() {
            handle.abort();
        }
    }
}
