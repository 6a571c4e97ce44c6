use crate::infrastructure::feed::{GasFeeFeed, PollToken};
use crate::models::domain::estimates::GasFeeState;
use crate::{log_debug, log_info};
use std::sync::Arc;
use tokio::sync::watch;

/// 会话持有的轮询订阅；stop 后 token 失效，Drop 时自动归还
pub struct PollingLifecycle {
    feed: Arc<dyn GasFeeFeed>,
    token: Option<PollToken>,
}

impl PollingLifecycle {
    pub fn start(feed: Arc<dyn GasFeeFeed>) -> Self {
        let token = feed.subscribe();
        log_info!("订阅费用估算: {}", token);
        Self {
            feed,
            token: Some(token),
        }
    }

    pub fn token(&self) -> Option<PollToken> {
        self.token
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// 推送是否来自当前订阅
    pub fn is_current(&self, token: PollToken) -> bool {
        self.token == Some(token)
    }

    pub fn updates(&self) -> watch::Receiver<Option<GasFeeState>> {
        self.feed.updates()
    }

    /// 归还 token；重复调用无副作用
    pub fn stop(&mut self) {
        match self.token.take() {
            Some(token) => {
                self.feed.unsubscribe(token);
                log_info!("取消费用估算订阅: {}", token);
            }
            None => log_debug!("轮询订阅已停止"),
        }
    }
}

impl Drop for PollingLifecycle {
    fn drop(&mut self) {
        if self.token.is_some() {
            self.stop();
        }
    }
}
