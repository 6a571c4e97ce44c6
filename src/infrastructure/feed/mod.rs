use crate::models::domain::estimates::GasFeeState;
use std::fmt;
use tokio::sync::watch;

/// 订阅估算源时获得的凭证，取消订阅时归还
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollToken(u64);

impl PollToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PollToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poll-{}", self.0)
    }
}

/// 外部费用估算源：有订阅者时轮询，最后一个订阅者退出后停止
pub trait GasFeeFeed: Send + Sync {
    fn subscribe(&self) -> PollToken;
    fn unsubscribe(&self, token: PollToken);
    /// 最新估算状态；每次轮询整体替换
    fn updates(&self) -> watch::Receiver<Option<GasFeeState>>;
}
