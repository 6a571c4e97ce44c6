use super::ethereum_provider::{EthereumProvider, ProviderTrait};
use crate::errors::error::AppError;
use crate::log_warn;
use async_trait::async_trait;
use ethers_core::types::{Address, BlockNumber, U256};
use ethers_providers::{Http, Middleware, Provider, ProviderError};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// 指数退避 + 抖动的重试包装，估算源的瞬时失败在这里消化
pub struct RetryAdapter {
    provider: Arc<EthereumProvider>,
    max_retries: usize,
    base_delay: Duration,
}

impl RetryAdapter {
    pub fn new(provider: Arc<EthereumProvider>, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            provider,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// 第 n 次重试前的等待：base * 2^(n-1)，指数上限 2^10，外加 0~10% 抖动
    fn backoff(&self, attempt: usize) -> Duration {
        let exponent = (attempt - 1).min(10) as u32;
        let base_ms = self.base_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << exponent);
        let jitter = rand::thread_rng().gen_range(0..=(delay_ms / 10 + 1));
        Duration::from_millis(delay_ms + jitter)
    }

    async fn retry_call<T, Fut, F>(&self, mut f: F) -> Result<T, AppError>
    where
        F: FnMut(Arc<Provider<Http>>) -> Fut + Send,
        Fut: Future<Output = Result<T, ProviderError>> + Send,
    {
        let mut last_error: Option<ProviderError> = None;
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                log_warn!(
                    "RPC 尝试失败，正在进行第 {} 次重试，等待 {:?}...",
                    attempt + 1,
                    delay
                );
                sleep(delay).await;
            }
            match f(self.provider.get_provider()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    log_warn!("RPC 调用失败 (第 {} 次): {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }
        Err(AppError::ProviderError(format!(
            "重试 {} 次失败，最后错误: {:?}",
            self.max_retries, last_error
        )))
    }
}

#[async_trait]
impl ProviderTrait for RetryAdapter {
    async fn get_chain_id(&self) -> Result<U256, AppError> {
        self.retry_call(|p| async move { p.get_chainid().await })
            .await
    }

    async fn get_balance(&self, address: Address) -> Result<U256, AppError> {
        self.retry_call(move |p| async move { p.get_balance(address, None).await })
            .await
    }

    async fn get_latest_base_fee(&self) -> Result<Option<U256>, AppError> {
        self.retry_call(|p| async move {
            let block = p.get_block(BlockNumber::Latest).await?;
            Ok::<_, ProviderError>(block.and_then(|b| b.base_fee_per_gas))
        })
        .await
    }

    async fn estimate_eip1559_fees(&self) -> Result<(U256, U256), AppError> {
        self.retry_call(|p| async move { p.estimate_eip1559_fees(None).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EthereumConfig;

    fn adapter(base_delay: Duration) -> RetryAdapter {
        let config = EthereumConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 1,
            api_keys: String::new(),
            max_retries: 3,
            base_delay_secs: 1,
        };
        let provider = Arc::new(EthereumProvider::new(&config).unwrap());
        RetryAdapter::new(provider, config.max_retries, base_delay)
    }

    #[test]
    fn backoff_grows_exponentially_with_bounded_jitter() {
        let retry = adapter(Duration::from_millis(100));
        for (attempt, base) in [(1usize, 100u64), (2, 200), (3, 400)] {
            let delay = retry.backoff(attempt).as_millis() as u64;
            assert!(delay >= base, "attempt {} delay {}", attempt, delay);
            assert!(delay <= base + base / 10 + 1, "attempt {} delay {}", attempt, delay);
        }
    }
}
