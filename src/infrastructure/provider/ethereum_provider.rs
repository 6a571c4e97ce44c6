use crate::config::EthereumConfig;
use crate::errors::error::AppError;
use crate::log_info;
use async_trait::async_trait;
use ethers_core::types::{Address, BlockNumber, U256};
use ethers_providers::{Http, Middleware, Provider};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// 费用估算所需的链上读取能力（只读，不含签名 / 广播）
#[async_trait]
pub trait ProviderTrait: Send + Sync {
    async fn get_chain_id(&self) -> Result<U256, AppError>;
    async fn get_balance(&self, address: Address) -> Result<U256, AppError>;
    /// 最新区块的 base fee；非 EIP-1559 链返回 None
    async fn get_latest_base_fee(&self) -> Result<Option<U256>, AppError>;
    /// 返回 (max_fee_per_gas, max_priority_fee_per_gas)，单位 wei
    async fn estimate_eip1559_fees(&self) -> Result<(U256, U256), AppError>;
}

pub struct EthereumProvider {
    providers: Vec<Arc<Provider<Http>>>,
    index: AtomicUsize,
}

impl EthereumProvider {
    /// 每个 api key 生成一个 Provider；未配置 key 时直接使用 rpc_url
    pub fn new(config: &EthereumConfig) -> Result<Self, AppError> {
        let keys: Vec<&str> = config
            .api_keys
            .split(',')
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();

        let providers = if keys.is_empty() {
            vec![Arc::new(build_provider(&config.rpc_url)?)]
        } else {
            keys.iter()
                .map(|key| {
                    let url = if config.rpc_url.ends_with('/') {
                        format!("{}{}", config.rpc_url, key)
                    } else {
                        format!("{}/{}", config.rpc_url, key)
                    };
                    build_provider(&url).map(Arc::new)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        log_info!("成功初始化 {} 个RPC Provider", providers.len());

        Ok(Self {
            providers,
            index: AtomicUsize::new(0),
        })
    }

    pub fn get_provider(&self) -> Arc<Provider<Http>> {
        let i = self.index.fetch_add(1, Ordering::Relaxed);
        self.providers[i % self.providers.len()].clone()
    }
}

fn build_provider(raw: &str) -> Result<Provider<Http>, AppError> {
    let url = Url::parse(raw).map_err(|e| AppError::InvalidConfig(format!("无效的RPC URL {}: {}", raw, e)))?;
    Ok(Provider::new(Http::new(url)))
}

pub(crate) async fn latest_base_fee(provider: &Provider<Http>) -> Result<Option<U256>, AppError> {
    let block = provider.get_block(BlockNumber::Latest).await?;
    Ok(block.and_then(|b| b.base_fee_per_gas))
}

#[async_trait]
impl ProviderTrait for EthereumProvider {
    async fn get_chain_id(&self) -> Result<U256, AppError> {
        self.get_provider()
            .get_chainid()
            .await
            .map_err(AppError::from)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, AppError> {
        self.get_provider()
            .get_balance(address, None)
            .await
            .map_err(AppError::from)
    }

    async fn get_latest_base_fee(&self) -> Result<Option<U256>, AppError> {
        latest_base_fee(&self.get_provider()).await
    }

    async fn estimate_eip1559_fees(&self) -> Result<(U256, U256), AppError> {
        self.get_provider()
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| AppError::ProviderError(format!("EIP1559 费用估算失败: {}", e)))
    }
}
