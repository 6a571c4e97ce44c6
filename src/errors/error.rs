use bigdecimal::BigDecimal;
use ::config::ConfigError;
use ethers_providers::ProviderError;
use serde::Serialize;
use thiserror::Error;

use crate::models::domain::gas::{GasEstimateType, GasTier};

#[derive(Error, Debug)]
pub enum AppError {
    // 配置文件读取 / 反序列化失败
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 配置值不合法（例如加速倍率 < 1）
    #[error("无效的配置: {0}")]
    InvalidConfig(String),

    /// 数值契约被破坏（负数 / 非数字的费用输入），属于致命错误，中止本次重算
    #[error("费用数值契约错误: {0}")]
    ContractViolation(String),

    #[error("无效的数字: {0}")]
    InvalidNumber(String),

    /// 无法识别的会话命令或档位
    #[error("无效的命令: {0}")]
    InvalidCommand(String),

    #[error("无效的provider: {0}")]
    ProviderError(String),

    #[error("无效的地址: {0}")]
    InvalidAddress(String),

    /// 内部不可预期错误（兜底）
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    pub fn contract(message: impl Into<String>) -> Self {
        AppError::ContractViolation(message.into())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::ProviderError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// 非致命的跳过原因：本次输入不触发重算，保留上一次的 FeeDataResult
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecalcSkip {
    #[error("输入数据尚未就绪: {0}")]
    InputUnavailable(&'static str),

    #[error("费用快照格式错误: {0}")]
    MalformedSnapshot(String),

    #[error("不支持的估算类型: {0}")]
    UnsupportedEstimateType(GasEstimateType),

    #[error("轮询已停用，忽略被动更新")]
    PollingDisabled,

    #[error("档位 {0} 在本次加速中不可选")]
    TierExcluded(GasTier),

    #[error("轮询订阅已失效: {0}")]
    InactiveSubscription(String),
}

/// 余额不足：附加在 FeeDataResult.error 上，由调用方决定是否阻止保存
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("You need {amount} more {ticker} to complete this transaction.")]
pub struct InsufficientFunds {
    /// 精确差额（wei）
    pub shortfall_wei: BigDecimal,
    /// 按展示精度渲染后的差额（ether）
    pub amount: String,
    pub ticker: String,
}
