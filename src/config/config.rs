use crate::errors::error::AppError;
use bigdecimal::BigDecimal;
use ::config::{Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ethereum: EthereumConfig,
    pub polling: PollingConfig,
    pub speed_up: SpeedUpConfig,
    pub currency: CurrencyConfig,
    pub transaction: TransactionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EthereumConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// 逗号分隔，每个 key 对应一个 Provider，轮询使用
    pub api_keys: String,
    pub max_retries: usize,
    pub base_delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

/// 加速参数（倍率使用字符串形式的十进制，避免浮点）
#[derive(Debug, Deserialize, Clone)]
pub struct SpeedUpConfig {
    pub rate: BigDecimal,
    pub native_decimals: i64,
    pub fiat_decimals: i64,
}

impl Default for SpeedUpConfig {
    fn default() -> Self {
        Self {
            rate: BigDecimal::new(11i64.into(), 1),
            native_decimals: 5,
            fiat_decimals: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    pub current_currency: String,
    pub native_currency: String,
    pub conversion_rate: Option<BigDecimal>,
}

/// 待加速交易（gwei）
#[derive(Debug, Deserialize, Clone)]
pub struct TransactionConfig {
    pub from: String,
    pub gas_limit: u64,
    pub max_fee_per_gas: BigDecimal,
    pub max_priority_fee_per_gas: BigDecimal,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config")
    }

    /// 加载顺序：{dir}/default → {dir}/{APP_ENVIRONMENT}（可选）→ APP__SECTION__KEY 环境变量
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config: Config = ::config::Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()))
            .add_source(File::with_name(&dir.join(&environment).to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.speed_up.validate()?;

        if self.polling.interval_ms == 0 {
            return Err(AppError::InvalidConfig(
                "polling.interval_ms 必须大于 0".to_string(),
            ));
        }
        if self.ethereum.max_retries == 0 {
            return Err(AppError::InvalidConfig(
                "ethereum.max_retries 必须大于 0".to_string(),
            ));
        }
        if let Some(rate) = &self.currency.conversion_rate {
            if *rate < BigDecimal::from(0) {
                return Err(AppError::InvalidConfig(format!(
                    "currency.conversion_rate 不能为负数: {}",
                    rate
                )));
            }
        }
        let zero = BigDecimal::from(0);
        if self.transaction.max_fee_per_gas < zero || self.transaction.max_priority_fee_per_gas < zero
        {
            return Err(AppError::InvalidConfig(
                "transaction 费用不能为负数".to_string(),
            ));
        }
        Ok(())
    }
}

impl SpeedUpConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.rate < BigDecimal::from(1) {
            return Err(AppError::InvalidConfig(format!(
                "speed_up.rate 不能小于 1: {}",
                self.rate
            )));
        }
        if !(0..=18).contains(&self.native_decimals) || !(0..=8).contains(&self.fiat_decimals) {
            return Err(AppError::InvalidConfig(format!(
                "展示精度超出范围: native={}, fiat={}",
                self.native_decimals, self.fiat_decimals
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::str::FromStr;

    const DEFAULT_TOML: &str = r#"
[ethereum]
rpc_url = "http://localhost:8545/"
api_keys = "a,b"
chain_id = 1
max_retries = 3
base_delay_secs = 1

[polling]
interval_ms = 5000

[speed_up]
rate = "1.1"
native_decimals = 5
fiat_decimals = 2

[currency]
current_currency = "usd"
native_currency = "ETH"
conversion_rate = "3000.5"

[transaction]
from = "0x00000000000000000000000000000000000000aa"
gas_limit = 21000
max_fee_per_gas = "100"
max_priority_fee_per_gas = "2"
"#;

    #[test]
    fn loads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), DEFAULT_TOML).unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.speed_up.rate, BigDecimal::from_str("1.1").unwrap());
        assert_eq!(
            config.currency.conversion_rate,
            Some(BigDecimal::from_str("3000.5").unwrap())
        );
        assert_eq!(config.transaction.gas_limit, 21000);
        assert_eq!(config.polling.interval_ms, 5000);
    }

    #[test]
    fn rejects_rate_below_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            DEFAULT_TOML.replace("rate = \"1.1\"", "rate = \"0.9\""),
        )
        .unwrap();

        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn default_speed_up_rate_is_ten_percent() {
        let speed_up = SpeedUpConfig::default();
        assert_eq!(speed_up.rate, BigDecimal::from_str("1.1").unwrap());
        assert!(speed_up.validate().is_ok());
    }
}
