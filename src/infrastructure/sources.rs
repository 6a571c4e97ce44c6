use crate::config::CurrencyConfig;
use bigdecimal::BigDecimal;
use ethers_core::types::{Address, U256};
use std::collections::HashMap;
use std::sync::RwLock;

/// 账户余额源（只读，按需拉取）
pub trait AccountSource: Send + Sync {
    /// 余额单位 wei；未知账户返回 None
    fn balance_of(&self, address: &Address) -> Option<U256>;
    fn ticker(&self) -> Option<String>;
}

/// 汇率源（只读，按需拉取）
pub trait CurrencyRateSource: Send + Sync {
    /// 1 个原生币兑换的法币数量；尚未获取时返回 None
    fn conversion_rate(&self) -> Option<BigDecimal>;
    fn current_currency(&self) -> String;
}

/// 内存账户表，由外部定期刷新
pub struct AccountBook {
    balances: RwLock<HashMap<Address, U256>>,
    ticker: Option<String>,
}

impl AccountBook {
    pub fn new(ticker: Option<String>) -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            ticker,
        }
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.set_balance(address, balance);
        self
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        if let Ok(mut balances) = self.balances.write() {
            balances.insert(address, balance);
        }
    }
}

impl AccountSource for AccountBook {
    fn balance_of(&self, address: &Address) -> Option<U256> {
        self.balances.read().ok()?.get(address).copied()
    }

    fn ticker(&self) -> Option<String> {
        self.ticker.clone()
    }
}

#[derive(Debug, Clone)]
pub struct StaticCurrencyRates {
    current_currency: String,
    conversion_rate: Option<BigDecimal>,
}

impl StaticCurrencyRates {
    pub fn new(
        current_currency: impl Into<String>,
        conversion_rate: Option<BigDecimal>,
    ) -> Self {
        Self {
            current_currency: current_currency.into(),
            conversion_rate,
        }
    }
}

impl From<&CurrencyConfig> for StaticCurrencyRates {
    fn from(config: &CurrencyConfig) -> Self {
        Self::new(config.current_currency.clone(), config.conversion_rate.clone())
    }
}

impl CurrencyRateSource for StaticCurrencyRates {
    fn conversion_rate(&self) -> Option<BigDecimal> {
        self.conversion_rate.clone()
    }

    fn current_currency(&self) -> String {
        self.current_currency.clone()
    }
}
