pub mod config;

pub use self::config::{
    Config, CurrencyConfig, EthereumConfig, PollingConfig, SpeedUpConfig, TransactionConfig,
};
