use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use ethers_core::types::Address;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::errors::error::AppError;
use crate::infrastructure::feed::GasFeeFeed;
use crate::infrastructure::provider::ethereum_provider::EthereumProvider;
use crate::infrastructure::provider::{ProviderTrait, RetryAdapter};
use crate::infrastructure::sources::{AccountBook, StaticCurrencyRates};
use crate::models::domain::gas::{ExistingTransaction, FeePair, GasFeeInput, GasTier};
use crate::services::gas::{FeeEstimateService, RpcGasFeeFeed};
use crate::services::speedup::{
    LoggingObserver, RecalcEngine, SessionCommand, SessionExit, SpeedUpSession, run_session,
};
use crate::utils::parse_decimal;
use crate::{log_error, log_info, log_warn};

pub type Result<T> = std::result::Result<T, AppError>;

/// 应用程序启动与管理结构体：一个加速会话 + 共享的估算轮询
pub struct Application {
    provider: Arc<dyn ProviderTrait>,
    accounts: Arc<AccountBook>,
    from: Address,
    refresh_interval: Duration,
    session: SpeedUpSession,
}

impl Application {
    /// 构建应用实例（初始化 Provider、估算源、余额与会话，不启动轮询循环）
    pub async fn build(config: Config) -> Result<Self> {
        // 1. 先初始化 Provider
        let eth_provider = Arc::new(EthereumProvider::new(&config.ethereum)?);
        let provider = Arc::new(RetryAdapter::new(
            eth_provider,
            config.ethereum.max_retries,
            Duration::from_secs(config.ethereum.base_delay_secs),
        )) as Arc<dyn ProviderTrait>;

        // 2. 链 ID 以节点返回为准
        let chain_id = provider.get_chain_id().await?;
        if chain_id.as_u64() != config.ethereum.chain_id {
            log_warn!(
                "配置的 chain_id={} 与节点返回的 {} 不一致，以节点为准",
                config.ethereum.chain_id,
                chain_id
            );
        }

        // 3. 待加速交易与账户余额
        let from = Address::from_str(&config.transaction.from)
            .map_err(|e| AppError::InvalidAddress(format!("{}: {}", config.transaction.from, e)))?;
        let transaction = ExistingTransaction {
            from,
            gas_limit: config.transaction.gas_limit,
            fees: FeePair::new(
                config.transaction.max_fee_per_gas.clone(),
                config.transaction.max_priority_fee_per_gas.clone(),
            ),
        };
        let balance = provider.get_balance(from).await?;
        let accounts = Arc::new(
            AccountBook::new(Some(config.currency.native_currency.clone())).with_balance(from, balance),
        );
        let rates = Arc::new(StaticCurrencyRates::from(&config.currency));
        log_info!("账户 {:?} 余额: {} wei", from, balance);

        // 4. 估算源与会话
        let refresh_interval = Duration::from_millis(config.polling.interval_ms);
        let feed = Arc::new(RpcGasFeeFeed::new(
            provider.clone(),
            FeeEstimateService::default(),
            refresh_interval,
        )) as Arc<dyn GasFeeFeed>;

        let engine = RecalcEngine::new(
            transaction,
            chain_id.to_string(),
            &config.speed_up,
            accounts.clone(),
            rates,
        )?;
        let session = SpeedUpSession::start(engine, feed, Box::new(LoggingObserver));

        Ok(Self {
            provider,
            accounts,
            from,
            refresh_interval,
            session,
        })
    }

    /// 运行会话，直到 save / cancel / Ctrl+C
    pub async fn run(self) -> anyhow::Result<SessionExit> {
        let (tx, rx) = mpsc::channel(16);

        let refresher = tokio::spawn(refresh_balance(
            self.provider.clone(),
            self.accounts.clone(),
            self.from,
            self.refresh_interval,
        ));

        let ctrl_c = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log_info!("⚠️  Received shutdown signal, cancelling speed-up...");
                let _ = ctrl_c.send(SessionCommand::Cancel).await;
            }
        });

        tokio::spawn(read_commands(tx));
        log_info!("✔️ 加速会话已启动，输入 help 查看命令");

        let exit = run_session(self.session, rx).await;
        refresher.abort();
        Ok(exit?)
    }
}

async fn refresh_balance(
    provider: Arc<dyn ProviderTrait>,
    accounts: Arc<AccountBook>,
    from: Address,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    // 首次 tick 立即返回，余额已在 build 时读取
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match provider.get_balance(from).await {
            Ok(balance) => accounts.set_balance(from, balance),
            Err(e) => log_warn!("刷新余额失败: {}", e),
        }
    }
}

async fn read_commands(tx: mpsc::Sender<SessionCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // stdin 关闭时不结束会话，等待 Ctrl+C
            Ok(None) => return,
            Err(e) => {
                log_error!("读取命令失败: {}", e);
                return;
            }
        };
        match parse_command(&line) {
            Ok(Some(command)) => {
                if tx.send(command).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => log_warn!("{}", e),
        }
    }
}

/// 解析一行命令：
/// `tier <low|medium|high>` / `custom <maxFee> <priorityFee> [gasLimit]` / `gas <limit>` / `save` / `cancel`
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let command = match parts.as_slice() {
        [] => return Ok(None),
        ["help"] => {
            log_info!(
                "命令: tier <low|medium|high> | custom <maxFee> <priorityFee> [gasLimit] | gas <limit> | save | cancel"
            );
            return Ok(None);
        }
        ["save"] => SessionCommand::Save,
        ["cancel"] => SessionCommand::Cancel,
        ["tier", tier] => SessionCommand::Change {
            input: GasFeeInput::from(FeePair::new(BigDecimal::from(0), BigDecimal::from(0))),
            selected: Some(parse_tier(tier)?),
        },
        ["custom", max_fee, priority, rest @ ..] => {
            let gas_limit = match rest {
                [] => None,
                [gas] => Some(parse_gas(gas)?),
                _ => return Err(AppError::InvalidCommand(format!("custom 参数过多: {}", line))),
            };
            SessionCommand::Change {
                input: GasFeeInput {
                    fees: FeePair::new(parse_decimal(max_fee)?, parse_decimal(priority)?),
                    gas_limit,
                },
                selected: None,
            }
        }
        ["gas", gas] => SessionCommand::SetGasLimit(parse_gas(gas)?),
        _ => return Err(AppError::InvalidCommand(format!("未知命令: {}", line))),
    };
    Ok(Some(command))
}

fn parse_tier(raw: &str) -> Result<GasTier> {
    GasTier::ALL
        .into_iter()
        .find(|tier| tier.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| AppError::InvalidCommand(format!("未知档位: {}", raw)))
}

fn parse_gas(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|e| AppError::InvalidNumber(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(parse_command("save").unwrap(), Some(SessionCommand::Save));
        assert_eq!(parse_command("gas 30000").unwrap(), Some(SessionCommand::SetGasLimit(30000)));

        match parse_command("tier HIGH").unwrap() {
            Some(SessionCommand::Change { selected, .. }) => assert_eq!(selected, Some(GasTier::High)),
            other => panic!("unexpected command: {:?}", other),
        }

        match parse_command("custom 130 4.5 25000").unwrap() {
            Some(SessionCommand::Change { input, selected }) => {
                assert_eq!(selected, None);
                assert_eq!(input.fees.max_fee_per_gas, BigDecimal::from_str("130").unwrap());
                assert_eq!(input.fees.max_priority_fee_per_gas, BigDecimal::from_str("4.5").unwrap());
                assert_eq!(input.gas_limit, Some(25000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_command("tier turbo").is_err());
        assert!(parse_command("custom abc 1").is_err());
        assert!(parse_command("gas -1").is_err());
        assert!(parse_command("launch").is_err());
    }

    #[test]
    fn unknown_commands_are_not_number_errors() {
        assert!(matches!(parse_command("launch"), Err(AppError::InvalidCommand(_))));
        assert!(matches!(parse_command("tier turbo"), Err(AppError::InvalidCommand(_))));
        assert!(matches!(parse_command("custom 130 4.5 25000 9"), Err(AppError::InvalidCommand(_))));
        assert!(matches!(parse_command("custom abc 1"), Err(AppError::InvalidNumber(_))));
    }
}
