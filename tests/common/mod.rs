#![allow(dead_code)]

use bigdecimal::BigDecimal;
use ethers_core::types::{Address, U256};
use speedup_fee::config::SpeedUpConfig;
use speedup_fee::infrastructure::feed::{GasFeeFeed, PollToken};
use speedup_fee::infrastructure::sources::{AccountBook, StaticCurrencyRates};
use speedup_fee::models::{ExistingTransaction, FeePair, GasFeeState};
use speedup_fee::services::speedup::RecalcEngine;
use speedup_fee::utils::ether_to_wei;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn sender() -> Address {
    Address::repeat_byte(0xab)
}

/// 以 ether 表示的余额 → U256 wei
pub fn balance(ether: &str) -> U256 {
    let wei = ether_to_wei(&dec(ether));
    U256::from_dec_str(&wei.with_scale(0).to_string()).unwrap()
}

/// gwei 字符串快照，字段与估算源推送的 JSON 一致
pub fn fee_market_state(
    low: (&str, &str),
    medium: (&str, &str),
    high: (&str, &str),
    base_fee: &str,
) -> GasFeeState {
    let tier = |(max_fee, priority): (&str, &str), wait: u64| {
        serde_json::json!({
            "suggestedMaxFeePerGas": max_fee,
            "suggestedMaxPriorityFeePerGas": priority,
            "minWaitTimeEstimate": 15000,
            "maxWaitTimeEstimate": wait,
        })
    };
    serde_json::from_value(serde_json::json!({
        "gasEstimateType": "fee-market",
        "gasFeeEstimates": {
            "low": tier(low, 60000),
            "medium": tier(medium, 30000),
            "high": tier(high, 15000),
            "estimatedBaseFee": base_fee,
        }
    }))
    .unwrap()
}

pub fn engine_with(
    existing: (&str, &str),
    gas_limit: u64,
    balance_ether: Option<&str>,
    rate: Option<&str>,
) -> (RecalcEngine, Arc<AccountBook>) {
    let mut book = AccountBook::new(Some("ETH".to_string()));
    if let Some(ether) = balance_ether {
        book = book.with_balance(sender(), balance(ether));
    }
    let book = Arc::new(book);
    let engine = RecalcEngine::new(
        ExistingTransaction {
            from: sender(),
            gas_limit,
            fees: FeePair::new(dec(existing.0), dec(existing.1)),
        },
        "0x1",
        &SpeedUpConfig::default(),
        book.clone(),
        Arc::new(StaticCurrencyRates::new("usd", rate.map(dec))),
    )
    .unwrap();
    (engine, book)
}

/// 测试用估算源：手动推送状态并记录 unsubscribe 调用
pub struct ManualFeed {
    next: AtomicU64,
    sender: watch::Sender<Option<GasFeeState>>,
    pub unsubscribed: Mutex<Vec<PollToken>>,
}

impl ManualFeed {
    pub fn new() -> Arc<Self> {
        let (sender, _) = watch::channel(None);
        Arc::new(Self {
            next: AtomicU64::new(1),
            sender,
            unsubscribed: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, state: GasFeeState) {
        self.sender.send_replace(Some(state));
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribed.lock().unwrap().len()
    }
}

impl GasFeeFeed for ManualFeed {
    fn subscribe(&self) -> PollToken {
        PollToken::new(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn unsubscribe(&self, token: PollToken) {
        self.unsubscribed.lock().unwrap().push(token);
    }

    fn updates(&self) -> watch::Receiver<Option<GasFeeState>> {
        self.sender.subscribe()
    }
}
