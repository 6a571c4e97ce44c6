use bigdecimal::{BigDecimal, RoundingMode};
use num_format::{Locale, ToFormattedString};

pub const DEFAULT_TICKER: &str = "ETH";

/// 网络 ticker 缺失时回退为 ETH
pub fn ticker_or_default(ticker: Option<&str>) -> String {
    match ticker {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => DEFAULT_TICKER.to_string(),
    }
}

/// 四舍五入到 decimals 位并去掉末尾的 0，例如 0.000300 -> "0.0003"
pub fn render_amount(value: &BigDecimal, decimals: i64) -> String {
    let plain = plain_string(&value.with_scale_round(decimals, RoundingMode::HalfUp));
    if plain.contains('.') {
        plain
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        plain
    }
}

/// 法币展示：固定小数位 + 千分位，常见币种加符号前缀，其余使用大写代码后缀
pub fn render_fiat(value: &BigDecimal, decimals: i64, currency: &str) -> String {
    let plain = plain_string(&value.with_scale_round(decimals, RoundingMode::HalfUp));
    let (negative, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    // 超出 u128 的整数部分不做分组
    let grouped = int_part
        .parse::<u128>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    let mut amount = String::new();
    if negative {
        amount.push('-');
    }
    amount.push_str(&grouped);
    if let Some(f) = frac_part {
        amount.push('.');
        amount.push_str(f);
    }

    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}", symbol, amount),
        None => format!("{} {}", amount, currency.to_uppercase()),
    }
}

pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_lowercase().as_str() {
        "usd" => Some("$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "jpy" | "cny" => Some("¥"),
        "krw" => Some("₩"),
        "inr" => Some("₹"),
        _ => None,
    }
}

/// 毫秒转可读等待时间
pub fn human_readable_time(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    if secs < 60 {
        format!("{} sec", secs)
    } else {
        format!("{} min", secs.div_ceil(60))
    }
}

// 不依赖 Display 的科学计数法规则，按 digits + scale 手动拼出普通小数
fn plain_string(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let raw = digits.to_string();
    let (negative, mut abs) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, raw),
    };

    let body = if scale <= 0 {
        abs.push_str(&"0".repeat(scale.unsigned_abs() as usize));
        abs
    } else {
        let scale = scale as usize;
        if abs.len() <= scale {
            abs = format!("{}{}", "0".repeat(scale - abs.len() + 1), abs);
        }
        let split = abs.len() - scale;
        format!("{}.{}", &abs[..split], &abs[split..])
    };

    if negative { format!("-{}", body) } else { body }
}
