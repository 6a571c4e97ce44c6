use crate::errors::error::AppError;
use bigdecimal::BigDecimal;
use ethers_core::types::U256;
use std::str::FromStr;

const WEI_PER_GWEI: u64 = 1_000_000_000;
const ETHER_DECIMALS: i64 = 18;
const GWEI_DECIMALS: i64 = 9;

/// 将U256 转 BigDecimal
pub fn u256_to_bigdecimal(value: U256) -> BigDecimal {
    // 先转字符串再转 BigDecimal (最安全，处理大数最稳)
    let s = value.to_string();
    BigDecimal::from_str(&s).unwrap_or_else(|_| BigDecimal::from(0))
}

/// 十进制字符串转 BigDecimal，非数字直接报错
pub fn parse_decimal(value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| AppError::InvalidNumber(format!("{}: {}", value, e)))
}

pub fn gwei_to_wei(gwei: &BigDecimal) -> BigDecimal {
    gwei * BigDecimal::from(WEI_PER_GWEI)
}

pub fn wei_to_gwei(wei: U256) -> BigDecimal {
    shift_left(&u256_to_bigdecimal(wei), GWEI_DECIMALS)
}

pub fn wei_to_ether(wei: &BigDecimal) -> BigDecimal {
    shift_left(wei, ETHER_DECIMALS)
}

pub fn ether_to_wei(ether: &BigDecimal) -> BigDecimal {
    let (digits, scale) = ether.as_bigint_and_exponent();
    BigDecimal::new(digits, scale - ETHER_DECIMALS)
}

// 小数点左移 places 位：只改 scale，不做除法，结果精确
fn shift_left(value: &BigDecimal, places: i64) -> BigDecimal {
    let (digits, scale) = value.as_bigint_and_exponent();
    BigDecimal::new(digits, scale + places)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn unit_conversions_are_exact() {
        assert_eq!(gwei_to_wei(&dec("2.2")), dec("2200000000"));
        assert_eq!(wei_to_ether(&dec("300000000000000")), dec("0.0003"));
        assert_eq!(ether_to_wei(&dec("0.0008")), dec("800000000000000"));
        assert_eq!(wei_to_gwei(U256::from(1_500_000_000u64)), dec("1.5"));
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        assert!(matches!(parse_decimal("abc"), Err(AppError::InvalidNumber(_))));
        assert_eq!(parse_decimal(" 1.10 ").unwrap(), dec("1.1"));
    }
}
