//! Conversions between display amounts, base units and JSON-RPC quantities.

use alloy_primitives::{Address, ChainId, U256, utils::parse_ether};

/// Number of decimals of one ether.
pub const ETHER_DECIMALS: usize = 18;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount `{0}`")]
    Invalid(String),
    #[error("amount `{0}` has more than 18 decimal places")]
    TooPrecise(String),
    #[error("invalid chain id `{0}`")]
    InvalidChainId(String),
}

/// Parses a decimal ether amount such as `"1.5"` into wei.
///
/// Amounts carrying more fractional digits than wei can represent are rejected
/// instead of being rounded.
pub fn parse_amount(amount: &str) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }
    if amount.starts_with('-') || amount.starts_with('+') {
        return Err(UnitsError::Invalid(amount.to_string()));
    }

    let (int, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !digits(int) || !digits(frac) {
        return Err(UnitsError::Invalid(amount.to_string()));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(amount.to_string()));
    }

    let normalized = format!("{}.{}", if int.is_empty() { "0" } else { int }, frac);
    let normalized = normalized.trim_end_matches('.');
    parse_ether(normalized).map_err(|_| UnitsError::Invalid(amount.to_string()))
}

/// Encodes a value as a JSON-RPC quantity: `0x` followed by hex digits without leading zeros.
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parses a chain id reported either as a hex quantity (`"0x1"`) or as a decimal string.
pub fn parse_chain_id(value: &str) -> Result<ChainId, UnitsError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => ChainId::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| UnitsError::InvalidChainId(value.to_string()))
}

/// Shortens an address for display, e.g. `0xf39F...2266`.
pub fn format_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
