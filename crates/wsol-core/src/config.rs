//! Run parameters and amount parsing.

use std::time::Duration;

use chain_sol::LAMPORTS_PER_SOL;

use crate::error::ConfigError;

pub const DEFAULT_EXPLORER_URL: &str = "https://solscan.io/tx/";

/// Decimal places of SOL.
const SOL_DECIMALS: usize = 9;

/// Static priority-fee parameters prepended to a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeBudget {
    pub unit_price_micro_lamports: u64,
    pub unit_limit: u32,
}

impl Default for ComputeBudget {
    fn default() -> Self {
        Self {
            unit_price_micro_lamports: 1_000_000,
            unit_limit: 200_000,
        }
    }
}

/// How the submitter waits for confirmation and reports the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitConfig {
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
    /// Prefix for the transaction link printed on success.
    pub explorer_url: String,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(90),
            poll_interval: Duration::from_millis(500),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl SubmitConfig {
    pub fn explorer_link(&self, signature: &str) -> String {
        format!("{}{}", self.explorer_url, signature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapConfig {
    pub lamports: u64,
    pub budget: ComputeBudget,
    pub submit: SubmitConfig,
}

/// Convert a decimal SOL amount such as `"0.5"` to lamports.
///
/// No binary floating point is involved. Digits past the ninth decimal place
/// are truncated, so `"0.0000000019"` is 1 lamport. Signs and exponents are
/// rejected. Zero is accepted: the wrap still creates and syncs the account.
pub fn parse_sol_amount(input: &str) -> Result<u64, ConfigError> {
    let invalid = |reason| ConfigError::InvalidAmount(input.to_string(), reason);
    let trimmed = input.trim();

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty amount"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid("not a decimal number"));
    }
    let fraction = &fraction[..fraction.len().min(SOL_DECIMALS)];

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount too large"))?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<width$}", width = SOL_DECIMALS)
            .parse()
            .map_err(|_| invalid("not a decimal number"))?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(fraction))
        .ok_or_else(|| invalid("amount too large"))
}
