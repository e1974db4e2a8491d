use anyhow::{anyhow, Result};
use serde_json::Value;

/// Duffs per DASH.
pub const COIN: u64 = 100_000_000;

/// Parses a decimal DASH amount ("12.5", "0.00000001") into duffs.
pub fn parse_amount(s: &str) -> Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow!("empty amount"));
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(anyhow!("invalid amount: {}", s));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("invalid amount: {}", s));
    }
    if frac.len() > 8 {
        return Err(anyhow!("amount has more than 8 decimal places: {}", s));
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse()? };
    let frac_duffs: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<8}", frac).parse()?
    };
    whole
        .checked_mul(COIN)
        .and_then(|w| w.checked_add(frac_duffs))
        .ok_or_else(|| anyhow!("amount overflows: {}", s))
}

pub fn format_amount(duffs: u64) -> String {
    format!("{}.{:08}", duffs / COIN, duffs % COIN)
}

/// Reads an amount that the daemon may encode as a JSON number or string.
pub fn amount_from_json(value: &Value) -> Result<u64> {
    match value {
        Value::String(s) => parse_amount(s),
        Value::Number(n) => {
            if let Some(whole) = n.as_u64() {
                return whole.checked_mul(COIN).ok_or_else(|| anyhow!("amount overflows: {}", n));
            }
            let f = n.as_f64().ok_or_else(|| anyhow!("invalid amount: {}", n))?;
            if !f.is_finite() || f < 0.0 {
                return Err(anyhow!("invalid amount: {}", n));
            }
            Ok((f * COIN as f64).round() as u64)
        }
        other => Err(anyhow!("invalid amount: {}", other)),
    }
}
