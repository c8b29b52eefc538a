//! Conversion between human-readable decimal strings and fixed-point base units.
//!
//! Both directions work on the decimal digit string rather than on `10^precision`,
//! so precisions beyond what a `U256` can hold as a scale factor never overflow
//! the scale itself.

use crate::error::CoreError;
use alloy_primitives::U256;

/// Largest precision accepted by the conversion layer.
pub const MAX_PRECISION: u32 = 255;

fn check_precision(precision: u32) -> Result<(), CoreError> {
    if precision > MAX_PRECISION {
        return Err(CoreError::Conversion(precision));
    }
    Ok(())
}

/// Converts a user-typed decimal string (e.g. `"1.5"`) into base units.
///
/// Fractional digits beyond `precision` are truncated, never rounded up, so the
/// result can never overstate what the user typed. Negative, empty, non-numeric
/// or unrepresentable input yields `U256::ZERO` instead of an error: the primary
/// caller builds intents from partial keyboard input and validates separately.
///
/// # Errors
///
/// `CoreError::Conversion` if `precision` is outside `[0, 255]`.
pub fn to_base_units(decimal: &str, precision: u32) -> Result<U256, CoreError> {
    check_precision(precision)?;

    let input = decimal.trim();
    let (int_part, frac_part) = match input.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (input, ""),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part) {
        return Ok(U256::ZERO);
    }

    let precision = precision as usize;
    let mut digits = String::with_capacity(int_part.len() + precision);
    digits.push_str(int_part);
    if frac_part.len() >= precision {
        digits.push_str(&frac_part[..precision]);
    } else {
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat_n('0', precision - frac_part.len()));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    Ok(U256::from_str_radix(significant, 10).unwrap_or(U256::ZERO))
}

/// Formats a base-unit amount as a decimal string with at most `display_digits`
/// fractional digits.
///
/// Extra digits are truncated and trailing zeros are dropped, so `1500000` at
/// precision 6 renders as `"1.5"` and zero renders as `"0"`.
///
/// # Errors
///
/// `CoreError::Conversion` if `precision` is outside `[0, 255]`.
pub fn to_decimal_string(amount: U256, precision: u32, display_digits: u32) -> Result<String, CoreError> {
    check_precision(precision)?;

    let raw = amount.to_string();
    let precision = precision as usize;
    if precision == 0 {
        return Ok(raw);
    }

    let padded = if raw.len() <= precision {
        let mut s = "0".repeat(precision + 1 - raw.len());
        s.push_str(&raw);
        s
    } else {
        raw
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - precision);
    let shown = &frac_part[..frac_part.len().min(display_digits as usize)];
    let shown = shown.trim_end_matches('0');

    if shown.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{int_part}.{shown}"))
    }
}

/// Denominator for basis-point arithmetic.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Scales `amount` up by `bps` basis points, rounding up. Saturates at `U256::MAX`.
pub fn add_bps(amount: U256, bps: u32) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    match amount.checked_mul(U256::from(BPS_DENOMINATOR + bps)) {
        Some(numerator) => {
            let quotient = numerator / denominator;
            if (numerator % denominator).is_zero() { quotient } else { quotient + U256::from(1u8) }
        }
        None => amount.saturating_add(amount / denominator * U256::from(bps)),
    }
}

/// Scales `amount` down by `bps` basis points, rounding down.
pub fn sub_bps(amount: U256, bps: u32) -> U256 {
    let bps = bps.min(BPS_DENOMINATOR);
    let denominator = U256::from(BPS_DENOMINATOR);
    match amount.checked_mul(U256::from(BPS_DENOMINATOR - bps)) {
        Some(numerator) => numerator / denominator,
        None => amount.saturating_sub((amount / denominator + U256::from(1u8)) * U256::from(bps)),
    }
}
