//! Token amount conversion and formatting.
//!
//! Amounts travel as integer strings of the smallest unit (motes for CSPR)
//! and may exceed 64 bits, so all arithmetic goes through `BigUint`.

use num_bigint::BigUint;
use serde_json::Value;

// ============================================================================
// Constants
// ============================================================================

/// Decimals of the native token.
pub const CSPR_DECIMALS: u32 = 9;

/// Symbol of the native token.
pub const CSPR_SYMBOL: &str = "CSPR";

/// Fraction digits kept by [`formatted_amount`].
const MAX_DISPLAY_FRACTION_DIGITS: usize = 5;

/// Fraction digits of fiat amounts.
const FIAT_FRACTION_DIGITS: u32 = 2;

// ============================================================================
// Helpers
// ============================================================================

fn parse_integer(amount: &str) -> Option<BigUint> {
    let amount = amount.trim();
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    amount.parse().ok()
}

/// Splits `value / 10^decimals` into integer and zero-padded fraction digits.
fn split_decimal(value: &BigUint, decimals: u32) -> (String, String) {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return (digits, String::new());
    }
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    (integer.to_string(), fraction.to_string())
}

/// Inserts a thousands separator every three digits.
#[must_use]
pub fn format_with_commas(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Parses a non-negative decimal rate into (scaled integer, scale).
fn parse_rate(rate: &str) -> Option<(BigUint, u32)> {
    let rate = rate.trim();
    let (integer, fraction) = rate.split_once('.').unwrap_or((rate, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || !all_digits(fraction) {
        return None;
    }
    let scaled: BigUint = format!("{integer}{fraction}").parse().ok()?;
    Some((scaled, u32::try_from(fraction.len()).ok()?))
}

// ============================================================================
// Public API
// ============================================================================

/// `amount / 10^decimals` as a plain decimal string without trailing zeros.
///
/// Unparseable amounts yield `"0"`.
#[must_use]
pub fn decimal_amount(amount: &str, decimals: u32) -> String {
    let Some(value) = parse_integer(amount) else {
        return "0".to_string();
    };
    let (integer, fraction) = split_decimal(&value, decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Display form: thousands separators, at most five fraction digits
/// (truncated), trailing zeros trimmed.
///
/// Non-numeric placeholders such as `"N/A"` pass through unchanged.
#[must_use]
pub fn formatted_amount(amount: &str, decimals: u32) -> String {
    let Some(value) = parse_integer(amount) else {
        return amount.to_string();
    };
    let (integer, fraction) = split_decimal(&value, decimals);
    let fraction: String = fraction.chars().take(MAX_DISPLAY_FRACTION_DIGITS).collect();
    let fraction = fraction.trim_end_matches('0');
    let integer = format_with_commas(&integer);
    if fraction.is_empty() {
        integer
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Display form with the fraction dropped entirely.
#[must_use]
pub fn formatted_whole_amount(amount: &str, decimals: u32) -> String {
    let Some(value) = parse_integer(amount) else {
        return amount.to_string();
    };
    format_with_commas(&split_decimal(&value, decimals).0)
}

/// Text of an amount or price that the API sends either as a JSON string or
/// as a number. Floats are written out positionally, never in exponent form.
#[must_use]
pub fn number_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) if number.is_f64() => number.as_f64().map(|f| format!("{f}")),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// True for `"0"`, `"0.000"` and other spellings of zero.
#[must_use]
pub fn is_zero_text(text: &str) -> bool {
    text.trim().trim_matches(|c| c == '0' || c == '.').is_empty()
}

/// Fiat value of a native-token amount at `rate`, rounded half-up to cents.
///
/// Returns an empty string when the rate is zero, empty or unparseable, or
/// when the amount is not a number, so no misleading `"0.00"` is shown.
#[must_use]
pub fn fiat_amount(amount: &str, rate: &str) -> String {
    fiat_cents(amount, CSPR_DECIMALS, rate)
        .map(|cents| {
            let (integer, fraction) = split_decimal(&cents, FIAT_FRACTION_DIGITS);
            format!("{}.{fraction}", format_with_commas(&integer))
        })
        .unwrap_or_default()
}

/// Fiat value of a token amount with `decimals` at `price`, without
/// thousands separators.
///
/// Yields `"0"` when there is no usable price.
#[must_use]
pub fn token_fiat_amount(amount: &str, decimals: u32, price: &str) -> String {
    fiat_cents(amount, decimals, price).map_or_else(
        || "0".to_string(),
        |cents| {
            let (integer, fraction) = split_decimal(&cents, FIAT_FRACTION_DIGITS);
            format!("{integer}.{fraction}")
        },
    )
}

/// Sum of integer amounts; unparseable entries count as zero.
#[must_use]
pub fn sum_amounts<'a>(amounts: impl IntoIterator<Item = &'a str>) -> String {
    amounts
        .into_iter()
        .filter_map(parse_integer)
        .fold(BigUint::default(), |total, amount| total + amount)
        .to_string()
}

fn fiat_cents(amount: &str, decimals: u32, rate: &str) -> Option<BigUint> {
    let (rate, rate_scale) = parse_rate(rate)?;
    if rate.bits() == 0 {
        return None;
    }
    let value = parse_integer(amount)?;

    let product = value * rate;
    let scale = decimals + rate_scale;
    Some(if scale >= FIAT_FRACTION_DIGITS {
        let divisor = BigUint::from(10u32).pow(scale - FIAT_FRACTION_DIGITS);
        (product * 2u32 + &divisor) / (divisor * 2u32)
    } else {
        product * BigUint::from(10u32).pow(FIAT_FRACTION_DIGITS - scale)
    })
}

// ============================================================================
// Tests
// ============================================================================
