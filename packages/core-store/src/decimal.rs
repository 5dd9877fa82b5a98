//! Exact decimal coercion for monetary and other precision-sensitive values.

use std::num::NonZeroU64;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};

/// Significant digits kept when parsing, matching the IEEE 754 decimal128
/// context.
pub const DECIMAL128_PRECISION: u64 = 34;

/// Parse `input` as an exact decimal, returning `default` on any failure.
///
/// Values with more than [`DECIMAL128_PRECISION`] significant digits are
/// rounded half-even. Empty input, malformed numbers and exponents outside
/// the 32-bit scale range all yield `default`.
pub fn to_decimal(input: Option<&str>, default: BigDecimal) -> BigDecimal {
    match input.map(str::trim) {
        Some(text) if !text.is_empty() => parse_decimal(text).unwrap_or(default),
        _ => default,
    }
}

fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let decimal = BigDecimal::from_str(text).ok()?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    if i32::try_from(scale).is_err() {
        return None;
    }
    match NonZeroU64::new(DECIMAL128_PRECISION) {
        Some(precision) if decimal.digits() > DECIMAL128_PRECISION => {
            Some(decimal.with_precision_round(precision, RoundingMode::HalfEven))
        }
        _ => Some(decimal),
    }
}
