//! Address and amount validation.
//!
//! Pure functions that turn untrusted caller input into canonical chain
//! values. Nothing here performs I/O.
//!
//! # Amount coercion
//!
//! [`resolve_amount`] accepts exactly these shapes:
//!
//! | Input                              | Result                                  |
//! |------------------------------------|-----------------------------------------|
//! | JSON integer, e.g. `5000`          | taken as base units                     |
//! | decimal string, e.g. `"0.1"`       | scaled by `decimals` (`0.1` → `10^17`)  |
//! | base-unit string, e.g. `"5000wei"` | taken as base units                     |
//!
//! Fractional JSON numbers are refused so that `1` and `1.0` can never
//! resolve to values eighteen orders of magnitude apart. Every shape must
//! resolve to a value greater than zero.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde_json::Value;

use crate::error::ValidationReason;

/// Decimal precision used when none is configured.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Suffix marking a string amount as already expressed in base units.
pub const BASE_UNIT_SUFFIX: &str = "wei";

const NOT_POSITIVE: ValidationReason = ValidationReason::InvalidAmount("must be greater than zero");

/// Validates a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase hex digits are accepted as-is. Mixed
/// case is treated as an EIP-55 checksum and must match. Surrounding
/// whitespace is ignored.
///
/// # Errors
///
/// Returns [`ValidationReason::InvalidAddress`] when the input is not a
/// 20-byte hex string or its checksum casing is wrong.
pub fn validate_address(input: &str) -> Result<Address, ValidationReason> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or(ValidationReason::InvalidAddress(
            "expected a 0x-prefixed address",
        ))?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationReason::InvalidAddress(
            "expected 40 hexadecimal digits",
        ));
    }
    let address = Address::from_str(hex)
        .map_err(|_| ValidationReason::InvalidAddress("expected 40 hexadecimal digits"))?;

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *hex {
        return Err(ValidationReason::InvalidAddress("checksum mismatch"));
    }
    Ok(address)
}

/// Resolves an amount-like value into base units.
///
/// See the [module documentation](self) for the accepted shapes.
///
/// # Errors
///
/// Returns [`ValidationReason::InvalidAmount`] for non-positive,
/// non-numeric, over-precise, or overflowing input.
pub fn resolve_amount(value: &Value, decimals: u8) -> Result<U256, ValidationReason> {
    match value {
        Value::Number(n) => {
            if let Some(raw) = n.as_u64() {
                positive(U256::from(raw))
            } else if n.as_i64().is_some() || n.as_f64().is_some_and(|f| f <= 0.0) {
                Err(NOT_POSITIVE)
            } else {
                Err(ValidationReason::InvalidAmount(
                    "fractional or very large amounts must be given as a string",
                ))
            }
        }
        Value::String(s) => parse_amount(s, decimals),
        _ => Err(ValidationReason::InvalidAmount(
            "expected a number or a numeric string",
        )),
    }
}

/// Resolves an unsigned integer such as a proposal id or a vote threshold.
///
/// Accepts JSON integers and strings of decimal digits. Zero is accepted
/// only when `allow_zero` is set.
///
/// # Errors
///
/// Returns [`ValidationReason::InvalidAmount`] for negative, fractional,
/// non-numeric, or disallowed zero input.
pub fn resolve_uint(value: &Value, allow_zero: bool) -> Result<U256, ValidationReason> {
    let resolved = match value {
        Value::Number(n) => {
            if let Some(raw) = n.as_u64() {
                U256::from(raw)
            } else if n.as_i64().is_some() || n.as_f64().is_some_and(|f| f < 0.0) {
                return Err(ValidationReason::InvalidAmount("must not be negative"));
            } else {
                return Err(ValidationReason::InvalidAmount("must be a whole number"));
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Some(rest) = s.strip_prefix('-')
                && is_digits(rest)
            {
                return Err(ValidationReason::InvalidAmount("must not be negative"));
            }
            parse_digits(s)?
        }
        _ => return Err(ValidationReason::InvalidAmount("expected a whole number")),
    };
    if resolved.is_zero() && !allow_zero {
        return Err(NOT_POSITIVE);
    }
    Ok(resolved)
}

/// Resolves a boolean flag. Accepts JSON booleans and the strings
/// `"true"` / `"false"` in any case.
///
/// # Errors
///
/// Returns [`ValidationReason::InvalidBoolean`] for anything else.
pub fn resolve_bool(value: &Value) -> Result<bool, ValidationReason> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ValidationReason::InvalidBoolean),
    }
}

fn parse_amount(input: &str, decimals: u8) -> Result<U256, ValidationReason> {
    let s = input.trim();
    if let Some(base_units) = s.strip_suffix(BASE_UNIT_SUFFIX) {
        return positive(parse_digits(base_units.trim_end())?);
    }

    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (int.is_empty() && frac.is_empty())
        || !int.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ValidationReason::InvalidAmount("not a decimal number"));
    }
    if unsigned.len() != s.len() {
        return Err(NOT_POSITIVE);
    }
    let frac = frac.trim_end_matches('0');
    if frac.len() > usize::from(decimals) {
        return Err(ValidationReason::InvalidAmount(
            "too many decimal places for this token",
        ));
    }

    let int = if int.is_empty() { "0" } else { int };
    let scaled = format!("{int}{frac:0<width$}", width = usize::from(decimals));
    positive(parse_digits(&scaled)?)
}

fn parse_digits(s: &str) -> Result<U256, ValidationReason> {
    if !is_digits(s) {
        return Err(ValidationReason::InvalidAmount("not a whole number"));
    }
    U256::from_str_radix(s, 10).map_err(|_| ValidationReason::InvalidAmount("value is too large"))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn positive(value: U256) -> Result<U256, ValidationReason> {
    if value.is_zero() {
        Err(NOT_POSITIVE)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_address_accepts_all_casings() {
        let expected = validate_address(CHECKSUMMED).unwrap();
        assert_eq!(
            validate_address(&CHECKSUMMED.to_lowercase()).unwrap(),
            expected
        );
        let upper = format!("0x{}", CHECKSUMMED[2..].to_uppercase());
        assert_eq!(validate_address(&upper).unwrap(), expected);
        assert_eq!(
            validate_address(&format!("  {CHECKSUMMED}\n")).unwrap(),
            expected
        );
    }

    #[test]
    fn test_address_canonical_form_is_checksummed() {
        let address = validate_address(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(address.to_checksum(None), CHECKSUMMED);
    }

    #[test]
    fn test_address_validation_is_idempotent() {
        let once = validate_address("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        let twice = validate_address(&once.to_checksum(None)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_address_rejects_bad_checksum() {
        let broken = CHECKSUMMED.replacen('a', "A", 1);
        assert_eq!(
            validate_address(&broken),
            Err(ValidationReason::InvalidAddress("checksum mismatch"))
        );
    }

    #[test]
    fn test_address_rejects_malformed() {
        for input in [
            "",
            "0x",
            "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAe",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00",
            "0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xabc...def",
            "vitalik.eth",
        ] {
            assert!(
                matches!(
                    validate_address(input),
                    Err(ValidationReason::InvalidAddress(_))
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_amount_decimal_string_is_scaled() {
        assert_eq!(
            resolve_amount(&json!("0.1"), 18).unwrap(),
            U256::from(100_000_000_000_000_000_u64)
        );
        assert_eq!(
            resolve_amount(&json!("12"), 6).unwrap(),
            U256::from(12_000_000_u64)
        );
        assert_eq!(
            resolve_amount(&json!("1.5"), 6).unwrap(),
            U256::from(1_500_000_u64)
        );
        assert_eq!(resolve_amount(&json!(".5"), 1).unwrap(), U256::from(5));
    }

    #[test]
    fn test_amount_integer_number_is_base_units() {
        assert_eq!(resolve_amount(&json!(5000), 18).unwrap(), U256::from(5000));
    }

    #[test]
    fn test_amount_wei_suffix_is_base_units() {
        assert_eq!(
            resolve_amount(&json!("100000000000000000wei"), 18).unwrap(),
            U256::from(100_000_000_000_000_000_u64)
        );
        assert_eq!(resolve_amount(&json!("42 wei"), 18).unwrap(), U256::from(42));
    }

    #[test]
    fn test_amount_rejects_non_positive() {
        for value in [
            json!(0),
            json!(-1),
            json!(-0.5),
            json!(0.0),
            json!("0"),
            json!("0.0"),
            json!("-1"),
            json!("-0.1"),
            json!("0wei"),
        ] {
            assert_eq!(
                resolve_amount(&value, 18),
                Err(NOT_POSITIVE),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn test_amount_rejects_malformed() {
        for value in [
            json!("abc"),
            json!(""),
            json!("."),
            json!("1e18"),
            json!("1,000"),
            json!("+1"),
            json!("1.2.3"),
            json!("-1.5wei"),
            json!(1.5),
            json!(true),
            json!(null),
        ] {
            assert!(
                matches!(
                    resolve_amount(&value, 18),
                    Err(ValidationReason::InvalidAmount(_))
                ),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn test_amount_rejects_precision_loss() {
        assert_eq!(
            resolve_amount(&json!("0.1234567"), 6),
            Err(ValidationReason::InvalidAmount(
                "too many decimal places for this token"
            ))
        );
    }

    #[test]
    fn test_amount_trailing_zeros_are_not_precision() {
        assert_eq!(resolve_amount(&json!("1.0"), 0).unwrap(), U256::from(1));
        assert_eq!(resolve_amount(&json!("0.10"), 1).unwrap(), U256::from(1));
        assert_eq!(
            resolve_amount(&json!("2.500000000"), 6).unwrap(),
            U256::from(2_500_000_u64)
        );
        assert_eq!(resolve_amount(&json!(".0"), 0), Err(NOT_POSITIVE));
        assert_eq!(
            resolve_amount(&json!("0.01"), 1),
            Err(ValidationReason::InvalidAmount(
                "too many decimal places for this token"
            ))
        );
    }

    #[test]
    fn test_amount_rejects_overflow() {
        let huge = "9".repeat(70);
        assert_eq!(
            resolve_amount(&json!(huge), 18),
            Err(ValidationReason::InvalidAmount("value is too large"))
        );
    }

    #[test]
    fn test_uint_zero_policy() {
        assert_eq!(resolve_uint(&json!(0), true).unwrap(), U256::ZERO);
        assert_eq!(resolve_uint(&json!(0), false), Err(NOT_POSITIVE));
        assert_eq!(resolve_uint(&json!("3"), false).unwrap(), U256::from(3));
    }

    #[test]
    fn test_uint_rejects_negative_and_fractional() {
        let negative = ValidationReason::InvalidAmount("must not be negative");
        assert_eq!(resolve_uint(&json!(-1), true), Err(negative));
        assert_eq!(resolve_uint(&json!("-7"), true), Err(negative));
        assert_eq!(
            resolve_uint(&json!(1.5), true),
            Err(ValidationReason::InvalidAmount("must be a whole number"))
        );
        assert!(resolve_uint(&json!("1.5"), true).is_err());
        assert!(resolve_uint(&json!(false), true).is_err());
    }

    #[test]
    fn test_bool_accepts_strings() {
        assert!(resolve_bool(&json!(true)).unwrap());
        assert!(resolve_bool(&json!("TRUE")).unwrap());
        assert!(!resolve_bool(&json!("false")).unwrap());
        assert_eq!(
            resolve_bool(&json!("yes")),
            Err(ValidationReason::InvalidBoolean)
        );
        assert_eq!(resolve_bool(&json!(1)), Err(ValidationReason::InvalidBoolean));
    }
}
