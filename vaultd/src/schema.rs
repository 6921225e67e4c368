//! Input schemas for actions.
//!
//! An action declares an ordered list of [`FieldSpec`]s. Validation walks
//! the list in order against the caller's [`RawArgs`] and produces
//! [`ValidatedArgs`], the only input an encoder ever sees.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde_json::Value;

use crate::error::{EncodingError, ValidationError, ValidationReason};
use crate::validate::{resolve_amount, resolve_bool, resolve_uint, validate_address};

/// Untrusted arguments as received from a caller: a JSON object whose
/// values are strings, numbers, or booleans.
pub type RawArgs = serde_json::Map<String, Value>;

/// Semantic type of an action field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A chain address.
    Address,
    /// A token amount, scaled by the configured decimals. Always positive.
    Amount,
    /// An unsigned integer such as a proposal id.
    Uint {
        /// Whether `0` is acceptable.
        allow_zero: bool,
    },
    /// Free text.
    Text {
        /// Optional limit in characters.
        max_len: Option<usize>,
    },
    /// A boolean flag.
    Boolean,
}

impl FieldKind {
    /// Short type name used in descriptors and help output.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Amount => "amountLike",
            Self::Uint { .. } => "uintLike",
            Self::Text { .. } => "string",
            Self::Boolean => "boolean",
        }
    }
}

/// One named field of an action's input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as it appears in the raw arguments.
    pub name: &'static str,
    /// Semantic type.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
    /// Human-readable description.
    pub description: &'static str,
}

impl FieldSpec {
    /// Creates a required field.
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    /// Creates an optional field.
    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    /// Validates a single raw value against this field's kind.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationReason`] describing why `value` is unacceptable.
    pub fn validate(&self, value: &Value, decimals: u8) -> Result<ArgValue, ValidationReason> {
        match self.kind {
            FieldKind::Address => match value {
                Value::String(s) => validate_address(s).map(ArgValue::Address),
                _ => Err(ValidationReason::InvalidAddress(
                    "expected a 0x-prefixed address",
                )),
            },
            FieldKind::Amount => resolve_amount(value, decimals).map(ArgValue::Uint),
            FieldKind::Uint { allow_zero } => resolve_uint(value, allow_zero).map(ArgValue::Uint),
            FieldKind::Text { max_len } => {
                let Value::String(s) = value else {
                    return Err(ValidationReason::InvalidString("expected text"));
                };
                let text = s.trim();
                if text.is_empty() {
                    return Err(ValidationReason::InvalidString("must not be empty"));
                }
                if let Some(max) = max_len
                    && text.chars().count() > max
                {
                    return Err(ValidationReason::TooLong { max });
                }
                Ok(ArgValue::Text(text.to_owned()))
            }
            FieldKind::Boolean => resolve_bool(value).map(ArgValue::Bool),
        }
    }
}

/// A validated, canonical argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Checksum-validated address.
    Address(Address),
    /// Non-negative integer in base units.
    Uint(U256),
    /// Trimmed, length-checked text.
    Text(String),
    /// Boolean flag.
    Bool(bool),
}

/// Arguments that passed validation against an action's schema.
///
/// Can only be produced by [`validate_args`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedArgs(BTreeMap<&'static str, ArgValue>);

impl ValidatedArgs {
    /// Returns the raw validated value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    /// Returns the address stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if `name` is absent or not an address.
    pub fn address(&self, name: &str) -> Result<Address, EncodingError> {
        match self.get(name) {
            Some(ArgValue::Address(a)) => Ok(*a),
            _ => Err(Self::mismatch(name, "address")),
        }
    }

    /// Returns the integer stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if `name` is absent or not an integer.
    pub fn uint(&self, name: &str) -> Result<U256, EncodingError> {
        match self.get(name) {
            Some(ArgValue::Uint(v)) => Ok(*v),
            _ => Err(Self::mismatch(name, "integer")),
        }
    }

    /// Returns the text stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if `name` is absent or not text.
    pub fn text(&self, name: &str) -> Result<&str, EncodingError> {
        match self.get(name) {
            Some(ArgValue::Text(s)) => Ok(s),
            _ => Err(Self::mismatch(name, "text")),
        }
    }

    /// Returns the boolean stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if `name` is absent or not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, EncodingError> {
        match self.get(name) {
            Some(ArgValue::Bool(b)) => Ok(*b),
            _ => Err(Self::mismatch(name, "boolean")),
        }
    }

    fn mismatch(name: &str, expected: &str) -> EncodingError {
        EncodingError(format!("field `{name}` is not a validated {expected}"))
    }
}

/// Validates `raw` against `fields`, in declaration order.
///
/// The first failing field short-circuits. Keys that no field declares
/// are rejected after all declared fields pass. A `null` value counts as
/// absent.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_args(
    fields: &[FieldSpec],
    raw: &RawArgs,
    decimals: u8,
) -> Result<ValidatedArgs, ValidationError> {
    let mut validated = BTreeMap::new();
    for field in fields {
        match raw.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(ValidationError::new(field.name, ValidationReason::Missing));
                }
            }
            Some(value) => {
                let arg = field
                    .validate(value, decimals)
                    .map_err(|reason| ValidationError::new(field.name, reason))?;
                validated.insert(field.name, arg);
            }
        }
    }
    if let Some(extra) = raw
        .keys()
        .find(|key| !fields.iter().any(|f| f.name == key.as_str()))
    {
        return Err(ValidationError::new(
            extra.as_str(),
            ValidationReason::UnexpectedField,
        ));
    }
    Ok(ValidatedArgs(validated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("to", FieldKind::Address, "recipient"),
        FieldSpec::required("amount", FieldKind::Amount, "amount"),
        FieldSpec::optional("memo", FieldKind::Text { max_len: Some(8) }, "memo"),
    ];

    fn raw(value: Value) -> RawArgs {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_validate_args_happy_path() {
        let args = raw(json!({
            "to": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "amount": "2.5",
        }));
        let validated = validate_args(FIELDS, &args, 2).unwrap();
        assert!(validated.get("to").is_some());
        assert_eq!(validated.uint("amount").unwrap(), U256::from(250));
        assert!(validated.get("memo").is_none());
    }

    #[test]
    fn test_validate_args_is_deterministic() {
        let args = raw(json!({
            "to": "0xFB6916095CA1DF60BB79CE92CE3EA74C37C5D359",
            "amount": 7,
            "memo": "  rent ",
        }));
        let first = validate_args(FIELDS, &args, 18).unwrap();
        let second = validate_args(FIELDS, &args, 18).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text("memo").unwrap(), "rent");
    }

    #[test]
    fn test_first_failing_field_wins() {
        let args = raw(json!({ "to": "nope", "amount": "-1" }));
        let err = validate_args(FIELDS, &args, 18).unwrap_err();
        assert_eq!(err.field, "to");
    }

    #[test]
    fn test_missing_and_null_required_field() {
        let args = raw(json!({ "amount": "1" }));
        assert_eq!(
            validate_args(FIELDS, &args, 18).unwrap_err(),
            ValidationError::new("to", ValidationReason::Missing)
        );
        let args = raw(json!({ "to": null, "amount": "1" }));
        assert_eq!(
            validate_args(FIELDS, &args, 18).unwrap_err().reason,
            ValidationReason::Missing
        );
    }

    #[test]
    fn test_unexpected_field_rejected() {
        let args = raw(json!({
            "to": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "amount": "1",
            "data": "0xdeadbeef",
        }));
        assert_eq!(
            validate_args(FIELDS, &args, 18).unwrap_err(),
            ValidationError::new("data", ValidationReason::UnexpectedField)
        );
    }

    #[test]
    fn test_text_limits() {
        let args = raw(json!({
            "to": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "amount": "1",
            "memo": "much too long",
        }));
        assert_eq!(
            validate_args(FIELDS, &args, 18).unwrap_err().reason,
            ValidationReason::TooLong { max: 8 }
        );
        let args = raw(json!({
            "to": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "amount": "1",
            "memo": "   ",
        }));
        assert_eq!(
            validate_args(FIELDS, &args, 18).unwrap_err().reason,
            ValidationReason::InvalidString("must not be empty")
        );
    }

    #[test]
    fn test_accessor_type_mismatch_is_encoding_error() {
        let args = raw(json!({
            "to": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "amount": "1",
        }));
        let validated = validate_args(FIELDS, &args, 18).unwrap();
        assert!(validated.uint("to").is_err());
        assert!(validated.boolean("missing").is_err());
    }
}
