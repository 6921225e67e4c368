//! Error taxonomy for action dispatch.
//!
//! Every failure a dispatch can produce is one of four kinds, see
//! [`ErrorKind`]. Each kind carries a short user-facing message via
//! [`ActionError::user_message`]; diagnostic detail stays in the error's
//! source chain and is only meant for server-side logs.

use std::fmt;

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

use crate::submit::SubmitError;

/// Why a single field failed validation.
///
/// Messages are fixed strings and never echo the offending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationReason {
    /// A required field was absent or `null`.
    #[error("this field is required")]
    Missing,
    /// Not a well-formed 20-byte hex address, or a bad checksum.
    #[error("{0}")]
    InvalidAddress(&'static str),
    /// Not a positive amount or a valid unsigned integer.
    #[error("{0}")]
    InvalidAmount(&'static str),
    /// Not `true` or `false`.
    #[error("expected true or false")]
    InvalidBoolean,
    /// Text field was empty or not a string.
    #[error("{0}")]
    InvalidString(&'static str),
    /// Text field exceeded the configured limit.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum number of characters accepted.
        max: usize,
    },
    /// The field is not part of the action's schema.
    #[error("unexpected field")]
    UnexpectedField,
}

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,
    /// What was wrong with it.
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Creates a new validation error for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// An encoder was handed arguments that violate its own precondition.
///
/// Unreachable when validation and the action schema agree; seeing one
/// means the action table is wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("encoder precondition violated: {0}")]
pub struct EncodingError(pub String);

/// Errors raised while populating an [`ActionRegistry`](crate::action::ActionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two definitions share a name.
    #[error("action `{0}` is already registered")]
    Duplicate(&'static str),
    /// A definition lists the same field twice.
    #[error("action `{action}` declares field `{field}` more than once")]
    DuplicateField {
        /// Action name.
        action: &'static str,
        /// Repeated field name.
        field: &'static str,
    },
}

/// Failure of a single dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The action name is not registered.
    #[error("unknown action `{name}`")]
    UnknownAction {
        /// Requested name.
        name: String,
    },
    /// An argument failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The encoder rejected validated input.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The transaction submitter failed.
    ///
    /// The display text is generic; the cause is only
    /// reachable through [`std::error::Error::source`].
    #[error("transaction submission failed")]
    Submission(#[source] SubmitError),
}

impl ActionError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAction { .. } => ErrorKind::UnknownAction,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Encoding(_) => ErrorKind::EncodingError,
            Self::Submission(_) => ErrorKind::SubmissionError,
        }
    }

    /// Returns a short, non-technical message safe to show an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownAction { name } => format!("Unknown action `{name}`."),
            Self::Validation(e) => format!("Invalid `{}`: {}.", e.field, e.reason),
            Self::Encoding(_) => "The request could not be processed.".to_owned(),
            Self::Submission(e) => e.tx_hash().map_or_else(
                || "The transaction could not be submitted.".to_owned(),
                |hash| {
                    format!(
                        "Transaction {hash} was sent but not confirmed. \
                         Check its status before sending the action again."
                    )
                },
            ),
        }
    }

    /// Hash of a transaction that was broadcast before the failure.
    #[must_use]
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Submission(e) => e.tx_hash(),
            _ => None,
        }
    }
}

/// Classification of an [`ActionError`], as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`ActionError::UnknownAction`].
    UnknownAction,
    /// See [`ActionError::Validation`].
    ValidationError,
    /// See [`ActionError::Encoding`].
    EncodingError,
    /// See [`ActionError::Submission`].
    SubmissionError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownAction => "UnknownAction",
            Self::ValidationError => "ValidationError",
            Self::EncodingError => "EncodingError",
            Self::SubmissionError => "SubmissionError",
        };
        f.write_str(s)
    }
}
