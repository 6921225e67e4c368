//! The uniform result shape returned to callers.
//!
//! Every dispatch outcome, success or any [`ActionError`] kind, is
//! flattened into an [`ActionResponse`] before it leaves the core. The
//! response carries only the error kind and a user-facing message.

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatched;
use crate::error::{ActionError, ErrorKind};

/// Outcome of a dispatch, safe to serialize back to any caller.
///
/// ```json
/// { "success": true, "txHash": "0x…" }
/// { "success": false, "errorKind": "ValidationError", "message": "Invalid `amount`: …" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    /// Whether a transaction was submitted.
    pub success: bool,
    /// Hash of the submitted transaction. Also set on a submission failure
    /// when the transaction was sent but its outcome is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    /// Failure classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// User-facing failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResponse {
    /// A successful submission.
    #[must_use]
    pub const fn submitted(tx_hash: TxHash) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            error_kind: None,
            message: None,
        }
    }

    /// A failure, reduced to its kind and user message.
    #[must_use]
    pub fn failed(error: &ActionError) -> Self {
        Self {
            success: false,
            tx_hash: error.tx_hash(),
            error_kind: Some(error.kind()),
            message: Some(error.user_message()),
        }
    }
}

impl From<&Result<Dispatched, ActionError>> for ActionResponse {
    fn from(result: &Result<Dispatched, ActionError>) -> Self {
        match result {
            Ok(dispatched) => Self::submitted(dispatched.tx_hash),
            Err(e) => Self::failed(e),
        }
    }
}

impl From<Result<Dispatched, ActionError>> for ActionResponse {
    fn from(result: Result<Dispatched, ActionError>) -> Self {
        Self::from(&result)
    }
}
