//! The seam between dispatch and the signing backend.
//!
//! [`TransactionSubmitter`] is the single capability the dispatcher needs
//! from the outside world. Implementations own the signing key; nothing on
//! this side of the trait ever sees it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash, U256};

/// A pinned, boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed error cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a submitter.
///
/// The cause is only logged, never forwarded to callers. When the node had
/// already accepted the transaction, the failure carries its hash and the
/// call may still execute.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct SubmitError {
    tx_hash: Option<TxHash>,
    #[source]
    cause: BoxError,
}

impl SubmitError {
    /// A failure before any transaction reached the node.
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self {
            tx_hash: None,
            cause: cause.into(),
        }
    }

    /// A failure after the node accepted transaction `tx_hash`, such as a
    /// receipt timeout or a revert.
    pub fn broadcast(tx_hash: TxHash, cause: impl Into<BoxError>) -> Self {
        Self {
            tx_hash: Some(tx_hash),
            cause: cause.into(),
        }
    }

    /// Hash of the transaction, if it was broadcast.
    #[must_use]
    pub const fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    /// The underlying error.
    #[must_use]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.cause
    }
}

/// A contract call ready for signing: fixed target, zero value, encoded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCall {
    to: Address,
    data: Bytes,
}

impl ValidatedCall {
    /// Creates a zero-value call to `to` carrying `data`.
    #[must_use]
    pub const fn new(to: Address, data: Bytes) -> Self {
        Self { to, data }
    }

    /// Target contract.
    #[must_use]
    pub const fn to(&self) -> Address {
        self.to
    }

    /// Native value attached to the call; always zero.
    #[must_use]
    pub const fn value(&self) -> U256 {
        U256::ZERO
    }

    /// Encoded calldata.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the call, returning its calldata.
    #[must_use]
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// Signs and broadcasts calls.
pub trait TransactionSubmitter: Send + Sync {
    /// Submits `call` and resolves to its transaction hash.
    ///
    /// Called at most once per dispatch; implementations decide whether
    /// to wait for inclusion and how long.
    fn submit(&self, call: ValidatedCall) -> BoxFuture<'_, Result<TxHash, SubmitError>>;
}

impl<T: TransactionSubmitter + ?Sized> TransactionSubmitter for Arc<T> {
    fn submit(&self, call: ValidatedCall) -> BoxFuture<'_, Result<TxHash, SubmitError>> {
        (**self).submit(call)
    }
}

impl<T: TransactionSubmitter + ?Sized> TransactionSubmitter for Box<T> {
    fn submit(&self, call: ValidatedCall) -> BoxFuture<'_, Result<TxHash, SubmitError>> {
        (**self).submit(call)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;

    #[test]
    fn test_broadcast_failure_keeps_hash() {
        let hash = b256!("0x0909090909090909090909090909090909090909090909090909090909090909");
        let err = SubmitError::broadcast(hash, "transaction was not confirmed within the timeout");
        assert_eq!(err.tx_hash(), Some(hash));
        assert_eq!(
            err.cause().to_string(),
            "transaction was not confirmed within the timeout"
        );
        assert_eq!(SubmitError::new("connection refused").tx_hash(), None);
    }
}
