//! Alloy-backed [`TransactionSubmitter`].
//!
//! [`EvmSubmitter`] wraps any alloy [`Provider`]. The provider is expected to
//! carry the signing wallet and the nonce/gas fillers; this type only builds
//! the request, sends it, and optionally waits for the receipt.

use std::time::Duration;

use alloy_network::{ReceiptResponse, TransactionBuilder};
use alloy_primitives::TxHash;
use alloy_provider::{PendingTransactionError, Provider};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportError;
use vaultd::submit::{BoxFuture, SubmitError, TransactionSubmitter, ValidatedCall};

/// Receipt handling for [`EvmSubmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmSubmitterConfig {
    /// Block confirmations to wait for once the transaction is mined.
    pub confirmations: u64,
    /// Upper bound on the receipt wait.
    pub receipt_timeout: Duration,
    /// When false, resolve as soon as the node accepts the transaction.
    pub wait_for_receipt: bool,
}

impl Default for EvmSubmitterConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            receipt_timeout: Duration::from_secs(30),
            wait_for_receipt: true,
        }
    }
}

/// Failure while sending a vault call.
#[derive(Debug, thiserror::Error)]
pub enum EvmSubmitError {
    /// The node rejected the request or could not be reached. Nothing
    /// was broadcast.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The transaction was sent but no receipt arrived in time. It may
    /// still be mined.
    #[error("transaction {tx_hash} was not confirmed: {source}")]
    Unconfirmed {
        /// Hash returned by the node.
        tx_hash: TxHash,
        /// Why the receipt wait ended.
        #[source]
        source: PendingTransactionError,
    },
    /// The transaction was mined and reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

impl EvmSubmitError {
    /// Hash of the transaction, when the node had accepted it.
    #[must_use]
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Transport(_) => None,
            Self::Unconfirmed { tx_hash, .. } | Self::Reverted(tx_hash) => Some(*tx_hash),
        }
    }
}

impl From<EvmSubmitError> for SubmitError {
    fn from(error: EvmSubmitError) -> Self {
        match error.tx_hash() {
            Some(tx_hash) => Self::broadcast(tx_hash, error),
            None => Self::new(error),
        }
    }
}

/// Sends validated calls through an alloy provider.
#[derive(Debug, Clone)]
pub struct EvmSubmitter<P> {
    provider: P,
    config: EvmSubmitterConfig,
}

impl<P> EvmSubmitter<P>
where
    P: Provider,
{
    /// Creates a submitter over `provider`.
    #[must_use]
    pub const fn new(provider: P, config: EvmSubmitterConfig) -> Self {
        Self { provider, config }
    }

    /// Sends `call` and, if configured, waits for a successful receipt.
    ///
    /// # Errors
    ///
    /// Returns [`EvmSubmitError::Transport`] if the node refuses the
    /// transaction, [`EvmSubmitError::Unconfirmed`] if the receipt wait
    /// fails or times out, and [`EvmSubmitError::Reverted`] if the receipt
    /// reports failure. The last two carry the hash of the sent transaction.
    pub async fn send(&self, call: ValidatedCall) -> Result<TxHash, EvmSubmitError> {
        let request = TransactionRequest::default()
            .with_to(call.to())
            .with_value(call.value())
            .with_input(call.into_data());

        let pending = self.provider.send_transaction(request).await?;
        let tx_hash = *pending.tx_hash();

        #[cfg(feature = "telemetry")]
        tracing::info!(tx = %tx_hash, "Transaction accepted by node");

        if !self.config.wait_for_receipt {
            return Ok(tx_hash);
        }

        let receipt = match pending
            .with_required_confirmations(self.config.confirmations)
            .with_timeout(Some(self.config.receipt_timeout))
            .get_receipt()
            .await
        {
            Ok(receipt) => receipt,
            Err(source) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(tx = %tx_hash, error = %source, "Transaction receipt not received");
                return Err(EvmSubmitError::Unconfirmed { tx_hash, source });
            }
        };

        if ReceiptResponse::status(&receipt) {
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                tx = %tx_hash,
                block = ?ReceiptResponse::block_number(&receipt),
                "Transaction confirmed"
            );
            Ok(tx_hash)
        } else {
            #[cfg(feature = "telemetry")]
            tracing::warn!(tx = %tx_hash, "Transaction reverted");
            Err(EvmSubmitError::Reverted(tx_hash))
        }
    }
}

impl<P> TransactionSubmitter for EvmSubmitter<P>
where
    P: Provider,
{
    fn submit(&self, call: ValidatedCall) -> BoxFuture<'_, Result<TxHash, SubmitError>> {
        Box::pin(async move { self.send(call).await.map_err(SubmitError::from) })
    }
}
