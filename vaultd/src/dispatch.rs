//! Action dispatch.
//!
//! [`ActionDispatcher::dispatch`] runs one request through
//! lookup → validate → encode → submit. Every step before submission is
//! pure, so a request that fails early has no side effects. A request that
//! reaches the submitter does so exactly once; nothing here retries.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash};

use crate::action::ActionRegistry;
use crate::error::ActionError;
use crate::schema::RawArgs;
use crate::submit::{TransactionSubmitter, ValidatedCall};
use crate::validate::DEFAULT_DECIMALS;

/// Process-level settings consumed by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// The vault contract every call targets.
    pub vault: Address,
    /// Decimal precision used to scale amount fields.
    pub decimals: u8,
}

impl DispatchConfig {
    /// Creates a config for `vault` with the default 18 decimals.
    #[must_use]
    pub const fn new(vault: Address) -> Self {
        Self {
            vault,
            decimals: DEFAULT_DECIMALS,
        }
    }

    /// Overrides the decimal precision.
    #[must_use]
    pub const fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// Name of the dispatched action.
    pub action: &'static str,
    /// Hash returned by the submitter, unmodified.
    pub tx_hash: TxHash,
}

/// A call that passed validation and encoding but was not submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    /// Canonical name of the action.
    pub action: &'static str,
    /// The call to submit.
    pub call: ValidatedCall,
}

/// Validates, encodes, and submits actions against a fixed vault.
///
/// Holds no per-request state; concurrent dispatches share only the
/// registry and the submitter.
pub struct ActionDispatcher<S> {
    registry: Arc<ActionRegistry>,
    submitter: S,
    config: DispatchConfig,
}

impl<S> std::fmt::Debug for ActionDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> ActionDispatcher<S>
where
    S: TransactionSubmitter,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(registry: Arc<ActionRegistry>, submitter: S, config: DispatchConfig) -> Self {
        Self {
            registry,
            submitter,
            config,
        }
    }

    /// The registry this dispatcher resolves names against.
    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// The dispatcher's configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs lookup, validation, and encoding without submitting.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownAction`], [`ActionError::Validation`],
    /// or [`ActionError::Encoding`].
    pub fn prepare(&self, name: &str, args: &RawArgs) -> Result<PreparedCall, ActionError> {
        let definition = self.registry.lookup(name)?;
        let action = definition.name();

        let validated = match definition.validate(args, self.config.decimals) {
            Ok(validated) => validated,
            Err(e) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(action, field = %e.field, reason = %e.reason, "Rejected action arguments");
                return Err(e.into());
            }
        };
        let data = match definition.encode(&validated) {
            Ok(data) => data,
            Err(e) => {
                #[cfg(feature = "telemetry")]
                tracing::error!(action, error = %e, "Encoder rejected validated arguments");
                return Err(e.into());
            }
        };
        Ok(PreparedCall {
            action,
            call: ValidatedCall::new(self.config.vault, data),
        })
    }

    /// Dispatches `name` with `args` and submits the resulting call.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] of the matching kind. Submission
    /// failures carry the submitter's error as their source.
    pub async fn dispatch(&self, name: &str, args: &RawArgs) -> Result<Dispatched, ActionError> {
        let PreparedCall { action, call } = self.prepare(name, args)?;

        #[cfg(feature = "telemetry")]
        tracing::info!(action, to = %call.to(), "Submitting vault call");

        let tx_hash = match self.submitter.submit(call).await {
            Ok(hash) => hash,
            Err(e) => {
                #[cfg(feature = "telemetry")]
                match e.tx_hash() {
                    Some(tx) => tracing::error!(
                        action,
                        %tx,
                        error = %e,
                        "Vault call sent but not confirmed as successful"
                    ),
                    None => tracing::error!(action, error = %e, "Transaction submission failed"),
                }
                return Err(ActionError::Submission(e));
            }
        };

        #[cfg(feature = "telemetry")]
        tracing::info!(action, tx = %tx_hash, "Vault call submitted");

        Ok(Dispatched { action, tx_hash })
    }
}
