#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM bindings for vaultd.
//!
//! Provides the multi-member vault's Solidity interface, the action table
//! that maps tool names onto its functions, and an alloy-backed
//! [`TransactionSubmitter`](vaultd::submit::TransactionSubmitter).
//!
//! # Modules
//!
//! - [`contract`] - `IMultiMemberVault` ABI bindings
//! - [`actions`] - Action definitions and [`vault_registry`]
//! - `submitter` - [`EvmSubmitter`] over any alloy provider (feature `submitter`)
//!
//! # Feature Flags
//!
//! - `submitter` - Alloy provider based transaction submission
//! - `telemetry` - `tracing` events for submissions and receipts
//!
//! # Example
//!
//! ```
//! use vaultd_evm::{VaultActionOptions, vault_registry};
//!
//! let registry = vault_registry(VaultActionOptions::default()).unwrap();
//! assert!(registry.get("voteOnProposal").is_some());
//! ```

pub mod actions;
pub mod contract;
#[cfg(feature = "submitter")]
pub mod submitter;

pub use actions::{VaultActionOptions, vault_registry};
pub use contract::IMultiMemberVault;
#[cfg(feature = "submitter")]
pub use submitter::{EvmSubmitError, EvmSubmitter, EvmSubmitterConfig};
