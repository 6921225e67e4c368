#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Schema-validated action dispatch for multi-member vault contracts.
//!
//! This crate is the boundary between untrusted requests (chat commands,
//! LLM tool calls) and onchain transactions. It owns no keys and performs
//! no I/O of its own: callers hand it an action name plus raw arguments,
//! and it either rejects them or produces exactly one call for a
//! [`TransactionSubmitter`](submit::TransactionSubmitter) to sign.
//!
//! # Flow
//!
//! ```text
//! (name, raw args) ─► ActionRegistry::lookup ─► validate ─► encode ─► ValidatedCall ─► submit
//! ```
//!
//! # Modules
//!
//! - [`validate`] - Address checksum validation and amount coercion
//! - [`schema`] - Field kinds, raw and validated argument maps
//! - [`action`] - Action definitions and the immutable registry
//! - [`dispatch`] - The dispatcher and its configuration
//! - [`submit`] - The transaction submitter seam
//! - [`response`] - Uniform `{ success, txHash | errorKind, message }` results
//! - [`tool`] - JSON Schema tool descriptors for LLM tool loops
//! - [`error`] - Error taxonomy
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits `tracing` events for rejections, defects, and submissions

pub mod action;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod schema;
pub mod submit;
pub mod tool;
pub mod validate;

pub use action::{ActionDefinition, ActionRegistry, ActionRegistryBuilder};
pub use dispatch::{ActionDispatcher, DispatchConfig, Dispatched, PreparedCall};
pub use error::{ActionError, ErrorKind, ValidationError, ValidationReason};
pub use response::ActionResponse;
pub use schema::RawArgs;
pub use submit::{SubmitError, TransactionSubmitter, ValidatedCall};
