//! Vault agent server.
//!
//! Exposes the vault action set over HTTP for tool-calling models and chat
//! front ends, with per-sender session state.
//!
//! # Modules
//!
//! - [`handlers`] - Axum route handlers and router builder
//! - [`command`] - Slash-command parser
//! - [`render`] - Chat reply text
//! - [`session`] - Session store trait and in-memory implementation
//! - [`error`] - HTTP-layer error types
//! - [`config`] - Server configuration with environment variable expansion

pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod session;

pub use handlers::{AgentState, agent_router};
