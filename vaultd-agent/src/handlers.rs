//! Axum route handlers for the agent.
//!
//! Every handler that dispatches answers with an [`ActionResponse`]; the
//! HTTP status only mirrors its `errorKind`.

use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use vaultd::submit::TransactionSubmitter;
use vaultd::tool::ToolDescriptor;
use vaultd::{ActionDispatcher, ActionResponse, ErrorKind, RawArgs};

use crate::command::ChatCommand;
use crate::error::AgentError;
use crate::render;
use crate::session::SessionStore;

/// Dispatcher over a type-erased submitter.
pub type Dispatcher = ActionDispatcher<Arc<dyn TransactionSubmitter>>;

/// Shared application state.
#[derive(Clone)]
pub struct AgentState {
    /// The action dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Per-sender chat state.
    pub sessions: Arc<dyn SessionStore>,
}

impl AgentState {
    /// Creates the state.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            sessions,
        }
    }
}

impl fmt::Debug for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentState")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// A function call as produced by an LLM tool loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolCall {
    /// Action name.
    pub name: String,
    /// Arguments, either as an object or as its JSON encoding.
    #[serde(default)]
    pub arguments: ToolArguments,
}

/// Tool-call arguments in either of the shapes model APIs emit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    /// A JSON object.
    Object(RawArgs),
    /// A string holding a JSON object.
    Encoded(String),
}

impl Default for ToolArguments {
    fn default() -> Self {
        Self::Object(RawArgs::new())
    }
}

impl ToolArguments {
    /// Returns the arguments as a map.
    ///
    /// # Errors
    ///
    /// Returns an error if an encoded string is not a JSON object.
    pub fn into_args(self) -> Result<RawArgs, serde_json::Error> {
        match self {
            Self::Object(args) => Ok(args),
            Self::Encoded(s) if s.trim().is_empty() => Ok(RawArgs::new()),
            Self::Encoded(s) => serde_json::from_str(&s),
        }
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier of the sender, used as the session key.
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    /// Text to send back.
    pub reply: String,
    /// Dispatch outcome, when the message was an action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ActionResponse>,
}

/// HTTP status for a dispatch outcome.
#[must_use]
pub const fn status_for(response: &ActionResponse) -> StatusCode {
    match response.error_kind {
        None => StatusCode::OK,
        Some(ErrorKind::UnknownAction) => StatusCode::NOT_FOUND,
        Some(ErrorKind::ValidationError) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::EncodingError) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(ErrorKind::SubmissionError) => StatusCode::BAD_GATEWAY,
    }
}

async fn dispatch(state: &AgentState, name: &str, args: &RawArgs) -> ActionResponse {
    ActionResponse::from(state.dispatcher.dispatch(name, args).await)
}

/// `POST /actions/{name}`: dispatches `name` with the body as arguments.
///
/// # Errors
///
/// Returns [`AgentError::InvalidBody`] if the body is not a JSON object.
pub async fn post_action(
    State(state): State<AgentState>,
    Path(name): Path<String>,
    body: Result<Json<RawArgs>, JsonRejection>,
) -> Result<(StatusCode, Json<ActionResponse>), AgentError> {
    let Json(args) = body?;
    let response = dispatch(&state, &name, &args).await;
    Ok((status_for(&response), Json(response)))
}

/// `POST /dispatch`: dispatches a `{ name, arguments }` tool call.
///
/// # Errors
///
/// Returns [`AgentError`] if the body or its encoded arguments are not
/// valid JSON.
pub async fn post_dispatch(
    State(state): State<AgentState>,
    body: Result<Json<ToolCall>, JsonRejection>,
) -> Result<(StatusCode, Json<ActionResponse>), AgentError> {
    let Json(call) = body?;
    let args = call.arguments.into_args()?;
    let response = dispatch(&state, &call.name, &args).await;
    Ok((status_for(&response), Json(response)))
}

/// `POST /messages`: handles one chat message.
///
/// # Errors
///
/// Returns [`AgentError::InvalidBody`] if the body is not a chat message.
pub async fn post_message(
    State(state): State<AgentState>,
    body: Result<Json<ChatMessage>, JsonRejection>,
) -> Result<Json<ChatReply>, AgentError> {
    let Json(message) = body?;
    let reply = match ChatCommand::parse(&message.text) {
        Ok(ChatCommand::Action { name, args }) => {
            tracing::debug!(sender = %message.sender, action = name, "Chat command");
            let response = dispatch(&state, name, &args).await;
            state
                .sessions
                .record(&message.sender, name, response.clone());
            ChatReply {
                reply: render::action_reply(name, &response),
                response: Some(response),
            }
        }
        Ok(ChatCommand::Last) => ChatReply {
            reply: render::last_reply(state.sessions.get(&message.sender).as_ref()),
            response: None,
        },
        Ok(ChatCommand::History) => ChatReply {
            reply: render::history_reply(state.sessions.get(&message.sender).as_ref()),
            response: None,
        },
        Ok(ChatCommand::Help) => ChatReply {
            reply: render::help(),
            response: None,
        },
        Err(e) => ChatReply {
            reply: render::command_error_reply(&e),
            response: None,
        },
    };
    Ok(Json(reply))
}

/// `GET /tools`: tool descriptors for every registered action.
pub async fn get_tools(State(state): State<AgentState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.dispatcher.registry().tools())
}

/// `GET /health`: liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates an Axum [`Router`] with all agent endpoints.
///
/// Endpoints:
/// - `POST /actions/{name}` dispatch one action
/// - `POST /dispatch` dispatch a tool call
/// - `POST /messages` handle a chat message
/// - `GET /tools` list tool descriptors
/// - `GET /health` liveness
pub fn agent_router(state: AgentState) -> Router {
    Router::new()
        .route("/actions/{name}", post(post_action))
        .route("/dispatch", post(post_dispatch))
        .route("/messages", post(post_message))
        .route("/tools", get(get_tools))
        .route("/health", get(health))
        .with_state(state)
}
