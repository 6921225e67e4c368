//! Plain-text replies for chat front ends.

use std::fmt::Write as _;

use vaultd::ActionResponse;

use crate::command::{CommandError, USAGE};
use crate::session::Session;

/// Reply to a dispatched action.
#[must_use]
pub fn action_reply(action: &str, response: &ActionResponse) -> String {
    match (response.success, response.tx_hash) {
        (true, Some(hash)) => format!("{action} submitted.\nTransaction: {hash}"),
        _ => format!(
            "{action} failed: {}",
            response
                .message
                .as_deref()
                .unwrap_or("the request could not be completed.")
        ),
    }
}

/// Reply to `/last`.
#[must_use]
pub fn last_reply(session: Option<&Session>) -> String {
    let Some(session) = session else {
        return "No actions yet.".to_owned();
    };
    let mut reply = session
        .last()
        .map_or_else(|| "No actions yet.".to_owned(), |o| action_reply(&o.action, &o.response));
    if let Some(hash) = session.last_tx() {
        let _ = write!(reply, "\nLast transaction: {hash}");
    }
    reply
}

/// Reply to `/history`, oldest first.
#[must_use]
pub fn history_reply(session: Option<&Session>) -> String {
    let mut outcomes = session.into_iter().flat_map(Session::history).peekable();
    if outcomes.peek().is_none() {
        return "No actions yet.".to_owned();
    }
    let mut reply = String::from("Recent actions:");
    for outcome in outcomes {
        let status = match (outcome.response.success, outcome.response.tx_hash) {
            (true, Some(hash)) => format!("submitted {hash}"),
            (false, Some(hash)) => format!("unconfirmed {hash}"),
            _ => outcome
                .response
                .error_kind
                .map_or_else(|| "failed".to_owned(), |kind| format!("failed ({kind})")),
        };
        let _ = write!(reply, "\n  {}: {status}", outcome.action);
    }
    reply
}

/// The command list.
#[must_use]
pub fn help() -> String {
    let mut reply = String::from("Vault commands:");
    for line in USAGE {
        let _ = write!(reply, "\n  {line}");
    }
    reply
}

/// Reply to text that did not parse as a command.
#[must_use]
pub fn command_error_reply(error: &CommandError) -> String {
    match error {
        CommandError::NotACommand => "Send /help to see what I can do.".to_owned(),
        CommandError::Unknown(_) => format!("{}.\n{}", capitalize(&error.to_string()), help()),
        CommandError::Usage(usage) => format!("Usage: {usage}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
