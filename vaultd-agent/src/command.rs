//! Slash-command grammar for chat front ends.
//!
//! Commands only split text into named arguments. Every value is passed on
//! as a string and validated by the dispatcher like any other caller's
//! input.

use serde_json::Value;
use vaultd::RawArgs;
use vaultd_evm::actions::{
    ADD_MEMBER, EXECUTE_PROPOSAL, PROPOSE, REMOVE_MEMBER, SET_MIN_VOTES, SET_VOTING_PERIOD,
    VOTE_ON_PROPOSAL,
};

/// Usage lines, one per command, in help order.
pub const USAGE: &[&str] = &[
    PROPOSE_USAGE,
    VOTE_USAGE,
    EXECUTE_USAGE,
    ADD_MEMBER_USAGE,
    REMOVE_MEMBER_USAGE,
    SET_MIN_VOTES_USAGE,
    SET_VOTING_PERIOD_USAGE,
    "/last",
    "/history",
    "/help",
];

const PROPOSE_USAGE: &str = "/propose <token> <amount> <to> <reason...>";
const VOTE_USAGE: &str = "/vote <proposalId> <yes|no>";
const EXECUTE_USAGE: &str = "/execute <proposalId>";
const ADD_MEMBER_USAGE: &str = "/add-member <address>";
const REMOVE_MEMBER_USAGE: &str = "/remove-member <address>";
const SET_MIN_VOTES_USAGE: &str = "/set-min-votes <n>";
const SET_VOTING_PERIOD_USAGE: &str = "/set-voting-period <seconds>";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Dispatch `name` with `args`.
    Action {
        /// Registered action name.
        name: &'static str,
        /// Arguments keyed by field name.
        args: RawArgs,
    },
    /// Show the sender's most recent outcome.
    Last,
    /// Show the sender's recent outcomes.
    History,
    /// Show the command list.
    Help,
}

/// Why a message did not parse into a [`ChatCommand`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The message does not start with `/`.
    #[error("not a command")]
    NotACommand,
    /// The command word is not recognised.
    #[error("unknown command `{0}`")]
    Unknown(String),
    /// The command is known but its arguments do not fit.
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl ChatCommand {
    /// Parses a chat message.
    ///
    /// A `@botname` suffix on the command word is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the text is not a command, names an
    /// unknown command, or has the wrong number of arguments.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Err(CommandError::NotACommand);
        };
        let mut words = rest.split_whitespace();
        let command = words.next().unwrap_or_default();
        let command = command.split_once('@').map_or(command, |(c, _)| c);
        let words: Vec<&str> = words.collect();

        match command.to_ascii_lowercase().as_str() {
            "propose" => match words.as_slice() {
                [token, amount, to, reason @ ..] if !reason.is_empty() => Ok(action(
                    PROPOSE,
                    [
                        ("token", (*token).to_owned()),
                        ("amount", (*amount).to_owned()),
                        ("to", (*to).to_owned()),
                        ("reason", reason.join(" ")),
                    ],
                )),
                _ => Err(CommandError::Usage(PROPOSE_USAGE)),
            },
            "vote" => match words.as_slice() {
                [id, support] => Ok(action(
                    VOTE_ON_PROPOSAL,
                    [
                        ("proposalId", (*id).to_owned()),
                        ("support", support_flag(support)),
                    ],
                )),
                _ => Err(CommandError::Usage(VOTE_USAGE)),
            },
            "execute" => single(&words, EXECUTE_PROPOSAL, "proposalId", EXECUTE_USAGE),
            "add-member" => single(&words, ADD_MEMBER, "newMember", ADD_MEMBER_USAGE),
            "remove-member" => single(&words, REMOVE_MEMBER, "member", REMOVE_MEMBER_USAGE),
            "set-min-votes" => single(&words, SET_MIN_VOTES, "minVotes", SET_MIN_VOTES_USAGE),
            "set-voting-period" => single(
                &words,
                SET_VOTING_PERIOD,
                "period",
                SET_VOTING_PERIOD_USAGE,
            ),
            "last" => Ok(Self::Last),
            "history" => Ok(Self::History),
            "help" | "start" => Ok(Self::Help),
            _ => Err(CommandError::Unknown(command.to_owned())),
        }
    }
}

fn action<const N: usize>(name: &'static str, fields: [(&str, String); N]) -> ChatCommand {
    let args = fields
        .into_iter()
        .map(|(k, v)| (k.to_owned(), Value::String(v)))
        .collect();
    ChatCommand::Action { name, args }
}

fn single(
    words: &[&str],
    name: &'static str,
    field: &str,
    usage: &'static str,
) -> Result<ChatCommand, CommandError> {
    match words {
        [value] => Ok(action(name, [(field, (*value).to_owned())])),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Maps vote words onto the boolean the contract expects. Anything else is
/// passed through for the validator to reject.
fn support_flag(word: &str) -> String {
    match word.to_ascii_lowercase().as_str() {
        "yes" | "y" | "for" | "approve" => "true".to_owned(),
        "no" | "n" | "against" | "reject" => "false".to_owned(),
        _ => word.to_owned(),
    }
}
