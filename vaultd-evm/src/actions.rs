//! The vault's action table.
//!
//! One [`ActionDefinition`] per governance entry point of
//! [`IMultiMemberVault`]. Field names match the contract's parameter names
//! so that tool-calling models see the same vocabulary as the ABI.

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use vaultd::action::{ActionDefinition, ActionRegistry};
use vaultd::error::{EncodingError, RegistryError};
use vaultd::schema::{FieldKind, FieldSpec, ValidatedArgs};

use crate::contract::IMultiMemberVault;

/// `propose` action name.
pub const PROPOSE: &str = "propose";
/// `voteOnProposal` action name.
pub const VOTE_ON_PROPOSAL: &str = "voteOnProposal";
/// `executeProposal` action name.
pub const EXECUTE_PROPOSAL: &str = "executeProposal";
/// `addMember` action name.
pub const ADD_MEMBER: &str = "addMember";
/// `removeMember` action name.
pub const REMOVE_MEMBER: &str = "removeMember";
/// `setMinVotes` action name.
pub const SET_MIN_VOTES: &str = "setMinVotes";
/// `setVotingPeriod` action name.
pub const SET_VOTING_PERIOD: &str = "setVotingPeriod";

const PROPOSAL_ID: FieldSpec = FieldSpec::required(
    "proposalId",
    FieldKind::Uint { allow_zero: true },
    "Numeric id of the proposal",
);

/// Tunables for the action table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultActionOptions {
    /// Upper bound on the length of a proposal's `reason`, in characters.
    /// `None` leaves it unbounded.
    pub max_reason_len: Option<usize>,
}

/// Builds the registry of all vault actions.
///
/// # Errors
///
/// Returns [`RegistryError`] only if the table itself is inconsistent.
pub fn vault_registry(options: VaultActionOptions) -> Result<ActionRegistry, RegistryError> {
    Ok(ActionRegistry::builder()
        .and_register(propose(options.max_reason_len))?
        .and_register(vote_on_proposal())?
        .and_register(execute_proposal())?
        .and_register(add_member())?
        .and_register(remove_member())?
        .and_register(set_min_votes())?
        .and_register(set_voting_period())?
        .build())
}

/// `propose(token, amount, to, reason)`: open a transfer proposal.
#[must_use]
pub fn propose(max_reason_len: Option<usize>) -> ActionDefinition {
    ActionDefinition::new(
        PROPOSE,
        "Propose moving `amount` of `token` from the vault to `to`. Use the zero address for the native currency.",
        encode_propose,
    )
    .with_field(FieldSpec::required(
        "token",
        FieldKind::Address,
        "Token contract address, or the zero address for the native currency",
    ))
    .with_field(FieldSpec::required(
        "amount",
        FieldKind::Amount,
        "Amount in whole tokens as a decimal string (e.g. \"0.1\"), or base units as an integer",
    ))
    .with_field(FieldSpec::required(
        "to",
        FieldKind::Address,
        "Recipient address",
    ))
    .with_field(FieldSpec::required(
        "reason",
        FieldKind::Text {
            max_len: max_reason_len,
        },
        "Why the funds should move",
    ))
}

/// `voteOnProposal(proposalId, support)`.
#[must_use]
pub fn vote_on_proposal() -> ActionDefinition {
    ActionDefinition::new(
        VOTE_ON_PROPOSAL,
        "Vote for or against an open proposal.",
        encode_vote_on_proposal,
    )
    .with_field(PROPOSAL_ID)
    .with_field(FieldSpec::required(
        "support",
        FieldKind::Boolean,
        "true to approve, false to reject",
    ))
}

/// `executeProposal(proposalId)`.
#[must_use]
pub fn execute_proposal() -> ActionDefinition {
    ActionDefinition::new(
        EXECUTE_PROPOSAL,
        "Execute a proposal that reached quorum after its voting period.",
        encode_execute_proposal,
    )
    .with_field(PROPOSAL_ID)
}

/// `addMember(newMember)`.
#[must_use]
pub fn add_member() -> ActionDefinition {
    ActionDefinition::new(ADD_MEMBER, "Add a vault member.", encode_add_member).with_field(
        FieldSpec::required("newMember", FieldKind::Address, "Address to add"),
    )
}

/// `removeMember(member)`.
#[must_use]
pub fn remove_member() -> ActionDefinition {
    ActionDefinition::new(REMOVE_MEMBER, "Remove a vault member.", encode_remove_member)
        .with_field(FieldSpec::required(
            "member",
            FieldKind::Address,
            "Address to remove",
        ))
}

/// `setMinVotes(minVotes)`.
#[must_use]
pub fn set_min_votes() -> ActionDefinition {
    ActionDefinition::new(
        SET_MIN_VOTES,
        "Set the number of approvals a proposal needs.",
        encode_set_min_votes,
    )
    .with_field(FieldSpec::required(
        "minVotes",
        FieldKind::Uint { allow_zero: false },
        "Required approvals, at least 1",
    ))
}

/// `setVotingPeriod(period)`.
#[must_use]
pub fn set_voting_period() -> ActionDefinition {
    ActionDefinition::new(
        SET_VOTING_PERIOD,
        "Set how long proposals stay open for voting.",
        encode_set_voting_period,
    )
    .with_field(FieldSpec::required(
        "period",
        FieldKind::Uint { allow_zero: false },
        "Voting period in seconds, at least 1",
    ))
}

fn encode<C: SolCall>(call: &C) -> Bytes {
    call.abi_encode().into()
}

fn encode_propose(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::proposeCall {
        token: args.address("token")?,
        amount: args.uint("amount")?,
        to: args.address("to")?,
        reason: args.text("reason")?.to_owned(),
    }))
}

fn encode_vote_on_proposal(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::voteOnProposalCall {
        proposalId: args.uint("proposalId")?,
        support: args.boolean("support")?,
    }))
}

fn encode_execute_proposal(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::executeProposalCall {
        proposalId: args.uint("proposalId")?,
    }))
}

fn encode_add_member(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::addMemberCall {
        newMember: args.address("newMember")?,
    }))
}

fn encode_remove_member(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::removeMemberCall {
        member: args.address("member")?,
    }))
}

fn encode_set_min_votes(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::setMinVotesCall {
        minVotes: args.uint("minVotes")?,
    }))
}

fn encode_set_voting_period(args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
    Ok(encode(&IMultiMemberVault::setVotingPeriodCall {
        period: args.uint("period")?,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use alloy_primitives::{Address, TxHash, U256, address, b256};
    use serde_json::{Value, json};
    use vaultd::dispatch::{ActionDispatcher, DispatchConfig};
    use vaultd::error::{ActionError, ErrorKind, ValidationReason};
    use vaultd::response::ActionResponse;
    use vaultd::schema::RawArgs;
    use vaultd::submit::{BoxFuture, SubmitError, TransactionSubmitter, ValidatedCall};

    use super::*;

    const VAULT: Address = address!("0x9999999999999999999999999999999999999999");
    const RECIPIENT: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
    const MEMBER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const HASH: TxHash = b256!("0x1234123412341234123412341234123412341234123412341234123412341234");

    #[derive(Default)]
    struct MockSubmitter {
        calls: Mutex<Vec<ValidatedCall>>,
        fail: bool,
    }

    impl MockSubmitter {
        fn calls(&self) -> Vec<ValidatedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TransactionSubmitter for MockSubmitter {
        fn submit(&self, call: ValidatedCall) -> BoxFuture<'_, Result<TxHash, SubmitError>> {
            self.calls.lock().unwrap().push(call);
            let result: Result<TxHash, SubmitError> = if self.fail {
                Err(SubmitError::new(
                    "Post \"https://mainnet.infura.io/v3/abcdef0123\": context deadline exceeded (Client.Timeout exceeded while awaiting headers)",
                ))
            } else {
                Ok(HASH)
            };
            Box::pin(async move { result })
        }
    }

    fn dispatcher(
        submitter: MockSubmitter,
    ) -> (ActionDispatcher<Arc<MockSubmitter>>, Arc<MockSubmitter>) {
        let registry = vault_registry(VaultActionOptions::default()).unwrap();
        let submitter = Arc::new(submitter);
        let dispatcher = ActionDispatcher::new(
            Arc::new(registry),
            Arc::clone(&submitter),
            DispatchConfig::new(VAULT),
        );
        (dispatcher, submitter)
    }

    fn args(value: Value) -> RawArgs {
        value.as_object().cloned().unwrap()
    }

    fn valid_args(name: &str) -> RawArgs {
        args(match name {
            PROPOSE => json!({
                "token": "0x0000000000000000000000000000000000000000",
                "amount": "0.1",
                "to": RECIPIENT,
                "reason": "test",
            }),
            VOTE_ON_PROPOSAL => json!({ "proposalId": 1, "support": true }),
            EXECUTE_PROPOSAL => json!({ "proposalId": "1" }),
            ADD_MEMBER => json!({ "newMember": MEMBER }),
            REMOVE_MEMBER => json!({ "member": MEMBER }),
            SET_MIN_VOTES => json!({ "minVotes": 3 }),
            SET_VOTING_PERIOD => json!({ "period": 86400 }),
            other => panic!("no fixture for {other}"),
        })
    }

    #[test]
    fn test_registry_contains_every_vault_action() {
        let registry = vault_registry(VaultActionOptions::default()).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            [
                PROPOSE,
                VOTE_ON_PROPOSAL,
                EXECUTE_PROPOSAL,
                ADD_MEMBER,
                REMOVE_MEMBER,
                SET_MIN_VOTES,
                SET_VOTING_PERIOD
            ]
        );
    }

    #[tokio::test]
    async fn test_every_action_submits_exactly_once() {
        let registry = vault_registry(VaultActionOptions::default()).unwrap();
        for name in registry.names() {
            let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
            let dispatched = dispatcher.dispatch(name, &valid_args(name)).await.unwrap();
            assert_eq!(dispatched.tx_hash, HASH, "{name}");
            assert_eq!(dispatched.action, name);
            let calls = submitter.calls();
            assert_eq!(calls.len(), 1, "{name}");
            assert_eq!(calls[0].to(), VAULT, "{name}");
            assert_eq!(calls[0].value(), U256::ZERO, "{name}");
        }
    }

    #[tokio::test]
    async fn test_propose_scales_amount_and_targets_vault() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        dispatcher
            .dispatch(PROPOSE, &valid_args(PROPOSE))
            .await
            .unwrap();
        let calls = submitter.calls();
        let decoded = IMultiMemberVault::proposeCall::abi_decode(calls[0].data()).unwrap();
        assert_eq!(decoded.token, Address::ZERO);
        assert_eq!(decoded.amount, U256::from(100_000_000_000_000_000_u64));
        assert_eq!(decoded.to, RECIPIENT.parse::<Address>().unwrap());
        assert_eq!(decoded.reason, "test");
        assert_eq!(calls[0].to(), VAULT);
        assert_eq!(calls[0].value(), U256::ZERO);
    }

    #[tokio::test]
    async fn test_vote_with_negative_id_is_rejected_before_submission() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let err = dispatcher
            .dispatch(
                VOTE_ON_PROPOSAL,
                &args(json!({ "proposalId": -1, "support": true })),
            )
            .await
            .unwrap_err();
        let ActionError::Validation(e) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(e.field, "proposalId");
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_vote_encodes_support_flag() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        dispatcher
            .dispatch(
                VOTE_ON_PROPOSAL,
                &args(json!({ "proposalId": 0, "support": "false" })),
            )
            .await
            .unwrap();
        let decoded =
            IMultiMemberVault::voteOnProposalCall::abi_decode(submitter.calls()[0].data()).unwrap();
        assert_eq!(decoded.proposalId, U256::ZERO);
        assert!(!decoded.support);
    }

    #[tokio::test]
    async fn test_min_votes_must_be_positive() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let err = dispatcher
            .dispatch(SET_MIN_VOTES, &args(json!({ "minVotes": 0 })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(submitter.calls().is_empty());

        dispatcher
            .dispatch(SET_MIN_VOTES, &args(json!({ "minVotes": 3 })))
            .await
            .unwrap();
        let calls = submitter.calls();
        assert_eq!(calls.len(), 1);
        let decoded = IMultiMemberVault::setMinVotesCall::abi_decode(calls[0].data()).unwrap();
        assert_eq!(decoded.minVotes, U256::from(3));
    }

    #[tokio::test]
    async fn test_voting_period_must_be_positive() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let err = dispatcher
            .dispatch(SET_VOTING_PERIOD, &args(json!({ "period": "0" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_member_addresses_are_checksum_validated() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let broken = MEMBER.replacen('a', "A", 1);
        let err = dispatcher
            .dispatch(ADD_MEMBER, &args(json!({ "newMember": broken })))
            .await
            .unwrap_err();
        let ActionError::Validation(e) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(e.field, "newMember");
        assert_eq!(e.reason, ValidationReason::InvalidAddress("checksum mismatch"));
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_target_cannot_be_redirected_by_arguments() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let mut raw = valid_args(EXECUTE_PROPOSAL);
        raw.insert("target".to_owned(), json!(RECIPIENT));
        let err = dispatcher
            .dispatch(EXECUTE_PROPOSAL, &raw)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_never_reaches_submitter() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter::default());
        let err = dispatcher
            .dispatch("createProposal", &valid_args(PROPOSE))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAction);
        assert!(submitter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submitter_timeout_is_sanitized() {
        let (dispatcher, submitter) = dispatcher(MockSubmitter {
            fail: true,
            ..MockSubmitter::default()
        });
        let result = dispatcher
            .dispatch(EXECUTE_PROPOSAL, &valid_args(EXECUTE_PROPOSAL))
            .await;
        let response = ActionResponse::from(result);
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::SubmissionError));
        let message = response.message.unwrap();
        for leaked in ["infura", "abcdef0123", "deadline", "Timeout", "Post"] {
            assert!(!message.contains(leaked), "leaked {leaked:?} in {message:?}");
        }
        assert_eq!(submitter.calls().len(), 1);
    }

    #[test]
    fn test_reason_length_cap() {
        let registry = vault_registry(VaultActionOptions {
            max_reason_len: Some(4),
        })
        .unwrap();
        let definition = registry.lookup(PROPOSE).unwrap();
        let mut raw = valid_args(PROPOSE);
        assert!(definition.validate(&raw, 18).is_ok());
        raw.insert("reason".to_owned(), json!("longer"));
        assert_eq!(
            definition.validate(&raw, 18).unwrap_err().reason,
            ValidationReason::TooLong { max: 4 }
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let definition = propose(None);
        let raw = valid_args(PROPOSE);
        assert_eq!(
            definition.validate(&raw, 18).unwrap(),
            definition.validate(&raw, 18).unwrap()
        );
    }
}
