//! Solidity interface of the multi-member vault.
//!
//! Only the state-changing entry points the agent drives are declared.
//! Membership, quorum, and voting-period rules are enforced by the
//! contract itself.

use alloy_sol_types::sol;

sol! {
    /// Governance surface of the multi-member vault contract.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMultiMemberVault {
        function propose(address token, uint256 amount, address to, string reason) external returns (uint256 proposalId);
        function voteOnProposal(uint256 proposalId, bool support) external;
        function executeProposal(uint256 proposalId) external;
        function addMember(address newMember) external;
        function removeMember(address member) external;
        function setMinVotes(uint256 minVotes) external;
        function setVotingPeriod(uint256 period) external;
    }
}
