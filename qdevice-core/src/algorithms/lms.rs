//! `lms`: last-man-standing.
//!
//! The server keeps giving its vote to the partition that holds quorum
//! as nodes drop away one by one. Locally the policy remembers whether
//! the node is quorate and the current expected votes. While cut off from
//! the server it keeps voting only if it was quorate and the cluster does
//! not run with `wait_for_all`, which would otherwise let a restarted
//! partition claim quorum it never had.
//!
//! A current quorum-list or ask-for-vote reply settles the vote from the
//! quorate flag. A change in expected votes invalidates the server's last
//! answer, so the policy asks again.

use tracing::{debug, info, warn};

use super::{is_current_reply, state_mut};
use crate::algorithm::{
    AlgorithmResult, ConnectedOutcome, DecisionAlgorithm, DisconnectOutcome,
    HeuristicsChangeOutcome, HeuristicsNotifyOutcome, NodeListNotifyOutcome, NodeListOutcome,
    Operation,
};
use crate::instance::DeviceInstance;
use crate::types::{
    DisconnectReason, HeuristicsState, NodeList, RequestKind, RingId, VoteDecision,
    VotequorumNode,
};

const NAME: &str = "lms";

/// Private state of the `lms` policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LmsState {
    pub quorate: bool,
    /// Copied from instance options at `init`.
    pub wait_for_all: bool,
    pub expected_votes: Option<u32>,
}

impl LmsState {
    fn quorate_vote(&self) -> VoteDecision {
        if self.quorate {
            VoteDecision::Yes
        } else {
            VoteDecision::No
        }
    }

    fn disconnected_vote(&self) -> VoteDecision {
        if !self.quorate || self.wait_for_all {
            VoteDecision::No
        } else {
            VoteDecision::NoChange
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LmsAlgorithm;

impl LmsAlgorithm {
    fn reply(
        instance: &mut DeviceInstance,
        operation: Operation,
        kind: RequestKind,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        let current = is_current_reply(instance, NAME, kind, seq_number, ring_id);
        let state = state_mut::<LmsState>(instance, NAME, operation)?;
        match kind {
            RequestKind::QuorumNodeList | RequestKind::AskForVote if current => {
                Ok(state.quorate_vote())
            }
            _ => Ok(VoteDecision::NoChange),
        }
    }
}

impl DecisionAlgorithm for LmsAlgorithm {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        let wait_for_all = instance.options.wait_for_all;
        instance.set_private(LmsState {
            wait_for_all,
            ..LmsState::default()
        });
        debug!(algorithm = NAME, wait_for_all, "initialized");
        Ok(())
    }

    fn connected(
        &self,
        instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome> {
        state_mut::<LmsState>(instance, NAME, Operation::Connected)?;
        Ok(ConnectedOutcome {
            send_config_node_list: true,
            send_membership_node_list: true,
            send_quorum_node_list: true,
            vote: VoteDecision::AskLater,
        })
    }

    fn config_node_list_changed(
        &self,
        instance: &mut DeviceInstance,
        _node_list: &NodeList,
        _config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome> {
        state_mut::<LmsState>(instance, NAME, Operation::ConfigNodeListChanged)?;
        Ok(NodeListOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
        })
    }

    fn votequorum_node_list_notify(
        &self,
        instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
    ) -> AlgorithmResult<NodeListNotifyOutcome> {
        state_mut::<LmsState>(instance, NAME, Operation::VotequorumNodeListNotify)?;
        Ok(NodeListNotifyOutcome::default())
    }

    fn votequorum_node_list_heuristics_notify(
        &self,
        instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome> {
        state_mut::<LmsState>(instance, NAME, Operation::VotequorumNodeListHeuristicsNotify)?;
        Ok(HeuristicsNotifyOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
            heuristics,
        })
    }

    fn votequorum_quorum_notify(
        &self,
        instance: &mut DeviceInstance,
        quorate: bool,
        node_list: &[VotequorumNode],
    ) -> AlgorithmResult<NodeListOutcome> {
        let state = state_mut::<LmsState>(instance, NAME, Operation::VotequorumQuorumNotify)?;
        state.quorate = quorate;
        debug!(algorithm = NAME, quorate, nodes = node_list.len(), "quorum notify");
        Ok(NodeListOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
        })
    }

    fn votequorum_expected_votes_notify(
        &self,
        instance: &mut DeviceInstance,
        expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision> {
        let state =
            state_mut::<LmsState>(instance, NAME, Operation::VotequorumExpectedVotesNotify)?;
        let previous = state.expected_votes.replace(expected_votes);
        match previous {
            Some(previous) if previous != expected_votes => {
                debug!(algorithm = NAME, previous, expected_votes, "expected votes changed");
                Ok(VoteDecision::AskLater)
            }
            _ => Ok(VoteDecision::NoChange),
        }
    }

    fn config_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        _initial: bool,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Self::reply(
            instance,
            Operation::ConfigNodeListReplyReceived,
            RequestKind::ConfigNodeList,
            seq_number,
            ring_id,
        )
    }

    fn membership_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Self::reply(
            instance,
            Operation::MembershipNodeListReplyReceived,
            RequestKind::MembershipNodeList,
            seq_number,
            ring_id,
        )
    }

    fn quorum_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Self::reply(
            instance,
            Operation::QuorumNodeListReplyReceived,
            RequestKind::QuorumNodeList,
            seq_number,
            ring_id,
        )
    }

    fn ask_for_vote_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Self::reply(
            instance,
            Operation::AskForVoteReplyReceived,
            RequestKind::AskForVote,
            seq_number,
            ring_id,
        )
    }

    fn vote_info_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<LmsState>(instance, NAME, Operation::VoteInfoReceived)?;
        if !instance.session.ring_matches(ring_id) {
            debug!(algorithm = NAME, seq_number, ?ring_id, "vote info for old ring");
        }
        Ok(VoteDecision::NoChange)
    }

    fn echo_reply_received(
        &self,
        instance: &mut DeviceInstance,
        _seq_number: u32,
        _is_expected_seq_number: bool,
    ) -> AlgorithmResult<()> {
        state_mut::<LmsState>(instance, NAME, Operation::EchoReplyReceived)?;
        Ok(())
    }

    fn echo_reply_not_received(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        let state = state_mut::<LmsState>(instance, NAME, Operation::EchoReplyNotReceived)?;
        if state.disconnected_vote() == VoteDecision::No {
            warn!(
                algorithm = NAME,
                quorate = state.quorate,
                wait_for_all = state.wait_for_all,
                "echo reply not received, vote will be withdrawn on disconnect"
            );
        }
        Ok(())
    }

    fn heuristics_change(
        &self,
        instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome> {
        state_mut::<LmsState>(instance, NAME, Operation::HeuristicsChange)?;
        Ok(HeuristicsChangeOutcome {
            send_msg: instance.session.heuristics != heuristics,
            vote: VoteDecision::NoChange,
        })
    }

    fn heuristics_change_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<VoteDecision> {
        Self::reply(
            instance,
            Operation::HeuristicsChangeReplyReceived,
            RequestKind::HeuristicsChange,
            seq_number,
            ring_id,
        )
    }

    fn disconnected(
        &self,
        instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> AlgorithmResult<DisconnectOutcome> {
        let state = state_mut::<LmsState>(instance, NAME, Operation::Disconnected)?;
        let vote = state.disconnected_vote();
        info!(
            algorithm = NAME,
            ?reason,
            quorate = state.quorate,
            wait_for_all = state.wait_for_all,
            ?vote,
            "disconnected"
        );
        Ok(DisconnectOutcome {
            try_reconnect: reason.try_reconnect(),
            vote,
        })
    }

    fn destroy(&self, instance: &mut DeviceInstance) {
        instance.take_private::<LmsState>();
    }
}
