//! `ffsplit`: fifty-fifty split.
//!
//! The server grants the vote to the partition with more nodes, or breaks
//! an exact 50:50 tie. The device only has to keep the server's view of
//! membership current: it pauses vote casting whenever membership changes
//! and resumes, by asking for the vote again, once the server acknowledges
//! the new list for the current ring. A current ask-for-vote reply for an
//! acknowledged view is taken as the server's grant. Without a server it
//! cannot know which half it is in, so it votes `No` while disconnected.

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

const NAME: &str = "ffsplit";

/// Private state of the `ffsplit` policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfsplitState {
    /// A membership change has not been acknowledged by the server yet.
    pub membership_pending: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FfsplitAlgorithm;

impl DecisionAlgorithm for FfsplitAlgorithm {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        instance.set_private(FfsplitState::default());
        Ok(())
    }

    fn connected(
        &self,
        instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome> {
        let state = state_mut::<FfsplitState>(instance, NAME, Operation::Connected)?;
        state.membership_pending = true;

        // Quorum lists are irrelevant to a split decision.
        Ok(ConnectedOutcome {
            send_config_node_list: true,
            send_membership_node_list: true,
            send_quorum_node_list: false,
            vote: VoteDecision::AskLater,
        })
    }

    fn config_node_list_changed(
        &self,
        instance: &mut DeviceInstance,
        _node_list: &NodeList,
        _config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome> {
        state_mut::<FfsplitState>(instance, NAME, Operation::ConfigNodeListChanged)?;
        Ok(NodeListOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
        })
    }

    fn votequorum_node_list_notify(
        &self,
        instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
    ) -> AlgorithmResult<NodeListNotifyOutcome> {
        let state = state_mut::<FfsplitState>(instance, NAME, Operation::VotequorumNodeListNotify)?;
        state.membership_pending = true;
        debug!(
            algorithm = NAME,
            %ring_id,
            nodes = node_list.len(),
            "membership changed, pausing vote"
        );
        Ok(NodeListNotifyOutcome {
            pause_cast_vote_timer: true,
            vote: VoteDecision::NoChange,
        })
    }

    fn votequorum_node_list_heuristics_notify(
        &self,
        instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome> {
        let state = state_mut::<FfsplitState>(
            instance,
            NAME,
            Operation::VotequorumNodeListHeuristicsNotify,
        )?;
        state.membership_pending = true;
        Ok(HeuristicsNotifyOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
            heuristics,
        })
    }

    fn votequorum_quorum_notify(
        &self,
        instance: &mut DeviceInstance,
        _quorate: bool,
        _node_list: &[VotequorumNode],
    ) -> AlgorithmResult<NodeListOutcome> {
        state_mut::<FfsplitState>(instance, NAME, Operation::VotequorumQuorumNotify)?;
        Ok(NodeListOutcome::default())
    }

    fn votequorum_expected_votes_notify(
        &self,
        instance: &mut DeviceInstance,
        _expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<FfsplitState>(instance, NAME, Operation::VotequorumExpectedVotesNotify)?;
        Ok(VoteDecision::NoChange)
    }

    fn config_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        initial: bool,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<FfsplitState>(instance, NAME, Operation::ConfigNodeListReplyReceived)?;
        if !is_current_reply(instance, NAME, RequestKind::ConfigNodeList, seq_number, ring_id) {
            return Ok(VoteDecision::NoChange);
        }
        // The server can only split once it knows the configured nodes.
        if initial {
            return Ok(VoteDecision::AskLater);
        }
        Ok(VoteDecision::NoChange)
    }

    fn membership_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        let current = is_current_reply(
            instance,
            NAME,
            RequestKind::MembershipNodeList,
            seq_number,
            ring_id,
        );
        let state = state_mut::<FfsplitState>(
            instance,
            NAME,
            Operation::MembershipNodeListReplyReceived,
        )?;
        if !current || !state.membership_pending {
            return Ok(VoteDecision::NoChange);
        }
        state.membership_pending = false;
        debug!(algorithm = NAME, seq_number, "membership acknowledged, resuming vote");
        Ok(VoteDecision::AskLater)
    }

    fn quorum_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<FfsplitState>(instance, NAME, Operation::QuorumNodeListReplyReceived)?;
        is_current_reply(instance, NAME, RequestKind::QuorumNodeList, seq_number, ring_id);
        Ok(VoteDecision::NoChange)
    }

    fn ask_for_vote_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        let current =
            is_current_reply(instance, NAME, RequestKind::AskForVote, seq_number, ring_id);
        let state =
            state_mut::<FfsplitState>(instance, NAME, Operation::AskForVoteReplyReceived)?;
        // Answers for an unacknowledged view are superseded by the re-ask.
        if !current || state.membership_pending {
            return Ok(VoteDecision::NoChange);
        }
        Ok(VoteDecision::Yes)
    }

    fn vote_info_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<FfsplitState>(instance, NAME, Operation::VoteInfoReceived)?;
        if !instance.session.ring_matches(ring_id) {
            debug!(algorithm = NAME, seq_number, ?ring_id, "vote info for old ring");
        }
        Ok(VoteDecision::NoChange)
    }

    fn echo_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        is_expected_seq_number: bool,
    ) -> AlgorithmResult<()> {
        state_mut::<FfsplitState>(instance, NAME, Operation::EchoReplyReceived)?;
        if !is_expected_seq_number {
            debug!(algorithm = NAME, seq_number, "late echo reply");
        }
        Ok(())
    }

    fn echo_reply_not_received(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        state_mut::<FfsplitState>(instance, NAME, Operation::EchoReplyNotReceived)?;
        warn!(algorithm = NAME, "server did not answer echo");
        Ok(())
    }

    fn heuristics_change(
        &self,
        instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome> {
        state_mut::<FfsplitState>(instance, NAME, Operation::HeuristicsChange)?;
        Ok(HeuristicsChangeOutcome {
            send_msg: true,
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
        state_mut::<FfsplitState>(instance, NAME, Operation::HeuristicsChangeReplyReceived)?;
        is_current_reply(instance, NAME, RequestKind::HeuristicsChange, seq_number, ring_id);
        Ok(VoteDecision::NoChange)
    }

    fn disconnected(
        &self,
        instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> AlgorithmResult<DisconnectOutcome> {
        state_mut::<FfsplitState>(instance, NAME, Operation::Disconnected)?;
        info!(algorithm = NAME, ?reason, "disconnected, withdrawing vote");
        Ok(DisconnectOutcome {
            try_reconnect: reason.try_reconnect(),
            vote: VoteDecision::No,
        })
    }

    fn destroy(&self, instance: &mut DeviceInstance) {
        instance.take_private::<FfsplitState>();
    }
}
