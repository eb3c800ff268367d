//! `2nodelms`: last-man-standing for two-node clusters.
//!
//! The server hands the vote to the node that still has quorum. On the
//! device side the policy tracks whether the local node is quorate, so
//! that a node which lost the server but kept quorum keeps its vote and a
//! node that was never quorate withdraws it. A current quorum-list or
//! ask-for-vote reply settles the vote from the quorate flag.

use tracing::{debug, info};

use super::{is_current_reply, state_mut};
use crate::algorithm::{
    AlgorithmResult, ConnectedOutcome, DecisionAlgorithm, DisconnectOutcome,
    HeuristicsChangeOutcome, HeuristicsNotifyOutcome, NodeListNotifyOutcome, NodeListOutcome,
    Operation,
};
use crate::constants::TWO_NODE_LIST_LIMIT;
use crate::errors::AlgorithmError;
use crate::instance::DeviceInstance;
use crate::types::{
    DisconnectReason, HeuristicsState, NodeList, RequestKind, RingId, VoteDecision,
    VotequorumNode,
};

const NAME: &str = "2nodelms";

/// Private state of the `2nodelms` policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoNodeLmsState {
    /// Last quorate flag reported by votequorum.
    pub quorate: bool,
}

impl TwoNodeLmsState {
    fn quorate_vote(&self) -> VoteDecision {
        if self.quorate {
            VoteDecision::Yes
        } else {
            VoteDecision::No
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TwoNodeLmsAlgorithm;

impl TwoNodeLmsAlgorithm {
    fn reply(
        instance: &mut DeviceInstance,
        operation: Operation,
        kind: RequestKind,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        let current = is_current_reply(instance, NAME, kind, seq_number, ring_id);
        let state = state_mut::<TwoNodeLmsState>(instance, NAME, operation)?;
        match kind {
            RequestKind::QuorumNodeList | RequestKind::AskForVote if current => {
                Ok(state.quorate_vote())
            }
            _ => Ok(VoteDecision::NoChange),
        }
    }
}

impl DecisionAlgorithm for TwoNodeLmsAlgorithm {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        instance.set_private(TwoNodeLmsState::default());
        Ok(())
    }

    fn connected(
        &self,
        instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::Connected)?;
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
        node_list: &NodeList,
        _config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::ConfigNodeListChanged)?;
        if node_list.len() > TWO_NODE_LIST_LIMIT {
            return Err(AlgorithmError::Rejected {
                algorithm: NAME,
                operation: Operation::ConfigNodeListChanged,
                reason: format!(
                    "{} nodes configured, at most {TWO_NODE_LIST_LIMIT} supported",
                    node_list.len()
                ),
            });
        }
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
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::VotequorumNodeListNotify)?;
        Ok(NodeListNotifyOutcome::default())
    }

    fn votequorum_node_list_heuristics_notify(
        &self,
        instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome> {
        state_mut::<TwoNodeLmsState>(
            instance,
            NAME,
            Operation::VotequorumNodeListHeuristicsNotify,
        )?;
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
        let state =
            state_mut::<TwoNodeLmsState>(instance, NAME, Operation::VotequorumQuorumNotify)?;
        if state.quorate != quorate {
            debug!(algorithm = NAME, quorate, nodes = node_list.len(), "quorate changed");
        }
        state.quorate = quorate;
        Ok(NodeListOutcome {
            send_node_list: true,
            vote: VoteDecision::NoChange,
        })
    }

    fn votequorum_expected_votes_notify(
        &self,
        instance: &mut DeviceInstance,
        _expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::VotequorumExpectedVotesNotify)?;
        Ok(VoteDecision::NoChange)
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
        _seq_number: u32,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::VoteInfoReceived)?;
        Ok(VoteDecision::NoChange)
    }

    fn echo_reply_received(
        &self,
        instance: &mut DeviceInstance,
        _seq_number: u32,
        _is_expected_seq_number: bool,
    ) -> AlgorithmResult<()> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::EchoReplyReceived)?;
        Ok(())
    }

    fn echo_reply_not_received(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        let state = state_mut::<TwoNodeLmsState>(instance, NAME, Operation::EchoReplyNotReceived)?;
        info!(algorithm = NAME, quorate = state.quorate, "echo reply not received");
        Ok(())
    }

    fn heuristics_change(
        &self,
        instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome> {
        state_mut::<TwoNodeLmsState>(instance, NAME, Operation::HeuristicsChange)?;
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
        let state = state_mut::<TwoNodeLmsState>(instance, NAME, Operation::Disconnected)?;
        let vote = if state.quorate {
            VoteDecision::NoChange
        } else {
            VoteDecision::No
        };
        info!(algorithm = NAME, ?reason, quorate = state.quorate, ?vote, "disconnected");
        Ok(DisconnectOutcome {
            try_reconnect: reason.try_reconnect(),
            vote,
        })
    }

    fn destroy(&self, instance: &mut DeviceInstance) {
        instance.take_private::<TwoNodeLmsState>();
    }
}
