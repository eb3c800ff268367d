//! The decision-algorithm contract.
//!
//! Every policy implements [`DecisionAlgorithm`] in full: there are no
//! default methods, so a policy that misses an event does not compile.
//! Each method receives the [`DeviceInstance`] plus the event inputs and
//! returns one outcome record by value.
//!
//! # Reply correlation
//!
//! A `*_reply_received` event is meaningful only if its sequence number
//! matches the most recent request of that kind and, when a ring id is
//! supplied, that ring id equals the instance's current one. See
//! [`SessionState::is_current_reply`](crate::instance::SessionState::is_current_reply).
//! Stale replies are a no-op: the policy returns [`VoteDecision::NoChange`]
//! and does not report an error.

use std::fmt;

use crate::errors::AlgorithmError;
use crate::instance::DeviceInstance;
use crate::types::{
    DisconnectReason, HeuristicsState, NodeList, RingId, VoteDecision, VotequorumNode,
};

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Names every operation of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    Init,
    Connected,
    ConfigNodeListChanged,
    VotequorumNodeListNotify,
    VotequorumNodeListHeuristicsNotify,
    VotequorumQuorumNotify,
    VotequorumExpectedVotesNotify,
    ConfigNodeListReplyReceived,
    MembershipNodeListReplyReceived,
    QuorumNodeListReplyReceived,
    AskForVoteReplyReceived,
    VoteInfoReceived,
    EchoReplyReceived,
    EchoReplyNotReceived,
    HeuristicsChange,
    HeuristicsChangeReplyReceived,
    Disconnected,
    Destroy,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Connected => "connected",
            Operation::ConfigNodeListChanged => "config_node_list_changed",
            Operation::VotequorumNodeListNotify => "votequorum_node_list_notify",
            Operation::VotequorumNodeListHeuristicsNotify => {
                "votequorum_node_list_heuristics_notify"
            }
            Operation::VotequorumQuorumNotify => "votequorum_quorum_notify",
            Operation::VotequorumExpectedVotesNotify => "votequorum_expected_votes_notify",
            Operation::ConfigNodeListReplyReceived => "config_node_list_reply_received",
            Operation::MembershipNodeListReplyReceived => "membership_node_list_reply_received",
            Operation::QuorumNodeListReplyReceived => "quorum_node_list_reply_received",
            Operation::AskForVoteReplyReceived => "ask_for_vote_reply_received",
            Operation::VoteInfoReceived => "vote_info_received",
            Operation::EchoReplyReceived => "echo_reply_received",
            Operation::EchoReplyNotReceived => "echo_reply_not_received",
            Operation::HeuristicsChange => "heuristics_change",
            Operation::HeuristicsChangeReplyReceived => "heuristics_change_reply_received",
            Operation::Disconnected => "disconnected",
            Operation::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`DecisionAlgorithm::connected`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectedOutcome {
    pub send_config_node_list: bool,
    pub send_membership_node_list: bool,
    pub send_quorum_node_list: bool,
    pub vote: VoteDecision,
}

/// Output of events that may push a node list to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeListOutcome {
    pub send_node_list: bool,
    pub vote: VoteDecision,
}

/// Output of [`DecisionAlgorithm::votequorum_node_list_notify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeListNotifyOutcome {
    /// Stop casting the periodic vote until the server answers.
    pub pause_cast_vote_timer: bool,
    pub vote: VoteDecision,
}

/// Output of [`DecisionAlgorithm::votequorum_node_list_heuristics_notify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicsNotifyOutcome {
    pub send_node_list: bool,
    pub vote: VoteDecision,
    /// Heuristics value to report; echo the input to leave it alone.
    pub heuristics: HeuristicsState,
}

/// Output of [`DecisionAlgorithm::heuristics_change`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicsChangeOutcome {
    pub send_msg: bool,
    pub vote: VoteDecision,
}

/// Output of [`DecisionAlgorithm::disconnected`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisconnectOutcome {
    pub try_reconnect: bool,
    /// Vote to present while disconnected.
    pub vote: VoteDecision,
}

/// A pluggable quorum decision policy.
///
/// Descriptors are registered once and shared by every instance that
/// selects them, so all per-session data lives in the instance's private
/// slot, never in `self`. Calls into one instance are never concurrent.
pub trait DecisionAlgorithm: Send + Sync {
    /// Configuration name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Allocate private state. Failure is fatal to bringing the session up.
    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()>;

    fn connected(
        &self,
        instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome>;

    fn config_node_list_changed(
        &self,
        instance: &mut DeviceInstance,
        node_list: &NodeList,
        config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome>;

    fn votequorum_node_list_notify(
        &self,
        instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
    ) -> AlgorithmResult<NodeListNotifyOutcome>;

    fn votequorum_node_list_heuristics_notify(
        &self,
        instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome>;

    fn votequorum_quorum_notify(
        &self,
        instance: &mut DeviceInstance,
        quorate: bool,
        node_list: &[VotequorumNode],
    ) -> AlgorithmResult<NodeListOutcome>;

    fn votequorum_expected_votes_notify(
        &self,
        instance: &mut DeviceInstance,
        expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision>;

    /// `initial` is set for the list sent right after connecting.
    fn config_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        initial: bool,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision>;

    fn membership_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision>;

    fn quorum_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision>;

    fn ask_for_vote_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision>;

    /// Unsolicited vote info pushed by the server. Only the ring id is
    /// correlated; there is no outstanding request to match.
    fn vote_info_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision>;

    fn echo_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        is_expected_seq_number: bool,
    ) -> AlgorithmResult<()>;

    fn echo_reply_not_received(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()>;

    fn heuristics_change(
        &self,
        instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome>;

    fn heuristics_change_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<VoteDecision>;

    fn disconnected(
        &self,
        instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> AlgorithmResult<DisconnectOutcome>;

    /// Release private state. Called exactly once per instance; safe on an
    /// instance whose `init` never ran or failed.
    fn destroy(&self, instance: &mut DeviceInstance);
}
