//! Shared test descriptors.
//!
//! `RecordingAlgorithm` captures every input it receives and answers with
//! the outcomes configured in its `Script`. Integration suites use it to
//! check that the dispatcher forwards without altering anything.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use qdevice_core::{
    AlgorithmError, AlgorithmResult, ConnectedOutcome, DecisionAlgorithm, DeviceInstance,
    DisconnectOutcome, DisconnectReason, HeuristicsChangeOutcome, HeuristicsNotifyOutcome,
    HeuristicsState, NodeList, NodeListNotifyOutcome, NodeListOutcome, Operation, RingId,
    VoteDecision, VotequorumNode,
};

/// One captured call with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    Connected(HeuristicsState),
    ConfigNodeListChanged(NodeList, Option<u64>),
    VotequorumNodeListNotify(RingId, NodeList),
    VotequorumNodeListHeuristicsNotify(RingId, NodeList, HeuristicsState),
    VotequorumQuorumNotify(bool, Vec<VotequorumNode>),
    VotequorumExpectedVotesNotify(u32),
    ConfigNodeListReplyReceived(u32, bool, Option<RingId>),
    MembershipNodeListReplyReceived(u32, Option<RingId>),
    QuorumNodeListReplyReceived(u32, Option<RingId>),
    AskForVoteReplyReceived(u32, Option<RingId>),
    VoteInfoReceived(u32, Option<RingId>),
    EchoReplyReceived(u32, bool),
    EchoReplyNotReceived,
    HeuristicsChange(HeuristicsState),
    HeuristicsChangeReplyReceived(u32, Option<RingId>, HeuristicsState),
    Disconnected(DisconnectReason),
    Destroy,
}

/// Outcomes the recorder answers with.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub connected: ConnectedOutcome,
    pub node_list: NodeListOutcome,
    pub node_list_notify: NodeListNotifyOutcome,
    pub heuristics_notify: HeuristicsNotifyOutcome,
    pub heuristics_change: HeuristicsChangeOutcome,
    pub disconnect: DisconnectOutcome,
    pub vote: VoteDecision,
    /// When set, every fallible operation fails with this error.
    pub fail_with: Option<AlgorithmError>,
}

#[derive(Debug, Default)]
pub struct RecordingAlgorithm {
    pub script: Script,
    calls: Mutex<Vec<Call>>,
}

impl RecordingAlgorithm {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record<T>(&self, call: Call, output: T) -> AlgorithmResult<T> {
        self.calls.lock().unwrap().push(call);
        match &self.script.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(output),
        }
    }
}

/// Private state written by `init`, so tests can see it was called.
#[derive(Debug, PartialEq, Eq)]
pub struct RecorderState;

impl DecisionAlgorithm for RecordingAlgorithm {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        instance.set_private(RecorderState);
        self.record(Call::Init, ())
    }

    fn connected(
        &self,
        _instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome> {
        self.record(Call::Connected(heuristics), self.script.connected)
    }

    fn config_node_list_changed(
        &self,
        _instance: &mut DeviceInstance,
        node_list: &NodeList,
        config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome> {
        self.record(
            Call::ConfigNodeListChanged(node_list.clone(), config_version),
            self.script.node_list,
        )
    }

    fn votequorum_node_list_notify(
        &self,
        _instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
    ) -> AlgorithmResult<NodeListNotifyOutcome> {
        self.record(
            Call::VotequorumNodeListNotify(ring_id, node_list.clone()),
            self.script.node_list_notify,
        )
    }

    fn votequorum_node_list_heuristics_notify(
        &self,
        _instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome> {
        self.record(
            Call::VotequorumNodeListHeuristicsNotify(ring_id, node_list.clone(), heuristics),
            self.script.heuristics_notify,
        )
    }

    fn votequorum_quorum_notify(
        &self,
        _instance: &mut DeviceInstance,
        quorate: bool,
        node_list: &[VotequorumNode],
    ) -> AlgorithmResult<NodeListOutcome> {
        self.record(
            Call::VotequorumQuorumNotify(quorate, node_list.to_vec()),
            self.script.node_list,
        )
    }

    fn votequorum_expected_votes_notify(
        &self,
        _instance: &mut DeviceInstance,
        expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::VotequorumExpectedVotesNotify(expected_votes),
            self.script.vote,
        )
    }

    fn config_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        initial: bool,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::ConfigNodeListReplyReceived(seq_number, initial, ring_id),
            self.script.vote,
        )
    }

    fn membership_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::MembershipNodeListReplyReceived(seq_number, ring_id),
            self.script.vote,
        )
    }

    fn quorum_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::QuorumNodeListReplyReceived(seq_number, ring_id),
            self.script.vote,
        )
    }

    fn ask_for_vote_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::AskForVoteReplyReceived(seq_number, ring_id),
            self.script.vote,
        )
    }

    fn vote_info_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(Call::VoteInfoReceived(seq_number, ring_id), self.script.vote)
    }

    fn echo_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        is_expected_seq_number: bool,
    ) -> AlgorithmResult<()> {
        self.record(Call::EchoReplyReceived(seq_number, is_expected_seq_number), ())
    }

    fn echo_reply_not_received(&self, _instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        self.record(Call::EchoReplyNotReceived, ())
    }

    fn heuristics_change(
        &self,
        _instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome> {
        self.record(
            Call::HeuristicsChange(heuristics),
            self.script.heuristics_change,
        )
    }

    fn heuristics_change_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<VoteDecision> {
        self.record(
            Call::HeuristicsChangeReplyReceived(seq_number, ring_id, heuristics),
            self.script.vote,
        )
    }

    fn disconnected(
        &self,
        _instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> AlgorithmResult<DisconnectOutcome> {
        self.record(Call::Disconnected(reason), self.script.disconnect)
    }

    fn destroy(&self, instance: &mut DeviceInstance) {
        instance.take_private::<RecorderState>();
        self.calls.lock().unwrap().push(Call::Destroy);
    }
}

/// A policy error for failure-propagation tests.
pub fn rejection() -> AlgorithmError {
    AlgorithmError::Rejected {
        algorithm: "recorder",
        operation: Operation::Connected,
        reason: "scripted failure".into(),
    }
}
