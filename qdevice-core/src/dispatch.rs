//! Dispatcher: validated indirection from the network engine to the
//! instance's selected algorithm.
//!
//! Every entry point resolves `instance.algorithm()` against the frozen
//! registry and forwards inputs and outputs unchanged. No decision logic
//! lives here. An unresolved id yields
//! [`DispatchError::InvalidSelection`] without touching any descriptor;
//! turning that into process termination is the caller's job.

use crate::algorithm::{
    ConnectedOutcome, DecisionAlgorithm, DisconnectOutcome, HeuristicsChangeOutcome,
    HeuristicsNotifyOutcome, NodeListNotifyOutcome, NodeListOutcome, Operation,
};
use crate::errors::{DispatchError, InvalidSelection};
use crate::instance::DeviceInstance;
use crate::registry::AlgorithmRegistry;
use crate::types::{
    DisconnectReason, HeuristicsState, NodeList, RingId, VoteDecision, VotequorumNode,
};

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Forwards engine events to registered algorithms.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r AlgorithmRegistry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r AlgorithmRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the descriptor for `instance`.
    ///
    /// # Errors
    /// [`InvalidSelection`] if the id is out of range or unbound.
    pub fn resolve(
        &self,
        instance: &DeviceInstance,
        operation: Operation,
    ) -> Result<&'r dyn DecisionAlgorithm, InvalidSelection> {
        self.registry
            .lookup(instance.algorithm())
            .ok_or(InvalidSelection {
                algorithm: instance.algorithm(),
                operation,
            })
    }

    pub fn init(&self, instance: &mut DeviceInstance) -> DispatchResult<()> {
        let algorithm = self.resolve(instance, Operation::Init)?;
        Ok(algorithm.init(instance)?)
    }

    pub fn connected(
        &self,
        instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> DispatchResult<ConnectedOutcome> {
        let algorithm = self.resolve(instance, Operation::Connected)?;
        Ok(algorithm.connected(instance, heuristics)?)
    }

    pub fn config_node_list_changed(
        &self,
        instance: &mut DeviceInstance,
        node_list: &NodeList,
        config_version: Option<u64>,
    ) -> DispatchResult<NodeListOutcome> {
        let algorithm = self.resolve(instance, Operation::ConfigNodeListChanged)?;
        Ok(algorithm.config_node_list_changed(instance, node_list, config_version)?)
    }

    pub fn votequorum_node_list_notify(
        &self,
        instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
    ) -> DispatchResult<NodeListNotifyOutcome> {
        let algorithm = self.resolve(instance, Operation::VotequorumNodeListNotify)?;
        Ok(algorithm.votequorum_node_list_notify(instance, ring_id, node_list)?)
    }

    pub fn votequorum_node_list_heuristics_notify(
        &self,
        instance: &mut DeviceInstance,
        ring_id: RingId,
        node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> DispatchResult<HeuristicsNotifyOutcome> {
        let algorithm = self.resolve(instance, Operation::VotequorumNodeListHeuristicsNotify)?;
        Ok(algorithm.votequorum_node_list_heuristics_notify(
            instance, ring_id, node_list, heuristics,
        )?)
    }

    pub fn votequorum_quorum_notify(
        &self,
        instance: &mut DeviceInstance,
        quorate: bool,
        node_list: &[VotequorumNode],
    ) -> DispatchResult<NodeListOutcome> {
        let algorithm = self.resolve(instance, Operation::VotequorumQuorumNotify)?;
        Ok(algorithm.votequorum_quorum_notify(instance, quorate, node_list)?)
    }

    pub fn votequorum_expected_votes_notify(
        &self,
        instance: &mut DeviceInstance,
        expected_votes: u32,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::VotequorumExpectedVotesNotify)?;
        Ok(algorithm.votequorum_expected_votes_notify(instance, expected_votes)?)
    }

    pub fn config_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        initial: bool,
        ring_id: Option<RingId>,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::ConfigNodeListReplyReceived)?;
        Ok(algorithm.config_node_list_reply_received(instance, seq_number, initial, ring_id)?)
    }

    pub fn membership_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::MembershipNodeListReplyReceived)?;
        Ok(algorithm.membership_node_list_reply_received(instance, seq_number, ring_id)?)
    }

    pub fn quorum_node_list_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::QuorumNodeListReplyReceived)?;
        Ok(algorithm.quorum_node_list_reply_received(instance, seq_number, ring_id)?)
    }

    pub fn ask_for_vote_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::AskForVoteReplyReceived)?;
        Ok(algorithm.ask_for_vote_reply_received(instance, seq_number, ring_id)?)
    }

    pub fn vote_info_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::VoteInfoReceived)?;
        Ok(algorithm.vote_info_received(instance, seq_number, ring_id)?)
    }

    pub fn echo_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        is_expected_seq_number: bool,
    ) -> DispatchResult<()> {
        let algorithm = self.resolve(instance, Operation::EchoReplyReceived)?;
        Ok(algorithm.echo_reply_received(instance, seq_number, is_expected_seq_number)?)
    }

    pub fn echo_reply_not_received(&self, instance: &mut DeviceInstance) -> DispatchResult<()> {
        let algorithm = self.resolve(instance, Operation::EchoReplyNotReceived)?;
        Ok(algorithm.echo_reply_not_received(instance)?)
    }

    pub fn heuristics_change(
        &self,
        instance: &mut DeviceInstance,
        heuristics: HeuristicsState,
    ) -> DispatchResult<HeuristicsChangeOutcome> {
        let algorithm = self.resolve(instance, Operation::HeuristicsChange)?;
        Ok(algorithm.heuristics_change(instance, heuristics)?)
    }

    pub fn heuristics_change_reply_received(
        &self,
        instance: &mut DeviceInstance,
        seq_number: u32,
        ring_id: Option<RingId>,
        heuristics: HeuristicsState,
    ) -> DispatchResult<VoteDecision> {
        let algorithm = self.resolve(instance, Operation::HeuristicsChangeReplyReceived)?;
        Ok(algorithm.heuristics_change_reply_received(instance, seq_number, ring_id, heuristics)?)
    }

    pub fn disconnected(
        &self,
        instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> DispatchResult<DisconnectOutcome> {
        let algorithm = self.resolve(instance, Operation::Disconnected)?;
        Ok(algorithm.disconnected(instance, reason)?)
    }

    pub fn destroy(&self, instance: &mut DeviceInstance) -> DispatchResult<()> {
        let algorithm = self.resolve(instance, Operation::Destroy)?;
        algorithm.destroy(instance);
        Ok(())
    }
}
