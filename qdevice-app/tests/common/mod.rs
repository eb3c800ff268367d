//! Counting descriptor for session lifecycle tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use qdevice_core::{
    AlgorithmError, AlgorithmId, AlgorithmRegistry, AlgorithmResult, ConnectedOutcome,
    DecisionAlgorithm, DeviceInstance, DisconnectOutcome, DisconnectReason,
    HeuristicsChangeOutcome, HeuristicsNotifyOutcome, HeuristicsState, NodeList,
    NodeListNotifyOutcome, NodeListOutcome, Operation, RegistryBuilder, RingId, VoteDecision,
    VotequorumNode,
};

/// Counts `init` and `destroy`; every event returns defaults.
#[derive(Debug, Default)]
pub struct CountingAlgorithm {
    pub inits: AtomicUsize,
    pub destroys: AtomicUsize,
    pub fail_init: bool,
}

impl CountingAlgorithm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_init() -> Arc<Self> {
        Arc::new(Self {
            fail_init: true,
            ..Self::default()
        })
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

/// Registry with `algorithm` bound at the test id.
pub fn registry_with(algorithm: Arc<CountingAlgorithm>) -> AlgorithmRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .register(AlgorithmId::TEST, algorithm)
        .expect("test id is in range");
    builder.build()
}

impl DecisionAlgorithm for CountingAlgorithm {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn init(&self, instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        instance.set_private(0u64);
        if self.fail_init {
            return Err(AlgorithmError::Rejected {
                algorithm: "counting",
                operation: Operation::Init,
                reason: "refusing to start".into(),
            });
        }
        Ok(())
    }

    fn connected(
        &self,
        _instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<ConnectedOutcome> {
        Ok(ConnectedOutcome::default())
    }

    fn config_node_list_changed(
        &self,
        _instance: &mut DeviceInstance,
        _node_list: &NodeList,
        _config_version: Option<u64>,
    ) -> AlgorithmResult<NodeListOutcome> {
        Ok(NodeListOutcome::default())
    }

    fn votequorum_node_list_notify(
        &self,
        _instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
    ) -> AlgorithmResult<NodeListNotifyOutcome> {
        Ok(NodeListNotifyOutcome::default())
    }

    fn votequorum_node_list_heuristics_notify(
        &self,
        _instance: &mut DeviceInstance,
        _ring_id: RingId,
        _node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsNotifyOutcome> {
        Ok(HeuristicsNotifyOutcome {
            heuristics,
            ..HeuristicsNotifyOutcome::default()
        })
    }

    fn votequorum_quorum_notify(
        &self,
        _instance: &mut DeviceInstance,
        _quorate: bool,
        _node_list: &[VotequorumNode],
    ) -> AlgorithmResult<NodeListOutcome> {
        Ok(NodeListOutcome::default())
    }

    fn votequorum_expected_votes_notify(
        &self,
        _instance: &mut DeviceInstance,
        _expected_votes: u32,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn config_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _initial: bool,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn membership_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn quorum_node_list_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn ask_for_vote_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn vote_info_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _ring_id: Option<RingId>,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn echo_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _is_expected_seq_number: bool,
    ) -> AlgorithmResult<()> {
        Ok(())
    }

    fn echo_reply_not_received(&self, _instance: &mut DeviceInstance) -> AlgorithmResult<()> {
        Ok(())
    }

    fn heuristics_change(
        &self,
        _instance: &mut DeviceInstance,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<HeuristicsChangeOutcome> {
        Ok(HeuristicsChangeOutcome::default())
    }

    fn heuristics_change_reply_received(
        &self,
        _instance: &mut DeviceInstance,
        _seq_number: u32,
        _ring_id: Option<RingId>,
        _heuristics: HeuristicsState,
    ) -> AlgorithmResult<VoteDecision> {
        Ok(VoteDecision::NoChange)
    }

    fn disconnected(
        &self,
        _instance: &mut DeviceInstance,
        reason: DisconnectReason,
    ) -> AlgorithmResult<DisconnectOutcome> {
        Ok(DisconnectOutcome {
            try_reconnect: reason.try_reconnect(),
            vote: VoteDecision::NoChange,
        })
    }

    fn destroy(&self, instance: &mut DeviceInstance) {
        instance.take_private::<u64>();
        self.destroys.fetch_add(1, Ordering::SeqCst);
    }
}
