//! One arbitration session driven through the dispatcher.
//!
//! [`Session`] plays the network engine's part for a single
//! [`DeviceInstance`]: it keeps the session bookkeeping current, routes
//! every event through the [`Dispatcher`] and [`FailFast`], and runs
//! `destroy` exactly once, either from [`Session::close`] or on drop.

use qdevice_core::{
    AlgorithmError, AlgorithmId, AlgorithmRegistry, ConnectedOutcome, DeviceInstance,
    DisconnectOutcome, DisconnectReason, Dispatcher, HeuristicsChangeOutcome,
    HeuristicsNotifyOutcome, HeuristicsState, InstanceOptions, NodeList, NodeListNotifyOutcome,
    NodeListOutcome, RequestKind, RingId, SessionState, VoteDecision, VotequorumNode,
};
use tracing::{debug, info, warn};

use crate::fatal::FailFast;

pub struct Session<'r> {
    dispatcher: Dispatcher<'r>,
    fail_fast: FailFast,
    instance: DeviceInstance,
    destroyed: bool,
}

impl<'r> Session<'r> {
    /// Create the instance and run the policy's `init`.
    ///
    /// An unbound `algorithm` diverges through `fail_fast`. If `init`
    /// itself fails, `destroy` is run before the error is returned.
    pub fn open(
        registry: &'r AlgorithmRegistry,
        algorithm: AlgorithmId,
        options: InstanceOptions,
        fail_fast: FailFast,
    ) -> Result<Self, AlgorithmError> {
        let dispatcher = Dispatcher::new(registry);
        let mut instance = DeviceInstance::with_options(algorithm, options);

        if let Err(err) = fail_fast.check(dispatcher.init(&mut instance)) {
            warn!(%algorithm, error = %err, "init failed");
            fail_fast.check(dispatcher.destroy(&mut instance))?;
            return Err(err);
        }
        info!(%algorithm, wait_for_all = options.wait_for_all, "session opened");

        Ok(Self {
            dispatcher,
            fail_fast,
            instance,
            destroyed: false,
        })
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.instance.algorithm()
    }

    pub fn instance(&self) -> &DeviceInstance {
        &self.instance
    }

    pub fn state(&self) -> &SessionState {
        &self.instance.session
    }

    /// Note that a request of `kind` went out with `seq_number`.
    pub fn record_sent(&mut self, kind: RequestKind, seq_number: u32) {
        self.instance.session.record_sent(kind, seq_number);
    }

    fn cast(&mut self, vote: VoteDecision) -> VoteDecision {
        if vote.is_change() && self.instance.session.pending_vote != vote {
            debug!(algorithm = %self.algorithm(), ?vote, "vote changed");
            self.instance.session.pending_vote = vote;
        }
        vote
    }

    pub fn connected(
        &mut self,
        heuristics: HeuristicsState,
    ) -> Result<ConnectedOutcome, AlgorithmError> {
        let outcome = self
            .fail_fast
            .check(self.dispatcher.connected(&mut self.instance, heuristics))?;
        self.instance.session.heuristics = heuristics;
        self.cast(outcome.vote);
        Ok(outcome)
    }

    pub fn config_node_list_changed(
        &mut self,
        node_list: &NodeList,
        config_version: Option<u64>,
    ) -> Result<NodeListOutcome, AlgorithmError> {
        let outcome = self.fail_fast.check(self.dispatcher.config_node_list_changed(
            &mut self.instance,
            node_list,
            config_version,
        ))?;
        self.cast(outcome.vote);
        Ok(outcome)
    }

    /// Membership changed. The new ring id becomes current once the
    /// policy has seen the event.
    pub fn votequorum_node_list_notify(
        &mut self,
        ring_id: RingId,
        node_list: &NodeList,
    ) -> Result<NodeListNotifyOutcome, AlgorithmError> {
        let outcome = self.fail_fast.check(self.dispatcher.votequorum_node_list_notify(
            &mut self.instance,
            ring_id,
            node_list,
        ))?;
        self.instance.session.ring_id = Some(ring_id);
        self.cast(outcome.vote);
        Ok(outcome)
    }

    /// Membership changed with a fresh heuristics result. The policy may
    /// override that result; whatever it returns becomes current.
    pub fn votequorum_node_list_heuristics_notify(
        &mut self,
        ring_id: RingId,
        node_list: &NodeList,
        heuristics: HeuristicsState,
    ) -> Result<HeuristicsNotifyOutcome, AlgorithmError> {
        let outcome =
            self.fail_fast
                .check(self.dispatcher.votequorum_node_list_heuristics_notify(
                    &mut self.instance,
                    ring_id,
                    node_list,
                    heuristics,
                ))?;
        self.instance.session.ring_id = Some(ring_id);
        self.instance.session.heuristics = outcome.heuristics;
        self.cast(outcome.vote);
        Ok(outcome)
    }

    pub fn votequorum_quorum_notify(
        &mut self,
        quorate: bool,
        node_list: &[VotequorumNode],
    ) -> Result<NodeListOutcome, AlgorithmError> {
        let outcome = self.fail_fast.check(self.dispatcher.votequorum_quorum_notify(
            &mut self.instance,
            quorate,
            node_list,
        ))?;
        self.cast(outcome.vote);
        Ok(outcome)
    }

    pub fn votequorum_expected_votes_notify(
        &mut self,
        expected_votes: u32,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self.fail_fast.check(
            self.dispatcher
                .votequorum_expected_votes_notify(&mut self.instance, expected_votes),
        )?;
        Ok(self.cast(vote))
    }

    pub fn config_node_list_reply_received(
        &mut self,
        seq_number: u32,
        initial: bool,
        ring_id: Option<RingId>,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self.fail_fast.check(self.dispatcher.config_node_list_reply_received(
            &mut self.instance,
            seq_number,
            initial,
            ring_id,
        ))?;
        Ok(self.cast(vote))
    }

    pub fn membership_node_list_reply_received(
        &mut self,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self
            .fail_fast
            .check(self.dispatcher.membership_node_list_reply_received(
                &mut self.instance,
                seq_number,
                ring_id,
            ))?;
        Ok(self.cast(vote))
    }

    pub fn quorum_node_list_reply_received(
        &mut self,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self.fail_fast.check(self.dispatcher.quorum_node_list_reply_received(
            &mut self.instance,
            seq_number,
            ring_id,
        ))?;
        Ok(self.cast(vote))
    }

    pub fn ask_for_vote_reply_received(
        &mut self,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self.fail_fast.check(self.dispatcher.ask_for_vote_reply_received(
            &mut self.instance,
            seq_number,
            ring_id,
        ))?;
        Ok(self.cast(vote))
    }

    pub fn vote_info_received(
        &mut self,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self.fail_fast.check(self.dispatcher.vote_info_received(
            &mut self.instance,
            seq_number,
            ring_id,
        ))?;
        Ok(self.cast(vote))
    }

    pub fn echo_reply_received(
        &mut self,
        seq_number: u32,
        is_expected_seq_number: bool,
    ) -> Result<(), AlgorithmError> {
        self.fail_fast.check(self.dispatcher.echo_reply_received(
            &mut self.instance,
            seq_number,
            is_expected_seq_number,
        ))
    }

    pub fn echo_reply_not_received(&mut self) -> Result<(), AlgorithmError> {
        self.fail_fast
            .check(self.dispatcher.echo_reply_not_received(&mut self.instance))
    }

    /// Local heuristics changed. When the policy asks for the change to be
    /// sent, it becomes the last reported result.
    pub fn heuristics_change(
        &mut self,
        heuristics: HeuristicsState,
    ) -> Result<HeuristicsChangeOutcome, AlgorithmError> {
        let outcome = self
            .fail_fast
            .check(self.dispatcher.heuristics_change(&mut self.instance, heuristics))?;
        if outcome.send_msg {
            self.instance.session.heuristics = heuristics;
        }
        self.cast(outcome.vote);
        Ok(outcome)
    }

    pub fn heuristics_change_reply_received(
        &mut self,
        seq_number: u32,
        ring_id: Option<RingId>,
        heuristics: HeuristicsState,
    ) -> Result<VoteDecision, AlgorithmError> {
        let vote = self
            .fail_fast
            .check(self.dispatcher.heuristics_change_reply_received(
                &mut self.instance,
                seq_number,
                ring_id,
                heuristics,
            ))?;
        Ok(self.cast(vote))
    }

    pub fn disconnected(
        &mut self,
        reason: DisconnectReason,
    ) -> Result<DisconnectOutcome, AlgorithmError> {
        let outcome = self
            .fail_fast
            .check(self.dispatcher.disconnected(&mut self.instance, reason))?;
        info!(
            algorithm = %self.algorithm(),
            ?reason,
            try_reconnect = outcome.try_reconnect,
            vote = ?outcome.vote,
            "disconnected"
        );
        self.cast(outcome.vote);
        Ok(outcome)
    }

    /// Release the policy's private state and end the session.
    pub fn close(mut self) {
        self.destroy_once();
    }

    fn destroy_once(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Err(err) = self
            .fail_fast
            .check(self.dispatcher.destroy(&mut self.instance))
        {
            warn!(algorithm = %self.algorithm(), error = %err, "destroy failed");
        }
        debug!(algorithm = %self.algorithm(), "session closed");
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.destroy_once();
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance", &self.instance)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
