//! Per-connection device instance.
//!
//! The network engine owns one [`DeviceInstance`] per arbitration
//! session. It updates [`SessionState`] as it sends requests and learns
//! new ring ids; policies read that state and keep their own data in the
//! private slot between `init` and `destroy`.

use std::any::Any;

use crate::types::{AlgorithmId, HeuristicsState, RequestKind, RingId, VoteDecision};

/// Engine-maintained session bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Ring id of the current membership view, once known.
    pub ring_id: Option<RingId>,
    /// Last heuristics result reported to the server.
    pub heuristics: HeuristicsState,
    /// Vote the engine is currently casting.
    pub pending_vote: VoteDecision,
    sent: [Option<u32>; RequestKind::ALL.len()],
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sequence number of the most recent request of `kind`.
    pub fn record_sent(&mut self, kind: RequestKind, seq_number: u32) {
        self.sent[kind.slot()] = Some(seq_number);
    }

    pub fn last_sent(&self, kind: RequestKind) -> Option<u32> {
        self.sent[kind.slot()]
    }

    /// `true` if `ring_id` is absent, or equals the current ring id.
    pub fn ring_matches(&self, ring_id: Option<RingId>) -> bool {
        match ring_id {
            None => true,
            Some(ring_id) => self.ring_id == Some(ring_id),
        }
    }

    /// Reply correlation: the sequence number must match the most recent
    /// request of `kind`, and a supplied ring id must match the current one.
    pub fn is_current_reply(
        &self,
        kind: RequestKind,
        seq_number: u32,
        ring_id: Option<RingId>,
    ) -> bool {
        self.last_sent(kind) == Some(seq_number) && self.ring_matches(ring_id)
    }
}

/// Policy tunables taken from device configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceOptions {
    /// Cluster runs with votequorum `wait_for_all`.
    pub wait_for_all: bool,
}

/// One arbitration session.
pub struct DeviceInstance {
    algorithm: AlgorithmId,
    pub options: InstanceOptions,
    pub session: SessionState,
    private: Option<Box<dyn Any + Send>>,
}

impl DeviceInstance {
    pub fn new(algorithm: AlgorithmId) -> Self {
        Self::with_options(algorithm, InstanceOptions::default())
    }

    pub fn with_options(algorithm: AlgorithmId, options: InstanceOptions) -> Self {
        Self {
            algorithm,
            options,
            session: SessionState::new(),
            private: None,
        }
    }

    /// The selected algorithm. Fixed for the lifetime of the instance.
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Store policy-private state, replacing any previous value.
    pub fn set_private<T: Any + Send>(&mut self, state: T) {
        self.private = Some(Box::new(state));
    }

    /// Borrow policy-private state if present and of type `T`.
    pub fn private_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.private.as_mut()?.downcast_mut::<T>()
    }

    /// Remove and return policy-private state if present and of type `T`.
    ///
    /// State of another type is left in place.
    pub fn take_private<T: Any + Send>(&mut self) -> Option<T> {
        match self.private.take()?.downcast::<T>() {
            Ok(state) => Some(*state),
            Err(other) => {
                self.private = Some(other);
                None
            }
        }
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }
}

impl std::fmt::Debug for DeviceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceInstance")
            .field("algorithm", &self.algorithm)
            .field("options", &self.options)
            .field("session", &self.session)
            .field("has_private", &self.private.is_some())
            .finish()
    }
}
