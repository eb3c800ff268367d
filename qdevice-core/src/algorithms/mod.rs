//! Built-in decision algorithms.
//!
//! | Id | Name | Type |
//! |----|------|------|
//! | 0 | `test` | [`TestAlgorithm`] |
//! | 1 | `ffsplit` | [`FfsplitAlgorithm`] |
//! | 2 | `2nodelms` | [`TwoNodeLmsAlgorithm`] |
//! | 3 | `lms` | [`LmsAlgorithm`] |
//!
//! The policies here run on the device side. The arbitration server
//! makes the tie-breaking decision; these policies decide what to report,
//! when to pause voting, and what to vote while the server is unreachable.

mod ffsplit;
mod lms;
mod two_node_lms;

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

pub use ffsplit::{FfsplitAlgorithm, FfsplitState};
pub use lms::{LmsAlgorithm, LmsState};
pub use test::{TestAlgorithm, TestState};
pub use two_node_lms::{TwoNodeLmsAlgorithm, TwoNodeLmsState};

use crate::algorithm::{AlgorithmResult, DecisionAlgorithm, Operation};
use crate::errors::AlgorithmError;
use crate::instance::DeviceInstance;
use crate::types::{AlgorithmId, RequestKind, RingId};

/// Built-in policies in registration order.
pub fn builtins() -> [(AlgorithmId, Arc<dyn DecisionAlgorithm>); 4] {
    [
        (AlgorithmId::TEST, Arc::new(TestAlgorithm)),
        (AlgorithmId::FFSPLIT, Arc::new(FfsplitAlgorithm)),
        (AlgorithmId::TWO_NODE_LMS, Arc::new(TwoNodeLmsAlgorithm)),
        (AlgorithmId::LMS, Arc::new(LmsAlgorithm)),
    ]
}

/// Borrow the policy's private state or report it missing.
fn state_mut<'i, T: Any + Send>(
    instance: &'i mut DeviceInstance,
    algorithm: &'static str,
    operation: Operation,
) -> AlgorithmResult<&'i mut T> {
    instance
        .private_mut::<T>()
        .ok_or(AlgorithmError::MissingState {
            algorithm,
            operation,
        })
}

/// Apply the reply correlation rule, logging stale replies.
fn is_current_reply(
    instance: &DeviceInstance,
    algorithm: &'static str,
    kind: RequestKind,
    seq_number: u32,
    ring_id: Option<RingId>,
) -> bool {
    let current = instance
        .session
        .is_current_reply(kind, seq_number, ring_id);
    if !current {
        debug!(
            algorithm,
            ?kind,
            seq_number,
            expected = ?instance.session.last_sent(kind),
            ?ring_id,
            current_ring = ?instance.session.ring_id,
            "ignoring stale reply"
        );
    }
    current
}
