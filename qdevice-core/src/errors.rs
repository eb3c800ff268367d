//! Error types for qdevice-core.
//!
//! Three tiers, kept as separate types so callers cannot confuse them:
//!
//! - [`RegistryError`] / [`StartupError`]: ordinary startup failures.
//!   The caller aborts startup with a diagnostic.
//! - [`InvalidSelection`]: an instance selected an algorithm with no
//!   registered descriptor. This is a build/configuration defect; the
//!   process-level handler terminates on it.
//! - [`AlgorithmError`]: a failure a policy chose to report. Passed
//!   through the dispatcher verbatim.

use crate::algorithm::Operation;
use crate::types::AlgorithmId;

/// Registration into the bounded algorithm table failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("decision algorithm id {id} is out of range (supported: 0..{bound})")]
    OutOfRange { id: u8, bound: usize },

    #[error("decision algorithm {id} is already registered")]
    AlreadyRegistered { id: AlgorithmId },
}

/// Built-in registration failed; the process must not serve connections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartupError {
    #[error("failed to register decision algorithm '{name}'")]
    Registration {
        name: &'static str,
        id: AlgorithmId,
        #[source]
        source: RegistryError,
    },
}

/// An instance's algorithm id did not resolve to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation}: unhandled decision algorithm {algorithm}")]
pub struct InvalidSelection {
    pub algorithm: AlgorithmId,
    pub operation: Operation,
}

/// A failure reported by a decision algorithm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    /// Called before `init` stored the policy's private state.
    #[error("algo-{algorithm}: {operation} called without initialized state")]
    MissingState {
        algorithm: &'static str,
        operation: Operation,
    },

    /// The policy refused the event.
    #[error("algo-{algorithm}: {operation} rejected: {reason}")]
    Rejected {
        algorithm: &'static str,
        operation: Operation,
        reason: String,
    },
}

/// Result of one dispatcher entry point that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No descriptor bound to the instance's id. Never returned after
    /// a descriptor method ran.
    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelection),

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}
