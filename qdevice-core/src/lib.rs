//! qdevice core: decision-algorithm layer of the network quorum device.
//!
//! When cluster membership changes or connectivity to the arbitration
//! server fluctuates, a pluggable policy decides whether the local
//! partition should be granted the device's quorum vote. This crate holds
//! the contract every policy implements, the bounded registry that binds
//! algorithm ids to policies, and the dispatcher the network engine calls
//! for each event.
//!
//! # Module Map
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`constants`] | Supported-algorithm bound, names, exit statuses |
//! | [`types`] | Ids, ring ids, node lists, vote/heuristics/reason enums |
//! | [`errors`] | Registry, startup, selection and algorithm errors |
//! | [`instance`] | Per-session device instance and bookkeeping |
//! | [`algorithm`] | The `DecisionAlgorithm` trait and outcome records |
//! | [`registry`] | Startup builder and frozen algorithm table |
//! | [`dispatch`] | Validated forwarding to the selected algorithm |
//! | [`algorithms`] | Built-in policies: test, ffsplit, 2nodelms, lms |
//!
//! # Lifecycle
//!
//! ```text
//! AlgorithmRegistry::builtin()  ── once, before any instance exists
//!         │
//!         ▼
//! Dispatcher::new(&registry)
//!         │   init → connected → … events … → disconnected → destroy
//!         ▼
//! DeviceInstance (one per arbitration session)
//! ```
//!
//! The dispatcher never terminates the process. An instance that selects
//! an unregistered algorithm gets [`errors::DispatchError::InvalidSelection`];
//! the application's top-level handler decides what to do with it.

/// Fixed values shared across the crate.
pub mod constants;

/// Error types for qdevice-core operations.
pub mod errors;

/// Closed vocabularies: ids, ring ids, node lists, enums.
pub mod types;

/// Device instance and session bookkeeping.
pub mod instance;

/// Decision-algorithm contract.
pub mod algorithm;

/// Algorithm registry.
pub mod registry;

/// Event dispatcher.
pub mod dispatch;

/// Built-in decision algorithms.
pub mod algorithms;

pub use algorithm::{
    AlgorithmResult, ConnectedOutcome, DecisionAlgorithm, DisconnectOutcome,
    HeuristicsChangeOutcome, HeuristicsNotifyOutcome, NodeListNotifyOutcome, NodeListOutcome,
    Operation,
};
pub use dispatch::{DispatchResult, Dispatcher};
pub use errors::{AlgorithmError, DispatchError, InvalidSelection, RegistryError, StartupError};
pub use instance::{DeviceInstance, InstanceOptions, SessionState};
pub use registry::{AlgorithmRegistry, RegistryBuilder};
pub use types::{
    AlgorithmId, DisconnectReason, HeuristicsState, NodeId, NodeList, RequestKind, RingId,
    VoteDecision, VotequorumNode, VotequorumNodeState,
};
