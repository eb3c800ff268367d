//! Small closed vocabularies used throughout the algorithm contract.
//!
//! These types are deliberately plain: `Copy` where possible, no
//! references, no lifetimes. The network engine builds them from decoded
//! protocol messages and votequorum notifications; the core only passes
//! them through to policies.

use std::fmt;

use crate::constants::{ALGORITHM_NAMES, SUPPORTED_ALGORITHMS};

/// Cluster node identifier.
pub type NodeId = u32;

/// Identifier of a decision algorithm.
///
/// Arrives from configuration or the wire as a raw number, so it is NOT
/// guaranteed to be in range. The registry validates it at registration
/// and the dispatcher validates it on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AlgorithmId(u8);

impl AlgorithmId {
    /// Deterministic test stub.
    pub const TEST: Self = Self(0);
    /// Fifty-fifty split.
    pub const FFSPLIT: Self = Self(1);
    /// Two-node last-man-standing.
    pub const TWO_NODE_LMS: Self = Self(2);
    /// Last-man-standing.
    pub const LMS: Self = Self(3);

    /// Wrap a raw id without validating it.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Position in the bounded table, or `None` if out of range.
    pub fn index(self) -> Option<usize> {
        let index = usize::from(self.0);
        (index < SUPPORTED_ALGORITHMS).then_some(index)
    }

    /// Parse a configuration name (`"test"`, `"ffsplit"`, `"2nodelms"`, `"lms"`).
    pub fn from_name(name: &str) -> Option<Self> {
        ALGORITHM_NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(|index| Self(index as u8))
    }

    /// Configuration name, or `None` for an out-of-range id.
    pub fn name(self) -> Option<&'static str> {
        self.index().map(|index| ALGORITHM_NAMES[index])
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

/// Membership epoch: ring leader node id plus ring sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingId {
    pub node_id: NodeId,
    pub seq: u64,
}

impl RingId {
    pub const fn new(node_id: NodeId, seq: u64) -> Self {
        Self { node_id, seq }
    }
}

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.seq)
    }
}

/// Ordered, duplicate-free list of node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<NodeId>", into = "Vec<NodeId>"))]
pub struct NodeList {
    nodes: Vec<NodeId>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node_id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, node_id: NodeId) -> bool {
        if self.nodes.contains(&node_id) {
            return false;
        }
        self.nodes.push(node_id);
        true
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl From<Vec<NodeId>> for NodeList {
    fn from(nodes: Vec<NodeId>) -> Self {
        nodes.into_iter().collect()
    }
}

impl From<NodeList> for Vec<NodeId> {
    fn from(list: NodeList) -> Self {
        list.nodes
    }
}

impl FromIterator<NodeId> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut list = NodeList::new();
        for node_id in iter {
            list.insert(node_id);
        }
        list
    }
}

/// Node state as reported by votequorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VotequorumNodeState {
    Member,
    Dead,
    Leaving,
}

/// One entry of the votequorum quorum notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VotequorumNode {
    pub node_id: NodeId,
    pub state: VotequorumNodeState,
}

/// Vote a policy wants the device to cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VoteDecision {
    Yes,
    No,
    /// Keep whatever vote is currently cast.
    #[default]
    NoChange,
    /// Ask the server again later.
    AskLater,
    /// Yes, but only until the pending membership change settles.
    TransitionalYes,
    TransitionalNo,
}

impl VoteDecision {
    /// `true` for every variant except [`VoteDecision::NoChange`].
    pub fn is_change(self) -> bool {
        self != VoteDecision::NoChange
    }
}

/// Outcome of the local health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeuristicsState {
    #[default]
    Undefined,
    Pass,
    Fail,
}

/// Why connectivity to the arbitration server was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisconnectReason {
    Undefined,
    CantConnectToServer,
    ServerClosedConnection,
    ServerSentErrorReply,
    UnexpectedMessage,
    IncompatibleServer,
    EchoReplyNotReceived,
    LocalConfigChanged,
    CorosyncConnectionClosed,
    AlgorithmError,
    LocalShutdown,
}

impl DisconnectReason {
    /// Default reconnect advice for this reason.
    ///
    /// Policies are free to override it in their `disconnected` outcome.
    pub fn try_reconnect(self) -> bool {
        !matches!(
            self,
            DisconnectReason::IncompatibleServer
                | DisconnectReason::CorosyncConnectionClosed
                | DisconnectReason::LocalShutdown
        )
    }
}

/// Kind of outgoing request whose reply is correlated by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RequestKind {
    ConfigNodeList,
    MembershipNodeList,
    QuorumNodeList,
    AskForVote,
    HeuristicsChange,
    Echo,
}

impl RequestKind {
    pub const ALL: [RequestKind; 6] = [
        RequestKind::ConfigNodeList,
        RequestKind::MembershipNodeList,
        RequestKind::QuorumNodeList,
        RequestKind::AskForVote,
        RequestKind::HeuristicsChange,
        RequestKind::Echo,
    ];

    pub(crate) fn slot(self) -> usize {
        match self {
            RequestKind::ConfigNodeList => 0,
            RequestKind::MembershipNodeList => 1,
            RequestKind::QuorumNodeList => 2,
            RequestKind::AskForVote => 3,
            RequestKind::HeuristicsChange => 4,
            RequestKind::Echo => 5,
        }
    }
}
