//! Scripted event replay.
//!
//! A script is a JSON array of [`Event`]s tagged by `"event"`:
//!
//! ```json
//! [
//!   { "event": "connected", "heuristics": "pass" },
//!   { "event": "request_sent", "kind": "config_node_list", "seq_number": 1 },
//!   { "event": "config_node_list_reply_received", "seq_number": 1, "initial": true }
//! ]
//! ```
//!
//! `request_sent` only updates session bookkeeping; every other event is
//! dispatched and produces one [`Record`].

use qdevice_core::{
    ConnectedOutcome, DisconnectOutcome, DisconnectReason, HeuristicsChangeOutcome,
    HeuristicsNotifyOutcome, HeuristicsState, NodeList, NodeListNotifyOutcome, NodeListOutcome,
    Operation, RequestKind, RingId, VoteDecision, VotequorumNode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    RequestSent {
        kind: RequestKind,
        seq_number: u32,
    },
    Connected {
        #[serde(default)]
        heuristics: HeuristicsState,
    },
    ConfigNodeListChanged {
        node_list: NodeList,
        #[serde(default)]
        config_version: Option<u64>,
    },
    VotequorumNodeListNotify {
        ring_id: RingId,
        node_list: NodeList,
    },
    VotequorumNodeListHeuristicsNotify {
        ring_id: RingId,
        node_list: NodeList,
        #[serde(default)]
        heuristics: HeuristicsState,
    },
    VotequorumQuorumNotify {
        quorate: bool,
        #[serde(default)]
        node_list: Vec<VotequorumNode>,
    },
    VotequorumExpectedVotesNotify {
        expected_votes: u32,
    },
    ConfigNodeListReplyReceived {
        seq_number: u32,
        #[serde(default)]
        initial: bool,
        #[serde(default)]
        ring_id: Option<RingId>,
    },
    MembershipNodeListReplyReceived {
        seq_number: u32,
        #[serde(default)]
        ring_id: Option<RingId>,
    },
    QuorumNodeListReplyReceived {
        seq_number: u32,
        #[serde(default)]
        ring_id: Option<RingId>,
    },
    AskForVoteReplyReceived {
        seq_number: u32,
        #[serde(default)]
        ring_id: Option<RingId>,
    },
    VoteInfoReceived {
        seq_number: u32,
        #[serde(default)]
        ring_id: Option<RingId>,
    },
    EchoReplyReceived {
        seq_number: u32,
        is_expected_seq_number: bool,
    },
    EchoReplyNotReceived,
    HeuristicsChange {
        heuristics: HeuristicsState,
    },
    HeuristicsChangeReplyReceived {
        seq_number: u32,
        #[serde(default)]
        ring_id: Option<RingId>,
        heuristics: HeuristicsState,
    },
    Disconnected {
        reason: DisconnectReason,
    },
}

/// What a dispatched event returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Connected(ConnectedOutcome),
    NodeList(NodeListOutcome),
    NodeListNotify(NodeListNotifyOutcome),
    HeuristicsNotify(HeuristicsNotifyOutcome),
    HeuristicsChange(HeuristicsChangeOutcome),
    Disconnect(DisconnectOutcome),
    Vote(VoteDecision),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Index of the event in the script.
    pub step: usize,
    pub operation: Operation,
    pub outcome: Outcome,
    /// Vote the session is casting after the event.
    pub pending_vote: VoteDecision,
}

pub fn parse_events(json: &str) -> Result<Vec<Event>, AppError> {
    Ok(serde_json::from_str(json)?)
}

/// Feed `events` through `session`, stopping at the first policy error.
pub fn run<I>(session: &mut Session<'_>, events: I) -> Result<Vec<Record>, AppError>
where
    I: IntoIterator<Item = Event>,
{
    let mut records = Vec::new();
    for (step, event) in events.into_iter().enumerate() {
        let Some((operation, outcome)) = apply(session, event)? else {
            continue;
        };
        debug!(step, %operation, ?outcome, "replayed");
        records.push(Record {
            step,
            operation,
            outcome,
            pending_vote: session.state().pending_vote,
        });
    }
    Ok(records)
}

fn apply(
    session: &mut Session<'_>,
    event: Event,
) -> Result<Option<(Operation, Outcome)>, AppError> {
    let result = match event {
        Event::RequestSent { kind, seq_number } => {
            session.record_sent(kind, seq_number);
            return Ok(None);
        }
        Event::Connected { heuristics } => (
            Operation::Connected,
            Outcome::Connected(session.connected(heuristics)?),
        ),
        Event::ConfigNodeListChanged {
            node_list,
            config_version,
        } => (
            Operation::ConfigNodeListChanged,
            Outcome::NodeList(session.config_node_list_changed(&node_list, config_version)?),
        ),
        Event::VotequorumNodeListNotify { ring_id, node_list } => (
            Operation::VotequorumNodeListNotify,
            Outcome::NodeListNotify(session.votequorum_node_list_notify(ring_id, &node_list)?),
        ),
        Event::VotequorumNodeListHeuristicsNotify {
            ring_id,
            node_list,
            heuristics,
        } => (
            Operation::VotequorumNodeListHeuristicsNotify,
            Outcome::HeuristicsNotify(session.votequorum_node_list_heuristics_notify(
                ring_id, &node_list, heuristics,
            )?),
        ),
        Event::VotequorumQuorumNotify { quorate, node_list } => (
            Operation::VotequorumQuorumNotify,
            Outcome::NodeList(session.votequorum_quorum_notify(quorate, &node_list)?),
        ),
        Event::VotequorumExpectedVotesNotify { expected_votes } => (
            Operation::VotequorumExpectedVotesNotify,
            Outcome::Vote(session.votequorum_expected_votes_notify(expected_votes)?),
        ),
        Event::ConfigNodeListReplyReceived {
            seq_number,
            initial,
            ring_id,
        } => (
            Operation::ConfigNodeListReplyReceived,
            Outcome::Vote(session.config_node_list_reply_received(seq_number, initial, ring_id)?),
        ),
        Event::MembershipNodeListReplyReceived {
            seq_number,
            ring_id,
        } => (
            Operation::MembershipNodeListReplyReceived,
            Outcome::Vote(session.membership_node_list_reply_received(seq_number, ring_id)?),
        ),
        Event::QuorumNodeListReplyReceived {
            seq_number,
            ring_id,
        } => (
            Operation::QuorumNodeListReplyReceived,
            Outcome::Vote(session.quorum_node_list_reply_received(seq_number, ring_id)?),
        ),
        Event::AskForVoteReplyReceived {
            seq_number,
            ring_id,
        } => (
            Operation::AskForVoteReplyReceived,
            Outcome::Vote(session.ask_for_vote_reply_received(seq_number, ring_id)?),
        ),
        Event::VoteInfoReceived {
            seq_number,
            ring_id,
        } => (
            Operation::VoteInfoReceived,
            Outcome::Vote(session.vote_info_received(seq_number, ring_id)?),
        ),
        Event::EchoReplyReceived {
            seq_number,
            is_expected_seq_number,
        } => {
            session.echo_reply_received(seq_number, is_expected_seq_number)?;
            (Operation::EchoReplyReceived, Outcome::Done)
        }
        Event::EchoReplyNotReceived => {
            session.echo_reply_not_received()?;
            (Operation::EchoReplyNotReceived, Outcome::Done)
        }
        Event::HeuristicsChange { heuristics } => (
            Operation::HeuristicsChange,
            Outcome::HeuristicsChange(session.heuristics_change(heuristics)?),
        ),
        Event::HeuristicsChangeReplyReceived {
            seq_number,
            ring_id,
            heuristics,
        } => (
            Operation::HeuristicsChangeReplyReceived,
            Outcome::Vote(session.heuristics_change_reply_received(
                seq_number, ring_id, heuristics,
            )?),
        ),
        Event::Disconnected { reason } => (
            Operation::Disconnected,
            Outcome::Disconnect(session.disconnected(reason)?),
        ),
    };
    Ok(Some(result))
}
