//! Reply correlation: a reply whose sequence number or ring id does not
//! match the engine's current request is ignored by every policy, while
//! the matching reply is acted on.

use qdevice_core::{
    AlgorithmId, DeviceInstance, Dispatcher, HeuristicsState, RequestKind, RingId, SessionState,
    VoteDecision,
};

use crate::{registry, BUILTIN_IDS};

const CURRENT_RING: RingId = RingId {
    node_id: 1,
    seq: 40,
};
const OLD_RING: RingId = RingId {
    node_id: 1,
    seq: 36,
};

fn connected_instance(dispatcher: &Dispatcher<'_>, id: AlgorithmId) -> DeviceInstance {
    let mut instance = DeviceInstance::new(id);
    dispatcher.init(&mut instance).unwrap();
    dispatcher
        .connected(&mut instance, HeuristicsState::Undefined)
        .unwrap();
    instance.session.ring_id = Some(CURRENT_RING);
    instance.session.pending_vote = VoteDecision::Yes;
    for (seq, kind) in (100u32..).zip(RequestKind::ALL) {
        instance.session.record_sent(kind, seq);
    }
    instance
}

fn snapshot(instance: &DeviceInstance) -> SessionState {
    instance.session.clone()
}

#[test]
fn mismatched_sequence_numbers_are_no_ops() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = connected_instance(&dispatcher, id);
        let before = snapshot(&instance);

        let votes = [
            dispatcher
                .config_node_list_reply_received(&mut instance, 7, true, None)
                .unwrap(),
            dispatcher
                .membership_node_list_reply_received(&mut instance, 7, Some(CURRENT_RING))
                .unwrap(),
            dispatcher
                .quorum_node_list_reply_received(&mut instance, 7, None)
                .unwrap(),
            dispatcher
                .ask_for_vote_reply_received(&mut instance, 7, Some(CURRENT_RING))
                .unwrap(),
            dispatcher
                .heuristics_change_reply_received(
                    &mut instance,
                    7,
                    None,
                    HeuristicsState::Pass,
                )
                .unwrap(),
        ];
        for vote in votes {
            assert_eq!(vote, VoteDecision::NoChange, "{id}");
        }
        assert_eq!(snapshot(&instance), before, "{id}: session must be untouched");
        dispatcher.destroy(&mut instance).unwrap();
    }
}

#[test]
fn replies_for_an_old_ring_are_no_ops() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = connected_instance(&dispatcher, id);
        let before = snapshot(&instance);
        let seq = instance
            .session
            .last_sent(RequestKind::ConfigNodeList)
            .unwrap();

        let vote = dispatcher
            .config_node_list_reply_received(&mut instance, seq, true, Some(OLD_RING))
            .unwrap();
        assert_eq!(vote, VoteDecision::NoChange, "{id}");

        let vote = dispatcher
            .vote_info_received(&mut instance, 1, Some(OLD_RING))
            .unwrap();
        assert_eq!(vote, VoteDecision::NoChange, "{id}");

        assert_eq!(snapshot(&instance), before, "{id}");
        dispatcher.destroy(&mut instance).unwrap();
    }
}

/// Send one reply of every correlated kind, in request order, either with
/// the recorded sequence numbers and ring or with a wrong one.
fn reply_votes(
    dispatcher: &Dispatcher<'_>,
    instance: &mut DeviceInstance,
    seq: impl Fn(RequestKind) -> u32,
    ring_id: Option<RingId>,
) -> [VoteDecision; 5] {
    [
        dispatcher
            .config_node_list_reply_received(
                instance,
                seq(RequestKind::ConfigNodeList),
                true,
                ring_id,
            )
            .unwrap(),
        dispatcher
            .membership_node_list_reply_received(
                instance,
                seq(RequestKind::MembershipNodeList),
                ring_id,
            )
            .unwrap(),
        dispatcher
            .quorum_node_list_reply_received(instance, seq(RequestKind::QuorumNodeList), ring_id)
            .unwrap(),
        dispatcher
            .ask_for_vote_reply_received(instance, seq(RequestKind::AskForVote), ring_id)
            .unwrap(),
        dispatcher
            .heuristics_change_reply_received(
                instance,
                seq(RequestKind::HeuristicsChange),
                ring_id,
                HeuristicsState::Pass,
            )
            .unwrap(),
    ]
}

#[test]
fn current_replies_are_acted_on_and_stale_ones_are_not() {
    use VoteDecision::{AskLater, No, NoChange, Yes};

    let expected_current = [
        (AlgorithmId::TEST, [NoChange, NoChange, NoChange, Yes, NoChange]),
        (AlgorithmId::FFSPLIT, [AskLater, AskLater, NoChange, Yes, NoChange]),
        (AlgorithmId::TWO_NODE_LMS, [NoChange, NoChange, No, No, NoChange]),
        (AlgorithmId::LMS, [NoChange, NoChange, No, No, NoChange]),
    ];

    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for (id, expected) in expected_current {
        let mut current = connected_instance(&dispatcher, id);
        let last_sent = current.session.clone();
        let current_votes = reply_votes(
            &dispatcher,
            &mut current,
            |kind| last_sent.last_sent(kind).unwrap(),
            Some(CURRENT_RING),
        );
        assert_eq!(current_votes, expected, "{id}: current replies");

        let mut wrong_seq = connected_instance(&dispatcher, id);
        let wrong_seq_votes = reply_votes(&dispatcher, &mut wrong_seq, |_| 7, Some(CURRENT_RING));
        assert_eq!(wrong_seq_votes, [NoChange; 5], "{id}: wrong sequence");

        let mut wrong_ring = connected_instance(&dispatcher, id);
        let wrong_ring_votes = reply_votes(
            &dispatcher,
            &mut wrong_ring,
            |kind| last_sent.last_sent(kind).unwrap(),
            Some(OLD_RING),
        );
        assert_eq!(wrong_ring_votes, [NoChange; 5], "{id}: old ring");

        assert_ne!(current_votes, wrong_seq_votes, "{id}");
        for mut instance in [current, wrong_seq, wrong_ring] {
            dispatcher.destroy(&mut instance).unwrap();
        }
    }
}
