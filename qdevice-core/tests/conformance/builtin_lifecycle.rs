//! Init/destroy lifecycle across the built-in policies.

use qdevice_core::{
    AlgorithmError, DeviceInstance, DispatchError, Dispatcher, HeuristicsState, NodeList,
    Operation, RingId,
};

use crate::{registry, BUILTIN_IDS};

#[test]
fn init_then_destroy_releases_private_state() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = DeviceInstance::new(id);
        dispatcher.init(&mut instance).unwrap();
        assert!(instance.has_private(), "{id}: init must create state");

        dispatcher.destroy(&mut instance).unwrap();
        assert!(!instance.has_private(), "{id}: destroy must release state");
    }
}

#[test]
fn destroy_without_init_is_a_no_op() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = DeviceInstance::new(id);
        assert_eq!(dispatcher.destroy(&mut instance), Ok(()), "{id}");
        assert!(!instance.has_private());
    }
}

#[test]
fn events_before_init_report_missing_state() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = DeviceInstance::new(id);
        let name = registry.lookup(id).unwrap().name();

        assert_eq!(
            dispatcher.connected(&mut instance, HeuristicsState::Pass),
            Err(DispatchError::Algorithm(AlgorithmError::MissingState {
                algorithm: name,
                operation: Operation::Connected,
            }))
        );
        assert_eq!(
            dispatcher.votequorum_node_list_notify(
                &mut instance,
                RingId::new(1, 1),
                &NodeList::from(vec![1u32, 2])
            ),
            Err(DispatchError::Algorithm(AlgorithmError::MissingState {
                algorithm: name,
                operation: Operation::VotequorumNodeListNotify,
            }))
        );
        assert_eq!(
            dispatcher.echo_reply_not_received(&mut instance),
            Err(DispatchError::Algorithm(AlgorithmError::MissingState {
                algorithm: name,
                operation: Operation::EchoReplyNotReceived,
            }))
        );
    }
}

#[test]
fn reinit_after_destroy_starts_fresh() {
    let registry = registry();
    let dispatcher = Dispatcher::new(&registry);
    for id in BUILTIN_IDS {
        let mut instance = DeviceInstance::new(id);
        dispatcher.init(&mut instance).unwrap();
        dispatcher
            .connected(&mut instance, HeuristicsState::Undefined)
            .unwrap();
        dispatcher.destroy(&mut instance).unwrap();

        dispatcher.init(&mut instance).unwrap();
        dispatcher
            .connected(&mut instance, HeuristicsState::Undefined)
            .unwrap();
        dispatcher.destroy(&mut instance).unwrap();
    }
}
