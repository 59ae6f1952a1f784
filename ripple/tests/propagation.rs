#![cfg(feature = "macros")]

use ripple::{Cancellable, Event, EventManager, Priority, testing::Recorder};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::{Base, Leaf, Mid, base, leaf, mid};

fn hierarchy() -> EventManager {
    let mut manager = EventManager::new();
    assert_eq!(manager.register::<Base>(), Ok(0));
    assert_eq!(manager.register::<Mid>(), Ok(1));
    assert_eq!(manager.register::<Leaf>(), Ok(2));
    manager
}

#[test]
fn test_ancestor_chain_is_nearest_first() {
    let manager = hierarchy();
    assert_eq!(manager.ancestors_of(leaf()), Some(&[mid(), base()][..]));
    assert_eq!(manager.ancestors_of(mid()), Some(&[base()][..]));
    assert!(manager.ancestors_of(base()).unwrap().is_empty());
}

#[test]
fn test_only_flagged_ancestor_listeners_see_sub_events() {
    let recorder = Recorder::new();
    let mut manager = hierarchy();
    manager
        .register_listener(base(), recorder.listener("L1"), Priority::Normal, false)
        .unwrap();
    manager
        .register_listener(base(), recorder.listener("L2"), Priority::Top, true)
        .unwrap();

    manager.invoke(&mut Mid::default()).unwrap();
    assert_eq!(recorder.calls(), ["L2"]);

    recorder.clear();
    manager.invoke(&mut Base::default()).unwrap();
    assert_eq!(recorder.calls(), ["L2", "L1"]);
}

#[test]
fn test_handlers_run_exact_type_first_then_ancestors() {
    let recorder = Recorder::new();
    let mut manager = hierarchy();
    manager
        .register_listener(base(), recorder.listener("base"), Priority::Top, true)
        .unwrap();
    manager
        .register_listener(mid(), recorder.listener("mid"), Priority::Final, true)
        .unwrap();
    manager
        .register_listener(leaf(), recorder.listener("leaf"), Priority::Normal, false)
        .unwrap();

    // "mid" propagates, so it was also stored in the `Base` handler and runs
    // once more there at its `Final` priority.
    let report = manager.invoke(&mut Leaf::default()).unwrap();
    assert_eq!(recorder.calls(), ["leaf", "mid", "base", "mid"]);
    assert_eq!(report.invoked, 4);
}

#[test]
fn test_ancestor_listeners_view_the_embedded_parent() {
    let mut manager = hierarchy();
    manager
        .listen(Priority::Normal, true, |event: &mut Base| event.hits += 1)
        .unwrap();

    let mut event = Leaf::default();
    manager.invoke(&mut event).unwrap();
    assert_eq!(event.mid.base.hits, 1);
}

#[test]
fn test_cancellation_stops_the_ancestor_walk() {
    let recorder = Recorder::new();
    let mut manager = hierarchy();
    manager
        .register_listener(mid(), recorder.cancelling("mid"), Priority::Normal, true)
        .unwrap();
    manager
        .register_listener(base(), recorder.listener("base-top"), Priority::Top, true)
        .unwrap();

    let mut event = Leaf::default();
    let report = manager.invoke(&mut event).unwrap();

    assert_eq!(recorder.calls(), ["mid"]);
    assert!(report.cancelled);
    assert!(event.mid.base.cancelled);
}

#[test]
fn test_unregistered_ancestors_are_skipped() {
    let recorder = Recorder::new();
    let mut manager = EventManager::new();
    manager.register::<Base>().unwrap();
    manager.register::<Leaf>().unwrap();
    manager
        .register_listener(base(), recorder.listener("base"), Priority::Normal, true)
        .unwrap();

    manager.invoke(&mut Leaf::default()).unwrap();
    assert_eq!(recorder.calls(), ["base"]);
    assert!(!manager.is_registered(mid()));
}

#[test]
fn test_propagating_registration_reaches_ancestor_handlers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut manager = hierarchy();
    let counter = Arc::clone(&hits);
    let token = manager
        .listen(Priority::Normal, true, move |_: &mut Leaf| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert_eq!(manager.handler(leaf()).unwrap().len(), 1);
    assert_eq!(manager.handler(mid()).unwrap().len(), 1);
    assert_eq!(manager.handler(base()).unwrap().len(), 1);

    // Delivered by the exact handler and again by each ancestor handler.
    manager.invoke(&mut Leaf::default()).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    // A plain `Base` is not a `Leaf`; the typed listener skips it, although it
    // still counts as delivered.
    let report = manager.invoke(&mut Base::default()).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(report.invoked, 1);

    manager.unregister(token).unwrap();
    assert!(manager.handler(leaf()).unwrap().is_empty());
    assert!(manager.handler(mid()).unwrap().is_empty());
    assert!(manager.handler(base()).unwrap().is_empty());
    assert_eq!(manager.listener_count(), 0);
}

#[test]
fn test_non_propagating_listener_ignores_sub_events() {
    let recorder = Recorder::new();
    let mut manager = hierarchy();
    manager
        .register_listener(base(), recorder.listener("base"), Priority::Normal, false)
        .unwrap();

    manager.invoke(&mut Mid::default()).unwrap();
    manager.invoke(&mut Leaf::default()).unwrap();
    assert_eq!(recorder.count(), 0);
}

/// A sub-event with its own flag on top of a cancellable parent.
#[derive(Debug, Default, Event)]
struct Guarded {
    #[event(parent)]
    base: Base,
    #[event(cancelled)]
    cancelled: bool,
}

#[test]
fn test_parent_cancellation_cancels_sub_event_with_own_flag() {
    let recorder = Recorder::new();
    let mut manager = EventManager::new();
    manager.register::<Base>().unwrap();
    manager.register::<Guarded>().unwrap();
    manager
        .listen(Priority::Normal, true, |event: &mut Base| event.cancelled = true)
        .unwrap();
    manager
        .register_listener(base(), recorder.listener("after-cancel"), Priority::High, true)
        .unwrap();

    let mut event = Guarded::default();
    let report = manager.invoke(&mut event).unwrap();

    assert!(report.cancelled);
    assert!(event.is_cancelled());
    assert!(recorder.calls().is_empty());

    event.set_cancelled(false);
    assert!(!event.cancelled);
    assert!(!event.base.cancelled);

    event.set_cancelled(true);
    assert!(event.cancelled);
    assert!(event.base.cancelled);
}
