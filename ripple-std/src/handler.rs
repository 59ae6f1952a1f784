//! The standard per-event-type handler.
//!
//! Listeners are kept in seven insertion-ordered buckets, one per [`Priority`].
//! Two bit masks summarize the buckets so that empty handlers, and handlers
//! driven as ancestors with no propagating listeners, return without touching
//! any bucket.
//!
//! # Dispatch
//!
//! 1. Return immediately if no bucket is occupied, or if only propagating
//!    listeners are wanted and none exist.
//! 2. Run the [`Priority::Top`] bucket regardless of cancellation.
//! 3. Run the remaining buckets in ordinal order. Before each listener, stop the
//!    whole dispatch if the event is cancellable and cancelled.
//!
//! When driven as an ancestor handler (`subtypes_only`), listeners registered
//! without the ancestor flag are skipped in every bucket.

use ripple_core::{
    DispatchError, DispatchReport, Dispatcher, Event, FailurePolicy, Listener, ListenerToken,
    Priority, PriorityMask,
};
use std::{fmt, sync::Arc};

struct Entry {
    token: ListenerToken,
    listener: Arc<dyn Listener>,
}

/// Priority-bucketed listener store for one event type.
#[derive(Default)]
pub struct EventHandler {
    buckets: [Vec<Entry>; Priority::COUNT],
    occupied: PriorityMask,
    propagating: PriorityMask,
}

impl EventHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens in the bucket for `priority`, in invocation order.
    pub fn bucket(&self, priority: Priority) -> impl Iterator<Item = ListenerToken> + '_ {
        self.buckets[priority as usize].iter().map(|e| e.token)
    }

    /// Priorities whose bucket is non-empty.
    pub fn occupied_mask(&self) -> PriorityMask {
        self.occupied
    }

    /// Priorities whose bucket holds at least one propagating listener.
    pub fn propagating_mask(&self) -> PriorityMask {
        self.propagating
    }

    fn refresh_masks(&mut self, priority: Priority) {
        let bucket = &self.buckets[priority as usize];
        let bit = PriorityMask::of(priority);
        self.occupied.set(bit, !bucket.is_empty());
        self.propagating
            .set(bit, bucket.iter().any(|e| e.token.propagates()));
    }

    fn call(
        entry: &Entry,
        event: &mut dyn Event,
        policy: FailurePolicy,
        report: &mut DispatchReport,
    ) -> Result<(), DispatchError> {
        report.invoked += 1;
        let Err(source) = entry.listener.on_event(event) else {
            return Ok(());
        };
        match policy {
            FailurePolicy::Propagate => Err(DispatchError::Listener {
                token: entry.token,
                source,
            }),
            FailurePolicy::Isolate => {
                tracing::warn!(
                    token = %entry.token,
                    priority = %entry.token.priority(),
                    error = %source,
                    "listener failed, continuing dispatch"
                );
                report.isolated_failures += 1;
                Ok(())
            }
        }
    }
}

impl Dispatcher for EventHandler {
    fn register(&mut self, token: ListenerToken, listener: Arc<dyn Listener>) {
        let priority = token.priority();
        self.buckets[priority as usize].push(Entry { token, listener });
        self.occupied |= PriorityMask::of(priority);
        if token.propagates() {
            self.propagating |= PriorityMask::of(priority);
        }
    }

    fn remove(&mut self, token: ListenerToken) -> bool {
        let priority = token.priority();
        let bucket = &mut self.buckets[priority as usize];
        let Some(index) = bucket.iter().position(|e| e.token == token) else {
            return false;
        };
        // `Vec::remove` keeps the remaining entries in insertion order.
        bucket.remove(index);
        self.refresh_masks(priority);
        true
    }

    fn invoke(
        &self,
        event: &mut dyn Event,
        subtypes_only: bool,
        policy: FailurePolicy,
    ) -> Result<DispatchReport, DispatchError> {
        let mut report = DispatchReport::default();
        let eligible = if subtypes_only {
            self.propagating
        } else {
            self.occupied
        };

        if !eligible.is_empty() {
            let cancellable = event.as_cancellable().is_some();

            'dispatch: for priority in Priority::ALL {
                if !eligible.has(priority) {
                    continue;
                }
                for entry in &self.buckets[priority as usize] {
                    if cancellable && !priority.is_top() && event.is_cancelled() == Some(true) {
                        break 'dispatch;
                    }
                    if subtypes_only && !entry.token.propagates() {
                        continue;
                    }
                    Self::call(entry, event, policy, &mut report)?;
                }
            }
        }

        report.cancelled = event.is_cancelled().unwrap_or(false);
        Ok(report)
    }

    fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("len", &self.len())
            .field("occupied", &self.occupied)
            .field("propagating", &self.propagating)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingListener, Recorder};
    use ripple_core::Cancellable;

    #[derive(Default)]
    struct Chat {
        cancelled: bool,
    }

    impl Cancellable for Chat {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    impl Event for Chat {
        fn as_cancellable(&self) -> Option<&dyn Cancellable> {
            Some(self)
        }

        fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
            Some(self)
        }
    }

    struct Tick;
    impl Event for Tick {}

    fn token(priority: Priority, propagate: bool, slot: u16) -> ListenerToken {
        ListenerToken::new(priority, 0, propagate, slot)
    }

    fn add(handler: &mut EventHandler, token: ListenerToken, listener: impl Listener) {
        handler.register(token, Arc::new(listener));
    }

    #[test]
    fn test_runs_buckets_in_priority_then_insertion_order() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Final, false, 0), recorder.listener("final"));
        add(&mut handler, token(Priority::Normal, false, 1), recorder.listener("normal-1"));
        add(&mut handler, token(Priority::Top, false, 2), recorder.listener("top"));
        add(&mut handler, token(Priority::Normal, false, 3), recorder.listener("normal-2"));
        add(&mut handler, token(Priority::Lowest, false, 4), recorder.listener("lowest"));

        let report = handler
            .invoke(&mut Chat::default(), false, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(
            recorder.calls(),
            ["top", "lowest", "normal-1", "normal-2", "final"]
        );
        assert_eq!(report.invoked, 5);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_top_ignores_cancellation() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Top, false, 0), recorder.cancelling("top-1"));
        add(&mut handler, token(Priority::Top, false, 1), recorder.listener("top-2"));
        add(&mut handler, token(Priority::Lowest, false, 2), recorder.listener("lowest"));

        let mut event = Chat::default();
        let report = handler
            .invoke(&mut event, false, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(recorder.calls(), ["top-1", "top-2"]);
        assert!(report.cancelled);
        assert!(event.cancelled);
    }

    #[test]
    fn test_cancellation_stops_bucket_and_later_buckets() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Low, false, 0), recorder.listener("low"));
        add(&mut handler, token(Priority::Normal, false, 1), recorder.cancelling("cancel"));
        add(&mut handler, token(Priority::Normal, false, 2), recorder.listener("normal"));
        add(&mut handler, token(Priority::High, false, 3), recorder.listener("high"));

        let report = handler
            .invoke(&mut Chat::default(), false, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(recorder.calls(), ["low", "cancel"]);
        assert_eq!(report.invoked, 2);
        assert!(report.cancelled);
    }

    #[test]
    fn test_top_can_uncancel_before_later_buckets() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Top, false, 0), recorder.uncancelling("top"));
        add(&mut handler, token(Priority::Normal, false, 1), recorder.listener("normal"));

        let mut event = Chat { cancelled: true };
        handler
            .invoke(&mut event, false, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(recorder.calls(), ["top", "normal"]);
    }

    #[test]
    fn test_non_cancellable_events_never_short_circuit() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Lowest, false, 0), recorder.cancelling("a"));
        add(&mut handler, token(Priority::Final, false, 1), recorder.listener("b"));

        let report = handler
            .invoke(&mut Tick, false, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(recorder.calls(), ["a", "b"]);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_subtypes_only_skips_unflagged_listeners() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Top, false, 0), recorder.listener("top-plain"));
        add(&mut handler, token(Priority::Top, true, 1), recorder.listener("top-sub"));
        add(&mut handler, token(Priority::Normal, false, 2), recorder.listener("normal-plain"));
        add(&mut handler, token(Priority::Normal, true, 3), recorder.listener("normal-sub"));

        let report = handler
            .invoke(&mut Chat::default(), true, FailurePolicy::Propagate)
            .unwrap();

        assert_eq!(recorder.calls(), ["top-sub", "normal-sub"]);
        assert_eq!(report.invoked, 2);
    }

    #[test]
    fn test_fast_exit_without_propagating_listeners() {
        let counter = CountingListener::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Normal, false, 0), counter.clone());

        let report = handler
            .invoke(&mut Chat::default(), true, FailurePolicy::Propagate)
            .unwrap();
        assert_eq!(counter.count(), 0);
        assert_eq!(report, DispatchReport::default());

        let empty = EventHandler::new();
        let report = empty
            .invoke(&mut Chat { cancelled: true }, false, FailurePolicy::Propagate)
            .unwrap();
        assert_eq!(report.invoked, 0);
        assert!(report.cancelled);
    }

    #[test]
    fn test_remove_preserves_order_and_masks() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        let a = token(Priority::Normal, false, 0);
        let b = token(Priority::Normal, true, 1);
        let c = token(Priority::Normal, false, 2);
        add(&mut handler, a, recorder.listener("a"));
        add(&mut handler, b, recorder.listener("b"));
        add(&mut handler, c, recorder.listener("c"));
        assert_eq!(handler.propagating_mask(), PriorityMask::NORMAL);

        assert!(handler.remove(b));
        assert_eq!(handler.bucket(Priority::Normal).collect::<Vec<_>>(), [a, c]);
        assert_eq!(handler.occupied_mask(), PriorityMask::NORMAL);
        assert!(handler.propagating_mask().is_empty());

        assert!(!handler.remove(b));
        assert!(handler.remove(a));
        assert!(handler.remove(c));
        assert!(handler.is_empty());
        assert!(handler.occupied_mask().is_empty());

        handler
            .invoke(&mut Chat::default(), false, FailurePolicy::Propagate)
            .unwrap();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_propagate_policy_aborts_dispatch() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        let failing = token(Priority::Low, false, 0);
        add(&mut handler, failing, recorder.failing("boom"));
        add(&mut handler, token(Priority::High, false, 1), recorder.listener("after"));

        let err = handler
            .invoke(&mut Chat::default(), false, FailurePolicy::Propagate)
            .unwrap_err();

        match err {
            DispatchError::Listener { token, source } => {
                assert_eq!(token, failing);
                assert_eq!(source.to_string(), "boom failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(recorder.calls(), ["boom"]);
    }

    #[test]
    fn test_isolate_policy_continues_dispatch() {
        let recorder = Recorder::new();
        let mut handler = EventHandler::new();
        add(&mut handler, token(Priority::Low, false, 0), recorder.failing("boom"));
        add(&mut handler, token(Priority::High, false, 1), recorder.listener("after"));

        let report = handler
            .invoke(&mut Chat::default(), false, FailurePolicy::Isolate)
            .unwrap();

        assert_eq!(recorder.calls(), ["boom", "after"]);
        assert_eq!(report.invoked, 2);
        assert_eq!(report.isolated_failures, 1);
    }
}
