//! Handler seam between the manager and a per-event-type listener store.

use crate::{
    error::DispatchError, event::Event, listener::Listener, token::ListenerToken,
};
use std::sync::Arc;

/// What to do when a listener returns an error during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the remaining dispatch for this call and return the error.
    #[default]
    Propagate,
    /// Log the error, count it, and keep dispatching.
    Isolate,
}

/// Counters describing one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Listeners the event was delivered to.
    ///
    /// A [`typed`](crate::typed) listener that cannot view the event still counts.
    pub invoked: usize,
    /// Listener failures swallowed under [`FailurePolicy::Isolate`].
    pub isolated_failures: usize,
    /// Whether the event ended cancelled.
    pub cancelled: bool,
}

impl DispatchReport {
    /// Folds the report of a later handler into this one.
    pub fn merge(&mut self, later: DispatchReport) {
        self.invoked += later.invoked;
        self.isolated_failures += later.isolated_failures;
        self.cancelled = later.cancelled;
    }
}

/// Stores the listeners of one event type and runs them for an event.
///
/// Implementations must preserve insertion order within a priority and honor
/// the priority/cancellation contract described on
/// [`Priority`](crate::Priority).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch events",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher` to act as the handler of an event type."
)]
pub trait Dispatcher: Send + Sync + 'static {
    /// Appends a listener to the bucket selected by `token.priority()`.
    fn register(&mut self, token: ListenerToken, listener: Arc<dyn Listener>);

    /// Removes the entry carrying `token`. Returns `false` if there was none.
    fn remove(&mut self, token: ListenerToken) -> bool;

    /// Runs the listeners for `event`.
    ///
    /// With `subtypes_only`, only listeners registered with the ancestor flag run;
    /// this is how a handler is driven when it is an ancestor of the event's type.
    fn invoke(
        &self,
        event: &mut dyn Event,
        subtypes_only: bool,
        policy: FailurePolicy,
    ) -> Result<DispatchReport, DispatchError>;

    /// Number of registered entries.
    fn len(&self) -> usize;

    /// Whether no entries are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_merge_keeps_latest_cancellation() {
        let mut report = DispatchReport {
            invoked: 2,
            isolated_failures: 1,
            cancelled: true,
        };
        report.merge(DispatchReport {
            invoked: 3,
            isolated_failures: 0,
            cancelled: false,
        });
        assert_eq!(report.invoked, 5);
        assert_eq!(report.isolated_failures, 1);
        assert!(!report.cancelled);
    }
}
