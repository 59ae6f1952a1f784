//! Manager configuration.

use crate::handler::EventHandler;
use ripple_core::{Dispatcher, FailurePolicy, ListenerToken};

/// Constructor for the handler of a newly registered event type.
pub type HandlerFactory = fn() -> Box<dyn Dispatcher>;

/// Largest listener slot pool a token can address.
pub const MAX_SLOTS: usize = u16::MAX as usize;

/// Largest number of event types a token can address.
pub const MAX_EVENT_TYPES: usize = ListenerToken::EVENT_KEYS;

fn default_handler() -> Box<dyn Dispatcher> {
    Box::new(EventHandler::new())
}

/// Configuration for an [`EventManager`](super::EventManager).
///
/// # Example
/// ```ignore
/// let config = ManagerConfig::new()
///     .with_failure_policy(FailurePolicy::Isolate)
///     .with_slot_capacity(1024);
/// let manager = EventManager::with_config(config);
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// How listener errors are treated during dispatch.
    pub failure_policy: FailurePolicy,
    /// Maximum number of live listener registrations.
    pub slot_capacity: usize,
    /// Maximum number of registered event types.
    pub max_event_types: usize,
    /// Builds the handler for event types registered without one.
    pub handler_factory: HandlerFactory,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerConfig {
    /// Create the default configuration: propagate failures, full slot and
    /// event-type ranges, [`EventHandler`] for every type.
    pub fn new() -> Self {
        Self {
            failure_policy: FailurePolicy::Propagate,
            slot_capacity: MAX_SLOTS,
            max_event_types: MAX_EVENT_TYPES,
            handler_factory: default_handler,
        }
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the slot capacity, clamped to [`MAX_SLOTS`].
    pub fn with_slot_capacity(mut self, capacity: usize) -> Self {
        self.slot_capacity = capacity.min(MAX_SLOTS);
        self
    }

    /// Set the event type limit, clamped to [`MAX_EVENT_TYPES`].
    pub fn with_max_event_types(mut self, max: usize) -> Self {
        self.max_event_types = max.min(MAX_EVENT_TYPES);
        self
    }

    /// Set the default handler constructor.
    pub fn with_handler_factory(mut self, factory: HandlerFactory) -> Self {
        self.handler_factory = factory;
        self
    }
}
