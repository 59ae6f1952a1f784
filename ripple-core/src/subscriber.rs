//! Listener discovery boundary.
//!
//! Discovery collaborators (hand-written impls or the `#[listeners]` macro) turn
//! an object or a type's associated functions into [`Subscription`]s. The engine
//! only ever sees these tuples.

use crate::{
    error::ListenerError,
    event::{Event, EventType},
    listener::{IntoListenerResult, Listener, typed},
    priority::Priority,
};
use std::{fmt, sync::Arc};

/// One discovered listener, ready to be registered.
#[derive(Clone)]
pub struct Subscription {
    /// Event type the listener is registered for.
    pub event_type: EventType,
    /// The listener.
    pub listener: Arc<dyn Listener>,
    /// Bucket the listener lives in.
    pub priority: Priority,
    /// Also deliver sub-events through ancestor handlers.
    pub propagate: bool,
}

impl Subscription {
    /// Create a subscription for an arbitrary listener.
    pub fn new<L: Listener>(
        event_type: EventType,
        listener: L,
        priority: Priority,
        propagate: bool,
    ) -> Self {
        Self {
            event_type,
            listener: Arc::new(listener),
            priority,
            propagate,
        }
    }

    /// Create a subscription for a closure over `&mut E`.
    pub fn typed<E, R, F>(f: F, priority: Priority, propagate: bool) -> Self
    where
        E: Event,
        R: IntoListenerResult,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
    {
        Self::new(EventType::of::<E>(), typed(f), priority, propagate)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.event_type)
            .field("priority", &self.priority)
            .field("propagate", &self.propagate)
            .finish_non_exhaustive()
    }
}

/// An object whose methods listen to events.
///
/// The returned listeners may hold clones of the `Arc` to call back into `self`.
pub trait Subscriber: Send + Sync + 'static {
    /// The listeners declared by this object.
    fn subscriptions(self: Arc<Self>) -> Result<Vec<Subscription>, ListenerError>;
}

/// A type whose associated functions listen to events.
pub trait StaticSubscriber {
    /// The listeners declared by this type.
    fn static_subscriptions() -> Result<Vec<Subscription>, ListenerError>;
}
