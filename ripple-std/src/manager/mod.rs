//! The event manager.
//!
//! [`EventManager`] maps event types to handlers, issues [`ListenerToken`]s, and
//! fans one `invoke` out over the exact-type handler and every ancestor handler.
//!
//! # Concurrency
//!
//! Registration and removal take `&mut self`; `invoke` takes `&self`. The borrow
//! checker therefore enforces a single writer or any number of concurrent
//! dispatchers. Use [`SharedEventManager`] to share a manager across threads.

mod config;
mod shared;

pub use config::{HandlerFactory, MAX_EVENT_TYPES, MAX_SLOTS, ManagerConfig};
pub use shared::SharedEventManager;

use crate::{allocator::SlotAllocator, hierarchy::TypeHierarchyCache};
use ripple_core::{
    DispatchError, DispatchReport, Dispatcher, Event, EventType, IntoListenerResult, Listener,
    ListenerError, ListenerToken, Priority, RegistryError, StaticSubscriber, Subscriber,
    Subscription, typed,
};
use std::{collections::HashMap, fmt, sync::Arc};

struct Registered {
    event_type: EventType,
    handler: Box<dyn Dispatcher>,
}

/// Registry of event types, handlers and listeners.
///
/// # Example
/// ```ignore
/// let mut manager = EventManager::new();
/// manager.register::<Login>()?;
///
/// let token = manager.listen(Priority::Normal, false, |login: &mut Login| {
///     println!("{} logged in", login.user);
/// })?;
///
/// manager.invoke(&mut Login::new("ferris"))?;
/// manager.unregister(token)?;
/// ```
pub struct EventManager {
    config: ManagerConfig,
    keys: HashMap<EventType, u16>,
    // Indexed by event key; keys are handed out sequentially and never reused.
    types: Vec<Registered>,
    hierarchy: TypeHierarchyCache,
    slots: SlotAllocator,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    /// Create a manager with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::new())
    }

    /// Create a manager with the given configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        let slots = SlotAllocator::new(config.slot_capacity);
        Self {
            config,
            keys: HashMap::new(),
            types: Vec::new(),
            hierarchy: TypeHierarchyCache::new(),
            slots,
        }
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Event types
    // ------------------------------------------------------------------

    /// Register `E` with a handler from the configured factory.
    pub fn register<E: Event>(&mut self) -> Result<u16, RegistryError> {
        self.register_event_type(EventType::of::<E>())
    }

    /// Register an event type with a handler from the configured factory.
    ///
    /// Returns the key assigned to the type.
    pub fn register_event_type(&mut self, event_type: EventType) -> Result<u16, RegistryError> {
        let handler = (self.config.handler_factory)();
        self.register_event_type_with(event_type, handler)
    }

    /// Register an event type with its own handler.
    pub fn register_event_type_with(
        &mut self,
        event_type: EventType,
        handler: Box<dyn Dispatcher>,
    ) -> Result<u16, RegistryError> {
        if self.keys.contains_key(&event_type) {
            return Err(RegistryError::AlreadyRegistered(event_type.name()));
        }
        if self.types.len() >= self.config.max_event_types {
            return Err(RegistryError::TooManyEventTypes {
                max: self.config.max_event_types,
            });
        }

        let key = self.types.len() as u16;
        self.keys.insert(event_type, key);
        self.types.push(Registered {
            event_type,
            handler,
        });
        // Warm the cache so `invoke` never has to compute a chain.
        let depth = self.hierarchy.ancestors_of(event_type).len();
        tracing::debug!(event = %event_type, key, depth, "registered event type");
        Ok(key)
    }

    /// Whether `event_type` has been registered.
    pub fn is_registered(&self, event_type: EventType) -> bool {
        self.keys.contains_key(&event_type)
    }

    /// The key assigned to `event_type`.
    pub fn event_key(&self, event_type: EventType) -> Option<u16> {
        self.keys.get(&event_type).copied()
    }

    /// The event type registered under `key`.
    pub fn event_type_of(&self, key: u16) -> Option<EventType> {
        self.types.get(key as usize).map(|r| r.event_type)
    }

    /// Number of registered event types.
    pub fn event_type_count(&self) -> usize {
        self.types.len()
    }

    /// The handler of `event_type`.
    pub fn handler(&self, event_type: EventType) -> Option<&dyn Dispatcher> {
        let key = self.event_key(event_type)?;
        Some(&*self.types[key as usize].handler)
    }

    /// The cached ancestor chain of a registered event type, nearest first.
    pub fn ancestors_of(&self, event_type: EventType) -> Option<&[EventType]> {
        self.hierarchy.get(event_type)
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register a listener for `event_type`.
    ///
    /// With `propagate`, the listener is also registered on every registered
    /// ancestor's handler and receives sub-events dispatched through it.
    ///
    /// Fails without side effects when the slot pool is full or the type is
    /// unknown.
    pub fn register_listener<L: Listener>(
        &mut self,
        event_type: EventType,
        listener: L,
        priority: Priority,
        propagate: bool,
    ) -> Result<ListenerToken, RegistryError> {
        self.register_shared(event_type, Arc::new(listener), priority, propagate)
    }

    /// Register a closure over `&mut E`. See [`typed`].
    pub fn listen<E, R, F>(
        &mut self,
        priority: Priority,
        propagate: bool,
        f: F,
    ) -> Result<ListenerToken, RegistryError>
    where
        E: Event,
        R: IntoListenerResult,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
    {
        self.register_listener(EventType::of::<E>(), typed(f), priority, propagate)
    }

    /// Register an already shared listener.
    pub fn register_shared(
        &mut self,
        event_type: EventType,
        listener: Arc<dyn Listener>,
        priority: Priority,
        propagate: bool,
    ) -> Result<ListenerToken, RegistryError> {
        let capacity = self.slots.capacity();
        if self.slots.peek().is_none() {
            return Err(RegistryError::CapacityExceeded { capacity });
        }
        let key = self
            .event_key(event_type)
            .ok_or(RegistryError::UnknownEventType(event_type.name()))?;

        let slot = self
            .slots
            .allocate()
            .map_err(|_| RegistryError::CapacityExceeded { capacity })?;
        let token = ListenerToken::new(priority, key, propagate, slot as u16);

        self.types[key as usize]
            .handler
            .register(token, Arc::clone(&listener));
        if propagate {
            for ancestor in self.hierarchy.ancestors_of(event_type) {
                if let Some(&ancestor_key) = self.keys.get(ancestor) {
                    self.types[ancestor_key as usize]
                        .handler
                        .register(token, Arc::clone(&listener));
                }
            }
        }

        tracing::debug!(
            event = %event_type,
            %token,
            slot,
            %priority,
            propagate,
            "registered listener"
        );
        Ok(token)
    }

    /// Register a batch of discovered listeners, all or nothing.
    pub fn register_all(
        &mut self,
        subscriptions: Vec<Subscription>,
    ) -> Result<Vec<ListenerToken>, RegistryError> {
        if subscriptions.len() > self.slots.available() {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.slots.capacity(),
            });
        }
        if let Some(unknown) = subscriptions
            .iter()
            .find(|s| !self.is_registered(s.event_type))
        {
            return Err(RegistryError::UnknownEventType(unknown.event_type.name()));
        }

        subscriptions
            .into_iter()
            .map(|s| self.register_shared(s.event_type, s.listener, s.priority, s.propagate))
            .collect()
    }

    /// Register every listener declared by `subscriber`.
    pub fn register_subscriber<S: Subscriber>(
        &mut self,
        subscriber: Arc<S>,
    ) -> Result<Vec<ListenerToken>, ListenerError> {
        let subscriptions = subscriber.subscriptions()?;
        Ok(self.register_all(subscriptions)?)
    }

    /// Register every listener declared by the associated functions of `S`.
    pub fn register_static<S: StaticSubscriber>(
        &mut self,
    ) -> Result<Vec<ListenerToken>, ListenerError> {
        let subscriptions = S::static_subscriptions()?;
        Ok(self.register_all(subscriptions)?)
    }

    /// Remove a listener and release its slot.
    ///
    /// A token that is not currently registered yields
    /// [`RegistryError::InvalidToken`] and leaves the manager untouched.
    pub fn unregister(&mut self, token: ListenerToken) -> Result<(), RegistryError> {
        let key = token.event_key();
        let entry = self
            .types
            .get_mut(key as usize)
            .ok_or(RegistryError::UnknownEventKey(key))?;
        if !entry.handler.remove(token) {
            return Err(RegistryError::InvalidToken(token));
        }

        let event_type = entry.event_type;
        if token.propagates() {
            for ancestor in self.hierarchy.ancestors_of(event_type) {
                if let Some(&ancestor_key) = self.keys.get(ancestor) {
                    self.types[ancestor_key as usize].handler.remove(token);
                }
            }
        }

        self.slots
            .release(token.slot() as usize)
            .map_err(|_| RegistryError::InvalidToken(token))?;
        tracing::debug!(event = %event_type, %token, "unregistered listener");
        Ok(())
    }

    /// Number of live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.slots.len()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Dispatch `event` to its own handler, then to its ancestors' handlers.
    ///
    /// The exact-type handler runs every listener; ancestor handlers, nearest
    /// first, only run listeners registered with the ancestor flag. The walk
    /// stops once a handler reports the event cancelled.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnregisteredEvent`] if the event's exact type was never
    /// registered; [`DispatchError::Listener`] if a listener fails under
    /// [`FailurePolicy::Propagate`](ripple_core::FailurePolicy::Propagate).
    pub fn invoke(&self, event: &mut dyn Event) -> Result<DispatchReport, DispatchError> {
        let event_type = event.event_type();
        let key = self
            .event_key(event_type)
            .ok_or(DispatchError::UnregisteredEvent(event_type.name()))?;
        let policy = self.config.failure_policy;

        let mut report = self.types[key as usize]
            .handler
            .invoke(event, false, policy)?;

        if !report.cancelled {
            let ancestors = self.hierarchy.get(event_type).unwrap_or_default();
            for ancestor in ancestors {
                let Some(&ancestor_key) = self.keys.get(ancestor) else {
                    continue;
                };
                let outcome = self.types[ancestor_key as usize]
                    .handler
                    .invoke(event, true, policy)?;
                report.merge(outcome);
                if report.cancelled {
                    break;
                }
            }
        }

        tracing::trace!(
            event = %event_type,
            invoked = report.invoked,
            cancelled = report.cancelled,
            "dispatched event"
        );
        Ok(report)
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("event_types", &self.types.len())
            .field("listeners", &self.slots.len())
            .field("failure_policy", &self.config.failure_policy)
            .finish_non_exhaustive()
    }
}
