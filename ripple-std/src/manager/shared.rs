//! A thread-safe handle to an [`EventManager`].

use super::{EventManager, ManagerConfig};
use ripple_core::{
    DispatchError, DispatchReport, Event, EventType, IntoListenerResult, Listener, ListenerError,
    ListenerToken, Priority, RegistryError, StaticSubscriber, Subscriber,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cloneable, thread-safe [`EventManager`].
///
/// Dispatch takes a read lock, so any number of threads may invoke events at
/// once. Registration takes the write lock and waits for running dispatches.
///
/// A listener must not register or unregister through the same handle while
/// it is being invoked; the write lock would wait on the dispatch holding the
/// read lock.
///
/// A panic in a listener does not poison the handle for other threads.
#[derive(Clone, Default, Debug)]
pub struct SharedEventManager {
    inner: Arc<RwLock<EventManager>>,
}

impl From<EventManager> for SharedEventManager {
    fn from(manager: EventManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }
}

impl SharedEventManager {
    /// Create a shared manager with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared manager with the given configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        EventManager::with_config(config).into()
    }

    /// Lock the manager for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, EventManager> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the manager for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, EventManager> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`EventManager::register`].
    pub fn register<E: Event>(&self) -> Result<u16, RegistryError> {
        self.write().register::<E>()
    }

    /// See [`EventManager::register_event_type`].
    pub fn register_event_type(&self, event_type: EventType) -> Result<u16, RegistryError> {
        self.write().register_event_type(event_type)
    }

    /// See [`EventManager::register_listener`].
    pub fn register_listener<L: Listener>(
        &self,
        event_type: EventType,
        listener: L,
        priority: Priority,
        propagate: bool,
    ) -> Result<ListenerToken, RegistryError> {
        self.write()
            .register_listener(event_type, listener, priority, propagate)
    }

    /// See [`EventManager::listen`].
    pub fn listen<E, R, F>(
        &self,
        priority: Priority,
        propagate: bool,
        f: F,
    ) -> Result<ListenerToken, RegistryError>
    where
        E: Event,
        R: IntoListenerResult,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
    {
        self.write().listen(priority, propagate, f)
    }

    /// See [`EventManager::register_subscriber`].
    pub fn register_subscriber<S: Subscriber>(
        &self,
        subscriber: Arc<S>,
    ) -> Result<Vec<ListenerToken>, ListenerError> {
        self.write().register_subscriber(subscriber)
    }

    /// See [`EventManager::register_static`].
    pub fn register_static<S: StaticSubscriber>(
        &self,
    ) -> Result<Vec<ListenerToken>, ListenerError> {
        self.write().register_static::<S>()
    }

    /// See [`EventManager::unregister`].
    pub fn unregister(&self, token: ListenerToken) -> Result<(), RegistryError> {
        self.write().unregister(token)
    }

    /// See [`EventManager::invoke`].
    pub fn invoke(&self, event: &mut dyn Event) -> Result<DispatchReport, DispatchError> {
        self.read().invoke(event)
    }

    /// See [`EventManager::listener_count`].
    pub fn listener_count(&self) -> usize {
        self.read().listener_count()
    }
}
