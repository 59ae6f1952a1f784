//! # ripple - Priority-Ordered Event Dispatch
//!
//! `ripple` is an in-process, synchronous event engine. Listeners register for
//! an event type at one of seven priorities; invoking an event runs them in
//! priority order, honors cancellation, and then lets the event ripple up to
//! the handlers of its ancestor types.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ripple::prelude::*;
//!
//! #[derive(Event)]
//! struct Chat {
//!     message: String,
//!     #[event(cancelled)]
//!     cancelled: bool,
//! }
//!
//! let mut manager = EventManager::new();
//! manager.register::<Chat>()?;
//!
//! let token = manager.listen(Priority::Low, false, |chat: &mut Chat| {
//!     if chat.message.contains("spam") {
//!         chat.cancelled = true;
//!     }
//! })?;
//!
//! let report = manager.invoke(&mut Chat { message: "spam".into(), cancelled: false })?;
//! assert!(report.cancelled);
//!
//! manager.unregister(token)?;
//! ```
//!
//! ## Ancestors
//!
//! An event type names its parent with [`Event::parent_type`] and embeds the
//! parent value. Listeners registered on the parent with the ancestor flag
//! (`propagate = true`) also receive every sub-event:
//!
//! ```rust,ignore
//! #[derive(Event)]
//! struct PrivateChat {
//!     #[event(parent)]
//!     chat: Chat,
//!     recipient: String,
//! }
//!
//! manager.register::<PrivateChat>()?;
//! manager.listen(Priority::Top, true, |chat: &mut Chat| audit(&chat.message))?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use ripple_core::{
    // Errors
    BoxError,
    // Events
    Cancellable,
    DispatchError,
    // Handlers
    DispatchReport,
    Dispatcher,
    Event,
    EventObject,
    EventType,
    FailurePolicy,
    // Listeners
    IntoListenerResult,
    Listener,
    ListenerError,
    // Identities
    ListenerToken,
    Priority,
    PriorityMask,
    RegistryError,
    RippleError,
    SlotError,
    // Discovery
    StaticSubscriber,
    Subscriber,
    Subscription,
    TypedListener,
    typed,
};

pub use ripple_std::{
    EventHandler, EventManager, HandlerFactory, MAX_EVENT_TYPES, MAX_SLOTS, ManagerConfig,
    SharedEventManager, SlotAllocator, TypeHierarchyCache,
};

/// Testing utilities.
pub mod testing {
    pub use ripple_std::testing::{CountingListener, Recorder, RecordingListener};
}

/// Prelude module - common imports for Ripple.
///
/// # Usage
///
/// ```rust,ignore
/// use ripple::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Cancellable, DispatchError, DispatchReport, Event, EventManager, EventType,
        FailurePolicy, Listener, ListenerToken, ManagerConfig, Priority, RegistryError,
        SharedEventManager, StaticSubscriber, Subscriber, Subscription, typed,
    };

    #[cfg(feature = "macros")]
    pub use crate::listeners;
}

#[cfg(feature = "macros")]
pub use ripple_macros::{Event, listeners};
