//! # Events
//!
//! An event is any `Send + Sync + 'static` value implementing [`Event`]. The trait
//! carries the two optional capabilities the engine relies on:
//!
//! - **Ancestry**: [`Event::parent_type`] names the immediate parent event type.
//!   Sub-events embed their parent value and expose it through
//!   [`Event::as_ancestor`] / [`Event::as_ancestor_mut`], so a listener written for
//!   the parent type can observe a sub-event.
//! - **Cancellation**: [`Event::as_cancellable`] exposes a [`Cancellable`] view.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Login { user: String, cancelled: bool }
//!
//! impl Cancellable for Login {
//!     fn is_cancelled(&self) -> bool { self.cancelled }
//!     fn set_cancelled(&mut self, cancelled: bool) { self.cancelled = cancelled }
//! }
//!
//! impl Event for Login {
//!     fn as_cancellable(&self) -> Option<&dyn Cancellable> { Some(self) }
//!     fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> { Some(self) }
//! }
//! ```

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// A value that can be dispatched through an event manager.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Event`",
    label = "missing `Event` implementation",
    note = "Implement `Event` (or derive it with `#[derive(Event)]`) for `{Self}`."
)]
pub trait Event: EventObject + Send + Sync + 'static {
    /// The immediate parent event type, if any.
    ///
    /// Ancestor chains are built by following this function until it returns `None`.
    fn parent_type() -> Option<EventType>
    where
        Self: Sized,
    {
        None
    }

    /// Views this event as one of its strict ancestors.
    fn as_ancestor(&self, ty: EventType) -> Option<&dyn Any> {
        let _ = ty;
        None
    }

    /// Mutable version of [`Event::as_ancestor`].
    fn as_ancestor_mut(&mut self, ty: EventType) -> Option<&mut dyn Any> {
        let _ = ty;
        None
    }

    /// The cancellable capability, if this event supports it.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// Mutable version of [`Event::as_cancellable`].
    fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        None
    }
}

/// Object-safe identity of an event value.
///
/// Implemented for every sized [`Event`]; do not implement it by hand.
pub trait EventObject {
    /// The exact runtime type of this event.
    fn event_type(&self) -> EventType;

    /// Upcast to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Event> EventObject for T {
    fn event_type(&self) -> EventType {
        EventType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Event {
    /// Returns `true` if the exact type of this event is `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to the exact type `T`.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutably downcasts to the exact type `T`.
    pub fn downcast_mut<T: Event>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Views this event as `T`, either its exact type or one of its ancestors.
    pub fn view<T: Event>(&self) -> Option<&T> {
        if let Some(exact) = self.as_any().downcast_ref::<T>() {
            return Some(exact);
        }
        self.as_ancestor(EventType::of::<T>())?.downcast_ref()
    }

    /// Mutable version of [`view`](Self::view).
    pub fn view_mut<T: Event>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            return self.as_any_mut().downcast_mut();
        }
        self.as_ancestor_mut(EventType::of::<T>())?.downcast_mut()
    }

    /// The cancelled flag, or `None` if the event is not cancellable.
    pub fn is_cancelled(&self) -> Option<bool> {
        self.as_cancellable().map(Cancellable::is_cancelled)
    }

    /// Sets the cancelled flag. Returns `false` if the event is not cancellable.
    pub fn set_cancelled(&mut self, cancelled: bool) -> bool {
        match self.as_cancellable_mut() {
            Some(cancellable) => {
                cancellable.set_cancelled(cancelled);
                true
            }
            None => false,
        }
    }
}

/// Events whose propagation can be cancelled by a listener.
///
/// Once cancelled, listeners below [`Priority::Top`](crate::Priority::Top) stop
/// being invoked, and so do handlers further up the ancestor chain.
pub trait Cancellable {
    /// Whether the event has been cancelled.
    fn is_cancelled(&self) -> bool;

    /// Sets the cancelled flag.
    fn set_cancelled(&mut self, cancelled: bool);

    /// Shorthand for `set_cancelled(true)`.
    fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

/// Stable identity of one kind of event.
///
/// Equality and hashing use the Rust type identity only; the name and parent
/// function ride along for diagnostics and ancestor walks.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    parent: fn() -> Option<EventType>,
}

impl EventType {
    /// The identity of event type `E`.
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            parent: E::parent_type,
        }
    }

    /// The immediate parent event type.
    pub fn parent(&self) -> Option<EventType> {
        (self.parent)()
    }

    /// The Rust type name of this event type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
