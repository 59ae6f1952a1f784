//! # ripple-core
//!
//! Core vocabulary for the Ripple event dispatch engine.
//!
//! This crate has minimal dependencies and is meant to be imported by code that
//! declares events and listeners without needing the engine itself.
//!
//! # Building Blocks
//!
//! ## Events ([`Event`])
//!
//! Any `Send + Sync + 'static` value can be an event. An event type may name an
//! immediate parent type ([`Event::parent_type`]), which turns the set of event
//! types into a tree the engine walks when propagating to ancestor handlers.
//! Events may optionally expose the [`Cancellable`] capability.
//!
//! ## Identities ([`EventType`], [`Priority`], [`ListenerToken`])
//!
//! - [`EventType`] is a stable, hashable identity for one kind of event.
//! - [`Priority`] orders listeners into seven buckets; [`Priority::Top`] ignores cancellation.
//! - [`ListenerToken`] packs priority, event key, ancestor flag and slot id into 32 bits.
//!
//! ## Listeners ([`Listener`])
//!
//! A listener receives `&mut dyn Event`. [`typed`] adapts a closure over a concrete
//! event type, viewing sub-events through their embedded ancestors.
//!
//! ## Handlers ([`Dispatcher`])
//!
//! The seam between the manager and a per-event-type listener store. The standard
//! implementation lives in `ripple-std`.
//!
//! ## Discovery ([`Subscriber`], [`StaticSubscriber`])
//!
//! The boundary for listener discovery: collaborators yield [`Subscription`] tuples.
//!
//! # Error Types
//!
//! - [`RippleError`] - Top-level error type
//! - [`RegistryError`] - Registration and removal errors
//! - [`DispatchError`] - Errors raised while invoking an event
//! - [`ListenerError`] - Errors reported by discovery collaborators

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod dispatcher;
mod error;
mod event;
mod listener;
mod priority;
mod subscriber;
mod token;

// Re-exports
pub use dispatcher::{DispatchReport, Dispatcher, FailurePolicy};
pub use error::{BoxError, DispatchError, ListenerError, RegistryError, RippleError, SlotError};
pub use event::{Cancellable, Event, EventObject, EventType};
pub use listener::{IntoListenerResult, Listener, TypedListener, typed};
pub use priority::{Priority, PriorityMask};
pub use subscriber::{StaticSubscriber, Subscriber, Subscription};
pub use token::ListenerToken;
