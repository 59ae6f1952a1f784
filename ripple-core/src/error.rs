//! Error types for Ripple.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RippleError`] - Top-level error type for all Ripple operations
//! - [`RegistryError`] - Errors while registering or removing event types and listeners
//! - [`DispatchError`] - Errors during event dispatch
//! - [`ListenerError`] - Errors reported by listener discovery
//! - [`SlotError`] - Errors from the slot allocator

use crate::token::ListenerToken;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Ripple operations.
#[derive(Error, Debug)]
pub enum RippleError {
    /// An error occurred while registering or removing.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An error occurred during event dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A discovery collaborator reported a problem.
    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    /// The slot allocator rejected an operation.
    #[error("slot error: {0}")]
    Slot(#[from] SlotError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that can occur while registering or removing event types and listeners.
///
/// Every variant is raised before any state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The listener slot pool is exhausted.
    #[error("cannot register more than {capacity} listeners")]
    CapacityExceeded {
        /// Capacity of the slot pool.
        capacity: usize,
    },

    /// The event type pool is exhausted.
    #[error("cannot register more than {max} event types in one manager")]
    TooManyEventTypes {
        /// Maximum number of event types.
        max: usize,
    },

    /// The event type was never registered with this manager.
    #[error("event type `{0}` has not been registered")]
    UnknownEventType(&'static str),

    /// A token carried an event key that does not resolve to a registered type.
    #[error("no event type registered under key {0}")]
    UnknownEventKey(u16),

    /// The event type was already registered.
    #[error("event type `{0}` is already registered")]
    AlreadyRegistered(&'static str),

    /// The token decodes, but no live registration carries it.
    #[error("listener {0} is not registered")]
    InvalidToken(ListenerToken),
}

/// Errors that can occur during event dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener failed; the remaining dispatch for this call was abandoned.
    #[error("listener {token} failed")]
    Listener {
        /// Token of the failing listener.
        token: ListenerToken,
        /// The listener's error.
        #[source]
        source: BoxError,
    },

    /// The exact type of the dispatched event has no handler.
    #[error("event type `{0}` has not been registered")]
    UnregisteredEvent(&'static str),
}

/// Errors reported by listener discovery collaborators.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// A candidate listener does not take exactly one event-typed parameter.
    #[error("misconfigured listener: {0}")]
    Misconfigured(String),

    /// Registering a discovered listener failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from the slot allocator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// No free slot remains.
    #[error("slot capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Capacity of the allocator.
        capacity: usize,
    },

    /// The slot id lies outside the allocator's capacity.
    #[error("slot {slot} is out of range for capacity {capacity}")]
    OutOfRange {
        /// The offending slot id.
        slot: usize,
        /// Capacity of the allocator.
        capacity: usize,
    },
}

// Convenience conversions
impl From<BoxError> for RippleError {
    fn from(err: BoxError) -> Self {
        RippleError::Custom(err)
    }
}
