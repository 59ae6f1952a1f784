//! # Listeners
//!
//! A [`Listener`] is the callable the engine invokes for each dispatched event.
//! It always receives the type-erased `&mut dyn Event`; the same listener may be
//! stored in the handler of its own event type and in the handlers of that type's
//! ancestors, so it can observe events of several concrete types.
//!
//! [`typed`] wraps a closure over one concrete event type and only calls it when
//! the dispatched event can be viewed as that type.
//!
//! # Example
//!
//! ```rust,ignore
//! let listener = typed(|login: &mut Login| {
//!     println!("{} logged in", login.user);
//! });
//! ```

use crate::{error::BoxError, event::Event};
use std::marker::PhantomData;

/// A callback interested in events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Wrap closures over a concrete event type with `ripple::typed`."
)]
pub trait Listener: Send + Sync + 'static {
    /// Called once per delivery of an event to this listener.
    fn on_event(&self, event: &mut dyn Event) -> Result<(), BoxError>;
}

impl<F> Listener for F
where
    F: Fn(&mut dyn Event) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut dyn Event) -> Result<(), BoxError> {
        self(event)
    }
}

/// Return values a listener body may produce.
pub trait IntoListenerResult {
    /// Converts into the listener outcome.
    fn into_listener_result(self) -> Result<(), BoxError>;
}

impl IntoListenerResult for () {
    fn into_listener_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoListenerResult for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_listener_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A listener over one concrete event type. See [`typed`].
pub struct TypedListener<E, F> {
    f: F,
    _event: PhantomData<fn(&mut E)>,
}

/// Adapts a closure over `&mut E` into a [`Listener`].
///
/// The closure runs when the dispatched event is an `E` or embeds one as an
/// ancestor; any other event is skipped. The closure may return `()` or a
/// `Result<(), impl Into<BoxError>>`.
pub fn typed<E, R, F>(f: F) -> TypedListener<E, F>
where
    E: Event,
    R: IntoListenerResult,
    F: Fn(&mut E) -> R + Send + Sync + 'static,
{
    TypedListener {
        f,
        _event: PhantomData,
    }
}

impl<E, R, F> Listener for TypedListener<E, F>
where
    E: Event,
    R: IntoListenerResult,
    F: Fn(&mut E) -> R + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut dyn Event) -> Result<(), BoxError> {
        match event.view_mut::<E>() {
            Some(event) => (self.f)(event).into_listener_result(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Ping(u32);
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    #[test]
    fn test_closure_listener() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let listener = move |_event: &mut dyn Event| -> Result<(), BoxError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        listener.on_event(&mut Ping(1)).unwrap();
        listener.on_event(&mut Pong).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_typed_listener_skips_other_types() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let listener = typed(move |ping: &mut Ping| {
            counter.fetch_add(ping.0 as usize, Ordering::SeqCst);
            ping.0 += 1;
        });

        let mut ping = Ping(5);
        listener.on_event(&mut ping).unwrap();
        listener.on_event(&mut Pong).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(ping.0, 6);
    }

    #[test]
    fn test_typed_listener_errors() {
        let listener = typed(|_: &mut Ping| Err::<(), _>("boom"));
        let err = listener.on_event(&mut Ping(0)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
