//! # ripple-macros
//!
//! Procedural macros for Ripple. Use them through the `ripple` crate, which
//! re-exports them when the `macros` feature is enabled.
//!
//! - `#[derive(Event)]` - Implements `Event` (and `Cancellable`) for a struct
//! - `#[listeners]` - Turns the annotated functions of an impl block into subscriptions

use proc_macro::TokenStream;

mod event;
mod listeners;

/// Derive `Event` for a struct.
///
/// # Field attributes
///
/// - `#[event(cancelled)]` on a `bool` field makes the event cancellable,
///   backed by that field.
/// - `#[event(parent)]` on a field holding another event makes that field's
///   type the parent event type. Listeners of the parent (and of its own
///   ancestors) observe this event through the field. Without its own
///   `cancelled` field, the event inherits the parent's cancellation. With
///   one, cancelling writes both flags and the event reads as cancelled when
///   either is set.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Event)]
/// struct PlayerEvent {
///     name: String,
///     #[event(cancelled)]
///     cancelled: bool,
/// }
///
/// #[derive(Event)]
/// struct PlayerJoin {
///     #[event(parent)]
///     player: PlayerEvent,
///     first_time: bool,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Collect the `#[listener]` functions of an impl block.
///
/// Methods taking `&self` become a `Subscriber` implementation; associated
/// functions become a `StaticSubscriber` implementation. Each listener takes
/// exactly one argument, `&E` or `&mut E`, where `E` is the event type, and
/// returns `()` or `Result<(), impl Into<BoxError>>`.
///
/// # Listener options
///
/// - `priority = High` - bucket to register in (default `Normal`)
/// - `subtypes` - also receive sub-events through ancestor handlers
///
/// # Example
///
/// ```rust,ignore
/// struct Audit { log: Mutex<Vec<String>> }
///
/// #[listeners]
/// impl Audit {
///     #[listener(priority = Highest, subtypes)]
///     fn on_player(&self, event: &PlayerEvent) {
///         self.log.lock().unwrap().push(event.name.clone());
///     }
///
///     #[listener]
///     fn on_join(event: &mut PlayerJoin) {
///         event.first_time = false;
///     }
/// }
///
/// manager.register_subscriber(Arc::new(audit))?;
/// manager.register_static::<Audit>()?;
/// ```
#[proc_macro_attribute]
pub fn listeners(attr: TokenStream, item: TokenStream) -> TokenStream {
    listeners::listeners_impl(attr, item)
}
