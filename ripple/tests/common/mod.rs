#![allow(dead_code)]

use ripple::{Event, EventType};

// ============================================================================
// Test Event Types
// ============================================================================

/// Root of the test hierarchy; cancellable.
#[derive(Debug, Default, Event)]
pub struct Base {
    pub hits: usize,
    #[event(cancelled)]
    pub cancelled: bool,
}

/// Child of [`Base`]; inherits its cancellation.
#[derive(Debug, Default, Event)]
pub struct Mid {
    #[event(parent)]
    pub base: Base,
}

/// Grandchild of [`Base`].
#[derive(Debug, Default, Event)]
pub struct Leaf {
    #[event(parent)]
    pub mid: Mid,
    pub label: &'static str,
}

/// An event that cannot be cancelled.
#[derive(Debug, Default, Event)]
pub struct Plain {
    pub value: u32,
}

pub fn base() -> EventType {
    EventType::of::<Base>()
}

pub fn mid() -> EventType {
    EventType::of::<Mid>()
}

pub fn leaf() -> EventType {
    EventType::of::<Leaf>()
}

pub fn plain() -> EventType {
    EventType::of::<Plain>()
}
