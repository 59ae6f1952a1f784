//! Compact listener identity.
//!
//! A [`ListenerToken`] packs four fields into a `u32`, no field straddling another:
//!
//! | bits  | field                        | range       |
//! |-------|------------------------------|-------------|
//! | 0–2   | priority ordinal             | 0–6         |
//! | 3–14  | event-type key               | 0–4094      |
//! | 15    | propagate-to-ancestors flag  | 0/1         |
//! | 16–31 | slot id                      | 0–65534     |
//!
//! Encoding and decoding are exact inverses over these ranges. Slot id 65535
//! fits the field, but the slot pool never issues it.

use crate::priority::Priority;
use std::fmt;

const PRIORITY_MASK: u32 = 0b111;
const KEY_SHIFT: u32 = 3;
const KEY_MASK: u32 = 0xFFF;
const PROPAGATE_BIT: u32 = 1 << 15;
const SLOT_SHIFT: u32 = 16;

/// Opaque identity of one listener registration.
///
/// Only meaningful to the manager that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u32);

impl ListenerToken {
    /// Largest event key a token can carry. The all-ones key is reserved.
    pub const MAX_EVENT_KEY: u16 = 4094;

    /// Number of distinct event keys.
    pub const EVENT_KEYS: usize = Self::MAX_EVENT_KEY as usize + 1;

    /// Number of distinct slot ids.
    pub const SLOTS: usize = 1 << 16;

    /// Packs the four fields.
    ///
    /// # Panics
    ///
    /// Panics if `event_key` exceeds [`ListenerToken::MAX_EVENT_KEY`].
    pub const fn new(priority: Priority, event_key: u16, propagate: bool, slot: u16) -> Self {
        assert!(event_key <= Self::MAX_EVENT_KEY, "event key out of range");
        let mut raw = priority.ordinal() as u32;
        raw |= (event_key as u32) << KEY_SHIFT;
        if propagate {
            raw |= PROPAGATE_BIT;
        }
        raw |= (slot as u32) << SLOT_SHIFT;
        Self(raw)
    }

    /// Decodes a raw value, rejecting the reserved priority and key encodings.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        let priority = (raw & PRIORITY_MASK) as u8;
        let key = (raw >> KEY_SHIFT) & KEY_MASK;
        if Priority::from_ordinal(priority).is_none() || key > Self::MAX_EVENT_KEY as u32 {
            return None;
        }
        Some(Self(raw))
    }

    /// The packed representation.
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    /// The priority bucket this listener lives in.
    pub const fn priority(self) -> Priority {
        match Priority::from_ordinal((self.0 & PRIORITY_MASK) as u8) {
            Some(p) => p,
            None => unreachable!(),
        }
    }

    /// The key of the event type the listener was registered for.
    pub const fn event_key(self) -> u16 {
        ((self.0 >> KEY_SHIFT) & KEY_MASK) as u16
    }

    /// Whether the listener is also delivered sub-events through ancestor handlers.
    pub const fn propagates(self) -> bool {
        self.0 & PROPAGATE_BIT != 0
    }

    /// The slot id owned by this registration.
    pub const fn slot(self) -> u16 {
        (self.0 >> SLOT_SHIFT) as u16
    }
}

impl fmt::Debug for ListenerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerToken")
            .field("priority", &self.priority())
            .field("event_key", &self.event_key())
            .field("propagates", &self.propagates())
            .field("slot", &self.slot())
            .finish()
    }
}

impl fmt::Display for ListenerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<ListenerToken> for u32 {
    fn from(token: ListenerToken) -> Self {
        token.into_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let token = ListenerToken::new(Priority::High, 5, true, 3);
        assert_eq!(token.into_raw(), 4 | (5 << 3) | (1 << 15) | (3 << 16));

        let token = ListenerToken::new(Priority::Top, 0, false, 0);
        assert_eq!(token.into_raw(), 0);
    }

    #[test]
    fn test_fields_do_not_bleed() {
        let token = ListenerToken::new(
            Priority::Final,
            ListenerToken::MAX_EVENT_KEY,
            false,
            u16::MAX,
        );
        assert_eq!(token.priority(), Priority::Final);
        assert_eq!(token.event_key(), ListenerToken::MAX_EVENT_KEY);
        assert!(!token.propagates());
        assert_eq!(token.slot(), u16::MAX);
    }

    #[test]
    fn test_from_raw_rejects_reserved_encodings() {
        assert!(ListenerToken::from_raw(7).is_none());
        assert!(ListenerToken::from_raw(0xFFF << 3).is_none());

        let token = ListenerToken::new(Priority::Low, 42, true, 9);
        assert_eq!(ListenerToken::from_raw(token.into_raw()), Some(token));
    }

    #[test]
    #[should_panic(expected = "event key out of range")]
    fn test_new_rejects_reserved_key() {
        let _ = ListenerToken::new(Priority::Normal, 4095, false, 0);
    }

    #[test]
    fn test_display_is_hex() {
        let token = ListenerToken::new(Priority::Lowest, 1, false, 1);
        assert_eq!(token.to_string(), "0x00010009");
    }
}
