//! Listener priorities and per-priority summary masks.

use bitflags::bitflags;
use std::{fmt, str::FromStr};

/// The priority of a listener.
///
/// Buckets run in ordinal order. [`Priority::Top`] runs first and ignores
/// cancellation; every later bucket stops once the event is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    /// Always invoked, even for cancelled events. Cancellation set here is
    /// respected from [`Priority::Lowest`] on.
    Top = 0,
    /// The first bucket that respects cancellation.
    Lowest = 1,
    /// Runs after [`Priority::Lowest`].
    Low = 2,
    /// Runs after [`Priority::Low`].
    #[default]
    Normal = 3,
    /// Runs after [`Priority::Normal`].
    High = 4,
    /// Runs after [`Priority::High`].
    Highest = 5,
    /// Runs last; listeners here should not mutate the event.
    Final = 6,
}

impl Priority {
    /// All priorities in dispatch order.
    pub const ALL: [Priority; 7] = [
        Priority::Top,
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
        Priority::Final,
    ];

    /// Number of priority levels.
    pub const COUNT: usize = Self::ALL.len();

    /// The ordinal, `0..=6`.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// The priority with the given ordinal.
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Priority::Top),
            1 => Some(Priority::Lowest),
            2 => Some(Priority::Low),
            3 => Some(Priority::Normal),
            4 => Some(Priority::High),
            5 => Some(Priority::Highest),
            6 => Some(Priority::Final),
            _ => None,
        }
    }

    /// Whether this is [`Priority::Top`].
    pub const fn is_top(self) -> bool {
        matches!(self, Priority::Top)
    }

    /// The variant name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Top => "Top",
            Priority::Lowest => "Lowest",
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Highest => "Highest",
            Priority::Final => "Final",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown priority `{s}`"))
    }
}

bitflags! {
    /// One bit per [`Priority`], used as a cached summary of bucket contents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PriorityMask: u8 {
        /// [`Priority::Top`]
        const TOP = 1 << 0;
        /// [`Priority::Lowest`]
        const LOWEST = 1 << 1;
        /// [`Priority::Low`]
        const LOW = 1 << 2;
        /// [`Priority::Normal`]
        const NORMAL = 1 << 3;
        /// [`Priority::High`]
        const HIGH = 1 << 4;
        /// [`Priority::Highest`]
        const HIGHEST = 1 << 5;
        /// [`Priority::Final`]
        const FINAL = 1 << 6;
    }
}

impl PriorityMask {
    /// The single bit for `priority`.
    pub const fn of(priority: Priority) -> Self {
        Self::from_bits_retain(1 << priority.ordinal())
    }

    /// Whether the bit for `priority` is set.
    pub const fn has(self, priority: Priority) -> bool {
        self.contains(Self::of(priority))
    }
}
