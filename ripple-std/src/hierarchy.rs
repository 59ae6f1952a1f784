//! Memoized ancestor chains.

use ripple_core::EventType;
use std::collections::HashMap;

/// Caches, per event type, the ordered list of its ancestors.
///
/// A chain runs from the nearest parent to the furthest ancestor and never
/// contains the type itself. Chains are computed on first request by following
/// [`EventType::parent`] and kept for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct TypeHierarchyCache {
    chains: HashMap<EventType, Box<[EventType]>>,
}

impl TypeHierarchyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ancestor chain of `ty`, computing it on first use.
    pub fn ancestors_of(&mut self, ty: EventType) -> &[EventType] {
        self.chains.entry(ty).or_insert_with(|| walk(ty))
    }

    /// The ancestor chain of `ty` if it has already been computed.
    pub fn get(&self, ty: EventType) -> Option<&[EventType]> {
        self.chains.get(&ty).map(|chain| &**chain)
    }

    /// Whether the chain of `ty` has been computed.
    pub fn contains(&self, ty: EventType) -> bool {
        self.chains.contains_key(&ty)
    }

    /// Number of cached chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn walk(ty: EventType) -> Box<[EventType]> {
    let mut chain = Vec::new();
    let mut current = ty.parent();
    while let Some(parent) = current {
        // A parent function that loops back would otherwise never terminate.
        if parent == ty || chain.contains(&parent) {
            tracing::warn!(event = %ty, ancestor = %parent, "event hierarchy contains a cycle");
            break;
        }
        chain.push(parent);
        current = parent.parent();
    }
    tracing::trace!(event = %ty, depth = chain.len(), "cached ancestor chain");
    chain.into_boxed_slice()
}
