//! # ripple-std
//!
//! Standard implementations for the Ripple event dispatch engine.
//!
//! This crate provides:
//! - **Slot allocation**: [`SlotAllocator`]
//! - **Hierarchy caching**: [`TypeHierarchyCache`]
//! - **Priority dispatch**: [`EventHandler`]
//! - **Registration and fan-out**: [`EventManager`], [`SharedEventManager`]
//! - **Test helpers**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use ripple_core;

pub mod allocator;
pub mod handler;
pub mod hierarchy;
pub mod manager;
pub mod testing;

pub use allocator::SlotAllocator;
pub use handler::EventHandler;
pub use hierarchy::TypeHierarchyCache;
pub use manager::{
    EventManager, HandlerFactory, MAX_EVENT_TYPES, MAX_SLOTS, ManagerConfig, SharedEventManager,
};
