//! Testing utilities for Ripple.
//!
//! This module provides listeners that make dispatch order and cancellation
//! behavior easy to assert on.
//!
//! # Features
//!
//! - [`Recorder`]: A shared log of listener labels, in invocation order
//! - [`RecordingListener`]: A listener that writes its label into a [`Recorder`]
//! - [`CountingListener`]: A listener that counts invocations

use ripple_core::{BoxError, Event, Listener};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recorder
// ============================================================================

/// A shared, ordered log of which listeners ran.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Recorder::new();
/// manager.register_listener(ty, recorder.listener("first"), Priority::Normal, false)?;
/// manager.register_listener(ty, recorder.cancelling("second"), Priority::High, false)?;
///
/// manager.invoke(&mut event)?;
/// assert_eq!(recorder.calls(), ["first", "second"]);
/// ```
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that records `label`.
    pub fn listener(&self, label: &'static str) -> RecordingListener {
        self.make(label, Action::Record)
    }

    /// A listener that records `label`, then cancels the event.
    pub fn cancelling(&self, label: &'static str) -> RecordingListener {
        self.make(label, Action::Cancel)
    }

    /// A listener that records `label`, then clears the cancelled flag.
    pub fn uncancelling(&self, label: &'static str) -> RecordingListener {
        self.make(label, Action::Uncancel)
    }

    /// A listener that records `label`, then fails.
    pub fn failing(&self, label: &'static str) -> RecordingListener {
        self.make(label, Action::Fail)
    }

    /// The labels recorded so far.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn make(&self, label: &'static str, action: Action) -> RecordingListener {
        RecordingListener {
            recorder: self.clone(),
            label,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Record,
    Cancel,
    Uncancel,
    Fail,
}

/// A listener created by a [`Recorder`].
pub struct RecordingListener {
    recorder: Recorder,
    label: &'static str,
    action: Action,
}

impl Listener for RecordingListener {
    fn on_event(&self, event: &mut dyn Event) -> Result<(), BoxError> {
        self.recorder.calls.lock().unwrap().push(self.label);
        match self.action {
            Action::Record => Ok(()),
            Action::Cancel => {
                event.set_cancelled(true);
                Ok(())
            }
            Action::Uncancel => {
                event.set_cancelled(false);
                Ok(())
            }
            Action::Fail => Err(format!("{} failed", self.label).into()),
        }
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts invocations.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingListener::new();
/// manager.register_listener(ty, counter.clone(), Priority::Normal, false)?;
///
/// manager.invoke(&mut event)?;
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a new counting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Listener for CountingListener {
    fn on_event(&self, _event: &mut dyn Event) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
