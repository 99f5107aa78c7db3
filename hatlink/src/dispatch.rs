//! Per-device sample fan-out.
//!
//! The driver exposes exactly one replaceable callback slot per device, so
//! registering a second logical consumer there would silently clobber the
//! first. Each device therefore registers a single `SampleDispatcher` at
//! attach time and fans every incoming sample out to an ordered list of
//! tagged observers. Re-registering a tag replaces that observer in place;
//! all others keep their position.

use std::sync::{Mutex, PoisonError};

/// Tags identifying the logical consumers sharing one delivery slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// Feeds the settle window and posts completion signals.
    Completion,
    /// Rotation-delta filter in front of the user handler.
    Rotation,
    /// Threshold hysteresis in front of the user handlers.
    Range,
    /// Posts readings for blocking waits.
    Wait,
}

struct Tap<S> {
    kind: TapKind,
    handler: Box<dyn FnMut(&S) + Send>,
}

/// Ordered, tagged observer list behind one driver callback slot.
///
/// `dispatch` runs in the delivery context and invokes observers in
/// registration order under the internal lock; handlers must not block and
/// must not re-enter the dispatcher.
pub struct SampleDispatcher<S> {
    taps: Mutex<Vec<Tap<S>>>,
}

impl<S> SampleDispatcher<S> {
    pub fn new() -> Self {
        Self {
            taps: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Tap<S>>> {
        self.taps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` under `kind`. An observer already registered
    /// under the same tag is replaced in place; otherwise the handler is
    /// appended, after all existing observers.
    pub fn register(&self, kind: TapKind, handler: Box<dyn FnMut(&S) + Send>) {
        let mut taps = self.lock();
        if let Some(tap) = taps.iter_mut().find(|t| t.kind == kind) {
            tap.handler = handler;
        } else {
            taps.push(Tap { kind, handler });
        }
    }

    /// Remove the observer registered under `kind`, if any.
    pub fn unregister(&self, kind: TapKind) {
        self.lock().retain(|t| t.kind != kind);
    }

    /// Fan one sample out to every observer, in registration order.
    pub fn dispatch(&self, sample: &S) {
        for tap in self.lock().iter_mut() {
            (tap.handler)(sample);
        }
    }
}

impl<S> Default for SampleDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}
