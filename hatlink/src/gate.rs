//! Blocking gate: the shared producer/consumer notification primitive.
//!
//! A `BlockingGate<T>` lets any number of consumer threads block until a
//! value posted by the asynchronous delivery context satisfies a predicate.
//! The predicate check and the wait are atomic with respect to `post`, so a
//! value posted between check and sleep can never be lost, and spurious
//! wakeups simply re-check.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Latest posted value plus a generation counter bumped on every post.
#[derive(Debug)]
struct GateSlot<T> {
    value: Option<T>,
    generation: u64,
}

/// Mutex + condition variable around a single latched value.
///
/// The producer calls [`post`](Self::post) from the delivery context; each
/// consumer calls [`wait_until`](Self::wait_until) (or the bounded variant)
/// from its own thread. All waiters are woken on every post and re-evaluate
/// their predicate against the current value.
#[derive(Debug)]
pub struct BlockingGate<T> {
    slot: Mutex<GateSlot<T>>,
    cond: Condvar,
}

impl<T: Clone> BlockingGate<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(GateSlot {
                value: None,
                generation: 0,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateSlot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value`, bump the generation counter and wake all waiters.
    pub fn post(&self, value: T) {
        let mut slot = self.lock();
        slot.value = Some(value);
        slot.generation = slot.generation.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Wake all waiters without posting a new value, so compound predicates
    /// (settled-or-cancelled) are re-evaluated against the current value.
    pub fn poke(&self) {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Block until the latest posted value satisfies `pred`, then return it.
    ///
    /// If a satisfying value is already present the call returns without
    /// sleeping. There is no timeout: a predicate that is never satisfied
    /// blocks the caller indefinitely.
    pub fn wait_until<F>(&self, mut pred: F) -> T
    where
        F: FnMut(&T) -> bool,
    {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.value.as_ref() {
                if pred(value) {
                    return value.clone();
                }
            }
            slot = self.cond.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Bounded variant of [`wait_until`](Self::wait_until).
    ///
    /// Returns `None` if `timeout` elapses before any value satisfies the
    /// predicate. The deadline is computed once, so repeated wakeups do not
    /// extend the wait.
    pub fn wait_until_for<F>(&self, mut pred: F, timeout: Duration) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.value.as_ref() {
                if pred(value) {
                    return Some(value.clone());
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, _timed_out) = self
                .cond
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            slot = guard;
        }
    }

    /// The most recently posted value, if any.
    pub fn latest(&self) -> Option<T> {
        self.lock().value.clone()
    }
}

impl<T: Clone> Default for BlockingGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
