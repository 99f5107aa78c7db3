//! Managed command tasks.
//!
//! Non-blocking commands run on a named worker thread whose handle is
//! retained, so in-flight commands can be tracked, joined, or cancelled
//! deterministically, with no detached threads.

use hatlink_common::error::DeviceError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::debug;

/// Cooperative cancellation flag shared between a task and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle to one in-flight command.
///
/// The body observes the [`CancelToken`] at its wait points; `cancel`
/// additionally invokes the registered wake hook so a blocked wait
/// re-evaluates immediately. Dropping the handle without joining detaches
/// the worker (it still runs to completion).
pub struct CommandTask {
    handle: Option<JoinHandle<Result<(), DeviceError>>>,
    cancel: CancelToken,
    wake: Box<dyn Fn() + Send>,
    name: String,
}

impl CommandTask {
    /// Spawn a named worker running `body`.
    ///
    /// `wake` is called after the token is set by [`cancel`](Self::cancel)
    /// so the body's blocking wait re-checks the token.
    pub fn spawn<F, W>(name: &str, wake: W, body: F) -> Result<Self, DeviceError>
    where
        F: FnOnce(CancelToken) -> Result<(), DeviceError> + Send + 'static,
        W: Fn() + Send + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(token))
            .map_err(|e| DeviceError::SpawnFailed(e.to_string()))?;
        debug!("spawned command task {name}");
        Ok(Self {
            handle: Some(handle),
            cancel,
            wake: Box::new(wake),
            name: name.to_string(),
        })
    }

    /// Request cancellation and wake the task's blocking wait.
    /// Does not wait for the task to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
        (self.wake)();
    }

    /// True once the worker has terminated.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Block until the worker terminates and return the command's result.
    pub fn join(mut self) -> Result<(), DeviceError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| DeviceError::WorkerLost)?,
            None => Err(DeviceError::WorkerLost),
        }
    }
}

impl Drop for CommandTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                debug!("command task {} detached without join", self.name);
            }
        }
    }
}
