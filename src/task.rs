//! Cancellation and background execution for the long-running operations
//! (document loads and polygon overlays).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::error::{EngineError, Result};

/// Shared cancellation flag, polled between units of work.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }

    /// Bail out with `Cancelled` if the flag has been raised.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(EngineError::Cancelled) } else { Ok(()) }
    }
}

/// A computation running on its own thread. Its output is only observable
/// through `join`, so callers never see partial results.
#[derive(Debug)]
pub struct Task<T> {
    handle: JoinHandle<Result<T>>,
    cancel: CancelFlag,
}

impl<T: Send + 'static> Task<T> {
    /// Run `work` on a new thread, handing it the task's cancellation flag.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce(&CancelFlag) -> Result<T> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let handle = thread::spawn(move || work(&flag));
        Self { handle, cancel }
    }

    /// Request cancellation; the worker stops at its next checkpoint.
    pub fn cancel(&self) { self.cancel.cancel() }

    /// Wait for completion. A cancelled task reports `Cancelled` even if it
    /// managed to finish its work.
    pub fn join(self) -> Result<T> {
        let result = self.handle.join()
            .map_err(|_| EngineError::op_failed("task", "worker thread panicked"))?;
        self.cancel.check()?;
        result
    }
}
