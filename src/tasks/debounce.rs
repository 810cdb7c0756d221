//! Debounce Combinator
//!
//! Coalesces bursts of calls into a single delayed run of the latest one.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::error::Cancelled;

type BoxedRun = Pin<Box<dyn Future<Output = ()> + Send>>;
type Operation<A> = Arc<dyn Fn(A) -> BoxedRun + Send + Sync>;

#[derive(Debug, Default)]
struct Pending {
    /// Bumped on every call and cancel; a scheduled run only fires if it
    /// still holds the latest generation.
    generation: u64,
    /// Scheduled run that has not started yet
    task: Option<AbortHandle>,
}

// == Debouncer ==
/// Wrapper returned by [`debounce`].
///
/// Each [`Debouncer::call`] cancels the previously scheduled run and
/// schedules a new one `delay` later. A run that has already started is
/// never aborted. A newer run that comes due waits for it to finish and
/// stays cancellable while it waits, so at most one run is executing and at
/// most one is scheduled at any time.
///
/// Dropping the debouncer cancels its scheduled run.
pub struct Debouncer<A> {
    delay: Duration,
    operation: Operation<A>,
    pending: Arc<Mutex<Pending>>,
    running: Arc<tokio::sync::Mutex<()>>,
}

/// Wraps `operation` so that only the last call in a burst runs.
pub fn debounce<A, F, Fut>(delay: Duration, operation: F) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let operation: Operation<A> = Arc::new(move |args: A| -> BoxedRun { Box::pin(operation(args)) });
    Debouncer {
        delay,
        operation,
        pending: Arc::default(),
        running: Arc::default(),
    }
}

impl<A: Send + 'static> Debouncer<A> {
    /// Schedules `operation(args)` after the delay, superseding any
    /// scheduled call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self, args: A) -> Invocation {
        let mut pending = lock(&self.pending);
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
            debug!("superseded pending debounced call");
        }

        let handle = tokio::spawn(fire(
            self.delay,
            Arc::clone(&self.operation),
            Arc::clone(&self.pending),
            Arc::clone(&self.running),
            pending.generation,
            args,
        ));
        pending.task = Some(handle.abort_handle());
        Invocation { handle }
    }
}

impl<A> Debouncer<A> {
    /// Cancels the scheduled call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = lock(&self.pending);
        pending.generation += 1;
        match pending.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

async fn fire<A>(
    delay: Duration,
    operation: Operation<A>,
    pending: Arc<Mutex<Pending>>,
    running: Arc<tokio::sync::Mutex<()>>,
    generation: u64,
    args: A,
) -> bool {
    tokio::time::sleep(delay).await;
    // Waiting for the previous run to finish still counts as scheduled, so
    // a newer call can abort this task here.
    let _turn = running.lock().await;

    // Claim the slot so later calls no longer abort this run.
    {
        let mut pending = lock(&pending);
        if pending.generation != generation {
            return false;
        }
        pending.task = None;
    }

    operation(args).await;
    true
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Invocation ==
/// One scheduled call of a debounced operation.
///
/// Dropping it does not cancel the call.
#[derive(Debug)]
pub struct Invocation {
    handle: JoinHandle<bool>,
}

impl Invocation {
    /// Waits for the call to run, or reports that it was superseded.
    pub async fn wait(self) -> Result<(), Cancelled> {
        match self.handle.await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Cancelled),
            Err(err) if err.is_cancelled() => Err(Cancelled),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}
