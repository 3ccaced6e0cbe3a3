//! Implementation of `Spawner`.

use crate::forwarder::Receiver;
use crate::{ExecutorState, Spawner};
use alloc::boxed::Box;
use core::fmt::Debug;
use core::future::{Future, IntoFuture};
use core::pin::Pin;

/// Error returned when a task cannot be spawned because its executor has
/// been dropped. Carries the future back so the caller can reuse or poll it
/// directly.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SpawnError<F>(pub F);

impl<F> Debug for SpawnError<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        "SpawnError(_)".fmt(f)
    }
}

impl<'a> Spawner<'a> {
    /// Creates a `Spawner` that is not associated with any executor and so
    /// cannot spawn tasks; every spawn call returns `Err`.
    #[must_use]
    pub fn dead() -> Self {
        Self { state: Default::default() }
    }

    /// Adds `future` to the executor's task queue. The task is not polled
    /// immediately; it runs when the executor steps.
    ///
    /// # Safety
    /// The `Waker` passed to the future's `poll` is not `Send`/`Sync`-safe
    /// in practice despite the trait bounds: it must not be moved to or
    /// woken from another thread.
    #[allow(clippy::type_complexity)]
    pub unsafe fn spawn_pinned(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + 'a>>,
    ) -> Result<(), SpawnError<Pin<Box<dyn Future<Output = ()> + 'a>>>> {
        match self.state.upgrade() {
            Some(state) => {
                ExecutorState::enqueue(&state, future);
                Ok(())
            }
            None => Err(SpawnError(future)),
        }
    }

    /// Adds `future` to the executor's task queue and returns a [`Receiver`]
    /// that yields its result once it completes.
    ///
    /// # Safety
    /// See [`spawn_pinned`](Self::spawn_pinned).
    pub unsafe fn spawn<F, T>(&self, future: F) -> Result<Receiver<T>, SpawnError<F>>
    where
        F: IntoFuture<Output = T> + 'a,
        F::IntoFuture: 'a,
        T: 'a,
    {
        match self.state.upgrade() {
            Some(state) => Ok(ExecutorState::enqueue_forwarding(&state, future.into_future())),
            None => Err(SpawnError(future)),
        }
    }
}
