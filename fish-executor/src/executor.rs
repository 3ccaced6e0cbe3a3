//! `step`/`run_until_stalled`: draining the wake queue.

use crate::Executor;

impl<'a> Executor<'a> {
    /// Creates a new `Executor` with an empty task queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls a single woken task.
    ///
    /// Returns `Some(true)` if the task completed, `Some(false)` if it is
    /// still pending, or `None` if the wake queue is empty. A task that
    /// wakes itself while being polled (directly, or because it completed
    /// and its waker was already invoked) is re-queued for a later call.
    pub fn step(&self) -> Option<bool> {
        let task = self.state.queue.borrow_mut().pop_front()?;
        Some(task.poll())
    }

    /// Runs tasks until the wake queue is empty, returning how many
    /// completed.
    pub fn run_until_stalled(&self) -> usize {
        let mut completed = 0;
        while let Some(done) = self.step() {
            if done {
                completed += 1;
            }
        }
        completed
    }
}
