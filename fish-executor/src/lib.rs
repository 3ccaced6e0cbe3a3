//! Single-threaded cooperative task scheduler.
//!
//! Background workers for autosuggestion and highlighting (spec §5) run as
//! futures spawned here instead of on OS threads: the main thread polls the
//! `Executor` between synchronous steps, and a task whose result is no
//! longer wanted (the source line changed since it was spawned) is simply
//! never polled to completion and drops, which is this crate's form of
//! cancellation.

#![no_std]
extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;

pub mod forwarder;
mod executor;
mod spawner;
mod task;
mod waker;

use forwarder::Receiver;
pub use spawner::SpawnError;

/// A cloneable handle that can spawn tasks onto an [`Executor`] without
/// borrowing it, so it can be moved into a spawned future itself (see
/// `spawning_task_inside_task` in the test suite).
///
/// Spawning through a `Spawner` whose executor has been dropped is a no-op
/// that returns the future back to the caller.
#[derive(Clone)]
pub struct Spawner<'a> {
    state: Weak<ExecutorState<'a>>,
}

/// A pending future plus the bookkeeping needed to re-enqueue it when woken.
struct Task<'a> {
    future: RefCell<Option<Pin<Box<dyn Future<Output = ()> + 'a>>>>,
    state: Weak<ExecutorState<'a>>,
}

/// State shared between every clone of an [`Executor`] and every [`Spawner`]
/// derived from it: the queue of tasks that have been woken and are due a
/// poll.
struct ExecutorState<'a> {
    queue: RefCell<VecDeque<Rc<Task<'a>>>>,
}

impl<'a> Default for ExecutorState<'a> {
    fn default() -> Self {
        ExecutorState { queue: RefCell::new(VecDeque::new()) }
    }
}

impl<'a> ExecutorState<'a> {
    fn enqueue(state: &Rc<Self>, future: Pin<Box<dyn Future<Output = ()> + 'a>>) {
        let task = Rc::new(Task { future: RefCell::new(Some(future)), state: Rc::downgrade(state) });
        state.queue.borrow_mut().push_back(task);
    }

    fn enqueue_forwarding<F>(state: &Rc<Self>, future: F) -> Receiver<F::Output>
    where
        F: Future + 'a,
        F::Output: 'a,
    {
        let (sender, receiver) = forwarder::forwarder();
        let wrapped: Pin<Box<dyn Future<Output = ()> + 'a>> = Box::pin(async move {
            let _ = sender.send(future.await);
        });
        Self::enqueue(state, wrapped);
        receiver
    }
}

/// A single-threaded, cooperative task scheduler.
///
/// Cloning an `Executor` shares the same underlying task queue (it is a
/// handle, not a copy): every clone and every [`Spawner`] derived from it
/// schedules onto the same queue.
#[derive(Clone)]
pub struct Executor<'a> {
    state: Rc<ExecutorState<'a>>,
}

impl<'a> Default for Executor<'a> {
    fn default() -> Self {
        Executor { state: Rc::new(ExecutorState::default()) }
    }
}

impl<'a> Executor<'a> {
    /// Returns the number of tasks currently queued to be polled.
    #[must_use]
    pub fn wake_count(&self) -> usize {
        self.state.queue.borrow().len()
    }

    /// Returns a [`Spawner`] handle that can outlive borrows of this
    /// executor and be moved into spawned futures.
    #[must_use]
    pub fn spawner(&self) -> Spawner<'a> {
        Spawner { state: Rc::downgrade(&self.state) }
    }

    /// Adds `future` to the task queue so it will be polled once the
    /// executor runs.
    ///
    /// # Safety
    /// See [`Spawner::spawn_pinned`].
    pub unsafe fn spawn_pinned(&self, future: Pin<Box<dyn Future<Output = ()> + 'a>>) {
        ExecutorState::enqueue(&self.state, future);
    }

    /// Adds `future` to the task queue and returns a [`Receiver`] that
    /// yields its result once it completes.
    ///
    /// # Safety
    /// See [`Spawner::spawn`].
    pub unsafe fn spawn<F, T>(&self, future: F) -> Receiver<T>
    where
        F: core::future::IntoFuture<Output = T> + 'a,
        F::IntoFuture: 'a,
        T: 'a,
    {
        ExecutorState::enqueue_forwarding(&self.state, future.into_future())
    }
}
