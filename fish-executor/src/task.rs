//! Implementation of `Task`

use crate::waker::into_waker;
use crate::Task;
use alloc::rc::Rc;
use core::future::Future;
use core::task::{Context, Poll};

impl<'a> Task<'a> {
    /// Re-enqueues this task on its executor's wake queue, if the executor
    /// is still alive.
    pub(crate) fn wake(self: Rc<Self>) {
        if let Some(state) = self.state.upgrade() {
            state.queue.borrow_mut().push_back(self);
        }
    }

    /// Polls the future contained in the task.
    ///
    /// Returns `true` if the future completed (on this or a previous poll),
    /// `false` if it is still pending.
    pub(crate) fn poll(self: &Rc<Self>) -> bool {
        let mut slot = self.future.borrow_mut();
        let Some(future) = slot.as_mut() else {
            return true;
        };
        let waker = into_waker(Rc::clone(self));
        let mut context = Context::from_waker(&waker);
        match future.as_mut().poll(&mut context) {
            Poll::Ready(()) => {
                *slot = None;
                true
            }
            Poll::Pending => false,
        }
    }
}
