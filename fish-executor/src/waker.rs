//! Converts a [`Task`] into a [`Waker`].
//!
//! The `RawWaker`'s data pointer is a `Rc<Task>`; the vtable functions clone,
//! wake, wake-by-ref, and drop that `Rc`. Each is generic over the task's
//! lifetime `'a` so a single implementation serves every `Executor<'a>`.

use crate::Task;
use alloc::rc::Rc;
use core::task::{RawWaker, RawWakerVTable, Waker};

unsafe fn clone<'a>(data: *const ()) -> RawWaker {
    unsafe {
        Rc::<Task<'a>>::increment_strong_count(data.cast());
    }
    RawWaker::new(data, vtable())
}

unsafe fn wake<'a>(data: *const ()) {
    unsafe {
        Rc::<Task<'a>>::from_raw(data.cast()).wake();
    }
}

unsafe fn wake_by_ref<'a>(data: *const ()) {
    unsafe {
        Rc::<Task<'a>>::increment_strong_count(data.cast());
        Rc::<Task<'a>>::from_raw(data.cast()).wake();
    }
}

unsafe fn drop_task<'a>(data: *const ()) {
    unsafe {
        Rc::<Task<'a>>::decrement_strong_count(data.cast());
    }
}

fn vtable<'a>() -> &'static RawWakerVTable {
    &RawWakerVTable::new(clone, wake, wake_by_ref, drop_task)
}

/// Converts a `Task` into a `Waker` that re-enqueues it when woken.
#[must_use]
pub(crate) fn into_waker<'a>(task: Rc<Task<'a>>) -> Waker {
    let data = Rc::into_raw(task).cast();
    let raw_waker = RawWaker::new(data, vtable());
    unsafe { Waker::from_raw(raw_waker) }
}
