//! Disposal fixtures for owning handles.
//!
//! - [`Disposable`]: heap object that runs a callback when disposed through
//!   [`Disposable::dispose`].
//! - [`DisposableDeleter`]: zero-sized deleter bound to that function.
//! - [`DisposeProbe`]: shared counter a test inspects after the fact.

use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use strata_own::{static_fn_deleter, Unique};

/// Heap object whose disposal function invokes a callback.
///
/// Dropping a `Disposable` normally does not run the callback; only
/// [`Disposable::dispose`] does.
pub struct Disposable {
    on_dispose: Box<dyn FnMut()>,
}

impl Disposable {
    pub fn new(on_dispose: impl FnMut() + 'static) -> Self {
        Self {
            on_dispose: Box::new(on_dispose),
        }
    }

    /// Run the callback and free the object.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `Box::into_raw` (or `Box::leak`) and must not
    /// be used afterwards.
    pub unsafe fn dispose(ptr: NonNull<Disposable>) {
        // SAFETY: upheld by the caller.
        let mut this = unsafe { Box::from_raw(ptr.as_ptr()) };
        (this.on_dispose)();
    }
}

static_fn_deleter!(
    /// Disposes of a [`Disposable`] through [`Disposable::dispose`].
    pub DisposableDeleter for Disposable => Disposable::dispose
);

/// Unique handle to a [`Disposable`] using [`DisposableDeleter`].
pub type DisposableHandle = Unique<Disposable, DisposableDeleter>;

/// Shared disposal counter.
#[derive(Clone, Debug, Default)]
pub struct DisposeProbe {
    count: Rc<Cell<u32>>,
}

impl DisposeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    /// A [`Disposable`] that bumps this probe when disposed.
    pub fn disposable(&self) -> Disposable {
        let count = Rc::clone(&self.count);
        Disposable::new(move || count.set(count.get() + 1))
    }

    /// A [`DisposableHandle`] that bumps this probe when disposed.
    pub fn handle(&self) -> DisposableHandle {
        Unique::new(self.disposable())
    }
}
