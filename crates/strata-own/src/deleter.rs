//! Disposal strategies for owning handles.
//!
//! A [`Deleter`] decides how an owned pointer is torn down. Handles only call
//! it with a non-null pointer they own, exactly once. Deleters declared with
//! [`static_fn_deleter!`](crate::static_fn_deleter) bind their disposal
//! function into the type and occupy no space in the handle.

use std::fmt;
use std::ptr::NonNull;

/// Teardown strategy for a pointer owned by a handle.
pub trait Deleter<T> {
    /// Dispose of the resource behind `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be owned by the caller, must be of the kind this deleter
    /// knows how to dispose of, and must not be used after this call.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

/// Deleter for pointers obtained from `Box::into_raw`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultDeleter;

impl<T> Deleter<T> for DefaultDeleter {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the caller hands over a pointer from `Box::into_raw`.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}

/// Deleter backed by a stored closure.
///
/// For teardown that is only known at run time. Prefer a
/// [`static_fn_deleter!`](crate::static_fn_deleter) type when the function
/// is known statically.
#[derive(Clone, Copy)]
pub struct FnDeleter<F>(pub F);

impl<F> fmt::Debug for FnDeleter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDeleter")
    }
}

impl<T, F: FnMut(NonNull<T>)> Deleter<T> for FnDeleter<F> {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        (self.0)(ptr)
    }
}

/// Declare a zero-sized [`Deleter`] type bound to a disposal function.
///
/// The function must have the signature `unsafe fn(NonNull<T>)`; it is
/// called with the owned pointer exactly once and never with null.
///
/// ```
/// use std::ptr::NonNull;
/// use strata_own::{static_fn_deleter, Unique};
///
/// struct Handle(u32);
///
/// impl Handle {
///     unsafe fn close(ptr: NonNull<Handle>) {
///         drop(unsafe { Box::from_raw(ptr.as_ptr()) });
///     }
/// }
///
/// static_fn_deleter!(HandleCloser for Handle => Handle::close);
///
/// let handle = Unique::<Handle, HandleCloser>::new(Handle(7));
/// assert_eq!(handle.0, 7);
/// ```
#[macro_export]
macro_rules! static_fn_deleter {
    ($(#[$attr:meta])* $vis:vis $name:ident for $ty:ty => $func:path) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        $vis struct $name;

        impl $crate::Deleter<$ty> for $name {
            unsafe fn delete(&mut self, ptr: ::core::ptr::NonNull<$ty>) {
                // SAFETY: forwarded from the owning handle.
                unsafe { $func(ptr) }
            }
        }
    };
}
