//! Re-typing an existing allocator without access to its backing resource.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use allocator_api2::alloc::{AllocError, Allocator};

use crate::typed::TypedAllocator;

/// An allocator for `T` built from an allocator of some other element type.
///
/// Construction goes through the base allocator's own
/// [`rebind`](TypedAllocator::rebind), so this works for any
/// [`TypedAllocator`], arena-backed or not. Allocation and equality are
/// delegated to the rebound allocator.
pub struct RebindAllocator<T: ?Sized, A: TypedAllocator> {
    /// Copy of the allocator we were built from, kept for further rebinding.
    base: A,
    inner: A::Rebound<T>,
}

impl<T: ?Sized, A: TypedAllocator> RebindAllocator<T, A> {
    /// Rebind a copy of `base` to element type `T`.
    pub fn new(base: &A) -> Self {
        Self {
            base: base.clone(),
            inner: base.rebind::<T>(),
        }
    }

    /// The rebound allocator all calls are delegated to.
    pub fn inner(&self) -> &A::Rebound<T> {
        &self.inner
    }

    /// The allocator this one was rebound from.
    pub fn base(&self) -> &A {
        &self.base
    }
}

/// Rebind `alloc` to element type `T`.
///
/// The target type is given at the call site:
/// `rebind_allocator::<String, _>(&alloc)`.
pub fn rebind_allocator<T: ?Sized, A: TypedAllocator>(alloc: &A) -> RebindAllocator<T, A> {
    RebindAllocator::new(alloc)
}

impl<T: ?Sized, A: TypedAllocator> Clone for RebindAllocator<T, A> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized, A: TypedAllocator + fmt::Debug> fmt::Debug for RebindAllocator<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebindAllocator")
            .field("value", &std::any::type_name::<T>())
            .field("base", &self.base)
            .finish()
    }
}

impl<T: ?Sized, A: TypedAllocator> PartialEq for RebindAllocator<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

unsafe impl<T: ?Sized, A: TypedAllocator> Allocator for RebindAllocator<T, A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.inner.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: `ptr` was allocated by `self.inner` (or an equal clone).
        unsafe { self.inner.deallocate(ptr, layout) }
    }
}

impl<T: ?Sized, A: TypedAllocator> TypedAllocator for RebindAllocator<T, A> {
    type Value = T;
    type Rebound<U: ?Sized> = RebindAllocator<U, A>;

    fn rebind<U: ?Sized>(&self) -> RebindAllocator<U, A> {
        RebindAllocator::new(&self.base)
    }
}
