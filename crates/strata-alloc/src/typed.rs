//! The typed allocator contract and the heap-backed implementation.
//!
//! [`TypedAllocator`] layers an element type and a rebind facility on top of
//! the byte-level [`Allocator`] trait. Generic code that needs storage for
//! some other type than the one it was handed (a control block next to a
//! value, list nodes around elements) rebinds the allocator instead of
//! asking for a new one.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use allocator_api2::alloc::{AllocError, Allocator, Global};

/// An allocator with an element type that can be rebound to other types.
///
/// Rebinding never creates a new backing resource: the rebound allocator
/// draws from the same memory and compares equal to the original whenever
/// the implementation's equality says the backing resource is shared.
pub trait TypedAllocator: Allocator + Clone + PartialEq {
    /// The element type allocated by [`allocate_n`](TypedAllocator::allocate_n).
    type Value: ?Sized;

    /// This allocator, re-expressed for element type `U`.
    type Rebound<U: ?Sized>: TypedAllocator<Value = U>;

    /// Produce an allocator for `U` over the same backing resource.
    fn rebind<U: ?Sized>(&self) -> Self::Rebound<U>;

    /// Allocate uninitialised storage for `n` values.
    fn allocate_n(&self, n: usize) -> Result<NonNull<Self::Value>, AllocError>
    where
        Self::Value: Sized,
    {
        let layout = Layout::array::<Self::Value>(n).map_err(|_| AllocError)?;
        Ok(self.allocate(layout)?.cast())
    }

    /// Return storage obtained from [`allocate_n`](TypedAllocator::allocate_n).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate_n(n)` on this allocator or one equal to
    /// it, and must not have been deallocated already.
    unsafe fn deallocate_n(&self, ptr: NonNull<Self::Value>, n: usize)
    where
        Self::Value: Sized,
    {
        // `allocate_n(n)` succeeded, so the layout is valid.
        if let Ok(layout) = Layout::array::<Self::Value>(n) {
            // SAFETY: upheld by the caller.
            unsafe { self.deallocate(ptr.cast(), layout) }
        }
    }
}

/// Typed allocator over the global heap.
///
/// All instances are interchangeable and compare equal, whatever their
/// element types.
pub struct HeapAllocator<T: ?Sized> {
    _marker: PhantomData<fn() -> *const T>,
}

impl<T: ?Sized> HeapAllocator<T> {
    /// A heap allocator for `T`.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Default for HeapAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for HeapAllocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for HeapAllocator<T> {}

impl<T: ?Sized> fmt::Debug for HeapAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapAllocator<{}>", std::any::type_name::<T>())
    }
}

impl<T: ?Sized, U: ?Sized> PartialEq<HeapAllocator<U>> for HeapAllocator<T> {
    fn eq(&self, _other: &HeapAllocator<U>) -> bool {
        true
    }
}

impl<T: ?Sized> Eq for HeapAllocator<T> {}

unsafe impl<T: ?Sized> Allocator for HeapAllocator<T> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        Global.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: every instance allocates from `Global`.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

impl<T: ?Sized> TypedAllocator for HeapAllocator<T> {
    type Value = T;
    type Rebound<U: ?Sized> = HeapAllocator<U>;

    fn rebind<U: ?Sized>(&self) -> HeapAllocator<U> {
        HeapAllocator::new()
    }
}
