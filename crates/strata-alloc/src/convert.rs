//! Uniform "arena or allocator" parameters.
//!
//! Call sites that want to accept either a bare arena or something already
//! speaking the allocator protocol take `X: AsTypedAllocator<T>` and resolve
//! it with [`as_typed_allocator`](AsTypedAllocator::as_typed_allocator).

use strata_arena::{Arena, BlockSource};

use crate::adapter::AllocatorAdapter;
use crate::rebind::RebindAllocator;
use crate::typed::{HeapAllocator, TypedAllocator};

/// Conversion of an arena or allocator into a typed allocator for `T`.
///
/// An arena reference resolves to an [`AllocatorAdapter`] over it; an
/// allocator resolves to itself rebound to `T`.
pub trait AsTypedAllocator<T: ?Sized> {
    /// The typed allocator this resolves to.
    type Output: TypedAllocator<Value = T>;

    /// Resolve to a typed allocator for `T`.
    fn as_typed_allocator(&self) -> Self::Output;
}

/// The typed allocator for `T` that `X` resolves to.
pub type AsTyped<T, X> = <X as AsTypedAllocator<T>>::Output;

impl<'a, T: ?Sized, S: BlockSource> AsTypedAllocator<T> for &'a Arena<S> {
    type Output = AllocatorAdapter<'a, T, S>;

    fn as_typed_allocator(&self) -> AllocatorAdapter<'a, T, S> {
        AllocatorAdapter::new(*self)
    }
}

impl<'a, T: ?Sized, U: ?Sized, S: BlockSource> AsTypedAllocator<T> for AllocatorAdapter<'a, U, S> {
    type Output = AllocatorAdapter<'a, T, S>;

    fn as_typed_allocator(&self) -> AllocatorAdapter<'a, T, S> {
        self.rebind()
    }
}

impl<T: ?Sized, U: ?Sized> AsTypedAllocator<T> for HeapAllocator<U> {
    type Output = HeapAllocator<T>;

    fn as_typed_allocator(&self) -> HeapAllocator<T> {
        HeapAllocator::new()
    }
}

impl<T: ?Sized, U: ?Sized, A: TypedAllocator> AsTypedAllocator<T> for RebindAllocator<U, A> {
    type Output = RebindAllocator<T, A>;

    fn as_typed_allocator(&self) -> RebindAllocator<T, A> {
        self.rebind()
    }
}
