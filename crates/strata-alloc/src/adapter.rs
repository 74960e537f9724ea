//! Typed allocator views over an [`Arena`].
//!
//! An [`AllocatorAdapter`] is a thin `Copy` value holding a reference to an
//! arena plus an element type. Any number of adapters, for any number of
//! element types, can share one arena; they all compare equal because
//! equality is arena identity. The borrow ties every adapter (and every
//! container built on one) to the arena's lifetime.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use allocator_api2::alloc::{AllocError, Allocator};
use strata_arena::{Arena, BlockSource, HeapBlockSource};

use crate::typed::TypedAllocator;

/// Element type of an adapter that only exists to be rebound.
///
/// `Void` is unsized and never constructed, so an
/// `AllocatorAdapter<'_, Void>` has no typed `allocate_n`/`deallocate_n`;
/// it serves as the seed that other element types are rebound from.
///
/// The byte-level [`Allocator`] impl is shared by every adapter, the seed
/// included, since rebinding is defined on [`TypedAllocator`], which
/// requires it. Raw `Layout` requests through a seed adapter therefore still
/// succeed; only the typed operations are missing.
pub struct Void {
    _opaque: [u8],
}

/// A typed allocator that carves memory out of a borrowed [`Arena`].
///
/// Deallocation is a no-op: memory is reclaimed only when the arena is
/// dropped, so containers that reallocate often leave their old buffers
/// behind until then.
pub struct AllocatorAdapter<'a, T: ?Sized, S: BlockSource = HeapBlockSource> {
    arena: &'a Arena<S>,
    _marker: PhantomData<fn() -> *const T>,
}

impl<'a, T: ?Sized, S: BlockSource> AllocatorAdapter<'a, T, S> {
    /// An adapter for `T` over `arena`.
    pub fn new(arena: &'a Arena<S>) -> Self {
        Self {
            arena,
            _marker: PhantomData,
        }
    }

    /// The arena this adapter allocates from.
    pub fn arena(&self) -> &'a Arena<S> {
        self.arena
    }

    /// An adapter for `U` over the same arena.
    pub fn rebind<U: ?Sized>(&self) -> AllocatorAdapter<'a, U, S> {
        AllocatorAdapter::new(self.arena)
    }
}

impl<T: ?Sized, S: BlockSource> Clone for AllocatorAdapter<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, S: BlockSource> Copy for AllocatorAdapter<'_, T, S> {}

impl<T: ?Sized, S: BlockSource> fmt::Debug for AllocatorAdapter<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatorAdapter")
            .field("value", &std::any::type_name::<T>())
            .field("arena", &ptr::from_ref(self.arena))
            .finish()
    }
}

impl<T: ?Sized, U: ?Sized, S: BlockSource> PartialEq<AllocatorAdapter<'_, U, S>>
    for AllocatorAdapter<'_, T, S>
{
    fn eq(&self, other: &AllocatorAdapter<'_, U, S>) -> bool {
        ptr::eq(self.arena, other.arena)
    }
}

impl<T: ?Sized, S: BlockSource> Eq for AllocatorAdapter<'_, T, S> {}

unsafe impl<T: ?Sized, S: BlockSource> Allocator for AllocatorAdapter<'_, T, S> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let ptr = self.arena.allocate_layout(layout)?;
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.arena.deallocate(ptr, layout.size());
    }
}

impl<'a, T: ?Sized, S: BlockSource> TypedAllocator for AllocatorAdapter<'a, T, S> {
    type Value = T;
    type Rebound<U: ?Sized> = AllocatorAdapter<'a, U, S>;

    fn rebind<U: ?Sized>(&self) -> AllocatorAdapter<'a, U, S> {
        AllocatorAdapter::rebind(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocator_api2::boxed::Box;
    use allocator_api2::vec::Vec;
    use strata_arena::ArenaConfig;

    #[test]
    fn rebound_adapters_compare_equal() {
        let arena = Arena::new();
        let seed = AllocatorAdapter::<Void>::new(&arena);
        let ints: AllocatorAdapter<'_, i32> = seed.rebind();
        let strings: AllocatorAdapter<'_, String> = ints.rebind();
        assert!(seed == ints);
        assert!(ints == strings);
        assert!(strings == seed);
        assert!(ptr::eq(strings.arena(), &arena));
    }

    #[test]
    fn adapters_over_distinct_arenas_differ() {
        let a = Arena::new();
        let b = Arena::new();
        let x = AllocatorAdapter::<u8>::new(&a);
        let y = AllocatorAdapter::<u8>::new(&b);
        assert!(x != y);
        assert!(x != y.rebind::<u64>());
    }

    #[test]
    fn allocate_n_draws_from_the_arena() {
        let arena = Arena::new();
        let alloc = AllocatorAdapter::<u64>::new(&arena);
        let ptr = alloc.allocate_n(8).unwrap();
        assert_eq!(ptr.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        assert!(arena.owns(ptr.as_ptr().cast::<u8>()));
        assert!(arena.bytes_used() >= 64);
        unsafe { alloc.deallocate_n(ptr, 8) };
        assert!(arena.bytes_used() >= 64);
    }

    #[test]
    fn over_aligned_elements_are_aligned() {
        #[repr(align(64))]
        struct Line(#[allow(dead_code)] [u8; 64]);

        let arena = Arena::new();
        let alloc = AllocatorAdapter::<Line>::new(&arena);
        for _ in 0..4 {
            let ptr = alloc.allocate_n(1).unwrap();
            assert_eq!(ptr.as_ptr() as usize % 64, 0);
        }
    }

    #[test]
    fn containers_share_one_arena() {
        let arena = Arena::with_config(ArenaConfig::new().with_min_block_size(256)).unwrap();
        let seed = AllocatorAdapter::<Void>::new(&arena);

        let mut numbers = Vec::new_in(seed.rebind::<u32>());
        let mut words = Vec::new_in(seed.rebind::<&str>());
        for i in 0..1000 {
            numbers.push(i);
        }
        words.extend_from_slice(&["alpha", "beta", "gamma"]);

        assert_eq!(numbers.len(), 1000);
        assert_eq!(numbers[999], 999);
        assert_eq!(words[1], "beta");
        assert!(numbers.allocator() == words.allocator());
        assert!(arena.block_count() > 1);
    }

    #[test]
    fn boxes_allocate_in_the_arena() {
        let arena = Arena::new();
        let boxed = Box::new_in([7u16; 32], AllocatorAdapter::<[u16; 32]>::new(&arena));
        assert_eq!(boxed[31], 7);
        assert!(arena.owns((&*boxed as *const [u16; 32]).cast()));
    }

    #[test]
    fn seed_adapter_serves_raw_layouts_only() {
        let arena = Arena::new();
        let seed = AllocatorAdapter::<Void>::new(&arena);
        let bytes = seed.allocate(Layout::new::<u64>()).unwrap();
        assert_eq!(bytes.len(), 8);
        assert!(arena.owns(bytes.cast::<u8>().as_ptr()));
        let typed = seed.rebind::<u64>().allocate_n(1).unwrap();
        assert_eq!(typed.as_ptr() as usize % 8, 0);
    }

    #[test]
    fn exhausted_arena_surfaces_alloc_error() {
        let arena = Arena::with_config(
            ArenaConfig::new()
                .with_min_block_size(128)
                .with_size_limit(256),
        )
        .unwrap();
        let alloc = AllocatorAdapter::<u8>::new(&arena);
        assert!(alloc.allocate_n(200).is_ok());
        assert_eq!(alloc.allocate_n(200), Err(AllocError));
    }

    #[test]
    fn zero_length_request_does_not_touch_blocks() {
        let arena = Arena::new();
        let alloc = AllocatorAdapter::<u32>::new(&arena);
        alloc.allocate_n(0).unwrap();
        assert_eq!(arena.block_count(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn typed_runs_are_aligned_and_owned(counts in prop::collection::vec(0usize..64, 1..40)) {
                let arena = Arena::with_config(ArenaConfig::new().with_min_block_size(128)).unwrap();
                let seed = AllocatorAdapter::<Void>::new(&arena);
                let words = seed.rebind::<u64>();
                let bytes = seed.rebind::<u8>();
                for (i, &n) in counts.iter().enumerate() {
                    if i % 2 == 0 {
                        let p = words.allocate_n(n).unwrap();
                        prop_assert_eq!(p.as_ptr() as usize % 8, 0);
                        prop_assert!(n == 0 || arena.owns(p.as_ptr().cast::<u8>()));
                    } else {
                        let p = bytes.allocate_n(n).unwrap();
                        prop_assert!(n == 0 || arena.owns(p.as_ptr()));
                    }
                }
                prop_assert!(words == bytes);
            }
        }
    }
}
