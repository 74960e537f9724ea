//! Contiguous memory blocks and the sources that supply them.
//!
//! A [`Block`] is one contiguous byte range with a bump cursor. Blocks come
//! from a [`BlockSource`]; the arena never frees them individually, only
//! hands every block back when it is dropped.

use std::alloc::Layout;
use std::ptr::NonNull;

use allocator_api2::alloc::{Allocator, Global};

use crate::error::ArenaError;

/// A contiguous byte range owned by an arena, with a bump cursor.
///
/// Blocks are never shrunk or moved. Pointers carved from a block stay
/// valid until the block is released back to its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    start: NonNull<u8>,
    size: usize,
    align: usize,
    /// Bump cursor: offset of the first unused byte.
    used: usize,
}

// SAFETY: a block is exclusively owned raw memory, like the buffer of a
// `Vec<u8>`; nothing about it is tied to the thread that obtained it.
unsafe impl Send for Block {}

impl Block {
    /// Alignment every block is requested with, at minimum.
    pub const MIN_ALIGN: usize = 16;

    /// Describe a freshly supplied block of `size` bytes at `start`.
    ///
    /// `align` must be the alignment the memory was obtained with; sources
    /// need it to hand the block back. `size` and `align` must form a valid
    /// [`Layout`].
    pub fn new(start: NonNull<u8>, size: usize, align: usize) -> Self {
        debug_assert!(
            Layout::from_size_align(size, align).is_ok(),
            "block of {size} bytes with invalid alignment {align}"
        );
        Self {
            start,
            size,
            align,
            used: 0,
        }
    }

    /// First byte of the block.
    pub fn start(&self) -> NonNull<u8> {
        self.start
    }

    /// Capacity in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment of the block's start address.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Bytes already handed out, including alignment padding.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.size - self.used
    }

    /// Layout describing the whole block, as it was obtained from its source.
    ///
    /// # Panics
    ///
    /// If the block was built from a size and alignment that do not form a
    /// valid layout.
    pub fn layout(&self) -> Layout {
        match Layout::from_size_align(self.size, self.align) {
            Ok(layout) => layout,
            Err(_) => panic!(
                "block of {} bytes with invalid alignment {}",
                self.size, self.align
            ),
        }
    }

    /// Whether `ptr` points into this block's byte range.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.start.as_ptr() as usize;
        let addr = ptr as usize;
        addr >= base && addr < base + self.size
    }

    /// Bump-allocate `size` bytes aligned to `align` from the unused tail.
    ///
    /// Returns `None` if the block cannot fit the request after padding.
    /// `align` must be a power of two.
    pub(crate) fn bump(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align.is_power_of_two());
        let base = self.start.as_ptr() as usize;
        let head = base + self.used;
        let aligned = head.checked_add(align - 1)? & !(align - 1);
        let offset = aligned - base;
        let end = offset.checked_add(size)?;
        if end > self.size {
            return None;
        }
        self.used = end;
        // SAFETY: offset <= end <= self.size, so the pointer stays inside
        // (or one past the end of) the block's allocation.
        Some(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(offset)) })
    }
}

/// Supplier of raw memory blocks for an arena.
///
/// The arena calls [`request_block`](BlockSource::request_block) whenever its
/// current block is exhausted and [`release_block`](BlockSource::release_block)
/// once per block when it is dropped. Implementations decide where memory
/// comes from (heap, fixed pool, test double).
pub trait BlockSource {
    /// Supply a block of at least `size` bytes whose start is aligned to `align`.
    ///
    /// `align` is a power of two. The returned block may be larger than
    /// requested; the arena uses the full reported size.
    fn request_block(&self, size: usize, align: usize) -> Result<Block, ArenaError>;

    /// Take back a block previously supplied by this source.
    ///
    /// # Safety
    ///
    /// `block` must have been returned by `request_block` on this same
    /// source and must not have been released before. No pointer into the
    /// block may be used afterwards.
    unsafe fn release_block(&self, block: Block);
}

impl<S: BlockSource + ?Sized> BlockSource for &S {
    fn request_block(&self, size: usize, align: usize) -> Result<Block, ArenaError> {
        (**self).request_block(size, align)
    }

    unsafe fn release_block(&self, block: Block) {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        unsafe { (**self).release_block(block) }
    }
}

/// Block source backed by an [`Allocator`], the process heap by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapBlockSource<A: Allocator = Global> {
    alloc: A,
}

impl HeapBlockSource {
    /// Block source over the global heap.
    pub const fn new() -> Self {
        Self { alloc: Global }
    }
}

impl<A: Allocator> HeapBlockSource<A> {
    /// Block source over an arbitrary allocator.
    pub fn new_in(alloc: A) -> Self {
        Self { alloc }
    }

    /// The allocator blocks are obtained from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<A: Allocator> BlockSource for HeapBlockSource<A> {
    fn request_block(&self, size: usize, align: usize) -> Result<Block, ArenaError> {
        let layout =
            Layout::from_size_align(size, align).map_err(|_| ArenaError::InvalidLayout { size, align })?;
        let memory = self
            .alloc
            .allocate(layout)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: size,
                align,
            })?;
        Ok(Block::new(memory.cast::<u8>(), memory.len(), align))
    }

    unsafe fn release_block(&self, block: Block) {
        // SAFETY: the block came from `self.alloc` with this alignment and a
        // size between the requested size and the reported length, which
        // `Allocator::deallocate` accepts.
        unsafe { self.alloc.deallocate(block.start(), block.layout()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_block(size: usize) -> (HeapBlockSource, Block) {
        let source = HeapBlockSource::new();
        let block = source.request_block(size, Block::MIN_ALIGN).unwrap();
        (source, block)
    }

    #[test]
    fn sequential_bumps_advance_cursor() {
        let (source, mut block) = heap_block(1024);
        let a = block.bump(100, 1).unwrap();
        let b = block.bump(200, 1).unwrap();
        assert_eq!(a, block.start());
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 100);
        assert_eq!(block.used(), 300);
        unsafe { source.release_block(block) };
    }

    #[test]
    fn bump_pads_to_alignment() {
        let (source, mut block) = heap_block(1024);
        block.bump(1, 1).unwrap();
        let p = block.bump(8, 8).unwrap();
        assert_eq!(p.as_ptr() as usize % 8, 0);
        assert_eq!(block.used(), 16);
        unsafe { source.release_block(block) };
    }

    #[test]
    fn bump_fails_when_full() {
        let (source, mut block) = heap_block(128);
        let size = block.size();
        assert!(block.bump(size, 1).is_some());
        assert!(block.bump(1, 1).is_none());
        assert_eq!(block.remaining(), 0);
        unsafe { source.release_block(block) };
    }

    #[test]
    fn failed_bump_leaves_cursor_alone() {
        let (source, mut block) = heap_block(64);
        block.bump(10, 1).unwrap();
        assert!(block.bump(block.size(), 1).is_none());
        assert_eq!(block.used(), 10);
        unsafe { source.release_block(block) };
    }

    #[test]
    fn heap_source_honours_alignment() {
        let source = HeapBlockSource::new();
        let block = source.request_block(256, 4096).unwrap();
        assert_eq!(block.start().as_ptr() as usize % 4096, 0);
        assert!(block.size() >= 256);
        assert!(block.contains(block.start().as_ptr()));
        unsafe { source.release_block(block) };
    }

    #[test]
    fn heap_source_rejects_bad_alignment() {
        let source = HeapBlockSource::new();
        let result = source.request_block(256, 3);
        assert!(matches!(result, Err(ArenaError::InvalidLayout { .. })));
    }

    #[test]
    fn layout_matches_what_the_source_allocated() {
        let (source, block) = heap_block(512);
        let layout = block.layout();
        assert_eq!(layout.size(), block.size());
        assert_eq!(layout.align(), Block::MIN_ALIGN);
        unsafe { source.release_block(block) };
    }

    #[test]
    #[should_panic(expected = "invalid alignment")]
    fn malformed_block_refuses_to_describe_a_layout() {
        let block = Block {
            start: NonNull::dangling(),
            size: 64,
            align: 3,
            used: 0,
        };
        let _ = block.layout();
    }

    #[test]
    fn blocks_can_move_between_threads() {
        let (source, block) = heap_block(64);
        let block = std::thread::spawn(move || {
            assert!(block.contains(block.start().as_ptr()));
            block
        })
        .join()
        .unwrap();
        unsafe { source.release_block(block) };
    }
}
