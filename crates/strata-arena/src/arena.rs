//! The bump arena.
//!
//! [`Arena`] serves allocations from the unused tail of its current block and
//! asks its [`BlockSource`] for a fresh, larger block when the tail is too
//! short. Individual allocations are never reclaimed: `deallocate` is a no-op
//! and every block goes back to the source, exactly once, when the arena is
//! dropped.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::{self, NonNull};

use tracing::{debug, trace, warn};

use crate::block::{Block, BlockSource, HeapBlockSource};
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// A region allocator that frees everything at once.
///
/// All methods take `&self`; the arena uses `Cell`/`RefCell` internally and
/// is therefore not `Sync`. It is `Send` when its source is, so callers that
/// need to share one across threads wrap it in a `Mutex`. Pointers it
/// returns stay valid until the arena is dropped.
#[derive(Debug)]
pub struct Arena<S: BlockSource = HeapBlockSource> {
    source: S,
    config: ArenaConfig,
    /// The block allocations are currently carved from.
    current: Cell<Option<Block>>,
    /// Earlier blocks, oldest first. Treated as full.
    retired: RefCell<Vec<Block>>,
    /// Bytes obtained from the source across all blocks.
    total_size: Cell<usize>,
    /// Bytes handed out from retired blocks.
    retired_used: Cell<usize>,
}

/// An arena over the process heap.
pub type SysArena = Arena<HeapBlockSource>;

impl Arena {
    /// Create a heap-backed arena with the default config.
    ///
    /// No memory is requested until the first allocation.
    pub fn new() -> Self {
        Self::build(HeapBlockSource::new(), ArenaConfig::default())
    }

    /// Create a heap-backed arena with the given config.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_source(HeapBlockSource::new(), config)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BlockSource> Arena<S> {
    /// Create an arena drawing blocks from `source`.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if `config` fails validation.
    pub fn with_source(source: S, config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::build(source, config))
    }

    fn build(source: S, config: ArenaConfig) -> Self {
        Self {
            source,
            config,
            current: Cell::new(None),
            retired: RefCell::new(Vec::new()),
            total_size: Cell::new(0),
            retired_used: Cell::new(0),
        }
    }

    /// Allocate `size` bytes aligned to `align`.
    ///
    /// Served from the current block when it has room after padding;
    /// otherwise a new block of at least `size` bytes is requested from the
    /// source and becomes the current block. Zero-sized requests return a
    /// dangling pointer aligned to `align` without touching any block.
    ///
    /// Never returns null. Fails with `InvalidLayout` for a non-power-of-two
    /// `align`, `CapacityExceeded` past the configured size limit, and
    /// `OutOfMemory` when the source refuses a block.
    #[inline]
    pub fn allocate(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        if !align.is_power_of_two() || size > isize::MAX as usize - (align - 1) {
            return Err(ArenaError::InvalidLayout { size, align });
        }
        if size == 0 {
            // SAFETY: `align` is a power of two, hence non-zero.
            return Ok(unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) });
        }
        if let Some(mut block) = self.current.get() {
            if let Some(ptr) = block.bump(size, align) {
                self.current.set(Some(block));
                return Ok(ptr);
            }
        }
        self.allocate_slow(size, align)
    }

    /// Allocate memory for `layout`.
    #[inline]
    pub fn allocate_layout(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        self.allocate(layout.size(), layout.align())
    }

    #[cold]
    #[inline(never)]
    fn allocate_slow(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        let total = self.total_size.get();
        let mut block_size = size.max(self.config.next_block_size(total));
        if let Some(limit) = self.config.size_limit {
            let budget = limit.saturating_sub(total);
            if size > budget {
                warn!(size, total, limit, "arena size limit reached");
                return Err(ArenaError::CapacityExceeded {
                    requested: size,
                    limit,
                });
            }
            block_size = block_size.min(budget);
        }
        let block_align = align.max(Block::MIN_ALIGN);

        let mut block = self
            .source
            .request_block(block_size, block_align)
            .inspect_err(|err| warn!(block_size, block_align, %err, "block source refused block"))?;
        let carved = block.bump(size, align);
        self.install(block);
        debug!(
            block_size = block.size(),
            blocks = self.block_count(),
            total = self.total_size.get(),
            "arena grew"
        );

        // A conforming source supplies at least `block_size >= size` bytes
        // aligned to `block_align >= align`, so the fresh block always fits.
        carved.ok_or(ArenaError::OutOfMemory {
            requested: block_size,
            align: block_align,
        })
    }

    /// Make `block` current, retiring the previous current block.
    fn install(&self, block: Block) {
        if let Some(old) = self.current.replace(Some(block)) {
            self.retired_used.set(self.retired_used.get() + old.used());
            self.retired.borrow_mut().push(old);
        }
        self.total_size.set(self.total_size.get() + block.size());
    }

    /// Release memory back to the arena. Does nothing.
    ///
    /// Memory is only reclaimed in bulk when the arena is dropped.
    #[inline]
    pub fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
        let _ = (ptr, size);
    }

    /// Move `value` into the arena and return a reference to it.
    ///
    /// The value's destructor never runs; only its memory is reclaimed when
    /// the arena is dropped.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> Result<&mut T, ArenaError> {
        let ptr = self.allocate_layout(Layout::new::<T>())?.cast::<T>();
        // SAFETY: freshly allocated, properly aligned, and disjoint from every
        // other allocation; it lives as long as `self`.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Copy `src` into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let layout = Layout::for_value(src);
        let ptr = self.allocate_layout(layout)?.cast::<T>();
        // SAFETY: room for `src.len()` elements was just allocated and does
        // not overlap `src`.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
            Ok(std::slice::from_raw_parts_mut(ptr.as_ptr(), src.len()))
        }
    }

    /// Number of blocks obtained from the source.
    pub fn block_count(&self) -> usize {
        self.retired.borrow().len() + usize::from(self.current.get().is_some())
    }

    /// Bytes obtained from the source across all blocks.
    pub fn total_size(&self) -> usize {
        self.total_size.get()
    }

    /// Bytes handed out to callers, including alignment padding.
    pub fn bytes_used(&self) -> usize {
        self.retired_used.get() + self.current.get().map_or(0, |b| b.used())
    }

    /// Free bytes left in the current block.
    pub fn remaining(&self) -> usize {
        self.current.get().map_or(0, |b| b.remaining())
    }

    /// Whether `ptr` points into memory owned by this arena.
    pub fn owns(&self, ptr: *const u8) -> bool {
        self.current.get().is_some_and(|b| b.contains(ptr))
            || self.retired.borrow().iter().any(|b| b.contains(ptr))
    }

    /// The growth policy this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// The block source this arena draws from.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: BlockSource> Drop for Arena<S> {
    fn drop(&mut self) {
        let retired = std::mem::take(self.retired.get_mut());
        for block in retired.into_iter().chain(self.current.take()) {
            trace!(size = block.size(), "releasing arena block");
            // SAFETY: every block was obtained from `self.source`, is held in
            // exactly one place, and nothing borrowed from the arena outlives it.
            unsafe { self.source.release_block(block) };
        }
    }
}
