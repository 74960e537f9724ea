//! Test utilities and block-source doubles for Strata development.
//!
//! Provides [`BlockSource`] implementations that record what the arena asks
//! for ([`CountingBlockSource`]) or refuse it ([`FailingBlockSource`]), plus
//! disposal fixtures in [`fixtures`] for exercising owning handles.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod fixtures;

use std::cell::{Cell, RefCell};

use strata_arena::{ArenaError, Block, BlockSource, HeapBlockSource};

/// Heap-backed block source that records every request and release.
///
/// Pass it to an arena by reference (`Arena::with_source(&source, ..)`) so
/// the counters stay readable after the arena is dropped.
#[derive(Debug)]
pub struct CountingBlockSource {
    inner: HeapBlockSource,
    requests: RefCell<Vec<(usize, usize)>>,
    released: Cell<usize>,
}

impl CountingBlockSource {
    pub fn new() -> Self {
        Self {
            inner: HeapBlockSource::new(),
            requests: RefCell::new(Vec::new()),
            released: Cell::new(0),
        }
    }

    /// `(size, align)` of every block requested so far, in order.
    pub fn requests(&self) -> Vec<(usize, usize)> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Blocks handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.request_count() - self.released()
    }
}

impl Default for CountingBlockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for CountingBlockSource {
    fn request_block(&self, size: usize, align: usize) -> Result<Block, ArenaError> {
        self.requests.borrow_mut().push((size, align));
        self.inner.request_block(size, align)
    }

    unsafe fn release_block(&self, block: Block) {
        self.released.set(self.released.get() + 1);
        // SAFETY: every block was obtained from `self.inner`.
        unsafe { self.inner.release_block(block) }
    }
}

/// Block source that serves a fixed number of blocks, then reports
/// out-of-memory.
#[derive(Debug)]
pub struct FailingBlockSource {
    inner: HeapBlockSource,
    remaining: Cell<usize>,
}

impl FailingBlockSource {
    /// Serve `blocks` blocks before failing.
    pub fn after(blocks: usize) -> Self {
        Self {
            inner: HeapBlockSource::new(),
            remaining: Cell::new(blocks),
        }
    }

    /// Fail every request.
    pub fn always() -> Self {
        Self::after(0)
    }
}

impl BlockSource for FailingBlockSource {
    fn request_block(&self, size: usize, align: usize) -> Result<Block, ArenaError> {
        match self.remaining.get() {
            0 => Err(ArenaError::OutOfMemory {
                requested: size,
                align,
            }),
            n => {
                self.remaining.set(n - 1);
                self.inner.request_block(size, align)
            }
        }
    }

    unsafe fn release_block(&self, block: Block) {
        // SAFETY: every served block came from `self.inner`.
        unsafe { self.inner.release_block(block) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_arena::{Arena, ArenaConfig};

    #[test]
    fn counting_source_tracks_lifecycle() {
        let source = CountingBlockSource::new();
        {
            let arena = Arena::with_source(&source, ArenaConfig::default()).unwrap();
            arena.allocate(10, 1).unwrap();
            assert_eq!(source.outstanding(), 1);
        }
        assert_eq!(source.request_count(), 1);
        assert_eq!(source.released(), 1);
    }

    #[test]
    fn failing_source_refuses_after_budget() {
        let source = FailingBlockSource::after(1);
        let config = ArenaConfig::new()
            .with_min_block_size(64)
            .with_max_block_size(64);
        let arena = Arena::with_source(source, config).unwrap();
        assert!(arena.allocate(64, 1).is_ok());
        assert!(matches!(
            arena.allocate(64, 1),
            Err(ArenaError::OutOfMemory { .. })
        ));
    }
}
