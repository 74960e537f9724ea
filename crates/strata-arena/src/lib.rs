//! Block-growing bump arena for Strata.
//!
//! Provides an allocate-only region allocator that serves many small
//! allocations from large contiguous blocks and frees them all at once.
//!
//! # Architecture
//!
//! ```text
//! Arena<S: BlockSource>
//! ├── current: Block (bump cursor over its unused tail)
//! ├── retired: Vec<Block> (oldest first, treated as full)
//! ├── ArenaConfig (growth policy: min/max block size, size limit)
//! └── S: BlockSource (HeapBlockSource<A: Allocator> by default)
//! ```
//!
//! # Growth
//!
//! When the current block cannot fit a request, the arena asks its source
//! for a block of `max(request, clamp(total_size, min, max))` bytes, so the
//! footprint roughly doubles until blocks hit `max_block_size`. Requests
//! larger than that still get a dedicated block of exactly their size.
//!
//! # Reclamation
//!
//! [`Arena::deallocate`] is a no-op. Nothing is reclaimed until the arena is
//! dropped, at which point every block goes back to its source once.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod arena;
pub mod block;
pub mod config;
pub mod error;

// Public re-exports for the primary API surface.
pub use arena::{Arena, SysArena};
pub use block::{Block, BlockSource, HeapBlockSource};
pub use config::ArenaConfig;
pub use error::ArenaError;
