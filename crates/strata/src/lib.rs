//! Strata: growable bump arenas with typed, rebindable allocators and
//! custom-deleter ownership handles.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates. For most users, adding `strata` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//! use allocator_api2::vec::Vec;
//!
//! let arena = Arena::new();
//!
//! // Containers place their storage in the arena through an adapter.
//! let mut numbers = Vec::new_in(AllocatorAdapter::<u32>::new(&arena));
//! numbers.extend([1, 2, 3]);
//! assert_eq!(numbers.iter().sum::<u32>(), 6);
//!
//! // Shared handles can live in the arena too.
//! let seed = AllocatorAdapter::<Void>::new(&arena);
//! let answer = allocate_shared(&seed.rebind::<i32>(), 42).unwrap();
//! assert_eq!(*answer, 42);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `strata-arena` | Bump arena, block sources, growth configuration |
//! | [`alloc`] | `strata-alloc` | Typed allocators, arena adapter, rebinding |
//! | [`own`] | `strata-own` | Deleters, unique and shared handles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Bump arena and block sources (`strata-arena`).
///
/// [`arena::Arena`] hands out memory from blocks supplied by an
/// [`arena::BlockSource`]; growth is governed by [`arena::ArenaConfig`].
pub use strata_arena as arena;

/// Typed, rebindable allocators (`strata-alloc`).
///
/// [`alloc::AllocatorAdapter`] exposes an arena to generic containers;
/// [`alloc::RebindAllocator`] re-expresses any typed allocator for a new
/// element type.
pub use strata_alloc as alloc;

/// Ownership handles (`strata-own`).
///
/// [`own::Unique`] with pluggable [`own::Deleter`]s, reference-counted
/// [`own::Shared`], and [`own::allocate_shared`].
pub use strata_own as own;

pub use strata_own::static_fn_deleter;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use strata_arena::{Arena, ArenaConfig, ArenaError, BlockSource, SysArena};

    // Allocators
    pub use strata_alloc::{
        rebind_allocator, AllocatorAdapter, AsTyped, AsTypedAllocator, HeapAllocator,
        RebindAllocator, TypedAllocator, Void,
    };

    // Ownership
    pub use strata_own::{
        allocate_shared, to_shared, DefaultDeleter, Deleter, FnDeleter, Shared, Unique,
    };
}
