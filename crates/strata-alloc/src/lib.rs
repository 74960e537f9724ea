//! Typed, rebindable allocators for Strata.
//!
//! Exposes a [`strata_arena::Arena`] through the container allocator
//! contract so that generic containers can place their storage in it:
//!
//! - [`TypedAllocator`]: an [`Allocator`](allocator_api2::alloc::Allocator)
//!   with an element type and a rebind facility.
//! - [`AllocatorAdapter`]: a `Copy` view over a borrowed arena. Adapters for
//!   different element types over one arena compare equal.
//! - [`Void`]: the element type of a seed adapter that is only rebound.
//! - [`RebindAllocator`]: any typed allocator re-expressed for a new
//!   element type through its own rebind.
//! - [`AsTypedAllocator`] / [`AsTyped`]: accept "an arena or an allocator"
//!   uniformly.
//! - [`HeapAllocator`]: the global heap as a typed allocator.
//!
//! Arena-backed adapters never free individual allocations; memory comes
//! back only when the arena is dropped.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adapter;
pub mod convert;
pub mod rebind;
pub mod typed;

pub use adapter::{AllocatorAdapter, Void};
pub use convert::{AsTyped, AsTypedAllocator};
pub use rebind::{rebind_allocator, RebindAllocator};
pub use typed::{HeapAllocator, TypedAllocator};
