//! Ownership utilities for Strata.
//!
//! # Architecture
//!
//! ```text
//! Unique<T, D> ──into_shared──> Shared<'a, T>
//!     │                             │
//!     └─ D: Deleter<T>              ├─ detached block: ptr + deleter
//!          ├─ DefaultDeleter        └─ inline block: header + allocator + value
//!          ├─ FnDeleter<F>                 ▲
//!          └─ static_fn_deleter!           │
//!                                  allocate_shared(&impl TypedAllocator, value)
//! ```
//!
//! - [`Unique`]: exclusively owned pointer disposed of by a [`Deleter`].
//! - [`static_fn_deleter!`]: zero-sized deleter types bound to a function.
//! - [`Shared`]: reference-counted handle with type-erased teardown.
//! - [`allocate_shared`]: build a [`Shared`] with its control block in memory
//!   from any [`TypedAllocator`](strata_alloc::TypedAllocator), such as an
//!   arena adapter.
//! - [`to_shared`]: convert a [`Unique`] while keeping its deleter.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod deleter;
pub mod shared;
pub mod unique;

pub use deleter::{DefaultDeleter, Deleter, FnDeleter};
pub use shared::{allocate_shared, Shared};
pub use unique::{to_shared, Unique};
