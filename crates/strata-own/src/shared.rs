//! Reference-counted handles with type-erased teardown.
//!
//! Every [`Shared`] points at a control block that begins with a header:
//! a strong count and a `release` function that knows the block's concrete
//! layout. Two layouts exist:
//!
//! - *inline*: header, allocator copy and value in one allocation made
//!   through a rebound allocator ([`allocate_shared`], [`Shared::new`]);
//! - *detached*: header, pointer and deleter, heap allocated, produced when a
//!   [`Unique`](crate::Unique) is converted ([`Unique::into_shared`](crate::Unique::into_shared)).
//!
//! Counts are not atomic; `Shared` is neither `Send` nor `Sync`.

use std::alloc::{handle_alloc_error, Layout};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use allocator_api2::alloc::AllocError;
use strata_alloc::{HeapAllocator, TypedAllocator};

use crate::deleter::Deleter;

#[repr(C)]
struct Header {
    strong: Cell<usize>,
    /// Disposes of the resource and frees the control block.
    release: unsafe fn(NonNull<Header>),
}

impl Header {
    fn new(release: unsafe fn(NonNull<Header>)) -> Self {
        Self {
            strong: Cell::new(1),
            release,
        }
    }
}

#[repr(C)]
struct Inline<T, A> {
    header: Header,
    alloc: A,
    value: T,
}

#[repr(C)]
struct Detached<T, D> {
    header: Header,
    ptr: NonNull<T>,
    deleter: D,
}

/// A shared-ownership handle to a `T`.
///
/// Cloning shares the value; the value is torn down when the last clone is
/// dropped. `'a` bounds the allocator or deleter the handle depends on, so
/// a handle built on an arena adapter cannot outlive the arena.
pub struct Shared<'a, T> {
    header: NonNull<Header>,
    value: NonNull<T>,
    _marker: PhantomData<(&'a (), T)>,
}

impl<'a, T: 'a> Shared<'a, T> {
    /// Place `value` on the heap.
    pub fn new(value: T) -> Self {
        match allocate_shared(&HeapAllocator::<T>::new(), value) {
            Ok(shared) => shared,
            Err(AllocError) => handle_alloc_error(Layout::new::<Inline<T, HeapAllocator<T>>>()),
        }
    }

    /// Adopt an owned pointer and the deleter that disposes of it.
    pub(crate) fn from_owned<D: Deleter<T> + 'a>(ptr: NonNull<T>, deleter: D) -> Self {
        let block = Box::new(Detached {
            header: Header::new(release_detached::<T, D>),
            ptr,
            deleter,
        });
        Self {
            header: NonNull::from(Box::leak(block)).cast(),
            value: ptr,
            _marker: PhantomData,
        }
    }

    /// Number of handles sharing this value.
    pub fn strong_count(this: &Self) -> usize {
        this.header().strong.get()
    }

    /// Whether two handles share the same value.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.header == other.header
    }

    /// Pointer to the shared value.
    pub fn as_ptr(this: &Self) -> *const T {
        this.value.as_ptr()
    }

    fn header(&self) -> &Header {
        // SAFETY: the control block lives while any handle does.
        unsafe { self.header.as_ref() }
    }
}

/// Construct a shared `T` whose control block and value live in memory
/// from `alloc`.
///
/// `alloc` is rebound to the control-block type for a single allocation.
/// A copy of `alloc` is kept in the block; when the last handle drops, the
/// value is dropped and the block is handed back through that copy.
pub fn allocate_shared<'a, T: 'a, A>(alloc: &A, value: T) -> Result<Shared<'a, T>, AllocError>
where
    A: TypedAllocator<Value = T> + 'a,
{
    let block = alloc.rebind::<Inline<T, A>>().allocate_n(1)?;
    let raw = block.as_ptr();
    // SAFETY: `block` is fresh, aligned storage for one `Inline<T, A>`.
    unsafe {
        raw.write(Inline {
            header: Header::new(release_inline::<T, A>),
            alloc: alloc.clone(),
            value,
        });
        Ok(Shared {
            header: block.cast(),
            value: NonNull::new_unchecked(ptr::addr_of_mut!((*raw).value)),
            _marker: PhantomData,
        })
    }
}

unsafe fn release_inline<T, A: TypedAllocator<Value = T>>(header: NonNull<Header>) {
    let block = header.cast::<Inline<T, A>>();
    let raw = block.as_ptr();
    // SAFETY: `header` heads an `Inline<T, A>` written by `allocate_shared`,
    // and this is the last handle to it.
    unsafe {
        ptr::drop_in_place(ptr::addr_of_mut!((*raw).value));
        let alloc = ptr::read(ptr::addr_of!((*raw).alloc));
        alloc.rebind::<Inline<T, A>>().deallocate_n(block, 1);
    }
}

unsafe fn release_detached<T, D: Deleter<T>>(header: NonNull<Header>) {
    // SAFETY: `header` heads a boxed `Detached<T, D>` built by `from_owned`,
    // and this is the last handle to it.
    let block = unsafe { Box::from_raw(header.cast::<Detached<T, D>>().as_ptr()) };
    let Detached {
        ptr, mut deleter, ..
    } = *block;
    // SAFETY: the pointer was owned by the converted `Unique` and passes to
    // its deleter exactly once.
    unsafe { deleter.delete(ptr) };
}

impl<T> Clone for Shared<'_, T> {
    fn clone(&self) -> Self {
        let strong = &self.header().strong;
        strong.set(strong.get() + 1);
        Self {
            header: self.header,
            value: self.value,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for Shared<'_, T> {
    fn drop(&mut self) {
        let release = {
            let header = self.header();
            let remaining = header.strong.get() - 1;
            header.strong.set(remaining);
            if remaining > 0 {
                return;
            }
            header.release
        };
        // SAFETY: this was the last handle; nothing else touches the block.
        unsafe { release(self.header) };
    }
}

impl<T> Deref for Shared<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the value stays alive while any handle does.
        unsafe { self.value.as_ref() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display> fmt::Display for Shared<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<T: PartialEq> PartialEq for Shared<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}
