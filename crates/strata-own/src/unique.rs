//! Exclusively-owned handles with a pluggable deleter.
//!
//! A [`Unique`] owns at most one pointer and disposes of it through its
//! [`Deleter`] exactly once: on drop, on [`reset`](Unique::reset), or, after
//! conversion to a [`Shared`], when the last shared reference goes away.
//! An empty handle never calls its deleter.

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::deleter::{DefaultDeleter, Deleter};
use crate::shared::Shared;

/// A uniquely-owned pointer disposed of by `D`.
///
/// With a zero-sized deleter (the default, or one declared with
/// [`static_fn_deleter!`](crate::static_fn_deleter)) the handle is the size
/// of a pointer.
pub struct Unique<T, D: Deleter<T> = DefaultDeleter> {
    ptr: Option<NonNull<T>>,
    deleter: D,
    _owns: PhantomData<T>,
}

// SAFETY: `Unique` owns its pointee exclusively, like `Box`.
unsafe impl<T: Send, D: Deleter<T> + Send> Send for Unique<T, D> {}
// SAFETY: shared access only hands out `&T` and `&D`.
unsafe impl<T: Sync, D: Deleter<T> + Sync> Sync for Unique<T, D> {}

impl<T> Unique<T> {
    /// Take ownership of a box.
    pub fn from_box(value: Box<T>) -> Self {
        Self {
            ptr: Some(NonNull::from(Box::leak(value))),
            deleter: DefaultDeleter,
            _owns: PhantomData,
        }
    }
}

impl<T, D: Deleter<T>> Unique<T, D> {
    /// Box `value` and own it.
    ///
    /// The deleter takes over the box's allocation and must release it.
    pub fn new(value: T) -> Self
    where
        D: Default,
    {
        Self::with_deleter(value, D::default())
    }

    /// Box `value` and own it, disposing of it with `deleter`.
    pub fn with_deleter(value: T, deleter: D) -> Self {
        Self {
            ptr: Some(NonNull::from(Box::leak(Box::new(value)))),
            deleter,
            _owns: PhantomData,
        }
    }

    /// An empty handle.
    pub fn null() -> Self
    where
        D: Default,
    {
        Self {
            ptr: None,
            deleter: D::default(),
            _owns: PhantomData,
        }
    }

    /// Take ownership of a raw pointer, which may be null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be exclusively owned by the caller and be of
    /// the kind `D` disposes of.
    pub unsafe fn from_raw(ptr: *mut T) -> Self
    where
        D: Default,
    {
        // SAFETY: upheld by the caller.
        unsafe { Self::from_raw_with_deleter(ptr, D::default()) }
    }

    /// Take ownership of a raw pointer, which may be null, with `deleter`.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw`](Unique::from_raw).
    pub unsafe fn from_raw_with_deleter(ptr: *mut T, deleter: D) -> Self {
        Self {
            ptr: NonNull::new(ptr),
            deleter,
            _owns: PhantomData,
        }
    }

    /// Whether the handle is empty.
    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// The owned pointer, or null.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Borrow the pointee, if any.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-null pointer is owned and valid while `self` is.
        self.ptr.map(|p| unsafe { &*p.as_ptr() })
    }

    /// Mutably borrow the pointee, if any.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as in `get`, and `&mut self` makes the access exclusive.
        self.ptr.map(|p| unsafe { &mut *p.as_ptr() })
    }

    /// The deleter.
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Dispose of the pointee now and leave the handle empty.
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: the pointer was owned by this handle and is forgotten
            // by it before disposal.
            unsafe { self.deleter.delete(ptr) };
        }
    }

    /// Give up ownership without disposing of the pointee.
    pub fn into_raw(self) -> *mut T {
        let this = ManuallyDrop::new(self);
        let ptr = this.as_ptr();
        // SAFETY: `this` is never used or dropped again.
        drop(unsafe { ptr::read(&this.deleter) });
        ptr
    }

    /// Split into pointer and deleter without running either.
    fn into_parts(self) -> (Option<NonNull<T>>, D) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped again.
        (this.ptr, unsafe { ptr::read(&this.deleter) })
    }

    /// Convert into a shared handle that keeps this handle's deleter.
    ///
    /// The deleter runs once, when the last [`Shared`] clone is dropped.
    /// Returns `None` for an empty handle.
    pub fn into_shared<'a>(self) -> Option<Shared<'a, T>>
    where
        T: 'a,
        D: 'a,
    {
        let (ptr, deleter) = self.into_parts();
        match ptr {
            Some(ptr) => Some(Shared::from_owned(ptr, deleter)),
            None => {
                drop(deleter);
                None
            }
        }
    }

    /// Move ownership into a shared handle, leaving this handle empty.
    ///
    /// Same as [`into_shared`](Unique::into_shared), for callers that keep
    /// the now-empty handle around.
    pub fn take_shared<'a>(&mut self) -> Option<Shared<'a, T>>
    where
        T: 'a,
        D: Default + 'a,
    {
        std::mem::replace(self, Self::null()).into_shared()
    }
}

/// Convert a unique handle into a shared one, keeping its deleter.
///
/// Returns `None` if `unique` is empty.
pub fn to_shared<'a, T: 'a, D: Deleter<T> + 'a>(unique: Unique<T, D>) -> Option<Shared<'a, T>> {
    unique.into_shared()
}

impl<T, D: Deleter<T>> Drop for Unique<T, D> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T, D: Deleter<T> + Default> Default for Unique<T, D> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Box<T>> for Unique<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T, D: Deleter<T>> Deref for Unique<T, D> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty Unique"),
        }
    }
}

impl<T, D: Deleter<T>> DerefMut for Unique<T, D> {
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("dereferenced an empty Unique"),
        }
    }
}

impl<T: fmt::Debug, D: Deleter<T>> fmt::Debug for Unique<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Unique").field(value).finish(),
            None => f.write_str("Unique(null)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deleter::FnDeleter;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_deleter(count: &Rc<Cell<u32>>) -> FnDeleter<impl FnMut(NonNull<String>)> {
        let count = Rc::clone(count);
        FnDeleter(move |ptr: NonNull<String>| {
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
            count.set(count.get() + 1);
        })
    }

    #[test]
    fn default_deleter_frees_box() {
        let value = Unique::<String>::new(String::from("hello"));
        assert_eq!(value.as_str(), "hello");
        assert!(!value.is_null());
    }

    #[test]
    fn drop_disposes_exactly_once() {
        let count = Rc::new(Cell::new(0));
        {
            let _value = Unique::with_deleter(String::from("x"), counting_deleter(&count));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn reset_disposes_and_empties() {
        let count = Rc::new(Cell::new(0));
        let mut value = Unique::with_deleter(String::from("x"), counting_deleter(&count));
        value.reset();
        assert!(value.is_null());
        assert_eq!(count.get(), 1);
        value.reset();
        drop(value);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn null_handle_never_disposes() {
        let count = Rc::new(Cell::new(0));
        let value = unsafe {
            Unique::<String, _>::from_raw_with_deleter(ptr::null_mut(), counting_deleter(&count))
        };
        assert!(value.is_null());
        assert!(value.get().is_none());
        drop(value);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn into_raw_skips_disposal() {
        let count = Rc::new(Cell::new(0));
        let value = Unique::with_deleter(String::from("kept"), counting_deleter(&count));
        let raw = value.into_raw();
        assert_eq!(count.get(), 0);
        let back = unsafe { Box::from_raw(raw) };
        assert_eq!(*back, "kept");
    }

    #[test]
    fn from_box_round_trip() {
        let mut value: Unique<Vec<u8>> = Box::new(vec![1, 2]).into();
        value.push(3);
        assert_eq!(value.get().map(Vec::len), Some(3));
        assert_eq!(format!("{value:?}"), "Unique([1, 2, 3])");
    }

    #[test]
    #[should_panic(expected = "dereferenced an empty Unique")]
    fn deref_of_empty_handle_panics() {
        let value = Unique::<u32>::null();
        let _copied: u32 = *value;
    }

    #[test]
    fn zero_sized_deleter_adds_no_storage() {
        assert_eq!(
            std::mem::size_of::<Unique<u64>>(),
            std::mem::size_of::<*mut u64>()
        );
    }
}
