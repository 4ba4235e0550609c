use std::any::Any;
use std::fmt::Display;
use std::ptr::NonNull;

/// A non-owning handle to a heap allocation. Every `Object` is registered
/// with the VM at construction; the VM frees them all at teardown via
/// `drop_inner`.
#[repr(transparent)]
pub struct Object<T: ?Sized>(NonNull<T>);

impl<T: 'static> From<Object<T>> for Object<dyn Any> {
    #[inline]
    fn from(obj: Object<T>) -> Self {
        Self(obj.0)
    }
}

impl<T: ?Sized> Clone for Object<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Object<T> {}

impl<T: ?Sized> std::ops::Deref for Object<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { self.0.as_ref() }
    }
}

impl<T> Object<T> {
    // objects always live in the heap
    pub fn new(data: T) -> Self {
        let ptr = unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(data))) };
        Self(ptr)
    }
}

impl<T: ?Sized> Object<T> {
    /// Identity comparison: do the two handles point at the same allocation?
    #[inline]
    pub fn ptr_eq(self, other: Self) -> bool {
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }

    /// Frees the allocation. The handle (and every copy of it) must not be
    /// dereferenced afterwards; only the VM's `Drop` calls this.
    pub fn drop_inner(self) {
        unsafe {
            let _ = Box::from_raw(self.0.as_ptr());
        }
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Object<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: ?Sized + Eq> Eq for Object<T> {}

impl<T: ?Sized> std::borrow::Borrow<T> for Object<T> {
    fn borrow(&self) -> &T {
        self
    }
}

impl<T: ?Sized + std::hash::Hash> std::hash::Hash for Object<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: ?Sized + Display> Display for Object<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (**self).fmt(f)
    }
}
