use std::{
    hash::{BuildHasher, Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
};

use crate::table::FNV1aBuilder;

/// An owned string bundled with its hash, computed once at construction.
/// Interning compares the hash before the bytes, so misses are usually a
/// single integer compare.
pub struct HashedString<S: BuildHasher + Default = FNV1aBuilder> {
    hash: u32,
    inner: String,
    _marker: PhantomData<S>,
}

impl<S: BuildHasher + Default> From<String> for HashedString<S> {
    fn from(inner: String) -> Self {
        let mut hasher = S::default().build_hasher();
        inner.hash(&mut hasher);
        let hash = hasher.finish() as u32;
        Self {
            hash,
            inner,
            _marker: PhantomData,
        }
    }
}

impl<S: BuildHasher + Default> Hash for HashedString<S> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl<S: BuildHasher + Default> PartialEq for HashedString<S> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.inner == other.inner
    }
}

impl<S: BuildHasher + Default> Eq for HashedString<S> {}

impl<S: BuildHasher + Default> Deref for HashedString<S> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<S: BuildHasher + Default> std::fmt::Display for HashedString<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}
