//! Pluggable hashing and key comparison for `ChainedHashMap`.
//!
//! Both traits are implemented for plain closures and function pointers, so a
//! map can be built around `fn(&str) -> u64` style functions, and for the
//! `StdHash`/`StdEq` adapters that defer to `core::hash` and `Eq`.
//!
//! A map with strategies `H` and `C` can be queried with `&Q` whenever
//! `K: Borrow<Q>`, `H: KeyHash<Q>` and `C: KeyEq<Q>`. As with std maps, the
//! hash of a borrowed form must equal the hash of the owned key.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Computes the hash used for bucket placement.
pub trait KeyHash<Q: ?Sized> {
    fn hash_key(&self, key: &Q) -> u64;
}

/// Decides whether two keys with equal hashes are the same key.
pub trait KeyEq<Q: ?Sized> {
    fn key_eq(&self, a: &Q, b: &Q) -> bool;
}

impl<Q: ?Sized, F> KeyHash<Q> for F
where
    F: Fn(&Q) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u64 {
        self(key)
    }
}

impl<Q: ?Sized, F> KeyEq<Q> for F
where
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        self(a, b)
    }
}

/// Hashes through a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = DefaultHashBuilder>(pub S);

impl<S> StdHash<S> {
    pub fn new(state: S) -> Self {
        StdHash(state)
    }
}

impl<Q, S> KeyHash<Q> for StdHash<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u64 {
        self.0.hash_one(key)
    }
}

/// Compares with `Eq`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdEq;

impl<Q: ?Sized + Eq> KeyEq<Q> for StdEq {
    #[inline]
    fn key_eq(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}
