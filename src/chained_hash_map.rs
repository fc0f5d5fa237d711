//! ChainedHashMap: separate chaining over a slot arena with explicit growth.
//!
//! Layout
//! - `buckets[i]` is the head of chain `i`; entries link forward with
//!   `next`. An entry lives in chain `hash % capacity`, where `hash` is
//!   cached in the entry when it is created.
//! - Entries sit in a `SlotMap`, so relinking during a rehash only rewrites
//!   keys; no entry moves.
//!
//! Ownership
//! - `put` and `put_ident` clone their borrowed arguments; the `_noalloc`
//!   variants take owned values as-is.
//! - An identity entry (`put_ident*`) owns only its key and exposes the
//!   value as a borrow of it, so dropping the entry releases exactly one
//!   object.
//! - Updating an existing key always keeps the stored key. The incoming key
//!   of `put_noalloc`/`put_ident_noalloc` is dropped, as is the replaced
//!   value.
//!
//! Resizing
//! - Only the insertion of a new entry can grow the map, when the entry
//!   count reaches `threshold = floor(capacity * load_factor)`. The new
//!   bucket array is allocated before anything is linked, so a failed
//!   allocation leaves the map as it was.
//! - Removal and `clear` never shrink the bucket array.
//! - Replacing the hash strategy recomputes every cached hash and relinks in
//!   place at the current capacity.

use crate::alloc::{bucket_array, check_slot};
use crate::error::AllocError;
use crate::growth::{threshold, Growth, DEFAULT_LOAD_FACTOR};
use crate::strategy::{KeyEq, KeyHash, StdEq, StdHash};
use core::borrow::Borrow;
use core::fmt;
use core::ops::ControlFlow;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count of `ChainedHashMap::new`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Whether a put created an entry or updated an existing one.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PutResult {
    Inserted,
    Updated,
}

/// Key and value handed back by `remove_nofree`.
#[derive(Debug, Eq, PartialEq)]
pub enum Removed<K, V> {
    Pair { key: K, value: V },
    /// The entry's key doubled as its value.
    Identity(K),
}

impl<K, V> Removed<K, V> {
    pub fn key(&self) -> &K {
        match self {
            Removed::Pair { key, .. } => key,
            Removed::Identity(key) => key,
        }
    }
}

enum Value<K, V> {
    Owned(V),
    /// The value is a view of the entry's own key.
    SameAsKey(fn(&K) -> &V),
}

struct Entry<K, V> {
    key: K,
    value: Value<K, V>,
    hash: u64,
    next: Option<DefaultKey>,
}

impl<K, V> Entry<K, V> {
    #[inline]
    fn value(&self) -> &V {
        match &self.value {
            Value::Owned(v) => v,
            Value::SameAsKey(view) => view(&self.key),
        }
    }

    fn into_removed(self) -> Removed<K, V> {
        match self.value {
            Value::Owned(value) => Removed::Pair {
                key: self.key,
                value,
            },
            Value::SameAsKey(_) => Removed::Identity(self.key),
        }
    }
}

pub struct ChainedHashMap<K, V, H = StdHash, C = StdEq> {
    buckets: Vec<Option<DefaultKey>>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    growth: Growth,
    factor: f32,
    threshold: usize,
    hasher: H,
    cmp: C,
}

impl<K, V> ChainedHashMap<K, V> {
    /// Empty map with `DEFAULT_CAPACITY` buckets that doubles on resize.
    pub fn new() -> Self {
        Self::from_parts(
            vec![None; DEFAULT_CAPACITY],
            Growth::Multiplicative(2),
            StdHash::default(),
            StdEq,
        )
    }

    pub fn with_capacity_and_growth(capacity: usize, growth: Growth) -> Result<Self, AllocError> {
        Self::with_strategies(capacity, growth, StdHash::default(), StdEq)
    }
}

impl<K, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, C> ChainedHashMap<K, V, H, C> {
    /// Map with `capacity` buckets (at least one), the given growth policy,
    /// hash strategy and comparator.
    pub fn with_strategies(
        capacity: usize,
        growth: Growth,
        hasher: H,
        cmp: C,
    ) -> Result<Self, AllocError> {
        let buckets = bucket_array(capacity.max(1))?;
        Ok(Self::from_parts(buckets, growth, hasher, cmp))
    }

    fn from_parts(buckets: Vec<Option<DefaultKey>>, growth: Growth, hasher: H, cmp: C) -> Self {
        let threshold = threshold(buckets.len(), DEFAULT_LOAD_FACTOR);
        Self {
            buckets,
            entries: SlotMap::with_key(),
            growth,
            factor: DEFAULT_LOAD_FACTOR,
            threshold,
            hasher,
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.factor
    }

    /// Entry count at which the next insertion grows the map.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Hash `key` and find its entry, if any.
    fn locate<Q>(&self, key: &Q) -> (u64, Option<DefaultKey>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let hash = self.hasher.hash_key(key);
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.hash == hash {
                let stored: &Q = e.key.borrow();
                if core::ptr::eq(stored, key) || self.cmp.key_eq(key, stored) {
                    return (hash, Some(k));
                }
            }
            cur = e.next;
        }
        (hash, None)
    }

    /// Link a new entry, growing first if it brings the count to the threshold.
    fn insert_new(&mut self, hash: u64, key: K, value: Value<K, V>) -> Result<(), AllocError> {
        check_slot(&self.entries)?;
        let grown = if self.entries.len() + 1 >= self.threshold {
            match self.growth.next_capacity(self.capacity())? {
                Some(n) => Some(bucket_array(n)?),
                None => None,
            }
        } else {
            None
        };

        let pos = self.bucket_of(hash);
        let k = self.entries.insert(Entry {
            key,
            value,
            hash,
            next: self.buckets[pos],
        });
        self.buckets[pos] = Some(k);

        if let Some(buckets) = grown {
            log::debug!(
                "growing chained map from {} to {} buckets at {} entries",
                self.capacity(),
                buckets.len(),
                self.entries.len()
            );
            self.relink(buckets);
        }
        Ok(())
    }

    // Install `buckets` (all empty) and push every entry onto its chain there.
    fn relink(&mut self, buckets: Vec<Option<DefaultKey>>) {
        self.buckets = buckets;
        let n = self.buckets.len() as u64;
        for (k, e) in self.entries.iter_mut() {
            let pos = (e.hash % n) as usize;
            e.next = self.buckets[pos];
            self.buckets[pos] = Some(k);
        }
        self.threshold = threshold(self.buckets.len(), self.factor);
        log::trace!(
            "relinked {} entries into {} buckets (threshold {})",
            self.entries.len(),
            self.buckets.len(),
            self.threshold
        );
    }

    // Unlink `k` from chain `hash % capacity` and release its slot.
    fn detach(&mut self, k: DefaultKey, hash: u64) -> Option<Entry<K, V>> {
        let pos = self.bucket_of(hash);
        let next = self.entries.get(k)?.next;
        if self.buckets[pos] == Some(k) {
            self.buckets[pos] = next;
        } else {
            let mut cur = self.buckets[pos];
            while let Some(c) = cur {
                let e = &mut self.entries[c];
                if e.next == Some(k) {
                    e.next = next;
                    break;
                }
                cur = e.next;
            }
        }
        self.entries.remove(k)
    }

    /// Insert or update `key`, cloning both key and value.
    ///
    /// On update only the value is cloned; the old value is dropped and the
    /// stored key kept. An identity entry becomes an ordinary one.
    pub fn put<Q, W>(&mut self, key: &Q, value: &W) -> Result<PutResult, AllocError>
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K>,
        W: ?Sized + ToOwned<Owned = V>,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        match self.locate(key) {
            (_, Some(k)) => {
                self.entries[k].value = Value::Owned(value.to_owned());
                Ok(PutResult::Updated)
            }
            (hash, None) => {
                self.insert_new(hash, key.to_owned(), Value::Owned(value.to_owned()))?;
                Ok(PutResult::Inserted)
            }
        }
    }

    /// Insert or update with caller-owned key and value, taken as-is.
    ///
    /// On update the old value is dropped and replaced, and `key` itself is
    /// dropped: the map keeps the key it already stores, so callers interning
    /// keys never end up with two stored copies.
    ///
    /// `Q` is the borrowed form the strategies work on, as for
    /// `set_hash_fn`: `map.put_noalloc::<str>(key, value)`.
    pub fn put_noalloc<Q>(&mut self, key: K, value: V) -> Result<PutResult, AllocError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let found = self.locate::<Q>(key.borrow());
        match found {
            (_, Some(k)) => {
                self.entries[k].value = Value::Owned(value);
                Ok(PutResult::Updated)
            }
            (hash, None) => {
                self.insert_new(hash, key, Value::Owned(value))?;
                Ok(PutResult::Inserted)
            }
        }
    }

    /// Insert a clone of `key` that is its own value.
    ///
    /// If `key` is already present the stored key is kept and becomes the
    /// value; a previously stored distinct value is dropped.
    pub fn put_ident<Q>(&mut self, key: &Q) -> Result<PutResult, AllocError>
    where
        K: Borrow<Q> + Borrow<V>,
        Q: ?Sized + ToOwned<Owned = K>,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let view: fn(&K) -> &V = <K as Borrow<V>>::borrow;
        match self.locate(key) {
            (_, Some(k)) => {
                self.entries[k].value = Value::SameAsKey(view);
                Ok(PutResult::Updated)
            }
            (hash, None) => {
                self.insert_new(hash, key.to_owned(), Value::SameAsKey(view))?;
                Ok(PutResult::Inserted)
            }
        }
    }

    /// Insert an owned `key` that is its own value. On update `key` is dropped
    /// in favour of the stored key, which becomes the value.
    pub fn put_ident_noalloc<Q>(&mut self, key: K) -> Result<PutResult, AllocError>
    where
        K: Borrow<Q> + Borrow<V>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let view: fn(&K) -> &V = <K as Borrow<V>>::borrow;
        let found = self.locate::<Q>(<K as Borrow<Q>>::borrow(&key));
        match found {
            (_, Some(k)) => {
                self.entries[k].value = Value::SameAsKey(view);
                Ok(PutResult::Updated)
            }
            (hash, None) => {
                self.insert_new(hash, key, Value::SameAsKey(view))?;
                Ok(PutResult::Inserted)
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let k = self.locate(key).1?;
        Some(self.entries[k].value())
    }

    /// The stored key and value for `key`. For identity entries both point
    /// at the same object.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let k = self.locate(key).1?;
        let e = &self.entries[k];
        Some((&e.key, e.value()))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        self.locate(key).1.is_some()
    }

    /// Remove `key`, dropping its key and value. Returns whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        self.remove_nofree(key).is_some()
    }

    /// Unlink `key` and hand its key and value back without dropping them.
    pub fn remove_nofree<Q>(&mut self, key: &Q) -> Option<Removed<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
        C: KeyEq<Q>,
    {
        let (hash, found) = self.locate(key);
        let entry = self.detach(found?, hash)?;
        Some(entry.into_removed())
    }

    /// Drop every entry. The bucket array keeps its size.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.fill(None);
    }

    /// Visit entries in bucket order, then chain order, stopping at the
    /// first `Break`, which is returned.
    pub fn browse<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &V) -> ControlFlow<B>,
    {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.buckets,
            entries: &self.entries,
            bucket: 0,
            cur: None,
            remaining: self.entries.len(),
        }
    }

    /// Replace the comparator. Placement does not depend on it, so no rehash.
    pub fn set_cmp_fn(&mut self, cmp: C) {
        self.cmp = cmp;
    }

    /// Replace the hash strategy, recompute every cached hash and relink all
    /// entries at the current capacity.
    ///
    /// `Q` is the borrowed key form the strategy hashes and usually has to be
    /// named: `map.set_hash_fn::<str>(hash_str)`.
    pub fn set_hash_fn<Q>(&mut self, hasher: H)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHash<Q>,
    {
        self.hasher = hasher;
        if self.entries.is_empty() {
            return;
        }
        log::trace!(
            "hash strategy replaced; rehashing {} entries",
            self.entries.len()
        );
        for (_, e) in self.entries.iter_mut() {
            let key: &Q = e.key.borrow();
            e.hash = self.hasher.hash_key(key);
        }
        let mut buckets = core::mem::take(&mut self.buckets);
        buckets.fill(None);
        self.relink(buckets);
    }

    /// Change the load factor. The threshold follows immediately; any resize
    /// waits for the next insertion.
    ///
    /// # Panics
    /// If `factor` is not a positive finite number.
    pub fn set_load_factor(&mut self, factor: f32) {
        assert!(
            factor.is_finite() && factor > 0.0,
            "load factor must be positive and finite, got {}",
            factor
        );
        self.factor = factor;
        self.threshold = threshold(self.buckets.len(), factor);
        log::trace!(
            "load factor set to {}; threshold {} at {} buckets",
            factor,
            self.threshold,
            self.buckets.len()
        );
    }
}

#[cfg(test)]
impl<K, V, H, C> ChainedHashMap<K, V, H, C> {
    /// Panics unless every entry sits exactly once in chain `hash % capacity`.
    pub(crate) fn assert_chains(&self) {
        let mut seen = std::collections::HashSet::new();
        for (pos, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let e = &self.entries[k];
                assert_eq!(self.bucket_of(e.hash), pos, "entry in the wrong chain");
                assert!(seen.insert(k), "entry linked twice");
                cur = e.next;
            }
        }
        assert_eq!(seen.len(), self.entries.len(), "unlinked entries");
        assert_eq!(
            self.threshold,
            threshold(self.buckets.len(), self.factor),
            "stale threshold"
        );
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, C> fmt::Debug for ChainedHashMap<K, V, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over entries in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    buckets: &'a [Option<DefaultKey>],
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    bucket: usize,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = &self.entries[k];
                self.cur = e.next;
                self.remaining -= 1;
                return Some((&e.key, e.value()));
            }
            if self.remaining == 0 || self.bucket >= self.buckets.len() {
                return None;
            }
            self.cur = self.buckets[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, H, C> IntoIterator for &'a ChainedHashMap<K, V, H, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
