//! ringchain: a circular doubly-linked list and a separate-chaining hash
//! map, both single-threaded and owning their storage.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: two small containers whose structural invariants (ring links,
//!   chain membership, key/value ownership) hold under every edge case:
//!   one-element rings, identity entries, growth in the middle of an insert.
//! - Components:
//!   - CircularList<T>: nodes in a `SlotMap` arena linked into a ring; the
//!     list remembers only its head. Elements are reached through stable
//!     generational `Handle`s.
//!   - ChainedHashMap<K, V, H, C>: bucket array of chain heads over a
//!     `SlotMap` of entries, with an explicit `Growth` policy, a load factor,
//!     and pluggable `KeyHash`/`KeyEq` strategies.
//!
//! Constraints
//! - Single-threaded: no locks, no atomics. Both containers are `Send` and
//!   `Sync` exactly when their contents and strategies are.
//! - Node and entry memory is owned by the arenas; nothing is freed by hand,
//!   so double frees and use-after-free are ruled out by the types.
//! - Allocation failure is reported as `AllocError` from every operation
//!   that allocates, never as an abort.
//! - Misuse that used to be undefined (first/last of an empty list) is an
//!   `EmptyError`.
//!
//! Ownership policies of the map
//! - `put`/`put_ident` clone borrowed input; `put_noalloc`/
//!   `put_ident_noalloc` move caller-owned values in.
//! - Identity entries are a tagged variant whose value is a view of the key:
//!   one object, one drop.
//! - Updates keep the stored key and drop the incoming one.
//!
//! Resizing
//! - Growth happens only while inserting a new entry, once the count reaches
//!   the threshold, and the new bucket array is allocated before anything is
//!   linked. `set_hash_fn` relinks in place; `set_load_factor` waits for the
//!   next insert.
//!
//! Strategies and callbacks
//! - Hash and compare strategies, like browse callbacks, only ever see shared
//!   references, so they may read the map they serve but cannot restructure
//!   it.
//! - Strategies hash and compare a borrowed form `Q` of the key. Lookups infer
//!   it from the argument; owned puts and `set_hash_fn` name it:
//!   `map.put_noalloc::<str>(key, value)`.
//!
//! Logging
//! - Growth is reported through `log::debug!`, rehash details through
//!   `log::trace!`. The crate installs no logger.

mod alloc;
pub mod chained_hash_map;
pub mod error;
pub mod growth;
pub mod list;
pub mod strategy;

#[cfg(test)]
mod chained_hash_map_proptest;

// Public surface
pub use chained_hash_map::{ChainedHashMap, PutResult, Removed};
pub use error::{AllocError, EmptyError};
pub use growth::Growth;
pub use list::{CircularList, Handle};
pub use strategy::{KeyEq, KeyHash, StdEq, StdHash};
