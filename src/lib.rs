//! sorted-hash-table: a string-to-string hash table with chained buckets and
//! a second, key-sorted traversal order over the same entries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average `get`/`set` through hashing, plus deterministic
//!   ascending/descending dumps that do not depend on bucket layout.
//! - Layers:
//!   - `KeyIndex`: maps key bytes and the bucket count to a bucket index.
//!     `Djb2` is the default; `Fnv1a` and plain closures also work.
//!   - `SortedHashTable<H>`: a fixed-size bucket array of singly linked
//!     collision chains, and a doubly linked sort list, both threaded
//!     through one slot arena.
//!
//! Constraints
//! - Single-threaded; mutation requires `&mut self`, there is no internal
//!   locking.
//! - The bucket count is fixed at creation; the table never rehashes.
//! - Keys are unique and non-empty. Values may be empty.
//! - No removal of individual entries; everything is released on drop.
//!
//! Dual indexing
//! - Each entry is stored once in a `SlotMap` owned by the table. The
//!   bucket chain (`next`) and the sort list (`sprev`/`snext`) hold arena
//!   keys, never ownership, so the two views cannot drift apart.
//! - A new key is pushed at the head of its bucket chain and spliced into
//!   the sort list with a linear scan from the head. An existing key keeps
//!   both positions; only its value is replaced.
//! - Lookups consult the bucket chain only. Dumps and iteration consult the
//!   sort list only. Drop walks the sort list once.
//!
//! Failure semantics
//! - `set` duplicates key and value with fallible reservation before any
//!   link is touched, so allocation failure leaves the table unchanged.
//! - Invalid input (zero size, empty key) is reported as `TableError`; no
//!   operation panics on it.
//!
//! Logging
//! - Events go through `tracing` at `debug`/`trace` level; the crate never
//!   installs a subscriber.

pub mod key_index;
pub mod sorted_hash_table;
mod sorted_hash_table_proptest;

// Public surface
pub use key_index::{hash_djb2, key_index, Djb2, Fnv1a, KeyIndex};
pub use sorted_hash_table::{Bucket, DisplayRev, Iter, SortedHashTable, TableError};
