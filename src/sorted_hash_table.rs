//! SortedHashTable: chained buckets plus a key-sorted doubly linked list over one arena.

use crate::key_index::{Djb2, KeyIndex};
use core::fmt;
use core::iter::FusedIterator;
use slotmap::{new_key_type, SlotMap};
use std::collections::TryReserveError;
use std::io::{self, Write};
use tracing::{debug, trace};

new_key_type! {
    /// Arena key for an entry; both link structures hold these.
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    /// Next entry in the same bucket chain.
    next: Option<EntryKey>,
    /// Neighbours in the sort list.
    sprev: Option<EntryKey>,
    snext: Option<EntryKey>,
}

/// Failures reported by `SortedHashTable`; the table is unchanged after any of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("bucket array size must be non-zero")]
    ZeroSize,
    #[error("key must be a non-empty string")]
    EmptyKey,
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Copy `s` into a freshly allocated `String`, reporting allocation failure.
fn try_dup(s: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())?;
    out.push_str(s);
    Ok(out)
}

/// String-to-string hash table with a fixed bucket count and a key-sorted
/// traversal order.
pub struct SortedHashTable<H = Djb2> {
    index: H,
    buckets: Box<[Option<EntryKey>]>,
    slots: SlotMap<EntryKey, Entry>, // owns every entry exactly once
    shead: Option<EntryKey>,
    stail: Option<EntryKey>,
}

impl SortedHashTable {
    /// Create a table with `size` buckets using the djb2 key index.
    pub fn new(size: usize) -> Result<Self, TableError> {
        Self::with_key_index(size, Djb2)
    }
}

impl<H: KeyIndex> SortedHashTable<H> {
    /// Create a table with `size` buckets placed by `index`.
    pub fn with_key_index(size: usize, index: H) -> Result<Self, TableError> {
        if size == 0 {
            debug!("rejecting sorted hash table of size 0");
            return Err(TableError::ZeroSize);
        }
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(size)?;
        buckets.resize(size, None);
        debug!(size, "created sorted hash table");
        Ok(Self {
            index,
            buckets: buckets.into_boxed_slice(),
            slots: SlotMap::with_key(),
            shead: None,
            stail: None,
        })
    }

    fn bucket_of(&self, key: &str) -> usize {
        let size = self.buckets.len();
        let idx = self.index.key_index(key.as_bytes(), size);
        debug_assert!(idx < size, "key index {idx} out of range for size {size}");
        idx % size
    }

    /// Walk one bucket chain for `key`.
    fn chain_find(&self, bucket: usize, key: &str) -> Option<EntryKey> {
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.key == key {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets, fixed at creation.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Insert `key` or replace its value.
    ///
    /// A new key is pushed at the head of its bucket chain and spliced into the
    /// sort list before the first key that is not less than it. An existing key
    /// keeps both positions; only the value changes. On error the table is left
    /// exactly as it was.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), TableError> {
        if key.is_empty() {
            debug!("rejecting set with empty key");
            return Err(TableError::EmptyKey);
        }
        let bucket = self.bucket_of(key);

        if let Some(k) = self.chain_find(bucket, key) {
            let value = try_dup(value)?;
            trace!(key, bucket, "updating value");
            // Old value dropped here.
            self.slots[k].value = value;
            return Ok(());
        }

        // Reserve the arena slot first so `insert` below cannot allocate.
        self.slots.try_reserve(1)?;
        let entry = Entry {
            key: try_dup(key)?,
            value: try_dup(value)?,
            next: self.buckets[bucket],
            sprev: None,
            snext: None,
        };
        let k = self.slots.insert(entry);
        self.buckets[bucket] = Some(k);
        self.sorted_insert(k);
        trace!(key, bucket, len = self.slots.len(), "inserted entry");
        Ok(())
    }

    /// Splice an unlinked entry into the sort list by linear scan from the head.
    fn sorted_insert(&mut self, k: EntryKey) {
        let mut cur = self.shead;
        while let Some(c) = cur {
            if self.slots[k].key <= self.slots[c].key {
                break;
            }
            cur = self.slots[c].snext;
        }

        match cur {
            // Before `c` (possibly the new head).
            Some(c) => {
                let prev = self.slots[c].sprev;
                {
                    let e = &mut self.slots[k];
                    e.snext = Some(c);
                    e.sprev = prev;
                }
                self.slots[c].sprev = Some(k);
                match prev {
                    Some(p) => self.slots[p].snext = Some(k),
                    None => self.shead = Some(k),
                }
            }
            // At the tail (possibly the only entry).
            None => {
                self.slots[k].sprev = self.stail;
                match self.stail {
                    Some(t) => self.slots[t].snext = Some(k),
                    None => self.shead = Some(k),
                }
                self.stail = Some(k);
            }
        }
    }

    /// Look up `key` through its bucket chain.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        let bucket = self.bucket_of(key);
        self.chain_find(bucket, key)
            .map(|k| self.slots[k].value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries in ascending key order; `.rev()` gives descending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: &self.slots,
            front: self.shead,
            back: self.stail,
            remaining: self.slots.len(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.iter().map(|(_, v)| v)
    }

    /// Entries of one bucket chain, most recently inserted first. Empty when
    /// `index` is out of range.
    pub fn bucket(&self, index: usize) -> Bucket<'_> {
        Bucket {
            slots: &self.slots,
            cur: self.buckets.get(index).copied().flatten(),
        }
    }

    /// Write `{'k': 'v', ...}` plus a newline in ascending key order.
    pub fn write_sorted<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", self)
    }

    /// Write `{'k': 'v', ...}` plus a newline in descending key order.
    pub fn write_sorted_rev<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", self.display_rev())
    }

    /// Print the table to stdout in ascending key order.
    pub fn print(&self) -> io::Result<()> {
        self.write_sorted(io::stdout().lock())
    }

    /// Print the table to stdout in descending key order.
    pub fn print_rev(&self) -> io::Result<()> {
        self.write_sorted_rev(io::stdout().lock())
    }

    /// `Display` adapter rendering the table in descending key order.
    pub fn display_rev(&self) -> DisplayRev<'_, H> {
        DisplayRev { table: self }
    }

    /// Check that the bucket chains and the sort list index the same entries.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        use std::collections::HashSet;

        let mut from_buckets = HashSet::new();
        for (i, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let e = &self.slots[k];
                assert_eq!(self.bucket_of(&e.key), i, "entry in wrong bucket");
                assert!(from_buckets.insert(k), "entry chained twice");
                cur = e.next;
            }
        }

        let mut from_list = HashSet::new();
        let mut prev: Option<EntryKey> = None;
        let mut cur = self.shead;
        while let Some(k) = cur {
            let e = &self.slots[k];
            assert_eq!(e.sprev, prev, "broken back link");
            if let Some(p) = prev {
                assert!(self.slots[p].key < e.key, "sort list out of order");
            }
            assert!(from_list.insert(k), "entry listed twice");
            prev = Some(k);
            cur = e.snext;
        }
        assert_eq!(self.stail, prev, "tail does not match last entry");

        let all: HashSet<EntryKey> = self.slots.keys().collect();
        assert_eq!(from_buckets, all);
        assert_eq!(from_list, all);
    }
}

impl<H> Drop for SortedHashTable<H> {
    fn drop(&mut self) {
        // Release entries through the sort list alone; it indexes all of them.
        let mut released = 0usize;
        let mut cur = self.shead.take();
        while let Some(k) = cur {
            cur = self.slots.remove(k).and_then(|e| e.snext);
            released += 1;
        }
        self.stail = None;
        debug_assert!(self.slots.is_empty(), "sort list missed entries");
        trace!(released, "released sorted hash table");
    }
}

impl<H: KeyIndex> fmt::Display for SortedHashTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.iter())
    }
}

impl<H: KeyIndex> fmt::Debug for SortedHashTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Descending-order rendering returned by `SortedHashTable::display_rev`.
pub struct DisplayRev<'a, H> {
    table: &'a SortedHashTable<H>,
}

impl<'a, H: KeyIndex> fmt::Display for DisplayRev<'a, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.table.iter().rev())
    }
}

fn write_pairs<'a, I>(f: &mut fmt::Formatter<'_>, pairs: I) -> fmt::Result
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    f.write_str("{")?;
    for (i, (k, v)) in pairs.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "'{}': '{}'", k, v)?;
    }
    f.write_str("}")
}

/// Iterator over the sort list.
pub struct Iter<'a> {
    slots: &'a SlotMap<EntryKey, Entry>,
    front: Option<EntryKey>,
    back: Option<EntryKey>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slots = self.slots;
        let e = &slots[self.front?];
        self.front = e.snext;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slots = self.slots;
        let e = &slots[self.back?];
        self.back = e.sprev;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}

impl<'a, H: KeyIndex> IntoIterator for &'a SortedHashTable<H> {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a single bucket chain.
pub struct Bucket<'a> {
    slots: &'a SlotMap<EntryKey, Entry>,
    cur: Option<EntryKey>,
}

impl<'a> Iterator for Bucket<'a> {
    type Item = (&'a str, &'a str);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let e = &slots[self.cur?];
        self.cur = e.next;
        Some((&e.key, &e.value))
    }
}

impl<'a> FusedIterator for Bucket<'a> {}
