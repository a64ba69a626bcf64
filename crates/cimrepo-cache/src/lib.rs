//! Bounded, thread-safe LRU cache for resolved repository objects.
//!
//! [`ObjectCache`] stores cloneable values keyed by a normalized path
//! string. Keys are case-insensitive: they are folded to ASCII lowercase
//! once at the boundary, never re-folded per comparison. Slots live in an
//! arena (a dense vector with explicit prev/next indices and a free list)
//! so promotion to most-recently-used and eviction of the least-recently-
//! used entry are both O(1) with no pointer chasing.
//!
//! All operations serialize on one internal mutex: the cache guarantees a
//! strict, globally observable LRU order and atomic hit-plus-promote
//! semantics, at the cost of serializing all cache traffic regardless of
//! key. Hits return a clone of the stored value; callers may mutate their
//! copy freely without affecting the cache.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

/// Sentinel for "no slot" in the intrusive queue links.
const NIL: usize = usize::MAX;

struct Slot<T> {
    key: String,
    value: Option<T>,
    prev: usize,
    next: usize,
}

struct Inner<T> {
    slots: Vec<Slot<T>>,
    index: HashMap<String, usize>,
    free: Vec<usize>,
    /// Least-recently-used end of the queue.
    head: usize,
    /// Most-recently-used end of the queue.
    tail: usize,
}

/// Generic, capacity-bounded, thread-safe LRU cache.
///
/// A capacity of zero disables the cache: every `put` is a no-op and every
/// `get` is a miss.
pub struct ObjectCache<T: Clone> {
    inner: Mutex<Inner<T>>,
    max_entries: usize,
}

impl<T: Clone> ObjectCache<T> {
    /// Create a cache holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: Vec::new(),
                index: HashMap::new(),
                free: Vec::new(),
                head: NIL,
                tail: NIL,
            }),
            max_entries,
        }
    }

    /// The fixed capacity this cache was constructed with.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or update the value under `key`.
    ///
    /// On update the stored value is replaced and the entry is promoted to
    /// most-recently-used. On insert the entry joins at the MRU end; if the
    /// cache is full, the LRU entry is evicted first.
    pub fn put(&self, key: &str, value: T) {
        if self.max_entries == 0 {
            return;
        }
        let key = key.to_ascii_lowercase();
        let mut inner = self.inner.lock();

        if let Some(slot) = inner.index.get(&key).copied() {
            inner.slots[slot].value = Some(value);
            inner.unlink(slot);
            inner.push_mru(slot);
            return;
        }

        if inner.index.len() == self.max_entries {
            let lru = inner.head;
            let evicted = inner.slots[lru].key.clone();
            inner.remove(lru);
            debug!(key = %evicted, "cache eviction (LRU pressure)");
        }

        let slot = match inner.free.pop() {
            Some(slot) => {
                inner.slots[slot].key = key.clone();
                inner.slots[slot].value = Some(value);
                slot
            }
            None => {
                inner.slots.push(Slot {
                    key: key.clone(),
                    value: Some(value),
                    prev: NIL,
                    next: NIL,
                });
                inner.slots.len() - 1
            }
        };
        inner.index.insert(key, slot);
        inner.push_mru(slot);
    }

    /// Look up `key`, promoting the entry to most-recently-used on a hit.
    ///
    /// Returns a clone of the stored value; the cache keeps ownership of
    /// the original.
    pub fn get(&self, key: &str) -> Option<T> {
        if self.max_entries == 0 {
            return None;
        }
        let key = key.to_ascii_lowercase();
        let mut inner = self.inner.lock();
        let slot = *inner.index.get(&key)?;
        inner.unlink(slot);
        inner.push_mru(slot);
        inner.slots[slot].value.clone()
    }

    /// Remove the entry under `key` if present. The LRU order of the
    /// remaining entries is unaffected.
    pub fn evict(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        let mut inner = self.inner.lock();
        match inner.index.get(&key).copied() {
            Some(slot) => {
                inner.remove(slot);
                debug!(key = %key, "cache eviction (explicit)");
                true
            }
            None => false,
        }
    }

    /// Drop every entry. Used for whole-namespace invalidation.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.index.len();
        inner.slots.clear();
        inner.index.clear();
        inner.free.clear();
        inner.head = NIL;
        inner.tail = NIL;
        if dropped > 0 {
            debug!(dropped, "cache cleared");
        }
    }
}

impl<T> Inner<T> {
    /// Detach `slot` from the LRU queue, leaving it dangling.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[slot].prev = NIL;
        self.slots[slot].next = NIL;
    }

    /// Attach a dangling `slot` at the MRU end.
    fn push_mru(&mut self, slot: usize) {
        self.slots[slot].prev = self.tail;
        self.slots[slot].next = NIL;
        if self.tail == NIL {
            self.head = slot;
        } else {
            self.slots[self.tail].next = slot;
        }
        self.tail = slot;
    }

    /// Remove `slot` entirely: queue, index, and arena (returned to the
    /// free list).
    fn remove(&mut self, slot: usize) {
        self.unlink(slot);
        let key = std::mem::take(&mut self.slots[slot].key);
        self.index.remove(&key);
        self.slots[slot].value = None;
        self.free.push(slot);
    }
}

impl<T: Clone> std::fmt::Debug for ObjectCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}
