//! Append-only collection with chunked capacity growth.
//!
//! Every "list of N host facts" accessor (interface names, logged-in
//! sessions) returns a [`GrowableCollection`]. These are write-once,
//! read-many snapshots: insertion order is preserved, there is no
//! deduplication and no element removal beyond [`GrowableCollection::clear`].

use std::ops::Deref;

/// Owned sequence that grows capacity in fixed-size chunks.
///
/// Unlike `Vec`, which doubles, capacity here always advances by exactly
/// the chunk size chosen at construction, so after `N` pushes into a
/// collection with chunk `K` the capacity is `K * ceil(N/K)`. Growth is
/// monotonic within a lifetime; only `clear` releases storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowableCollection<T> {
    items: Vec<T>,
    capacity: usize,
    chunk: usize,
}

impl<T> GrowableCollection<T> {
    /// Creates an empty collection with one chunk pre-allocated.
    ///
    /// # Panics
    /// Panics if `chunk` is zero.
    pub fn with_chunk(chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be non-zero");
        let mut items = Vec::new();
        items.reserve_exact(chunk);
        Self {
            items,
            capacity: chunk,
            chunk,
        }
    }

    /// Appends a value, growing capacity by one chunk when full.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.grow();
        }
        self.items.push(value);
    }

    fn grow(&mut self) {
        self.capacity += self.chunk;
        self.items.reserve_exact(self.capacity - self.items.len());
    }

    /// Number of elements stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current logical capacity, always a multiple of the chunk size
    /// (zero after `clear`).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Releases storage and resets both length and capacity to zero.
    ///
    /// Safe to call repeatedly or on a freshly created collection.
    pub fn clear(&mut self) {
        self.items = Vec::new();
        self.capacity = 0;
    }

    /// Elements in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterator over elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the collection, yielding its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for GrowableCollection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for GrowableCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a GrowableCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_grows_in_chunks() {
        let mut c = GrowableCollection::with_chunk(4);
        assert_eq!(c.capacity(), 4);

        for n in 0..10 {
            c.push(n);
        }

        // ceil(10/4) = 3 chunks
        assert_eq!(c.len(), 10);
        assert_eq!(c.capacity(), 12);
    }

    #[test]
    fn test_capacity_formula_for_various_lengths() {
        for chunk in [1usize, 3, 8] {
            for n in 0..20usize {
                let mut c = GrowableCollection::with_chunk(chunk);
                for i in 0..n {
                    c.push(i);
                }
                let expected = chunk * n.div_ceil(chunk).max(1);
                assert_eq!(c.capacity(), expected, "chunk={chunk} n={n}");
                assert_eq!(c.len(), n);
            }
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut c = GrowableCollection::with_chunk(2);
        for name in ["lo", "eth0", "eth1", "wlan0", "docker0"] {
            c.push(name.to_string());
        }
        let names: Vec<&str> = c.iter().map(String::as_str).collect();
        assert_eq!(names, ["lo", "eth0", "eth1", "wlan0", "docker0"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut c = GrowableCollection::with_chunk(4);
        c.push("a".to_string());
        c.push("b".to_string());

        c.clear();
        assert_eq!(c.len(), 0);
        assert_eq!(c.capacity(), 0);

        // second clear and clearing a fresh collection are both no-ops
        c.clear();
        assert_eq!(c.len(), 0);
        assert_eq!(c.capacity(), 0);

        let mut fresh: GrowableCollection<u8> = GrowableCollection::with_chunk(4);
        fresh.clear();
        assert_eq!(fresh.capacity(), 0);
    }

    #[test]
    fn test_push_after_clear_reallocates() {
        let mut c = GrowableCollection::with_chunk(3);
        c.push(1);
        c.clear();
        c.push(2);
        assert_eq!(c.as_slice(), [2]);
        assert_eq!(c.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "chunk size must be non-zero")]
    fn test_zero_chunk_panics() {
        let _: GrowableCollection<u8> = GrowableCollection::with_chunk(0);
    }
}
