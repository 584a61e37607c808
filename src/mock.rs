//! Mock implementation with essentially the same API as [`IntervalMap`], but backed by a vector
//!
//! [`IntervalMap`]: crate::IntervalMap

use crate::param::IntervalTraits;
use crate::public_traits::{Key, Value};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

#[cfg(feature = "fuzz")]
use arbitrary::Arbitrary;

/// A pair of keys, as generated by fuzzing
///
/// The keys can be in either order; [`sorted`](Self::sorted) puts them in order for use as an
/// interval.
#[cfg_attr(feature = "fuzz", derive(Arbitrary))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span<K> {
    pub start: K,
    pub stop: K,
}

impl<K: Copy + Ord> Span<K> {
    pub fn sorted(self) -> (K, K) {
        match self.start <= self.stop {
            true => (self.start, self.stop),
            false => (self.stop, self.start),
        }
    }
}

/// A mock, inefficient implementation of the [`IntervalMap`](crate::IntervalMap) interface
///
/// Entries are `(start, stop, value)` triples, kept sorted and fully coalesced. Positions are
/// plain indexes into the list of entries, with `entries().len()` standing in for the end.
///
/// Where the real map only checks its preconditions in debug builds, the mock always checks them
/// up front: every modifying method panics (without changing anything) if its arguments would be
/// invalid. The `can_*` methods perform the same checks without panicking.
pub struct Mock<K, V, T> {
    entries: Vec<(K, K, V)>,
    traits: PhantomData<fn() -> T>,
}

impl<K: Key, V: Value, T: IntervalTraits<K>> Mock<K, V, T> {
    pub fn new() -> Self {
        Mock { entries: Vec::new(), traits: PhantomData }
    }

    pub fn entries(&self) -> &[(K, K, V)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the index of the first entry that ends at or after `x`
    pub fn find(&self, x: K) -> usize {
        self.entries.iter().position(|&(_, b, _)| !T::stop_less(b, x)).unwrap_or(self.entries.len())
    }

    pub fn lookup(&self, x: K, not_found: V) -> V {
        match self.entries.get(self.find(x)) {
            Some(&(a, _, y)) if !T::start_less(x, a) => y,
            _ => not_found,
        }
    }

    pub fn overlaps(&self, a: K, b: K) -> bool {
        self.entries.iter().any(|&(c, d, _)| intersect::<K, T>((a, b), (c, d)))
    }

    /// Returns true if `[a, b]` is non-empty and doesn't overlap any entry, optionally ignoring
    /// the entry at index `skip`
    fn fits(&self, a: K, b: K, skip: Option<usize>) -> bool {
        T::non_empty(a, b)
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, &(c, d, _))| Some(i) == skip || !intersect::<K, T>((a, b), (c, d)))
    }

    pub fn can_insert(&self, a: K, b: K) -> bool {
        self.fits(a, b, None)
    }

    /// Inserts `[a, b]` with value `y`, returning the index of the entry that contains it
    pub fn insert(&mut self, a: K, b: K, y: V) -> usize {
        if !self.can_insert(a, b) {
            panic!("invalid or overlapping insertion");
        }

        let i = self.find(a);
        self.entries.insert(i, (a, b, y));
        self.coalesce(i)
    }

    /// Removes the entry at index `i`; the following entry takes its index
    pub fn erase(&mut self, i: usize) {
        if i >= self.entries.len() {
            panic!("cannot erase end()");
        }
        self.entries.remove(i);
    }

    pub fn can_set_start(&self, i: usize, a: K) -> bool {
        i < self.entries.len() && self.fits(a, self.entries[i].1, Some(i))
    }

    pub fn can_set_stop(&self, i: usize, b: K) -> bool {
        i < self.entries.len() && self.fits(self.entries[i].0, b, Some(i))
    }

    /// Moves the start of entry `i`, returning the index of the entry that contains it afterwards
    pub fn set_start(&mut self, i: usize, a: K) -> usize {
        if !self.can_set_start(i, a) {
            panic!("invalid start");
        }
        self.entries[i].0 = a;
        self.coalesce(i)
    }

    pub fn set_stop(&mut self, i: usize, b: K) -> usize {
        if !self.can_set_stop(i, b) {
            panic!("invalid stop");
        }
        self.entries[i].1 = b;
        self.coalesce(i)
    }

    pub fn set_value(&mut self, i: usize, y: V) -> usize {
        if i >= self.entries.len() {
            panic!("cannot set value at end()");
        }
        self.entries[i].2 = y;
        self.coalesce(i)
    }

    /// Every pair of overlapping entries between `self` and `other`, as indexes into each
    pub fn overlapping_pairs<W: Value>(&self, other: &Mock<K, W, T>) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, &(a, b, _)) in self.entries.iter().enumerate() {
            for (j, &(c, d, _)) in other.entries.iter().enumerate() {
                if intersect::<K, T>((a, b), (c, d)) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    // Merges entry `i` with its neighbors, where possible. Returns the new index of the entry.
    fn coalesce(&mut self, mut i: usize) -> usize {
        if i + 1 < self.entries.len() && self.mergeable(i) {
            self.entries[i].1 = self.entries[i + 1].1;
            self.entries.remove(i + 1);
        }
        if i != 0 && self.mergeable(i - 1) {
            self.entries[i - 1].1 = self.entries[i].1;
            self.entries.remove(i);
            i -= 1;
        }
        i
    }

    // Returns true if entries `i` and `i + 1` touch and have the same value
    fn mergeable(&self, i: usize) -> bool {
        let ((_, b, x), (c, _, y)) = (self.entries[i], self.entries[i + 1]);
        x == y && T::adjacent(b, c)
    }
}

/// Returns true if the intervals `x` and `y` have any key in common
fn intersect<K: Copy, T: IntervalTraits<K>>(x: (K, K), y: (K, K)) -> bool {
    !T::stop_less(x.1, y.0) && !T::stop_less(y.1, x.0)
}

impl<K: Key, V: Value, T: IntervalTraits<K>> Default for Mock<K, V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, T> Clone for Mock<K, V, T> {
    fn clone(&self) -> Self {
        Mock { entries: self.entries.clone(), traits: PhantomData }
    }
}

impl<K: Debug, V: Debug, T> Debug for Mock<K, V, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Mock").field("entries", &self.entries).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Mock;
    use crate::param::{Closed, HalfOpen};

    #[test]
    fn insert_coalesces_both_ways() {
        let mut mock: Mock<u8, char, Closed> = Mock::new();
        assert_eq!(mock.insert(10, 19, 'a'), 0);
        assert_eq!(mock.insert(30, 39, 'a'), 1);
        assert_eq!(mock.insert(20, 29, 'a'), 0);
        assert_eq!(mock.entries(), [(10, 39, 'a')]);

        assert!(!mock.can_insert(5, 10));
        assert!(!mock.can_insert(9, 8));
        assert_eq!(mock.insert(5, 9, 'b'), 0);
        assert_eq!(mock.lookup(9, '-'), 'b');
        assert_eq!(mock.lookup(4, '-'), '-');
        assert_eq!(mock.find(40), 2);
    }

    #[test]
    fn setters_merge_neighbors() {
        let mut mock: Mock<u8, char, HalfOpen> = Mock::new();
        mock.insert(0, 10, 'a');
        mock.insert(10, 20, 'b');
        mock.insert(20, 30, 'a');
        assert_eq!(mock.entries().len(), 3);

        assert_eq!(mock.set_value(1, 'a'), 0);
        assert_eq!(mock.entries(), [(0, 30, 'a')]);

        mock.insert(40, 50, 'a');
        assert!(!mock.can_set_stop(0, 41));
        assert_eq!(mock.set_stop(0, 40), 0);
        assert_eq!(mock.entries(), [(0, 50, 'a')]);
    }

    #[test]
    fn overlapping_pairs_in_order() {
        let mut a: Mock<u8, char, Closed> = Mock::new();
        let mut b: Mock<u8, bool, Closed> = Mock::new();
        a.insert(0, 10, 'x');
        a.insert(20, 30, 'y');
        b.insert(5, 6, true);
        b.insert(8, 22, false);
        b.insert(31, 40, true);

        assert_eq!(a.overlapping_pairs(&b), [(0, 0), (0, 1), (1, 1)]);
        assert!(a.overlaps(11, 20));
        assert!(!a.overlaps(11, 19));
    }
}
