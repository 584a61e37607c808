//! Wrapper module for [`IntervalMap`](crate::IntervalMap) cursor and iterator types --
//! [`Cursor`], [`CursorMut`], and [`Iter`]

use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;

use crate::param::{Closed, IntervalTraits};
use crate::public_traits::{Key, Value};

use super::node::{BranchNode, LeafNode};
use super::path::Path;
use super::{Editor, IntervalMap, TreeRef, DEFAULT_ROOT_CAPACITY};

/// A read-only position in an [`IntervalMap`]
///
/// A cursor either points at one of the map's intervals, or is *at the end*, past the last
/// interval. Moving a cursor is amortized `O(1)` per step (worst-case `O(log n)`), and cursors
/// can be searched forward with [`advance_to`] in time logarithmic in the distance moved.
///
/// Cursors are produced by the [`begin`], [`end`], and [`find`] methods on the map. Two cursors
/// are equal if they're at the same position in the same map.
///
/// [`IntervalMap`]: crate::IntervalMap
/// [`advance_to`]: Self::advance_to
/// [`begin`]: crate::IntervalMap::begin
/// [`end`]: crate::IntervalMap::end
/// [`find`]: crate::IntervalMap::find
pub struct Cursor<'m, 'a, K, V, const N: usize = DEFAULT_ROOT_CAPACITY, T = Closed>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    map: &'m IntervalMap<'a, K, V, N, T>,
    path: Path,
}

/// A position in an [`IntervalMap`] that can modify the map
///
/// `CursorMut` has all of the navigation methods of [`Cursor`], along with methods to insert,
/// erase, and change intervals at the cursor. Every modification keeps the map fully coalesced,
/// and leaves the cursor at the (possibly merged) interval that was changed.
///
/// [`IntervalMap`]: crate::IntervalMap
pub struct CursorMut<'m, 'a, K, V, const N: usize = DEFAULT_ROOT_CAPACITY, T = Closed>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    map: &'m mut IntervalMap<'a, K, V, N, T>,
    path: Path,
}

/// An iterator over the intervals in an [`IntervalMap`], yielding `(start, stop, value)`
///
/// This iterator is double-ended, and is produced by the [`iter`] method on the map.
///
/// [`IntervalMap`]: crate::IntervalMap
/// [`iter`]: crate::IntervalMap::iter
pub struct Iter<'m, 'a, K, V, const N: usize = DEFAULT_ROOT_CAPACITY, T = Closed>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    front: Cursor<'m, 'a, K, V, N, T>,
    back: Cursor<'m, 'a, K, V, N, T>,
}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> TreeRef<'t, K, V, T, N> {
    /// Resets `path` to just the root, at `offset`
    fn set_root(&self, path: &mut Path, offset: usize) {
        path.set_root(self.root.size, offset);
    }

    pub(super) fn go_to_begin(&self, path: &mut Path) {
        self.set_root(path, 0);
        if self.root.branched() {
            path.fill_left(self.root.height, self);
        }
    }

    pub(super) fn go_to_end(&self, path: &mut Path) {
        self.set_root(path, self.root.size);
    }

    pub(super) fn move_next(&self, path: &mut Path) {
        weak_assert!(path.valid(), "cannot increment end()");
        let offset = path.leaf_offset() + 1;
        path.set_leaf_offset(offset);
        if offset == path.leaf_size() && self.root.branched() {
            path.move_right(self.root.height, self);
        }
    }

    pub(super) fn move_prev(&self, path: &mut Path) {
        if path.leaf_offset() != 0 && (path.valid() || !self.root.branched()) {
            path.set_leaf_offset(path.leaf_offset() - 1);
        } else {
            path.move_left(self.root.height, self);
        }
    }

    /// Moves `path` to the first interval that ends at or after `x`, searching from the root
    pub(super) fn find(&self, path: &mut Path, x: K) {
        match self.root.branched() {
            true => self.tree_find(path, x),
            false => {
                let offset = self.root.leaf().as_slots().find_from::<T>(0, self.root.size, x);
                self.set_root(path, offset);
            }
        }
    }

    /// Like [`find`](Self::find), but only searches forward from the current position of `path`.
    /// Does nothing if the current interval doesn't end before `x`.
    pub(super) fn advance_to(&self, path: &mut Path, x: K) {
        if !path.valid() || !T::stop_less(self.entry(path).1, x) {
            return;
        }
        match self.root.branched() {
            true => self.tree_advance_to(path, x),
            false => {
                let leaf = self.root.leaf().as_slots();
                path.set_leaf_offset(leaf.find_from::<T>(path.leaf_offset(), self.root.size, x));
            }
        }
    }

    /// Completes a path that ends at a branch containing `x`, down to the leaves
    fn path_fill_find(&self, path: &mut Path, x: K) {
        let mut node = path.subtree(path.height(), self);
        for _ in 0..self.root.height - path.height() - 1 {
            let branch = self.arena.branches.node(node.index());
            let offset = branch.safe_find::<T>(0, x);
            path.push(node, offset);
            node = branch.subtree(offset);
        }
        path.push(node, self.arena.leaves.node(node.index()).safe_find::<T>(0, x));
    }

    fn tree_find(&self, path: &mut Path, x: K) {
        let offset = self.root.branch().as_slots().find_from::<T>(0, self.root.size, x);
        self.set_root(path, offset);
        if path.valid() {
            self.path_fill_find(path, x);
        }
    }

    fn tree_advance_to(&self, path: &mut Path, x: K) {
        // Can we stay on the same leaf node?
        let leaf = self.arena.leaves.node(path.leaf_node());
        if !T::stop_less(leaf.stop(path.leaf_size() - 1), x) {
            path.set_leaf_offset(leaf.safe_find::<T>(path.leaf_offset(), x));
            return;
        }

        // Drop the leaf, and go up until we find a branch whose subtree reaches x.
        path.pop();

        if path.height() != 0 {
            let mut l = path.height() - 1;
            while l != 0 {
                let branch = self.arena.branches.node(path.node(l));
                if !T::stop_less(branch.stop(path.offset(l)), x) {
                    // The child at level l + 1 must contain x.
                    let child = self.arena.branches.node(path.node(l + 1));
                    path.set_offset(l + 1, child.safe_find::<T>(path.offset(l + 1), x));
                    return self.path_fill_find(path, x);
                }
                path.pop();
                l -= 1;
            }

            // What about the branch right below the root?
            if !T::stop_less(self.root.branch().as_slots().stop(path.offset(0)), x) {
                let child = self.arena.branches.node(path.node(1));
                path.set_offset(1, child.safe_find::<T>(path.offset(1), x));
                return self.path_fill_find(path, x);
            }
        }

        // Nothing below the root works; search the rest of it.
        let root = self.root.branch().as_slots();
        let offset = root.find_from::<T>(path.offset(0), self.root.size, x);
        self.set_root(path, offset);
        if path.valid() {
            self.path_fill_find(path, x);
        }
    }

    /// Returns the interval that `path` points to
    pub(super) fn entry(&self, path: &Path) -> (K, K, V) {
        weak_assert!(path.valid(), "no entry at end()");
        let leaf = self.leaf(path);
        let i = path.leaf_offset();
        (leaf.start(i), leaf.stop(i), leaf.value(i))
    }
}

// Implements the read-only part of the cursor API, given a way to borrow the map
macro_rules! cursor_navigation {
    () => {
        /// Returns true if the cursor points to an interval, i.e. it isn't at the end
        pub fn valid(&self) -> bool {
            self.path.valid()
        }

        /// Returns true if the cursor is at the first interval (or at the end of an empty map)
        pub fn at_begin(&self) -> bool {
            self.path.at_begin()
        }

        /// Returns the start of the current interval
        ///
        /// The cursor must not be at the end.
        pub fn start(&self) -> K {
            self.entry().0
        }

        /// Returns the stop of the current interval
        ///
        /// The cursor must not be at the end.
        pub fn stop(&self) -> K {
            self.entry().1
        }

        /// Returns the value of the current interval
        ///
        /// The cursor must not be at the end.
        pub fn value(&self) -> V {
            self.entry().2
        }

        /// Returns the current interval as `(start, stop, value)`
        ///
        /// The cursor must not be at the end.
        pub fn entry(&self) -> (K, K, V) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).entry(&self.path)
        }

        /// Moves to the first interval in the map
        pub fn go_to_begin(&mut self) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).go_to_begin(&mut self.path);
        }

        /// Moves to the end, past the last interval in the map
        pub fn go_to_end(&mut self) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).go_to_end(&mut self.path);
        }

        /// Moves to the next interval, or the end if this is the last one
        ///
        /// The cursor must not already be at the end.
        pub fn move_next(&mut self) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).move_next(&mut self.path);
        }

        /// Moves to the previous interval. From the end, this moves to the last interval.
        ///
        /// The cursor must not be at the first interval.
        pub fn move_prev(&mut self) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).move_prev(&mut self.path);
        }

        /// Moves to the first interval that ends at or after `x`, or to the end if there is none
        pub fn find(&mut self, x: K) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).find(&mut self.path, x);
        }

        /// Moves forward to the first interval that ends at or after `x`
        ///
        /// This is faster than [`find`](Self::find) when `x` is close by, but it never moves
        /// backwards: if the current interval already ends at or after `x`, nothing happens.
        pub fn advance_to(&mut self, x: K) {
            let arena = self.map.alloc.arena();
            self.map.tree(&arena).advance_to(&mut self.path, x);
        }
    };
}

impl<'m, 'a, K, V, const N: usize, T> Cursor<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Creates a new cursor at the end of the map
    pub(super) fn new(map: &'m IntervalMap<'a, K, V, N, T>) -> Self {
        let mut path = Path::default();
        path.set_root(map.root.size, map.root.size);
        Cursor { map, path }
    }

    /// Returns the map that this cursor is in
    pub fn map(&self) -> &'m IntervalMap<'a, K, V, N, T> {
        self.map
    }

    cursor_navigation!();
}

impl<'m, 'a, K, V, const N: usize, T> CursorMut<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Creates a new cursor at the end of the map
    pub(super) fn new(map: &'m mut IntervalMap<'a, K, V, N, T>) -> Self {
        let mut path = Path::default();
        path.set_root(map.root.size, map.root.size);
        CursorMut { map, path }
    }

    /// Returns a read-only copy of this cursor, at the same position
    pub fn as_cursor(&self) -> Cursor<'_, 'a, K, V, N, T> {
        Cursor { map: self.map, path: self.path.clone() }
    }

    /// Runs `f` with mutable access to the map's nodes and this cursor's position
    pub(super) fn edit<R>(&mut self, f: impl FnOnce(&mut Editor<'_, K, V, T, N>) -> R) -> R {
        let alloc = self.map.alloc;
        let mut arena = alloc.arena_mut();
        let mut editor = Editor::new(&mut self.map.root, &mut arena, &mut self.path);
        f(&mut editor)
    }

    cursor_navigation!();
}

impl<'m, 'a, K, V, const N: usize, T> Clone for Cursor<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    fn clone(&self) -> Self {
        Cursor { map: self.map, path: self.path.clone() }
    }
}

impl<'m, 'a, K, V, const N: usize, T> PartialEq for Cursor<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    fn eq(&self, other: &Self) -> bool {
        weak_assert!(std::ptr::eq(self.map, other.map), "comparing cursors from different maps");
        match (self.valid(), other.valid()) {
            (false, false) => true,
            (true, true) => {
                self.path.leaf_node() == other.path.leaf_node()
                    && self.path.leaf_offset() == other.path.leaf_offset()
            }
            _ => false,
        }
    }
}

impl<'m, 'a, K, V, const N: usize, T> Debug for Cursor<'m, 'a, K, V, N, T>
where
    K: Key + Debug,
    V: Value + Debug,
    T: IntervalTraits<K>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut s = f.debug_struct("Cursor");
        match self.valid() {
            true => s.field("entry", &self.entry()),
            false => s.field("entry", &"<end>"),
        };
        s.finish()
    }
}

impl<'m, 'a, K, V, const N: usize, T> Iter<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    pub(super) fn new(map: &'m IntervalMap<'a, K, V, N, T>) -> Self {
        Iter { front: map.begin(), back: map.end() }
    }
}

impl<'m, 'a, K, V, const N: usize, T> Iterator for Iter<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    type Item = (K, K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let item = self.front.entry();
        self.front.move_next();
        Some(item)
    }
}

impl<'m, 'a, K, V, const N: usize, T> DoubleEndedIterator for Iter<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back.move_prev();
        Some(self.back.entry())
    }
}

impl<'m, 'a, K, V, const N: usize, T> FusedIterator for Iter<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
}
