//! In-place changes to the interval at a cursor: [`set_start`], [`set_stop`], and [`set_value`]
//!
//! [`set_start`]: CursorMut::set_start
//! [`set_stop`]: CursorMut::set_stop
//! [`set_value`]: CursorMut::set_value

use crate::param::IntervalTraits;
use crate::public_traits::{Key, Value};

use super::node::{BranchNodeMut, LeafNode, LeafNodeMut};
use super::{CursorMut, Editor};

impl<'m, 'a, K, V, const N: usize, T> CursorMut<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Moves the start of the current interval to `a`, merging with the previous interval if they
    /// now touch and have the same value
    ///
    /// The interval must stay non-empty, and must not grow to overlap the previous interval. The
    /// cursor points at the (possibly merged) interval afterwards.
    pub fn set_start(&mut self, a: K) {
        self.edit(|e| e.set_start(a));
    }

    /// Moves the stop of the current interval to `b`, merging with the next interval if they now
    /// touch and have the same value
    ///
    /// The interval must stay non-empty, and must not grow to overlap the next interval.
    pub fn set_stop(&mut self, b: K) {
        self.edit(|e| e.set_stop(b));
    }

    /// Changes the value of the current interval, merging with either neighbor that touches it and
    /// has the same value
    pub fn set_value(&mut self, y: V) {
        self.edit(|e| e.set_value(y));
    }

    /// Like [`set_start`](Self::set_start), but without merging
    ///
    /// The caller must guarantee that the new interval doesn't touch a neighbor with the same value.
    pub fn set_start_unchecked(&mut self, a: K) {
        self.edit(|e| e.set_start_unchecked(a));
    }

    /// Like [`set_stop`](Self::set_stop), but without merging
    ///
    /// The caller must guarantee that the new interval doesn't touch a neighbor with the same value.
    pub fn set_stop_unchecked(&mut self, b: K) {
        self.edit(|e| e.set_stop_unchecked(b));
    }

    /// Like [`set_value`](Self::set_value), but without merging
    pub fn set_value_unchecked(&mut self, y: V) {
        self.edit(|e| e.set_value_unchecked(y));
    }
}

impl<'e, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Editor<'e, K, V, T, N> {
    /// Updates the cached stops in the branches above the path's node at `level`, which now ends
    /// at `stop`
    ///
    /// Only the ancestors for which this node is the last in their subtree change.
    pub(super) fn set_node_stop(&mut self, mut level: usize, stop: K) {
        // Nothing refers to the root.
        if level == 0 {
            return;
        }

        level -= 1;
        while level != 0 {
            let (node, offset) = (self.path.node(level), self.path.offset(level));
            self.tree.branch_mut(level, node).set_stop(offset, stop);
            if !self.path.at_last_entry(level) {
                return;
            }
            level -= 1;
        }

        let offset = self.path.offset(0);
        self.tree.root.branch_mut().as_slots_mut().set_stop(offset, stop);
    }

    /// Returns true if an interval starting at `start` with value `y` would merge with the
    /// interval before the current one
    fn can_coalesce_left(&self, start: K, y: V) -> bool {
        let i = self.path.leaf_offset();
        if i != 0 {
            let leaf = self.leaf();
            return leaf.value(i - 1) == y && T::adjacent(leaf.stop(i - 1), start);
        }

        // The previous interval is in another leaf, if there is one.
        match self.path.left_sibling(self.path.height(), &self.tree) {
            Some(sib) => {
                let leaf = self.tree.arena.leaves.node(sib.index());
                let last = sib.size() - 1;
                leaf.value(last) == y && T::adjacent(leaf.stop(last), start)
            }
            None => false,
        }
    }

    /// Returns true if an interval ending at `stop` with value `y` would merge with the interval
    /// after the current one
    fn can_coalesce_right(&self, stop: K, y: V) -> bool {
        let i = self.path.leaf_offset() + 1;
        if i < self.path.leaf_size() {
            let leaf = self.leaf();
            return leaf.value(i) == y && T::adjacent(stop, leaf.start(i));
        }

        match self.path.right_sibling(self.path.height(), &self.tree) {
            Some(sib) => {
                let leaf = self.tree.arena.leaves.node(sib.index());
                leaf.value(0) == y && T::adjacent(stop, leaf.start(0))
            }
            None => false,
        }
    }

    /// Removes the current interval and extends the (following) interval that replaces it at the
    /// path back to `a`
    fn merge_into_next(&mut self, a: K) {
        self.erase();
        self.set_start_unchecked(a);
    }

    fn set_start(&mut self, a: K) {
        weak_assert!(T::non_empty(a, self.stop()), "cannot move start beyond stop");

        if !T::start_less(a, self.start()) || !self.can_coalesce_left(a, self.value()) {
            return self.set_start_unchecked(a);
        }

        // Merge with the interval to the left.
        self.move_prev();
        let a = self.start();
        self.merge_into_next(a);
    }

    fn set_stop(&mut self, b: K) {
        weak_assert!(T::non_empty(self.start(), b), "cannot move stop beyond start");

        if T::start_less(b, self.stop()) || !self.can_coalesce_right(b, self.value()) {
            return self.set_stop_unchecked(b);
        }

        // Merge with the interval to the right.
        let a = self.start();
        self.merge_into_next(a);
    }

    fn set_value(&mut self, y: V) {
        self.set_value_unchecked(y);

        if self.can_coalesce_right(self.stop(), y) {
            let a = self.start();
            self.merge_into_next(a);
        }

        if self.can_coalesce_left(self.start(), y) {
            self.move_prev();
            let a = self.start();
            self.merge_into_next(a);
        }
    }

    fn set_start_unchecked(&mut self, a: K) {
        let offset = self.path.leaf_offset();
        self.tree.leaf_mut(&*self.path).set_start(offset, a);

        // The root caches the start of the map.
        if self.tree.root.branched() && self.path.at_begin() {
            self.tree.root.set_branch_start(a);
        }
    }

    fn set_stop_unchecked(&mut self, b: K) {
        let offset = self.path.leaf_offset();
        self.tree.leaf_mut(&*self.path).set_stop(offset, b);

        let height = self.path.height();
        if self.path.at_last_entry(height) {
            self.set_node_stop(height, b);
        }
    }

    fn set_value_unchecked(&mut self, y: V) {
        let offset = self.path.leaf_offset();
        self.tree.leaf_mut(&*self.path).set_value(offset, y);
    }
}
