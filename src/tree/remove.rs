//! Removing intervals, along with any nodes that become empty

use crate::param::IntervalTraits;
use crate::public_traits::{Key, Value};

use super::node::{BranchNode, LeafNode, NodeBaseMut};
use super::{CursorMut, Editor};

impl<'m, 'a, K, V, const N: usize, T> CursorMut<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Removes the interval at the cursor, moving the cursor to the interval that followed it (or
    /// to the end, if there wasn't one)
    ///
    /// The cursor must not be at the end.
    pub fn erase(&mut self) {
        self.edit(|e| e.erase());
    }
}

impl<'e, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Editor<'e, K, V, T, N> {
    pub(super) fn erase(&mut self) {
        weak_assert!(self.path.valid(), "cannot erase end()");

        if self.tree.root.branched() {
            return self.tree_erase(true);
        }

        let (offset, size) = (self.path.leaf_offset(), self.tree.root.size);
        self.tree.root.leaf_mut().as_slots_mut().erase_at(offset, size);
        self.tree.root.size = size - 1;
        self.path.set_size(0, size - 1, &mut self.tree);
    }

    /// Removes the current entry from a branched tree
    ///
    /// If `update_root` is true, the root's cached start is refreshed when the first entry in the
    /// map is removed. Afterwards, the path points at the entry that followed the removed one.
    pub(super) fn tree_erase(&mut self, update_root: bool) {
        let height = self.tree.root.height;
        let (leaf, size) = (self.path.leaf_node(), self.path.leaf_size());

        // Nodes can't be empty, so the leaf has to go.
        if size == 1 {
            self.tree.arena.leaves.deallocate(leaf);
            self.erase_node(height);
            if update_root && self.tree.root.branched() && self.path.valid() && self.path.at_begin() {
                let start = self.leaf().start(0);
                self.tree.root.set_branch_start(start);
            }
            return;
        }

        let offset = self.path.leaf_offset();
        self.tree.arena.leaves.node_mut(leaf).erase_at(offset, size);
        let new_size = size - 1;
        self.path.set_size(height, new_size, &mut self.tree);

        if offset == new_size {
            // We removed the last entry in the leaf, so its stop changed. Move on to the next one.
            let stop = self.tree.arena.leaves.node(leaf).stop(new_size - 1);
            self.set_node_stop(height, stop);
            self.path.move_right(height, &self.tree);
        } else if update_root && self.path.at_begin() {
            let start = self.leaf().start(0);
            self.tree.root.set_branch_start(start);
        }
    }

    /// Removes the reference to the path's node at `level` from its parent, after the node itself
    /// has been freed
    ///
    /// Parents that become empty are removed as well. If the root becomes empty, it's switched back
    /// to an (empty) leaf. Afterwards, the path points at the node that followed the removed one.
    fn erase_node(&mut self, mut level: usize) {
        weak_assert!(level != 0, "cannot erase the root node");
        level -= 1;

        if level == 0 {
            let (offset, size) = (self.path.offset(0), self.tree.root.size);
            self.tree.root.branch_mut().as_slots_mut().erase_at(offset, size);
            self.tree.root.size = size - 1;
            self.path.set_size(0, size - 1, &mut self.tree);

            if size == 1 {
                debug_println!("removed the last node, switching root to a leaf");
                self.tree.root.switch_to_leaf();
                self.path.set_root(0, 0);
                return;
            }
        } else if self.path.size(level) == 1 {
            // The parent would become empty; remove it too.
            self.tree.arena.branches.deallocate(self.path.node(level));
            self.erase_node(level);
        } else {
            let (parent, offset, size) = (self.path.node(level), self.path.offset(level), self.path.size(level));
            self.tree.arena.branches.node_mut(parent).erase_at(offset, size);
            let new_size = size - 1;
            self.path.set_size(level, new_size, &mut self.tree);

            if offset == new_size {
                let stop = self.tree.arena.branches.node(parent).stop(new_size - 1);
                self.set_node_stop(level, stop);
                self.path.move_right(level, &self.tree);
            }
        }

        // The next node moved into our place.
        if self.path.valid() {
            self.path.reset(level + 1, &self.tree);
            self.path.set_offset(level + 1, 0);
        }
    }
}
