//! Insertion, and the rebalancing that it sometimes requires

use crate::param::IntervalTraits;
use crate::public_traits::{Key, Value};
use crate::recycle::Pool;

use super::node::{ty, BranchNodeMut, LeafNode, LeafNodeMut, NodeBaseMut, NodeKind, NodeRef};
use super::{CursorMut, Editor};

/// Computes a new distribution of `elements` entries across `nodes` sibling nodes, each with room
/// for `capacity` entries
///
/// The sizes are written into `new_size`, spreading the entries as evenly as possible, with any
/// extra entries going to the leftmost nodes. If `grow` is true, one extra entry is counted at
/// `position` (but not included in `new_size`), so that there's room to insert it afterwards.
///
/// Returns the location of `position` after the redistribution, as `(node, offset)`. `cur_size`
/// holds the current sizes of the nodes; it's only used to check the arguments, and may be empty.
pub(super) fn distribute(
    nodes: usize,
    elements: usize,
    capacity: usize,
    cur_size: &[usize],
    new_size: &mut [usize],
    position: usize,
    grow: bool,
) -> (usize, usize) {
    let total = elements + grow as usize;
    weak_assert!(total <= nodes * capacity, "not enough room for {total} elements");
    weak_assert!(position <= elements, "invalid position {position}");
    weak_assert!(cur_size.is_empty() || cur_size.iter().sum::<usize>() == elements);

    if nodes == 0 {
        return (0, 0);
    }

    // Trivial algorithm: left-leaning even distribution.
    let per_node = total / nodes;
    let extra = total % nodes;
    let mut pos_pair = (nodes, 0);
    let mut sum = 0;
    for n in 0..nodes {
        new_size[n] = per_node + (n < extra) as usize;
        sum += new_size[n];
        if pos_pair.0 == nodes && sum > position {
            pos_pair = (n, position - (sum - new_size[n]));
        }
    }
    weak_assert!(sum == total, "bad distribution sum");

    // Subtract the element we grew by.
    if grow {
        weak_assert!(pos_pair.0 < nodes, "bad algebra");
        weak_assert!(new_size[pos_pair.0] != 0, "too few elements to need grow");
        new_size[pos_pair.0] -= 1;
    }

    pos_pair
}

/// Moves entries between the sibling nodes `node` (in order) until each node `n` holds
/// `new_size[n]` entries, updating `cur_size` as it goes
///
/// The total of the new sizes must equal the total of the current ones.
fn adjust_sibling_sizes<A: Copy + Default, B: Copy + Default>(
    pool: &mut Pool<A, B>,
    node: &[u32],
    cur_size: &mut [usize],
    new_size: &[usize],
) {
    let nodes = node.len();
    if nodes == 0 {
        return;
    }

    // Move elements right.
    for n in (1..nodes).rev() {
        if cur_size[n] == new_size[n] {
            continue;
        }
        for m in (0..n).rev() {
            let (mut this, mut sib) = pool.pair_mut(node[n], node[m]);
            let add = new_size[n] as isize - cur_size[n] as isize;
            let d = this.adjust_from_left_sibling(cur_size[n], &mut sib, cur_size[m], add);
            cur_size[m] = (cur_size[m] as isize - d) as usize;
            cur_size[n] = (cur_size[n] as isize + d) as usize;
            // Keep going only if the sibling was exhausted.
            if cur_size[n] >= new_size[n] {
                break;
            }
        }
    }

    // Move elements left.
    for n in 0..nodes - 1 {
        if cur_size[n] == new_size[n] {
            continue;
        }
        for m in n + 1..nodes {
            let (mut this, mut sib) = pool.pair_mut(node[m], node[n]);
            let add = cur_size[n] as isize - new_size[n] as isize;
            let d = this.adjust_from_left_sibling(cur_size[m], &mut sib, cur_size[n], add);
            cur_size[m] = (cur_size[m] as isize + d) as usize;
            cur_size[n] = (cur_size[n] as isize - d) as usize;
            if cur_size[n] >= new_size[n] {
                break;
            }
        }
    }

    weak_assert!(cur_size == new_size, "sibling sizes not adjusted: {cur_size:?} != {new_size:?}");
}

impl<'m, 'a, K, V, const N: usize, T> CursorMut<'m, 'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Inserts the interval from `a` to `b` with value `y` at the cursor's position
    ///
    /// The cursor must be where [`find(a)`] would put it, and the interval must be non-empty and
    /// not overlap anything in the map. Afterwards, the cursor points at the new interval, or at the
    /// existing interval that it was merged into.
    ///
    /// [`find(a)`]: Self::find
    pub fn insert(&mut self, a: K, b: K, y: V) {
        self.edit(|e| e.insert(a, b, y));
    }
}

impl<'e, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Editor<'e, K, V, T, N> {
    pub(super) fn insert(&mut self, a: K, b: K, y: V) {
        weak_assert!(T::non_empty(a, b), "invalid interval");

        if self.tree.root.branched() {
            return self.tree_insert(a, b, y);
        }

        // Try a simple insert into the root leaf.
        let size = self.tree.root.size;
        let mut pos = self.path.leaf_offset();
        let mut leaf = self.tree.root.leaf_mut().as_slots_mut();
        let new_size = leaf.insert_from::<T>(&mut pos, size, a, b, y);
        if new_size <= N {
            self.tree.root.size = new_size;
            self.path.set_leaf_offset(pos);
            self.path.set_size(0, new_size, &mut self.tree);
            return;
        }

        // The root leaf is full; we have to branch.
        let offset = self.tree.branch_root(self.path.leaf_offset());
        let root_size = self.tree.root.size;
        self.path.replace_root(root_size, offset, &self.tree);
        self.tree_insert(a, b, y);
    }

    /// Inserts into a branched tree, rebalancing as necessary
    fn tree_insert(&mut self, mut a: K, b: K, y: V) {
        let height = self.tree.root.height;
        if !self.path.valid() {
            self.path.legalize_for_insert(height, &self.tree);
        }

        // Is the leaf growing to the left? That might affect its left sibling.
        let leaf = self.leaf();
        if self.path.leaf_offset() == 0 && T::start_less(a, leaf.start(0)) {
            let (cur_start, cur_value) = (leaf.start(0), leaf.value(0));
            match self.path.left_sibling(height, &self.tree) {
                // No left sibling means we're at the very beginning.
                None => self.tree.root.set_branch_start(a),
                Some(sib) => {
                    let sib_leaf = self.tree.arena.leaves.node(sib.index());
                    let last = sib.size() - 1;
                    if sib_leaf.value(last) == y && T::adjacent(sib_leaf.stop(last), a) {
                        let sib_start = sib_leaf.start(last);
                        self.path.move_left(height, &self.tree);

                        // Either extend the sibling's last interval and stop there, or (if we'd
                        // also coalesce on the right) take it out and insert the larger interval.
                        if T::stop_less(b, cur_start) && (y != cur_value || !T::adjacent(b, cur_start)) {
                            let offset = self.path.leaf_offset();
                            self.tree.leaf_mut(&*self.path).set_stop(offset, b);
                            self.set_node_stop(height, b);
                            return;
                        }

                        a = sib_start;
                        self.tree_erase(false);
                    }
                }
            }
        }

        // Inserting at the end of a leaf changes its stop.
        let mut grow = self.path.leaf_offset() == self.path.leaf_size();
        let mut size = self.leaf_insert(a, b, y);

        // No room? Rebalance and try again.
        if size > self.tree.arena.leaves.capacity() {
            self.overflow::<ty::Leaf>(self.path.height());
            grow = self.path.leaf_offset() == self.path.leaf_size();
            size = self.leaf_insert(a, b, y);
            weak_assert!(size <= self.tree.arena.leaves.capacity(), "overflow didn't make room");
        }

        let height = self.path.height();
        self.path.set_size(height, size, &mut self.tree);
        if grow {
            self.set_node_stop(height, b);
        }
    }

    /// Runs `insert_from` on the current leaf, at the path's position, and returns the result
    fn leaf_insert(&mut self, a: K, b: K, y: V) -> usize {
        let (mut pos, size) = (self.path.leaf_offset(), self.path.leaf_size());
        let new_size = self.tree.leaf_mut(&*self.path).insert_from::<T>(&mut pos, size, a, b, y);
        self.path.set_leaf_offset(pos);
        new_size
    }

    /// Makes room for one more entry in the full node at `level` in the path, by spreading entries
    /// to its siblings and allocating a new node if they're full too
    ///
    /// Afterwards, the path points at the same entry as before, which may now be in a different
    /// node. Returns true if the root had to be split, increasing the height of the tree.
    fn overflow<Ty: NodeKind<K, V>>(&mut self, mut level: usize) -> bool {
        let mut node = [0_u32; 4];
        let mut cur_size = [0_usize; 4];
        let mut count = 0;
        let mut elements = 0;
        let mut offset = self.path.offset(level);

        // Gather the left sibling, the current node, and the right sibling.
        let left = self.path.left_sibling(level, &self.tree);
        if let Some(sib) = left {
            elements = sib.size();
            offset += elements;
            (node[count], cur_size[count]) = (sib.index(), sib.size());
            count += 1;
        }

        (node[count], cur_size[count]) = (self.path.node(level), self.path.size(level));
        elements += cur_size[count];
        count += 1;

        if let Some(sib) = self.path.right_sibling(level, &self.tree) {
            elements += sib.size();
            (node[count], cur_size[count]) = (sib.index(), sib.size());
            count += 1;
        }

        // Do we need a new node? It goes second to last, or after a single node.
        let capacity = Ty::pool(self.tree.arena).capacity();
        let mut new_node = None;
        if elements + 1 > count * capacity {
            let n = if count == 1 { 1 } else { count - 1 };
            (node[count], cur_size[count]) = (node[n], cur_size[n]);
            (node[n], cur_size[n]) = (Ty::pool_mut(self.tree.arena).allocate(), 0);
            new_node = Some(n);
            count += 1;
        }

        let mut new_size = [0_usize; 4];
        let new_offset = distribute(
            count,
            elements,
            capacity,
            &cur_size[..count],
            &mut new_size[..count],
            offset,
            true,
        );
        adjust_sibling_sizes(
            Ty::pool_mut(self.tree.arena),
            &node[..count],
            &mut cur_size[..count],
            &new_size[..count],
        );
        debug_println!("overflow at level {level}: {:?} -> {new_offset:?}", &new_size[..count]);

        // Start from the leftmost node.
        if left.is_some() {
            self.path.move_left(level, &self.tree);
        }

        // Fix up the sizes and stops, moving right.
        let mut split_root = false;
        let mut pos = 0;
        loop {
            let stop = Ty::stop(Ty::pool(self.tree.arena).node(node[pos]), new_size[pos] - 1);
            if new_node == Some(pos) {
                split_root = self.insert_node(level, NodeRef::new(node[pos], new_size[pos]), stop);
                level += split_root as usize;
            } else {
                self.path.set_size(level, new_size[pos], &mut self.tree);
                self.set_node_stop(level, stop);
            }

            if pos + 1 == count {
                break;
            }
            self.path.move_right(level, &self.tree);
            pos += 1;
        }

        // Go back to where we were.
        while pos != new_offset.0 {
            self.path.move_left(level, &self.tree);
            pos -= 1;
        }
        self.path.set_offset(level, new_offset.1);
        split_root
    }

    /// Adds `node` to the tree as a new node at `level`, right before the path's current position
    /// at that level
    ///
    /// Afterwards, the path points at the new node. Returns true if the root had to be split.
    fn insert_node(&mut self, mut level: usize, node: NodeRef, stop: K) -> bool {
        weak_assert!(level != 0, "cannot insert next to the root");
        let mut split_root = false;

        if level == 1 {
            // Insert into the root branch, if there's room.
            let size = self.tree.root.size;
            if size < N {
                let offset = self.path.offset(0);
                self.tree.root.branch_mut().as_slots_mut().insert(offset, size, node, stop);
                self.tree.root.size = size + 1;
                self.path.set_size(0, size + 1, &mut self.tree);
                self.path.reset(level, &self.tree);
                return split_root;
            }

            // Split the root, keeping our position.
            split_root = true;
            let offset = self.tree.split_root(self.path.offset(0));
            let root_size = self.tree.root.size;
            self.path.replace_root(root_size, offset, &self.tree);

            // The insertion now happens one level lower.
            level += 1;
        }

        // When inserting before end(), make sure the path is valid.
        level -= 1;
        self.path.legalize_for_insert(level, &self.tree);

        if self.path.size(level) == self.tree.arena.branches.capacity() {
            weak_assert!(!split_root, "cannot overflow after splitting the root");
            split_root = self.overflow::<ty::Branch>(level);
            level += split_root as usize;
        }

        let (offset, size) = (self.path.offset(level), self.path.size(level));
        let parent = self.path.node(level);
        self.tree.branch_mut(level, parent).insert(offset, size, node, stop);
        self.path.set_size(level, size + 1, &mut self.tree);
        if self.path.at_last_entry(level) {
            self.set_node_stop(level, stop);
        }
        self.path.reset(level + 1, &self.tree);
        split_root
    }
}

#[cfg(test)]
mod tests {
    use super::{adjust_sibling_sizes, distribute};
    use crate::recycle::Pool;
    use crate::tree::node::{NodeBase, NodeBaseMut};

    #[test]
    fn distribute_evenly_with_room() {
        let mut sizes = [0; 2];
        assert_eq!(distribute(2, 8, 5, &[5, 3], &mut sizes, 3, true), (0, 3));
        assert_eq!(sizes, [4, 4]);

        // appending at the very end
        assert_eq!(distribute(2, 8, 5, &[], &mut sizes, 8, true), (1, 3));
        assert_eq!(sizes, [5, 3]);

        // right at a node boundary, the position goes to the start of the next node
        assert_eq!(distribute(2, 8, 5, &[], &mut sizes, 5, true), (1, 0));
        assert_eq!(sizes, [5, 3]);
    }

    #[test]
    fn distribute_without_growing() {
        let mut sizes = [0; 3];
        assert_eq!(distribute(3, 10, 4, &[4, 4, 2], &mut sizes, 4, false), (1, 0));
        assert_eq!(sizes, [4, 3, 3]);

        // splitting a full root of 8 into leaves of 3
        assert_eq!(distribute(3, 8, 3, &[], &mut sizes, 8, true), (2, 2));
        assert_eq!(sizes, [3, 3, 2]);
    }

    #[test]
    fn adjusting_sibling_sizes_keeps_order() {
        let mut pool: Pool<u32, u8> = Pool::new(4);
        let nodes = [pool.allocate(), pool.allocate(), pool.allocate()];
        let contents: [&[u32]; 3] = [&[1, 2, 3, 4], &[5, 6, 7, 8], &[9]];
        for (&n, c) in nodes.iter().zip(contents) {
            pool.node_mut(n).first_mut()[..c.len()].copy_from_slice(c);
        }

        let mut cur = [4, 4, 1];
        adjust_sibling_sizes(&mut pool, &nodes, &mut cur, &[3, 3, 3]);
        assert_eq!(cur, [3, 3, 3]);

        let all: Vec<u32> = nodes.iter().flat_map(|&n| pool.node(n).first()[..3].to_vec()).collect();
        assert_eq!(all, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn adjusting_into_a_new_middle_node() {
        let mut pool: Pool<u32, u8> = Pool::new(3);
        let nodes = [pool.allocate(), pool.allocate(), pool.allocate()];
        // the middle node is freshly allocated and empty
        pool.node_mut(nodes[0]).first_mut().copy_from_slice(&[1, 2, 3]);
        pool.node_mut(nodes[2]).first_mut().copy_from_slice(&[4, 5, 6]);

        let mut cur = [3, 0, 3];
        let mut new = [0; 3];
        distribute(3, 6, 3, &cur, &mut new, 6, true);
        assert_eq!(new, [3, 2, 1]);

        adjust_sibling_sizes(&mut pool, &nodes, &mut cur, &new);
        assert_eq!(cur, new);
        assert_eq!(pool.node(nodes[1]).first()[..2], [4, 5]);
        assert_eq!(pool.node(nodes[2]).first()[..1], [6]);
    }
}
