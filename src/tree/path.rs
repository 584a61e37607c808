//! The position of a cursor in the tree: [`Path`]

use super::node::NodeRef;

/// Access to the child references of branch nodes, needed to walk a [`Path`] around the tree
///
/// The root is always at level zero, so `node` is ignored there.
pub(crate) trait Subtrees {
    /// Returns child `i` of the branch at `level` with index `node`
    fn subtree(&self, level: usize, node: u32, i: usize) -> NodeRef;
}

/// Like [`Subtrees`], with the ability to update the size recorded in a child reference
pub(crate) trait SubtreesMut: Subtrees {
    fn set_subtree_size(&mut self, level: usize, node: u32, i: usize, size: usize);
}

/// One level of a [`Path`]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Index of the node in its pool, unused for the root
    pub(crate) node: u32,
    pub(crate) size: usize,
    pub(crate) offset: usize,
}

impl Frame {
    fn new(node: NodeRef, offset: usize) -> Self {
        Frame { node: node.index(), size: node.size(), offset }
    }
}

/// A stack of `(node, size, offset)` frames from the root down to a leaf
///
/// Level zero is always the root; if the map has branched, the last frame is a leaf. The path is
/// *valid* when the root's offset is in bounds. Invalid paths are "at the end", and may have
/// stale frames past the root.
///
/// All the offsets in a valid path point at the entry being visited (or the subtree containing
/// it). Apart from the root, each frame's size is also recorded in its parent's [`NodeRef`], and
/// [`set_size`] keeps the two in sync.
///
/// [`set_size`]: Self::set_size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Path {
    frames: Vec<Frame>,
}

impl Path {
    /// The level of the last frame; zero if the path only contains the root
    pub(crate) fn height(&self) -> usize {
        self.frames.len() - 1
    }

    pub(crate) fn node(&self, level: usize) -> u32 {
        self.frames[level].node
    }

    pub(crate) fn size(&self, level: usize) -> usize {
        self.frames[level].size
    }

    pub(crate) fn offset(&self, level: usize) -> usize {
        self.frames[level].offset
    }

    pub(crate) fn set_offset(&mut self, level: usize, offset: usize) {
        self.frames[level].offset = offset;
    }

    pub(crate) fn leaf_node(&self) -> u32 {
        self.frames[self.height()].node
    }

    pub(crate) fn leaf_size(&self) -> usize {
        self.frames[self.height()].size
    }

    pub(crate) fn leaf_offset(&self) -> usize {
        self.frames[self.height()].offset
    }

    pub(crate) fn set_leaf_offset(&mut self, offset: usize) {
        let h = self.height();
        self.frames[h].offset = offset;
    }

    /// Returns true if the path points at an entry, i.e. isn't at the end
    pub(crate) fn valid(&self) -> bool {
        !self.frames.is_empty() && self.frames[0].offset < self.frames[0].size
    }

    /// The reference to the child at the current offset of the branch at `level`
    pub(crate) fn subtree<S: ?Sized + Subtrees>(&self, level: usize, tree: &S) -> NodeRef {
        let f = &self.frames[level];
        tree.subtree(level, f.node, f.offset)
    }

    /// Reloads the node at `level` from its parent, keeping the offset
    pub(crate) fn reset<S: ?Sized + Subtrees>(&mut self, level: usize, tree: &S) {
        let node = self.subtree(level - 1, tree);
        self.frames[level] = Frame::new(node, self.frames[level].offset);
    }

    pub(crate) fn push(&mut self, node: NodeRef, offset: usize) {
        self.frames.push(Frame::new(node, offset));
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Replaces the whole path with just the root
    pub(crate) fn set_root(&mut self, size: usize, offset: usize) {
        self.frames.clear();
        self.frames.push(Frame { node: 0, size, offset });
    }

    /// Sets the size of the node at `level`, along with the size recorded by its parent
    pub(crate) fn set_size<S: ?Sized + SubtreesMut>(&mut self, level: usize, size: usize, tree: &mut S) {
        self.frames[level].size = size;
        if level != 0 {
            let parent = self.frames[level - 1];
            tree.set_subtree_size(level - 1, parent.node, parent.offset, size);
        }
    }

    /// Updates the path after the root has been split into new children, inserting a new level
    /// below the root
    pub(crate) fn replace_root<S: ?Sized + Subtrees>(&mut self, size: usize, offsets: (usize, usize), tree: &S) {
        weak_assert!(!self.frames.is_empty(), "replacing root of empty path");
        self.frames[0] = Frame { node: 0, size, offset: offsets.0 };
        let node = self.subtree(0, tree);
        self.frames.insert(1, Frame::new(node, offsets.1));
    }

    /// Returns true if the node at `level` is at its last entry
    pub(crate) fn at_last_entry(&self, level: usize) -> bool {
        let f = &self.frames[level];
        f.offset + 1 == f.size
    }

    /// Returns true if every offset in the path is zero
    pub(crate) fn at_begin(&self) -> bool {
        self.frames.iter().all(|f| f.offset == 0)
    }

    /// Returns the node at `level` immediately to the left of the path's node, if there is one
    pub(crate) fn left_sibling<S: ?Sized + Subtrees>(&self, level: usize, tree: &S) -> Option<NodeRef> {
        if level == 0 {
            return None;
        }

        // Go up the tree until we can go left.
        let mut l = level - 1;
        while l != 0 && self.frames[l].offset == 0 {
            l -= 1;
        }
        if self.frames[l].offset == 0 {
            return None;
        }

        // NR is the subtree containing our left sibling.
        let f = &self.frames[l];
        let mut node = tree.subtree(l, f.node, f.offset - 1);

        // Keep right all the way down.
        for l in l + 1..level {
            node = tree.subtree(l, node.index(), node.size() - 1);
        }
        Some(node)
    }

    /// Returns the node at `level` immediately to the right of the path's node, if there is one
    ///
    /// The path must be valid.
    pub(crate) fn right_sibling<S: ?Sized + Subtrees>(&self, level: usize, tree: &S) -> Option<NodeRef> {
        if level == 0 {
            return None;
        }

        // Go up the tree until we can go right.
        let mut l = level - 1;
        while l != 0 && self.at_last_entry(l) {
            l -= 1;
        }
        if self.at_last_entry(l) {
            return None;
        }

        let f = &self.frames[l];
        let mut node = tree.subtree(l, f.node, f.offset + 1);

        // Keep left all the way down.
        for l in l + 1..level {
            node = tree.subtree(l, node.index(), 0);
        }
        Some(node)
    }

    /// Moves the path at `level` to the last entry of its left sibling, updating the frames above
    /// it as necessary
    ///
    /// If the path is at the end, this moves to the last node at `level`, growing the path if it
    /// only held the root.
    pub(crate) fn move_left<S: ?Sized + Subtrees>(&mut self, level: usize, tree: &S) {
        weak_assert!(level != 0, "cannot move the root node");

        // Go up the tree until we can go left.
        let mut l = 0;
        if self.valid() {
            l = level - 1;
            while self.frames[l].offset == 0 {
                weak_assert!(l != 0, "cannot move beyond begin()");
                l -= 1;
            }
        } else if self.height() < level {
            // end() may have created a height=0 path.
            self.frames.resize(level + 1, Frame::default());
        }

        // NR is the subtree containing our left sibling.
        self.frames[l].offset -= 1;
        let mut node = self.subtree(l, tree);

        // Get the rightmost node in the subtree.
        for l in l + 1..level {
            self.frames[l] = Frame::new(node, node.size() - 1);
            node = tree.subtree(l, node.index(), node.size() - 1);
        }
        self.frames[level] = Frame::new(node, node.size() - 1);
    }

    /// Moves the path at `level` to the first entry of its right sibling, updating the frames
    /// above it as necessary
    ///
    /// If there's no right sibling, the path moves to the end.
    pub(crate) fn move_right<S: ?Sized + Subtrees>(&mut self, level: usize, tree: &S) {
        weak_assert!(level != 0, "cannot move the root node");

        // Go up the tree until we can go right.
        let mut l = level - 1;
        while l != 0 && self.at_last_entry(l) {
            l -= 1;
        }

        // NR is the subtree containing our right sibling. If we hit end(), we have offset(0) == size.
        self.frames[l].offset += 1;
        if self.frames[l].offset == self.frames[l].size {
            return;
        }
        let mut node = self.subtree(l, tree);

        for l in l + 1..level {
            self.frames[l] = Frame::new(node, 0);
            node = tree.subtree(l, node.index(), 0);
        }
        self.frames[level] = Frame::new(node, 0);
    }

    /// Extends the path down to `height`, following the leftmost child at each level
    pub(crate) fn fill_left<S: ?Sized + Subtrees>(&mut self, height: usize, tree: &S) {
        while self.height() < height {
            let node = self.subtree(self.height(), tree);
            self.push(node, 0);
        }
    }

    /// Prepares the path for inserting a new entry at `level`, by moving an end-of-tree path to the
    /// position just past the last entry at that level
    pub(crate) fn legalize_for_insert<S: ?Sized + Subtrees>(&mut self, level: usize, tree: &S) {
        if self.valid() {
            return;
        }
        self.move_left(level, tree);
        self.frames[level].offset += 1;
    }
}
