//! Wrapper module containing the interval map itself
//!
//! The algorithms are spread out across the submodules, roughly by the operations they implement:
//! cursor movement in [`iter`], insertion and rebalancing in [`insert`], removal in [`remove`], and
//! in-place updates of entries in [`fix`].

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use crate::param::{Closed, IntervalTraits};
use crate::public_traits::{Key, Value};
use crate::recycle::{Allocator, Arena};

#[cfg(any(test, feature = "fuzz"))]
use crate::param::keys_equal;

mod fix;
mod insert;
mod iter;
pub(crate) mod node;
mod overlaps;
mod path;
mod remove;
#[cfg(test)]
mod tests;

pub use iter::{Cursor, CursorMut, Iter};
pub use overlaps::Overlaps;

use node::{
    BranchNode, BranchNodeMut, LeafNode, LeafNodeMut, NodeBase, NodeBaseMut, NodeRef, RootBranch,
    RootLeaf, Slots, SlotsMut,
};
use path::{Path, Subtrees, SubtreesMut};

/// The default capacity of the root node; default parameterization for [`IntervalMap`]
///
/// Small maps (up to this many intervals) are stored entirely inline, without touching the
/// [`Allocator`]. The same capacity is used for the root once the map has branched, so it also
/// determines the fan-out at the top of the tree.
pub const DEFAULT_ROOT_CAPACITY: usize = 8;

/// *Raison d'être of the crate*: a map from disjoint intervals to values, that merges neighbors
///
/// An `IntervalMap` stores a set of non-overlapping intervals `[start, stop]` of keys `K`, each
/// mapped to a value `V`. Intervals that touch (as defined by the [`IntervalTraits`] policy `T`)
/// and have equal values are always merged, so that the stored representation of a given mapping
/// is unique.
///
/// The intervals are kept in a B+ tree. Leaves store the intervals and their values; branches store
/// the largest `stop` key of each child's subtree, which is all a search needs. The root is stored
/// inline, with capacity `N`, and all other nodes come from the [`Allocator`] that the map was
/// created with.
///
/// Lookups are `O(log n)`. Insertions are `O(log n)` too, typically touching only a single leaf:
/// when a leaf overflows, entries are first spread across its siblings before any new node is
/// allocated.
///
/// ## Examples
///
/// ```
/// use redwood::{Allocator, IntervalMap};
///
/// let alloc = Allocator::new();
/// let mut map: IntervalMap<u32, &str> = IntervalMap::new(&alloc);
///
/// map.insert(10, 19, "low");
/// map.insert(30, 39, "high");
/// map.insert(20, 29, "low"); // touches [10, 19] with the same value: merged
///
/// assert_eq!(map.lookup(25, "none"), "low");
/// assert_eq!(map.lookup(5, "none"), "none");
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(10, 29, "low"), (30, 39, "high")]);
///
/// // Cursors can modify the intervals in place:
/// map.find_mut(30).set_value("low");
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(10, 39, "low")]);
/// ```
///
/// ## Contracts
///
/// Most modifications come with preconditions -- for example, inserted intervals must not overlap
/// any existing interval. These are checked in debug builds (panicking if they're violated), and
/// assumed in release builds. Violating them never causes undefined behavior, but the contents of
/// the map are unspecified afterwards.
///
/// The root capacity `N` must be between 1 and 255, inclusive.
pub struct IntervalMap<'a, K, V, const N: usize = DEFAULT_ROOT_CAPACITY, T = Closed>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    root: Root<K, V, N>,
    alloc: &'a Allocator<K, V>,
    traits: PhantomData<fn() -> T>,
}

/// (*Internal*) The inline root node, and the bookkeeping that goes along with it
pub(crate) struct Root<K, V, const N: usize> {
    node: RootNode<K, V, N>,
    /// Number of branch levels below the root; zero while the root is a leaf
    height: usize,
    /// Number of entries in the root node
    size: usize,
}

enum RootNode<K, V, const N: usize> {
    Leaf(RootLeaf<K, V, N>),
    /// A branched root, caching the start of the first interval in the map
    Branch { start: K, node: RootBranch<K, N> },
}

/// (*Internal*) Read-only access to all the nodes of one map
pub(crate) struct TreeRef<'t, K, V, T, const N: usize> {
    pub(crate) root: &'t Root<K, V, N>,
    pub(crate) arena: &'t Arena<K, V>,
    traits: PhantomData<fn() -> T>,
}

/// (*Internal*) Mutable access to all the nodes of one map
pub(crate) struct TreeMut<'t, K, V, T, const N: usize> {
    pub(crate) root: &'t mut Root<K, V, N>,
    pub(crate) arena: &'t mut Arena<K, V>,
    traits: PhantomData<fn() -> T>,
}

/// (*Internal*) A mutable tree together with a position in it, on which all of the modifying
/// algorithms are implemented
///
/// Borrowing the tree and the path separately lets us hand each of them to the other's methods.
pub(crate) struct Editor<'e, K, V, T, const N: usize> {
    tree: TreeMut<'e, K, V, T, N>,
    path: &'e mut Path,
}

impl<K: Key, V: Value, const N: usize> Root<K, V, N> {
    fn new() -> Self {
        Root { node: RootNode::Leaf(RootLeaf::default()), height: 0, size: 0 }
    }

    pub(crate) fn branched(&self) -> bool {
        self.height != 0
    }

    fn leaf(&self) -> &RootLeaf<K, V, N> {
        match &self.node {
            RootNode::Leaf(node) => node,
            RootNode::Branch { .. } => weak_unreachable!("root is not a leaf"),
        }
    }

    fn leaf_mut(&mut self) -> &mut RootLeaf<K, V, N> {
        match &mut self.node {
            RootNode::Leaf(node) => node,
            RootNode::Branch { .. } => weak_unreachable!("root is not a leaf"),
        }
    }

    fn branch(&self) -> &RootBranch<K, N> {
        match &self.node {
            RootNode::Branch { node, .. } => node,
            RootNode::Leaf(_) => weak_unreachable!("root is not a branch"),
        }
    }

    fn branch_mut(&mut self) -> &mut RootBranch<K, N> {
        match &mut self.node {
            RootNode::Branch { node, .. } => node,
            RootNode::Leaf(_) => weak_unreachable!("root is not a branch"),
        }
    }

    fn branch_start(&self) -> K {
        match &self.node {
            RootNode::Branch { start, .. } => *start,
            RootNode::Leaf(_) => weak_unreachable!("root is not a branch"),
        }
    }

    fn set_branch_start(&mut self, a: K) {
        match &mut self.node {
            RootNode::Branch { start, .. } => *start = a,
            RootNode::Leaf(_) => weak_unreachable!("root is not a branch"),
        }
    }

    /// Replaces the root with an empty leaf. The caller is responsible for the size.
    fn switch_to_leaf(&mut self) {
        self.node = RootNode::Leaf(RootLeaf::default());
        self.height = 0;
    }

    /// Returns every allocated node below the root to `arena`, one level at a time
    fn free_nodes(&mut self, arena: &mut Arena<K, V>) {
        if !self.branched() {
            return;
        }

        let mut refs: Vec<NodeRef> = self.branch().as_slots().first()[..self.size].to_vec();
        for _ in 1..self.height {
            let mut next = Vec::new();
            for r in refs {
                next.extend_from_slice(&arena.branches.node(r.index()).first()[..r.size()]);
                arena.branches.deallocate(r.index());
            }
            refs = next;
        }

        for r in refs {
            arena.leaves.deallocate(r.index());
        }
    }
}

impl<'t, K, V, T, const N: usize> Clone for TreeRef<'t, K, V, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'t, K, V, T, const N: usize> Copy for TreeRef<'t, K, V, T, N> {}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> TreeRef<'t, K, V, T, N> {
    pub(crate) fn new(root: &'t Root<K, V, N>, arena: &'t Arena<K, V>) -> Self {
        TreeRef { root, arena, traits: PhantomData }
    }

    /// The branch node at `level`, which must be above the leaves
    pub(crate) fn branch(&self, level: usize, node: u32) -> Slots<'t, NodeRef, K> {
        match level {
            0 => self.root.branch().as_slots(),
            _ => self.arena.branches.node(node),
        }
    }

    /// The leaf that `path` points into
    pub(crate) fn leaf(&self, path: &Path) -> Slots<'t, (K, K), V> {
        match self.root.branched() {
            true => self.arena.leaves.node(path.leaf_node()),
            false => self.root.leaf().as_slots(),
        }
    }

    /// Lookup for a branched map, where `x` is known to be within the map's bounds
    fn tree_safe_lookup(&self, x: K, not_found: V) -> V {
        weak_assert!(self.root.branched(), "tree lookup on a root leaf");

        let mut node = self.root.branch().as_slots().safe_lookup::<T>(x);
        for _ in 1..self.root.height {
            node = self.arena.branches.node(node.index()).safe_lookup::<T>(x);
        }
        self.arena.leaves.node(node.index()).safe_lookup::<T>(x, not_found)
    }
}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Subtrees for TreeRef<'t, K, V, T, N> {
    fn subtree(&self, level: usize, node: u32, i: usize) -> NodeRef {
        self.branch(level, node).subtree(i)
    }
}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> TreeMut<'t, K, V, T, N> {
    pub(crate) fn new(root: &'t mut Root<K, V, N>, arena: &'t mut Arena<K, V>) -> Self {
        TreeMut { root, arena, traits: PhantomData }
    }

    pub(crate) fn reborrow(&self) -> TreeRef<'_, K, V, T, N> {
        TreeRef::new(self.root, self.arena)
    }

    pub(crate) fn branch_mut(&mut self, level: usize, node: u32) -> SlotsMut<'_, NodeRef, K> {
        match level {
            0 => self.root.branch_mut().as_slots_mut(),
            _ => self.arena.branches.node_mut(node),
        }
    }

    pub(crate) fn leaf_mut(&mut self, path: &Path) -> SlotsMut<'_, (K, K), V> {
        match self.root.branched() {
            true => self.arena.leaves.node_mut(path.leaf_node()),
            false => self.root.leaf_mut().as_slots_mut(),
        }
    }

    /// Switches the full root leaf to a branch, moving its entries into newly allocated leaves
    ///
    /// The leaves are filled evenly, leaving room to insert a new entry at `position`. Returns the
    /// new location of `position`, as `(root offset, leaf offset)`.
    pub(crate) fn branch_root(&mut self, position: usize) -> (usize, usize) {
        let leaf_cap = self.arena.leaves.capacity();
        let nodes = N / leaf_cap + 1;

        // Compute new leaf sizes, making room for the insertion.
        let mut sizes = vec![0; nodes];
        let offset = match nodes {
            1 => {
                sizes[0] = self.root.size;
                (0, position)
            }
            _ => insert::distribute(nodes, self.root.size, leaf_cap, &[], &mut sizes, position, true),
        };

        let source = self.root.leaf().as_slots();
        let mut refs = Vec::with_capacity(nodes);
        let mut pos = 0;
        for &size in &sizes {
            let idx = self.arena.leaves.allocate();
            self.arena.leaves.node_mut(idx).copy_from(&source, pos, 0, size);
            refs.push(NodeRef::new(idx, size));
            pos += size;
        }

        let start = self.arena.leaves.node(refs[0].index()).start(0);
        let mut branch = RootBranch::<K, N>::default();
        let mut slots = branch.as_slots_mut();
        for (i, &r) in refs.iter().enumerate() {
            let stop = self.arena.leaves.node(r.index()).stop(r.size() - 1);
            slots.set_subtree(i, r);
            slots.set_stop(i, stop);
        }

        self.root.node = RootNode::Branch { start, node: branch };
        self.root.height = 1;
        self.root.size = nodes;

        debug_println!("branched root into {nodes} leaves: {sizes:?}");
        offset
    }

    /// Splits the full root branch into newly allocated branches, adding a level to the tree
    ///
    /// Like [`branch_root`](Self::branch_root), this leaves room for an insertion at `position`,
    /// and returns where `position` ended up.
    pub(crate) fn split_root(&mut self, position: usize) -> (usize, usize) {
        let branch_cap = self.arena.branches.capacity();
        let nodes = N / branch_cap + 1;

        let mut sizes = vec![0; nodes];
        let offset = match nodes {
            1 => {
                sizes[0] = self.root.size;
                (0, position)
            }
            _ => insert::distribute(nodes, self.root.size, branch_cap, &[], &mut sizes, position, true),
        };

        let source = self.root.branch().as_slots();
        let mut refs = Vec::with_capacity(nodes);
        let mut pos = 0;
        for &size in &sizes {
            let idx = self.arena.branches.allocate();
            self.arena.branches.node_mut(idx).copy_from(&source, pos, 0, size);
            refs.push(NodeRef::new(idx, size));
            pos += size;
        }

        // The start of the map doesn't change, so we can rewrite the root branch in place.
        let mut slots = self.root.branch_mut().as_slots_mut();
        for (i, &r) in refs.iter().enumerate() {
            let stop = self.arena.branches.node(r.index()).stop(r.size() - 1);
            slots.set_subtree(i, r);
            slots.set_stop(i, stop);
        }

        self.root.size = nodes;
        self.root.height += 1;

        debug_println!("split root into {nodes} branches, height is now {}", self.root.height);
        offset
    }
}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Subtrees for TreeMut<'t, K, V, T, N> {
    fn subtree(&self, level: usize, node: u32, i: usize) -> NodeRef {
        self.reborrow().subtree(level, node, i)
    }
}

impl<'t, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> SubtreesMut for TreeMut<'t, K, V, T, N> {
    fn set_subtree_size(&mut self, level: usize, node: u32, i: usize, size: usize) {
        let mut branch = self.branch_mut(level, node);
        let mut r = branch.subtree(i);
        r.set_size(size);
        branch.set_subtree(i, r);
    }
}

impl<'e, K: Key, V: Value, T: IntervalTraits<K>, const N: usize> Editor<'e, K, V, T, N> {
    pub(crate) fn new(root: &'e mut Root<K, V, N>, arena: &'e mut Arena<K, V>, path: &'e mut Path) -> Self {
        Editor { tree: TreeMut::new(root, arena), path }
    }

    /// The leaf containing the current position
    fn leaf(&self) -> Slots<'_, (K, K), V> {
        self.tree.reborrow().leaf(&*self.path)
    }

    pub(crate) fn start(&self) -> K {
        self.leaf().start(self.path.leaf_offset())
    }

    pub(crate) fn stop(&self) -> K {
        self.leaf().stop(self.path.leaf_offset())
    }

    pub(crate) fn value(&self) -> V {
        self.leaf().value(self.path.leaf_offset())
    }

    pub(crate) fn move_prev(&mut self) {
        self.tree.reborrow().move_prev(self.path);
    }
}

/// Checks that `N` is within the range we support: at least one entry, and small enough that the
/// root's entries always fit in a handful of allocated nodes
const fn assert_reasonable_n<const N: usize>() {
    if N == 0 || N > 255 {
        panic!("invalid root capacity N: must be between 1 and 255, inclusive");
    }
}

impl<'a, K, V, const N: usize, T> IntervalMap<'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Creates a new, empty `IntervalMap` that will allocate its nodes from `alloc`
    ///
    /// ## Panics
    ///
    /// This method panics if `N` is not between 1 and 255, inclusive.
    pub fn new(alloc: &'a Allocator<K, V>) -> Self {
        assert_reasonable_n::<N>();
        IntervalMap { root: Root::new(), alloc, traits: PhantomData }
    }

    /// Returns the allocator that the map's nodes come from
    pub fn allocator(&self) -> &'a Allocator<K, V> {
        self.alloc
    }

    /// Returns true if the map contains no intervals
    pub fn is_empty(&self) -> bool {
        self.root.size == 0
    }

    /// Returns the number of levels of branches below the root, zero if the root is a leaf
    pub fn height(&self) -> usize {
        self.root.height
    }

    /// Returns the smallest key mapped to a value: the start of the first interval
    ///
    /// The map must not be empty.
    pub fn start(&self) -> K {
        weak_assert!(!self.is_empty(), "start() of empty map");
        match self.root.branched() {
            true => self.root.branch_start(),
            false => self.root.leaf().as_slots().start(0),
        }
    }

    /// Returns the largest key mapped to a value: the stop of the last interval
    ///
    /// The map must not be empty.
    pub fn stop(&self) -> K {
        weak_assert!(!self.is_empty(), "stop() of empty map");
        let i = self.root.size - 1;
        match self.root.branched() {
            true => self.root.branch().as_slots().stop(i),
            false => self.root.leaf().as_slots().stop(i),
        }
    }

    /// Returns the value mapped at `x`, or `not_found` if `x` isn't in any interval
    pub fn lookup(&self, x: K, not_found: V) -> V {
        if self.is_empty() || T::start_less(x, self.start()) || T::stop_less(self.stop(), x) {
            return not_found;
        }

        match self.root.branched() {
            true => {
                let arena = self.alloc.arena();
                TreeRef::<K, V, T, N>::new(&self.root, &arena).tree_safe_lookup(x, not_found)
            }
            false => self.root.leaf().as_slots().safe_lookup::<T>(x, not_found),
        }
    }

    /// Returns the value mapped at `x`, or `V::default()` if `x` isn't in any interval
    pub fn get(&self, x: K) -> V {
        self.lookup(x, V::default())
    }

    /// Maps the interval from `a` to `b` to the value `y`
    ///
    /// The interval must be non-empty, and must not overlap any interval already in the map. It's
    /// merged with its neighbors if they touch it and have the same value.
    pub fn insert(&mut self, a: K, b: K, y: V) {
        if self.root.branched() || self.root.size == N {
            self.find_mut(a).insert(a, b, y);
            return;
        }

        // Easy insert into the root leaf.
        let size = self.root.size;
        let mut slots = self.root.leaf_mut().as_slots_mut();
        let mut pos = slots.find_from::<T>(0, size, a);
        let new_size = slots.insert_from::<T>(&mut pos, size, a, b, y);
        self.root.size = new_size;
    }

    /// Returns true if any interval in the map overlaps the interval from `a` to `b`
    pub fn overlaps(&self, a: K, b: K) -> bool {
        weak_assert!(T::non_empty(a, b), "invalid interval");
        let cursor = self.find(a);
        cursor.valid() && !T::stop_less(b, cursor.start())
    }

    /// Removes every interval from the map, returning all of its nodes to the allocator
    pub fn clear(&mut self) {
        if self.root.branched() {
            let mut arena = self.alloc.arena_mut();
            self.root.free_nodes(&mut arena);
            self.root.switch_to_leaf();
        }
        self.root.size = 0;
    }

    /// Returns a cursor positioned at the first interval
    pub fn begin(&self) -> Cursor<'_, 'a, K, V, N, T> {
        let mut c = Cursor::new(self);
        c.go_to_begin();
        c
    }

    /// Returns a cursor positioned past the last interval
    pub fn end(&self) -> Cursor<'_, 'a, K, V, N, T> {
        Cursor::new(self)
    }

    /// Returns a cursor positioned at the first interval that ends at or after `x`, or at the end
    /// if there is none
    ///
    /// The cursor points to the interval containing `x`, if there is one.
    pub fn find(&self, x: K) -> Cursor<'_, 'a, K, V, N, T> {
        let mut c = Cursor::new(self);
        c.find(x);
        c
    }

    /// Returns a mutable cursor positioned at the first interval
    pub fn begin_mut(&mut self) -> CursorMut<'_, 'a, K, V, N, T> {
        let mut c = CursorMut::new(self);
        c.go_to_begin();
        c
    }

    /// Returns a mutable cursor positioned past the last interval
    pub fn end_mut(&mut self) -> CursorMut<'_, 'a, K, V, N, T> {
        CursorMut::new(self)
    }

    /// Like [`find`](Self::find), but returns a mutable cursor
    pub fn find_mut(&mut self, x: K) -> CursorMut<'_, 'a, K, V, N, T> {
        let mut c = CursorMut::new(self);
        c.find(x);
        c
    }

    /// Returns an iterator over the intervals in the map, as `(start, stop, value)` triples
    pub fn iter(&self) -> Iter<'_, 'a, K, V, N, T> {
        Iter::new(self)
    }

    pub(crate) fn tree<'t>(&'t self, arena: &'t Arena<K, V>) -> TreeRef<'t, K, V, T, N> {
        TreeRef::new(&self.root, arena)
    }
}

impl<'a, K, V, const N: usize, T> Clone for IntervalMap<'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    /// Copies every interval into a new map, allocating from the same [`Allocator`]
    fn clone(&self) -> Self {
        let mut new = IntervalMap::new(self.alloc);
        {
            // Appending at the end keeps the copy's cursor valid between insertions.
            let mut cursor = new.end_mut();
            for (a, b, y) in self.iter() {
                cursor.insert(a, b, y);
                cursor.move_next();
            }
        }
        new
    }
}

impl<'a, K, V, const N: usize, T> Drop for IntervalMap<'a, K, V, N, T>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, K, V, const N: usize, T> Debug for IntervalMap<'a, K, V, N, T>
where
    K: Key + Debug,
    V: Value + Debug,
    T: IntervalTraits<K>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(a, b, y)| ((a, b), y))).finish()
    }
}

#[cfg(any(test, feature = "fuzz"))]
macro_rules! valid_assert {
    ($path:ident: $cond:expr) => {
        if !$cond {
            panic!(
                concat!("assertion failed: `", stringify!($cond), "` for path {:?}"),
                $path
            );
        }
    };
}

#[cfg(any(test, feature = "fuzz"))]
macro_rules! valid_assert_eq {
    ($path:ident: $lhs:expr, $rhs:expr) => {
        let left = $lhs;
        let right = $rhs;
        if left != right {
            panic!(
                concat!(
                    "assertion failed: `",
                    stringify!($lhs == $rhs),
                    "` for path {:?}:\n",
                    " left: {:?}\n",
                    "right: {:?}",
                ),
                $path, left, right,
            );
        }
    };
}

#[cfg(any(test, feature = "fuzz"))]
impl<'a, K, V, const N: usize, T> IntervalMap<'a, K, V, N, T>
where
    K: Key + Debug,
    V: Value + Debug,
    T: IntervalTraits<K>,
{
    /// (*Test-only*) Validates the map, panicking if any structural invariant doesn't hold
    ///
    /// This checks that the intervals are non-empty, sorted, and fully coalesced (even across node
    /// boundaries), that every node's size is in bounds and every branch's cached stops match
    /// its children, and that the root's cached start is correct.
    pub fn validate(&self) {
        let arena = self.alloc.arena();
        let root = &self.root;
        let mut path = Vec::new();
        let mut entries = Vec::new();

        valid_assert!(path: root.size <= N);

        if !root.branched() {
            let leaf = root.leaf().as_slots();
            entries.extend((0..root.size).map(|i| (leaf.start(i), leaf.stop(i), leaf.value(i))));
        } else {
            valid_assert!(path: root.size != 0);
            let branch = root.branch().as_slots();
            for i in 0..root.size {
                path.push(i);
                let stop = Self::validate_node(&arena, branch.subtree(i), root.height - 1, &mut path, &mut entries);
                valid_assert!(path: keys_equal::<K, T>(stop, branch.stop(i)));
                path.pop();
            }
            valid_assert!(path: keys_equal::<K, T>(root.branch_start(), entries[0].0));
        }

        valid_assert_eq!(path: entries.is_empty(), root.size == 0);

        for (i, &(a, b, _)) in entries.iter().enumerate() {
            valid_assert!(i: T::non_empty(a, b));
        }

        for (i, pair) in entries.windows(2).enumerate() {
            let ((_, stop, y), (next_start, _, next_y)) = (pair[0], pair[1]);
            valid_assert!(i: T::stop_less(stop, next_start));
            valid_assert!(i: y != next_y || !T::adjacent(stop, next_start));
        }
    }

    /// Called by `validate` to check a node `levels_below` levels above the leaves, appending its
    /// entries to `entries`. Returns the largest stop in the subtree.
    fn validate_node(
        arena: &Arena<K, V>,
        node: NodeRef,
        levels_below: usize,
        path: &mut Vec<usize>,
        entries: &mut Vec<(K, K, V)>,
    ) -> K {
        valid_assert!(path: !node.is_null());

        if levels_below == 0 {
            valid_assert!(path: node.size() <= arena.leaves.capacity());
            let leaf = arena.leaves.node(node.index());
            entries.extend((0..node.size()).map(|i| (leaf.start(i), leaf.stop(i), leaf.value(i))));
            return leaf.stop(node.size() - 1);
        }

        valid_assert!(path: node.size() <= arena.branches.capacity());
        let branch = arena.branches.node(node.index());
        for i in 0..node.size() {
            path.push(i);
            let stop = Self::validate_node(arena, branch.subtree(i), levels_below - 1, path, entries);
            valid_assert!(path: keys_equal::<K, T>(stop, branch.stop(i)));
            path.pop();
        }
        branch.stop(node.size() - 1)
    }
}
