//! Node storage shared between maps: [`Allocator`] and its typed pools

use crate::public_traits::{Key, Value};
use crate::tree::node::{NodeBaseMut, NodeRef, NodeSizer, Slots, SlotsMut};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{self, Debug, Formatter};

/// Storage for the non-root nodes of any number of [`IntervalMap`]s
///
/// Every map borrows its allocator for its whole lifetime, and returns all of its nodes to the
/// allocator when it's cleared or dropped. Freed nodes are kept on a per-kind free list and reused
/// by later allocations (from *any* map sharing the allocator), so the allocator's memory only
/// grows to the high-water mark of live nodes.
///
/// Allocators use interior mutability and are therefore not `Sync`; all the maps sharing one must
/// live on the same thread.
///
/// ## Example
///
/// ```
/// use redwood::{Allocator, IntervalMap};
///
/// let alloc = Allocator::new();
/// {
///     let mut map: IntervalMap<u32, [u64; 4]> = IntervalMap::new(&alloc);
///     for i in 0..100 {
///         map.insert(i * 10, i * 10 + 5, [i as u64; 4]);
///     }
///     assert!(map.height() > 0);
///     assert!(alloc.live_leaves() > 0);
/// }
/// // dropping the map returned every node to the free list:
/// assert_eq!(alloc.live_leaves(), 0);
/// assert_eq!(alloc.live_branches(), 0);
/// ```
///
/// [`IntervalMap`]: crate::IntervalMap
pub struct Allocator<K, V> {
    arena: RefCell<Arena<K, V>>,
}

/// (*Internal*) The pools behind an [`Allocator`]
pub(crate) struct Arena<K, V> {
    pub(crate) leaves: Pool<(K, K), V>,
    pub(crate) branches: Pool<NodeRef, K>,
}

/// A collection of same-capacity nodes, each stored as a pair of parallel arrays
///
/// Nodes are identified by their index in the pool. The node with index `i` occupies
/// `first[i * capacity .. (i + 1) * capacity]` (and likewise for `second`).
pub(crate) struct Pool<A, B> {
    first: Vec<A>,
    second: Vec<B>,
    capacity: usize,
    // Indexes of nodes that have been deallocated, most recently freed at the end
    free: Vec<u32>,
}

impl<K: Key, V: Value> Allocator<K, V> {
    /// Creates a new, empty `Allocator`
    pub fn new() -> Self {
        Allocator { arena: RefCell::new(Arena::new()) }
    }

    /// Returns the number of leaf nodes currently in use by some map
    pub fn live_leaves(&self) -> usize {
        self.arena().leaves.live()
    }

    /// Returns the number of (non-root) branch nodes currently in use by some map
    pub fn live_branches(&self) -> usize {
        self.arena().branches.live()
    }

    /// Returns the number of freed nodes waiting to be reused, of either kind
    pub fn recycled(&self) -> usize {
        let arena = self.arena();
        arena.leaves.recycled() + arena.branches.recycled()
    }

    pub(crate) fn arena(&self) -> Ref<'_, Arena<K, V>> {
        self.arena.borrow()
    }

    pub(crate) fn arena_mut(&self) -> RefMut<'_, Arena<K, V>> {
        self.arena.borrow_mut()
    }
}

impl<K: Key, V: Value> Default for Allocator<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> Debug for Allocator<K, V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("live_leaves", &self.live_leaves())
            .field("live_branches", &self.live_branches())
            .field("recycled", &self.recycled())
            .finish()
    }
}

impl<K: Key, V: Value> Arena<K, V> {
    fn new() -> Self {
        Arena {
            leaves: Pool::new(NodeSizer::<K, V>::LEAF_CAPACITY),
            branches: Pool::new(NodeSizer::<K, V>::BRANCH_CAPACITY),
        }
    }
}

impl<A: Copy + Default, B: Copy + Default> Pool<A, B> {
    pub(crate) fn new(capacity: usize) -> Self {
        weak_assert!(capacity != 0, "cannot make a pool of zero-capacity nodes");
        Pool { first: Vec::new(), second: Vec::new(), capacity, free: Vec::new() }
    }

    /// The number of entries in every node of this pool
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the index of a node that's available for use, reusing a freed node if there is one
    ///
    /// The contents of the returned node are unspecified.
    pub(crate) fn allocate(&mut self) -> u32 {
        if let Some(idx) = self.free.pop() {
            return idx;
        }

        let idx = match u32::try_from(self.first.len() / self.capacity) {
            Ok(i) => i,
            Err(_) => panic!("too many nodes in allocator"),
        };
        let new_len = self.first.len() + self.capacity;
        self.first.resize(new_len, A::default());
        self.second.resize(new_len, B::default());
        debug_println!("allocated node {idx} (capacity {})", self.capacity);
        idx
    }

    /// Returns the node to the free list
    ///
    /// In debug builds, the node's contents are overwritten with default values, so that a stale
    /// reference to it is more likely to be noticed.
    pub(crate) fn deallocate(&mut self, idx: u32) {
        weak_assert!((idx as usize) < self.nodes(), "deallocating node {idx} out of bounds");

        if cfg!(debug_assertions) {
            let mut node = self.node_mut(idx);
            node.first_mut().fill(A::default());
            node.second_mut().fill(B::default());
        }

        debug_println!("freed node {idx} (capacity {})", self.capacity);
        self.free.push(idx);
    }

    pub(crate) fn node(&self, idx: u32) -> Slots<'_, A, B> {
        let range = self.range(idx);
        Slots::new(&self.first[range.clone()], &self.second[range])
    }

    pub(crate) fn node_mut(&mut self, idx: u32) -> SlotsMut<'_, A, B> {
        let range = self.range(idx);
        SlotsMut::new(&mut self.first[range.clone()], &mut self.second[range])
    }

    /// Mutably borrows two distinct nodes at once
    pub(crate) fn pair_mut(&mut self, x: u32, y: u32) -> (SlotsMut<'_, A, B>, SlotsMut<'_, A, B>) {
        weak_assert!(x != y, "cannot borrow node {x} twice");

        let (x_start, y_start) = (x as usize * self.capacity, y as usize * self.capacity);
        let (first_x, first_y) = split_pair(&mut self.first, x_start, y_start, self.capacity);
        let (second_x, second_y) = split_pair(&mut self.second, x_start, y_start, self.capacity);
        (SlotsMut::new(first_x, second_x), SlotsMut::new(first_y, second_y))
    }

    /// Number of nodes that have been allocated and not freed
    pub(crate) fn live(&self) -> usize {
        self.nodes() - self.free.len()
    }

    pub(crate) fn recycled(&self) -> usize {
        self.free.len()
    }

    fn nodes(&self) -> usize {
        self.first.len() / self.capacity
    }

    fn range(&self, idx: u32) -> std::ops::Range<usize> {
        let start = idx as usize * self.capacity;
        start..start + self.capacity
    }
}

// Splits `len`-element subslices starting at `x` and `y` out of `slice`. The two must not overlap.
fn split_pair<T>(slice: &mut [T], x: usize, y: usize, len: usize) -> (&mut [T], &mut [T]) {
    if x < y {
        let (lo, hi) = slice.split_at_mut(y);
        (&mut lo[x..x + len], &mut hi[..len])
    } else {
        let (lo, hi) = slice.split_at_mut(x);
        (&mut hi[..len], &mut lo[y..y + len])
    }
}

#[cfg(test)]
mod tests {
    use super::Pool;
    use crate::tree::node::{NodeBase, NodeBaseMut};

    #[test]
    fn freed_nodes_are_reused_last_in_first_out() {
        let mut pool: Pool<u32, u8> = Pool::new(4);
        let a = pool.allocate();
        let b = pool.allocate();
        let c = pool.allocate();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(pool.live(), 3);

        pool.deallocate(a);
        pool.deallocate(c);
        assert_eq!(pool.live(), 1);
        assert_eq!(pool.recycled(), 2);

        assert_eq!(pool.allocate(), c);
        assert_eq!(pool.allocate(), a);
        assert_eq!(pool.allocate(), 3);
        assert_eq!(pool.recycled(), 0);
    }

    #[test]
    fn pair_mut_borrows_the_right_nodes() {
        let mut pool: Pool<u32, u8> = Pool::new(2);
        let a = pool.allocate();
        let b = pool.allocate();

        for (x, y) in [(a, b), (b, a)] {
            let (mut nx, mut ny) = pool.pair_mut(x, y);
            nx.first_mut().fill(x + 10);
            ny.first_mut().fill(y + 20);
            assert_eq!(nx.capacity(), 2);
            assert_eq!(ny.capacity(), 2);
        }

        assert_eq!(pool.node(a).first(), &[a + 20, a + 20]);
        assert_eq!(pool.node(b).first(), &[b + 10, b + 10]);
    }

    #[test]
    #[cfg(debug_assertions)]
    fn freed_nodes_are_poisoned() {
        let mut pool: Pool<u32, u8> = Pool::new(3);
        let a = pool.allocate();
        pool.node_mut(a).first_mut().fill(7);
        pool.deallocate(a);
        assert_eq!(pool.node(a).first(), &[0, 0, 0]);
    }
}
