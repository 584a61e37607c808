//! Management of nodes
//!
//! Every node in the tree -- the inline root, and the leaves and branches stored in an
//! [`Allocator`] -- is a pair of parallel, fixed-capacity arrays. Leaves store `(start, stop)` key
//! pairs alongside their values; branches store references to their children alongside the
//! largest `stop` key in each child's subtree.
//!
//! Nodes don't store their own size. The number of live entries is always supplied by the caller,
//! either from the parent's [`NodeRef`] or from the root's size. Entries past the size are
//! unspecified, and are never read.
//!
//! All of the array surgery (copying, shifting, moving entries between siblings) works on
//! *views* of nodes: [`Slots`] and [`SlotsMut`]. Views borrow a node's arrays as slices, so the
//! same code handles the root (with capacity `N`) and the allocated nodes (whose capacities come
//! from [`NodeSizer`]). The node kind is never stored anywhere; it's implied by the level at which
//! a node is accessed, with branches at every level above the leaves.
//!
//! [`Allocator`]: crate::Allocator

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::size_of;

use crate::param::IntervalTraits;
use crate::recycle::{Arena, Pool};

/// The typical size, in bytes, of a CPU cache line
///
/// Allocated nodes are sized in multiples of this, because the CPU will generally load entire
/// cache lines at a time into the L1/L2 cache.
const CACHE_LINE_SIZE: usize = 64;

/// The target size of a leaf node's arrays: four cache lines
const DESIRED_NODE_BYTES: usize = 4 * CACHE_LINE_SIZE;

/// The smallest capacity we'll give to any allocated node
///
/// Below three entries, `overflow` can't always make room by borrowing from siblings.
const MIN_NODE_CAPACITY: usize = 3;

/// The largest capacity we'll give to any allocated node, so that `size - 1` fits in a byte
const MAX_NODE_CAPACITY: usize = 1 << SIZE_BITS;

const SIZE_BITS: u32 = 8;
const SIZE_MASK: u64 = (1 << SIZE_BITS) - 1;

/// Computes the capacities of allocated leaf and branch nodes, for a given key and value type
///
/// Leaves get as many entries as fit in [`DESIRED_NODE_BYTES`] (but at least three). Branches then
/// get as many entries as fit in the leaf's allocation, rounded up to a whole cache line.
pub(crate) struct NodeSizer<K, V>(PhantomData<(K, V)>);

impl<K, V> NodeSizer<K, V> {
    const LEAF_ENTRY_BYTES: usize = 2 * size_of::<K>() + size_of::<V>();
    const BRANCH_ENTRY_BYTES: usize = size_of::<K>() + size_of::<NodeRef>();

    pub(crate) const LEAF_CAPACITY: usize =
        clamp_capacity(DESIRED_NODE_BYTES / nonzero(Self::LEAF_ENTRY_BYTES));

    const ALLOC_BYTES: usize = round_up(Self::LEAF_CAPACITY * Self::LEAF_ENTRY_BYTES);

    pub(crate) const BRANCH_CAPACITY: usize =
        clamp_capacity(Self::ALLOC_BYTES / Self::BRANCH_ENTRY_BYTES);
}

const fn nonzero(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        n
    }
}

const fn round_up(bytes: usize) -> usize {
    (bytes + CACHE_LINE_SIZE - 1) / CACHE_LINE_SIZE * CACHE_LINE_SIZE
}

const fn clamp_capacity(n: usize) -> usize {
    if n < MIN_NODE_CAPACITY {
        MIN_NODE_CAPACITY
    } else if n > MAX_NODE_CAPACITY {
        MAX_NODE_CAPACITY
    } else {
        n
    }
}

/// A tagged reference to an allocated node: its index in the pool, together with its size
///
/// The node's kind isn't part of the reference, it's implied by the level that the reference is
/// found at. The size is packed into the low byte (as `size - 1`), and the index (plus one) into
/// the rest, so that the all-zero `NodeRef::default()` is the null reference.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeRef {
    raw: u64,
}

impl NodeRef {
    pub(crate) fn new(idx: u32, size: usize) -> Self {
        weak_assert!(size != 0 && size <= MAX_NODE_CAPACITY, "bad node size {size}");
        NodeRef { raw: ((idx as u64 + 1) << SIZE_BITS) | (size as u64 - 1) }
    }

    pub(crate) fn is_null(self) -> bool {
        self.raw == 0
    }

    /// The index of the referenced node in its pool
    pub(crate) fn index(self) -> u32 {
        weak_assert!(!self.is_null(), "index of null NodeRef");
        ((self.raw >> SIZE_BITS) - 1) as u32
    }

    /// Number of entries in the referenced node, always at least one
    pub(crate) fn size(self) -> usize {
        (self.raw & SIZE_MASK) as usize + 1
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        weak_assert!(size != 0 && size <= MAX_NODE_CAPACITY, "bad node size {size}");
        self.raw = (self.raw & !SIZE_MASK) | (size as u64 - 1);
    }
}

impl Debug for NodeRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.is_null() {
            true => f.write_str("NodeRef(null)"),
            false => write!(f, "NodeRef(#{}, size = {})", self.index(), self.size()),
        }
    }
}

/// Node kinds, used where an algorithm is generic over which pool it works in
pub(crate) mod ty {
    /// Type hint for leaf nodes, storing `(start, stop)` pairs and values
    pub(crate) enum Leaf {}

    /// Type hint for branch nodes, storing child references and their stops
    pub(crate) enum Branch {}
}

/// The parts of a node kind that `overflow` needs to know about
pub(crate) trait NodeKind<K, V> {
    type First: Copy + Default;
    type Second: Copy + Default;

    fn pool(arena: &Arena<K, V>) -> &Pool<Self::First, Self::Second>;
    fn pool_mut(arena: &mut Arena<K, V>) -> &mut Pool<Self::First, Self::Second>;

    /// The stop of entry `i` in the node
    fn stop(node: Slots<'_, Self::First, Self::Second>, i: usize) -> K;
}

impl<K: Copy + Default, V: Copy + Default> NodeKind<K, V> for ty::Leaf {
    type First = (K, K);
    type Second = V;

    fn pool(arena: &Arena<K, V>) -> &Pool<(K, K), V> {
        &arena.leaves
    }

    fn pool_mut(arena: &mut Arena<K, V>) -> &mut Pool<(K, K), V> {
        &mut arena.leaves
    }

    fn stop(node: Slots<'_, (K, K), V>, i: usize) -> K {
        node.first()[i].1
    }
}

impl<K: Copy + Default, V: Copy + Default> NodeKind<K, V> for ty::Branch {
    type First = NodeRef;
    type Second = K;

    fn pool(arena: &Arena<K, V>) -> &Pool<NodeRef, K> {
        &arena.branches
    }

    fn pool_mut(arena: &mut Arena<K, V>) -> &mut Pool<NodeRef, K> {
        &mut arena.branches
    }

    fn stop(node: Slots<'_, NodeRef, K>, i: usize) -> K {
        node.second()[i]
    }
}

/// Immutable view of a node's arrays
pub(crate) struct Slots<'n, A, B> {
    first: &'n [A],
    second: &'n [B],
}

/// Mutable view of a node's arrays
pub(crate) struct SlotsMut<'n, A, B> {
    first: &'n mut [A],
    second: &'n mut [B],
}

impl<'n, A, B> Slots<'n, A, B> {
    pub(crate) fn new(first: &'n [A], second: &'n [B]) -> Self {
        weak_assert!(first.len() == second.len());
        Slots { first, second }
    }
}

impl<'n, A, B> Clone for Slots<'n, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'n, A, B> Copy for Slots<'n, A, B> {}

impl<'n, A, B> SlotsMut<'n, A, B> {
    pub(crate) fn new(first: &'n mut [A], second: &'n mut [B]) -> Self {
        weak_assert!(first.len() == second.len());
        SlotsMut { first, second }
    }
}

/// Inline node storage with capacity `N`, used for the root of a map
pub(crate) struct Inline<A, B, const N: usize> {
    first: [A; N],
    second: [B; N],
}

/// The root of a map that fits entirely in one leaf
pub(crate) type RootLeaf<K, V, const N: usize> = Inline<(K, K), V, N>;

/// The root of a map once it has branched: references to its children, without a start key
pub(crate) type RootBranch<K, const N: usize> = Inline<NodeRef, K, N>;

impl<A: Copy + Default, B: Copy + Default, const N: usize> Default for Inline<A, B, N> {
    fn default() -> Self {
        Inline { first: [A::default(); N], second: [B::default(); N] }
    }
}

impl<A, B, const N: usize> Inline<A, B, N> {
    pub(crate) fn as_slots(&self) -> Slots<'_, A, B> {
        Slots { first: &self.first, second: &self.second }
    }

    pub(crate) fn as_slots_mut(&mut self) -> SlotsMut<'_, A, B> {
        SlotsMut { first: &mut self.first, second: &mut self.second }
    }
}

/// Array access shared by every node view
///
/// A node's capacity is just the length of its arrays.
pub(crate) trait NodeBase {
    type First: Copy;
    type Second: Copy;

    fn first(&self) -> &[Self::First];
    fn second(&self) -> &[Self::Second];

    fn capacity(&self) -> usize {
        self.first().len()
    }
}

impl<'n, A: Copy, B: Copy> NodeBase for Slots<'n, A, B> {
    type First = A;
    type Second = B;

    fn first(&self) -> &[A] {
        self.first
    }

    fn second(&self) -> &[B] {
        self.second
    }
}

impl<'n, A: Copy, B: Copy> NodeBase for SlotsMut<'n, A, B> {
    type First = A;
    type Second = B;

    fn first(&self) -> &[A] {
        &*self.first
    }

    fn second(&self) -> &[B] {
        &*self.second
    }
}

/// Array surgery on nodes, parameterized by the caller-supplied sizes
///
/// None of these methods check that the node's *contents* stay valid; they only move entries
/// around. Ranges are checked against the node's capacity in debug builds (and are always bounds
/// checked by the slice operations themselves).
pub(crate) trait NodeBaseMut: NodeBase {
    fn first_mut(&mut self) -> &mut [Self::First];
    fn second_mut(&mut self) -> &mut [Self::Second];

    /// Copies `count` entries from `other[i..]` to `self[j..]`
    fn copy_from<O>(&mut self, other: &O, i: usize, j: usize, count: usize)
    where
        O: ?Sized + NodeBase<First = Self::First, Second = Self::Second>,
    {
        weak_assert!(i + count <= other.capacity(), "invalid source range");
        weak_assert!(j + count <= self.capacity(), "invalid destination range");

        self.first_mut()[j..j + count].copy_from_slice(&other.first()[i..i + count]);
        self.second_mut()[j..j + count].copy_from_slice(&other.second()[i..i + count]);
    }

    /// Moves `count` entries from `i` down to `j`, where `j <= i`
    fn move_left(&mut self, i: usize, j: usize, count: usize) {
        weak_assert!(j <= i, "use move_right instead");
        if count == 0 {
            return;
        }
        self.first_mut().copy_within(i..i + count, j);
        self.second_mut().copy_within(i..i + count, j);
    }

    /// Moves `count` entries from `i` up to `j`, where `i <= j`
    fn move_right(&mut self, i: usize, j: usize, count: usize) {
        weak_assert!(i <= j, "use move_left instead");
        weak_assert!(j + count <= self.capacity(), "invalid range");
        if count == 0 {
            return;
        }
        self.first_mut().copy_within(i..i + count, j);
        self.second_mut().copy_within(i..i + count, j);
    }

    /// Removes the entries `i..j` from a node holding `size` entries
    fn erase(&mut self, i: usize, j: usize, size: usize) {
        self.move_left(j, i, size - j);
    }

    /// Removes the single entry at `i`
    fn erase_at(&mut self, i: usize, size: usize) {
        self.erase(i, i + 1, size);
    }

    /// Moves the entries `i..size` one position to the right, making room at `i`
    fn shift(&mut self, i: usize, size: usize) {
        self.move_right(i, i + 1, size - i);
    }

    /// Moves the first `count` entries onto the end of the left sibling `sib`
    fn transfer_to_left_sibling<O>(&mut self, size: usize, sib: &mut O, sib_size: usize, count: usize)
    where
        O: ?Sized + NodeBaseMut<First = Self::First, Second = Self::Second>,
    {
        sib.copy_from(&*self, 0, sib_size, count);
        self.erase(0, count, size);
    }

    /// Moves the last `count` entries onto the front of the right sibling `sib`
    fn transfer_to_right_sibling<O>(&mut self, size: usize, sib: &mut O, sib_size: usize, count: usize)
    where
        O: ?Sized + NodeBaseMut<First = Self::First, Second = Self::Second>,
    {
        sib.move_right(0, count, sib_size);
        sib.copy_from(&*self, size - count, 0, count);
    }

    /// Moves entries between this node and its left sibling so that this node grows by `add`
    /// entries (or shrinks, if `add` is negative)
    ///
    /// The transfer is limited by the entries available and the room at the destination. Returns
    /// the number of entries actually moved into this node, negative if they moved out.
    fn adjust_from_left_sibling<O>(
        &mut self,
        size: usize,
        sib: &mut O,
        sib_size: usize,
        add: isize,
    ) -> isize
    where
        O: ?Sized + NodeBaseMut<First = Self::First, Second = Self::Second>,
    {
        if add > 0 {
            // grow, taking entries from the end of the sibling
            let count = (add as usize).min(sib_size).min(self.capacity() - size);
            sib.transfer_to_right_sibling(sib_size, self, size, count);
            count as isize
        } else {
            // shrink, giving entries to the sibling
            let count = add.unsigned_abs().min(size).min(sib.capacity() - sib_size);
            self.transfer_to_left_sibling(size, sib, sib_size, count);
            -(count as isize)
        }
    }
}

impl<'n, A: Copy, B: Copy> NodeBaseMut for SlotsMut<'n, A, B> {
    fn first_mut(&mut self) -> &mut [A] {
        &mut *self.first
    }

    fn second_mut(&mut self) -> &mut [B] {
        &mut *self.second
    }
}

/// Leaf node access: intervals and their values
pub(crate) trait LeafNode<K: Copy, V: Copy>: NodeBase<First = (K, K), Second = V> {
    fn start(&self, i: usize) -> K {
        self.first()[i].0
    }

    fn stop(&self, i: usize) -> K {
        self.first()[i].1
    }

    fn value(&self, i: usize) -> V {
        self.second()[i]
    }

    /// Returns the first index `>= i` whose interval doesn't end before `x`, or `size` if there is
    /// no such index
    fn find_from<T: IntervalTraits<K>>(&self, mut i: usize, size: usize, x: K) -> usize {
        weak_assert!(i <= size && size <= self.capacity(), "bad indices");
        weak_assert!(i == 0 || T::stop_less(self.stop(i - 1), x), "index is past x");

        while i != size && T::stop_less(self.stop(i), x) {
            i += 1;
        }
        i
    }

    /// Like [`find_from`](Self::find_from), but `x` is known to come before the end of the last
    /// entry in the node, so there's no need to check the size
    fn safe_find<T: IntervalTraits<K>>(&self, mut i: usize, x: K) -> usize {
        weak_assert!(i < self.capacity(), "bad index");
        weak_assert!(i == 0 || T::stop_less(self.stop(i - 1), x), "index is past x");

        while T::stop_less(self.stop(i), x) {
            i += 1;
        }
        weak_assert!(i < self.capacity(), "unsafe intervals");
        i
    }

    /// Returns the value mapped at `x`, or `not_found` if it's in a gap. `x` must come before the
    /// end of the last entry in the node.
    fn safe_lookup<T: IntervalTraits<K>>(&self, x: K, not_found: V) -> V {
        let i = self.safe_find::<T>(0, x);
        match T::start_less(x, self.start(i)) {
            true => not_found,
            false => self.value(i),
        }
    }
}

impl<'n, K: Copy, V: Copy> LeafNode<K, V> for Slots<'n, (K, K), V> {}
impl<'n, K: Copy, V: Copy> LeafNode<K, V> for SlotsMut<'n, (K, K), V> {}

pub(crate) trait LeafNodeMut<K: Copy, V: Copy>: LeafNode<K, V> + NodeBaseMut {
    fn set_start(&mut self, i: usize, a: K) {
        self.first_mut()[i].0 = a;
    }

    fn set_stop(&mut self, i: usize, b: K) {
        self.first_mut()[i].1 = b;
    }

    fn set_value(&mut self, i: usize, y: V) {
        self.second_mut()[i] = y;
    }

    fn set_entry(&mut self, i: usize, a: K, b: K, y: V) {
        self.first_mut()[i] = (a, b);
        self.second_mut()[i] = y;
    }

    /// Adds the interval `[a, b]` with value `y` at `*pos`, merging it with its neighbors where
    /// possible
    ///
    /// `*pos` must be the result of `find_from(_, size, a)` and the interval must not overlap any
    /// existing entry. If the new interval is merged into the entry on its left, `*pos` is
    /// updated to point at that entry.
    ///
    /// Returns the new size of the node. If there isn't room for another entry, this returns
    /// `capacity + 1` *without* modifying the node; the caller is expected to make room and try
    /// again.
    fn insert_from<T: IntervalTraits<K>>(
        &mut self,
        pos: &mut usize,
        size: usize,
        a: K,
        b: K,
        y: V,
    ) -> usize
    where
        V: PartialEq,
    {
        let i = *pos;
        let cap = self.capacity();
        weak_assert!(i <= size && size <= cap, "invalid index");
        weak_assert!(T::non_empty(a, b), "invalid interval");
        weak_assert!(i == 0 || T::stop_less(self.stop(i - 1), a), "bad insert position");
        weak_assert!(i == size || !T::stop_less(self.stop(i), a), "bad insert position");
        weak_assert!(i == size || T::stop_less(b, self.start(i)), "overlapping insert");

        // Coalesce with the interval on the left?
        if i != 0 && self.value(i - 1) == y && T::adjacent(self.stop(i - 1), a) {
            *pos = i - 1;
            // ... and also with the interval on the right?
            if i != size && self.value(i) == y && T::adjacent(b, self.start(i)) {
                let stop = self.stop(i);
                self.set_stop(i - 1, stop);
                self.erase_at(i, size);
                return size - 1;
            }
            self.set_stop(i - 1, b);
            return size;
        }

        // Detect overflow.
        if i == cap {
            return cap + 1;
        }

        // Add new interval at end.
        if i == size {
            self.set_entry(i, a, b, y);
            return size + 1;
        }

        // Try to coalesce with the following interval.
        if self.value(i) == y && T::adjacent(b, self.start(i)) {
            self.set_start(i, a);
            return size;
        }

        if size == cap {
            return cap + 1;
        }

        self.shift(i, size);
        self.set_entry(i, a, b, y);
        size + 1
    }
}

impl<'n, K: Copy, V: Copy> LeafNodeMut<K, V> for SlotsMut<'n, (K, K), V> {}

/// Branch node access: child references and the largest stop in each child's subtree
pub(crate) trait BranchNode<K: Copy>: NodeBase<First = NodeRef, Second = K> {
    fn subtree(&self, i: usize) -> NodeRef {
        self.first()[i]
    }

    fn stop(&self, i: usize) -> K {
        self.second()[i]
    }

    /// Returns the first child index `>= i` whose subtree doesn't end before `x`, or `size` if
    /// there is no such child
    fn find_from<T: IntervalTraits<K>>(&self, mut i: usize, size: usize, x: K) -> usize {
        weak_assert!(i <= size && size <= self.capacity(), "bad indices");
        weak_assert!(i == 0 || T::stop_less(self.stop(i - 1), x), "index is past x");

        while i != size && T::stop_less(self.stop(i), x) {
            i += 1;
        }
        i
    }

    /// Like [`find_from`](Self::find_from), for an `x` that's known to come before the end of
    /// the last subtree
    fn safe_find<T: IntervalTraits<K>>(&self, mut i: usize, x: K) -> usize {
        weak_assert!(i < self.capacity(), "bad index");
        weak_assert!(i == 0 || T::stop_less(self.stop(i - 1), x), "index is past x");

        while T::stop_less(self.stop(i), x) {
            i += 1;
        }
        weak_assert!(i < self.capacity(), "unsafe intervals");
        i
    }

    /// Returns the child that may contain `x`
    fn safe_lookup<T: IntervalTraits<K>>(&self, x: K) -> NodeRef {
        self.subtree(self.safe_find::<T>(0, x))
    }
}

impl<'n, K: Copy> BranchNode<K> for Slots<'n, NodeRef, K> {}
impl<'n, K: Copy> BranchNode<K> for SlotsMut<'n, NodeRef, K> {}

pub(crate) trait BranchNodeMut<K: Copy>: BranchNode<K> + NodeBaseMut {
    fn set_subtree(&mut self, i: usize, node: NodeRef) {
        self.first_mut()[i] = node;
    }

    fn set_stop(&mut self, i: usize, stop: K) {
        self.second_mut()[i] = stop;
    }

    /// Inserts a new child at `i`, shifting the later children to the right. The node must not be
    /// full.
    fn insert(&mut self, i: usize, size: usize, node: NodeRef, stop: K) {
        weak_assert!(size < self.capacity(), "branch node overflow");
        weak_assert!(i <= size, "bad insert position");

        self.shift(i, size);
        self.set_subtree(i, node);
        self.set_stop(i, stop);
    }
}

impl<'n, K: Copy> BranchNodeMut<K> for SlotsMut<'n, NodeRef, K> {}
