//! Wrapper module for [`Overlaps`], which walks the intersections of two maps

use crate::param::{Closed, IntervalTraits};
use crate::public_traits::{Key, Value};

use super::iter::Cursor;
use super::{IntervalMap, DEFAULT_ROOT_CAPACITY};

/// A co-iterator over the places where the intervals of two maps overlap
///
/// An `Overlaps` holds one cursor into each map. Whenever it's [`valid`], the two cursors point at
/// intervals that overlap; [`start`] and [`stop`] give the bounds of the overlap itself. Moving
/// forward with [`advance`] visits every overlapping pair of intervals, in order.
///
/// The two maps must use the same key type and the same [`IntervalTraits`] policy, but can have
/// different values and root capacities.
///
/// ## Example
///
/// ```
/// use redwood::{Allocator, IntervalMap, Overlaps};
///
/// let (alloc_a, alloc_b) = (Allocator::new(), Allocator::new());
/// let mut a: IntervalMap<u32, char> = IntervalMap::new(&alloc_a);
/// let mut b: IntervalMap<u32, bool> = IntervalMap::new(&alloc_b);
/// a.insert(0, 9, 'x');
/// a.insert(20, 29, 'y');
/// b.insert(5, 24, true);
///
/// let mut overlaps = Overlaps::new(&a, &b);
/// let mut found = Vec::new();
/// while overlaps.valid() {
///     found.push((overlaps.start(), overlaps.stop(), overlaps.a().value()));
///     overlaps.advance();
/// }
/// assert_eq!(found, [(5, 9, 'x'), (20, 24, 'y')]);
/// ```
///
/// [`valid`]: Self::valid
/// [`start`]: Self::start
/// [`stop`]: Self::stop
/// [`advance`]: Self::advance
pub struct Overlaps<
    'm,
    'a,
    K,
    VA,
    VB,
    const NA: usize = DEFAULT_ROOT_CAPACITY,
    const NB: usize = DEFAULT_ROOT_CAPACITY,
    T = Closed,
>
where
    K: Key,
    VA: Value,
    VB: Value,
    T: IntervalTraits<K>,
{
    pos_a: Cursor<'m, 'a, K, VA, NA, T>,
    pos_b: Cursor<'m, 'a, K, VB, NB, T>,
}

impl<'m, 'a, K, VA, VB, const NA: usize, const NB: usize, T> Overlaps<'m, 'a, K, VA, VB, NA, NB, T>
where
    K: Key,
    VA: Value,
    VB: Value,
    T: IntervalTraits<K>,
{
    /// Creates a co-iterator positioned at the first overlap between `a` and `b`
    pub fn new(a: &'m IntervalMap<'a, K, VA, NA, T>, b: &'m IntervalMap<'a, K, VB, NB, T>) -> Self {
        let pos_a = match b.is_empty() {
            true => a.end(),
            false => a.find(b.start()),
        };
        let pos_b = match pos_a.valid() {
            true => b.find(pos_a.start()),
            false => b.end(),
        };

        let mut this = Overlaps { pos_a, pos_b };
        this.catch_up();
        this
    }

    /// Returns true if the cursors are at an overlap, false once there are no more overlaps
    pub fn valid(&self) -> bool {
        self.pos_a.valid() && self.pos_b.valid()
    }

    /// The cursor into the first map
    pub fn a(&self) -> &Cursor<'m, 'a, K, VA, NA, T> {
        &self.pos_a
    }

    /// The cursor into the second map
    pub fn b(&self) -> &Cursor<'m, 'a, K, VB, NB, T> {
        &self.pos_b
    }

    /// The start of the overlapping part of the two current intervals
    pub fn start(&self) -> K {
        let (ak, bk) = (self.pos_a.start(), self.pos_b.start());
        match T::start_less(ak, bk) {
            true => bk,
            false => ak,
        }
    }

    /// The stop of the overlapping part of the two current intervals
    pub fn stop(&self) -> K {
        let (ak, bk) = (self.pos_a.stop(), self.pos_b.stop());
        match T::start_less(ak, bk) {
            true => ak,
            false => bk,
        }
    }

    /// Moves to the next overlap that doesn't involve the current interval in the first map
    pub fn skip_a(&mut self) {
        self.pos_a.move_next();
        self.catch_up();
    }

    /// Moves to the next overlap that doesn't involve the current interval in the second map
    pub fn skip_b(&mut self) {
        self.pos_b.move_next();
        self.catch_up();
    }

    /// Moves to the next overlap
    ///
    /// Whichever of the two intervals ends first is skipped; the other one may overlap more
    /// intervals.
    pub fn advance(&mut self) {
        match T::start_less(self.pos_b.stop(), self.pos_a.stop()) {
            true => self.skip_b(),
            false => self.skip_a(),
        }
    }

    /// Moves forward to the first overlap whose stop is not before `x`
    pub fn advance_to(&mut self, x: K) {
        if !self.valid() {
            return;
        }

        // Cursors only search forward.
        if T::stop_less(self.pos_a.stop(), x) {
            self.pos_a.advance_to(x);
        }
        if T::stop_less(self.pos_b.stop(), x) {
            self.pos_b.advance_to(x);
        }
        self.catch_up();
    }

    /// Moves both cursors forward until they overlap, or until either reaches the end. Does
    /// nothing if they already overlap.
    fn catch_up(&mut self) {
        if !self.valid() {
            return;
        }

        if T::stop_less(self.pos_a.stop(), self.pos_b.start()) {
            // A ends before B begins.
            if self.catch_up_a() {
                return;
            }
        } else if T::stop_less(self.pos_b.stop(), self.pos_a.start()) {
            // B ends before A begins.
            if self.catch_up_b() {
                return;
            }
        } else {
            return;
        }

        while !self.catch_up_a() && !self.catch_up_b() {}
    }

    /// Advances A to B's start. Returns true if we're done: at an overlap, or at the end.
    fn catch_up_a(&mut self) -> bool {
        self.pos_a.advance_to(self.pos_b.start());
        !self.pos_a.valid() || !T::stop_less(self.pos_b.stop(), self.pos_a.start())
    }

    /// Advances B to A's start. Returns true if we're done.
    fn catch_up_b(&mut self) -> bool {
        self.pos_b.advance_to(self.pos_a.start());
        !self.pos_b.valid() || !T::stop_less(self.pos_a.stop(), self.pos_b.start())
    }
}

impl<'m, 'a, K, VA, VB, const NA: usize, const NB: usize, T> Clone for Overlaps<'m, 'a, K, VA, VB, NA, NB, T>
where
    K: Key,
    VA: Value,
    VB: Value,
    T: IntervalTraits<K>,
{
    fn clone(&self) -> Self {
        Overlaps { pos_a: self.pos_a.clone(), pos_b: self.pos_b.clone() }
    }
}
