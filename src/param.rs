//! Parameterization for [`IntervalMap`]
//!
//! The semantics of an interval -- which keys it contains, and when two intervals are close enough
//! together to be merged -- are provided by the [`IntervalTraits`] policy. There are two built-in
//! policies: [`Closed`] (the default) and [`HalfOpen`], which can be used like:
//!
//! ```
//! use redwood::param::HalfOpen;
//! use redwood::{Allocator, IntervalMap};
//!
//! type MyMap<'a, V> = IntervalMap<'a, u64, V, 8, HalfOpen>;
//!
//! let alloc = Allocator::new();
//! let mut map: MyMap<char> = IntervalMap::new(&alloc);
//! map.insert(0, 10, 'a');
//! map.insert(10, 20, 'a'); // touches the first interval, so the two are merged
//!
//! assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 20, 'a')]);
//! assert_eq!(map.get(20), char::default());
//! ```
//!
//! Unlike the policies themselves, the [`IntervalTraits`] trait *can* be implemented outside of
//! this crate, e.g. for keys that have a different notion of adjacency.
//!
//! [`IntervalMap`]: crate::IntervalMap

use crate::public_traits::Discrete;
use std::marker::PhantomData;

/// Marker type for closed intervals `[start, stop]` (*default*)
///
/// `[a, b]` is non-empty when `a <= b`, and is adjacent to `[c, d]` when `c` is the
/// [successor](Discrete::successor) of `b`.
pub struct Closed(PhantomData<()>);

/// Marker type for half-open intervals `[start, stop)`
///
/// `[a, b)` is non-empty when `a < b`, and is adjacent to `[c, d)` when `b == c`.
pub struct HalfOpen(PhantomData<()>);

/// The interval semantics used by every algorithm in an [`IntervalMap`]
///
/// All four predicates must be pure. The map assumes that they're consistent with a single total
/// order on keys; `start_less` in particular doubles as the "less than" of that order.
///
/// [`IntervalMap`]: crate::IntervalMap
pub trait IntervalTraits<K> {
    /// Returns `true` if `x` is strictly before an interval starting at `a`
    fn start_less(x: K, a: K) -> bool;

    /// Returns `true` if an interval ending at `b` is strictly before `x`
    fn stop_less(b: K, x: K) -> bool;

    /// Returns `true` if an interval ending at `a` and an interval starting at `b` touch, and
    /// should be merged if their values are the same
    fn adjacent(a: K, b: K) -> bool;

    /// Returns `true` if `(a, b)` is a valid, non-empty interval
    fn non_empty(a: K, b: K) -> bool;
}

impl<K: Discrete> IntervalTraits<K> for Closed {
    #[inline]
    fn start_less(x: K, a: K) -> bool {
        x < a
    }

    #[inline]
    fn stop_less(b: K, x: K) -> bool {
        b < x
    }

    #[inline]
    fn adjacent(a: K, b: K) -> bool {
        a.successor() == Some(b)
    }

    #[inline]
    fn non_empty(a: K, b: K) -> bool {
        a <= b
    }
}

impl<K: Copy + Ord> IntervalTraits<K> for HalfOpen {
    #[inline]
    fn start_less(x: K, a: K) -> bool {
        x < a
    }

    #[inline]
    fn stop_less(b: K, x: K) -> bool {
        b <= x
    }

    #[inline]
    fn adjacent(a: K, b: K) -> bool {
        a == b
    }

    #[inline]
    fn non_empty(a: K, b: K) -> bool {
        a < b
    }
}

/// (*Internal*) Key equality, expressed only in terms of the policy
///
/// `start_less` is a strict ordering for both built-in policies, so two keys are equal when neither
/// is before the other.
#[cfg(any(test, feature = "fuzz"))]
pub(crate) fn keys_equal<K: Copy, T: IntervalTraits<K>>(a: K, b: K) -> bool {
    !T::start_less(a, b) && !T::start_less(b, a)
}

#[cfg(test)]
mod tests {
    use super::{Closed, HalfOpen, IntervalTraits};

    #[test]
    fn closed_predicates() {
        assert!(<Closed as IntervalTraits<u32>>::non_empty(5, 5));
        assert!(!<Closed as IntervalTraits<u32>>::non_empty(6, 5));
        assert!(<Closed as IntervalTraits<u32>>::adjacent(5, 6));
        assert!(!<Closed as IntervalTraits<u32>>::adjacent(5, 5));
        assert!(!<Closed as IntervalTraits<u8>>::adjacent(u8::MAX, 0));
        assert!(<Closed as IntervalTraits<u32>>::stop_less(5, 6));
        assert!(!<Closed as IntervalTraits<u32>>::stop_less(6, 6));
    }

    #[test]
    fn half_open_predicates() {
        assert!(!<HalfOpen as IntervalTraits<u32>>::non_empty(5, 5));
        assert!(<HalfOpen as IntervalTraits<u32>>::non_empty(5, 6));
        assert!(<HalfOpen as IntervalTraits<u32>>::adjacent(5, 5));
        assert!(!<HalfOpen as IntervalTraits<u32>>::adjacent(5, 6));
        // [_, 6) ends before 6 starts
        assert!(<HalfOpen as IntervalTraits<u32>>::stop_less(6, 6));
        assert!(!<HalfOpen as IntervalTraits<u32>>::start_less(6, 6));
    }
}
