//! Public-facing traits for the keys and values of an [`IntervalMap`](crate::IntervalMap)

/// Blanket trait for types that can be used as the endpoints of intervals in an [`IntervalMap`]
///
/// Keys are stored by value in fixed-capacity node arrays, which is why `Copy` and `Default` are
/// required: unused slots are filled with `K::default()`. Ordering is deliberately *not* part of
/// this trait; every comparison goes through the map's [`IntervalTraits`] policy instead.
///
/// An implementation of this trait is already provided for types that implement the component
/// supertraits.
///
/// [`IntervalMap`]: crate::IntervalMap
/// [`IntervalTraits`]: crate::param::IntervalTraits
pub trait Key: Copy + Default {}

impl<K: Copy + Default> Key for K {}

/// Blanket trait for types that can be stored as values in an [`IntervalMap`]
///
/// Adjacent intervals are merged exactly when their values compare equal with `PartialEq`, so
/// the equality here should be the one you want coalescing to use. `V::default()` is the value
/// returned by [`IntervalMap::get`] for keys that aren't covered by any interval.
///
/// [`IntervalMap`]: crate::IntervalMap
/// [`IntervalMap::get`]: crate::IntervalMap::get
pub trait Value: Copy + Default + PartialEq {}

impl<V: Copy + Default + PartialEq> Value for V {}

/// Keys with a well-defined "next" value, required for closed intervals
///
/// Two closed intervals `[a, b]` and `[c, d]` touch when there's nothing between `b` and `c`,
/// i.e. when `c` is the successor of `b`. Half-open intervals don't need this, because `[a, b)`
/// and `[b, c)` touch exactly when the endpoints are equal.
///
/// Implementations are provided for all of the primitive integer types and `char`.
pub trait Discrete: Copy + Ord {
    /// Returns the smallest value greater than `self`, or `None` if `self` is the maximum value
    fn successor(self) -> Option<Self>;
}

macro_rules! impl_discrete {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Discrete for $ty {
                #[inline]
                fn successor(self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

impl_discrete!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl Discrete for char {
    fn successor(self) -> Option<Self> {
        match self {
            // skip over the surrogate range, which isn't valid for `char`
            '\u{D7FF}' => Some('\u{E000}'),
            c => char::from_u32(c as u32 + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Discrete;

    #[test]
    fn integer_successors() {
        assert_eq!(3_u8.successor(), Some(4));
        assert_eq!(u8::MAX.successor(), None);
        assert_eq!((-1_i32).successor(), Some(0));
        assert_eq!(i64::MAX.successor(), None);
    }

    #[test]
    fn char_successors() {
        assert_eq!('a'.successor(), Some('b'));
        assert_eq!('\u{D7FF}'.successor(), Some('\u{E000}'));
        assert_eq!(char::MAX.successor(), None);
    }
}
