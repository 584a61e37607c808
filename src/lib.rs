//! # Redwood -- a coalescing interval map
//!
//! Plenty of the bookkeeping in an editor comes down to "which value applies to this key": syntax
//! highlighting over byte offsets, folded regions over line numbers, and so on. Usually, most of
//! the keys in long runs share the same value, and only the boundaries between runs matter. This
//! crate exports a single map type -- [`IntervalMap`] -- built for exactly that.
//!
//! ### Notable features
//!
//! * Keys are grouped into disjoint intervals `[start, stop]`, each mapped to a single value
//! * Intervals are always *coalesced*: two neighboring intervals that touch and have the same value
//!     are stored as one, so the representation of a given mapping is unique
//! * Interval semantics are a type parameter -- closed intervals by default, or half-open
//!     intervals with [`param::HalfOpen`]
//! * Small maps are stored inline, with no allocation at all. Larger maps grow into a B+ tree whose
//!     nodes are sized to a handful of cache lines, and come from an [`Allocator`] that can be
//!     shared (and recycled) between many maps
//! * Cursors -- [`Cursor`] and [`CursorMut`] -- can move around the map and search forward from
//!     where they are, and mutable cursors can change intervals in place
//! * [`Overlaps`] walks the places where two maps overlap, in a single ordered pass
//!
//! ### Usage
//!
//! ```
//! use redwood::{Allocator, IntervalMap};
//!
//! let alloc = Allocator::new();
//! let mut map: IntervalMap<u32, char> = IntervalMap::new(&alloc);
//!
//! map.insert(0, 9, 'a');
//! map.insert(20, 29, 'b');
//! map.insert(10, 19, 'a'); // merged into [0, 19]
//!
//! assert_eq!(map.lookup(15, '?'), 'a');
//! assert_eq!(map.lookup(30, '?'), '?');
//! assert_eq!(map.iter().count(), 2);
//! ```
//!
//! ### Feature flags
//!
//! There is currently just one feature flag -- `fuzz`. It exposes the map's internal consistency
//! checks and a slow, obviously-correct reference implementation ([`mock::Mock`]), both for use by
//! the fuzzing harness in this repository.
//!
//! ### Naming
//!
//! This library is named after the coast redwoods of Northern California, the tallest trees on
//! Earth. A tall tree is a good tree, so long as it's not too tall.

#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub mod param;

#[cfg(any(test, feature = "fuzz"))]
pub mod mock;
mod public_traits;
mod recycle;
mod tree;

pub use public_traits::{Discrete, Key, Value};
pub use recycle::Allocator;
pub use tree::{Cursor, CursorMut, IntervalMap, Iter, Overlaps, DEFAULT_ROOT_CAPACITY};
