//! Various collections of unit tests
//!
//! Most of the confidence in the map comes from comparing it against [`Mock`] -- either with the
//! fuzz targets, or with the seeded random walks here. Anything interesting that turns up is
//! written down as a unit test.
//!
//! [`Mock`]: crate::mock::Mock

/// Short regression cases, mostly in the format printed by the `closed_u8` fuzz target
mod basic;
/// Manually-written test cases
mod manual;
/// Seeded random operations, checked against the mock after every step
mod random;
