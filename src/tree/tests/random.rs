use std::fmt::Debug;

use crate::mock::Mock;
use crate::param::{Closed, HalfOpen, IntervalTraits};
use crate::{Allocator, IntervalMap, Overlaps, Value};

/// Small xorshift generator, so that failures are reproducible from the seed alone
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn key(&mut self, max: u32) -> u32 {
        self.below(max as u64) as u32
    }

    /// A short interval starting somewhere below `max`. Might be empty, depending on the policy.
    fn interval(&mut self, max: u32) -> (u32, u32) {
        let a = self.key(max);
        (a, a + self.below(8) as u32)
    }
}

fn letter(n: u64) -> char {
    (b'a' + n as u8) as char
}

/// Runs `steps` random operations on both an `IntervalMap` and a [`Mock`], checking that they
/// always agree
fn exercise<V, T, const N: usize>(seed: u64, steps: usize, max_key: u32, value: fn(u64) -> V)
where
    V: Value + Debug,
    T: IntervalTraits<u32>,
{
    let mut rng = Rng(seed);
    let alloc = Allocator::new();
    let mut map: IntervalMap<u32, V, N, T> = IntervalMap::new(&alloc);
    let mut mock: Mock<u32, V, T> = Mock::new();

    for step in 0..steps {
        let len = mock.entries().len();
        match rng.below(10) {
            0..=3 => {
                let (a, b) = rng.interval(max_key);
                let y = value(rng.below(3));
                if !mock.can_insert(a, b) {
                    continue;
                }
                let i = mock.insert(a, b, y);
                match rng.below(2) {
                    0 => map.insert(a, b, y),
                    _ => {
                        let mut cursor = map.find_mut(a);
                        cursor.insert(a, b, y);
                        assert_eq!(cursor.entry(), mock.entries()[i], "step {step}");
                    }
                }
            }
            4 | 5 if len != 0 => {
                let i = rng.below(len as u64) as usize;
                let key = mock.entries()[i].0;
                mock.erase(i);
                let mut cursor = map.find_mut(key);
                cursor.erase();
                assert_eq!(cursor.valid().then(|| cursor.entry()), mock.entries().get(i).copied());
            }
            6 if len != 0 => {
                let i = rng.below(len as u64) as usize;
                let (key, stop, _) = mock.entries()[i];
                let start = stop.saturating_sub(rng.below(12) as u32);
                if !mock.can_set_start(i, start) {
                    continue;
                }
                let j = mock.set_start(i, start);
                let mut cursor = map.find_mut(key);
                cursor.set_start(start);
                assert_eq!(cursor.entry(), mock.entries()[j], "step {step}");
            }
            7 if len != 0 => {
                let i = rng.below(len as u64) as usize;
                let (key, _, _) = mock.entries()[i];
                let stop = key + rng.below(12) as u32;
                if !mock.can_set_stop(i, stop) {
                    continue;
                }
                let j = mock.set_stop(i, stop);
                let mut cursor = map.find_mut(key);
                cursor.set_stop(stop);
                assert_eq!(cursor.entry(), mock.entries()[j], "step {step}");
            }
            8 if len != 0 => {
                let i = rng.below(len as u64) as usize;
                let key = mock.entries()[i].0;
                let y = value(rng.below(3));
                let j = mock.set_value(i, y);
                let mut cursor = map.find_mut(key);
                cursor.set_value(y);
                assert_eq!(cursor.entry(), mock.entries()[j], "step {step}");
            }
            _ if rng.below(150) == 0 => {
                match rng.below(2) {
                    0 => map = map.clone(),
                    _ => {
                        map.clear();
                        mock.clear();
                    }
                }
            }
            _ => (),
        }

        map.validate();
        assert_eq!(map.iter().collect::<Vec<_>>(), mock.entries(), "step {step}");

        let x = rng.key(max_key + 10);
        assert_eq!(map.get(x), mock.lookup(x, V::default()), "step {step}, key {x}");

        let (a, b) = rng.interval(max_key);
        if T::non_empty(a, b) {
            assert_eq!(map.overlaps(a, b), mock.overlaps(a, b), "step {step}, [{a}, {b}]");
        }

        let (from, to) = (rng.key(max_key), rng.key(max_key + 10));
        if from <= to {
            let mut cursor = map.find(from);
            cursor.advance_to(to);
            let expected = mock.entries().get(mock.find(to)).copied();
            assert_eq!(cursor.valid().then(|| cursor.entry()), expected, "step {step}");
        }
    }

    drop(map);
    assert_eq!(alloc.live_leaves(), 0);
    assert_eq!(alloc.live_branches(), 0);
}

/// Builds two random maps and checks that [`Overlaps`] finds exactly the overlapping pairs
fn overlaps_match<T: IntervalTraits<u32>>(seed: u64, intervals: usize, max_key: u32) {
    let mut rng = Rng(seed);
    let (alloc_a, alloc_b) = (Allocator::new(), Allocator::new());
    let mut a: IntervalMap<u32, char, 2, T> = IntervalMap::new(&alloc_a);
    let mut b: IntervalMap<u32, bool, 3, T> = IntervalMap::new(&alloc_b);
    let mut mock_a: Mock<u32, char, T> = Mock::new();
    let mut mock_b: Mock<u32, bool, T> = Mock::new();

    for _ in 0..intervals {
        let (start, stop) = rng.interval(max_key);
        let y = letter(rng.below(2));
        if mock_a.can_insert(start, stop) {
            mock_a.insert(start, stop, y);
            a.insert(start, stop, y);
        }

        let (start, stop) = rng.interval(max_key);
        let y = rng.below(2) == 0;
        if mock_b.can_insert(start, stop) {
            mock_b.insert(start, stop, y);
            b.insert(start, stop, y);
        }
    }

    let expected: Vec<_> = mock_a
        .overlapping_pairs(&mock_b)
        .into_iter()
        .map(|(i, j)| (mock_a.entries()[i], mock_b.entries()[j]))
        .collect();

    let mut found = Vec::new();
    let mut overlaps = Overlaps::new(&a, &b);
    while overlaps.valid() {
        let (x, y) = (overlaps.a().entry(), overlaps.b().entry());
        assert_eq!(overlaps.start(), x.0.max(y.0));
        assert_eq!(overlaps.stop(), x.1.min(y.1));
        found.push((x, y));
        overlaps.advance();
    }
    assert_eq!(found, expected);

    // Jumping ahead lands on the first pair that's still relevant
    let target = max_key / 2;
    let mut overlaps = Overlaps::new(&a, &b);
    overlaps.advance_to(target);
    let expected_after = expected
        .iter()
        .find(|(x, y)| !T::stop_less(x.1, target) && !T::stop_less(y.1, target))
        .copied();
    assert_eq!(overlaps.valid().then(|| (overlaps.a().entry(), overlaps.b().entry())), expected_after);
}

#[test]
fn closed_chars() {
    exercise::<char, Closed, 4>(0x2545_f491_4f6c_dd1d, 4000, 400, letter);
}

#[test]
fn half_open_chars() {
    exercise::<char, HalfOpen, 4>(0x9e37_79b9_7f4a_7c15, 4000, 400, letter);
}

#[test]
fn closed_root_capacity_1() {
    exercise::<u32, Closed, 1>(0xdead_beef_cafe_f00d, 4000, 600, |n| n as u32);
}

#[test]
fn tall_tree_with_large_values() {
    exercise::<[u64; 8], HalfOpen, 1>(0x1234_5678_9abc_def1, 3000, 800, |n| [n; 8]);
}

#[test]
fn overlaps_closed() {
    for seed in 1..20 {
        overlaps_match::<Closed>(seed * 0x9e37_79b9, 120, 600);
    }
}

#[test]
fn overlaps_half_open() {
    for seed in 1..20 {
        overlaps_match::<HalfOpen>(seed * 0x2545_f491, 120, 600);
    }
}
