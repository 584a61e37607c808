use crate::{Allocator, IntervalMap};

type FuzzMap<'a> = IntervalMap<'a, u8, char, 4>;

#[test]
fn branch_then_merge_both_sides() {
    let alloc = Allocator::new();
    let mut map: FuzzMap = IntervalMap::new(&alloc);
    map.insert(0, 1, 'A');
    map.insert(10, 11, 'A');
    map.insert(20, 21, 'B');
    map.insert(30, 31, 'A');
    map.insert(40, 41, 'C');
    {
        let mut cursor = map.find_mut(2);
        cursor.insert(2, 9, 'A');
        assert_eq!(cursor.entry(), (0, 11, 'A'));
    }
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 11, 'A'), (20, 21, 'B'), (30, 31, 'A'), (40, 41, 'C')]);
    assert_eq!(map.iter().rev().collect::<Vec<_>>(), [(40, 41, 'C'), (30, 31, 'A'), (20, 21, 'B'), (0, 11, 'A')]);
}

#[test]
fn erase_first_and_last_of_branched_root() {
    let alloc = Allocator::new();
    let mut map: FuzzMap = IntervalMap::new(&alloc);
    map.insert(0, 1, 'A');
    map.insert(3, 4, 'B');
    map.insert(6, 7, 'A');
    map.insert(9, 10, 'B');
    map.insert(12, 13, 'A');
    {
        let mut cursor = map.find_mut(0);
        cursor.erase();
        assert_eq!(cursor.valid().then(|| cursor.entry()), Some((3, 4, 'B')));
    }
    {
        let mut cursor = map.find_mut(12);
        cursor.erase();
        assert_eq!(cursor.valid().then(|| cursor.entry()), None);
    }
    assert_eq!(map.get(0), '\0');
    assert_eq!(map.get(3), 'B');
    assert_eq!(map.get(12), '\0');
    assert_eq!(map.iter().collect::<Vec<_>>(), [(3, 4, 'B'), (6, 7, 'A'), (9, 10, 'B')]);
}

#[test]
fn setters_then_advance() {
    let alloc = Allocator::new();
    let mut map: FuzzMap = IntervalMap::new(&alloc);
    map.insert(0, 4, 'A');
    map.insert(10, 14, 'B');
    map.insert(20, 24, 'B');
    {
        let mut cursor = map.find_mut(10);
        cursor.set_stop(19);
        assert_eq!(cursor.entry(), (10, 24, 'B'));
    }
    {
        let mut cursor = map.find(0);
        cursor.advance_to(25);
        assert_eq!(cursor.valid().then(|| cursor.entry()), None);
    }
    {
        let mut cursor = map.find(0);
        cursor.advance_to(5);
        assert_eq!(cursor.valid().then(|| cursor.entry()), Some((10, 24, 'B')));
    }
    {
        let mut cursor = map.find_mut(10);
        cursor.set_start(5);
        assert_eq!(cursor.entry(), (5, 24, 'B'));
    }
    {
        let mut cursor = map.find_mut(5);
        cursor.set_value('A');
        assert_eq!(cursor.entry(), (0, 24, 'A'));
    }
    assert!(!map.overlaps(25, 30));
    assert!(map.overlaps(24, 30));
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 24, 'A')]);
}

#[test]
fn clone_then_clear() {
    let alloc = Allocator::new();
    let mut map: FuzzMap = IntervalMap::new(&alloc);
    map.insert(50, 60, 'C');
    map.insert(0, 9, 'A');
    map.insert(20, 29, 'B');
    map.insert(70, 79, 'C');
    map.insert(90, 99, 'A');
    map.insert(61, 69, 'C');
    map = map.clone();
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 9, 'A'), (20, 29, 'B'), (50, 79, 'C'), (90, 99, 'A')]);
    map.clear();
    assert!(map.iter().next().is_none());
    map.insert(5, 5, 'B');
    assert_eq!(map.get(5), 'B');
    assert_eq!(map.get(50), '\0');
}

#[test]
fn keys_at_the_limit() {
    let alloc = Allocator::new();
    let mut map: FuzzMap = IntervalMap::new(&alloc);
    map.insert(250, 255, 'A');
    map.insert(0, 0, 'A');
    assert_eq!(map.get(255), 'A');
    map.insert(249, 249, 'A');
    assert_eq!(map.iter().rev().collect::<Vec<_>>(), [(249, 255, 'A'), (0, 0, 'A')]);
    {
        let mut cursor = map.find(0);
        cursor.advance_to(255);
        assert_eq!(cursor.valid().then(|| cursor.entry()), Some((249, 255, 'A')));
    }
    assert!(map.overlaps(255, 255));
    assert!(!map.overlaps(1, 248));
}

// Large values leave room for only three entries per leaf, so four intervals are enough to put a
// leaf boundary between the second and third.
type TallMap<'a> = IntervalMap<'a, u32, [u64; 8], 1>;

fn split_leaves(alloc: &Allocator<u32, [u64; 8]>) -> TallMap<'_> {
    let mut map: TallMap = IntervalMap::new(alloc);
    map.insert(0, 1, [1; 8]);
    map.insert(10, 11, [1; 8]);
    map.insert(20, 21, [1; 8]);
    map.insert(30, 31, [1; 8]);
    map.validate();
    assert!(map.height() >= 1);
    map
}

#[test]
fn grow_left_sibling_across_leaves() {
    let alloc = Allocator::new();
    let mut map = split_leaves(&alloc);
    {
        let mut cursor = map.find_mut(12);
        cursor.insert(12, 15, [1; 8]);
        assert_eq!(cursor.entry(), (10, 15, [1; 8]));
    }
    map.validate();
    assert_eq!(
        map.iter().map(|(a, b, _)| (a, b)).collect::<Vec<_>>(),
        [(0, 1), (10, 15), (20, 21), (30, 31)]
    );

    // Now the gap closes on both sides.
    {
        let mut cursor = map.find_mut(16);
        cursor.insert(16, 19, [1; 8]);
        assert_eq!(cursor.entry(), (10, 21, [1; 8]));
    }
    map.validate();
    assert_eq!(
        map.iter().map(|(a, b, _)| (a, b)).collect::<Vec<_>>(),
        [(0, 1), (10, 21), (30, 31)]
    );
    assert_eq!(map.get(18), [1; 8]);
}

#[test]
fn fill_gap_between_leaves() {
    let alloc = Allocator::new();
    let mut map = split_leaves(&alloc);
    map.insert(12, 19, [1; 8]);
    map.validate();
    assert_eq!(map.iter().map(|(a, b, _)| (a, b)).collect::<Vec<_>>(), [(0, 1), (10, 21), (30, 31)]);

    // A different value touches both neighbors without merging.
    map.insert(2, 9, [2; 8]);
    map.validate();
    assert_eq!(map.iter().count(), 4);
    assert_eq!(map.get(5), [2; 8]);
}
