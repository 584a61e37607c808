use crate::param::{Closed, HalfOpen};
use crate::{Allocator, IntervalMap, Overlaps};

type SmallMap<'a, V = u32, T = Closed> = IntervalMap<'a, u32, V, 4, T>;

#[test]
fn empty_map() {
    let alloc = Allocator::new();
    let map: SmallMap = IntervalMap::new(&alloc);
    map.validate();

    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(map.lookup(10, 7), 7);
    assert_eq!(map.get(10), 0);
    assert!(map.begin() == map.end());
    assert!(!map.begin().valid());
    assert!(!map.find(0).valid());
    assert!(!map.overlaps(0, 100));
    assert!(map.iter().next().is_none());
    assert!(map.iter().next_back().is_none());
}

#[test]
fn single_interval() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    map.insert(100, 150, 1);
    map.validate();

    assert_eq!(map.get(99), 0);
    assert_eq!(map.get(100), 1);
    assert_eq!(map.get(125), 1);
    assert_eq!(map.get(150), 1);
    assert_eq!(map.get(151), 0);
    assert_eq!((map.start(), map.stop()), (100, 150));

    {
        let cursor = map.begin();
        assert!(cursor.at_begin());
        assert_eq!(cursor.entry(), (100, 150, 1));
    }

    {
        let mut cursor = map.begin_mut();
        cursor.set_start(0);
        cursor.set_stop(200);
        assert_eq!(cursor.entry(), (0, 200, 1));
    }
    map.validate();
    assert_eq!((map.start(), map.stop()), (0, 200));

    {
        let mut cursor = map.begin_mut();
        cursor.erase();
        assert!(!cursor.valid());
    }
    assert!(map.is_empty());
    map.validate();
}

#[test]
fn insert_coalesces() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    map.insert(100, 150, 1);
    map.insert(90, 99, 1);
    map.insert(151, 200, 1);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(90, 200, 1)]);

    // Same value, but not touching
    map.insert(60, 88, 1);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(60, 88, 1), (90, 200, 1)]);
    map.begin_mut().erase();

    map.insert(60, 89, 2);
    assert_eq!(map.get(89), 2);
    assert_eq!(map.get(90), 1);

    map.insert(201, 210, 3);
    map.insert(211, 220, 1);
    {
        let mut cursor = map.find_mut(205);
        cursor.set_value(1);
        assert_eq!(cursor.entry(), (90, 220, 1));
    }
    map.validate();
    assert_eq!(map.iter().collect::<Vec<_>>(), [(60, 89, 2), (90, 220, 1)]);
}

#[test]
fn branching() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 1..100 {
        map.insert(10 * i, 10 * i + 5, i);
    }
    map.validate();
    assert!(map.height() > 0);
    assert!(alloc.live_leaves() > 1);

    let expected: Vec<_> = (1..100).map(|i| (10 * i, 10 * i + 5, i)).collect();
    assert_eq!(map.iter().collect::<Vec<_>>(), expected);
    let backwards: Vec<_> = expected.iter().rev().copied().collect();
    assert_eq!(map.iter().rev().collect::<Vec<_>>(), backwards);

    for i in 1..100 {
        assert_eq!(map.get(10 * i - 1), 0);
        assert_eq!(map.get(10 * i), i);
        assert_eq!(map.get(10 * i + 5), i);
        assert_eq!(map.get(10 * i + 6), 0);
    }
    assert_eq!((map.start(), map.stop()), (10, 995));
}

#[test]
fn iterating_from_both_ends() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 0..60 {
        map.insert(4 * i, 4 * i + 1, i);
    }

    let mut iter = map.iter();
    assert_eq!(iter.next(), Some((0, 1, 0)));
    assert_eq!(iter.next_back(), Some((236, 237, 59)));
    assert_eq!(iter.by_ref().count(), 58);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
}

#[test]
fn random_order_tiling() {
    let alloc = Allocator::new();
    let mut map: SmallMap<u8> = IntervalMap::new(&alloc);
    for i in 0..500 {
        let x = (i * 263) % 500;
        map.insert(10 * x, 10 * x + 9, 1);
        map.validate();
    }
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 4999, 1)]);

    let alloc = Allocator::new();
    let mut map: SmallMap<u8, HalfOpen> = IntervalMap::new(&alloc);
    for i in 0..500 {
        let x = (i * 263) % 500;
        map.insert(10 * x, 10 * x + 10, 1);
        map.validate();
    }
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 5000, 1)]);
}

#[test]
fn erase_everything() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 0..200 {
        map.insert(3 * i, 3 * i + 1, i % 7);
    }
    assert!(map.height() > 0);

    let mut remaining = 200;
    while !map.is_empty() {
        {
            let mut cursor = map.begin_mut();
            cursor.erase();
            remaining -= 1;
            assert_eq!(cursor.valid(), remaining != 0);
        }
        map.validate();
    }

    assert_eq!(remaining, 0);
    assert_eq!(map.height(), 0);
    assert_eq!(alloc.live_leaves(), 0);
    assert_eq!(alloc.live_branches(), 0);
    assert!(alloc.recycled() > 0);
}

#[test]
fn nodes_are_recycled_between_maps() {
    let alloc = Allocator::new();
    {
        let mut map: SmallMap = IntervalMap::new(&alloc);
        for i in 0..100 {
            map.insert(3 * i, 3 * i + 1, i);
        }
    }
    let recycled = alloc.recycled();
    assert_eq!(alloc.live_leaves(), 0);
    assert!(recycled > 0);

    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 0..100 {
        map.insert(3 * i, 3 * i + 1, i);
    }
    // Building the same map again doesn't need any new nodes
    assert_eq!(alloc.recycled() + alloc.live_leaves() + alloc.live_branches(), recycled);

    map.clear();
    assert!(map.is_empty());
    assert_eq!(alloc.recycled(), recycled);
}

#[test]
fn setters_merge() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char> = IntervalMap::new(&alloc);
    map.insert(0, 9, 'a');
    map.insert(20, 29, 'a');
    map.insert(40, 49, 'b');

    {
        let mut cursor = map.find_mut(20);
        cursor.set_start(10);
        assert_eq!(cursor.entry(), (0, 29, 'a'));
        cursor.set_stop(39);
        assert_eq!(cursor.entry(), (0, 39, 'a'));
        cursor.set_value('b');
        assert_eq!(cursor.entry(), (0, 49, 'b'));
    }

    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 49, 'b')]);
    map.validate();
}

#[test]
fn setters_shrink() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char> = IntervalMap::new(&alloc);
    map.insert(0, 9, 'a');
    map.insert(10, 19, 'b');
    map.insert(20, 29, 'a');

    {
        let mut cursor = map.find_mut(10);
        cursor.set_start(12);
        cursor.set_stop(17);
        assert_eq!(cursor.entry(), (12, 17, 'b'));
        // Same value as both neighbors, but no longer touching either of them
        cursor.set_value('a');
        assert_eq!(cursor.entry(), (12, 17, 'a'));
    }

    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 9, 'a'), (12, 17, 'a'), (20, 29, 'a')]);
    map.validate();
}

#[test]
fn unchecked_setters_skip_merging() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char> = IntervalMap::new(&alloc);
    map.insert(0, 9, 'a');
    map.insert(10, 19, 'b');
    map.insert(30, 39, 'c');

    {
        let mut cursor = map.find_mut(10);
        cursor.set_value_unchecked('c');
        cursor.set_stop_unchecked(25);
        cursor.set_start_unchecked(11);
        assert_eq!(cursor.entry(), (11, 25, 'c'));
    }

    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 9, 'a'), (11, 25, 'c'), (30, 39, 'c')]);
    map.validate();
}

#[test]
fn setting_start_of_branched_map() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 1..50 {
        map.insert(10 * i, 10 * i + 5, i);
    }
    assert!(map.height() > 0);

    map.begin_mut().set_start(0);
    assert_eq!(map.start(), 0);
    assert_eq!(map.get(0), 1);
    map.validate();

    map.end_mut().insert(1000, 1010, 49);
    assert_eq!(map.stop(), 1010);
    map.find_mut(1000).set_start(496);
    assert_eq!(map.iter().next_back(), Some((490, 1010, 49)));
    map.validate();
}

#[test]
fn half_open_intervals() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char, HalfOpen> = IntervalMap::new(&alloc);
    map.insert(0, 10, 'a');
    map.insert(10, 20, 'a');
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 20, 'a')]);
    assert_eq!(map.get(19), 'a');
    assert_eq!(map.get(20), '\0');

    map.insert(20, 30, 'b');
    assert_eq!(map.get(20), 'b');
    assert!(map.overlaps(29, 40));
    assert!(!map.overlaps(30, 40));
    assert_eq!(map.find(20).entry(), (20, 30, 'b'));
    map.validate();
}

#[test]
fn overlaps_of_disjoint_maps() {
    let (alloc_a, alloc_b) = (Allocator::new(), Allocator::new());
    let mut a: SmallMap<char> = IntervalMap::new(&alloc_a);
    let mut b: SmallMap<u8> = IntervalMap::new(&alloc_b);
    a.insert(0, 9, 'x');
    a.insert(20, 29, 'y');
    b.insert(10, 19, 1);
    b.insert(30, 39, 2);

    assert!(!Overlaps::new(&a, &b).valid());
    assert!(!Overlaps::new(&b, &a).valid());

    let empty: SmallMap<u8> = IntervalMap::new(&alloc_b);
    assert!(!Overlaps::new(&a, &empty).valid());
    assert!(!Overlaps::new(&empty, &a).valid());
}

#[test]
fn overlaps_in_order() {
    let (alloc_a, alloc_b) = (Allocator::new(), Allocator::new());
    let mut a: SmallMap<char> = IntervalMap::new(&alloc_a);
    let mut b: SmallMap<u8> = IntervalMap::new(&alloc_b);
    a.insert(0, 10, 'x');
    a.insert(20, 30, 'y');
    a.insert(40, 50, 'z');
    b.insert(5, 25, 1);
    b.insert(28, 45, 2);

    let mut found = Vec::new();
    let mut overlaps = Overlaps::new(&a, &b);
    while overlaps.valid() {
        found.push((overlaps.start(), overlaps.stop(), overlaps.a().value(), overlaps.b().value()));
        overlaps.advance();
    }
    assert_eq!(found, [(5, 10, 'x', 1), (20, 25, 'y', 1), (28, 30, 'y', 2), (40, 45, 'z', 2)]);

    let mut overlaps = Overlaps::new(&a, &b);
    overlaps.advance_to(26);
    assert_eq!((overlaps.start(), overlaps.stop()), (28, 30));
    assert_eq!(overlaps.a().entry(), (20, 30, 'y'));
    assert_eq!(overlaps.b().entry(), (28, 45, 2));

    // Never moves backwards
    overlaps.advance_to(0);
    assert_eq!((overlaps.start(), overlaps.stop()), (28, 30));

    overlaps.skip_a();
    assert_eq!((overlaps.start(), overlaps.stop()), (40, 45));
    overlaps.skip_b();
    assert!(!overlaps.valid());
}

#[test]
fn clones_are_independent() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 0..50 {
        map.insert(10 * i, 10 * i + 5, i % 3);
    }

    let mut copy = map.clone();
    copy.validate();
    assert_eq!(copy.iter().collect::<Vec<_>>(), map.iter().collect::<Vec<_>>());

    copy.insert(6, 9, 0);
    copy.find_mut(100).erase();
    assert_eq!(copy.lookup(7, 99), 0);
    assert_eq!(copy.lookup(100, 99), 99);
    assert_eq!(map.get(100), 1);
    assert_eq!(map.iter().count(), 50);
    map.validate();
    copy.validate();

    drop(map);
    assert_eq!(copy.iter().count(), 49);
}

#[test]
fn advance_to() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    for i in 0..200 {
        map.insert(10 * i, 10 * i + 5, i);
    }

    let mut cursor = map.find(0);
    assert_eq!(cursor.entry(), (0, 5, 0));
    cursor.advance_to(1000);
    assert_eq!(cursor.start(), 1000);
    cursor.advance_to(500);
    assert_eq!(cursor.start(), 1000);
    cursor.advance_to(1004);
    assert_eq!(cursor.start(), 1000);
    cursor.advance_to(1006);
    assert_eq!(cursor.entry(), (1010, 1015, 101));
    cursor.advance_to(1990);
    assert_eq!(cursor.entry(), (1990, 1995, 199));
    cursor.advance_to(5000);
    assert!(!cursor.valid());
}

#[test]
fn tall_tree_with_large_values() {
    // With values this large, leaves only hold a few entries each
    let alloc = Allocator::new();
    let mut map: IntervalMap<u32, [u64; 8], 1> = IntervalMap::new(&alloc);

    for i in 0..300 {
        let x = (i * 7) % 300;
        map.insert(3 * x, 3 * x + 1, [x as u64; 8]);
        map.validate();
    }
    assert!(map.height() >= 3);
    for x in 0..300 {
        assert_eq!(map.get(3 * x + 1), [x as u64; 8]);
        assert_eq!(map.get(3 * x + 2), [0; 8]);
    }

    for i in 0..300 {
        let x = (i * 11) % 300;
        {
            let mut cursor = map.find_mut(3 * x);
            assert_eq!(cursor.start(), 3 * x);
            cursor.erase();
        }
        map.validate();
    }

    assert!(map.is_empty());
    assert_eq!(alloc.live_leaves(), 0);
    assert_eq!(alloc.live_branches(), 0);
}

#[test]
fn cursor_movement() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char> = IntervalMap::new(&alloc);
    map.insert(0, 1, 'a');
    map.insert(5, 6, 'b');
    map.insert(10, 11, 'c');

    {
        let mut cursor = map.end();
        cursor.move_prev();
        assert_eq!(cursor.entry(), (10, 11, 'c'));
        cursor.move_prev();
        cursor.move_prev();
        assert!(cursor.at_begin());
        assert!(cursor == map.begin());
        assert!(cursor != map.find(5));

        cursor.go_to_end();
        assert!(cursor == map.end());
        cursor.go_to_begin();
        cursor.move_next();
        assert!(cursor == map.find(2));
        cursor.find(11);
        assert_eq!(cursor.value(), 'c');
        cursor.find(12);
        assert!(!cursor.valid());
    }

    {
        let mut cursor = map.find_mut(3);
        assert_eq!(cursor.as_cursor().entry(), (5, 6, 'b'));
        cursor.move_next();
        cursor.erase();
        assert!(!cursor.valid());
    }
    assert_eq!(map.iter().collect::<Vec<_>>(), [(0, 1, 'a'), (5, 6, 'b')]);
}

#[test]
fn debug_format() {
    let alloc = Allocator::new();
    let mut map: SmallMap<char> = IntervalMap::new(&alloc);
    assert_eq!(format!("{map:?}"), "{}");
    map.insert(1, 2, 'a');
    map.insert(4, 4, 'b');
    assert_eq!(format!("{map:?}"), "{(1, 2): 'a', (4, 4): 'b'}");
    assert_eq!(format!("{:?}", map.begin()), "Cursor { entry: (1, 2, 'a') }");
}

#[test]
fn traced_branching() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);

    enable_debug!();
    for i in 0..5 {
        map.insert(2 * i, 2 * i, i);
    }
    disable_debug!();

    assert!(map.height() > 0);
    assert_eq!(map.iter().count(), 5);
    map.validate();
}

#[test]
fn advance_to_never_moves_back() {
    let alloc = Allocator::new();
    let mut map: SmallMap = IntervalMap::new(&alloc);
    map.insert(0, 5, 1);
    map.insert(10, 15, 2);

    let mut cursor = map.find(10);
    cursor.advance_to(3);
    assert_eq!(cursor.entry(), (10, 15, 2));
    cursor.advance_to(15);
    assert_eq!(cursor.entry(), (10, 15, 2));
    cursor.advance_to(16);
    assert!(!cursor.valid());
}
