use arbitrary::{Arbitrary, Unstructured};
use redwood::mock::{Mock, Span};
use redwood::param::IntervalTraits;
use redwood::{Allocator, IntervalMap, Key, Overlaps, Value};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

const VARIANTS: u8 = 11;

/// A single operation on the map under test, together with the result the mock produced for it
#[derive(Clone)]
pub enum Command<K, V> {
    Insert {
        start: K,
        stop: K,
        value: V,
        /// If the insertion goes through a cursor, the entry the cursor should end up at
        cursor: Option<(K, K, V)>,
    },
    Lookup {
        key: K,
        expected: V,
    },
    Overlaps {
        start: K,
        stop: K,
        expected: bool,
    },
    Erase {
        key: K,
        /// The entry following the erased one, if there is one
        next: Option<(K, K, V)>,
    },
    SetStart {
        key: K,
        start: K,
        result: (K, K, V),
    },
    SetStop {
        key: K,
        stop: K,
        result: (K, K, V),
    },
    SetValue {
        key: K,
        value: V,
        result: (K, K, V),
    },
    Iter {
        direction: IterDirection,
        expected: Vec<(K, K, V)>,
    },
    AdvanceTo {
        from: K,
        to: K,
        result: Option<(K, K, V)>,
    },
    Clear,
    Clone,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Arbitrary)]
pub enum IterDirection {
    Forward,
    Backward,
}

/// A value drawn from a deliberately tiny alphabet, so that neighboring intervals often end up
/// with the same value and coalesce
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Letter(pub char);

impl<'d> Arbitrary<'d> for Letter {
    fn arbitrary(u: &mut Unstructured<'d>) -> arbitrary::Result<Self> {
        Ok(Letter((b'A' + u.int_in_range(0_u8..=2)?) as char))
    }
}

impl Debug for Letter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

/// Sequence of [`Command`]s, generated by running them against a [`Mock`] with interval
/// semantics `T`
///
/// The `Debug` output is a complete unit test, ready to be pasted into the crate's tests.
pub struct CommandSequence<K, V, T> {
    pub cmds: Vec<Command<K, V>>,
    traits: PhantomData<fn() -> T>,
}

impl<K: Debug, V: Debug, T> Debug for CommandSequence<K, V, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("#[test]\n")?;
        f.write_str("fn test_case() {\n")?;
        f.write_str("    let alloc = Allocator::new();\n")?;
        f.write_str("    let mut map: FuzzMap = IntervalMap::new(&alloc);\n")?;
        for c in &self.cmds {
            c.fmt(f)?;
        }
        f.write_str("}")
    }
}

fn fmt_entry<K: Debug, V: Debug>(entry: &Option<(K, K, V)>) -> String {
    match entry {
        Some(e) => format!("Some({e:?})"),
        None => "None".to_owned(),
    }
}

impl<K: Debug, V: Debug> Debug for Command<K, V> {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Insert { start, stop, value, cursor: None } => {
                writeln!(f, "    map.insert({start:?}, {stop:?}, {value:?});")
            }
            Self::Insert { start, stop, value, cursor: Some(entry) } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find_mut({start:?});")?;
                writeln!(f, "        cursor.insert({start:?}, {stop:?}, {value:?});")?;
                writeln!(f, "        assert_eq!(cursor.entry(), {entry:?});")?;
                f.write_str("    }\n")
            }
            Self::Lookup { key, expected } => {
                writeln!(f, "    assert_eq!(map.get({key:?}), {expected:?});")
            }
            Self::Overlaps { start, stop, expected: true } => {
                writeln!(f, "    assert!(map.overlaps({start:?}, {stop:?}));")
            }
            Self::Overlaps { start, stop, expected: false } => {
                writeln!(f, "    assert!(!map.overlaps({start:?}, {stop:?}));")
            }
            Self::Erase { key, next } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find_mut({key:?});")?;
                f.write_str("        cursor.erase();\n")?;
                writeln!(f, "        assert_eq!(cursor.valid().then(|| cursor.entry()), {});", fmt_entry(next))?;
                f.write_str("    }\n")
            }
            Self::SetStart { key, start, result } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find_mut({key:?});")?;
                writeln!(f, "        cursor.set_start({start:?});")?;
                writeln!(f, "        assert_eq!(cursor.entry(), {result:?});")?;
                f.write_str("    }\n")
            }
            Self::SetStop { key, stop, result } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find_mut({key:?});")?;
                writeln!(f, "        cursor.set_stop({stop:?});")?;
                writeln!(f, "        assert_eq!(cursor.entry(), {result:?});")?;
                f.write_str("    }\n")
            }
            Self::SetValue { key, value, result } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find_mut({key:?});")?;
                writeln!(f, "        cursor.set_value({value:?});")?;
                writeln!(f, "        assert_eq!(cursor.entry(), {result:?});")?;
                f.write_str("    }\n")
            }
            Self::Iter { direction, expected } => {
                let rev = match direction {
                    IterDirection::Forward => "",
                    IterDirection::Backward => ".rev()",
                };
                match expected.is_empty() {
                    true => writeln!(f, "    assert!(map.iter(){rev}.next().is_none());"),
                    false => writeln!(f, "    assert_eq!(map.iter(){rev}.collect::<Vec<_>>(), {expected:?});"),
                }
            }
            Self::AdvanceTo { from, to, result } => {
                f.write_str("    {\n")?;
                writeln!(f, "        let mut cursor = map.find({from:?});")?;
                writeln!(f, "        cursor.advance_to({to:?});")?;
                writeln!(f, "        assert_eq!(cursor.valid().then(|| cursor.entry()), {});", fmt_entry(result))?;
                f.write_str("    }\n")
            }
            Self::Clear => f.write_str("    map.clear();\n"),
            Self::Clone => f.write_str("    map = map.clone();\n"),
        }
    }
}

impl<K, V, T> CommandSequence<K, V, T> {
    pub fn map<W, F: FnMut(Command<K, V>) -> Command<K, W>>(self, f: F) -> CommandSequence<K, W, T> {
        CommandSequence {
            cmds: self.cmds.into_iter().map(f).collect(),
            traits: PhantomData,
        }
    }
}

fn map_entry<K, V, W>((a, b, y): (K, K, V), f: &mut impl FnMut(V) -> W) -> (K, K, W) {
    (a, b, f(y))
}

impl<K, V> Command<K, V> {
    #[rustfmt::skip]
    pub fn map_value<W, F: FnMut(V) -> W>(self, mut f: F) -> Command<K, W> {
        match self {
            Self::Insert { start, stop, value, cursor } => Command::Insert {
                start,
                stop,
                value: f(value),
                cursor: cursor.map(|e| map_entry(e, &mut f)),
            },
            Self::Lookup { key, expected } => Command::Lookup { key, expected: f(expected) },
            Self::Overlaps { start, stop, expected } => Command::Overlaps { start, stop, expected },
            Self::Erase { key, next } => {
                Command::Erase { key, next: next.map(|e| map_entry(e, &mut f)) }
            }
            Self::SetStart { key, start, result } => {
                Command::SetStart { key, start, result: map_entry(result, &mut f) }
            }
            Self::SetStop { key, stop, result } => {
                Command::SetStop { key, stop, result: map_entry(result, &mut f) }
            }
            Self::SetValue { key, value, result } => {
                Command::SetValue { key, value: f(value), result: map_entry(result, &mut f) }
            }
            Self::Iter { direction, expected } => Command::Iter {
                direction,
                expected: expected.into_iter().map(|e| map_entry(e, &mut f)).collect(),
            },
            Self::AdvanceTo { from, to, result } => {
                Command::AdvanceTo { from, to, result: result.map(|e| map_entry(e, &mut f)) }
            }
            Self::Clear => Command::Clear,
            Self::Clone => Command::Clone,
        }
    }
}

impl<'d, K, V, T> Arbitrary<'d> for CommandSequence<K, V, T>
where
    K: Key + Ord + Arbitrary<'d>,
    V: Value + Arbitrary<'d>,
    T: IntervalTraits<K>,
{
    fn arbitrary(u: &mut Unstructured<'d>) -> arbitrary::Result<Self> {
        let mut cmds = Vec::new();
        let mut mock: Mock<K, V, T> = Mock::new();
        while !u.is_empty() {
            let variant = u.int_in_range(0..=VARIANTS - 1)?;
            // Commands that the mock says would be invalid are skipped entirely
            if let Some(cmd) = arbitrary_command(u, variant, &mut mock)? {
                cmds.push(cmd);
            }
        }
        Ok(CommandSequence { cmds, traits: PhantomData })
    }
}

/// Creates a new command and executes it on the mock, returning `None` if the generated command
/// wouldn't be valid
fn arbitrary_command<'d, K, V, T>(
    u: &mut Unstructured<'d>,
    variant: u8,
    mock: &mut Mock<K, V, T>,
) -> arbitrary::Result<Option<Command<K, V>>>
where
    K: Key + Ord + Arbitrary<'d>,
    V: Value + Arbitrary<'d>,
    T: IntervalTraits<K>,
{
    let cmd = match variant {
        // insert, directly or through a cursor
        0 | 1 => {
            let (start, stop) = u.arbitrary::<Span<K>>()?.sorted();
            let value: V = u.arbitrary()?;
            if !mock.can_insert(start, stop) {
                return Ok(None);
            }
            let idx = mock.insert(start, stop, value);
            let cursor = (variant == 1).then(|| mock.entries()[idx]);
            Command::Insert { start, stop, value, cursor }
        }
        // lookup
        2 => {
            let key: K = u.arbitrary()?;
            Command::Lookup { key, expected: mock.lookup(key, V::default()) }
        }
        // overlaps
        3 => {
            let (start, stop) = u.arbitrary::<Span<K>>()?.sorted();
            if !T::non_empty(start, stop) {
                return Ok(None);
            }
            Command::Overlaps { start, stop, expected: mock.overlaps(start, stop) }
        }
        // erase
        4 => {
            if mock.is_empty() {
                return Ok(None);
            }
            let i = u.int_in_range(0..=mock.entries().len() - 1)?;
            let key = mock.entries()[i].0;
            mock.erase(i);
            Command::Erase { key, next: mock.entries().get(i).copied() }
        }
        // set start
        5 => {
            if mock.is_empty() {
                return Ok(None);
            }
            let i = u.int_in_range(0..=mock.entries().len() - 1)?;
            let start: K = u.arbitrary()?;
            if !mock.can_set_start(i, start) {
                return Ok(None);
            }
            let key = mock.entries()[i].0;
            let idx = mock.set_start(i, start);
            Command::SetStart { key, start, result: mock.entries()[idx] }
        }
        // set stop
        6 => {
            if mock.is_empty() {
                return Ok(None);
            }
            let i = u.int_in_range(0..=mock.entries().len() - 1)?;
            let stop: K = u.arbitrary()?;
            if !mock.can_set_stop(i, stop) {
                return Ok(None);
            }
            let key = mock.entries()[i].0;
            let idx = mock.set_stop(i, stop);
            Command::SetStop { key, stop, result: mock.entries()[idx] }
        }
        // set value
        7 => {
            if mock.is_empty() {
                return Ok(None);
            }
            let i = u.int_in_range(0..=mock.entries().len() - 1)?;
            let value: V = u.arbitrary()?;
            let key = mock.entries()[i].0;
            let idx = mock.set_value(i, value);
            Command::SetValue { key, value, result: mock.entries()[idx] }
        }
        // iter
        8 => {
            let direction: IterDirection = u.arbitrary()?;
            let mut expected = mock.entries().to_vec();
            if direction == IterDirection::Backward {
                expected.reverse();
            }
            Command::Iter { direction, expected }
        }
        // advance_to
        9 => {
            let (from, to) = u.arbitrary::<Span<K>>()?.sorted();
            Command::AdvanceTo { from, to, result: mock.entries().get(mock.find(to)).copied() }
        }
        // clear or clone, rarely
        _ => match u.int_in_range(0_u8..=3)? == 0 {
            true => {
                mock.clear();
                Command::Clear
            }
            false => Command::Clone,
        },
    };

    Ok(Some(cmd))
}

/// Ongoing state for executing commands on an [`IntervalMap`]
pub struct RunnerState<'a, K, V, T, const N: usize>
where
    K: Key,
    V: Value,
    T: IntervalTraits<K>,
{
    map: IntervalMap<'a, K, V, N, T>,
}

impl<'a, K, V, T, const N: usize> RunnerState<'a, K, V, T, N>
where
    K: Key + Debug + PartialEq,
    V: Value + Debug,
    T: IntervalTraits<K>,
{
    /// Creates a new `RunnerState` with an empty map, allocating from `alloc`
    pub fn init(alloc: &'a Allocator<K, V>) -> Self {
        RunnerState { map: IntervalMap::new(alloc) }
    }

    /// Runs the command, panicking if the map's behavior doesn't match the expected result
    #[rustfmt::skip]
    pub fn run_cmd(&mut self, cmd: &Command<K, V>) {
        match cmd {
            Command::Insert { start, stop, value, cursor: None } => {
                self.map.insert(*start, *stop, *value);
            }
            Command::Insert { start, stop, value, cursor: Some(entry) } => {
                let mut cursor = self.map.find_mut(*start);
                cursor.insert(*start, *stop, *value);
                assert_eq!(&cursor.entry(), entry);
            }
            Command::Lookup { key, expected } => {
                assert_eq!(&self.map.get(*key), expected);
                return;
            }
            Command::Overlaps { start, stop, expected } => {
                assert_eq!(&self.map.overlaps(*start, *stop), expected);
                return;
            }
            Command::Erase { key, next } => {
                let mut cursor = self.map.find_mut(*key);
                cursor.erase();
                assert_eq!(&cursor.valid().then(|| cursor.entry()), next);
            }
            Command::SetStart { key, start, result } => {
                let mut cursor = self.map.find_mut(*key);
                cursor.set_start(*start);
                assert_eq!(&cursor.entry(), result);
            }
            Command::SetStop { key, stop, result } => {
                let mut cursor = self.map.find_mut(*key);
                cursor.set_stop(*stop);
                assert_eq!(&cursor.entry(), result);
            }
            Command::SetValue { key, value, result } => {
                let mut cursor = self.map.find_mut(*key);
                cursor.set_value(*value);
                assert_eq!(&cursor.entry(), result);
            }
            Command::Iter { direction: IterDirection::Forward, expected } => {
                assert_eq!(&self.map.iter().collect::<Vec<_>>(), expected);
                return;
            }
            Command::Iter { direction: IterDirection::Backward, expected } => {
                assert_eq!(&self.map.iter().rev().collect::<Vec<_>>(), expected);
                return;
            }
            Command::AdvanceTo { from, to, result } => {
                let mut cursor = self.map.find(*from);
                cursor.advance_to(*to);
                assert_eq!(&cursor.valid().then(|| cursor.entry()), result);
                return;
            }
            Command::Clear => {
                self.map.clear();
                assert!(self.map.is_empty());
            }
            Command::Clone => {
                let cloned = self.map.clone();
                assert_eq!(
                    cloned.iter().collect::<Vec<_>>(),
                    self.map.iter().collect::<Vec<_>>(),
                );
                self.map = cloned;
            }
        }

        // Only reached by commands that modify the map
        self.map.validate();
    }
}

/// Builds two maps from the valid entries of `a` and `b`, and checks that [`Overlaps`] visits
/// exactly the overlapping pairs of intervals, in order
pub fn check_overlaps<K, VA, VB, T, const NA: usize, const NB: usize>(
    a: &[(Span<K>, VA)],
    b: &[(Span<K>, VB)],
) where
    K: Key + Ord + Debug,
    VA: Value + Debug,
    VB: Value + Debug,
    T: IntervalTraits<K>,
{
    let (alloc_a, alloc_b) = (Allocator::new(), Allocator::new());
    let mut map_a: IntervalMap<K, VA, NA, T> = IntervalMap::new(&alloc_a);
    let mut map_b: IntervalMap<K, VB, NB, T> = IntervalMap::new(&alloc_b);
    let mut mock_a: Mock<K, VA, T> = Mock::new();
    let mut mock_b: Mock<K, VB, T> = Mock::new();

    for &(span, y) in a {
        let (start, stop) = span.sorted();
        if mock_a.can_insert(start, stop) {
            mock_a.insert(start, stop, y);
            map_a.insert(start, stop, y);
        }
    }
    for &(span, y) in b {
        let (start, stop) = span.sorted();
        if mock_b.can_insert(start, stop) {
            mock_b.insert(start, stop, y);
            map_b.insert(start, stop, y);
        }
    }
    map_a.validate();
    map_b.validate();

    let expected: Vec<_> = mock_a
        .overlapping_pairs(&mock_b)
        .into_iter()
        .map(|(i, j)| (mock_a.entries()[i], mock_b.entries()[j]))
        .collect();

    let mut found = Vec::new();
    let mut overlaps = Overlaps::new(&map_a, &map_b);
    while overlaps.valid() {
        let (x, y) = (overlaps.a().entry(), overlaps.b().entry());
        assert_eq!(overlaps.start(), if x.0 < y.0 { y.0 } else { x.0 });
        assert_eq!(overlaps.stop(), if x.1 < y.1 { x.1 } else { y.1 });
        found.push((x, y));
        overlaps.advance();
    }

    assert_eq!(found, expected);
}
