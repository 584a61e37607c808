#![no_main]
use libfuzzer_sys::fuzz_target;
use redwood::mock::Span;
use redwood::param::Closed;
use redwood_fuzz_utils::{check_overlaps, Letter};

fuzz_target!(|input: (Vec<(Span<u8>, Letter)>, Vec<(Span<u8>, bool)>)| {
    let (a, b) = input;
    check_overlaps::<u8, Letter, bool, Closed, 2, 3>(&a, &b);
});
