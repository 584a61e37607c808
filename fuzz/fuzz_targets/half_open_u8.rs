#![no_main]
use libfuzzer_sys::fuzz_target;
use redwood::param::HalfOpen;
use redwood::Allocator;
use redwood_fuzz_utils::{CommandSequence, Letter, RunnerState};

fuzz_target!(|cmds: CommandSequence<u8, Letter, HalfOpen>| {
    let cmds = cmds.map(|cmd| cmd.map_value(|l| l.0));

    // A root capacity of 1 makes the tree as tall as possible.
    let alloc = Allocator::new();
    let mut runner: RunnerState<u8, char, HalfOpen, 1> = RunnerState::init(&alloc);

    for c in &cmds.cmds {
        runner.run_cmd(c);
    }
});
