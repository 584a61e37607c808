#![no_main]
use libfuzzer_sys::fuzz_target;
use redwood::param::Closed;
use redwood::Allocator;
use redwood_fuzz_utils::{CommandSequence, Letter, RunnerState};

fuzz_target!(|cmds: CommandSequence<u8, Letter, Closed>| {
    let cmds = cmds.map(|cmd| cmd.map_value(|l| l.0));

    let alloc = Allocator::new();
    let mut runner: RunnerState<u8, char, Closed, 4> = RunnerState::init(&alloc);

    for c in &cmds.cmds {
        runner.run_cmd(c);
    }
});
