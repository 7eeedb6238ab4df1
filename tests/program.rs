mod common;

use common::*;
use fluxscribe::prelude::*;

#[test]
fn flux_decomposition_covers_all_wait_times() {
    init();
    for time in 1..=2000 {
        let mut program = FluxProgram::new();
        program.emit_flux(time);

        let commands = decode_program(program.buffer());
        assert_eq!(*commands.last().unwrap(), Command::Transition);
        assert_eq!(transition_delays(&commands), vec![time]);
        assert_eq!(program.time(), time + 1);
    }
}

#[test]
fn wait_index_decomposition_covers_all_counts() {
    init();
    for n in 1..=200u32 {
        let mut program = FluxProgram::new();
        program.emit_wait_index(n);

        let commands = decode_program(program.buffer());
        assert_eq!(commands.len(), n.div_ceil(63) as usize);

        let mut summed = 0u32;
        for command in &commands {
            match command {
                Command::WaitIndex(count) => {
                    assert!((1..=63).contains(count));
                    summed += *count as u32;
                }
                _ => panic!("expected only index waits, got {command:?}"),
            }
        }
        assert_eq!(summed, n);
        assert_eq!(program.time(), 0);
    }
}

#[test]
fn mixed_program_round_trips_through_decode() {
    init();
    let mut program = FluxProgram::new();
    program.emit_wait_index(2);
    program.emit_wrgate(WriteGate::Write);
    program.emit_flux(400);
    program.emit_flux(1);
    program.emit_wait_hstmd();
    program.emit_wrgate(WriteGate::Read);
    program.emit_stop();

    let commands = decode_program(program.buffer());
    assert_eq!(commands[0], Command::WaitIndex(2));
    assert_eq!(commands[1], Command::WrGate(true));
    assert_eq!(*commands.last().unwrap(), Command::Stop);

    // The gate byte padding the one-clock wait must match the asserted gate.
    assert!(commands.contains(&Command::WaitHstmd));
    assert_eq!(transition_delays(&commands), vec![400, 1]);
    assert_eq!(program.time(), static_clocks(&commands));
}
