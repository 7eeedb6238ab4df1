/*
    FluxScribe
    https://github.com/dbalsom/fluxscribe

    Copyright 2024-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    tests/common/mod.rs

    Common support routines for tests
*/
#![allow(dead_code)]

use fluxscribe::prelude::*;

pub fn init() {
    match env_logger::builder().is_test(true).try_init() {
        Ok(_) => {
            log::debug!("Logger initialized.");
        }
        Err(e) => eprintln!("Failed to initialize logger: {}", e),
    }
}

/// One decoded writer command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Wait the given number of reference clocks (2..=129 per byte).
    WaitTimer(u32),
    /// Wait for 1..=63 index pulses.
    WaitIndex(u8),
    /// Set the write gate (true = asserted).
    WrGate(bool),
    WaitHstmd,
    Transition,
    Stop,
}

/// Decode a serialized program, panicking on any byte that is not a valid
/// command encoding.
pub fn decode_program(buf: &[u8]) -> Vec<Command> {
    buf.iter()
        .map(|&byte| match byte {
            0x80..=0xFF => Command::WaitTimer((byte & 0x7F) as u32 + 2),
            0x40..=0x7F => {
                let n = byte & 0x3F;
                assert!(n >= 1, "index wait operand of zero is unused");
                Command::WaitIndex(n)
            }
            0x3F => Command::Stop,
            0x03 => Command::WaitHstmd,
            0x02 => Command::Transition,
            0x00 | 0x01 => Command::WrGate(byte == 0x01),
            _ => panic!("invalid command byte {byte:02X}"),
        })
        .collect()
}

/// Collect the wait clocks preceding each flux transition.
pub fn transition_delays(commands: &[Command]) -> Vec<u32> {
    let mut delays = Vec::new();
    let mut accum = 0;
    for command in commands {
        match command {
            Command::WaitTimer(clocks) => accum += clocks,
            Command::WrGate(_) => accum += 1,
            Command::Transition => {
                delays.push(accum);
                accum = 0;
            }
            _ => {}
        }
    }
    delays
}

/// Total statically timed clocks in a decoded program: timer waits, gate
/// changes and transitions. Index and host-mode waits are excluded.
pub fn static_clocks(commands: &[Command]) -> u32 {
    commands
        .iter()
        .map(|command| match command {
            Command::WaitTimer(clocks) => *clocks,
            Command::WrGate(_) | Command::Transition => 1,
            _ => 0,
        })
        .sum()
}

/// A deterministic payload pattern.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 17 + 5) as u8).collect()
}

/// Build a run of sectors with consecutive IDs and patterned payloads.
pub fn patterned_sectors(ch: DiskCh, count: u8, size_code: u8) -> Vec<FormatSector> {
    (1..=count)
        .map(|s| FormatSector {
            id: DiskChsn::new(ch.c(), ch.h(), s, size_code),
            data: payload(128usize << size_code),
            mark: DataMark::Normal,
        })
        .collect()
}
