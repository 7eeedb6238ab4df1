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
*/

//! A [FluxProgram] is the linear command-byte program executed by the writer's
//! on-board interpreter. Commands wait out reference clocks, wait for index
//! pulses, toggle the write gate and emit flux transitions; the program is
//! serialized into the writer's RAM and run against a 100MHz reference clock.
//!
//! The elapsed-clock counter covers every command with a static cost. Index
//! waits depend on media rotation and contribute nothing to it.

// Command byte encoding. The timer and index waits carry their operand in the
// low bits; the remaining commands are single fixed bytes.
pub const CMD_WAIT_TIMER_N: u8 = 0x80;
pub const CMD_WAIT_INDEX_N: u8 = 0x40;
pub const CMD_STOP: u8 = 0x3F;
pub const CMD_WAIT_HSTMD: u8 = 0x03;
pub const CMD_TRANSITION: u8 = 0x02;
pub const CMD_WR_GATE_N: u8 = 0x00;

// The timer opcode waits (operand + 2) clocks, so one byte covers 2..=129.
const MAX_TIMER_WAIT: u32 = 129;
// The index-wait operand occupies six bits; zero is unused.
const MAX_INDEX_WAIT: u32 = 0x3F;

/// Write-gate state. The gate powers the drive's write head; the interpreter
/// starts with the gate deasserted (reading).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WriteGate {
    #[default]
    Read,
    Write,
}

/// A writer command program under construction.
#[derive(Clone, Debug, Default)]
pub struct FluxProgram {
    buf: Vec<u8>,
    gate: WriteGate,
    timestep: u32,
}

impl FluxProgram {
    pub fn new() -> FluxProgram {
        FluxProgram::default()
    }

    /// Clear the program, returning the gate to deasserted and the clock
    /// counter to zero.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.gate = WriteGate::Read;
        self.timestep = 0;
    }

    /// Total reference clocks consumed by the statically timed commands
    /// emitted so far.
    pub fn time(&self) -> u32 {
        self.timestep
    }

    /// Return the program length in command bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the serialized command buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return the current write-gate state.
    pub fn gate(&self) -> WriteGate {
        self.gate
    }

    fn gate_command(gate: WriteGate) -> u8 {
        match gate {
            WriteGate::Read => CMD_WR_GATE_N,
            WriteGate::Write => CMD_WR_GATE_N | 1,
        }
    }

    /// Set the write gate. Costs one reference clock.
    pub fn emit_wrgate(&mut self, gate: WriteGate) {
        self.gate = gate;
        self.buf.push(Self::gate_command(gate));
        self.timestep += 1;
    }

    /// Wait `time` reference clocks, then emit one flux transition. The total
    /// clock cost is exactly `time + 1` (the transition command itself takes
    /// one clock).
    pub fn emit_flux(&mut self, time: u32) {
        let mut t = time;

        while t > 0 {
            if t > MAX_TIMER_WAIT {
                self.buf.push(CMD_WAIT_TIMER_N | 127);
                t -= MAX_TIMER_WAIT;
            }
            else if t >= 2 {
                self.buf.push(CMD_WAIT_TIMER_N | (t - 2) as u8);
                t = 0;
            }
            else {
                // One clock of slack, below the timer's granularity.
                // Re-emitting the current gate state is a one-clock no-op.
                self.buf.push(Self::gate_command(self.gate));
                t -= 1;
            }
        }

        self.buf.push(CMD_TRANSITION);
        self.timestep += time + 1;
    }

    /// Wait for `n` index pulses. Index waits have no static duration and do
    /// not advance the clock counter.
    ///
    /// Panics if `n` is zero.
    pub fn emit_wait_index(&mut self, n: u32) {
        assert!(n > 0, "index wait count must be at least 1");

        let mut n = n;
        while n > 0 {
            let x = n.min(MAX_INDEX_WAIT);
            n -= x;
            self.buf.push(CMD_WAIT_INDEX_N | x as u8);
        }
    }

    /// Wait for the host-mode signal.
    pub fn emit_wait_hstmd(&mut self) {
        self.buf.push(CMD_WAIT_HSTMD);
    }

    /// Terminate the program.
    pub fn emit_stop(&mut self) {
        self.buf.push(CMD_STOP);
    }
}
