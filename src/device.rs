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

//! The writer-host façade. A [WriterHost] is the opaque interface to
//! DiscFerret-class hardware: program RAM access, register pokes, drive
//! status and seek control. This crate only needs a sink for the serialized
//! command buffer; everything behind the trait (device enumeration, FPGA
//! microcode loading, motor control) belongs to the host library.

use crate::{program::FluxProgram, FluxWriteError, WRITER_RAM_BYTES};
use bitflags::bitflags;

/// Control registers poked during a track write.
pub mod regs {
    pub const DRIVE_CONTROL: u8 = 0x04;
    pub const ACQCON: u8 = 0x05;
    pub const ACQ_START_EVT: u8 = 0x06;
    pub const ACQ_STOP_EVT: u8 = 0x07;
    pub const ACQ_START_NUM: u8 = 0x08;
    pub const ACQ_STOP_NUM: u8 = 0x09;
    pub const ACQ_CLKSEL: u8 = 0x0A;
    pub const WRITE_PULSE_WIDTH: u8 = 0xD0;
}

// Acquisition event selects for ACQ_START_EVT / ACQ_STOP_EVT.
pub const ACQ_EVENT_ALWAYS: u8 = 0x00;
pub const ACQ_EVENT_INDEX: u8 = 0x01;
pub const ACQ_EVENT_NEVER: u8 = 0x3F;

/// Clock select for the 100MHz reference clock the command timings assume.
pub const ACQ_RATE_100MHZ: u8 = 0x00;

/// Write pulse width poked before a write, in reference clocks.
pub const DEFAULT_WRITE_PULSE_WIDTH: u8 = 60;

bitflags! {
    /// Drive-control register bits: drive selects and motor enable.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct DriveControl: u8 {
        const DS0 = 0b0000_0001;
        const DS1 = 0b0000_0010;
        const DS2 = 0b0000_0100;
        const DS3 = 0b0000_1000;
        const MOTOR_ENABLE = 0b0001_0000;
    }
}

bitflags! {
    /// Acquisition-control register bits.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct AcqControl: u8 {
        const START = 0b0000_0001;
        const WRITE = 0b0000_0010;
        const ABORT = 0b0000_0100;
    }
}

/// The operations a writer host must expose. All calls are blocking; the
/// host maps its own failure codes onto [FluxWriteError::DeviceError].
pub trait WriterHost {
    fn load_default_microcode(&mut self) -> Result<(), FluxWriteError>;
    fn ram_addr_set(&mut self, addr: u32) -> Result<(), FluxWriteError>;
    fn ram_write(&mut self, data: &[u8]) -> Result<(), FluxWriteError>;
    fn reg_poke(&mut self, reg: u8, value: u8) -> Result<(), FluxWriteError>;
    fn reg_peek(&mut self, reg: u8) -> Result<u8, FluxWriteError>;
    fn status(&mut self) -> Result<u32, FluxWriteError>;
    fn index_frequency(&mut self) -> Result<f64, FluxWriteError>;
    fn seek_set_rate(&mut self, step_us: u32) -> Result<(), FluxWriteError>;
    fn seek_recalibrate(&mut self, max_tracks: u32) -> Result<(), FluxWriteError>;
}

/// Upload a finished track program into writer RAM and configure the
/// acquisition engine for a write. The program must already be terminated
/// with a stop command; it is rejected if it cannot fit in RAM.
pub fn upload_track<H: WriterHost>(host: &mut H, program: &FluxProgram) -> Result<(), FluxWriteError> {
    if program.len() > WRITER_RAM_BYTES {
        return Err(FluxWriteError::TrackTooLong(program.len()));
    }

    host.ram_addr_set(0)?;
    host.ram_write(program.buffer())?;
    host.ram_addr_set(0)?;

    host.reg_poke(regs::ACQ_START_EVT, ACQ_EVENT_ALWAYS)?;
    host.reg_poke(regs::ACQ_START_NUM, 0)?;
    host.reg_poke(regs::ACQ_STOP_EVT, ACQ_EVENT_NEVER)?;
    host.reg_poke(regs::ACQ_STOP_NUM, 0)?;
    host.reg_poke(regs::ACQ_CLKSEL, ACQ_RATE_100MHZ)?;
    host.reg_poke(regs::WRITE_PULSE_WIDTH, DEFAULT_WRITE_PULSE_WIDTH)?;

    // Abort any acquisition already in progress.
    host.reg_poke(regs::ACQCON, AcqControl::ABORT.bits())?;
    host.reg_poke(regs::ACQCON, 0)?;

    log::debug!("upload_track(): uploaded {} command bytes", program.len());
    Ok(())
}

/// Begin executing the uploaded program.
pub fn start_write<H: WriterHost>(host: &mut H) -> Result<(), FluxWriteError> {
    host.reg_poke(regs::ACQCON, AcqControl::WRITE.bits())
}
