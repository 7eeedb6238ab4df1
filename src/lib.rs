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

//! FluxScribe assembles the command-byte programs that drive a DiscFerret-class
//! floppy flux writer. Given the logical contents of a track (sector IDs,
//! payloads, gap sizes, encoding and data rate), it produces the MFM or FM
//! bit-cell stream for the track, computes the CRC-16/CCITT fields, and lowers
//! the bit cells into a linear program of timer waits, flux transitions and
//! write-gate changes, with optional write precompensation.
//!
//! The writer hardware itself is consumed through the [device::WriterHost]
//! façade; FluxScribe only fixes the contents of the uploaded buffer.

pub mod bitcell;
pub mod crc;
pub mod device;
pub mod file_parsers;
pub mod io;
pub mod program;
pub mod track_schema;
pub mod types;
mod util;

use thiserror::Error;

/// ASCII end-of-file marker, used as the ImageDisk comment terminator.
pub const ASCII_EOF: u8 = 0x1A;

/// Reference clock of the writer's command interpreter, in Hz (10ns per clock).
pub const REFERENCE_CLOCK_HZ: u32 = 100_000_000;

/// Size of the writer's on-board program RAM. A serialized track program that
/// does not fit cannot be uploaded.
pub const WRITER_RAM_BYTES: usize = 512 * 1024;

#[derive(Debug, Error)]
pub enum FluxWriteError {
    #[error("An IO error occurred reading the source image")]
    IoError,
    #[error("Invalid ImageDisk header")]
    InvalidImdHeader,
    #[error("Invalid ImageDisk track header")]
    InvalidImdTrackHeader,
    #[error("Invalid ImageDisk mode byte: {0:#04X}")]
    InvalidImdMode(u8),
    #[error("Invalid ImageDisk sector type byte: {0:#04X}")]
    InvalidImdSectorType(u8),
    #[error("Track program of {0} bytes exceeds the writer's program RAM")]
    TrackTooLong(usize),
    #[error("The writer device reported an error")]
    DeviceError,
}

pub use crate::{
    bitcell::BitCellTrack,
    crc::Crc16,
    program::{FluxProgram, WriteGate},
    types::{
        chs::{DiskCh, DiskChsn},
        enums::{DataRate, TrackEncoding},
    },
};

pub mod prelude {
    pub use crate::{
        bitcell::BitCellTrack,
        crc::Crc16,
        device::{start_write, upload_track, WriterHost},
        file_parsers::imd::ImdImage,
        program::{FluxProgram, WriteGate},
        track_schema::system34::{format_track, DataMark, FormatSector, System34FormatSpec},
        types::{
            chs::{DiskCh, DiskChsn},
            enums::{DataRate, TrackEncoding},
        },
        FluxWriteError,
        REFERENCE_CLOCK_HZ,
        WRITER_RAM_BYTES,
    };
}
