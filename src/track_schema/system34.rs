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

//! The IBM System 34 track composer. Lays out a complete formatted track --
//! GAP4a, the index mark, GAP1, then per sector the sync runs, IDAM with its
//! ID field, GAP2, DAM with the payload, CRC words and GAP3, and finally
//! GAP4b -- as bit cells, then lowers the cells into a writer program
//! bracketed by the DC-erase priming and stop commands.
//!
//! The System34 schema supports both MFM and FM track encodings.

use crate::{
    bitcell::BitCellTrack,
    crc::Crc16,
    program::{FluxProgram, WriteGate},
    types::{
        chs::DiskChsn,
        enums::{DataRate, TrackEncoding},
    },
    FluxWriteError,
    WRITER_RAM_BYTES,
};

pub const GAP_BYTE: u8 = 0x4E;
pub const SYNC_BYTE: u8 = 0;

pub const IBM_GAP4A: usize = 80;
pub const IBM_GAP1: usize = 50;
pub const IBM_GAP2: usize = 22;
pub const IBM_GAP3: usize = 80;
pub const IBM_GAP4B: usize = 145;
pub const SYNC_LEN: usize = 12;

pub const FM_GAP4A: usize = 40;
pub const FM_GAP1: usize = 26;
pub const FM_GAP2: usize = 11;
pub const FM_GAP3: usize = 54;
pub const FM_GAP4B: usize = 598;
pub const FM_SYNC_LEN: usize = 6;

/// Raw A1 sync word: the MFM encoding of 0xA1 with the clock bit between data
/// bits 4 and 5 removed. Three of these precede every IDAM and DAM.
pub const IDAM_SYNC: u32 = 0x4489;
/// Raw C2 sync word: the MFM encoding of 0xC2 with the clock bit between data
/// bits 3 and 4 removed. Three of these precede the IAM.
pub const IAM_SYNC: u32 = 0x5224;
/// Data byte whose MFM encoding the A1 sync word corrupts; the CRC is fed
/// this value for each sync word.
pub const SYNC_DATA_BYTE: u8 = 0xA1;
/// Sync words preceding an MFM address mark.
pub const MARK_SYNC_COUNT: usize = 3;

pub const IAM_BYTE: u8 = 0xFC;
pub const IDAM_BYTE: u8 = 0xFE;
pub const DAM_BYTE: u8 = 0xFB;
pub const DDAM_BYTE: u8 = 0xF8;

// FM address marks carry a missing-clock pattern instead of a sync run: the
// mark byte is interleaved with a 0xC7 clock (0xD7 for the IAM).
pub const FM_MARK_CLOCK: u8 = 0xC7;
pub const FM_IAM_CLOCK: u8 = 0xD7;

/// Default write precompensation: 125ns at the 100MHz reference clock,
/// rounded up.
pub const DEFAULT_PRECOMP_CLOCKS: u32 = 13;

/// The data address mark variants of a System 34 sector.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DataMark {
    #[default]
    Normal,
    Deleted,
}

impl DataMark {
    /// Return the mark byte written after the sync run.
    pub fn byte(&self) -> u8 {
        match self {
            DataMark::Normal => DAM_BYTE,
            DataMark::Deleted => DDAM_BYTE,
        }
    }
}

/// One sector to be laid down on a track. The ID field is written exactly as
/// given; it need not match the physical track address. `data` must be
/// `128 << n` bytes long.
#[derive(Clone, Debug)]
pub struct FormatSector {
    pub id: DiskChsn,
    pub data: Vec<u8>,
    pub mark: DataMark,
}

/// Gap, sync and timing parameters for one formatted track.
#[derive(Copy, Clone, Debug)]
pub struct System34FormatSpec {
    pub gap4a: usize,
    pub gap1: usize,
    pub gap2: usize,
    pub gap3: usize,
    pub gap4b: usize,
    pub sync_len: usize,
    /// Reference clocks per data-bit window.
    pub cell_clocks: u32,
    /// Write precompensation shift in reference clocks.
    pub precomp: u32,
}

impl System34FormatSpec {
    /// The standard IBM MFM double-density layout at the given data rate.
    pub fn mfm(rate: DataRate) -> System34FormatSpec {
        System34FormatSpec {
            gap4a: IBM_GAP4A,
            gap1: IBM_GAP1,
            gap2: IBM_GAP2,
            gap3: IBM_GAP3,
            gap4b: IBM_GAP4B,
            sync_len: SYNC_LEN,
            cell_clocks: rate.cell_clocks(TrackEncoding::Mfm),
            precomp: DEFAULT_PRECOMP_CLOCKS,
        }
    }

    /// The standard IBM FM single-density layout at the given data rate.
    /// No write precompensation is applied under FM.
    pub fn fm(rate: DataRate) -> System34FormatSpec {
        System34FormatSpec {
            gap4a: FM_GAP4A,
            gap1: FM_GAP1,
            gap2: FM_GAP2,
            gap3: FM_GAP3,
            gap4b: FM_GAP4B,
            sync_len: FM_SYNC_LEN,
            cell_clocks: rate.cell_clocks(TrackEncoding::Fm),
            precomp: 0,
        }
    }
}

/// Interleave an FM address mark's data byte with its clock byte into a
/// 16-cell raw pattern, clock cell first. An IDAM (0xFE over a 0xC7 clock)
/// produces the classic 0xF57E.
pub fn fm_mark_cells(data: u8, clock: u8) -> u32 {
    let mut pattern: u32 = 0;
    for i in (0..8).rev() {
        pattern = (pattern << 1) | u32::from((clock >> i) & 1);
        pattern = (pattern << 1) | u32::from((data >> i) & 1);
    }
    pattern
}

fn emit_byte(cells: &mut BitCellTrack, encoding: TrackEncoding, byte: u8) {
    match encoding {
        TrackEncoding::Mfm => cells.mfm(byte),
        TrackEncoding::Fm => cells.fm(byte),
    }
}

fn emit_run(cells: &mut BitCellTrack, encoding: TrackEncoding, byte: u8, count: usize) {
    for _ in 0..count {
        emit_byte(cells, encoding, byte);
    }
}

/// Emit an address mark and fold the bytes it frames into the CRC. Under MFM
/// this is the triple A1 sync run followed by the mark byte; under FM the
/// mark byte itself carries the clock violation.
fn emit_address_mark(cells: &mut BitCellTrack, crc: &mut Crc16, encoding: TrackEncoding, mark_byte: u8) {
    match encoding {
        TrackEncoding::Mfm => {
            for _ in 0..MARK_SYNC_COUNT {
                cells.raw(IDAM_SYNC, 16);
                crc.update_byte(SYNC_DATA_BYTE);
            }
            cells.mfm(mark_byte);
            crc.update_byte(mark_byte);
        }
        TrackEncoding::Fm => {
            cells.raw(fm_mark_cells(mark_byte, FM_MARK_CLOCK), 16);
            crc.update_byte(mark_byte);
        }
    }
}

/// Encode the complete logical track into bit cells. The CRC words of the ID
/// and data fields are computed as the fields are emitted and substituted
/// once each field's accumulation is complete.
pub fn encode_track_cells(
    encoding: TrackEncoding,
    spec: &System34FormatSpec,
    sectors: &[FormatSector],
) -> BitCellTrack {
    let mut cells = BitCellTrack::new();
    let mut crc = Crc16::new();

    // GAP4a and the index mark.
    emit_run(&mut cells, encoding, GAP_BYTE, spec.gap4a);
    emit_run(&mut cells, encoding, SYNC_BYTE, spec.sync_len);
    match encoding {
        TrackEncoding::Mfm => {
            for _ in 0..MARK_SYNC_COUNT {
                cells.raw(IAM_SYNC, 16);
            }
            cells.mfm(IAM_BYTE);
        }
        TrackEncoding::Fm => {
            cells.raw(fm_mark_cells(IAM_BYTE, FM_IAM_CLOCK), 16);
        }
    }
    emit_run(&mut cells, encoding, GAP_BYTE, spec.gap1);

    for sector in sectors {
        debug_assert_eq!(
            sector.data.len(),
            sector.id.n_size(),
            "sector payload length must match the ID field size code"
        );

        // ID field.
        emit_run(&mut cells, encoding, SYNC_BYTE, spec.sync_len);
        crc.reset();
        emit_address_mark(&mut cells, &mut crc, encoding, IDAM_BYTE);
        for byte in [sector.id.c() as u8, sector.id.h(), sector.id.s(), sector.id.n()] {
            emit_byte(&mut cells, encoding, byte);
            crc.update_byte(byte);
        }
        let id_crc = crc.crc();
        emit_byte(&mut cells, encoding, (id_crc >> 8) as u8);
        emit_byte(&mut cells, encoding, (id_crc & 0xFF) as u8);

        emit_run(&mut cells, encoding, GAP_BYTE, spec.gap2);

        // Data field.
        emit_run(&mut cells, encoding, SYNC_BYTE, spec.sync_len);
        crc.reset();
        emit_address_mark(&mut cells, &mut crc, encoding, sector.mark.byte());
        for &byte in &sector.data {
            emit_byte(&mut cells, encoding, byte);
            crc.update_byte(byte);
        }
        let data_crc = crc.crc();
        emit_byte(&mut cells, encoding, (data_crc >> 8) as u8);
        emit_byte(&mut cells, encoding, (data_crc & 0xFF) as u8);

        emit_run(&mut cells, encoding, GAP_BYTE, spec.gap3);
    }

    emit_run(&mut cells, encoding, GAP_BYTE, spec.gap4b);

    cells
}

/// Build the complete writer program for one track: DC-erase priming, the
/// lowered bit cells, then gate release and stop. Returns
/// [FluxWriteError::TrackTooLong] if the serialized program cannot fit in the
/// writer's RAM.
pub fn format_track(
    encoding: TrackEncoding,
    spec: &System34FormatSpec,
    sectors: &[FormatSector],
) -> Result<FluxProgram, FluxWriteError> {
    let mut program = FluxProgram::new();

    // DC erase: assert the write gate at the index and hold it for two more
    // index pulses before the first transition.
    program.emit_wait_index(1);
    program.emit_wrgate(WriteGate::Write);
    program.emit_wait_index(1);
    program.emit_wait_index(1);

    let cells = encode_track_cells(encoding, spec, sectors);
    log::debug!(
        "format_track(): encoded {} bit cells for {} sectors ({})",
        cells.len(),
        sectors.len(),
        encoding
    );

    cells.write_to_program(&mut program, spec.cell_clocks, spec.precomp);

    program.emit_wrgate(WriteGate::Read);
    program.emit_stop();

    if program.len() > WRITER_RAM_BYTES {
        log::error!(
            "format_track(): program of {} bytes exceeds the writer's {} byte RAM",
            program.len(),
            WRITER_RAM_BYTES
        );
        return Err(FluxWriteError::TrackTooLong(program.len()));
    }

    log::trace!(
        "format_track(): {} command bytes, {} clocks to write",
        program.len(),
        program.time()
    );

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fm_idam_mark_is_f57e() {
        assert_eq!(fm_mark_cells(IDAM_BYTE, FM_MARK_CLOCK), 0xF57E);
    }

    #[test]
    fn fm_dam_mark_is_f56f() {
        assert_eq!(fm_mark_cells(DAM_BYTE, FM_MARK_CLOCK), 0xF56F);
    }

    #[test]
    fn data_marks_map_to_mark_bytes() {
        assert_eq!(DataMark::Normal.byte(), 0xFB);
        assert_eq!(DataMark::Deleted.byte(), 0xF8);
    }

    #[test]
    fn mfm_track_cell_count_matches_layout() {
        let spec = System34FormatSpec::mfm(DataRate::Rate250Kbps);
        let sectors: Vec<FormatSector> = (1..=9)
            .map(|s| FormatSector {
                id: DiskChsn::new(0, 0, s, 2),
                data: vec![0xE5; 512],
                mark: DataMark::Normal,
            })
            .collect();

        let cells = encode_track_cells(TrackEncoding::Mfm, &spec, &sectors);

        // Preamble: GAP4a + sync + 3 C2 sync words + IAM + GAP1.
        let preamble = IBM_GAP4A + SYNC_LEN + MARK_SYNC_COUNT + 1 + IBM_GAP1;
        // Per sector: sync + (3 A1 + IDAM) + ID + CRC + GAP2
        //           + sync + (3 A1 + DAM) + data + CRC + GAP3.
        let per_sector = SYNC_LEN + 4 + 4 + 2 + IBM_GAP2 + SYNC_LEN + 4 + 512 + 2 + IBM_GAP3;
        let total_bytes = preamble + 9 * per_sector + IBM_GAP4B;

        assert_eq!(cells.len(), total_bytes * 16);
    }
}
