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

    src/file_parsers/imd.rs

    Reads ImageDisk (IMD) sector images into logical tracks the composer can
    lay down.
*/

use crate::{
    io::{ReadSeek, SeekFrom},
    track_schema::system34::{DataMark, FormatSector},
    types::{
        chs::{DiskCh, DiskChsn},
        enums::{DataRate, TrackEncoding},
    },
    util::{get_length, read_until},
    FluxWriteError,
    ASCII_EOF,
};
use binrw::{binrw, BinReaderExt};
use regex::Regex;

pub const IMD_HEADER_REX: &str = r"(?s)IMD (?<v_major>\d)\.(?<v_minor>\d{2}): (?<day>\d{2})/(?<month>\d{2})/(?<year>\d{4}) (?<hh>\d{2}):(?<mm>\d{2}):(?<ss>\d{2})(?<comment>.*)?";

/// The fixed-layout record that opens each track in an IMD file. The `h` byte
/// carries the head number in bit 0 and the optional-map flags in the top
/// bits.
#[derive(Debug)]
#[binrw]
pub struct ImdTrackHeader {
    pub mode: u8,
    c: u8,
    h: u8,
    sector_ct: u8,
    sector_size: u8,
}

impl ImdTrackHeader {
    pub fn c(&self) -> u8 {
        self.c
    }
    pub fn h(&self) -> u8 {
        self.h & 0x01
    }
    pub fn has_head_map(&self) -> bool {
        self.h & 0x40 != 0
    }
    pub fn has_cylinder_map(&self) -> bool {
        self.h & 0x80 != 0
    }
    pub fn sector_ct(&self) -> usize {
        self.sector_ct as usize
    }
    pub fn is_valid(&self) -> bool {
        self.mode < 6 && (self.h & !0xC0) < 2 && self.sector_size < 7
    }
    pub fn sector_size(&self) -> usize {
        128usize << self.sector_size
    }
}

fn imd_mode_to_rate(mode: u8) -> Option<(DataRate, TrackEncoding)> {
    match mode {
        0 => Some((DataRate::Rate500Kbps, TrackEncoding::Fm)),
        1 => Some((DataRate::Rate300Kbps, TrackEncoding::Fm)),
        2 => Some((DataRate::Rate250Kbps, TrackEncoding::Fm)),
        3 => Some((DataRate::Rate500Kbps, TrackEncoding::Mfm)),
        4 => Some((DataRate::Rate300Kbps, TrackEncoding::Mfm)),
        5 => Some((DataRate::Rate250Kbps, TrackEncoding::Mfm)),
        _ => None,
    }
}

/// One sector read from an IMD track record. A sector flagged unavailable
/// (type 0) has an empty data vector.
#[derive(Clone, Debug)]
pub struct ImdSector {
    pub id: DiskChsn,
    pub data: Vec<u8>,
    pub deleted: bool,
    pub error: bool,
}

impl ImdSector {
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// One track read from an IMD file, with its sectors in image order.
#[derive(Clone, Debug)]
pub struct ImdTrack {
    pub encoding: TrackEncoding,
    pub rate: DataRate,
    pub ch: DiskCh,
    pub sectors: Vec<ImdSector>,
}

impl ImdTrack {
    /// Convert the track into the composer's input. Sectors whose data could
    /// not be read are filled with zeroes so the track keeps its shape.
    pub fn format_sectors(&self) -> Vec<FormatSector> {
        self.sectors
            .iter()
            .map(|sector| {
                if !sector.has_data() {
                    log::warn!(
                        "format_sectors(): sector {} has no data; filling with zeroes",
                        sector.id
                    );
                }
                FormatSector {
                    id: sector.id,
                    data: if sector.has_data() {
                        sector.data.clone()
                    }
                    else {
                        vec![0; sector.id.n_size()]
                    },
                    mark: if sector.deleted { DataMark::Deleted } else { DataMark::Normal },
                }
            })
            .collect()
    }
}

/// A parsed ImageDisk file: the creation comment and the track list.
#[derive(Clone, Debug, Default)]
pub struct ImdImage {
    pub comment: Option<String>,
    pub tracks: Vec<ImdTrack>,
}

impl ImdImage {
    /// Return true if `image` opens with a plausible IMD header line.
    pub fn detect<RWS: ReadSeek>(image: &mut RWS) -> bool {
        if image.seek(SeekFrom::Start(0)).is_err() {
            return false;
        }
        match read_until(image, ASCII_EOF) {
            Ok(header) => Regex::new(IMD_HEADER_REX).unwrap().is_match(&header),
            Err(_) => false,
        }
    }

    /// Parse a complete IMD image.
    pub fn load<RWS: ReadSeek>(image: &mut RWS) -> Result<ImdImage, FluxWriteError> {
        let raw_len = get_length(image)?;

        let header = read_until(image, ASCII_EOF)?;
        let caps = Regex::new(IMD_HEADER_REX)
            .unwrap()
            .captures(&header)
            .ok_or(FluxWriteError::InvalidImdHeader)?;

        let comment = caps.name("comment").map(|c| c.as_str().trim().to_string());
        log::trace!(
            "load(): IMD version {}.{}, comment: {}",
            &caps["v_major"],
            &caps["v_minor"],
            comment.as_deref().unwrap_or("None")
        );

        let mut tracks = Vec::new();

        while image.stream_position().map_err(|_e| FluxWriteError::IoError)? < raw_len {
            tracks.push(ImdImage::read_track(image)?);
        }

        Ok(ImdImage { comment, tracks })
    }

    fn read_track<RWS: ReadSeek>(image: &mut RWS) -> Result<ImdTrack, FluxWriteError> {
        let header: ImdTrackHeader = image.read_le().map_err(|_e| FluxWriteError::IoError)?;
        log::trace!("read_track(): track header: {:?}", &header);

        if !header.is_valid() {
            log::error!("read_track(): invalid track header: {:?}", &header);
            return Err(match imd_mode_to_rate(header.mode) {
                None => FluxWriteError::InvalidImdMode(header.mode),
                Some(_) => FluxWriteError::InvalidImdTrackHeader,
            });
        }
        // is_valid() has screened the mode byte.
        let (rate, encoding) = imd_mode_to_rate(header.mode).unwrap();

        let mut sector_numbers = vec![0u8; header.sector_ct()];
        let mut cylinder_map = vec![header.c(); header.sector_ct()];
        let mut head_map = vec![header.h(); header.sector_ct()];

        image
            .read_exact(&mut sector_numbers)
            .map_err(|_e| FluxWriteError::IoError)?;

        if header.has_cylinder_map() {
            image.read_exact(&mut cylinder_map).map_err(|_e| FluxWriteError::IoError)?;
        }
        if header.has_head_map() {
            image.read_exact(&mut head_map).map_err(|_e| FluxWriteError::IoError)?;
        }

        log::trace!(
            "read_track(): sector numbers: {:?} cyl map: {:?} head map: {:?}",
            &sector_numbers,
            &cylinder_map,
            &head_map
        );

        let mut sectors = Vec::with_capacity(header.sector_ct());
        for s in 0..header.sector_ct() {
            let id = DiskChsn::new(
                cylinder_map[s] as u16,
                head_map[s],
                sector_numbers[s],
                header.sector_size,
            );
            sectors.push(ImdImage::read_sector(image, id, header.sector_size())?);
        }

        Ok(ImdTrack {
            encoding,
            rate,
            ch: DiskCh::new(header.c() as u16, header.h()),
            sectors,
        })
    }

    fn read_sector<RWS: ReadSeek>(
        image: &mut RWS,
        id: DiskChsn,
        sector_size: usize,
    ) -> Result<ImdSector, FluxWriteError> {
        let type_byte: u8 = image.read_le().map_err(|_e| FluxWriteError::IoError)?;

        // Sector data unavailable; there is nothing further to read.
        if type_byte == 0x00 {
            return Ok(ImdSector {
                id,
                data: Vec::new(),
                deleted: false,
                error: false,
            });
        }

        let (deleted, error, compressed) = match type_byte {
            0x01 => (false, false, false), // Normal data
            0x02 => (false, false, true),  // Normal data, compressed
            0x03 => (true, false, false),  // Deleted-data address mark
            0x04 => (true, false, true),   // Deleted, compressed
            0x05 => (false, true, false),  // Normal, read with data error
            0x06 => (false, true, true),   // Normal with error, compressed
            0x07 => (true, true, false),   // Deleted, read with data error
            0x08 => (true, true, true),    // Deleted with error, compressed
            _ => {
                log::error!("read_sector(): unrecognized sector type: {:02X}", type_byte);
                return Err(FluxWriteError::InvalidImdSectorType(type_byte));
            }
        };

        let data = if compressed {
            // A single byte follows, repeated for the whole sector.
            let fill: u8 = image.read_le().map_err(|_e| FluxWriteError::IoError)?;
            vec![fill; sector_size]
        }
        else {
            let mut data = vec![0u8; sector_size];
            image.read_exact(&mut data).map_err(|_e| FluxWriteError::IoError)?;
            data
        };

        log::trace!(
            "read_sector(): {} type {:02X} deleted: {} error: {}",
            id,
            type_byte,
            deleted,
            error
        );

        Ok(ImdSector {
            id,
            data,
            deleted,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_table_covers_both_encodings() {
        assert!(matches!(imd_mode_to_rate(0), Some((DataRate::Rate500Kbps, TrackEncoding::Fm))));
        assert!(matches!(imd_mode_to_rate(5), Some((DataRate::Rate250Kbps, TrackEncoding::Mfm))));
        assert!(imd_mode_to_rate(6).is_none());
    }

    #[test]
    fn track_header_flag_bits() {
        let header = ImdTrackHeader {
            mode: 5,
            c: 39,
            h: 0xC1,
            sector_ct: 9,
            sector_size: 2,
        };
        assert!(header.is_valid());
        assert_eq!(header.h(), 1);
        assert!(header.has_head_map());
        assert!(header.has_cylinder_map());
        assert_eq!(header.sector_size(), 512);
    }
}
