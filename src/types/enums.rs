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

    src/types/enums.rs

    Defines common enum types
*/

use std::fmt::{self, Display, Formatter};

/// The track encodings the writer can lay down. Both are closed, two-cell
/// modulations: a clock cell followed by a data cell per data bit.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TrackEncoding {
    Fm,
    #[default]
    Mfm,
}

impl Display for TrackEncoding {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackEncoding::Fm => write!(f, "FM"),
            TrackEncoding::Mfm => write!(f, "MFM"),
        }
    }
}

/// Nominal data rates supported by the System 34 schema.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DataRate {
    #[default]
    Rate250Kbps,
    Rate300Kbps,
    Rate500Kbps,
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DataRate::Rate250Kbps => write!(f, "250Kbps"),
            DataRate::Rate300Kbps => write!(f, "300Kbps"),
            DataRate::Rate500Kbps => write!(f, "500Kbps"),
        }
    }
}

impl DataRate {
    /// Reference clocks per data-bit window at the 100MHz reference clock
    /// (MFM 250Kbps: 4µs = 400 clocks). The flux lowering pass schedules one
    /// transition slot per half window, so every entry is even; the 300Kbps
    /// rates do not divide the reference clock exactly and are rounded to the
    /// nearest even count.
    pub fn cell_clocks(&self, encoding: TrackEncoding) -> u32 {
        match (encoding, self) {
            (TrackEncoding::Mfm, DataRate::Rate250Kbps) => 400,
            (TrackEncoding::Mfm, DataRate::Rate300Kbps) => 334,
            (TrackEncoding::Mfm, DataRate::Rate500Kbps) => 200,
            (TrackEncoding::Fm, DataRate::Rate250Kbps) => 200,
            (TrackEncoding::Fm, DataRate::Rate300Kbps) => 166,
            (TrackEncoding::Fm, DataRate::Rate500Kbps) => 100,
        }
    }
}
