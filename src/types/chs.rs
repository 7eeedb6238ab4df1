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

//! The `chs` module defines structures for Cylinder-Head-Sector addressing.
//! A [DiskCh] identifies a physical track; a [DiskChsn] carries the four
//! components of a System 34 sector ID, which need not match the physical
//! location the sector is written to.

use std::fmt::Display;

/// Maximum size in bytes of a single sector. Size codes above 6 are clamped
/// rather than honored; the ID field still records the raw code.
pub const MAXIMUM_SECTOR_SIZE: usize = 8192;

/// A physical track address: cylinder (c) and head (h).
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct DiskCh {
    c: u16,
    h: u8,
}

impl DiskCh {
    pub fn new(c: u16, h: u8) -> DiskCh {
        DiskCh { c, h }
    }
    /// Return the cylinder (c) field.
    pub fn c(&self) -> u16 {
        self.c
    }
    /// Return the head (h) field.
    pub fn h(&self) -> u8 {
        self.h
    }
}

impl From<(u16, u8)> for DiskCh {
    fn from((c, h): (u16, u8)) -> Self {
        DiskCh { c, h }
    }
}

impl Display for DiskCh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{:2} h:{}]", self.c, self.h)
    }
}

/// A structure representing the four components of a sector ID:
///  - Cylinder (c)
///  - Head (h)
///  - Sector ID (s)
///  - Sector Size (n)
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct DiskChsn {
    ch: DiskCh,
    s:  u8,
    n:  u8,
}

impl Default for DiskChsn {
    fn default() -> Self {
        Self {
            ch: DiskCh::default(),
            s:  1,
            n:  2,
        }
    }
}

impl DiskChsn {
    pub fn new(c: u16, h: u8, s: u8, n: u8) -> DiskChsn {
        DiskChsn {
            ch: DiskCh::new(c, h),
            s,
            n,
        }
    }
    /// Return the cylinder (c) field.
    pub fn c(&self) -> u16 {
        self.ch.c()
    }
    /// Return the head (h) field.
    pub fn h(&self) -> u8 {
        self.ch.h()
    }
    /// Return the sector id (s) field.
    pub fn s(&self) -> u8 {
        self.s
    }
    /// Return the size (n) field.
    pub fn n(&self) -> u8 {
        self.n
    }
    /// Return the size of the sector in bytes, derived from the n field.
    /// The formula for calculating size from n is (128 * 2^n), clamped to
    /// [MAXIMUM_SECTOR_SIZE].
    pub fn n_size(&self) -> usize {
        std::cmp::min(MAXIMUM_SECTOR_SIZE, 128usize.overflowing_shl(self.n as u32).0)
    }
    /// Return the physical track address portion of the sector ID.
    pub fn ch(&self) -> DiskCh {
        self.ch
    }
}

impl From<(u16, u8, u8, u8)> for DiskChsn {
    fn from((c, h, s, n): (u16, u8, u8, u8)) -> Self {
        DiskChsn::new(c, h, s, n)
    }
}

impl Display for DiskChsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{:2} h:{} s:{:3} n:{}]", self.c(), self.h(), self.s, self.n)
    }
}
