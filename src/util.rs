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

use crate::{
    io::{Read, Seek, SeekFrom},
    FluxWriteError,
};

pub(crate) fn get_length<T: Seek>(source: &mut T) -> Result<u64, FluxWriteError> {
    let length = source.seek(SeekFrom::End(0)).map_err(|_e| FluxWriteError::IoError)?;
    source.seek(SeekFrom::Start(0)).map_err(|_e| FluxWriteError::IoError)?;
    Ok(length)
}

/// Read bytes from `source` until `terminator` (which is consumed) or EOF,
/// returning them as a string. ImageDisk headers and comments are ASCII, but
/// stray high bytes are carried through rather than truncating the read.
pub(crate) fn read_until<T: Read>(source: &mut T, terminator: u8) -> Result<String, FluxWriteError> {
    let mut string = String::new();

    for byte in source.bytes() {
        let b = byte.map_err(|_e| FluxWriteError::IoError)?;
        if b == terminator {
            break;
        }
        string.push(b as char);
    }

    Ok(string)
}
