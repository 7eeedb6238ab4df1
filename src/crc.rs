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

//! A table-driven CRC-16/CCITT (IBM 3740) checksum with a resettable running
//! value, as used for the ID and data fields of a System 34 track. MSB-first,
//! no reflection, no final XOR.

/// Default seed for the System 34 address and data fields.
pub const CRC_CCITT_SEED: u16 = 0xFFFF;

/// A running CRC-16/CCITT checksum. The address-mark bytes that precede a
/// field are folded into the running value, so the composer can interleave
/// checksum updates with bit-cell emission and read the final value out once
/// the field is complete.
#[derive(Clone)]
pub struct Crc16 {
    table: [u16; 256],
    initial: u16,
    current: u16,
}

impl Default for Crc16 {
    fn default() -> Self {
        Crc16::new()
    }
}

impl Crc16 {
    const POLY: u16 = 0x1021; // Polynomial x^16 + x^12 + x^5 + 1

    /// Create a new [Crc16] with the standard 0xFFFF seed.
    pub fn new() -> Crc16 {
        Crc16::with_seed(CRC_CCITT_SEED)
    }

    /// Create a new [Crc16] seeded with an arbitrary initial value.
    pub fn with_seed(seed: u16) -> Crc16 {
        let mut table = [0u16; 256];

        for (i, entry) in table.iter_mut().enumerate() {
            let mut temp: u16 = 0;
            let mut a = (i as u16) << 8;

            for _ in 0..8 {
                if (temp ^ a) & 0x8000 != 0 {
                    temp = (temp << 1) ^ Self::POLY;
                }
                else {
                    temp <<= 1;
                }
                a <<= 1;
            }

            *entry = temp;
        }

        Crc16 {
            table,
            initial: seed,
            current: seed,
        }
    }

    /// Return the CRC of `data` continued from the current running value,
    /// without updating internal state.
    pub fn calculate(&self, data: &[u8]) -> u16 {
        let mut crc = self.current;
        for &byte in data {
            crc = (crc << 8) ^ self.table[(((crc >> 8) ^ byte as u16) & 0xFF) as usize];
        }
        crc
    }

    /// Fold `data` into the running value and return it.
    pub fn update(&mut self, data: &[u8]) -> u16 {
        self.current = self.calculate(data);
        self.current
    }

    /// Fold a single byte into the running value and return it.
    pub fn update_byte(&mut self, byte: u8) -> u16 {
        self.update(&[byte])
    }

    /// Reset the running value to the initial seed.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Reset the running value to `seed` and make it the new initial seed.
    pub fn reset_with_seed(&mut self, seed: u16) {
        self.initial = seed;
        self.current = seed;
    }

    /// Return the current running value.
    pub fn crc(&self) -> u16 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccitt_check_vector() {
        // The CRC-16/CCITT-FALSE check value.
        let mut crc = Crc16::new();
        assert_eq!(crc.update(b"123456789"), 0x29B1);
        assert_eq!(crc.crc(), 0x29B1);
    }

    #[test]
    fn split_updates_match_whole_update() {
        let data = b"write precompensation";
        for split in 0..=data.len() {
            let mut split_crc = Crc16::new();
            split_crc.update(&data[..split]);
            split_crc.update(&data[split..]);

            let mut whole_crc = Crc16::new();
            whole_crc.update(data);

            assert_eq!(split_crc.crc(), whole_crc.crc());
        }
    }

    #[test]
    fn calculate_does_not_mutate() {
        let crc = Crc16::new();
        let first = crc.calculate(b"123456789");
        assert_eq!(crc.crc(), CRC_CCITT_SEED);
        assert_eq!(crc.calculate(b"123456789"), first);
    }

    /// A bit-at-a-time reference implementation.
    fn bitwise_crc(seed: u16, data: &[u8]) -> u16 {
        let mut crc = seed;
        for &byte in data {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                if crc & 0x8000 != 0 {
                    crc = (crc << 1) ^ 0x1021;
                }
                else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn table_matches_bitwise_remainders() {
        let crc = Crc16::with_seed(0);
        for i in 0..=255u8 {
            assert_eq!(crc.table[i as usize], bitwise_crc(0, &[i]));
            assert_eq!(crc.calculate(&[i]), bitwise_crc(0, &[i]));
        }
    }

    #[test]
    fn table_driven_matches_bitwise_over_a_message() {
        let data = b"\xA1\xA1\xA1\xFE\x27\x01\x05\x02";
        let mut crc = Crc16::new();
        assert_eq!(crc.update(data), bitwise_crc(CRC_CCITT_SEED, data));
    }

    #[test]
    fn reset_with_seed_changes_default() {
        let mut crc = Crc16::new();
        crc.reset_with_seed(0x1D0F);
        crc.update(b"123456789");
        crc.reset();
        assert_eq!(crc.crc(), 0x1D0F);
    }

    #[test]
    fn update_byte_matches_update() {
        let mut a = Crc16::new();
        let mut b = Crc16::new();
        for byte in [0xA1, 0xA1, 0xA1, 0xFE] {
            a.update_byte(byte);
        }
        b.update(&[0xA1, 0xA1, 0xA1, 0xFE]);
        assert_eq!(a.crc(), b.crc());
    }
}
