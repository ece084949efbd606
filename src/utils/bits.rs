// This file is part of sigdissect.
// Copyright 2023 - The IVRE project
//
// Sigdissect is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Sigdissect is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public
// License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Sigdissect. If not, see <http://www.gnu.org/licenses/>.

/* Bit field helpers. Masks are applied to the raw octet(s) and the result
 * is shifted down so that it is zero-based. */

pub fn extract(raw: u32, mask: u32) -> u32 {
    if mask == 0 {
        return 0;
    }
    (raw & mask) >> mask.trailing_zeros()
}

/// Bit pattern as printed in front of a bit field, e.g. `..01 ....` for
/// raw 0x10 under mask 0x30, `width` being the number of octets.
pub fn pattern(raw: u32, mask: u32, width: usize) -> String {
    let nbits = width * 8;
    let mut s = String::with_capacity(nbits + nbits / 4);
    for i in (0..nbits).rev() {
        let bit = 1u32 << i;
        if mask & bit == 0 {
            s.push('.');
        } else if raw & bit != 0 {
            s.push('1');
        } else {
            s.push('0');
        }
        if i > 0 && i % 4 == 0 {
            s.push(' ');
        }
    }
    s
}

/// Reads an arbitrary number of bits MSB first out of a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    pub fn bit_pos(&self) -> usize {
        self.pos
    }

    pub fn read(&mut self, nbits: usize) -> Option<u32> {
        if nbits > 32 || nbits > self.remaining() {
            return None;
        }
        let mut v = 0u32;
        for _ in 0..nbits {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - (self.pos % 8))) & 1;
            v = (v << 1) | bit as u32;
            self.pos += 1;
        }
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_shifts() {
        assert_eq!(extract(0x6f, 0x60), 3);
        assert_eq!(extract(0x6f, 0x0f), 0x0f);
        assert_eq!(extract(0xff, 0), 0);
        assert_eq!(extract(0x1234, 0xff00), 0x12);
    }

    #[test]
    fn bit_pattern() {
        assert_eq!(pattern(0x10, 0x30, 1), "..01 ....");
        assert_eq!(pattern(0x81, 0x80, 1), "1... ....");
        assert_eq!(pattern(0x0001, 0x0003, 2), ".... .... .... ..01");
    }

    #[test]
    fn bit_reader() {
        let mut r = BitReader::new(&[0b1011_0011, 0b0100_0000]);
        assert_eq!(r.read(3), Some(0b101));
        assert_eq!(r.read(6), Some(0b100110));
        assert_eq!(r.remaining(), 7);
        assert_eq!(r.read(8), None);
        assert_eq!(r.read(1), Some(1));
    }
}
