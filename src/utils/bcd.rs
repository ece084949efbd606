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

/* Packed BCD digit strings: first digit in the low nibble, second digit in
 * the high nibble. A 0xF high nibble is a filler and ends the string. */

/// Digit alphabet for nibble values 0x0 to 0xE; 0xF is always the filler.
#[derive(Debug)]
pub struct Alphabet(pub [char; 15]);

/// Telephone numbers (called/calling/connected party BCD numbers).
pub static TELEPHONE: Alphabet = Alphabet([
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '*', '#', 'a', 'b', 'c',
]);

/// Mobile identities (IMSI, IMEI, IMEISV).
pub static MOBILE_ID: Alphabet = Alphabet([
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '?', 'B', 'C', '*', '#',
]);

/// MSID digits: anything above 9 is undefined.
pub static MSID: Alphabet = Alphabet([
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '?', '?', '?', '?', '?',
]);

impl Alphabet {
    fn digit(&self, nibble: u8) -> char {
        match self.0.get(nibble as usize) {
            Some(c) => *c,
            None => '?',
        }
    }

    fn nibble(&self, c: char) -> Option<u8> {
        self.0.iter().position(|d| *d == c).map(|p| p as u8)
    }
}

pub fn unpack(data: &[u8], alphabet: &Alphabet) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for byte in data {
        s.push(alphabet.digit(byte & 0x0f));
        let hi = byte >> 4;
        if hi == 0x0f {
            break;
        }
        s.push(alphabet.digit(hi));
    }
    s
}

/// Inverse of `unpack`; characters outside the alphabet are rejected.
pub fn pack(digits: &str, alphabet: &Alphabet) -> Option<Vec<u8>> {
    let nibbles = digits
        .chars()
        .map(|c| alphabet.nibble(c))
        .collect::<Option<Vec<u8>>>()?;
    Some(
        nibbles
            .chunks(2)
            .map(|pair| pair[0] | (pair.get(1).copied().unwrap_or(0x0f) << 4))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_imsi() {
        /* 001010123456789, first digit already consumed by the caller */
        let data = [0x10, 0x10, 0x32, 0x54, 0x76, 0x98];
        assert_eq!(unpack(&data, &MOBILE_ID), "010101234567 89".replace(' ', ""));
    }

    #[test]
    fn filler_stops() {
        assert_eq!(unpack(&[0x21, 0xf3], &TELEPHONE), "123");
        assert_eq!(unpack(&[0x21, 0xf3, 0x54], &TELEPHONE), "123");
    }

    #[test]
    fn alphabets_differ_above_nine() {
        assert_eq!(unpack(&[0xba], &TELEPHONE), "*#");
        assert_eq!(unpack(&[0xba], &MOBILE_ID), "?B");
        assert_eq!(unpack(&[0xba], &MSID), "??");
    }

    #[test]
    fn round_trip() {
        for digits in ["", "1", "12", "0123456789", "987654321", "*#12"] {
            for alphabet in [&TELEPHONE, &MOBILE_ID] {
                if let Some(packed) = pack(digits, alphabet) {
                    assert_eq!(unpack(&packed, alphabet), digits);
                    if digits.len() % 2 == 1 {
                        assert_eq!(packed[packed.len() - 1] >> 4, 0x0f);
                    }
                }
            }
        }
        assert_eq!(pack("12345", &TELEPHONE), Some(vec![0x21, 0x43, 0xf5]));
        assert_eq!(pack("1x", &TELEPHONE), None);
    }
}
