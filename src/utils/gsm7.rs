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

/* GSM 03.38 default alphabet, packed 7-bit (LSB first). */

static DEFAULT: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1b}', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

const ESCAPE: u8 = 0x1b;

fn extension(c: u8) -> char {
    match c {
        0x0a => '\u{0c}',
        0x14 => '^',
        0x28 => '{',
        0x29 => '}',
        0x2f => '\\',
        0x3c => '[',
        0x3d => '~',
        0x3e => ']',
        0x40 => '|',
        0x65 => '€',
        _ => ' ',
    }
}

/// Unpacks `nchars` septets from `data`.
pub fn septets(data: &[u8], nchars: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(nchars);
    for i in 0..nchars {
        let bit = i * 7;
        let byte = bit / 8;
        let shift = bit % 8;
        if byte >= data.len() {
            break;
        }
        let mut v = (data[byte] >> shift) as u16;
        if shift > 1 {
            match data.get(byte + 1) {
                Some(next) => v |= (*next as u16) << (8 - shift),
                None => break,
            }
        }
        out.push((v & 0x7f) as u8);
    }
    out
}

pub fn decode(data: &[u8], nchars: usize) -> String {
    let mut s = String::with_capacity(nchars);
    let mut escaped = false;
    for c in septets(data, nchars) {
        if escaped {
            s.push(extension(c));
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else {
            s.push(DEFAULT[c as usize]);
        }
    }
    s
}

/// Number of characters held by `len` octets whose last one has
/// `spare_bits` unused bits.
pub fn char_count(len: usize, spare_bits: usize) -> usize {
    (len * 8).saturating_sub(spare_bits) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello() {
        /* "hellohello" from 23.038 */
        let data = [0xe8, 0x32, 0x9b, 0xfd, 0x46, 0x97, 0xd9, 0xec, 0x37];
        assert_eq!(decode(&data, 10), "hellohello");
        assert_eq!(char_count(data.len(), 2), 10);
    }

    #[test]
    fn short_input() {
        assert_eq!(decode(&[0xc1], 1), "A");
        assert_eq!(decode(&[], 3), "");
        /* escape sequence for the euro sign */
        let data = [0x9b, 0x32];
        assert_eq!(septets(&data, 2), vec![0x1b, 0x65]);
        assert_eq!(decode(&data, 2), "€");
    }
}
