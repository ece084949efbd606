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

use byteorder::{BigEndian, ByteOrder};
use log::*;

use super::cst::{SASP_HEADER_LEN, SASP_LEN_OFFSET};

/// Header plus message type.
pub const SASP_MIN_LEN: usize = SASP_HEADER_LEN + 2;
/// Larger lengths are taken as garbage rather than buffered.
pub const SASP_MAX_LEN: usize = 1 << 20;

/// Total PDU length announced by the header, or `None` while fewer than
/// [`SASP_HEADER_LEN`] bytes are available.
pub fn pdu_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < SASP_HEADER_LEN {
        return None;
    }
    Some(BigEndian::read_u32(&buf[SASP_LEN_OFFSET..SASP_LEN_OFFSET + 4]) as usize)
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ReassemblerState {
    Header,
    Body(usize),
}

/// Cuts one direction of a TCP stream into SASP PDUs.
#[derive(Debug)]
pub struct Reassembler {
    pub state: ReassemblerState,
    buf: Vec<u8>,
}

impl Default for Reassembler {
    fn default() -> Self {
        Reassembler::new()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Reassembler {
            state: ReassemblerState::Header,
            buf: Vec::new(),
        }
    }

    /// Bytes of the PDU being accumulated.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn parse(&mut self, byte: &u8, out: &mut Vec<Vec<u8>>) {
        self.buf.push(*byte);
        match self.state {
            ReassemblerState::Header => {
                if let Some(len) = pdu_len(&self.buf) {
                    if !(SASP_MIN_LEN..=SASP_MAX_LEN).contains(&len) {
                        /* resync: drop the first byte and look again */
                        debug!("SASP: bogus PDU length {}, skipping one byte", len);
                        self.buf.remove(0);
                        return;
                    }
                    self.state = ReassemblerState::Body(len);
                }
            }
            ReassemblerState::Body(len) => {
                if self.buf.len() == len {
                    trace!("SASP: PDU of {} bytes", len);
                    out.push(std::mem::take(&mut self.buf));
                    self.state = ReassemblerState::Header;
                }
            }
        }
    }

    /// Feeds a chunk of the stream and returns every PDU it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for b in data {
            self.parse(b, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdu(len: u32) -> Vec<u8> {
        let mut v = vec![0x20, 0x10, 0x00, 0x0d, 0x01];
        v.extend_from_slice(&len.to_be_bytes());
        v.extend_from_slice(&[0x00, 0x00, 0x00, 0x2a]);
        v.extend_from_slice(&[0x10, 0x15]);
        v.resize(len as usize, 0x00);
        v
    }

    #[test]
    fn length_from_header() {
        let p = pdu(18);
        assert_eq!(pdu_len(&p[..12]), None);
        assert_eq!(pdu_len(&p[..13]), Some(18));
        assert_eq!(pdu_len(&p), Some(18));
    }

    #[test]
    fn byte_by_byte() {
        let p = pdu(18);
        let mut r = Reassembler::new();
        for (i, b) in p.iter().enumerate() {
            let out = r.push(&[*b]);
            if i < p.len() - 1 {
                assert!(out.is_empty());
                assert_eq!(r.pending(), i + 1);
            } else {
                assert_eq!(out, vec![p.clone()]);
            }
        }
        assert_eq!(r.state, ReassemblerState::Header);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn several_in_one_chunk() {
        let mut stream = pdu(18);
        stream.extend(pdu(15));
        stream.extend(&pdu(20)[..7]);
        let mut r = Reassembler::new();
        let out = r.push(&stream);
        assert_eq!(out, vec![pdu(18), pdu(15)]);
        assert_eq!(r.pending(), 7);
        let out = r.push(&pdu(20)[7..]);
        assert_eq!(out, vec![pdu(20)]);
    }

    #[test]
    fn bogus_length_resyncs() {
        /* a length below the minimum cannot be a PDU */
        let mut stream = vec![0xff];
        stream.extend(pdu(15));
        let mut r = Reassembler::new();
        assert_eq!(r.push(&stream), vec![pdu(15)]);
    }
}
