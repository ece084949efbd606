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

//! Server/Application State Protocol (RFC 4678)
//!
//! A SASP PDU is a 13-byte header (magic, header length, version, message
//! length, message id) followed by a 2-byte message type and a body made
//! of fixed fields and nested components. Over TCP, PDUs are delimited by
//! the message length; see [`Reassembler`].

pub mod component;
pub mod cst;
pub mod message;
pub mod reassembly;

use std::cmp::min;

use log::*;

use crate::context::DecodeContext;
use crate::error::{DResult, DecodeError};
use crate::field::{Diagnostic, Dissection, FieldTree};
use crate::proto::dissector::Cursor;
use crate::proto::frame;

pub use cst::MessageType;
pub use reassembly::{pdu_len, Reassembler};

use cst::SASP_MAGIC;
use reassembly::SASP_MIN_LEN;

pub const PROTOCOL: &str = "SASP";

pub fn dissect(data: &[u8], _ctx: &DecodeContext) -> DResult<Dissection> {
    let mut cur = Cursor::new(data);
    let mut tree = FieldTree::new();

    /* header */
    let offset = cur.pos();
    let magic = cur.read_u16()?;
    tree.uint("Header Type", offset, 2, magic as u64);
    if magic != SASP_MAGIC {
        warn!("SASP: unexpected header type 0x{:04x}", magic);
    }
    let offset = cur.pos();
    let hdr_len = cur.read_u16()?;
    tree.uint("Header Size", offset, 2, hdr_len as u64);
    let offset = cur.pos();
    let version = cur.read_u8()?;
    tree.uint("Version", offset, 1, version as u64);
    let len_offset = cur.pos();
    let msg_len = cur.read_u32()? as usize;
    tree.uint("Message Length", len_offset, 4, msg_len as u64);
    let offset = cur.pos();
    let msg_id = cur.read_u32()?;
    tree.uint("Message ID", offset, 4, msg_id as u64);
    if msg_len > data.len() {
        warn!("SASP: message length {} beyond the {} byte(s) given", msg_len, data.len());
        return Err(DecodeError::Truncated {
            offset: data.len(),
            needed: msg_len - data.len(),
        });
    }
    if msg_len != data.len() {
        let name = format!(
            "Unexpected Data Length (declared {}, got {})",
            msg_len,
            data.len()
        );
        warn!("SASP: {}", name);
        tree.diag(Diagnostic::UnexpectedDataLength, name, len_offset, &[]);
    }

    let offset = cur.pos();
    let raw = cur.read_u16()?;
    let msg = MessageType::from(raw);
    if msg == MessageType::Unknown {
        let name = format!("Unknown Message Type (0x{:04x})", raw);
        warn!("SASP: {}", name);
        tree.diag(Diagnostic::UnknownMessageType, name.clone(), offset, &[]);
        return Ok(frame(PROTOCOL, name, data.len(), tree));
    }
    tree.text("Message Type", offset, 2, format!("{} (0x{:04x})", msg.name(), raw));
    debug!("SASP {} (id {})", msg.name(), msg_id);

    /* body, bounded by the declared length; the buffer holds all of it */
    let start = cur.pos();
    let end = min(msg_len.max(SASP_MIN_LEN), data.len());
    let mut body = cur.window(end - start)?;
    let mut sub = FieldTree::new();
    let summary = match message::body(msg, &mut body, &mut sub) {
        Ok(s) => s,
        Err(DecodeError::ShortData { offset }) => {
            warn!("SASP {}: short data at offset {}", msg.name(), offset);
            if !sub.has_diag(Diagnostic::ShortData) {
                sub.diag(Diagnostic::ShortData, "Short Data (?)", offset, &[]);
            }
            body.rest();
            None
        }
        Err(e) => return Err(e),
    };
    let leftover = body.pos();
    sub.extraneous(leftover, body.rest());
    tree.subtree(msg.name(), start, end - start, sub).summary = summary;
    let leftover = cur.pos();
    tree.extraneous(leftover, cur.rest());
    Ok(frame(PROTOCOL, msg.name().to_string(), data.len(), tree))
}

#[cfg(test)]
mod tests {
    use super::component::tests::MEMBER;
    use super::*;
    use crate::context::DecodeOptions;
    use crate::proto::BuiltinHandoff;
    use rand::Rng;

    fn pdu(msg_type: u16, body: &[u8]) -> Vec<u8> {
        let len = (15 + body.len()) as u32;
        let mut v = vec![0x20, 0x10, 0x00, 0x0d, 0x01];
        v.extend_from_slice(&len.to_be_bytes());
        v.extend_from_slice(&[0x00, 0x00, 0x00, 0x2a]);
        v.extend_from_slice(&msg_type.to_be_bytes());
        v.extend_from_slice(body);
        v
    }

    fn sasp(data: &[u8]) -> DResult<Dissection> {
        let opts = DecodeOptions::default();
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        dissect(data, &ctx)
    }

    #[test]
    fn reg_reply() {
        let data = pdu(0x1015, &[0x00, 0x03, 0x00]);
        let d = sasp(&data).unwrap();
        assert_eq!(d.protocol, PROTOCOL);
        assert_eq!(d.info, "Registration Reply");
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.find("Message ID").and_then(|f| f.as_u64()), Some(42));
        let reply = d.find("Registration Reply").unwrap();
        assert_eq!(reply.summary.as_deref(), Some("Successful"));
        assert_eq!((reply.offset, reply.len), (15, 3));
        assert_eq!(pdu_len(&data), Some(data.len()));
    }

    #[test]
    fn unknown_message_type() {
        let d = sasp(&pdu(0xffff, &[0x00, 0x03, 0x00])).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::UnknownMessageType));
        assert_eq!(diags[0].name, "Unknown Message Type (0xffff)");
        assert!(d.find("Response Code").is_none());
    }

    #[test]
    fn registration_request() {
        let mut body = vec![0x00, 0x00, 0x02, b'l', b'b', 0x80, 0x00, 0x01];
        body.extend_from_slice(&[0x30, 0x10, 0x00, 0x00, 0x00, 0x01]);
        body.extend_from_slice(&[0x40, 0x11, 0x00, 0x00, 0x00, 0x01, b'g']);
        body.extend_from_slice(&MEMBER);
        let d = sasp(&pdu(0x1010, &body)).unwrap();
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.info, "Registration Request");
        assert_eq!(
            d.find("Registration Flags").and_then(|f| f.summary.as_deref()),
            Some("Trust")
        );
        let m = d.find("Member Data").unwrap();
        assert_eq!(m.offset, 15 + body.len() - 24);
        assert_eq!(m.find("Port").and_then(|f| f.as_u64()), Some(8080));
    }

    #[test]
    fn short_body() {
        /* Set LB State Request without its flags octet */
        let d = sasp(&pdu(0x1050, &[0x00, 0x06, 0x01, b'x', 0x42])).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::ShortData));
        assert_eq!(diags[0].offset, 20);
    }

    #[test]
    fn length_mismatch() {
        let mut data = pdu(0x1015, &[0x00, 0x03, 0x00]);
        data.extend_from_slice(&[0xde, 0xad]);
        let d = sasp(&data).unwrap();
        let kinds: Vec<_> = d.diagnostics().iter().map(|f| f.diag).collect();
        assert_eq!(
            kinds,
            vec![
                Some(Diagnostic::UnexpectedDataLength),
                Some(Diagnostic::ExtraneousData)
            ]
        );
        let extra = d.find("Extraneous Data").unwrap();
        assert_eq!((extra.offset, extra.len), (18, 2));
    }

    #[test]
    fn declared_length_beyond_buffer() {
        /* Set LB State Request announcing 40 bytes, 20 given */
        let mut data = pdu(0x1050, &[0x00, 0x06, 0x01, b'x', 0x42]);
        data[5..9].copy_from_slice(&40u32.to_be_bytes());
        assert_eq!(
            sasp(&data).unwrap_err(),
            DecodeError::Truncated {
                offset: 20,
                needed: 20
            }
        );
        /* cut anywhere before the end of a well-formed PDU */
        let data = pdu(0x1015, &[0x00, 0x03, 0x00]);
        for cut in 0..data.len() {
            assert!(
                matches!(sasp(&data[..cut]), Err(DecodeError::Truncated { .. })),
                "cut at {}",
                cut
            );
        }
    }

    #[test]
    fn short_component_in_body() {
        /* Registration Request whose member data ends inside the address */
        let mut body = vec![0x00, 0x00, 0x02, b'l', b'b', 0x80, 0x00, 0x01];
        body.extend_from_slice(&[0x30, 0x10, 0x00, 0x00, 0x00, 0x01]);
        body.extend_from_slice(&[0x40, 0x11, 0x00, 0x00, 0x00, 0x01, b'g']);
        body.extend_from_slice(&MEMBER[..12]);
        let d = sasp(&pdu(0x1010, &body)).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::ShortData));
        let m = d.find("Member Data").unwrap();
        assert_eq!(m.find("Port").and_then(|f| f.as_u64()), Some(8080));
        assert_eq!(m.diagnostics().len(), 1);
        assert!(d.find("Group of Member Data").is_some());
    }

    #[test]
    fn truncated_header() {
        assert!(matches!(
            sasp(&[0x20, 0x10, 0x00]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn random_bodies_never_panic() {
        let mut rng = rand::rng();
        let types = [
            0x1010u16, 0x1015, 0x1020, 0x1025, 0x1030, 0x1035, 0x1040, 0x1050, 0x1055, 0x1060,
            0x1065,
        ];
        for _ in 0..5000 {
            let mut body = vec![0u8; rng.random_range(0..64)];
            rng.fill(&mut body[..]);
            let data = pdu(types[rng.random_range(0..types.len())], &body);
            assert!(sasp(&data).is_ok());
            let cut = rng.random_range(0..data.len());
            assert!(matches!(
                sasp(&data[..cut]),
                Err(DecodeError::Truncated { .. })
            ));
        }
    }
}
