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

//! GSM A-interface decoders: BSSMAP, DTAP (with its MM, RR, CC, GMM, SM,
//! SMS and SS message sets) and RP.
//!
//! Every message set is a static table of [`elem::MsgDesc`] run through
//! the generic element driver of [`elem`]; each module only provides the
//! element decoders and the tables.

pub mod bssmap;
pub mod cc;
pub mod common;
pub mod dtap;
pub mod elem;
pub mod gmm;
pub mod mm;
pub mod ros;
pub mod rp;
pub mod rr;
pub mod sm;
pub mod sms;
pub mod ss;

pub(crate) use super::frame;

#[cfg(test)]
mod tests {
    use super::elem::{dissect_ies, Body, Decode, Form, IeSpec, MsgDesc, Nibble, Presence};
    use super::*;
    use crate::context::{DecodeContext, DecodeOptions, Direction};
    use crate::error::DecodeError;
    use crate::field::{DecodedField, Diagnostic, FieldTree, Value};
    use crate::proto::dissector::Cursor;
    use crate::proto::BuiltinHandoff;
    use rand::Rng;

    fn tables() -> [(&'static str, &'static [MsgDesc]); 9] {
        [
            ("bssmap", bssmap::MESSAGES),
            ("mm", mm::MESSAGES),
            ("rr", rr::MESSAGES),
            ("cc", cc::MESSAGES),
            ("gmm", gmm::MESSAGES),
            ("sm", sm::MESSAGES),
            ("sms", sms::MESSAGES),
            ("ss", ss::MESSAGES),
            ("rp", rp::MESSAGES),
        ]
    }

    /* width a fixed-size value decoder reads, measured on zeros */
    fn inline_width(ie: &IeSpec, ctx: &DecodeContext) -> Option<usize> {
        match ie.elem.decode {
            Decode::Raw | Decode::Half(_) => Some(1),
            Decode::Full(f) => {
                let zeros = [0u8; 64];
                let mut cur = Cursor::new(&zeros);
                let mut scratch = FieldTree::new();
                match f(&mut cur, ctx, &mut scratch) {
                    Ok(_) if cur.pos() < zeros.len() => Some(cur.pos()),
                    _ => None,
                }
            }
        }
    }

    /* smallest buffer carrying every mandatory element and nothing else */
    fn mandatory_only(ies: &[IeSpec], ctx: &DecodeContext) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        let mut pending_low = false;
        for ie in ies.iter().filter(|ie| ie.presence == Presence::Mandatory) {
            match ie.form {
                Form::T => out.push(ie.iei),
                Form::Tv => {
                    out.push(ie.iei);
                    out.extend(vec![0; inline_width(ie, ctx)?]);
                }
                Form::TvShort => out.push(ie.iei & 0xf0),
                Form::Tlv => out.extend(&[ie.iei, 0]),
                Form::Lv => out.push(0),
                Form::V => out.extend(vec![0; inline_width(ie, ctx)?]),
                Form::VHalf(Nibble::Lo) => {
                    out.push(0);
                    pending_low = true;
                    continue;
                }
                Form::VHalf(Nibble::Hi) => {
                    if !pending_low {
                        out.push(0);
                    }
                }
            }
            pending_low = false;
        }
        Some(out)
    }

    #[test]
    fn mandatory_only_messages() {
        let opts = DecodeOptions::default();
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        let mut checked = 0;
        for (proto, table) in tables().iter() {
            for msg in table.iter() {
                let lists: Vec<&[IeSpec]> = match msg.body {
                    Body::Undecoded => continue,
                    Body::Ies(ies) => vec![ies],
                    Body::ByDirection { uplink, downlink } => vec![uplink, downlink],
                };
                for ies in lists {
                    let data = match mandatory_only(ies, &ctx) {
                        Some(d) => d,
                        None => continue,
                    };
                    let mut cur = Cursor::new(&data);
                    let mut tree = FieldTree::new();
                    dissect_ies(&mut cur, &ctx, ies, &mut tree).unwrap();
                    let root = DecodedField::new("Test", 0, data.len(), Value::Tree(tree.into_fields()));
                    let missing = root
                        .diagnostics()
                        .iter()
                        .filter(|d| d.diag == Some(Diagnostic::MissingMandatoryElement))
                        .count();
                    assert_eq!(missing, 0, "{} {}", proto, msg.name);
                    checked += 1;
                }
            }
        }
        assert!(checked > 100);
    }

    #[test]
    fn message_codes_are_unique() {
        for (proto, table) in tables().iter() {
            let mut codes: Vec<u8> = table.iter().map(|m| m.code).collect();
            codes.sort_unstable();
            let n = codes.len();
            codes.dedup();
            assert_eq!(codes.len(), n, "{}", proto);
        }
    }

    #[test]
    fn long_elements_never_panic() {
        /* every TLV/LV element of every message, with a 255-byte value */
        let mut rng = rand::rng();
        let mut checked = 0;
        for direction in [Direction::Uplink, Direction::Downlink, Direction::Unknown].iter() {
            let opts = DecodeOptions {
                direction: *direction,
                ..Default::default()
            };
            let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
            for (proto, table) in tables().iter() {
                for msg in table.iter() {
                    let lists: Vec<&[IeSpec]> = match msg.body {
                        Body::Undecoded => continue,
                        Body::Ies(ies) => vec![ies],
                        Body::ByDirection { uplink, downlink } => vec![uplink, downlink],
                    };
                    for ie in lists.iter().flat_map(|ies| ies.iter()) {
                        let head: Vec<u8> = match ie.form {
                            Form::Tlv => vec![ie.iei, 0xff],
                            Form::Lv => vec![0xff],
                            _ => continue,
                        };
                        let mut random = [0u8; 255];
                        rng.fill(&mut random[..]);
                        for value in [[0x00; 255], [0xff; 255], [0x7f; 255], random].iter() {
                            let mut data = head.clone();
                            data.extend_from_slice(value);
                            let mut cur = Cursor::new(&data);
                            let mut tree = FieldTree::new();
                            match dissect_ies(&mut cur, &ctx, &[*ie], &mut tree) {
                                Ok(()) => assert!(!tree.is_empty(), "{} {}", proto, msg.name),
                                Err(DecodeError::RecursionLimitExceeded { .. }) => {}
                                Err(e) => panic!("{} {} {}: {}", proto, msg.name, ie.elem.name, e),
                            }
                            checked += 1;
                        }
                    }
                }
            }
        }
        assert!(checked > 100);
    }

    #[test]
    fn random_frames_never_panic() {
        let mut rng = rand::rng();
        for direction in [Direction::Uplink, Direction::Downlink, Direction::Unknown].iter() {
            let opts = DecodeOptions {
                direction: *direction,
                ..Default::default()
            };
            let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
            for _ in 0..2000 {
                let len = rng.random_range(0..300);
                let mut data = vec![0u8; len];
                rng.fill(&mut data[..]);
                let _ = bssmap::dissect(&data, &ctx);
                let _ = dtap::dissect(&data, &ctx);
                let _ = rp::dissect(&data, &ctx);
                /* steer the first octets towards known message sets */
                if len >= 2 {
                    let pd = [0x03, 0x05, 0x06, 0x08, 0x09, 0x0a, 0x0b][rng.random_range(0..7)];
                    data[0] = (data[0] & 0xf0) | pd;
                    let _ = dtap::dissect(&data, &ctx);
                    data[0] = bssmap::MESSAGES[rng.random_range(0..bssmap::MESSAGES.len())].code;
                    let _ = bssmap::dissect(&data, &ctx);
                }
            }
        }
    }
}
