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

/* Direct Transfer Application Part (3GPP TS 24.007 11.2, 24.008 10) */

use log::*;
use strum_macros::EnumIter;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::{Diagnostic, Dissection, FieldTree};
use crate::proto::dissector::Cursor;
use crate::utils::vals::TrueFalse;

use super::common::PD_VALS;
use super::elem::{dissect_msg, octet, MsgDesc};
use super::frame;
use super::{cc, gmm, mm, rr, sm, sms, ss};

pub const PROTOCOL: &str = "GSM A-I/F DTAP";

static TF_TI_FLAG: TrueFalse = TrueFalse("allocated by receiver", "allocated by sender");
static TF_EXT: TrueFalse = TrueFalse("Not extended", "Extended");

/// Protocol discriminators this decoder dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Pd {
    Cc = 0x03,
    Mm = 0x05,
    Rr = 0x06,
    Gmm = 0x08,
    Sms = 0x09,
    Sm = 0x0a,
    Ss = 0x0b,
}

impl Pd {
    pub fn from_u8(pd: u8) -> Option<Self> {
        match pd {
            0x03 => Some(Pd::Cc),
            0x05 => Some(Pd::Mm),
            0x06 => Some(Pd::Rr),
            0x08 => Some(Pd::Gmm),
            0x09 => Some(Pd::Sms),
            0x0a => Some(Pd::Sm),
            0x0b => Some(Pd::Ss),
            _ => None,
        }
    }

    /// Octet 1 high nibble is a transaction identifier rather than a skip
    /// indicator.
    pub fn has_ti(self) -> bool {
        matches!(self, Pd::Cc | Pd::Sms | Pd::Sm | Pd::Ss)
    }

    /// Message type bits 7-8 carry N(SD).
    pub fn has_nsd(self) -> bool {
        matches!(self, Pd::Mm | Pd::Cc | Pd::Ss)
    }

    fn type_field(self) -> &'static str {
        match self {
            Pd::Cc => "DTAP Call Control Message Type",
            Pd::Mm => "DTAP Mobility Management Message Type",
            Pd::Rr => "DTAP Radio Resources Management Message Type",
            Pd::Gmm => "DTAP GPRS Mobility Management Message Type",
            Pd::Sms => "DTAP Short Message Service Message Type",
            Pd::Sm => "DTAP GPRS Session Management Message Type",
            Pd::Ss => "DTAP Non call related SS Message Type",
        }
    }

    pub fn message(self, code: u8) -> Option<&'static MsgDesc> {
        match self {
            Pd::Cc => cc::message(code),
            Pd::Mm => mm::message(code),
            Pd::Rr => rr::message(code),
            Pd::Gmm => gmm::message(code),
            Pd::Sms => sms::message(code),
            Pd::Sm => sm::message(code),
            Pd::Ss => ss::message(code),
        }
    }
}

/// Decodes one DTAP message: the PD / TI octet, the message type and the
/// elements of the message.
pub fn dissect(data: &[u8], ctx: &DecodeContext) -> DResult<Dissection> {
    let mut cur = Cursor::new(data);
    let mut tree = FieldTree::new();
    let (offset, oct) = octet(&mut cur)?;
    let raw_pd = (oct & 0x0f) as u8;
    let pd = match Pd::from_u8(raw_pd) {
        Some(pd) => pd,
        None => {
            let name = format!("Unknown PD (0x{:02x})", raw_pd);
            warn!("{}", name);
            tree.bits_label("Protocol Discriminator", offset, 1, oct, 0x0f, &PD_VALS);
            tree.diag(Diagnostic::UnknownProtocol, name.clone(), offset, &[]);
            let rest_offset = cur.pos();
            let rest = cur.rest();
            if !rest.is_empty() {
                tree.bytes("Message Elements", rest_offset, rest);
            }
            return Ok(frame(PROTOCOL, name, data.len(), tree));
        }
    };
    if pd.has_ti() {
        tree.bits_bool("TI flag", offset, 1, oct, 0x80, &TF_TI_FLAG);
        let ti = tree.bits_uint("TIO", offset, 1, oct, 0x70);
        tree.bits_label("Protocol Discriminator", offset, 1, oct, 0x0f, &PD_VALS);
        if ti == 7 {
            /* TI value continues in the next octet */
            let (offset, ext) = octet(&mut cur)?;
            tree.bits_bool("Extension", offset, 1, ext, 0x80, &TF_EXT);
            tree.bits_uint("TIE", offset, 1, ext, 0x7f);
        }
    } else {
        tree.bits_uint("Skip Indicator", offset, 1, oct, 0xf0);
        tree.bits_label("Protocol Discriminator", offset, 1, oct, 0x0f, &PD_VALS);
    }

    let (offset, oct) = octet(&mut cur)?;
    let mask = if pd.has_nsd() { 0x3f } else { 0xff };
    let code = (oct & mask) as u8;
    let msg = match pd.message(code) {
        Some(m) => m,
        None => {
            let name = format!("Unknown DTAP Message Type (0x{:02x})", code);
            warn!("{}", name);
            tree.diag(Diagnostic::UnknownMessageType, name.clone(), offset, &[]);
            return Ok(frame(PROTOCOL, name, data.len(), tree));
        }
    };
    debug!("DTAP {:?} {}", pd, msg.name);
    if pd.has_nsd() {
        tree.bits_uint("Sequence Number", offset, 1, oct, 0xc0);
    }
    tree.bits_text(pd.type_field(), offset, 1, oct, mask, msg.name);
    dissect_msg(&mut cur, ctx, msg, &mut tree)?;
    Ok(frame(PROTOCOL, msg.name.to_string(), data.len(), tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecodeOptions, Direction};
    use crate::error::DecodeError;
    use crate::proto::BuiltinHandoff;
    use strum::IntoEnumIterator;

    fn dtap(data: &[u8], direction: Direction) -> DResult<Dissection> {
        let opts = DecodeOptions {
            direction,
            ..Default::default()
        };
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        dissect(data, &ctx)
    }

    #[test]
    fn pd_round_trip() {
        for pd in Pd::iter() {
            assert_eq!(Pd::from_u8(pd as u8), Some(pd));
            assert!(pd.type_field().starts_with("DTAP "));
        }
        assert_eq!(Pd::iter().filter(|pd| pd.has_ti()).count(), 4);
        assert!(Pd::from_u8(0x0c).is_none());
    }

    #[test]
    fn location_updating_request() {
        let data = [
            0x05, 0x08, 0x72, 0x02, 0xf8, 0x01, 0x00, 0x01, 0x33, 0x08, 0x09, 0x10, 0x10,
            0x10, 0x32, 0x54, 0x76, 0x98,
        ];
        let d = dtap(&data, Direction::Unknown).unwrap();
        assert_eq!(d.protocol, PROTOCOL);
        assert_eq!(d.info, "Location Updating Request");
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.find("Skip Indicator").and_then(|f| f.as_u64()), Some(0));
        assert_eq!(d.find("Sequence Number").and_then(|f| f.as_u64()), Some(0));
        let imsi = d.find("IMSI").unwrap();
        assert_eq!(imsi.as_str(), Some("001010123456789"));
        assert_eq!(imsi.offset, 10);
    }

    #[test]
    fn send_sequence_number_is_masked() {
        /* MM Null with N(SD) = 2 */
        let d = dtap(&[0x05, 0xb0], Direction::Uplink).unwrap();
        assert_eq!(d.info, "MM Null");
        assert_eq!(d.find("Sequence Number").and_then(|f| f.as_u64()), Some(2));
    }

    #[test]
    fn ti_extension_octet() {
        let d = dtap(&[0x73, 0x8c, 0x0f], Direction::Downlink).unwrap();
        assert_eq!(d.info, "Connect Acknowledge");
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.find("TIO").and_then(|f| f.as_u64()), Some(7));
        let tie = d.find("TIE").unwrap();
        assert_eq!((tie.offset, tie.as_u64()), (1, Some(0x0c)));
        /* no extension below 7 */
        let d = dtap(&[0x63, 0x0f], Direction::Downlink).unwrap();
        assert_eq!(d.info, "Connect Acknowledge");
        assert!(d.find("TIE").is_none());
        /* extension announced but missing */
        assert!(matches!(
            dtap(&[0x73], Direction::Downlink),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn skip_indicator_pd_ignores_ti_value() {
        /* TI value 7 is meaningless for MM */
        let d = dtap(&[0x75, 0x30], Direction::Unknown).unwrap();
        assert_eq!(d.info, "MM Null");
        assert_eq!(d.find("Skip Indicator").and_then(|f| f.as_u64()), Some(7));
    }

    #[test]
    fn unknown_pd() {
        let d = dtap(&[0x0c, 0x01, 0x02], Direction::Unknown).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::UnknownProtocol));
        assert_eq!(diags[0].name, "Unknown PD (0x0c)");
        let body = d.find("Message Elements").unwrap();
        assert_eq!((body.offset, body.len), (1, 2));
    }

    #[test]
    fn unknown_message_type() {
        let d = dtap(&[0x06, 0x01, 0xaa], Direction::Unknown).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].name, "Unknown DTAP Message Type (0x01)");
        assert_eq!(d.info, "Unknown DTAP Message Type (0x01)");
    }
}
