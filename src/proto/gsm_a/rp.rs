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

/* Short Message Service, relay layer (3GPP TS 24.011 7.3, 8.2) */

use lazy_static::lazy_static;
use log::*;

use crate::context::{DecodeContext, SubProtocol};
use crate::error::DResult;
use crate::field::{Diagnostic, Dissection, FieldTree};
use crate::proto::dissector::Cursor;
use crate::utils::bcd;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::elem::{delegate, dissect_msg, mand, octet, opt, Body, ElemDesc, Form, IeSpec, MsgDesc, MsgIndex};
use super::frame;

pub const PROTOCOL: &str = "GSM A-I/F RP";

static RP_CAUSE: ValueString = ValueString::new(
    &[
        (1, "Unassigned (unallocated) number"),
        (8, "Operator determined barring"),
        (10, "Call barred"),
        (11, "Reserved"),
        (21, "Short message transfer rejected"),
        (22, "Memory capacity exceeded"),
        (27, "Destination out of order"),
        (28, "Unidentified subscriber"),
        (29, "Facility rejected"),
        (30, "Unknown subscriber"),
        (38, "Network out of order"),
        (41, "Temporary failure"),
        (42, "Congestion"),
        (47, "Resources unavailable, unspecified"),
        (50, "Requested facility not subscribed"),
        (69, "Requested facility not implemented"),
        (81, "Invalid short message transfer reference value"),
        (95, "Semantically incorrect message"),
        (96, "Invalid mandatory information"),
        (97, "Message type non-existent or not implemented"),
        (98, "Message not compatible with short message protocol state"),
        (99, "Information element non-existent or not implemented"),
        (111, "Protocol error, unspecified"),
        (127, "Interworking, unspecified"),
    ],
    Fallback::Static("Protocol error, unspecified"),
);

static TYPE_OF_NUMBER: ValueString = ValueString::new(
    &[
        (0, "unknown"),
        (1, "international number"),
        (2, "national number"),
        (3, "network specific number"),
        (4, "dedicated access, short code"),
        (7, "reserved for extension"),
    ],
    Fallback::Reserved,
);

static NUMBERING_PLAN: ValueString = ValueString::new(
    &[
        (0, "unknown"),
        (1, "ISDN/telephony numbering plan (Rec. E.164/E.163)"),
        (3, "data numbering plan (Recommendation X.121)"),
        (4, "telex numbering plan (Recommendation F.69)"),
        (8, "national numbering plan"),
        (9, "private numbering plan"),
        (15, "reserved for extension"),
    ],
    Fallback::Reserved,
);

static TF_EXT: TrueFalse = TrueFalse("No extension", "Extended");

/// RP-Originator/Destination Address (8.2.5.1, 8.2.5.2), possibly empty
fn de_rp_addr(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    if cur.is_empty() {
        return Ok(None);
    }
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
    tree.bits_label("Type of number", offset, 1, oct, 0x70, &TYPE_OF_NUMBER);
    tree.bits_label("Numbering plan identification", offset, 1, oct, 0x0f, &NUMBERING_PLAN);
    let digits_offset = cur.pos();
    let data = cur.rest();
    let digits = bcd::unpack(data, &bcd::TELEPHONE);
    tree.text("BCD Digits", digits_offset, data.len(), digits.clone());
    Ok(Some(digits))
}

/// RP-User Data (8.2.5.3): a TPDU
fn de_rp_user_data(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    delegate(cur, ctx, SubProtocol::SmsTpdu, tree)?;
    Ok(None)
}

/// RP-Cause (8.2.5.4)
fn de_rp_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
    let v = tree.bits_label("Cause", offset, 1, oct, 0x7f, &RP_CAUSE);
    if !cur.is_empty() {
        let (offset, diag) = octet(cur)?;
        tree.uint("Diagnostic field", offset, 1, diag as u64);
    }
    Ok(Some(RP_CAUSE.label(v).into_owned()))
}

const RP_ORIG: ElemDesc = ElemDesc::full("RP-Originator Address", de_rp_addr);
const RP_DEST: ElemDesc = ElemDesc::full("RP-Destination Address", de_rp_addr);
const RP_USER_DATA: ElemDesc = ElemDesc::full("RP-User Data", de_rp_user_data);
const RP_CAUSE_E: ElemDesc = ElemDesc::full("RP-Cause", de_rp_cause);

const RP_DATA: &[IeSpec] = &[
    mand(Form::Lv, 0, RP_ORIG),
    mand(Form::Lv, 0, RP_DEST),
    mand(Form::Lv, 0, RP_USER_DATA),
];

const RP_ACK: &[IeSpec] = &[opt(Form::Tlv, 0x41, RP_USER_DATA)];

const RP_ERROR: &[IeSpec] = &[mand(Form::Lv, 0, RP_CAUSE_E), opt(Form::Tlv, 0x41, RP_USER_DATA)];

const EMPTY: &[IeSpec] = &[];

/* the message type carries the direction: even values go MS to network */
pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x00, "RP-DATA (MS to Network)", Body::Ies(RP_DATA)).up(),
    MsgDesc::new(0x01, "RP-DATA (Network to MS)", Body::Ies(RP_DATA)).down(),
    MsgDesc::new(0x02, "RP-ACK (MS to Network)", Body::Ies(RP_ACK)).up(),
    MsgDesc::new(0x03, "RP-ACK (Network to MS)", Body::Ies(RP_ACK)).down(),
    MsgDesc::new(0x04, "RP-ERROR (MS to Network)", Body::Ies(RP_ERROR)).up(),
    MsgDesc::new(0x05, "RP-ERROR (Network to MS)", Body::Ies(RP_ERROR)).down(),
    MsgDesc::new(0x06, "RP-SMMA (MS to Network)", Body::Ies(EMPTY)).up(),
];

lazy_static! {
    static ref INDEX: MsgIndex = MsgIndex::new(MESSAGES);
}

pub fn message(code: u8) -> Option<&'static MsgDesc> {
    INDEX.get(code)
}

/// Decodes one RPDU.
pub fn dissect(data: &[u8], ctx: &DecodeContext) -> DResult<Dissection> {
    let mut cur = Cursor::new(data);
    let mut tree = FieldTree::new();
    let (offset, oct) = octet(&mut cur)?;
    tree.spare(offset, 1, oct, 0xf8);
    let code = (oct & 0x07) as u8;
    let msg = match message(code) {
        Some(m) => m,
        None => {
            let name = format!("Unknown RP Message Type (0x{:02x})", code);
            warn!("{}", name);
            tree.diag(Diagnostic::UnknownMessageType, name.clone(), offset, &[]);
            return Ok(frame(PROTOCOL, name, data.len(), tree));
        }
    };
    debug!("RP {}", msg.name);
    tree.bits_text("Message Type", offset, 1, oct, 0x07, msg.name);
    let (offset, reference) = octet(&mut cur)?;
    tree.uint("RP-Message Reference", offset, 1, reference as u64);
    dissect_msg(&mut cur, ctx, msg, &mut tree)?;
    Ok(frame(PROTOCOL, msg.name.to_string(), data.len(), tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecodeOptions, Direction};
    use crate::error::DecodeError;
    use crate::proto::BuiltinHandoff;

    fn rp(data: &[u8]) -> DResult<Dissection> {
        let opts = DecodeOptions::default();
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        dissect(data, &ctx)
    }

    #[test]
    fn rp_data_uplink() {
        let data = [
            0x00, 0x2a, 0x00, 0x07, 0x91, 0x44, 0x77, 0x58, 0x10, 0x06, 0x50, 0x03, 0x01, 0x02,
            0x03,
        ];
        let d = rp(&data).unwrap();
        assert_eq!(d.info, "RP-DATA (MS to Network)");
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.find("RP-Message Reference").and_then(|r| r.as_u64()), Some(0x2a));
        assert_eq!(
            d.find("RP-Destination Address").unwrap().summary.as_deref(),
            Some("447785016005")
        );
        assert!(d.find("RP-Originator Address").unwrap().summary.is_none());
        let tpdu = d.find("TPDU").unwrap();
        assert_eq!((tpdu.offset, tpdu.len), (12, 3));
    }

    #[test]
    fn direction_follows_message_type() {
        assert_eq!(message(0x00).and_then(|m| m.dir), Some(Direction::Uplink));
        assert_eq!(message(0x05).and_then(|m| m.dir), Some(Direction::Downlink));
        for code in 0..7u8 {
            let up = message(code).and_then(|m| m.dir) == Some(Direction::Uplink);
            assert_eq!(up, code % 2 == 0);
        }
    }

    #[test]
    fn unknown_and_truncated() {
        let d = rp(&[0x07, 0x00]).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].name, "Unknown RP Message Type (0x07)");
        assert!(matches!(rp(&[0x01]), Err(DecodeError::Truncated { .. })));
    }
}
