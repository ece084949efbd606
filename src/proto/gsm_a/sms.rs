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

/* Short Message Service, CP layer (3GPP TS 24.011 7.2, 8.1) */

use lazy_static::lazy_static;

use crate::context::{DecodeContext, SubProtocol};
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::vals::{Fallback, ValueString};

use super::elem::{delegate, mand, octet, Body, ElemDesc, Form, IeSpec, MsgDesc, MsgIndex};

static CP_CAUSE: ValueString = ValueString::new(
    &[
        (17, "Network failure"),
        (22, "Congestion"),
        (81, "Invalid Transaction Identifier value"),
        (95, "Semantically incorrect message"),
        (96, "Invalid mandatory information"),
        (97, "Message type non-existent or not implemented"),
        (98, "Message not compatible with the short message protocol state"),
        (99, "Information element non-existent or not implemented"),
        (111, "Protocol error, unspecified"),
    ],
    Fallback::Static("Protocol error, unspecified"),
);

/// CP-User Data (8.1.4.1): an RPDU
fn de_cp_user_data(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let before = tree.len();
    delegate(cur, ctx, SubProtocol::Rp, tree)?;
    if tree.len() > before {
        return Ok(tree.fields().last().and_then(|f| f.summary.clone()));
    }
    Ok(None)
}

fn de_cp_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("Cause", offset, 1, v, &CP_CAUSE);
    Ok(Some(label.into_owned()))
}

const CP_USER_DATA: ElemDesc = ElemDesc::full("CP-User Data", de_cp_user_data);
const CP_CAUSE_E: ElemDesc = ElemDesc::full("CP-Cause", de_cp_cause);

const CP_DATA: &[IeSpec] = &[mand(Form::Lv, 0, CP_USER_DATA)];
const CP_ERROR: &[IeSpec] = &[mand(Form::V, 0, CP_CAUSE_E)];
const EMPTY: &[IeSpec] = &[];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x01, "CP-DATA", Body::Ies(CP_DATA)),
    MsgDesc::new(0x04, "CP-ACK", Body::Ies(EMPTY)),
    MsgDesc::new(0x10, "CP-ERROR", Body::Ies(CP_ERROR)),
];

lazy_static! {
    static ref INDEX: MsgIndex = MsgIndex::new(MESSAGES);
}

pub fn message(code: u8) -> Option<&'static MsgDesc> {
    INDEX.get(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Direction;
    use crate::proto::gsm_a::elem::tests::run;

    #[test]
    fn cp_data_carries_rp() {
        /* RP-ERROR (Network to MS), reference 1, memory capacity exceeded */
        let data = [0x04, 0x05, 0x01, 0x01, 0x16];
        let f = run(&data, CP_DATA, Direction::Downlink).unwrap();
        assert!(f.diagnostics().is_empty());
        assert_eq!(
            f.find("CP-User Data").unwrap().summary.as_deref(),
            Some("RP-ERROR (Network to MS)")
        );
        let cause = f.find("RP-Cause").unwrap();
        assert_eq!(cause.summary.as_deref(), Some("Memory capacity exceeded"));
        assert_eq!(cause.offset, 3);
    }

    #[test]
    fn cp_error() {
        let f = run(&[0x51], CP_ERROR, Direction::Uplink).unwrap();
        assert_eq!(
            f.find("CP-Cause").unwrap().summary.as_deref(),
            Some("Invalid Transaction Identifier value")
        );
        assert_eq!(message(0x04).map(|m| m.name), Some("CP-ACK"));
    }
}
