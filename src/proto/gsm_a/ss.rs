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

/* Non call related supplementary services (3GPP TS 24.080 2.4) */

use lazy_static::lazy_static;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::vals::{Fallback, ValueString};

use super::cc::CAUSE;
use super::elem::{mand, octet, opt, Body, ElemDesc, Form, IeSpec, MsgDesc, MsgIndex};
use super::ros::FACILITY;

static SS_VERSION_VALS: ValueString = ValueString::new(
    &[
        (0, "Phase 2 service, ellipsis notation, and phase 2 error handling is supported"),
        (1, "SS-Protocol version 3 is supported, and phase 2 error handling is supported"),
    ],
    Fallback::Reserved,
);

/// SS Version Indicator (24.080 3.7.2)
fn de_ss_version(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("SS Version Indicator", offset, 1, v, &SS_VERSION_VALS);
    let rest_offset = cur.pos();
    let rest = cur.rest();
    if !rest.is_empty() {
        /* further octets are ignored by receivers */
        tree.bytes("Ignored", rest_offset, rest);
    }
    Ok(Some(label.into_owned()))
}

pub const SS_VERSION: ElemDesc = ElemDesc::full("SS Version Indicator", de_ss_version);

const REGISTER: &[IeSpec] = &[
    mand(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const FACILITY_MSG: &[IeSpec] = &[mand(Form::Lv, 0, FACILITY)];

const RELEASE_COMPLETE: &[IeSpec] = &[
    opt(Form::Tlv, 0x08, CAUSE),
    opt(Form::Tlv, 0x1c, FACILITY),
];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x2a, "Release Complete", Body::Ies(RELEASE_COMPLETE)),
    MsgDesc::new(0x3a, "Facility", Body::Ies(FACILITY_MSG)),
    MsgDesc::new(0x3b, "Register", Body::Ies(REGISTER)),
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
    fn register_ussd() {
        /* Invoke processUnstructuredSS-Request with a generic parameter, SS version 0 */
        let data = [
            0x1c, 0x0d, 0xa1, 0x0b, 0x02, 0x01, 0x01, 0x02, 0x01, 0x3b, 0x30, 0x03, 0x04,
            0x01, 0x0f, 0x7f, 0x01, 0x00,
        ];
        let f = run(&data, REGISTER, Direction::Uplink).unwrap();
        assert_eq!(
            f.find("Invoke").unwrap().summary.as_deref(),
            Some("ProcessUnstructuredSS-Request")
        );
        assert_eq!(
            f.find("SS Version Indicator").unwrap().summary.as_deref(),
            Some("Phase 2 service, ellipsis notation, and phase 2 error handling is supported")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn missing_facility() {
        let f = run(&[0x7f, 0x01, 0x00], REGISTER, Direction::Uplink).unwrap();
        let d = f.diagnostics();
        assert_eq!(d.len(), 1);
        assert_eq!(
            d[0].name,
            "Missing Mandatory element (0x1c) Facility, rest of dissection is suspect"
        );
    }
}
