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

/* Mobility Management (3GPP TS 24.008 9.2, elements 10.5.3) */

use lazy_static::lazy_static;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::bcd;
use crate::utils::gsm7;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::common::{CKSN, LAI, MOBILE_ID, MS_CM_1, MS_CM_2, PLMN_LIST, PRIORITY, SPARE_HALF};
use super::elem::{mand, octet, opt, Body, ElemDesc, Form, Half, IeSpec, MsgDesc, MsgIndex, Nibble};

pub static REJECT_CAUSE: ValueString = ValueString::new(
    &[
        (0x02, "IMSI unknown in HLR"),
        (0x03, "Illegal MS"),
        (0x04, "IMSI unknown in VLR"),
        (0x05, "IMEI not accepted"),
        (0x06, "Illegal ME"),
        (0x0b, "PLMN not allowed"),
        (0x0c, "Location Area not allowed"),
        (0x0d, "Roaming not allowed in this location area"),
        (0x0f, "No Suitable Cells In Location Area"),
        (0x11, "Network failure"),
        (0x14, "MAC failure"),
        (0x15, "Synch failure"),
        (0x16, "Congestion"),
        (0x17, "GSM authentication unacceptable"),
        (0x20, "Service option not supported"),
        (0x21, "Requested service option not subscribed"),
        (0x22, "Service option temporarily out of order"),
        (0x26, "Call cannot be identified"),
        (0x30, "retry upon entry into a new cell"),
        (0x5f, "Semantically incorrect message"),
        (0x60, "Invalid mandatory information"),
        (0x61, "Message type non-existent or not implemented"),
        (0x62, "Message type not compatible with the protocol state"),
        (0x63, "Information element non-existent or not implemented"),
        (0x64, "Conditional IE error"),
        (0x65, "Message not compatible with the protocol state"),
        (0x6f, "Protocol error, unspecified"),
    ],
    Fallback::Static("Service option temporarily out of order"),
);

static CM_SERVICE_TYPE: ValueString = ValueString::new(
    &[
        (1, "Mobile originating call establishment or packet mode connection establishment"),
        (2, "Emergency call establishment"),
        (4, "Short message service"),
        (8, "Supplementary service activation"),
        (9, "Voice group call establishment"),
        (10, "Voice broadcast call establishment"),
        (11, "Location Services"),
    ],
    Fallback::Reserved,
);

static LU_TYPE: ValueString = ValueString::new(
    &[
        (0, "Normal"),
        (1, "Periodic"),
        (2, "IMSI Attach"),
        (3, "Reserved"),
    ],
    Fallback::Reserved,
);

static TF_FOR: TrueFalse = TrueFalse("Follow-on request pending", "No follow-on request pending");

static ID_TYPE: ValueString = ValueString::new(
    &[(1, "IMSI"), (2, "IMEI"), (3, "IMEISV"), (4, "TMSI")],
    Fallback::Reserved,
);

static CODING_SCHEME: ValueString = ValueString::new(
    &[
        (0, "Cell Broadcast data coding scheme, GSM default alphabet, language unspecified, defined in 3GPP TS 03.38"),
        (1, "UCS2 (16 bit)"),
    ],
    Fallback::Reserved,
);

static TF_ADD_CI: TrueFalse = TrueFalse(
    "The MS should add the letters for the Country's Initials and a separator (e.g. a space) to the text string",
    "The MS should not add the letters for the Country's Initials to the text string",
);

static TF_EXT: TrueFalse = TrueFalse("Extended", "Not extended");

static EMERGENCY_CATEGORY: [&str; 5] = [
    "Police",
    "Ambulance",
    "Fire Brigade",
    "Marine Guard",
    "Mountain Rescue",
];

/// Location Updating Type (10.5.3.5)
fn de_lu_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_bool("Follow-On Request (FOR)", half.offset, 1, raw, half.mask(0x08), &TF_FOR);
    tree.spare(half.offset, 1, raw, half.mask(0x04));
    let v = tree.bits_label("Updating Type", half.offset, 1, raw, half.mask(0x03), &LU_TYPE);
    Some(LU_TYPE.label(v).into_owned())
}

/// CM Service Type (10.5.3.3)
fn de_cm_srvc_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let v = tree.bits_label(
        "Service Type",
        half.offset,
        1,
        half.oct as u32,
        half.mask(0x0f),
        &CM_SERVICE_TYPE,
    );
    Some(CM_SERVICE_TYPE.label(v).into_owned())
}

/// Identity Type (10.5.3.4)
fn de_id_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x08));
    let v = tree.bits_label("Type of identity", half.offset, 1, half.oct as u32, half.mask(0x07), &ID_TYPE);
    Some(ID_TYPE.label(v).into_owned())
}

fn de_rand(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    tree.bytes("RAND value", offset, cur.take(16)?);
    Ok(None)
}

fn de_sres(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    tree.bytes("SRES value", offset, cur.take(4)?);
    Ok(None)
}

/// Reject Cause (10.5.3.6)
pub fn de_reject_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("Reject Cause value", offset, 1, v, &REJECT_CAUSE);
    Ok(Some(label.into_owned()))
}

/// Network Name (10.5.3.5a)
pub fn de_network_name(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
    let coding = tree.bits_label("Coding Scheme", offset, 1, oct, 0x70, &CODING_SCHEME);
    tree.bits_bool("Add CI", offset, 1, oct, 0x08, &TF_ADD_CI);
    let spare_bits = tree.bits_uint("Number of spare bits in last octet", offset, 1, oct, 0x07);
    let text_offset = cur.pos();
    let data = cur.rest();
    let name = match coding {
        0 => gsm7::decode(data, gsm7::char_count(data.len(), spare_bits as usize)),
        1 => {
            let units: Vec<u16> = data
                .chunks(2)
                .filter(|c| c.len() == 2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => {
            tree.bytes("Text String", text_offset, data);
            return Ok(None);
        }
    };
    tree.text("Text String", text_offset, data.len(), name.clone());
    Ok(Some(name))
}

/* swapped BCD octet as used in time stamps */
fn swapped(oct: u8) -> u32 {
    ((oct & 0x0f) as u32) * 10 + (oct >> 4) as u32
}

fn time_zone(oct: u8) -> String {
    let quarters = ((oct & 0x07) as u32) * 10 + (oct >> 4) as u32;
    let sign = if oct & 0x08 != 0 { '-' } else { '+' };
    format!("GMT {} {} hours {} minutes", sign, quarters / 4, (quarters % 4) * 15)
}

/// Time Zone (10.5.3.8)
pub fn de_time_zone(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let oct = cur.read_u8()?;
    let tz = time_zone(oct);
    tree.text("Timezone", offset, 1, tz.clone());
    Ok(Some(tz))
}

/// Time Zone and Time (10.5.3.9)
pub fn de_time_zone_time(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let b = cur.take(7)?;
    let stamp = format!(
        "{:02}/{:02}/{:02} {:02}:{:02}:{:02}",
        swapped(b[0]),
        swapped(b[1]),
        swapped(b[2]),
        swapped(b[3]),
        swapped(b[4]),
        swapped(b[5])
    );
    tree.text("Year/Month/Day - Hour:Minute:Second", offset, 6, stamp.clone());
    tree.text("Timezone", offset + 6, 1, time_zone(b[6]));
    Ok(Some(stamp))
}

/// Daylight Saving Time (10.5.3.12)
fn de_day_saving(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    static DST: ValueString = ValueString::new(
        &[
            (0, "No adjustment for Daylight Saving Time"),
            (1, "+1 hour adjustment for Daylight Saving Time"),
            (2, "+2 hours adjustment for Daylight Saving Time"),
        ],
        Fallback::Reserved,
    );
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfc);
    let v = tree.bits_label("Value", offset, 1, oct, 0x03, &DST);
    Ok(Some(DST.label(v).into_owned()))
}

/// Emergency Number List (10.5.3.13)
fn de_emerg_num_list(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut n = 0;
    while !cur.is_empty() {
        let start = cur.pos();
        let len = cur.read_u8()? as usize;
        let mut entry = cur.window(len)?;
        let mut sub = FieldTree::new();
        sub.uint("Emergency Number Information length", start, 1, len as u64);
        let (offset, oct) = octet(&mut entry)?;
        sub.spare(offset, 1, oct, 0xe0);
        let mut categories = Vec::new();
        for (i, name) in EMERGENCY_CATEGORY.iter().enumerate() {
            if oct & (1 << i) != 0 {
                categories.push(*name);
            }
        }
        sub.bits_text(
            "Emergency Service Category Value",
            offset,
            1,
            oct,
            0x1f,
            categories.join(", "),
        );
        let num_offset = entry.pos();
        let number = bcd::unpack(entry.rest(), &bcd::TELEPHONE);
        sub.text("Emergency Number", num_offset, len.saturating_sub(1), number.clone());
        n += 1;
        tree.subtree(format!("Emergency Number {}", n), start, len + 1, sub).summary = Some(number);
    }
    Ok(None)
}

const LU_TYPE_E: ElemDesc = ElemDesc::half("Location Updating Type", de_lu_type);
const CM_SRVC_TYPE: ElemDesc = ElemDesc::half("CM Service Type", de_cm_srvc_type);
const ID_TYPE_E: ElemDesc = ElemDesc::half("Identity Type", de_id_type);
const RAND: ElemDesc = ElemDesc::full("Authentication Parameter RAND", de_rand);
const AUTN: ElemDesc = ElemDesc::raw("Authentication Parameter AUTN (UMTS authentication challenge only)");
const SRES: ElemDesc = ElemDesc::full("Authentication Response Parameter", de_sres);
const SRES_EXT: ElemDesc = ElemDesc::raw("Authentication Response Parameter (extension) (UMTS authentication challenge only)");
const AUTH_FAIL: ElemDesc = ElemDesc::raw("Authentication Failure Parameter (UMTS authentication challenge only)");
pub const REJECT: ElemDesc = ElemDesc::full("Reject Cause", de_reject_cause);
pub const NETWORK_NAME: ElemDesc = ElemDesc::full("Network Name", de_network_name);
pub const TIME_ZONE: ElemDesc = ElemDesc::full("Time Zone", de_time_zone);
pub const TIME_ZONE_TIME: ElemDesc = ElemDesc::full("Time Zone and Time", de_time_zone_time);
pub const LSA_ID: ElemDesc = ElemDesc::raw("LSA Identifier");
pub const DAY_SAVING: ElemDesc = ElemDesc::full("Daylight Saving Time", de_day_saving);
pub const EMERG_NUM_LIST: ElemDesc = ElemDesc::full("Emergency Number List", de_emerg_num_list);
const FOLLOW_ON: ElemDesc = ElemDesc::raw("Follow-on Proceed");
const CTS_PERM: ElemDesc = ElemDesc::raw("CTS Permission");
const PD_SAPI: ElemDesc = ElemDesc::raw("PD and SAPI $(CCBS)$");

const IMSI_DET_IND: &[IeSpec] = &[mand(Form::V, 0, MS_CM_1), mand(Form::Lv, 0, MOBILE_ID)];

const LOC_UPD_ACC: &[IeSpec] = &[
    mand(Form::V, 0, LAI),
    opt(Form::Tlv, 0x17, MOBILE_ID),
    opt(Form::T, 0xa1, FOLLOW_ON),
    opt(Form::T, 0xa2, CTS_PERM),
    opt(Form::Tlv, 0x4a, PLMN_LIST).named(" - Equivalent PLMNs"),
    opt(Form::Tlv, 0x34, EMERG_NUM_LIST),
];

const CAUSE_ONLY: &[IeSpec] = &[mand(Form::V, 0, REJECT)];

const LOC_UPD_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, LU_TYPE_E),
    mand(Form::VHalf(Nibble::Hi), 0, CKSN),
    mand(Form::V, 0, LAI),
    mand(Form::V, 0, MS_CM_1),
    mand(Form::Lv, 0, MOBILE_ID),
    opt(Form::Tlv, 0x33, MS_CM_2).named(" - Mobile Station Classmark for UMTS"),
];

const AUTH_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CKSN),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    mand(Form::V, 0, RAND),
    opt(Form::Tlv, 0x20, AUTN),
];

const AUTH_RESP: &[IeSpec] = &[mand(Form::V, 0, SRES), opt(Form::Tlv, 0x21, SRES_EXT)];

const AUTH_FAIL_IES: &[IeSpec] = &[mand(Form::V, 0, REJECT), opt(Form::Tlv, 0x22, AUTH_FAIL)];

const ID_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, ID_TYPE_E),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
];

const ID_RES: &[IeSpec] = &[mand(Form::Lv, 0, MOBILE_ID)];

const TMSI_REALLOC_CMD: &[IeSpec] = &[mand(Form::V, 0, LAI), mand(Form::Lv, 0, MOBILE_ID)];

const CM_SRVC_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CM_SRVC_TYPE),
    mand(Form::VHalf(Nibble::Hi), 0, CKSN),
    mand(Form::Lv, 0, MS_CM_2),
    mand(Form::Lv, 0, MOBILE_ID),
    opt(Form::TvShort, 0x80, PRIORITY),
];

const CM_SRVC_PROMPT: &[IeSpec] = &[mand(Form::V, 0, PD_SAPI)];

const CM_REESTAB_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CKSN),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    mand(Form::Lv, 0, MS_CM_2),
    mand(Form::Lv, 0, MOBILE_ID),
    opt(Form::Tv, 0x13, LAI),
];

const MM_INFO: &[IeSpec] = &[
    opt(Form::Tlv, 0x43, NETWORK_NAME).named(" - Full Name"),
    opt(Form::Tlv, 0x45, NETWORK_NAME).named(" - Short Name"),
    opt(Form::Tv, 0x46, TIME_ZONE).named(" - Local"),
    opt(Form::Tv, 0x47, TIME_ZONE_TIME).named(" - Universal Time and Local Time Zone"),
    opt(Form::Tlv, 0x48, LSA_ID),
    opt(Form::Tlv, 0x49, DAY_SAVING),
];

const EMPTY: &[IeSpec] = &[];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x01, "IMSI Detach Indication", Body::Ies(IMSI_DET_IND)).up(),
    MsgDesc::new(0x02, "Location Updating Accept", Body::Ies(LOC_UPD_ACC)).down(),
    MsgDesc::new(0x04, "Location Updating Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x08, "Location Updating Request", Body::Ies(LOC_UPD_REQ)).up(),
    MsgDesc::new(0x11, "Authentication Reject", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x12, "Authentication Request", Body::Ies(AUTH_REQ)).down(),
    MsgDesc::new(0x14, "Authentication Response", Body::Ies(AUTH_RESP)).up(),
    MsgDesc::new(0x1c, "Authentication Failure", Body::Ies(AUTH_FAIL_IES)).up(),
    MsgDesc::new(0x18, "Identity Request", Body::Ies(ID_REQ)).down(),
    MsgDesc::new(0x19, "Identity Response", Body::Ies(ID_RES)).up(),
    MsgDesc::new(0x1a, "TMSI Reallocation Command", Body::Ies(TMSI_REALLOC_CMD)).down(),
    MsgDesc::new(0x1b, "TMSI Reallocation Complete", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x21, "CM Service Accept", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x22, "CM Service Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x23, "CM Service Abort", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x24, "CM Service Request", Body::Ies(CM_SRVC_REQ)).up(),
    MsgDesc::new(0x25, "CM Service Prompt", Body::Ies(CM_SRVC_PROMPT)).down(),
    MsgDesc::new(0x26, "Reserved: was allocated in earlier phases of the protocol", Body::Undecoded),
    MsgDesc::new(0x28, "CM Re-establishment Request", Body::Ies(CM_REESTAB_REQ)).up(),
    MsgDesc::new(0x29, "Abort", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x30, "MM Null", Body::Ies(EMPTY)),
    MsgDesc::new(0x31, "MM Status", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x32, "MM Information", Body::Ies(MM_INFO)).down(),
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
    fn location_updating_request() {
        /* LU type IMSI attach, CKSN 7, LAI 208/10 0x0001, CM1, IMSI */
        let data = [
            0x72, 0x02, 0xf8, 0x01, 0x00, 0x01, 0x33, 0x08, 0x09, 0x10, 0x10, 0x10, 0x32,
            0x54, 0x76, 0x98,
        ];
        let f = run(&data, LOC_UPD_REQ, Direction::Uplink).unwrap();
        assert_eq!(f.find("Location Updating Type").unwrap().summary.as_deref(), Some("IMSI Attach"));
        assert_eq!(
            f.find("Ciphering Key Sequence Number").unwrap().summary.as_deref(),
            Some("No key is available")
        );
        assert_eq!(f.find("IMSI").and_then(|i| i.as_str()), Some("001010123456789"));
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn mm_information() {
        /* full name "hellohello" in GSM 7-bit, local time zone +2h */
        let data = [
            0x43, 0x0a, 0x82, 0xe8, 0x32, 0x9b, 0xfd, 0x46, 0x97, 0xd9, 0xec, 0x37, 0x46,
            0x80, 0x47, 0x60, 0x01, 0x91, 0x21, 0x43, 0x65, 0x80,
        ];
        let f = run(&data, MM_INFO, Direction::Downlink).unwrap();
        assert_eq!(
            f.find("Network Name - Full Name").unwrap().summary.as_deref(),
            Some("hellohello")
        );
        assert_eq!(
            f.find("Time Zone - Local").unwrap().summary.as_deref(),
            Some("GMT + 2 hours 0 minutes")
        );
        assert_eq!(
            f.find("Time Zone and Time - Universal Time and Local Time Zone")
                .unwrap()
                .summary
                .as_deref(),
            Some("06/10/19 12:34:56")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn reject_cause_fallback() {
        let f = run(&[0x6f], CAUSE_ONLY, Direction::Downlink).unwrap();
        assert_eq!(
            f.find("Reject Cause value").and_then(|c| c.label()),
            Some("Protocol error, unspecified")
        );
        let f = run(&[0x70], CAUSE_ONLY, Direction::Downlink).unwrap();
        assert_eq!(
            f.find("Reject Cause value").and_then(|c| c.label()),
            Some("Service option temporarily out of order")
        );
    }

    #[test]
    fn emergency_numbers() {
        let data = [0x34, 0x08, 0x03, 0x01, 0x11, 0xf2, 0x03, 0x06, 0x11, 0xf2];
        let ies = [opt(Form::Tlv, 0x34, EMERG_NUM_LIST)];
        let f = run(&data, &ies, Direction::Downlink).unwrap();
        assert_eq!(f.find("Emergency Number 1").unwrap().summary.as_deref(), Some("112"));
        assert_eq!(
            f.find("Emergency Number 2")
                .and_then(|e| e.find("Emergency Service Category Value"))
                .and_then(|c| c.label()),
            Some("Ambulance, Fire Brigade")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn index() {
        assert_eq!(message(0x24).map(|m| m.name), Some("CM Service Request"));
        assert!(message(0x3f).is_none());
    }
}
