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

/* Elements shared by several GSM A-interface protocols (3GPP TS 24.008
 * 10.5.1 and friends). */

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::bcd;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::elem::{octet, ElemDesc, Half};

pub static PD_VALS: ValueString = ValueString::new(
    &[
        (0x00, "Group call control"),
        (0x01, "Broadcast call control"),
        (0x02, "Reserved: was allocated in earlier phases of the protocol"),
        (0x03, "Call Control; call related SS messages"),
        (0x04, "GPRS Transparent Transport Protocol (GTTP)"),
        (0x05, "Mobility Management messages"),
        (0x06, "Radio Resources Management messages"),
        (0x07, "Unknown"),
        (0x08, "GPRS Mobility Management messages"),
        (0x09, "SMS messages"),
        (0x0a, "GPRS Session Management messages"),
        (0x0b, "Non call related SS messages"),
        (0x0c, "Location services specified in 3GPP TS 44.071"),
        (0x0d, "Unknown"),
        (0x0e, "Reserved for extension of the PD to one octet length"),
        (0x0f, "Reserved for tests procedures described in 3GPP TS 44.014 and 3GPP TS 34.109"),
    ],
    Fallback::Unknown,
);

static IDENTITY_TYPE: ValueString = ValueString::new(
    &[
        (0, "No Identity Code"),
        (1, "IMSI"),
        (2, "IMEI"),
        (3, "IMEISV"),
        (4, "TMSI/P-TMSI/M-TMSI"),
        (5, "TMGI and optional MBMS Session Identity"),
    ],
    Fallback::Unknown,
);

static TF_ODD_EVEN: TrueFalse = TrueFalse(
    "Odd number of identity digits",
    "Even number of identity digits",
);

static REVISION_LEVEL: ValueString = ValueString::new(
    &[
        (0, "Reserved for GSM phase 1"),
        (1, "Used by GSM phase 2 mobile stations"),
        (2, "Used by mobile stations supporting R99 or later versions of the protocol"),
        (3, "Reserved for future use"),
    ],
    Fallback::Reserved,
);

static TF_ES_IND: TrueFalse = TrueFalse(
    "Controlled Early Classmark Sending option is implemented in the MS",
    "Controlled Early Classmark Sending option is not implemented in the MS",
);

static TF_A5_NOT: TrueFalse = TrueFalse(
    "encryption algorithm not available",
    "encryption algorithm available",
);

static TF_A5: TrueFalse = TrueFalse(
    "encryption algorithm available",
    "encryption algorithm not available",
);

static RF_POWER_CAP: ValueString = ValueString::new(
    &[
        (0, "class 1"),
        (1, "class 2"),
        (2, "class 3"),
        (3, "class 4"),
        (4, "class 5"),
        (7, "RF Power capability is irrelevant in this information element"),
    ],
    Fallback::Reserved,
);

static SS_SCREENING: ValueString = ValueString::new(
    &[
        (0, "Default value of phase 1"),
        (1, "Capability of handling of ellipsis notation and phase 2 error handling"),
        (2, "For future use"),
        (3, "For future use"),
    ],
    Fallback::Reserved,
);

static TF_PS_CAP: TrueFalse = TrueFalse("PS capability present", "PS capability not present");
static TF_SM_CAP: TrueFalse = TrueFalse(
    "Mobile station supports mobile terminated point to point SMS",
    "Mobile station does not support mobile terminated point to point SMS",
);
static TF_VBS: TrueFalse = TrueFalse("VBS capability or notification wanted", "no VBS capability or no notifications wanted");
static TF_VGCS: TrueFalse = TrueFalse("VGCS capability or notification wanted", "no VGCS capability or no notifications wanted");
static TF_FC: TrueFalse = TrueFalse(
    "The MS does support the E-GSM or R-GSM",
    "The MS does not support the E-GSM or R-GSM band",
);
static TF_CM3: TrueFalse = TrueFalse(
    "The MS supports options that are indicated in classmark 3 IE",
    "The MS does not support any options that are indicated in CM3",
);
static TF_LCS_VA: TrueFalse = TrueFalse(
    "LCS value added location request notification capability supported",
    "LCS value added location request notification capability not supported",
);
static TF_UCS2: TrueFalse = TrueFalse(
    "the ME has no preference between the use of the default alphabet and the use of UCS2",
    "the ME has a preference for the default alphabet (defined in 3GPP TS 23.038) over UCS2",
);
static TF_SOLSA: TrueFalse = TrueFalse("The ME supports SoLSA", "The ME does not support SoLSA");
static TF_CMSP: TrueFalse = TrueFalse(
    "Network initiated MO CM connection request supported for at least one CM protocol",
    "Network initiated MO CM connection request not supported",
);

static MULTIBAND: ValueString = ValueString::new(
    &[
        (0, "No multiband"),
        (1, "E-GSM or R-GSM supported"),
        (2, "GSM 1800 supported"),
        (4, "P-GSM supported"),
        (5, "P-GSM and E-GSM or R-GSM supported"),
        (6, "P-GSM and GSM 1800 supported"),
    ],
    Fallback::Reserved,
);

static PRIORITY_LEVEL: ValueString = ValueString::new(
    &[
        (0, "no priority applied"),
        (1, "call priority level 4"),
        (2, "call priority level 3"),
        (3, "call priority level 2"),
        (4, "call priority level 1"),
        (5, "call priority level 0"),
        (6, "call priority level B"),
        (7, "call priority level A"),
    ],
    Fallback::Reserved,
);

fn hex_digit(n: u8) -> char {
    std::char::from_digit(n as u32, 16).unwrap_or('?')
}

/// MCC/MNC out of the usual 3-octet layout. A 0xF third MNC digit means a
/// two-digit MNC.
pub fn plmn(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<(String, String)> {
    let offset = cur.pos();
    let b = cur.take(3)?;
    let mut mcc = String::with_capacity(3);
    mcc.push(hex_digit(b[0] & 0x0f));
    mcc.push(hex_digit(b[0] >> 4));
    mcc.push(hex_digit(b[1] & 0x0f));
    let mut mnc = String::with_capacity(3);
    mnc.push(hex_digit(b[2] & 0x0f));
    mnc.push(hex_digit(b[2] >> 4));
    if b[1] >> 4 != 0x0f {
        mnc.push(hex_digit(b[1] >> 4));
    }
    tree.text("Mobile Country Code (MCC)", offset, 2, mcc.clone());
    tree.text("Mobile Network Code (MNC)", offset + 1, 2, mnc.clone());
    Ok((mcc, mnc))
}

pub fn de_lai(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (mcc, mnc) = plmn(cur, tree)?;
    let offset = cur.pos();
    let lac = cur.read_u16()?;
    tree.uint("Location Area Code (LAC)", offset, 2, lac as u64);
    Ok(Some(format!("MCC {}, MNC {}, LAC 0x{:04x}", mcc, mnc, lac)))
}

pub fn de_cell_id(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let ci = cur.read_u16()?;
    tree.uint("Cell CI", offset, 2, ci as u64);
    Ok(Some(format!("CI 0x{:04x}", ci)))
}

pub fn de_plmn_list(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut n = 0;
    while !cur.is_empty() {
        let offset = cur.pos();
        let mut sub = FieldTree::new();
        let (mcc, mnc) = plmn(cur, &mut sub)?;
        n += 1;
        tree.subtree(format!("PLMN[{}]", n), offset, 3, sub).summary = Some(format!("MCC {}, MNC {}", mcc, mnc));
    }
    Ok(Some(format!("{} PLMN(s)", n)))
}

/// Routing Area Identification (10.5.5.15)
pub fn de_rai(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (mcc, mnc) = plmn(cur, tree)?;
    let offset = cur.pos();
    let lac = cur.read_u16()?;
    tree.uint("Location Area Code (LAC)", offset, 2, lac as u64);
    let (offset, rac) = octet(cur)?;
    tree.uint("Routing Area Code (RAC)", offset, 1, rac as u64);
    Ok(Some(format!("MCC {}, MNC {}, LAC 0x{:04x}, RAC 0x{:02x}", mcc, mnc, lac, rac)))
}

/// Temporary Logical Link Identity (44.018 10.5.2.41a)
pub fn de_tlli(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let tlli = cur.read_u32()?;
    tree.text("TLLI", offset, 4, format!("0x{:08x}", tlli));
    Ok(Some(format!("0x{:08x}", tlli)))
}

/// Mobile Identity (10.5.1.4)
pub fn de_mid(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let kind = oct & 0x07;
    match kind {
        1 | 2 | 3 => {
            tree.bits_uint("Identity Digit 1", offset, 1, oct, 0xf0);
            tree.bits_bool("Odd/even indication", offset, 1, oct, 0x08, &TF_ODD_EVEN);
            let name = tree.bits_label("Mobile Identity Type", offset, 1, oct, 0x07, &IDENTITY_TYPE);
            let rest = cur.rest();
            let mut digits = bcd::unpack(&[(oct as u8 >> 4) | 0xf0], &bcd::MOBILE_ID);
            digits.push_str(&bcd::unpack(rest, &bcd::MOBILE_ID));
            let label = IDENTITY_TYPE.label(name);
            tree.text(label.clone(), offset, 1 + rest.len(), digits.clone());
            Ok(Some(format!("{} ({})", label, digits)))
        }
        4 => {
            tree.bits_uint("Unused", offset, 1, oct, 0xf0);
            tree.bits_bool("Odd/even indication", offset, 1, oct, 0x08, &TF_ODD_EVEN);
            tree.bits_label("Mobile Identity Type", offset, 1, oct, 0x07, &IDENTITY_TYPE);
            let tmsi_offset = cur.pos();
            let tmsi = cur.read_u32()?;
            tree.text("TMSI/P-TMSI", tmsi_offset, 4, format!("0x{:08x}", tmsi));
            Ok(Some(format!("TMSI/P-TMSI (0x{:08x})", tmsi)))
        }
        0 => {
            tree.bits_label("Mobile Identity Type", offset, 1, oct, 0x07, &IDENTITY_TYPE);
            let rest_offset = cur.pos();
            let rest = cur.rest();
            if !rest.is_empty() {
                tree.bytes("Unused", rest_offset, rest);
            }
            Ok(Some("No Identity Code".to_string()))
        }
        _ => {
            tree.bits_label("Mobile Identity Type", offset, 1, oct, 0x07, &IDENTITY_TYPE);
            let rest_offset = cur.pos();
            tree.bytes("Identity", rest_offset, cur.rest());
            Ok(None)
        }
    }
}

/// Mobile Station Classmark 1 (10.5.1.5), also octet 1 of classmark 2.
fn classmark_octet1(offset: usize, oct: u32, tree: &mut FieldTree) {
    tree.spare(offset, 1, oct, 0x80);
    tree.bits_label("Revision Level", offset, 1, oct, 0x60, &REVISION_LEVEL);
    tree.bits_bool("ES IND", offset, 1, oct, 0x10, &TF_ES_IND);
    tree.bits_bool("A5/1", offset, 1, oct, 0x08, &TF_A5_NOT);
    tree.bits_label("RF Power Capability", offset, 1, oct, 0x07, &RF_POWER_CAP);
}

pub fn de_ms_cm_1(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    classmark_octet1(offset, oct, tree);
    Ok(None)
}

/// Mobile Station Classmark 2 (10.5.1.6)
pub fn de_ms_cm_2(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    classmark_octet1(offset, oct, tree);

    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    tree.bits_bool("PS capability (pseudo-synchronization capability)", offset, 1, oct, 0x40, &TF_PS_CAP);
    tree.bits_label("SS Screening Indicator", offset, 1, oct, 0x30, &SS_SCREENING);
    tree.bits_bool("SM capability (MT SMS pt to pt capability)", offset, 1, oct, 0x08, &TF_SM_CAP);
    tree.bits_bool("VBS notification reception", offset, 1, oct, 0x04, &TF_VBS);
    tree.bits_bool("VGCS notification reception", offset, 1, oct, 0x02, &TF_VGCS);
    tree.bits_bool("FC Frequency Capability", offset, 1, oct, 0x01, &TF_FC);

    let (offset, oct) = octet(cur)?;
    tree.bits_bool("CM3", offset, 1, oct, 0x80, &TF_CM3);
    tree.spare(offset, 1, oct, 0x40);
    tree.bits_bool("LCS VA capability", offset, 1, oct, 0x20, &TF_LCS_VA);
    tree.bits_bool("UCS2 treatment", offset, 1, oct, 0x10, &TF_UCS2);
    tree.bits_bool("SoLSA", offset, 1, oct, 0x08, &TF_SOLSA);
    tree.bits_bool("CMSP: CM Service Prompt", offset, 1, oct, 0x04, &TF_CMSP);
    tree.bits_bool("A5/3", offset, 1, oct, 0x02, &TF_A5);
    tree.bits_bool("A5/2", offset, 1, oct, 0x01, &TF_A5);
    Ok(None)
}

/// Mobile Station Classmark 3 (10.5.1.7). Only the first octet is broken
/// down; the remainder is a CSN.1 bit stream.
pub fn de_ms_cm_3(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    tree.bits_label("Multiband supported", offset, 1, oct, 0x70, &MULTIBAND);
    tree.bits_bool("A5/7", offset, 1, oct, 0x08, &TF_A5);
    tree.bits_bool("A5/6", offset, 1, oct, 0x04, &TF_A5);
    tree.bits_bool("A5/5", offset, 1, oct, 0x02, &TF_A5);
    tree.bits_bool("A5/4", offset, 1, oct, 0x01, &TF_A5);
    let rest_offset = cur.pos();
    let rest = cur.rest();
    if !rest.is_empty() {
        tree.bytes("Remaining bits", rest_offset, rest);
    }
    Ok(None)
}

pub fn de_priority(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x08));
    let v = tree.bits_label(
        "Call priority",
        half.offset,
        1,
        half.oct as u32,
        half.mask(0x07),
        &PRIORITY_LEVEL,
    );
    Some(PRIORITY_LEVEL.label(v).into_owned())
}

/// Ciphering Key Sequence Number (10.5.1.2)
pub fn de_cksn(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x08));
    let v = half.value() & 0x07;
    let label = if v == 7 {
        "No key is available".to_string()
    } else {
        format!("{}", v)
    };
    tree.bits_text(
        "Ciphering Key Sequence Number",
        half.offset,
        1,
        half.oct as u32,
        half.mask(0x07),
        label.clone(),
    );
    Some(label)
}

pub fn de_spare_half(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x0f));
    None
}

pub const LAI: ElemDesc = ElemDesc::full("Location Area Identification", de_lai);
pub const CELL_ID: ElemDesc = ElemDesc::full("Cell Identity", de_cell_id);
pub const MOBILE_ID: ElemDesc = ElemDesc::full("Mobile Identity", de_mid);
pub const MS_CM_1: ElemDesc = ElemDesc::full("Mobile Station Classmark 1", de_ms_cm_1);
pub const MS_CM_2: ElemDesc = ElemDesc::full("Mobile Station Classmark 2", de_ms_cm_2);
pub const MS_CM_3: ElemDesc = ElemDesc::full("Mobile Station Classmark 3", de_ms_cm_3);
pub const PRIORITY: ElemDesc = ElemDesc::half("Priority Level", de_priority);
pub const CKSN: ElemDesc = ElemDesc::half("Ciphering Key Sequence Number", de_cksn);
pub const SPARE_HALF: ElemDesc = ElemDesc::half("Spare Half Octet", de_spare_half);
pub const PLMN_LIST: ElemDesc = ElemDesc::full("PLMN List", de_plmn_list);
pub const RAI: ElemDesc = ElemDesc::full("Routing Area Identification", de_rai);
pub const TLLI: ElemDesc = ElemDesc::full("Temporary Logical Link Identity", de_tlli);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Direction;
    use crate::proto::gsm_a::elem::tests::run;
    use crate::proto::gsm_a::elem::{mand, Form, Nibble};
    use crate::utils::bits;

    #[test]
    fn bit_field_tables_label_every_value() {
        let tables: [(&ValueString, u32); 6] = [
            (&PD_VALS, 0x0f),
            (&IDENTITY_TYPE, 0x07),
            (&REVISION_LEVEL, 0x60),
            (&RF_POWER_CAP, 0x07),
            (&SS_SCREENING, 0x30),
            (&MULTIBAND, 0x70),
        ];
        for (vs, mask) in tables.iter() {
            let width = mask.count_ones();
            for v in 0..(1u32 << width) {
                assert_eq!(bits::extract(v << mask.trailing_zeros(), *mask), v);
                assert!(!vs.label(v).is_empty());
            }
        }
    }

    #[test]
    fn imsi() {
        let ies = [mand(Form::Lv, 0, MOBILE_ID)];
        let f = run(
            &[0x08, 0x09, 0x10, 0x10, 0x10, 0x32, 0x54, 0x76, 0x98],
            &ies,
            Direction::Unknown,
        )
        .unwrap();
        let mid = f.find("Mobile Identity").unwrap();
        assert_eq!(mid.summary.as_deref(), Some("IMSI (001010123456789)"));
        assert_eq!(f.find("IMSI").and_then(|i| i.as_str()), Some("001010123456789"));
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn even_imei_and_tmsi() {
        let ies = [mand(Form::Lv, 0, MOBILE_ID)];
        /* even number of digits: filler in the last high nibble */
        let f = run(&[0x03, 0x32, 0x54, 0xf6], &ies, Direction::Unknown).unwrap();
        assert_eq!(f.find("IMEI").and_then(|i| i.as_str()), Some("3456"));
        let f = run(&[0x05, 0xf4, 0xde, 0xad, 0xbe, 0xef], &ies, Direction::Unknown).unwrap();
        assert_eq!(f.find("TMSI/P-TMSI").and_then(|i| i.as_str()), Some("0xdeadbeef"));
        /* TMSI cut short */
        let f = run(&[0x03, 0xf4, 0xde, 0xad], &ies, Direction::Unknown).unwrap();
        assert!(f.find("Short Data (?)").is_some());
    }

    #[test]
    fn lai() {
        let ies = [mand(Form::V, 0, LAI)];
        let f = run(&[0x02, 0xf8, 0x01, 0x12, 0x34], &ies, Direction::Unknown).unwrap();
        assert_eq!(
            f.find("Location Area Identification").unwrap().summary.as_deref(),
            Some("MCC 208, MNC 10, LAC 0x1234")
        );
        let f = run(&[0x13, 0x00, 0x62, 0x00, 0x01], &ies, Direction::Unknown).unwrap();
        assert_eq!(f.find("Mobile Network Code (MNC)").and_then(|m| m.as_str()), Some("260"));
    }

    #[test]
    fn classmark_2() {
        let ies = [mand(Form::Lv, 0, MS_CM_2)];
        let f = run(&[0x03, 0x53, 0x18, 0x82], &ies, Direction::Unknown).unwrap();
        assert_eq!(
            f.find("Revision Level").and_then(|r| r.label()),
            Some("Used by mobile stations supporting R99 or later versions of the protocol")
        );
        assert_eq!(f.find("RF Power Capability").and_then(|r| r.label()), Some("class 4"));
        assert_eq!(f.find("A5/3").and_then(|r| r.label()), Some("encryption algorithm available"));
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn cksn_half() {
        let ies = [
            mand(Form::VHalf(Nibble::Lo), 0, CKSN),
            mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
        ];
        let f = run(&[0x07], &ies, Direction::Unknown).unwrap();
        assert_eq!(
            f.find("Ciphering Key Sequence Number").unwrap().summary.as_deref(),
            Some("No key is available")
        );
    }
}
