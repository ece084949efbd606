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

/* Radio Resource management (3GPP TS 44.018 9.1, elements 10.5.2) */

use lazy_static::lazy_static;
use log::*;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::bits::BitReader;
use crate::utils::vals::{Fallback, TrueFalse, ValueString, TF_SET};

use super::common::{CKSN, MOBILE_ID, MS_CM_2, MS_CM_3, RAI, SPARE_HALF, TLLI};
use super::elem::{mand, octet, opt, Body, ElemDesc, Form, Half, IeSpec, MsgDesc, MsgIndex, Nibble};

pub static RR_CAUSE: ValueString = ValueString::new(
    &[
        (0x00, "Normal event"),
        (0x01, "Abnormal release, unspecified"),
        (0x02, "Abnormal release, channel unacceptable"),
        (0x03, "Abnormal release, timer expired"),
        (0x04, "Abnormal release, no activity on the radio path"),
        (0x05, "Preemptive release"),
        (0x06, "UTRAN configuration unknown"),
        (0x08, "Handover impossible, timing advance out of range"),
        (0x09, "Channel mode unacceptable"),
        (0x0a, "Frequency not implemented"),
        (0x0c, "Lower layer failure"),
        (0x0d, "Originator or talker leaving group call area"),
        (0x41, "Call already cleared"),
        (0x5f, "Semantically incorrect message"),
        (0x60, "Invalid mandatory information"),
        (0x61, "Message type non-existent or not implemented"),
        (0x62, "Message type not compatible with protocol state"),
        (0x64, "Conditional IE error"),
        (0x65, "No cell allocation available"),
        (0x6f, "Protocol error unspecified"),
    ],
    Fallback::UnknownValue,
);

static PAGE_MODE: ValueString = ValueString::new(
    &[
        (0, "Normal paging"),
        (1, "Extended paging"),
        (2, "Paging reorganization"),
        (3, "Same as before"),
    ],
    Fallback::Reserved,
);

static DEDICATED_MODE_OR_TBF: ValueString = ValueString::new(
    &[
        (0, "This message assigns a dedicated mode resource"),
        (1, "This message assigns an uplink TBF or is the second message of two in a two-message assignment of an uplink or downlink TBF"),
        (3, "This message assigns a downlink TBF to the mobile station identified in the IA Rest Octets IE"),
        (5, "This message is the first message of two in a two-message assignment of an uplink TBF"),
        (7, "This message is the first message of two in a two-message assignment of a downlink TBF to the mobile station identified in the IA Rest Octets IE"),
    ],
    Fallback::Reserved,
);

static CIPHER_ALGORITHM: ValueString = ValueString::new(
    &[
        (0, "cipher with algorithm A5/1"),
        (1, "cipher with algorithm A5/2"),
        (2, "cipher with algorithm A5/3"),
        (3, "cipher with algorithm A5/4"),
        (4, "cipher with algorithm A5/5"),
        (5, "cipher with algorithm A5/6"),
        (6, "cipher with algorithm A5/7"),
        (7, "Reserved"),
    ],
    Fallback::Reserved,
);

static TF_SC: TrueFalse = TrueFalse("Start ciphering", "No ciphering");
static TF_CR: TrueFalse = TrueFalse("IMEISV shall be included", "IMEISV shall not be included");

static CHANNEL_NEEDED: ValueString = ValueString::new(
    &[
        (0, "Any Channel"),
        (1, "SDCCH"),
        (2, "TCH/F (Full rate)"),
        (3, "TCH/H or TCH/F (Dual rate)"),
    ],
    Fallback::Reserved,
);

static CHANNEL_MODE: ValueString = ValueString::new(
    &[
        (0x00, "signalling only"),
        (0x01, "speech full rate or half rate version 1"),
        (0x21, "speech full rate or half rate version 2"),
        (0x41, "speech full rate or half rate version 3"),
        (0x03, "data, 12.0 kbit/s radio interface rate"),
        (0x0b, "data, 6.0 kbit/s radio interface rate"),
        (0x13, "data, 3.6 kbit/s radio interface rate"),
        (0x0f, "data, 14.5 kbit/s radio interface rate"),
        (0x17, "data, 43.5 kbit/s radio interface rate"),
        (0x1f, "data, 29.0 kbit/s radio interface rate"),
    ],
    Fallback::Reserved,
);

static SUSPENSION_CAUSE: ValueString = ValueString::new(
    &[
        (0, "Mobile originating call"),
        (1, "Location Area Update"),
        (2, "SMS"),
        (3, "Other procedure which can be completed with an SDCCH"),
        (4, "MO Supplementary Service"),
        (5, "Mobile terminating CS connection"),
        (6, "DTM not supported in the cell"),
    ],
    Fallback::Reserved,
);

static MULTIRATE_SPEECH_VERSION: ValueString = ValueString::new(
    &[
        (1, "Adaptive Multirate speech version 1"),
        (2, "Adaptive Multirate speech version 2"),
    ],
    Fallback::Reserved,
);

static TF_NSCB: TrueFalse = TrueFalse("Turn off noise suppression", "Noise Suppression can be used (default)");
static TF_ICMI: TrueFalse = TrueFalse(
    "The initial codec mode is defined by the Start Mode field",
    "The initial codec mode is defined by the implicit rule provided in 3GPP TS 05.09",
);

static AMR_MODES: [(u32, &str); 8] = [
    (0x80, "12,2 kbit/s rate"),
    (0x40, "10,2 kbit/s rate"),
    (0x20, "7,95 kbit/s rate"),
    (0x10, "7,40 kbit/s rate"),
    (0x08, "6,70 kbit/s rate"),
    (0x04, "5,90 kbit/s rate"),
    (0x02, "5,15 kbit/s rate"),
    (0x01, "4,75 kbit/s rate"),
];

/// RR Cause (10.5.2.31)
pub fn de_rr_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("RR cause value", offset, 1, v, &RR_CAUSE);
    Ok(Some(label.into_owned()))
}

fn de_page_mode(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x0c));
    let v = tree.bits_label("Page Mode", half.offset, 1, half.oct as u32, half.mask(0x03), &PAGE_MODE);
    Some(PAGE_MODE.label(v).into_owned())
}

fn de_ded_mod_or_tbf(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x08));
    tree.bits_label(
        "Dedicated mode or TBF",
        half.offset,
        1,
        half.oct as u32,
        half.mask(0x07),
        &DEDICATED_MODE_OR_TBF,
    );
    None
}

fn de_cipher_mode_setting(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_label("Algorithm identifier", half.offset, 1, raw, half.mask(0x0e), &CIPHER_ALGORITHM);
    let sc = tree.bits_bool("SC", half.offset, 1, raw, half.mask(0x01), &TF_SC);
    Some(TF_SC.label(sc).to_string())
}

fn de_cipher_resp(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    tree.spare(half.offset, 1, half.oct as u32, half.mask(0x0e));
    tree.bits_bool("CR", half.offset, 1, half.oct as u32, half.mask(0x01), &TF_CR);
    None
}

fn de_channel_needed(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_label("Channel 2", half.offset, 1, raw, half.mask(0x0c), &CHANNEL_NEEDED);
    tree.bits_label("Channel 1", half.offset, 1, raw, half.mask(0x03), &CHANNEL_NEEDED);
    None
}

fn channel_type(v: u32) -> String {
    if v == 0x01 {
        "TCH/F + ACCHs".to_string()
    } else if v & 0x1e == 0x02 {
        format!("TCH/H + ACCHs, Subchannel {}", v & 0x01)
    } else if v & 0x1c == 0x04 {
        format!("SDCCH/4 + SACCH/C4 or CBCH (SDCCH/4), Subchannel {}", v & 0x03)
    } else if v & 0x18 == 0x08 {
        format!("SDCCH/8 + SACCH/C8 or CBCH (SDCCH/8), Subchannel {}", v & 0x07)
    } else {
        "Unknown channel information".to_string()
    }
}

/// Channel Description (10.5.2.5), also used for Channel Description 2.
fn de_chan_desc(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let ct = (oct & 0xf8) >> 3;
    let chan = channel_type(ct);
    tree.bits_text("Channel type and TDMA offset", offset, 1, oct, 0xf8, chan.clone());
    let tn = tree.bits_uint("Timeslot number", offset, 1, oct, 0x07);

    let (offset, oct) = octet(cur)?;
    tree.bits_uint("Training Sequence Code", offset, 1, oct, 0xe0);
    if oct & 0x10 != 0 {
        tree.bits_text("Hopping channel", offset, 1, oct, 0x10, "Yes");
        let (offset2, oct2) = octet(cur)?;
        let word = (oct << 8) | oct2;
        tree.bits_uint("MAIO", offset, 2, word, 0x0fc0);
        tree.bits_uint("HSN", offset2, 1, oct2, 0x3f);
    } else {
        tree.bits_text("Hopping channel", offset, 1, oct, 0x10, "No");
        tree.spare(offset, 1, oct, 0x0c);
        let (_, oct2) = octet(cur)?;
        let word = (oct << 8) | oct2;
        tree.bits_uint("Single channel ARFCN", offset, 2, word, 0x03ff);
    }
    Ok(Some(format!("{}, TN {}", chan, tn)))
}

/// Request Reference (10.5.2.30)
fn de_req_ref(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, ra) = octet(cur)?;
    tree.uint("Random Access Information (RA)", offset, 1, ra as u64);
    let t_offset = cur.pos();
    let word = cur.read_u16()? as u32;
    let t1 = tree.bits_uint("T1'", t_offset, 2, word, 0xf800);
    let t3 = tree.bits_uint("T3", t_offset, 2, word, 0x07e0);
    let t2 = tree.bits_uint("T2", t_offset, 2, word, 0x001f);
    /* 44.018 10.5.2.38 */
    let diff = (t3 + 26 - (t2 % 26)) % 26;
    let rfn = 51 * diff + t3 + 51 * 26 * t1;
    tree.uint("RFN", t_offset, 2, rfn as u64);
    Ok(Some(format!("RA {}, RFN {}", ra, rfn)))
}

/// Timing Advance (10.5.2.40)
fn de_timing_adv(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xc0);
    let ta = tree.bits_uint("Timing advance value", offset, 1, oct, 0x3f);
    Ok(Some(format!("{}", ta)))
}

/// Starting Time (10.5.2.38)
fn de_start_time(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let word = cur.read_u16()? as u32;
    tree.bits_uint("T1'", offset, 2, word, 0xf800);
    tree.bits_uint("T3", offset, 2, word, 0x07e0);
    tree.bits_uint("T2", offset, 2, word, 0x001f);
    Ok(None)
}

/// Channel Mode (10.5.2.6)
fn de_chan_mode(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("Mode", offset, 1, v, &CHANNEL_MODE);
    Ok(Some(label.into_owned()))
}

fn de_suspension_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("Suspension cause value", offset, 1, v, &SUSPENSION_CAUSE);
    Ok(Some(label.into_owned()))
}

/// MultiRate configuration (10.5.2.21aa). The threshold/hysteresis pairs
/// that follow the codec mode set are counted from the element length.
pub fn de_multirate_conf(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let version = tree.bits_label(
        "Multirate speech version",
        offset,
        1,
        oct,
        0xe0,
        &MULTIRATE_SPEECH_VERSION,
    );
    tree.bits_bool("NSCB: Noise Suppression Control Bit", offset, 1, oct, 0x10, &TF_NSCB);
    tree.bits_bool("ICMI: Initial Codec Mode Indicator", offset, 1, oct, 0x08, &TF_ICMI);
    tree.spare(offset, 1, oct, 0x04);
    tree.bits_uint("Start Mode", offset, 1, oct, 0x03);

    let (offset, set) = octet(cur)?;
    let mut modes = 0;
    for (mask, name) in AMR_MODES.iter() {
        tree.bits_bool(
            format!("Set of AMR codec modes: {}", name),
            offset,
            1,
            set,
            *mask,
            &TF_SET,
        );
        if set & mask != 0 {
            modes += 1;
        }
    }

    let rest_offset = cur.pos();
    let rest = cur.rest();
    let mut reader = BitReader::new(rest);
    let mut pairs = 0;
    while pairs < 3 && reader.remaining() >= 10 {
        let bit = reader.bit_pos();
        let oct_offset = rest_offset + bit / 8;
        let th = reader.read(6).unwrap_or(0);
        let hy = reader.read(4).unwrap_or(0);
        pairs += 1;
        tree.uint(format!("AMR Threshold {}", pairs), oct_offset, 1, th as u64);
        tree.uint(format!("AMR Hysteresis {}", pairs), rest_offset + (bit + 6) / 8, 1, hy as u64);
    }
    if reader.remaining() > 0 && pairs > 0 {
        let last = rest_offset + rest.len() - 1;
        trace!("{} padding bits in multirate configuration", reader.remaining());
        tree.uint("Padding bits", last, 1, reader.read(reader.remaining()).unwrap_or(0) as u64);
    }
    Ok(Some(format!(
        "{}, {} codec mode(s)",
        MULTIRATE_SPEECH_VERSION.label(version),
        modes
    )))
}

const PAGE_MODE_E: ElemDesc = ElemDesc::half("Page Mode", de_page_mode);
const DED_MOD_OR_TBF: ElemDesc = ElemDesc::half("Dedicated mode or TBF", de_ded_mod_or_tbf);
const CIPH_MODE_SET: ElemDesc = ElemDesc::half("Cipher Mode Setting", de_cipher_mode_setting);
const CIPH_RESP: ElemDesc = ElemDesc::half("Cipher Response", de_cipher_resp);
const CHAN_NEEDED: ElemDesc = ElemDesc::half("Channel Needed", de_channel_needed);
const CHAN_DESC: ElemDesc = ElemDesc::full("Channel Description", de_chan_desc);
const CHAN_DESC_2: ElemDesc = ElemDesc::full("Channel Description 2", de_chan_desc);
const REQ_REF: ElemDesc = ElemDesc::full("Request Reference", de_req_ref);
const TIMING_ADV: ElemDesc = ElemDesc::full("Timing Advance", de_timing_adv);
const MOB_ALLOC: ElemDesc = ElemDesc::raw("Mobile Allocation");
const START_TIME: ElemDesc = ElemDesc::full("Starting Time", de_start_time);
const IA_REST: ElemDesc = ElemDesc::raw("IA Rest Octets");
pub const RR_CAUSE_E: ElemDesc = ElemDesc::full("RR Cause", de_rr_cause);
const CHAN_MODE: ElemDesc = ElemDesc::full("Channel Mode", de_chan_mode);
const VGCS_TARGET: ElemDesc = ElemDesc::raw("VGCS target mode Indication");
pub const MULTIRATE_CONF: ElemDesc = ElemDesc::full("MultiRate configuration", de_multirate_conf);
const MOB_TIME_DIFF: ElemDesc = ElemDesc::raw("Mobile Observed Time Difference");
const BA_RANGE: ElemDesc = ElemDesc::raw("BA Range");
const GROUP_CHAN_DESC: ElemDesc = ElemDesc::raw("Group Channel Description");
const BA_LIST_PREF: ElemDesc = ElemDesc::raw("BA List Pref");
const CLASSMARK_ENQ_MASK: ElemDesc = ElemDesc::raw("Classmark Enquiry Mask");
const SUSPENSION_CAUSE_E: ElemDesc = ElemDesc::full("Suspension Cause", de_suspension_cause);

const IMM_ASSIGN: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, PAGE_MODE_E),
    mand(Form::VHalf(Nibble::Hi), 0, DED_MOD_OR_TBF),
    mand(Form::V, 0, CHAN_DESC),
    mand(Form::V, 0, REQ_REF),
    mand(Form::V, 0, TIMING_ADV),
    mand(Form::Lv, 0, MOB_ALLOC),
    opt(Form::Tv, 0x7c, START_TIME),
];

const CIPH_MODE_CMD: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CIPH_MODE_SET),
    mand(Form::VHalf(Nibble::Hi), 0, CIPH_RESP),
];

const CIPH_MODE_CPTE: &[IeSpec] = &[opt(Form::Tlv, 0x17, MOBILE_ID).named(" - Mobile Equipment Identity")];

const CAUSE_ONLY: &[IeSpec] = &[mand(Form::V, 0, RR_CAUSE_E)];

const HANDOVER_CPTE: &[IeSpec] = &[mand(Form::V, 0, RR_CAUSE_E), opt(Form::Tlv, 0x77, MOB_TIME_DIFF)];

const PHY_INFO: &[IeSpec] = &[mand(Form::V, 0, TIMING_ADV)];

const CHAN_REL: &[IeSpec] = &[
    mand(Form::V, 0, RR_CAUSE_E),
    opt(Form::Tlv, 0x73, BA_RANGE),
    opt(Form::Tlv, 0x74, GROUP_CHAN_DESC),
    opt(Form::Tlv, 0x75, BA_LIST_PREF),
];

const PAGING_REQ_TYPE_1: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, PAGE_MODE_E),
    mand(Form::VHalf(Nibble::Hi), 0, CHAN_NEEDED),
    mand(Form::Lv, 0, MOBILE_ID).named(" - Mobile Identity 1"),
    opt(Form::Tlv, 0x17, MOBILE_ID).named(" - Mobile Identity 2"),
];

const PAGING_RESP: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CKSN),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    mand(Form::Lv, 0, MS_CM_2),
    mand(Form::Lv, 0, MOBILE_ID),
];

const CLASSMARK_CHANGE: &[IeSpec] = &[mand(Form::Lv, 0, MS_CM_2), opt(Form::Tlv, 0x20, MS_CM_3)];

const CLASSMARK_ENQ: &[IeSpec] = &[opt(Form::Tlv, 0x10, CLASSMARK_ENQ_MASK)];

const CHAN_MODE_MODIFY: &[IeSpec] = &[
    mand(Form::V, 0, CHAN_DESC_2),
    mand(Form::V, 0, CHAN_MODE),
    opt(Form::Tlv, 0x01, VGCS_TARGET),
    opt(Form::Tlv, 0x03, MULTIRATE_CONF),
];

const CHAN_MODE_MODIFY_ACK: &[IeSpec] = &[mand(Form::V, 0, CHAN_DESC_2), mand(Form::V, 0, CHAN_MODE)];

const GPRS_SUSP_REQ: &[IeSpec] = &[
    mand(Form::V, 0, TLLI),
    mand(Form::V, 0, RAI),
    mand(Form::V, 0, SUSPENSION_CAUSE_E),
];

const EMPTY: &[IeSpec] = &[];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x3c, "RR Initialisation Request", Body::Undecoded),
    MsgDesc::new(0x3b, "Additional Assignment", Body::Undecoded).down(),
    MsgDesc::new(0x3f, "Immediate Assignment", Body::Ies(IMM_ASSIGN)).down(),
    MsgDesc::new(0x39, "Immediate Assignment Extended", Body::Undecoded).down(),
    MsgDesc::new(0x3a, "Immediate Assignment Reject", Body::Undecoded).down(),
    MsgDesc::new(0x48, "DTM Assignment Failure", Body::Undecoded),
    MsgDesc::new(0x49, "DTM Reject", Body::Undecoded),
    MsgDesc::new(0x4a, "DTM Request", Body::Undecoded),
    MsgDesc::new(0x4b, "Main DCCH Assignment Command", Body::Undecoded),
    MsgDesc::new(0x4c, "Packet Assignment Command", Body::Undecoded),
    MsgDesc::new(0x35, "Ciphering Mode Command", Body::Ies(CIPH_MODE_CMD)).down(),
    MsgDesc::new(0x32, "Ciphering Mode Complete", Body::Ies(CIPH_MODE_CPTE)).up(),
    MsgDesc::new(0x30, "Configuration Change Command", Body::Undecoded),
    MsgDesc::new(0x31, "Configuration Change Ack.", Body::Undecoded),
    MsgDesc::new(0x33, "Configuration Change Reject", Body::Undecoded),
    MsgDesc::new(0x2e, "Assignment Command", Body::Undecoded).down(),
    MsgDesc::new(0x29, "Assignment Complete", Body::Ies(CAUSE_ONLY)).up(),
    MsgDesc::new(0x2f, "Assignment Failure", Body::Ies(CAUSE_ONLY)).up(),
    MsgDesc::new(0x2b, "Handover Command", Body::Undecoded).down(),
    MsgDesc::new(0x2c, "Handover Complete", Body::Ies(HANDOVER_CPTE)).up(),
    MsgDesc::new(0x28, "Handover Failure", Body::Ies(CAUSE_ONLY)).up(),
    MsgDesc::new(0x2d, "Physical Information", Body::Ies(PHY_INFO)).down(),
    MsgDesc::new(0x08, "GPRS Suspension Request", Body::Ies(GPRS_SUSP_REQ)).up(),
    MsgDesc::new(0x23, "RR-cell Change Order", Body::Undecoded).down(),
    MsgDesc::new(0x0d, "Channel Release", Body::Ies(CHAN_REL)).down(),
    MsgDesc::new(0x0a, "Partial Release", Body::Undecoded).down(),
    MsgDesc::new(0x0f, "Partial Release Complete", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x21, "Paging Request Type 1", Body::Ies(PAGING_REQ_TYPE_1)).down(),
    MsgDesc::new(0x22, "Paging Request Type 2", Body::Undecoded).down(),
    MsgDesc::new(0x24, "Paging Request Type 3", Body::Undecoded).down(),
    MsgDesc::new(0x27, "Paging Response", Body::Ies(PAGING_RESP)).up(),
    MsgDesc::new(0x20, "Notification/NCH", Body::Undecoded),
    MsgDesc::new(0x25, "Reserved", Body::Undecoded),
    MsgDesc::new(0x26, "Notification/Response", Body::Undecoded),
    MsgDesc::new(0x0b, "Reserved", Body::Undecoded),
    MsgDesc::new(0x18, "System Information Type 8", Body::Undecoded).down(),
    MsgDesc::new(0x19, "System Information Type 1", Body::Undecoded).down(),
    MsgDesc::new(0x1a, "System Information Type 2", Body::Undecoded).down(),
    MsgDesc::new(0x1b, "System Information Type 3", Body::Undecoded).down(),
    MsgDesc::new(0x1c, "System Information Type 4", Body::Undecoded).down(),
    MsgDesc::new(0x1d, "System Information Type 5", Body::Undecoded).down(),
    MsgDesc::new(0x1e, "System Information Type 6", Body::Undecoded).down(),
    MsgDesc::new(0x1f, "System Information Type 7", Body::Undecoded).down(),
    MsgDesc::new(0x02, "System Information Type 2bis", Body::Undecoded).down(),
    MsgDesc::new(0x03, "System Information Type 2ter", Body::Undecoded).down(),
    MsgDesc::new(0x05, "System Information Type 5bis", Body::Undecoded).down(),
    MsgDesc::new(0x06, "System Information Type 5ter", Body::Undecoded).down(),
    MsgDesc::new(0x04, "System Information Type 9", Body::Undecoded).down(),
    MsgDesc::new(0x00, "System Information Type 13", Body::Undecoded).down(),
    MsgDesc::new(0x3d, "System Information Type 16", Body::Undecoded).down(),
    MsgDesc::new(0x3e, "System Information Type 17", Body::Undecoded).down(),
    MsgDesc::new(0x10, "Channel Mode Modify", Body::Ies(CHAN_MODE_MODIFY)).down(),
    MsgDesc::new(0x12, "RR Status", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x17, "Channel Mode Modify Acknowledge", Body::Ies(CHAN_MODE_MODIFY_ACK)).up(),
    MsgDesc::new(0x14, "Frequency Redefinition", Body::Undecoded).down(),
    MsgDesc::new(0x15, "Measurement Report", Body::Undecoded).up(),
    MsgDesc::new(0x16, "Classmark Change", Body::Ies(CLASSMARK_CHANGE)).up(),
    MsgDesc::new(0x13, "Classmark Enquiry", Body::Ies(CLASSMARK_ENQ)).down(),
    MsgDesc::new(0x36, "Extended Measurement Report", Body::Undecoded).up(),
    MsgDesc::new(0x37, "Extended Measurement Order", Body::Undecoded).down(),
    MsgDesc::new(0x34, "GPRS Suspension Request", Body::Undecoded),
    MsgDesc::new(0x09, "VGCS Uplink Grant", Body::Undecoded),
    MsgDesc::new(0x0e, "Uplink Release", Body::Undecoded),
    MsgDesc::new(0x0c, "Reserved", Body::Undecoded),
    MsgDesc::new(0x2a, "Uplink Busy", Body::Undecoded),
    MsgDesc::new(0x11, "Talker Indication", Body::Undecoded),
    MsgDesc::new(0x60, "UTRAN Classmark Change/Handover To UTRAN Command", Body::Undecoded),
    MsgDesc::new(0x62, "cdma2000 Classmark Change", Body::Undecoded),
    MsgDesc::new(0x63, "Inter System to UTRAN Handover Command", Body::Undecoded),
    MsgDesc::new(0x64, "Inter System to cdma2000 Handover Command", Body::Undecoded),
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
    fn rr_cause() {
        let f = run(&[0x6f], CAUSE_ONLY, Direction::Uplink).unwrap();
        assert_eq!(
            f.find("RR cause value").and_then(|c| c.label()),
            Some("Protocol error unspecified")
        );
        assert_eq!(f.find("RR Cause").unwrap().summary.as_deref(), Some("Protocol error unspecified"));
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn immediate_assignment() {
        /* SDCCH/8 subchannel 1 TN 2, ARFCN 0x37, RA 0x0f, TA 1, empty MA */
        let data = [0x00, 0x4a, 0x00, 0x37, 0x0f, 0x00, 0x00, 0x01, 0x00];
        let f = run(&data, IMM_ASSIGN, Direction::Downlink).unwrap();
        assert_eq!(
            f.find("Channel Description").unwrap().summary.as_deref(),
            Some("SDCCH/8 + SACCH/C8 or CBCH (SDCCH/8), Subchannel 1, TN 2")
        );
        assert_eq!(f.find("Single channel ARFCN").and_then(|a| a.as_u64()), Some(0x37));
        assert_eq!(f.find("Timing advance value").and_then(|a| a.as_u64()), Some(1));
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn multirate_config() {
        /* version 1, ICMI, start mode 0, modes 12.2/7.4/5.9/4.75, two pairs */
        let data = [0x03, 0x05, 0x28, 0x95, 0x2c, 0x12, 0xd0];
        let ies = [opt(Form::Tlv, 0x03, MULTIRATE_CONF)];
        let f = run(&data, &ies, Direction::Downlink).unwrap();
        assert_eq!(
            f.find("MultiRate configuration").unwrap().summary.as_deref(),
            Some("Adaptive Multirate speech version 1, 4 codec mode(s)")
        );
        assert_eq!(f.find("AMR Threshold 1").and_then(|t| t.as_u64()), Some(11));
        assert_eq!(f.find("AMR Hysteresis 1").and_then(|t| t.as_u64()), Some(0));
        assert_eq!(f.find("AMR Threshold 2").and_then(|t| t.as_u64()), Some(18));
        assert_eq!(f.find("AMR Hysteresis 2").and_then(|t| t.as_u64()), Some(13));
        assert!(f.find("AMR Threshold 3").is_none());
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn cipher_mode() {
        let f = run(&[0x13], CIPH_MODE_CMD, Direction::Downlink).unwrap();
        assert_eq!(f.find("Cipher Mode Setting").unwrap().summary.as_deref(), Some("Start ciphering"));
        assert_eq!(
            f.find("Algorithm identifier").and_then(|a| a.label()),
            Some("cipher with algorithm A5/2")
        );
        assert_eq!(f.find("CR").and_then(|c| c.label()), Some("IMEISV shall be included"));
    }
}
