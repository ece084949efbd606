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

/* BSS Management Application Part (3GPP TS 48.008 3.2) */

use itertools::Itertools;
use lazy_static::lazy_static;
use log::*;

use crate::context::{DecodeContext, SubProtocol};
use crate::error::DResult;
use crate::field::{Diagnostic, Dissection, FieldTree};
use crate::proto::dissector::Cursor;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::common::{de_mid, de_ms_cm_1, de_ms_cm_2, de_ms_cm_3, plmn, PD_VALS};
use super::elem::{delegate, dissect_msg, mand, octet, opt, Body, ElemDesc, Form, IeSpec, MsgDesc, MsgIndex};
use super::frame;
use super::rr::de_rr_cause;

pub const PROTOCOL: &str = "GSM A-I/F BSSMAP";

static CAUSE_VALUE: ValueString = ValueString::new(
    &[
        (0x00, "Radio interface message failure"),
        (0x01, "Radio interface failure"),
        (0x02, "Uplink quality"),
        (0x03, "Uplink strength"),
        (0x04, "Downlink quality"),
        (0x05, "Downlink strength"),
        (0x06, "Distance"),
        (0x07, "O and M intervention"),
        (0x08, "Response to MSC invocation"),
        (0x09, "Call control"),
        (0x0a, "Radio interface failure, reversion to old channel"),
        (0x0b, "Handover successful"),
        (0x0c, "Better Cell"),
        (0x0d, "Directed Retry"),
        (0x0e, "Joined group call channel"),
        (0x0f, "Traffic"),
        (0x10, "Reduce load in serving cell"),
        (0x11, "Traffic load in target cell higher than in source cell"),
        (0x12, "Relocation triggered"),
        (0x14, "Requested option not authorised"),
        (0x15, "Alternative channel configuration requested"),
        (0x16, "Response to an INTERNAL HANDOVER ENQUIRY message"),
        (0x17, "INTERNAL HANDOVER ENQUIRY reject"),
        (0x18, "Redundancy Level not adequate"),
        (0x20, "Equipment failure"),
        (0x21, "No radio resource available"),
        (0x22, "Requested terrestrial resource unavailable"),
        (0x23, "CCCH overload"),
        (0x24, "Processor overload"),
        (0x25, "BSS not equipped"),
        (0x26, "MS not equipped"),
        (0x27, "Invalid cell"),
        (0x28, "Traffic Load"),
        (0x29, "Preemption"),
        (0x2a, "DTM Handover - SGSN Failure"),
        (0x2b, "DTM Handover - PS Allocation failure"),
        (0x30, "Requested transcoding/rate adaption unavailable"),
        (0x31, "Circuit pool mismatch"),
        (0x32, "Switch circuit pool"),
        (0x33, "Requested speech version unavailable"),
        (0x34, "LSA not allowed"),
        (0x35, "Requested Codec Type or Codec Configuration unavailable"),
        (0x36, "Requested A-Interface Type unavailable"),
        (0x37, "Invalid CSG cell"),
        (0x3f, "Requested Redundancy Level not available"),
        (0x40, "Ciphering algorithm not supported"),
        (0x41, "GERAN Iu-mode failure"),
        (0x42, "Incoming Relocation Not Supported Due To PUESBINE Feature"),
        (0x43, "Access Restricted Due to Shared Networks"),
        (0x44, "Requested Codec Type or Codec Configuration not supported"),
        (0x45, "Requested A-Interface Type not supported"),
        (0x46, "Requested Redundancy Level not supported"),
        (0x50, "Terrestrial circuit already allocated"),
        (0x51, "Invalid message contents"),
        (0x52, "Information element or field missing"),
        (0x53, "Incorrect value"),
        (0x54, "Unknown Message type"),
        (0x55, "Unknown Information Element"),
        (0x56, "DTM Handover - Invalid PS Indication"),
        (0x57, "Call Identifier already allocated"),
        (0x60, "Protocol Error between BSS and MSC"),
        (0x61, "VGCS/VBS call non existent"),
    ],
    Fallback::Reserved,
);

static CELL_DISC: ValueString = ValueString::new(
    &[
        (0x00, "The whole Cell Global Identification, CGI, is used to identify the cells"),
        (0x01, "Location Area Code, LAC, and Cell Identity, CI, is used to identify the cells"),
        (0x02, "Cell Identity, CI, is used to identify the cells"),
        (0x03, "No cell is associated with the transaction"),
        (
            0x04,
            "Location Area Identification, LAI, is used to identify all cells within a Location Area",
        ),
        (
            0x05,
            "Location Area Code, LAC, is used to identify all cells within a location area",
        ),
        (0x06, "All cells on the BSS are identified"),
        (
            0x08,
            "Intersystem Handover to UTRAN or cdma2000. PLMN-ID, LAC, and RNC-ID, are encoded to identify the target RNC",
        ),
        (
            0x09,
            "Intersystem Handover to UTRAN or cdma2000. The RNC-ID is coded to identify the target RNC",
        ),
        (
            0x0a,
            "Intersystem Handover to UTRAN or cdma2000. LAC and RNC-ID are encoded to identify the target RNC",
        ),
    ],
    Fallback::Unknown,
);

static SPEECH_DATA: ValueString = ValueString::new(
    &[
        (1, "Speech"),
        (2, "Data"),
        (3, "Signalling"),
        (4, "Speech + CTM Text Telephony"),
    ],
    Fallback::Reserved,
);

static CHANNEL_RATE_SPEECH: ValueString = ValueString::new(
    &[
        (0x08, "Full rate TCH channel Bm"),
        (0x09, "Half rate TCH channel Lm"),
        (
            0x0a,
            "Full or Half rate TCH channel, Full rate preferred, changes allowed also after first allocation",
        ),
        (
            0x0b,
            "Full or Half rate TCH channel, Half rate preferred, changes allowed also after first allocation",
        ),
        (
            0x1a,
            "Full or Half rate TCH channel, Full rate preferred, changes not allowed after first allocation",
        ),
        (
            0x1b,
            "Full or Half rate TCH channel, Half rate preferred, changes not allowed after first allocation",
        ),
        (0x0f, "Full or Half rate TCH channel, changes allowed also after first allocation"),
        (0x1f, "Full or Half rate TCH channel, changes not allowed after first allocation"),
    ],
    Fallback::Reserved,
);

static CHANNEL_RATE_SIGNALLING: ValueString = ValueString::new(
    &[
        (0x00, "SDCCH or Full rate TCH channel Bm or Half rate TCH channel Lm"),
        (0x01, "SDCCH"),
        (0x02, "SDCCH or Full rate TCH channel Bm"),
        (0x03, "SDCCH or Half rate TCH channel Lm"),
        (0x08, "Full rate TCH channel Bm"),
        (0x09, "Half rate TCH channel Lm"),
        (0x0a, "Full rate TCH channel Bm or Half rate TCH channel Lm"),
        (0x1a, "Full rate TCH channel Bm or Half rate TCH channel Lm, changes not allowed"),
        (0x0f, "Full or Half rate TCH channel, changes allowed also after first allocation"),
    ],
    Fallback::Reserved,
);

static CHANNEL_RATE_DATA: ValueString = ValueString::new(
    &[
        (0x08, "Full rate TCH channel Bm"),
        (0x09, "Half rate TCH channel Lm"),
        (0x0a, "Full or Half rate TCH channel, Full rate preferred"),
        (0x0b, "Full or Half rate TCH channel, Half rate preferred"),
        (0x1a, "Full or Half rate TCH channel, Full rate preferred, changes not allowed"),
        (0x1b, "Full or Half rate TCH channel, Half rate preferred, changes not allowed"),
    ],
    Fallback::Reserved,
);

static SPEECH_VERSION: ValueString = ValueString::new(
    &[
        (0x01, "GSM speech full rate version 1"),
        (0x11, "GSM speech full rate version 2"),
        (0x21, "GSM speech full rate version 3"),
        (0x41, "GSM speech full rate version 4"),
        (0x42, "GSM speech full rate version 5"),
        (0x05, "GSM speech half rate version 1"),
        (0x15, "GSM speech half rate version 2"),
        (0x25, "GSM speech half rate version 3"),
        (0x45, "GSM speech half rate version 4"),
        (0x46, "GSM speech half rate version 6"),
    ],
    Fallback::Reserved,
);

static CHANNEL_MODE: ValueString = ValueString::new(
    &[
        (0x0, "No channel mode indication"),
        (0x1, "data, 43.5 kbit/s (downlink)+14.5 kbps (uplink)"),
        (0x2, "data, 29.0 kbit/s (downlink)+14.5 kbps (uplink)"),
        (0x3, "data, 43.5 kbit/s (downlink)+29.0 kbps (uplink)"),
        (0x7, "data, 43.5 kbit/s"),
        (0x8, "signalling only"),
        (0x9, "speech (full rate or half rate)"),
        (0xa, "data, 29.0 kbit/s"),
        (0xb, "data, 12.0 kbit/s"),
        (0xc, "data, 6.0 kbit/s"),
        (0xd, "data, 3.6 kbit/s"),
        (0xe, "data, 14.5 kbit/s"),
    ],
    Fallback::Reserved,
);

static CHANNEL: ValueString = ValueString::new(
    &[
        (0x0, "None"),
        (0x1, "SDCCH"),
        (0x8, "1 Full rate TCH"),
        (0x9, "1 Half rate TCH"),
        (0xa, "2 Full Rate TCHs"),
        (0xb, "3 Full Rate TCHs"),
        (0xc, "4 Full Rate TCHs"),
        (0xd, "5 Full Rate TCHs"),
        (0xe, "6 Full Rate TCHs"),
        (0xf, "7 Full Rate TCHs"),
        (0x4, "8 Full Rate TCHs"),
    ],
    Fallback::Reserved,
);

static CHANNEL_NEEDED: ValueString = ValueString::new(
    &[
        (0, "Any channel"),
        (1, "SDCCH"),
        (2, "TCH/F (Full rate)"),
        (3, "TCH/H or TCH/F (Dual rate)"),
    ],
    Fallback::Reserved,
);

static RESOURCE_METHOD: ValueString = ValueString::new(
    &[
        (0, "Method (1) selected"),
        (1, "Method (2) selected"),
        (2, "Method (3) selected"),
        (3, "Method (4) selected"),
    ],
    Fallback::Reserved,
);

static DLCI_CC: ValueString = ValueString::new(
    &[
        (0, "Not further specified"),
        (1, "This value is reserved"),
        (2, "FACCH or SDCCH"),
        (3, "SACCH"),
    ],
    Fallback::Reserved,
);

static TF_EXT: TrueFalse = TrueFalse("Extended", "Not extended");
static TF_DTX: TrueFalse = TrueFalse(
    "BSS is forbidden to activate DTX in the downlink direction",
    "BSS may activate DTX in the downlink direction",
);
static TF_IMEISV: TrueFalse = TrueFalse(
    "IMEISV must be included by the Mobile Station",
    "IMEISV must not be included by the Mobile Station",
);
static TF_PCI: TrueFalse = TrueFalse(
    "This allocation request may preempt an existing connection",
    "This allocation request shall not preempt an existing connection",
);
static TF_QA: TrueFalse = TrueFalse("Queuing allowed", "Queuing not allowed");
static TF_PVI: TrueFalse = TrueFalse(
    "This connection might be preempted by another allocation request",
    "This connection shall not be preempted by another allocation request",
);
static TF_QRI: TrueFalse = TrueFalse(
    "It is recommended to allow queuing",
    "It is recommended not to allow queuing",
);
static TF_TI_FLAG: TrueFalse = TrueFalse("allocated by receiver", "allocated by sender");

/// A5 algorithms as listed in the Encryption Information bit map, bit 8 first.
const PERMITTED_ALGORITHMS: [(u32, &str); 8] = [
    (0x80, "GSM A5/7"),
    (0x40, "GSM A5/6"),
    (0x20, "GSM A5/5"),
    (0x10, "GSM A5/4"),
    (0x08, "GSM A5/3"),
    (0x04, "GSM A5/2"),
    (0x02, "GSM A5/1"),
    (0x01, "No encryption"),
];

/// Circuit Identity Code (3.2.2.2)
fn de_cic(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let cic = cur.read_u16()? as u32;
    let pcm = tree.bits_uint("PCM Multiplexer", offset, 2, cic, 0xffe0);
    let ts = tree.bits_uint("Timeslot", offset, 2, cic, 0x001f);
    Ok(Some(format!("CIC 0x{:04x} (PCM Multiplexer {}, Timeslot {})", cic, pcm, ts)))
}

/// Cause (3.2.2.5), one or two octets
fn de_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let ext = tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
    if ext {
        let (_, low) = octet(cur)?;
        let value = ((oct & 0x0f) << 8) | low;
        tree.uint("Cause (national)", offset, 2, value as u64);
        return Ok(Some(format!("National cause 0x{:03x}", value)));
    }
    let v = tree.bits_label("Cause", offset, 1, oct, 0x7f, &CAUSE_VALUE);
    Ok(Some(format!("{} (0x{:02x})", CAUSE_VALUE.label(v), v)))
}

/* one cell of a Cell Identifier or Cell Identifier List, after the discriminator */
fn cell_id_aux(cur: &mut Cursor, disc: u32, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut parts = Vec::new();
    if disc == 0x00 || disc == 0x04 || disc == 0x08 {
        let (mcc, mnc) = plmn(cur, tree)?;
        parts.push(format!("MCC {}, MNC {}", mcc, mnc));
    }
    if matches!(disc, 0x00 | 0x01 | 0x04 | 0x05 | 0x08 | 0x0a) {
        let offset = cur.pos();
        let lac = cur.read_u16()?;
        tree.uint("Location Area Code (LAC)", offset, 2, lac as u64);
        parts.push(format!("LAC 0x{:04x}", lac));
    }
    match disc {
        0x00 | 0x01 | 0x02 => {
            let offset = cur.pos();
            let ci = cur.read_u16()?;
            tree.uint("Cell CI", offset, 2, ci as u64);
            parts.push(format!("CI 0x{:04x}", ci));
        }
        0x08 | 0x09 | 0x0a => {
            let offset = cur.pos();
            let rnc = cur.read_u16()?;
            tree.uint("RNC-ID", offset, 2, rnc as u64);
            parts.push(format!("RNC-ID 0x{:04x}", rnc));
        }
        0x03 | 0x04 | 0x05 | 0x06 => {}
        _ => {
            let offset = cur.pos();
            let rest = cur.rest();
            if !rest.is_empty() {
                tree.bytes("Unknown format", offset, rest);
            }
        }
    }
    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parts.join(", ")))
    }
}

/// Cell Identifier (3.2.2.17)
fn de_cell_id(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let disc = tree.bits_label("Cell identification discriminator", offset, 1, oct, 0x0f, &CELL_DISC);
    cell_id_aux(cur, disc, tree)
}

/// Cell Identifier List (3.2.2.27): one discriminator, then cells until the
/// element ends.
fn de_cell_id_list(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let disc = tree.bits_label("Cell identification discriminator", offset, 1, oct, 0x0f, &CELL_DISC);
    let mut n = 0;
    while !cur.is_empty() {
        let start = cur.pos();
        let mut sub = FieldTree::new();
        let summary = cell_id_aux(cur, disc, &mut sub)?;
        if cur.pos() == start {
            break;
        }
        n += 1;
        tree.subtree(format!("Cell {}", n), start, cur.pos() - start, sub).summary = summary;
    }
    Ok(Some(format!("{} cell(s)", n)))
}

/// Priority (3.2.2.18)
fn de_priority(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    tree.bits_bool("Preemption Capability indicator (PCI)", offset, 1, oct, 0x40, &TF_PCI);
    let level = tree.bits_uint("Priority Level", offset, 1, oct, 0x3c);
    tree.bits_bool("Queuing Allowed Indicator (QA)", offset, 1, oct, 0x02, &TF_QA);
    tree.bits_bool("Preemption Vulnerability Indicator (PVI)", offset, 1, oct, 0x01, &TF_PVI);
    let label = match level {
        0 => "spare".to_string(),
        15 => "priority not used".to_string(),
        l => format!("priority level {}", l),
    };
    Ok(Some(label))
}

/// Layer 3 Header Information (3.2.2.9)
fn de_l3_header(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let pd = tree.bits_label("Protocol Discriminator", offset, 1, oct, 0x0f, &PD_VALS);
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    tree.bits_bool("TI flag", offset, 1, oct, 0x08, &TF_TI_FLAG);
    let ti = tree.bits_uint("TIO", offset, 1, oct, 0x07);
    Ok(Some(format!("{}, TI {}", PD_VALS.label(pd), ti)))
}

fn de_tmsi(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let tmsi = cur.read_u32()?;
    tree.text("TMSI", offset, 4, format!("0x{:08x}", tmsi));
    Ok(Some(format!("0x{:08x}", tmsi)))
}

/// Encryption Information (3.2.2.10)
fn de_enc_info(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let mut permitted = Vec::new();
    for (mask, name) in PERMITTED_ALGORITHMS.iter() {
        let set = oct & mask != 0;
        tree.bits_text(*name, offset, 1, oct, *mask, if set { "Permitted" } else { "Not permitted" });
        if set {
            permitted.push(*name);
        }
    }
    let key_offset = cur.pos();
    let key = cur.rest();
    if !key.is_empty() {
        tree.bytes("Key", key_offset, key);
    }
    Ok(Some(format!("Permitted: {}", permitted.iter().join(", "))))
}

/// Channel Type (3.2.2.11)
fn de_chan_type(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let sdi = tree.bits_label("Speech/Data Indicator", offset, 1, oct, 0x0f, &SPEECH_DATA);
    let (offset, rate) = octet(cur)?;
    let table = match sdi {
        1 | 4 => &CHANNEL_RATE_SPEECH,
        2 => &CHANNEL_RATE_DATA,
        _ => &CHANNEL_RATE_SIGNALLING,
    };
    tree.label("Channel Rate and Type", offset, 1, rate, table);
    match sdi {
        1 | 4 => {
            /* permitted speech versions, extension bit chained */
            loop {
                let (offset, oct) = octet(cur)?;
                let more = tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
                tree.bits_label("Permitted Speech Version Identifier", offset, 1, oct, 0x7f, &SPEECH_VERSION);
                if !more {
                    break;
                }
            }
        }
        _ => {
            let offset = cur.pos();
            let rest = cur.rest();
            if !rest.is_empty() {
                tree.bytes("Data Rate / Transparency", offset, rest);
            }
        }
    }
    Ok(Some(SPEECH_DATA.label(sdi).into_owned()))
}

fn de_uint_octet(name: &'static str, cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    tree.uint(name, offset, 1, v as u64);
    Ok(Some(format!("{}", v)))
}

fn de_periodicity(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    de_uint_octet("Periodicity", cur, tree)
}

fn de_num_ms(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    de_uint_octet("Number of handover candidates", cur, tree)
}

fn de_time_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    de_uint_octet("Time", cur, tree)
}

fn de_circuit_pool(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    de_uint_octet("Circuit pool number", cur, tree)
}

fn de_circuit_pool_list(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut pools = Vec::new();
    while !cur.is_empty() {
        let (offset, v) = octet(cur)?;
        tree.uint("Circuit pool number", offset, 1, v as u64);
        pools.push(v);
    }
    Ok(Some(pools.iter().join(", ")))
}

fn de_ext_res_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfc);
    tree.bits_uint("SM", offset, 1, oct, 0x02);
    tree.bits_uint("TARR", offset, 1, oct, 0x01);
    Ok(None)
}

fn de_int_band(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xe0);
    let bands = (1..=5).filter(|b| oct & (1 << (b - 1)) != 0).collect::<Vec<u32>>();
    tree.bits_text("Band to be used", offset, 1, oct, 0x1f, format!("{:?}", bands));
    Ok(None)
}

fn de_l3_info(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let before = tree.len();
    delegate(cur, ctx, SubProtocol::Dtap, tree)?;
    if tree.len() > before {
        return Ok(tree.fields().last().and_then(|f| f.summary.clone()));
    }
    Ok(None)
}

/// Data Link Connection Identifier (3.2.2.7)
fn de_dlci(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_label("Control Channel", offset, 1, oct, 0xc0, &DLCI_CC);
    tree.spare(offset, 1, oct, 0x38);
    let sapi = tree.bits_uint("SAPI", offset, 1, oct, 0x07);
    Ok(Some(format!("SAPI {}", sapi)))
}

fn de_dtx_flag(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfe);
    tree.bits_bool("DTX Flag", offset, 1, oct, 0x01, &TF_DTX);
    Ok(None)
}

fn de_res_ind_method(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let v = tree.bits_label("Resource Indication Method", offset, 1, oct, 0x0f, &RESOURCE_METHOD);
    Ok(Some(RESOURCE_METHOD.label(v).into_owned()))
}

/// Circuit Identity Code List (3.2.2.31)
fn de_cic_list(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, range) = octet(cur)?;
    tree.uint("Range", offset, 1, range as u64);
    let status_offset = cur.pos();
    let status = cur.rest();
    if !status.is_empty() {
        tree.bytes("Status", status_offset, status);
    }
    Ok(Some(format!("Range {}", range)))
}

/// Chosen Channel (3.2.2.33), also the layout of Current Channel Type 1
fn de_chosen_chan(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let mode = tree.bits_label("Channel mode", offset, 1, oct, 0xf0, &CHANNEL_MODE);
    let chan = tree.bits_label("Channel", offset, 1, oct, 0x0f, &CHANNEL);
    Ok(Some(format!("{}, {}", CHANNEL_MODE.label(mode), CHANNEL.label(chan))))
}

fn de_total_res_acc(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let full = cur.read_u16()?;
    tree.uint("Total Accessible Full Rate Channels", offset, 2, full as u64);
    let offset = cur.pos();
    let half = cur.read_u16()?;
    tree.uint("Total Accessible Half Rate Channels", offset, 2, half as u64);
    Ok(None)
}

/// Resource Available (3.2.2.4): five bands, full/half rate counts
fn de_res_avail(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    for band in 1..=5 {
        let offset = cur.pos();
        let full = cur.read_u16()?;
        let half = cur.read_u16()?;
        let mut sub = FieldTree::new();
        sub.uint("Number of full rate channels available", offset, 2, full as u64);
        sub.uint("Number of half rate channels available", offset + 2, 2, half as u64);
        tree.subtree(format!("Band {}", band), offset, 4, sub);
    }
    Ok(None)
}

fn de_cipher_resp_mode(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfe);
    tree.bits_bool("Cipher Response Mode", offset, 1, oct, 0x01, &TF_IMEISV);
    Ok(None)
}

fn de_chan_needed(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfc);
    let v = tree.bits_label("Channel", offset, 1, oct, 0x03, &CHANNEL_NEEDED);
    Ok(Some(CHANNEL_NEEDED.label(v).into_owned()))
}

/// Chosen Encryption Algorithm (3.2.2.44)
fn de_chosen_enc_alg(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = match v {
        0x01 => "No encryption used".to_string(),
        0x02..=0x08 => format!("GSM A5/{}", v - 1),
        _ => "Reserved".to_string(),
    };
    tree.text("Algorithm Identifier", offset, 1, label.clone());
    Ok(Some(label))
}

fn de_queue_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xfc);
    tree.bits_bool("qri", offset, 1, oct, 0x02, &TF_QRI);
    tree.spare(offset, 1, oct, 0x01);
    Ok(None)
}

/// Speech Version (3.2.2.51)
fn de_speech_ver(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    let v = tree.bits_label("Speech version identifier", offset, 1, oct, 0x7f, &SPEECH_VERSION);
    Ok(Some(SPEECH_VERSION.label(v).into_owned()))
}

fn de_emlpp_prio(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf8);
    let v = tree.bits_uint("Call priority", offset, 1, oct, 0x07);
    Ok(Some(format!("{}", v)))
}

fn de_conf_evo_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let smi = oct & 0x0f;
    let label = match smi {
        0 => "No Modification is allowed".to_string(),
        1..=4 => format!("Modification is allowed and maximum number of TCH/F is {}", smi),
        _ => "Reserved".to_string(),
    };
    tree.bits_text("Subsequent Modification Indication (SMI)", offset, 1, oct, 0x0f, label.clone());
    Ok(Some(label))
}

fn de_lsa_id(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let id = cur.read_u24()?;
    tree.text("LSA ID", offset, 3, format!("0x{:06x}", id));
    Ok(Some(format!("0x{:06x}", id)))
}

/// Element identifier coding (3.2.2.1) paired with its descriptor.
#[derive(Clone, Copy)]
pub struct BssmapElem {
    pub code: u8,
    pub desc: ElemDesc,
}

const fn e(code: u8, desc: ElemDesc) -> BssmapElem {
    BssmapElem { code, desc }
}

pub const BE_CIC: u8 = 0x01;
pub const BE_RES_AVAIL: u8 = 0x03;
pub const BE_CAUSE: u8 = 0x04;
pub const BE_CELL_ID: u8 = 0x05;
pub const BE_PRIO: u8 = 0x06;
pub const BE_L3_HEADER_INFO: u8 = 0x07;
pub const BE_IMSI: u8 = 0x08;
pub const BE_TMSI: u8 = 0x09;
pub const BE_ENC_INFO: u8 = 0x0a;
pub const BE_CHAN_TYPE: u8 = 0x0b;
pub const BE_PERIODICITY: u8 = 0x0c;
pub const BE_EXT_RES_IND: u8 = 0x0d;
pub const BE_NUM_MS: u8 = 0x0e;
pub const BE_CM_INFO_2: u8 = 0x12;
pub const BE_CM_INFO_3: u8 = 0x13;
pub const BE_INT_BAND: u8 = 0x14;
pub const BE_RR_CAUSE: u8 = 0x15;
pub const BE_L3_INFO: u8 = 0x17;
pub const BE_DLCI: u8 = 0x18;
pub const BE_DOWN_DTX_FLAG: u8 = 0x19;
pub const BE_CELL_ID_LIST: u8 = 0x1a;
pub const BE_RESP_REQ: u8 = 0x1b;
pub const BE_RES_IND_METHOD: u8 = 0x1c;
pub const BE_CM_INFO_1: u8 = 0x1d;
pub const BE_CIC_LIST: u8 = 0x1e;
pub const BE_DIAG: u8 = 0x1f;
pub const BE_L3_MSG: u8 = 0x20;
pub const BE_CHOSEN_CHAN: u8 = 0x21;
pub const BE_TOT_RES_ACC: u8 = 0x22;
pub const BE_CIPH_RESP_MODE: u8 = 0x23;
pub const BE_CHAN_NEEDED: u8 = 0x24;
pub const BE_TRACE_TYPE: u8 = 0x25;
pub const BE_TRIGGERID: u8 = 0x26;
pub const BE_TRACE_REF: u8 = 0x27;
pub const BE_TRANSID: u8 = 0x28;
pub const BE_MID: u8 = 0x29;
pub const BE_OMCID: u8 = 0x2a;
pub const BE_FOR_IND: u8 = 0x2b;
pub const BE_CHOSEN_ENC_ALG: u8 = 0x2c;
pub const BE_CCT_POOL: u8 = 0x2d;
pub const BE_CCT_POOL_LIST: u8 = 0x2e;
pub const BE_TIME_IND: u8 = 0x2f;
pub const BE_RES_SIT: u8 = 0x30;
pub const BE_CURR_CHAN_1: u8 = 0x31;
pub const BE_QUE_IND: u8 = 0x32;
pub const BE_ASS_REQ: u8 = 0x33;
pub const BE_TALKER_FLAG: u8 = 0x35;
pub const BE_CONN_REL_REQ: u8 = 0x36;
pub const BE_GROUP_CALL_REF: u8 = 0x37;
pub const BE_EMLPP_PRIO: u8 = 0x38;
pub const BE_CONF_EVO_IND: u8 = 0x39;
pub const BE_OLD2NEW_INFO: u8 = 0x3a;
pub const BE_LSA_ID: u8 = 0x3b;
pub const BE_LSA_ID_LIST: u8 = 0x3c;
pub const BE_LSA_INFO: u8 = 0x3d;
pub const BE_LCS_QOS: u8 = 0x3e;
pub const BE_LSA_ACC_CTRL: u8 = 0x3f;
pub const BE_SPEECH_VER: u8 = 0x40;
pub const BE_LCS_PRIO: u8 = 0x43;
pub const BE_LOC_TYPE: u8 = 0x44;
pub const BE_LOC_EST: u8 = 0x45;
pub const BE_POS_DATA: u8 = 0x46;
pub const BE_LCS_CAUSE: u8 = 0x47;
pub const BE_LCS_CLIENT: u8 = 0x48;
pub const BE_APDU: u8 = 0x49;
pub const BE_NE_ID: u8 = 0x4a;
pub const BE_GPS_ASSIST_DATA: u8 = 0x4b;
pub const BE_DECIPH_KEYS: u8 = 0x4c;
pub const BE_RET_ERR_REQ: u8 = 0x4d;
pub const BE_RET_ERR_CAUSE: u8 = 0x4e;
pub const BE_SEG: u8 = 0x4f;

/// Every BSSMAP element, sorted by code.
pub const ELEMS: &[BssmapElem] = &[
    e(BE_CIC, ElemDesc::full("Circuit Identity Code", de_cic)),
    e(BE_RES_AVAIL, ElemDesc::full("Resource Available", de_res_avail)),
    e(BE_CAUSE, ElemDesc::full("Cause", de_cause)),
    e(BE_CELL_ID, ElemDesc::full("Cell Identifier", de_cell_id)),
    e(BE_PRIO, ElemDesc::full("Priority", de_priority)),
    e(BE_L3_HEADER_INFO, ElemDesc::full("Layer 3 Header Information", de_l3_header)),
    e(BE_IMSI, ElemDesc::full("IMSI", de_mid)),
    e(BE_TMSI, ElemDesc::full("TMSI", de_tmsi)),
    e(BE_ENC_INFO, ElemDesc::full("Encryption Information", de_enc_info)),
    e(BE_CHAN_TYPE, ElemDesc::full("Channel Type", de_chan_type)),
    e(BE_PERIODICITY, ElemDesc::full("Periodicity", de_periodicity)),
    e(BE_EXT_RES_IND, ElemDesc::full("Extended Resource Indicator", de_ext_res_ind)),
    e(BE_NUM_MS, ElemDesc::full("Number Of MSs", de_num_ms)),
    e(BE_CM_INFO_2, ElemDesc::full("Classmark Information Type 2", de_ms_cm_2)),
    e(BE_CM_INFO_3, ElemDesc::full("Classmark Information Type 3", de_ms_cm_3)),
    e(BE_INT_BAND, ElemDesc::full("Interference Band To Be Used", de_int_band)),
    e(BE_RR_CAUSE, ElemDesc::full("RR Cause", de_rr_cause)),
    e(BE_L3_INFO, ElemDesc::full("Layer 3 Information", de_l3_info)),
    e(BE_DLCI, ElemDesc::full("DLCI", de_dlci)),
    e(BE_DOWN_DTX_FLAG, ElemDesc::full("Downlink DTX Flag", de_dtx_flag)),
    e(BE_CELL_ID_LIST, ElemDesc::full("Cell Identifier List", de_cell_id_list)),
    e(BE_RESP_REQ, ElemDesc::raw("Response Request")),
    e(BE_RES_IND_METHOD, ElemDesc::full("Resource Indication Method", de_res_ind_method)),
    e(BE_CM_INFO_1, ElemDesc::full("Classmark Information Type 1", de_ms_cm_1)),
    e(BE_CIC_LIST, ElemDesc::full("Circuit Identity Code List", de_cic_list)),
    e(BE_DIAG, ElemDesc::raw("Diagnostic")),
    e(BE_L3_MSG, ElemDesc::full("Layer 3 Message Contents", de_l3_info)),
    e(BE_CHOSEN_CHAN, ElemDesc::full("Chosen Channel", de_chosen_chan)),
    e(BE_TOT_RES_ACC, ElemDesc::full("Total Resource Accessible", de_total_res_acc)),
    e(BE_CIPH_RESP_MODE, ElemDesc::full("Cipher Response Mode", de_cipher_resp_mode)),
    e(BE_CHAN_NEEDED, ElemDesc::full("Channel Needed", de_chan_needed)),
    e(BE_TRACE_TYPE, ElemDesc::raw("Trace Type")),
    e(BE_TRIGGERID, ElemDesc::raw("TriggerID")),
    e(BE_TRACE_REF, ElemDesc::raw("Trace Reference")),
    e(BE_TRANSID, ElemDesc::raw("TransactionID")),
    e(BE_MID, ElemDesc::full("Mobile Identity", de_mid)),
    e(BE_OMCID, ElemDesc::raw("OMCID")),
    e(BE_FOR_IND, ElemDesc::raw("Forward Indicator")),
    e(BE_CHOSEN_ENC_ALG, ElemDesc::full("Chosen Encryption Algorithm", de_chosen_enc_alg)),
    e(BE_CCT_POOL, ElemDesc::full("Circuit Pool", de_circuit_pool)),
    e(BE_CCT_POOL_LIST, ElemDesc::full("Circuit Pool List", de_circuit_pool_list)),
    e(BE_TIME_IND, ElemDesc::full("Time Indication", de_time_ind)),
    e(BE_RES_SIT, ElemDesc::raw("Resource Situation")),
    e(BE_CURR_CHAN_1, ElemDesc::full("Current Channel Type 1", de_chosen_chan)),
    e(BE_QUE_IND, ElemDesc::full("Queueing Indicator", de_queue_ind)),
    e(BE_ASS_REQ, ElemDesc::raw("Assignment Requirement")),
    e(BE_TALKER_FLAG, ElemDesc::raw("Talker Flag")),
    e(BE_CONN_REL_REQ, ElemDesc::raw("Connection Release Requested")),
    e(BE_GROUP_CALL_REF, ElemDesc::raw("Group Call Reference")),
    e(BE_EMLPP_PRIO, ElemDesc::full("eMLPP Priority", de_emlpp_prio)),
    e(BE_CONF_EVO_IND, ElemDesc::full("Configuration Evolution Indication", de_conf_evo_ind)),
    e(BE_OLD2NEW_INFO, ElemDesc::raw("Old BSS to New BSS Information")),
    e(BE_LSA_ID, ElemDesc::full("LSA Identifier", de_lsa_id)),
    e(BE_LSA_ID_LIST, ElemDesc::raw("LSA Identifier List")),
    e(BE_LSA_INFO, ElemDesc::raw("LSA Information")),
    e(BE_LCS_QOS, ElemDesc::raw("LCS QoS")),
    e(BE_LSA_ACC_CTRL, ElemDesc::raw("LSA access control suppression")),
    e(BE_SPEECH_VER, ElemDesc::full("Speech Version", de_speech_ver)),
    e(BE_LCS_PRIO, ElemDesc::raw("LCS Priority")),
    e(BE_LOC_TYPE, ElemDesc::raw("Location Type")),
    e(BE_LOC_EST, ElemDesc::raw("Location Estimate")),
    e(BE_POS_DATA, ElemDesc::raw("Positioning Data")),
    e(BE_LCS_CAUSE, ElemDesc::raw("LCS Cause")),
    e(BE_LCS_CLIENT, ElemDesc::raw("LCS Client Type")),
    e(BE_APDU, ElemDesc::raw("APDU")),
    e(BE_NE_ID, ElemDesc::raw("Network Element Identity")),
    e(BE_GPS_ASSIST_DATA, ElemDesc::raw("GPS Assistance Data")),
    e(BE_DECIPH_KEYS, ElemDesc::raw("Deciphering Keys")),
    e(BE_RET_ERR_REQ, ElemDesc::raw("Return Error Request")),
    e(BE_RET_ERR_CAUSE, ElemDesc::raw("Return Error Cause")),
    e(BE_SEG, ElemDesc::raw("Segmentation")),
];

const UNKNOWN_ELEM: ElemDesc = ElemDesc::raw("Unknown BSSMAP element");

/* binary search usable while building the message tables */
const fn lookup(code: u8) -> ElemDesc {
    let mut lo = 0;
    let mut hi = ELEMS.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if ELEMS[mid].code == code {
            return ELEMS[mid].desc;
        } else if ELEMS[mid].code < code {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    UNKNOWN_ELEM
}

/// Element descriptor for a code.
pub fn element(code: u8) -> Option<&'static BssmapElem> {
    ELEMS
        .binary_search_by_key(&code, |e| e.code)
        .ok()
        .map(|i| &ELEMS[i])
}

const fn m(form: Form, code: u8) -> IeSpec {
    mand(form, code, lookup(code))
}

const fn o(form: Form, code: u8) -> IeSpec {
    opt(form, code, lookup(code))
}

const ASS_REQ: &[IeSpec] = &[
    m(Form::Tlv, BE_CHAN_TYPE),
    o(Form::Tlv, BE_L3_HEADER_INFO),
    o(Form::Tlv, BE_PRIO),
    o(Form::Tv, BE_CIC),
    o(Form::Tv, BE_DOWN_DTX_FLAG),
    o(Form::Tv, BE_INT_BAND),
    o(Form::Tlv, BE_CM_INFO_2),
    o(Form::Tlv, BE_GROUP_CALL_REF),
    o(Form::T, BE_TALKER_FLAG),
    o(Form::Tv, BE_LSA_ACC_CTRL),
];

const ASS_COMPLETE: &[IeSpec] = &[
    o(Form::Tv, BE_RR_CAUSE),
    o(Form::Tv, BE_CIC),
    o(Form::Tlv, BE_CELL_ID),
    o(Form::Tv, BE_CHOSEN_CHAN),
    o(Form::Tv, BE_CHOSEN_ENC_ALG),
    o(Form::Tv, BE_CCT_POOL),
    o(Form::Tv, BE_SPEECH_VER).named(" (Chosen)"),
    o(Form::Tlv, BE_LSA_ID),
];

const ASS_FAILURE: &[IeSpec] = &[
    m(Form::Tlv, BE_CAUSE),
    o(Form::Tv, BE_RR_CAUSE),
    o(Form::Tv, BE_CCT_POOL),
    o(Form::Tlv, BE_CCT_POOL_LIST),
];

const HO_REQ: &[IeSpec] = &[
    m(Form::Tlv, BE_CHAN_TYPE),
    m(Form::Tlv, BE_ENC_INFO),
    o(Form::Tv, BE_CM_INFO_1),
    o(Form::Tlv, BE_CM_INFO_2),
    m(Form::Tlv, BE_CELL_ID).named(" (Serving)"),
    o(Form::Tlv, BE_PRIO),
    o(Form::Tv, BE_CIC),
    o(Form::Tv, BE_DOWN_DTX_FLAG),
    m(Form::Tlv, BE_CELL_ID).named(" (Target)"),
    o(Form::Tv, BE_INT_BAND),
    o(Form::Tlv, BE_CAUSE),
    o(Form::Tlv, BE_CM_INFO_3),
    o(Form::Tv, BE_CURR_CHAN_1),
    o(Form::Tv, BE_SPEECH_VER).named(" (Used)"),
    o(Form::Tlv, BE_GROUP_CALL_REF),
    o(Form::T, BE_TALKER_FLAG),
    o(Form::Tv, BE_CONF_EVO_IND),
    o(Form::Tv, BE_CHOSEN_ENC_ALG).named(" (Serving)"),
    o(Form::Tlv, BE_OLD2NEW_INFO),
    o(Form::Tlv, BE_LSA_INFO),
    o(Form::Tv, BE_LSA_ACC_CTRL),
];

const HO_REQD: &[IeSpec] = &[
    m(Form::Tlv, BE_CAUSE),
    o(Form::T, BE_RESP_REQ),
    m(Form::Tlv, BE_CELL_ID_LIST).named(" (Preferred)"),
    o(Form::Tlv, BE_CCT_POOL_LIST),
    o(Form::Tv, BE_CURR_CHAN_1),
    o(Form::Tv, BE_SPEECH_VER).named(" (Used)"),
    o(Form::Tv, BE_QUE_IND),
    o(Form::Tlv, BE_OLD2NEW_INFO),
];

const HO_REQ_ACK: &[IeSpec] = &[
    m(Form::Tlv, BE_L3_INFO),
    o(Form::Tv, BE_CHOSEN_CHAN),
    o(Form::Tv, BE_CHOSEN_ENC_ALG),
    o(Form::Tv, BE_CCT_POOL),
    o(Form::Tv, BE_SPEECH_VER).named(" (Chosen)"),
    o(Form::Tv, BE_CIC),
    o(Form::Tlv, BE_LSA_ID),
];

const HO_CMD: &[IeSpec] = &[m(Form::Tlv, BE_L3_INFO), o(Form::Tlv, BE_CELL_ID)];

const HO_COMPLETE: &[IeSpec] = &[o(Form::Tv, BE_RR_CAUSE)];

const HO_FAILURE: &[IeSpec] = &[
    m(Form::Tlv, BE_CAUSE),
    o(Form::Tv, BE_RR_CAUSE),
    o(Form::Tv, BE_CCT_POOL),
    o(Form::Tlv, BE_CCT_POOL_LIST),
];

const HO_PERFORMED: &[IeSpec] = &[
    m(Form::Tlv, BE_CAUSE),
    m(Form::Tlv, BE_CELL_ID),
    o(Form::Tv, BE_CHOSEN_CHAN),
    o(Form::Tv, BE_CHOSEN_ENC_ALG),
    o(Form::Tv, BE_SPEECH_VER).named(" (Chosen)"),
    o(Form::Tlv, BE_LSA_ID),
];

const HO_CAND_ENQ: &[IeSpec] = &[
    m(Form::Tv, BE_NUM_MS),
    m(Form::Tlv, BE_CELL_ID_LIST),
    m(Form::Tlv, BE_CELL_ID),
];

const HO_CAND_RESP: &[IeSpec] = &[m(Form::Tv, BE_NUM_MS), m(Form::Tlv, BE_CELL_ID)];

const CLEAR_CMD: &[IeSpec] = &[o(Form::Tlv, BE_L3_HEADER_INFO), m(Form::Tlv, BE_CAUSE)];

const CAUSE_ONLY: &[IeSpec] = &[m(Form::Tlv, BE_CAUSE)];

const SAPI_N_REJ: &[IeSpec] = &[m(Form::Tv, BE_DLCI), m(Form::Tlv, BE_CAUSE)];

const CONFUSION: &[IeSpec] = &[m(Form::Tlv, BE_CAUSE), m(Form::Tlv, BE_DIAG)];

const DLCI_ONLY: &[IeSpec] = &[m(Form::Tv, BE_DLCI)];

const COMMON_ID: &[IeSpec] = &[m(Form::Tlv, BE_IMSI)];

const OVERLOAD: &[IeSpec] = &[m(Form::Tlv, BE_CAUSE), o(Form::Tlv, BE_CELL_ID)];

const CIC_CAUSE: &[IeSpec] = &[m(Form::Tv, BE_CIC), m(Form::Tlv, BE_CAUSE)];

const CIC_ONLY: &[IeSpec] = &[m(Form::Tv, BE_CIC)];

const BLOCK: &[IeSpec] = &[
    m(Form::Tv, BE_CIC),
    m(Form::Tlv, BE_CAUSE),
    o(Form::T, BE_CONN_REL_REQ),
];

const CCT_GROUP_BLOCK: &[IeSpec] = &[
    m(Form::Tlv, BE_CAUSE),
    m(Form::Tv, BE_CIC),
    m(Form::Tlv, BE_CIC_LIST),
];

const CCT_GROUP_ACK: &[IeSpec] = &[m(Form::Tv, BE_CIC), m(Form::Tlv, BE_CIC_LIST)];

const UNEQUIPPED_CCT: &[IeSpec] = &[m(Form::Tv, BE_CIC), o(Form::Tlv, BE_CIC_LIST)];

const RESOURCE_REQ: &[IeSpec] = &[
    m(Form::Tv, BE_PERIODICITY),
    m(Form::Tv, BE_RES_IND_METHOD),
    m(Form::Tlv, BE_CELL_ID),
    o(Form::Tv, BE_EXT_RES_IND),
];

const RESOURCE_IND: &[IeSpec] = &[
    m(Form::Tv, BE_RES_IND_METHOD),
    o(Form::Tv, BE_RES_AVAIL),
    m(Form::Tlv, BE_CELL_ID),
    o(Form::Tv, BE_TOT_RES_ACC),
];

const PAGING: &[IeSpec] = &[
    m(Form::Tlv, BE_IMSI),
    o(Form::Tlv, BE_TMSI),
    m(Form::Tlv, BE_CELL_ID_LIST),
    o(Form::Tv, BE_CHAN_NEEDED),
    o(Form::Tv, BE_EMLPP_PRIO),
];

const CIPH_MODE_CMD: &[IeSpec] = &[
    o(Form::Tlv, BE_L3_HEADER_INFO),
    m(Form::Tlv, BE_ENC_INFO),
    o(Form::Tv, BE_CIPH_RESP_MODE),
];

const CM_UPDATE: &[IeSpec] = &[m(Form::Tlv, BE_CM_INFO_2), o(Form::Tlv, BE_CM_INFO_3)];

const CIPH_MODE_COMPLETE: &[IeSpec] = &[o(Form::Tlv, BE_L3_MSG), o(Form::Tv, BE_CHOSEN_ENC_ALG)];

const CL3_INFO: &[IeSpec] = &[
    m(Form::Tlv, BE_CELL_ID),
    m(Form::Tlv, BE_L3_INFO),
    o(Form::Tv, BE_CHOSEN_CHAN),
    o(Form::Tlv, BE_LSA_ID_LIST),
    o(Form::Tlv, BE_APDU),
];

const LOAD_IND: &[IeSpec] = &[
    m(Form::Tv, BE_TIME_IND),
    m(Form::Tlv, BE_CELL_ID),
    m(Form::Tlv, BE_CELL_ID_LIST).named(" (Target)"),
    o(Form::Tlv, BE_RES_SIT),
    o(Form::Tlv, BE_CAUSE),
];

const EMPTY: &[IeSpec] = &[];

/// Message type coding (3.2.2.1)
pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x01, "Assignment Request", Body::Ies(ASS_REQ)),
    MsgDesc::new(0x02, "Assignment Complete", Body::Ies(ASS_COMPLETE)),
    MsgDesc::new(0x03, "Assignment Failure", Body::Ies(ASS_FAILURE)),
    MsgDesc::new(0x10, "Handover Request", Body::Ies(HO_REQ)),
    MsgDesc::new(0x11, "Handover Required", Body::Ies(HO_REQD)),
    MsgDesc::new(0x12, "Handover Request Acknowledge", Body::Ies(HO_REQ_ACK)),
    MsgDesc::new(0x13, "Handover Command", Body::Ies(HO_CMD)),
    MsgDesc::new(0x14, "Handover Complete", Body::Ies(HO_COMPLETE)),
    MsgDesc::new(0x15, "Handover Succeeded", Body::Ies(EMPTY)),
    MsgDesc::new(0x16, "Handover Failure", Body::Ies(HO_FAILURE)),
    MsgDesc::new(0x17, "Handover Performed", Body::Ies(HO_PERFORMED)),
    MsgDesc::new(0x18, "Handover Candidate Enquire", Body::Ies(HO_CAND_ENQ)),
    MsgDesc::new(0x19, "Handover Candidate Response", Body::Ies(HO_CAND_RESP)),
    MsgDesc::new(0x1a, "Handover Required Reject", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x1b, "Handover Detect", Body::Ies(EMPTY)),
    MsgDesc::new(0x20, "Clear Command", Body::Ies(CLEAR_CMD)),
    MsgDesc::new(0x21, "Clear Complete", Body::Ies(EMPTY)),
    MsgDesc::new(0x22, "Clear Request", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x25, "SAPI 'n' Reject", Body::Ies(SAPI_N_REJ)),
    MsgDesc::new(0x26, "Confusion", Body::Ies(CONFUSION)),
    MsgDesc::new(0x28, "Suspend", Body::Ies(DLCI_ONLY)),
    MsgDesc::new(0x29, "Resume", Body::Ies(DLCI_ONLY)),
    MsgDesc::new(0x2a, "Connection Oriented Information", Body::Undecoded),
    MsgDesc::new(0x2b, "Perform Location Request", Body::Undecoded),
    MsgDesc::new(0x2c, "LSA Information", Body::Undecoded),
    MsgDesc::new(0x2d, "Perform Location Response", Body::Undecoded),
    MsgDesc::new(0x2e, "Perform Location Abort", Body::Undecoded),
    MsgDesc::new(0x2f, "Common Id", Body::Ies(COMMON_ID)),
    MsgDesc::new(0x30, "Reset", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x31, "Reset Acknowledge", Body::Ies(EMPTY)),
    MsgDesc::new(0x32, "Overload", Body::Ies(OVERLOAD)),
    MsgDesc::new(0x34, "Reset Circuit", Body::Ies(CIC_CAUSE)),
    MsgDesc::new(0x35, "Reset Circuit Acknowledge", Body::Ies(CIC_ONLY)),
    MsgDesc::new(0x36, "MSC Invoke Trace", Body::Undecoded),
    MsgDesc::new(0x37, "BSS Invoke Trace", Body::Undecoded),
    MsgDesc::new(0x3a, "Connectionless Information", Body::Undecoded),
    MsgDesc::new(0x40, "Block", Body::Ies(BLOCK)),
    MsgDesc::new(0x41, "Blocking Acknowledge", Body::Ies(CIC_ONLY)),
    MsgDesc::new(0x42, "Unblock", Body::Ies(CIC_ONLY)),
    MsgDesc::new(0x43, "Unblocking Acknowledge", Body::Ies(CIC_ONLY)),
    MsgDesc::new(0x44, "Circuit Group Block", Body::Ies(CCT_GROUP_BLOCK)),
    MsgDesc::new(0x45, "Circuit Group Blocking Acknowledge", Body::Ies(CCT_GROUP_ACK)),
    MsgDesc::new(0x46, "Circuit Group Unblock", Body::Ies(CCT_GROUP_BLOCK)),
    MsgDesc::new(0x47, "Circuit Group Unblocking Acknowledge", Body::Ies(CCT_GROUP_ACK)),
    MsgDesc::new(0x48, "Unequipped Circuit", Body::Ies(UNEQUIPPED_CCT)),
    MsgDesc::new(0x4e, "Change Circuit", Body::Undecoded),
    MsgDesc::new(0x4f, "Change Circuit Acknowledge", Body::Undecoded),
    MsgDesc::new(0x50, "Resource Request", Body::Ies(RESOURCE_REQ)),
    MsgDesc::new(0x51, "Resource Indication", Body::Ies(RESOURCE_IND)),
    MsgDesc::new(0x52, "Paging", Body::Ies(PAGING)),
    MsgDesc::new(0x53, "Cipher Mode Command", Body::Ies(CIPH_MODE_CMD)),
    MsgDesc::new(0x54, "Classmark Update", Body::Ies(CM_UPDATE)),
    MsgDesc::new(0x55, "Cipher Mode Complete", Body::Ies(CIPH_MODE_COMPLETE)),
    MsgDesc::new(0x56, "Queuing Indication", Body::Ies(EMPTY)),
    MsgDesc::new(0x57, "Complete Layer 3 Information", Body::Ies(CL3_INFO)),
    MsgDesc::new(0x58, "Classmark Request", Body::Ies(EMPTY)),
    MsgDesc::new(0x59, "Cipher Mode Reject", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x5a, "Load Indication", Body::Ies(LOAD_IND)),
];

lazy_static! {
    static ref INDEX: MsgIndex = MsgIndex::new(MESSAGES);
}

pub fn message(code: u8) -> Option<&'static MsgDesc> {
    INDEX.get(code)
}

/// Decodes one BSSMAP message, starting at its message type octet.
pub fn dissect(data: &[u8], ctx: &DecodeContext) -> DResult<Dissection> {
    let mut cur = Cursor::new(data);
    let mut tree = FieldTree::new();
    let (offset, code) = octet(&mut cur)?;
    let msg = match message(code as u8) {
        Some(m) => m,
        None => {
            let name = format!("Unknown BSSMAP Message Type (0x{:02x})", code);
            warn!("{}", name);
            tree.diag(Diagnostic::UnknownMessageType, name.clone(), offset, &[]);
            return Ok(frame(PROTOCOL, name, data.len(), tree));
        }
    };
    debug!("BSSMAP {}", msg.name);
    tree.bits_text("BSSMAP Message Type", offset, 1, code, 0xff, msg.name);
    dissect_msg(&mut cur, ctx, msg, &mut tree)?;
    Ok(frame(PROTOCOL, msg.name.to_string(), data.len(), tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecodeOptions, Direction};
    use crate::field::Value;
    use crate::proto::gsm_a::elem::tests::run;
    use crate::proto::gsm_a::elem::Decode;
    use crate::proto::BuiltinHandoff;

    fn bssmap(data: &[u8]) -> DResult<Dissection> {
        let opts = DecodeOptions::default();
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        dissect(data, &ctx)
    }

    #[test]
    fn element_table() {
        for w in ELEMS.windows(2) {
            assert!(w[0].code < w[1].code, "0x{:02x} out of order", w[1].code);
        }
        assert_eq!(element(BE_CELL_ID).map(|e| e.desc.name), Some("Cell Identifier"));
        assert!(element(0x02).is_none());
        /* every element referenced by a message resolves */
        for msg in MESSAGES {
            if let Body::Ies(ies) = msg.body {
                for ie in ies {
                    assert!(element(ie.iei).is_some(), "{}: 0x{:02x}", msg.name, ie.iei);
                    assert_ne!(ie.elem.name, UNKNOWN_ELEM.name);
                }
            }
        }
        assert!(matches!(lookup(0x7f).decode, Decode::Raw));
    }

    #[test]
    fn complete_layer3_information() {
        let mut data = vec![
            0x57, 0x05, 0x08, 0x00, 0x02, 0xf8, 0x01, 0x00, 0x01, 0x00, 0x02, 0x17, 0x12,
        ];
        /* DTAP Location Updating Request */
        data.extend_from_slice(&[
            0x05, 0x08, 0x72, 0x02, 0xf8, 0x01, 0x00, 0x01, 0x33, 0x08, 0x09, 0x10, 0x10,
            0x10, 0x32, 0x54, 0x76, 0x98,
        ]);
        let d = bssmap(&data).unwrap();
        assert_eq!(d.protocol, PROTOCOL);
        assert_eq!(d.info, "Complete Layer 3 Information");
        assert!(d.diagnostics().is_empty());
        assert_eq!(
            d.find("Cell Identifier").unwrap().summary.as_deref(),
            Some("MCC 208, MNC 10, LAC 0x0001, CI 0x0002")
        );
        let l3 = d.find("Layer 3 Information").unwrap();
        assert_eq!(l3.summary.as_deref(), Some("Location Updating Request"));
        let imsi = l3.find("IMSI").unwrap();
        assert_eq!(imsi.as_str(), Some("001010123456789"));
        assert_eq!(imsi.offset, 23);
    }

    #[test]
    fn cell_identifier_list() {
        /* LAC + CI, two cells, then a list with no cell */
        let data = [0x1a, 0x09, 0x01, 0x00, 0x01, 0x00, 0x0a, 0x00, 0x02, 0x00, 0x0b];
        let ies = [mand(Form::Tlv, BE_CELL_ID_LIST, lookup(BE_CELL_ID_LIST))];
        let f = run(&data, &ies, Direction::Unknown).unwrap();
        let list = f.find("Cell Identifier List").unwrap();
        assert_eq!(list.summary.as_deref(), Some("2 cell(s)"));
        assert_eq!(
            list.find("Cell 2").unwrap().summary.as_deref(),
            Some("LAC 0x0002, CI 0x000b")
        );
        assert!(f.diagnostics().is_empty());

        let f = run(&[0x1a, 0x01, 0x06], &ies, Direction::Unknown).unwrap();
        assert_eq!(
            f.find("Cell Identifier List").unwrap().summary.as_deref(),
            Some("0 cell(s)")
        );
    }

    #[test]
    fn cell_identifier_discriminators() {
        let ies = [mand(Form::Tlv, BE_CELL_ID, lookup(BE_CELL_ID))];
        let cases: &[(&[u8], Option<&str>)] = &[
            (&[0x05, 0x03, 0x02, 0x12, 0x34], Some("CI 0x1234")),
            (&[0x05, 0x03, 0x05, 0x00, 0x07], Some("LAC 0x0007")),
            (&[0x05, 0x01, 0x06], None),
            (&[0x05, 0x03, 0x09, 0x01, 0x00], Some("RNC-ID 0x0100")),
            (
                &[0x05, 0x08, 0x08, 0x02, 0xf8, 0x01, 0x00, 0x07, 0x01, 0x00],
                Some("MCC 208, MNC 10, LAC 0x0007, RNC-ID 0x0100"),
            ),
        ];
        for (data, summary) in cases {
            let f = run(data, &ies, Direction::Unknown).unwrap();
            assert_eq!(f.find("Cell Identifier").unwrap().summary.as_deref(), *summary);
            assert!(f.diagnostics().is_empty());
        }
        /* CGI cut short */
        let f = run(&[0x05, 0x04, 0x00, 0x02, 0xf8, 0x01], &ies, Direction::Unknown).unwrap();
        assert!(f.find("Short Data (?)").is_some());
    }

    #[test]
    fn clear_command_and_cause() {
        let d = bssmap(&[0x20, 0x04, 0x01, 0x09]).unwrap();
        assert_eq!(d.info, "Clear Command");
        assert_eq!(d.find("Cause").unwrap().summary.as_deref(), Some("Call control (0x09)"));
        /* national cause, two octets */
        let d = bssmap(&[0x22, 0x04, 0x02, 0x81, 0x23]).unwrap();
        assert_eq!(
            d.find("Cause").unwrap().summary.as_deref(),
            Some("National cause 0x123")
        );
        let d = bssmap(&[0x20]).unwrap();
        assert_eq!(
            d.diagnostics()[0].name,
            "Missing Mandatory element (0x04) Cause, rest of dissection is suspect"
        );
    }

    #[test]
    fn assignment_request() {
        /* speech, full rate, FR v1 + EFR, CIC, DTX */
        let data = [
            0x01, 0x0b, 0x04, 0x01, 0x08, 0x81, 0x11, 0x01, 0x00, 0x25, 0x19, 0x01,
        ];
        let d = bssmap(&data).unwrap();
        assert!(d.diagnostics().is_empty());
        assert_eq!(d.find("Channel Type").unwrap().summary.as_deref(), Some("Speech"));
        assert_eq!(
            d.find("Circuit Identity Code").unwrap().summary.as_deref(),
            Some("CIC 0x0025 (PCM Multiplexer 1, Timeslot 5)")
        );
        assert_eq!(
            d.find("DTX Flag").and_then(|f| f.label()),
            Some("BSS is forbidden to activate DTX in the downlink direction")
        );
    }

    #[test]
    fn cipher_mode_command() {
        let data = [
            0x53, 0x0a, 0x09, 0x0b, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x23,
            0x01,
        ];
        let d = bssmap(&data).unwrap();
        assert!(d.diagnostics().is_empty());
        assert_eq!(
            d.find("Encryption Information").unwrap().summary.as_deref(),
            Some("Permitted: GSM A5/3, GSM A5/1, No encryption")
        );
        assert_eq!(
            d.find("Key").map(|k| k.value.clone()),
            Some(Value::Bytes(vec![1, 2, 3, 4, 5, 6, 7, 8]))
        );
    }

    #[test]
    fn unknown_type() {
        let d = bssmap(&[0x7e, 0x01, 0x02]).unwrap();
        let diags = d.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].name, "Unknown BSSMAP Message Type (0x7e)");
        assert_eq!(d.tree.children().len(), 1);
    }
}
