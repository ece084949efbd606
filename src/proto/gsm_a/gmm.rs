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

/* GPRS Mobility Management (3GPP TS 24.008 9.4, elements 10.5.5) */

use lazy_static::lazy_static;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::vals::{Fallback, TrueFalse, ValueString, TF_SUPPORTED};

use super::common::{CKSN, MOBILE_ID, PLMN_LIST, RAI, SPARE_HALF};
use super::elem::{mand, octet, opt, Body, ElemDesc, Form, Half, IeSpec, MsgDesc, MsgIndex, Nibble};
use super::mm::{DAY_SAVING, EMERG_NUM_LIST, LSA_ID, NETWORK_NAME, TIME_ZONE, TIME_ZONE_TIME};

pub static GMM_CAUSE: ValueString = ValueString::new(
    &[
        (0x02, "IMSI unknown in HLR"),
        (0x03, "Illegal MS"),
        (0x04, "IMSI unknown in VLR"),
        (0x05, "IMEI not accepted"),
        (0x06, "Illegal ME"),
        (0x07, "GPRS services not allowed"),
        (0x08, "GPRS services and non-GPRS services not allowed"),
        (0x09, "MS identity cannot be derived by the network"),
        (0x0a, "Implicitly detached"),
        (0x0b, "PLMN not allowed"),
        (0x0c, "Location Area not allowed"),
        (0x0d, "Roaming not allowed in this location area"),
        (0x0e, "GPRS services not allowed in this PLMN"),
        (0x0f, "No Suitable Cells In Location Area"),
        (0x10, "MSC temporarily not reachable"),
        (0x11, "Network failure"),
        (0x14, "MAC failure"),
        (0x15, "Synch failure"),
        (0x16, "Congestion"),
        (0x17, "GSM authentication unacceptable"),
        (0x19, "Not authorized for this CSG"),
        (0x28, "No PDP context activated"),
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
    Fallback::Static("Protocol error, unspecified"),
);

static ATTACH_TYPE: ValueString = ValueString::new(
    &[
        (1, "GPRS attach"),
        (2, "Not used (In the earlier versions: GPRS attach while IMSI attached)"),
        (3, "Combined GPRS/IMSI attach"),
        (4, "Emergency attach"),
    ],
    Fallback::Static("GPRS attach"),
);

static ATTACH_RESULT: ValueString = ValueString::new(
    &[
        (1, "GPRS only attached"),
        (3, "Combined GPRS/IMSI attached"),
    ],
    Fallback::Reserved,
);

static UPDATE_TYPE: ValueString = ValueString::new(
    &[
        (0, "RA updating"),
        (1, "combined RA/LA updating"),
        (2, "combined RA/LA updating with IMSI attach"),
        (3, "Periodic updating"),
    ],
    Fallback::Reserved,
);

static UPDATE_RESULT: ValueString = ValueString::new(
    &[
        (0, "RA updated"),
        (1, "combined RA/LA updated"),
        (4, "RA updated and ISR activated"),
        (5, "combined RA/LA updated and ISR activated"),
    ],
    Fallback::Reserved,
);

static DETACH_TYPE_UP: ValueString = ValueString::new(
    &[
        (1, "GPRS detach"),
        (2, "IMSI detach"),
        (3, "Combined GPRS/IMSI detach"),
    ],
    Fallback::Static("Combined GPRS/IMSI detach"),
);

static DETACH_TYPE_DOWN: ValueString = ValueString::new(
    &[
        (1, "re-attach required"),
        (2, "re-attach not required"),
        (3, "IMSI detach (after VLR failure)"),
    ],
    Fallback::Static("re-attach not required"),
);

static TF_POWER_OFF: TrueFalse = TrueFalse("Power switched off", "Normal detach");
static TF_FOLLOW_ON: TrueFalse = TrueFalse("Follow-on request pending", "No follow-on request pending");
static TF_FOLLOW_ON_PROCEED: TrueFalse = TrueFalse("Follow-on proceed", "No follow-on proceed");
static TF_FORCE_STANDBY: TrueFalse = TrueFalse("Force to standby indicated", "Force to standby not indicated");
static TF_TMSI_STATUS: TrueFalse = TrueFalse("valid TMSI available", "no valid TMSI available");
static TF_ACTIVE: TrueFalse = TrueFalse("PDP-ACTIVE", "PDP-INACTIVE");

static SERVICE_TYPE: ValueString = ValueString::new(
    &[
        (0, "Signalling"),
        (1, "Data"),
        (2, "Paging Response"),
        (3, "MBMS Multicast Service Reception"),
        (4, "MBMS Broadcast Service Reception"),
    ],
    Fallback::Reserved,
);

static RADIO_PRIORITY: ValueString = ValueString::new(
    &[
        (1, "priority level 1 (highest)"),
        (2, "priority level 2"),
        (3, "priority level 3"),
        (4, "priority level 4 (lowest)"),
    ],
    Fallback::Static("priority level 4 (lowest)"),
);

static CIPHERING_ALGORITHM: ValueString = ValueString::new(
    &[
        (0, "ciphering not used"),
        (1, "GPRS Encryption Algorithm GEA/1"),
        (2, "GPRS Encryption Algorithm GEA/2"),
        (3, "GPRS Encryption Algorithm GEA/3"),
        (4, "GPRS Encryption Algorithm GEA/4"),
        (5, "GPRS Encryption Algorithm GEA/5"),
        (6, "GPRS Encryption Algorithm GEA/6"),
        (7, "GPRS Encryption Algorithm GEA/7"),
    ],
    Fallback::Reserved,
);

static IMEISV_REQUEST: ValueString = ValueString::new(
    &[(0, "IMEISV not requested"), (1, "IMEISV requested")],
    Fallback::Static("IMEISV not requested"),
);

static IDENTITY_TYPE_2: ValueString = ValueString::new(
    &[(1, "IMSI"), (2, "IMEI"), (3, "IMEISV"), (4, "TMSI")],
    Fallback::Static("IMSI"),
);

static CN_DRX_COEFF: ValueString = ValueString::new(
    &[
        (0, "CN Specific DRX cycle length coefficient not specified by the MS"),
        (6, "CN Specific DRX cycle length coefficient 6 and T = 32"),
        (7, "CN Specific DRX cycle length coefficient 7 and T = 64"),
        (8, "CN Specific DRX cycle length coefficient 8 and T = 128"),
        (9, "CN Specific DRX cycle length coefficient 9 and T = 256"),
    ],
    Fallback::Static("CN Specific DRX cycle length coefficient not specified by the MS"),
);

static NON_DRX_TIMER: ValueString = ValueString::new(
    &[
        (0, "no non-DRX mode after transfer state"),
        (1, "max. 1 sec non-DRX mode after transfer state"),
        (2, "max. 2 sec non-DRX mode after transfer state"),
        (3, "max. 4 sec non-DRX mode after transfer state"),
        (4, "max. 8 sec non-DRX mode after transfer state"),
        (5, "max. 16 sec non-DRX mode after transfer state"),
        (6, "max. 32 sec non-DRX mode after transfer state"),
        (7, "max. 64 sec non-DRX mode after transfer state"),
    ],
    Fallback::Reserved,
);

static TF_SPLIT_ON_CCCH: TrueFalse = TrueFalse(
    "Split pg cycle on CCCH is supported by the mobile station",
    "Split pg cycle on CCCH is not supported by the mobile station",
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

static TF_GEA1: TrueFalse = TrueFalse("encryption algorithm available", "encryption algorithm not available");
static TF_REVISION: TrueFalse = TrueFalse(
    "used by a mobile station supporting R99 or later versions of the protocol",
    "used by a mobile station not supporting R99 or later versions of the protocol",
);

/// Split PG cycle code (10.5.5.6): 1 to 64 map to themselves, 65 to 98 to
/// an irregular series, 0 and the rest mean no DRX.
fn split_pg_cycle(code: u32) -> String {
    const HIGH: [u32; 34] = [
        71, 72, 74, 75, 77, 79, 80, 83, 86, 88, 90, 92, 96, 101, 103, 107, 112, 116, 118, 128,
        141, 144, 150, 160, 171, 176, 192, 214, 224, 235, 256, 288, 320, 352,
    ];
    match code {
        1..=64 => code.to_string(),
        65..=98 => HIGH[(code - 65) as usize].to_string(),
        _ => "704 (equivalent to no DRX)".to_string(),
    }
}

/// GPRS Timer (10.5.7.3)
pub fn gprs_timer(oct: u32) -> String {
    let value = oct & 0x1f;
    match (oct & 0xe0) >> 5 {
        0 => format!("{} sec", value * 2),
        1 => format!("{} min", value),
        2 => format!("{} min", value * 6),
        7 => "timer is deactivated".to_string(),
        _ => format!("{} min", value),
    }
}

fn de_gprs_timer(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let value = gprs_timer(oct);
    tree.bits_uint("Unit", offset, 1, oct, 0xe0);
    tree.bits_text("Timer value", offset, 1, oct, 0x1f, value.clone());
    Ok(Some(value))
}

pub fn de_gmm_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("GMM Cause value", offset, 1, v, &GMM_CAUSE);
    Ok(Some(label.into_owned()))
}

/// MS Network Capability (10.5.5.12); the first octet is broken down.
fn de_ms_net_cap(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("GEA/1", offset, 1, oct, 0x80, &TF_GEA1);
    tree.bits_bool("SM capabilities via dedicated channels", offset, 1, oct, 0x40, &TF_SUPPORTED);
    tree.bits_bool("SM capabilities via GPRS channels", offset, 1, oct, 0x20, &TF_SUPPORTED);
    tree.bits_bool("UCS2 support", offset, 1, oct, 0x10, &TrueFalse(
        "the ME has no preference between the use of the default alphabet and the use of UCS2",
        "the ME has a preference for the default alphabet (defined in 3GPP TS 23.038) over UCS2",
    ));
    tree.bits_label("SS Screening Indicator", offset, 1, oct, 0x0c, &SS_SCREENING);
    tree.bits_bool("SoLSA Capability", offset, 1, oct, 0x02, &TF_SUPPORTED);
    tree.bits_bool("Revision level indicator", offset, 1, oct, 0x01, &TF_REVISION);
    let rest_offset = cur.pos();
    let rest = cur.rest();
    if !rest.is_empty() {
        tree.bytes("Additional capabilities", rest_offset, rest);
    }
    Ok(None)
}

/// DRX Parameter (10.5.5.6)
fn de_drx_param(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let cycle = split_pg_cycle(oct);
    tree.text("Split PG Cycle Code", offset, 1, cycle.clone());
    let (offset, oct) = octet(cur)?;
    tree.bits_label("CN Specific DRX cycle length coefficient", offset, 1, oct, 0xf0, &CN_DRX_COEFF);
    tree.bits_bool("Split on CCCH", offset, 1, oct, 0x08, &TF_SPLIT_ON_CCCH);
    tree.bits_label("Non-DRX timer", offset, 1, oct, 0x07, &NON_DRX_TIMER);
    Ok(Some(format!("Split PG Cycle {}", cycle)))
}

fn de_ptmsi_sig(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let sig = cur.read_u24()?;
    tree.text("P-TMSI Signature", offset, 3, format!("0x{:06x}", sig));
    Ok(None)
}

/// PDP Context Status (10.5.7.1): one bit per NSAPI 0 to 15
fn de_pdp_ctx_status(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut active = Vec::new();
    for first in [0u32, 8] {
        let (offset, oct) = octet(cur)?;
        for bit in (0..8).rev() {
            let nsapi = first + bit;
            let name = format!("NSAPI({})", nsapi);
            if nsapi < 5 {
                tree.bits_uint(name, offset, 1, oct, 1 << bit);
                continue;
            }
            if tree.bits_bool(name, offset, 1, oct, 1 << bit, &TF_ACTIVE) {
                active.push(nsapi);
            }
        }
    }
    active.sort_unstable();
    Ok(Some(if active.is_empty() {
        "no active NSAPI".to_string()
    } else {
        format!(
            "active NSAPI {}",
            active.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",")
        )
    }))
}

fn de_attach_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_bool("Follow-on request", half.offset, 1, raw, half.mask(0x08), &TF_FOLLOW_ON);
    let v = tree.bits_label("Type of attach", half.offset, 1, raw, half.mask(0x07), &ATTACH_TYPE);
    Some(ATTACH_TYPE.label(v).into_owned())
}

fn de_attach_result(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_bool("Follow-on proceed", half.offset, 1, raw, half.mask(0x08), &TF_FOLLOW_ON_PROCEED);
    let v = tree.bits_label("Result of attach", half.offset, 1, raw, half.mask(0x07), &ATTACH_RESULT);
    Some(ATTACH_RESULT.label(v).into_owned())
}

fn de_force_standby(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let set = tree.bits_bool("Force to standby", half.offset, 1, raw, half.mask(0x07), &TF_FORCE_STANDBY);
    Some(TF_FORCE_STANDBY.label(set).to_string())
}

fn de_update_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_bool("Follow-on request", half.offset, 1, raw, half.mask(0x08), &TF_FOLLOW_ON);
    let v = tree.bits_label("Update Type", half.offset, 1, raw, half.mask(0x07), &UPDATE_TYPE);
    Some(UPDATE_TYPE.label(v).into_owned())
}

fn de_update_result(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.bits_bool("Follow-on proceed", half.offset, 1, raw, half.mask(0x08), &TF_FOLLOW_ON_PROCEED);
    let v = tree.bits_label("Update Result", half.offset, 1, raw, half.mask(0x07), &UPDATE_RESULT);
    Some(UPDATE_RESULT.label(v).into_owned())
}

/// Detach Type (10.5.5.5): the meaning depends on who sends it.
fn de_detach_type(half: Half, ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    let table = if ctx.is_uplink() {
        tree.bits_bool("Power", half.offset, 1, raw, half.mask(0x08), &TF_POWER_OFF);
        &DETACH_TYPE_UP
    } else {
        tree.spare(half.offset, 1, raw, half.mask(0x08));
        &DETACH_TYPE_DOWN
    };
    let v = tree.bits_label("Type of detach", half.offset, 1, raw, half.mask(0x07), table);
    Some(table.label(v).into_owned())
}

fn de_service_type(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let v = tree.bits_label("Service Type", half.offset, 1, raw, half.mask(0x07), &SERVICE_TYPE);
    Some(SERVICE_TYPE.label(v).into_owned())
}

fn de_radio_priority(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let v = tree.bits_label("Radio Priority (TOM8)", half.offset, 1, raw, half.mask(0x07), &RADIO_PRIORITY);
    Some(RADIO_PRIORITY.label(v).into_owned())
}

fn de_tmsi_status(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x0e));
    let set = tree.bits_bool("TMSI flag", half.offset, 1, raw, half.mask(0x01), &TF_TMSI_STATUS);
    Some(TF_TMSI_STATUS.label(set).to_string())
}

fn de_ciph_alg(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let v = tree.bits_label("Type of ciphering algorithm", half.offset, 1, raw, half.mask(0x07), &CIPHERING_ALGORITHM);
    Some(CIPHERING_ALGORITHM.label(v).into_owned())
}

fn de_imeisv_req(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let v = tree.bits_label("IMEISV request", half.offset, 1, raw, half.mask(0x07), &IMEISV_REQUEST);
    Some(IMEISV_REQUEST.label(v).into_owned())
}

fn de_ac_ref(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let v = tree.bits_uint("A&C reference number", half.offset, 1, half.oct as u32, half.mask(0x0f));
    Some(v.to_string())
}

fn de_identity_type_2(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x08));
    let v = tree.bits_label("Type of identity", half.offset, 1, raw, half.mask(0x07), &IDENTITY_TYPE_2);
    Some(IDENTITY_TYPE_2.label(v).into_owned())
}

fn de_net_feature(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x0e));
    tree.bits_bool("LCS-MOLR via PS domain", half.offset, 1, raw, half.mask(0x01), &TF_SUPPORTED);
    None
}

pub const GMM_CAUSE_E: ElemDesc = ElemDesc::full("GMM Cause", de_gmm_cause);
pub const GPRS_TIMER: ElemDesc = ElemDesc::full("GPRS Timer", de_gprs_timer);
const MS_NET_CAP: ElemDesc = ElemDesc::full("MS Network Capability", de_ms_net_cap);
const MS_RAD_ACC_CAP: ElemDesc = ElemDesc::raw("MS Radio Access Capability");
const DRX_PARAM: ElemDesc = ElemDesc::full("DRX Parameter", de_drx_param);
const PTMSI_SIG: ElemDesc = ElemDesc::full("P-TMSI Signature", de_ptmsi_sig);
const PDP_CTX_STATUS: ElemDesc = ElemDesc::full("PDP Context Status", de_pdp_ctx_status);
const RECV_NPDU_LIST: ElemDesc = ElemDesc::raw("Receive N-PDU Numbers List");
const CELL_NOTIFICATION: ElemDesc = ElemDesc::raw("Cell Notification");
const RAND: ElemDesc = ElemDesc::raw("Authentication Parameter RAND");
const AUTN: ElemDesc = ElemDesc::raw("Authentication Parameter AUTN");
const SRES: ElemDesc = ElemDesc::raw("Authentication Response Parameter");
const SRES_EXT: ElemDesc = ElemDesc::raw("Authentication Response Parameter (extension)");
const AUTH_FAIL: ElemDesc = ElemDesc::raw("Authentication Failure Parameter");
const ATTACH_TYPE_E: ElemDesc = ElemDesc::half("Attach Type", de_attach_type);
const ATTACH_RESULT_E: ElemDesc = ElemDesc::half("Attach Result", de_attach_result);
const FORCE_STANDBY: ElemDesc = ElemDesc::half("Force to Standby", de_force_standby);
const UPDATE_TYPE_E: ElemDesc = ElemDesc::half("Update Type", de_update_type);
const UPDATE_RESULT_E: ElemDesc = ElemDesc::half("Update Result", de_update_result);
const DETACH_TYPE: ElemDesc = ElemDesc::half("Detach Type", de_detach_type);
const SERVICE_TYPE_E: ElemDesc = ElemDesc::half("Service Type", de_service_type);
pub const RADIO_PRIORITY_E: ElemDesc = ElemDesc::half("Radio Priority", de_radio_priority);
const TMSI_STATUS: ElemDesc = ElemDesc::half("TMSI Status", de_tmsi_status);
const CIPH_ALG: ElemDesc = ElemDesc::half("Ciphering Algorithm", de_ciph_alg);
const IMEISV_REQ: ElemDesc = ElemDesc::half("IMEISV Request", de_imeisv_req);
const AC_REF: ElemDesc = ElemDesc::half("A&C Reference Number", de_ac_ref);
const IDENTITY_TYPE_2_E: ElemDesc = ElemDesc::half("Identity Type 2", de_identity_type_2);
const NET_FEATURE: ElemDesc = ElemDesc::half("Network Feature Support", de_net_feature);

const ATTACH_REQ: &[IeSpec] = &[
    mand(Form::Lv, 0, MS_NET_CAP),
    mand(Form::VHalf(Nibble::Lo), 0, ATTACH_TYPE_E),
    mand(Form::VHalf(Nibble::Hi), 0, CKSN).named(" - GPRS"),
    mand(Form::V, 0, DRX_PARAM),
    mand(Form::Lv, 0, MOBILE_ID).named(" - P-TMSI or IMSI"),
    mand(Form::V, 0, RAI).named(" - Old routing area identification"),
    mand(Form::Lv, 0, MS_RAD_ACC_CAP),
    opt(Form::Tv, 0x19, PTMSI_SIG).named(" - Old P-TMSI Signature"),
    opt(Form::Tv, 0x17, GPRS_TIMER).named(" - Ready Timer"),
    opt(Form::TvShort, 0x90, TMSI_STATUS),
];

const ATTACH_ACC: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, ATTACH_RESULT_E),
    mand(Form::VHalf(Nibble::Hi), 0, FORCE_STANDBY),
    mand(Form::V, 0, GPRS_TIMER).named(" - Periodic RA update timer"),
    mand(Form::VHalf(Nibble::Lo), 0, RADIO_PRIORITY_E).named(" - SMS"),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    mand(Form::V, 0, RAI),
    opt(Form::Tv, 0x19, PTMSI_SIG),
    opt(Form::Tv, 0x17, GPRS_TIMER).named(" - Negotiated Ready Timer"),
    opt(Form::Tlv, 0x18, MOBILE_ID).named(" - Allocated P-TMSI"),
    opt(Form::Tlv, 0x23, MOBILE_ID),
    opt(Form::Tv, 0x25, GMM_CAUSE_E),
    opt(Form::Tv, 0x2a, GPRS_TIMER).named(" - T3302"),
    opt(Form::T, 0x8c, CELL_NOTIFICATION),
    opt(Form::Tlv, 0x4a, PLMN_LIST).named(" - Equivalent PLMNs"),
    opt(Form::TvShort, 0xa0, NET_FEATURE),
    opt(Form::Tlv, 0x34, EMERG_NUM_LIST),
];

const ATTACH_REJ: &[IeSpec] = &[
    mand(Form::V, 0, GMM_CAUSE_E),
    opt(Form::Tv, 0x2a, GPRS_TIMER).named(" - T3302"),
];

const DETACH_REQ_UP: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, DETACH_TYPE),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tlv, 0x18, MOBILE_ID).named(" - P-TMSI"),
    opt(Form::Tlv, 0x19, PTMSI_SIG),
];

const DETACH_REQ_DOWN: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, DETACH_TYPE),
    mand(Form::VHalf(Nibble::Hi), 0, FORCE_STANDBY),
    opt(Form::Tv, 0x25, GMM_CAUSE_E),
];

const DETACH_ACC_DOWN: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, FORCE_STANDBY),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
];

const RAU_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, UPDATE_TYPE_E),
    mand(Form::VHalf(Nibble::Hi), 0, CKSN).named(" - GPRS"),
    mand(Form::V, 0, RAI).named(" - Old routing area identification"),
    mand(Form::Lv, 0, MS_RAD_ACC_CAP),
    opt(Form::Tv, 0x19, PTMSI_SIG).named(" - Old P-TMSI Signature"),
    opt(Form::Tv, 0x17, GPRS_TIMER).named(" - Requested Ready Timer"),
    opt(Form::Tv, 0x27, DRX_PARAM),
    opt(Form::TvShort, 0x90, TMSI_STATUS),
    opt(Form::Tlv, 0x18, MOBILE_ID).named(" - P-TMSI"),
    opt(Form::Tlv, 0x31, MS_NET_CAP),
    opt(Form::Tlv, 0x32, PDP_CTX_STATUS),
];

const RAU_ACC: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, FORCE_STANDBY),
    mand(Form::VHalf(Nibble::Hi), 0, UPDATE_RESULT_E),
    mand(Form::V, 0, GPRS_TIMER).named(" - Periodic RA update timer"),
    mand(Form::V, 0, RAI),
    opt(Form::Tv, 0x19, PTMSI_SIG),
    opt(Form::Tlv, 0x18, MOBILE_ID).named(" - Allocated P-TMSI"),
    opt(Form::Tlv, 0x23, MOBILE_ID),
    opt(Form::Tlv, 0x26, RECV_NPDU_LIST),
    opt(Form::Tv, 0x17, GPRS_TIMER).named(" - Negotiated Ready Timer"),
    opt(Form::Tv, 0x25, GMM_CAUSE_E),
    opt(Form::Tv, 0x2a, GPRS_TIMER).named(" - T3302"),
    opt(Form::T, 0x8c, CELL_NOTIFICATION),
    opt(Form::Tlv, 0x4a, PLMN_LIST).named(" - Equivalent PLMNs"),
    opt(Form::Tlv, 0x32, PDP_CTX_STATUS),
    opt(Form::TvShort, 0xb0, NET_FEATURE),
    opt(Form::Tlv, 0x34, EMERG_NUM_LIST),
];

const RAU_COMPLETE: &[IeSpec] = &[opt(Form::Tlv, 0x26, RECV_NPDU_LIST)];

const RAU_REJ: &[IeSpec] = &[
    mand(Form::V, 0, GMM_CAUSE_E),
    mand(Form::VHalf(Nibble::Lo), 0, FORCE_STANDBY),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tv, 0x2a, GPRS_TIMER).named(" - T3302"),
];

const SERVICE_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CKSN),
    mand(Form::VHalf(Nibble::Hi), 0, SERVICE_TYPE_E),
    mand(Form::Lv, 0, MOBILE_ID).named(" - P-TMSI"),
    opt(Form::Tlv, 0x32, PDP_CTX_STATUS),
];

const SERVICE_ACC: &[IeSpec] = &[opt(Form::Tlv, 0x32, PDP_CTX_STATUS)];

const CAUSE_ONLY: &[IeSpec] = &[mand(Form::V, 0, GMM_CAUSE_E)];

const PTMSI_REALLOC_CMD: &[IeSpec] = &[
    mand(Form::Lv, 0, MOBILE_ID).named(" - Allocated P-TMSI"),
    mand(Form::V, 0, RAI),
    mand(Form::VHalf(Nibble::Lo), 0, FORCE_STANDBY),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tv, 0x19, PTMSI_SIG),
];

const AUTH_CIPH_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, CIPH_ALG),
    mand(Form::VHalf(Nibble::Hi), 0, IMEISV_REQ),
    mand(Form::VHalf(Nibble::Lo), 0, FORCE_STANDBY),
    mand(Form::VHalf(Nibble::Hi), 0, AC_REF),
    opt(Form::Tv, 0x21, RAND),
    opt(Form::TvShort, 0x80, CKSN).named(" - GPRS"),
    opt(Form::Tlv, 0x28, AUTN),
];

const AUTH_CIPH_RESP: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, AC_REF),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tv, 0x22, SRES),
    opt(Form::Tlv, 0x23, MOBILE_ID).named(" - IMEISV"),
    opt(Form::Tlv, 0x29, SRES_EXT),
];

const AUTH_CIPH_FAIL: &[IeSpec] = &[
    mand(Form::V, 0, GMM_CAUSE_E),
    opt(Form::Tlv, 0x30, AUTH_FAIL),
];

const ID_REQ: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, IDENTITY_TYPE_2_E),
    mand(Form::VHalf(Nibble::Hi), 0, FORCE_STANDBY),
];

const ID_RES: &[IeSpec] = &[mand(Form::Lv, 0, MOBILE_ID)];

const GMM_INFO: &[IeSpec] = &[
    opt(Form::Tlv, 0x43, NETWORK_NAME).named(" - Full Name"),
    opt(Form::Tlv, 0x45, NETWORK_NAME).named(" - Short Name"),
    opt(Form::Tv, 0x46, TIME_ZONE).named(" - Local"),
    opt(Form::Tv, 0x47, TIME_ZONE_TIME).named(" - Universal Time and Local Time Zone"),
    opt(Form::Tlv, 0x48, LSA_ID),
    opt(Form::Tlv, 0x49, DAY_SAVING),
];

const EMPTY: &[IeSpec] = &[];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x01, "Attach Request", Body::Ies(ATTACH_REQ)).up(),
    MsgDesc::new(0x02, "Attach Accept", Body::Ies(ATTACH_ACC)).down(),
    MsgDesc::new(0x03, "Attach Complete", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x04, "Attach Reject", Body::Ies(ATTACH_REJ)).down(),
    MsgDesc::new(
        0x05,
        "Detach Request",
        Body::ByDirection {
            uplink: DETACH_REQ_UP,
            downlink: DETACH_REQ_DOWN,
        },
    ),
    MsgDesc::new(
        0x06,
        "Detach Accept",
        Body::ByDirection {
            uplink: EMPTY,
            downlink: DETACH_ACC_DOWN,
        },
    ),
    MsgDesc::new(0x08, "Routing Area Update Request", Body::Ies(RAU_REQ)).up(),
    MsgDesc::new(0x09, "Routing Area Update Accept", Body::Ies(RAU_ACC)).down(),
    MsgDesc::new(0x0a, "Routing Area Update Complete", Body::Ies(RAU_COMPLETE)).up(),
    MsgDesc::new(0x0b, "Routing Area Update Reject", Body::Ies(RAU_REJ)).down(),
    MsgDesc::new(0x0c, "Service Request", Body::Ies(SERVICE_REQ)).up(),
    MsgDesc::new(0x0d, "Service Accept", Body::Ies(SERVICE_ACC)).down(),
    MsgDesc::new(0x0e, "Service Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x10, "P-TMSI Reallocation Command", Body::Ies(PTMSI_REALLOC_CMD)).down(),
    MsgDesc::new(0x11, "P-TMSI Reallocation Complete", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x12, "Authentication and Ciphering Req", Body::Ies(AUTH_CIPH_REQ)).down(),
    MsgDesc::new(0x13, "Authentication and Ciphering Resp", Body::Ies(AUTH_CIPH_RESP)).up(),
    MsgDesc::new(0x14, "Authentication and Ciphering Rej", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x1c, "Authentication and Ciphering Failure", Body::Ies(AUTH_CIPH_FAIL)).up(),
    MsgDesc::new(0x15, "Identity Request", Body::Ies(ID_REQ)).down(),
    MsgDesc::new(0x16, "Identity Response", Body::Ies(ID_RES)).up(),
    MsgDesc::new(0x20, "GMM Status", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x21, "GMM Information", Body::Ies(GMM_INFO)).down(),
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
    fn attach_request() {
        let data = [
            0x02, 0xe5, 0xe0, /* MS network capability */
            0x71, /* CKSN 7, GPRS attach */
            0x0a, 0x00, /* DRX */
            0x05, 0xf4, 0x12, 0x34, 0x56, 0x78, /* TMSI */
            0x02, 0xf8, 0x01, 0x00, 0x01, 0x0a, /* old RAI */
            0x03, 0x13, 0x60, 0xe8, /* radio access capability */
            0x17, 0x21, /* ready timer */
            0x91, /* TMSI status */
        ];
        let f = run(&data, ATTACH_REQ, Direction::Uplink).unwrap();
        assert!(f.diagnostics().is_empty());
        assert_eq!(f.find("Attach Type").unwrap().summary.as_deref(), Some("GPRS attach"));
        assert_eq!(
            f.find("Ciphering Key Sequence Number - GPRS").unwrap().summary.as_deref(),
            Some("No key is available")
        );
        assert_eq!(f.find("DRX Parameter").unwrap().summary.as_deref(), Some("Split PG Cycle 10"));
        assert_eq!(
            f.find("Mobile Identity - P-TMSI or IMSI").unwrap().summary.as_deref(),
            Some("TMSI/P-TMSI (0x12345678)")
        );
        assert_eq!(
            f.find("Routing Area Identification - Old routing area identification")
                .unwrap()
                .summary
                .as_deref(),
            Some("MCC 208, MNC 10, LAC 0x0001, RAC 0x0a")
        );
        assert_eq!(f.find("GPRS Timer - Ready Timer").unwrap().summary.as_deref(), Some("1 min"));
        assert_eq!(f.find("TMSI Status").unwrap().summary.as_deref(), Some("valid TMSI available"));
    }

    #[test]
    fn detach_type_by_direction() {
        let f = run(&[0x09], DETACH_REQ_UP, Direction::Uplink).unwrap();
        assert_eq!(f.find("Detach Type").unwrap().summary.as_deref(), Some("GPRS detach"));
        assert_eq!(f.find("Power").and_then(|p| p.label()), Some("Power switched off"));

        let f = run(&[0x01, 0x25, 0x07], DETACH_REQ_DOWN, Direction::Downlink).unwrap();
        assert_eq!(f.find("Detach Type").unwrap().summary.as_deref(), Some("re-attach required"));
        assert!(f.find("Power").is_none());
        assert_eq!(
            f.find("GMM Cause").unwrap().summary.as_deref(),
            Some("GPRS services not allowed")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn timers() {
        assert_eq!(gprs_timer(0x05), "10 sec");
        assert_eq!(gprs_timer(0x2a), "10 min");
        assert_eq!(gprs_timer(0x42), "12 min");
        assert_eq!(gprs_timer(0xe0), "timer is deactivated");
        assert_eq!(split_pg_cycle(66), "72");
        assert_eq!(split_pg_cycle(0), "704 (equivalent to no DRX)");
    }

    #[test]
    fn pdp_context_status() {
        let ies = [opt(Form::Tlv, 0x32, PDP_CTX_STATUS)];
        let f = run(&[0x32, 0x02, 0x20, 0x01], &ies, Direction::Uplink).unwrap();
        assert_eq!(
            f.find("PDP Context Status").unwrap().summary.as_deref(),
            Some("active NSAPI 5,8")
        );
        assert_eq!(f.find("NSAPI(5)").and_then(|n| n.label()), Some("PDP-ACTIVE"));
        assert_eq!(f.find("NSAPI(6)").and_then(|n| n.label()), Some("PDP-INACTIVE"));
    }
}
