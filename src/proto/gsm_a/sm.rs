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

/* GPRS Session Management (3GPP TS 24.008 9.5, elements 10.5.6) */

use std::net::{Ipv4Addr, Ipv6Addr};

use lazy_static::lazy_static;
use log::*;

use crate::context::{DecodeContext, SubProtocol};
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::common::SPARE_HALF;
use super::elem::{delegate, mand, octet, opt, Body, ElemDesc, Form, Half, IeSpec, MsgDesc, MsgIndex, Nibble};
use super::gmm::RADIO_PRIORITY_E;

pub static SM_CAUSE: ValueString = ValueString::new(
    &[
        (0x08, "Operator Determined Barring"),
        (0x18, "MBMS bearer capabilities insufficient for the service"),
        (0x19, "LLC or SNDCP failure(GSM only)"),
        (0x1a, "Insufficient resources"),
        (0x1b, "Missing or unknown APN"),
        (0x1c, "Unknown PDP address or PDP type"),
        (0x1d, "User Authentication failed"),
        (0x1e, "Activation rejected by GGSN"),
        (0x1f, "Activation rejected, unspecified"),
        (0x20, "Service option not supported"),
        (0x21, "Requested service option not subscribed"),
        (0x22, "Service option temporarily out of order"),
        (0x23, "NSAPI already used (not sent)"),
        (0x24, "Regular deactivation"),
        (0x25, "QoS not accepted"),
        (0x26, "Network failure"),
        (0x27, "Reactivation required"),
        (0x28, "Feature not supported"),
        (0x29, "Semantic error in the TFT operation"),
        (0x2a, "Syntactical error in the TFT operation"),
        (0x2b, "Unknown PDP context"),
        (0x2c, "Semantic errors in packet filter(s)"),
        (0x2d, "Syntactical errors in packet filter(s)"),
        (0x2e, "PDP context without TFT already activated"),
        (0x2f, "Multicast group membership time-out"),
        (0x30, "Activation rejected, BCM violation"),
        (0x51, "Invalid transaction identifier value"),
        (0x5f, "Semantically incorrect message"),
        (0x60, "Invalid mandatory information"),
        (0x61, "Message type non-existent or not implemented"),
        (0x62, "Message type not compatible with the protocol state"),
        (0x63, "Information element non-existent or not implemented"),
        (0x64, "Conditional IE error"),
        (0x65, "Message not compatible with the protocol state"),
        (0x6f, "Protocol error, unspecified"),
        (0x70, "APN restriction value incompatible with active PDP context"),
    ],
    Fallback::Static("Protocol error, unspecified"),
);

static LLC_SAPI: ValueString = ValueString::new(
    &[
        (0, "LLC SAPI not assigned"),
        (3, "SAPI 3"),
        (5, "SAPI 5"),
        (9, "SAPI 9"),
        (11, "SAPI 11"),
    ],
    Fallback::Reserved,
);

static DELAY_CLASS: ValueString = ValueString::new(
    &[
        (1, "Delay class 1"),
        (2, "Delay class 2"),
        (3, "Delay class 3"),
        (4, "Delay class 4 (best effort)"),
    ],
    Fallback::Reserved,
);

static RELIABILITY_CLASS: ValueString = ValueString::new(
    &[
        (1, "Unused. If received, it shall be interpreted as '010' (Note)"),
        (2, "Unacknowledged GTP; Acknowledged LLC and RLC, Protected data"),
        (3, "Unacknowledged GTP and LLC; Acknowledged RLC, Protected data"),
        (4, "Unacknowledged GTP, LLC, and RLC, Protected data"),
        (5, "Unacknowledged GTP, LLC, and RLC, Unprotected data"),
    ],
    Fallback::Reserved,
);

static PEAK_THROUGHPUT: ValueString = ValueString::new(
    &[
        (1, "Up to 1 000 octet/s"),
        (2, "Up to 2 000 octet/s"),
        (3, "Up to 4 000 octet/s"),
        (4, "Up to 8 000 octet/s"),
        (5, "Up to 16 000 octet/s"),
        (6, "Up to 32 000 octet/s"),
        (7, "Up to 64 000 octet/s"),
        (8, "Up to 128 000 octet/s"),
        (9, "Up to 256 000 octet/s"),
    ],
    Fallback::Reserved,
);

static PRECEDENCE_CLASS: ValueString = ValueString::new(
    &[(1, "High priority"), (2, "Normal priority"), (3, "Low priority")],
    Fallback::Reserved,
);

static MEAN_THROUGHPUT: ValueString = ValueString::new(
    &[
        (0x01, "100 octet/h"),
        (0x02, "200 octet/h"),
        (0x03, "500 octet/h"),
        (0x04, "1 000 octet/h"),
        (0x05, "2 000 octet/h"),
        (0x06, "5 000 octet/h"),
        (0x07, "10 000 octet/h"),
        (0x08, "20 000 octet/h"),
        (0x09, "50 000 octet/h"),
        (0x0a, "100 000 octet/h"),
        (0x0b, "200 000 octet/h"),
        (0x0c, "500 000 octet/h"),
        (0x0d, "1 000 000 octet/h"),
        (0x0e, "2 000 000 octet/h"),
        (0x0f, "5 000 000 octet/h"),
        (0x10, "10 000 000 octet/h"),
        (0x11, "20 000 000 octet/h"),
        (0x12, "50 000 000 octet/h"),
        (0x1f, "Best effort"),
    ],
    Fallback::Reserved,
);

static TRAFFIC_CLASS: ValueString = ValueString::new(
    &[
        (1, "Conversational class"),
        (2, "Streaming class"),
        (3, "Interactive class"),
        (4, "Background class"),
    ],
    Fallback::Reserved,
);

static DELIVERY_ORDER: ValueString = ValueString::new(
    &[
        (1, "With delivery order ('yes')"),
        (2, "Without delivery order ('no')"),
    ],
    Fallback::Reserved,
);

static DELIVERY_ERRONEOUS: ValueString = ValueString::new(
    &[
        (1, "No detect ('-')"),
        (2, "Erroneous SDUs are delivered ('yes')"),
        (3, "Erroneous SDUs are not delivered ('no')"),
    ],
    Fallback::Reserved,
);

static RESIDUAL_BER: ValueString = ValueString::new(
    &[
        (1, "5*10-2"),
        (2, "1*10-2"),
        (3, "5*10-3"),
        (4, "4*10-3"),
        (5, "1*10-3"),
        (6, "1*10-4"),
        (7, "1*10-5"),
        (8, "1*10-6"),
        (9, "6*10-8"),
    ],
    Fallback::Reserved,
);

static SDU_ERROR_RATIO: ValueString = ValueString::new(
    &[
        (1, "1*10-2"),
        (2, "7*10-3"),
        (3, "1*10-3"),
        (4, "1*10-4"),
        (5, "1*10-5"),
        (6, "1*10-6"),
        (7, "1*10-1"),
    ],
    Fallback::Reserved,
);

static TRAFFIC_HANDLING_PRIORITY: ValueString = ValueString::new(
    &[(1, "Priority level 1"), (2, "Priority level 2"), (3, "Priority level 3")],
    Fallback::Reserved,
);

static SOURCE_STATISTICS: ValueString = ValueString::new(&[(0, "unknown"), (1, "speech")], Fallback::Static("unknown"));

static TF_SIGNALLING: TrueFalse = TrueFalse(
    "Optimised for signalling traffic",
    "Not optimised for signalling traffic",
);

static PDP_ORGANIZATION: ValueString = ValueString::new(
    &[(0, "ETSI allocated address"), (1, "IETF allocated address"), (15, "Empty PDP type")],
    Fallback::Reserved,
);

static ETSI_PDP_TYPE: ValueString = ValueString::new(
    &[(0, "Reserved, used in earlier version of this protocol"), (1, "PDP-type PPP")],
    Fallback::Reserved,
);

static IETF_PDP_TYPE: ValueString = ValueString::new(
    &[(0x21, "IPv4 address"), (0x57, "IPv6 address"), (0x8d, "IPv4v6 address")],
    Fallback::Unknown,
);

const ORG_IETF: u32 = 1;
const TYPE_IPV4: u32 = 0x21;
const TYPE_IPV6: u32 = 0x57;
const TYPE_IPV4V6: u32 = 0x8d;

static CONFIG_PROTOCOL: ValueString = ValueString::new(
    &[(0, "PPP for use with IP PDP type or IP PDN type")],
    Fallback::Unknown,
);

static PCO_PROTOCOL: ValueString = ValueString::new(
    &[
        (0xc021, "LCP"),
        (0xc023, "PAP"),
        (0xc223, "CHAP"),
        (0x8021, "IPCP"),
    ],
    Fallback::Unknown,
);

static PCO_CONTAINER_UP: ValueString = ValueString::new(
    &[
        (0x0001, "P-CSCF IPv6 Address Request"),
        (0x0002, "IM CN Subsystem Signaling Flag"),
        (0x0003, "DNS Server IPv6 Address Request"),
        (0x0004, "Not Supported"),
        (0x0005, "MS Support of Network Requested Bearer Control indicator"),
        (0x0007, "DSMIPv6 Home Agent Address Request"),
        (0x0008, "DSMIPv6 Home Network Prefix Request"),
        (0x0009, "DSMIPv6 IPv4 Home Agent Address Request"),
        (0x000a, "IP address allocation via NAS signalling"),
        (0x000b, "IPv4 address allocation via DHCPv4"),
        (0x000c, "P-CSCF IPv4 Address Request"),
        (0x000d, "DNS Server IPv4 Address Request"),
        (0x000e, "MSISDN Request"),
        (0x0010, "IPv4 Link MTU Request"),
    ],
    Fallback::Unknown,
);

static PCO_CONTAINER_DOWN: ValueString = ValueString::new(
    &[
        (0x0001, "P-CSCF IPv6 Address"),
        (0x0002, "IM CN Subsystem Signaling Flag"),
        (0x0003, "DNS Server IPv6 Address"),
        (0x0004, "Policy Control rejection code"),
        (0x0005, "Selected Bearer Control Mode"),
        (0x0007, "DSMIPv6 Home Agent Address"),
        (0x0008, "DSMIPv6 Home Network Prefix"),
        (0x0009, "DSMIPv6 IPv4 Home Agent Address"),
        (0x000c, "P-CSCF IPv4 Address"),
        (0x000d, "DNS Server IPv4 Address"),
        (0x000e, "MSISDN"),
        (0x0010, "IPv4 Link MTU"),
    ],
    Fallback::Unknown,
);

static PFI: ValueString = ValueString::new(
    &[
        (0, "Best Effort"),
        (1, "Signalling"),
        (2, "SMS"),
        (3, "TOM8"),
        (4, "reserved"),
        (5, "reserved"),
        (6, "reserved"),
        (7, "reserved"),
    ],
    Fallback::Static("dynamically assigned"),
);

static TF_TI_FLAG: TrueFalse = TrueFalse(
    "The message is sent to the side that originates the TI",
    "The message is sent from the side that originates the TI",
);
static TF_TEAR_DOWN: TrueFalse = TrueFalse("tear down requested", "tear down not requested");
static TF_EXT: TrueFalse = TrueFalse("No extension", "Extended");

/* A zero QoS value means "subscribed" from the MS, and is reserved the
 * other way. */
fn subscribed(ctx: &DecodeContext, what: &'static str) -> &'static str {
    if ctx.is_uplink() {
        what
    } else {
        "Reserved"
    }
}

#[allow(clippy::too_many_arguments)]
fn qos_bits(
    tree: &mut FieldTree,
    ctx: &DecodeContext,
    name: &'static str,
    offset: usize,
    oct: u32,
    mask: u32,
    vs: &ValueString,
    sub: &'static str,
) -> u32 {
    if oct & mask == 0 {
        tree.bits_text(name, offset, 1, oct, mask, subscribed(ctx, sub))
    } else {
        tree.bits_label(name, offset, 1, oct, mask, vs)
    }
}

fn bit_rate(ctx: &DecodeContext, v: u32, sub: &'static str) -> String {
    match v {
        0 => subscribed(ctx, sub).to_string(),
        1..=63 => format!("{} kbps", v),
        64..=127 => format!("{} kbps", 64 + (v - 64) * 8),
        128..=254 => format!("{} kbps", 576 + (v - 128) * 64),
        _ => "0 kbps".to_string(),
    }
}

fn bit_rate_ext(v: u32) -> String {
    match v {
        0 => "Use the value indicated in octet 9".to_string(),
        1..=0x4a => format!("{} kbps", 8600 + v * 100),
        0x4b..=0xba => format!("{} Mbps", 16 + (v - 0x4a)),
        0xbb..=0xfa => format!("{} Mbps", 128 + (v - 0xba) * 2),
        _ => "Reserved".to_string(),
    }
}

fn max_sdu_size(ctx: &DecodeContext, v: u32) -> String {
    match v {
        0 => subscribed(ctx, "Subscribed maximum SDU size").to_string(),
        1..=150 => format!("{} octets", v * 10),
        151 => "1502 octets".to_string(),
        152 => "1510 octets".to_string(),
        153 => "1520 octets".to_string(),
        _ => "Reserved".to_string(),
    }
}

fn transfer_delay(ctx: &DecodeContext, v: u32) -> String {
    match v {
        0 => subscribed(ctx, "Subscribed transfer delay").to_string(),
        1..=15 => format!("{} ms", v * 10),
        16..=31 => format!("{} ms", 200 + (v - 16) * 50),
        32..=62 => format!("{} ms", 1000 + (v - 32) * 100),
        _ => "Reserved".to_string(),
    }
}

/* next QoS octet, or None once the element is exhausted */
fn next_octet(cur: &mut Cursor) -> DResult<Option<(usize, u32)>> {
    if cur.is_empty() {
        Ok(None)
    } else {
        octet(cur).map(Some)
    }
}

/// Quality of Service (10.5.6.5). Octets after the third are optional and
/// read as long as the element has some.
fn de_qos(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xc0);
    qos_bits(tree, ctx, "Delay class", offset, oct, 0x38, &DELAY_CLASS, "Subscribed delay class");
    qos_bits(tree, ctx, "Reliability class", offset, oct, 0x07, &RELIABILITY_CLASS, "Subscribed reliability class");

    let (offset, oct) = octet(cur)?;
    qos_bits(tree, ctx, "Peak throughput", offset, oct, 0xf0, &PEAK_THROUGHPUT, "Subscribed peak throughput");
    tree.spare(offset, 1, oct, 0x08);
    qos_bits(tree, ctx, "Precedence class", offset, oct, 0x07, &PRECEDENCE_CLASS, "Subscribed precedence");

    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xe0);
    qos_bits(tree, ctx, "Mean throughput", offset, oct, 0x1f, &MEAN_THROUGHPUT, "Subscribed mean throughput");

    let (offset, oct) = match next_octet(cur)? {
        Some(o) => o,
        None => return Ok(None),
    };
    let class = qos_bits(tree, ctx, "Traffic class", offset, oct, 0xe0, &TRAFFIC_CLASS, "Subscribed traffic class");
    qos_bits(tree, ctx, "Delivery order", offset, oct, 0x18, &DELIVERY_ORDER, "Subscribed delivery order");
    qos_bits(
        tree,
        ctx,
        "Delivery of erroneous SDUs",
        offset,
        oct,
        0x07,
        &DELIVERY_ERRONEOUS,
        "Subscribed delivery of erroneous SDUs",
    );
    let summary = if class == 0 {
        None
    } else {
        Some(TRAFFIC_CLASS.label(class).into_owned())
    };

    let (offset, oct) = match next_octet(cur)? {
        Some(o) => o,
        None => return Ok(summary),
    };
    tree.bits_text("Maximum SDU size", offset, 1, oct, 0xff, max_sdu_size(ctx, oct));
    for (name, sub) in [
        ("Maximum bit rate for uplink", "Subscribed maximum bit rate for uplink"),
        ("Maximum bit rate for downlink", "Subscribed maximum bit rate for downlink"),
    ]
    .iter()
    {
        let (offset, oct) = match next_octet(cur)? {
            Some(o) => o,
            None => return Ok(summary),
        };
        tree.bits_text(*name, offset, 1, oct, 0xff, bit_rate(ctx, oct, *sub));
    }

    let (offset, oct) = match next_octet(cur)? {
        Some(o) => o,
        None => return Ok(summary),
    };
    qos_bits(tree, ctx, "Residual Bit Error Rate (BER)", offset, oct, 0xf0, &RESIDUAL_BER, "Subscribed residual BER");
    qos_bits(tree, ctx, "SDU error ratio", offset, oct, 0x0f, &SDU_ERROR_RATIO, "Subscribed SDU error ratio");

    let (offset, oct) = match next_octet(cur)? {
        Some(o) => o,
        None => return Ok(summary),
    };
    tree.bits_text("Transfer delay", offset, 1, oct, 0xfc, transfer_delay(ctx, oct >> 2));
    qos_bits(
        tree,
        ctx,
        "Traffic handling priority",
        offset,
        oct,
        0x03,
        &TRAFFIC_HANDLING_PRIORITY,
        "Subscribed traffic handling priority",
    );

    for name in ["Guaranteed bit rate for uplink", "Guaranteed bit rate for downlink"].iter() {
        let (offset, oct) = match next_octet(cur)? {
            Some(o) => o,
            None => return Ok(summary),
        };
        tree.bits_text(*name, offset, 1, oct, 0xff, bit_rate(ctx, oct, "Subscribed guaranteed bit rate"));
    }

    let (offset, oct) = match next_octet(cur)? {
        Some(o) => o,
        None => return Ok(summary),
    };
    tree.spare(offset, 1, oct, 0xe0);
    tree.bits_bool("Signalling Indication", offset, 1, oct, 0x10, &TF_SIGNALLING);
    tree.bits_label("Source Statistics Descriptor", offset, 1, oct, 0x0f, &SOURCE_STATISTICS);

    for name in ["Maximum bit rate for downlink (extended)", "Guaranteed bit rate for downlink (extended)"].iter() {
        let (offset, oct) = match next_octet(cur)? {
            Some(o) => o,
            None => return Ok(summary),
        };
        tree.bits_text(*name, offset, 1, oct, 0xff, bit_rate_ext(oct));
    }
    Ok(summary)
}

fn de_nsapi(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let v = oct & 0x0f;
    let label = if v < 5 {
        "Reserved".to_string()
    } else {
        format!("NSAPI {}", v)
    };
    tree.bits_text("NSAPI", offset, 1, oct, 0x0f, label.clone());
    Ok(Some(label))
}

fn de_llc_sapi(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let v = tree.bits_label("LLC SAPI", offset, 1, oct, 0x0f, &LLC_SAPI);
    Ok(Some(LLC_SAPI.label(v).into_owned()))
}

/// Packet Data Protocol Address (10.5.6.4)
fn de_pdp_addr(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    let org = tree.bits_label("PDP type organization", offset, 1, oct, 0x0f, &PDP_ORGANIZATION);
    let (offset, num) = octet(cur)?;
    let types = if org == ORG_IETF { &IETF_PDP_TYPE } else { &ETSI_PDP_TYPE };
    let type_label = tree.label("PDP type number", offset, 1, num, types);
    if cur.is_empty() {
        return Ok(Some(format!("{} (dynamic)", type_label)));
    }
    let mut addrs = Vec::new();
    if org == ORG_IETF && (num == TYPE_IPV4 || num == TYPE_IPV4V6) {
        let offset = cur.pos();
        let b = cur.take(4)?;
        let a = Ipv4Addr::new(b[0], b[1], b[2], b[3]);
        tree.text("IPv4 address", offset, 4, a.to_string());
        addrs.push(a.to_string());
    }
    if org == ORG_IETF && (num == TYPE_IPV6 || num == TYPE_IPV4V6) && !cur.is_empty() {
        let offset = cur.pos();
        let b = cur.take(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(b);
        let a = Ipv6Addr::from(raw);
        tree.text("IPv6 address", offset, 16, a.to_string());
        addrs.push(a.to_string());
    }
    if addrs.is_empty() {
        let offset = cur.pos();
        tree.bytes("Address", offset, cur.rest());
        return Ok(Some(type_label.into_owned()));
    }
    Ok(Some(addrs.join(", ")))
}

/// Access Point Name (10.5.6.1): DNS-style length-prefixed labels
fn de_apn(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let offset = cur.pos();
    let data = cur.rest();
    let mut labels = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        i += 1;
        let end = (i + len).min(data.len());
        labels.push(String::from_utf8_lossy(&data[i..end]).into_owned());
        i = end;
    }
    let apn = labels.join(".");
    tree.text("APN", offset, data.len(), apn.clone());
    Ok(Some(apn))
}

/// Protocol Configuration Options (10.5.6.3). PPP protocol entries are
/// handed off; containers are shown raw.
pub fn de_pco(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
    tree.spare(offset, 1, oct, 0x78);
    tree.bits_label("Configuration Protocol", offset, 1, oct, 0x07, &CONFIG_PROTOCOL);
    let containers = if ctx.is_uplink() {
        &PCO_CONTAINER_UP
    } else {
        &PCO_CONTAINER_DOWN
    };
    let mut n = 0;
    while !cur.is_empty() {
        let start = cur.pos();
        let id = cur.read_u16()?;
        let (len_offset, len) = octet(cur)?;
        let mut win = cur.window(len as usize)?;
        let mut sub = FieldTree::new();
        let ppp = id >= 0x8000;
        let table = if ppp { &PCO_PROTOCOL } else { containers };
        let label = sub.label("Protocol or Container ID", start, 2, id as u32, table);
        sub.uint("Length", len_offset, 1, len as u64);
        if ppp {
            trace!("PCO protocol 0x{:04x} handed off", id);
            delegate(&mut win, ctx, SubProtocol::Ppp { protocol: id }, &mut sub)?;
        } else if !win.is_empty() {
            let data_offset = win.pos();
            sub.bytes("Contents", data_offset, win.rest());
        }
        tree.subtree(
            format!("Protocol or Container ID: {} (0x{:04x})", label, id),
            start,
            cur.pos() - start,
            sub,
        );
        n += 1;
    }
    Ok(Some(format!("{} entries", n)))
}

fn de_sm_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("SM Cause value", offset, 1, v, &SM_CAUSE);
    Ok(Some(label.into_owned()))
}

/// Linked TI (10.5.6.7)
fn de_linked_ti(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_bool("TI flag", offset, 1, oct, 0x80, &TF_TI_FLAG);
    let mut ti = tree.bits_uint("TIO", offset, 1, oct, 0x70);
    tree.spare(offset, 1, oct, 0x0f);
    if ti == 7 {
        let (offset, oct) = octet(cur)?;
        tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT);
        ti = tree.bits_uint("TIE", offset, 1, oct, 0x7f);
    }
    Ok(Some(format!("TI {}", ti)))
}

fn de_pfi(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    let v = tree.bits_label("Packet Flow Identifier", offset, 1, oct, 0x7f, &PFI);
    Ok(Some(PFI.label(v).into_owned()))
}

fn de_tear_down(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let raw = half.oct as u32;
    tree.spare(half.offset, 1, raw, half.mask(0x0e));
    let set = tree.bits_bool("TDI", half.offset, 1, raw, half.mask(0x01), &TF_TEAR_DOWN);
    Some(TF_TEAR_DOWN.label(set).to_string())
}

const NSAPI: ElemDesc = ElemDesc::full("NSAPI", de_nsapi);
const LLC_SAPI_E: ElemDesc = ElemDesc::full("LLC Service Access Point Identifier", de_llc_sapi);
const QOS: ElemDesc = ElemDesc::full("Quality Of Service", de_qos);
const PDP_ADDR: ElemDesc = ElemDesc::full("Packet Data Protocol Address", de_pdp_addr);
const APN: ElemDesc = ElemDesc::full("Access Point Name", de_apn);
pub const PCO: ElemDesc = ElemDesc::full("Protocol Configuration Options", de_pco);
const SM_CAUSE_E: ElemDesc = ElemDesc::full("SM Cause", de_sm_cause);
const LINKED_TI: ElemDesc = ElemDesc::full("Linked TI", de_linked_ti);
const PFI_E: ElemDesc = ElemDesc::full("Packet Flow Identifier", de_pfi);
const TFT: ElemDesc = ElemDesc::raw("Traffic Flow Template");
const TEAR_DOWN: ElemDesc = ElemDesc::half("Tear Down Indicator", de_tear_down);

const ACT_PDP_REQ: &[IeSpec] = &[
    mand(Form::V, 0, NSAPI).named(" - Requested NSAPI"),
    mand(Form::V, 0, LLC_SAPI_E).named(" - Requested LLC SAPI"),
    mand(Form::Lv, 0, QOS).named(" - Requested QoS"),
    mand(Form::Lv, 0, PDP_ADDR).named(" - Requested PDP address"),
    opt(Form::Tlv, 0x28, APN),
    opt(Form::Tlv, 0x27, PCO),
];

const ACT_PDP_ACC: &[IeSpec] = &[
    mand(Form::V, 0, LLC_SAPI_E).named(" - Negotiated LLC SAPI"),
    mand(Form::Lv, 0, QOS).named(" - Negotiated QoS"),
    mand(Form::VHalf(Nibble::Lo), 0, RADIO_PRIORITY_E),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tlv, 0x2b, PDP_ADDR),
    opt(Form::Tlv, 0x27, PCO),
    opt(Form::Tlv, 0x34, PFI_E),
    opt(Form::Tlv, 0x39, SM_CAUSE_E),
];

const CAUSE_PCO: &[IeSpec] = &[mand(Form::V, 0, SM_CAUSE_E), opt(Form::Tlv, 0x27, PCO)];

const REQ_PDP_ACT: &[IeSpec] = &[
    mand(Form::Lv, 0, PDP_ADDR).named(" - Offered PDP address"),
    opt(Form::Tlv, 0x28, APN),
    opt(Form::Tlv, 0x27, PCO),
];

const DEACT_PDP_REQ: &[IeSpec] = &[
    mand(Form::V, 0, SM_CAUSE_E),
    opt(Form::TvShort, 0x90, TEAR_DOWN),
    opt(Form::Tlv, 0x27, PCO),
];

const PCO_ONLY: &[IeSpec] = &[opt(Form::Tlv, 0x27, PCO)];

const MOD_PDP_REQ_DOWN: &[IeSpec] = &[
    mand(Form::VHalf(Nibble::Lo), 0, RADIO_PRIORITY_E),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    mand(Form::V, 0, LLC_SAPI_E).named(" - Requested LLC SAPI"),
    mand(Form::Lv, 0, QOS).named(" - New QoS"),
    opt(Form::Tlv, 0x2b, PDP_ADDR),
    opt(Form::Tlv, 0x34, PFI_E),
    opt(Form::Tlv, 0x27, PCO),
];

const MOD_PDP_REQ_UP: &[IeSpec] = &[
    opt(Form::Tv, 0x32, LLC_SAPI_E).named(" - Requested LLC SAPI"),
    opt(Form::Tlv, 0x30, QOS).named(" - Requested new QoS"),
    opt(Form::Tlv, 0x31, TFT).named(" - New TFT"),
    opt(Form::Tlv, 0x27, PCO),
];

const MOD_PDP_ACC_DOWN: &[IeSpec] = &[
    opt(Form::Tlv, 0x30, QOS).named(" - Negotiated QoS"),
    opt(Form::Tv, 0x32, LLC_SAPI_E).named(" - Negotiated LLC SAPI"),
    opt(Form::TvShort, 0x80, RADIO_PRIORITY_E).named(" - New radio priority"),
    opt(Form::Tlv, 0x34, PFI_E),
    opt(Form::Tlv, 0x27, PCO),
];

const ACT_SEC_PDP_REQ: &[IeSpec] = &[
    mand(Form::V, 0, NSAPI).named(" - Requested NSAPI"),
    mand(Form::V, 0, LLC_SAPI_E).named(" - Requested LLC SAPI"),
    mand(Form::Lv, 0, QOS).named(" - Requested QoS"),
    mand(Form::Lv, 0, LINKED_TI),
    opt(Form::Tlv, 0x36, TFT),
    opt(Form::Tlv, 0x27, PCO),
];

const ACT_SEC_PDP_ACC: &[IeSpec] = &[
    mand(Form::V, 0, LLC_SAPI_E).named(" - Negotiated LLC SAPI"),
    mand(Form::Lv, 0, QOS).named(" - Negotiated QoS"),
    mand(Form::VHalf(Nibble::Lo), 0, RADIO_PRIORITY_E),
    mand(Form::VHalf(Nibble::Hi), 0, SPARE_HALF),
    opt(Form::Tlv, 0x34, PFI_E),
    opt(Form::Tlv, 0x27, PCO),
];

const CAUSE_ONLY: &[IeSpec] = &[mand(Form::V, 0, SM_CAUSE_E)];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(0x41, "Activate PDP Context Request", Body::Ies(ACT_PDP_REQ)).up(),
    MsgDesc::new(0x42, "Activate PDP Context Accept", Body::Ies(ACT_PDP_ACC)).down(),
    MsgDesc::new(0x43, "Activate PDP Context Reject", Body::Ies(CAUSE_PCO)).down(),
    MsgDesc::new(0x44, "Request PDP Context Activation", Body::Ies(REQ_PDP_ACT)).down(),
    MsgDesc::new(0x45, "Request PDP Context Activation rej.", Body::Ies(CAUSE_PCO)).up(),
    MsgDesc::new(0x46, "Deactivate PDP Context Request", Body::Ies(DEACT_PDP_REQ)),
    MsgDesc::new(0x47, "Deactivate PDP Context Accept", Body::Ies(PCO_ONLY)),
    MsgDesc::new(0x48, "Modify PDP Context Request(Network to MS direction)", Body::Ies(MOD_PDP_REQ_DOWN)).down(),
    MsgDesc::new(0x49, "Modify PDP Context Accept (MS to network direction)", Body::Ies(PCO_ONLY)).up(),
    MsgDesc::new(0x4a, "Modify PDP Context Request(MS to network direction)", Body::Ies(MOD_PDP_REQ_UP)).up(),
    MsgDesc::new(0x4b, "Modify PDP Context Accept (Network to MS direction)", Body::Ies(MOD_PDP_ACC_DOWN)).down(),
    MsgDesc::new(0x4c, "Modify PDP Context Reject", Body::Ies(CAUSE_PCO)),
    MsgDesc::new(0x4d, "Activate Secondary PDP Context Request", Body::Ies(ACT_SEC_PDP_REQ)).up(),
    MsgDesc::new(0x4e, "Activate Secondary PDP Context Accept", Body::Ies(ACT_SEC_PDP_ACC)).down(),
    MsgDesc::new(0x4f, "Activate Secondary PDP Context Reject", Body::Ies(CAUSE_PCO)).down(),
    MsgDesc::new(0x50, "Reserved: was allocated in earlier phases of the protocol", Body::Undecoded),
    MsgDesc::new(0x55, "SM Status", Body::Ies(CAUSE_ONLY)),
    MsgDesc::new(0x56, "Activate MBMS Context Request", Body::Undecoded).up(),
    MsgDesc::new(0x57, "Activate MBMS Context Accept", Body::Undecoded).down(),
    MsgDesc::new(0x58, "Activate MBMS Context Reject", Body::Undecoded).down(),
    MsgDesc::new(0x59, "Request MBMS Context Activation", Body::Undecoded).down(),
    MsgDesc::new(0x5a, "Request MBMS Context Activation Reject", Body::Undecoded).up(),
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
    fn activate_pdp_context_request() {
        let data = [
            0x05, 0x03, /* NSAPI 5, SAPI 3 */
            0x03, 0x23, 0x91, 0x1f, /* QoS */
            0x02, 0xf1, 0x21, /* dynamic IPv4 */
            0x28, 0x09, 0x08, b'i', b'n', b't', b'e', b'r', b'n', b'e', b't',
            0x27, 0x0a, 0x80, 0x80, 0x21, 0x03, 0x01, 0x02, 0x03, 0x00, 0x0d, 0x00,
        ];
        let f = run(&data, ACT_PDP_REQ, Direction::Uplink).unwrap();
        assert!(f.diagnostics().is_empty());
        assert_eq!(f.find("NSAPI - Requested NSAPI").unwrap().summary.as_deref(), Some("NSAPI 5"));
        assert_eq!(
            f.find("Delay class").and_then(|d| d.label()),
            Some("Delay class 4 (best effort)")
        );
        assert_eq!(f.find("Mean throughput").and_then(|d| d.label()), Some("Best effort"));
        assert_eq!(
            f.find("Packet Data Protocol Address - Requested PDP address")
                .unwrap()
                .summary
                .as_deref(),
            Some("IPv4 address (dynamic)")
        );
        assert_eq!(f.find("Access Point Name").unwrap().summary.as_deref(), Some("internet"));

        let pco = f.find("Protocol Configuration Options").unwrap();
        assert_eq!(pco.summary.as_deref(), Some("2 entries"));
        let ipcp = pco.find("Protocol or Container ID: IPCP (0x8021)").unwrap();
        let ppp = ipcp.find("PPP Data").unwrap();
        assert_eq!((ppp.offset, ppp.len), (26, 3));
        assert!(pco
            .find("Protocol or Container ID: DNS Server IPv4 Address Request (0x000d)")
            .is_some());
    }

    #[test]
    fn negotiated_qos() {
        let data = [
            0x03, 0x0b, 0x23, 0x91, 0x1f, 0x73, 0x96, 0x40, 0x83, 0x25, 0x43, 0x00, 0xff, 0x04,
        ];
        let f = run(&data, ACT_PDP_ACC, Direction::Downlink).unwrap();
        assert!(f.diagnostics().is_empty());
        assert_eq!(
            f.find("Quality Of Service - Negotiated QoS").unwrap().summary.as_deref(),
            Some("Interactive class")
        );
        assert_eq!(f.find("Maximum SDU size").and_then(|d| d.label()), Some("1500 octets"));
        assert_eq!(f.find("Maximum bit rate for uplink").and_then(|d| d.label()), Some("64 kbps"));
        assert_eq!(f.find("Maximum bit rate for downlink").and_then(|d| d.label()), Some("768 kbps"));
        assert_eq!(f.find("SDU error ratio").and_then(|d| d.label()), Some("1*10-5"));
        assert_eq!(f.find("Transfer delay").and_then(|d| d.label()), Some("200 ms"));
        assert_eq!(f.find("Guaranteed bit rate for uplink").and_then(|d| d.label()), Some("Reserved"));
        assert_eq!(f.find("Guaranteed bit rate for downlink").and_then(|d| d.label()), Some("0 kbps"));
        assert_eq!(
            f.find("Radio Priority").unwrap().summary.as_deref(),
            Some("priority level 4 (lowest)")
        );
    }

    #[test]
    fn pdp_address_v4v6() {
        let ies = [opt(Form::Tlv, 0x2b, PDP_ADDR)];
        let mut data = vec![0x2b, 0x16, 0x01, 0x8d, 10, 0, 0, 1];
        data.extend_from_slice(&[0x20, 0x01, 0x0d, 0xb8]);
        data.extend_from_slice(&[0; 11]);
        data.push(1);
        let f = run(&data, &ies, Direction::Downlink).unwrap();
        assert!(f.diagnostics().is_empty());
        assert_eq!(
            f.find("Packet Data Protocol Address").unwrap().summary.as_deref(),
            Some("10.0.0.1, 2001:db8::1")
        );
    }

    #[test]
    fn linked_ti_extension() {
        let ies = [mand(Form::Lv, 0, LINKED_TI)];
        let f = run(&[0x02, 0x70, 0x8c], &ies, Direction::Uplink).unwrap();
        assert_eq!(f.find("Linked TI").unwrap().summary.as_deref(), Some("TI 12"));
    }
}
