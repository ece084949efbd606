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

/* Call Control (3GPP TS 24.008 9.3, elements 10.5.4) */

use lazy_static::lazy_static;
use log::*;

use crate::context::DecodeContext;
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;
use crate::utils::bcd;
use crate::utils::vals::{Fallback, TrueFalse, ValueString};

use super::common::PRIORITY;
use super::elem::{mand, octet, opt, Body, ElemDesc, Form, Half, IeSpec, MsgDesc, MsgIndex};
use super::ros::FACILITY;
use super::ss::SS_VERSION;

static TF_EXT: TrueFalse = TrueFalse("No extension", "Extended");

static CODING_STANDARD: ValueString = ValueString::new(
    &[
        (0, "Coding as specified in ITU-T Rec. Q.931"),
        (1, "Reserved for other international standards"),
        (2, "National standard"),
        (3, "Standard defined for the GSM PLMNS"),
    ],
    Fallback::Reserved,
);

static LOCATION: ValueString = ValueString::new(
    &[
        (0, "User"),
        (1, "Private network serving the local user"),
        (2, "Public network serving the local user"),
        (3, "Transit network"),
        (4, "Public network serving the remote user"),
        (5, "Private network serving the remote user"),
        (7, "International network"),
        (10, "Network beyond interworking point"),
    ],
    Fallback::Reserved,
);

pub static CAUSE_VALUE: ValueString = ValueString::new(
    &[
        (1, "Unassigned (unallocated) number"),
        (3, "No route to destination"),
        (6, "Channel unacceptable"),
        (8, "Operator determined barring"),
        (16, "Normal call clearing"),
        (17, "User busy"),
        (18, "No user responding"),
        (19, "User alerting, no answer"),
        (21, "Call rejected"),
        (22, "Number changed"),
        (25, "Pre-emption"),
        (26, "Non selected user clearing"),
        (27, "Destination out of order"),
        (28, "Invalid number format (incomplete number)"),
        (29, "Facility rejected"),
        (30, "Response to STATUS ENQUIRY"),
        (31, "Normal, unspecified"),
        (34, "No circuit/channel available"),
        (38, "Network out of order"),
        (41, "Temporary failure"),
        (42, "Switching equipment congestion"),
        (43, "Access information discarded"),
        (44, "requested circuit/channel not available"),
        (47, "Resources unavailable, unspecified"),
        (49, "Quality of service unavailable"),
        (50, "Requested facility not subscribed"),
        (55, "Incoming calls barred within the CUG"),
        (57, "Bearer capability not authorized"),
        (58, "Bearer capability not presently available"),
        (63, "Service or option not available, unspecified"),
        (65, "Bearer service not implemented"),
        (68, "ACM equal to or greater than ACMmax"),
        (69, "Requested facility not implemented"),
        (70, "Only restricted digital information bearer capability is available"),
        (79, "Service or option not implemented, unspecified"),
        (81, "Invalid transaction identifier value"),
        (87, "User not member of CUG"),
        (88, "Incompatible destination"),
        (91, "Invalid transit network selection"),
        (95, "Semantically incorrect message"),
        (96, "Invalid mandatory information"),
        (97, "Message type non-existent or not implemented"),
        (98, "Message type not compatible with protocol state"),
        (99, "Information element non-existent or not implemented"),
        (100, "Conditional IE error"),
        (101, "Message not compatible with protocol state"),
        (102, "Recovery on timer expiry"),
        (111, "Protocol error, unspecified"),
        (127, "Interworking, unspecified"),
    ],
    Fallback::Static("Normal, unspecified"),
);

static CAUSE_CLASS: [&str; 8] = [
    "normal event",
    "normal event",
    "resource unavailable",
    "service or option not available",
    "service or option not implemented",
    "invalid message (e.g. parameter out of range)",
    "protocol error (e.g. unknown message)",
    "interworking",
];

static RADIO_CHANNEL_REQ: ValueString = ValueString::new(
    &[
        (0, "Reserved"),
        (1, "Full rate support only MS/fullrate speech version 1 supported"),
        (2, "Dual rate support MS/half rate speech version 1 preferred, full rate speech version 1 also supported"),
        (3, "Dual rate support MS/full rate speech version 1 preferred, half rate speech version 1 also supported"),
    ],
    Fallback::Reserved,
);

static TF_CODING: TrueFalse = TrueFalse("reserved", "GSM standardized coding");
static TF_TRANSFER_MODE: TrueFalse = TrueFalse("packet", "circuit");

const ITC_SPEECH: u32 = 0;

static ITC: ValueString = ValueString::new(
    &[
        (0, "speech"),
        (1, "unrestricted digital information"),
        (2, "3.1 kHz audio, ex PLMN"),
        (3, "facsimile group 3"),
        (5, "Other ITC (See Octet 5a)"),
        (7, "reserved, to be used in the network"),
    ],
    Fallback::Reserved,
);

static SPEECH_VERSION: ValueString = ValueString::new(
    &[
        (0, "GSM full rate speech version 1"),
        (2, "GSM full rate speech version 2"),
        (4, "GSM full rate speech version 3"),
        (1, "GSM half rate speech version 1"),
        (5, "GSM half rate speech version 3"),
        (15, "No speech version supported for GERAN"),
    ],
    Fallback::Static("Speech version TBD"),
);

static TF_COMPRESSION: TrueFalse = TrueFalse("data compression allowed", "data compression not possible");

static STRUCTURE: ValueString = ValueString::new(
    &[
        (0, "Service data unit integrity"),
        (3, "structure not relevant"),
    ],
    Fallback::Reserved,
);

static TF_DUPLEX: TrueFalse = TrueFalse("Full", "Half");
static TF_CONFIGURATION: TrueFalse = TrueFalse("Reserved", "Point-to-point");
static TF_NIRR: TrueFalse = TrueFalse(
    "Data up to and including 4.8 kb/s, full rate, non-transparent, 6 kb/s radio interface rate is requested",
    "No meaning is associated with this value",
);
static TF_ESTABLISHMENT: TrueFalse = TrueFalse("Reserved", "Demand");

static RATE_ADAPTION: ValueString = ValueString::new(
    &[
        (0, "No rate adaption"),
        (1, "V.110, I.460/X.30 rate adaptation"),
        (2, "ITU-T X.31 flag stuffing"),
        (3, "Other rate adaption (see octet 5a)"),
    ],
    Fallback::Reserved,
);

static SIGNALLING_ACCESS_PROTOCOL: ValueString = ValueString::new(
    &[
        (1, "I.440/450"),
        (2, "X.21"),
        (3, "X.28 - dedicated PAD, individual NUI"),
        (4, "X.28 - dedicated PAD, universal NUI"),
        (5, "X.28 - non dedicated PAD"),
        (6, "X.32"),
    ],
    Fallback::Reserved,
);

static TF_SYNC: TrueFalse = TrueFalse("Asynchronous", "Synchronous");

static USER_RATE: ValueString = ValueString::new(
    &[
        (1, "0.3 kbit/s Recommendation X.1 and V.110"),
        (2, "1.2 kbit/s Recommendation X.1 and V.110"),
        (3, "2.4 kbit/s Recommendation X.1 and V.110"),
        (4, "4.8 kbit/s Recommendation X.1 and V.110"),
        (5, "9.6 kbit/s Recommendation X.1 and V.110"),
        (6, "12.0 kbit/s transparent (non compliance with X.1 and V.110)"),
        (7, "Reserved: was allocated in earlier phases of the protocol"),
    ],
    Fallback::Reserved,
);

static PARITY: ValueString = ValueString::new(
    &[
        (0, "Odd"),
        (2, "Even"),
        (3, "None"),
        (4, "Forced to 0"),
        (5, "Forced to 1"),
    ],
    Fallback::Reserved,
);

static CONNECTION_ELEMENT: ValueString = ValueString::new(
    &[
        (0, "Transparent"),
        (1, "Non transparent (RLP)"),
        (2, "Both, transparent preferred"),
        (3, "Both, non transparent preferred"),
    ],
    Fallback::Reserved,
);

static MODEM_TYPE: ValueString = ValueString::new(
    &[
        (0, "None"),
        (1, "V.21"),
        (2, "V.22"),
        (3, "V.22 bis"),
        (4, "Reserved: was allocated in earlier phases of the protocol"),
        (5, "V.26 ter"),
        (6, "V.32"),
        (7, "Modem for undefined interface"),
        (8, "Autobauding type 1"),
    ],
    Fallback::Reserved,
);

static FIXED_NETWORK_USER_RATE: ValueString = ValueString::new(
    &[
        (0, "Fixed network user rate not applicable/No meaning is associated with this value"),
        (1, "9.6 kbit/s Recommendation X.1 and V.110"),
        (2, "14.4 kbit/s Recommendation X.1 and V.110"),
        (3, "19.2 kbit/s Recommendation X.1 and V.110"),
        (4, "28.8 kbit/s Recommendation X.1 and V.110"),
        (5, "38.4 kbit/s Recommendation X.1 and V.110"),
        (6, "48.0 kbit/s Recommendation X.1 and V.110 (synch)"),
        (7, "56.0 kbit/s Recommendation X.1 and V.110 (synch) /bit transparent"),
        (8, "64.0 kbit/s bit transparent"),
        (9, "33.6 kbit/s bit transparent"),
        (10, "32.0 kbit/s Recommendation I.460"),
        (11, "31.2 kbit/s Recommendation V.34"),
    ],
    Fallback::Reserved,
);

static WANTED_AIR_USER_RATE: ValueString = ValueString::new(
    &[
        (0, "Air interface user rate not applicable/No meaning associated with this value"),
        (1, "9.6 kbit/s"),
        (2, "14.4 kbit/s"),
        (3, "19.2 kbit/s"),
        (5, "28.8 kbit/s"),
        (6, "38.4 kbit/s"),
        (7, "43.2 kbit/s"),
        (8, "57.6 kbit/s"),
        (9, "interpreted by the network as 38.4 kbit/s"),
        (10, "interpreted by the network as 38.4 kbit/s"),
        (11, "interpreted by the network as 38.4 kbit/s"),
        (12, "interpreted by the network as 38.4 kbit/s"),
    ],
    Fallback::Reserved,
);

static MAX_TRAFFIC_CHANNELS: ValueString = ValueString::new(
    &[
        (0, "1 TCH"),
        (1, "2 TCH"),
        (2, "3 TCH"),
        (3, "4 TCH"),
        (4, "5 TCH"),
        (5, "6 TCH"),
        (6, "7 TCH"),
        (7, "8 TCH"),
    ],
    Fallback::Reserved,
);

static UIMI: ValueString = ValueString::new(
    &[
        (0, "not allowed/required/applicable"),
        (1, "up to 1 TCH/F allowed/may be requested"),
        (2, "up to 2 TCH/F allowed/may be requested"),
        (3, "up to 3 TCH/F allowed/may be requested"),
        (4, "up to 4 TCH/F allowed/may be requested"),
    ],
    Fallback::Static("up to 4 TCH/F may be requested"),
);

static ASYMMETRY: ValueString = ValueString::new(
    &[
        (0, "No preference"),
        (1, "up link biased asymmetry"),
        (2, "down link biased asymmetry"),
        (3, "Unused, treat as No preference"),
    ],
    Fallback::Reserved,
);

static LAYER2_PROTOCOL: ValueString = ValueString::new(
    &[
        (6, "Recommendation X.25, link level"),
        (8, "ISO 6429, codeset 0 (DC1/DC3)"),
        (9, "Reserved: was allocated but never used in earlier phases of the protocol"),
        (10, "Videotex profile 1"),
        (12, "COPnoFlCt (Character oriented Protocol with no Flow Control mechanism)"),
        (13, "Reserved: was allocated in earlier phases of the protocol"),
    ],
    Fallback::Reserved,
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
        (11, "reserved for CTS (see 3GPP TS 44.056)"),
        (15, "reserved for extension"),
    ],
    Fallback::Reserved,
);

static PRESENTATION: ValueString = ValueString::new(
    &[
        (0, "Presentation allowed"),
        (1, "Presentation restricted"),
        (2, "Number not available due to interworking"),
        (3, "Reserved"),
    ],
    Fallback::Reserved,
);

static SCREENING: ValueString = ValueString::new(
    &[
        (0, "User-provided, not screened"),
        (1, "User-provided, verified and passed"),
        (2, "User-provided, verified and failed"),
        (3, "Network provided"),
    ],
    Fallback::Reserved,
);

static PROGRESS_DESCRIPTION: ValueString = ValueString::new(
    &[
        (1, "Call is not end-to-end PLMN/ISDN, further call progress information may be available in-band"),
        (2, "Destination address in non-PLMN/ISDN"),
        (3, "Origination address in non-PLMN/ISDN"),
        (4, "Call has returned to the PLMN/ISDN"),
        (8, "In-band information or appropriate pattern now available"),
        (32, "Call is end-to-end PLMN/ISDN"),
        (64, "Queueing"),
    ],
    Fallback::Static("Unspecific"),
);

static CALL_STATE: ValueString = ValueString::new(
    &[
        (0, "U0/N0 - null"),
        (2, "U0.1/N0.1 - MM connection pending"),
        (34, "U0.2 - CC prompt present /N0.2 - CC connection pending"),
        (35, "U0.3 - Wait for network information /N0.3 - Network answer pending"),
        (36, "U0.4 - CC-Establishment present /N0.4 - CC-Establishment present"),
        (37, "U0.5 - CC-Establishment confirmed /N0.5 - CC-Establishment confirmed"),
        (38, "U0.6 - Recall present /N0.6 - Recall present"),
        (1, "U1/N1 - call initiated"),
        (3, "U3/N3 - mobile originating call proceeding"),
        (4, "U4/N4 - call delivered"),
        (6, "U6/N6 - call present"),
        (7, "U7/N7 - call received"),
        (8, "U8/N8 - connect request"),
        (9, "U9/N9 - mobile terminating call confirmed"),
        (10, "U10/N10 - active"),
        (11, "U11 - disconnect request"),
        (12, "U12/N12 - disconnect indication"),
        (19, "U19/N19 - release request"),
        (26, "U26/N26 - mobile originating modify"),
        (27, "U27/N27 - mobile terminating modify"),
        (28, "N28 - connect indication"),
    ],
    Fallback::UnknownValue,
);

static SIGNAL_VALUE: ValueString = ValueString::new(
    &[
        (0x00, "dial tone on"),
        (0x01, "ring back tone on"),
        (0x02, "intercept tone on"),
        (0x03, "network congestion tone on"),
        (0x04, "busy tone on"),
        (0x05, "confirm tone on"),
        (0x06, "answer tone on"),
        (0x07, "call waiting tone on"),
        (0x08, "off-hook warning tone on"),
        (0x3f, "tones off"),
        (0x4f, "alerting off"),
    ],
    Fallback::Reserved,
);

static REPEAT_INDICATOR: ValueString = ValueString::new(
    &[
        (1, "Circular for successive selection 'mode 1 alternate mode 2'"),
        (2, "Support of fallback  mode 1 preferred, mode 2 selected if setup of mode 1 fails"),
        (3, "Reserved: was allocated in earlier phases of the protocol"),
    ],
    Fallback::Reserved,
);

static NOTIFICATION: ValueString = ValueString::new(
    &[
        (0, "User suspended"),
        (1, "User resumed"),
        (2, "Bearer change"),
    ],
    Fallback::Reserved,
);

static AUX_HOLD: ValueString = ValueString::new(
    &[
        (0, "Idle"),
        (1, "Hold request"),
        (2, "Call held"),
        (3, "Retrieve request"),
    ],
    Fallback::Reserved,
);

static AUX_MPTY: ValueString = ValueString::new(
    &[
        (0, "Idle"),
        (1, "MPTY request"),
        (2, "Call in MPTY"),
        (3, "Split request"),
    ],
    Fallback::Reserved,
);

static TF_PCP: TrueFalse = TrueFalse(
    "the mobile station supports the Prolonged Clearing Procedure",
    "the mobile station does not support the Prolonged Clearing Procedure",
);
static TF_DTMF: TrueFalse = TrueFalse(
    "the mobile station supports DTMF as specified in subclause 5.5.7 of TS 24.008",
    "reserved for earlier versions of the protocol",
);

fn ext_bit(tree: &mut FieldTree, offset: usize, oct: u32) -> bool {
    tree.bits_bool("Extension", offset, 1, oct, 0x80, &TF_EXT)
}

/* field that only has a meaning from the mobile station to the network */
fn uplink_only(
    tree: &mut FieldTree,
    ctx: &DecodeContext,
    name: &'static str,
    offset: usize,
    oct: u32,
    mask: u32,
    vs: &ValueString,
) -> Option<u32> {
    if ctx.is_uplink() {
        Some(tree.bits_label(name, offset, 1, oct, mask, vs))
    } else {
        tree.spare(offset, 1, oct, mask);
        None
    }
}

const OCTET_6_EXT: &[u8] = b"abcdefg";

/* 3a* chain of speech versions */
fn bc_speech_versions(cur: &mut Cursor, mut last: u32, tree: &mut FieldTree) -> DResult<()> {
    let mut n = 0;
    while last & 0x80 == 0 {
        let (offset, oct) = octet(cur)?;
        n = (n + 1).min(26);
        let mut sub = FieldTree::new();
        ext_bit(&mut sub, offset, oct);
        sub.bits_bool("Coding", offset, 1, oct, 0x40, &TrueFalse("octet used for other extension of octet 3", "octet used for extension of information transfer capability"));
        sub.spare(offset, 1, oct, 0x30);
        let v = sub.bits_label("Speech version indication", offset, 1, oct, 0x0f, &SPEECH_VERSION);
        tree.subtree(format!("Octet 3{}", (b'a' + n - 1) as char), offset, 1, sub).summary =
            Some(SPEECH_VERSION.label(v).into_owned());
        last = oct;
    }
    Ok(())
}

/// Bearer Capability (10.5.4.5)
pub fn de_bearer_cap(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    /* octet 3 */
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    if ctx.is_uplink() {
        tree.bits_label("Radio channel requirement", offset, 1, oct, 0x60, &RADIO_CHANNEL_REQ);
    } else {
        tree.spare(offset, 1, oct, 0x60);
    }
    tree.bits_bool("Coding standard", offset, 1, oct, 0x10, &TF_CODING);
    tree.bits_bool("Transfer mode", offset, 1, oct, 0x08, &TF_TRANSFER_MODE);
    let itc = tree.bits_label("Information transfer capability", offset, 1, oct, 0x07, &ITC);
    let summary = Some(ITC.label(itc).into_owned());

    if itc == ITC_SPEECH {
        bc_speech_versions(cur, oct, tree)?;
        return Ok(summary);
    }
    if oct & 0x80 == 0 {
        /* no speech versions expected with a data ITC, skip the chain */
        let mut last = oct;
        while last & 0x80 == 0 {
            let (offset, o) = octet(cur)?;
            tree.bits_uint("Octet 3a (not used for this ITC)", offset, 1, o, 0x7f);
            last = o;
        }
    }

    /* octet 4 */
    let (offset, oct) = octet(cur)?;
    let mut sub = FieldTree::new();
    ext_bit(&mut sub, offset, oct);
    sub.bits_bool("Compression", offset, 1, oct, 0x40, &TF_COMPRESSION);
    sub.bits_label("Structure", offset, 1, oct, 0x30, &STRUCTURE);
    sub.bits_bool("Duplex mode", offset, 1, oct, 0x08, &TF_DUPLEX);
    sub.bits_bool("Configuration", offset, 1, oct, 0x04, &TF_CONFIGURATION);
    sub.bits_bool("NIRR", offset, 1, oct, 0x02, &TF_NIRR);
    sub.bits_bool("Establishment", offset, 1, oct, 0x01, &TF_ESTABLISHMENT);
    tree.subtree("Octet 4", offset, 1, sub);

    /* octet 5 */
    let (offset, oct) = octet(cur)?;
    let mut sub = FieldTree::new();
    let ext = ext_bit(&mut sub, offset, oct);
    sub.bits_uint("Access Identity", offset, 1, oct, 0x60);
    sub.bits_label("Rate Adaption", offset, 1, oct, 0x18, &RATE_ADAPTION);
    sub.bits_label(
        "Signalling Access Protocol",
        offset,
        1,
        oct,
        0x07,
        &SIGNALLING_ACCESS_PROTOCOL,
    );
    tree.subtree("Octet 5", offset, 1, sub);
    if !ext {
        let (offset, oct) = octet(cur)?;
        let mut sub = FieldTree::new();
        let ext = ext_bit(&mut sub, offset, oct);
        sub.bits_uint("Other ITC", offset, 1, oct, 0x60);
        sub.bits_uint("Other Rate Adaption", offset, 1, oct, 0x18);
        sub.spare(offset, 1, oct, 0x07);
        tree.subtree("Octet 5a", offset, 1, sub);
        if !ext {
            let (offset, oct) = octet(cur)?;
            let mut sub = FieldTree::new();
            ext_bit(&mut sub, offset, oct);
            sub.bits_bool("Rate Adaption Header", offset, 1, oct, 0x40, &TrueFalse("included", "not included"));
            sub.bits_bool("Multiple frame establishment support in data link", offset, 1, oct, 0x20, &TrueFalse("supported", "not supported, only UI frames allowed"));
            sub.bits_bool("Mode of operation", offset, 1, oct, 0x10, &TrueFalse("protocol sensitive", "bit transparent"));
            sub.bits_bool("Logical link identifier negotiation", offset, 1, oct, 0x08, &TrueFalse("Full protocol negotiation", "Default, LLI=256 only"));
            sub.bits_bool("Assignor/Assignee", offset, 1, oct, 0x04, &TrueFalse("Message originator is assignor only", "Message originator is default assignee"));
            sub.bits_bool("In band/Out of band negotiation", offset, 1, oct, 0x02, &TrueFalse("Negotiation is done with USER INFORMATION messages on a temporary signalling connection", "Negotiation is done in-band using logical link zero"));
            sub.spare(offset, 1, oct, 0x01);
            tree.subtree("Octet 5b", offset, 1, sub);
        }
    }

    if cur.is_empty() {
        return Ok(summary);
    }

    /* octet 6 and its extensions */
    let (offset, oct) = octet(cur)?;
    let mut sub = FieldTree::new();
    let mut ext = ext_bit(&mut sub, offset, oct);
    sub.bits_uint("Layer 1 Identity", offset, 1, oct, 0x60);
    sub.bits_text(
        "User information layer 1 protocol",
        offset,
        1,
        oct,
        0x1e,
        if oct & 0x1e == 0 { "Default layer 1 protocol" } else { "Reserved" },
    );
    sub.bits_bool("Synchronous/asynchronous", offset, 1, oct, 0x01, &TF_SYNC);
    tree.subtree("Octet 6", offset, 1, sub);

    let mut idx = 0;
    while !ext {
        let (offset, oct) = octet(cur)?;
        let mut sub = FieldTree::new();
        ext = ext_bit(&mut sub, offset, oct);
        /* 6a to 6g, anything past is unexpected */
        let name = OCTET_6_EXT.get(idx).map(|&c| c as char);
        match name.unwrap_or('?') {
            'a' => {
                sub.bits_text("Number of Stop Bits", offset, 1, oct, 0x40, if oct & 0x40 != 0 { "2" } else { "1" });
                sub.bits_bool("Negotiation", offset, 1, oct, 0x20, &TrueFalse("Reserved", "In-band negotiation not possible"));
                sub.bits_text("Number of data bits excluding parity bit if present", offset, 1, oct, 0x10, if oct & 0x10 != 0 { "8" } else { "7" });
                sub.bits_label("User rate", offset, 1, oct, 0x0f, &USER_RATE);
            }
            'b' => {
                sub.bits_text(
                    "V.110/X.30 rate adaptation Intermediate rate",
                    offset,
                    1,
                    oct,
                    0x60,
                    match (oct & 0x60) >> 5 {
                        2 => "8 kbit/s",
                        3 => "16 kbit/s",
                        _ => "Not used",
                    },
                );
                sub.bits_bool("Network independent clock (NIC) on transmission (Tx)", offset, 1, oct, 0x10, &TrueFalse("requires to send data with network independent clock", "does not require to send data with network independent clock"));
                sub.bits_bool("Network independent clock (NIC) on reception (Rx)", offset, 1, oct, 0x08, &TrueFalse("can accept data with network independent clock", "cannot accept data with network independent clock"));
                sub.bits_label("Parity information", offset, 1, oct, 0x07, &PARITY);
            }
            'c' => {
                sub.bits_label("Connection element", offset, 1, oct, 0x60, &CONNECTION_ELEMENT);
                sub.bits_label("Modem type", offset, 1, oct, 0x1f, &MODEM_TYPE);
            }
            'd' => {
                sub.bits_uint("Other modem type", offset, 1, oct, 0x60);
                sub.bits_label("Fixed network user rate", offset, 1, oct, 0x1f, &FIXED_NETWORK_USER_RATE);
            }
            'e' => {
                if ctx.is_uplink() {
                    sub.bits_bool("Acceptable channel codings: TCH/F14.4", offset, 1, oct, 0x40, &crate::utils::vals::TF_SUPPORTED);
                    sub.spare(offset, 1, oct, 0x20);
                    sub.bits_bool("Acceptable channel codings: TCH/F9.6", offset, 1, oct, 0x10, &crate::utils::vals::TF_SUPPORTED);
                    sub.bits_bool("Acceptable channel codings: TCH/F4.8", offset, 1, oct, 0x08, &crate::utils::vals::TF_SUPPORTED);
                } else {
                    sub.spare(offset, 1, oct, 0x78);
                }
                uplink_only(&mut sub, ctx, "Maximum number of traffic channels", offset, oct, 0x07, &MAX_TRAFFIC_CHANNELS);
            }
            'f' => {
                uplink_only(&mut sub, ctx, "UIMI, User initiated modification indication", offset, oct, 0x70, &UIMI);
                if let Some(rate) = uplink_only(&mut sub, ctx, "Wanted air interface user rate", offset, oct, 0x0f, &WANTED_AIR_USER_RATE) {
                    trace!("wanted air interface user rate {}", rate);
                }
            }
            'g' => {
                if ctx.is_uplink() {
                    sub.bits_bool("Acceptable channel codings extended: TCH/F28.8", offset, 1, oct, 0x40, &crate::utils::vals::TF_SUPPORTED);
                    sub.bits_bool("Acceptable channel codings extended: TCH/F32.0", offset, 1, oct, 0x20, &crate::utils::vals::TF_SUPPORTED);
                    sub.bits_bool("Acceptable channel codings extended: TCH/F43.2", offset, 1, oct, 0x10, &crate::utils::vals::TF_SUPPORTED);
                } else {
                    sub.spare(offset, 1, oct, 0x70);
                }
                uplink_only(&mut sub, ctx, "Channel Coding Asymmetry Indication", offset, oct, 0x0c, &ASYMMETRY);
                sub.spare(offset, 1, oct, 0x03);
            }
            _ => {
                sub.bits_uint("Unexpected extension", offset, 1, oct, 0x7f);
            }
        }
        let label = match name {
            Some(c) => format!("Octet 6{}", c),
            None => "Octet 6 extension".to_string(),
        };
        tree.subtree(label, offset, 1, sub);
        idx += 1;
    }

    if cur.is_empty() {
        return Ok(summary);
    }

    /* octet 7 */
    let (offset, oct) = octet(cur)?;
    let mut sub = FieldTree::new();
    ext_bit(&mut sub, offset, oct);
    sub.bits_uint("Layer 2 Identity", offset, 1, oct, 0x60);
    sub.bits_label("User information layer 2 protocol", offset, 1, oct, 0x1f, &LAYER2_PROTOCOL);
    tree.subtree("Octet 7", offset, 1, sub);
    Ok(summary)
}

/// Cause (10.5.4.11)
pub fn de_cause(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    let ext = ext_bit(tree, offset, oct);
    tree.bits_label("Coding standard", offset, 1, oct, 0x60, &CODING_STANDARD);
    tree.spare(offset, 1, oct, 0x10);
    tree.bits_label("Location", offset, 1, oct, 0x0f, &LOCATION);
    if !ext {
        let (offset, oct) = octet(cur)?;
        ext_bit(tree, offset, oct);
        tree.bits_uint("Recommendation", offset, 1, oct, 0x7f);
    }
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    let value = oct & 0x7f;
    let class = CAUSE_CLASS[((value >> 4) & 0x07) as usize];
    tree.bits_text("Cause Class", offset, 1, oct, 0x70, class);
    tree.bits_label("Cause Value", offset, 1, oct, 0x7f, &CAUSE_VALUE);
    let diag_offset = cur.pos();
    let diag = cur.rest();
    if !diag.is_empty() {
        tree.bytes("Diagnostics", diag_offset, diag);
    }
    Ok(Some(format!("{} ({})", CAUSE_VALUE.label(value), value)))
}

/* octet 3 of the BCD number elements; returns whether octet 3a follows */
fn number_octet_3(tree: &mut FieldTree, offset: usize, oct: u32) -> bool {
    let ext = ext_bit(tree, offset, oct);
    tree.bits_label("Type of number", offset, 1, oct, 0x70, &TYPE_OF_NUMBER);
    tree.bits_label("Numbering plan identification", offset, 1, oct, 0x0f, &NUMBERING_PLAN);
    !ext
}

fn bcd_digits(cur: &mut Cursor, tree: &mut FieldTree) -> Option<String> {
    let offset = cur.pos();
    let data = cur.rest();
    if data.is_empty() {
        return None;
    }
    let digits = bcd::unpack(data, &bcd::TELEPHONE);
    tree.text("BCD Digits", offset, data.len(), digits.clone());
    Some(digits)
}

/// Called Party BCD Number (10.5.4.7)
pub fn de_called_party(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    number_octet_3(tree, offset, oct);
    Ok(bcd_digits(cur, tree))
}

/// Calling Party BCD Number (10.5.4.9); also Connected and Redirecting
/// Party numbers, which share the layout.
pub fn de_calling_party(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    if number_octet_3(tree, offset, oct) {
        let (offset, oct) = octet(cur)?;
        ext_bit(tree, offset, oct);
        tree.bits_label("Presentation indicator", offset, 1, oct, 0x60, &PRESENTATION);
        tree.spare(offset, 1, oct, 0x1c);
        tree.bits_label("Screening indicator", offset, 1, oct, 0x03, &SCREENING);
    }
    Ok(bcd_digits(cur, tree))
}

/// Progress Indicator (10.5.4.21)
fn de_prog_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    tree.bits_label("Coding standard", offset, 1, oct, 0x60, &CODING_STANDARD);
    tree.spare(offset, 1, oct, 0x10);
    tree.bits_label("Location", offset, 1, oct, 0x0f, &LOCATION);
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    let v = tree.bits_label("Progress Description", offset, 1, oct, 0x7f, &PROGRESS_DESCRIPTION);
    Ok(Some(PROGRESS_DESCRIPTION.label(v).into_owned()))
}

/// Call State (10.5.4.6)
fn de_call_state(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_label("Coding standard", offset, 1, oct, 0xc0, &CODING_STANDARD);
    let v = tree.bits_label("Call state value (state of the call)", offset, 1, oct, 0x3f, &CALL_STATE);
    Ok(Some(CALL_STATE.label(v).into_owned()))
}

/// Auxiliary States (10.5.4.4)
fn de_aux_states(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    tree.spare(offset, 1, oct, 0x70);
    tree.bits_label("Hold aux state", offset, 1, oct, 0x0c, &AUX_HOLD);
    tree.bits_label("Multi party aux state", offset, 1, oct, 0x03, &AUX_MPTY);
    Ok(None)
}

/// Keypad Facility (10.5.4.17)
fn de_keypad(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0x80);
    let c = ((oct & 0x7f) as u8) as char;
    tree.bits_text("Keypad information", offset, 1, oct, 0x7f, c.to_string());
    Ok(Some(c.to_string()))
}

/// Signal (10.5.4.23)
fn de_signal(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, v) = octet(cur)?;
    let label = tree.label("Signal Value", offset, 1, v, &SIGNAL_VALUE);
    Ok(Some(label.into_owned()))
}

fn de_repeat_ind(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
    let v = tree.bits_label("Repeat Indicator", half.offset, 1, half.oct as u32, half.mask(0x0f), &REPEAT_INDICATOR);
    Some(REPEAT_INDICATOR.label(v).into_owned())
}

/// Notification Indicator (10.5.4.20)
fn de_notif_ind(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    ext_bit(tree, offset, oct);
    let v = tree.bits_label("Notification description", offset, 1, oct, 0x7f, &NOTIFICATION);
    Ok(Some(NOTIFICATION.label(v).into_owned()))
}

/// Call Control Capabilities (10.5.4.5a)
fn de_cc_cap(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let (offset, oct) = octet(cur)?;
    tree.bits_uint("Maximum number of supported bearers", offset, 1, oct, 0xf0);
    tree.spare(offset, 1, oct, 0x0c);
    tree.bits_bool("PCP", offset, 1, oct, 0x02, &TF_PCP);
    tree.bits_bool("DTMF", offset, 1, oct, 0x01, &TF_DTMF);
    let (offset, oct) = octet(cur)?;
    tree.spare(offset, 1, oct, 0xf0);
    tree.bits_uint("Maximum number of speech bearers", offset, 1, oct, 0x0f);
    Ok(None)
}

pub const BEARER_CAP: ElemDesc = ElemDesc::full("Bearer Capability", de_bearer_cap);
pub const CAUSE: ElemDesc = ElemDesc::full("Cause", de_cause);
const CALLED_PARTY: ElemDesc = ElemDesc::full("Called Party BCD Number", de_called_party);
const CALLED_SUB: ElemDesc = ElemDesc::raw("Called Party Subaddress");
const CALLING_PARTY: ElemDesc = ElemDesc::full("Calling Party BCD Number", de_calling_party);
const CALLING_SUB: ElemDesc = ElemDesc::raw("Calling Party Subaddress");
const CONNECTED_NUM: ElemDesc = ElemDesc::full("Connected Number", de_calling_party);
const CONNECTED_SUB: ElemDesc = ElemDesc::raw("Connected Subaddress");
const REDIRECTING: ElemDesc = ElemDesc::full("Redirecting Party BCD Number", de_calling_party);
const PROG_IND: ElemDesc = ElemDesc::full("Progress Indicator", de_prog_ind);
const CALL_STATE_E: ElemDesc = ElemDesc::full("Call State", de_call_state);
const AUX_STATES: ElemDesc = ElemDesc::full("Auxiliary States", de_aux_states);
const KEYPAD: ElemDesc = ElemDesc::full("Keypad Facility", de_keypad);
const SIGNAL: ElemDesc = ElemDesc::full("Signal", de_signal);
const REPEAT_IND: ElemDesc = ElemDesc::half("Repeat Indicator", de_repeat_ind);
const NOTIF_IND: ElemDesc = ElemDesc::full("Notification Indicator", de_notif_ind);
const CC_CAP: ElemDesc = ElemDesc::full("Call Control Capabilities", de_cc_cap);
const LLC: ElemDesc = ElemDesc::raw("Low Layer Compatibility");
const HLC: ElemDesc = ElemDesc::raw("High Layer Compatibility");
const USER_USER: ElemDesc = ElemDesc::raw("User-user");
const ALLOWED_ACTIONS: ElemDesc = ElemDesc::raw("Allowed Actions $(CCBS)$");
const ALERTING_PATTERN: ElemDesc = ElemDesc::raw("Alerting Pattern $(NIA)$");
const CLIR_SUPP: ElemDesc = ElemDesc::raw("CLIR Suppression");
const CLIR_INV: ElemDesc = ElemDesc::raw("CLIR Invocation");
const REV_CALL_SETUP: ElemDesc = ElemDesc::raw("Reverse Call Setup Direction");
const MORE_DATA: ElemDesc = ElemDesc::raw("More Data");

const ALERTING_UP: &[IeSpec] = &[
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const ALERTING_DOWN: &[IeSpec] = &[
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x1e, PROG_IND),
    opt(Form::Tlv, 0x7e, USER_USER),
];

const CALL_CONF: &[IeSpec] = &[
    opt(Form::TvShort, 0xd0, REPEAT_IND),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 1"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 2"),
    opt(Form::Tlv, 0x08, CAUSE),
    opt(Form::Tlv, 0x15, CC_CAP),
];

const CALL_PROC: &[IeSpec] = &[
    opt(Form::TvShort, 0xd0, REPEAT_IND),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 1"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 2"),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x1e, PROG_IND),
    opt(Form::TvShort, 0x80, PRIORITY),
];

const CONNECT_UP: &[IeSpec] = &[
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x4d, CONNECTED_SUB),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const CONNECT_DOWN: &[IeSpec] = &[
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x1e, PROG_IND),
    opt(Form::Tlv, 0x4c, CONNECTED_NUM),
    opt(Form::Tlv, 0x4d, CONNECTED_SUB),
    opt(Form::Tlv, 0x7e, USER_USER),
];

const DISCONNECT_UP: &[IeSpec] = &[
    mand(Form::Lv, 0, CAUSE),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const DISCONNECT_DOWN: &[IeSpec] = &[
    mand(Form::Lv, 0, CAUSE),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x1e, PROG_IND),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7b, ALLOWED_ACTIONS),
];

const EMERGENCY_SETUP: &[IeSpec] = &[opt(Form::Tlv, 0x04, BEARER_CAP)];

const FACILITY_MSG: &[IeSpec] = &[mand(Form::Lv, 0, FACILITY), opt(Form::Tlv, 0x7f, SS_VERSION)];

const CAUSE_ONLY: &[IeSpec] = &[mand(Form::Lv, 0, CAUSE)];

const PROGRESS: &[IeSpec] = &[mand(Form::Lv, 0, PROG_IND), opt(Form::Tlv, 0x7e, USER_USER)];

const RELEASE: &[IeSpec] = &[
    opt(Form::Tlv, 0x08, CAUSE),
    opt(Form::Tlv, 0x08, CAUSE).named(" 2"),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const RELEASE_COMPLETE: &[IeSpec] = &[
    opt(Form::Tlv, 0x08, CAUSE),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
];

const SETUP_UP: &[IeSpec] = &[
    opt(Form::TvShort, 0xd0, REPEAT_IND).named(" BC repeat indicator"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 1"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 2"),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x5d, CALLING_SUB),
    mand(Form::Tlv, 0x5e, CALLED_PARTY),
    opt(Form::Tlv, 0x6d, CALLED_SUB),
    opt(Form::Tlv, 0x7c, LLC),
    opt(Form::Tlv, 0x7d, HLC),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::Tlv, 0x7f, SS_VERSION),
    opt(Form::T, 0xa1, CLIR_SUPP),
    opt(Form::T, 0xa2, CLIR_INV),
    opt(Form::Tlv, 0x15, CC_CAP),
];

const SETUP_DOWN: &[IeSpec] = &[
    opt(Form::TvShort, 0xd0, REPEAT_IND).named(" BC repeat indicator"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 1"),
    opt(Form::Tlv, 0x04, BEARER_CAP).named(" 2"),
    opt(Form::Tlv, 0x1c, FACILITY),
    opt(Form::Tlv, 0x1e, PROG_IND),
    opt(Form::Tv, 0x34, SIGNAL),
    opt(Form::Tlv, 0x5c, CALLING_PARTY),
    opt(Form::Tlv, 0x5d, CALLING_SUB),
    opt(Form::Tlv, 0x5e, CALLED_PARTY),
    opt(Form::Tlv, 0x6d, CALLED_SUB),
    opt(Form::Tlv, 0x74, REDIRECTING),
    opt(Form::Tlv, 0x7c, LLC),
    opt(Form::Tlv, 0x7d, HLC),
    opt(Form::Tlv, 0x7e, USER_USER),
    opt(Form::TvShort, 0x80, PRIORITY),
    opt(Form::Tlv, 0x19, ALERTING_PATTERN),
];

const MODIFY: &[IeSpec] = &[
    mand(Form::Lv, 0, BEARER_CAP),
    opt(Form::Tlv, 0x7c, LLC),
    opt(Form::Tlv, 0x7d, HLC),
    opt(Form::T, 0xa3, REV_CALL_SETUP),
];

const MODIFY_REJ: &[IeSpec] = &[
    mand(Form::Lv, 0, BEARER_CAP),
    mand(Form::Lv, 0, CAUSE),
    opt(Form::Tlv, 0x7c, LLC),
    opt(Form::Tlv, 0x7d, HLC),
];

const USER_INFO: &[IeSpec] = &[mand(Form::Lv, 0, USER_USER), opt(Form::T, 0xa0, MORE_DATA)];

const DTMF: &[IeSpec] = &[mand(Form::Tv, 0x2c, KEYPAD)];

const STATUS: &[IeSpec] = &[
    mand(Form::Lv, 0, CAUSE),
    mand(Form::V, 0, CALL_STATE_E),
    opt(Form::Tlv, 0x24, AUX_STATES),
];

const NOTIFY: &[IeSpec] = &[mand(Form::V, 0, NOTIF_IND)];

const EMPTY: &[IeSpec] = &[];

pub static MESSAGES: &[MsgDesc] = &[
    MsgDesc::new(
        0x01,
        "Alerting",
        Body::ByDirection {
            uplink: ALERTING_UP,
            downlink: ALERTING_DOWN,
        },
    ),
    MsgDesc::new(0x08, "Call Confirmed", Body::Ies(CALL_CONF)).up(),
    MsgDesc::new(0x02, "Call Proceeding", Body::Ies(CALL_PROC)).down(),
    MsgDesc::new(
        0x07,
        "Connect",
        Body::ByDirection {
            uplink: CONNECT_UP,
            downlink: CONNECT_DOWN,
        },
    ),
    MsgDesc::new(0x0f, "Connect Acknowledge", Body::Ies(EMPTY)),
    MsgDesc::new(0x0e, "Emergency Setup", Body::Ies(EMERGENCY_SETUP)).up(),
    MsgDesc::new(0x03, "Progress", Body::Ies(PROGRESS)).down(),
    MsgDesc::new(0x04, "CC-Establishment", Body::Undecoded),
    MsgDesc::new(0x06, "CC-Establishment Confirmed", Body::Undecoded),
    MsgDesc::new(0x0b, "Recall", Body::Undecoded),
    MsgDesc::new(0x09, "Start CC", Body::Undecoded),
    MsgDesc::new(
        0x05,
        "Setup",
        Body::ByDirection {
            uplink: SETUP_UP,
            downlink: SETUP_DOWN,
        },
    ),
    MsgDesc::new(0x17, "Modify", Body::Ies(MODIFY)),
    MsgDesc::new(0x1f, "Modify Complete", Body::Ies(MODIFY)),
    MsgDesc::new(0x13, "Modify Reject", Body::Ies(MODIFY_REJ)),
    MsgDesc::new(0x10, "User Information", Body::Ies(USER_INFO)),
    MsgDesc::new(0x18, "Hold", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x19, "Hold Acknowledge", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x1a, "Hold Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x1c, "Retrieve", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x1d, "Retrieve Acknowledge", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x1e, "Retrieve Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(
        0x25,
        "Disconnect",
        Body::ByDirection {
            uplink: DISCONNECT_UP,
            downlink: DISCONNECT_DOWN,
        },
    ),
    MsgDesc::new(0x2d, "Release", Body::Ies(RELEASE)),
    MsgDesc::new(0x2a, "Release Complete", Body::Ies(RELEASE_COMPLETE)),
    MsgDesc::new(0x39, "Congestion Control", Body::Undecoded),
    MsgDesc::new(0x3e, "Notify", Body::Ies(NOTIFY)),
    MsgDesc::new(0x3d, "Status", Body::Ies(STATUS)),
    MsgDesc::new(0x34, "Status Enquiry", Body::Ies(EMPTY)),
    MsgDesc::new(0x35, "Start DTMF", Body::Ies(DTMF)).up(),
    MsgDesc::new(0x31, "Stop DTMF", Body::Ies(EMPTY)).up(),
    MsgDesc::new(0x32, "Stop DTMF Acknowledge", Body::Ies(EMPTY)).down(),
    MsgDesc::new(0x36, "Start DTMF Acknowledge", Body::Ies(DTMF)).down(),
    MsgDesc::new(0x37, "Start DTMF Reject", Body::Ies(CAUSE_ONLY)).down(),
    MsgDesc::new(0x3a, "Facility", Body::Ies(FACILITY_MSG)),
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

    /* 3.1 kHz audio, octets 4, 5, 6, 6a to 6f, 7 */
    const DATA_BC: [u8; 13] = [
        0x04, 0x0b, 0xe2, 0x88, 0xa1, 0x21, 0x15, 0x63, 0x20, 0x00, 0x49, 0x82, 0xc6,
    ];

    fn bc_with(dir: Direction) -> crate::field::DecodedField {
        let ies = [opt(Form::Tlv, 0x04, BEARER_CAP)];
        run(&DATA_BC[..], &ies, dir).unwrap()
    }

    #[test]
    fn bearer_cap_speech() {
        /* speech, full rate v2 then v1 */
        let data = [0x04, 0x03, 0x60, 0x02, 0x80];
        let ies = [opt(Form::Tlv, 0x04, BEARER_CAP)];
        let f = run(&data, &ies, Direction::Uplink).unwrap();
        assert_eq!(f.find("Bearer Capability").unwrap().summary.as_deref(), Some("speech"));
        assert_eq!(
            f.find("Octet 3a").unwrap().summary.as_deref(),
            Some("GSM full rate speech version 2")
        );
        assert_eq!(
            f.find("Octet 3b").unwrap().summary.as_deref(),
            Some("GSM full rate speech version 1")
        );
        assert_eq!(
            f.find("Radio channel requirement").and_then(|r| r.label()),
            Some("Dual rate support MS/full rate speech version 1 preferred, half rate speech version 1 also supported")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn bearer_cap_data_by_direction() {
        let up = bc_with(Direction::Uplink);
        assert!(up.diagnostics().is_empty());
        assert_eq!(
            up.find("Bearer Capability").unwrap().summary.as_deref(),
            Some("3.1 kHz audio, ex PLMN")
        );
        assert_eq!(up.find("User rate").and_then(|r| r.label()), Some("9.6 kbit/s Recommendation X.1 and V.110"));
        assert_eq!(
            up.find("Wanted air interface user rate").and_then(|r| r.label()),
            Some("14.4 kbit/s")
        );
        assert!(up.find("Octet 7").is_some());

        let down = bc_with(Direction::Downlink);
        assert!(down.diagnostics().is_empty());
        assert!(down.find("Wanted air interface user rate").is_none());
        assert!(down.find("Radio channel requirement").is_none());
        let octet_6f = down.find("Octet 6f").unwrap();
        assert_eq!(
            octet_6f.children().iter().filter(|c| c.name == "Spare").count(),
            2
        );
        /* unknown direction reads like downlink */
        let unknown = bc_with(Direction::Unknown);
        assert_eq!(unknown, down);
    }

    #[test]
    fn bearer_cap_cut_short() {
        /* octet 5 announces 5a, the element ends */
        let data = [0x04, 0x03, 0xe2, 0x88, 0x21];
        let ies = [opt(Form::Tlv, 0x04, BEARER_CAP)];
        let f = run(&data, &ies, Direction::Uplink).unwrap();
        let d = f.diagnostics();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].name, "Short Data (?)");
        assert!(f.find("Octet 5").is_some());
    }

    #[test]
    fn bearer_cap_long_octet_6_chain() {
        /* octet 6 followed by extension octets up to the end of a 255-byte element */
        let mut data = vec![0xff, 0x81, 0x80, 0x80, 0x00];
        data.extend_from_slice(&[0x00; 251]);
        let ies = [mand(Form::Lv, 0, BEARER_CAP)];
        for dir in [Direction::Uplink, Direction::Downlink] {
            let f = run(&data, &ies, dir).unwrap();
            assert!(f.find("Octet 6g").is_some());
            assert!(f.find("Octet 6 extension").is_some());
            assert!(f.find("Unexpected extension").is_some());
            let d = f.diagnostics();
            assert_eq!(d.len(), 1);
            assert_eq!(d[0].name, "Short Data (?)");
        }
    }

    #[test]
    fn cause_and_called_party() {
        let f = run(&[0x02, 0xe0, 0x90], CAUSE_ONLY, Direction::Downlink).unwrap();
        assert_eq!(f.find("Cause").unwrap().summary.as_deref(), Some("Normal call clearing (16)"));
        assert_eq!(f.find("Cause Class").and_then(|c| c.label()), Some("normal event"));

        let data = [0x5e, 0x05, 0x91, 0x33, 0x06, 0x21, 0xf3];
        let f = run(&data, SETUP_UP, Direction::Uplink).unwrap();
        assert_eq!(f.find("BCD Digits").and_then(|d| d.as_str()), Some("3360123"));
        assert_eq!(
            f.find("Type of number").and_then(|d| d.label()),
            Some("international number")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn setup_needs_called_party() {
        let f = run(&[0x04, 0x01, 0xa0], SETUP_UP, Direction::Uplink).unwrap();
        assert_eq!(f.diagnostics().len(), 1);
        assert_eq!(
            f.diagnostics()[0].name,
            "Missing Mandatory element (0x5e) Called Party BCD Number, rest of dissection is suspect"
        );
    }
}
