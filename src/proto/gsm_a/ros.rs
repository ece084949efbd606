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

/* Facility IE (24.080 3.6): a list of ROS components, BER encoded. */

use log::*;

use crate::context::{DecodeContext, SubProtocol};
use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::ber::{self, Class, Tlv};
use crate::proto::dissector::Cursor;
use crate::proto::gsm_a::elem::{delegate, ElemDesc};
use crate::utils::vals::{Fallback, ValueString};

const INVOKE: u32 = 1;
const RETURN_RESULT_LAST: u32 = 2;
const RETURN_ERROR: u32 = 3;
const REJECT: u32 = 4;
const RETURN_RESULT_NOT_LAST: u32 = 7;

static COMPONENT_TYPE: ValueString = ValueString::new(
    &[
        (INVOKE, "Invoke"),
        (RETURN_RESULT_LAST, "Return Result (Last)"),
        (RETURN_ERROR, "Return Error"),
        (REJECT, "Reject"),
        (RETURN_RESULT_NOT_LAST, "Return Result (Not Last)"),
    ],
    Fallback::Static("Unknown Component"),
);

pub static SS_OPERATION: ValueString = ValueString::new(
    &[
        (10, "RegisterSS"),
        (11, "EraseSS"),
        (12, "ActivateSS"),
        (13, "DeactivateSS"),
        (14, "InterrogateSS"),
        (16, "NotifySS"),
        (17, "RegisterPassword"),
        (18, "GetPassword"),
        (19, "ProcessUnstructuredSS-Data"),
        (38, "ForwardCheckSS-Indication"),
        (59, "ProcessUnstructuredSS-Request"),
        (60, "UnstructuredSS-Request"),
        (61, "UnstructuredSS-Notify"),
        (77, "EraseCC-Entry"),
        (109, "LCS-PeriodicLocationCancellation"),
        (110, "LCS-LocationUpdate"),
        (111, "LCS-PeriodicLocationRequest"),
        (112, "LCS-AreaEventCancellation"),
        (113, "LCS-AreaEventReport"),
        (114, "LCS-AreaEventRequest"),
        (115, "LCS-MOLR"),
        (116, "LCS-LocationNotification"),
        (117, "CallDeflection"),
        (118, "UserUserService"),
        (119, "AccessRegisterCCEntry"),
        (120, "ForwardCUG-Info"),
        (121, "SplitMPTY"),
        (122, "RetrieveMPTY"),
        (123, "HoldMPTY"),
        (124, "BuildMPTY"),
        (125, "ForwardChargeAdvice"),
        (126, "ExplicitCT"),
    ],
    Fallback::UnknownValue,
);

static SS_ERROR: ValueString = ValueString::new(
    &[
        (1, "UnknownSubscriber"),
        (9, "IllegalSubscriber"),
        (10, "BearerServiceNotProvisioned"),
        (11, "TeleserviceNotProvisioned"),
        (12, "IllegalEquipment"),
        (13, "CallBarred"),
        (16, "IllegalSS-Operation"),
        (17, "SS-ErrorStatus"),
        (18, "SS-NotAvailable"),
        (19, "SS-SubscriptionViolation"),
        (20, "SS-Incompatibility"),
        (21, "FacilityNotSupported"),
        (27, "AbsentSubscriber"),
        (29, "ShortTermDenial"),
        (30, "LongTermDenial"),
        (34, "SystemFailure"),
        (35, "DataMissing"),
        (36, "UnexpectedDataValue"),
        (37, "PW-RegistrationFailure"),
        (38, "NegativePW-Check"),
        (43, "NumberOfPW-AttemptsViolation"),
        (54, "PositionMethodFailure"),
        (71, "UnknownAlphabet"),
        (72, "USSD-Busy"),
        (121, "RejectedByUser"),
        (122, "RejectedByNetwork"),
        (123, "DeflectionToServedSubscriber"),
        (124, "SpecialServiceCode"),
        (125, "InvalidDeflectedToNumber"),
        (126, "MaxNumberOfMPTY-ParticipantsExceeded"),
        (127, "ResourcesNotAvailable"),
    ],
    Fallback::UnknownValue,
);

static PROBLEM_TAG: ValueString = ValueString::new(
    &[
        (0, "General Problem"),
        (1, "Invoke Problem"),
        (2, "Return Result Problem"),
        (3, "Return Error Problem"),
    ],
    Fallback::Unknown,
);

static GENERAL_PROBLEM: ValueString = ValueString::new(
    &[
        (0, "Unrecognized Component"),
        (1, "Mistyped Component"),
        (2, "Badly Structured Component"),
    ],
    Fallback::UnknownValue,
);

static INVOKE_PROBLEM: ValueString = ValueString::new(
    &[
        (0, "Duplicate Invoke ID"),
        (1, "Unrecognized Operation"),
        (2, "Mistyped Parameter"),
        (3, "Resource Limitation"),
        (4, "Initiating Release"),
        (5, "Unrecognized Linked ID"),
        (6, "Linked Response Unexpected"),
        (7, "Unexpected Linked Operation"),
    ],
    Fallback::UnknownValue,
);

static RETURN_RESULT_PROBLEM: ValueString = ValueString::new(
    &[
        (0, "Unrecognized Invoke ID"),
        (1, "Return Result Unexpected"),
        (2, "Mistyped Parameter"),
    ],
    Fallback::UnknownValue,
);

static RETURN_ERROR_PROBLEM: ValueString = ValueString::new(
    &[
        (0, "Unrecognized Invoke ID"),
        (1, "Return Error Unexpected"),
        (2, "Unrecognized Error"),
        (3, "Unexpected Error"),
        (4, "Mistyped Parameter"),
    ],
    Fallback::UnknownValue,
);

fn problem_table(tag: u32) -> &'static ValueString {
    match tag {
        0 => &GENERAL_PROBLEM,
        1 => &INVOKE_PROBLEM,
        2 => &RETURN_RESULT_PROBLEM,
        _ => &RETURN_ERROR_PROBLEM,
    }
}

/* next TLV if it carries the given identifier, cursor untouched otherwise */
fn expect<'a>(
    cur: &mut Cursor<'a>,
    ctx: &DecodeContext,
    class: Class,
    constructed: bool,
    tag: u32,
) -> DResult<Option<Tlv<'a>>> {
    if cur.is_empty() {
        return Ok(None);
    }
    let mut probe = *cur;
    let id = ber::read_identifier(&mut probe)?;
    if !id.is(class, constructed, tag) {
        return Ok(None);
    }
    ber::read_tlv(cur, ctx).map(Some)
}

fn integer_field(tree: &mut FieldTree, name: &'static str, tlv: &Tlv) -> i64 {
    let v = ber::integer(tlv.content.peek_rest());
    tree.int(name, tlv.offset, tlv.total_len(), v);
    v
}

fn code_field(tree: &mut FieldTree, name: &'static str, tlv: &Tlv, vs: &ValueString) -> u32 {
    let v = ber::integer(tlv.content.peek_rest()) as u32;
    tree.label(name, tlv.offset, tlv.total_len(), v, vs);
    v
}

/* whatever follows the expected sub-fields is left to the generic walk */
fn leftovers(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<()> {
    if !cur.is_empty() {
        debug!("unexpected ROS content at offset {}", cur.pos());
        ber::walk(cur, ctx, tree)?;
    }
    Ok(())
}

fn invoke_id(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<i64>> {
    Ok(expect(cur, ctx, Class::Universal, false, 2)?.map(|t| integer_field(tree, "Invoke ID", &t)))
}

fn parameter(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    opcode: Option<u32>,
    tree: &mut FieldTree,
) -> DResult<()> {
    delegate(cur, ctx, SubProtocol::SsParameter { opcode }, tree)
}

fn invoke(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    invoke_id(cur, ctx, tree)?;
    if let Some(t) = expect(cur, ctx, Class::Context, false, 0)? {
        integer_field(tree, "Linked ID", &t);
    }
    let op = match expect(cur, ctx, Class::Universal, false, 2)? {
        Some(t) => code_field(tree, "Operation Code", &t, &SS_OPERATION),
        None => return leftovers(cur, ctx, tree).map(|_| None),
    };
    parameter(cur, ctx, Some(op), tree)?;
    Ok(Some(SS_OPERATION.label(op).into_owned()))
}

fn return_result(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    invoke_id(cur, ctx, tree)?;
    let seq = match expect(cur, ctx, Class::Universal, true, 16)? {
        Some(s) => s,
        None => return leftovers(cur, ctx, tree).map(|_| None),
    };
    let inner = ctx.nested()?;
    let mut content = seq.content;
    let mut sub = FieldTree::new();
    let mut summary = None;
    if let Some(t) = expect(&mut content, &inner, Class::Universal, false, 2)? {
        let op = code_field(&mut sub, "Operation Code", &t, &SS_OPERATION);
        parameter(&mut content, &inner, Some(op), &mut sub)?;
        summary = Some(SS_OPERATION.label(op).into_owned());
    } else {
        leftovers(&mut content, &inner, &mut sub)?;
    }
    tree.subtree("Sequence", seq.offset, seq.total_len(), sub);
    leftovers(cur, ctx, tree)?;
    Ok(summary)
}

fn return_error(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    invoke_id(cur, ctx, tree)?;
    let err = match expect(cur, ctx, Class::Universal, false, 2)? {
        Some(t) => code_field(tree, "Error Code", &t, &SS_ERROR),
        None => return leftovers(cur, ctx, tree).map(|_| None),
    };
    parameter(cur, ctx, None, tree)?;
    Ok(Some(SS_ERROR.label(err).into_owned()))
}

fn reject(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    if invoke_id(cur, ctx, tree)?.is_none() {
        if let Some(t) = expect(cur, ctx, Class::Universal, false, 5)? {
            tree.text("Invoke ID", t.offset, t.total_len(), "not derivable");
        }
    }
    let mut probe = *cur;
    let id = match probe.peek_u8() {
        Some(_) => ber::read_identifier(&mut probe)?,
        None => return Ok(None),
    };
    if id.class != Class::Context || id.constructed || id.tag > 3 {
        return leftovers(cur, ctx, tree).map(|_| None);
    }
    let tlv = ber::read_tlv(cur, ctx)?;
    let vs = problem_table(id.tag);
    let code = ber::integer(tlv.content.peek_rest()) as u32;
    let mut sub = FieldTree::new();
    sub.label("Problem Code", tlv.offset, tlv.total_len(), code, vs);
    tree.subtree(PROBLEM_TAG.label(id.tag), tlv.offset, tlv.total_len(), sub);
    leftovers(cur, ctx, tree)?;
    Ok(Some(vs.label(code).into_owned()))
}

/// Decodes one component into `tree`.
pub fn component(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<()> {
    let tlv = ber::read_tlv(cur, ctx)?;
    let inner = ctx.nested()?;
    let mut content = tlv.content;
    let mut sub = FieldTree::new();
    let kind = if tlv.id.class == Class::Context && tlv.id.constructed {
        tlv.id.tag
    } else {
        0
    };
    trace!("ROS component {:?} at offset {}", tlv.id, tlv.offset);
    let summary = match kind {
        INVOKE => invoke(&mut content, &inner, &mut sub)?,
        RETURN_RESULT_LAST | RETURN_RESULT_NOT_LAST => return_result(&mut content, &inner, &mut sub)?,
        RETURN_ERROR => return_error(&mut content, &inner, &mut sub)?,
        REJECT => reject(&mut content, &inner, &mut sub)?,
        _ => {
            let offset = content.pos();
            sub.bytes("Component Data", offset, content.rest());
            None
        }
    };
    let name = COMPONENT_TYPE.label(kind);
    let node = tree.subtree(name, tlv.offset, tlv.total_len(), sub);
    node.summary = summary;
    Ok(())
}

/// Facility (24.008 10.5.4.15 / 24.080 3.6)
pub fn de_facility(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
    let mut names = Vec::new();
    while !cur.is_empty() {
        component(cur, ctx, tree)?;
        if let Some(f) = tree.fields().last() {
            names.push(f.name.to_string());
        }
    }
    if names.is_empty() {
        Ok(None)
    } else {
        Ok(Some(names.join(", ")))
    }
}

pub const FACILITY: ElemDesc = ElemDesc::full("Facility", de_facility);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Direction;
    use crate::error::DecodeError;
    use crate::field::Value;
    use crate::proto::gsm_a::elem::tests::run;
    use crate::proto::gsm_a::elem::{mand, opt, Form};

    #[test]
    fn invoke_ussd() {
        /* Invoke id 1, op 59 (processUnstructuredSS-Request), parameter SEQUENCE */
        let data = [
            0x0e, 0xa1, 0x0c, 0x02, 0x01, 0x01, 0x02, 0x01, 0x3b, 0x30, 0x04, 0x04, 0x02,
            0xaa, 0xbb,
        ];
        let ies = [mand(Form::Lv, 0, FACILITY)];
        let f = run(&data, &ies, Direction::Uplink).unwrap();
        let fac = f.find("Facility").unwrap();
        assert_eq!(fac.summary.as_deref(), Some("Invoke"));
        let inv = f.find("Invoke").unwrap();
        assert_eq!(inv.summary.as_deref(), Some("ProcessUnstructuredSS-Request"));
        assert_eq!(inv.offset, 1);
        assert_eq!(f.find("Invoke ID").unwrap().value, Value::Signed(1));
        assert_eq!(
            f.find("Operation Code").and_then(|o| o.label()),
            Some("ProcessUnstructuredSS-Request")
        );
        let param = f.find("Parameter").unwrap();
        assert_eq!(param.offset, 9);
        assert_eq!(
            f.find("OCTET STRING").unwrap().value,
            Value::Bytes(vec![0xaa, 0xbb])
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn return_error_and_reject() {
        let data = [
            0x1c, 0x0d, 0xa3, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x22, 0xa4, 0x03, 0x05,
            0x00, 0x81, 0x01, 0x01,
        ];
        /* wrong length on purpose: reject component is cut */
        let ies = [opt(Form::Tlv, 0x1c, FACILITY)];
        let f = run(&data, &ies, Direction::Unknown).unwrap();
        assert_eq!(f.find("Error Code").and_then(|e| e.label()), Some("SystemFailure"));
        assert!(f.find("Short Data (?)").is_some());

        let data = [
            0x1c, 0x0f, 0xa3, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x22, 0xa4, 0x05, 0x05,
            0x00, 0x81, 0x01, 0x01,
        ];
        let f = run(&data, &ies, Direction::Unknown).unwrap();
        assert_eq!(
            f.find("Facility").unwrap().summary.as_deref(),
            Some("Return Error, Reject")
        );
        assert_eq!(f.find("Invoke Problem").unwrap().offset, 14);
        assert_eq!(
            f.find("Problem Code").and_then(|p| p.label()),
            Some("Unrecognized Operation")
        );
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn return_result() {
        let data = [
            0x0a, 0xa2, 0x08, 0x02, 0x01, 0x02, 0x30, 0x03, 0x02, 0x01, 0x0e,
        ];
        let ies = [mand(Form::Lv, 0, FACILITY)];
        let f = run(&data, &ies, Direction::Downlink).unwrap();
        assert_eq!(f.find("Sequence").unwrap().len, 5);
        assert_eq!(
            f.find("Return Result (Last)").unwrap().summary.as_deref(),
            Some("InterrogateSS")
        );
    }

    #[test]
    fn nesting_is_bounded() {
        /* Invoke with a deeply nested parameter */
        let depth = 40;
        let mut param = Vec::new();
        for i in 0..depth {
            param.push(0x30);
            param.push((2 * (depth - 1 - i)) as u8);
        }
        let mut inv = vec![0x02, 0x01, 0x01, 0x02, 0x01, 0x0a];
        inv.extend(&param);
        let mut data = vec![(inv.len() + 2) as u8, 0xa1, inv.len() as u8];
        data.extend(&inv);
        let ies = [mand(Form::Lv, 0, FACILITY)];
        assert_eq!(
            run(&data, &ies, Direction::Unknown).unwrap_err(),
            DecodeError::RecursionLimitExceeded { depth: 32 }
        );
    }
}
