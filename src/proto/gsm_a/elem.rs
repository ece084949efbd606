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

use std::borrow::Cow;
use std::collections::HashMap;

use log::*;

use crate::context::{DecodeContext, Direction, SubProtocol};
use crate::error::{DResult, DecodeError};
use crate::field::{Diagnostic, FieldTree};
use crate::proto::dissector::Cursor;

/// Decodes the value part of an element. For TLV/LV forms the cursor is
/// bounded by the declared length; for T/TV/V forms it is the enclosing
/// cursor and the decoder reads its own fixed width.
pub type ElemFn =
    fn(&mut Cursor<'_>, &DecodeContext<'_>, &mut FieldTree) -> DResult<Option<String>>;

/// Decodes a value held in half an octet.
pub type HalfFn = fn(Half, &DecodeContext<'_>, &mut FieldTree) -> Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nibble {
    Lo,
    Hi,
}

/// Half-octet value together with the octet it lives in, so that the bit
/// pattern can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Half {
    pub oct: u8,
    pub nibble: Nibble,
    pub offset: usize,
}

impl Half {
    pub fn value(&self) -> u8 {
        match self.nibble {
            Nibble::Lo => self.oct & 0x0f,
            Nibble::Hi => self.oct >> 4,
        }
    }

    /// Shifts a mask expressed on the low nibble onto the actual nibble.
    pub fn mask(&self, m: u8) -> u32 {
        match self.nibble {
            Nibble::Lo => (m & 0x0f) as u32,
            Nibble::Hi => ((m & 0x0f) as u32) << 4,
        }
    }
}

#[derive(Clone, Copy)]
pub enum Decode {
    /// value shown as raw bytes
    Raw,
    Full(ElemFn),
    Half(HalfFn),
}

#[derive(Clone, Copy)]
pub struct ElemDesc {
    pub name: &'static str,
    pub decode: Decode,
}

impl ElemDesc {
    pub const fn raw(name: &'static str) -> Self {
        ElemDesc {
            name,
            decode: Decode::Raw,
        }
    }

    pub const fn full(name: &'static str, f: ElemFn) -> Self {
        ElemDesc {
            name,
            decode: Decode::Full(f),
        }
    }

    pub const fn half(name: &'static str, f: HalfFn) -> Self {
        ElemDesc {
            name,
            decode: Decode::Half(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Optional,
}

/// Encoding form of an element at a given position of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// IEI only
    T,
    /// IEI + fixed length value
    Tv,
    /// IEI in the high nibble, value in the low nibble
    TvShort,
    Tlv,
    Lv,
    V,
    /// half-octet value; the low nibble does not advance the cursor
    VHalf(Nibble),
}

#[derive(Clone, Copy)]
pub struct IeSpec {
    pub presence: Presence,
    pub form: Form,
    /// Element identifier (high nibble only for TV-short, unused for LV/V).
    pub iei: u8,
    pub elem: ElemDesc,
    /// appended to the element name, e.g. " (Serving)"
    pub addition: &'static str,
}

impl IeSpec {
    pub const fn named(self, addition: &'static str) -> Self {
        IeSpec { addition, ..self }
    }

    fn name(&self) -> Cow<'static, str> {
        if self.addition.is_empty() {
            Cow::Borrowed(self.elem.name)
        } else {
            Cow::Owned(format!("{}{}", self.elem.name, self.addition))
        }
    }
}

pub const fn mand(form: Form, iei: u8, elem: ElemDesc) -> IeSpec {
    IeSpec {
        presence: Presence::Mandatory,
        form,
        iei,
        elem,
        addition: "",
    }
}

pub const fn opt(form: Form, iei: u8, elem: ElemDesc) -> IeSpec {
    IeSpec {
        presence: Presence::Optional,
        form,
        iei,
        elem,
        addition: "",
    }
}

#[derive(Clone, Copy)]
pub enum Body {
    /// name known, contents not decoded
    Undecoded,
    Ies(&'static [IeSpec]),
    /// element list depends on the direction
    ByDirection {
        uplink: &'static [IeSpec],
        downlink: &'static [IeSpec],
    },
}

#[derive(Clone, Copy)]
pub struct MsgDesc {
    pub code: u8,
    pub name: &'static str,
    /// set when the message only exists in one direction
    pub dir: Option<Direction>,
    pub body: Body,
}

impl MsgDesc {
    pub const fn new(code: u8, name: &'static str, body: Body) -> Self {
        MsgDesc {
            code,
            name,
            dir: None,
            body,
        }
    }

    pub const fn up(self) -> Self {
        MsgDesc {
            dir: Some(Direction::Uplink),
            ..self
        }
    }

    pub const fn down(self) -> Self {
        MsgDesc {
            dir: Some(Direction::Downlink),
            ..self
        }
    }
}

/// Message type -> descriptor.
pub struct MsgIndex(HashMap<u8, &'static MsgDesc>);

impl MsgIndex {
    pub fn new(table: &'static [MsgDesc]) -> Self {
        MsgIndex(table.iter().map(|m| (m.code, m)).collect())
    }

    pub fn get(&self, code: u8) -> Option<&'static MsgDesc> {
        self.0.get(&code).copied()
    }
}

/// Runs the element list of `msg` over the cursor.
pub fn dissect_msg(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    msg: &MsgDesc,
    tree: &mut FieldTree,
) -> DResult<()> {
    let ctx = match msg.dir {
        Some(d) => ctx.with_direction(d),
        None => *ctx,
    };
    match msg.body {
        Body::Undecoded => {
            if !cur.is_empty() {
                let offset = cur.pos();
                tree.bytes("Message Elements", offset, cur.rest());
            }
            Ok(())
        }
        Body::Ies(ies) => dissect_ies(cur, &ctx, ies, tree),
        Body::ByDirection { uplink, downlink } => {
            let ies = if ctx.is_uplink() { uplink } else { downlink };
            dissect_ies(cur, &ctx, ies, tree)
        }
    }
}

/// Generic driver: elements are expected strictly in list order, optional
/// ones are skipped when their tag does not match, and a missing
/// mandatory element ends the dissection of the message.
pub fn dissect_ies(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    ies: &[IeSpec],
    tree: &mut FieldTree,
) -> DResult<()> {
    for ie in ies {
        if dissect_ie(cur, ctx, ie, tree)? {
            continue;
        }
        if ie.presence == Presence::Mandatory {
            let name = format!(
                "Missing Mandatory element (0x{:02x}) {}{}, rest of dissection is suspect",
                ie.iei, ie.elem.name, ie.addition
            );
            warn!("{}", name);
            tree.diag(Diagnostic::MissingMandatoryElement, name, cur.pos(), &[]);
            return Ok(());
        }
    }
    let offset = cur.pos();
    tree.extraneous(offset, cur.rest());
    Ok(())
}

fn tag_matches(cur: &Cursor, iei: u8) -> bool {
    cur.peek_u8() == Some(iei)
}

/// Returns whether the element was present.
fn dissect_ie(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    ie: &IeSpec,
    tree: &mut FieldTree,
) -> DResult<bool> {
    let start = cur.pos();
    let mut sub = FieldTree::new();
    let summary = match ie.form {
        Form::T => {
            if !tag_matches(cur, ie.iei) {
                return Ok(false);
            }
            cur.skip(1)?;
            sub.uint("Element ID", start, 1, ie.iei as u64);
            None
        }
        Form::Tv => {
            if !tag_matches(cur, ie.iei) {
                return Ok(false);
            }
            cur.skip(1)?;
            sub.uint("Element ID", start, 1, ie.iei as u64);
            value_inline(cur, ctx, &ie.elem, &mut sub)?
        }
        Form::TvShort => {
            let oct = match cur.peek_u8() {
                Some(b) if b & 0xf0 == ie.iei & 0xf0 => b,
                _ => return Ok(false),
            };
            cur.skip(1)?;
            sub.bits_uint("Element ID", start, 1, oct as u32, 0xf0);
            let half = Half {
                oct,
                nibble: Nibble::Lo,
                offset: start,
            };
            value_half(half, ctx, &ie.elem, &mut sub)
        }
        Form::Tlv | Form::Lv => {
            if ie.form == Form::Tlv {
                if !tag_matches(cur, ie.iei) {
                    return Ok(false);
                }
                cur.skip(1)?;
                sub.uint("Element ID", start, 1, ie.iei as u64);
            } else if cur.is_empty() {
                return Ok(false);
            }
            let len_offset = cur.pos();
            let len = cur.read_u8()? as usize;
            sub.uint("Length", len_offset, 1, len as u64);
            match cur.window(len) {
                Ok(win) => value_window(win, ctx, &ie.elem, &mut sub)?,
                Err(DecodeError::ShortData { .. }) => {
                    let offset = cur.pos();
                    sub.diag(Diagnostic::ShortData, "Short Data (?)", offset, cur.rest());
                    None
                }
                Err(e) => return Err(e),
            }
        }
        Form::V => {
            if cur.is_empty() {
                return Ok(false);
            }
            value_inline(cur, ctx, &ie.elem, &mut sub)?
        }
        Form::VHalf(nibble) => {
            let oct = match cur.peek_u8() {
                Some(b) => b,
                None => return Ok(false),
            };
            if nibble == Nibble::Hi {
                cur.skip(1)?;
            }
            let half = Half {
                oct,
                nibble,
                offset: start,
            };
            value_half(half, ctx, &ie.elem, &mut sub)
        }
    };
    trace!("{} at offset {}", ie.elem.name, start);
    let len = match ie.form {
        Form::VHalf(_) => 1,
        _ => cur.pos() - start,
    };
    let node = tree.subtree(ie.name(), start, len, sub);
    node.summary = summary;
    Ok(true)
}

/* T/TV/V value: the decoder reads its own width off the enclosing cursor */
fn value_inline(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    elem: &ElemDesc,
    sub: &mut FieldTree,
) -> DResult<Option<String>> {
    let start = cur.pos();
    let r = match elem.decode {
        Decode::Raw => cur.take(1).map(|v| {
            sub.bytes("Element Value", start, v);
            None
        }),
        Decode::Full(f) => f(cur, ctx, sub),
        Decode::Half(h) => cur.read_u8().map(|oct| {
            let half = Half {
                oct,
                nibble: Nibble::Lo,
                offset: start,
            };
            h(half, ctx, sub)
        }),
    };
    match r {
        Err(DecodeError::ShortData { .. }) => {
            let offset = cur.pos();
            sub.diag(Diagnostic::ShortData, "Short Data (?)", offset, cur.rest());
            Ok(None)
        }
        r => r,
    }
}

/* TLV/LV value: the window is exactly the declared length */
fn value_window(
    mut win: Cursor,
    ctx: &DecodeContext,
    elem: &ElemDesc,
    sub: &mut FieldTree,
) -> DResult<Option<String>> {
    let start = win.pos();
    let r = match elem.decode {
        Decode::Raw => {
            let v = win.rest();
            if !v.is_empty() {
                sub.bytes("Element Value", start, v);
            }
            Ok(None)
        }
        Decode::Full(f) => f(&mut win, ctx, sub),
        Decode::Half(h) => win.read_u8().map(|oct| {
            let half = Half {
                oct,
                nibble: Nibble::Lo,
                offset: start,
            };
            h(half, ctx, sub)
        }),
    };
    match r {
        Ok(summary) => {
            let offset = win.pos();
            sub.extraneous(offset, win.rest());
            Ok(summary)
        }
        Err(DecodeError::ShortData { .. }) => {
            let offset = win.pos();
            sub.diag(Diagnostic::ShortData, "Short Data (?)", offset, win.rest());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn value_half(
    half: Half,
    ctx: &DecodeContext,
    elem: &ElemDesc,
    sub: &mut FieldTree,
) -> Option<String> {
    match elem.decode {
        Decode::Half(h) => h(half, ctx, sub),
        _ => {
            sub.bits_uint("Element Value", half.offset, 1, half.oct as u32, half.mask(0x0f));
            None
        }
    }
}

/// Reads one octet, returning its offset along with it.
pub fn octet(cur: &mut Cursor) -> DResult<(usize, u32)> {
    let offset = cur.pos();
    Ok((offset, cur.read_u8()? as u32))
}

/// Hands the rest of the cursor to a sibling decoder and appends its tree.
pub fn delegate(
    cur: &mut Cursor,
    ctx: &DecodeContext,
    proto: SubProtocol,
    tree: &mut FieldTree,
) -> DResult<()> {
    let offset = cur.pos();
    let data = cur.rest();
    if data.is_empty() {
        return Ok(());
    }
    match ctx.handoff.dissect(proto, data, ctx) {
        Ok(mut f) => {
            f.rebase(offset);
            tree.push(f);
            Ok(())
        }
        Err(DecodeError::Truncated { .. }) | Err(DecodeError::ShortData { .. }) => {
            debug!("{:?} payload at offset {} too short", proto, offset);
            tree.diag(Diagnostic::ShortData, "Short Data (?)", offset, data);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::context::DecodeOptions;
    use crate::field::{DecodedField, Value};
    use crate::proto::BuiltinHandoff;
    use crate::utils::vals::{Fallback, ValueString};

    pub fn run(data: &[u8], ies: &[IeSpec], direction: Direction) -> DResult<DecodedField> {
        let opts = DecodeOptions {
            direction,
            ..Default::default()
        };
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        let mut cur = Cursor::new(data);
        let mut tree = FieldTree::new();
        dissect_ies(&mut cur, &ctx, ies, &mut tree)?;
        Ok(DecodedField::new("Test", 0, data.len(), Value::Tree(tree.into_fields())))
    }

    static LEVEL: ValueString = ValueString::new(&[(1, "one"), (2, "two")], Fallback::Reserved);

    fn de_level(half: Half, _ctx: &DecodeContext, tree: &mut FieldTree) -> Option<String> {
        let v = tree.bits_label("Level", half.offset, 1, half.oct as u32, half.mask(0x0f), &LEVEL);
        Some(format!("level {}", v))
    }

    fn de_word(cur: &mut Cursor, _ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<Option<String>> {
        let offset = cur.pos();
        let v = cur.read_u16()?;
        tree.uint("Word", offset, 2, v as u64);
        Ok(None)
    }

    const LVL: ElemDesc = ElemDesc::half("Level", de_level);
    const WORD: ElemDesc = ElemDesc::full("Word", de_word);
    const BLOB: ElemDesc = ElemDesc::raw("Blob");

    static IES: [IeSpec; 6] = [
        mand(Form::VHalf(Nibble::Lo), 0, LVL),
        mand(Form::VHalf(Nibble::Hi), 0, LVL).named(" (high)"),
        mand(Form::V, 0, WORD),
        opt(Form::TvShort, 0x90, LVL),
        opt(Form::Tlv, 0x17, WORD),
        opt(Form::T, 0xa1, BLOB),
    ];

    #[test]
    fn halves_and_optionals() {
        let f = run(&[0x21, 0x12, 0x34, 0x92, 0xa1], &IES, Direction::Unknown).unwrap();
        let c = f.children();
        assert_eq!(c.len(), 5);
        assert_eq!(c[0].summary.as_deref(), Some("level 1"));
        assert_eq!(c[1].name, "Level (high)");
        assert_eq!(c[1].summary.as_deref(), Some("level 2"));
        assert_eq!(c[2].find("Word").and_then(|w| w.as_u64()), Some(0x1234));
        assert_eq!(c[3].offset, 3);
        assert_eq!(c[4].name, "Blob");
        assert!(f.diagnostics().is_empty());
    }

    #[test]
    fn missing_mandatory_aborts() {
        let f = run(&[0x21], &IES, Direction::Unknown).unwrap();
        let diags = f.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::MissingMandatoryElement));
        assert_eq!(
            diags[0].name,
            "Missing Mandatory element (0x00) Word, rest of dissection is suspect"
        );
    }

    #[test]
    fn tlv_length_accounting() {
        /* longer than the grammar: surplus shown, nothing lost */
        let f = run(&[0x00, 0x00, 0x00, 0x17, 0x03, 0xaa, 0xbb, 0xcc], &IES, Direction::Unknown)
            .unwrap();
        let word = f.find("Word").unwrap();
        assert_eq!(word.offset, 1);
        let extra = f.find("Extraneous Data").unwrap();
        assert_eq!(extra.offset, 7);
        assert_eq!(extra.len, 1);
        /* shorter than the grammar: short data, declared length skipped */
        let f = run(&[0x00, 0x00, 0x00, 0x17, 0x01, 0xaa, 0xa1], &IES, Direction::Unknown)
            .unwrap();
        let short = f.find("Short Data (?)").unwrap();
        assert_eq!(short.offset, 5);
        assert!(f.find("Blob").is_some());
        assert_eq!(f.diagnostics().len(), 1);
    }

    #[test]
    fn truncated_is_fatal() {
        let r = run(&[0x00, 0x00, 0x00, 0x17, 0x05, 0xaa], &IES, Direction::Unknown);
        assert_eq!(
            r.unwrap_err(),
            DecodeError::Truncated {
                offset: 5,
                needed: 4
            }
        );
        let r = run(&[0x00, 0x12], &IES, Direction::Unknown);
        assert!(matches!(r, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn trailing_garbage() {
        let f = run(&[0x00, 0x00, 0x00, 0x55, 0x66], &IES, Direction::Unknown).unwrap();
        let extra = f.find("Extraneous Data").unwrap();
        assert_eq!(extra.offset, 3);
        assert_eq!(extra.value, Value::Bytes(vec![0x55, 0x66]));
    }
}
