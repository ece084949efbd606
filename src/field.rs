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
use std::fmt;

use itertools::Itertools;
use strum_macros::EnumIter;

use crate::utils::bits;
use crate::utils::vals::{TrueFalse, ValueString};

/// Semantic value carried by a decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Pure container or marker (e.g. a T-form element).
    None,
    Unsigned(u64),
    Signed(i64),
    Bool(bool),
    Label {
        raw: u64,
        label: Cow<'static, str>,
    },
    Str(String),
    Bytes(Vec<u8>),
    Tree(Vec<DecodedField>),
}

/* Non-fatal anomalies, rendered inline as ordinary fields */
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Diagnostic {
    UnknownMessageType,
    MissingMandatoryElement,
    ShortData,
    ExtraneousData,
    UnexpectedDataLength,
    UnknownProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask {
    pub raw: u32,
    pub mask: u32,
    pub width: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub name: Cow<'static, str>,
    /// Absolute offset in the buffer handed to the frame decoder.
    pub offset: usize,
    pub len: usize,
    pub value: Value,
    pub bits: Option<BitMask>,
    pub diag: Option<Diagnostic>,
    pub summary: Option<String>,
}

impl DecodedField {
    pub fn new<N: Into<Cow<'static, str>>>(name: N, offset: usize, len: usize, value: Value) -> Self {
        DecodedField {
            name: name.into(),
            offset,
            len,
            value,
            bits: None,
            diag: None,
            summary: None,
        }
    }

    pub fn children(&self) -> &[DecodedField] {
        match &self.value {
            Value::Tree(c) => c,
            _ => &[],
        }
    }

    /// Depth-first search by exact name.
    pub fn find(&self, name: &str) -> Option<&DecodedField> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(name))
    }

    /// Depth-first search by name prefix (element nodes carry a name
    /// addition, e.g. "Cell Identifier (Serving)").
    pub fn find_prefix(&self, prefix: &str) -> Option<&DecodedField> {
        if self.name.starts_with(prefix) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_prefix(prefix))
    }

    pub fn visit<F: FnMut(usize, &DecodedField)>(&self, f: &mut F) {
        self.visit_depth(0, f);
    }

    fn visit_depth<F: FnMut(usize, &DecodedField)>(&self, depth: usize, f: &mut F) {
        f(depth, self);
        for c in self.children() {
            c.visit_depth(depth + 1, f);
        }
    }

    pub fn diagnostics(&self) -> Vec<&DecodedField> {
        let mut out = Vec::new();
        self.collect_diags(&mut out);
        out
    }

    fn collect_diags<'a>(&'a self, out: &mut Vec<&'a DecodedField>) {
        if self.diag.is_some() {
            out.push(self);
        }
        for c in self.children() {
            c.collect_diags(out);
        }
    }

    /// Shift all offsets of this subtree, used when a sub-buffer was
    /// dissected on its own by a handoff.
    pub fn rebase(&mut self, base: usize) {
        self.offset += base;
        if let Value::Tree(children) = &mut self.value {
            for c in children {
                c.rebase(base);
            }
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.value {
            Value::Label { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match &self.value {
            Value::Unsigned(v) => Some(*v),
            Value::Label { raw, .. } => Some(*raw),
            Value::Bool(b) => Some(*b as u64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// One line as shown in a tree view, without indentation.
    pub fn line(&self) -> String {
        let mut s = String::new();
        if let Some(b) = self.bits {
            s.push_str(&bits::pattern(b.raw, b.mask, b.width as usize));
            s.push_str(" = ");
        }
        s.push_str(&self.name);
        match &self.value {
            Value::None | Value::Tree(_) => {}
            v => {
                s.push_str(": ");
                s.push_str(&v.to_string());
            }
        }
        if let Some(sum) = &self.summary {
            s.push_str(" - ");
            s.push_str(sum);
        }
        s
    }

    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.visit(&mut |depth, f| {
            out.push_str(&"    ".repeat(depth));
            out.push_str(&f.line());
            out.push('\n');
        });
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Signed(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Label { raw, label } => write!(f, "{} ({})", label, raw),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{:02x}", b.iter().format("")),
            Value::Tree(c) => write!(f, "{} item(s)", c.len()),
        }
    }
}

/// Result of a frame decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Dissection {
    pub protocol: &'static str,
    /// One-line summary (usually the message name).
    pub info: String,
    pub tree: DecodedField,
}

impl Dissection {
    pub fn diagnostics(&self) -> Vec<&DecodedField> {
        self.tree.diagnostics()
    }

    pub fn find(&self, name: &str) -> Option<&DecodedField> {
        self.tree.find(name)
    }

    pub fn into_field(self) -> DecodedField {
        self.tree
    }
}

/// Field list under construction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldTree {
    fields: Vec<DecodedField>,
}

impl FieldTree {
    pub fn new() -> Self {
        FieldTree { fields: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<DecodedField> {
        self.fields
    }

    pub fn push(&mut self, f: DecodedField) -> &mut DecodedField {
        self.fields.push(f);
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    pub fn append(&mut self, other: FieldTree) {
        self.fields.extend(other.fields);
    }

    pub fn uint<N: Into<Cow<'static, str>>>(&mut self, name: N, offset: usize, len: usize, v: u64) {
        self.push(DecodedField::new(name, offset, len, Value::Unsigned(v)));
    }

    pub fn int<N: Into<Cow<'static, str>>>(&mut self, name: N, offset: usize, len: usize, v: i64) {
        self.push(DecodedField::new(name, offset, len, Value::Signed(v)));
    }

    pub fn flag<N: Into<Cow<'static, str>>>(&mut self, name: N, offset: usize, len: usize, v: bool) {
        self.push(DecodedField::new(name, offset, len, Value::Bool(v)));
    }

    pub fn label<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        len: usize,
        raw: u32,
        vs: &ValueString,
    ) -> Cow<'static, str> {
        let label = vs.label(raw);
        self.push(DecodedField::new(
            name,
            offset,
            len,
            Value::Label {
                raw: raw as u64,
                label: label.clone(),
            },
        ));
        label
    }

    pub fn text<N: Into<Cow<'static, str>>, S: Into<String>>(
        &mut self,
        name: N,
        offset: usize,
        len: usize,
        s: S,
    ) {
        self.push(DecodedField::new(name, offset, len, Value::Str(s.into())));
    }

    pub fn bytes<N: Into<Cow<'static, str>>>(&mut self, name: N, offset: usize, data: &[u8]) {
        self.push(DecodedField::new(
            name,
            offset,
            data.len(),
            Value::Bytes(data.to_vec()),
        ));
    }

    fn bitfield<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        width: usize,
        raw: u32,
        mask: u32,
        value: Value,
    ) -> &mut DecodedField {
        let f = self.push(DecodedField::new(name, offset, width, value));
        f.bits = Some(BitMask {
            raw,
            mask,
            width: width as u8,
        });
        f
    }

    /// Bit field shown as a number; returns the zero-based value.
    pub fn bits_uint<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        width: usize,
        raw: u32,
        mask: u32,
    ) -> u32 {
        let v = bits::extract(raw, mask);
        self.bitfield(name, offset, width, raw, mask, Value::Unsigned(v as u64));
        v
    }

    pub fn bits_label<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        width: usize,
        raw: u32,
        mask: u32,
        vs: &ValueString,
    ) -> u32 {
        let v = bits::extract(raw, mask);
        let label = vs.label(v);
        self.bitfield(
            name,
            offset,
            width,
            raw,
            mask,
            Value::Label {
                raw: v as u64,
                label,
            },
        );
        v
    }

    /// Bit field whose label is computed by the caller.
    pub fn bits_text<N: Into<Cow<'static, str>>, L: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        width: usize,
        raw: u32,
        mask: u32,
        label: L,
    ) -> u32 {
        let v = bits::extract(raw, mask);
        self.bitfield(
            name,
            offset,
            width,
            raw,
            mask,
            Value::Label {
                raw: v as u64,
                label: label.into(),
            },
        );
        v
    }

    pub fn bits_bool<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        width: usize,
        raw: u32,
        mask: u32,
        tf: &TrueFalse,
    ) -> bool {
        let set = raw & mask != 0;
        self.bitfield(
            name,
            offset,
            width,
            raw,
            mask,
            Value::Label {
                raw: set as u64,
                label: Cow::Borrowed(tf.label(set)),
            },
        );
        set
    }

    pub fn spare(&mut self, offset: usize, width: usize, raw: u32, mask: u32) {
        let v = bits::extract(raw, mask);
        self.bitfield("Spare", offset, width, raw, mask, Value::Unsigned(v as u64));
    }

    pub fn subtree<N: Into<Cow<'static, str>>>(
        &mut self,
        name: N,
        offset: usize,
        len: usize,
        children: FieldTree,
    ) -> &mut DecodedField {
        self.push(DecodedField::new(
            name,
            offset,
            len,
            Value::Tree(children.fields),
        ))
    }

    pub fn diag<N: Into<Cow<'static, str>>>(
        &mut self,
        kind: Diagnostic,
        name: N,
        offset: usize,
        data: &[u8],
    ) -> &mut DecodedField {
        let value = if data.is_empty() {
            Value::None
        } else {
            Value::Bytes(data.to_vec())
        };
        let f = self.push(DecodedField::new(name, offset, data.len(), value));
        f.diag = Some(kind);
        f
    }

    /// Whether a diagnostic of `kind` sits anywhere in the tree.
    pub fn has_diag(&self, kind: Diagnostic) -> bool {
        self.fields
            .iter()
            .any(|f| f.diagnostics().iter().any(|d| d.diag == Some(kind)))
    }

    pub fn extraneous(&mut self, offset: usize, data: &[u8]) {
        if !data.is_empty() {
            self.diag(Diagnostic::ExtraneousData, "Extraneous Data", offset, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::vals::{Fallback, TF_SET};

    static COLORS: ValueString = ValueString::new(&[(1, "red"), (2, "blue")], Fallback::Reserved);

    fn sample() -> DecodedField {
        let mut inner = FieldTree::new();
        inner.bits_label("Color", 1, 1, 0x20, 0x30, &COLORS);
        inner.bits_bool("Flag", 1, 1, 0x20, 0x01, &TF_SET);
        inner.extraneous(2, &[0xde, 0xad]);
        let mut top = FieldTree::new();
        top.uint("Type", 0, 1, 7);
        top.subtree("Element", 1, 3, inner).summary = Some("red".to_string());
        DecodedField::new("Message", 0, 4, Value::Tree(top.into_fields()))
    }

    #[test]
    fn search_and_diags() {
        let f = sample();
        assert_eq!(f.find("Color").and_then(|c| c.label()), Some("Reserved"));
        assert_eq!(f.find("Type").and_then(|c| c.as_u64()), Some(7));
        assert!(f.find("Nothing").is_none());
        let diags = f.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].diag, Some(Diagnostic::ExtraneousData));
        assert_eq!(diags[0].len, 2);
    }

    #[test]
    fn nested_diag_lookup() {
        let mut inner = FieldTree::new();
        inner.diag(Diagnostic::ShortData, "Short Data (?)", 3, &[]);
        let mut top = FieldTree::new();
        top.uint("Type", 0, 1, 7);
        assert!(!top.has_diag(Diagnostic::ShortData));
        top.subtree("Element", 1, 2, inner);
        assert!(top.has_diag(Diagnostic::ShortData));
        assert!(!top.has_diag(Diagnostic::ExtraneousData));
    }

    #[test]
    fn lines() {
        let f = sample();
        let color = f.find("Color").unwrap();
        assert_eq!(color.line(), "..10 .... = Color: blue (2)");
        let flag = f.find("Flag").unwrap();
        assert_eq!(flag.line(), ".... ...0 = Flag: Not set (0)");
        let elem = f.find("Element").unwrap();
        assert_eq!(elem.line(), "Element - red");
        assert_eq!(f.find("Extraneous Data").unwrap().line(), "Extraneous Data: dead");
        let pretty = f.pretty();
        assert!(pretty.starts_with("Message\n    Type: 7\n    Element - red\n        ..10"));
    }

    #[test]
    fn rebase() {
        let mut f = sample();
        f.rebase(10);
        assert_eq!(f.offset, 10);
        assert_eq!(f.find("Extraneous Data").unwrap().offset, 12);
    }
}
