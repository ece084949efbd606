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

/* Minimal BER reader: identifiers, lengths (short, long, indefinite) and
 * a generic walk over nested TLVs with a nesting limit. */

use std::borrow::Cow;

use log::*;
use strum_macros::EnumIter;

use crate::context::DecodeContext;
use crate::error::{DResult, DecodeError};
use crate::field::{DecodedField, FieldTree, Value};
use crate::proto::dissector::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl From<u8> for Class {
    fn from(item: u8) -> Self {
        match item & 0x03 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }
}

impl From<Class> for u8 {
    fn from(item: Class) -> Self {
        match item {
            Class::Universal => 0,
            Class::Application => 1,
            Class::Context => 2,
            Class::Private => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    pub class: Class,
    pub constructed: bool,
    pub tag: u32,
}

impl Identifier {
    pub fn is(&self, class: Class, constructed: bool, tag: u32) -> bool {
        self.class == class && self.constructed == constructed && self.tag == tag
    }

    pub fn name(&self) -> Cow<'static, str> {
        if self.class == Class::Universal {
            let s = match self.tag {
                1 => "BOOLEAN",
                2 => "INTEGER",
                3 => "BIT STRING",
                4 => "OCTET STRING",
                5 => "NULL",
                6 => "OBJECT IDENTIFIER",
                10 => "ENUMERATED",
                12 => "UTF8String",
                16 => "SEQUENCE",
                17 => "SET",
                19 => "PrintableString",
                22 => "IA5String",
                23 => "UTCTime",
                24 => "GeneralizedTime",
                26 => "VisibleString",
                _ => return Cow::Owned(format!("[UNIVERSAL {}]", self.tag)),
            };
            return Cow::Borrowed(s);
        }
        match self.class {
            Class::Application => Cow::Owned(format!("[APPLICATION {}]", self.tag)),
            Class::Private => Cow::Owned(format!("[PRIVATE {}]", self.tag)),
            _ => Cow::Owned(format!("[{}]", self.tag)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

pub fn read_identifier(cur: &mut Cursor) -> DResult<Identifier> {
    let b = cur.read_u8()?;
    let mut tag = (b & 0x1f) as u32;
    if tag == 0x1f {
        tag = 0;
        loop {
            let n = cur.read_u8()?;
            tag = tag.wrapping_shl(7) | (n & 0x7f) as u32;
            if n & 0x80 == 0 {
                break;
            }
        }
    }
    Ok(Identifier {
        class: Class::from(b >> 6),
        constructed: b & 0x20 != 0,
        tag,
    })
}

pub fn read_length(cur: &mut Cursor) -> DResult<Length> {
    let b = cur.read_u8()?;
    if b & 0x80 == 0 {
        return Ok(Length::Definite(b as usize));
    }
    let n = (b & 0x7f) as usize;
    if n == 0 {
        return Ok(Length::Indefinite);
    }
    let mut len: usize = 0;
    for _ in 0..n {
        let v = cur.read_u8()?;
        len = len.saturating_mul(256).saturating_add(v as usize);
    }
    Ok(Length::Definite(len))
}

/// One TLV; `content` is bounded by its length (end-of-contents octets of
/// the indefinite form excluded).
#[derive(Debug, Clone, Copy)]
pub struct Tlv<'a> {
    pub id: Identifier,
    pub offset: usize,
    pub len: Length,
    pub content: Cursor<'a>,
}

impl<'a> Tlv<'a> {
    /// Whole TLV, header and trailing end-of-contents included.
    pub fn total_len(&self) -> usize {
        let eoc = match self.len {
            Length::Indefinite => 2,
            Length::Definite(_) => 0,
        };
        self.content.end() + eoc - self.offset
    }
}

/// Length of indefinite-form contents starting at the cursor, i.e. up to
/// the matching end-of-contents octets.
fn indefinite_len(mut cur: Cursor, ctx: &DecodeContext) -> DResult<usize> {
    let start = cur.pos();
    let mut depth = 1;
    loop {
        if cur.peek_u8() == Some(0) && cur.peek_at(1) == Some(0) {
            depth -= 1;
            if depth == 0 {
                return Ok(cur.pos() - start);
            }
            cur.skip(2)?;
            continue;
        }
        let id = read_identifier(&mut cur)?;
        match read_length(&mut cur)? {
            Length::Indefinite => {
                depth += 1;
                if ctx.ber_depth + depth > ctx.max_ber_depth {
                    return Err(DecodeError::RecursionLimitExceeded {
                        depth: ctx.max_ber_depth,
                    });
                }
                if !id.constructed {
                    /* indefinite primitive: no way to find its end */
                    return Err(DecodeError::ShortData { offset: cur.pos() });
                }
            }
            Length::Definite(n) => cur.skip(n)?,
        }
    }
}

pub fn read_tlv<'a>(cur: &mut Cursor<'a>, ctx: &DecodeContext) -> DResult<Tlv<'a>> {
    let offset = cur.pos();
    let id = read_identifier(cur)?;
    let len = read_length(cur)?;
    let content = match len {
        Length::Definite(n) => cur.window(n)?,
        Length::Indefinite => {
            let n = indefinite_len(*cur, ctx)?;
            let w = cur.window(n)?;
            cur.skip(2)?;
            w
        }
    };
    Ok(Tlv {
        id,
        offset,
        len,
        content,
    })
}

fn oid_string(data: &[u8]) -> String {
    let mut arcs: Vec<u64> = Vec::new();
    let mut v: u64 = 0;
    for b in data {
        v = v.wrapping_shl(7) | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            if arcs.is_empty() {
                let first = if v < 80 { v / 40 } else { 2 };
                arcs.push(first);
                arcs.push(v - first * 40);
            } else {
                arcs.push(v);
            }
            v = 0;
        }
    }
    arcs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(".")
}

/// Two's complement big-endian integer, as used by INTEGER and ENUMERATED.
pub fn integer(data: &[u8]) -> i64 {
    let mut v: i64 = if data.first().map_or(false, |b| b & 0x80 != 0) {
        -1
    } else {
        0
    };
    for b in data.iter().take(8) {
        v = (v << 8) | *b as i64;
    }
    v
}

/// Field for a primitive TLV.
pub fn primitive_field(tlv: &Tlv, name: Cow<'static, str>) -> DecodedField {
    let data = tlv.content.peek_rest();
    let value = match (tlv.id.class, tlv.id.tag) {
        (Class::Universal, 1) => Value::Bool(data.first().map_or(false, |b| *b != 0)),
        (Class::Universal, 2) | (Class::Universal, 10) => Value::Signed(integer(data)),
        (Class::Universal, 5) => Value::None,
        (Class::Universal, 6) => Value::Str(oid_string(data)),
        (Class::Universal, 12)
        | (Class::Universal, 19)
        | (Class::Universal, 22)
        | (Class::Universal, 26) => Value::Str(String::from_utf8_lossy(data).into_owned()),
        _ => Value::Bytes(data.to_vec()),
    };
    DecodedField::new(name, tlv.offset, tlv.total_len(), value)
}

/// Generic walk: every TLV up to the end of the cursor, constructed ones
/// recursively.
pub fn walk(cur: &mut Cursor, ctx: &DecodeContext, tree: &mut FieldTree) -> DResult<()> {
    while !cur.is_empty() {
        let tlv = read_tlv(cur, ctx)?;
        if tlv.id.constructed {
            let inner = ctx.nested()?;
            let mut content = tlv.content;
            let mut sub = FieldTree::new();
            walk(&mut content, &inner, &mut sub)?;
            tree.subtree(tlv.id.name(), tlv.offset, tlv.total_len(), sub);
        } else {
            tree.push(primitive_field(&tlv, tlv.id.name()));
        }
    }
    trace!("BER walk done at offset {}", cur.pos());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DecodeOptions, Handoff, SubProtocol};
    use strum::IntoEnumIterator;

    struct Nothing;

    impl Handoff for Nothing {
        fn dissect(&self, _p: SubProtocol, _d: &[u8], _c: &DecodeContext) -> DResult<DecodedField> {
            Ok(DecodedField::new("Nothing", 0, 0, Value::None))
        }
    }

    fn walk_all(data: &[u8], max_depth: usize) -> DResult<FieldTree> {
        let opts = DecodeOptions {
            max_ber_depth: max_depth,
            ..Default::default()
        };
        let ctx = DecodeContext::new(&opts, &Nothing);
        let mut cur = Cursor::new(data);
        let mut tree = FieldTree::new();
        walk(&mut cur, &ctx, &mut tree)?;
        Ok(tree)
    }

    #[test]
    fn class_conv() {
        for c in Class::iter() {
            assert!(Class::from(u8::from(c)) == c);
        }
    }

    #[test]
    fn identifiers_and_lengths() {
        let mut c = Cursor::new(&[0xbf, 0x81, 0x05, 0x82, 0x01, 0x00]);
        let id = read_identifier(&mut c).unwrap();
        assert!(id.is(Class::Context, true, 133));
        assert_eq!(read_length(&mut c), Ok(Length::Definite(256)));
        let mut c = Cursor::new(&[0x80]);
        assert_eq!(read_length(&mut c), Ok(Length::Indefinite));
    }

    #[test]
    fn integers() {
        assert_eq!(integer(&[0x01]), 1);
        assert_eq!(integer(&[0xff]), -1);
        assert_eq!(integer(&[0x00, 0x80]), 128);
        assert_eq!(integer(&[0xff, 0x7f]), -129);
        assert_eq!(oid_string(&[0x2a, 0x86, 0x48]), "1.2.840");
    }

    #[test]
    fn nested_walk() {
        /* SEQUENCE { INTEGER 5, [0] { OCTET STRING 'ab' } } */
        let data = [0x30, 0x09, 0x02, 0x01, 0x05, 0xa0, 0x04, 0x04, 0x02, 0x61, 0x62];
        let tree = walk_all(&data, 32).unwrap();
        let f = &tree.fields()[0];
        assert_eq!(f.name, "SEQUENCE");
        assert_eq!(f.len, 11);
        assert_eq!(f.find("INTEGER").unwrap().value, Value::Signed(5));
        assert_eq!(f.find("OCTET STRING").unwrap().value, Value::Bytes(b"ab".to_vec()));
        assert_eq!(f.find("[0]").unwrap().offset, 5);
    }

    #[test]
    fn indefinite() {
        /* [1] (indefinite) { NULL } followed by BOOLEAN TRUE */
        let data = [0xa1, 0x80, 0x05, 0x00, 0x00, 0x00, 0x01, 0x01, 0xff];
        let tree = walk_all(&data, 32).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.fields()[0].len, 6);
        assert_eq!(tree.fields()[1].value, Value::Bool(true));
    }

    #[test]
    fn depth_guard() {
        /* 40 nested definite-length SEQUENCEs */
        let mut data = Vec::new();
        for i in 0..40 {
            data.push(0x30);
            data.push((2 * (39 - i)) as u8);
        }
        assert_eq!(
            walk_all(&data, 32).unwrap_err(),
            DecodeError::RecursionLimitExceeded { depth: 32 }
        );
        assert!(walk_all(&data, 64).is_ok());
        /* same with indefinite lengths */
        let mut data = vec![0x30, 0x80].repeat(40);
        data.extend(vec![0x00; 80]);
        assert_eq!(
            walk_all(&data, 32).unwrap_err(),
            DecodeError::RecursionLimitExceeded { depth: 32 }
        );
    }

    #[test]
    fn overrun() {
        let r = walk_all(&[0x04, 0x05, 0x01], 32);
        assert_eq!(
            r.unwrap_err(),
            DecodeError::Truncated {
                offset: 2,
                needed: 4
            }
        );
    }
}
