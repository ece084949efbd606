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

use std::net::Ipv6Addr;

use bitflags::Flags;
use log::*;

use crate::error::{DResult, DecodeError};
use crate::field::{Diagnostic, FieldTree};
use crate::proto::dissector::Cursor;
use crate::utils::vals::TF_SET;

use super::cst::{
    flag_label, flag_names, ComponentType, LbFlags, RegFlags, WeightFlags, PROTOCOL,
};

/// Length-prefixed ASCII string (1-byte length).
pub fn string(cur: &mut Cursor, name: &'static str, len_name: &'static str, tree: &mut FieldTree) -> DResult<String> {
    let offset = cur.pos();
    let len = cur.read_u8()? as usize;
    tree.uint(len_name, offset, 1, len as u64);
    let offset = cur.pos();
    let s = String::from_utf8_lossy(cur.take(len)?).into_owned();
    tree.text(name, offset, len, s.clone());
    Ok(s)
}

/// One flag octet, every defined bit shown.
pub fn flags<F: Flags<Bits = u8>>(cur: &mut Cursor, name: &'static str, tree: &mut FieldTree) -> DResult<F> {
    let offset = cur.pos();
    let raw = cur.read_u8()?;
    let set = F::from_bits_truncate(raw);
    let mut sub = FieldTree::new();
    for (n, flag) in F::all().iter_names() {
        sub.bits_bool(flag_label(n), offset, 1, raw as u32, flag.bits() as u32, &TF_SET);
    }
    let names = flag_names(F::from_bits_truncate(raw));
    let node = tree.subtree(name, offset, 1, sub);
    if !names.is_empty() {
        node.summary = Some(names.join(", "));
    }
    Ok(set)
}

pub fn reg_flags(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<RegFlags> {
    flags::<RegFlags>(cur, "Registration Flags", tree)
}

pub fn lb_flags(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<LbFlags> {
    flags::<LbFlags>(cur, "LB Flags", tree)
}

/* type and size shared by every component */
fn head(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<ComponentType> {
    let offset = cur.pos();
    let raw = cur.read_u16()?;
    let t = ComponentType::from(raw);
    tree.text("Type", offset, 2, format!("{} (0x{:04x})", t.name(), raw));
    let offset = cur.pos();
    let size = cur.read_u16()?;
    tree.uint("Size", offset, 2, size as u64);
    Ok(t)
}

/* runs `f` into its own subtree named `name` */
fn component<F>(cur: &mut Cursor, name: &'static str, tree: &mut FieldTree, f: F) -> DResult<()>
where
    F: FnOnce(&mut Cursor, &mut FieldTree) -> DResult<Option<String>>,
{
    let start = cur.pos();
    let mut sub = FieldTree::new();
    let summary = match f(cur, &mut sub) {
        Ok(s) => s,
        Err(DecodeError::ShortData { offset }) => {
            /* keep what was decoded, the innermost component carries the diagnostic */
            if !sub.has_diag(Diagnostic::ShortData) {
                sub.diag(Diagnostic::ShortData, "Short Data (?)", offset, &[]);
            }
            tree.subtree(name, start, cur.pos() - start, sub);
            return Err(DecodeError::ShortData { offset });
        }
        Err(e) => return Err(e),
    };
    trace!("SASP {} at offset {}", name, start);
    tree.subtree(name, start, cur.pos() - start, sub).summary = summary;
    Ok(())
}

/// Member Data: protocol, port, IPv6 address and label; 24 bytes plus the
/// label.
pub fn member_data(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    component(cur, "Member Data", tree, |cur, tree| {
        head(cur, tree)?;
        let offset = cur.pos();
        let proto = cur.read_u8()?;
        let proto_label = tree.label("Protocol", offset, 1, proto as u32, &PROTOCOL);
        let offset = cur.pos();
        let port = cur.read_u16()?;
        tree.uint("Port", offset, 2, port as u64);
        let offset = cur.pos();
        let mut octets = [0u8; 16];
        octets.copy_from_slice(cur.take(16)?);
        let ip = Ipv6Addr::from(octets);
        tree.text("IP Address", offset, 16, ip.to_string());
        let label = string(cur, "Label", "Label Length", tree)?;
        let mut summary = format!("{} [{}]:{}", proto_label, ip, port);
        if !label.is_empty() {
            summary.push_str(&format!(" \"{}\"", label));
        }
        Ok(Some(summary))
    })
}

/// Group Data: LB UID and group name.
pub fn group_data(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    component(cur, "Group Data", tree, |cur, tree| {
        head(cur, tree)?;
        let lb = string(cur, "LB UID", "LB UID Length", tree)?;
        let group = string(cur, "Group Name", "Group Name Length", tree)?;
        Ok(Some(format!("{} / {}", lb, group)))
    })
}

/// Weight Entry Data: a Member Data component, then state, flags and weight.
pub fn weight_entry(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    component(cur, "Weight Entry Data", tree, |cur, tree| {
        head(cur, tree)?;
        member_data(cur, tree)?;
        let offset = cur.pos();
        let state = cur.read_u8()?;
        tree.uint("State", offset, 1, state as u64);
        flags::<WeightFlags>(cur, "Weight Flags", tree)?;
        let offset = cur.pos();
        let weight = cur.read_u16()?;
        tree.uint("Weight", offset, 2, weight as u64);
        Ok(Some(format!("weight {}", weight)))
    })
}

/// Member State Instance: a Member Data component, then state and flags.
pub fn member_state(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    component(cur, "Member State Instance", tree, |cur, tree| {
        head(cur, tree)?;
        member_data(cur, tree)?;
        let offset = cur.pos();
        let state = cur.read_u8()?;
        tree.uint("State", offset, 1, state as u64);
        flags::<WeightFlags>(cur, "Quiesce Flags", tree)?;
        Ok(Some(format!("state {}", state)))
    })
}

fn count(cur: &mut Cursor, name: &'static str, tree: &mut FieldTree) -> DResult<u16> {
    let offset = cur.pos();
    let n = cur.read_u16()?;
    tree.uint(name, offset, 2, n as u64);
    Ok(n)
}

/* group component: header, count, group data, then `n` members */
fn group_of(
    cur: &mut Cursor,
    name: &'static str,
    count_name: &'static str,
    tree: &mut FieldTree,
    member: fn(&mut Cursor, &mut FieldTree) -> DResult<()>,
) -> DResult<()> {
    component(cur, name, tree, |cur, tree| {
        head(cur, tree)?;
        let n = count(cur, count_name, tree)?;
        group_data(cur, tree)?;
        for _ in 0..n {
            member(cur, tree)?;
        }
        Ok(Some(format!("{} member(s)", n)))
    })
}

pub fn group_of_member_data(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    group_of(cur, "Group of Member Data", "Member Data Count", tree, member_data)
}

pub fn group_of_weight_entries(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    group_of(cur, "Group of Weight Entry Data", "Weight Entry Count", tree, weight_entry)
}

pub fn group_of_member_states(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<()> {
    group_of(cur, "Group of Member State Data", "Member State Count", tree, member_state)
}

/// A 2-byte count followed by that many components.
pub fn repeated(
    cur: &mut Cursor,
    count_name: &'static str,
    tree: &mut FieldTree,
    each: fn(&mut Cursor, &mut FieldTree) -> DResult<()>,
) -> DResult<u16> {
    let n = count(cur, count_name, tree)?;
    for _ in 0..n {
        each(cur, tree)?;
    }
    Ok(n)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::field::{DecodedField, Value};

    pub const MEMBER: [u8; 24] = [
        0x00, 0x00, 0x00, 0x18, 0x06, 0x1f, 0x90, 0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
    ];

    fn root(tree: FieldTree) -> DecodedField {
        DecodedField::new("Test", 0, 0, Value::Tree(tree.into_fields()))
    }

    #[test]
    fn member_data_ipv6() {
        let mut cur = Cursor::new(&MEMBER);
        let mut tree = FieldTree::new();
        member_data(&mut cur, &mut tree).unwrap();
        assert_eq!(cur.pos(), 24);
        assert!(cur.is_empty());
        let f = root(tree);
        let m = f.find("Member Data").unwrap();
        assert_eq!((m.offset, m.len), (0, 24));
        assert_eq!(m.find("Protocol").and_then(|p| p.label()), Some("TCP"));
        assert_eq!(m.find("Port").and_then(|p| p.as_u64()), Some(8080));
        assert_eq!(m.find("IP Address").and_then(|p| p.as_str()), Some("2001:db8::1"));
        assert_eq!(m.find("Label").and_then(|p| p.as_str()), Some(""));
        assert_eq!(m.summary.as_deref(), Some("TCP [2001:db8::1]:8080"));
    }

    #[test]
    fn member_data_label() {
        let mut data = MEMBER.to_vec();
        data[23] = 3;
        data.extend_from_slice(b"web");
        let mut cur = Cursor::new(&data);
        let mut tree = FieldTree::new();
        member_data(&mut cur, &mut tree).unwrap();
        assert_eq!(cur.pos(), 27);
        let f = root(tree);
        assert_eq!(f.find("Label").and_then(|p| p.as_str()), Some("web"));
        /* label announced but cut */
        let mut cur = Cursor::new(&data[..25]);
        let mut tree = FieldTree::new();
        assert!(matches!(
            member_data(&mut cur, &mut tree),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn weight_entry_embeds_member() {
        let mut data = vec![0x40, 0x12, 0x00, 0x20];
        data.extend_from_slice(&MEMBER);
        data.extend_from_slice(&[0x01, 0xc0, 0x00, 0x64]);
        let mut cur = Cursor::new(&data);
        let mut tree = FieldTree::new();
        weight_entry(&mut cur, &mut tree).unwrap();
        assert!(cur.is_empty());
        let f = root(tree);
        let w = f.find("Weight Entry Data").unwrap();
        assert_eq!(w.summary.as_deref(), Some("weight 100"));
        assert_eq!(w.find("Member Data").map(|m| m.offset), Some(4));
        assert_eq!(
            w.find("Weight Flags").and_then(|m| m.summary.as_deref()),
            Some("Contact Success, Quiesce")
        );
        assert_eq!(w.find("Type").and_then(|t| t.as_str()), Some("Weight Entry Data (0x4012)"));
    }

    #[test]
    fn cut_component_keeps_decoded_fields() {
        /* weight entry whose member data ends inside the IP address */
        let mut data = vec![0x40, 0x12, 0x00, 0x20];
        data.extend_from_slice(&MEMBER[..10]);
        let mut outer = Cursor::new(&data);
        let mut win = outer.window(data.len()).unwrap();
        let mut tree = FieldTree::new();
        assert_eq!(
            weight_entry(&mut win, &mut tree),
            Err(DecodeError::ShortData { offset: 11 })
        );
        let f = root(tree);
        let diags = f.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].offset, 11);
        assert_eq!(f.find("Weight Entry Data").map(|w| (w.offset, w.len)), Some((0, 11)));
        let m = f.find("Member Data").unwrap();
        assert_eq!((m.offset, m.len), (4, 7));
        assert_eq!(m.find("Port").and_then(|p| p.as_u64()), Some(8080));
        assert_eq!(m.diagnostics().len(), 1);
    }

    #[test]
    fn group_of_member_data_count() {
        let mut data = vec![0x30, 0x10, 0x00, 0x00, 0x00, 0x02];
        data.extend_from_slice(&[0x40, 0x11, 0x00, 0x00, 0x02, b'l', b'b', 0x01, b'g']);
        data.extend_from_slice(&MEMBER);
        data.extend_from_slice(&MEMBER);
        let mut cur = Cursor::new(&data);
        let mut tree = FieldTree::new();
        group_of_member_data(&mut cur, &mut tree).unwrap();
        assert!(cur.is_empty());
        let f = root(tree);
        let g = f.find("Group of Member Data").unwrap();
        assert_eq!(g.summary.as_deref(), Some("2 member(s)"));
        assert_eq!(g.find("Group Data").and_then(|d| d.summary.as_deref()), Some("lb / g"));
        assert_eq!(g.children().iter().filter(|c| c.name == "Member Data").count(), 2);
    }
}
