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

use log::*;

use crate::error::DResult;
use crate::field::FieldTree;
use crate::proto::dissector::Cursor;

use super::component::{
    group_data, group_of_member_data, group_of_member_states, group_of_weight_entries, lb_flags,
    reg_flags, repeated, string,
};
use super::cst::{MessageType, DEREG_REASON, RESPONSE_CODE};

fn size(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<u16> {
    let offset = cur.pos();
    let size = cur.read_u16()?;
    tree.uint("Message Size", offset, 2, size as u64);
    Ok(size)
}

fn response_code(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<String> {
    let offset = cur.pos();
    let code = cur.read_u8()?;
    Ok(tree
        .label("Response Code", offset, 1, code as u32, &RESPONSE_CODE)
        .into_owned())
}

fn lb_uid(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<String> {
    string(cur, "LB UID", "LB UID Length", tree)
}

fn reg_req(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let uid = lb_uid(cur, tree)?;
    reg_flags(cur, tree)?;
    repeated(cur, "Group Count", tree, group_of_member_data)?;
    Ok(Some(uid))
}

fn dereg_req(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let uid = lb_uid(cur, tree)?;
    let offset = cur.pos();
    let reason = cur.read_u8()?;
    tree.bits_bool("Reason", offset, 1, reason as u32, 0x01, &DEREG_REASON);
    repeated(cur, "Group Count", tree, group_of_member_data)?;
    Ok(Some(uid))
}

fn get_weights_req(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let uid = lb_uid(cur, tree)?;
    repeated(cur, "Group Count", tree, group_data)?;
    Ok(Some(uid))
}

fn get_weights_reply(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let code = response_code(cur, tree)?;
    repeated(cur, "Group Count", tree, group_of_weight_entries)?;
    Ok(Some(code))
}

fn send_weights(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let n = repeated(cur, "Group Count", tree, group_of_weight_entries)?;
    Ok(Some(format!("{} group(s)", n)))
}

fn set_lb_state_req(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let uid = lb_uid(cur, tree)?;
    let offset = cur.pos();
    let health = cur.read_u8()?;
    tree.uint("LB Health", offset, 1, health as u64);
    lb_flags(cur, tree)?;
    Ok(Some(format!("{}, health {}", uid, health)))
}

fn set_member_state_req(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    let n = repeated(cur, "Group Count", tree, group_of_member_states)?;
    Ok(Some(format!("{} group(s)", n)))
}

fn reply(cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    response_code(cur, tree).map(Some)
}

/// Decodes the body following the message type: the message size, then the
/// fields of `msg`. Returns a short summary for the info column.
pub fn body(msg: MessageType, cur: &mut Cursor, tree: &mut FieldTree) -> DResult<Option<String>> {
    trace!("SASP {} body at offset {}", msg.name(), cur.pos());
    size(cur, tree)?;
    match msg {
        MessageType::RegReq => reg_req(cur, tree),
        MessageType::DeregReq => dereg_req(cur, tree),
        MessageType::GetWeightsReq => get_weights_req(cur, tree),
        MessageType::GetWeightsReply => get_weights_reply(cur, tree),
        MessageType::SendWeights => send_weights(cur, tree),
        MessageType::SetLbStateReq => set_lb_state_req(cur, tree),
        MessageType::SetMemberStateReq => set_member_state_req(cur, tree),
        MessageType::RegReply
        | MessageType::DeregReply
        | MessageType::SetLbStateReply
        | MessageType::SetMemberStateReply => reply(cur, tree),
        MessageType::Unknown => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DecodedField, Value};

    fn run(msg: MessageType, data: &[u8]) -> (DecodedField, usize, Option<String>) {
        let mut cur = Cursor::new(data);
        let mut tree = FieldTree::new();
        let summary = body(msg, &mut cur, &mut tree).unwrap();
        (
            DecodedField::new("Test", 0, data.len(), Value::Tree(tree.into_fields())),
            cur.remaining(),
            summary,
        )
    }

    #[test]
    fn reg_reply_successful() {
        let (f, left, summary) = run(MessageType::RegReply, &[0x00, 0x03, 0x00]);
        assert_eq!(left, 0);
        assert_eq!(f.find("Message Size").and_then(|s| s.as_u64()), Some(3));
        assert_eq!(f.find("Response Code").and_then(|s| s.label()), Some("Successful"));
        assert_eq!(summary.as_deref(), Some("Successful"));
        let (f, _, _) = run(MessageType::SetLbStateReply, &[0x00, 0x03, 0x12]);
        assert_eq!(f.find("Response Code").and_then(|s| s.label()), Some("Invalid LB UID"));
    }

    #[test]
    fn dereg_reason_bit() {
        for (raw, label) in [(0x01u8, "Learned & Purposeful"), (0x00, "No Reason"), (0xfe, "No Reason")].iter() {
            let data = [0x00, 0x08, 0x02, b'l', b'b', *raw, 0x00, 0x00];
            let (f, left, summary) = run(MessageType::DeregReq, &data);
            assert_eq!(left, 0);
            assert_eq!(summary.as_deref(), Some("lb"));
            assert_eq!(f.find("Reason").and_then(|r| r.label()), Some(*label));
        }
    }

    #[test]
    fn set_lb_state_flags() {
        let data = [0x00, 0x07, 0x01, b'x', 0x42, 0xa0];
        let (f, left, summary) = run(MessageType::SetLbStateReq, &data);
        assert_eq!(left, 0);
        assert_eq!(summary.as_deref(), Some("x, health 66"));
        let flags = f.find("LB Flags").unwrap();
        assert_eq!(flags.summary.as_deref(), Some("Push, No Change"));
        assert_eq!(flags.children().len(), 4);
    }

    #[test]
    fn get_weights_request() {
        let data = [
            0x00, 0x12, 0x02, b'l', b'b', 0x00, 0x01, 0x40, 0x11, 0x00, 0x09, 0x02, b'l', b'b', 0x01,
            b'g',
        ];
        let (f, left, _) = run(MessageType::GetWeightsReq, &data);
        assert_eq!(left, 0);
        assert_eq!(f.find("Group Count").and_then(|c| c.as_u64()), Some(1));
        assert_eq!(f.find("Group Name").and_then(|c| c.as_str()), Some("g"));
    }
}
