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

use bitflags::{bitflags, Flags};
use strum_macros::EnumIter;

use crate::utils::vals::{Fallback, TrueFalse, ValueString};

pub const SASP_MAGIC: u16 = 0x2010;
/// magic, header length, version, message length, message id
pub const SASP_HEADER_LEN: usize = 13;
/// offset of the 4-byte message length in the header
pub const SASP_LEN_OFFSET: usize = 5;

#[derive(PartialEq, Debug, Clone, Copy, EnumIter)]
pub enum MessageType {
    Unknown,
    RegReq,
    RegReply,
    DeregReq,
    DeregReply,
    GetWeightsReq,
    GetWeightsReply,
    SendWeights,
    SetLbStateReq,
    SetLbStateReply,
    SetMemberStateReq,
    SetMemberStateReply,
}

impl From<u16> for MessageType {
    fn from(item: u16) -> Self {
        match item {
            0x1010 => MessageType::RegReq,
            0x1015 => MessageType::RegReply,
            0x1020 => MessageType::DeregReq,
            0x1025 => MessageType::DeregReply,
            0x1030 => MessageType::GetWeightsReq,
            0x1035 => MessageType::GetWeightsReply,
            0x1040 => MessageType::SendWeights,
            0x1050 => MessageType::SetLbStateReq,
            0x1055 => MessageType::SetLbStateReply,
            0x1060 => MessageType::SetMemberStateReq,
            0x1065 => MessageType::SetMemberStateReply,
            _ => MessageType::Unknown,
        }
    }
}

impl From<MessageType> for u16 {
    fn from(item: MessageType) -> Self {
        match item {
            MessageType::RegReq => 0x1010,
            MessageType::RegReply => 0x1015,
            MessageType::DeregReq => 0x1020,
            MessageType::DeregReply => 0x1025,
            MessageType::GetWeightsReq => 0x1030,
            MessageType::GetWeightsReply => 0x1035,
            MessageType::SendWeights => 0x1040,
            MessageType::SetLbStateReq => 0x1050,
            MessageType::SetLbStateReply => 0x1055,
            MessageType::SetMemberStateReq => 0x1060,
            MessageType::SetMemberStateReply => 0x1065,
            MessageType::Unknown => 0,
        }
    }
}

impl MessageType {
    pub fn name(self) -> &'static str {
        match self {
            MessageType::RegReq => "Registration Request",
            MessageType::RegReply => "Registration Reply",
            MessageType::DeregReq => "Deregistration Request",
            MessageType::DeregReply => "Deregistration Reply",
            MessageType::GetWeightsReq => "Get Weights Request",
            MessageType::GetWeightsReply => "Get Weights Reply",
            MessageType::SendWeights => "Send Weights",
            MessageType::SetLbStateReq => "Set LB State Request",
            MessageType::SetLbStateReply => "Set LB State Reply",
            MessageType::SetMemberStateReq => "Set Member State Request",
            MessageType::SetMemberStateReply => "Set Member State Reply",
            MessageType::Unknown => "Unknown",
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy, EnumIter)]
pub enum ComponentType {
    Unknown,
    GroupOfMemberData,
    GroupOfWeightEntryData,
    GroupOfMemberStateData,
    MemberData,
    GroupData,
    WeightEntryData,
    MemberStateInstance,
}

impl From<u16> for ComponentType {
    fn from(item: u16) -> Self {
        match item {
            0x3010 => ComponentType::GroupOfMemberData,
            0x3011 => ComponentType::GroupOfWeightEntryData,
            0x3012 => ComponentType::GroupOfMemberStateData,
            0x4010 => ComponentType::MemberData,
            0x4011 => ComponentType::GroupData,
            0x4012 => ComponentType::WeightEntryData,
            0x4013 => ComponentType::MemberStateInstance,
            _ => ComponentType::Unknown,
        }
    }
}

impl From<ComponentType> for u16 {
    fn from(item: ComponentType) -> Self {
        match item {
            ComponentType::GroupOfMemberData => 0x3010,
            ComponentType::GroupOfWeightEntryData => 0x3011,
            ComponentType::GroupOfMemberStateData => 0x3012,
            ComponentType::MemberData => 0x4010,
            ComponentType::GroupData => 0x4011,
            ComponentType::WeightEntryData => 0x4012,
            ComponentType::MemberStateInstance => 0x4013,
            ComponentType::Unknown => 0,
        }
    }
}

impl ComponentType {
    pub fn name(self) -> &'static str {
        match self {
            ComponentType::GroupOfMemberData => "Group of Member Data",
            ComponentType::GroupOfWeightEntryData => "Group of Weight Entry Data",
            ComponentType::GroupOfMemberStateData => "Group of Member State Data",
            ComponentType::MemberData => "Member Data",
            ComponentType::GroupData => "Group Data",
            ComponentType::WeightEntryData => "Weight Entry Data",
            ComponentType::MemberStateInstance => "Member State Instance",
            ComponentType::Unknown => "Unknown Component",
        }
    }
}

pub static RESPONSE_CODE: ValueString = ValueString::new(
    &[
        (0x00, "Successful"),
        (0x10, "Message not understood"),
        (0x11, "Application version not supported"),
        (0x12, "Invalid LB UID"),
        (0x20, "Invalid group name"),
        (0x21, "Invalid member"),
        (0x30, "Duplicate member"),
        (0x40, "Invalid combination of parameters"),
        (0x44, "Insufficient resources"),
        (0x50, "LB not registered"),
    ],
    Fallback::UnknownValue,
);

pub static PROTOCOL: ValueString =
    ValueString::new(&[(0x06, "TCP"), (0x11, "UDP")], Fallback::UnknownValue);

/// Only bit 0 of the deregistration reason is defined.
pub static DEREG_REASON: TrueFalse = TrueFalse("Learned & Purposeful", "No Reason");

bitflags! {
    /// Registration Request flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RegFlags: u8 {
        const TRUST         = 0x80;
    }
}

bitflags! {
    /// Set LB State Request flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LbFlags: u8 {
        const PUSH          = 0x80;
        const TRUST         = 0x40;
        const NO_CHANGE     = 0x20;
        const NO_SEND       = 0x10;
    }
}

bitflags! {
    /// Weight Entry Data / Member State Instance flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WeightFlags: u8 {
        const CONTACT_SUCCESS   = 0x80;
        const QUIESCE           = 0x40;
        const REGISTRATION      = 0x20;
        const CONFIDENT         = 0x10;
    }
}

pub fn flag_label(name: &'static str) -> &'static str {
    match name {
        "TRUST" => "Trust",
        "PUSH" => "Push",
        "NO_CHANGE" => "No Change",
        "NO_SEND" => "No Send",
        "CONTACT_SUCCESS" => "Contact Success",
        "QUIESCE" => "Quiesce",
        "REGISTRATION" => "Registration",
        "CONFIDENT" => "Confident",
        other => other,
    }
}

/// Display names of the flags set, in bit order.
pub fn flag_names<F: Flags>(flags: F) -> Vec<&'static str> {
    flags.iter_names().map(|(name, _)| flag_label(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn message_type_parse() {
        assert!(MessageType::from(0x1015) == MessageType::RegReply);
        assert!(0x1015 as u16 == MessageType::RegReply.into());
        assert!(MessageType::from(0xffff) == MessageType::Unknown);
        for t in MessageType::iter().filter(|t| *t != MessageType::Unknown) {
            assert_eq!(MessageType::from(u16::from(t)), t);
        }
    }

    #[test]
    fn component_type_parse() {
        assert!(ComponentType::from(0x4010) == ComponentType::MemberData);
        assert!(0x3011 as u16 == ComponentType::GroupOfWeightEntryData.into());
        for t in ComponentType::iter().filter(|t| *t != ComponentType::Unknown) {
            assert_eq!(ComponentType::from(u16::from(t)), t);
        }
    }

    #[test]
    fn dereg_reason() {
        assert_eq!(DEREG_REASON.label(true), "Learned & Purposeful");
        assert_eq!(DEREG_REASON.label(false), "No Reason");
    }

    #[test]
    fn flags() {
        let f = LbFlags::from_bits_truncate(0xa3);
        assert_eq!(f, LbFlags::PUSH | LbFlags::NO_CHANGE);
        assert_eq!(flag_names(f), vec!["Push", "No Change"]);
        assert!(WeightFlags::from_bits_truncate(0x0f).is_empty());
    }
}
