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

use std::fmt;
use std::str::FromStr;

use log::*;
use strum_macros::EnumIter;

use crate::context::{DecodeContext, DecodeOptions, Handoff, SubProtocol};
use crate::error::DResult;
use crate::field::{DecodedField, Dissection, FieldTree, Value};

pub mod ber;
pub mod dissector;
pub mod gsm_a;
pub mod sasp;

use dissector::Cursor;
use gsm_a::{bssmap, dtap, rp};

/// Wraps the fields of a frame decoder into its result.
pub(crate) fn frame(protocol: &'static str, info: String, len: usize, tree: FieldTree) -> Dissection {
    let mut root = DecodedField::new(protocol, 0, len, Value::Tree(tree.into_fields()));
    root.summary = Some(info.clone());
    Dissection {
        protocol,
        info,
        tree: root,
    }
}

/// Handoff used unless the caller brings its own: embedded DTAP and RP
/// messages go through this crate's decoders, ROS parameters are walked as
/// plain BER, the rest is kept as bytes.
pub struct BuiltinHandoff;

impl Handoff for BuiltinHandoff {
    fn dissect(&self, proto: SubProtocol, data: &[u8], ctx: &DecodeContext) -> DResult<DecodedField> {
        trace!("handoff {:?} ({} bytes)", proto, data.len());
        match proto {
            SubProtocol::Dtap => dtap::dissect(data, ctx).map(Dissection::into_field),
            SubProtocol::Rp => rp::dissect(data, ctx).map(Dissection::into_field),
            SubProtocol::SsParameter { .. } => {
                let mut cur = Cursor::new(data);
                let mut tree = FieldTree::new();
                ber::walk(&mut cur, ctx, &mut tree)?;
                Ok(DecodedField::new(
                    "Parameter",
                    0,
                    data.len(),
                    Value::Tree(tree.into_fields()),
                ))
            }
            SubProtocol::Ppp { .. } => Ok(DecodedField::new(
                "PPP Data",
                0,
                data.len(),
                Value::Bytes(data.to_vec()),
            )),
            SubProtocol::SmsTpdu => Ok(DecodedField::new(
                "TPDU",
                0,
                data.len(),
                Value::Bytes(data.to_vec()),
            )),
        }
    }
}

/// Top-level frame decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Protocol {
    Bssmap,
    Dtap,
    Rp,
    Sasp,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssmap" => Ok(Protocol::Bssmap),
            "dtap" => Ok(Protocol::Dtap),
            "rp" => Ok(Protocol::Rp),
            "sasp" => Ok(Protocol::Sasp),
            _ => Err(format!("unknown protocol: {}", s)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Bssmap => "bssmap",
            Protocol::Dtap => "dtap",
            Protocol::Rp => "rp",
            Protocol::Sasp => "sasp",
        };
        write!(f, "{}", s)
    }
}

/// Decodes one frame of `proto` with the built-in handoff.
pub fn dissect(proto: Protocol, data: &[u8], opts: &DecodeOptions) -> DResult<Dissection> {
    dissect_with(proto, data, opts, &BuiltinHandoff)
}

pub fn dissect_with(
    proto: Protocol,
    data: &[u8],
    opts: &DecodeOptions,
    handoff: &dyn Handoff,
) -> DResult<Dissection> {
    let ctx = DecodeContext::new(opts, handoff);
    debug!("{} frame of {} bytes", proto, data.len());
    match proto {
        Protocol::Bssmap => bssmap::dissect(data, &ctx),
        Protocol::Dtap => dtap::dissect(data, &ctx),
        Protocol::Rp => rp::dissect(data, &ctx),
        Protocol::Sasp => sasp::dissect(data, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use strum::IntoEnumIterator;

    struct Opaque;

    impl Handoff for Opaque {
        fn dissect(&self, _p: SubProtocol, data: &[u8], _c: &DecodeContext) -> DResult<DecodedField> {
            Ok(DecodedField::new("Opaque", 0, data.len(), Value::Bytes(data.to_vec())))
        }
    }

    #[test]
    fn protocol_names() {
        for p in Protocol::iter() {
            assert_eq!(p.to_string().parse::<Protocol>(), Ok(p));
        }
        assert_eq!("BSSMAP".parse::<Protocol>(), Ok(Protocol::Bssmap));
        assert!("isup".parse::<Protocol>().is_err());
    }

    #[test]
    fn frame_wraps_fields() {
        let mut tree = FieldTree::new();
        tree.uint("A", 0, 1, 1);
        tree.uint("B", 1, 2, 2);
        let d = frame("P", "info".to_string(), 3, tree);
        assert_eq!(d.tree.name, "P");
        assert_eq!(d.tree.summary.as_deref(), Some("info"));
        assert_eq!(d.tree.children().len(), 2);
        assert_eq!(d.info, "info");
    }

    #[test]
    fn builtin_handoff() {
        let opts = DecodeOptions::default();
        let ctx = DecodeContext::new(&opts, &BuiltinHandoff);
        /* MM Null */
        let f = BuiltinHandoff.dissect(SubProtocol::Dtap, &[0x05, 0x30], &ctx).unwrap();
        assert_eq!(f.name, dtap::PROTOCOL);
        assert_eq!(f.summary.as_deref(), Some("MM Null"));
        let f = BuiltinHandoff
            .dissect(SubProtocol::SsParameter { opcode: None }, &[0x04, 0x01, 0xaa], &ctx)
            .unwrap();
        assert_eq!(f.name, "Parameter");
        assert_eq!(f.find("OCTET STRING").unwrap().value, Value::Bytes(vec![0xaa]));
        let f = BuiltinHandoff.dissect(SubProtocol::SmsTpdu, &[1, 2], &ctx).unwrap();
        assert_eq!((f.name.as_ref(), f.len), ("TPDU", 2));
    }

    #[test]
    fn custom_handoff() {
        /* Complete Layer 3 Information carrying a Location Updating Request */
        let data = [
            0x57, 0x05, 0x08, 0x00, 0x02, 0xf8, 0x01, 0x00, 0x01, 0x00, 0x02, 0x17, 0x02, 0x05,
            0x08,
        ];
        let opts = DecodeOptions::default();
        let d = dissect_with(Protocol::Bssmap, &data, &opts, &Opaque).unwrap();
        assert_eq!(d.info, "Complete Layer 3 Information");
        let l3 = d.find("Opaque").unwrap();
        assert_eq!((l3.offset, l3.len), (13, 2));
        assert!(d.find(dtap::PROTOCOL).is_none());
    }

    #[test]
    fn dispatch() {
        let opts = DecodeOptions::default();
        let d = dissect(Protocol::Dtap, &[0x05, 0x30], &opts).unwrap();
        assert_eq!(d.protocol, dtap::PROTOCOL);
        assert!(matches!(
            dissect(Protocol::Sasp, &[], &opts),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
